// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-endpoint AppSequence ordering filter.
//!
//! WS-Discovery senders stamp every message with an
//! `(InstanceId, SequenceId?, MessageNumber)` triple. A receiver accepts a
//! message only if it is newer than everything already accepted from the
//! same sender within the same instance and sequence:
//!
//! ```text
//! instance <  latest            -> reject
//! instance >  latest            -> accept, forget all sequences
//! instance == latest, no seq-id -> accept iff number > null slot
//! instance == latest, seq-id    -> accept iff number > tracked number
//!                                  (unknown seq-id: track it, evicting
//!                                   the oldest when full)
//! ```

use crate::model::AppSequence;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;

/// Default bound on tracked sequence ids per instance.
pub const DEFAULT_MAX_SEQUENCE_IDS: usize = 10;

#[derive(Debug, Default)]
struct TrackerState {
    latest_instance: Option<u64>,
    /// (sequence id, latest message number) for the current instance.
    entries: Vec<(String, u64)>,
    /// Ring index of the oldest entry once `entries` is full.
    next_evict: usize,
    /// Latest message number seen without a sequence id.
    null_number: Option<u64>,
}

/// Ordering state for one remote endpoint.
#[derive(Debug)]
pub struct AppSequenceTracker {
    state: Mutex<TrackerState>,
    max_sequence_ids: usize,
}

impl AppSequenceTracker {
    pub fn new(max_sequence_ids: usize) -> Self {
        Self {
            state: Mutex::new(TrackerState::default()),
            max_sequence_ids: max_sequence_ids.max(1),
        }
    }

    pub fn max_sequence_ids(&self) -> usize {
        self.max_sequence_ids
    }

    /// Judge `app_sequence` against the tracked state and commit it if new.
    ///
    /// Returns `true` when the message is accepted. The check and the update
    /// happen under one lock, so of two concurrent copies exactly one wins.
    pub fn check_and_update(&self, app_sequence: Option<&AppSequence>) -> bool {
        let Some(seq) = app_sequence else {
            log::info!("[appseq] message without AppSequence accepted");
            return true;
        };

        let mut state = self.state.lock();
        let latest_instance = state.latest_instance;

        match latest_instance {
            Some(latest) if seq.instance_id < latest => {
                log::debug!(
                    "[appseq] stale instance {} < {}",
                    seq.instance_id,
                    latest
                );
                false
            }
            Some(latest) if seq.instance_id == latest => match &seq.sequence_id {
                None => accept_if_newer(&mut state.null_number, seq.message_number),
                Some(id) => self.check_sequence(&mut state, id, seq.message_number),
            },
            _ => {
                state.latest_instance = Some(seq.instance_id);
                state.entries.clear();
                state.next_evict = 0;
                state.null_number = None;
                match &seq.sequence_id {
                    None => state.null_number = Some(seq.message_number),
                    Some(id) => state.entries.push((id.clone(), seq.message_number)),
                }
                true
            }
        }
    }

    fn check_sequence(&self, state: &mut TrackerState, id: &str, number: u64) -> bool {
        if let Some((_, tracked)) = state.entries.iter_mut().find(|(s, _)| s == id) {
            if number > *tracked {
                *tracked = number;
                return true;
            }
            log::debug!("[appseq] outdated message {} <= {} in {}", number, tracked, id);
            return false;
        }

        if state.entries.len() < self.max_sequence_ids {
            state.entries.push((id.to_string(), number));
        } else {
            let slot = state.next_evict;
            log::debug!("[appseq] evicting sequence {}", state.entries[slot].0);
            state.entries[slot] = (id.to_string(), number);
            state.next_evict = (slot + 1) % self.max_sequence_ids;
        }
        true
    }

    /// Forget everything about this endpoint.
    pub fn reset(&self) {
        *self.state.lock() = TrackerState::default();
    }

    pub fn latest_instance(&self) -> Option<u64> {
        self.state.lock().latest_instance
    }

    pub fn tracked_sequences(&self) -> usize {
        self.state.lock().entries.len()
    }
}

impl Default for AppSequenceTracker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SEQUENCE_IDS)
    }
}

fn accept_if_newer(slot: &mut Option<u64>, number: u64) -> bool {
    match *slot {
        Some(latest) if number <= latest => {
            log::debug!("[appseq] outdated message {} <= {}", number, latest);
            false
        }
        _ => {
            *slot = Some(number);
            true
        }
    }
}

/// Trackers keyed by remote endpoint, created on first use.
#[derive(Debug)]
pub struct AppSequenceTrackers {
    trackers: DashMap<String, Arc<AppSequenceTracker>>,
    max_sequence_ids: usize,
}

impl AppSequenceTrackers {
    pub fn new(max_sequence_ids: usize) -> Self {
        Self {
            trackers: DashMap::new(),
            max_sequence_ids,
        }
    }

    pub fn tracker(&self, endpoint: &str) -> Arc<AppSequenceTracker> {
        self.trackers
            .entry(endpoint.to_string())
            .or_insert_with(|| Arc::new(AppSequenceTracker::new(self.max_sequence_ids)))
            .clone()
    }

    pub fn check_and_update(&self, endpoint: &str, app_sequence: Option<&AppSequence>) -> bool {
        self.tracker(endpoint).check_and_update(app_sequence)
    }

    pub fn remove(&self, endpoint: &str) {
        self.trackers.remove(endpoint);
    }

    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }

    pub fn clear(&self) {
        self.trackers.clear();
    }
}

impl Default for AppSequenceTrackers {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SEQUENCE_IDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(instance: u64, id: Option<&str>, number: u64) -> AppSequence {
        let s = AppSequence::new(instance, number);
        match id {
            Some(id) => s.with_sequence_id(id),
            None => s,
        }
    }

    #[test]
    fn test_missing_app_sequence_is_accepted() {
        let tracker = AppSequenceTracker::default();
        assert!(tracker.check_and_update(None));
        assert!(tracker.check_and_update(None));
        assert_eq!(tracker.latest_instance(), None);
    }

    #[test]
    fn test_increasing_numbers_then_replay() {
        let tracker = AppSequenceTracker::default();
        for n in 1..=3 {
            assert!(tracker.check_and_update(Some(&seq(5, Some("s"), n))));
        }
        assert!(!tracker.check_and_update(Some(&seq(5, Some("s"), 2))));
        assert!(!tracker.check_and_update(Some(&seq(5, Some("s"), 3))));
    }

    #[test]
    fn test_null_sequence_slot() {
        let tracker = AppSequenceTracker::default();
        assert!(tracker.check_and_update(Some(&seq(1, None, 4))));
        assert!(!tracker.check_and_update(Some(&seq(1, None, 4))));
        assert!(tracker.check_and_update(Some(&seq(1, None, 5))));
        // Named sequences are independent of the null slot.
        assert!(tracker.check_and_update(Some(&seq(1, Some("a"), 1))));
    }

    #[test]
    fn test_new_instance_resets_state() {
        let tracker = AppSequenceTracker::default();
        assert!(tracker.check_and_update(Some(&seq(1, Some("a"), 100))));
        assert!(tracker.check_and_update(Some(&seq(2, Some("a"), 1))));
        assert_eq!(tracker.latest_instance(), Some(2));
        assert_eq!(tracker.tracked_sequences(), 1);
        assert!(!tracker.check_and_update(Some(&seq(1, Some("a"), 101))));
    }

    #[test]
    fn test_oldest_sequence_evicted_at_capacity() {
        let tracker = AppSequenceTracker::new(2);
        assert!(tracker.check_and_update(Some(&seq(1, Some("a"), 5))));
        assert!(tracker.check_and_update(Some(&seq(1, Some("b"), 5))));
        assert!(tracker.check_and_update(Some(&seq(1, Some("c"), 5))));
        assert_eq!(tracker.tracked_sequences(), 2);
        // "a" was evicted, so an old number is accepted again.
        assert!(tracker.check_and_update(Some(&seq(1, Some("a"), 1))));
        // "b" was evicted by "a"; "c" is still tracked.
        assert!(!tracker.check_and_update(Some(&seq(1, Some("c"), 5))));
    }

    #[test]
    fn test_registry_isolates_endpoints() {
        let trackers = AppSequenceTrackers::new(4);
        assert!(trackers.check_and_update("10.0.0.1", Some(&seq(1, None, 2))));
        assert!(trackers.check_and_update("10.0.0.2", Some(&seq(1, None, 2))));
        assert!(!trackers.check_and_update("10.0.0.1", Some(&seq(1, None, 2))));
        assert_eq!(trackers.len(), 2);
        trackers.remove("10.0.0.1");
        assert!(trackers.check_and_update("10.0.0.1", Some(&seq(1, None, 2))));
    }
}
