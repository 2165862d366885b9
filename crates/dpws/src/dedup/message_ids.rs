// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounded recent-MessageID cache.

use parking_lot::Mutex;
use std::collections::HashSet;

/// Fixed-capacity ring of recently seen message ids plus a membership set.
///
/// Used process-wide for generic duplicate suppression and for recognizing
/// echoes of messages this node sent itself.
///
/// # Performance
/// - contains(): O(1) average
/// - contains_or_enqueue(): O(1) average, one critical section
pub struct MessageIdBuffer {
    inner: Mutex<Ring>,
}

struct Ring {
    slots: Vec<Option<String>>,
    /// Next slot to fill (oldest entry once the ring is full).
    next: usize,
    members: HashSet<String>,
}

impl MessageIdBuffer {
    /// Create a buffer holding at most `capacity` ids (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(Ring {
                slots: vec![None; capacity],
                next: 0,
                members: HashSet::with_capacity(capacity),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().slots.len()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.lock().members.contains(id)
    }

    /// Returns `true` if `id` was already present; otherwise records it,
    /// evicting the oldest id when full.
    pub fn contains_or_enqueue(&self, id: &str) -> bool {
        let mut ring = self.inner.lock();
        if ring.members.contains(id) {
            return true;
        }
        let slot = ring.next;
        if let Some(evicted) = ring.slots[slot].take() {
            ring.members.remove(&evicted);
        }
        ring.slots[slot] = Some(id.to_string());
        ring.members.insert(id.to_string());
        ring.next = (slot + 1) % ring.slots.len();
        false
    }

    pub fn clear(&self) {
        let mut ring = self.inner.lock();
        ring.slots.iter_mut().for_each(|slot| *slot = None);
        ring.members.clear();
        ring.next = 0;
    }
}

impl Default for MessageIdBuffer {
    fn default() -> Self {
        Self::new(50)
    }
}

impl std::fmt::Debug for MessageIdBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ring = self.inner.lock();
        f.debug_struct("MessageIdBuffer")
            .field("capacity", &ring.slots.len())
            .field("len", &ring.members.len())
            .finish()
    }
}
