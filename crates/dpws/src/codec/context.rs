// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Transport context and monitoring hooks.

use super::DiscardReason;
use crate::model::Message;
use crate::protocol::ProtocolVersion;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

/// Which way a message travels relative to this node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Inbound,
    Outbound,
}

/// Transport-level facts about one message exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionInfo {
    /// Version the transport is bound to, if any.
    pub version: Option<ProtocolVersion>,
    /// Remote transport address of an inbound message.
    pub source_address: Option<String>,
    pub direction: Direction,
    /// Identifier of the communication manager that owns the transport.
    pub comm_manager_id: String,
    /// Local transport address (e.g. `http://10.0.0.5:5357`) used to resolve
    /// relative NotifyTo addresses.
    pub local_binding: Option<String>,
}

impl ConnectionInfo {
    pub fn inbound(source_address: impl Into<String>) -> Self {
        Self {
            source_address: Some(source_address.into()),
            direction: Direction::Inbound,
            ..Default::default()
        }
    }

    pub fn outbound() -> Self {
        Self {
            direction: Direction::Outbound,
            ..Default::default()
        }
    }

    pub fn with_version(mut self, version: ProtocolVersion) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_local_binding(mut self, binding: impl Into<String>) -> Self {
        self.local_binding = Some(binding.into());
        self
    }

    pub fn with_comm_manager(mut self, id: impl Into<String>) -> Self {
        self.comm_manager_id = id.into();
        self
    }
}

/// Notified on every inbound outcome.
pub trait MessageMonitor: Send + Sync {
    fn received(&self, _message: &Message, _connection: &ConnectionInfo) {}

    fn discarded(&self, _reason: &DiscardReason, _connection: &ConnectionInfo) {}
}

/// Monitor that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMonitor;

impl MessageMonitor for NoMonitor {}

/// Monitor counting outcomes.
#[derive(Debug, Default)]
pub struct MonitorStats {
    received: AtomicU64,
    discarded: AtomicU64,
    own_messages: AtomicU64,
    version_mismatches: AtomicU64,
}

impl MonitorStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn received_count(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    pub fn discarded_count(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }

    pub fn own_message_count(&self) -> u64 {
        self.own_messages.load(Ordering::Relaxed)
    }

    pub fn version_mismatch_count(&self) -> u64 {
        self.version_mismatches.load(Ordering::Relaxed)
    }
}

impl MessageMonitor for MonitorStats {
    fn received(&self, _message: &Message, _connection: &ConnectionInfo) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    fn discarded(&self, reason: &DiscardReason, _connection: &ConnectionInfo) {
        self.discarded.fetch_add(1, Ordering::Relaxed);
        match reason {
            DiscardReason::OwnMessage => {
                self.own_messages.fetch_add(1, Ordering::Relaxed);
            }
            DiscardReason::VersionMismatch => {
                self.version_mismatches.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
    }
}

/// MessageIDs of outgoing GetMetadata requests awaiting a response.
///
/// Bounded; the oldest request is forgotten when full.
#[derive(Debug)]
pub struct PendingMetadataRequests {
    ids: Mutex<VecDeque<String>>,
    capacity: usize,
}

impl PendingMetadataRequests {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            ids: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn register(&self, message_id: &str) {
        let mut ids = self.ids.lock();
        if ids.len() == self.capacity {
            ids.pop_front();
        }
        ids.push_back(message_id.to_string());
    }

    pub fn contains(&self, message_id: &str) -> bool {
        self.ids.lock().iter().any(|id| id == message_id)
    }

    /// Remove `message_id`, returning whether it was pending.
    pub fn take(&self, message_id: &str) -> bool {
        let mut ids = self.ids.lock();
        match ids.iter().position(|id| id == message_id) {
            Some(index) => {
                ids.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.ids.lock().clear();
    }
}

impl Default for PendingMetadataRequests {
    fn default() -> Self {
        Self::new(50)
    }
}
