// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Discard policies run between header and body parsing.
//!
//! A policy sees the parsed header and the transport context and may stop
//! the decode with a [`DiscardReason`]; the body is then never parsed.

use super::{ConnectionInfo, DiscardReason};
use crate::dedup::{AppSequenceTrackers, MessageIdBuffer};
use crate::model::Header;
use std::sync::Arc;

/// Decide whether an inbound message should be dropped.
pub trait DiscardPolicy: Send + Sync {
    fn check(&self, header: &Header, connection: &ConnectionInfo) -> Option<DiscardReason>;
}

impl<F> DiscardPolicy for F
where
    F: Fn(&Header, &ConnectionInfo) -> Option<DiscardReason> + Send + Sync,
{
    fn check(&self, header: &Header, connection: &ConnectionInfo) -> Option<DiscardReason> {
        self(header, connection)
    }
}

/// Accept everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl DiscardPolicy for AcceptAll {
    fn check(&self, _header: &Header, _connection: &ConnectionInfo) -> Option<DiscardReason> {
        None
    }
}

/// Drop echoes of messages this node sent (multicast loopback).
#[derive(Debug, Clone)]
pub struct OwnMessageFilter {
    sent: Arc<MessageIdBuffer>,
}

impl OwnMessageFilter {
    pub fn new(sent: Arc<MessageIdBuffer>) -> Self {
        Self { sent }
    }
}

impl DiscardPolicy for OwnMessageFilter {
    fn check(&self, header: &Header, _connection: &ConnectionInfo) -> Option<DiscardReason> {
        let id = header.message_id.as_deref()?;
        self.sent.contains(id).then_some(DiscardReason::OwnMessage)
    }
}

/// Drop messages whose MessageID was already received.
#[derive(Debug)]
pub struct DuplicateMessageFilter {
    seen: MessageIdBuffer,
}

impl DuplicateMessageFilter {
    pub fn new(capacity: usize) -> Self {
        Self {
            seen: MessageIdBuffer::new(capacity),
        }
    }
}

impl DiscardPolicy for DuplicateMessageFilter {
    fn check(&self, header: &Header, _connection: &ConnectionInfo) -> Option<DiscardReason> {
        let id = header.message_id.as_deref()?;
        self.seen
            .contains_or_enqueue(id)
            .then_some(DiscardReason::Duplicate)
    }
}

/// Drop discovery messages older than what the sender already delivered.
///
/// Trackers are keyed by transport source address; messages without one are
/// not judged.
#[derive(Debug, Clone)]
pub struct AppSequenceFilter {
    trackers: Arc<AppSequenceTrackers>,
}

impl AppSequenceFilter {
    pub fn new(trackers: Arc<AppSequenceTrackers>) -> Self {
        Self { trackers }
    }

    pub fn trackers(&self) -> &Arc<AppSequenceTrackers> {
        &self.trackers
    }
}

impl DiscardPolicy for AppSequenceFilter {
    fn check(&self, header: &Header, connection: &ConnectionInfo) -> Option<DiscardReason> {
        let app_sequence = header.app_sequence.as_ref()?;
        let Some(source) = connection.source_address.as_deref() else {
            log::debug!("[discard] AppSequence without source address, not judged");
            return None;
        };
        (!self.trackers.check_and_update(source, Some(app_sequence)))
            .then_some(DiscardReason::OutdatedAppSequence)
    }
}

/// Run policies in order; the first reason wins.
#[derive(Default)]
pub struct CompositePolicy {
    policies: Vec<Box<dyn DiscardPolicy>>,
}

impl CompositePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, policy: impl DiscardPolicy + 'static) -> Self {
        self.policies.push(Box::new(policy));
        self
    }

    pub fn push(&mut self, policy: Box<dyn DiscardPolicy>) {
        self.policies.push(policy);
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

impl DiscardPolicy for CompositePolicy {
    fn check(&self, header: &Header, connection: &ConnectionInfo) -> Option<DiscardReason> {
        self.policies
            .iter()
            .find_map(|policy| policy.check(header, connection))
    }
}

impl std::fmt::Debug for CompositePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositePolicy")
            .field("policies", &self.policies.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AppSequence;
    use crate::protocol::ProtocolVersion;

    fn header(id: &str) -> Header {
        Header::new(ProtocolVersion::Dpws2009, "urn:action").with_message_id(id)
    }

    #[test]
    fn test_own_message_filter() {
        let sent = Arc::new(MessageIdBuffer::new(8));
        sent.contains_or_enqueue("urn:uuid:mine");
        let policy = OwnMessageFilter::new(sent);
        let conn = ConnectionInfo::inbound("10.0.0.1");
        assert_eq!(
            policy.check(&header("urn:uuid:mine"), &conn),
            Some(DiscardReason::OwnMessage)
        );
        assert_eq!(policy.check(&header("urn:uuid:other"), &conn), None);
    }

    #[test]
    fn test_duplicate_filter_second_copy_only() {
        let policy = DuplicateMessageFilter::new(8);
        let conn = ConnectionInfo::default();
        assert_eq!(policy.check(&header("urn:uuid:1"), &conn), None);
        assert_eq!(
            policy.check(&header("urn:uuid:1"), &conn),
            Some(DiscardReason::Duplicate)
        );
    }

    #[test]
    fn test_app_sequence_filter_keys_by_source() {
        let policy = AppSequenceFilter::new(Arc::new(AppSequenceTrackers::new(4)));
        let a = ConnectionInfo::inbound("10.0.0.1");
        let b = ConnectionInfo::inbound("10.0.0.2");
        let h = header("urn:uuid:1").with_app_sequence(AppSequence::new(1, 3));
        assert_eq!(policy.check(&h, &a), None);
        assert_eq!(policy.check(&h, &b), None);
        assert_eq!(
            policy.check(&h, &a),
            Some(DiscardReason::OutdatedAppSequence)
        );
    }

    #[test]
    fn test_composite_first_reason_wins() {
        let sent = Arc::new(MessageIdBuffer::new(8));
        sent.contains_or_enqueue("urn:uuid:1");
        let policy = CompositePolicy::new()
            .with(OwnMessageFilter::new(sent))
            .with(DuplicateMessageFilter::new(8));
        let conn = ConnectionInfo::default();
        assert_eq!(
            policy.check(&header("urn:uuid:1"), &conn),
            Some(DiscardReason::OwnMessage)
        );
    }

    #[test]
    fn test_closure_policy() {
        let policy = |h: &Header, _: &ConnectionInfo| {
            h.to.is_none()
                .then(|| DiscardReason::NotRelevant("no destination".into()))
        };
        assert!(matches!(
            policy.check(&header("x"), &ConnectionInfo::default()),
            Some(DiscardReason::NotRelevant(_))
        ));
    }
}
