// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test code readability over pedantic
#![allow(clippy::missing_panics_doc)] // Tests panic on failure

//! Inbound filtering: own-message echoes, duplicates and AppSequence order.

use dpws::codec::{
    AcceptAll, CodecEnvironment, CodecPool, ConnectionInfo, DecodeError, DiscardReason,
    MonitorStats,
};
use dpws::dedup::MessageIdBuffer;
use dpws::model::{AppSequence, DiscoveryData, EndpointReference, Hello, Message, MessageBody};
use dpws::protocol::ProtocolVersion;
use dpws::CodecConfig;
use std::sync::Arc;

fn hello(id: &str, app_sequence: Option<AppSequence>) -> Message {
    let mut message = Message::from_body(
        ProtocolVersion::Dpws2009,
        MessageBody::Hello(Hello {
            data: DiscoveryData::new(EndpointReference::new("urn:uuid:device"))
                .with_metadata_version(1),
        }),
    );
    message.header.message_id = Some(id.into());
    message.header.app_sequence = app_sequence;
    message
}

/// Encode on a separate node so nothing is recorded as sent locally.
fn remote_bytes(message: &Message) -> Vec<u8> {
    CodecPool::default()
        .encode(message, &ConnectionInfo::outbound())
        .unwrap()
}

#[test]
fn test_own_message_echo_discarded() {
    let stats = Arc::new(MonitorStats::new());
    let env = CodecEnvironment::builder().monitor(stats.clone()).build();
    let pool = CodecPool::with_environment(Arc::new(env));

    let bytes = pool
        .encode(&hello("urn:uuid:mine", None), &ConnectionInfo::outbound())
        .unwrap();
    let err = pool
        .decode(&bytes, &ConnectionInfo::inbound("239.255.255.250"))
        .unwrap_err();
    assert_eq!(err, DecodeError::Discarded(DiscardReason::OwnMessage));
    assert!(err.is_discard());
    assert_eq!(stats.own_message_count(), 1);
    assert_eq!(stats.received_count(), 0);
}

#[test]
fn test_sent_tracking_can_be_disabled() {
    let config = CodecConfig {
        track_sent_messages: false,
        ..CodecConfig::default()
    };
    let pool = CodecPool::new(config);
    let bytes = pool
        .encode(&hello("urn:uuid:mine", None), &ConnectionInfo::outbound())
        .unwrap();
    assert!(pool.environment().sent_messages.is_empty());
    assert!(pool
        .decode(&bytes, &ConnectionInfo::inbound("192.168.1.20"))
        .is_ok());
}

#[test]
fn test_duplicate_message_id_discarded() {
    let pool = CodecPool::default();
    let bytes = remote_bytes(&hello("urn:uuid:dup", None));
    let conn = ConnectionInfo::inbound("192.168.1.20");
    assert!(pool.decode(&bytes, &conn).is_ok());
    assert_eq!(
        pool.decode(&bytes, &conn).unwrap_err(),
        DecodeError::Discarded(DiscardReason::Duplicate)
    );
}

#[test]
fn test_app_sequence_ordering_per_source() {
    let stats = Arc::new(MonitorStats::new());
    let env = CodecEnvironment::builder().monitor(stats.clone()).build();
    let pool = CodecPool::with_environment(Arc::new(env));
    let device_a = ConnectionInfo::inbound("192.168.1.20");
    let device_b = ConnectionInfo::inbound("192.168.1.21");

    let first = remote_bytes(&hello("urn:uuid:a1", Some(AppSequence::new(100, 5))));
    let newer = remote_bytes(&hello("urn:uuid:a2", Some(AppSequence::new(100, 6))));
    let older = remote_bytes(&hello("urn:uuid:a3", Some(AppSequence::new(100, 4))));
    let restarted = remote_bytes(&hello("urn:uuid:a4", Some(AppSequence::new(101, 1))));
    let stale_instance = remote_bytes(&hello("urn:uuid:a5", Some(AppSequence::new(100, 7))));

    assert!(pool.decode(&first, &device_a).is_ok());
    assert!(pool.decode(&newer, &device_a).is_ok());
    assert_eq!(
        pool.decode(&older, &device_a).unwrap_err(),
        DecodeError::Discarded(DiscardReason::OutdatedAppSequence)
    );
    // A different sender has its own ordering state.
    let other = remote_bytes(&hello("urn:uuid:b1", Some(AppSequence::new(100, 4))));
    assert!(pool.decode(&other, &device_b).is_ok());
    assert!(pool.decode(&restarted, &device_a).is_ok());
    assert_eq!(
        pool.decode(&stale_instance, &device_a).unwrap_err(),
        DecodeError::Discarded(DiscardReason::OutdatedAppSequence)
    );

    assert_eq!(stats.received_count(), 4);
    assert_eq!(stats.discarded_count(), 2);
    assert_eq!(pool.environment().app_sequences.len(), 2);
}

#[test]
fn test_sequence_ids_tracked_independently() {
    let pool = CodecPool::default();
    let conn = ConnectionInfo::inbound("192.168.1.20");
    let seq = |id: &str, n: u64| Some(AppSequence::new(7, n).with_sequence_id(id));

    assert!(pool
        .decode(&remote_bytes(&hello("urn:uuid:s1", seq("urn:seq:a", 3))), &conn)
        .is_ok());
    assert!(pool
        .decode(&remote_bytes(&hello("urn:uuid:s2", seq("urn:seq:b", 1))), &conn)
        .is_ok());
    assert!(pool
        .decode(&remote_bytes(&hello("urn:uuid:s3", seq("urn:seq:a", 2))), &conn)
        .is_err());
    assert!(pool
        .decode(&remote_bytes(&hello("urn:uuid:s4", seq("urn:seq:b", 2))), &conn)
        .is_ok());
}

#[test]
fn test_accept_all_bypasses_environment_policy() {
    let pool = CodecPool::default();
    let bytes = pool
        .encode(&hello("urn:uuid:loop", None), &ConnectionInfo::outbound())
        .unwrap();
    let conn = ConnectionInfo::inbound("192.168.1.20");
    assert!(pool.decode(&bytes, &conn).is_err());
    assert!(pool.decode_with(&bytes, &conn, &AcceptAll).is_ok());
}

#[test]
fn test_custom_policy_closure() {
    let suppress_hello = |header: &dpws::Header, _: &ConnectionInfo| {
        header
            .action
            .ends_with("/Hello")
            .then(|| DiscardReason::NotRelevant("hello suppressed".into()))
    };
    let env = CodecEnvironment::builder()
        .discard_policy(Arc::new(suppress_hello))
        .build();
    let pool = CodecPool::with_environment(Arc::new(env));
    let bytes = remote_bytes(&hello("urn:uuid:h", None));
    match pool.decode(&bytes, &ConnectionInfo::inbound("192.168.1.20")) {
        Err(DecodeError::Discarded(DiscardReason::NotRelevant(why))) => {
            assert_eq!(why, "hello suppressed");
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_message_id_buffer_evicts_oldest() {
    let buffer = MessageIdBuffer::new(3);
    for id in ["a", "b", "c"] {
        assert!(!buffer.contains_or_enqueue(id));
    }
    assert!(buffer.contains_or_enqueue("a"));
    assert!(!buffer.contains_or_enqueue("d"));
    assert_eq!(buffer.len(), 3);
    assert!(!buffer.contains("a"));
    assert!(buffer.contains("b"));
    assert!(buffer.contains("d"));
}

#[test]
fn test_concurrent_duplicates_accepted_once() {
    let pool = CodecPool::default();
    let bytes = remote_bytes(&hello("urn:uuid:race", None));
    let accepted = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let pool = &pool;
                let bytes = &bytes;
                s.spawn(move || {
                    let conn = ConnectionInfo::inbound(format!("192.168.1.{}", 20 + i));
                    pool.decode(bytes, &conn).is_ok()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count()
    });
    assert_eq!(accepted, 1);
    assert_eq!(pool.pooled_decoders(), 8);
}
