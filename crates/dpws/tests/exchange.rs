// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test code readability over pedantic
#![allow(clippy::missing_panics_doc)] // Tests panic on failure

//! Client/device exchanges between two independent codec pools.

use dpws::codec::{CodecPool, ConnectionInfo, DecodeError, EncodeError, Encoder, MonitorStats};
use dpws::model::{
    Chunk, Delivery, DiscoveryData, EmptyBody, EndpointReference, ExpiresBody, GetMetadata,
    GetMetadataResponse, Message, MessageBody, MessageKind, MetadataSection, Probe, ProbeMatches,
    QualifiedName, RawElement, SectionContent, Subscribe, SubscribeResponse,
};
use dpws::protocol::constants::{DPWS_2009_NS, WSDL_DIALECT};
use dpws::protocol::ProtocolVersion;
use dpws::{CodecConfig, CodecEnvironment};
use std::sync::Arc;

const CLIENT: &str = "192.168.1.30";
const DEVICE: &str = "192.168.1.20";

fn message(version: ProtocolVersion, body: MessageBody, id: &str) -> Message {
    let mut message = Message::from_body(version, body);
    message.header.message_id = Some(format!("urn:uuid:{}", id));
    message
}

/// Reply addressed back to the sender of `request`.
fn reply_to(request: &Message, body: MessageBody, id: &str) -> Message {
    let mut reply = message(request.version(), body, id);
    reply.header.relates_to = request.header.message_id.clone();
    reply
}

fn exchange(from: &CodecPool, to: &CodecPool, message: &Message, source: &str) -> Message {
    let bytes = from.encode(message, &ConnectionInfo::outbound()).unwrap();
    to.decode(&bytes, &ConnectionInfo::inbound(source)).unwrap()
}

/// Opaque subscription token with nested, namespaced markup.
fn token(version: ProtocolVersion) -> RawElement {
    let wse = version.helper().eventing_namespace();
    RawElement {
        name: QualifiedName::new("urn:example:subs", "Token"),
        attributes: vec![(QualifiedName::new("urn:example:subs", "scheme"), "v2".into())],
        content: vec![
            Chunk::Markup("<".into()),
            Chunk::Namespace(wse.into()),
            Chunk::Markup(":Identifier>urn:uuid:sub-42</".into()),
            Chunk::Namespace(wse.into()),
            Chunk::Markup(":Identifier><".into()),
            Chunk::Namespace("urn:example:subs".into()),
            Chunk::Markup(":Epoch a=\"1 &amp; 2\">3</".into()),
            Chunk::Namespace("urn:example:subs".into()),
            Chunk::Markup(":Epoch>".into()),
        ],
        namespaces: Vec::new(),
    }
}

#[test]
fn test_discovery_query_then_matches() {
    let client = CodecPool::default();
    let device = CodecPool::default();

    let probe = message(
        ProtocolVersion::Dpws2009,
        MessageBody::Probe(Probe {
            types: Some(vec![QualifiedName::new(DPWS_2009_NS, "Device")]),
            ..Probe::default()
        }),
        "probe",
    );
    let received = exchange(&client, &device, &probe, CLIENT);
    let MessageBody::Probe(Probe { types: Some(types), .. }) = &received.body else {
        panic!("expected a typed probe");
    };
    assert_eq!(types[0], QualifiedName::new(DPWS_2009_NS, "Device"));

    let matches = reply_to(
        &received,
        MessageBody::ProbeMatches(ProbeMatches {
            matches: vec![DiscoveryData::new(EndpointReference::new("urn:uuid:device"))
                .with_types(types.clone())
                .with_xaddrs(vec![format!("http://{}:5357/device", DEVICE)])
                .with_metadata_version(1)],
            ..ProbeMatches::default()
        }),
        "probe-matches",
    );
    let answer = exchange(&device, &client, &matches, DEVICE);
    assert_eq!(answer.kind(), MessageKind::ProbeMatches);
    assert_eq!(answer.header.relates_to.as_deref(), Some("urn:uuid:probe"));
    assert_eq!(answer.body, matches.body);
}

#[test]
fn test_subscription_token_returned_verbatim_2009() {
    let version = ProtocolVersion::Dpws2009;
    let client = CodecPool::default();
    let device = CodecPool::default();

    let manager = EndpointReference::new(format!("http://{}:5357/subscriptions", DEVICE))
        .with_reference_parameter(token(version));
    let response = message(
        version,
        MessageBody::SubscribeResponse(SubscribeResponse {
            subscription_manager: manager,
            expires: Some("PT1H".into()),
            ..SubscribeResponse::default()
        }),
        "subscribe-response",
    );
    let received = exchange(&device, &client, &response, DEVICE);
    let MessageBody::SubscribeResponse(response) = received.body else {
        panic!("expected SubscribeResponse");
    };
    assert_eq!(response.subscription_manager.reference_parameters, vec![token(version)]);

    let mut renew = message(
        version,
        MessageBody::Renew(ExpiresBody {
            expires: Some("PT1H".into()),
            ..ExpiresBody::default()
        }),
        "renew",
    );
    renew.header = renew.header.target(&response.subscription_manager);
    let at_device = exchange(&client, &device, &renew, CLIENT);
    assert_eq!(
        at_device.header.to.as_deref(),
        Some(response.subscription_manager.address.as_str())
    );
    assert_eq!(at_device.header.reference_parameters, vec![token(version)]);
    assert!(at_device.header.unknown.is_empty());
}

#[test]
fn test_reference_parameters_unmarked_in_2006() {
    let version = ProtocolVersion::Dpws2006;
    let client = CodecPool::default();
    let device = CodecPool::default();

    let manager = EndpointReference::new(format!("http://{}:5357/subscriptions", DEVICE))
        .with_reference_parameter(token(version));
    let mut unsubscribe = message(version, MessageBody::Unsubscribe(EmptyBody::default()), "unsub");
    unsubscribe.header = unsubscribe.header.target(&manager);

    let bytes = client.encode(&unsubscribe, &ConnectionInfo::outbound()).unwrap();
    assert!(!String::from_utf8_lossy(&bytes).contains("IsReferenceParameter"));

    let at_device = device.decode(&bytes, &ConnectionInfo::inbound(CLIENT)).unwrap();
    assert!(at_device.header.reference_parameters.is_empty());
    let captured = at_device.header.unknown.elements[0].as_raw().unwrap();
    assert_eq!(captured, &token(version));
}

#[test]
fn test_relative_notify_to_resolved_against_local_binding() {
    let client = CodecPool::default();
    let device = CodecPool::default();
    let subscribe = message(
        ProtocolVersion::Dpws2009,
        MessageBody::Subscribe(Subscribe {
            delivery: Delivery {
                notify_to: EndpointReference::new("/events/sink"),
                identifier: Some("urn:uuid:sink".into()),
                ..Delivery::default()
            },
            ..Subscribe::default()
        }),
        "subscribe",
    );
    let conn = ConnectionInfo::outbound().with_local_binding(format!("http://{}:6000/", CLIENT));
    let bytes = client.encode(&subscribe, &conn).unwrap();
    let at_device = device.decode(&bytes, &ConnectionInfo::inbound(CLIENT)).unwrap();
    let MessageBody::Subscribe(received) = at_device.body else {
        panic!("expected Subscribe");
    };
    assert_eq!(
        received.delivery.notify_to.address,
        format!("http://{}:6000/events/sink", CLIENT)
    );
    assert_eq!(received.delivery.identifier.as_deref(), Some("urn:uuid:sink"));
}

fn subscribe_to(notify_to: EndpointReference, identifier: Option<&str>) -> Message {
    message(
        ProtocolVersion::Dpws2009,
        MessageBody::Subscribe(Subscribe {
            delivery: Delivery {
                notify_to,
                identifier: identifier.map(str::to_string),
                ..Delivery::default()
            },
            expires: Some("PT1H".into()),
            ..Subscribe::default()
        }),
        "subscribe",
    )
}

#[test]
fn test_notify_to_fragment_reserved_for_identifier() {
    let config = CodecConfig::default().with_reference_parameter_mode(false);
    let client = CodecPool::new(config.clone());
    let device = CodecPool::new(config);
    let sink = format!("http://{}:6000/sink", CLIENT);

    let with_fragment = subscribe_to(EndpointReference::new(format!("{}#section", sink)), None);
    match client.encode(&with_fragment, &ConnectionInfo::outbound()) {
        Err(EncodeError::InvalidField { field, .. }) => assert_eq!(field, "NotifyTo"),
        other => panic!("unexpected {:?}", other.map(|b| b.len())),
    }

    // Identifiers may contain '#' themselves: only the first one splits.
    let subscribe = subscribe_to(EndpointReference::new(sink), Some("sub#7"));
    let at_device = exchange(&client, &device, &subscribe, CLIENT);
    assert_eq!(at_device.body, subscribe.body);
}

#[test]
fn test_identifier_reference_parameters_kept_distinct() {
    let client = CodecPool::default();
    let device = CodecPool::default();
    let wse = ProtocolVersion::Dpws2009.helper().eventing_namespace();
    let sink = format!("http://{}:6000/sink", CLIENT);

    // Structured Identifier parameters are opaque and travel untouched.
    let structured = RawElement {
        name: QualifiedName::new(wse, "Identifier"),
        attributes: Vec::new(),
        content: vec![
            Chunk::Markup("<".into()),
            Chunk::Namespace("urn:example:subs".into()),
            Chunk::Markup(":Part>1</".into()),
            Chunk::Namespace("urn:example:subs".into()),
            Chunk::Markup(":Part>".into()),
        ],
        namespaces: Vec::new(),
    };
    let subscribe = subscribe_to(
        EndpointReference::new(sink.clone()).with_reference_parameter(structured),
        Some("urn:uuid:sink"),
    );
    let at_device = exchange(&client, &device, &subscribe, CLIENT);
    assert_eq!(at_device.body, subscribe.body);

    // A plain one would be read back as the identifier.
    let plain = subscribe_to(
        EndpointReference::new(sink).with_reference_parameter(RawElement::with_text(
            QualifiedName::new(wse, "Identifier"),
            "urn:uuid:other",
        )),
        None,
    );
    assert!(matches!(
        client.encode(&plain, &ConnectionInfo::outbound()),
        Err(EncodeError::InvalidField { .. })
    ));
}

#[test]
fn test_get_response_to_pending_get_metadata() {
    let client = CodecPool::default();
    let device = CodecPool::default();

    let request = message(
        ProtocolVersion::Dpws2009,
        MessageBody::GetMetadata(GetMetadata::default()),
        "get-metadata",
    );
    client.encode(&request, &ConnectionInfo::outbound()).unwrap();
    assert_eq!(client.environment().pending_metadata.len(), 1);

    let sections = GetMetadataResponse {
        sections: vec![MetadataSection {
            dialect: WSDL_DIALECT.into(),
            identifier: None,
            content: SectionContent::Location(format!("http://{}:5357/service.wsdl", DEVICE)),
        }],
        ..GetMetadataResponse::default()
    };
    // Some devices answer GetMetadata with the Transfer GetResponse action.
    let mut response = reply_to(
        &request,
        MessageBody::GetMetadataResponse(sections.clone()),
        "response",
    );
    response.header.action = ProtocolVersion::Dpws2009
        .helper()
        .action(MessageKind::GetResponse)
        .unwrap()
        .into();
    let bytes = device.encode(&response, &ConnectionInfo::outbound()).unwrap();

    let decoded = client.decode(&bytes, &ConnectionInfo::inbound(DEVICE)).unwrap();
    assert_eq!(decoded.body, MessageBody::GetMetadataResponse(sections));
    assert!(client.environment().pending_metadata.is_empty());

    // Without a pending request the same payload is device metadata.
    let mut unsolicited = response.clone();
    unsolicited.header.message_id = Some("urn:uuid:unsolicited".into());
    let bytes = device.encode(&unsolicited, &ConnectionInfo::outbound()).unwrap();
    let decoded = client.decode(&bytes, &ConnectionInfo::inbound(DEVICE)).unwrap();
    let MessageBody::GetResponse(metadata) = decoded.body else {
        panic!("expected GetResponse");
    };
    assert!(metadata.this_model.is_none());
    assert_eq!(metadata.other_sections.len(), 1);
}

#[test]
fn test_soap11_envelope_counted_as_version_mismatch() {
    let stats = Arc::new(MonitorStats::new());
    let pool = CodecPool::with_environment(Arc::new(
        CodecEnvironment::builder().monitor(stats.clone()).build(),
    ));
    let xml = r#"<?xml version="1.0"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body><Ping/></soap:Body>
</soap:Envelope>"#;
    let err = pool
        .decode(xml.as_bytes(), &ConnectionInfo::inbound(CLIENT))
        .unwrap_err();
    assert!(matches!(err, DecodeError::VersionMismatch { .. }));
    assert_eq!(stats.version_mismatch_count(), 1);
}

#[test]
fn test_missing_action_and_malformed_input() {
    let pool = CodecPool::default();
    let conn = ConnectionInfo::inbound(CLIENT);
    let no_action = r#"<s12:Envelope xmlns:s12="http://www.w3.org/2003/05/soap-envelope"><s12:Body/></s12:Envelope>"#;
    match pool.decode(no_action.as_bytes(), &conn) {
        Err(DecodeError::MissingElement { expected }) => assert_eq!(expected.local, "Action"),
        other => panic!("unexpected {:?}", other),
    }

    let truncated = r#"<s12:Envelope xmlns:s12="http://www.w3.org/2003/05/soap-envelope"><s12:Header>"#;
    assert!(matches!(
        pool.decode(truncated.as_bytes(), &conn),
        Err(DecodeError::Malformed(_))
    ));
    assert!(!pool
        .decode(truncated.as_bytes(), &conn)
        .unwrap_err()
        .is_discard());
}

#[test]
fn test_encode_buffer_overflow_is_an_error() {
    let env = CodecEnvironment::default();
    let xaddrs = (0..64)
        .map(|i| format!("http://192.168.1.{}:5357/device", i))
        .collect();
    let hello = message(
        ProtocolVersion::Dpws2009,
        MessageBody::Hello(dpws::model::Hello {
            data: DiscoveryData::new(EndpointReference::new("urn:uuid:device")).with_xaddrs(xaddrs),
        }),
        "big-hello",
    );
    let mut encoder = Encoder::new(1024);
    match encoder.encode(&hello, &ConnectionInfo::outbound(), &env) {
        Err(EncodeError::BufferOverflow { capacity }) => assert_eq!(capacity, 1024),
        other => panic!("unexpected {:?}", other.map(<[u8]>::len)),
    }
    assert_eq!(encoder.encoded(), 0);
    // A failed encode records nothing as sent.
    assert!(env.sent_messages.is_empty());
}
