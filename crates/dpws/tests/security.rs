// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test code readability over pedantic
#![allow(clippy::missing_panics_doc)] // Tests panic on failure

//! Compact signatures through a pluggable security hook.

use dpws::codec::{AcceptAll, CodecEnvironment, ConnectionInfo, DecodeError, Decoder, Encoder};
use dpws::model::{DiscoveryData, EndpointReference, Hello, Message, MessageBody, Probe};
use dpws::protocol::ProtocolVersion;
use dpws::security::{SecurityError, SecurityHook, SignatureCheck};
use parking_lot::Mutex;
use std::borrow::Cow;
use std::sync::Arc;

/// FNV-1a over the signed bytes, keyed by a shared salt.
struct ChecksumHook {
    salt: u64,
    /// Candidate addresses seen by the last validation.
    last_candidates: Mutex<Vec<String>>,
}

impl ChecksumHook {
    fn new(salt: u64) -> Arc<Self> {
        Arc::new(Self {
            salt,
            last_candidates: Mutex::new(Vec::new()),
        })
    }

    fn digest(&self, part: &[u8]) -> String {
        let mut hash = 0xcbf2_9ce4_8422_2325u64 ^ self.salt;
        for byte in part {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        format!("{:016x}", hash)
    }
}

impl SecurityHook for ChecksumHook {
    fn scheme(&self) -> &str {
        "urn:example:fnv1a"
    }

    fn sign(&self, part: &[u8]) -> Result<String, SecurityError> {
        Ok(self.digest(part))
    }

    fn validate(&self, check: &SignatureCheck<'_>) -> bool {
        *self.last_candidates.lock() = check.candidate_addresses.to_vec();
        check.signature == self.digest(check.signed_part)
    }
}

/// Strips a fixed framing prefix before parsing.
struct FramedHook;

impl SecurityHook for FramedHook {
    fn scheme(&self) -> &str {
        "urn:example:framed"
    }

    fn sign(&self, _part: &[u8]) -> Result<String, SecurityError> {
        Err(SecurityError::SigningFailed("no key".into()))
    }

    fn validate(&self, _check: &SignatureCheck<'_>) -> bool {
        false
    }

    fn wrap_input<'a>(&self, input: &'a [u8]) -> Result<Cow<'a, [u8]>, SecurityError> {
        input
            .strip_prefix(b"FRAME:")
            .map(Cow::Borrowed)
            .ok_or_else(|| SecurityError::InvalidInput("missing frame header".into()))
    }
}

fn secure_hello() -> Message {
    let mut message = Message::from_body(
        ProtocolVersion::Dpws2009,
        MessageBody::Hello(Hello {
            data: DiscoveryData::new(EndpointReference::new("urn:uuid:device"))
                .with_xaddrs(vec!["http://192.168.1.20:5357/device".into()])
                .with_metadata_version(1),
        }),
    );
    message.header.message_id = Some("urn:uuid:secure-hello".into());
    message.header = message.header.secure();
    message
}

fn encode(env: &CodecEnvironment, message: &Message) -> Vec<u8> {
    Encoder::new(8192)
        .encode(message, &ConnectionInfo::outbound(), env)
        .unwrap()
        .to_vec()
}

fn decode(env: &CodecEnvironment, bytes: &[u8]) -> Result<Message, DecodeError> {
    Decoder::new().decode(bytes, &ConnectionInfo::inbound("192.168.1.20"), env, &AcceptAll)
}

#[test]
fn test_signed_hello_validates() {
    let hook = ChecksumHook::new(7);
    let env = CodecEnvironment::builder().security(hook.clone()).build();
    let bytes = encode(&env, &secure_hello());
    let xml = String::from_utf8(bytes.clone()).unwrap();
    assert!(xml.contains("Scheme=\"urn:example:fnv1a\""));
    assert!(xml.find("</s12:Body>").unwrap() < xml.find(":Security>").unwrap());

    let decoded = decode(&env, &bytes).unwrap();
    assert!(decoded.header.secure);
    assert!(decoded.header.signature.is_some());
    assert_eq!(
        *hook.last_candidates.lock(),
        vec![
            "http://192.168.1.20:5357/device".to_string(),
            "192.168.1.20".to_string()
        ]
    );
}

#[test]
fn test_tampered_body_rejected() {
    let env = CodecEnvironment::builder()
        .security(ChecksumHook::new(7))
        .build();
    let xml = String::from_utf8(encode(&env, &secure_hello())).unwrap();
    let tampered = xml.replace(
        "<wsd:MetadataVersion>1</wsd:MetadataVersion>",
        "<wsd:MetadataVersion>2</wsd:MetadataVersion>",
    );
    assert_ne!(xml, tampered);
    assert_eq!(
        decode(&env, tampered.as_bytes()).unwrap_err(),
        DecodeError::InvalidSignature
    );
}

#[test]
fn test_wrong_key_rejected() {
    let sender = CodecEnvironment::builder()
        .security(ChecksumHook::new(1))
        .build();
    let receiver = CodecEnvironment::builder()
        .security(ChecksumHook::new(2))
        .build();
    let bytes = encode(&sender, &secure_hello());
    assert_eq!(decode(&receiver, &bytes).unwrap_err(), DecodeError::InvalidSignature);
}

#[test]
fn test_no_hook_means_no_signature() {
    let env = CodecEnvironment::default();
    let bytes = encode(&env, &secure_hello());
    assert!(!String::from_utf8_lossy(&bytes).contains("Security"));
    let decoded = decode(&env, &bytes).unwrap();
    assert!(!decoded.header.secure);
    assert!(decoded.header.signature.is_none());
}

#[test]
fn test_signature_ignored_without_hook() {
    let signer = CodecEnvironment::builder()
        .security(ChecksumHook::new(7))
        .build();
    let bytes = encode(&signer, &secure_hello());
    let decoded = decode(&CodecEnvironment::default(), &bytes).unwrap();
    assert!(!decoded.header.secure);
    assert!(matches!(decoded.body, MessageBody::Hello(_)));
}

#[test]
fn test_unsignable_kind_not_signed() {
    let env = CodecEnvironment::builder()
        .security(ChecksumHook::new(7))
        .build();
    let mut probe = Message::from_body(ProtocolVersion::Dpws2009, MessageBody::Probe(Probe::default()));
    probe.header = probe.header.secure();
    let bytes = encode(&env, &probe);
    assert!(!String::from_utf8_lossy(&bytes).contains("Security"));
}

#[test]
fn test_wrap_input_applied_before_parsing() {
    let plain = CodecEnvironment::default();
    let mut probe = Message::from_body(ProtocolVersion::Dpws2009, MessageBody::Probe(Probe::default()));
    probe.header.message_id = Some("urn:uuid:framed".into());
    let mut framed = b"FRAME:".to_vec();
    framed.extend_from_slice(&encode(&plain, &probe));

    let env = CodecEnvironment::builder().security(Arc::new(FramedHook)).build();
    assert_eq!(decode(&env, &framed).unwrap().kind(), probe.kind());
    assert!(matches!(
        decode(&env, b"<s12:Envelope/>"),
        Err(DecodeError::Malformed(_))
    ));
}

#[test]
fn test_signing_failure_surfaces_as_encode_error() {
    let env = CodecEnvironment::builder().security(Arc::new(FramedHook)).build();
    let err = Encoder::new(8192)
        .encode(&secure_hello(), &ConnectionInfo::outbound(), &env)
        .unwrap_err();
    assert!(matches!(err, dpws::EncodeError::Security(_)));
}

#[cfg(feature = "security")]
#[test]
fn test_hmac_hook_end_to_end() {
    use dpws::security::HmacSecurity;

    let hook = Arc::new(HmacSecurity::new(b"shared secret").unwrap());
    let env = CodecEnvironment::builder().security(hook).build();
    let bytes = encode(&env, &secure_hello());
    assert!(decode(&env, &bytes).unwrap().header.secure);
}
