// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! SOAP 1.2 envelope -> Message.
//!
//! # Flow
//!
//! ```text
//! wrap_input -> Envelope (SOAP 1.2 or VersionMismatch)
//!            -> Header   (addressing, AppSequence, Security, unknown)
//!            -> Action present? version resolved? discard policy
//!            -> Body     (action table, else Fault / Invoke)
//!            -> trailing Security block, signature validation
//! ```
//!
//! Every parser consumes its element through the matching end tag, so the
//! reader always sits between siblings when control returns to the caller.
//! The discard policy runs before the body is touched.

mod discovery;
mod eventing;
mod header;
mod invoke;
mod metadata;

use super::{CodecEnvironment, ConnectionInfo, DecodeError, DecodeResult, DiscardPolicy};
use crate::model::{
    EndpointReference, LocalizedString, Message, MessageBody, MessageKind, UnknownContent,
};
use crate::protocol::constants::{
    ACTION, ADDRESS, BODY, ENVELOPE, HEADER, LANG, METADATA, REFERENCE_PARAMETERS, SECURITY,
    SOAP12_NS, XML_NS,
};
use crate::protocol::{ProtocolHelper, ProtocolVersion};
use crate::security::SignatureCheck;
use crate::xml::{ElementReader, StartTag, Tag};
use std::borrow::Cow;

/// Per-call context threaded through the body parsers.
pub(crate) struct DecodeCtx<'a> {
    pub helper: &'static dyn ProtocolHelper,
    pub env: &'a CodecEnvironment,
}

type BodyParser =
    fn(&mut ElementReader<'_>, &DecodeCtx<'_>, &StartTag) -> DecodeResult<MessageBody>;

/// Reusable decoder.
///
/// Holds no parser state between calls; instances exist per thread so the
/// counters stay uncontended.
#[derive(Debug, Default)]
pub struct Decoder {
    decoded: u64,
    failed: u64,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages successfully decoded by this instance.
    pub fn decoded(&self) -> u64 {
        self.decoded
    }

    /// Inputs rejected or discarded by this instance.
    pub fn failed(&self) -> u64 {
        self.failed
    }

    /// Decode one envelope.
    ///
    /// The monitor is told about every accepted message and every discard
    /// (policy or version mismatch); other failures are only returned.
    pub fn decode(
        &mut self,
        input: &[u8],
        connection: &ConnectionInfo,
        env: &CodecEnvironment,
        policy: &dyn DiscardPolicy,
    ) -> DecodeResult<Message> {
        match decode_message(input, connection, env, policy) {
            Ok(message) => {
                self.decoded += 1;
                log::debug!(
                    "[decode] {} from {}",
                    message.kind(),
                    connection.source_address.as_deref().unwrap_or("-")
                );
                env.monitor.received(&message, connection);
                Ok(message)
            }
            Err(err) => {
                self.failed += 1;
                match err.discard_reason() {
                    Some(reason) => {
                        log::info!("[decode] discarded: {}", reason);
                        env.monitor.discarded(&reason, connection);
                    }
                    None => log::debug!("[decode] failed: {}", err),
                }
                Err(err)
            }
        }
    }
}

fn decode_message(
    input: &[u8],
    connection: &ConnectionInfo,
    env: &CodecEnvironment,
    policy: &dyn DiscardPolicy,
) -> DecodeResult<Message> {
    let input: Cow<'_, [u8]> = match env.security.as_deref() {
        Some(hook) => hook
            .wrap_input(input)
            .map_err(|err| DecodeError::Malformed(err.to_string()))?,
        None => Cow::Borrowed(input),
    };
    let mut r = ElementReader::new(&input);

    let envelope = match r.next_tag()? {
        Tag::Start(start) => start,
        Tag::End { .. } => return Err(DecodeError::Malformed("no root element".into())),
    };
    if envelope.name.local == ENVELOPE && envelope.name.namespace != SOAP12_NS {
        log::info!("[decode] envelope namespace {} is not SOAP 1.2", envelope.name.namespace);
        return Err(DecodeError::VersionMismatch {
            namespace: envelope.name.namespace,
        });
    }
    if !envelope.is(SOAP12_NS, ENVELOPE) {
        return Err(DecodeError::unexpected(&envelope.name, "s12:Envelope"));
    }

    let mut child = r.next_child()?;
    let mut parsed = match child.take() {
        Some(start) if start.is(SOAP12_NS, HEADER) => {
            let parsed = header::parse_header(&mut r, env, &start)?;
            child = r.next_child()?;
            parsed
        }
        other => {
            child = other;
            header::ParsedHeader::default()
        }
    };

    let version = resolve_version(parsed.detected, connection, env)?;
    let helper = version.helper();
    let mut header = parsed.header;
    header.version = version;
    if header.action.is_empty() {
        return Err(DecodeError::missing(helper.addressing_namespace(), ACTION));
    }

    if let Some(reason) = policy.check(&header, connection) {
        return Err(DecodeError::Discarded(reason));
    }

    let body_tag = match child {
        Some(start) if start.is(SOAP12_NS, BODY) => start,
        Some(start) => return Err(DecodeError::unexpected(&start.name, "s12:Body")),
        None => return Err(DecodeError::missing(SOAP12_NS, BODY)),
    };
    let cx = DecodeCtx { helper, env };

    let body = match helper.kind_for_action(&header.action) {
        Some(kind) => {
            let kind = disambiguate(kind, header.relates_to.as_deref(), env);
            match body_parser(kind) {
                Some(parse) => parse(&mut r, &cx, &body_tag)?,
                None => invoke::parse_application(&mut r, &cx, &body_tag, &header)?,
            }
        }
        None => {
            log::debug!(
                "[decode] action {} not in the protocol table, decoding as application message",
                header.action
            );
            invoke::parse_application(&mut r, &cx, &body_tag, &header)?
        }
    };
    let body_end = r.position();

    // Compact signature block may also follow the Body.
    while let Some(start) = r.next_child()? {
        if is_security_block(&start) && env.security.is_some() {
            parsed.signature = header::parse_security(&mut r)?.or(parsed.signature);
        } else {
            log::debug!("[decode] skipping {} after Body", start.name);
            r.skip()?;
        }
    }

    let mut message = Message::new(header, body);
    if let Some(signature) = parsed.signature {
        let signed_part = input
            .get(body_tag.offset..body_end)
            .ok_or_else(|| DecodeError::Malformed("body range out of bounds".into()))?;
        verify_signature(&mut message, signature, signed_part, connection, env)?;
    }
    if let (MessageBody::GetMetadataResponse(_), Some(id)) =
        (&message.body, message.header.relates_to.as_deref())
    {
        env.pending_metadata.take(id);
    }
    Ok(message)
}

/// Detected namespace wins; a context naming a different version is a mismatch.
fn resolve_version(
    detected: Option<ProtocolVersion>,
    connection: &ConnectionInfo,
    env: &CodecEnvironment,
) -> DecodeResult<ProtocolVersion> {
    match (detected, connection.version) {
        (Some(found), Some(expected)) if found != expected => {
            log::info!("[decode] {} message on a {} connection", found, expected);
            Err(DecodeError::VersionMismatch {
                namespace: found.helper().addressing_namespace().to_string(),
            })
        }
        (Some(found), _) => Ok(found),
        (None, Some(expected)) => Ok(expected),
        (None, None) => Ok(env.config.default_version),
    }
}

/// GetResponse and GetMetadataResponse both carry `mex:Metadata`; a reply to
/// a pending GetMetadata request is a GetMetadataResponse whatever the action.
/// The pending id is only consumed once the whole message decoded.
fn disambiguate(kind: MessageKind, relates_to: Option<&str>, env: &CodecEnvironment) -> MessageKind {
    match kind {
        MessageKind::GetResponse | MessageKind::GetMetadataResponse => {
            let pending = relates_to.is_some_and(|id| env.pending_metadata.contains(id));
            if pending {
                MessageKind::GetMetadataResponse
            } else {
                kind
            }
        }
        other => other,
    }
}

fn body_parser(kind: MessageKind) -> Option<BodyParser> {
    let parser: BodyParser = match kind {
        MessageKind::Hello => discovery::parse_hello,
        MessageKind::Bye => discovery::parse_bye,
        MessageKind::Probe => discovery::parse_probe,
        MessageKind::ProbeMatches => discovery::parse_probe_matches,
        MessageKind::Resolve => discovery::parse_resolve,
        MessageKind::ResolveMatches => discovery::parse_resolve_matches,
        MessageKind::Subscribe => eventing::parse_subscribe,
        MessageKind::SubscribeResponse => eventing::parse_subscribe_response,
        MessageKind::Renew => eventing::parse_renew,
        MessageKind::RenewResponse => eventing::parse_renew_response,
        MessageKind::GetStatus => eventing::parse_get_status,
        MessageKind::GetStatusResponse => eventing::parse_get_status_response,
        MessageKind::Unsubscribe => eventing::parse_unsubscribe,
        MessageKind::UnsubscribeResponse => eventing::parse_unsubscribe_response,
        MessageKind::SubscriptionEnd => eventing::parse_subscription_end,
        MessageKind::Get => metadata::parse_get,
        MessageKind::GetResponse => metadata::parse_get_response,
        MessageKind::GetMetadata => metadata::parse_get_metadata,
        MessageKind::GetMetadataResponse => metadata::parse_get_metadata_response,
        MessageKind::Invoke | MessageKind::Fault => return None,
    };
    Some(parser)
}

fn is_security_block(start: &StartTag) -> bool {
    start.name.local == SECURITY
        && ProtocolVersion::from_dpws_namespace(&start.name.namespace).is_some()
}

fn verify_signature(
    message: &mut Message,
    signature: String,
    signed_part: &[u8],
    connection: &ConnectionInfo,
    env: &CodecEnvironment,
) -> DecodeResult<()> {
    let Some(hook) = env.security.as_deref() else {
        return Ok(());
    };
    if !message.kind().is_signable() {
        log::debug!("[decode] ignoring signature on {}", message.kind());
        return Ok(());
    }
    let Some((endpoint, mut candidates)) = signed_endpoint(&message.body) else {
        return Ok(());
    };
    if let Some(source) = &connection.source_address {
        candidates.push(source.clone());
    }
    let check = SignatureCheck {
        signature: &signature,
        signed_part,
        connection,
        endpoint,
        candidate_addresses: &candidates,
    };
    if !hook.validate(&check) {
        log::warn!("[decode] signature of {} from {} rejected", message.kind(), endpoint.address);
        return Err(DecodeError::InvalidSignature);
    }
    message.header.signature = Some(signature);
    message.header.secure = true;
    Ok(())
}

/// Endpoint a discovery signature is checked against, with its XAddrs.
fn signed_endpoint(body: &MessageBody) -> Option<(&EndpointReference, Vec<String>)> {
    let data = match body {
        MessageBody::Hello(hello) => &hello.data,
        MessageBody::Bye(bye) => &bye.data,
        MessageBody::ProbeMatches(matches) => matches.matches.first()?,
        MessageBody::ResolveMatches(matches) => matches.resolve_match.as_ref()?,
        _ => return None,
    };
    Some((&data.endpoint_reference, data.xaddrs.clone().unwrap_or_default()))
}

// =======================================================================
// Shared element parsers
// =======================================================================

/// Copy attributes not in `known` (plus every namespaced one) into the bag.
pub(crate) fn take_attributes(start: &StartTag, known: &[&str], unknown: &mut UnknownContent) {
    for (name, value) in start.other_attributes(known) {
        unknown.add_attribute(name.clone(), value.clone());
    }
}

/// Capture an unrecognized element through the handler chain.
pub(crate) fn capture_unknown(
    r: &mut ElementReader<'_>,
    env: &CodecEnvironment,
    start: StartTag,
    unknown: &mut UnknownContent,
) -> DecodeResult<()> {
    let raw = r.capture(start)?;
    let name = raw.name.clone();
    match env.handlers.capture(raw) {
        Some(element) => unknown.add_element(element),
        None => log::debug!("[decode] handler skipped {}", name),
    }
    Ok(())
}

/// Capture every remaining child of the current element.
pub(crate) fn capture_remaining(
    r: &mut ElementReader<'_>,
    env: &CodecEnvironment,
    unknown: &mut UnknownContent,
) -> DecodeResult<()> {
    while let Some(child) = r.next_child()? {
        capture_unknown(r, env, child, unknown)?;
    }
    Ok(())
}

/// Consume the rest of `s12:Body` after its payload element.
pub(crate) fn finish_body(r: &mut ElementReader<'_>) -> DecodeResult<()> {
    while let Some(extra) = r.next_child()? {
        log::debug!("[decode] ignoring extra body element {}", extra.name);
        r.skip()?;
    }
    Ok(())
}

/// Endpoint reference in addressing namespace `wsa`.
pub(crate) fn parse_epr(
    r: &mut ElementReader<'_>,
    env: &CodecEnvironment,
    wsa: &str,
    start: &StartTag,
) -> DecodeResult<EndpointReference> {
    let mut epr = EndpointReference::default();
    take_attributes(start, &[], &mut epr.unknown);
    let mut address = None;
    while let Some(child) = r.next_child()? {
        if child.is(wsa, ADDRESS) {
            address = Some(r.next_trimmed()?);
        } else if child.is(wsa, REFERENCE_PARAMETERS) {
            while let Some(parameter) = r.next_child()? {
                epr.reference_parameters.push(r.capture(parameter)?);
            }
        } else if child.is(wsa, METADATA) {
            while let Some(element) = r.next_child()? {
                epr.metadata.push(r.capture(element)?);
            }
        } else {
            capture_unknown(r, env, child, &mut epr.unknown)?;
        }
    }
    epr.address = address.ok_or_else(|| DecodeError::missing(wsa, ADDRESS))?;
    Ok(epr)
}

pub(crate) fn parse_localized(
    r: &mut ElementReader<'_>,
    start: &StartTag,
) -> DecodeResult<LocalizedString> {
    Ok(LocalizedString {
        lang: start.attribute(XML_NS, LANG).map(str::to_string),
        value: r.next_text()?,
    })
}

pub(crate) fn parse_u64(element: &str, text: &str) -> DecodeResult<u64> {
    text.trim().parse().map_err(|_| DecodeError::InvalidValue {
        element: element.to_string(),
        value: text.to_string(),
    })
}

pub(crate) fn split_list(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{AcceptAll, Encoder};
    use crate::model::{DiscoveryData, Hello, Probe};

    fn decode(xml: &str) -> DecodeResult<Message> {
        let env = CodecEnvironment::default();
        Decoder::new().decode(xml.as_bytes(), &ConnectionInfo::inbound("10.0.0.9"), &env, &AcceptAll)
    }

    const PROBE_2009: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<s12:Envelope xmlns:s12="http://www.w3.org/2003/05/soap-envelope"
    xmlns:wsa="http://www.w3.org/2005/08/addressing"
    xmlns:wsd="http://docs.oasis-open.org/ws-dd/ns/discovery/2009/01"
    xmlns:dpws="http://docs.oasis-open.org/ws-dd/ns/dpws/2009/01">
  <s12:Header>
    <wsa:Action>http://docs.oasis-open.org/ws-dd/ns/discovery/2009/01/Probe</wsa:Action>
    <wsa:MessageID>urn:uuid:0a6dc791-2be6-4991-9af1-454778a1917a</wsa:MessageID>
    <wsa:To>urn:docs-oasis-open-org:ws-dd:ns:discovery:2009:01</wsa:To>
  </s12:Header>
  <s12:Body>
    <wsd:Probe><wsd:Types>dpws:Device</wsd:Types></wsd:Probe>
  </s12:Body>
</s12:Envelope>"#;

    #[test]
    fn test_decode_probe() {
        let message = decode(PROBE_2009).unwrap();
        assert_eq!(message.kind(), MessageKind::Probe);
        assert_eq!(message.version(), ProtocolVersion::Dpws2009);
        assert_eq!(
            message.header.message_id.as_deref(),
            Some("urn:uuid:0a6dc791-2be6-4991-9af1-454778a1917a")
        );
        let MessageBody::Probe(probe) = &message.body else {
            panic!("expected probe");
        };
        let types = probe.types.as_ref().unwrap();
        assert_eq!(types[0].namespace, "http://docs.oasis-open.org/ws-dd/ns/dpws/2009/01");
        assert_eq!(types[0].local, "Device");
    }

    #[test]
    fn test_soap11_envelope_is_version_mismatch() {
        let xml = r#"<e:Envelope xmlns:e="http://schemas.xmlsoap.org/soap/envelope/"><e:Body/></e:Envelope>"#;
        let err = decode(xml).unwrap_err();
        assert!(matches!(err, DecodeError::VersionMismatch { .. }));
        assert!(err.is_discard());
    }

    #[test]
    fn test_missing_action() {
        let xml = r#"<s12:Envelope xmlns:s12="http://www.w3.org/2003/05/soap-envelope"
            xmlns:wsa="http://www.w3.org/2005/08/addressing">
            <s12:Header><wsa:MessageID>urn:uuid:1</wsa:MessageID></s12:Header><s12:Body/></s12:Envelope>"#;
        match decode(xml) {
            Err(DecodeError::MissingElement { expected }) => assert_eq!(expected.local, "Action"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_policy_runs_before_body() {
        // The body is garbage for a Probe; a discard must win anyway.
        let xml = PROBE_2009.replace("<wsd:Probe><wsd:Types>dpws:Device</wsd:Types></wsd:Probe>", "<x/>");
        let env = CodecEnvironment::default();
        let policy = |_: &crate::model::Header, _: &ConnectionInfo| {
            Some(crate::codec::DiscardReason::NotRelevant("test".into()))
        };
        let err = Decoder::new()
            .decode(xml.as_bytes(), &ConnectionInfo::default(), &env, &policy)
            .unwrap_err();
        assert!(matches!(err, DecodeError::Discarded(_)));
    }

    #[test]
    fn test_connection_version_conflict() {
        let env = CodecEnvironment::default();
        let conn = ConnectionInfo::inbound("10.0.0.9").with_version(ProtocolVersion::Dpws2006);
        let err = Decoder::new()
            .decode(PROBE_2009.as_bytes(), &conn, &env, &AcceptAll)
            .unwrap_err();
        assert!(matches!(err, DecodeError::VersionMismatch { .. }));
    }

    #[test]
    fn test_decoder_counts() {
        let env = CodecEnvironment::default();
        let mut decoder = Decoder::new();
        let conn = ConnectionInfo::default();
        decoder.decode(PROBE_2009.as_bytes(), &conn, &env, &AcceptAll).unwrap();
        let _ = decoder.decode(b"<broken", &conn, &env, &AcceptAll);
        assert_eq!(decoder.decoded(), 1);
        assert_eq!(decoder.failed(), 1);
    }

    #[test]
    fn test_hello_round_trip() {
        let env = CodecEnvironment::default();
        let mut msg = Message::from_body(
            ProtocolVersion::Dpws2006,
            MessageBody::Hello(Hello {
                data: DiscoveryData::new(EndpointReference::new("urn:uuid:dev"))
                    .with_xaddrs(vec!["http://10.0.0.1:5357/dev".into()])
                    .with_metadata_version(3),
            }),
        );
        msg.header.message_id = Some("urn:uuid:hello".into());
        let mut encoder = Encoder::new(4096);
        let bytes = encoder
            .encode(&msg, &ConnectionInfo::outbound(), &env)
            .unwrap()
            .to_vec();
        let decoded = Decoder::new()
            .decode(&bytes, &ConnectionInfo::default(), &env, &AcceptAll)
            .unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_unknown_probe_child_captured() {
        let xml = PROBE_2009.replace(
            "<wsd:Types>dpws:Device</wsd:Types>",
            "<x:Hint xmlns:x=\"urn:x\" level=\"2\">fast</x:Hint>",
        );
        let message = decode(&xml).unwrap();
        let MessageBody::Probe(Probe { unknown, types, .. }) = &message.body else {
            panic!("expected probe");
        };
        assert!(types.is_none());
        let raw = unknown.elements[0].as_raw().unwrap();
        assert!(raw.name.is("urn:x", "Hint"));
        assert_eq!(raw.text_content().as_deref(), Some("fast"));
    }
}
