// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Message -> SOAP 1.2 envelope.
//!
//! ```text
//! <?xml ...?>                                  (streaming mode only)
//! <s12:Envelope xmlns:...>                     all prefixes declared here
//!   <s12:Header>
//!     Action MessageID? RelatesTo? ReplyTo? To?
//!     reference parameters*  AppSequence?  unknown*
//!   </s12:Header>
//!   <s12:Body> kind-specific </s12:Body>
//!   <dpws:Security>...</dpws:Security>        (signed discovery messages)
//! </s12:Envelope>
//! ```

mod discovery;
mod eventing;
mod invoke;
mod metadata;

use super::{CodecEnvironment, ConnectionInfo, EncodeError, EncodeResult};
use crate::model::{
    EndpointReference, Header, LocalizedString, Message, MessageBody, MessageKind,
    QualifiedName, UnknownContent, UnknownElement,
};
use crate::protocol::constants::{
    ACTION, ADDRESS, APP_SEQUENCE, BODY, BODY_REFERENCE_ID, ENVELOPE, HEADER, INSTANCE_ID,
    IS_REFERENCE_PARAMETER, LANG, MESSAGE_ID, MESSAGE_NUMBER, METADATA, PREFIX_DPWS, PREFIX_MEX,
    PREFIX_SOAP, PREFIX_WSA, PREFIX_WSD, PREFIX_WSE, REFERENCE_PARAMETERS, RELATES_TO, REPLY_TO,
    SECURITY, SEQUENCE_ID, SIG, SIG_REFS, SIG_SCHEME, SIG_VALUE, SOAP12_NS, TO, XML_NS,
};
use crate::protocol::ProtocolHelper;
use crate::security::SecurityHook;
use crate::xml::{BoundedBuffer, PrefixTable, SerializerMode, XmlSink};
use std::io::Write;

/// Per-call context threaded through the body writers.
pub(crate) struct EncodeCtx<'a> {
    pub helper: &'static dyn ProtocolHelper,
    pub env: &'a CodecEnvironment,
    pub connection: &'a ConnectionInfo,
}

/// Reusable encoder owning one fixed-capacity output buffer.
#[derive(Debug)]
pub struct Encoder {
    buffer: BoundedBuffer,
    encoded: u64,
}

impl Encoder {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: BoundedBuffer::new(capacity),
            encoded: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Messages successfully encoded by this instance.
    pub fn encoded(&self) -> u64 {
        self.encoded
    }

    /// Encode `message` into the internal buffer and return the bytes.
    ///
    /// On success the MessageID is recorded as sent (when configured) and
    /// outgoing GetMetadata requests are registered as pending.
    pub fn encode(
        &mut self,
        message: &Message,
        connection: &ConnectionInfo,
        env: &CodecEnvironment,
    ) -> EncodeResult<&[u8]> {
        self.buffer.clear();
        if let Err(err) = write_envelope(&mut self.buffer, message, connection, env) {
            log::debug!("[encode] {} failed: {}", message.kind(), err);
            self.buffer.clear();
            return Err(err);
        }

        if let Some(id) = message.header.message_id.as_deref() {
            if env.config.track_sent_messages {
                env.sent_messages.contains_or_enqueue(id);
            }
            if message.kind() == MessageKind::GetMetadata {
                env.pending_metadata.register(id);
            }
        }
        self.encoded += 1;
        Ok(self.buffer.as_slice())
    }

    /// Encode and copy the result to `out`; returns the byte count.
    pub fn encode_to<W: Write>(
        &mut self,
        message: &Message,
        connection: &ConnectionInfo,
        env: &CodecEnvironment,
        out: &mut W,
    ) -> EncodeResult<usize> {
        let bytes = self.encode(message, connection, env)?;
        out.write_all(bytes)?;
        Ok(bytes.len())
    }
}

/// Prefix bindings for one message: protocol namespaces by kind range, then
/// generated prefixes for everything the content references.
fn prefix_table(message: &Message, helper: &dyn ProtocolHelper, env: &CodecEnvironment) -> PrefixTable {
    let kind = message.kind();
    let mut prefixes = PrefixTable::new();
    prefixes.bind(SOAP12_NS, PREFIX_SOAP);
    prefixes.bind(helper.addressing_namespace(), PREFIX_WSA);
    prefixes.bind(helper.dpws_namespace(), PREFIX_DPWS);
    if kind.is_discovery() || message.header.app_sequence.is_some() {
        prefixes.bind(helper.discovery_namespace(), PREFIX_WSD);
    }
    if kind.is_eventing() {
        prefixes.bind(helper.eventing_namespace(), PREFIX_WSE);
    }
    if kind.is_metadata() {
        prefixes.bind(helper.mex_namespace(), PREFIX_MEX);
    }
    for namespace in message.collect_namespaces(&env.handlers) {
        prefixes.bind_generated(&namespace);
    }
    prefixes
}

fn write_envelope(
    buffer: &mut BoundedBuffer,
    message: &Message,
    connection: &ConnectionInfo,
    env: &CodecEnvironment,
) -> EncodeResult<()> {
    let header = &message.header;
    if header.action.is_empty() {
        return Err(EncodeError::MissingField("Action"));
    }
    let helper = header.version.helper();
    let prefixes = prefix_table(message, helper, env);

    let signer: Option<&dyn SecurityHook> = if header.secure && message.kind().is_signable() {
        match env.security.as_deref() {
            Some(hook) => Some(hook),
            None => {
                log::warn!("[encode] secure {} requested without a security module", message.kind());
                None
            }
        }
    } else {
        None
    };
    let mode = if signer.is_some() {
        SerializerMode::Canonical
    } else {
        SerializerMode::Streaming
    };

    let cx = EncodeCtx {
        helper,
        env,
        connection,
    };
    let mut w = XmlSink::new(buffer, &prefixes, mode);
    w.declaration()?;
    w.start(SOAP12_NS, ENVELOPE)?;
    w.declare_prefixes()?;
    write_header(&mut w, &cx, header)?;

    let body_start = w.position()?;
    w.start(SOAP12_NS, BODY)?;
    write_body(&mut w, &cx, &message.body)?;
    w.end()?;

    if let Some(signer) = signer {
        let body_end = w.position()?;
        let signature = signer.sign(&w.written()[body_start..body_end])?;
        let dpws = helper.dpws_namespace();
        w.start(dpws, SECURITY)?;
        w.start(dpws, SIG)?;
        w.attribute("", SIG_SCHEME, signer.scheme())?;
        w.attribute("", SIG_REFS, BODY_REFERENCE_ID)?;
        w.attribute("", SIG_VALUE, &signature)?;
        w.end()?;
        w.end()?;
    }

    w.end()
}

fn write_header(w: &mut XmlSink<'_>, cx: &EncodeCtx<'_>, header: &Header) -> EncodeResult<()> {
    let wsa = cx.helper.addressing_namespace();
    w.start(SOAP12_NS, HEADER)?;
    w.attributes(&header.unknown.attributes)?;
    w.leaf(wsa, ACTION, &header.action)?;
    if let Some(id) = &header.message_id {
        w.leaf(wsa, MESSAGE_ID, id)?;
    }
    if let Some(id) = &header.relates_to {
        w.leaf(wsa, RELATES_TO, id)?;
    }
    if let Some(reply_to) = &header.reply_to {
        write_epr(w, cx, wsa, REPLY_TO, reply_to)?;
    }
    if let Some(to) = &header.to {
        w.leaf(wsa, TO, to)?;
    }
    for parameter in &header.reference_parameters {
        w.start(&parameter.name.namespace, &parameter.name.local)?;
        w.namespace_bindings(&parameter.namespaces)?;
        if cx.helper.marks_reference_parameters() {
            w.attribute(wsa, IS_REFERENCE_PARAMETER, "true")?;
        }
        w.attributes(&parameter.attributes)?;
        if !parameter.content.is_empty() {
            w.chunks(&parameter.content)?;
        }
        w.end()?;
    }
    if let Some(seq) = &header.app_sequence {
        w.start(cx.helper.discovery_namespace(), APP_SEQUENCE)?;
        w.attribute("", INSTANCE_ID, &seq.instance_id.to_string())?;
        if let Some(id) = &seq.sequence_id {
            w.attribute("", SEQUENCE_ID, id)?;
        }
        w.attribute("", MESSAGE_NUMBER, &seq.message_number.to_string())?;
        w.end()?;
    }
    write_unknown_elements(w, cx, &header.unknown)?;
    w.end()
}

/// Per-kind body dispatch.
fn write_body(w: &mut XmlSink<'_>, cx: &EncodeCtx<'_>, body: &MessageBody) -> EncodeResult<()> {
    use crate::protocol::constants::{
        GET_STATUS, GET_STATUS_RESPONSE, RENEW, RENEW_RESPONSE, UNSUBSCRIBE,
    };
    match body {
        MessageBody::Hello(b) => discovery::write_hello(w, cx, b),
        MessageBody::Bye(b) => discovery::write_bye(w, cx, b),
        MessageBody::Probe(b) => discovery::write_probe(w, cx, b),
        MessageBody::ProbeMatches(b) => discovery::write_probe_matches(w, cx, b),
        MessageBody::Resolve(b) => discovery::write_resolve(w, cx, b),
        MessageBody::ResolveMatches(b) => discovery::write_resolve_matches(w, cx, b),
        MessageBody::Subscribe(b) => eventing::write_subscribe(w, cx, b),
        MessageBody::SubscribeResponse(b) => eventing::write_subscribe_response(w, cx, b),
        MessageBody::Renew(b) => eventing::write_expires_body(w, cx, RENEW, b),
        MessageBody::RenewResponse(b) => eventing::write_expires_body(w, cx, RENEW_RESPONSE, b),
        MessageBody::GetStatus(b) => eventing::write_empty_element(w, cx, GET_STATUS, b),
        MessageBody::GetStatusResponse(b) => {
            eventing::write_expires_body(w, cx, GET_STATUS_RESPONSE, b)
        }
        MessageBody::Unsubscribe(b) => eventing::write_empty_element(w, cx, UNSUBSCRIBE, b),
        MessageBody::UnsubscribeResponse(b) | MessageBody::Get(b) => write_bare_body(w, cx, &b.unknown),
        MessageBody::SubscriptionEnd(b) => eventing::write_subscription_end(w, cx, b),
        MessageBody::GetResponse(b) => metadata::write_get_response(w, cx, b),
        MessageBody::GetMetadata(b) => metadata::write_get_metadata(w, cx, b),
        MessageBody::GetMetadataResponse(b) => metadata::write_get_metadata_response(w, cx, b),
        MessageBody::Invoke(b) => invoke::write_invoke(w, cx, b),
        MessageBody::Fault(b) => invoke::write_fault(w, cx, b),
    }
}

/// Body without a wrapper element: unknown attributes land on `s12:Body`,
/// unknown elements directly inside it.
pub(crate) fn write_bare_body(
    w: &mut XmlSink<'_>,
    cx: &EncodeCtx<'_>,
    unknown: &UnknownContent,
) -> EncodeResult<()> {
    w.attributes(&unknown.attributes)?;
    write_unknown_elements(w, cx, unknown)
}

pub(crate) fn write_unknown_elements(
    w: &mut XmlSink<'_>,
    cx: &EncodeCtx<'_>,
    unknown: &UnknownContent,
) -> EncodeResult<()> {
    for element in &unknown.elements {
        match element {
            UnknownElement::Raw(raw) => w.raw_element(raw)?,
            UnknownElement::Typed { name, value } => {
                match cx.env.handlers.serialize(name, value.as_ref()) {
                    Some(raw) => w.raw_element(&raw)?,
                    None => log::warn!("[encode] no serializer for {}, element dropped", name),
                }
            }
        }
    }
    Ok(())
}

pub(crate) fn write_epr(
    w: &mut XmlSink<'_>,
    cx: &EncodeCtx<'_>,
    namespace: &str,
    local: &str,
    epr: &EndpointReference,
) -> EncodeResult<()> {
    let wsa = cx.helper.addressing_namespace();
    w.start(namespace, local)?;
    w.attributes(&epr.unknown.attributes)?;
    w.leaf(wsa, ADDRESS, &epr.address)?;
    if !epr.reference_parameters.is_empty() {
        w.start(wsa, REFERENCE_PARAMETERS)?;
        for parameter in &epr.reference_parameters {
            w.raw_element(parameter)?;
        }
        w.end()?;
    }
    if !epr.metadata.is_empty() {
        w.start(wsa, METADATA)?;
        for element in &epr.metadata {
            w.raw_element(element)?;
        }
        w.end()?;
    }
    write_unknown_elements(w, cx, &epr.unknown)?;
    w.end()
}

/// Space-separated QName list.
pub(crate) fn write_qnames(
    w: &mut XmlSink<'_>,
    namespace: &str,
    local: &str,
    names: &[QualifiedName],
) -> EncodeResult<()> {
    let text = names
        .iter()
        .map(|name| w.qname_text(name))
        .collect::<EncodeResult<Vec<_>>>()?
        .join(" ");
    w.leaf(namespace, local, &text)
}

pub(crate) fn write_localized(
    w: &mut XmlSink<'_>,
    namespace: &str,
    local: &str,
    value: &LocalizedString,
) -> EncodeResult<()> {
    w.start(namespace, local)?;
    if let Some(lang) = &value.lang {
        w.attribute(XML_NS, LANG, lang)?;
    }
    w.text(&value.value)?;
    w.end()
}
