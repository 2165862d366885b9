// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `s12:Header` parsing and protocol version detection.

use super::{capture_unknown, parse_epr, parse_u64};
use crate::codec::{CodecEnvironment, DecodeError, DecodeResult};
use crate::model::{AppSequence, Header};
use crate::protocol::constants::{
    ACTION, APP_SEQUENCE, INSTANCE_ID, IS_REFERENCE_PARAMETER, MESSAGE_ID, MESSAGE_NUMBER,
    RELATES_TO, REPLY_TO, SECURITY, SEQUENCE_ID, SIG, SIG_VALUE, TO, WSA_2005_NS,
};
use crate::protocol::ProtocolVersion;
use crate::xml::{ElementReader, StartTag};

/// Header fields plus what the header revealed about the sender.
#[derive(Debug)]
pub(super) struct ParsedHeader {
    /// Version is a placeholder until the caller resolves it.
    pub header: Header,
    pub detected: Option<ProtocolVersion>,
    /// Signature value from a compact security block, not yet validated.
    pub signature: Option<String>,
}

impl Default for ParsedHeader {
    fn default() -> Self {
        Self {
            header: Header::new(ProtocolVersion::default(), ""),
            detected: None,
            signature: None,
        }
    }
}

impl ParsedHeader {
    fn detect(&mut self, version: Option<ProtocolVersion>) {
        if self.detected.is_none() {
            self.detected = version;
        }
    }
}

pub(super) fn parse_header(
    r: &mut ElementReader<'_>,
    env: &CodecEnvironment,
    start: &StartTag,
) -> DecodeResult<ParsedHeader> {
    let mut parsed = ParsedHeader::default();
    for (name, value) in &start.attributes {
        parsed.header.unknown.add_attribute(name.clone(), value.clone());
    }

    while let Some(mut child) = r.next_child()? {
        let namespace = child.name.namespace.clone();

        // Copied reference parameters (WS-Addressing 1.0 only).
        if child.attribute(WSA_2005_NS, IS_REFERENCE_PARAMETER).is_some() {
            child
                .attributes
                .retain(|(name, _)| !name.is(WSA_2005_NS, IS_REFERENCE_PARAMETER));
            parsed.header.reference_parameters.push(r.capture(child)?);
            continue;
        }

        if let Some(version) = ProtocolVersion::from_addressing_namespace(&namespace) {
            parsed.detect(Some(version));
            let header = &mut parsed.header;
            let local = child.name.local.clone();
            match local.as_str() {
                ACTION => header.action = r.next_trimmed()?,
                MESSAGE_ID => header.message_id = Some(r.next_trimmed()?),
                RELATES_TO => header.relates_to = Some(r.next_trimmed()?),
                TO => header.to = Some(r.next_trimmed()?),
                REPLY_TO => header.reply_to = Some(parse_epr(r, env, &namespace, &child)?),
                _ => capture_unknown(r, env, child, &mut header.unknown)?,
            }
            continue;
        }

        if child.name.local == APP_SEQUENCE {
            if let Some(version) = ProtocolVersion::from_discovery_namespace(&namespace) {
                parsed.detect(Some(version));
                parsed.header.app_sequence = Some(parse_app_sequence(&child)?);
                r.skip()?;
                continue;
            }
        }

        if child.name.local == SECURITY && env.security.is_some() {
            if let Some(version) = ProtocolVersion::from_dpws_namespace(&namespace) {
                parsed.detect(Some(version));
                parsed.signature = parse_security(r)?;
                continue;
            }
        }

        log::debug!("[decode] unknown header element {} captured", child.name);
        capture_unknown(r, env, child, &mut parsed.header.unknown)?;
    }
    Ok(parsed)
}

fn parse_app_sequence(start: &StartTag) -> DecodeResult<AppSequence> {
    let required = |local: &str| -> DecodeResult<u64> {
        let value = start.attr(local).ok_or_else(|| DecodeError::InvalidValue {
            element: format!("{}@{}", APP_SEQUENCE, local),
            value: String::new(),
        })?;
        parse_u64(local, value)
    };
    Ok(AppSequence {
        instance_id: required(INSTANCE_ID)?,
        sequence_id: start.attr(SEQUENCE_ID).map(str::to_string),
        message_number: required(MESSAGE_NUMBER)?,
    })
}

/// Read a `dpws:Security` block whose start tag was just consumed.
///
/// Returns the value of the first `Sig` child that carries one.
pub(super) fn parse_security(r: &mut ElementReader<'_>) -> DecodeResult<Option<String>> {
    let mut signature = None;
    while let Some(child) = r.next_child()? {
        if child.name.local == SIG && signature.is_none() {
            signature = child.attr(SIG_VALUE).map(str::to_string);
        }
        r.skip()?;
    }
    Ok(signature)
}
