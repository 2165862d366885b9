// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Application payloads and SOAP faults.
//!
//! Actions outside the protocol table land here. A `s12:Fault` child is a
//! fault whatever the action; anything else needs a registered operation.

use super::{capture_remaining, capture_unknown, parse_localized, take_attributes, DecodeCtx};
use crate::codec::{DecodeError, DecodeResult};
use crate::model::{Fault, Header, Invoke, MessageBody, ParameterValue, QualifiedName, UnknownContent};
use crate::protocol::constants::{CODE, DETAIL, FAULT, REASON, SOAP12_NS, SUBCODE, TEXT, VALUE};
use crate::xml::{Content, ElementReader, StartTag};

/// Nesting limit for parameter trees and fault subcodes.
const MAX_DEPTH: usize = 64;

pub(super) fn parse_application(
    r: &mut ElementReader<'_>,
    cx: &DecodeCtx<'_>,
    body: &StartTag,
    header: &Header,
) -> DecodeResult<MessageBody> {
    let first = r.next_child()?;
    if let Some(start) = &first {
        if start.is(SOAP12_NS, FAULT) {
            let start = start.clone();
            let fault = parse_fault(r, cx, &start, &header.action)?;
            super::finish_body(r)?;
            return Ok(MessageBody::Fault(fault));
        }
    }

    let Some(operation) = cx.env.operations.by_action(&header.action) else {
        if first.is_some() {
            // Leave the reader consistent for callers that log and continue.
            r.skip()?;
        }
        return Err(DecodeError::ActionNotSupported(header.action.clone()));
    };

    let mut invoke = Invoke::default();
    take_attributes(body, &[], &mut invoke.unknown);
    let Some(start) = first else {
        return Ok(MessageBody::Invoke(invoke));
    };

    let expected = operation.expected_element(header.relates_to.is_some());
    match expected {
        Some(expected) if start.name == *expected => {
            invoke.content = Some(parse_parameter(r, start, 0)?);
        }
        Some(expected) => {
            return Err(DecodeError::unexpected(&start.name, expected.to_string()));
        }
        None => {
            log::debug!(
                "[decode] operation {} declares no element, capturing {}",
                operation.name,
                start.name
            );
            capture_unknown(r, cx.env, start, &mut invoke.unknown)?;
        }
    }
    capture_remaining(r, cx.env, &mut invoke.unknown)?;
    Ok(MessageBody::Invoke(invoke))
}

/// Generic parameter tree; whitespace between child elements is dropped.
pub(super) fn parse_parameter(
    r: &mut ElementReader<'_>,
    start: StartTag,
    depth: usize,
) -> DecodeResult<ParameterValue> {
    if depth > MAX_DEPTH {
        return Err(DecodeError::Malformed("parameter nesting too deep".into()));
    }
    let mut value = ParameterValue {
        name: start.name,
        attributes: start.attributes,
        text: None,
        children: Vec::new(),
    };
    let mut text = String::new();
    loop {
        match r.next_content()? {
            Content::Start(child) => value.children.push(parse_parameter(r, child, depth + 1)?),
            Content::Text(chunk) => text.push_str(&chunk),
            Content::End { .. } => break,
        }
    }
    let blank = text.trim().is_empty();
    if !text.is_empty() && !(blank && !value.children.is_empty()) {
        value.text = Some(text);
    }
    Ok(value)
}

fn parse_fault(
    r: &mut ElementReader<'_>,
    cx: &DecodeCtx<'_>,
    start: &StartTag,
    action: &str,
) -> DecodeResult<Fault> {
    let mut codes = Vec::new();
    let mut reasons = Vec::new();
    let mut detail = None;
    let mut unknown = UnknownContent::default();
    take_attributes(start, &[], &mut unknown);

    while let Some(child) = r.next_child()? {
        if child.is(SOAP12_NS, CODE) {
            parse_code(r, &mut codes, 0)?;
        } else if child.is(SOAP12_NS, REASON) {
            while let Some(text) = r.next_child()? {
                if text.is(SOAP12_NS, TEXT) {
                    reasons.push(parse_localized(r, &text)?);
                } else {
                    r.skip()?;
                }
            }
        } else if child.is(SOAP12_NS, DETAIL) {
            detail = parse_detail(r, cx, action)?;
        } else {
            capture_unknown(r, cx.env, child, &mut unknown)?;
        }
    }

    let mut codes = codes.into_iter();
    let code = codes
        .next()
        .ok_or_else(|| DecodeError::missing(SOAP12_NS, CODE))?;
    Ok(Fault {
        code,
        subcode: codes.next(),
        subsubcode: codes.next(),
        reasons,
        detail,
        unknown,
    })
}

/// `Code` / `Subcode` chain flattened outermost first.
fn parse_code(
    r: &mut ElementReader<'_>,
    codes: &mut Vec<QualifiedName>,
    depth: usize,
) -> DecodeResult<()> {
    if depth > MAX_DEPTH {
        return Err(DecodeError::Malformed("fault subcodes nested too deep".into()));
    }
    while let Some(child) = r.next_child()? {
        if child.is(SOAP12_NS, VALUE) {
            let text = r.next_trimmed()?;
            codes.push(r.resolve_qname(&text)?);
        } else if child.is(SOAP12_NS, SUBCODE) {
            parse_code(r, codes, depth + 1)?;
        } else {
            r.skip()?;
        }
    }
    Ok(())
}

fn parse_detail(
    r: &mut ElementReader<'_>,
    cx: &DecodeCtx<'_>,
    action: &str,
) -> DecodeResult<Option<ParameterValue>> {
    let expected = cx
        .env
        .operations
        .fault(action)
        .and_then(|fault| fault.detail_element.as_ref());
    let mut detail = None;
    while let Some(child) = r.next_child()? {
        if detail.is_some() {
            r.skip()?;
            continue;
        }
        if let Some(expected) = expected {
            if child.name != *expected {
                log::debug!("[decode] fault detail {} where {} was declared", child.name, expected);
            }
        }
        detail = Some(parse_parameter(r, child, 0)?);
    }
    Ok(detail)
}

#[cfg(test)]
mod tests {
    use crate::codec::{AcceptAll, CodecEnvironment, ConnectionInfo, DecodeError, Decoder};
    use crate::model::{MessageBody, QualifiedName};
    use crate::operations::{OperationDescriptor, OperationType};

    fn envelope(header: &str, body: &str) -> String {
        format!(
            r#"<s12:Envelope xmlns:s12="http://www.w3.org/2003/05/soap-envelope" xmlns:wsa="http://www.w3.org/2005/08/addressing" xmlns:t="urn:thermo"><s12:Header>{}</s12:Header><s12:Body>{}</s12:Body></s12:Envelope>"#,
            header, body
        )
    }

    fn env() -> CodecEnvironment {
        CodecEnvironment::builder()
            .operation(
                OperationDescriptor::new("GetTemp", OperationType::RequestResponse)
                    .with_input("urn:thermo/GetTemp", QualifiedName::new("urn:thermo", "GetTemp"))
                    .with_output("urn:thermo/GetTempResponse", QualifiedName::new("urn:thermo", "Temp")),
            )
            .build()
    }

    #[test]
    fn test_invoke_request_parsed_as_parameter_tree() {
        let xml = envelope(
            "<wsa:Action>urn:thermo/GetTemp</wsa:Action>",
            "<t:GetTemp unit=\"C\"><t:Sensor>3</t:Sensor>\n  <t:Precise/></t:GetTemp>",
        );
        let env = env();
        let message = Decoder::new()
            .decode(xml.as_bytes(), &ConnectionInfo::default(), &env, &AcceptAll)
            .unwrap();
        let MessageBody::Invoke(invoke) = message.body else {
            panic!("expected Invoke");
        };
        let content = invoke.content.unwrap();
        assert_eq!(content.name.local, "GetTemp");
        assert_eq!(content.attributes.len(), 1);
        assert!(content.text.is_none());
        assert_eq!(content.children.len(), 2);
        assert_eq!(content.child("Sensor").unwrap().text.as_deref(), Some("3"));
        assert!(content.child("Precise").unwrap().text.is_none());
    }

    #[test]
    fn test_reply_expects_output_element() {
        let xml = envelope(
            "<wsa:Action>urn:thermo/GetTempResponse</wsa:Action><wsa:RelatesTo>urn:uuid:1</wsa:RelatesTo>",
            "<t:GetTemp/>",
        );
        let env = env();
        let err = Decoder::new()
            .decode(xml.as_bytes(), &ConnectionInfo::default(), &env, &AcceptAll)
            .unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedElement { .. }));
    }

    #[test]
    fn test_unregistered_action_not_supported() {
        let xml = envelope("<wsa:Action>urn:other</wsa:Action>", "<t:X/>");
        let env = env();
        let err = Decoder::new()
            .decode(xml.as_bytes(), &ConnectionInfo::default(), &env, &AcceptAll)
            .unwrap_err();
        assert_eq!(err, DecodeError::ActionNotSupported("urn:other".into()));
    }

    #[test]
    fn test_fault_with_subcodes() {
        let xml = envelope(
            "<wsa:Action>http://www.w3.org/2005/08/addressing/fault</wsa:Action>",
            r#"<s12:Fault><s12:Code><s12:Value>s12:Sender</s12:Value>
                 <s12:Subcode><s12:Value>wsa:ActionNotSupported</s12:Value></s12:Subcode></s12:Code>
               <s12:Reason><s12:Text xml:lang="en">unsupported</s12:Text></s12:Reason>
               <s12:Detail><wsa:Action>urn:x</wsa:Action></s12:Detail></s12:Fault>"#,
        );
        let env = CodecEnvironment::default();
        let message = Decoder::new()
            .decode(xml.as_bytes(), &ConnectionInfo::default(), &env, &AcceptAll)
            .unwrap();
        let MessageBody::Fault(fault) = message.body else {
            panic!("expected Fault");
        };
        assert_eq!(fault.code, QualifiedName::new("http://www.w3.org/2003/05/soap-envelope", "Sender"));
        assert_eq!(fault.subcode.unwrap().local, "ActionNotSupported");
        assert!(fault.subsubcode.is_none());
        assert_eq!(fault.reasons[0].value, "unsupported");
        assert_eq!(fault.detail.unwrap().text.as_deref(), Some("urn:x"));
    }
}
