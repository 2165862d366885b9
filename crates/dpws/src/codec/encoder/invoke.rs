// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Application payloads and SOAP faults.

use super::{write_localized, write_unknown_elements, EncodeCtx};
use crate::codec::EncodeResult;
use crate::model::{Fault, Invoke, ParameterValue, QualifiedName};
use crate::protocol::constants::{CODE, DETAIL, FAULT, REASON, SOAP12_NS, SUBCODE, TEXT, VALUE};
use crate::xml::XmlSink;

pub(super) fn write_invoke(w: &mut XmlSink<'_>, cx: &EncodeCtx<'_>, invoke: &Invoke) -> EncodeResult<()> {
    w.attributes(&invoke.unknown.attributes)?;
    if let Some(content) = &invoke.content {
        write_parameter(w, content)?;
    }
    write_unknown_elements(w, cx, &invoke.unknown)
}

fn write_parameter(w: &mut XmlSink<'_>, value: &ParameterValue) -> EncodeResult<()> {
    w.start(&value.name.namespace, &value.name.local)?;
    w.attributes(&value.attributes)?;
    if let Some(text) = &value.text {
        w.text(text)?;
    }
    for child in &value.children {
        write_parameter(w, child)?;
    }
    w.end()
}

pub(super) fn write_fault(w: &mut XmlSink<'_>, cx: &EncodeCtx<'_>, fault: &Fault) -> EncodeResult<()> {
    w.start(SOAP12_NS, FAULT)?;
    w.attributes(&fault.unknown.attributes)?;

    w.start(SOAP12_NS, CODE)?;
    write_code_value(w, &fault.code)?;
    if let Some(subcode) = &fault.subcode {
        w.start(SOAP12_NS, SUBCODE)?;
        write_code_value(w, subcode)?;
        if let Some(subsubcode) = &fault.subsubcode {
            w.start(SOAP12_NS, SUBCODE)?;
            write_code_value(w, subsubcode)?;
            w.end()?;
        }
        w.end()?;
    }
    w.end()?;

    w.start(SOAP12_NS, REASON)?;
    for reason in &fault.reasons {
        write_localized(w, SOAP12_NS, TEXT, reason)?;
    }
    w.end()?;

    if let Some(detail) = &fault.detail {
        w.start(SOAP12_NS, DETAIL)?;
        write_parameter(w, detail)?;
        w.end()?;
    }
    write_unknown_elements(w, cx, &fault.unknown)?;
    w.end()
}

fn write_code_value(w: &mut XmlSink<'_>, code: &QualifiedName) -> EncodeResult<()> {
    let text = w.qname_text(code)?;
    w.leaf(SOAP12_NS, VALUE, &text)
}
