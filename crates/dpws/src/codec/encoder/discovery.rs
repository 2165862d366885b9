// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! WS-Discovery bodies.

use super::{write_epr, write_qnames, write_unknown_elements, EncodeCtx};
use crate::codec::EncodeResult;
use crate::model::{Bye, DiscoveryData, Hello, Probe, ProbeMatches, Resolve, ResolveMatches, ScopeSet};
use crate::protocol::constants::{
    BYE, ENDPOINT_REFERENCE, HELLO, MATCH_BY, METADATA_VERSION, PROBE, PROBE_MATCH, PROBE_MATCHES,
    RESOLVE, RESOLVE_MATCH, RESOLVE_MATCHES, SCOPES, TYPES, XADDRS,
};
use crate::xml::XmlSink;

pub(super) fn write_hello(w: &mut XmlSink<'_>, cx: &EncodeCtx<'_>, hello: &Hello) -> EncodeResult<()> {
    write_data(w, cx, HELLO, &hello.data)
}

pub(super) fn write_bye(w: &mut XmlSink<'_>, cx: &EncodeCtx<'_>, bye: &Bye) -> EncodeResult<()> {
    write_data(w, cx, BYE, &bye.data)
}

pub(super) fn write_probe(w: &mut XmlSink<'_>, cx: &EncodeCtx<'_>, probe: &Probe) -> EncodeResult<()> {
    let wsd = cx.helper.discovery_namespace();
    w.start(wsd, PROBE)?;
    w.attributes(&probe.unknown.attributes)?;
    if let Some(types) = &probe.types {
        write_qnames(w, wsd, TYPES, types)?;
    }
    if let Some(scopes) = &probe.scopes {
        write_scopes(w, wsd, scopes)?;
    }
    write_unknown_elements(w, cx, &probe.unknown)?;
    w.end()
}

pub(super) fn write_probe_matches(
    w: &mut XmlSink<'_>,
    cx: &EncodeCtx<'_>,
    matches: &ProbeMatches,
) -> EncodeResult<()> {
    w.start(cx.helper.discovery_namespace(), PROBE_MATCHES)?;
    w.attributes(&matches.unknown.attributes)?;
    for data in &matches.matches {
        write_data(w, cx, PROBE_MATCH, data)?;
    }
    write_unknown_elements(w, cx, &matches.unknown)?;
    w.end()
}

pub(super) fn write_resolve(w: &mut XmlSink<'_>, cx: &EncodeCtx<'_>, resolve: &Resolve) -> EncodeResult<()> {
    w.start(cx.helper.discovery_namespace(), RESOLVE)?;
    w.attributes(&resolve.unknown.attributes)?;
    write_epr(
        w,
        cx,
        cx.helper.addressing_namespace(),
        ENDPOINT_REFERENCE,
        &resolve.endpoint_reference,
    )?;
    write_unknown_elements(w, cx, &resolve.unknown)?;
    w.end()
}

pub(super) fn write_resolve_matches(
    w: &mut XmlSink<'_>,
    cx: &EncodeCtx<'_>,
    matches: &ResolveMatches,
) -> EncodeResult<()> {
    w.start(cx.helper.discovery_namespace(), RESOLVE_MATCHES)?;
    w.attributes(&matches.unknown.attributes)?;
    if let Some(data) = &matches.resolve_match {
        write_data(w, cx, RESOLVE_MATCH, data)?;
    }
    write_unknown_elements(w, cx, &matches.unknown)?;
    w.end()
}

/// Hello, Bye, ProbeMatch and ResolveMatch share one layout.
fn write_data(
    w: &mut XmlSink<'_>,
    cx: &EncodeCtx<'_>,
    local: &str,
    data: &DiscoveryData,
) -> EncodeResult<()> {
    let wsd = cx.helper.discovery_namespace();
    w.start(wsd, local)?;
    w.attributes(&data.unknown.attributes)?;
    write_epr(
        w,
        cx,
        cx.helper.addressing_namespace(),
        ENDPOINT_REFERENCE,
        &data.endpoint_reference,
    )?;
    if let Some(types) = &data.types {
        write_qnames(w, wsd, TYPES, types)?;
    }
    if let Some(scopes) = &data.scopes {
        write_scopes(w, wsd, scopes)?;
    }
    if let Some(xaddrs) = &data.xaddrs {
        w.leaf(wsd, XADDRS, &xaddrs.join(" "))?;
    }
    if let Some(version) = data.metadata_version {
        w.leaf(wsd, METADATA_VERSION, &version.to_string())?;
    }
    write_unknown_elements(w, cx, &data.unknown)?;
    w.end()
}

fn write_scopes(w: &mut XmlSink<'_>, wsd: &str, scopes: &ScopeSet) -> EncodeResult<()> {
    w.start(wsd, SCOPES)?;
    if let Some(rule) = &scopes.match_by {
        w.attribute("", MATCH_BY, rule)?;
    }
    w.attributes(&scopes.unknown.attributes)?;
    w.text(&scopes.scopes.join(" "))?;
    w.end()
}
