// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! WS-Discovery bodies.

use super::{
    capture_unknown, finish_body, parse_epr, parse_u64, split_list, take_attributes, DecodeCtx,
};
use crate::codec::{DecodeError, DecodeResult};
use crate::model::{
    Bye, DiscoveryData, Hello, MessageBody, Probe, ProbeMatches, Resolve, ResolveMatches, ScopeSet,
};
use crate::protocol::constants::{
    BYE, ENDPOINT_REFERENCE, HELLO, MATCH_BY, METADATA_VERSION, PROBE, PROBE_MATCH, PROBE_MATCHES,
    RESOLVE, RESOLVE_MATCH, RESOLVE_MATCHES, SCOPES, TYPES, XADDRS,
};
use crate::xml::{ElementReader, StartTag};

pub(super) fn parse_hello(
    r: &mut ElementReader<'_>,
    cx: &DecodeCtx<'_>,
    _body: &StartTag,
) -> DecodeResult<MessageBody> {
    let start = r.expect_child(cx.helper.discovery_namespace(), HELLO)?;
    let data = parse_data(r, cx, &start)?;
    finish_body(r)?;
    Ok(MessageBody::Hello(Hello { data }))
}

pub(super) fn parse_bye(
    r: &mut ElementReader<'_>,
    cx: &DecodeCtx<'_>,
    _body: &StartTag,
) -> DecodeResult<MessageBody> {
    let start = r.expect_child(cx.helper.discovery_namespace(), BYE)?;
    let data = parse_data(r, cx, &start)?;
    finish_body(r)?;
    Ok(MessageBody::Bye(Bye { data }))
}

pub(super) fn parse_probe(
    r: &mut ElementReader<'_>,
    cx: &DecodeCtx<'_>,
    _body: &StartTag,
) -> DecodeResult<MessageBody> {
    let wsd = cx.helper.discovery_namespace();
    let start = r.expect_child(wsd, PROBE)?;
    let mut probe = Probe::default();
    take_attributes(&start, &[], &mut probe.unknown);
    while let Some(child) = r.next_child()? {
        if child.is(wsd, TYPES) {
            probe.types = Some(r.next_qname_list()?);
        } else if child.is(wsd, SCOPES) {
            probe.scopes = Some(parse_scopes(r, &child)?);
        } else {
            capture_unknown(r, cx.env, child, &mut probe.unknown)?;
        }
    }
    finish_body(r)?;
    Ok(MessageBody::Probe(probe))
}

pub(super) fn parse_probe_matches(
    r: &mut ElementReader<'_>,
    cx: &DecodeCtx<'_>,
    _body: &StartTag,
) -> DecodeResult<MessageBody> {
    let wsd = cx.helper.discovery_namespace();
    let start = r.expect_child(wsd, PROBE_MATCHES)?;
    let mut matches = ProbeMatches::default();
    take_attributes(&start, &[], &mut matches.unknown);
    while let Some(child) = r.next_child()? {
        if child.is(wsd, PROBE_MATCH) {
            matches.matches.push(parse_data(r, cx, &child)?);
        } else {
            capture_unknown(r, cx.env, child, &mut matches.unknown)?;
        }
    }
    finish_body(r)?;
    Ok(MessageBody::ProbeMatches(matches))
}

pub(super) fn parse_resolve(
    r: &mut ElementReader<'_>,
    cx: &DecodeCtx<'_>,
    _body: &StartTag,
) -> DecodeResult<MessageBody> {
    let wsa = cx.helper.addressing_namespace();
    let start = r.expect_child(cx.helper.discovery_namespace(), RESOLVE)?;
    let mut resolve = Resolve::default();
    take_attributes(&start, &[], &mut resolve.unknown);
    let mut endpoint = None;
    while let Some(child) = r.next_child()? {
        if child.is(wsa, ENDPOINT_REFERENCE) && endpoint.is_none() {
            endpoint = Some(parse_epr(r, cx.env, wsa, &child)?);
        } else {
            capture_unknown(r, cx.env, child, &mut resolve.unknown)?;
        }
    }
    resolve.endpoint_reference =
        endpoint.ok_or_else(|| DecodeError::missing(wsa, ENDPOINT_REFERENCE))?;
    finish_body(r)?;
    Ok(MessageBody::Resolve(resolve))
}

pub(super) fn parse_resolve_matches(
    r: &mut ElementReader<'_>,
    cx: &DecodeCtx<'_>,
    _body: &StartTag,
) -> DecodeResult<MessageBody> {
    let wsd = cx.helper.discovery_namespace();
    let start = r.expect_child(wsd, RESOLVE_MATCHES)?;
    let mut matches = ResolveMatches::default();
    take_attributes(&start, &[], &mut matches.unknown);
    while let Some(child) = r.next_child()? {
        if child.is(wsd, RESOLVE_MATCH) && matches.resolve_match.is_none() {
            matches.resolve_match = Some(parse_data(r, cx, &child)?);
        } else {
            capture_unknown(r, cx.env, child, &mut matches.unknown)?;
        }
    }
    finish_body(r)?;
    Ok(MessageBody::ResolveMatches(matches))
}

/// Shared Hello / Bye / ProbeMatch / ResolveMatch content.
fn parse_data(
    r: &mut ElementReader<'_>,
    cx: &DecodeCtx<'_>,
    start: &StartTag,
) -> DecodeResult<DiscoveryData> {
    let wsd = cx.helper.discovery_namespace();
    let wsa = cx.helper.addressing_namespace();
    let mut data = DiscoveryData::default();
    take_attributes(start, &[], &mut data.unknown);
    let mut endpoint = None;
    while let Some(child) = r.next_child()? {
        if child.is(wsa, ENDPOINT_REFERENCE) && endpoint.is_none() {
            endpoint = Some(parse_epr(r, cx.env, wsa, &child)?);
        } else if child.is(wsd, TYPES) {
            data.types = Some(r.next_qname_list()?);
        } else if child.is(wsd, SCOPES) {
            data.scopes = Some(parse_scopes(r, &child)?);
        } else if child.is(wsd, XADDRS) {
            data.xaddrs = Some(split_list(&r.next_text()?));
        } else if child.is(wsd, METADATA_VERSION) {
            let text = r.next_text()?;
            data.metadata_version = Some(parse_u64(METADATA_VERSION, &text)?);
        } else {
            capture_unknown(r, cx.env, child, &mut data.unknown)?;
        }
    }
    data.endpoint_reference =
        endpoint.ok_or_else(|| DecodeError::missing(wsa, ENDPOINT_REFERENCE))?;
    Ok(data)
}

fn parse_scopes(r: &mut ElementReader<'_>, start: &StartTag) -> DecodeResult<ScopeSet> {
    let mut scopes = ScopeSet {
        match_by: start.attr(MATCH_BY).map(str::to_string),
        ..ScopeSet::default()
    };
    take_attributes(start, &[MATCH_BY], &mut scopes.unknown);
    scopes.scopes = split_list(&r.next_text()?);
    Ok(scopes)
}
