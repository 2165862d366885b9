// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Transfer GetResponse and WS-MetadataExchange bodies.

use super::{
    capture_unknown, finish_body, parse_epr, parse_localized, take_attributes, DecodeCtx,
};
use crate::codec::DecodeResult;
use crate::model::{
    GetMetadata, GetMetadataResponse, GetResponse, HostedService, MessageBody, MetadataSection,
    Relationship, SectionContent, ThisDevice, ThisModel,
};
use crate::protocol::constants::{
    DIALECT, ENDPOINT_REFERENCE, FIRMWARE_VERSION, FRIENDLY_NAME, GET_METADATA, HOST, HOSTED,
    IDENTIFIER, LOCATION, MANUFACTURER, MANUFACTURER_URL, METADATA, METADATA_REFERENCE,
    METADATA_SECTION, MODEL_NAME, MODEL_NUMBER, MODEL_URL, PRESENTATION_URL, RELATIONSHIP,
    RELATIONSHIP_TYPE, SERIAL_NUMBER, SERVICE_ID, THIS_DEVICE, THIS_MODEL, TYPES,
};
use crate::xml::{ElementReader, StartTag};

pub(super) fn parse_get(
    r: &mut ElementReader<'_>,
    cx: &DecodeCtx<'_>,
    body: &StartTag,
) -> DecodeResult<MessageBody> {
    super::eventing::parse_bare_body(r, cx, body).map(MessageBody::Get)
}

pub(super) fn parse_get_response(
    r: &mut ElementReader<'_>,
    cx: &DecodeCtx<'_>,
    _body: &StartTag,
) -> DecodeResult<MessageBody> {
    let mex = cx.helper.mex_namespace();
    let start = r.expect_child(mex, METADATA)?;
    let mut response = GetResponse::default();
    take_attributes(&start, &[], &mut response.unknown);

    while let Some(child) = r.next_child()? {
        if !child.is(mex, METADATA_SECTION) {
            capture_unknown(r, cx.env, child, &mut response.unknown)?;
            continue;
        }
        let dialect = child.attr(DIALECT).unwrap_or_default().to_string();
        if dialect == cx.helper.this_model_dialect() {
            response.this_model = section_payload(r, cx, THIS_MODEL, parse_this_model)?;
        } else if dialect == cx.helper.this_device_dialect() {
            response.this_device = section_payload(r, cx, THIS_DEVICE, parse_this_device)?;
        } else if dialect == cx.helper.relationship_dialect() {
            let relationship = section_payload(r, cx, RELATIONSHIP, parse_relationship)?;
            if let Some(relationship) = relationship {
                merge_relationship(&mut response, relationship);
            }
        } else {
            response.other_sections.push(r.capture(child)?);
        }
    }
    finish_body(r)?;
    Ok(MessageBody::GetResponse(response))
}

/// Parse the first `dpws:<local>` child of a metadata section, skipping the rest.
fn section_payload<T>(
    r: &mut ElementReader<'_>,
    cx: &DecodeCtx<'_>,
    local: &str,
    parse: fn(&mut ElementReader<'_>, &DecodeCtx<'_>, &StartTag) -> DecodeResult<T>,
) -> DecodeResult<Option<T>> {
    let dpws = cx.helper.dpws_namespace();
    let mut value = None;
    while let Some(child) = r.next_child()? {
        if child.is(dpws, local) && value.is_none() {
            value = Some(parse(r, cx, &child)?);
        } else {
            log::debug!("[decode] skipping {} in {} section", child.name, local);
            r.skip()?;
        }
    }
    Ok(value)
}

/// Several host relationship sections collapse into one.
fn merge_relationship(response: &mut GetResponse, relationship: Relationship) {
    match &mut response.relationship {
        None => response.relationship = Some(relationship),
        Some(existing) => {
            if existing.host.is_none() {
                existing.host = relationship.host;
            }
            existing.hosted.extend(relationship.hosted);
            existing.unknown.attributes.extend(relationship.unknown.attributes);
            existing.unknown.elements.extend(relationship.unknown.elements);
        }
    }
}

fn parse_this_model(
    r: &mut ElementReader<'_>,
    cx: &DecodeCtx<'_>,
    start: &StartTag,
) -> DecodeResult<ThisModel> {
    let dpws = cx.helper.dpws_namespace();
    let mut model = ThisModel::default();
    take_attributes(start, &[], &mut model.unknown);
    while let Some(child) = r.next_child()? {
        if child.is(dpws, MANUFACTURER) {
            model.manufacturer.push(parse_localized(r, &child)?);
        } else if child.is(dpws, MANUFACTURER_URL) {
            model.manufacturer_url = Some(r.next_trimmed()?);
        } else if child.is(dpws, MODEL_NAME) {
            model.model_name.push(parse_localized(r, &child)?);
        } else if child.is(dpws, MODEL_NUMBER) {
            model.model_number = Some(r.next_text()?);
        } else if child.is(dpws, MODEL_URL) {
            model.model_url = Some(r.next_trimmed()?);
        } else if child.is(dpws, PRESENTATION_URL) {
            model.presentation_url = Some(r.next_trimmed()?);
        } else {
            capture_unknown(r, cx.env, child, &mut model.unknown)?;
        }
    }
    Ok(model)
}

fn parse_this_device(
    r: &mut ElementReader<'_>,
    cx: &DecodeCtx<'_>,
    start: &StartTag,
) -> DecodeResult<ThisDevice> {
    let dpws = cx.helper.dpws_namespace();
    let mut device = ThisDevice::default();
    take_attributes(start, &[], &mut device.unknown);
    while let Some(child) = r.next_child()? {
        if child.is(dpws, FRIENDLY_NAME) {
            device.friendly_name.push(parse_localized(r, &child)?);
        } else if child.is(dpws, FIRMWARE_VERSION) {
            device.firmware_version = Some(r.next_text()?);
        } else if child.is(dpws, SERIAL_NUMBER) {
            device.serial_number = Some(r.next_text()?);
        } else {
            capture_unknown(r, cx.env, child, &mut device.unknown)?;
        }
    }
    Ok(device)
}

fn parse_relationship(
    r: &mut ElementReader<'_>,
    cx: &DecodeCtx<'_>,
    start: &StartTag,
) -> DecodeResult<Relationship> {
    let dpws = cx.helper.dpws_namespace();
    if start.attr(RELATIONSHIP_TYPE) != Some(cx.helper.host_relationship_type()) {
        log::debug!(
            "[decode] relationship type {:?} treated as host",
            start.attr(RELATIONSHIP_TYPE)
        );
    }
    let mut relationship = Relationship::default();
    take_attributes(start, &[RELATIONSHIP_TYPE], &mut relationship.unknown);
    while let Some(child) = r.next_child()? {
        if child.is(dpws, HOST) && relationship.host.is_none() {
            relationship.host = Some(parse_hosted(r, cx, &child)?);
        } else if child.is(dpws, HOSTED) {
            relationship.hosted.push(parse_hosted(r, cx, &child)?);
        } else {
            capture_unknown(r, cx.env, child, &mut relationship.unknown)?;
        }
    }
    Ok(relationship)
}

fn parse_hosted(
    r: &mut ElementReader<'_>,
    cx: &DecodeCtx<'_>,
    start: &StartTag,
) -> DecodeResult<HostedService> {
    let dpws = cx.helper.dpws_namespace();
    let wsa = cx.helper.addressing_namespace();
    let mut service = HostedService::default();
    take_attributes(start, &[], &mut service.unknown);
    while let Some(child) = r.next_child()? {
        if child.is(wsa, ENDPOINT_REFERENCE) {
            service.endpoint_references.push(parse_epr(r, cx.env, wsa, &child)?);
        } else if child.is(dpws, TYPES) {
            service.types = Some(r.next_qname_list()?);
        } else if child.is(dpws, SERVICE_ID) {
            service.service_id = Some(r.next_trimmed()?);
        } else {
            capture_unknown(r, cx.env, child, &mut service.unknown)?;
        }
    }
    Ok(service)
}

pub(super) fn parse_get_metadata(
    r: &mut ElementReader<'_>,
    cx: &DecodeCtx<'_>,
    _body: &StartTag,
) -> DecodeResult<MessageBody> {
    let mex = cx.helper.mex_namespace();
    let start = r.expect_child(mex, GET_METADATA)?;
    let mut request = GetMetadata::default();
    take_attributes(&start, &[], &mut request.unknown);
    while let Some(child) = r.next_child()? {
        if child.is(mex, DIALECT) {
            request.dialect = Some(r.next_trimmed()?);
        } else if child.is(mex, IDENTIFIER) {
            request.identifier = Some(r.next_trimmed()?);
        } else {
            capture_unknown(r, cx.env, child, &mut request.unknown)?;
        }
    }
    finish_body(r)?;
    Ok(MessageBody::GetMetadata(request))
}

pub(super) fn parse_get_metadata_response(
    r: &mut ElementReader<'_>,
    cx: &DecodeCtx<'_>,
    _body: &StartTag,
) -> DecodeResult<MessageBody> {
    let mex = cx.helper.mex_namespace();
    let start = r.expect_child(mex, METADATA)?;
    let mut response = GetMetadataResponse::default();
    take_attributes(&start, &[], &mut response.unknown);
    while let Some(child) = r.next_child()? {
        if child.is(mex, METADATA_SECTION) {
            response.sections.push(parse_section(r, cx, &child)?);
        } else {
            capture_unknown(r, cx.env, child, &mut response.unknown)?;
        }
    }
    finish_body(r)?;
    Ok(MessageBody::GetMetadataResponse(response))
}

/// A section holds a reference, a location, or inline content.
fn parse_section(
    r: &mut ElementReader<'_>,
    cx: &DecodeCtx<'_>,
    start: &StartTag,
) -> DecodeResult<MetadataSection> {
    let mex = cx.helper.mex_namespace();
    let dialect = start.attr(DIALECT).unwrap_or_default().to_string();
    let identifier = start.attr(IDENTIFIER).map(str::to_string);

    let content = match r.next_child()? {
        None => SectionContent::Inline(Vec::new()),
        Some(first) if first.is(mex, METADATA_REFERENCE) => {
            let epr = parse_epr(r, cx.env, cx.helper.addressing_namespace(), &first)?;
            skip_rest(r)?;
            SectionContent::Reference(epr)
        }
        Some(first) if first.is(mex, LOCATION) => {
            let location = r.next_trimmed()?;
            skip_rest(r)?;
            SectionContent::Location(location)
        }
        Some(first) => {
            let mut elements = vec![r.capture(first)?];
            while let Some(child) = r.next_child()? {
                elements.push(r.capture(child)?);
            }
            SectionContent::Inline(elements)
        }
    };
    Ok(MetadataSection {
        dialect,
        identifier,
        content,
    })
}

fn skip_rest(r: &mut ElementReader<'_>) -> DecodeResult<()> {
    while r.next_child()?.is_some() {
        r.skip()?;
    }
    Ok(())
}
