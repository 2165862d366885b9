// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Transfer GetResponse and WS-MetadataExchange bodies.

use super::{write_epr, write_localized, write_qnames, write_unknown_elements, EncodeCtx};
use crate::codec::EncodeResult;
use crate::model::{
    GetMetadata, GetMetadataResponse, GetResponse, HostedService, LocalizedString, Relationship,
    SectionContent, ThisDevice, ThisModel,
};
use crate::protocol::constants::{
    DIALECT, ENDPOINT_REFERENCE, FIRMWARE_VERSION, FRIENDLY_NAME, GET_METADATA, HOST, HOSTED,
    IDENTIFIER, LOCATION, MANUFACTURER, MANUFACTURER_URL, METADATA, METADATA_REFERENCE,
    METADATA_SECTION, MODEL_NAME, MODEL_NUMBER, MODEL_URL, PRESENTATION_URL, RELATIONSHIP,
    RELATIONSHIP_TYPE, SERIAL_NUMBER, SERVICE_ID, THIS_DEVICE, THIS_MODEL, TYPES,
};
use crate::xml::XmlSink;

pub(super) fn write_get_response(
    w: &mut XmlSink<'_>,
    cx: &EncodeCtx<'_>,
    response: &GetResponse,
) -> EncodeResult<()> {
    let mex = cx.helper.mex_namespace();
    w.start(mex, METADATA)?;
    w.attributes(&response.unknown.attributes)?;
    if let Some(model) = &response.this_model {
        start_section(w, mex, cx.helper.this_model_dialect())?;
        write_this_model(w, cx, model)?;
        w.end()?;
    }
    if let Some(device) = &response.this_device {
        start_section(w, mex, cx.helper.this_device_dialect())?;
        write_this_device(w, cx, device)?;
        w.end()?;
    }
    if let Some(relationship) = &response.relationship {
        start_section(w, mex, cx.helper.relationship_dialect())?;
        write_relationship(w, cx, relationship)?;
        w.end()?;
    }
    for section in &response.other_sections {
        w.raw_element(section)?;
    }
    write_unknown_elements(w, cx, &response.unknown)?;
    w.end()
}

fn start_section(w: &mut XmlSink<'_>, mex: &str, dialect: &str) -> EncodeResult<()> {
    w.start(mex, METADATA_SECTION)?;
    w.attribute("", DIALECT, dialect)
}

fn write_all_localized(
    w: &mut XmlSink<'_>,
    namespace: &str,
    local: &str,
    values: &[LocalizedString],
) -> EncodeResult<()> {
    for value in values {
        write_localized(w, namespace, local, value)?;
    }
    Ok(())
}

fn write_opt(w: &mut XmlSink<'_>, namespace: &str, local: &str, value: Option<&String>) -> EncodeResult<()> {
    match value {
        Some(value) => w.leaf(namespace, local, value),
        None => Ok(()),
    }
}

fn write_this_model(w: &mut XmlSink<'_>, cx: &EncodeCtx<'_>, model: &ThisModel) -> EncodeResult<()> {
    let dpws = cx.helper.dpws_namespace();
    w.start(dpws, THIS_MODEL)?;
    w.attributes(&model.unknown.attributes)?;
    write_all_localized(w, dpws, MANUFACTURER, &model.manufacturer)?;
    write_opt(w, dpws, MANUFACTURER_URL, model.manufacturer_url.as_ref())?;
    write_all_localized(w, dpws, MODEL_NAME, &model.model_name)?;
    write_opt(w, dpws, MODEL_NUMBER, model.model_number.as_ref())?;
    write_opt(w, dpws, MODEL_URL, model.model_url.as_ref())?;
    write_opt(w, dpws, PRESENTATION_URL, model.presentation_url.as_ref())?;
    write_unknown_elements(w, cx, &model.unknown)?;
    w.end()
}

fn write_this_device(w: &mut XmlSink<'_>, cx: &EncodeCtx<'_>, device: &ThisDevice) -> EncodeResult<()> {
    let dpws = cx.helper.dpws_namespace();
    w.start(dpws, THIS_DEVICE)?;
    w.attributes(&device.unknown.attributes)?;
    write_all_localized(w, dpws, FRIENDLY_NAME, &device.friendly_name)?;
    write_opt(w, dpws, FIRMWARE_VERSION, device.firmware_version.as_ref())?;
    write_opt(w, dpws, SERIAL_NUMBER, device.serial_number.as_ref())?;
    write_unknown_elements(w, cx, &device.unknown)?;
    w.end()
}

fn write_relationship(
    w: &mut XmlSink<'_>,
    cx: &EncodeCtx<'_>,
    relationship: &Relationship,
) -> EncodeResult<()> {
    let dpws = cx.helper.dpws_namespace();
    w.start(dpws, RELATIONSHIP)?;
    w.attribute("", RELATIONSHIP_TYPE, cx.helper.host_relationship_type())?;
    w.attributes(&relationship.unknown.attributes)?;
    if let Some(host) = &relationship.host {
        write_hosted(w, cx, HOST, host)?;
    }
    for hosted in &relationship.hosted {
        write_hosted(w, cx, HOSTED, hosted)?;
    }
    write_unknown_elements(w, cx, &relationship.unknown)?;
    w.end()
}

fn write_hosted(
    w: &mut XmlSink<'_>,
    cx: &EncodeCtx<'_>,
    local: &str,
    service: &HostedService,
) -> EncodeResult<()> {
    let dpws = cx.helper.dpws_namespace();
    w.start(dpws, local)?;
    w.attributes(&service.unknown.attributes)?;
    for epr in &service.endpoint_references {
        write_epr(w, cx, cx.helper.addressing_namespace(), ENDPOINT_REFERENCE, epr)?;
    }
    if let Some(types) = &service.types {
        write_qnames(w, dpws, TYPES, types)?;
    }
    write_opt(w, dpws, SERVICE_ID, service.service_id.as_ref())?;
    write_unknown_elements(w, cx, &service.unknown)?;
    w.end()
}

pub(super) fn write_get_metadata(
    w: &mut XmlSink<'_>,
    cx: &EncodeCtx<'_>,
    request: &GetMetadata,
) -> EncodeResult<()> {
    let mex = cx.helper.mex_namespace();
    w.start(mex, GET_METADATA)?;
    w.attributes(&request.unknown.attributes)?;
    write_opt(w, mex, DIALECT, request.dialect.as_ref())?;
    write_opt(w, mex, IDENTIFIER, request.identifier.as_ref())?;
    write_unknown_elements(w, cx, &request.unknown)?;
    w.end()
}

pub(super) fn write_get_metadata_response(
    w: &mut XmlSink<'_>,
    cx: &EncodeCtx<'_>,
    response: &GetMetadataResponse,
) -> EncodeResult<()> {
    let mex = cx.helper.mex_namespace();
    w.start(mex, METADATA)?;
    w.attributes(&response.unknown.attributes)?;
    for section in &response.sections {
        start_section(w, mex, &section.dialect)?;
        if let Some(identifier) = &section.identifier {
            w.attribute("", IDENTIFIER, identifier)?;
        }
        match &section.content {
            SectionContent::Reference(epr) => write_epr(w, cx, mex, METADATA_REFERENCE, epr)?,
            SectionContent::Location(location) => w.leaf(mex, LOCATION, location)?,
            SectionContent::Inline(elements) => {
                for element in elements {
                    w.raw_element(element)?;
                }
            }
        }
        w.end()?;
    }
    write_unknown_elements(w, cx, &response.unknown)?;
    w.end()
}
