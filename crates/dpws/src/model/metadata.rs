// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! WS-Transfer Get and WS-MetadataExchange bodies.

use super::epr::collect_qnames;
use super::{
    EndpointReference, HandlerRegistry, LocalizedString, QualifiedName, RawElement,
    UnknownContent,
};

/// `dpws:ThisModel`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThisModel {
    pub manufacturer: Vec<LocalizedString>,
    pub manufacturer_url: Option<String>,
    pub model_name: Vec<LocalizedString>,
    pub model_number: Option<String>,
    pub model_url: Option<String>,
    pub presentation_url: Option<String>,
    pub unknown: UnknownContent,
}

/// `dpws:ThisDevice`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThisDevice {
    pub friendly_name: Vec<LocalizedString>,
    pub firmware_version: Option<String>,
    pub serial_number: Option<String>,
    pub unknown: UnknownContent,
}

/// `dpws:Host` or `dpws:Hosted` entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostedService {
    pub endpoint_references: Vec<EndpointReference>,
    pub types: Option<Vec<QualifiedName>>,
    /// Required for hosted services, absent on the host entry.
    pub service_id: Option<String>,
    pub unknown: UnknownContent,
}

impl HostedService {
    fn collect_namespaces(&self, handlers: &HandlerRegistry, out: &mut Vec<String>) {
        for epr in &self.endpoint_references {
            epr.collect_namespaces(handlers, out);
        }
        if let Some(types) = &self.types {
            collect_qnames(types, out);
        }
        self.unknown.collect_namespaces(handlers, out);
    }
}

/// `dpws:Relationship` of type host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relationship {
    pub host: Option<HostedService>,
    pub hosted: Vec<HostedService>,
    pub unknown: UnknownContent,
}

/// Transfer GetResponse: the device metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetResponse {
    pub this_model: Option<ThisModel>,
    pub this_device: Option<ThisDevice>,
    pub relationship: Option<Relationship>,
    /// Metadata sections with a dialect the codec does not model.
    pub other_sections: Vec<RawElement>,
    pub unknown: UnknownContent,
}

impl GetResponse {
    pub(crate) fn collect_namespaces(&self, handlers: &HandlerRegistry, out: &mut Vec<String>) {
        if let Some(model) = &self.this_model {
            model.unknown.collect_namespaces(handlers, out);
        }
        if let Some(device) = &self.this_device {
            device.unknown.collect_namespaces(handlers, out);
        }
        if let Some(rel) = &self.relationship {
            if let Some(host) = &rel.host {
                host.collect_namespaces(handlers, out);
            }
            for hosted in &rel.hosted {
                hosted.collect_namespaces(handlers, out);
            }
            rel.unknown.collect_namespaces(handlers, out);
        }
        for section in &self.other_sections {
            section.collect_namespaces(out);
        }
        self.unknown.collect_namespaces(handlers, out);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetMetadata {
    pub dialect: Option<String>,
    pub identifier: Option<String>,
    pub unknown: UnknownContent,
}

/// Content of one `mex:MetadataSection`.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionContent {
    Reference(EndpointReference),
    Location(String),
    Inline(Vec<RawElement>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetadataSection {
    pub dialect: String,
    pub identifier: Option<String>,
    pub content: SectionContent,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetMetadataResponse {
    pub sections: Vec<MetadataSection>,
    pub unknown: UnknownContent,
}

impl GetMetadataResponse {
    pub(crate) fn collect_namespaces(&self, handlers: &HandlerRegistry, out: &mut Vec<String>) {
        for section in &self.sections {
            match &section.content {
                SectionContent::Reference(epr) => epr.collect_namespaces(handlers, out),
                SectionContent::Location(_) => {}
                SectionContent::Inline(elements) => {
                    for element in elements {
                        element.collect_namespaces(out);
                    }
                }
            }
        }
        self.unknown.collect_namespaces(handlers, out);
    }
}
