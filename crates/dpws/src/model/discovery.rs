// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! WS-Discovery message bodies.

use super::epr::collect_qnames;
use super::{push_namespace, EndpointReference, HandlerRegistry, QualifiedName, UnknownContent};

/// `wsd:Scopes` list with its optional matching rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopeSet {
    pub match_by: Option<String>,
    pub scopes: Vec<String>,
    pub unknown: UnknownContent,
}

impl ScopeSet {
    pub fn new(scopes: Vec<String>) -> Self {
        Self {
            scopes,
            ..Default::default()
        }
    }
}

/// Fields shared by Hello, Bye, ProbeMatch and ResolveMatch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoveryData {
    pub endpoint_reference: EndpointReference,
    pub types: Option<Vec<QualifiedName>>,
    pub scopes: Option<ScopeSet>,
    pub xaddrs: Option<Vec<String>>,
    pub metadata_version: Option<u64>,
    pub unknown: UnknownContent,
}

impl DiscoveryData {
    pub fn new(endpoint_reference: EndpointReference) -> Self {
        Self {
            endpoint_reference,
            ..Default::default()
        }
    }

    pub fn with_types(mut self, types: Vec<QualifiedName>) -> Self {
        self.types = Some(types);
        self
    }

    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = Some(ScopeSet::new(scopes));
        self
    }

    pub fn with_xaddrs(mut self, xaddrs: Vec<String>) -> Self {
        self.xaddrs = Some(xaddrs);
        self
    }

    pub fn with_metadata_version(mut self, version: u64) -> Self {
        self.metadata_version = Some(version);
        self
    }

    pub(crate) fn collect_namespaces(&self, handlers: &HandlerRegistry, out: &mut Vec<String>) {
        self.endpoint_reference.collect_namespaces(handlers, out);
        if let Some(types) = &self.types {
            collect_qnames(types, out);
        }
        if let Some(scopes) = &self.scopes {
            scopes.unknown.collect_namespaces(handlers, out);
        }
        self.unknown.collect_namespaces(handlers, out);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hello {
    pub data: DiscoveryData,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bye {
    pub data: DiscoveryData,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Probe {
    pub types: Option<Vec<QualifiedName>>,
    pub scopes: Option<ScopeSet>,
    pub unknown: UnknownContent,
}

impl Probe {
    pub(crate) fn collect_namespaces(&self, handlers: &HandlerRegistry, out: &mut Vec<String>) {
        if let Some(types) = &self.types {
            collect_qnames(types, out);
        }
        if let Some(scopes) = &self.scopes {
            scopes.unknown.collect_namespaces(handlers, out);
        }
        self.unknown.collect_namespaces(handlers, out);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeMatches {
    pub matches: Vec<DiscoveryData>,
    pub unknown: UnknownContent,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolve {
    pub endpoint_reference: EndpointReference,
    pub unknown: UnknownContent,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolveMatches {
    pub resolve_match: Option<DiscoveryData>,
    pub unknown: UnknownContent,
}

/// Namespaces of a plain QName (used by callers that only hold one name).
pub(crate) fn collect_name(name: &QualifiedName, out: &mut Vec<String>) {
    push_namespace(out, &name.namespace);
}
