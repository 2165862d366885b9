// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! WS-Addressing endpoint references.

use super::{push_namespace, HandlerRegistry, RawElement, ReferenceParameter, UnknownContent};

/// Address plus opaque reference parameters identifying a logical endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndpointReference {
    pub address: String,
    pub reference_parameters: Vec<ReferenceParameter>,
    /// `wsa:Metadata` children, captured opaquely.
    pub metadata: Vec<RawElement>,
    pub unknown: UnknownContent,
}

impl EndpointReference {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }

    pub fn with_reference_parameter(mut self, parameter: ReferenceParameter) -> Self {
        self.reference_parameters.push(parameter);
        self
    }

    pub(crate) fn collect_namespaces(&self, handlers: &HandlerRegistry, out: &mut Vec<String>) {
        for parameter in &self.reference_parameters {
            parameter.collect_namespaces(out);
        }
        for element in &self.metadata {
            element.collect_namespaces(out);
        }
        self.unknown.collect_namespaces(handlers, out);
    }
}

/// Collect namespaces of an optional EPR.
pub(crate) fn collect_opt(
    epr: Option<&EndpointReference>,
    handlers: &HandlerRegistry,
    out: &mut Vec<String>,
) {
    if let Some(epr) = epr {
        epr.collect_namespaces(handlers, out);
    }
}

/// Namespaces used by a list of QName values.
pub(crate) fn collect_qnames(names: &[super::QualifiedName], out: &mut Vec<String>) {
    for name in names {
        push_namespace(out, &name.namespace);
    }
}
