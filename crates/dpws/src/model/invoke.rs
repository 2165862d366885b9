// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Application-level Invoke and SOAP Fault bodies.

use super::discovery::collect_name;
use super::{HandlerRegistry, LocalizedString, QualifiedName, UnknownContent};

/// Generic parameter tree parsed from an operation's input/output element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterValue {
    pub name: QualifiedName,
    pub attributes: Vec<(QualifiedName, String)>,
    /// Text content of a leaf element.
    pub text: Option<String>,
    pub children: Vec<ParameterValue>,
}

impl ParameterValue {
    pub fn new(name: QualifiedName) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn leaf(name: QualifiedName, text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(name)
        }
    }

    pub fn with_child(mut self, child: ParameterValue) -> Self {
        self.children.push(child);
        self
    }

    pub fn child(&self, local: &str) -> Option<&ParameterValue> {
        self.children.iter().find(|c| c.name.local == local)
    }

    pub(crate) fn collect_namespaces(&self, out: &mut Vec<String>) {
        collect_name(&self.name, out);
        for (name, _) in &self.attributes {
            collect_name(name, out);
        }
        for child in &self.children {
            child.collect_namespaces(out);
        }
    }
}

/// Application message whose action is not part of the protocol table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Invoke {
    pub content: Option<ParameterValue>,
    pub unknown: UnknownContent,
}

impl Invoke {
    pub(crate) fn collect_namespaces(&self, handlers: &HandlerRegistry, out: &mut Vec<String>) {
        if let Some(content) = &self.content {
            content.collect_namespaces(out);
        }
        self.unknown.collect_namespaces(handlers, out);
    }
}

/// `s12:Fault`.
#[derive(Debug, Clone, PartialEq)]
pub struct Fault {
    /// `s12:Sender`, `s12:Receiver`, ...
    pub code: QualifiedName,
    pub subcode: Option<QualifiedName>,
    pub subsubcode: Option<QualifiedName>,
    pub reasons: Vec<LocalizedString>,
    pub detail: Option<ParameterValue>,
    pub unknown: UnknownContent,
}

impl Fault {
    pub fn new(code: QualifiedName, reason: LocalizedString) -> Self {
        Self {
            code,
            subcode: None,
            subsubcode: None,
            reasons: vec![reason],
            detail: None,
            unknown: UnknownContent::default(),
        }
    }

    pub(crate) fn collect_namespaces(&self, handlers: &HandlerRegistry, out: &mut Vec<String>) {
        collect_name(&self.code, out);
        if let Some(sub) = &self.subcode {
            collect_name(sub, out);
        }
        if let Some(sub) = &self.subsubcode {
            collect_name(sub, out);
        }
        if let Some(detail) = &self.detail {
            detail.collect_namespaces(out);
        }
        self.unknown.collect_namespaces(handlers, out);
    }
}
