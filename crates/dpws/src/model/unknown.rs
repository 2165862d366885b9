// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Opaque XML capture and the unknown-content bag.
//!
//! Content the codec does not understand is kept as a [`RawElement`]: the
//! element name, its attributes, and its inner markup as a sequence of
//! [`Chunk`]s. Literal markup and namespace placeholders alternate, so the
//! encoder can substitute whatever prefix the target document binds to each
//! namespace while reproducing everything else verbatim.
//!
//! ```text
//! <x:Id a="1">42</x:Id>   (inner content of some captured element)
//!
//! Markup("<") Namespace(urn:x) Markup(":Id a=\"1\">42</") Namespace(urn:x) Markup(":Id>")
//! ```

use super::QualifiedName;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A fragment of captured markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    /// Literal, already-escaped markup.
    Markup(String),
    /// Placeholder for the prefix bound to this namespace URI.
    Namespace(String),
}

/// Append literal markup, merging with a trailing markup chunk.
pub(crate) fn push_markup(chunks: &mut Vec<Chunk>, markup: &str) {
    if markup.is_empty() {
        return;
    }
    if let Some(Chunk::Markup(last)) = chunks.last_mut() {
        last.push_str(markup);
    } else {
        chunks.push(Chunk::Markup(markup.to_string()));
    }
}

/// An element captured without interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawElement {
    pub name: QualifiedName,
    pub attributes: Vec<(QualifiedName, String)>,
    /// Inner content (children and text), not including the element's own tags.
    pub content: Vec<Chunk>,
    /// `(prefix, namespace)` bindings that attribute values or text inside
    /// the element refer to, such as `xsi:type="q:T"`. Redeclared on the
    /// element when it is written.
    pub namespaces: Vec<(String, String)>,
}

/// Reference parameters are opaque elements preserved exactly as received.
pub type ReferenceParameter = RawElement;

impl RawElement {
    pub fn new(name: QualifiedName) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            content: Vec::new(),
            namespaces: Vec::new(),
        }
    }

    /// Element whose content is plain text (escaped on construction).
    pub fn with_text(name: QualifiedName, text: &str) -> Self {
        let mut element = Self::new(name);
        push_markup(
            &mut element.content,
            &quick_xml::escape::partial_escape(text),
        );
        element
    }

    pub fn attribute(&self, name: &QualifiedName) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Concatenated literal markup, useful for text-only elements.
    pub fn text_content(&self) -> Option<String> {
        let mut out = String::new();
        for chunk in &self.content {
            match chunk {
                Chunk::Markup(m) if !m.contains('<') => out.push_str(m),
                _ => return None,
            }
        }
        quick_xml::escape::unescape(&out)
            .ok()
            .map(|s| s.into_owned())
    }

    /// Every namespace URI this element needs declared to be written.
    pub fn collect_namespaces(&self, out: &mut Vec<String>) {
        push_namespace(out, &self.name.namespace);
        for (name, _) in &self.attributes {
            push_namespace(out, &name.namespace);
        }
        for chunk in &self.content {
            if let Chunk::Namespace(ns) = chunk {
                push_namespace(out, ns);
            }
        }
    }
}

pub(crate) fn push_namespace(out: &mut Vec<String>, namespace: &str) {
    if !namespace.is_empty() && !out.iter().any(|n| n == namespace) {
        out.push(namespace.to_string());
    }
}

/// A typed value produced by an [`ExtensionHandler`].
pub trait ExtensionValue: fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn clone_box(&self) -> Box<dyn ExtensionValue>;
    fn eq_value(&self, other: &dyn ExtensionValue) -> bool;
}

impl<T> ExtensionValue for T
where
    T: fmt::Debug + Clone + PartialEq + Send + Sync + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_box(&self) -> Box<dyn ExtensionValue> {
        Box::new(self.clone())
    }

    fn eq_value(&self, other: &dyn ExtensionValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|o| o == self)
    }
}

/// One captured child element.
#[derive(Debug)]
pub enum UnknownElement {
    /// Captured verbatim.
    Raw(RawElement),
    /// Converted by a registered handler.
    Typed {
        name: QualifiedName,
        value: Box<dyn ExtensionValue>,
    },
}

impl UnknownElement {
    pub fn name(&self) -> &QualifiedName {
        match self {
            Self::Raw(raw) => &raw.name,
            Self::Typed { name, .. } => name,
        }
    }

    pub fn as_raw(&self) -> Option<&RawElement> {
        match self {
            Self::Raw(raw) => Some(raw),
            Self::Typed { .. } => None,
        }
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        match self {
            Self::Raw(_) => None,
            Self::Typed { value, .. } => value.as_any().downcast_ref::<T>(),
        }
    }
}

impl Clone for UnknownElement {
    fn clone(&self) -> Self {
        match self {
            Self::Raw(raw) => Self::Raw(raw.clone()),
            Self::Typed { name, value } => Self::Typed {
                name: name.clone(),
                value: value.clone_box(),
            },
        }
    }
}

impl PartialEq for UnknownElement {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Raw(a), Self::Raw(b)) => a == b,
            (
                Self::Typed { name: na, value: va },
                Self::Typed { name: nb, value: vb },
            ) => na == nb && va.eq_value(vb.as_ref()),
            _ => false,
        }
    }
}

/// Attributes and child elements that were present on the wire but not part
/// of the typed model, kept for re-emission in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnknownContent {
    pub attributes: Vec<(QualifiedName, String)>,
    pub elements: Vec<UnknownElement>,
}

impl UnknownContent {
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.elements.is_empty()
    }

    pub fn add_attribute(&mut self, name: QualifiedName, value: impl Into<String>) {
        self.attributes.push((name, value.into()));
    }

    pub fn add_element(&mut self, element: UnknownElement) {
        self.elements.push(element);
    }

    pub fn attribute(&self, name: &QualifiedName) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn elements_named<'a>(
        &'a self,
        name: &'a QualifiedName,
    ) -> impl Iterator<Item = &'a UnknownElement> + 'a {
        self.elements.iter().filter(move |e| e.name() == name)
    }

    pub(crate) fn collect_namespaces(&self, handlers: &HandlerRegistry, out: &mut Vec<String>) {
        for (name, _) in &self.attributes {
            push_namespace(out, &name.namespace);
        }
        for element in &self.elements {
            match element {
                UnknownElement::Raw(raw) => raw.collect_namespaces(out),
                UnknownElement::Typed { name, value } => {
                    push_namespace(out, &name.namespace);
                    if let Some(raw) = handlers.serialize(name, value.as_ref()) {
                        raw.collect_namespaces(out);
                    }
                }
            }
        }
    }
}

/// Parse/serialize strategy for one qualified element name.
pub trait ExtensionHandler: Send + Sync {
    /// Convert a captured element into a typed value, or `None` to skip it.
    fn parse(&self, element: &RawElement) -> Option<Box<dyn ExtensionValue>>;

    /// Turn a typed value back into markup.
    fn serialize(&self, value: &dyn ExtensionValue) -> Option<RawElement>;
}

/// Qualified name -> handler, consulted by both decoder and encoder.
///
/// Elements without a handler are still captured as [`UnknownElement::Raw`].
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<QualifiedName, Arc<dyn ExtensionHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: QualifiedName, handler: Arc<dyn ExtensionHandler>) {
        self.handlers.insert(name, handler);
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Apply the handler chain to a captured element.
    ///
    /// Returns `None` when a handler asked for the element to be skipped.
    pub fn capture(&self, raw: RawElement) -> Option<UnknownElement> {
        match self.handlers.get(&raw.name) {
            None => Some(UnknownElement::Raw(raw)),
            Some(handler) => handler.parse(&raw).map(|value| UnknownElement::Typed {
                name: raw.name,
                value,
            }),
        }
    }

    pub fn serialize(&self, name: &QualifiedName, value: &dyn ExtensionValue) -> Option<RawElement> {
        self.handlers.get(name).and_then(|h| h.serialize(value))
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("names", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Priority(u32);

    struct PriorityHandler;

    impl ExtensionHandler for PriorityHandler {
        fn parse(&self, element: &RawElement) -> Option<Box<dyn ExtensionValue>> {
            let value = element.text_content()?.trim().parse().ok()?;
            Some(Box::new(Priority(value)))
        }

        fn serialize(&self, value: &dyn ExtensionValue) -> Option<RawElement> {
            let p = value.as_any().downcast_ref::<Priority>()?;
            Some(RawElement::with_text(
                QualifiedName::new("urn:ext", "Priority"),
                &p.0.to_string(),
            ))
        }
    }

    #[test]
    fn test_push_markup_merges_adjacent_literals() {
        let mut chunks = Vec::new();
        push_markup(&mut chunks, "<");
        push_markup(&mut chunks, "a>");
        chunks.push(Chunk::Namespace("urn:x".into()));
        push_markup(&mut chunks, "");
        assert_eq!(
            chunks,
            vec![Chunk::Markup("<a>".into()), Chunk::Namespace("urn:x".into())]
        );
    }

    #[test]
    fn test_text_content_unescapes() {
        let raw = RawElement::with_text(QualifiedName::unqualified("a"), "x < y & z");
        assert_eq!(raw.text_content().as_deref(), Some("x < y & z"));
    }

    #[test]
    fn test_text_content_rejects_markup() {
        let mut raw = RawElement::new(QualifiedName::unqualified("a"));
        raw.content.push(Chunk::Markup("<b/>".into()));
        assert!(raw.text_content().is_none());
    }

    #[test]
    fn test_registry_without_handler_keeps_raw() {
        let registry = HandlerRegistry::new();
        let raw = RawElement::with_text(QualifiedName::new("urn:ext", "Other"), "1");
        let captured = registry.capture(raw.clone()).unwrap();
        assert_eq!(captured.as_raw(), Some(&raw));
    }

    #[test]
    fn test_registry_typed_roundtrip() {
        let mut registry = HandlerRegistry::new();
        let name = QualifiedName::new("urn:ext", "Priority");
        registry.register(name.clone(), Arc::new(PriorityHandler));

        let captured = registry
            .capture(RawElement::with_text(name.clone(), "7"))
            .unwrap();
        assert_eq!(captured.downcast_ref::<Priority>(), Some(&Priority(7)));

        let UnknownElement::Typed { value, .. } = &captured else {
            panic!("expected typed element");
        };
        let back = registry.serialize(&name, value.as_ref()).unwrap();
        assert_eq!(back.text_content().as_deref(), Some("7"));
    }

    #[test]
    fn test_registry_handler_may_skip() {
        let mut registry = HandlerRegistry::new();
        let name = QualifiedName::new("urn:ext", "Priority");
        registry.register(name.clone(), Arc::new(PriorityHandler));
        assert!(registry
            .capture(RawElement::with_text(name, "not-a-number"))
            .is_none());
    }

    #[test]
    fn test_typed_equality_compares_values() {
        let name = QualifiedName::new("urn:ext", "Priority");
        let a = UnknownElement::Typed {
            name: name.clone(),
            value: Box::new(Priority(1)),
        };
        let b = a.clone();
        let c = UnknownElement::Typed {
            name,
            value: Box::new(Priority(2)),
        };
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
