// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Streaming XML writer over a fixed-capacity buffer.
//!
//! All namespace prefixes of a document are bound up front in a
//! [`PrefixTable`] and declared once on the root element. Writing a name in
//! a namespace that is not in the table is an error, never an implicit
//! declaration.
//!
//! # Buffer layout
//!
//! ```text
//! +---------------------------------------+-----------------+
//! | written bytes (len)                   | free            |
//! +---------------------------------------+-----------------+
//! 0                                      len          capacity
//! ```
//!
//! `capacity` is fixed at construction; a write that would cross it fails
//! with [`EncodeError::BufferOverflow`] and leaves the buffer unchanged.

use crate::codec::{EncodeError, EncodeResult};
use crate::model::{Chunk, QualifiedName, RawElement};
use crate::protocol::constants::{GENERATED_PREFIX, PREFIX_XML, XML_NS};
use quick_xml::escape::{escape, partial_escape};
use std::io;

/// Reusable encode buffer with a hard upper bound.
#[derive(Debug)]
pub struct BoundedBuffer {
    data: Vec<u8>,
    capacity: usize,
}

impl BoundedBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Append bytes, failing without a partial write if they do not fit.
    pub fn put(&mut self, bytes: &[u8]) -> EncodeResult<()> {
        if self.data.len() + bytes.len() > self.capacity {
            return Err(EncodeError::BufferOverflow {
                capacity: self.capacity,
            });
        }
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    /// Insert bytes at `offset`, shifting the tail.
    pub fn insert(&mut self, offset: usize, bytes: &[u8]) -> EncodeResult<()> {
        if self.data.len() + bytes.len() > self.capacity {
            return Err(EncodeError::BufferOverflow {
                capacity: self.capacity,
            });
        }
        self.data.splice(offset..offset, bytes.iter().copied());
        Ok(())
    }
}

/// Namespace URI -> prefix bindings of one document.
#[derive(Debug, Clone, Default)]
pub struct PrefixTable {
    bindings: Vec<(String, String)>,
    generated: usize,
}

impl PrefixTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a fixed prefix; a namespace keeps its first binding.
    pub fn bind(&mut self, namespace: &str, prefix: &str) {
        if self.prefix(namespace).is_none() {
            self.bindings.push((namespace.to_string(), prefix.to_string()));
        }
    }

    /// Bind a generated `i<n>` prefix unless the namespace is already bound.
    pub fn bind_generated(&mut self, namespace: &str) {
        if namespace.is_empty() || self.prefix(namespace).is_some() {
            return;
        }
        let prefix = format!("{}{}", GENERATED_PREFIX, self.generated);
        self.generated += 1;
        self.bindings.push((namespace.to_string(), prefix));
    }

    pub fn prefix(&self, namespace: &str) -> Option<&str> {
        if namespace == XML_NS {
            return Some(PREFIX_XML);
        }
        self.bindings
            .iter()
            .find(|(ns, _)| ns == namespace)
            .map(|(_, p)| p.as_str())
    }

    /// Namespace a prefix is bound to in this document.
    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        if prefix == PREFIX_XML {
            return Some(XML_NS);
        }
        self.bindings
            .iter()
            .find(|(_, p)| p == prefix)
            .map(|(ns, _)| ns.as_str())
    }

    pub fn is_bound(&self, namespace: &str) -> bool {
        self.prefix(namespace).is_some()
    }

    /// `(prefix, namespace)` pairs in binding order.
    pub fn declarations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings.iter().map(|(ns, p)| (p.as_str(), ns.as_str()))
    }

    /// `prefix:local`, or `local` for an unqualified name.
    pub fn qualify(&self, namespace: &str, local: &str) -> EncodeResult<String> {
        if namespace.is_empty() {
            return Ok(local.to_string());
        }
        match self.prefix(namespace) {
            Some(prefix) => Ok(format!("{}:{}", prefix, local)),
            None => Err(EncodeError::UndeclaredNamespace(namespace.to_string())),
        }
    }

    pub fn qualify_name(&self, name: &QualifiedName) -> EncodeResult<String> {
        self.qualify(&name.namespace, &name.local)
    }
}

/// Output flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializerMode {
    /// XML declaration, self-closing empty elements.
    Streaming,
    /// No declaration, every element written with an explicit end tag, so
    /// the signed byte range is reproducible by any canonicalizing reader.
    Canonical,
}

/// Element-level writer bound to one document.
pub struct XmlSink<'b> {
    out: &'b mut BoundedBuffer,
    prefixes: &'b PrefixTable,
    mode: SerializerMode,
    open: Vec<String>,
    in_start_tag: bool,
}

impl<'b> XmlSink<'b> {
    pub fn new(out: &'b mut BoundedBuffer, prefixes: &'b PrefixTable, mode: SerializerMode) -> Self {
        Self {
            out,
            prefixes,
            mode,
            open: Vec::new(),
            in_start_tag: false,
        }
    }

    pub fn prefixes(&self) -> &PrefixTable {
        self.prefixes
    }

    pub fn mode(&self) -> SerializerMode {
        self.mode
    }

    pub fn declaration(&mut self) -> EncodeResult<()> {
        if self.mode == SerializerMode::Streaming {
            self.out.put(b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        }
        Ok(())
    }

    pub fn start(&mut self, namespace: &str, local: &str) -> EncodeResult<()> {
        self.close_start_tag()?;
        let name = self.prefixes.qualify(namespace, local)?;
        self.out.put(b"<")?;
        self.out.put(name.as_bytes())?;
        self.open.push(name);
        self.in_start_tag = true;
        Ok(())
    }

    /// Declare every bound prefix on the element just started.
    pub fn declare_prefixes(&mut self) -> EncodeResult<()> {
        self.require_start_tag()?;
        for (prefix, namespace) in self.prefixes.declarations() {
            self.out.put(b" xmlns:")?;
            self.out.put(prefix.as_bytes())?;
            self.out.put(b"=\"")?;
            self.out.put(escape(namespace).as_bytes())?;
            self.out.put(b"\"")?;
        }
        Ok(())
    }

    /// Declare `(prefix, namespace)` bindings on the element just started.
    ///
    /// Prefixes the document already binds to the same namespace are not
    /// repeated. A prefix the document binds to another namespace is left
    /// alone: redeclaring it would rebind the names written with it.
    pub fn namespace_bindings(&mut self, bindings: &[(String, String)]) -> EncodeResult<()> {
        self.require_start_tag()?;
        for (prefix, namespace) in bindings {
            match self.prefixes.namespace(prefix) {
                Some(bound) if bound == namespace => {}
                Some(bound) => log::warn!(
                    "[encode] prefix '{}' is bound to {}, not redeclared for {}",
                    prefix,
                    bound,
                    namespace
                ),
                None => {
                    self.out.put(b" xmlns:")?;
                    self.out.put(prefix.as_bytes())?;
                    self.out.put(b"=\"")?;
                    self.out.put(escape(namespace.as_str()).as_bytes())?;
                    self.out.put(b"\"")?;
                }
            }
        }
        Ok(())
    }

    pub fn attribute(&mut self, namespace: &str, local: &str, value: &str) -> EncodeResult<()> {
        self.require_start_tag()?;
        let name = self.prefixes.qualify(namespace, local)?;
        self.out.put(b" ")?;
        self.out.put(name.as_bytes())?;
        self.out.put(b"=\"")?;
        self.out.put(escape(value).as_bytes())?;
        self.out.put(b"\"")
    }

    pub fn attributes(&mut self, attributes: &[(QualifiedName, String)]) -> EncodeResult<()> {
        for (name, value) in attributes {
            self.attribute(&name.namespace, &name.local, value)?;
        }
        Ok(())
    }

    pub fn text(&mut self, value: &str) -> EncodeResult<()> {
        self.close_start_tag()?;
        self.out.put(partial_escape(value).as_bytes())
    }

    /// Text value of a QName, using the document's prefix bindings.
    pub fn qname_text(&self, name: &QualifiedName) -> EncodeResult<String> {
        self.prefixes.qualify_name(name)
    }

    pub fn end(&mut self) -> EncodeResult<()> {
        let Some(name) = self.open.pop() else {
            return Err(unbalanced("end tag without open element"));
        };
        if self.in_start_tag && self.mode == SerializerMode::Streaming {
            self.in_start_tag = false;
            return self.out.put(b"/>");
        }
        self.close_start_tag()?;
        self.out.put(b"</")?;
        self.out.put(name.as_bytes())?;
        self.out.put(b">")
    }

    /// `<name>text</name>`.
    pub fn leaf(&mut self, namespace: &str, local: &str, text: &str) -> EncodeResult<()> {
        self.start(namespace, local)?;
        self.text(text)?;
        self.end()
    }

    /// Re-emit captured markup, substituting this document's prefixes.
    pub fn chunks(&mut self, chunks: &[Chunk]) -> EncodeResult<()> {
        self.close_start_tag()?;
        for chunk in chunks {
            match chunk {
                Chunk::Markup(markup) => self.out.put(markup.as_bytes())?,
                Chunk::Namespace(namespace) => match self.prefixes.prefix(namespace) {
                    Some(prefix) => self.out.put(prefix.as_bytes())?,
                    None => return Err(EncodeError::UndeclaredNamespace(namespace.clone())),
                },
            }
        }
        Ok(())
    }

    pub fn raw_element(&mut self, element: &RawElement) -> EncodeResult<()> {
        self.start(&element.name.namespace, &element.name.local)?;
        self.namespace_bindings(&element.namespaces)?;
        self.attributes(&element.attributes)?;
        if !element.content.is_empty() {
            self.chunks(&element.content)?;
        }
        self.end()
    }

    /// Bytes written so far, after closing any pending start tag.
    pub fn position(&mut self) -> EncodeResult<usize> {
        self.close_start_tag()?;
        Ok(self.out.len())
    }

    /// Everything written so far.
    pub fn written(&self) -> &[u8] {
        self.out.as_slice()
    }

    pub fn depth(&self) -> usize {
        self.open.len()
    }

    fn close_start_tag(&mut self) -> EncodeResult<()> {
        if self.in_start_tag {
            self.in_start_tag = false;
            self.out.put(b">")?;
        }
        Ok(())
    }

    fn require_start_tag(&self) -> EncodeResult<()> {
        if self.in_start_tag {
            Ok(())
        } else {
            Err(unbalanced("attribute written outside a start tag"))
        }
    }
}

fn unbalanced(msg: &str) -> EncodeError {
    EncodeError::Io(io::Error::new(io::ErrorKind::InvalidInput, msg.to_string()))
}
