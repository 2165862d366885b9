// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Pull-style, namespace-resolving element reader.
//!
//! Thin layer over `quick_xml::NsReader` exposing the operations the decoder
//! needs: next start/end tag, element text, attribute lookup, QName
//! resolution for text values, and capture of an arbitrary subtree into
//! [`Chunk`]s for faithful re-emission.

use crate::codec::{DecodeError, DecodeResult};
use crate::model::{push_markup, Chunk, QualifiedName, RawElement};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{QName, ResolveResult};
use quick_xml::NsReader;

/// A resolved start tag.
#[derive(Debug, Clone)]
pub struct StartTag {
    pub name: QualifiedName,
    pub attributes: Vec<(QualifiedName, String)>,
    /// Byte offset of the `<` opening this tag.
    pub offset: usize,
}

impl StartTag {
    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.name.is(namespace, local)
    }

    pub fn attribute(&self, namespace: &str, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.is(namespace, local))
            .map(|(_, v)| v.as_str())
    }

    /// Unqualified attribute lookup.
    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attribute("", local)
    }

    /// Attributes not listed as known unqualified names.
    pub fn other_attributes<'s>(
        &'s self,
        known: &'s [&'s str],
    ) -> impl Iterator<Item = &'s (QualifiedName, String)> + 's {
        self.attributes
            .iter()
            .filter(move |(n, _)| n.has_namespace() || !known.contains(&n.local.as_str()))
    }
}

/// Next structural event.
#[derive(Debug)]
pub enum Tag {
    Start(StartTag),
    /// End of the current element; `end` is the offset just past its `>`.
    End { end: usize },
}

/// Next node in mixed content.
#[derive(Debug)]
pub enum Content {
    Start(StartTag),
    /// Unescaped character data (text or CDATA).
    Text(String),
    End { end: usize },
}

pub struct ElementReader<'a> {
    reader: NsReader<&'a [u8]>,
    input: &'a [u8],
}

impl<'a> ElementReader<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        let mut reader = NsReader::from_reader(input);
        let config = reader.config_mut();
        config.expand_empty_elements = true;
        config.trim_text(false);
        Self { reader, input }
    }

    pub fn input(&self) -> &'a [u8] {
        self.input
    }

    pub fn position(&self) -> usize {
        self.reader.buffer_position() as usize
    }

    /// Next start tag, end tag or text node; comments and processing
    /// instructions are skipped.
    pub fn next_content(&mut self) -> DecodeResult<Content> {
        loop {
            let offset = self.position();
            let (resolved, event) = self.reader.read_resolved_event()?;
            let namespace = namespace_of(resolved)?;
            match event {
                Event::Start(start) => {
                    let name = QualifiedName::new(namespace, local_of(&start)?);
                    let attributes = self.attributes_of(&start)?;
                    return Ok(Content::Start(StartTag {
                        name,
                        attributes,
                        offset,
                    }));
                }
                Event::End(_) => {
                    return Ok(Content::End {
                        end: self.position(),
                    })
                }
                Event::Text(text) => return Ok(Content::Text(text.unescape()?.into_owned())),
                Event::CData(data) => {
                    return Ok(Content::Text(std::str::from_utf8(&data)?.to_string()))
                }
                Event::Eof => {
                    return Err(DecodeError::Malformed("unexpected end of document".into()))
                }
                Event::Empty(_)
                | Event::Comment(_)
                | Event::Decl(_)
                | Event::PI(_)
                | Event::DocType(_) => {}
            }
        }
    }

    /// Advance to the next start or end tag, skipping text.
    pub fn next_tag(&mut self) -> DecodeResult<Tag> {
        loop {
            match self.next_content()? {
                Content::Start(start) => return Ok(Tag::Start(start)),
                Content::End { end } => return Ok(Tag::End { end }),
                Content::Text(text) => {
                    if !text.trim().is_empty() {
                        log::debug!("[xml] ignoring stray text between elements");
                    }
                }
            }
        }
    }

    /// Read the next child start tag, or `None` at the end of the parent.
    pub fn next_child(&mut self) -> DecodeResult<Option<StartTag>> {
        match self.next_tag()? {
            Tag::Start(start) => Ok(Some(start)),
            Tag::End { .. } => Ok(None),
        }
    }

    /// Read the next child, which must be `{namespace}local`.
    pub fn expect_child(&mut self, namespace: &str, local: &str) -> DecodeResult<StartTag> {
        match self.next_child()? {
            Some(start) if start.is(namespace, local) => Ok(start),
            Some(start) => Err(DecodeError::unexpected(
                &start.name,
                QualifiedName::new(namespace, local).to_string(),
            )),
            None => Err(DecodeError::missing(namespace, local)),
        }
    }

    /// Text content of the current element; consumes its end tag.
    pub fn next_text(&mut self) -> DecodeResult<String> {
        let mut out = String::new();
        loop {
            let (resolved, event) = self.reader.read_resolved_event()?;
            let namespace = namespace_of(resolved)?;
            match event {
                Event::Text(text) => out.push_str(&text.unescape()?),
                Event::CData(data) => out.push_str(std::str::from_utf8(&data)?),
                Event::End(_) => return Ok(out),
                Event::Start(start) => {
                    let name = QualifiedName::new(namespace, local_of(&start)?);
                    return Err(DecodeError::unexpected(&name, "text content"));
                }
                Event::Eof => {
                    return Err(DecodeError::Malformed("unexpected end of document".into()))
                }
                _ => {}
            }
        }
    }

    /// Trimmed text content.
    pub fn next_trimmed(&mut self) -> DecodeResult<String> {
        Ok(self.next_text()?.trim().to_string())
    }

    /// Resolve a `prefix:local` text value against the in-scope namespaces.
    pub fn resolve_qname(&self, text: &str) -> DecodeResult<QualifiedName> {
        let (resolved, local) = self.reader.resolve_element(QName(text.as_bytes()));
        let namespace = namespace_of(resolved).map_err(|_| DecodeError::InvalidValue {
            element: "QName".into(),
            value: text.to_string(),
        })?;
        let local = std::str::from_utf8(local.as_ref())?;
        Ok(QualifiedName::new(namespace, local))
    }

    /// Whitespace-separated QName list.
    pub fn next_qname_list(&mut self) -> DecodeResult<Vec<QualifiedName>> {
        let text = self.next_text()?;
        text.split_whitespace()
            .map(|token| self.resolve_qname(token))
            .collect()
    }

    /// Skip the rest of the current element, including its end tag.
    pub fn skip(&mut self) -> DecodeResult<()> {
        self.capture_content().map(|_| ())
    }

    /// Capture the current element (whose start tag was just read).
    pub fn capture(&mut self, start: StartTag) -> DecodeResult<RawElement> {
        let mut namespaces = Vec::new();
        for (_, value) in &start.attributes {
            self.note_prefixes(value, &mut namespaces);
        }
        let content = self.capture_chunks(Some(&mut namespaces))?;
        Ok(RawElement {
            name: start.name,
            attributes: start.attributes,
            content,
            namespaces,
        })
    }

    /// Capture everything up to the end tag of the current element.
    ///
    /// Namespace declarations are not copied; every qualified name becomes a
    /// [`Chunk::Namespace`] placeholder so the markup can be re-emitted under
    /// any prefix binding.
    pub fn capture_content(&mut self) -> DecodeResult<Vec<Chunk>> {
        self.capture_chunks(None)
    }

    /// Capture loop; with `bindings`, also records the in-scope binding of
    /// every prefix used inside attribute values and text.
    fn capture_chunks(
        &mut self,
        mut bindings: Option<&mut Vec<(String, String)>>,
    ) -> DecodeResult<Vec<Chunk>> {
        let mut chunks = Vec::new();
        let mut depth = 0usize;
        loop {
            let (resolved, event) = self.reader.read_resolved_event()?;
            let namespace = namespace_of(resolved)?;
            match event {
                Event::Start(start) => {
                    depth += 1;
                    push_markup(&mut chunks, "<");
                    push_name(&mut chunks, &namespace, local_of(&start)?);
                    for (name, value) in self.attributes_of(&start)? {
                        if let Some(bindings) = bindings.as_deref_mut() {
                            self.note_prefixes(&value, bindings);
                        }
                        push_markup(&mut chunks, " ");
                        push_name(&mut chunks, &name.namespace, &name.local);
                        push_markup(&mut chunks, "=\"");
                        push_markup(&mut chunks, &quick_xml::escape::escape(value.as_str()));
                        push_markup(&mut chunks, "\"");
                    }
                    push_markup(&mut chunks, ">");
                }
                Event::End(end) => {
                    if depth == 0 {
                        return Ok(chunks);
                    }
                    depth -= 1;
                    let local = std::str::from_utf8(end.local_name().into_inner())?;
                    push_markup(&mut chunks, "</");
                    push_name(&mut chunks, &namespace, local);
                    push_markup(&mut chunks, ">");
                }
                Event::Text(text) => {
                    let text = std::str::from_utf8(&text)?;
                    if let Some(bindings) = bindings.as_deref_mut() {
                        self.note_prefixes(text, bindings);
                    }
                    push_markup(&mut chunks, text);
                }
                Event::CData(data) => {
                    push_markup(&mut chunks, "<![CDATA[");
                    push_markup(&mut chunks, std::str::from_utf8(&data)?);
                    push_markup(&mut chunks, "]]>");
                }
                Event::Comment(comment) => {
                    push_markup(&mut chunks, "<!--");
                    push_markup(&mut chunks, std::str::from_utf8(&comment)?);
                    push_markup(&mut chunks, "-->");
                }
                Event::PI(pi) => {
                    push_markup(&mut chunks, "<?");
                    push_markup(&mut chunks, std::str::from_utf8(&pi)?);
                    push_markup(&mut chunks, "?>");
                }
                Event::Eof => {
                    return Err(DecodeError::Malformed("unexpected end of document".into()))
                }
                Event::Empty(_) | Event::Decl(_) | Event::DocType(_) => {}
            }
        }
    }

    /// Record the current binding of each `prefix:` token in `value`.
    ///
    /// Tokens whose prefix is not bound (URIs such as `http://...`) are
    /// ignored. A prefix keeps the first binding recorded for it.
    fn note_prefixes(&self, value: &str, bindings: &mut Vec<(String, String)>) {
        for prefix in value.split_whitespace().filter_map(qname_prefix) {
            if bindings.iter().any(|(p, _)| p == prefix) {
                continue;
            }
            let qualified = format!("{}:_", prefix);
            if let (ResolveResult::Bound(ns), _) =
                self.reader.resolve_element(QName(qualified.as_bytes()))
            {
                if let Ok(ns) = std::str::from_utf8(ns.as_ref()) {
                    bindings.push((prefix.to_string(), ns.to_string()));
                }
            }
        }
    }

    fn attributes_of(&self, start: &BytesStart<'_>) -> DecodeResult<Vec<(QualifiedName, String)>> {
        let mut out = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }
            let (resolved, local) = self.reader.resolve_attribute(attr.key);
            let namespace = namespace_of(resolved)?;
            let local = std::str::from_utf8(local.into_inner())?;
            let value = attr.unescape_value()?.into_owned();
            out.push((QualifiedName::new(namespace, local), value));
        }
        Ok(out)
    }
}

fn namespace_of(resolved: ResolveResult<'_>) -> DecodeResult<String> {
    match resolved {
        ResolveResult::Bound(ns) => Ok(std::str::from_utf8(ns.as_ref())?.to_string()),
        ResolveResult::Unbound => Ok(String::new()),
        ResolveResult::Unknown(prefix) => Err(DecodeError::Malformed(format!(
            "unbound namespace prefix '{}'",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

fn local_of<'e>(start: &'e BytesStart<'_>) -> DecodeResult<&'e str> {
    Ok(std::str::from_utf8(start.local_name().into_inner())?)
}

/// Prefix of a `prefix:local` token, if it looks like one.
fn qname_prefix(token: &str) -> Option<&str> {
    let (prefix, local) = token.split_once(':')?;
    let mut chars = prefix.chars();
    let first = chars.next()?;
    let valid = (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !local.is_empty()
        && !prefix.eq_ignore_ascii_case("xml")
        && !prefix.eq_ignore_ascii_case("xmlns");
    valid.then_some(prefix)
}

fn push_name(chunks: &mut Vec<Chunk>, namespace: &str, local: &str) {
    if !namespace.is_empty() {
        chunks.push(Chunk::Namespace(namespace.to_string()));
        push_markup(chunks, ":");
    }
    push_markup(chunks, local);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_tag_resolves_namespaces() {
        let xml = br#"<a:Root xmlns:a="urn:a"><a:Child x="1"/></a:Root>"#;
        let mut reader = ElementReader::new(xml);
        let Tag::Start(root) = reader.next_tag().unwrap() else {
            panic!("expected start");
        };
        assert!(root.is("urn:a", "Root"));
        let child = reader.next_child().unwrap().unwrap();
        assert!(child.is("urn:a", "Child"));
        assert_eq!(child.attr("x"), Some("1"));
        assert!(matches!(reader.next_tag().unwrap(), Tag::End { .. }));
        assert!(reader.next_child().unwrap().is_none());
    }

    #[test]
    fn test_next_text_unescapes() {
        let xml = b"<a>x &amp; y</a>";
        let mut reader = ElementReader::new(xml);
        reader.next_tag().unwrap();
        assert_eq!(reader.next_text().unwrap(), "x & y");
    }

    #[test]
    fn test_qname_list_resolution() {
        let xml = br#"<t xmlns:p="urn:p" xmlns:q="urn:q">p:One q:Two</t>"#;
        let mut reader = ElementReader::new(xml);
        reader.next_tag().unwrap();
        let names = reader.next_qname_list().unwrap();
        assert_eq!(
            names,
            vec![QualifiedName::new("urn:p", "One"), QualifiedName::new("urn:q", "Two")]
        );
    }

    #[test]
    fn test_capture_replaces_prefixes_with_placeholders() {
        let xml = br#"<r xmlns:x="urn:x"><x:Id x:k="a&amp;b">7</x:Id></r>"#;
        let mut reader = ElementReader::new(xml);
        reader.next_tag().unwrap();
        let chunks = reader.capture_content().unwrap();
        assert_eq!(
            chunks,
            vec![
                Chunk::Markup("<".into()),
                Chunk::Namespace("urn:x".into()),
                Chunk::Markup(":Id ".into()),
                Chunk::Namespace("urn:x".into()),
                Chunk::Markup(":k=\"a&amp;b\">7</".into()),
                Chunk::Namespace("urn:x".into()),
                Chunk::Markup(":Id>".into()),
            ]
        );
    }

    #[test]
    fn test_capture_records_prefixes_used_in_values() {
        let xml = br#"<r xmlns:x="urn:x" xmlns:q="urn:q" xmlns:u="urn:unused"><x:Hint x:kind="q:Fast" ref="http://h/p">q:Slow <x:In xmlns:w="urn:w">w:Deep</x:In></x:Hint></r>"#;
        let mut reader = ElementReader::new(xml);
        reader.next_tag().unwrap();
        let start = reader.next_child().unwrap().unwrap();
        let raw = reader.capture(start).unwrap();
        assert_eq!(
            raw.namespaces,
            vec![
                ("q".to_string(), "urn:q".to_string()),
                ("w".to_string(), "urn:w".to_string()),
            ]
        );
    }

    #[test]
    fn test_qname_prefix_detection() {
        assert_eq!(qname_prefix("q:Fast"), Some("q"));
        assert_eq!(qname_prefix("tns:My.Op-1"), Some("tns"));
        assert_eq!(qname_prefix("http://host/path"), Some("http"));
        assert_eq!(qname_prefix("1:2"), None);
        assert_eq!(qname_prefix("plain"), None);
        assert_eq!(qname_prefix("xml:lang"), None);
        assert_eq!(qname_prefix("q:"), None);
    }

    #[test]
    fn test_unbound_prefix_is_malformed() {
        let xml = b"<p:a/>";
        let mut reader = ElementReader::new(xml);
        assert!(matches!(reader.next_tag(), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn test_truncated_document_is_malformed() {
        let xml = b"<a><b>";
        let mut reader = ElementReader::new(xml);
        reader.next_tag().unwrap();
        reader.next_tag().unwrap();
        assert!(matches!(reader.next_tag(), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn test_start_offset_points_at_tag() {
        let xml = b"<a>\n  <b/></a>";
        let mut reader = ElementReader::new(xml);
        reader.next_tag().unwrap();
        let Tag::Start(b) = reader.next_tag().unwrap() else {
            panic!("expected start");
        };
        assert_eq!(&xml[b.offset..b.offset + 2], b"<b");
    }
}
