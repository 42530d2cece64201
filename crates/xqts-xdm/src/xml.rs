//! Parsing XML text into node trees
//!
//! Used for fixture documents, `assert-xml` expectations and serialization
//! round-trips. Whitespace-only text is preserved; adjacent character data,
//! references and CDATA sections are merged into a single text node.

use crate::error::{ValueError, ValueResult};
use crate::node::{NamespaceBinding, Node, NodeKind};
use crate::qname::{QName, XML_NAMESPACE};
use quick_xml::Reader;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};

/// Parse a complete XML document
pub fn parse_document(xml: &str) -> ValueResult<Node> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut builder = TreeBuilder::default();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => builder.start(&e)?,
            Ok(Event::Empty(e)) => {
                builder.start(&e)?;
                builder.end()?;
            }
            Ok(Event::End(_)) => builder.end()?,
            Ok(Event::Text(e)) => {
                let raw = utf8(&e)?;
                let text = unescape(raw).map_err(ValueError::malformed)?;
                builder.text(&text);
            }
            Ok(Event::GeneralRef(e)) => {
                let resolved = match e.resolve_char_ref().map_err(ValueError::malformed)? {
                    Some(ch) => ch.to_string(),
                    None => {
                        let name = utf8(&e)?;
                        resolve_predefined_entity(name)
                            .ok_or_else(|| {
                                ValueError::malformed(format!("undefined entity '&{};'", name))
                            })?
                            .to_string()
                    }
                };
                builder.text(&resolved);
            }
            Ok(Event::CData(e)) => builder.text(utf8(&e)?),
            Ok(Event::Comment(e)) => builder.leaf(Node::comment(utf8(&e)?)),
            Ok(Event::PI(e)) => {
                let content = utf8(&e)?;
                let (target, data) = content
                    .split_once(char::is_whitespace)
                    .map(|(t, d)| (t, d.trim_start()))
                    .unwrap_or((content, ""));
                builder.leaf(Node::processing_instruction(target, data));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(ValueError::malformed(e)),
        }
        buf.clear();
    }
    builder.finish()
}

fn utf8(bytes: &[u8]) -> ValueResult<&str> {
    std::str::from_utf8(bytes).map_err(ValueError::malformed)
}

struct OpenElement {
    name: QName,
    namespaces: Vec<NamespaceBinding>,
    attributes: Vec<(QName, String)>,
    children: Vec<Node>,
}

#[derive(Default)]
struct TreeBuilder {
    open: Vec<OpenElement>,
    top: Vec<Node>,
    pending: String,
}

impl TreeBuilder {
    fn start(&mut self, e: &BytesStart<'_>) -> ValueResult<()> {
        self.flush_text();

        let mut namespaces = Vec::new();
        let mut raw_attributes = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(ValueError::malformed)?;
            let key = utf8(attr.key.as_ref())?.to_string();
            let value = attr.unescape_value().map_err(ValueError::malformed)?.into_owned();
            if key == "xmlns" {
                namespaces.push(NamespaceBinding::new(None, value));
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                namespaces.push(NamespaceBinding::new(Some(prefix), value));
            } else {
                raw_attributes.push((key, value));
            }
        }

        // Declarations on this element are in scope for its own name and attributes
        self.open.push(OpenElement {
            name: QName::local(""),
            namespaces,
            attributes: Vec::new(),
            children: Vec::new(),
        });

        let name = self.resolve(utf8(e.name().as_ref())?, true)?;
        let mut attributes = Vec::with_capacity(raw_attributes.len());
        for (key, value) in raw_attributes {
            let attr_name = self.resolve(&key, false)?;
            if attributes.iter().any(|(n, _): &(QName, String)| *n == attr_name) {
                return Err(ValueError::malformed(format!("duplicate attribute '{}'", key)));
            }
            attributes.push((attr_name, value));
        }

        if let Some(frame) = self.open.last_mut() {
            frame.name = name;
            frame.attributes = attributes;
        }
        Ok(())
    }

    fn end(&mut self) -> ValueResult<()> {
        self.flush_text();
        let frame = self
            .open
            .pop()
            .ok_or_else(|| ValueError::malformed("unexpected end tag"))?;

        let mut builder = Node::element(frame.name);
        for binding in frame.namespaces {
            builder = builder.namespace(binding.prefix.as_deref(), binding.uri);
        }
        for (name, value) in frame.attributes {
            builder = builder.attribute(name, value);
        }
        let element = builder.children(frame.children).build();
        self.attach(element);
        Ok(())
    }

    fn text(&mut self, text: &str) {
        self.pending.push_str(text);
    }

    fn leaf(&mut self, node: Node) {
        self.flush_text();
        self.attach(node);
    }

    fn flush_text(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.pending);
        // Character data outside the document element is whitespace and dropped
        if let Some(frame) = self.open.last_mut() {
            frame.children.push(Node::text(text));
        }
    }

    fn attach(&mut self, node: Node) {
        match self.open.last_mut() {
            Some(frame) => frame.children.push(node),
            None => self.top.push(node),
        }
    }

    fn resolve(&self, lexical: &str, is_element: bool) -> ValueResult<QName> {
        let (prefix, local) = QName::split_lexical(lexical);
        match prefix {
            Some("xml") => Ok(QName::prefixed("xml", XML_NAMESPACE, local)),
            Some(prefix) => match self.lookup(Some(prefix)) {
                Some(uri) if !uri.is_empty() => Ok(QName::prefixed(prefix, uri, local)),
                _ => Err(ValueError::malformed(format!(
                    "unbound namespace prefix '{}'",
                    prefix
                ))),
            },
            None if is_element => match self.lookup(None) {
                Some(uri) if !uri.is_empty() => Ok(QName::namespaced(uri, local)),
                _ => Ok(QName::local(local)),
            },
            None => Ok(QName::local(local)),
        }
    }

    fn lookup(&self, prefix: Option<&str>) -> Option<&str> {
        self.open.iter().rev().find_map(|frame| {
            frame
                .namespaces
                .iter()
                .find(|b| b.prefix.as_deref() == prefix)
                .map(|b| b.uri.as_str())
        })
    }

    fn finish(mut self) -> ValueResult<Node> {
        if !self.open.is_empty() {
            return Err(ValueError::malformed("unclosed element at end of input"));
        }
        self.pending.clear();
        let elements = self
            .top
            .iter()
            .filter(|n| n.kind() == NodeKind::Element)
            .count();
        if elements != 1 {
            return Err(ValueError::malformed(format!(
                "expected one document element, found {}",
                elements
            )));
        }
        Ok(Node::document(self.top))
    }
}
