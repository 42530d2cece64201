//! XML serialization of sequences
//!
//! Attribute values are double-quoted and keep construction order. Namespace
//! declarations are emitted where the in-scope namespaces of the output require
//! them, so subtrees copied out of their original document serialize correctly.

use crate::atomic::AtomicValue;
use crate::error::{ValueError, ValueResult};
use crate::node::{NamespaceBinding, Node, NodeKind};
use crate::qname::QName;
use crate::sequence::{Item, Sequence};

/// Serialize a sequence
///
/// Adjacent atomic values are separated by a single space. Attribute and
/// namespace nodes cannot appear at the top level (`SENR0001`).
pub fn serialize(sequence: &Sequence) -> ValueResult<String> {
    let mut serializer = Serializer::default();
    let mut previous_atomic = false;
    for item in sequence {
        match item {
            Item::Atomic(value) => {
                if previous_atomic {
                    serializer.out.push(' ');
                }
                serializer.atomic(value);
                previous_atomic = true;
            }
            Item::Node(node) => {
                serializer.top_level(node)?;
                previous_atomic = false;
            }
        }
    }
    Ok(serializer.out)
}

/// Serialize a single item
pub fn serialize_item(item: &Item) -> ValueResult<String> {
    serialize(&Sequence::one(item.clone()))
}

#[derive(Default)]
struct Serializer {
    out: String,
    scopes: Vec<Vec<NamespaceBinding>>,
}

impl Serializer {
    fn atomic(&mut self, value: &AtomicValue) {
        escape_text(&value.canonical(), &mut self.out);
    }

    fn top_level(&mut self, node: &Node) -> ValueResult<()> {
        match node.kind() {
            NodeKind::Attribute | NodeKind::Namespace => Err(ValueError::TopLevelNode {
                kind: node.kind().to_string(),
            }),
            _ => {
                self.node(node);
                Ok(())
            }
        }
    }

    fn node(&mut self, node: &Node) {
        match node.kind() {
            NodeKind::Document => {
                for child in node.children() {
                    self.node(child);
                }
            }
            NodeKind::Element => self.element(node),
            NodeKind::Text => escape_text(node.value(), &mut self.out),
            NodeKind::Comment => {
                self.out.push_str("<!--");
                self.out.push_str(node.value());
                self.out.push_str("-->");
            }
            NodeKind::ProcessingInstruction => {
                self.out.push_str("<?");
                if let Some(name) = node.name() {
                    self.out.push_str(&name.local);
                }
                if !node.value().is_empty() {
                    self.out.push(' ');
                    self.out.push_str(node.value());
                }
                self.out.push_str("?>");
            }
            // Only reachable below an element, where namespaces are fixed up instead
            NodeKind::Attribute | NodeKind::Namespace => {}
        }
    }

    fn element(&mut self, node: &Node) {
        let mut declarations: Vec<NamespaceBinding> = Vec::new();
        for binding in node.namespaces() {
            self.require(&mut declarations, binding.prefix.as_deref(), &binding.uri);
        }
        if let Some(name) = node.name() {
            self.require_name(&mut declarations, name, true);
        }
        for attr in node.attributes() {
            if let Some(name) = attr.name() {
                self.require_name(&mut declarations, name, false);
            }
        }
        let attribute_names: Vec<String> = node
            .attributes()
            .iter()
            .map(|attr| {
                attr.name()
                    .map(|name| self.attribute_name(&mut declarations, name))
                    .unwrap_or_default()
            })
            .collect();

        let tag = node.name().map(QName::to_string).unwrap_or_default();
        self.out.push('<');
        self.out.push_str(&tag);
        for binding in &declarations {
            match &binding.prefix {
                Some(prefix) => {
                    self.out.push_str(" xmlns:");
                    self.out.push_str(prefix);
                }
                None => self.out.push_str(" xmlns"),
            }
            self.out.push_str("=\"");
            escape_attribute(&binding.uri, &mut self.out);
            self.out.push('"');
        }
        for (attr, name) in node.attributes().iter().zip(&attribute_names) {
            self.out.push(' ');
            self.out.push_str(name);
            self.out.push_str("=\"");
            escape_attribute(attr.value(), &mut self.out);
            self.out.push('"');
        }

        if node.children().is_empty() {
            self.out.push_str("/>");
            return;
        }
        self.out.push('>');
        self.scopes.push(declarations);
        for child in node.children() {
            self.node(child);
        }
        self.scopes.pop();
        self.out.push_str("</");
        self.out.push_str(&tag);
        self.out.push('>');
    }

    fn require_name(&self, declarations: &mut Vec<NamespaceBinding>, name: &QName, element: bool) {
        let prefix = name.prefix.as_deref().filter(|p| !p.is_empty());
        match (prefix, name.namespace_uri()) {
            // Unprefixed attributes get a prefix from `attribute_name`
            (None, _) if !element => {}
            (None, uri) => self.require(declarations, None, uri),
            (Some(prefix), uri) => self.require(declarations, Some(prefix), uri),
        }
    }

    /// Lexical name for an attribute
    ///
    /// An unprefixed attribute in a namespace borrows a prefix already bound to
    /// its URI, or declares a fresh `nsN` prefix.
    fn attribute_name(&self, declarations: &mut Vec<NamespaceBinding>, name: &QName) -> String {
        let uri = name.namespace_uri();
        if uri.is_empty() || name.prefix.as_deref().is_some_and(|p| !p.is_empty()) {
            return name.to_string();
        }
        let prefix = match self.bound_prefix(declarations, uri) {
            Some(prefix) => prefix,
            None => {
                let prefix = (0..)
                    .map(|n| format!("ns{n}"))
                    .find(|candidate| self.lookup(declarations, Some(candidate.as_str())).is_empty())
                    .unwrap_or_default();
                declarations.push(NamespaceBinding::new(Some(prefix.as_str()), uri));
                prefix
            }
        };
        format!("{}:{}", prefix, name.local)
    }

    /// A non-default prefix whose in-scope binding is `uri`
    fn bound_prefix(&self, declarations: &[NamespaceBinding], uri: &str) -> Option<String> {
        declarations
            .iter()
            .chain(self.scopes.iter().rev().flatten())
            .filter_map(|d| d.prefix.as_deref().filter(|p| !p.is_empty()))
            .find(|prefix| self.lookup(declarations, Some(*prefix)) == uri)
            .map(str::to_string)
    }

    fn require(&self, declarations: &mut Vec<NamespaceBinding>, prefix: Option<&str>, uri: &str) {
        let prefix = prefix.filter(|p| !p.is_empty());
        if prefix == Some("xml") || (prefix.is_some() && uri.is_empty()) {
            return;
        }
        if self.lookup(declarations, prefix) == uri {
            return;
        }
        declarations.retain(|d| d.prefix.as_deref() != prefix);
        declarations.push(NamespaceBinding::new(prefix, uri));
    }

    /// In-scope URI for a prefix; the default namespace starts out empty
    fn lookup<'a>(&'a self, declarations: &'a [NamespaceBinding], prefix: Option<&str>) -> &'a str {
        declarations
            .iter()
            .chain(self.scopes.iter().rev().flatten())
            .find(|d| d.prefix.as_deref() == prefix)
            .map(|d| d.uri.as_str())
            .unwrap_or("")
    }
}

fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attribute(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            '\t' => out.push_str("&#x9;"),
            _ => out.push(ch),
        }
    }
}
