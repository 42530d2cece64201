//! Immutable XML node trees
//!
//! Nodes are shared through `Arc` and never mutated after construction, so a result
//! sequence can be handed to several assertion checks (and threads) without copying.
//! Every constructed node receives a fresh identity; clones of a `Node` handle share
//! it, while [`Node::deep_copy`] mints new identities for the whole subtree.

use crate::qname::QName;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Node identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    fn fresh() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// The seven XDM node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Document,
    Element,
    Attribute,
    Text,
    Comment,
    ProcessingInstruction,
    Namespace,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Document => "document",
            Self::Element => "element",
            Self::Attribute => "attribute",
            Self::Text => "text",
            Self::Comment => "comment",
            Self::ProcessingInstruction => "processing-instruction",
            Self::Namespace => "namespace",
        };
        f.write_str(name)
    }
}

/// A namespace declared on an element; `prefix: None` is the default namespace
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamespaceBinding {
    pub prefix: Option<String>,
    pub uri: String,
}

impl NamespaceBinding {
    pub fn new(prefix: Option<&str>, uri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.filter(|p| !p.is_empty()).map(str::to_string),
            uri: uri.into(),
        }
    }
}

#[derive(Debug)]
struct NodeData {
    id: NodeId,
    kind: NodeKind,
    name: Option<QName>,
    value: String,
    namespaces: Vec<NamespaceBinding>,
    attributes: Vec<Node>,
    children: Vec<Node>,
}

/// A shared handle to an immutable node
#[derive(Clone)]
pub struct Node(Arc<NodeData>);

impl Node {
    fn build(kind: NodeKind, name: Option<QName>, value: String) -> NodeData {
        NodeData {
            id: NodeId::fresh(),
            kind,
            name,
            value,
            namespaces: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn document(children: Vec<Node>) -> Self {
        let mut data = Self::build(NodeKind::Document, None, String::new());
        data.children = children;
        Self(Arc::new(data))
    }

    /// Start building an element
    pub fn element(name: QName) -> ElementBuilder {
        ElementBuilder::new(name)
    }

    pub fn attribute(name: QName, value: impl Into<String>) -> Self {
        Self(Arc::new(Self::build(
            NodeKind::Attribute,
            Some(name),
            value.into(),
        )))
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self(Arc::new(Self::build(NodeKind::Text, None, value.into())))
    }

    pub fn comment(value: impl Into<String>) -> Self {
        Self(Arc::new(Self::build(NodeKind::Comment, None, value.into())))
    }

    pub fn processing_instruction(target: impl Into<String>, data: impl Into<String>) -> Self {
        Self(Arc::new(Self::build(
            NodeKind::ProcessingInstruction,
            Some(QName::local(target)),
            data.into(),
        )))
    }

    /// A namespace node; its name is the prefix (empty for the default namespace)
    pub fn namespace(prefix: Option<&str>, uri: impl Into<String>) -> Self {
        Self(Arc::new(Self::build(
            NodeKind::Namespace,
            Some(QName::local(prefix.unwrap_or(""))),
            uri.into(),
        )))
    }

    pub fn id(&self) -> NodeId {
        self.0.id
    }

    pub fn kind(&self) -> NodeKind {
        self.0.kind
    }

    /// Name of elements, attributes, processing instructions and namespace nodes
    pub fn name(&self) -> Option<&QName> {
        self.0.name.as_ref()
    }

    /// Raw content of attribute, text, comment, PI and namespace nodes
    pub fn value(&self) -> &str {
        &self.0.value
    }

    /// Namespaces declared on this element
    pub fn namespaces(&self) -> &[NamespaceBinding] {
        &self.0.namespaces
    }

    pub fn attributes(&self) -> &[Node] {
        &self.0.attributes
    }

    pub fn children(&self) -> &[Node] {
        &self.0.children
    }

    /// Whether both handles refer to the same node
    pub fn is_same_node(&self, other: &Node) -> bool {
        self.0.id == other.0.id
    }

    /// Value of the attribute with the given name
    pub fn attribute_value(&self, name: &QName) -> Option<&str> {
        self.0
            .attributes
            .iter()
            .find(|a| a.name() == Some(name))
            .map(Node::value)
    }

    /// Element children only
    pub fn child_elements(&self) -> impl Iterator<Item = &Node> {
        self.0
            .children
            .iter()
            .filter(|c| c.kind() == NodeKind::Element)
    }

    /// XDM string value: concatenated descendant text for documents and elements
    pub fn string_value(&self) -> String {
        match self.kind() {
            NodeKind::Document | NodeKind::Element => {
                let mut out = String::new();
                self.collect_text(&mut out);
                out
            }
            _ => self.0.value.clone(),
        }
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.0.children {
            match child.kind() {
                NodeKind::Text => out.push_str(child.value()),
                NodeKind::Element => child.collect_text(out),
                _ => {}
            }
        }
    }

    /// Copy the subtree, giving every copied node a new identity
    pub fn deep_copy(&self) -> Node {
        let data = &self.0;
        Node(Arc::new(NodeData {
            id: NodeId::fresh(),
            kind: data.kind,
            name: data.name.clone(),
            value: data.value.clone(),
            namespaces: data.namespaces.clone(),
            attributes: data.attributes.iter().map(Node::deep_copy).collect(),
            children: data.children.iter().map(Node::deep_copy).collect(),
        }))
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Node");
        s.field("id", &self.0.id.0).field("kind", &self.0.kind);
        if let Some(name) = &self.0.name {
            s.field("name", &name.to_string());
        }
        if !self.0.value.is_empty() {
            s.field("value", &self.0.value);
        }
        if !self.0.children.is_empty() {
            s.field("children", &self.0.children.len());
        }
        s.finish()
    }
}

/// Builder for element nodes
#[derive(Debug)]
pub struct ElementBuilder {
    name: QName,
    namespaces: Vec<NamespaceBinding>,
    attributes: Vec<Node>,
    children: Vec<Node>,
}

impl ElementBuilder {
    pub fn new(name: QName) -> Self {
        Self {
            name,
            namespaces: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn namespace(mut self, prefix: Option<&str>, uri: impl Into<String>) -> Self {
        self.namespaces.push(NamespaceBinding::new(prefix, uri));
        self
    }

    pub fn attribute(mut self, name: QName, value: impl Into<String>) -> Self {
        self.attributes.push(Node::attribute(name, value));
        self
    }

    pub fn child(mut self, node: Node) -> Self {
        self.children.push(node);
        self
    }

    pub fn text(self, value: impl Into<String>) -> Self {
        self.child(Node::text(value))
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(nodes);
        self
    }

    pub fn build(self) -> Node {
        let mut data = Node::build(NodeKind::Element, Some(self.name), String::new());
        data.namespaces = self.namespaces;
        data.attributes = self.attributes;
        data.children = self.children;
        Node(Arc::new(data))
    }
}
