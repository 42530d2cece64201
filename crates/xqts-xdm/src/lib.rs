//! XQuery data model for the conformance harness
//!
//! This crate defines the values a query engine hands back to the harness and the
//! value semantics the assertion evaluator needs:
//! - Atomic values with the XML Schema type hierarchy
//! - Immutable node trees with stable identity
//! - Sequences of items
//! - Effective boolean value, string value, typed and deep equality
//! - XML serialization and parsing
//! - SequenceType parsing and matching

pub mod atomic;
pub mod error;
pub mod node;
pub mod qname;
pub mod semantics;
pub mod sequence;
pub mod xml;

pub use atomic::{AtomicData, AtomicType, AtomicValue};
pub use error::{ValueError, ValueResult};
pub use node::{ElementBuilder, NamespaceBinding, Node, NodeId, NodeKind};
pub use qname::{QName, XML_NAMESPACE, XS_NAMESPACE};
pub use semantics::{
    DeepEqualOptions, ItemTest, Occurrence, SequenceType, deep_equal, deep_equal_with,
    effective_boolean_value, item_string_value, normalize_space, serialize, string_value,
    typed_equal, xpath_regex,
};
pub use sequence::{Item, Sequence};
pub use xml::parse_document;
