//! `fn:deep-equal` and the stricter XML comparison used by `assert-xml`

use super::equality::{numeric_equal, values_equal};
use crate::atomic::AtomicValue;
use crate::node::{Node, NodeKind};
use crate::qname::QName;
use crate::sequence::{Item, Sequence};

/// Knobs distinguishing `fn:deep-equal` from XML fragment comparison
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeepEqualOptions {
    /// Compare comment and processing-instruction children
    pub compare_comments: bool,
    /// Require element and attribute prefixes to match
    pub compare_prefixes: bool,
}

impl DeepEqualOptions {
    /// Options for comparing serialized XML fragments
    pub fn xml_comparison(ignore_prefixes: bool) -> Self {
        Self {
            compare_comments: true,
            compare_prefixes: !ignore_prefixes,
        }
    }
}

/// `fn:deep-equal` over two sequences
pub fn deep_equal(a: &Sequence, b: &Sequence) -> bool {
    deep_equal_with(a, b, DeepEqualOptions::default())
}

pub fn deep_equal_with(a: &Sequence, b: &Sequence, options: DeepEqualOptions) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| item_deep_equal(x, y, options))
}

fn item_deep_equal(a: &Item, b: &Item, options: DeepEqualOptions) -> bool {
    match (a, b) {
        (Item::Atomic(x), Item::Atomic(y)) => atomic_deep_equal(x, y),
        (Item::Node(x), Item::Node(y)) => node_deep_equal(x, y, options),
        _ => false,
    }
}

/// Atomic equality as `fn:deep-equal` defines it: incomparable values are unequal
/// and NaN equals NaN
pub fn atomic_deep_equal(a: &AtomicValue, b: &AtomicValue) -> bool {
    let (x, y) = (a.kind(), b.kind());
    if x.is_numeric() && y.is_numeric() {
        return numeric_equal(a, b, true);
    }
    if x.is_string_like() && y.is_string_like() {
        return a.canonical() == b.canonical();
    }
    x.primitive() == y.primitive() && values_equal(a, b)
}

fn node_deep_equal(a: &Node, b: &Node, options: DeepEqualOptions) -> bool {
    if a.kind() != b.kind() {
        return false;
    }
    match a.kind() {
        NodeKind::Document => children_equal(a, b, options),
        NodeKind::Element => {
            names_equal(a.name(), b.name(), options)
                && attributes_equal(a, b, options)
                && children_equal(a, b, options)
        }
        NodeKind::Attribute => names_equal(a.name(), b.name(), options) && a.value() == b.value(),
        NodeKind::ProcessingInstruction | NodeKind::Namespace => {
            a.name() == b.name() && a.value() == b.value()
        }
        NodeKind::Text | NodeKind::Comment => a.value() == b.value(),
    }
}

fn names_equal(a: Option<&QName>, b: Option<&QName>, options: DeepEqualOptions) -> bool {
    let prefix = |name: Option<&QName>| {
        name.and_then(|n| n.prefix.as_deref())
            .filter(|p| !p.is_empty())
            .map(str::to_string)
    };
    a == b && (!options.compare_prefixes || prefix(a) == prefix(b))
}

/// Attributes compare as an unordered set
fn attributes_equal(a: &Node, b: &Node, options: DeepEqualOptions) -> bool {
    a.attributes().len() == b.attributes().len()
        && a.attributes().iter().all(|x| {
            b.attributes()
                .iter()
                .any(|y| node_deep_equal(x, y, options))
        })
}

fn children_equal(a: &Node, b: &Node, options: DeepEqualOptions) -> bool {
    let significant = |node: &&Node| {
        options.compare_comments
            || !matches!(
                node.kind(),
                NodeKind::Comment | NodeKind::ProcessingInstruction
            )
    };
    let left: Vec<&Node> = a.children().iter().filter(significant).collect();
    let right: Vec<&Node> = b.children().iter().filter(significant).collect();
    left.len() == right.len()
        && left
            .iter()
            .zip(&right)
            .all(|(x, y)| node_deep_equal(x, y, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AtomicType;

    fn element(prefix: Option<&str>, comment: bool, attrs: &[(&str, &str)]) -> Node {
        let name = match prefix {
            Some(p) => QName::prefixed(p, "urn:x", "e"),
            None => QName::namespaced("urn:x", "e"),
        };
        let mut builder = Node::element(name);
        for (k, v) in attrs {
            builder = builder.attribute(QName::local(*k), *v);
        }
        if comment {
            builder = builder.child(Node::comment("note"));
        }
        builder.text("body").build()
    }

    fn seq(node: Node) -> Sequence {
        Sequence::one(node)
    }

    #[test]
    fn test_attribute_order_is_ignored() {
        let a = element(None, false, &[("a", "1"), ("b", "2")]);
        let b = element(None, false, &[("b", "2"), ("a", "1")]);
        assert!(deep_equal(&seq(a.clone()), &seq(b)));
        let c = element(None, false, &[("a", "1"), ("b", "3")]);
        assert!(!deep_equal(&seq(a), &seq(c)));
    }

    #[test]
    fn test_copies_are_deep_equal() {
        let a = element(Some("p"), true, &[("a", "1")]);
        assert!(deep_equal(&seq(a.clone()), &seq(a.deep_copy())));
    }

    #[test]
    fn test_comments_only_in_xml_mode() {
        let a = element(None, true, &[]);
        let b = element(None, false, &[]);
        assert!(deep_equal(&seq(a.clone()), &seq(b.clone())));
        assert!(!deep_equal_with(
            &seq(a),
            &seq(b),
            DeepEqualOptions::xml_comparison(true)
        ));
    }

    #[test]
    fn test_prefixes_only_in_xml_mode() {
        let a = element(Some("p"), false, &[]);
        let b = element(Some("q"), false, &[]);
        assert!(deep_equal(&seq(a.clone()), &seq(b.clone())));
        assert!(deep_equal_with(
            &seq(a.clone()),
            &seq(b.clone()),
            DeepEqualOptions::xml_comparison(true)
        ));
        assert!(!deep_equal_with(
            &seq(a),
            &seq(b),
            DeepEqualOptions::xml_comparison(false)
        ));
    }

    #[test]
    fn test_atomic_rules() {
        let nan = Sequence::one(AtomicValue::double(f64::NAN));
        assert!(deep_equal(&nan, &nan.clone()));

        let int = Sequence::one(AtomicValue::integer(1));
        let dbl = Sequence::one(AtomicValue::double(1.0));
        assert!(deep_equal(&int, &dbl));

        let string = Sequence::one(AtomicValue::string("1"));
        assert!(!deep_equal(&int, &string));

        let untyped = Sequence::one(AtomicValue::untyped("1"));
        assert!(deep_equal(&string, &untyped));

        let date = AtomicValue::from_lexical(AtomicType::Date, "2020-02-02").unwrap();
        assert!(deep_equal(&Sequence::one(date.clone()), &Sequence::one(date)));
    }

    #[test]
    fn test_node_and_atomic_differ() {
        let text = Sequence::one(Node::text("1"));
        let string = Sequence::one(AtomicValue::string("1"));
        assert!(!deep_equal(&text, &string));
    }
}
