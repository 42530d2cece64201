//! Items and sequences

use crate::atomic::AtomicValue;
use crate::node::Node;
use smallvec::SmallVec;
use std::ops::Index;

/// A single item: an atomic value or a node
#[derive(Debug, Clone)]
pub enum Item {
    Atomic(AtomicValue),
    Node(Node),
}

impl Item {
    pub fn as_atomic(&self) -> Option<&AtomicValue> {
        match self {
            Item::Atomic(v) => Some(v),
            Item::Node(_) => None,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Item::Node(n) => Some(n),
            Item::Atomic(_) => None,
        }
    }

    pub fn is_node(&self) -> bool {
        matches!(self, Item::Node(_))
    }

    /// Atomize: nodes yield their string value as `xs:untypedAtomic`
    pub fn atomize(&self) -> AtomicValue {
        match self {
            Item::Atomic(v) => v.clone(),
            Item::Node(n) => AtomicValue::untyped(n.string_value()),
        }
    }
}

impl From<AtomicValue> for Item {
    fn from(value: AtomicValue) -> Self {
        Item::Atomic(value)
    }
}

impl From<Node> for Item {
    fn from(node: Node) -> Self {
        Item::Node(node)
    }
}

/// An ordered, flat sequence of items
///
/// Singletons are by far the most common query result and stay inline.
#[derive(Debug, Clone, Default)]
pub struct Sequence {
    items: SmallVec<[Item; 1]>,
}

impl Sequence {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn one(item: impl Into<Item>) -> Self {
        let mut items = SmallVec::new();
        items.push(item.into());
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn first(&self) -> Option<&Item> {
        self.items.first()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    pub fn push(&mut self, item: impl Into<Item>) {
        self.items.push(item.into());
    }

    /// Short description used in diagnostics, e.g. `3 items`
    pub fn describe(&self) -> String {
        match self.len() {
            0 => "empty sequence".to_string(),
            1 => "1 item".to_string(),
            n => format!("{} items", n),
        }
    }
}

impl Index<usize> for Sequence {
    type Output = Item;

    fn index(&self, index: usize) -> &Item {
        &self.items[index]
    }
}

impl<I: Into<Item>> FromIterator<I> for Sequence {
    fn from_iter<T: IntoIterator<Item = I>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().map(Into::<Item>::into).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for Sequence {
    type Item = Item;
    type IntoIter = smallvec::IntoIter<[Item; 1]>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_mixed() {
        let seq: Sequence = vec![
            Item::from(AtomicValue::integer(1)),
            Item::from(Node::text("t")),
        ]
        .into_iter()
        .collect();
        assert_eq!(seq.len(), 2);
        assert!(seq[1].is_node());
        assert_eq!(seq[1].atomize(), AtomicValue::untyped("t"));
        assert_eq!(seq.describe(), "2 items");
    }

    #[test]
    fn test_empty() {
        assert!(Sequence::empty().is_empty());
        assert_eq!(Sequence::empty().describe(), "empty sequence");
    }
}
