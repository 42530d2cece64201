use crate::sequence::{Item, Sequence};

/// String value of a single item
pub fn item_string_value(item: &Item) -> String {
    match item {
        Item::Atomic(value) => value.canonical(),
        Item::Node(node) => node.string_value(),
    }
}

/// String values of all items, joined by single spaces
pub fn string_value(sequence: &Sequence) -> String {
    sequence
        .iter()
        .map(item_string_value)
        .collect::<Vec<_>>()
        .join(" ")
}

/// `fn:normalize-space`: trim and collapse runs of XML whitespace
pub fn normalize_space(text: &str) -> String {
    text.split([' ', '\t', '\n', '\r'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
