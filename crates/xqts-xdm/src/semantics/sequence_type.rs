//! SequenceType descriptors and dynamic `instance of` matching

use super::lexer::{Input, PResult, name, quoted, ws};
use crate::atomic::AtomicType;
use crate::error::{ValueError, ValueResult};
use crate::node::{Node, NodeKind};
use crate::qname::QName;
use crate::sequence::{Item, Sequence};
use std::str::FromStr;
use winnow::combinator::{alt, eof, fail, opt};
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::{any, one_of};

/// Occurrence indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurrence {
    ExactlyOne,
    /// `?`
    ZeroOrOne,
    /// `*`
    ZeroOrMore,
    /// `+`
    OneOrMore,
}

impl Occurrence {
    pub fn allows(self, count: usize) -> bool {
        match self {
            Self::ExactlyOne => count == 1,
            Self::ZeroOrOne => count <= 1,
            Self::ZeroOrMore => true,
            Self::OneOrMore => count >= 1,
        }
    }
}

/// Name constraint of an element or attribute test
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameTest {
    Any,
    /// Lexical name; a prefix, when present, must match the node's prefix
    ///
    /// Type descriptors carry no namespace context, so prefixes are compared
    /// rather than URIs: `element(p:a)` does not match `q:a` even when `p` and
    /// `q` are bound to the same URI, and an unprefixed name matches only
    /// unprefixed nodes whatever their namespace.
    Name(String),
}

impl NameTest {
    fn matches(&self, name: Option<&QName>) -> bool {
        let (Self::Name(lexical), Some(name)) = (self, name) else {
            return matches!(self, Self::Any);
        };
        let (prefix, local) = QName::split_lexical(lexical);
        let node_prefix = name.prefix.as_deref().filter(|p| !p.is_empty());
        name.local == local && node_prefix == prefix
    }
}

/// Item type of a SequenceType
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemTest {
    AnyItem,
    AnyNode,
    Text,
    Comment,
    ProcessingInstruction(Option<String>),
    NamespaceNode,
    Element(NameTest),
    Attribute(NameTest),
    /// `document-node()`, optionally constraining the document element
    Document(Option<NameTest>),
    Atomic(AtomicType),
    /// The `xs:numeric` union
    Numeric,
    /// Function items are not part of this data model and never match
    Map,
    Array,
    Function,
}

impl ItemTest {
    pub fn matches(&self, item: &Item) -> bool {
        match (self, item) {
            (Self::AnyItem, _) => true,
            (Self::Atomic(kind), Item::Atomic(value)) => value.kind().derives_from(*kind),
            (Self::Numeric, Item::Atomic(value)) => value.kind().is_numeric(),
            (_, Item::Atomic(_)) => false,
            (_, Item::Node(node)) => self.matches_node(node),
        }
    }

    fn matches_node(&self, node: &Node) -> bool {
        let kind = node.kind();
        match self {
            Self::AnyNode => true,
            Self::Text => kind == NodeKind::Text,
            Self::Comment => kind == NodeKind::Comment,
            Self::NamespaceNode => kind == NodeKind::Namespace,
            Self::ProcessingInstruction(target) => {
                kind == NodeKind::ProcessingInstruction
                    && target
                        .as_deref()
                        .is_none_or(|t| node.name().is_some_and(|n| n.local == t))
            }
            Self::Element(test) => kind == NodeKind::Element && test.matches(node.name()),
            Self::Attribute(test) => kind == NodeKind::Attribute && test.matches(node.name()),
            Self::Document(None) => kind == NodeKind::Document,
            Self::Document(Some(test)) => {
                kind == NodeKind::Document && document_element_matches(node, test)
            }
            _ => false,
        }
    }
}

/// Exactly one element child, optionally accompanied by comments and PIs
fn document_element_matches(document: &Node, test: &NameTest) -> bool {
    let mut content = document.children().iter().filter(|c| {
        !matches!(
            c.kind(),
            NodeKind::Comment | NodeKind::ProcessingInstruction
        )
    });
    match (content.next(), content.next()) {
        (Some(root), None) => root.kind() == NodeKind::Element && test.matches(root.name()),
        _ => false,
    }
}

/// A parsed SequenceType
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceType {
    /// `empty-sequence()`
    Empty,
    Items {
        item: ItemTest,
        occurrence: Occurrence,
    },
}

impl SequenceType {
    pub fn parse(text: &str) -> ValueResult<Self> {
        let mut input: Input<'_> = text;
        let invalid = |message: &str| ValueError::InvalidSequenceType {
            text: text.to_string(),
            message: message.to_string(),
        };
        let parsed = sequence_type(&mut input).map_err(|_| invalid("unrecognized item type"))?;
        ws(&mut input).map_err(|_| invalid("unexpected input"))?;
        eof::<_, ContextError>
            .parse_next(&mut input)
            .map_err(|_| invalid("unexpected trailing input"))?;
        Ok(parsed)
    }

    /// Whether the sequence is an instance of this type
    pub fn matches(&self, sequence: &Sequence) -> bool {
        match self {
            Self::Empty => sequence.is_empty(),
            Self::Items { item, occurrence } => {
                occurrence.allows(sequence.len()) && sequence.iter().all(|i| item.matches(i))
            }
        }
    }
}

impl FromStr for SequenceType {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn sequence_type(input: &mut Input<'_>) -> PResult<SequenceType> {
    ws.parse_next(input)?;
    let keyword = name.parse_next(input)?;
    ws.parse_next(input)?;
    if keyword == "empty-sequence" {
        empty_args.parse_next(input)?;
        return Ok(SequenceType::Empty);
    }
    let item = item_type(keyword, input)?;
    ws.parse_next(input)?;
    let occurrence = opt(one_of(['?', '*', '+']))
        .map(|c| match c {
            Some('?') => Occurrence::ZeroOrOne,
            Some('*') => Occurrence::ZeroOrMore,
            Some('+') => Occurrence::OneOrMore,
            _ => Occurrence::ExactlyOne,
        })
        .parse_next(input)?;
    Ok(SequenceType::Items { item, occurrence })
}

fn item_type(keyword: &str, input: &mut Input<'_>) -> PResult<ItemTest> {
    let test = match keyword {
        "item" => empty_args.value(ItemTest::AnyItem).parse_next(input)?,
        "node" => empty_args.value(ItemTest::AnyNode).parse_next(input)?,
        "text" => empty_args.value(ItemTest::Text).parse_next(input)?,
        "comment" => empty_args.value(ItemTest::Comment).parse_next(input)?,
        "namespace-node" => empty_args.value(ItemTest::NamespaceNode).parse_next(input)?,
        "processing-instruction" => {
            ('(', ws).parse_next(input)?;
            let target = opt(alt((quoted, name.map(str::to_string)))).parse_next(input)?;
            (ws, ')').parse_next(input)?;
            ItemTest::ProcessingInstruction(target)
        }
        "element" | "schema-element" => ItemTest::Element(name_test_args.parse_next(input)?),
        "attribute" | "schema-attribute" => {
            ItemTest::Attribute(name_test_args.parse_next(input)?)
        }
        "document-node" => {
            ('(', ws).parse_next(input)?;
            let element = opt(document_element).parse_next(input)?;
            (ws, ')').parse_next(input)?;
            ItemTest::Document(element)
        }
        "map" => balanced.value(ItemTest::Map).parse_next(input)?,
        "array" => balanced.value(ItemTest::Array).parse_next(input)?,
        "function" => balanced.value(ItemTest::Function).parse_next(input)?,
        "xs:numeric" | "numeric" => ItemTest::Numeric,
        other => match AtomicType::from_name(other) {
            Some(kind) => ItemTest::Atomic(kind),
            None => return fail.parse_next(input),
        },
    };
    Ok(test)
}

fn document_element(input: &mut Input<'_>) -> PResult<NameTest> {
    let keyword = name.parse_next(input)?;
    if keyword != "element" && keyword != "schema-element" {
        return fail.parse_next(input);
    }
    ws.parse_next(input)?;
    name_test_args.parse_next(input)
}

fn empty_args(input: &mut Input<'_>) -> PResult<()> {
    ('(', ws, ')').void().parse_next(input)
}

/// `(name|*)` with an optional, ignored type annotation
fn name_test_args(input: &mut Input<'_>) -> PResult<NameTest> {
    ('(', ws).parse_next(input)?;
    let test = opt(alt((
        '*'.value(NameTest::Any),
        name.map(|n: &str| NameTest::Name(n.to_string())),
    )))
    .parse_next(input)?;
    ws.parse_next(input)?;
    opt((',', ws, name, opt('?'))).parse_next(input)?;
    (ws, ')').parse_next(input)?;
    Ok(test.unwrap_or(NameTest::Any))
}

/// Skip a parenthesized argument list, nesting included
fn balanced(input: &mut Input<'_>) -> PResult<()> {
    '('.parse_next(input)?;
    let mut depth = 1usize;
    while depth > 0 {
        match any.parse_next(input)? {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AtomicValue, xml::parse_document};
    use rstest::rstest;

    #[rstest]
    #[case("xs:integer", SequenceType::Items { item: ItemTest::Atomic(AtomicType::Integer), occurrence: Occurrence::ExactlyOne })]
    #[case("xs:string*", SequenceType::Items { item: ItemTest::Atomic(AtomicType::String), occurrence: Occurrence::ZeroOrMore })]
    #[case(" item()+ ", SequenceType::Items { item: ItemTest::AnyItem, occurrence: Occurrence::OneOrMore })]
    #[case("empty-sequence()", SequenceType::Empty)]
    #[case("element(a)?", SequenceType::Items { item: ItemTest::Element(NameTest::Name("a".into())), occurrence: Occurrence::ZeroOrOne })]
    #[case("attribute(*, xs:untypedAtomic)", SequenceType::Items { item: ItemTest::Attribute(NameTest::Any), occurrence: Occurrence::ExactlyOne })]
    #[case("document-node(element(root))", SequenceType::Items { item: ItemTest::Document(Some(NameTest::Name("root".into()))), occurrence: Occurrence::ExactlyOne })]
    #[case("map(xs:string, item()*)", SequenceType::Items { item: ItemTest::Map, occurrence: Occurrence::ExactlyOne })]
    #[case("processing-instruction('pi')", SequenceType::Items { item: ItemTest::ProcessingInstruction(Some("pi".into())), occurrence: Occurrence::ExactlyOne })]
    fn test_parse(#[case] text: &str, #[case] expected: SequenceType) {
        assert_eq!(SequenceType::parse(text).unwrap(), expected);
    }

    #[rstest]
    #[case("xs:bogus")]
    #[case("element(a")]
    #[case("xs:integer xs:string")]
    #[case("")]
    fn test_parse_errors(#[case] text: &str) {
        let err = SequenceType::parse(text).unwrap_err();
        assert_eq!(err.code().local_name(), "XPST0003");
    }

    #[test]
    fn test_atomic_matching_uses_derivation() {
        let byte = AtomicValue::from_lexical(AtomicType::Byte, "7").unwrap();
        let seq = Sequence::one(byte);
        assert!("xs:integer".parse::<SequenceType>().unwrap().matches(&seq));
        assert!("xs:numeric".parse::<SequenceType>().unwrap().matches(&seq));
        assert!("xs:anyAtomicType".parse::<SequenceType>().unwrap().matches(&seq));
        assert!(!"xs:int*".parse::<SequenceType>().unwrap().matches(&Sequence::one(AtomicValue::integer(7))));
        assert!(!"xs:string".parse::<SequenceType>().unwrap().matches(&seq));
        assert!(!"node()".parse::<SequenceType>().unwrap().matches(&seq));
    }

    #[test]
    fn test_occurrence() {
        let two: Sequence = vec![AtomicValue::integer(1), AtomicValue::integer(2)]
            .into_iter()
            .collect();
        assert!(!SequenceType::parse("xs:integer").unwrap().matches(&two));
        assert!(!SequenceType::parse("xs:integer?").unwrap().matches(&two));
        assert!(SequenceType::parse("xs:integer+").unwrap().matches(&two));
        assert!(SequenceType::parse("xs:integer*").unwrap().matches(&Sequence::empty()));
        assert!(!SequenceType::parse("xs:integer+").unwrap().matches(&Sequence::empty()));
        assert!(SequenceType::parse("empty-sequence()").unwrap().matches(&Sequence::empty()));
    }

    #[test]
    fn test_node_kinds() {
        let doc = parse_document("<!--c--><root a=\"1\"><?pi x?></root>").unwrap();
        let root = doc.children()[1].clone();
        let attr = root.attributes()[0].clone();
        let pi = root.children()[0].clone();

        let matches = |ty: &str, node: &Node| {
            SequenceType::parse(ty)
                .unwrap()
                .matches(&Sequence::one(node.clone()))
        };
        assert!(matches("document-node()", &doc));
        assert!(matches("document-node(element(root))", &doc));
        assert!(!matches("document-node(element(other))", &doc));
        assert!(matches("element()", &root));
        assert!(matches("element(root)", &root));
        assert!(!matches("element(other)", &root));
        assert!(matches("attribute(a)", &attr));
        assert!(!matches("element(*)", &attr));
        assert!(matches("processing-instruction(pi)", &pi));
        assert!(matches("node()", &pi));
        assert!(!matches("xs:string", &pi));
        assert!(!matches("map(*)", &root));
    }

    #[test]
    fn test_name_tests_compare_prefixes() {
        let doc = parse_document(r#"<q:a xmlns:q="urn:p" xmlns:p="urn:p" q:x="1"/>"#).unwrap();
        let root = doc.children()[0].clone();
        let attr = root.attributes()[0].clone();

        let matches = |ty: &str, node: &Node| {
            SequenceType::parse(ty)
                .unwrap()
                .matches(&Sequence::one(node.clone()))
        };
        assert!(matches("element(q:a)", &root));
        assert!(!matches("element(p:a)", &root));
        assert!(!matches("element(a)", &root));
        assert!(matches("attribute(q:x)", &attr));
        assert!(!matches("attribute(p:x)", &attr));
    }
}
