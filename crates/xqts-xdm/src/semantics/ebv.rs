use crate::atomic::{AtomicData, AtomicType};
use crate::error::{ValueError, ValueResult};
use crate::sequence::{Item, Sequence};

/// Effective boolean value of a sequence
///
/// The empty sequence is false and a single node is true. Any other sequence must
/// be a singleton boolean, string-like or numeric value; anything else, including
/// every sequence of more than one item, is undefined (`FORG0006`).
pub fn effective_boolean_value(sequence: &Sequence) -> ValueResult<bool> {
    if sequence.len() > 1 {
        return Err(ValueError::EbvUndefined {
            found: format!("a sequence of {} items", sequence.len()),
        });
    }
    let first = match sequence.first() {
        None => return Ok(false),
        Some(Item::Node(_)) => return Ok(true),
        Some(Item::Atomic(value)) => value,
    };

    let kind = first.kind();
    match first.data() {
        AtomicData::Boolean(b) => Ok(*b),
        AtomicData::Text(text) if kind.is_string_like() => Ok(!text.is_empty()),
        AtomicData::Decimal(d) => Ok(!d.is_zero()),
        AtomicData::Double(v) => Ok(*v != 0.0 && !v.is_nan()),
        // Out-of-range integers keep a canonical lexical form, which is never zero
        AtomicData::Text(_) if kind.derives_from(AtomicType::Decimal) => Ok(true),
        _ => Err(ValueError::EbvUndefined {
            found: format!("a single {} value", kind),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AtomicValue, Node};
    use rstest::rstest;

    fn single(value: AtomicValue) -> Sequence {
        Sequence::one(value)
    }

    #[rstest]
    #[case(single(AtomicValue::boolean(true)), true)]
    #[case(single(AtomicValue::boolean(false)), false)]
    #[case(single(AtomicValue::string("")), false)]
    #[case(single(AtomicValue::string("0")), true)]
    #[case(single(AtomicValue::untyped("x")), true)]
    #[case(single(AtomicValue::integer(2)), true)]
    #[case(single(AtomicValue::integer(0)), false)]
    #[case(single(AtomicValue::double(f64::NAN)), false)]
    #[case(single(AtomicValue::double(-0.0)), false)]
    #[case(single(AtomicValue::float(0.5)), true)]
    #[case(Sequence::empty(), false)]
    fn test_ebv(#[case] sequence: Sequence, #[case] expected: bool) {
        assert_eq!(effective_boolean_value(&sequence).unwrap(), expected);
    }

    #[test]
    fn test_single_node_is_true() {
        let seq = Sequence::one(Item::from(Node::text("")));
        assert!(effective_boolean_value(&seq).unwrap());
    }

    #[test]
    fn test_node_followed_by_more_items_is_undefined() {
        let seq: Sequence = vec![
            Item::from(Node::text("a")),
            Item::from(AtomicValue::integer(0)),
        ]
        .into_iter()
        .collect();
        let err = effective_boolean_value(&seq).unwrap_err();
        assert_eq!(err.code().local_name(), "FORG0006");
    }

    #[test]
    fn test_undefined_shapes() {
        let two: Sequence = vec![AtomicValue::integer(1), AtomicValue::integer(2)]
            .into_iter()
            .collect();
        let err = effective_boolean_value(&two).unwrap_err();
        assert_eq!(err.code().local_name(), "FORG0006");

        let date = AtomicValue::from_lexical(AtomicType::Date, "2024-01-01").unwrap();
        assert!(effective_boolean_value(&single(date)).is_err());
    }
}
