//! Typed equality between result items and expected literals

use super::lexer::{Input, PResult, name, quoted, ws};
use crate::atomic::{AtomicData, AtomicType, AtomicValue};
use crate::error::{ValueError, ValueResult};
use crate::sequence::Sequence;
use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use rust_decimal::Decimal;
use std::str::FromStr;
use winnow::combinator::{alt, eof, opt, repeat, terminated};
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::{take_till, take_while};

/// One literal in an expected-value list
#[derive(Debug, Clone, PartialEq)]
pub enum ExpectedToken {
    /// Unquoted numeric literal, e.g. `42`, `1.5`, `-1.0E3`, `INF`
    Number(String),
    /// Quoted string literal
    Str(String),
    /// `true()` or `false()`
    Boolean(bool),
    /// Constructor call such as `xs:float("-3.4028235E38")`
    Constructor { type_name: String, argument: String },
    /// Any other unquoted word, compared as untyped text
    Bare(String),
}

impl ExpectedToken {
    /// The atomic value this literal denotes
    pub fn to_value(&self) -> ValueResult<AtomicValue> {
        match self {
            Self::Number(lexical) => {
                let kind = if lexical.contains(['e', 'E', 'I', 'N']) {
                    AtomicType::Double
                } else if lexical.contains('.') {
                    AtomicType::Decimal
                } else {
                    AtomicType::Integer
                };
                AtomicValue::from_lexical(kind, lexical)
            }
            Self::Str(text) => Ok(AtomicValue::string(text.clone())),
            Self::Boolean(b) => Ok(AtomicValue::boolean(*b)),
            Self::Constructor {
                type_name,
                argument,
            } => {
                let kind = AtomicType::from_name(type_name).ok_or_else(|| {
                    ValueError::UnknownType {
                        name: type_name.clone(),
                    }
                })?;
                AtomicValue::from_lexical(kind, argument)
            }
            Self::Bare(text) => Ok(AtomicValue::untyped(text.clone())),
        }
    }

    /// The literal's text as written, without quotes or constructor call
    pub fn lexical(&self) -> &str {
        match self {
            Self::Number(text) | Self::Str(text) | Self::Bare(text) => text,
            Self::Boolean(true) => "true",
            Self::Boolean(false) => "false",
            Self::Constructor { argument, .. } => argument,
        }
    }
}

/// Split an expected-value list into literals
///
/// Literals are separated by whitespace or commas; quotes and constructor
/// parentheses keep their contents together.
pub fn parse_expected(text: &str) -> ValueResult<Vec<ExpectedToken>> {
    let mut input: Input<'_> = text;
    let invalid = |_| ValueError::InvalidExpected {
        text: text.to_string(),
    };
    ws(&mut input).map_err(invalid)?;
    let tokens: Vec<ExpectedToken> = repeat(0.., terminated(token, separator))
        .parse_next(&mut input)
        .map_err(invalid)?;
    eof::<_, ContextError>
        .parse_next(&mut input)
        .map_err(|_| ValueError::InvalidExpected {
            text: text.to_string(),
        })?;
    Ok(tokens)
}

fn separator(input: &mut Input<'_>) -> PResult<()> {
    (ws, opt(','), ws).void().parse_next(input)
}

fn token(input: &mut Input<'_>) -> PResult<ExpectedToken> {
    alt((quoted.map(ExpectedToken::Str), call, bare)).parse_next(input)
}

fn call(input: &mut Input<'_>) -> PResult<ExpectedToken> {
    let type_name = name.parse_next(input)?;
    ('(', ws).parse_next(input)?;
    let argument = alt((
        quoted,
        take_till(0.., ')').map(|s: &str| s.trim().to_string()),
    ))
    .parse_next(input)?;
    (ws, ')').parse_next(input)?;

    let local = type_name.strip_prefix("fn:").unwrap_or(type_name);
    Ok(match (local, argument.is_empty()) {
        ("true", true) => ExpectedToken::Boolean(true),
        ("false", true) => ExpectedToken::Boolean(false),
        _ => ExpectedToken::Constructor {
            type_name: type_name.to_string(),
            argument,
        },
    })
}

fn bare(input: &mut Input<'_>) -> PResult<ExpectedToken> {
    take_while(1.., |c: char| {
        !c.is_whitespace() && !matches!(c, ',' | '"' | '\'')
    })
        .map(|word: &str| {
            if is_numeric_literal(word) {
                ExpectedToken::Number(word.to_string())
            } else {
                ExpectedToken::Bare(word.to_string())
            }
        })
        .parse_next(input)
}

fn is_numeric_literal(word: &str) -> bool {
    matches!(word, "INF" | "-INF" | "NaN")
        || (word.bytes().any(|b| b.is_ascii_digit())
            && AtomicValue::from_lexical(AtomicType::Double, word).is_ok())
}

/// Compare each item against the corresponding literal of `expected`
///
/// Sequence and literal list must have the same length. Nodes are atomized to
/// their string value first. String and URI items compare against the literal's
/// text as written, so `"2"` does not equal `2.0`.
pub fn typed_equal(expected: &str, sequence: &Sequence) -> ValueResult<bool> {
    let tokens = parse_expected(expected)?;
    if tokens.len() != sequence.len() {
        return Ok(false);
    }
    for (token, item) in tokens.iter().zip(sequence) {
        let actual = item.atomize();
        let kind = actual.kind();
        let equal = if kind.is_string_like() && kind != AtomicType::UntypedAtomic {
            // Unknown constructor names are still an error
            token.to_value()?;
            actual.canonical() == token.lexical()
        } else {
            values_equal(&actual, &token.to_value()?)
        };
        if !equal {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Value-space equality, with the actual value's type deciding the comparison
///
/// Numeric values compare numerically, booleans as booleans, temporal values as
/// instants when both carry a timezone; everything else compares canonical strings.
/// Untyped values take the type of the other side.
pub fn values_equal(actual: &AtomicValue, expected: &AtomicValue) -> bool {
    let actual_kind = actual.kind();
    let expected_kind = expected.kind();
    let untyped = actual_kind == AtomicType::UntypedAtomic;

    if actual_kind.is_numeric() || (untyped && expected_kind.is_numeric()) {
        return numeric_equal(actual, expected, false);
    }
    if actual_kind == AtomicType::Boolean || (untyped && expected_kind == AtomicType::Boolean) {
        return match (as_boolean(actual), as_boolean(expected)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
    }
    if let Some(equal) = temporal_equal(actual, expected) {
        return equal;
    }
    actual.canonical() == expected.canonical()
}

#[derive(Debug, Clone)]
enum Number {
    Decimal(Decimal),
    Double(f64),
    /// Integer beyond the range of `Decimal`, in canonical form
    Big(String),
}

fn to_number(value: &AtomicValue) -> Option<Number> {
    match value.data() {
        AtomicData::Decimal(d) => Some(Number::Decimal(*d)),
        AtomicData::Double(v) => Some(Number::Double(*v)),
        AtomicData::Text(text) if value.kind().is_numeric() => Some(Number::Big(text.clone())),
        AtomicData::Text(text) => {
            let text = text.trim();
            match AtomicValue::from_lexical(AtomicType::Decimal, text) {
                Ok(parsed) => to_number(&parsed),
                Err(_) => AtomicValue::from_lexical(AtomicType::Double, text)
                    .ok()
                    .and_then(|parsed| to_number(&parsed)),
            }
        }
        _ => None,
    }
}

/// Numeric equality; `nan_equal` makes NaN equal to itself as `fn:deep-equal` does
pub(crate) fn numeric_equal(a: &AtomicValue, b: &AtomicValue, nan_equal: bool) -> bool {
    let (Some(x), Some(y)) = (to_number(a), to_number(b)) else {
        return false;
    };
    let single = a.kind() == AtomicType::Float || b.kind() == AtomicType::Float;
    match (&x, &y) {
        (Number::Decimal(x), Number::Decimal(y)) => x == y,
        (Number::Big(x), Number::Big(y)) => x == y,
        (Number::Big(big), Number::Decimal(d)) | (Number::Decimal(d), Number::Big(big)) => {
            *big == d.normalize().to_string()
        }
        _ => {
            let (x, y) = (as_f64(&x), as_f64(&y));
            if x.is_nan() || y.is_nan() {
                return nan_equal && x.is_nan() && y.is_nan();
            }
            if single {
                (x as f32) == (y as f32)
            } else {
                x == y
            }
        }
    }
}

fn as_f64(number: &Number) -> f64 {
    use rust_decimal::prelude::ToPrimitive;

    match number {
        Number::Decimal(d) => d.to_f64().unwrap_or(f64::NAN),
        Number::Double(v) => *v,
        Number::Big(text) => f64::from_str(text).unwrap_or(f64::NAN),
    }
}

fn as_boolean(value: &AtomicValue) -> Option<bool> {
    match value.data() {
        AtomicData::Boolean(b) => Some(*b),
        AtomicData::Text(text) if value.kind().is_string_like() => match text.trim() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Instant comparison for `xs:dateTime`, `xs:date` and `xs:time`
///
/// Returns `None` when the values are not both temporal of the same primitive type
/// or when only one side carries a timezone.
fn temporal_equal(actual: &AtomicValue, expected: &AtomicValue) -> Option<bool> {
    let kind = actual.kind().primitive();
    if !matches!(
        kind,
        AtomicType::DateTime | AtomicType::Date | AtomicType::Time
    ) {
        return None;
    }
    let expected_kind = expected.kind();
    if expected_kind.primitive() != kind && !expected_kind.is_string_like() {
        return None;
    }
    let (a, a_zone) = temporal_key(kind, &actual.canonical())?;
    let (b, b_zone) = temporal_key(kind, &expected.canonical())?;
    match (a_zone, b_zone) {
        (Some(x), Some(y)) => {
            let a = x.from_local_datetime(&a).single()?.naive_utc();
            let b = y.from_local_datetime(&b).single()?.naive_utc();
            Some(a == b)
        }
        (None, None) => Some(a == b),
        _ => None,
    }
}

fn temporal_key(kind: AtomicType, lexical: &str) -> Option<(NaiveDateTime, Option<FixedOffset>)> {
    let (body, zone) = split_timezone(lexical.trim());
    let local = match kind {
        AtomicType::DateTime => NaiveDateTime::parse_from_str(body, "%Y-%m-%dT%H:%M:%S%.f").ok()?,
        AtomicType::Date => NaiveDate::parse_from_str(body, "%Y-%m-%d")
            .ok()?
            .and_hms_opt(0, 0, 0)?,
        AtomicType::Time => {
            let time = NaiveTime::parse_from_str(body, "%H:%M:%S%.f").ok()?;
            NaiveDate::from_ymd_opt(1972, 12, 31)?.and_time(time)
        }
        _ => return None,
    };
    Some((local, zone))
}

fn split_timezone(lexical: &str) -> (&str, Option<FixedOffset>) {
    if let Some(body) = lexical.strip_suffix('Z') {
        return (body, FixedOffset::east_opt(0));
    }
    let bytes = lexical.as_bytes();
    let n = bytes.len();
    if n >= 6 && matches!(bytes[n - 6], b'+' | b'-') && bytes[n - 3] == b':' {
        let hours: i32 = lexical[n - 5..n - 3].parse().unwrap_or(-1);
        let minutes: i32 = lexical[n - 2..].parse().unwrap_or(-1);
        if (0..=14).contains(&hours) && (0..60).contains(&minutes) {
            let sign = if bytes[n - 6] == b'-' { -1 } else { 1 };
            let offset = FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60));
            return (&lexical[..n - 6], offset);
        }
    }
    (lexical, None)
}
