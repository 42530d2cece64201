//! Atomic values and the XML Schema type hierarchy

use crate::error::{ValueError, ValueResult};
use crate::qname::QName;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Built-in atomic types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AtomicType {
    AnyAtomic,
    UntypedAtomic,
    String,
    NormalizedString,
    Token,
    Language,
    NmToken,
    Name,
    NcName,
    Id,
    IdRef,
    Entity,
    Boolean,
    Decimal,
    Integer,
    NonPositiveInteger,
    NegativeInteger,
    Long,
    Int,
    Short,
    Byte,
    NonNegativeInteger,
    UnsignedLong,
    UnsignedInt,
    UnsignedShort,
    UnsignedByte,
    PositiveInteger,
    Double,
    Float,
    Duration,
    DayTimeDuration,
    YearMonthDuration,
    DateTime,
    DateTimeStamp,
    Date,
    Time,
    GYearMonth,
    GYear,
    GMonthDay,
    GDay,
    GMonth,
    HexBinary,
    Base64Binary,
    AnyUri,
    QName,
    Notation,
}

impl AtomicType {
    const ALL: [AtomicType; 46] = [
        Self::AnyAtomic,
        Self::UntypedAtomic,
        Self::String,
        Self::NormalizedString,
        Self::Token,
        Self::Language,
        Self::NmToken,
        Self::Name,
        Self::NcName,
        Self::Id,
        Self::IdRef,
        Self::Entity,
        Self::Boolean,
        Self::Decimal,
        Self::Integer,
        Self::NonPositiveInteger,
        Self::NegativeInteger,
        Self::Long,
        Self::Int,
        Self::Short,
        Self::Byte,
        Self::NonNegativeInteger,
        Self::UnsignedLong,
        Self::UnsignedInt,
        Self::UnsignedShort,
        Self::UnsignedByte,
        Self::PositiveInteger,
        Self::Double,
        Self::Float,
        Self::Duration,
        Self::DayTimeDuration,
        Self::YearMonthDuration,
        Self::DateTime,
        Self::DateTimeStamp,
        Self::Date,
        Self::Time,
        Self::GYearMonth,
        Self::GYear,
        Self::GMonthDay,
        Self::GDay,
        Self::GMonth,
        Self::HexBinary,
        Self::Base64Binary,
        Self::AnyUri,
        Self::QName,
        Self::Notation,
    ];

    /// Local name in the XML Schema namespace
    pub const fn local_name(&self) -> &'static str {
        match self {
            Self::AnyAtomic => "anyAtomicType",
            Self::UntypedAtomic => "untypedAtomic",
            Self::String => "string",
            Self::NormalizedString => "normalizedString",
            Self::Token => "token",
            Self::Language => "language",
            Self::NmToken => "NMTOKEN",
            Self::Name => "Name",
            Self::NcName => "NCName",
            Self::Id => "ID",
            Self::IdRef => "IDREF",
            Self::Entity => "ENTITY",
            Self::Boolean => "boolean",
            Self::Decimal => "decimal",
            Self::Integer => "integer",
            Self::NonPositiveInteger => "nonPositiveInteger",
            Self::NegativeInteger => "negativeInteger",
            Self::Long => "long",
            Self::Int => "int",
            Self::Short => "short",
            Self::Byte => "byte",
            Self::NonNegativeInteger => "nonNegativeInteger",
            Self::UnsignedLong => "unsignedLong",
            Self::UnsignedInt => "unsignedInt",
            Self::UnsignedShort => "unsignedShort",
            Self::UnsignedByte => "unsignedByte",
            Self::PositiveInteger => "positiveInteger",
            Self::Double => "double",
            Self::Float => "float",
            Self::Duration => "duration",
            Self::DayTimeDuration => "dayTimeDuration",
            Self::YearMonthDuration => "yearMonthDuration",
            Self::DateTime => "dateTime",
            Self::DateTimeStamp => "dateTimeStamp",
            Self::Date => "date",
            Self::Time => "time",
            Self::GYearMonth => "gYearMonth",
            Self::GYear => "gYear",
            Self::GMonthDay => "gMonthDay",
            Self::GDay => "gDay",
            Self::GMonth => "gMonth",
            Self::HexBinary => "hexBinary",
            Self::Base64Binary => "base64Binary",
            Self::AnyUri => "anyURI",
            Self::QName => "QName",
            Self::Notation => "NOTATION",
        }
    }

    /// Look up a type by its local name, with or without an `xs:` prefix
    pub fn from_name(name: &str) -> Option<Self> {
        let local = name.trim().strip_prefix("xs:").unwrap_or(name.trim());
        Self::ALL.iter().copied().find(|t| t.local_name() == local)
    }

    /// Immediate supertype; `None` only for `xs:anyAtomicType`
    pub const fn parent(&self) -> Option<Self> {
        let parent = match self {
            Self::AnyAtomic => return None,
            Self::NormalizedString => Self::String,
            Self::Token => Self::NormalizedString,
            Self::Language | Self::NmToken | Self::Name => Self::Token,
            Self::NcName => Self::Name,
            Self::Id | Self::IdRef | Self::Entity => Self::NcName,
            Self::Integer => Self::Decimal,
            Self::NonPositiveInteger | Self::Long | Self::NonNegativeInteger => Self::Integer,
            Self::NegativeInteger => Self::NonPositiveInteger,
            Self::Int => Self::Long,
            Self::Short => Self::Int,
            Self::Byte => Self::Short,
            Self::UnsignedLong | Self::PositiveInteger => Self::NonNegativeInteger,
            Self::UnsignedInt => Self::UnsignedLong,
            Self::UnsignedShort => Self::UnsignedInt,
            Self::UnsignedByte => Self::UnsignedShort,
            Self::DayTimeDuration | Self::YearMonthDuration => Self::Duration,
            Self::DateTimeStamp => Self::DateTime,
            _ => Self::AnyAtomic,
        };
        Some(parent)
    }

    /// Whether this type is `ancestor` or derived from it by restriction
    pub fn derives_from(&self, ancestor: AtomicType) -> bool {
        let mut current = Some(*self);
        while let Some(t) = current {
            if t == ancestor {
                return true;
            }
            current = t.parent();
        }
        false
    }

    /// The primitive type this type is derived from
    pub fn primitive(&self) -> Self {
        let mut current = *self;
        while let Some(parent) = current.parent() {
            if parent == Self::AnyAtomic {
                break;
            }
            current = parent;
        }
        current
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.primitive(), Self::Decimal | Self::Double | Self::Float)
    }

    pub fn is_integer(&self) -> bool {
        self.derives_from(Self::Integer)
    }

    /// Types compared as plain strings
    pub fn is_string_like(&self) -> bool {
        matches!(
            self.primitive(),
            Self::String | Self::UntypedAtomic | Self::AnyUri
        )
    }
}

impl fmt::Display for AtomicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "xs:{}", self.local_name())
    }
}

/// Storage of an atomic value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AtomicData {
    /// Lexical storage: strings, temporal values, and integers too large for `Decimal`
    Text(String),
    Boolean(bool),
    Decimal(Decimal),
    /// `xs:double`, and `xs:float` widened from `f32`
    Double(f64),
    QName(QName),
}

/// An atomic value tagged with its type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomicValue {
    kind: AtomicType,
    data: AtomicData,
}

impl AtomicValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            kind: AtomicType::String,
            data: AtomicData::Text(value.into()),
        }
    }

    pub fn untyped(value: impl Into<String>) -> Self {
        Self {
            kind: AtomicType::UntypedAtomic,
            data: AtomicData::Text(value.into()),
        }
    }

    pub fn any_uri(value: impl Into<String>) -> Self {
        Self {
            kind: AtomicType::AnyUri,
            data: AtomicData::Text(value.into()),
        }
    }

    pub fn boolean(value: bool) -> Self {
        Self {
            kind: AtomicType::Boolean,
            data: AtomicData::Boolean(value),
        }
    }

    pub fn integer(value: i64) -> Self {
        Self {
            kind: AtomicType::Integer,
            data: AtomicData::Decimal(Decimal::from(value)),
        }
    }

    pub fn decimal(value: Decimal) -> Self {
        Self {
            kind: AtomicType::Decimal,
            data: AtomicData::Decimal(value),
        }
    }

    pub fn double(value: f64) -> Self {
        Self {
            kind: AtomicType::Double,
            data: AtomicData::Double(value),
        }
    }

    pub fn float(value: f32) -> Self {
        Self {
            kind: AtomicType::Float,
            data: AtomicData::Double(f64::from(value)),
        }
    }

    pub fn qname(value: QName) -> Self {
        Self {
            kind: AtomicType::QName,
            data: AtomicData::QName(value),
        }
    }

    /// Cast a lexical form to a value of the given type
    ///
    /// Integers beyond the range of `Decimal` keep their canonical lexical form.
    /// Temporal and binary types are stored lexically after whitespace collapsing.
    pub fn from_lexical(kind: AtomicType, lexical: &str) -> ValueResult<Self> {
        let name = kind.local_name();
        let data = if kind == AtomicType::Boolean {
            match lexical.trim() {
                "true" | "1" => AtomicData::Boolean(true),
                "false" | "0" => AtomicData::Boolean(false),
                other => return Err(ValueError::lexical(name, other)),
            }
        } else if kind.is_integer() {
            let trimmed = lexical.trim();
            if !is_integer_lexical(trimmed) {
                return Err(ValueError::lexical(name, trimmed));
            }
            parse_decimal(trimmed)
        } else if kind.primitive() == AtomicType::Decimal {
            let trimmed = lexical.trim();
            if !is_decimal_lexical(trimmed) {
                return Err(ValueError::lexical(name, trimmed));
            }
            parse_decimal(trimmed)
        } else if kind == AtomicType::Double {
            let value =
                parse_double(lexical.trim()).ok_or_else(|| ValueError::lexical(name, lexical))?;
            AtomicData::Double(value)
        } else if kind == AtomicType::Float {
            let value =
                parse_float(lexical.trim()).ok_or_else(|| ValueError::lexical(name, lexical))?;
            AtomicData::Double(f64::from(value))
        } else if kind == AtomicType::QName {
            let (prefix, local) = QName::split_lexical(lexical.trim());
            AtomicData::QName(QName {
                namespace: None,
                prefix: prefix.map(str::to_string),
                local: local.to_string(),
            })
        } else if kind.is_string_like() {
            AtomicData::Text(lexical.to_string())
        } else {
            AtomicData::Text(lexical.split_whitespace().collect::<Vec<_>>().join(" "))
        };
        Ok(Self { kind, data })
    }

    pub fn kind(&self) -> AtomicType {
        self.kind
    }

    pub fn data(&self) -> &AtomicData {
        &self.data
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.data {
            AtomicData::Boolean(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self.data {
            AtomicData::Decimal(d) => Some(d),
            _ => None,
        }
    }

    /// Numeric value as a double, if the value is numeric
    pub fn as_f64(&self) -> Option<f64> {
        use rust_decimal::prelude::ToPrimitive;

        match &self.data {
            AtomicData::Double(v) => Some(*v),
            AtomicData::Decimal(d) => d.to_f64(),
            AtomicData::Text(t) if self.kind.is_numeric() => t.parse().ok(),
            _ => None,
        }
    }

    pub fn is_nan(&self) -> bool {
        matches!(self.data, AtomicData::Double(v) if v.is_nan())
    }

    /// Canonical lexical form, as produced by a cast to `xs:string`
    pub fn canonical(&self) -> String {
        match &self.data {
            AtomicData::Text(text) => text.clone(),
            AtomicData::Boolean(b) => b.to_string(),
            AtomicData::Decimal(d) => format_decimal(*d),
            AtomicData::Double(v) => format_double(*v, self.kind == AtomicType::Float),
            AtomicData::QName(name) => name.to_string(),
        }
    }
}

impl fmt::Display for AtomicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

fn is_integer_lexical(text: &str) -> bool {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_decimal_lexical(text: &str) -> bool {
    let body = text.strip_prefix(['+', '-']).unwrap_or(text);
    let (int, frac) = body.split_once('.').unwrap_or((body, ""));
    (!int.is_empty() || !frac.is_empty())
        && int.bytes().all(|b| b.is_ascii_digit())
        && frac.bytes().all(|b| b.is_ascii_digit())
}

/// Parse a validated decimal lexical form, falling back to its canonical text on overflow
fn parse_decimal(text: &str) -> AtomicData {
    let canonical = canonical_decimal_text(text);
    match Decimal::from_str(&canonical) {
        Ok(d) => AtomicData::Decimal(d),
        Err(_) => AtomicData::Text(canonical),
    }
}

fn canonical_decimal_text(text: &str) -> String {
    let negative = text.starts_with('-');
    let body = text.trim_start_matches(['+', '-']);
    let (int, frac) = body.split_once('.').unwrap_or((body, ""));
    let int = int.trim_start_matches('0');
    let frac = frac.trim_end_matches('0');
    let int = if int.is_empty() { "0" } else { int };
    let mut out = String::new();
    if negative && (int != "0" || !frac.is_empty()) {
        out.push('-');
    }
    out.push_str(int);
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    out
}

fn is_double_lexical(text: &str) -> bool {
    !text.is_empty()
        && text.bytes().any(|b| b.is_ascii_digit())
        && text
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
}

fn parse_double(text: &str) -> Option<f64> {
    match text {
        "INF" | "+INF" => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        _ if is_double_lexical(text) => text.parse().ok(),
        _ => None,
    }
}

fn parse_float(text: &str) -> Option<f32> {
    match text {
        "INF" | "+INF" => Some(f32::INFINITY),
        "-INF" => Some(f32::NEG_INFINITY),
        "NaN" => Some(f32::NAN),
        _ if is_double_lexical(text) => text.parse().ok(),
        _ => None,
    }
}

fn format_decimal(value: Decimal) -> String {
    if value.is_zero() {
        return "0".to_string();
    }
    value.normalize().to_string()
}

/// Canonical `xs:double` / `xs:float` form
///
/// Magnitudes in `[1e-6, 1e6)` print without an exponent; everything else uses
/// scientific notation with at least one fractional digit in the mantissa.
pub(crate) fn format_double(value: f64, single: bool) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    let magnitude = value.abs();
    if (1e-6..1e6).contains(&magnitude) {
        return if single {
            format!("{}", value as f32)
        } else {
            format!("{}", value)
        };
    }
    let scientific = if single {
        format!("{:E}", value as f32)
    } else {
        format!("{:E}", value)
    };
    match scientific.split_once('E') {
        Some((mantissa, exponent)) if !mantissa.contains('.') => {
            format!("{}.0E{}", mantissa, exponent)
        }
        _ => scientific,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_hierarchy() {
        assert!(AtomicType::Byte.derives_from(AtomicType::Integer));
        assert!(AtomicType::Byte.derives_from(AtomicType::Decimal));
        assert!(AtomicType::Byte.derives_from(AtomicType::AnyAtomic));
        assert!(!AtomicType::Integer.derives_from(AtomicType::Byte));
        assert!(!AtomicType::Double.derives_from(AtomicType::Decimal));
        assert_eq!(AtomicType::UnsignedByte.primitive(), AtomicType::Decimal);
        assert!(AtomicType::PositiveInteger.is_numeric());
        assert!(AtomicType::AnyUri.is_string_like());
    }

    #[test]
    fn test_from_name() {
        assert_eq!(AtomicType::from_name("xs:integer"), Some(AtomicType::Integer));
        assert_eq!(AtomicType::from_name("NCName"), Some(AtomicType::NcName));
        assert_eq!(AtomicType::from_name("xs:bogus"), None);
    }

    #[rstest]
    #[case(AtomicType::Integer, "+0042", "42")]
    #[case(AtomicType::Integer, "-0", "0")]
    #[case(AtomicType::Decimal, "1.50", "1.5")]
    #[case(AtomicType::Decimal, "-.5", "-0.5")]
    #[case(AtomicType::Decimal, "3.0", "3")]
    #[case(AtomicType::Double, "1e7", "1.0E7")]
    #[case(AtomicType::Double, "0.5", "0.5")]
    #[case(AtomicType::Double, "-INF", "-INF")]
    #[case(AtomicType::Double, "1.5E-7", "1.5E-7")]
    #[case(AtomicType::Float, "-3.4028235E38", "-3.4028235E38")]
    #[case(AtomicType::Float, "1.1", "1.1")]
    #[case(AtomicType::Boolean, "1", "true")]
    fn test_canonical_forms(#[case] kind: AtomicType, #[case] lexical: &str, #[case] expected: &str) {
        let value = AtomicValue::from_lexical(kind, lexical).unwrap();
        assert_eq!(value.canonical(), expected);
    }

    #[test]
    fn test_oversized_integer_keeps_lexical_form() {
        let value =
            AtomicValue::from_lexical(AtomicType::Integer, "000123456789012345678901234567890123")
                .unwrap();
        assert!(matches!(value.data(), AtomicData::Text(_)));
        assert_eq!(value.canonical(), "123456789012345678901234567890123");
    }

    #[rstest]
    #[case(AtomicType::Integer, "1.5")]
    #[case(AtomicType::Decimal, "1e3")]
    #[case(AtomicType::Double, "inf")]
    #[case(AtomicType::Boolean, "yes")]
    fn test_invalid_lexical(#[case] kind: AtomicType, #[case] lexical: &str) {
        assert!(AtomicValue::from_lexical(kind, lexical).is_err());
    }
}
