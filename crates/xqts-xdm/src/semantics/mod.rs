//! Value semantics needed to interpret assertions
//!
//! Each helper follows the corresponding XPath/XQuery rule closely enough to agree
//! with a conforming engine's expected outputs. Helpers are pure functions over
//! sequences; any operation without a defined result returns a [`ValueError`].
//!
//! [`ValueError`]: crate::ValueError

mod deep_equal;
mod ebv;
mod equality;
mod lexer;
mod pattern;
mod sequence_type;
mod serialize;
mod string_value;

pub use deep_equal::{DeepEqualOptions, atomic_deep_equal, deep_equal, deep_equal_with};
pub use ebv::effective_boolean_value;
pub use equality::{ExpectedToken, parse_expected, typed_equal, values_equal};
pub use pattern::xpath_regex;
pub use sequence_type::{ItemTest, NameTest, Occurrence, SequenceType};
pub use serialize::{serialize, serialize_item};
pub use string_value::{item_string_value, normalize_space, string_value};
