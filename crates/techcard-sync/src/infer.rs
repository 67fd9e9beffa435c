//! Type inference for untyped wire values
//!
//! The server is the source of type truth, so the type is re-inferred from
//! the current [`RawValue`] every time and never cached on its own.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use techcard_model::{RawValue, Scalar};

/// Semantic type of a parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Whole number
    Integer,
    /// Number with a fractional part
    Real,
    /// Yes/no flag
    Boolean,
    /// Anything else
    #[default]
    String,
}

impl ValueType {
    /// Short wire name (`int`, `double`, `bool`, `string`)
    #[inline]
    #[must_use]
    pub const fn type_data(self) -> &'static str {
        match self {
            Self::Integer => "int",
            Self::Real => "double",
            Self::Boolean => "bool",
            Self::String => "string",
        }
    }

    /// Input hint shown next to the field
    #[inline]
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::Integer => Some("Integer"),
            Self::Real => Some("Number"),
            Self::Boolean => Some("Yes/No"),
            Self::String => None,
        }
    }

    /// Check if the type is numeric
    #[inline]
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Real)
    }
}

impl Display for ValueType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_data())
    }
}

impl FromStr for ValueType {
    type Err = std::convert::Infallible;

    /// Parse a type alias; unknown names fall back to `String`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" => Self::Integer,
            "double" | "float" | "real" => Self::Real,
            "bool" | "boolean" => Self::Boolean,
            _ => Self::String,
        })
    }
}

/// Infer the type of a parameter value
///
/// Choice lists are typed by their first element. Empty values, reference
/// objects and dictionaries are strings.
#[must_use]
pub fn infer_type(value: &RawValue) -> ValueType {
    match value {
        RawValue::Scalar(Scalar::Number(number)) => number_type(number),
        RawValue::Scalar(Scalar::Bool(_)) => ValueType::Boolean,
        RawValue::ChoiceList(items) => items.first().map_or(ValueType::String, json_type),
        _ => ValueType::String,
    }
}

fn json_type(value: &Value) -> ValueType {
    match value {
        Value::Number(number) => number_type(number),
        Value::Bool(_) => ValueType::Boolean,
        _ => ValueType::String,
    }
}

fn number_type(number: &Number) -> ValueType {
    if number.is_i64() || number.is_u64() {
        return ValueType::Integer;
    }
    match number.as_f64() {
        Some(float) if float.fract() == 0.0 => ValueType::Integer,
        _ => ValueType::Real,
    }
}
