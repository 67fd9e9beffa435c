//! Canonical parameter values
//!
//! Wire values are untyped JSON. [`RawValue`] classifies them once, at the
//! tree boundary, so the rest of the system matches on a single tagged enum
//! instead of re-sniffing JSON shapes.

use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};

/// Key of the display label in a reference object
pub const REFERENCE_NAME: &str = "name";
/// Key of the identifier in a reference object
pub const REFERENCE_ID: &str = "id";

/// A selected scalar value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Text value
    Text(String),
    /// Numeric value (kept as received)
    Number(Number),
    /// Boolean value
    Bool(bool),
}

impl Scalar {
    /// Display text of the scalar
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Number(number) => number_text(number),
            Self::Bool(flag) => flag.to_string(),
        }
    }

    /// Wire representation
    #[must_use]
    pub fn to_wire(&self) -> Value {
        match self {
            Self::Text(text) => Value::String(text.clone()),
            Self::Number(number) => Value::Number(number.clone()),
            Self::Bool(flag) => Value::Bool(*flag),
        }
    }
}

/// Parameter value as delivered by the server
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// `val` field missing
    Absent,
    /// `val` is `null`
    Null,
    /// A selected scalar
    Scalar(Scalar),
    /// A selected `{id, name}` reference object
    Reference(Map<String, Value>),
    /// Ordered candidate scalars or reference objects
    ChoiceList(Vec<Value>),
    /// Candidate `id → label` pairs
    ChoiceDict(Map<String, Value>),
}

impl RawValue {
    /// Classify an optional wire value
    #[must_use]
    pub fn from_wire(value: Option<&Value>) -> Self {
        match value {
            None => Self::Absent,
            Some(value) => Self::from(value.clone()),
        }
    }

    /// Wire representation (`None` when the value was absent)
    #[must_use]
    pub fn to_wire(&self) -> Option<Value> {
        match self {
            Self::Absent => None,
            Self::Null => Some(Value::Null),
            Self::Scalar(scalar) => Some(scalar.to_wire()),
            Self::Reference(map) | Self::ChoiceDict(map) => Some(Value::Object(map.clone())),
            Self::ChoiceList(items) => Some(Value::Array(items.clone())),
        }
    }

    /// Check if no value was supplied
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Absent | Self::Null)
    }

    /// Selected scalar, if any
    #[inline]
    #[must_use]
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    /// Check if the value offers candidates instead of one selection
    #[inline]
    #[must_use]
    pub fn is_choice(&self) -> bool {
        matches!(self, Self::ChoiceList(_) | Self::ChoiceDict(_))
    }

    /// Label of a reference object (`name`, falling back to `id`)
    #[must_use]
    pub fn reference_label(&self) -> Option<String> {
        match self {
            Self::Reference(map) => map
                .get(REFERENCE_NAME)
                .filter(|name| !name.is_null())
                .or_else(|| map.get(REFERENCE_ID))
                .map(value_text),
            _ => None,
        }
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::String(text) => Self::Scalar(Scalar::Text(text)),
            Value::Number(number) => Self::Scalar(Scalar::Number(number)),
            Value::Bool(flag) => Self::Scalar(Scalar::Bool(flag)),
            Value::Array(items) => Self::ChoiceList(items),
            Value::Object(map) => {
                if is_reference(&map) {
                    Self::Reference(map)
                } else {
                    Self::ChoiceDict(map)
                }
            }
        }
    }
}

impl Serialize for RawValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire().unwrap_or(Value::Null).serialize(serializer)
    }
}

/// Check if an object is a `{id, name}` reference rather than a dictionary
///
/// Both keys must be present. An object carrying only one of them is a
/// dictionary whose values are offered as choices.
#[inline]
#[must_use]
pub fn is_reference(map: &Map<String, Value>) -> bool {
    map.contains_key(REFERENCE_ID) && map.contains_key(REFERENCE_NAME)
}

/// Display text for any wire value
///
/// Strings are returned unquoted, numbers without a trailing `.0`, and
/// reference objects by their `name`.
#[must_use]
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(text) => text.clone(),
        Value::Number(number) => number_text(number),
        Value::Bool(flag) => flag.to_string(),
        Value::Object(map) => match map.get(REFERENCE_NAME) {
            Some(name) if !name.is_null() => value_text(name),
            _ => value.to_string(),
        },
        Value::Array(_) => value.to_string(),
    }
}

/// Display text for a JSON number
#[must_use]
pub fn number_text(number: &Number) -> String {
    if let Some(int) = number.as_i64() {
        return int.to_string();
    }
    if let Some(uint) = number.as_u64() {
        return uint.to_string();
    }
    number
        .as_f64()
        .map_or_else(|| number.to_string(), |float| float.to_string())
}
