//! Typed attribute values.

use std::fmt;
use std::sync::Arc;

/// A typed attribute value.
///
/// Decoded from an attribute record's `(type_code, ext_code, primitive)`
/// triple: `(1, 0)` is an integer, `(1, 1)` a boolean, `(2, 0)` a float
/// (the bit reinterpretation of the stored word, never canonicalized), and
/// type code 3 a string resolved through the value table. Every other
/// combination is structurally invalid.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Int(i32),
    Float(f32),
    Bool(bool),
    Str(Arc<str>),
}

impl From<i32> for AttributeValue {
    fn from(v: i32) -> Self {
        AttributeValue::Int(v)
    }
}

impl From<f32> for AttributeValue {
    fn from(v: f32) -> Self {
        AttributeValue::Float(v)
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        AttributeValue::Bool(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::Str(v.into())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::Str(v.into())
    }
}

impl From<Arc<str>> for AttributeValue {
    fn from(v: Arc<str>) -> Self {
        AttributeValue::Str(v)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Int(v) => write!(f, "{}", v),
            AttributeValue::Float(v) => write!(f, "{}", v),
            AttributeValue::Bool(v) => write!(f, "{}", v),
            AttributeValue::Str(v) => write!(f, "{}", v),
        }
    }
}
