//! Dynamic values for heterogeneous sources.
//!
//! A source whose element types are not known at compile time produces
//! [`Value`]s; the runtime-validated projection engines then convert them
//! into the destination's concrete types via [`FromValue`], reporting a
//! [`TypeMismatch`] instead of panicking when a value does not fit.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A dynamically typed value produced by a heterogeneous source.
///
/// [`Value::Null`] is the absence sentinel: an entry that carries no value at
/// all, as opposed to a present-but-zero one. Projection engines write it as
/// the destination type's default instead of type-checking it, so null-valued
/// entries can still populate a strongly typed destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
}

impl Value {
    /// Runtime type name, used in mismatch diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Bytes(_) => "bytes",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

/// A value could not be assigned to the destination type.
///
/// This is a tagged result rather than a panic: the projection engines wrap
/// it with the position (key or value) at which it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected}, got {actual}")]
pub struct TypeMismatch {
    pub expected: &'static str,
    pub actual: &'static str,
}

/// Conversion out of a dynamic [`Value`] into a concrete Rust type.
///
/// Implementations are strict assignability checks, not conversions: an
/// `Int` does not turn into an `f64` and a `Bool` does not turn into a
/// `String`.
pub trait FromValue: Sized {
    /// Destination type name for diagnostics.
    fn type_name() -> &'static str;

    fn from_value(value: Value) -> Result<Self, TypeMismatch>;
}

macro_rules! impl_from_value {
    ($ty:ty, $name:literal, $variant:ident) => {
        impl FromValue for $ty {
            fn type_name() -> &'static str {
                $name
            }

            fn from_value(value: Value) -> Result<Self, TypeMismatch> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(TypeMismatch {
                        expected: $name,
                        actual: other.kind(),
                    }),
                }
            }
        }
    };
}

impl_from_value!(bool, "bool", Bool);
impl_from_value!(i64, "i64", Int);
impl_from_value!(f64, "f64", Float);
impl_from_value!(String, "String", Str);
impl_from_value!(Vec<u8>, "Vec<u8>", Bytes);

impl FromValue for Value {
    fn type_name() -> &'static str {
        "Value"
    }

    fn from_value(value: Value) -> Result<Self, TypeMismatch> {
        Ok(value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn type_name() -> &'static str {
        T::type_name()
    }

    fn from_value(value: Value) -> Result<Self, TypeMismatch> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_every_variant() {
        assert_eq!(Value::Null.kind(), "null");
        assert_eq!(Value::Bool(true).kind(), "bool");
        assert_eq!(Value::Int(1).kind(), "int");
        assert_eq!(Value::Float(1.5).kind(), "float");
        assert_eq!(Value::Str("x".into()).kind(), "string");
        assert_eq!(Value::Bytes(vec![0]).kind(), "bytes");
    }

    #[test]
    fn from_value_extracts_matching_variant() {
        assert_eq!(i64::from_value(Value::Int(7)), Ok(7));
        assert_eq!(String::from_value(Value::Str("hi".into())), Ok("hi".into()));
        assert_eq!(bool::from_value(Value::Bool(false)), Ok(false));
    }

    #[test]
    fn from_value_rejects_mismatches() {
        let err = String::from_value(Value::Int(7)).unwrap_err();
        assert_eq!(
            err,
            TypeMismatch {
                expected: "String",
                actual: "int",
            }
        );
        assert_eq!(err.to_string(), "expected String, got int");
    }

    #[test]
    fn no_numeric_cross_coercion() {
        assert!(f64::from_value(Value::Int(1)).is_err());
        assert!(i64::from_value(Value::Float(1.0)).is_err());
    }

    #[test]
    fn option_treats_null_as_none() {
        assert_eq!(Option::<i64>::from_value(Value::Null), Ok(None));
        assert_eq!(Option::<i64>::from_value(Value::Int(3)), Ok(Some(3)));
        assert!(Option::<i64>::from_value(Value::Str("x".into())).is_err());
    }

    #[test]
    fn serde_round_trip() {
        let values = vec![
            Value::Null,
            Value::Bool(true),
            Value::Int(-4),
            Value::Float(2.25),
            Value::Str("text".into()),
        ];
        let json = serde_json::to_string(&values).unwrap();
        let back: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, values);
    }

    #[test]
    fn option_source_values_collapse_to_null() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(5i64)), Value::Int(5));
    }
}
