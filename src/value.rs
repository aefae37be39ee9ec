//! Host-side value model.
//!
//! [`Value`] is what callers put into a namespace and what they get back after an execution. It is a plain owned
//! tree: no sharing, no interior mutability, so a value handed to the engine can never be changed by it (and vice
//! versa).
//!
//! ## Notes
//! - Numbers compare numerically: `Value::from(1) == Value::from(1.0)`.
//! - Mappings are `BTreeMap`s, so equality ignores insertion order.
//! - [`Value::Unrepresentable`] only ever comes *out* of an execution. The namespace builder rejects it.
//!
//! ## Examples
//! ```rust
//! use scriptbox::Value;
//!
//! let v = Value::from(serde_json::json!({"a": [1, 2.5, null]}));
//! assert_eq!(v, Value::mapping([("a", Value::from(vec![Value::from(1), Value::from(2.5), Value::Null]))]));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A numeric value: 64-bit integer or double.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (*self, *other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (Number::Float(a), Number::Float(b)) => a == b,
            (Number::Int(i), Number::Float(f)) | (Number::Float(f), Number::Int(i)) => int_eq_float(i, f),
        }
    }
}

/// Exact int/float comparison (no rounding of large integers).
pub(crate) fn int_eq_float(i: i64, f: f64) -> bool {
    if !f.is_finite() || f.fract() != 0.0 {
        return false;
    }
    // 2^63 is exactly representable; anything at or beyond it cannot be an i64.
    if !(-9.223_372_036_854_775_808e18..9.223_372_036_854_775_808e18).contains(&f) {
        return false;
    }
    f as i64 == i
}

/// A value that can cross the engine boundary.
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    Null,
    Number(Number),
    Sequence(Vec<Value>),
    Mapping(BTreeMap<String, Value>),
    String(String),
    /// Placeholder for a global the engine could not convert (a function, an exception, a dict with non-string
    /// keys, ...). Carries the language-level type name.
    Unrepresentable { type_name: String },
}

impl Value {
    /// Build a mapping from `(key, value)` pairs.
    pub fn mapping<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Mapping(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "boolean",
            Value::Null => "null",
            Value::Number(_) => "number",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
            Value::String(_) => "string",
            Value::Unrepresentable { .. } => "unrepresentable",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(Number::Int(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Find the first `Unrepresentable` inside this value and return its path (`""` for the value itself,
    /// `[2]` / `.key` segments for nested positions).
    pub(crate) fn find_unrepresentable(&self) -> Option<(String, &str)> {
        match self {
            Value::Unrepresentable { type_name } => Some((String::new(), type_name)),
            Value::Sequence(items) => items.iter().enumerate().find_map(|(i, item)| {
                item.find_unrepresentable()
                    .map(|(path, ty)| (format!("[{i}]{path}"), ty))
            }),
            Value::Mapping(map) => map.iter().find_map(|(k, item)| {
                item.find_unrepresentable()
                    .map(|(path, ty)| (format!(".{k}{path}"), ty))
            }),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => a == b,
            (Value::Mapping(a), Value::Mapping(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Unrepresentable { type_name: a }, Value::Unrepresentable { type_name: b }) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unrepresentable { type_name } => write!(f, "<{type_name}>"),
            other => write!(f, "{}", serde_json::Value::from(other)),
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Number(Number::Int(i))
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Number(Number::Int(i64::from(i)))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Number(Number::Float(f))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Mapping(map)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::from(i),
                None => Value::from(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => Value::Sequence(items.iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => {
                Value::Mapping(map.iter().map(|(k, v)| (k.clone(), Value::from(v))).collect())
            }
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from(&json)
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null | Value::Unrepresentable { .. } => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(Number::Int(i)) => serde_json::Value::from(*i),
            // `from_f64` yields `None` for NaN and infinities.
            Value::Number(Number::Float(f)) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Sequence(items) => serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect()),
            Value::Mapping(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        serde_json::Value::from(&value)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null | Value::Unrepresentable { .. } => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(Number::Int(i)) => serializer.serialize_i64(*i),
            Value::Number(Number::Float(f)) if f.is_finite() => serializer.serialize_f64(*f),
            Value::Number(Number::Float(_)) => serializer.serialize_unit(),
            Value::String(s) => serializer.serialize_str(s),
            Value::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Mapping(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_compare_across_int_and_float() {
        assert_eq!(Value::from(1), Value::from(1.0));
        assert_ne!(Value::from(1), Value::from(1.5));
        assert_ne!(Value::from(i64::MAX), Value::from(i64::MAX as f64));
        assert_ne!(Value::from(f64::NAN), Value::from(f64::NAN));
    }

    #[test]
    fn booleans_are_not_numbers() {
        assert_ne!(Value::from(true), Value::from(1));
    }

    #[test]
    fn mapping_equality_ignores_order() {
        let a = Value::mapping([("a", Value::from(1)), ("b", Value::from(2))]);
        let b = Value::mapping([("b", Value::from(2)), ("a", Value::from(1))]);
        assert_eq!(a, b);
    }

    #[test]
    fn json_numbers_prefer_int() {
        assert_eq!(Value::from(json!(42)).as_i64(), Some(42));
        assert_eq!(Value::from(json!(42.5)).as_f64(), Some(42.5));
        assert!(matches!(Value::from(json!(u64::MAX)), Value::Number(Number::Float(_))));
    }

    #[test]
    fn non_finite_and_placeholders_become_null() {
        let v = Value::Sequence(vec![
            Value::from(f64::INFINITY),
            Value::Unrepresentable {
                type_name: "function".to_string(),
            },
        ]);
        assert_eq!(serde_json::Value::from(&v), json!([null, null]));
        assert_eq!(serde_json::to_string(&v).unwrap(), "[null,null]");
    }

    #[test]
    fn deserialize_goes_through_json() {
        let v: Value = serde_json::from_str(r#"{"inner": {"a": 1, "b": [true, "x"]}}"#).unwrap();
        let inner = v.as_mapping().unwrap()["inner"].as_mapping().unwrap();
        assert_eq!(inner["a"], Value::from(1));
        assert_eq!(inner["b"].as_sequence().unwrap()[1].as_str(), Some("x"));
    }

    #[test]
    fn unrepresentable_path_is_reported() {
        let v = Value::mapping([(
            "outer",
            Value::Sequence(vec![
                Value::Null,
                Value::Unrepresentable {
                    type_name: "function".to_string(),
                },
            ]),
        )]);
        assert_eq!(v.find_unrepresentable(), Some((".outer[1]".to_string(), "function")));
    }
}
