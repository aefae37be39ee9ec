//! Namespace Builder: validated name → [`Value`] bindings.
//!
//! A [`Namespace`] is the set of globals an execution starts from, and the shape the engine hands back afterwards.
//! Building one checks every name against the language's identifier rules and rejects values that only make sense
//! as read-back placeholders.
//!
//! ## Examples
//! ```rust
//! use scriptbox::{NamespaceBuilder, Value};
//!
//! let ns = NamespaceBuilder::new()
//!     .bind("test_number", 42)
//!     .bind("test_array", vec![Value::from(1), Value::from(2)])
//!     .build()
//!     .unwrap();
//! assert_eq!(ns.get("test_number"), Some(&Value::from(42)));
//! ```

use indexmap::IndexMap;
use scriptbox_core::lang::keywords;

use crate::value::Value;

/// Why a binding was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error, miette::Diagnostic)]
pub enum InvalidBindingError {
    #[error("'{name}' is a reserved word and cannot be bound")]
    #[diagnostic(
        code(scriptbox::namespace::reserved_name),
        help("pick a name that is not a keyword, e.g. '{name}_'")
    )]
    ReservedName { name: String },

    #[error("'{name}' is not a valid identifier")]
    #[diagnostic(
        code(scriptbox::namespace::invalid_name),
        help("names start with an ASCII letter or '_' and continue with ASCII letters, digits or '_'")
    )]
    InvalidName { name: String },

    #[error("'{name}' is bound more than once")]
    #[diagnostic(code(scriptbox::namespace::duplicate_name))]
    DuplicateName { name: String },

    #[error("'{name}{path}' holds an unrepresentable <{type_name}> value")]
    #[diagnostic(
        code(scriptbox::namespace::unrepresentable_value),
        help("placeholders are produced by read-back and cannot be injected")
    )]
    UnrepresentableValue {
        name: String,
        path: String,
        type_name: String,
    },

    #[error("expected a JSON object of globals, found {found}")]
    #[diagnostic(code(scriptbox::namespace::not_an_object))]
    NotAnObject { found: &'static str },
}

fn validate(name: &str, value: &Value) -> Result<(), InvalidBindingError> {
    if keywords::is_reserved(name) {
        return Err(InvalidBindingError::ReservedName { name: name.to_string() });
    }
    if !keywords::is_identifier(name) {
        return Err(InvalidBindingError::InvalidName { name: name.to_string() });
    }
    if let Some((path, type_name)) = value.find_unrepresentable() {
        return Err(InvalidBindingError::UnrepresentableValue {
            name: name.to_string(),
            path,
            type_name: type_name.to_string(),
        });
    }
    Ok(())
}

/// Accumulates bindings; validation happens in [`NamespaceBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct NamespaceBuilder {
    bindings: Vec<(String, Value)>,
}

impl NamespaceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding. Binding the same name twice makes [`build`](Self::build) fail.
    pub fn bind(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.bindings.push((name.into(), value.into()));
        self
    }

    /// Add a binding only if `name` has not been bound yet.
    pub fn bind_default(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        if self.bindings.iter().any(|(n, _)| *n == name) {
            self
        } else {
            self.bind(name, value)
        }
    }

    /// Validate every binding and produce the namespace.
    ///
    /// ## Errors
    /// The first invalid binding, in insertion order.
    #[tracing::instrument(skip_all, fields(binding_count = self.bindings.len()))]
    pub fn build(self) -> Result<Namespace, InvalidBindingError> {
        let mut entries = IndexMap::with_capacity(self.bindings.len());
        for (name, value) in self.bindings {
            validate(&name, &value)?;
            if entries.contains_key(&name) {
                return Err(InvalidBindingError::DuplicateName { name });
            }
            entries.insert(name, value);
        }
        tracing::debug!(bindings = entries.len(), "namespace built");
        Ok(Namespace { entries })
    }
}

/// An owned set of global bindings.
///
/// Equality ignores binding order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Namespace {
    entries: IndexMap<String, Value>,
}

impl Namespace {
    /// An empty namespace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for binding every pair on a [`NamespaceBuilder`].
    pub fn build<K, V, I>(pairs: I) -> Result<Self, InvalidBindingError>
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        pairs
            .into_iter()
            .fold(NamespaceBuilder::new(), |b, (k, v)| b.bind(k, v))
            .build()
    }

    /// Build from a JSON object of globals.
    ///
    /// ## Errors
    /// - [`InvalidBindingError::NotAnObject`] if `json` is not an object.
    /// - Any name validation error.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, InvalidBindingError> {
        let found = match json {
            serde_json::Value::Object(map) => return Namespace::build(map.iter().map(|(k, v)| (k.clone(), Value::from(v)))),
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "a boolean",
            serde_json::Value::Number(_) => "a number",
            serde_json::Value::String(_) => "a string",
            serde_json::Value::Array(_) => "an array",
        };
        Err(InvalidBindingError::NotAnObject { found })
    }

    /// Engine read-back: no validation, placeholders allowed.
    pub(crate) fn from_entries(entries: IndexMap<String, Value>) -> Self {
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Bindings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bind or rebind `name`, with the same validation as the builder.
    ///
    /// ## Returns
    /// The previous value, if any.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Result<Option<Value>, InvalidBindingError> {
        let name = name.into();
        let value = value.into();
        validate(&name, &value)?;
        Ok(self.entries.insert(name, value))
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.entries.shift_remove(name)
    }

    /// The namespace as a JSON object (placeholders become `null`).
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.entries
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Namespace {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl serde::Serialize for Namespace {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reserved_and_malformed_names() {
        assert_eq!(
            Namespace::build([("lambda", 1)]),
            Err(InvalidBindingError::ReservedName {
                name: "lambda".to_string()
            })
        );
        for bad in ["", "1abc", "a-b", "näme", "a b"] {
            assert!(
                matches!(Namespace::build([(bad, 1)]), Err(InvalidBindingError::InvalidName { .. })),
                "{bad:?}"
            );
        }
        assert!(Namespace::build([("_private", 1), ("__file__", 2), ("x9", 3)]).is_ok());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = NamespaceBuilder::new().bind("a", 1).bind("a", 2).build().unwrap_err();
        assert_eq!(err, InvalidBindingError::DuplicateName { name: "a".to_string() });
    }

    #[test]
    fn test_bind_default_keeps_first() {
        let ns = NamespaceBuilder::new()
            .bind("__file__", "main.py")
            .bind_default("__file__", "other.py")
            .bind_default("__name__", "__main__")
            .build()
            .unwrap();
        assert_eq!(ns.get("__file__").and_then(Value::as_str), Some("main.py"));
        assert_eq!(ns.get("__name__").and_then(Value::as_str), Some("__main__"));
    }

    #[test]
    fn test_nested_placeholder_rejected_with_path() {
        let value = Value::Sequence(vec![Value::mapping([(
            "f",
            Value::Unrepresentable {
                type_name: "function".to_string(),
            },
        )])]);
        let err = Namespace::build([("data", value)]).unwrap_err();
        assert_eq!(
            err,
            InvalidBindingError::UnrepresentableValue {
                name: "data".to_string(),
                path: "[0].f".to_string(),
                type_name: "function".to_string(),
            }
        );
        assert_eq!(err.to_string(), "'data[0].f' holds an unrepresentable <function> value");
    }

    #[test]
    fn test_from_json() {
        let ns = Namespace::from_json(&json!({"test_number": 42, "test_dict": {"a": 1}})).unwrap();
        assert_eq!(ns.len(), 2);
        assert_eq!(ns.get("test_number"), Some(&Value::from(42)));
        assert_eq!(
            Namespace::from_json(&json!([1, 2])),
            Err(InvalidBindingError::NotAnObject { found: "an array" })
        );
    }

    #[test]
    fn test_builds_are_independent() {
        let input = vec![("xs", Value::from(vec![Value::from(1)]))];
        let mut a = Namespace::build(input.clone()).unwrap();
        let b = Namespace::build(input).unwrap();
        assert_eq!(a, b);
        a.set("xs", vec![Value::from(2)]).unwrap();
        assert_ne!(a, b);
        assert_eq!(b.get("xs"), Some(&Value::from(vec![Value::from(1)])));
    }

    #[test]
    fn test_set_validates_and_remove() {
        let mut ns = Namespace::new();
        assert!(ns.set("if", 1).is_err());
        assert_eq!(ns.set("x", 1).unwrap(), None);
        assert_eq!(ns.set("x", 2).unwrap(), Some(Value::from(1)));
        assert_eq!(ns.names().collect::<Vec<_>>(), vec!["x"]);
        assert_eq!(ns.remove("x"), Some(Value::from(2)));
        assert!(ns.is_empty());
    }

    #[test]
    fn test_diagnostic_codes() {
        use miette::Diagnostic;
        let err = InvalidBindingError::InvalidName { name: "1x".to_string() };
        assert_eq!(err.code().map(|c| c.to_string()).as_deref(), Some("scriptbox::namespace::invalid_name"));
        assert!(err.help().is_some());
    }
}
