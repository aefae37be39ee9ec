//! Insertion-ordered dict with Python key semantics.
//!
//! Keys are normalized into [`DictKey`] so that `1`, `1.0` and `True` address the same slot, while the
//! original key object is kept for iteration and `repr`.

use indexmap::IndexMap;
use std::rc::Rc;

use super::object::Object;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum DictKey {
    None,
    Int(i64),
    /// Non-integral floats, by bit pattern (NaN keys never compare equal in practice; they are rare enough).
    Float(u64),
    Str(Rc<str>),
    Tuple(Vec<DictKey>),
    /// Types, builtins and exception classes hash by identity of their tag.
    Named(&'static str),
}

impl DictKey {
    /// Normalize a hashable object; `None` means the object is unhashable.
    pub fn from_object(obj: &Object) -> Option<DictKey> {
        Some(match obj {
            Object::None => DictKey::None,
            Object::Bool(b) => DictKey::Int(i64::from(*b)),
            Object::Int(i) => DictKey::Int(*i),
            Object::Float(f) => {
                if f.fract() == 0.0 && f.is_finite() && *f >= i64::MIN as f64 && *f < i64::MAX as f64 {
                    DictKey::Int(*f as i64)
                } else {
                    DictKey::Float(f.to_bits())
                }
            }
            Object::Str(s) => DictKey::Str(s.clone()),
            Object::Tuple(items) => DictKey::Tuple(items.iter().map(DictKey::from_object).collect::<Option<_>>()?),
            Object::Builtin(_) | Object::Type(_) | Object::ExceptionType(_) => DictKey::Named(obj.type_name_for_key()),
            _ => return None,
        })
    }
}

impl Object {
    fn type_name_for_key(&self) -> &'static str {
        match self {
            Object::Builtin(id) => scriptbox_core::lang::builtins::as_str(*id),
            Object::Type(tag) => tag.name(),
            Object::ExceptionType(kind) => scriptbox_core::lang::errors::as_str(*kind),
            _ => "",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Dict {
    entries: IndexMap<DictKey, (Object, Object)>,
}

impl Dict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &DictKey) -> Option<&Object> {
        self.entries.get(key).map(|(_, v)| v)
    }

    pub fn get_str(&self, key: &str) -> Option<&Object> {
        self.get(&DictKey::Str(Rc::from(key)))
    }

    pub fn contains(&self, key: &DictKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or overwrite. An existing entry keeps its position and its original key object.
    pub fn insert(&mut self, key: DictKey, key_obj: Object, value: Object) {
        match self.entries.get_mut(&key) {
            Some(slot) => slot.1 = value,
            None => {
                self.entries.insert(key, (key_obj, value));
            }
        }
    }

    pub fn insert_str(&mut self, key: &str, value: Object) {
        let key_obj = Object::str(key);
        self.insert(DictKey::Str(Rc::from(key)), key_obj, value);
    }

    pub fn remove(&mut self, key: &DictKey) -> Option<Object> {
        self.entries.shift_remove(key).map(|(_, v)| v)
    }

    pub fn pop_last(&mut self) -> Option<(Object, Object)> {
        self.entries.pop().map(|(_, kv)| kv)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn keys(&self) -> Vec<Object> {
        self.entries.values().map(|(k, _)| k.clone()).collect()
    }

    pub fn values(&self) -> Vec<Object> {
        self.entries.values().map(|(_, v)| v.clone()).collect()
    }

    pub fn items(&self) -> Vec<(Object, Object)> {
        self.entries.values().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DictKey, &Object, &Object)> {
        self.entries.iter().map(|(dk, (k, v))| (dk, k, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_keys_share_a_slot() {
        let mut d = Dict::new();
        let one = Object::Int(1);
        d.insert(DictKey::from_object(&one).unwrap(), one, Object::str("int"));
        let one_f = Object::Float(1.0);
        d.insert(DictKey::from_object(&one_f).unwrap(), one_f, Object::str("float"));
        assert_eq!(d.len(), 1);
        assert!(matches!(d.keys()[0], Object::Int(1)));
        assert!(d.contains(&DictKey::from_object(&Object::Bool(true)).unwrap()));
    }

    #[test]
    fn lists_are_unhashable() {
        assert_eq!(DictKey::from_object(&Object::list(vec![])), None);
        assert_eq!(DictKey::from_object(&Object::tuple(vec![Object::list(vec![])])), None);
    }

    #[test]
    fn removal_preserves_order() {
        let mut d = Dict::new();
        for k in ["a", "b", "c"] {
            d.insert_str(k, Object::None);
        }
        d.remove(&DictKey::Str(Rc::from("b")));
        let keys: Vec<String> = d.keys().iter().map(|k| super::super::repr::to_str(k)).collect();
        assert_eq!(keys, vec!["a", "c"]);
    }
}
