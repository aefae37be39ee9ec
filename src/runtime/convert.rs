//! Conversion between [`Value`] trees and runtime objects.
//!
//! Values enter the runtime by deep copy, so executed code never aliases caller data. Reading back walks the
//! global dict and applies the configured [`UnrepresentablePolicy`] at every depth.

use std::collections::BTreeMap;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::config::UnrepresentablePolicy;
use crate::namespace::Namespace;
use crate::value::{Number, Value};

use super::dict::Dict;
use super::object::{DictRef, Object};

/// Containers nested deeper than this read back as placeholders.
const MAX_READ_BACK_DEPTH: usize = 512;

/// Seed a global dict from the initial namespace.
pub(crate) fn globals_from(initial: &Namespace) -> Dict {
    let mut globals = Dict::new();
    for (name, value) in initial {
        globals.insert_str(name, to_object(value));
    }
    globals
}

pub(crate) fn to_object(value: &Value) -> Object {
    match value {
        Value::Bool(b) => Object::Bool(*b),
        Value::Null => Object::None,
        Value::Number(Number::Int(i)) => Object::Int(*i),
        Value::Number(Number::Float(f)) => Object::Float(*f),
        Value::String(s) => Object::str(s),
        Value::Sequence(items) => Object::list(items.iter().map(to_object).collect()),
        Value::Mapping(entries) => {
            let mut dict = Dict::new();
            for (k, v) in entries {
                dict.insert_str(k, to_object(v));
            }
            Object::dict(dict)
        }
        // Rejected by namespace validation; map to `None` if one slips through.
        Value::Unrepresentable { .. } => Object::None,
    }
}

/// Read every string-named global back into a [`Value`].
pub(crate) fn read_back(globals: &DictRef, policy: UnrepresentablePolicy) -> IndexMap<String, Value> {
    let entries = globals.borrow().items();
    // The global dict counts as active, so `g = globals()` reads back as a placeholder.
    let mut reader = Reader {
        policy,
        active: vec![Rc::as_ptr(globals) as *const () as usize],
    };
    entries
        .iter()
        .filter_map(|(k, v)| match k {
            Object::Str(name) => reader.value(v).map(|v| (name.to_string(), v)),
            _ => None,
        })
        .collect()
}

struct Reader {
    policy: UnrepresentablePolicy,
    /// Containers on the current path, for cycle detection.
    active: Vec<usize>,
}

impl Reader {
    fn placeholder(&self, type_name: &str) -> Option<Value> {
        match self.policy {
            UnrepresentablePolicy::Placeholder => Some(Value::Unrepresentable {
                type_name: type_name.to_string(),
            }),
            UnrepresentablePolicy::Omit => None,
        }
    }

    /// `None` means the value is omitted.
    fn value(&mut self, obj: &Object) -> Option<Value> {
        match obj {
            Object::None => Some(Value::Null),
            Object::Bool(b) => Some(Value::Bool(*b)),
            Object::Int(i) => Some(Value::Number(Number::Int(*i))),
            Object::Float(f) => Some(Value::Number(Number::Float(*f))),
            Object::Str(s) => Some(Value::String(s.to_string())),
            Object::Tuple(items) => self.sequence(obj, items),
            Object::List(list) => {
                let items = list.borrow().clone();
                self.nested(obj, Rc::as_ptr(list) as *const () as usize, |r| r.sequence_items(&items))
            }
            Object::Dict(d) => {
                let items = d.borrow().items();
                if !items.iter().all(|(k, _)| matches!(k, Object::Str(_))) {
                    return self.placeholder(obj.type_name());
                }
                self.nested(obj, Rc::as_ptr(d) as *const () as usize, |r| r.mapping(&items))
            }
            other => self.placeholder(other.type_name()),
        }
    }

    fn sequence(&mut self, obj: &Object, items: &[Object]) -> Option<Value> {
        if self.active.len() >= MAX_READ_BACK_DEPTH {
            return self.placeholder(obj.type_name());
        }
        self.sequence_items(items)
    }

    /// Run `read` with `addr` marked active; a container already on the path is a cycle.
    fn nested(&mut self, obj: &Object, addr: usize, read: impl FnOnce(&mut Self) -> Option<Value>) -> Option<Value> {
        if self.active.contains(&addr) || self.active.len() >= MAX_READ_BACK_DEPTH {
            return self.placeholder(obj.type_name());
        }
        self.active.push(addr);
        let value = read(self);
        self.active.pop();
        value
    }

    fn sequence_items(&mut self, items: &[Object]) -> Option<Value> {
        Some(Value::Sequence(items.iter().filter_map(|item| self.value(item)).collect()))
    }

    fn mapping(&mut self, items: &[(Object, Object)]) -> Option<Value> {
        let mut out = BTreeMap::new();
        for (k, v) in items {
            if let (Object::Str(key), Some(value)) = (k, self.value(v)) {
                out.insert(key.to_string(), value);
            }
        }
        Some(Value::Mapping(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn globals_with(name: &str, obj: Object) -> DictRef {
        let mut d = Dict::new();
        d.insert_str(name, obj);
        Rc::new(RefCell::new(d))
    }

    #[test]
    fn values_round_trip_through_objects() {
        let value = Value::mapping([
            ("list", Value::from(vec![Value::from(1), Value::from(2.5), Value::Null])),
            ("text", Value::from("hi")),
        ]);
        let globals = globals_with("v", to_object(&value));
        let back = read_back(&globals, UnrepresentablePolicy::Placeholder);
        assert_eq!(back.get("v"), Some(&value));
    }

    #[test]
    fn tuples_read_back_as_sequences() {
        let globals = globals_with("t", Object::tuple(vec![Object::Int(1), Object::str("a")]));
        let back = read_back(&globals, UnrepresentablePolicy::Placeholder);
        assert_eq!(back.get("t"), Some(&Value::from(vec![Value::from(1), Value::from("a")])));
    }

    #[test]
    fn policy_applies_at_every_depth() {
        let mut non_str_keys = Dict::new();
        non_str_keys.insert(super::super::dict::DictKey::Int(1), Object::Int(1), Object::Int(2));
        let obj = Object::list(vec![Object::Int(1), Object::dict(non_str_keys), Object::Range(super::super::object::RangeObj {
            start: 0,
            stop: 3,
            step: 1,
        })]);

        let placeholder = read_back(&globals_with("x", obj.clone()), UnrepresentablePolicy::Placeholder);
        let expected = Value::from(vec![
            Value::from(1),
            Value::Unrepresentable {
                type_name: "dict".into(),
            },
            Value::Unrepresentable {
                type_name: "range".into(),
            },
        ]);
        assert_eq!(placeholder.get("x"), Some(&expected));

        let omitted = read_back(&globals_with("x", obj), UnrepresentablePolicy::Omit);
        assert_eq!(omitted.get("x"), Some(&Value::from(vec![Value::from(1)])));
    }

    #[test]
    fn globals_alias_is_a_placeholder() {
        let globals = globals_with("x", Object::Int(1));
        globals.borrow_mut().insert_str("g", Object::Dict(globals.clone()));
        let back = read_back(&globals, UnrepresentablePolicy::Placeholder);
        assert_eq!(
            back.get("g"),
            Some(&Value::Unrepresentable {
                type_name: "dict".into()
            })
        );
        globals.borrow_mut().clear();
    }

    #[test]
    fn cycles_become_placeholders() {
        let list = Object::list(vec![Object::Int(1)]);
        if let Object::List(items) = &list {
            items.borrow_mut().push(list.clone());
        }
        let back = read_back(&globals_with("l", list.clone()), UnrepresentablePolicy::Placeholder);
        let expected = Value::from(vec![
            Value::from(1),
            Value::Unrepresentable {
                type_name: "list".into(),
            },
        ]);
        assert_eq!(back.get("l"), Some(&expected));
        // Break the cycle so the test does not leak.
        if let Object::List(items) = &list {
            items.borrow_mut().clear();
        }
    }
}
