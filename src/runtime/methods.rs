//! Attributes and methods of builtin types.

use std::rc::Rc;

use scriptbox_core::errors::ErrorKind;
use scriptbox_core::indexing;
use scriptbox_core::lang::{builtins as builtin_registry, errors as exc_registry};
use scriptbox_core::strings;

use super::Interpreter;
use super::builtins::update_dict;
use super::eval::Args;
use super::exceptions::{EvalResult, ExceptionObj, Unwind, fail, type_error, value_error};
use super::object::{DictRef, ListRef, Object};
use super::{ops, repr};

const DICT_METHODS: &[&str] = &[
    "get", "keys", "values", "items", "update", "pop", "popitem", "setdefault", "copy", "clear",
];
const LIST_METHODS: &[&str] = &[
    "append", "extend", "pop", "insert", "remove", "index", "count", "copy", "clear", "sort", "reverse",
];
const STR_METHODS: &[&str] = &[
    "upper", "lower", "strip", "lstrip", "rstrip", "split", "join", "startswith", "endswith", "replace", "find",
    "count", "isdigit", "isalpha", "format",
];
const TUPLE_METHODS: &[&str] = &["index", "count"];

fn methods_of(obj: &Object) -> &'static [&'static str] {
    match obj {
        Object::Dict(_) => DICT_METHODS,
        Object::List(_) => LIST_METHODS,
        Object::Str(_) => STR_METHODS,
        Object::Tuple(_) => TUPLE_METHODS,
        _ => &[],
    }
}

pub(super) fn has_method(obj: &Object, name: &str) -> bool {
    methods_of(obj).contains(&name)
}

/// `obj.name` without a call.
pub(super) fn get_attr(obj: &Object, name: &str) -> EvalResult {
    if has_method(obj, name) {
        return Ok(Object::BoundMethod(Rc::new((obj.clone(), Rc::from(name)))));
    }
    match (obj, name) {
        (Object::Exception(e), "args") => Ok(Object::tuple(e.args.clone())),
        (Object::Exception(e), "__cause__") => Ok(e.cause.borrow().clone().unwrap_or(Object::None)),
        (Object::Function(f), "__name__") => Ok(Object::Str(f.name.clone())),
        (Object::Builtin(id), "__name__") => Ok(Object::str(builtin_registry::as_str(*id))),
        (Object::ExceptionType(kind), "__name__") => Ok(Object::str(exc_registry::as_str(*kind))),
        (Object::Type(tag), "__name__") => Ok(Object::str(tag.name())),
        (Object::Range(r), "start") => Ok(Object::Int(r.start)),
        (Object::Range(r), "stop") => Ok(Object::Int(r.stop)),
        (Object::Range(r), "step") => Ok(Object::Int(r.step)),
        _ => fail(
            ErrorKind::AttributeError,
            format!("'{}' object has no attribute '{name}'", obj.type_name()),
        ),
    }
}

fn key_error(key: &Object) -> Unwind {
    Unwind::Raise(Rc::new(ExceptionObj::new(ErrorKind::KeyError, vec![key.clone()])))
}

fn as_text<'a>(obj: &'a Object, method: &str, position: &str) -> EvalResult<&'a str> {
    match obj {
        Object::Str(s) => Ok(s),
        other => type_error(format!(
            "{method}() {position} must be str, not {}",
            other.type_name()
        )),
    }
}

/// Optional `chars`/`sep` argument: absent or `None` means the default.
fn opt_text<'a>(args: &'a Args, index: usize, method: &str) -> EvalResult<Option<&'a str>> {
    match args.positional.get(index) {
        None | Some(Object::None) => Ok(None),
        Some(obj) => as_text(obj, method, "argument").map(Some),
    }
}

impl Interpreter<'_> {
    pub(super) fn call_method(&mut self, receiver: &Object, name: &str, args: Args) -> EvalResult {
        match receiver {
            Object::Dict(d) => self.dict_method(d, name, args),
            Object::List(l) => self.list_method(l, name, args),
            Object::Str(s) => str_method(s, name, args),
            Object::Tuple(items) => {
                args.no_keywords(name)?;
                sequence_method(items, receiver.type_name(), name, &args)
            }
            other => get_attr(other, name).and_then(|attr| self.call_object(&attr, args)),
        }
    }

    fn dict_method(&mut self, dict: &DictRef, name: &str, mut args: Args) -> EvalResult {
        if name != "update" {
            args.no_keywords(name)?;
        }
        match name {
            "get" => {
                args.arity(name, 1, 2)?;
                let key = ops::hash_key(&args.positional[0])?;
                let found = dict.borrow().get(&key).cloned();
                Ok(found.or_else(|| args.positional.get(1).cloned()).unwrap_or(Object::None))
            }
            "keys" | "values" | "items" => {
                args.arity(name, 0, 0)?;
                let d = dict.borrow();
                Ok(Object::list(match name {
                    "keys" => d.keys(),
                    "values" => d.values(),
                    _ => d.items().into_iter().map(|(k, v)| Object::tuple(vec![k, v])).collect(),
                }))
            }
            "update" => {
                args.arity(name, 0, 1)?;
                // Build the merge first: the source may be the dict itself.
                let mut merged = dict.borrow().clone();
                if let Some(source) = args.positional.first() {
                    update_dict(&mut merged, source)?;
                }
                for (key, value) in std::mem::take(&mut args.keywords) {
                    merged.insert_str(&key, value);
                }
                *dict.borrow_mut() = merged;
                Ok(Object::None)
            }
            "pop" => {
                args.arity(name, 1, 2)?;
                let key = ops::hash_key(&args.positional[0])?;
                let removed = dict.borrow_mut().remove(&key);
                match (removed, args.positional.get(1).cloned()) {
                    (Some(v), _) => Ok(v),
                    (None, Some(default)) => Ok(default),
                    (None, None) => Err(key_error(&args.positional[0])),
                }
            }
            "popitem" => {
                args.arity(name, 0, 0)?;
                let last = dict.borrow_mut().pop_last();
                match last {
                    Some((k, v)) => Ok(Object::tuple(vec![k, v])),
                    None => fail(ErrorKind::KeyError, "popitem(): dictionary is empty"),
                }
            }
            "setdefault" => {
                args.arity(name, 1, 2)?;
                let key_obj = args.positional[0].clone();
                let key = ops::hash_key(&key_obj)?;
                let existing = dict.borrow().get(&key).cloned();
                match existing {
                    Some(v) => Ok(v),
                    None => {
                        let default = args.positional.get(1).cloned().unwrap_or(Object::None);
                        dict.borrow_mut().insert(key, key_obj, default.clone());
                        Ok(default)
                    }
                }
            }
            "copy" => {
                args.arity(name, 0, 0)?;
                Ok(Object::dict(dict.borrow().clone()))
            }
            "clear" => {
                args.arity(name, 0, 0)?;
                dict.borrow_mut().clear();
                Ok(Object::None)
            }
            _ => get_attr(&Object::Dict(dict.clone()), name),
        }
    }

    fn list_method(&mut self, list: &ListRef, name: &str, mut args: Args) -> EvalResult {
        if name == "sort" {
            let key = args.take_keyword("key");
            let reverse = args.take_keyword("reverse").is_some_and(|r| r.truthy());
            args.no_unexpected_keywords(name)?;
            args.arity(name, 0, 0)?;
            let items = list.borrow().clone();
            let sorted = self.sort_objects(items, key, reverse)?;
            *list.borrow_mut() = sorted;
            return Ok(Object::None);
        }
        args.no_keywords(name)?;
        match name {
            "append" => {
                args.arity(name, 1, 1)?;
                let item = args.positional.remove(0);
                list.borrow_mut().push(item);
                Ok(Object::None)
            }
            "extend" => {
                args.arity(name, 1, 1)?;
                let items = ops::iterate(&args.positional[0])?;
                list.borrow_mut().extend(items);
                Ok(Object::None)
            }
            "pop" => {
                args.arity(name, 0, 1)?;
                let index = match args.positional.first() {
                    Some(i) => integer_arg(i)?,
                    None => -1,
                };
                let mut items = list.borrow_mut();
                if items.is_empty() {
                    return fail(ErrorKind::IndexError, "pop from empty list");
                }
                match indexing::normalize_index(items.len(), index) {
                    Ok(pos) => Ok(items.remove(pos)),
                    Err(_) => fail(ErrorKind::IndexError, "pop index out of range"),
                }
            }
            "insert" => {
                args.arity(name, 2, 2)?;
                let index = integer_arg(&args.positional[0])?;
                let item = args.positional.remove(1);
                let mut items = list.borrow_mut();
                let len = i64::try_from(items.len()).unwrap_or(i64::MAX);
                let pos = if index < 0 { (index + len).max(0) } else { index.min(len) };
                items.insert(usize::try_from(pos).unwrap_or(0), item);
                Ok(Object::None)
            }
            "remove" => {
                args.arity(name, 1, 1)?;
                let snapshot = list.borrow().clone();
                let needle = &args.positional[0];
                match snapshot.iter().position(|x| x.is_same(needle) || ops::equals(x, needle)) {
                    Some(pos) => {
                        list.borrow_mut().remove(pos);
                        Ok(Object::None)
                    }
                    None => value_error("list.remove(x): x not in list"),
                }
            }
            "copy" => {
                args.arity(name, 0, 0)?;
                Ok(Object::list(list.borrow().clone()))
            }
            "clear" => {
                args.arity(name, 0, 0)?;
                list.borrow_mut().clear();
                Ok(Object::None)
            }
            "reverse" => {
                args.arity(name, 0, 0)?;
                list.borrow_mut().reverse();
                Ok(Object::None)
            }
            "index" | "count" => {
                let snapshot = list.borrow().clone();
                sequence_method(&snapshot, "list", name, &args)
            }
            _ => get_attr(&Object::List(list.clone()), name),
        }
    }
}

fn integer_arg(obj: &Object) -> EvalResult<i64> {
    match ops::as_index(obj) {
        Some(i) => Ok(i),
        None => type_error(format!(
            "'{}' object cannot be interpreted as an integer",
            obj.type_name()
        )),
    }
}

/// `index` and `count`, shared by lists and tuples.
fn sequence_method(items: &[Object], type_name: &str, name: &str, args: &Args) -> EvalResult {
    let matches = |x: &Object, needle: &Object| x.is_same(needle) || ops::equals(x, needle);
    match name {
        "count" => {
            args.arity(name, 1, 1)?;
            let n = items.iter().filter(|x| matches(x, &args.positional[0])).count();
            Ok(Object::Int(i64::try_from(n).unwrap_or(i64::MAX)))
        }
        "index" => {
            args.arity(name, 1, 3)?;
            let needle = &args.positional[0];
            let len = i64::try_from(items.len()).unwrap_or(i64::MAX);
            let bound = |i: usize, default: i64| -> EvalResult<usize> {
                let raw = match args.positional.get(i) {
                    Some(obj) => integer_arg(obj)?,
                    None => default,
                };
                let clamped = if raw < 0 { (raw + len).max(0) } else { raw.min(len) };
                Ok(usize::try_from(clamped).unwrap_or(0))
            };
            let (start, end) = (bound(1, 0)?, bound(2, len)?);
            let found = (start..end.max(start)).find(|&i| matches(&items[i], needle));
            match found {
                Some(i) => Ok(Object::Int(i64::try_from(i).unwrap_or(i64::MAX))),
                None if type_name == "tuple" => value_error("tuple.index(x): x not in tuple"),
                None => value_error(format!("{} is not in list", repr::repr(needle))),
            }
        }
        _ => fail(
            ErrorKind::AttributeError,
            format!("'{type_name}' object has no attribute '{name}'"),
        ),
    }
}

fn text(value: String) -> EvalResult {
    Ok(Object::string(value))
}

fn str_method(s: &Rc<str>, name: &str, mut args: Args) -> EvalResult {
    if name != "format" {
        args.no_keywords(name)?;
    }
    match name {
        "upper" => {
            args.arity(name, 0, 0)?;
            text(s.to_uppercase())
        }
        "lower" => {
            args.arity(name, 0, 0)?;
            text(s.to_lowercase())
        }
        "strip" | "lstrip" | "rstrip" => {
            args.arity(name, 0, 1)?;
            let chars = opt_text(&args, 0, name)?;
            text(match name {
                "strip" => strings::str_strip(s, chars),
                "lstrip" => strings::str_lstrip(s, chars),
                _ => strings::str_rstrip(s, chars),
            })
        }
        "split" => {
            let maxsplit_kw = args.take_keyword("maxsplit");
            let sep_kw = args.take_keyword("sep");
            args.no_unexpected_keywords(name)?;
            args.arity(name, 0, 2)?;
            if let Some(sep) = sep_kw {
                args.positional.insert(0, sep);
            }
            let sep = opt_text(&args, 0, name)?;
            let maxsplit = match maxsplit_kw.or_else(|| args.positional.get(1).cloned()) {
                Some(m) => Some(integer_arg(&m)?),
                None => None,
            };
            match strings::str_split(s, sep, maxsplit) {
                Some(parts) => Ok(Object::list(parts.into_iter().map(Object::string).collect())),
                None => value_error("empty separator"),
            }
        }
        "join" => {
            args.arity(name, 1, 1)?;
            let items = ops::iterate(&args.positional[0])?;
            let mut parts = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                match item {
                    Object::Str(part) => parts.push(part.to_string()),
                    other => {
                        return type_error(format!(
                            "sequence item {i}: expected str instance, {} found",
                            other.type_name()
                        ));
                    }
                }
            }
            text(parts.join(&**s))
        }
        "startswith" | "endswith" => {
            args.arity(name, 1, 1)?;
            let candidates: Vec<Object> = match &args.positional[0] {
                Object::Tuple(items) => items.to_vec(),
                other => vec![other.clone()],
            };
            for candidate in &candidates {
                let affix = match candidate {
                    Object::Str(a) => a,
                    other => {
                        return type_error(format!(
                            "{name} first arg must be str or a tuple of str, not {}",
                            other.type_name()
                        ));
                    }
                };
                let hit = if name == "startswith" {
                    s.starts_with(&**affix)
                } else {
                    s.ends_with(&**affix)
                };
                if hit {
                    return Ok(Object::Bool(true));
                }
            }
            Ok(Object::Bool(false))
        }
        "replace" => {
            args.arity(name, 2, 3)?;
            let old = as_text(&args.positional[0], name, "argument 1")?;
            let new = as_text(&args.positional[1], name, "argument 2")?;
            let count = match args.positional.get(2) {
                Some(c) => integer_arg(c)?,
                None => -1,
            };
            match usize::try_from(count) {
                Ok(n) => text(s.replacen(old, new, n)),
                Err(_) => text(s.replace(old, new)),
            }
        }
        "find" | "count" => {
            args.arity(name, 1, 1)?;
            let needle = as_text(&args.positional[0], name, "argument")?;
            Ok(Object::Int(if name == "find" {
                strings::str_find(s, needle)
            } else {
                i64::try_from(strings::str_count(s, needle)).unwrap_or(i64::MAX)
            }))
        }
        "isdigit" => {
            args.arity(name, 0, 0)?;
            Ok(Object::Bool(strings::str_isdigit(s)))
        }
        "isalpha" => {
            args.arity(name, 0, 0)?;
            Ok(Object::Bool(strings::str_isalpha(s)))
        }
        "format" => text(str_format(s, &args)?),
        _ => get_attr(&Object::Str(s.clone()), name),
    }
}

/// `str.format`: `{}` / `{0}` / `{name}` fields with optional `!r`/`!s`/`!a` and `:spec`.
fn str_format(template: &str, args: &Args) -> EvalResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    let mut auto_index = 0usize;
    let mut numbering: Option<bool> = None; // Some(true) = automatic, Some(false) = manual
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => return value_error("Single '}' encountered in format string"),
            '{' => {
                let mut field = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => field.push(ch),
                        None => return value_error("expected '}' before end of string"),
                    }
                }
                let (head, spec) = match field.split_once(':') {
                    Some((h, s)) => (h, s),
                    None => (field.as_str(), ""),
                };
                let (field_name, conversion) = match head.split_once('!') {
                    Some((f, conv)) => (f, Some(conv)),
                    None => (head, None),
                };
                let value = if field_name.is_empty() {
                    if numbering == Some(false) {
                        return value_error("cannot switch from manual field specification to automatic field numbering");
                    }
                    numbering = Some(true);
                    let value = positional_field(args, auto_index)?;
                    auto_index += 1;
                    value
                } else if let Ok(index) = field_name.parse::<usize>() {
                    if numbering == Some(true) {
                        return value_error("cannot switch from automatic field numbering to manual field specification");
                    }
                    numbering = Some(false);
                    positional_field(args, index)?
                } else {
                    match args.keywords.iter().find(|(k, _)| k == field_name) {
                        Some((_, v)) => v.clone(),
                        None => return Err(key_error(&Object::str(field_name))),
                    }
                };
                let value = match conversion {
                    None => value,
                    Some("r") => Object::string(repr::repr(&value)),
                    Some("s") => Object::string(repr::to_str(&value)),
                    Some("a") => Object::string(repr::ascii(&value)),
                    Some(_) => return value_error("Unknown conversion specifier"),
                };
                out.push_str(&repr::format_value(&value, spec)?);
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

fn positional_field(args: &Args, index: usize) -> EvalResult {
    match args.positional.get(index) {
        Some(v) => Ok(v.clone()),
        None => fail(
            ErrorKind::IndexError,
            format!("Replacement index {index} out of range for positional args tuple"),
        ),
    }
}
