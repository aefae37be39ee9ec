//! Operators: arithmetic, comparison, membership, subscripts, iteration.
//!
//! Numeric policy (promotion, floor division, modulo sign, overflow) comes from `scriptbox_core`, so the rules live
//! in one place.

use std::cmp::Ordering;
use std::rc::Rc;

use scriptbox_core::errors::{
    ErrorKind, FLOAT_DIVISION_BY_ZERO_MSG, INT_DIVISION_BY_ZERO_MSG, INT_OVERFLOW_MSG, TRUE_DIVISION_BY_ZERO_MSG,
};
use scriptbox_core::indexing::{self, AccessError};
use scriptbox_core::{
    NumericOp, NumericTy, py_floor_div_f64_impl, py_floor_div_i64, py_mod_f64_impl, py_mod_i64_impl, py_pow_i64,
    result_numeric_type, strings,
};
use scriptbox_syntax::ast::{BinaryOp, CompareOp};

use super::dict::{Dict, DictKey};
use super::exceptions::{EvalResult, fail, type_error};
use super::object::{ListRef, Object, RangeObj, TypeTag};
use super::repr;

/// Largest sequence the runtime will materialize in one operation.
pub(crate) const MAX_MATERIALIZED_LEN: usize = 1 << 26;

#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn ty(self) -> NumericTy {
        match self {
            Num::Int(_) => NumericTy::Int,
            Num::Float(_) => NumericTy::Float,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Float(f) => f,
        }
    }
}

fn as_num(obj: &Object) -> Option<Num> {
    match obj {
        Object::Int(i) => Some(Num::Int(*i)),
        Object::Bool(b) => Some(Num::Int(i64::from(*b))),
        Object::Float(f) => Some(Num::Float(*f)),
        _ => None,
    }
}

/// Integer view of an object (`bool` counts), for indices and repetition counts.
pub(crate) fn as_index(obj: &Object) -> Option<i64> {
    match obj {
        Object::Int(i) => Some(*i),
        Object::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn overflow<T>() -> EvalResult<T> {
    fail(ErrorKind::OverflowError, INT_OVERFLOW_MSG)
}

fn numeric_op(op: BinaryOp) -> Option<NumericOp> {
    Some(match op {
        BinaryOp::Add => NumericOp::Add,
        BinaryOp::Sub => NumericOp::Sub,
        BinaryOp::Mul => NumericOp::Mul,
        BinaryOp::Div => NumericOp::Div,
        BinaryOp::FloorDiv => NumericOp::FloorDiv,
        BinaryOp::Mod => NumericOp::Mod,
        BinaryOp::Pow => NumericOp::Pow,
        BinaryOp::And | BinaryOp::Or => return None,
    })
}

fn arithmetic(op: NumericOp, a: Num, b: Num) -> EvalResult {
    if let (NumericOp::Div, Num::Int(_), Num::Int(0)) = (op, a, b) {
        return fail(ErrorKind::ZeroDivisionError, TRUE_DIVISION_BY_ZERO_MSG);
    }
    let int_exponent = match (op, b) {
        (NumericOp::Pow, Num::Int(e)) => Some(e),
        _ => None,
    };
    match result_numeric_type(op, a.ty(), b.ty(), int_exponent) {
        NumericTy::Int => {
            let (Num::Int(x), Num::Int(y)) = (a, b) else {
                return float_arithmetic(op, a.as_f64(), b.as_f64());
            };
            int_arithmetic(op, x, y)
        }
        NumericTy::Float => float_arithmetic(op, a.as_f64(), b.as_f64()),
    }
}

fn int_arithmetic(op: NumericOp, x: i64, y: i64) -> EvalResult {
    let result = match op {
        NumericOp::Add => x.checked_add(y),
        NumericOp::Sub => x.checked_sub(y),
        NumericOp::Mul => x.checked_mul(y),
        NumericOp::FloorDiv => {
            if y == 0 {
                return fail(ErrorKind::ZeroDivisionError, INT_DIVISION_BY_ZERO_MSG);
            }
            py_floor_div_i64(x, y)
        }
        NumericOp::Mod => {
            if y == 0 {
                return fail(ErrorKind::ZeroDivisionError, INT_DIVISION_BY_ZERO_MSG);
            }
            Some(py_mod_i64_impl(x, y))
        }
        NumericOp::Pow => py_pow_i64(x, y),
        NumericOp::Div => return float_arithmetic(op, x as f64, y as f64),
    };
    match result {
        Some(v) => Ok(Object::Int(v)),
        None => overflow(),
    }
}

fn float_arithmetic(op: NumericOp, x: f64, y: f64) -> EvalResult {
    let zero_division = || fail(ErrorKind::ZeroDivisionError, FLOAT_DIVISION_BY_ZERO_MSG);
    let v = match op {
        NumericOp::Add => x + y,
        NumericOp::Sub => x - y,
        NumericOp::Mul => x * y,
        NumericOp::Div => {
            if y == 0.0 {
                return zero_division();
            }
            x / y
        }
        NumericOp::FloorDiv => {
            if y == 0.0 {
                return zero_division();
            }
            py_floor_div_f64_impl(x, y)
        }
        NumericOp::Mod => {
            if y == 0.0 {
                return zero_division();
            }
            py_mod_f64_impl(x, y)
        }
        NumericOp::Pow => {
            if x == 0.0 && y < 0.0 {
                return fail(ErrorKind::ZeroDivisionError, "0.0 cannot be raised to a negative power");
            }
            if x < 0.0 && y.fract() != 0.0 {
                return fail(ErrorKind::ValueError, "negative number cannot be raised to a fractional power");
            }
            let v = x.powf(y);
            if v.is_infinite() && x.is_finite() && y.is_finite() {
                return fail(ErrorKind::OverflowError, "numerical result out of range");
            }
            v
        }
    };
    Ok(Object::Float(v))
}

fn repeat_count(n: i64, unit_len: usize) -> EvalResult<usize> {
    let n = usize::try_from(n.max(0)).unwrap_or(usize::MAX);
    match n.checked_mul(unit_len) {
        Some(total) if total <= MAX_MATERIALIZED_LEN => Ok(n),
        _ => fail(ErrorKind::OverflowError, "repeated sequence is too long"),
    }
}

fn repeat_items(items: &[Object], n: i64) -> EvalResult<Vec<Object>> {
    let n = repeat_count(n, items.len())?;
    let mut out = Vec::with_capacity(items.len() * n);
    for _ in 0..n {
        out.extend(items.iter().cloned());
    }
    Ok(out)
}

/// `left <op> right` for the arithmetic operators.
pub(crate) fn binary(op: BinaryOp, left: &Object, right: &Object) -> EvalResult {
    if let (Some(a), Some(b), Some(nop)) = (as_num(left), as_num(right), numeric_op(op)) {
        return arithmetic(nop, a, b);
    }
    match (op, left, right) {
        (BinaryOp::Add, Object::Str(a), Object::Str(b)) => {
            let mut s = String::with_capacity(a.len() + b.len());
            s.push_str(a);
            s.push_str(b);
            Ok(Object::string(s))
        }
        (BinaryOp::Add, Object::List(a), Object::List(b)) => {
            let mut items = a.borrow().clone();
            items.extend(b.borrow().iter().cloned());
            Ok(Object::list(items))
        }
        (BinaryOp::Add, Object::Tuple(a), Object::Tuple(b)) => {
            Ok(Object::tuple(a.iter().chain(b.iter()).cloned().collect()))
        }
        (BinaryOp::Add, Object::Str(_), other) => type_error(format!(
            "can only concatenate str (not \"{}\") to str",
            other.type_name()
        )),
        (BinaryOp::Add, Object::List(_), other) => type_error(format!(
            "can only concatenate list (not \"{}\") to list",
            other.type_name()
        )),
        (BinaryOp::Mul, Object::Str(s), n) | (BinaryOp::Mul, n, Object::Str(s)) if as_index(n).is_some() => {
            let count = repeat_count(as_index(n).unwrap_or(0), s.len())?;
            Ok(Object::string(s.repeat(count)))
        }
        (BinaryOp::Mul, Object::List(items), n) | (BinaryOp::Mul, n, Object::List(items))
            if as_index(n).is_some() =>
        {
            let items = items.borrow().clone();
            Ok(Object::list(repeat_items(&items, as_index(n).unwrap_or(0))?))
        }
        (BinaryOp::Mul, Object::Tuple(items), n) | (BinaryOp::Mul, n, Object::Tuple(items))
            if as_index(n).is_some() =>
        {
            Ok(Object::tuple(repeat_items(items, as_index(n).unwrap_or(0))?))
        }
        (BinaryOp::Mod, Object::Str(fmt), args) => {
            let rendered = match args {
                Object::Tuple(items) => repr::percent_format(fmt, items)?,
                single => repr::percent_format(fmt, std::slice::from_ref(single))?,
            };
            Ok(Object::string(rendered))
        }
        _ => type_error(format!(
            "unsupported operand type(s) for {op}: '{}' and '{}'",
            left.type_name(),
            right.type_name()
        )),
    }
}

/// `-x`, `+x`
pub(crate) fn negate(value: &Object, negative: bool) -> EvalResult {
    match (as_num(value), negative) {
        (Some(Num::Int(i)), true) => i.checked_neg().map(Object::Int).map_or_else(overflow, Ok),
        (Some(Num::Int(i)), false) => Ok(Object::Int(i)),
        (Some(Num::Float(f)), true) => Ok(Object::Float(-f)),
        (Some(Num::Float(f)), false) => Ok(Object::Float(f)),
        (None, _) => type_error(format!(
            "bad operand type for unary {}: '{}'",
            if negative { '-' } else { '+' },
            value.type_name()
        )),
    }
}

// ============================================================================
// Equality and ordering
// ============================================================================

/// Structural `==`, with `int`/`float`/`bool` comparing numerically.
pub(crate) fn equals(left: &Object, right: &Object) -> bool {
    if let (Some(a), Some(b)) = (as_num(left), as_num(right)) {
        return match (a, b) {
            (Num::Int(x), Num::Int(y)) => x == y,
            (Num::Float(x), Num::Float(y)) => x == y,
            (Num::Int(i), Num::Float(f)) | (Num::Float(f), Num::Int(i)) => crate::value::int_eq_float(i, f),
        };
    }
    match (left, right) {
        (Object::Str(a), Object::Str(b)) => a == b,
        (Object::List(a), Object::List(b)) => {
            if Rc::ptr_eq(a, b) {
                return true;
            }
            let (a, b) = (a.borrow().clone(), b.borrow().clone());
            seq_equals(&a, &b)
        }
        (Object::Tuple(a), Object::Tuple(b)) => seq_equals(a, b),
        (Object::Dict(a), Object::Dict(b)) => {
            if Rc::ptr_eq(a, b) {
                return true;
            }
            let (a, b) = (a.borrow().clone(), b.borrow().clone());
            dict_equals(&a, &b)
        }
        (Object::Range(a), Object::Range(b)) => {
            let (la, lb) = (a.len(), b.len());
            la == lb && (la == 0 || (a.start == b.start && (la == 1 || a.step == b.step)))
        }
        (Object::Builtin(_) | Object::Type(_), Object::Builtin(_) | Object::Type(_)) => {
            type_identity(left) == type_identity(right)
        }
        _ => left.is_same(right),
    }
}

fn type_identity(obj: &Object) -> Option<TypeTag> {
    match obj {
        Object::Builtin(id) => TypeTag::from_builtin(*id),
        Object::Type(tag) => Some(*tag),
        _ => None,
    }
}

fn seq_equals(a: &[Object], b: &[Object]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.is_same(y) || equals(x, y))
}

fn dict_equals(a: &Dict, b: &Dict) -> bool {
    a.len() == b.len() && a.iter().all(|(k, _, v)| b.get(k).is_some_and(|w| v.is_same(w) || equals(v, w)))
}

/// Ordering for `<`, `<=`, `>`, `>=`, `sorted`, `min` and `max`. `None` means unordered (NaN).
pub(crate) fn partial_order(op: &str, left: &Object, right: &Object) -> EvalResult<Option<Ordering>> {
    if let (Some(a), Some(b)) = (as_num(left), as_num(right)) {
        return Ok(match (a, b) {
            (Num::Int(x), Num::Int(y)) => Some(x.cmp(&y)),
            _ => a.as_f64().partial_cmp(&b.as_f64()),
        });
    }
    match (left, right) {
        (Object::Str(a), Object::Str(b)) => Ok(Some(a.cmp(b))),
        (Object::List(a), Object::List(b)) => {
            let (a, b) = (a.borrow().clone(), b.borrow().clone());
            seq_order(op, &a, &b)
        }
        (Object::Tuple(a), Object::Tuple(b)) => seq_order(op, a, b),
        _ => type_error(format!(
            "'{op}' not supported between instances of '{}' and '{}'",
            left.type_name(),
            right.type_name()
        )),
    }
}

fn seq_order(op: &str, a: &[Object], b: &[Object]) -> EvalResult<Option<Ordering>> {
    for (x, y) in a.iter().zip(b) {
        if !equals(x, y) {
            return partial_order(op, x, y);
        }
    }
    Ok(Some(a.len().cmp(&b.len())))
}

/// Evaluate one link of a comparison chain.
pub(crate) fn compare(op: CompareOp, left: &Object, right: &Object) -> EvalResult<bool> {
    let ordered = |accept: fn(Ordering) -> bool| -> EvalResult<bool> {
        Ok(partial_order(&op.to_string(), left, right)?.is_some_and(accept))
    };
    match op {
        CompareOp::Eq => Ok(equals(left, right)),
        CompareOp::NotEq => Ok(!equals(left, right)),
        CompareOp::Lt => ordered(Ordering::is_lt),
        CompareOp::LtEq => ordered(Ordering::is_le),
        CompareOp::Gt => ordered(Ordering::is_gt),
        CompareOp::GtEq => ordered(Ordering::is_ge),
        CompareOp::In => contains(right, left),
        CompareOp::NotIn => contains(right, left).map(|found| !found),
        CompareOp::Is => Ok(left.is_same(right)),
        CompareOp::IsNot => Ok(!left.is_same(right)),
    }
}

/// `item in container`
pub(crate) fn contains(container: &Object, item: &Object) -> EvalResult<bool> {
    match container {
        Object::Str(s) => match item {
            Object::Str(needle) => Ok(s.contains(&**needle)),
            other => type_error(format!(
                "'in <string>' requires string as left operand, not {}",
                other.type_name()
            )),
        },
        Object::List(items) => {
            let items = items.borrow().clone();
            Ok(items.iter().any(|x| x.is_same(item) || equals(x, item)))
        }
        Object::Tuple(items) => Ok(items.iter().any(|x| x.is_same(item) || equals(x, item))),
        Object::Dict(d) => {
            let key = hash_key(item)?;
            Ok(d.borrow().contains(&key))
        }
        Object::Range(r) => Ok(match as_num(item) {
            Some(Num::Int(i)) => r.contains(i),
            Some(Num::Float(f)) if f.fract() == 0.0 && f.is_finite() => r.contains(f as i64),
            _ => false,
        }),
        other => type_error(format!("argument of type '{}' is not iterable", other.type_name())),
    }
}

/// Dict key for `obj`, or `TypeError: unhashable type`.
pub(crate) fn hash_key(obj: &Object) -> EvalResult<DictKey> {
    match DictKey::from_object(obj) {
        Some(k) => Ok(k),
        None => type_error(format!("unhashable type: '{}'", obj.type_name())),
    }
}

// ============================================================================
// Subscripts
// ============================================================================

fn index_error<T>(what: &str, err: AccessError) -> EvalResult<T> {
    match err {
        AccessError::IndexOutOfRange => fail(ErrorKind::IndexError, format!("{what} {}", err.message())),
        AccessError::SliceStepZero => fail(ErrorKind::ValueError, err.message()),
    }
}

fn index_of(container: &Object, index: &Object) -> EvalResult<i64> {
    match as_index(index) {
        Some(i) => Ok(i),
        None => type_error(format!(
            "{} indices must be integers or slices, not {}",
            container.type_name(),
            index.type_name()
        )),
    }
}

/// `container[index]`
pub(crate) fn get_item(container: &Object, index: &Object) -> EvalResult {
    match container {
        Object::List(items) => {
            let items = items.borrow();
            let i = index_of(container, index)?;
            match indexing::normalize_index(items.len(), i) {
                Ok(pos) => Ok(items[pos].clone()),
                Err(e) => index_error("list", e),
            }
        }
        Object::Tuple(items) => {
            let i = index_of(container, index)?;
            match indexing::normalize_index(items.len(), i) {
                Ok(pos) => Ok(items[pos].clone()),
                Err(e) => index_error("tuple", e),
            }
        }
        Object::Str(s) => {
            let i = index_of(container, index)?;
            match strings::str_char_at(s, i) {
                Ok(c) => Ok(Object::string(c)),
                Err(e) => index_error("string", e),
            }
        }
        Object::Range(r) => {
            let i = index_of(container, index)?;
            match indexing::normalize_index(r.len(), i) {
                Ok(pos) => Ok(Object::Int(r.get(pos))),
                Err(e) => index_error("range object", e),
            }
        }
        Object::Dict(d) => {
            let key = hash_key(index)?;
            let found = d.borrow().get(&key).cloned();
            match found {
                Some(v) => Ok(v),
                None => Err(super::exceptions::Unwind::Raise(Rc::new(
                    super::exceptions::ExceptionObj::new(ErrorKind::KeyError, vec![index.clone()]),
                ))),
            }
        }
        other => type_error(format!("'{}' object is not subscriptable", other.type_name())),
    }
}

/// `container[start:end:step]`
pub(crate) fn get_slice(container: &Object, start: Option<i64>, end: Option<i64>, step: Option<i64>) -> EvalResult {
    let pick = |len: usize| indexing::slice_indices(len, start, end, step);
    match container {
        Object::List(items) => {
            let items = items.borrow();
            let picks = pick(items.len()).or_else(|e| index_error("list", e))?;
            Ok(Object::list(picks.into_iter().map(|i| items[i].clone()).collect()))
        }
        Object::Tuple(items) => {
            let picks = pick(items.len()).or_else(|e| index_error("tuple", e))?;
            Ok(Object::tuple(picks.into_iter().map(|i| items[i].clone()).collect()))
        }
        Object::Str(s) => match strings::str_slice(s, start, end, step) {
            Ok(sliced) => Ok(Object::string(sliced)),
            Err(e) => index_error("string", e),
        },
        Object::Range(r) => {
            let picks = pick(r.len()).or_else(|e| index_error("range", e))?;
            Ok(Object::list(picks.into_iter().map(|i| Object::Int(r.get(i))).collect()))
        }
        other => type_error(format!("'{}' object is not subscriptable", other.type_name())),
    }
}

/// `container[index] = value`
pub(crate) fn set_item(container: &Object, index: &Object, value: Object) -> EvalResult<()> {
    match container {
        Object::List(items) => {
            let i = index_of(container, index)?;
            let mut items = items.borrow_mut();
            match indexing::normalize_index(items.len(), i) {
                Ok(pos) => {
                    items[pos] = value;
                    Ok(())
                }
                Err(_) => fail(ErrorKind::IndexError, "list assignment index out of range"),
            }
        }
        Object::Dict(d) => {
            let key = hash_key(index)?;
            d.borrow_mut().insert(key, index.clone(), value);
            Ok(())
        }
        other => type_error(format!(
            "'{}' object does not support item assignment",
            other.type_name()
        )),
    }
}

/// `del container[index]`
pub(crate) fn del_item(container: &Object, index: &Object) -> EvalResult<()> {
    match container {
        Object::List(items) => {
            let i = index_of(container, index)?;
            let mut items = items.borrow_mut();
            match indexing::normalize_index(items.len(), i) {
                Ok(pos) => {
                    items.remove(pos);
                    Ok(())
                }
                Err(_) => fail(ErrorKind::IndexError, "list assignment index out of range"),
            }
        }
        Object::Dict(d) => {
            let key = hash_key(index)?;
            let removed = d.borrow_mut().remove(&key);
            match removed {
                Some(_) => Ok(()),
                None => Err(super::exceptions::Unwind::Raise(Rc::new(
                    super::exceptions::ExceptionObj::new(ErrorKind::KeyError, vec![index.clone()]),
                ))),
            }
        }
        other => type_error(format!(
            "'{}' object doesn't support item deletion",
            other.type_name()
        )),
    }
}

// ============================================================================
// Iteration
// ============================================================================

/// Materialize the items of an iterable.
pub(crate) fn iterate(obj: &Object) -> EvalResult<Vec<Object>> {
    match obj {
        Object::List(items) => Ok(items.borrow().clone()),
        Object::Tuple(items) => Ok(items.to_vec()),
        Object::Str(s) => Ok(s.chars().map(|c| Object::string(c.to_string())).collect()),
        Object::Dict(d) => Ok(d.borrow().keys()),
        Object::Range(r) => {
            if r.len() > MAX_MATERIALIZED_LEN {
                return fail(ErrorKind::OverflowError, "range is too large to materialize");
            }
            Ok((0..r.len()).map(|i| Object::Int(r.get(i))).collect())
        }
        other => type_error(format!("'{}' object is not iterable", other.type_name())),
    }
}

/// Iteration state of a `for` loop or comprehension.
///
/// Lists are walked live, so appending inside the loop extends it; ranges are never materialized; anything else
/// is iterated over a snapshot.
pub(crate) enum Cursor {
    Live(ListRef, usize),
    Range(RangeObj, usize),
    Snapshot(std::vec::IntoIter<Object>),
}

impl Cursor {
    pub(crate) fn over(obj: &Object) -> EvalResult<Self> {
        Ok(match obj {
            Object::List(list) => Cursor::Live(list.clone(), 0),
            Object::Range(range) => Cursor::Range(*range, 0),
            other => Cursor::Snapshot(iterate(other)?.into_iter()),
        })
    }
}

impl Iterator for Cursor {
    type Item = Object;

    fn next(&mut self) -> Option<Object> {
        match self {
            Cursor::Live(list, pos) => {
                let item = list.borrow().get(*pos).cloned()?;
                *pos += 1;
                Some(item)
            }
            Cursor::Range(range, pos) => {
                if *pos >= range.len() {
                    return None;
                }
                let item = Object::Int(range.get(*pos));
                *pos += 1;
                Some(item)
            }
            Cursor::Snapshot(items) => items.next(),
        }
    }
}
