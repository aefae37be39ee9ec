//! `str()`, `repr()` and the format-spec mini-language.
//!
//! Rendering matches what a Python interpreter prints for the same values, including `[...]` for self-referencing
//! containers.

use std::rc::Rc;

use scriptbox_core::errors::ErrorKind;
use scriptbox_core::lang::{builtins as builtin_registry, errors as exc_registry};

use super::exceptions::{EvalResult, fail, type_error, value_error};
use super::object::{Object, TypeTag};

/// `repr(obj)`
pub(crate) fn repr(obj: &Object) -> String {
    let mut out = String::new();
    write_repr(obj, &mut out, &mut Vec::new());
    out
}

/// `str(obj)`
pub(crate) fn to_str(obj: &Object) -> String {
    match obj {
        Object::Str(s) => s.to_string(),
        Object::Exception(e) => e.message(),
        other => repr(other),
    }
}

/// Identity of a container for cycle detection.
fn addr(obj: &Object) -> Option<usize> {
    match obj {
        Object::List(l) => Some(Rc::as_ptr(l) as *const () as usize),
        Object::Dict(d) => Some(Rc::as_ptr(d) as *const () as usize),
        _ => None,
    }
}

/// Containers nested deeper than this render as `...`.
const MAX_REPR_DEPTH: usize = 512;

fn write_repr(obj: &Object, out: &mut String, active: &mut Vec<usize>) {
    if let Some(a) = addr(obj) {
        if active.len() >= MAX_REPR_DEPTH {
            out.push_str("...");
            return;
        }
        if active.contains(&a) {
            out.push_str(if matches!(obj, Object::Dict(_)) { "{...}" } else { "[...]" });
            return;
        }
        active.push(a);
        write_container(obj, out, active);
        active.pop();
        return;
    }
    match obj {
        Object::None => out.push_str("None"),
        Object::Bool(true) => out.push_str("True"),
        Object::Bool(false) => out.push_str("False"),
        Object::Int(i) => out.push_str(&i.to_string()),
        Object::Float(f) => out.push_str(&scriptbox_core::format_float(*f)),
        Object::Str(s) => out.push_str(&quote_str(s)),
        Object::Tuple(items) => {
            out.push('(');
            write_items(items, out, active);
            if items.len() == 1 {
                out.push(',');
            }
            out.push(')');
        }
        Object::Range(r) => {
            if r.step == 1 {
                out.push_str(&format!("range({}, {})", r.start, r.stop));
            } else {
                out.push_str(&format!("range({}, {}, {})", r.start, r.stop, r.step));
            }
        }
        Object::Function(f) => out.push_str(&format!("<function {} at {:#x}>", f.name, Rc::as_ptr(f) as usize)),
        Object::Builtin(id) => match TypeTag::from_builtin(*id) {
            Some(tag) => out.push_str(&format!("<class '{}'>", tag.name())),
            None => out.push_str(&format!("<built-in function {}>", builtin_registry::as_str(*id))),
        },
        Object::BoundMethod(m) => {
            out.push_str(&format!("<built-in method {} of {} object>", m.1, m.0.type_name()));
        }
        Object::Type(tag) => out.push_str(&format!("<class '{}'>", tag.name())),
        Object::ExceptionType(kind) => out.push_str(&format!("<class '{}'>", exc_registry::as_str(*kind))),
        Object::Exception(e) => {
            out.push_str(exc_registry::as_str(e.kind));
            out.push('(');
            write_items(&e.args, out, active);
            out.push(')');
        }
        Object::List(_) | Object::Dict(_) => write_container(obj, out, active),
    }
}

fn write_container(obj: &Object, out: &mut String, active: &mut Vec<usize>) {
    match obj {
        Object::List(items) => {
            let items = items.borrow().clone();
            out.push('[');
            write_items(&items, out, active);
            out.push(']');
        }
        Object::Dict(d) => {
            let items = d.borrow().items();
            out.push('{');
            for (i, (k, v)) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_repr(k, out, active);
                out.push_str(": ");
                write_repr(v, out, active);
            }
            out.push('}');
        }
        _ => {}
    }
}

fn write_items(items: &[Object], out: &mut String, active: &mut Vec<usize>) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_repr(item, out, active);
    }
}

/// Quote a string the way `repr` does: single quotes unless the text contains `'` but no `"`.
pub(crate) fn quote_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// `ascii(obj)`: `repr` with non-ASCII characters escaped.
pub(crate) fn ascii(obj: &Object) -> String {
    let mut out = String::new();
    for c in repr(obj).chars() {
        match c as u32 {
            0..=0x7f => out.push(c),
            n @ 0x80..=0xff => out.push_str(&format!("\\x{n:02x}")),
            n @ 0x100..=0xffff => out.push_str(&format!("\\u{n:04x}")),
            n => out.push_str(&format!("\\U{n:08x}")),
        }
    }
    out
}

// ============================================================================
// Format-spec mini-language
// ============================================================================

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Spec {
    fill: Option<char>,
    align: Option<char>,
    sign: Option<char>,
    alternate: bool,
    zero: bool,
    width: usize,
    grouping: Option<char>,
    precision: Option<usize>,
    ty: Option<char>,
}

/// Largest width or precision a format spec may ask for.
const MAX_SPEC_FIELD: usize = u16::MAX as usize;

fn invalid_spec<T>(spec: &str) -> EvalResult<T> {
    value_error(format!("Invalid format specifier '{spec}'"))
}

fn parse_spec(spec: &str) -> EvalResult<Spec> {
    let chars: Vec<char> = spec.chars().collect();
    let mut out = Spec::default();
    let mut i = 0;
    let is_align = |c: char| matches!(c, '<' | '>' | '^' | '=');

    if chars.len() >= 2 && is_align(chars[1]) {
        out.fill = Some(chars[0]);
        out.align = Some(chars[1]);
        i = 2;
    } else if chars.first().copied().is_some_and(is_align) {
        out.align = Some(chars[0]);
        i = 1;
    }
    if let Some(&c @ ('+' | '-' | ' ')) = chars.get(i) {
        out.sign = Some(c);
        i += 1;
    }
    if chars.get(i) == Some(&'#') {
        out.alternate = true;
        i += 1;
    }
    if chars.get(i) == Some(&'0') {
        out.zero = true;
        i += 1;
    }
    let digits_start = i;
    while chars.get(i).is_some_and(char::is_ascii_digit) {
        i += 1;
    }
    if i > digits_start {
        let text: String = chars[digits_start..i].iter().collect();
        out.width = match text.parse() {
            Ok(width) if width <= MAX_SPEC_FIELD => width,
            _ => return value_error("width too big"),
        };
    }
    if let Some(&c @ (',' | '_')) = chars.get(i) {
        out.grouping = Some(c);
        i += 1;
    }
    if chars.get(i) == Some(&'.') {
        i += 1;
        let start = i;
        while chars.get(i).is_some_and(char::is_ascii_digit) {
            i += 1;
        }
        if i == start {
            return fail(ErrorKind::ValueError, "Format specifier missing precision");
        }
        let text: String = chars[start..i].iter().collect();
        out.precision = match text.parse() {
            Ok(precision) if precision <= MAX_SPEC_FIELD => Some(precision),
            _ => return value_error("precision too big"),
        };
    }
    if i < chars.len() {
        out.ty = Some(chars[i]);
        i += 1;
    }
    if i != chars.len() {
        return invalid_spec(spec);
    }
    Ok(out)
}

/// `format(obj, spec)`
pub(crate) fn format_value(obj: &Object, spec: &str) -> EvalResult<String> {
    if spec.is_empty() {
        return Ok(to_str(obj));
    }
    let parsed = parse_spec(spec)?;
    match obj {
        Object::Str(s) => format_str(s, &parsed, spec),
        Object::Bool(b) => format_int(i64::from(*b), &parsed),
        Object::Int(i) => format_int(*i, &parsed),
        Object::Float(f) => format_float(*f, &parsed),
        other => type_error(format!(
            "unsupported format string passed to {}.__format__",
            other.type_name()
        )),
    }
}

fn format_str(s: &str, spec: &Spec, raw: &str) -> EvalResult<String> {
    if !matches!(spec.ty, None | Some('s')) {
        return value_error(format!(
            "Unknown format code '{}' for object of type 'str'",
            spec.ty.unwrap_or('s')
        ));
    }
    if spec.sign.is_some() {
        return value_error("Sign not allowed in string format specifier");
    }
    if spec.grouping.is_some() || spec.align == Some('=') {
        return invalid_spec(raw);
    }
    let text: String = match spec.precision {
        Some(p) => s.chars().take(p).collect(),
        None => s.to_string(),
    };
    Ok(pad(&text, spec, '<'))
}

fn format_int(i: i64, spec: &Spec) -> EvalResult<String> {
    let digits = match spec.ty {
        None | Some('d') | Some('n') => group(&i.unsigned_abs().to_string(), spec.grouping, 3),
        Some('x') => radix(i, 16, spec, "0x", false),
        Some('X') => radix(i, 16, spec, "0X", true),
        Some('o') => radix(i, 8, spec, "0o", false),
        Some('b') => radix(i, 2, spec, "0b", false),
        Some('c') => match u32::try_from(i).ok().and_then(char::from_u32) {
            Some(c) => return Ok(pad(&c.to_string(), spec, '<')),
            None => return fail(ErrorKind::OverflowError, "%c arg not in range(0x110000)"),
        },
        Some('e' | 'E' | 'f' | 'F' | 'g' | 'G' | '%') => return format_float(i as f64, spec),
        Some(other) => {
            return value_error(format!("Unknown format code '{other}' for object of type 'int'"));
        }
    };
    if spec.precision.is_some() {
        return value_error("Precision not allowed in integer format specifier");
    }
    Ok(pad_number(i < 0, &digits, spec))
}

fn radix(i: i64, base: u32, spec: &Spec, prefix: &str, upper: bool) -> String {
    let magnitude = i.unsigned_abs();
    let mut digits = match base {
        16 => format!("{magnitude:x}"),
        8 => format!("{magnitude:o}"),
        _ => format!("{magnitude:b}"),
    };
    if upper {
        digits = digits.to_uppercase();
    }
    let digits = group(&digits, spec.grouping.filter(|g| *g == '_'), 4);
    if spec.alternate {
        format!("{prefix}{digits}")
    } else {
        digits
    }
}

fn format_float(f: f64, spec: &Spec) -> EvalResult<String> {
    let negative = f.is_sign_negative() && !f.is_nan();
    let magnitude = f.abs();
    let body = if !magnitude.is_finite() {
        let text = if magnitude.is_nan() { "nan" } else { "inf" };
        if matches!(spec.ty, Some('E' | 'F' | 'G')) {
            text.to_uppercase()
        } else {
            text.to_string()
        }
    } else {
        match spec.ty {
            Some('f' | 'F') => fixed(magnitude, spec.precision.unwrap_or(6), spec),
            Some('e' | 'E') => {
                let s = scientific(magnitude, spec.precision.unwrap_or(6));
                if spec.ty == Some('E') { s.to_uppercase() } else { s }
            }
            Some('g' | 'G') => {
                let s = general(magnitude, spec.precision.unwrap_or(6), spec.alternate, spec);
                if spec.ty == Some('G') { s.to_uppercase() } else { s }
            }
            Some('%') => format!("{}%", fixed(magnitude * 100.0, spec.precision.unwrap_or(6), spec)),
            None => match spec.precision {
                Some(p) => general(magnitude, p, spec.alternate, spec),
                None => {
                    let repr = scriptbox_core::format_float(magnitude);
                    match repr.split_once('.') {
                        Some((int, frac)) if spec.grouping.is_some() => {
                            format!("{}.{frac}", group(int, spec.grouping, 3))
                        }
                        _ => repr,
                    }
                }
            },
            Some(other) => {
                return value_error(format!("Unknown format code '{other}' for object of type 'float'"));
            }
        }
    };
    Ok(pad_number(negative, &body, spec))
}

fn fixed(x: f64, precision: usize, spec: &Spec) -> String {
    let s = format!("{x:.precision$}");
    let s = match s.split_once('.') {
        Some((int, frac)) => format!("{}.{frac}", group(int, spec.grouping, 3)),
        None => group(&s, spec.grouping, 3),
    };
    if spec.alternate && precision == 0 { format!("{s}.") } else { s }
}

/// `1.500000e+02` style.
fn scientific(x: f64, precision: usize) -> String {
    let s = format!("{x:.precision$e}");
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => s,
    }
}

/// The `g` presentation: scientific for very large/small exponents, fixed otherwise, trailing zeros trimmed.
fn general(x: f64, precision: usize, keep_zeros: bool, spec: &Spec) -> String {
    let p = precision.max(1);
    if x == 0.0 {
        return if keep_zeros { format!("{:.*}", p - 1, 0.0) } else { "0".to_string() };
    }
    let sci = format!("{x:.prec$e}", prec = p - 1);
    let exp: i32 = sci
        .split_once('e')
        .and_then(|(_, e)| e.parse().ok())
        .unwrap_or(0);
    let body = if exp < -4 || exp >= p as i32 {
        scientific(x, p - 1)
    } else {
        let decimals = (p as i32 - 1 - exp).max(0) as usize;
        fixed(x, decimals, spec)
    };
    if keep_zeros {
        return body;
    }
    match body.split_once('e') {
        Some((mantissa, exp)) => format!("{}e{exp}", trim_zeros(mantissa)),
        None => trim_zeros(&body),
    }
}

fn trim_zeros(s: &str) -> String {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s.to_string()
    }
}

fn group(digits: &str, sep: Option<char>, every: usize) -> String {
    let Some(sep) = sep else {
        return digits.to_string();
    };
    let chars: Vec<char> = digits.chars().collect();
    let mut out = String::new();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % every == 0 {
            out.push(sep);
        }
        out.push(*c);
    }
    out
}

fn pad_number(negative: bool, body: &str, spec: &Spec) -> String {
    let sign = match (negative, spec.sign) {
        (true, _) => "-",
        (false, Some('+')) => "+",
        (false, Some(' ')) => " ",
        _ => "",
    };
    let zero_fill = spec.zero && spec.align.is_none() && spec.fill.is_none();
    if spec.align == Some('=') || zero_fill {
        let fill = if zero_fill { '0' } else { spec.fill.unwrap_or(' ') };
        let len = sign.chars().count() + body.chars().count();
        let padding: String = std::iter::repeat_n(fill, spec.width.saturating_sub(len)).collect();
        return format!("{sign}{padding}{body}");
    }
    pad(&format!("{sign}{body}"), spec, '>')
}

fn pad(text: &str, spec: &Spec, default_align: char) -> String {
    let len = text.chars().count();
    if len >= spec.width {
        return text.to_string();
    }
    let fill = spec.fill.unwrap_or(if spec.zero && spec.align.is_none() { '0' } else { ' ' });
    let total = spec.width - len;
    let (left, right) = match spec.align.unwrap_or(default_align) {
        '<' => (0, total),
        '^' => (total / 2, total - total / 2),
        _ => (total, 0),
    };
    let mut out = String::with_capacity(spec.width);
    out.extend(std::iter::repeat_n(fill, left));
    out.push_str(text);
    out.extend(std::iter::repeat_n(fill, right));
    out
}

// ============================================================================
// printf-style `%` formatting
// ============================================================================

/// `fmt % args`. `args` is a tuple's items, or a single value.
pub(crate) fn percent_format(fmt: &str, args: &[Object]) -> EvalResult<String> {
    let mut out = String::new();
    let mut chars = fmt.chars().peekable();
    let mut next = 0;
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let mut flags = String::new();
        while let Some(&f @ ('-' | '+' | ' ' | '0' | '#')) = chars.peek() {
            flags.push(f);
            chars.next();
        }
        let mut width = String::new();
        while let Some(&d) = chars.peek().filter(|d| d.is_ascii_digit()) {
            width.push(d);
            chars.next();
        }
        let mut precision = None;
        if chars.peek() == Some(&'.') {
            chars.next();
            let mut p = String::new();
            while let Some(&d) = chars.peek().filter(|d| d.is_ascii_digit()) {
                p.push(d);
                chars.next();
            }
            precision = Some(if p.is_empty() { "0".to_string() } else { p });
        }
        let Some(conv) = chars.next() else {
            return value_error("incomplete format");
        };
        if conv == '%' {
            out.push('%');
            continue;
        }
        let Some(arg) = args.get(next) else {
            return type_error("not enough arguments for format string");
        };
        next += 1;

        let mut spec = String::new();
        if flags.contains('-') {
            spec.push('<');
        } else if matches!(conv, 'd' | 'i' | 'f' | 'F' | 'e' | 'E' | 'g' | 'G' | 'x' | 'X' | 'o') {
            spec.push('>');
        }
        if flags.contains('+') {
            spec.push('+');
        } else if flags.contains(' ') {
            spec.push(' ');
        }
        if flags.contains('#') {
            spec.push('#');
        }
        if flags.contains('0') && !flags.contains('-') {
            spec.clear();
            spec.push_str(if flags.contains('+') { "+" } else { "" });
            spec.push('0');
        }
        spec.push_str(&width);
        let rendered = match conv {
            's' | 'r' | 'a' => {
                let text = match conv {
                    's' => to_str(arg),
                    'r' => repr(arg),
                    _ => ascii(arg),
                };
                if let Some(p) = &precision {
                    spec.push('.');
                    spec.push_str(p);
                }
                format_value(&Object::string(text), &spec)?
            }
            'd' | 'i' | 'x' | 'X' | 'o' => {
                let n = match arg {
                    Object::Int(i) => *i,
                    Object::Bool(b) => i64::from(*b),
                    Object::Float(f) if f.is_finite() => f.trunc() as i64,
                    other => {
                        return type_error(format!(
                            "%{conv} format: a real number is required, not {}",
                            other.type_name()
                        ));
                    }
                };
                if conv != 'i' && conv != 'd' {
                    spec.push(conv);
                }
                format_value(&Object::Int(n), &spec)?
            }
            'f' | 'F' | 'e' | 'E' | 'g' | 'G' => {
                let x = match arg {
                    Object::Int(i) => *i as f64,
                    Object::Bool(b) => f64::from(u8::from(*b)),
                    Object::Float(f) => *f,
                    other => {
                        return type_error(format!("must be real number, not {}", other.type_name()));
                    }
                };
                spec.push('.');
                spec.push_str(precision.as_deref().unwrap_or("6"));
                spec.push(conv);
                format_value(&Object::Float(x), &spec)?
            }
            other => {
                return value_error(format!(
                    "unsupported format character '{other}' (0x{:x})",
                    other as u32
                ));
            }
        };
        out.push_str(&rendered);
    }
    if next < args.len() {
        return type_error("not all arguments converted during string formatting");
    }
    Ok(out)
}
