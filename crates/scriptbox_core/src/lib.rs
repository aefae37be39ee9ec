//! Provide shared, pure semantic helpers and canonical language vocabulary for the scriptbox parser and runtime.
//!
//! This crate is small and dependency-free. It contains deterministic helpers that both:
//! - the syntax frontend can use for reserved-word and operator lookups, and
//! - the interpreter can use to enforce Python-like semantics at runtime.
//!
//! ## Notes
//!
//! - This is a “semantic core” crate: **no IO**, no global state, and no interpreter-specific types.
//! - Current scope: numeric policy (Python-like semantics), sequence indexing/slicing, string helpers, exception
//!   kinds, and canonical language vocabulary.

pub mod errors;
pub mod indexing;
pub mod lang;
pub mod strings;

/// Represent the numeric category used by semantic policy.
///
/// This is not a concrete runtime type. It exists to describe “int-like” and “float-like” behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericTy {
    Int,
    Float,
}

/// Represent a numeric operator subject to promotion/coercion rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericOp {
    Add,
    Sub,
    Mul,
    Div,
    /// `//` (Python-style floor division): returns `Int` for `Int // Int`, otherwise `Float`.
    FloorDiv,
    Mod,
    Pow,
}

/// Determine the numeric result category for a binary operation.
///
/// ## Parameters
/// - `op`: the numeric operator.
/// - `lhs`: numeric category of the left operand.
/// - `rhs`: numeric category of the right operand.
/// - `int_exponent`: for `Pow`, the integer exponent value when `rhs` is an `Int`.
///
/// ## Notes
/// - `/` always yields `Float` (even `Int / Int`).
/// - `//`, `%`, `+`, `-`, `*` yield `Float` if either operand is `Float`, otherwise `Int`.
/// - `**` yields `Int` only for `Int ** Int` with a non-negative exponent; otherwise `Float`.
///
/// ## Examples
/// ```rust
/// use scriptbox_core::{result_numeric_type, NumericOp, NumericTy};
/// assert_eq!(result_numeric_type(NumericOp::Div, NumericTy::Int, NumericTy::Int, None), NumericTy::Float);
/// assert_eq!(result_numeric_type(NumericOp::Pow, NumericTy::Int, NumericTy::Int, Some(2)), NumericTy::Int);
/// assert_eq!(result_numeric_type(NumericOp::Pow, NumericTy::Int, NumericTy::Int, Some(-1)), NumericTy::Float);
/// ```
pub fn result_numeric_type(op: NumericOp, lhs: NumericTy, rhs: NumericTy, int_exponent: Option<i64>) -> NumericTy {
    match op {
        NumericOp::Div => NumericTy::Float,
        NumericOp::FloorDiv | NumericOp::Mod | NumericOp::Add | NumericOp::Sub | NumericOp::Mul => {
            if lhs == NumericTy::Float || rhs == NumericTy::Float {
                NumericTy::Float
            } else {
                NumericTy::Int
            }
        }
        NumericOp::Pow => match (lhs, rhs, int_exponent) {
            (NumericTy::Int, NumericTy::Int, Some(e)) if e >= 0 => NumericTy::Int,
            _ => NumericTy::Float,
        },
    }
}

// =====================================================================
// Runtime-facing numeric helpers
// =====================================================================

/// Python-like modulo for integers (sign of divisor).
///
/// ## Parameters
/// - `a`: dividend
/// - `b`: divisor (must be non-zero)
///
/// ## Returns
/// - (`i64`): remainder with the sign of the divisor.
#[inline]
pub fn py_mod_i64_impl(a: i64, b: i64) -> i64 {
    debug_assert!(b != 0);
    // `wrapping_rem` keeps `i64::MIN % -1` at 0 instead of overflowing.
    let r = a.wrapping_rem(b);
    if (r > 0 && b < 0) || (r < 0 && b > 0) { r + b } else { r }
}

/// Python-like floor division for integers (rounds toward negative infinity).
///
/// ## Returns
/// - `Some(i64)`: quotient rounded toward negative infinity.
/// - `None`: if `b == 0` or the quotient overflows (`i64::MIN // -1`).
#[inline]
pub fn py_floor_div_i64(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    let r = a % b;
    if (r > 0 && b < 0) || (r < 0 && b > 0) { Some(q - 1) } else { Some(q) }
}

/// Python-like modulo for floats (sign of divisor).
///
/// ## Returns
/// - (`f64`): remainder with the sign of the divisor.
#[inline]
pub fn py_mod_f64_impl(a: f64, b: f64) -> f64 {
    debug_assert!(b != 0.0);
    let r = a % b;
    if (r > 0.0 && b < 0.0) || (r < 0.0 && b > 0.0) {
        r + b
    } else {
        r
    }
}

/// Python-like floor division for floats.
#[inline]
pub fn py_floor_div_f64_impl(a: f64, b: f64) -> f64 {
    debug_assert!(b != 0.0);
    (a / b).floor()
}

/// Integer exponentiation with overflow detection (`exp` must be non-negative).
#[inline]
pub fn py_pow_i64(base: i64, exp: i64) -> Option<i64> {
    let exp = u32::try_from(exp).ok()?;
    base.checked_pow(exp)
}

/// Largest `ndigits` at which rounding can still change an `f64`; beyond it `round` returns its input.
const ROUND_NDIGITS_MAX: i32 = 323;
/// Smallest `ndigits` at which some finite `f64` can round to a nonzero value.
const ROUND_NDIGITS_MIN: i32 = -308;

/// Round half to even at `ndigits` decimal places (Python's `round(float, ndigits)`).
///
/// Works on the exact decimal expansion of `x`, so `2.675` (stored as `2.67499999...`) rounds to `2.67`.
/// Zero results keep the sign of `x`.
///
/// ## Examples
/// ```rust
/// use scriptbox_core::py_round_f64;
/// assert_eq!(py_round_f64(2.675, 2), 2.67);
/// assert_eq!(py_round_f64(1250.0, -2), 1200.0);
/// assert_eq!(py_round_f64(1.5, 400), 1.5);
/// ```
pub fn py_round_f64(x: f64, ndigits: i32) -> f64 {
    if !x.is_finite() || ndigits > ROUND_NDIGITS_MAX {
        return x;
    }
    if ndigits < ROUND_NDIGITS_MIN {
        return 0.0 * x;
    }
    match usize::try_from(ndigits) {
        // Precision formatting is exact and breaks ties to even.
        Ok(places) => format!("{x:.places$}").parse().unwrap_or(x),
        Err(_) => round_to_power_of_ten(x.abs(), ndigits.unsigned_abs() as usize).copysign(x),
    }
}

/// Round a non-negative finite `x` to a multiple of `10^places` (`places >= 1`), half to even.
fn round_to_power_of_ten(x: f64, places: usize) -> f64 {
    let digits = format!("{:.0}", x.trunc());
    if digits.len() < places {
        return 0.0;
    }
    let (head, tail) = digits.split_at(digits.len() - places);
    let half = format!("5{}", "0".repeat(places - 1));
    // Equal-length digit strings compare like the numbers they spell.
    let round_up = match tail.cmp(half.as_str()) {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Less => false,
        std::cmp::Ordering::Equal => x.fract() != 0.0 || head.bytes().last().is_some_and(|d| (d - b'0') % 2 == 1),
    };

    let mut head = head.as_bytes().to_vec();
    if round_up {
        let mut carry = true;
        for d in head.iter_mut().rev() {
            if *d == b'9' {
                *d = b'0';
            } else {
                *d += 1;
                carry = false;
                break;
            }
        }
        if carry {
            head.insert(0, b'1');
        }
    }
    if head.is_empty() {
        return 0.0;
    }
    head.extend(std::iter::repeat_n(b'0', places));
    String::from_utf8_lossy(&head).parse().unwrap_or(f64::INFINITY)
}

/// Round an integer to a multiple of `10^-ndigits` (Python's `round(int, ndigits)`), half to even.
///
/// Non-negative `ndigits` leave `x` unchanged. Returns `None` when the result does not fit in an `i64`.
pub fn py_round_i64(x: i64, ndigits: i64) -> Option<i64> {
    if ndigits >= 0 {
        return Some(x);
    }
    let Some(unit) = u32::try_from(ndigits.unsigned_abs())
        .ok()
        .and_then(|places| 10i128.checked_pow(places))
    else {
        return Some(0);
    };
    let x = i128::from(x);
    let (q, r) = (x.div_euclid(unit), x.rem_euclid(unit));
    let round_up = r > unit - r || (r == unit - r && q % 2 != 0);
    let q = if round_up { q + 1 } else { q };
    i64::try_from(q * unit).ok()
}

/// Render a float the way Python's `repr(float)` does for common values.
///
/// ## Examples
/// ```rust
/// use scriptbox_core::format_float;
/// assert_eq!(format_float(1.0), "1.0");
/// assert_eq!(format_float(0.1), "0.1");
/// assert_eq!(format_float(1e20), "1e+20");
/// assert_eq!(format_float(f64::NAN), "nan");
/// ```
pub fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let abs = x.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        // Rust gives `1e20` / `1.5e-7`; Python writes an explicit exponent sign with at least two digits.
        let s = format!("{x:e}");
        if let Some((mantissa, exp)) = s.split_once('e') {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            return format!("{mantissa}e{sign}{digits:0>2}");
        }
        return s;
    }
    let s = format!("{x}");
    if s.contains('.') { s } else { format!("{s}.0") }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_div_always_float() {
        assert_eq!(
            result_numeric_type(NumericOp::Div, NumericTy::Int, NumericTy::Int, None),
            NumericTy::Float
        );
        assert_eq!(
            result_numeric_type(NumericOp::Div, NumericTy::Float, NumericTy::Float, None),
            NumericTy::Float
        );
    }

    #[test]
    fn test_mod_promotion() {
        assert_eq!(
            result_numeric_type(NumericOp::Mod, NumericTy::Int, NumericTy::Int, None),
            NumericTy::Int
        );
        assert_eq!(
            result_numeric_type(NumericOp::Mod, NumericTy::Int, NumericTy::Float, None),
            NumericTy::Float
        );
    }

    #[test]
    fn test_floor_semantics() {
        assert_eq!(py_floor_div_i64(-7, 2), Some(-4));
        assert_eq!(py_floor_div_i64(7, -2), Some(-4));
        assert_eq!(py_floor_div_i64(7, 0), None);
        assert_eq!(py_floor_div_i64(i64::MIN, -1), None);
        assert_eq!(py_mod_i64_impl(-7, 2), 1);
        assert_eq!(py_mod_i64_impl(7, -2), -1);
        assert_eq!(py_mod_f64_impl(-7.5, 2.0), 0.5);
    }

    #[test]
    fn test_pow_overflow() {
        assert_eq!(py_pow_i64(2, 10), Some(1024));
        assert_eq!(py_pow_i64(2, 64), None);
        assert_eq!(py_pow_i64(2, -1), None);
    }

    #[test]
    fn test_round_half_even() {
        assert_eq!(py_round_f64(2.5, 0), 2.0);
        assert_eq!(py_round_f64(3.5, 0), 4.0);
        assert_eq!(py_round_f64(-0.5, 0), -0.0);
        assert!(py_round_f64(-0.5, 0).is_sign_negative());
        assert_eq!(py_round_f64(1.25, 1), 1.2);
    }

    #[test]
    fn test_round_uses_exact_decimal_value() {
        assert_eq!(py_round_f64(2.675, 2), 2.67);
        assert_eq!(py_round_f64(0.125, 2), 0.12);
        assert_eq!(py_round_f64(0.375, 2), 0.38);
        assert_eq!(py_round_f64(1.0005, 3), 1.0);
    }

    #[test]
    fn test_round_negative_ndigits() {
        assert_eq!(py_round_f64(1250.0, -2), 1200.0);
        assert_eq!(py_round_f64(1350.0, -2), 1400.0);
        assert_eq!(py_round_f64(1250.5, -2), 1300.0);
        assert_eq!(py_round_f64(123.456, -1), 120.0);
        assert_eq!(py_round_f64(5.0, -1), 0.0);
        assert_eq!(py_round_f64(15.0, -1), 20.0);
        assert_eq!(py_round_f64(96.0, -1), 100.0);
        assert_eq!(py_round_f64(-96.0, -1), -100.0);
        assert_eq!(py_round_f64(49.0, -2), 0.0);
        assert_eq!(py_round_f64(51.0, -2), 100.0);
        assert!(py_round_f64(-4.0, -1).is_sign_negative());
        assert_eq!(py_round_f64(1.7976931348623157e308, -308), f64::INFINITY);
    }

    #[test]
    fn test_round_out_of_range_ndigits() {
        assert_eq!(py_round_f64(1.5, 400), 1.5);
        assert_eq!(py_round_f64(1.5, 324), 1.5);
        let zero = py_round_f64(1.5, -400);
        assert_eq!(zero, 0.0);
        assert!(zero.is_sign_positive());
        assert!(py_round_f64(-1.5, -400).is_sign_negative());
        assert!(py_round_f64(f64::NAN, 2).is_nan());
    }

    #[test]
    fn test_round_int() {
        assert_eq!(py_round_i64(1250, -2), Some(1200));
        assert_eq!(py_round_i64(1350, -2), Some(1400));
        assert_eq!(py_round_i64(-1250, -2), Some(-1200));
        assert_eq!(py_round_i64(-1251, -2), Some(-1300));
        assert_eq!(py_round_i64(7, 2), Some(7));
        assert_eq!(py_round_i64(9_007_199_254_740_993, -1), Some(9_007_199_254_740_990));
        assert_eq!(py_round_i64(i64::MAX, -19), None);
        assert_eq!(py_round_i64(i64::MAX, -40), Some(0));
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(42.0), "42.0");
        assert_eq!(format_float(-2.5), "-2.5");
        assert_eq!(format_float(1.5e-7), "1.5e-07");
        assert_eq!(format_float(f64::NEG_INFINITY), "-inf");
    }
}
