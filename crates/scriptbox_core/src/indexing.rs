//! Define shared sequence indexing policy (Python-like).
//!
//! Lists, tuples, and strings all index and slice through these helpers so the rules stay in one place.
//!
//! ## Notes
//! - **Negative indices**: supported (`xs[-1]` is the last element).
//! - **Slicing**: `start`, `end`, `step` (default `step = 1`), with negative indices and bounds clamping.
//!   Slices never fail on out-of-range bounds; only `step == 0` is an error.

/// Describe an index-out-of-range error message (suffix after the container name).
pub const INDEX_OUT_OF_RANGE_MSG: &str = "index out of range";
/// Describe a slice step-zero error message.
pub const SLICE_STEP_ZERO_MSG: &str = "slice step cannot be zero";

/// Represent sequence access errors produced by the indexing helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    IndexOutOfRange,
    SliceStepZero,
}

impl AccessError {
    /// Return the canonical error message for this access error.
    pub fn message(self) -> &'static str {
        match self {
            AccessError::IndexOutOfRange => INDEX_OUT_OF_RANGE_MSG,
            AccessError::SliceStepZero => SLICE_STEP_ZERO_MSG,
        }
    }
}

/// Normalize an index (supports negatives).
///
/// ## Returns
/// - `Ok(usize)`: position inside `0..len`.
/// - `Err(AccessError::IndexOutOfRange)`: if the index falls outside the sequence.
///
/// ## Examples
/// ```rust
/// use scriptbox_core::indexing::normalize_index;
///
/// assert_eq!(normalize_index(3, -1), Ok(2));
/// assert!(normalize_index(3, 3).is_err());
/// ```
pub fn normalize_index(len: usize, idx: i64) -> Result<usize, AccessError> {
    let len_i = len as i64;
    let i = if idx < 0 { idx + len_i } else { idx };
    if i < 0 || i >= len_i {
        Err(AccessError::IndexOutOfRange)
    } else {
        Ok(i as usize)
    }
}

/// Compute the positions selected by a slice over a sequence of length `len`.
///
/// ## Parameters
/// - `start`: Optional start index (inclusive).
/// - `end`: Optional end index (exclusive).
/// - `step`: Optional step; defaults to `1`. Negative steps walk backwards.
///
/// ## Returns
/// - `Ok(Vec<usize>)`: positions in selection order.
/// - `Err(AccessError::SliceStepZero)`: if `step == 0`.
///
/// ## Examples
/// ```rust
/// use scriptbox_core::indexing::slice_indices;
///
/// assert_eq!(slice_indices(5, Some(1), None, None), Ok(vec![1, 2, 3, 4]));
/// assert_eq!(slice_indices(5, None, None, Some(-2)), Ok(vec![4, 2, 0]));
/// ```
pub fn slice_indices(
    len: usize,
    start: Option<i64>,
    end: Option<i64>,
    step: Option<i64>,
) -> Result<Vec<usize>, AccessError> {
    let step = step.unwrap_or(1);
    if step == 0 {
        return Err(AccessError::SliceStepZero);
    }
    let len = len as i64;

    let default_start = if step > 0 { 0 } else { len - 1 };
    let default_end = if step > 0 { len } else { -1 };

    let mut start_idx = start.unwrap_or(default_start);
    // Only explicit bounds are relative to `len`; the default backwards end is a literal -1.
    let mut end_idx = end.unwrap_or(default_end);

    if start.is_some() && start_idx < 0 {
        start_idx += len;
    }
    if end.is_some() && end_idx < 0 {
        end_idx += len;
    }

    if step > 0 {
        start_idx = start_idx.clamp(0, len);
        end_idx = end_idx.clamp(0, len);
    } else {
        start_idx = start_idx.clamp(-1, len - 1);
        end_idx = end_idx.clamp(-1, len - 1);
    }

    let mut out = Vec::new();
    let mut i = start_idx;
    if step > 0 {
        while i < end_idx {
            out.push(i as usize);
            i += step;
        }
    } else {
        while i > end_idx {
            out.push(i as usize);
            i += step;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_index_wraps_once() {
        assert_eq!(normalize_index(4, -4), Ok(0));
        assert_eq!(normalize_index(4, -5), Err(AccessError::IndexOutOfRange));
        assert_eq!(normalize_index(0, 0), Err(AccessError::IndexOutOfRange));
    }

    #[test]
    fn slices_clamp_out_of_range_bounds() {
        assert_eq!(slice_indices(3, Some(-10), Some(10), None), Ok(vec![0, 1, 2]));
        assert_eq!(slice_indices(3, Some(5), None, None), Ok(vec![]));
    }

    #[test]
    fn negative_step_with_explicit_negative_end() {
        // "abcde"[::-1] and "abcde"[3:-6:-1]
        assert_eq!(slice_indices(5, None, None, Some(-1)), Ok(vec![4, 3, 2, 1, 0]));
        assert_eq!(slice_indices(5, Some(3), Some(-6), Some(-1)), Ok(vec![3, 2, 1, 0]));
        assert_eq!(slice_indices(5, Some(-1), Some(-3), Some(-1)), Ok(vec![4, 3]));
    }

    #[test]
    fn zero_step_is_rejected() {
        assert_eq!(slice_indices(3, None, None, Some(0)), Err(AccessError::SliceStepZero));
    }
}
