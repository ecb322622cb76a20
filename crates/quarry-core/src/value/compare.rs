use crate::value::Value;
use std::cmp::Ordering;

///
/// Comparison semantics for runtime values.
///
/// Comparisons are strict: both operands must carry the same variant, and the
/// `NoMatch` sentinel matches nothing under any operator. Helpers return
/// `Option` so evaluation can treat undefined comparisons as non-matches
/// without panicking.
///

/// Semantic equality for predicate evaluation.
///
/// Unlike structural `PartialEq`, the `NoMatch` sentinel is never equal to
/// anything, itself included.
#[must_use]
pub fn compare_eq(left: &Value, right: &Value) -> bool {
    if matches!(left, Value::NoMatch) || matches!(right, Value::NoMatch) {
        return false;
    }

    left == right
}

/// Natural ordering for orderable variants.
///
/// Returns `None` for mismatched variants and for types without a natural
/// order (text ordering is intentionally excluded; ordering operators are
/// rejected for STRING fields during normalization).
#[must_use]
pub fn compare_order(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Some(a.total_cmp(b)),
        (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
        (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
        (Value::Time(a), Value::Time(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

///
/// TESTS
///
