//! Internal helpers for input validation and normalization.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, ResultEngine};

/// Canonical comparison key for an order number.
///
/// Uniqueness is case-insensitive: "bs-7" and "BS-7" are the same order. The
/// key is NFKC-normalized so width/compatibility variants collide too.
pub(crate) fn order_number_key(value: &str) -> String {
    value.trim().nfkc().collect::<String>().to_lowercase()
}

/// Trim a required name, rejecting empty input.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidOrder(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field, mapping blank input to `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Reject a zero quantity where a movement is required.
pub(crate) fn require_positive_quantity(quantity: u32, label: &str) -> ResultEngine<u32> {
    if quantity == 0 {
        return Err(EngineError::InvalidQuantity(format!(
            "{label} must be > 0"
        )));
    }
    Ok(quantity)
}
