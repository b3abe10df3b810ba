//! Internal helpers for input validation and normalization.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so every write path rejects malformed input before touching
//! the database.

use crate::{EngineError, ResultEngine};

/// Trim free text; blank input becomes `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Points of a single award/deduction must be within `1..=max_points`.
pub(crate) fn validate_batch_points(points: i64, max_points: i64) -> ResultEngine<()> {
    if points <= 0 {
        return Err(EngineError::Validation("points must be > 0".to_string()));
    }
    if points > max_points {
        return Err(EngineError::Validation(format!(
            "points must be <= {max_points}"
        )));
    }
    Ok(())
}

/// Treat a batch as a set: sorted, without duplicates, never empty.
pub(crate) fn normalize_child_ids(child_ids: &[i64]) -> ResultEngine<Vec<i64>> {
    if child_ids.is_empty() {
        return Err(EngineError::Validation(
            "child_ids must not be empty".to_string(),
        ));
    }
    let mut ids = child_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}
