//! Shared threshold validation helpers.
//!
//! Provides reusable range-checking functions used by multiple domain modules.

use crate::error::CoreError;

/// Validate that a value falls within `[0.0, 1.0]`.
///
/// Returns a `CoreError::Validation` naming the field if out of range.
pub fn validate_unit_range(value: f64, name: &str) -> Result<(), CoreError> {
    validate_closed_range(value, 0.0, 1.0, name)
}

/// Validate that a finite value falls within `[min, max]`.
///
/// NaN and infinities are always rejected.
pub fn validate_closed_range(value: f64, min: f64, max: f64, name: &str) -> Result<(), CoreError> {
    if !value.is_finite() || value < min || value > max {
        return Err(CoreError::Validation(format!(
            "{name} must be between {min} and {max}, got {value}"
        )));
    }
    Ok(())
}

/// Validate that every component of a slice is finite.
pub fn validate_finite(values: &[f64], name: &str) -> Result<(), CoreError> {
    if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
        return Err(CoreError::Validation(format!(
            "{name}[{pos}] must be a finite number"
        )));
    }
    Ok(())
}
