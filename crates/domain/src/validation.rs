// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;

/// Trims `value` and rejects it if empty.
///
/// # Errors
///
/// Returns `DomainError::InvalidInput` naming `field` if the value is blank.
pub fn require_text(field: &str, value: &str) -> Result<String, DomainError> {
    let trimmed: &str = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidInput {
            field: field.to_string(),
            reason: String::from("must not be empty"),
        });
    }
    Ok(trimmed.to_string())
}

/// Validates and normalizes an airport code.
///
/// Accepts three-letter IATA or four-letter ICAO codes and returns them
/// upper-cased.
///
/// # Errors
///
/// Returns `DomainError::InvalidInput` if the code is not 3 or 4
/// alphanumeric characters.
pub fn validate_airport_code(field: &str, code: &str) -> Result<String, DomainError> {
    let normalized: String = code.trim().to_uppercase();
    let valid_length: bool = matches!(normalized.len(), 3 | 4);
    if !valid_length || !normalized.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(DomainError::InvalidInput {
            field: field.to_string(),
            reason: format!("'{code}' is not a 3 or 4 character airport code"),
        });
    }
    Ok(normalized)
}

/// Validates a non-negative integer quantity.
///
/// # Errors
///
/// Returns `DomainError::InvalidInput` naming `field` if the value is negative.
pub fn require_non_negative(field: &str, value: i64) -> Result<i64, DomainError> {
    if value < 0 {
        return Err(DomainError::InvalidInput {
            field: field.to_string(),
            reason: String::from("must not be negative"),
        });
    }
    Ok(value)
}

/// Validates the reason supplied for an administrative override.
///
/// # Errors
///
/// Returns `DomainError::OverrideReasonRequired` if the reason is missing
/// or blank.
pub fn require_override_reason(
    operation: &str,
    reason: Option<&str>,
) -> Result<String, DomainError> {
    match reason.map(str::trim) {
        Some(r) if !r.is_empty() => Ok(r.to_string()),
        _ => Err(DomainError::OverrideReasonRequired {
            operation: operation.to_string(),
        }),
    }
}
