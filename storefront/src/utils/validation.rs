//! Input validation helpers
//!
//! Centralized text length constants and validation functions.

use crate::utils::AppError;
use shared::ErrorCode;
use validator::{Validate, ValidationErrors};

// ── Text length limits ──────────────────────────────────────────────

/// Product titles, user names
pub const MAX_NAME_LEN: usize = 200;

/// Descriptions, review comments
pub const MAX_NOTE_LEN: usize = 2000;

/// Short labels: colors, sizes, offers, payment methods
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// URLs / image paths
pub const MAX_URL_LEN: usize = 2048;

/// Review ratings and product ratings are on a 0..=5 scale
pub const MAX_RATING: f64 = 5.0;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            format!("{field} must not be empty"),
        )
        .with_detail("field", field));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Prices must be finite and not negative
pub fn validate_price(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::with_message(
            ErrorCode::ProductInvalidPrice,
            format!("{field} must be a non-negative number"),
        )
        .with_detail("field", field));
    }
    Ok(())
}

/// Ratings live in `0..=5`
pub fn validate_rating(value: f64) -> Result<(), AppError> {
    if !(0.0..=MAX_RATING).contains(&value) {
        return Err(AppError::new(ErrorCode::ReviewInvalidRating).with_detail("rating", value));
    }
    Ok(())
}

/// Run `validator` derive rules and fold the failures into one [`AppError`]
pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload.validate().map_err(validation_error)
}

fn validation_error(errors: ValidationErrors) -> AppError {
    let field_errors = errors.field_errors();
    let mut fields: Vec<String> = field_errors.keys().map(|k| k.to_string()).collect();
    fields.sort_unstable();

    let mut err = AppError::validation(format!("Invalid fields: {}", fields.join(", ")));
    for field in fields {
        err = err.with_detail(field, "invalid");
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::UserRegister;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Tee", "title", MAX_NAME_LEN).is_ok());

        let err = validate_required_text("   ", "title", MAX_NAME_LEN).unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);
        assert_eq!(err.message, "title must not be empty");

        let err = validate_required_text("abcdef", "color", 3).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn test_optional_text() {
        assert!(validate_optional_text(&None, "description", 3).is_ok());
        assert!(validate_optional_text(&Some("abcd".into()), "description", 3).is_err());
    }

    #[test]
    fn test_price_and_rating() {
        assert!(validate_price(0.0, "price").is_ok());
        assert!(validate_price(-1.0, "price").is_err());
        assert!(validate_price(f64::INFINITY, "price").is_err());

        assert!(validate_rating(0.0).is_ok());
        assert!(validate_rating(5.0).is_ok());
        let err = validate_rating(5.5).unwrap_err();
        assert_eq!(err.message, "Rating must be between 0 and 5");
        assert!(validate_rating(-0.5).is_err());
        assert!(validate_rating(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_payload_lists_fields() {
        let payload = UserRegister {
            name: String::new(),
            email: "nope".to_string(),
            password: "secret123".to_string(),
        };
        let err = validate_payload(&payload).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.message, "Invalid fields: email, name");
        assert!(err.details.unwrap().contains_key("email"));
    }
}
