//! Crate-level error types.
//!
//! [`LotsizerError`] unifies every error source (validation, lookup,
//! configuration, persistence, JSON) behind a single enum so callers can
//! match on the variant they care about while still using the `?` operator
//! for easy propagation.

use rust_decimal::Decimal;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LotsizerError>;

/// Top-level error type returned by all public APIs.
#[derive(Debug, thiserror::Error)]
pub enum LotsizerError {
    /// User-supplied values were malformed or non-positive.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// No default or override exists under the requested name.
    #[error("instrument not found: {0}")]
    NotFound(String),

    /// An environment variable or flag held an unusable value.
    #[error("configuration error: {0}")]
    Config(String),

    /// Command-line or API arguments were missing or inconsistent.
    #[error("invalid input: {0}")]
    Usage(String),

    /// The instrument store could not read or write its blob.
    #[error("store error: {0}")]
    Store(String),

    /// Terminal or file-system failure outside the store.
    #[error("io error: {0}")]
    Io(String),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reason a definition or calculation input was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("instrument name must not be empty")]
    EmptyName,

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: Decimal },

    #[error("{field} has more precision than can be stored, got {value}")]
    TooPrecise { field: &'static str, value: Decimal },

    #[error("{field} must be a number")]
    NotANumber { field: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn display_errors() {
        let err = ValidationError::NonPositive {
            field: "standard lot size",
            value: dec!(0),
        };
        assert_eq!(err.to_string(), "standard lot size must be positive, got 0");

        let err = LotsizerError::from(ValidationError::EmptyName);
        assert_eq!(
            err.to_string(),
            "validation error: instrument name must not be empty"
        );

        let err = LotsizerError::from(ValidationError::NotANumber {
            field: "Standard lot size",
        });
        assert_eq!(
            err.to_string(),
            "validation error: Standard lot size must be a number"
        );

        let err = LotsizerError::Usage("give --risk-amount".to_string());
        assert_eq!(err.to_string(), "invalid input: give --risk-amount");

        let err = LotsizerError::NotFound("GOLD".to_string());
        assert_eq!(err.to_string(), "instrument not found: GOLD");
    }
}
