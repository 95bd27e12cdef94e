//! Validation errors for records crossing the AI boundary

use thiserror::Error;

/// Why a record was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("unknown difficulty '{0}' (expected Easy, Medium, or Hard)")]
    UnknownDifficulty(String),

    #[error("unknown ingredient category '{0}'")]
    UnknownCategory(String),

    #[error("invalid quantity {quantity} for ingredient '{ingredient}'")]
    InvalidQuantity { ingredient: String, quantity: f64 },

    #[error("{field} must be a non-negative number, got {value}")]
    InvalidNumber { field: &'static str, value: f64 },

    #[error("servings must be at least 1, got {0}")]
    InvalidServings(f64),
}
