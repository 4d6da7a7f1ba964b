use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use super::{parse_cents, Cents};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").expect("email pattern is valid")
});

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\s\-+()]+$").expect("phone pattern is valid"));

/// Input rejected before it reaches the data service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    #[error("Invalid amount '{input}': {reason}")]
    InvalidAmount { input: String, reason: String },

    #[error("Invalid transaction type '{0}'. Valid types: debit, credit")]
    InvalidEntryType(String),

    #[error("Date is out of the supported range: {0}")]
    DateOutOfRange(String),
}

/// Trim a required text field, rejecting blank input.
pub fn require(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(trimmed.to_string())
}

pub fn validate_email(value: &str) -> Result<String, ValidationError> {
    let email = require("Email", value)?;
    if !EMAIL_PATTERN.is_match(&email) {
        return Err(ValidationError::InvalidEmail(email));
    }
    Ok(email)
}

pub fn validate_phone(value: &str) -> Result<String, ValidationError> {
    let phone = require("Phone", value)?;
    if !PHONE_PATTERN.is_match(&phone) {
        return Err(ValidationError::InvalidPhone(phone));
    }
    Ok(phone)
}

/// Parse a user-entered amount. Only strictly positive values are accepted.
pub fn parse_amount(input: &str) -> Result<Cents, ValidationError> {
    let invalid = |reason: String| ValidationError::InvalidAmount {
        input: input.trim().to_string(),
        reason,
    };

    let cents = parse_cents(input).map_err(|e| invalid(e.to_string()))?;
    if cents <= 0 {
        return Err(invalid("amount must be greater than 0".to_string()));
    }
    Ok(cents)
}
