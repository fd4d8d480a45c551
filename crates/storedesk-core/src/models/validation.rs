//! Client-side checks run before a payload is sent to the backend.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{field} must be {expected}")]
    Invalid {
        field: &'static str,
        expected: &'static str,
    },

    #[error("At least one field to update is required")]
    EmptyUpdate,

    #[error("Start date must be before end date")]
    InvertedRange,
}

impl ValidationError {
    pub(crate) fn invalid(field: &'static str, expected: &'static str) -> Self {
        ValidationError::Invalid { field, expected }
    }
}

fn all_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.chars().all(|c| c.is_ascii_digit())
}

/// Exactly ten digits, no separators
pub fn is_valid_phone(phone: &str) -> bool {
    all_digits(phone, 10)
}

/// Six-digit postal code
pub fn is_valid_pincode(pincode: &str) -> bool {
    all_digits(pincode, 6)
}

/// `local@domain.tld` with no whitespace and a dot in the domain
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Store hours are written `HH-MM`
pub fn is_valid_opening_time(time: &str) -> bool {
    let bytes = time.as_bytes();
    bytes.len() == 5
        && bytes[2] == b'-'
        && bytes[..2].iter().all(u8::is_ascii_digit)
        && bytes[3..].iter().all(u8::is_ascii_digit)
}

pub(crate) fn require_text(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(())
}

pub(crate) fn require_positive(value: f64, field: &'static str) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::invalid(field, "a positive number"));
    }
    Ok(())
}

pub(crate) fn require_finite(value: f64, field: &'static str) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::invalid(field, "a number"));
    }
    Ok(())
}

pub(crate) fn check_phone(phone: &str, field: &'static str) -> Result<(), ValidationError> {
    if !is_valid_phone(phone) {
        return Err(ValidationError::invalid(field, "a 10-digit string"));
    }
    Ok(())
}

pub(crate) fn check_email(email: &str, field: &'static str) -> Result<(), ValidationError> {
    if !is_valid_email(email) {
        return Err(ValidationError::invalid(field, "a valid email address"));
    }
    Ok(())
}
