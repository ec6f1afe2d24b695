use bigdecimal::BigDecimal;
use std::fmt;

pub const CUSTOMER_NAME_MAX_LEN: usize = 255;
pub const FREE_TEXT_MAX_LEN: usize = 1024;
pub const CONTACT_NUMBER_MAX_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

pub fn sanitize_string(value: &str) -> String {
    // Whitespace controls (tab, newline) stay as separators for the split.
    value
        .chars()
        .filter(|ch| !ch.is_control() || ch.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn validate_required(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }

    Ok(())
}

pub fn validate_max_len(field: &'static str, value: &str, max_len: usize) -> ValidationResult {
    if value.len() > max_len {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", max_len),
        ));
    }

    Ok(())
}

/// Monetary quantities are non-negative; zero is a legal balance.
pub fn validate_non_negative_amount(field: &'static str, amount: &BigDecimal) -> ValidationResult {
    if amount < &BigDecimal::from(0) {
        return Err(ValidationError::new(field, "must not be negative"));
    }

    Ok(())
}

pub fn validate_tenor(tenor: i32) -> ValidationResult {
    if tenor <= 0 {
        return Err(ValidationError::new("tenor", "must be a positive number of days"));
    }

    Ok(())
}

pub fn validate_customer_name(customer_name: &str) -> ValidationResult {
    let customer_name = sanitize_string(customer_name);
    validate_required("customer_name", &customer_name)?;
    validate_max_len("customer_name", &customer_name, CUSTOMER_NAME_MAX_LEN)?;

    Ok(())
}

pub fn validate_optional_text(field: &'static str, value: &Option<String>) -> ValidationResult {
    if let Some(text) = value {
        validate_max_len(field, text, FREE_TEXT_MAX_LEN)?;
    }

    Ok(())
}
