use std::fmt;

/// Payment methods accepted by the hosted checkout integration.
pub const SUPPORTED_PAYMENT_METHODS: &[&str] = &[
    "card",
    "klarna",
    "link",
    "cashapp",
    "amazon_pay",
    "paypal",
    "google_pay",
    "apple_pay",
    "afterpay",
];

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

pub fn validate_required(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }

    Ok(())
}

pub fn validate_positive_amount(field: &'static str, value: f64) -> ValidationResult {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::new(field, "must be a positive amount"));
    }

    Ok(())
}

pub fn validate_payment_method(field: &'static str, value: &str) -> ValidationResult {
    if SUPPORTED_PAYMENT_METHODS
        .iter()
        .all(|candidate| value != *candidate)
    {
        return Err(ValidationError::new(
            field,
            format!(
                "must be one of: {}",
                SUPPORTED_PAYMENT_METHODS.join(", ")
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_rejects_empty_and_whitespace() {
        assert!(validate_required("name", "").is_err());
        assert!(validate_required("name", "   ").is_err());
        assert!(validate_required("name", "A").is_ok());
    }

    #[test]
    fn test_positive_amount() {
        assert!(validate_positive_amount("amount", 50.0).is_ok());
        assert!(validate_positive_amount("amount", 0.0).is_err());
        assert!(validate_positive_amount("amount", -1.0).is_err());
        assert!(validate_positive_amount("amount", f64::NAN).is_err());
    }

    #[test]
    fn test_payment_method_enumeration() {
        assert!(validate_payment_method("paymentMethod", "card").is_ok());
        assert!(validate_payment_method("paymentMethod", "apple_pay").is_ok());
        assert!(validate_payment_method("paymentMethod", "bitcoin").is_err());
        assert!(validate_payment_method("paymentMethod", "").is_err());
    }
}
