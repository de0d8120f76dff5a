use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::stripe::StripeError;

/// Error type for the payment route family, rendered as `{"error": msg}`.
///
/// Full detail (provider payloads, sqlx errors) goes to tracing; clients only
/// ever see the human-readable message.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    DuplicateProcessing(String),

    #[error("{0}")]
    PaymentIncomplete(String),

    #[error("{0}")]
    PaymentProvider(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::DuplicateProcessing(_) => StatusCode::CONFLICT,
            AppError::PaymentIncomplete(_) => StatusCode::PAYMENT_REQUIRED,
            AppError::PaymentProvider(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn client_message(&self) -> String {
        match self {
            // Never leak database detail to clients.
            AppError::Database(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<StripeError> for AppError {
    fn from(err: StripeError) -> Self {
        tracing::error!(error = %err, "Stripe call failed");
        AppError::PaymentProvider(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(json!({ "error": self.client_message() }));
        (status, body).into_response()
    }
}

/// Error type for the category/auth/prayer route families, rendered with the
/// `{status: 2, msg}` envelope those clients expect. The two envelopes are
/// deliberately kept separate per route family.
#[derive(Debug)]
pub struct StatusError {
    status: StatusCode,
    msg: String,
}

impl StatusError {
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            msg: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<sqlx::Error> for StatusError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!(error = %err, "database error");
        StatusError::internal("Server error. Try again later.")
    }
}

impl IntoResponse for StatusError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(msg = %self.msg, "request failed");
        }

        let body = Json(json!({ "status": 2, "msg": self.msg }));
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_status_code() {
        let error = AppError::Validation("Missing required fields".to_string());
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_error_status_code() {
        let error = AppError::NotFound("Donor not found".to_string());
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_duplicate_processing_status_code() {
        let error = AppError::DuplicateProcessing("Payment session already processed".to_string());
        assert_eq!(error.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_payment_incomplete_status_code() {
        let error = AppError::PaymentIncomplete("Payment not completed".to_string());
        assert_eq!(error.status_code(), StatusCode::PAYMENT_REQUIRED);
    }

    #[test]
    fn test_payment_provider_status_code() {
        let error = AppError::PaymentProvider("Stripe is down".to_string());
        assert_eq!(error.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_stripe_error_maps_to_payment_provider() {
        let error = AppError::from(StripeError::Api {
            status: 500,
            message: "An unknown error occurred".to_string(),
        });
        assert!(matches!(error, AppError::PaymentProvider(_)));
        assert_eq!(error.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_database_error_hides_detail() {
        let error = AppError::Database(sqlx::Error::RowNotFound);
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.client_message(), "Internal server error");
    }

    #[tokio::test]
    async fn test_validation_error_response() {
        let error = AppError::Validation("Invalid or unsupported payment method".to_string());
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_status_error_response() {
        let error = StatusError::not_found("Category not found");
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
