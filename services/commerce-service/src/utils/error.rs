// /commerce/services/commerce-service/src/utils/error.rs
// Centralized error handling untuk commerce service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bigdecimal::BigDecimal;
use thiserror::Error;
use crate::models::{CartIssue, ErrorResponse};

/// Type alias untuk Result dengan AppError
pub type AppResult<T> = Result<T, AppError>;

/// Application error enum dengan semua possible errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Cart tidak lolos validasi, semua item bermasalah ada di list
    #[error("Cart validation failed: {} issue(s)", .0.len())]
    CartValidation(Vec<CartIssue>),

    #[error("Insufficient stock for variation {variation_id} (requested {requested})")]
    InsufficientStock { variation_id: i64, requested: i32 },

    #[error("Insufficient funds: balance {balance}, required {required}")]
    InsufficientFunds { balance: BigDecimal, required: BigDecimal },

    #[error("Unsupported payment method: {0}")]
    UnsupportedPaymentMethod(String),

    #[error("Invalid {entity} status transition: {from} -> {to}")]
    InvalidTransition {
        entity: &'static str,
        from: &'static str,
        to: &'static str,
    },

    #[error("Payment gateway error: {0}")]
    Gateway(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status untuk setiap variant
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_)
            | AppError::InsufficientStock { .. }
            | AppError::InvalidTransition { .. } => StatusCode::CONFLICT,
            AppError::BadRequest(_)
            | AppError::ValidationError(_)
            | AppError::UnsupportedPaymentMethod(_) => StatusCode::BAD_REQUEST,
            AppError::CartValidation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InsufficientFunds { .. } => StatusCode::PAYMENT_REQUIRED,
            AppError::Gateway(_) => StatusCode::BAD_GATEWAY,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Database(_) | AppError::Configuration(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Kode error yang stabil untuk client
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::CartValidation(_) => "VALIDATION_FAILED",
            AppError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            AppError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            AppError::UnsupportedPaymentMethod(_) => "UNSUPPORTED_PAYMENT_METHOD",
            AppError::InvalidTransition { .. } => "INVALID_TRANSITION",
            AppError::Gateway(_) => "PAYMENT_ERROR",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    /// Convert AppError ke HTTP response
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        let (message, details) = match &self {
            AppError::Database(msg) => {
                tracing::error!("Database error: {}", msg);
                ("Database operation failed".to_string(), None)
            }
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {}", msg);
                ("Service configuration error".to_string(), None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("Internal server error".to_string(), None)
            }
            AppError::Gateway(msg) => {
                tracing::error!("Payment gateway error: {}", msg);
                ("Payment error".to_string(), None)
            }
            AppError::CartValidation(issues) => (
                "Cart validation failed".to_string(),
                Some(serde_json::json!({ "errors": issues })),
            ),
            AppError::InsufficientStock { variation_id, requested } => (
                self.to_string(),
                Some(serde_json::json!({
                    "variation_id": variation_id,
                    "requested": requested,
                })),
            ),
            AppError::InsufficientFunds { balance, required } => (
                "Saldo wallet tidak cukup".to_string(),
                Some(serde_json::json!({
                    "balance": balance,
                    "required": required,
                })),
            ),
            AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::BadRequest(msg)
            | AppError::ValidationError(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg) => (msg.clone(), None),
            AppError::UnsupportedPaymentMethod(_) | AppError::InvalidTransition { .. } => {
                (self.to_string(), None)
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            message,
            error_code: Some(error_code.to_string()),
            details,
        });

        (status, body).into_response()
    }
}

// Implement conversions dari common error types
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                let constraint = db_err.constraint().unwrap_or("unique constraint").to_string();
                AppError::Conflict(format!("Data sudah ada ({})", constraint))
            }
            _ => AppError::Database(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Database(format!("Migration failed: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Gateway(err.to_string())
    }
}
