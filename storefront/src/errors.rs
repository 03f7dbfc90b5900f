// greenhouse_storefront/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use greenhouse_flow::FlowError;
use serde_json::json;
use thiserror::Error;

use crate::cart::CartError;
use crate::models::status::InvalidTransition;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Required: {0}")]
  Auth(String),

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  /// Duplicate bids, invalid status transitions and stale compare-and-set writes.
  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Store Error: {0}")]
  Store(String),

  #[error("Cart Storage Error: {0}")]
  Cart(String),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<StoreError> for AppError {
  fn from(err: StoreError) -> Self {
    match err {
      StoreError::NotFound(m) => AppError::NotFound(m),
      StoreError::Conflict(m) => AppError::Conflict(m),
      other => AppError::Store(other.to_string()),
    }
  }
}

impl From<CartError> for AppError {
  fn from(err: CartError) -> Self {
    AppError::Cart(err.to_string())
  }
}

impl From<InvalidTransition> for AppError {
  fn from(err: InvalidTransition) -> Self {
    AppError::Conflict(err.to_string())
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Forbidden(_) => StatusCode::FORBIDDEN,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Conflict(_) => StatusCode::CONFLICT,
      AppError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
      AppError::Config(_) | AppError::Cart(_) | AppError::Workflow { .. } | AppError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn error_response(&self) -> HttpResponse {
    tracing::error!(application_error = %self, "Responding with error");
    let status = self.status_code();
    match self {
      AppError::Validation(m)
      | AppError::Auth(m)
      | AppError::Forbidden(m)
      | AppError::NotFound(m)
      | AppError::Conflict(m) => HttpResponse::build(status).json(json!({"error": m})),
      AppError::Config(m) => HttpResponse::build(status).json(json!({"error": "Configuration issue", "detail": m})),
      AppError::Store(m) => HttpResponse::build(status).json(json!({"error": "Store operation failed", "detail": m})),
      AppError::Cart(m) => HttpResponse::build(status).json(json!({"error": "Cart could not be saved", "detail": m})),
      AppError::Workflow { source } => {
        tracing::error!(flow_error_source = ?source, "Workflow error details");
        HttpResponse::build(status).json(json!({"error": "Workflow processing error", "detail": source.to_string()}))
      }
      AppError::Internal(m) => {
        HttpResponse::build(status).json(json!({"error": "An internal error occurred", "detail": m}))
      }
    }
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
