//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Core errors keep their taxonomy all the way to the wire so a client can
//! distinguish "log in again" from "you can't do that" from "someone else
//! already claimed this".

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use hemo_core::Error as CoreError;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Missing, malformed, or expired session token.
  #[error("unauthorized")]
  Unauthorized,

  #[error(transparent)]
  Core(#[from] CoreError),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
      ApiError::Core(e) => {
        let status = match e {
          CoreError::AccountNotFound(_) | CoreError::RequestNotFound(_) => StatusCode::NOT_FOUND,
          CoreError::Forbidden(_) => StatusCode::FORBIDDEN,
          CoreError::Conflict(_) => StatusCode::CONFLICT,
          CoreError::InvalidInput(_) => StatusCode::BAD_REQUEST,
          CoreError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, e.to_string())
      }
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
