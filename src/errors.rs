//! Request-level error taxonomy for the gateway.
//!
//! Every failure crossing the handler boundary is converted into one of
//! these variants; nothing internal (SQL errors, transport errors, secret
//! material) is exposed to the client beyond a short message, plus a
//! truncated diagnostic slice for remote-store failures.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Malformed or unsafe client input (400).
    #[error("{0}")]
    Validation(String),

    /// Missing or rejected credential (401).
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not permitted (403).
    #[error("{0}")]
    Forbidden(String),

    /// No matching record (404).
    #[error("{0}")]
    NotFound(String),

    /// Missing or inconsistent server-side configuration (500).
    #[error("{0}")]
    Config(String),

    /// The remote object store rejected or failed the request (502).
    /// `detail` is a bounded slice of the provider response, safe to echo.
    #[error("remote store failure: {message}")]
    RemoteStore { message: String, detail: String },

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            GatewayError::Forbidden(_) => StatusCode::FORBIDDEN,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Config(_) | GatewayError::Database(_) | GatewayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            GatewayError::RemoteStore { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            GatewayError::RemoteStore { message, detail } => Json(json!({
                "error": message,
                "detail": detail,
            })),
            GatewayError::Database(err) => {
                tracing::error!("database error: {}", err);
                Json(json!({ "error": "internal server error" }))
            }
            GatewayError::Internal(err) => {
                tracing::error!("internal error: {:#}", err);
                Json(json!({ "error": "internal server error" }))
            }
            other => Json(json!({ "error": other.to_string() })),
        };

        (status, body).into_response()
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
