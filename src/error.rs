use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::rpc::RpcError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("JSON-RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Decoding error: {0}")]
    Decoding(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Timed out after {waited:?} waiting for receipt of tx {tx_hash}")]
    ReceiptTimeout { tx_hash: String, waited: Duration },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Configuration(_) => (StatusCode::SERVICE_UNAVAILABLE, "CONFIGURATION_ERROR"),
            AppError::Rpc(RpcError::Remote { .. }) => (StatusCode::BAD_GATEWAY, "RPC_REMOTE_ERROR"),
            AppError::Rpc(RpcError::Decoding(_)) => (StatusCode::BAD_GATEWAY, "RPC_DECODING_ERROR"),
            AppError::Rpc(RpcError::Transport(_)) => (StatusCode::BAD_GATEWAY, "RPC_TRANSPORT_ERROR"),
            AppError::Decoding(_) => (StatusCode::BAD_GATEWAY, "DECODING_ERROR"),
            AppError::Unsupported(_) => (StatusCode::UNPROCESSABLE_ENTITY, "UNSUPPORTED_OPERATION"),
            AppError::ReceiptTimeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "RECEIPT_TIMEOUT"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let details = match &self {
            AppError::Rpc(RpcError::Remote { code, .. }) => Some(serde_json::json!({ "rpc_code": code })),
            _ => None,
        };

        let body = Json(ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                details,
            },
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
