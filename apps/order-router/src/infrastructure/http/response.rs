//! HTTP response DTOs.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::application::ports::{BrokerError, ExecutionError, SchedulerError};
use crate::domain::order_execution::OrderError;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
}

/// Outcome of cancelling a schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelScheduleResponse {
    /// Job key.
    pub job_key: String,
    /// Whether a pending job was removed.
    pub cancelled: bool,
}

/// API error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Error code.
    pub code: String,
    /// Error message.
    pub message: String,
    /// Additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Error returned by handlers, rendered as [`ApiErrorResponse`].
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ApiErrorResponse,
}

impl ApiError {
    /// Error with an explicit status and code.
    pub fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiErrorResponse {
                code: code.to_string(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// 400 for malformed input the extractors accepted.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message)
    }

    /// HTTP status of this error.
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Error code of this error.
    pub fn code(&self) -> &str {
        &self.body.code
    }
}

const fn classify(err: &ExecutionError) -> (StatusCode, &'static str) {
    match err {
        ExecutionError::Order(OrderError::InvalidParameters { .. }) => {
            (StatusCode::BAD_REQUEST, "INVALID_ORDER")
        }
        ExecutionError::Order(OrderError::NotFound { .. } | OrderError::ScheduleNotFound { .. }) => {
            (StatusCode::NOT_FOUND, "NOT_FOUND")
        }
        ExecutionError::Order(
            OrderError::InvalidStateTransition { .. } | OrderError::AlreadyExecuting { .. },
        ) => (StatusCode::CONFLICT, "INVALID_STATE"),
        ExecutionError::AccountNotFound { .. } => (StatusCode::NOT_FOUND, "ACCOUNT_NOT_FOUND"),
        ExecutionError::AccessDenied { .. } => (StatusCode::FORBIDDEN, "ACCESS_DENIED"),
        ExecutionError::Broker(broker) => match broker {
            BrokerError::UnknownBroker { .. } => (StatusCode::BAD_REQUEST, "UNKNOWN_BROKER"),
            BrokerError::Unsupported { .. } => (StatusCode::NOT_IMPLEMENTED, "UNSUPPORTED"),
            BrokerError::Mapping { .. } => (StatusCode::BAD_REQUEST, "MAPPING_ERROR"),
            BrokerError::AuthenticationFailed { .. } | BrokerError::CredentialsMissing { .. } => {
                (StatusCode::UNAUTHORIZED, "BROKER_AUTH_FAILED")
            }
            BrokerError::VendorRejected { .. } => (StatusCode::BAD_GATEWAY, "BROKER_REJECTED"),
            BrokerError::Transport { .. } => (StatusCode::BAD_GATEWAY, "BROKER_UNAVAILABLE"),
        },
        ExecutionError::Scheduler(SchedulerError::ShutDown) => {
            (StatusCode::SERVICE_UNAVAILABLE, "SCHEDULER_SHUT_DOWN")
        }
        ExecutionError::Scheduler(SchedulerError::Store(_))
        | ExecutionError::Order(OrderError::Storage(_))
        | ExecutionError::AccountStore(_)
        | ExecutionError::Vault(_)
        | ExecutionError::Task(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    }
}

impl From<ExecutionError> for ApiError {
    fn from(err: ExecutionError) -> Self {
        let (status, code) = classify(&err);
        if status.is_server_error() {
            tracing::error!(error = %err, code, "Request failed");
        } else {
            tracing::debug!(error = %err, code, "Request rejected");
        }
        Self::new(status, code, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
