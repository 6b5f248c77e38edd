//! JSON error envelope for API responses.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dkgpedia_core::DkgError;
use serde::Serialize;
use tracing::{error, warn};

/// `{error, details?}` with an HTTP status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl From<DkgError> for ApiError {
    fn from(err: DkgError) -> Self {
        match &err {
            DkgError::Validation(msg) => Self::bad_request(msg.clone()),
            DkgError::Upstream { service, status, body } => {
                warn!(%service, status, "Upstream returned an error");
                let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY);
                Self::new(status, format!("{} request failed", service)).with_details(body.clone())
            }
            DkgError::Unreachable { service, message } => {
                error!(%service, %message, "Upstream unreachable");
                Self::new(StatusCode::BAD_GATEWAY, format!("Failed to reach {}", service))
                    .with_details(message.clone())
            }
            DkgError::Timeout(service) => {
                Self::new(StatusCode::GATEWAY_TIMEOUT, format!("{} request timed out", service))
            }
            DkgError::PaymentRejected | DkgError::Payment(_) => {
                Self::new(StatusCode::PAYMENT_REQUIRED, err.to_string())
            }
            DkgError::Json(e) => {
                Self::new(StatusCode::BAD_GATEWAY, "Invalid response from upstream").with_details(e.to_string())
            }
            _ => {
                error!(error = %err, "Internal error");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
                    .with_details(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request("Invalid JSON body").with_details(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request("Invalid query string").with_details(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: &self.message,
            details: self.details.as_deref(),
        };
        (self.status, Json(body)).into_response()
    }
}

/// Trimmed, non-empty value or a 400 with `message`.
pub fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let err: ApiError = DkgError::Timeout("knowledge graph").into();
        assert_eq!(err.status, StatusCode::GATEWAY_TIMEOUT);

        let err: ApiError = DkgError::unreachable("analysis engine", "refused").into();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert_eq!(err.message, "Failed to reach analysis engine");

        let err: ApiError = DkgError::Upstream {
            service: "article scraper",
            status: 404,
            body: "{}".into(),
        }
        .into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let err: ApiError = DkgError::validation("Topic is required").into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err: ApiError = DkgError::PaymentRejected.into();
        assert_eq!(err.status, StatusCode::PAYMENT_REQUIRED);
    }

    #[test]
    fn test_required() {
        assert_eq!(required(Some(" Cattle ".into()), "x").unwrap(), "Cattle");
        assert!(required(Some("  ".into()), "x").is_err());
        assert!(required(None, "x").is_err());
    }
}
