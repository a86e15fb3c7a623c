// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HouseHelp Network

//! API error responses.
//!
//! Verification failures carry their taxonomy tag, a retry hint, and
//! whether the user must restart the flow — route callers and the web
//! frontend branch on those fields, never on message text.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::verification::VerificationError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    /// Stable machine code ("invalid_input", "provider_rejected", ...).
    pub code: Option<&'static str>,
    /// Whether the user should be invited to try again.
    pub retry_recommended: Option<bool>,
    /// Whether the user must restart the flow from the beginning.
    pub restart_required: Option<bool>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_recommended: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    restart_required: Option<bool>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: None,
            retry_recommended: None,
            restart_required: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

impl From<VerificationError> for ApiError {
    fn from(error: VerificationError) -> Self {
        let status = match &error {
            VerificationError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            VerificationError::ProviderRejected { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            VerificationError::DuplicateIdentity(_) => StatusCode::CONFLICT,
            VerificationError::AuthFailure(_) | VerificationError::Transport(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            VerificationError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &error {
            // Disk-level detail stays in the server logs.
            VerificationError::Storage(_) => "Internal storage error".to_string(),
            other => other.to_string(),
        };

        Self {
            status,
            message,
            code: Some(error.code()),
            retry_recommended: Some(error.retry_recommended()),
            restart_required: Some(error.restart_required()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            code: self.code,
            retry_recommended: self.retry_recommended,
            restart_required: self.restart_required,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verification::ProviderRejection;
    use axum::body::to_bytes;

    #[test]
    fn constructors_set_status_and_message() {
        let nf = ApiError::not_found("missing");
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "missing");

        let bad = ApiError::bad_request("bad");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);
        assert!(bad.code.is_none());
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::bad_request("bad data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"bad data"}"#);
    }

    #[tokio::test]
    async fn verification_errors_carry_taxonomy_fields() {
        let error = VerificationError::ProviderRejected {
            subtype: ProviderRejection::Expired,
            message: "OTP has expired".to_string(),
        };
        let response = ApiError::from(error).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["code"], "provider_rejected");
        assert_eq!(body["retry_recommended"], true);
        assert_eq!(body["restart_required"], true);
    }

    #[test]
    fn duplicate_identity_maps_to_conflict() {
        let api: ApiError = VerificationError::DuplicateIdentity("taken".to_string()).into();
        assert_eq!(api.status, StatusCode::CONFLICT);
        assert_eq!(api.retry_recommended, Some(false));
    }

    #[test]
    fn storage_error_message_is_generic() {
        let api: ApiError = VerificationError::Storage(
            crate::storage::StorageError::NotInitialized,
        )
        .into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.message, "Internal storage error");
    }
}
