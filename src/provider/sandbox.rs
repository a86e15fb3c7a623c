// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HouseHelp Network

//! sandbox.co.in Aadhaar eKYC client.

use std::{sync::Arc, time::Duration};

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::{
    classify::{classify_otp_request_failure, classify_otp_verify_failure},
    CallContext, IdentityProvider, KycRecord, OtpChallenge,
};
use crate::storage::{AuditRecord, AuditRequestKind, AuditSink};
use crate::verification::VerificationError;

const DEFAULT_BASE_URL: &str = "https://api.sandbox.co.in";
const DEFAULT_API_VERSION: &str = "2.0";

const AUTHENTICATE_PATH: &str = "/authenticate";
const OTP_REQUEST_PATH: &str = "/kyc/aadhaar/okyc/otp";
const OTP_VERIFY_PATH: &str = "/kyc/aadhaar/okyc/otp/verify";

const OTP_REQUEST_ENTITY: &str = "in.co.sandbox.kyc.aadhaar.okyc.otp.request";
const OTP_VERIFY_ENTITY: &str = "in.co.sandbox.kyc.aadhaar.okyc.request";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Gateway configuration failure at startup.
#[derive(Debug, thiserror::Error)]
pub enum GatewayConfigError {
    #[error("sandbox API configuration missing: {0}")]
    MissingConfig(String),

    #[error("failed to build HTTP client: {0}")]
    Http(String),
}

/// Client for the sandbox.co.in KYC API.
///
/// Holds the process-wide cached bearer token. The cache mutex is held
/// across a refresh so concurrent callers hitting an expired token cause
/// a single refetch.
pub struct SandboxClient {
    base_url: String,
    api_key: String,
    api_secret: String,
    api_version: String,
    http: Client,
    token: Mutex<Option<String>>,
    audit: Arc<dyn AuditSink>,
}

impl std::fmt::Debug for SandboxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SandboxClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key)
            .field("api_secret", &self.api_secret)
            .field("api_version", &self.api_version)
            .field("http", &self.http)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

/// HTTP attempt outcome, before taxonomy mapping.
enum CallOutcome {
    Success(Value),
    Unauthorized(String, Value),
    Rejected(String, Value),
}

impl SandboxClient {
    /// Whether the required credentials are present in the environment.
    pub fn is_configured() -> bool {
        env_optional("SANDBOX_API_KEY").is_some() && env_optional("SANDBOX_API_SECRET").is_some()
    }

    /// Build a client from `SANDBOX_API_*` environment variables.
    pub fn from_env(audit: Arc<dyn AuditSink>) -> Result<Self, GatewayConfigError> {
        let base_url = env_or_default("SANDBOX_API_BASE_URL", DEFAULT_BASE_URL);
        let api_key = env_required("SANDBOX_API_KEY")?;
        let api_secret = env_required("SANDBOX_API_SECRET")?;
        let api_version = env_or_default("SANDBOX_API_VERSION", DEFAULT_API_VERSION);

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GatewayConfigError::Http(e.to_string()))?;

        Ok(Self {
            base_url,
            api_key,
            api_secret,
            api_version,
            http,
            token: Mutex::new(None),
            audit,
        })
    }

    /// Get the cached bearer token, fetching one if absent.
    async fn cached_token(&self, ctx: &CallContext) -> Result<String, VerificationError> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref() {
            return Ok(token.clone());
        }
        let token = self.fetch_access_token(ctx).await?;
        *guard = Some(token.clone());
        Ok(token)
    }

    /// Drop the cached token so the next call refetches.
    async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }

    /// Exchange static credentials for a bearer token.
    async fn fetch_access_token(&self, ctx: &CallContext) -> Result<String, VerificationError> {
        let url = format!("{}{AUTHENTICATE_PATH}", self.base_url.trim_end_matches('/'));
        let audit = AuditRecord::new(AuditRequestKind::TokenAcquisition)
            .with_context(ctx.actor_id.clone(), ctx.correlation_id.clone());

        let response = self
            .http
            .post(&url)
            .header("accept", "application/json")
            .header("x-api-key", &self.api_key)
            .header("x-api-secret", &self.api_secret)
            .header("x-api-version", &self.api_version)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(error) => {
                let message = format!("token request failed: {error}");
                self.audit.record(audit.failed(&message));
                return Err(VerificationError::Transport(message));
            }
        };

        let status = response.status();
        let body = read_body(response).await;

        if !status.is_success() {
            let message = format!("token request returned {status}: {}", extract_message(&body));
            self.audit
                .record(audit.with_response_payload(sanitize_token_response(body)).failed(&message));
            return Err(VerificationError::AuthFailure(message));
        }

        let token = body
            .get("access_token")
            .and_then(Value::as_str)
            .map(str::to_string)
            .filter(|token| !token.trim().is_empty());

        match token {
            Some(token) => {
                info!("acquired sandbox API access token");
                self.audit
                    .record(audit.with_response_payload(sanitize_token_response(body)));
                Ok(token)
            }
            None => {
                let message = "token response did not include access_token".to_string();
                self.audit
                    .record(audit.with_response_payload(sanitize_token_response(body)).failed(&message));
                Err(VerificationError::AuthFailure(message))
            }
        }
    }

    /// One authenticated POST to a KYC endpoint, audited.
    ///
    /// An authorization failure invalidates the cached token and retries
    /// exactly once with a fresh one.
    async fn post_kyc(
        &self,
        path: &str,
        kind: AuditRequestKind,
        payload: &Value,
        subject_id: Option<&str>,
        reference_id: Option<&str>,
        classify: fn(&str) -> crate::verification::ProviderRejection,
        ctx: &CallContext,
    ) -> Result<Value, VerificationError> {
        let mut refreshed = false;

        loop {
            let token = self.cached_token(ctx).await?;

            let mut audit = AuditRecord::new(kind)
                .with_request_payload(payload.clone())
                .with_context(ctx.actor_id.clone(), ctx.correlation_id.clone());
            if let Some(subject_id) = subject_id {
                audit = audit.with_subject(subject_id);
            }
            if let Some(reference_id) = reference_id {
                audit = audit.with_reference(reference_id);
            }

            match self.post_once(path, &token, payload).await {
                Err(message) => {
                    self.audit.record(audit.failed(&message));
                    return Err(VerificationError::Transport(message));
                }
                Ok(CallOutcome::Success(body)) => {
                    self.audit
                        .record(audit.with_response_payload(sanitize_kyc_response(kind, body.clone())));
                    return Ok(body);
                }
                Ok(CallOutcome::Unauthorized(message, body)) => {
                    self.audit
                        .record(audit.with_response_payload(sanitize_kyc_response(kind, body)).failed(&message));
                    if !refreshed {
                        warn!(path, "sandbox API rejected token, refetching once");
                        self.invalidate_token().await;
                        refreshed = true;
                        continue;
                    }
                    return Err(VerificationError::AuthFailure(message));
                }
                Ok(CallOutcome::Rejected(message, body)) => {
                    self.audit
                        .record(audit.with_response_payload(sanitize_kyc_response(kind, body)).failed(&message));
                    return Err(VerificationError::ProviderRejected {
                        subtype: classify(&message),
                        message,
                    });
                }
            }
        }
    }

    /// Single HTTP attempt. `Err` is a transport-level failure.
    async fn post_once(
        &self,
        path: &str,
        token: &str,
        payload: &Value,
    ) -> Result<CallOutcome, String> {
        let url = format!("{}{path}", self.base_url.trim_end_matches('/'));

        let response = self
            .http
            .post(&url)
            .header("accept", "application/json")
            .header("authorization", token)
            .header("x-api-key", &self.api_key)
            .header("x-api-version", &self.api_version)
            .json(payload)
            .send()
            .await
            .map_err(|e| format!("POST {path} failed: {e}"))?;

        let status = response.status();
        let body = read_body(response).await;

        if status.is_success() {
            Ok(CallOutcome::Success(body))
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let message = format!("POST {path} returned {status}: {}", extract_message(&body));
            Ok(CallOutcome::Unauthorized(message, body))
        } else {
            Ok(CallOutcome::Rejected(extract_message(&body), body))
        }
    }
}

impl IdentityProvider for SandboxClient {
    async fn request_otp(
        &self,
        subject_id: &str,
        ctx: &CallContext,
    ) -> Result<OtpChallenge, VerificationError> {
        validate_subject_id(subject_id)?;

        let payload = json!({
            "@entity": OTP_REQUEST_ENTITY,
            "aadhaar_number": subject_id,
            "consent": "Y",
            "reason": "kyc"
        });

        let body = self
            .post_kyc(
                OTP_REQUEST_PATH,
                AuditRequestKind::OtpRequest,
                &payload,
                Some(subject_id),
                None,
                classify_otp_request_failure,
                ctx,
            )
            .await?;

        let data = body.get("data").cloned().ok_or_else(|| {
            VerificationError::Transport("missing data in OTP response".to_string())
        })?;
        serde_json::from_value(data)
            .map_err(|e| VerificationError::Transport(format!("invalid OTP response: {e}")))
    }

    async fn verify_otp(
        &self,
        reference_id: &str,
        otp: &str,
        ctx: &CallContext,
    ) -> Result<KycRecord, VerificationError> {
        validate_otp(otp)?;

        let payload = json!({
            "@entity": OTP_VERIFY_ENTITY,
            "reference_id": reference_id,
            "otp": otp
        });

        let body = self
            .post_kyc(
                OTP_VERIFY_PATH,
                AuditRequestKind::OtpVerify,
                &payload,
                None,
                Some(reference_id),
                classify_otp_verify_failure,
                ctx,
            )
            .await?;

        let data = body.get("data").cloned().ok_or_else(|| {
            VerificationError::Transport("missing data in verification response".to_string())
        })?;
        serde_json::from_value(data)
            .map_err(|e| VerificationError::Transport(format!("invalid verification response: {e}")))
    }
}

/// Reject anything that is not exactly 12 ASCII digits, before any I/O.
pub fn validate_subject_id(subject_id: &str) -> Result<(), VerificationError> {
    if subject_id.len() == 12 && subject_id.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(VerificationError::InvalidInput(
            "Aadhaar number must be exactly 12 digits".to_string(),
        ))
    }
}

/// Reject anything that is not exactly 6 ASCII digits, before any I/O.
pub fn validate_otp(otp: &str) -> Result<(), VerificationError> {
    if otp.len() == 6 && otp.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(VerificationError::InvalidInput(
            "OTP must be exactly 6 digits".to_string(),
        ))
    }
}

/// Parse a response body as JSON, wrapping non-JSON bodies.
async fn read_body(response: reqwest::Response) -> Value {
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str(&text).unwrap_or_else(|_| json!({ "raw": text }))
}

/// Pull the human-readable failure message out of a provider body.
fn extract_message(body: &Value) -> String {
    body.get("message")
        .and_then(Value::as_str)
        .or_else(|| body.pointer("/data/message").and_then(Value::as_str))
        .or_else(|| body.get("error").and_then(Value::as_str))
        .or_else(|| body.get("raw").and_then(Value::as_str))
        .unwrap_or("no message in provider response")
        .to_string()
}

/// Token response snapshot with the token value redacted.
fn sanitize_token_response(mut body: Value) -> Value {
    if let Some(token) = body.get_mut("access_token") {
        *token = Value::String("<redacted>".to_string());
    }
    body
}

/// KYC response snapshot; the verify payload's photo blob is dropped.
fn sanitize_kyc_response(kind: AuditRequestKind, mut body: Value) -> Value {
    if kind == AuditRequestKind::OtpVerify {
        if let Some(photo) = body.pointer_mut("/data/photo") {
            *photo = Value::String("<omitted>".to_string());
        }
    }
    body
}

fn env_optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_required(name: &str) -> Result<String, GatewayConfigError> {
    env_optional(name).ok_or_else(|| GatewayConfigError::MissingConfig(name.to_string()))
}

fn env_or_default(name: &str, default: &str) -> String {
    env_optional(name).unwrap_or_else(|| default.to_string())
}
