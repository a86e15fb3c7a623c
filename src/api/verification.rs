// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HouseHelp Network

//! Verification workflow endpoints.
//!
//! Thin handlers over [`VerificationService`]: request an OTP challenge,
//! redeem it, complete owner registration, inspect flow status, abandon.
//! All error branching happens on the taxonomy tags carried by
//! [`crate::error::ApiError`].

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    auth::Auth,
    error::ApiError,
    provider::SandboxClient,
    state::AppState,
    storage::{HelperProfileRecord, OwnerProfileRecord, VerificationStatus},
    verification::{
        CommittedProfile, FlowPhase, VerificationFlow, VerificationService, VerifyOutcome,
    },
};

/// Request body for OTP generation.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RequestOtpRequest {
    /// 12-digit Aadhaar number to verify.
    pub aadhaar_number: String,
    /// Which verification journey this is.
    pub flow: VerificationFlow,
    /// Target helper id (required for `helper_verification`).
    pub helper_id: Option<String>,
}

/// Response for a successful OTP request.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RequestOtpResponse {
    /// Challenge reference to pass back on verification.
    pub reference_id: String,
    /// Provider's delivery message, shown to the user.
    pub message: String,
}

/// Request body for OTP redemption.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct VerifyOtpRequest {
    /// 6-digit OTP received out-of-band.
    pub otp: String,
    /// Which verification journey this is.
    pub flow: VerificationFlow,
    /// Optional explicit challenge reference; must match the
    /// outstanding one when present.
    pub reference_id: Option<String>,
    /// Target helper id (helper verification only).
    pub helper_id: Option<String>,
}

/// How a successful verification concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VerifyOutcomeKind {
    /// Identity confirmed; owner must complete registration to commit.
    AwaitingRegistration,
    /// Identity confirmed and the profile updated in place.
    Committed,
}

/// Response for a successful OTP redemption.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VerifyOtpResponse {
    pub outcome: VerifyOutcomeKind,
    /// Committed owner profile (re-verification flow).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_profile: Option<OwnerProfileRecord>,
    /// Committed helper profile (helper verification flow).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub helper_profile: Option<HelperProfileRecord>,
}

/// Request body for owner registration completion.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CompleteRegistrationRequest {
    /// Contact number, 10 to 15 digits.
    pub phone_number: String,
}

/// Query selecting one verification flow.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct FlowQuery {
    /// Which verification journey to inspect.
    pub flow: VerificationFlow,
    /// Target helper id (helper verification only).
    pub helper_id: Option<String>,
}

/// Snapshot of one flow's state.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FlowStatusResponse {
    pub flow: VerificationFlow,
    pub phase: FlowPhase,
    /// Masked subject id ("XXXX-XXXX-1234") when an attempt exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_masked: Option<String>,
    /// Outstanding challenge reference, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
    /// Verification status of the target profile.
    pub profile_status: VerificationStatus,
}

/// Workflow service over the configured gateway, or 503 when the
/// provider credentials are absent.
fn service(state: &AppState) -> Result<VerificationService<SandboxClient>, ApiError> {
    let provider = state.provider().ok_or_else(|| {
        ApiError::service_unavailable(
            "eKYC provider is not configured. Set SANDBOX_API_KEY and SANDBOX_API_SECRET.",
        )
    })?;
    Ok(VerificationService::new(state.storage(), provider))
}

/// Request an OTP challenge for a subject.
#[utoipa::path(
    post,
    path = "/v1/verification/otp",
    tag = "Verification",
    request_body = RequestOtpRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "OTP challenge issued", body = RequestOtpResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Provider rejected the request"),
        (status = 503, description = "Provider unavailable")
    )
)]
pub async fn request_otp(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<RequestOtpRequest>,
) -> Result<Json<RequestOtpResponse>, ApiError> {
    let service = service(&state)?;
    let requested = service
        .request_otp(
            &user.user_id,
            request.flow,
            &request.aadhaar_number,
            request.helper_id.as_deref(),
        )
        .await?;

    Ok(Json(RequestOtpResponse {
        reference_id: requested.reference_id,
        message: requested.message,
    }))
}

/// Redeem the outstanding OTP challenge.
#[utoipa::path(
    post,
    path = "/v1/verification/otp/verify",
    tag = "Verification",
    request_body = VerifyOtpRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Identity verified", body = VerifyOtpResponse),
        (status = 400, description = "Invalid input or no outstanding challenge"),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Provider rejected the OTP"),
        (status = 503, description = "Provider unavailable")
    )
)]
pub async fn verify_otp(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<VerifyOtpRequest>,
) -> Result<Json<VerifyOtpResponse>, ApiError> {
    let service = service(&state)?;
    let outcome = service
        .verify_otp(
            &user.user_id,
            request.flow,
            &request.otp,
            request.reference_id.as_deref(),
            request.helper_id.as_deref(),
        )
        .await?;

    let response = match outcome {
        VerifyOutcome::AwaitingRegistration => VerifyOtpResponse {
            outcome: VerifyOutcomeKind::AwaitingRegistration,
            owner_profile: None,
            helper_profile: None,
        },
        VerifyOutcome::Committed(CommittedProfile::Owner(profile)) => VerifyOtpResponse {
            outcome: VerifyOutcomeKind::Committed,
            owner_profile: Some(*profile),
            helper_profile: None,
        },
        VerifyOutcome::Committed(CommittedProfile::Helper(profile)) => VerifyOtpResponse {
            outcome: VerifyOutcomeKind::Committed,
            owner_profile: None,
            helper_profile: Some(*profile),
        },
    };

    Ok(Json(response))
}

/// Commit a verified owner registration.
#[utoipa::path(
    post,
    path = "/v1/verification/register",
    tag = "Verification",
    request_body = CompleteRegistrationRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Owner profile created", body = OwnerProfileRecord),
        (status = 400, description = "Invalid input or no verified identity"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "A profile for this Aadhaar number already exists"),
        (status = 503, description = "Provider unavailable")
    )
)]
pub async fn complete_registration(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<CompleteRegistrationRequest>,
) -> Result<(StatusCode, Json<OwnerProfileRecord>), ApiError> {
    let service = service(&state)?;
    let profile = service.complete_registration(&user.user_id, &request.phone_number)?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// Inspect the state of a verification flow.
#[utoipa::path(
    get,
    path = "/v1/verification/status",
    tag = "Verification",
    params(FlowQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Flow status", body = FlowStatusResponse),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Provider unavailable")
    )
)]
pub async fn flow_status(
    Auth(user): Auth,
    State(state): State<AppState>,
    Query(query): Query<FlowQuery>,
) -> Result<Json<FlowStatusResponse>, ApiError> {
    let service = service(&state)?;
    let status = service.status(&user.user_id, query.flow, query.helper_id.as_deref())?;

    Ok(Json(FlowStatusResponse {
        flow: status.flow,
        phase: status.phase,
        subject_masked: status.subject_masked,
        reference_id: status.reference_id,
        profile_status: status.profile_status,
    }))
}

/// Abandon a verification flow, discarding any in-flight attempt.
#[utoipa::path(
    delete,
    path = "/v1/verification",
    tag = "Verification",
    params(FlowQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Flow abandoned"),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Provider unavailable")
    )
)]
pub async fn abandon_flow(
    Auth(user): Auth,
    State(state): State<AppState>,
    Query(query): Query<FlowQuery>,
) -> Result<StatusCode, ApiError> {
    let service = service(&state)?;
    service.abandon(&user.user_id, query.flow)?;
    Ok(StatusCode::NO_CONTENT)
}
