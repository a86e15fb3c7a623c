// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HouseHelp Network

//! Admin-only audit log queries.
//!
//! The audit trail is write-only for the verification core; this is the
//! one read surface, restricted to the Admin role.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    auth::AdminOnly,
    error::ApiError,
    state::AppState,
    storage::{AuditLogRepository, AuditRecord},
};

/// Query parameters for audit log queries.
#[derive(Debug, Deserialize, IntoParams)]
pub struct AuditQueryParams {
    /// Start date (YYYY-MM-DD). Defaults to today.
    pub start_date: Option<String>,
    /// End date (YYYY-MM-DD). Defaults to today.
    pub end_date: Option<String>,
    /// Filter by Aadhaar number under verification.
    pub subject_id: Option<String>,
    /// Filter by the user who triggered the call.
    pub actor_id: Option<String>,
    /// Filter by request kind (`token_acquisition`, `otp_request`,
    /// `otp_verify`).
    pub request_kind: Option<String>,
    /// Filter by outcome.
    pub succeeded: Option<bool>,
    /// Maximum number of results (default 100, max 1000).
    pub limit: Option<usize>,
    /// Offset for pagination.
    pub offset: Option<usize>,
}

/// Response for audit log queries.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuditLogResponse {
    /// Records matching the query, oldest first.
    pub entries: Vec<AuditRecord>,
    /// Total count (before limit/offset).
    pub total: usize,
    /// Whether there are more results.
    pub has_more: bool,
}

/// Query the provider interaction audit log.
#[utoipa::path(
    get,
    path = "/v1/admin/audit",
    tag = "Admin",
    params(AuditQueryParams),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Audit records", body = AuditLogResponse),
        (status = 400, description = "Invalid query parameters"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)")
    )
)]
pub async fn query_audit_log(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Query(params): Query<AuditQueryParams>,
) -> Result<Json<AuditLogResponse>, ApiError> {
    let storage = state.storage();
    let repo = AuditLogRepository::new(&storage);

    // Default date range: today only.
    let today = Utc::now().format("%Y-%m-%d").to_string();
    let start_date = params.start_date.as_deref().unwrap_or(&today);
    let end_date = params.end_date.as_deref().unwrap_or(&today);

    NaiveDate::parse_from_str(start_date, "%Y-%m-%d")
        .map_err(|_| ApiError::bad_request("Invalid start_date format. Use YYYY-MM-DD."))?;
    NaiveDate::parse_from_str(end_date, "%Y-%m-%d")
        .map_err(|_| ApiError::bad_request("Invalid end_date format. Use YYYY-MM-DD."))?;

    let mut entries = repo
        .read_records_range(start_date, end_date)
        .unwrap_or_default();

    if let Some(subject_id) = &params.subject_id {
        entries.retain(|e| e.subject_id.as_deref() == Some(subject_id.as_str()));
    }

    if let Some(actor_id) = &params.actor_id {
        entries.retain(|e| e.actor_id.as_deref() == Some(actor_id.as_str()));
    }

    if let Some(request_kind) = &params.request_kind {
        entries.retain(|e| e.request_kind.as_str() == request_kind.as_str());
    }

    if let Some(succeeded) = params.succeeded {
        entries.retain(|e| e.succeeded == succeeded);
    }

    let total = entries.len();
    let limit = params.limit.unwrap_or(100).min(1000);
    let offset = params.offset.unwrap_or(0);

    let has_more = offset + limit < total;
    let entries: Vec<AuditRecord> = entries.into_iter().skip(offset).take(limit).collect();

    Ok(Json(AuditLogResponse {
        entries,
        total,
        has_more,
    }))
}
