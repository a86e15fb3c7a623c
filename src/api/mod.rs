// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HouseHelp Network

//! # HTTP API Module
//!
//! Axum routes for the verification service: the verification workflow
//! operations, profile reads, the admin audit query, and health probes.
//! OpenAPI documentation is served at `/docs`.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    state::AppState,
    storage::{
        AddressComponents, AuditRecord, AuditRequestKind, HelperProfileRecord, HelperType,
        LegacyAddress, OwnerProfileRecord, VerificationStatus,
    },
    verification::{FlowPhase, VerificationFlow},
};

pub mod admin;
pub mod health;
pub mod profiles;
pub mod verification;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/verification/otp", post(verification::request_otp))
        .route("/verification/otp/verify", post(verification::verify_otp))
        .route(
            "/verification/register",
            post(verification::complete_registration),
        )
        .route("/verification/status", get(verification::flow_status))
        .route("/verification", delete(verification::abandon_flow))
        .route("/profiles/me", get(profiles::my_profile))
        .route("/helpers/{helper_id}", get(profiles::get_helper))
        .route("/admin/audit", get(admin::query_audit_log));

    Router::new()
        .nest("/v1", v1_routes)
        .route("/health", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        verification::request_otp,
        verification::verify_otp,
        verification::complete_registration,
        verification::flow_status,
        verification::abandon_flow,
        profiles::my_profile,
        profiles::get_helper,
        admin::query_audit_log,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            verification::RequestOtpRequest,
            verification::RequestOtpResponse,
            verification::VerifyOtpRequest,
            verification::VerifyOtpResponse,
            verification::VerifyOutcomeKind,
            verification::CompleteRegistrationRequest,
            verification::FlowStatusResponse,
            admin::AuditLogResponse,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks,
            OwnerProfileRecord,
            HelperProfileRecord,
            HelperType,
            VerificationStatus,
            AddressComponents,
            LegacyAddress,
            AuditRecord,
            AuditRequestKind,
            VerificationFlow,
            FlowPhase
        )
    ),
    tags(
        (name = "Verification", description = "OTP-gated Aadhaar verification workflow"),
        (name = "Profiles", description = "Owner and helper profile reads"),
        (name = "Admin", description = "Audit log queries"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
