// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HouseHelp Network

//! # Verification Workflow
//!
//! The OTP-gated identity verification core: per-attempt state machine,
//! workflow orchestration, profile materialization, and the error
//! taxonomy callers branch on.

pub mod error;
pub mod materializer;
pub mod service;
pub mod session;

pub use error::{ProviderRejection, VerificationError};
pub use service::{
    CommittedProfile, FlowPhase, FlowStatus, OtpRequested, VerificationService, VerifyOutcome,
};
pub use session::{AttemptState, VerificationAttempt, VerificationFlow};
