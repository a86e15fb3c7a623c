// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HouseHelp Network

//! Error taxonomy for the verification workflow.
//!
//! Callers branch on these tags only — provider free text is carried as
//! a human-readable message and never inspected outside the gateway's
//! classification function.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::storage::StorageError;

/// Classified provider rejection.
///
/// The first five subtypes come from OTP generation, the rest from OTP
/// verification; `Unknown` covers anything the classification table does
/// not recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProviderRejection {
    /// Subject id is malformed according to the provider.
    InvalidFormat,
    /// Subject id fails the provider's validity checks.
    InvalidSubject,
    /// No identity record exists for the subject.
    SubjectNotFound,
    /// Provider throttled the request.
    RateLimited,
    /// Provider is temporarily unable to serve the request.
    ServiceUnavailable,
    /// Wrong OTP; the same challenge may be retried.
    InvalidOtp,
    /// The OTP challenge has expired.
    Expired,
    /// Too many failed redemptions of this challenge.
    MaxAttemptsExceeded,
    /// The reference id does not match a live challenge.
    InvalidReference,
    /// Unclassified provider failure.
    Unknown,
}

impl ProviderRejection {
    /// Whether retrying the flow makes sense for the user.
    ///
    /// Permanent subject problems are not retryable; everything else is,
    /// though some subtypes require a fresh challenge first.
    pub fn retry_recommended(&self) -> bool {
        !matches!(
            self,
            ProviderRejection::InvalidFormat
                | ProviderRejection::InvalidSubject
                | ProviderRejection::SubjectNotFound
        )
    }

    /// Whether the current challenge reference must be discarded.
    pub fn must_regenerate(&self) -> bool {
        matches!(
            self,
            ProviderRejection::Expired
                | ProviderRejection::MaxAttemptsExceeded
                | ProviderRejection::InvalidReference
        )
    }
}

/// Tagged failure of a verification operation.
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    /// Input rejected before any network call.
    #[error("{0}")]
    InvalidInput(String),

    /// The provider refused our service credentials.
    #[error("provider authentication failed: {0}")]
    AuthFailure(String),

    /// The provider processed and rejected the request.
    #[error("{message}")]
    ProviderRejected {
        subtype: ProviderRejection,
        message: String,
    },

    /// A profile for this government id already exists.
    #[error("{0}")]
    DuplicateIdentity(String),

    /// Network or response-parse failure talking to the provider.
    #[error("provider request failed: {0}")]
    Transport(String),

    /// Local persistence failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl VerificationError {
    /// Stable machine code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            VerificationError::InvalidInput(_) => "invalid_input",
            VerificationError::AuthFailure(_) => "auth_failure",
            VerificationError::ProviderRejected { .. } => "provider_rejected",
            VerificationError::DuplicateIdentity(_) => "duplicate_identity",
            VerificationError::Transport(_) => "transport_error",
            VerificationError::Storage(_) => "storage_error",
        }
    }

    /// Whether the user should be invited to try again.
    pub fn retry_recommended(&self) -> bool {
        match self {
            VerificationError::InvalidInput(_) | VerificationError::DuplicateIdentity(_) => false,
            VerificationError::AuthFailure(_) | VerificationError::Transport(_) => true,
            VerificationError::ProviderRejected { subtype, .. } => subtype.retry_recommended(),
            VerificationError::Storage(_) => false,
        }
    }

    /// Whether the user must restart the flow from the beginning
    /// (as opposed to staying on the current step).
    pub fn restart_required(&self) -> bool {
        match self {
            VerificationError::InvalidInput(_) | VerificationError::DuplicateIdentity(_) => true,
            VerificationError::ProviderRejected { subtype, .. } => {
                !subtype.retry_recommended() || subtype.must_regenerate()
            }
            VerificationError::AuthFailure(_)
            | VerificationError::Transport(_)
            | VerificationError::Storage(_) => false,
        }
    }
}
