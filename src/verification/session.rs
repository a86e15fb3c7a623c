// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HouseHelp Network

//! Verification attempt state.
//!
//! One attempt exists per (actor, flow) slot. State is a tagged enum,
//! not a bag of optional keys: a verify call can only proceed from
//! `OtpPending`, and registration completion only from `Verified`.
//! A fresh OTP request replaces the record wholesale; terminal
//! outcomes delete it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::provider::KycRecord;
use crate::storage::{JsonStore, StorageResult};

/// Which verification journey an attempt belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VerificationFlow {
    /// First-time owner onboarding; ends with profile creation.
    OwnerRegistration,
    /// Refresh of an existing owner's identity data.
    OwnerReVerification,
    /// Verification of a helper by the owner who registered them.
    HelperVerification,
}

impl VerificationFlow {
    /// Storage slot name for this flow.
    pub fn slot(&self) -> &'static str {
        match self {
            VerificationFlow::OwnerRegistration => "owner-registration",
            VerificationFlow::OwnerReVerification => "owner-reverification",
            VerificationFlow::HelperVerification => "helper-verification",
        }
    }
}

/// Where an attempt stands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum AttemptState {
    /// An OTP challenge is outstanding.
    OtpPending {
        /// Subject id the challenge was issued for.
        subject_id: String,
        /// Provider challenge reference; valid for one redemption window.
        reference_id: String,
        /// When the challenge was issued.
        requested_at: DateTime<Utc>,
    },
    /// Identity confirmed; awaiting registration completion
    /// (OwnerRegistration only).
    Verified {
        /// Subject id that was verified.
        subject_id: String,
        /// The provider's identity payload, parked until commit.
        identity: KycRecord,
        /// When verification succeeded.
        verified_at: DateTime<Utc>,
    },
}

impl AttemptState {
    pub fn subject_id(&self) -> &str {
        match self {
            AttemptState::OtpPending { subject_id, .. }
            | AttemptState::Verified { subject_id, .. } => subject_id,
        }
    }
}

/// A persisted in-flight verification attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationAttempt {
    /// Actor driving the flow.
    pub actor_id: String,
    /// Which journey this is.
    pub flow: VerificationFlow,
    /// Target helper (HelperVerification only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub helper_id: Option<String>,
    /// Stamped on every audit entry of this attempt.
    pub correlation_id: String,
    /// Current state.
    pub state: AttemptState,
    /// Last transition time.
    pub updated_at: DateTime<Utc>,
}

impl VerificationAttempt {
    /// Start a fresh attempt with an outstanding OTP challenge.
    pub fn otp_pending(
        actor_id: String,
        flow: VerificationFlow,
        helper_id: Option<String>,
        subject_id: String,
        reference_id: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            actor_id,
            flow,
            helper_id,
            correlation_id: uuid::Uuid::new_v4().to_string(),
            state: AttemptState::OtpPending {
                subject_id,
                reference_id,
                requested_at: now,
            },
            updated_at: now,
        }
    }

    /// Advance to `Verified`, parking the identity payload.
    pub fn into_verified(mut self, identity: KycRecord) -> Self {
        let now = Utc::now();
        let subject_id = self.state.subject_id().to_string();
        self.state = AttemptState::Verified {
            subject_id,
            identity,
            verified_at: now,
        };
        self.updated_at = now;
        self
    }
}

/// Repository for in-flight attempts, one slot per (actor, flow).
pub struct VerificationSessionRepository<'a> {
    store: &'a JsonStore,
}

impl<'a> VerificationSessionRepository<'a> {
    pub fn new(store: &'a JsonStore) -> Self {
        Self { store }
    }

    /// Load the attempt in an actor's flow slot, if any.
    pub fn get(
        &self,
        actor_id: &str,
        flow: VerificationFlow,
    ) -> StorageResult<Option<VerificationAttempt>> {
        let path = self
            .store
            .paths()
            .verification_attempt(actor_id, flow.slot());
        if !self.store.exists(&path) {
            return Ok(None);
        }
        self.store.read_json(path).map(Some)
    }

    /// Store an attempt, replacing whatever the slot held.
    pub fn put(&self, attempt: &VerificationAttempt) -> StorageResult<()> {
        let path = self
            .store
            .paths()
            .verification_attempt(&attempt.actor_id, attempt.flow.slot());
        self.store.write_json(path, attempt)
    }

    /// Clear an actor's flow slot. Idempotent.
    pub fn clear(&self, actor_id: &str, flow: VerificationFlow) -> StorageResult<()> {
        let path = self
            .store
            .paths()
            .verification_attempt(actor_id, flow.slot());
        if self.store.exists(&path) {
            self.store.delete(&path)?;
        }
        Ok(())
    }
}
