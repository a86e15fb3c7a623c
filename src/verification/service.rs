// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HouseHelp Network

//! Verification workflow orchestration.
//!
//! Drives one attempt per (actor, flow) through the OTP state machine:
//!
//! ```text
//! UNSTARTED --(request_otp ok)--> OTP_PENDING
//! OTP_PENDING --(verify_otp ok)--> committed / awaiting registration
//! OTP_PENDING --(retryable failure)--> OTP_PENDING
//! OTP_PENDING --(must-regenerate failure)--> UNSTARTED
//! any --(abandon)--> UNSTARTED
//! ```
//!
//! Generic over [`IdentityProvider`] so the state machine is exercised
//! against a scripted provider in tests.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::provider::{CallContext, IdentityProvider};
use crate::storage::{
    HelperProfileRecord, HelperProfileRepository, JsonStore, OwnerProfileRecord,
    OwnerProfileRepository, StorageError, VerificationStatus,
};

use super::error::VerificationError;
use super::materializer::{
    create_owner_profile, materialize_helper_profile, materialize_owner_profile,
};
use super::session::{
    AttemptState, VerificationAttempt, VerificationFlow, VerificationSessionRepository,
};
use crate::storage::repository::owners::masked_tail;
use crate::storage::HelperType;

/// Result of a successful OTP request.
#[derive(Debug, Clone)]
pub struct OtpRequested {
    /// Challenge reference to be redeemed by the verify step.
    pub reference_id: String,
    /// Provider's delivery message, shown to the user.
    pub message: String,
}

/// Profile committed by a successful verification.
#[derive(Debug, Clone)]
pub enum CommittedProfile {
    Owner(Box<OwnerProfileRecord>),
    Helper(Box<HelperProfileRecord>),
}

/// Result of a successful OTP redemption.
#[derive(Debug, Clone)]
pub enum VerifyOutcome {
    /// Identity confirmed and parked; the caller must complete
    /// registration to commit it (OwnerRegistration only).
    AwaitingRegistration,
    /// Identity confirmed and the profile updated in place.
    Committed(CommittedProfile),
}

/// Observable phase of a flow, for the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FlowPhase {
    /// No attempt in flight.
    Unstarted,
    /// An OTP challenge is outstanding.
    OtpPending,
    /// Identity verified, registration completion pending.
    AwaitingRegistration,
}

/// Snapshot of one flow for the status endpoint.
#[derive(Debug, Clone)]
pub struct FlowStatus {
    pub flow: VerificationFlow,
    pub phase: FlowPhase,
    /// Masked subject id ("XXXX-XXXX-1234") when an attempt exists.
    pub subject_masked: Option<String>,
    /// Outstanding challenge reference, when in `OtpPending`.
    pub reference_id: Option<String>,
    /// Verification status of the target profile.
    pub profile_status: VerificationStatus,
}

fn restart_error() -> VerificationError {
    VerificationError::InvalidInput(
        "Please start the verification process again".to_string(),
    )
}

fn mask_subject(subject_id: &str) -> String {
    format!("XXXX-XXXX-{}", masked_tail(subject_id))
}

/// Validate a registration contact number: 10 to 15 digits.
fn validate_phone_number(phone_number: &str) -> Result<(), VerificationError> {
    let len = phone_number.len();
    if (10..=15).contains(&len) && phone_number.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(VerificationError::InvalidInput(
            "Phone number must be 10 to 15 digits".to_string(),
        ))
    }
}

/// The verification workflow.
#[derive(Debug)]
pub struct VerificationService<P> {
    store: JsonStore,
    provider: Arc<P>,
}

impl<P: IdentityProvider> VerificationService<P> {
    pub fn new(store: JsonStore, provider: Arc<P>) -> Self {
        Self { store, provider }
    }

    /// Access to the underlying store for the route layer's reads.
    pub fn store(&self) -> &JsonStore {
        &self.store
    }

    /// Start (or restart) a flow by requesting an OTP challenge.
    ///
    /// A successful request replaces the attempt slot; a failed one
    /// leaves any prior attempt untouched.
    pub async fn request_otp(
        &self,
        actor_id: &str,
        flow: VerificationFlow,
        subject_id: &str,
        helper_id: Option<&str>,
    ) -> Result<OtpRequested, VerificationError> {
        let helper_id = self.check_flow_preconditions(actor_id, flow, subject_id, helper_id)?;

        let correlation_id = uuid::Uuid::new_v4().to_string();
        let ctx = CallContext::new(actor_id, correlation_id.clone());
        let challenge = self.provider.request_otp(subject_id, &ctx).await?;

        let mut attempt = VerificationAttempt::otp_pending(
            actor_id.to_string(),
            flow,
            helper_id,
            subject_id.to_string(),
            challenge.reference_id.clone(),
        );
        attempt.correlation_id = correlation_id;

        VerificationSessionRepository::new(&self.store).put(&attempt)?;

        info!(
            actor_id,
            flow = flow.slot(),
            subject = %mask_subject(subject_id),
            "OTP challenge issued"
        );

        Ok(OtpRequested {
            reference_id: challenge.reference_id,
            message: challenge.message,
        })
    }

    /// Redeem the outstanding OTP challenge for a flow.
    ///
    /// Requires an `OtpPending` attempt created by a prior successful
    /// `request_otp`; a missing attempt, a mismatching explicit
    /// reference id, or a mismatching helper id is rejected without a
    /// provider call.
    pub async fn verify_otp(
        &self,
        actor_id: &str,
        flow: VerificationFlow,
        otp: &str,
        reference_id: Option<&str>,
        helper_id: Option<&str>,
    ) -> Result<VerifyOutcome, VerificationError> {
        let sessions = VerificationSessionRepository::new(&self.store);

        let Some(attempt) = sessions.get(actor_id, flow)? else {
            return Err(restart_error());
        };

        let (subject_id, stored_reference) = match &attempt.state {
            AttemptState::OtpPending {
                subject_id,
                reference_id,
                ..
            } => (subject_id.clone(), reference_id.clone()),
            AttemptState::Verified { .. } => {
                return Err(VerificationError::InvalidInput(
                    "Identity already verified; complete your registration".to_string(),
                ));
            }
        };

        // A forged or stale reference id never reaches the provider.
        if let Some(explicit) = reference_id {
            if explicit != stored_reference {
                return Err(VerificationError::InvalidInput(
                    "Reference id does not match the outstanding OTP challenge".to_string(),
                ));
            }
        }

        if flow == VerificationFlow::HelperVerification {
            if let Some(requested) = helper_id {
                if attempt.helper_id.as_deref() != Some(requested) {
                    return Err(VerificationError::InvalidInput(
                        "Invalid verification request".to_string(),
                    ));
                }
            }
        }

        let ctx = CallContext::new(actor_id, attempt.correlation_id.clone());
        let identity = match self.provider.verify_otp(&stored_reference, otp, &ctx).await {
            Ok(identity) => identity,
            Err(error) => {
                // A consumed challenge cannot be redeemed again.
                if let VerificationError::ProviderRejected { subtype, .. } = &error {
                    if subtype.must_regenerate() {
                        sessions.clear(actor_id, flow)?;
                        info!(
                            actor_id,
                            flow = flow.slot(),
                            "challenge discarded, regeneration required"
                        );
                    }
                }
                return Err(error);
            }
        };

        match flow {
            VerificationFlow::OwnerRegistration => {
                sessions.put(&attempt.into_verified(identity))?;
                Ok(VerifyOutcome::AwaitingRegistration)
            }
            VerificationFlow::OwnerReVerification => {
                sessions.clear(actor_id, flow)?;
                let profile =
                    materialize_owner_profile(&self.store, actor_id, &subject_id, &identity)?;
                info!(actor_id, "owner identity verified");
                Ok(VerifyOutcome::Committed(CommittedProfile::Owner(Box::new(
                    profile,
                ))))
            }
            VerificationFlow::HelperVerification => {
                sessions.clear(actor_id, flow)?;
                let target = attempt.helper_id.clone().ok_or_else(restart_error)?;
                let profile = materialize_helper_profile(&self.store, &target, &identity)?;
                info!(actor_id, helper_id = %target, "helper identity verified");
                Ok(VerifyOutcome::Committed(CommittedProfile::Helper(
                    Box::new(profile),
                )))
            }
        }
    }

    /// Commit a parked owner registration.
    pub fn complete_registration(
        &self,
        actor_id: &str,
        phone_number: &str,
    ) -> Result<OwnerProfileRecord, VerificationError> {
        validate_phone_number(phone_number)?;

        let sessions = VerificationSessionRepository::new(&self.store);
        let Some(attempt) = sessions.get(actor_id, VerificationFlow::OwnerRegistration)? else {
            return Err(restart_error());
        };

        let AttemptState::Verified {
            subject_id,
            identity,
            ..
        } = &attempt.state
        else {
            return Err(restart_error());
        };

        let result = create_owner_profile(
            &self.store,
            actor_id,
            subject_id,
            identity,
            phone_number.to_string(),
        );

        match result {
            Ok(profile) => {
                sessions.clear(actor_id, VerificationFlow::OwnerRegistration)?;
                info!(actor_id, "owner registration completed");
                Ok(profile)
            }
            Err(error @ VerificationError::DuplicateIdentity(_)) => {
                // Terminal for this attempt; the parked payload is discarded.
                sessions.clear(actor_id, VerificationFlow::OwnerRegistration)?;
                Err(error)
            }
            Err(error) => Err(error),
        }
    }

    /// Snapshot of a flow's state for the status endpoint.
    pub fn status(
        &self,
        actor_id: &str,
        flow: VerificationFlow,
        helper_id: Option<&str>,
    ) -> Result<FlowStatus, VerificationError> {
        let sessions = VerificationSessionRepository::new(&self.store);
        let attempt = sessions.get(actor_id, flow)?;

        let (phase, subject_masked, reference_id) = match attempt.as_ref().map(|a| &a.state) {
            None => (FlowPhase::Unstarted, None, None),
            Some(AttemptState::OtpPending {
                subject_id,
                reference_id,
                ..
            }) => (
                FlowPhase::OtpPending,
                Some(mask_subject(subject_id)),
                Some(reference_id.clone()),
            ),
            Some(AttemptState::Verified { subject_id, .. }) => (
                FlowPhase::AwaitingRegistration,
                Some(mask_subject(subject_id)),
                None,
            ),
        };

        let profile_status = match flow {
            VerificationFlow::OwnerRegistration | VerificationFlow::OwnerReVerification => {
                match OwnerProfileRepository::new(&self.store).get(actor_id) {
                    Ok(profile) => profile.verification_status,
                    Err(StorageError::NotFound(_)) => VerificationStatus::Unverified,
                    Err(error) => return Err(error.into()),
                }
            }
            VerificationFlow::HelperVerification => {
                let target = attempt
                    .as_ref()
                    .and_then(|a| a.helper_id.clone())
                    .or_else(|| helper_id.map(str::to_string));
                match target {
                    Some(target) => match HelperProfileRepository::new(&self.store).get(&target) {
                        Ok(profile) => profile.verification_status,
                        Err(StorageError::NotFound(_)) => VerificationStatus::Unverified,
                        Err(error) => return Err(error.into()),
                    },
                    None => VerificationStatus::Unverified,
                }
            }
        };

        Ok(FlowStatus {
            flow,
            phase,
            subject_masked,
            reference_id,
            profile_status,
        })
    }

    /// Drop any in-flight attempt for a flow. Idempotent.
    pub fn abandon(&self, actor_id: &str, flow: VerificationFlow) -> Result<(), VerificationError> {
        VerificationSessionRepository::new(&self.store).clear(actor_id, flow)?;
        Ok(())
    }

    /// Flow-specific guards, before any provider traffic.
    ///
    /// Returns the helper id the attempt should carry.
    fn check_flow_preconditions(
        &self,
        actor_id: &str,
        flow: VerificationFlow,
        subject_id: &str,
        helper_id: Option<&str>,
    ) -> Result<Option<String>, VerificationError> {
        match flow {
            VerificationFlow::OwnerRegistration => {
                if OwnerProfileRepository::new(&self.store).exists(actor_id) {
                    return Err(VerificationError::InvalidInput(
                        "An owner profile already exists for this account; use re-verification"
                            .to_string(),
                    ));
                }
                Ok(None)
            }
            VerificationFlow::OwnerReVerification => Ok(None),
            VerificationFlow::HelperVerification => {
                let Some(helper_id) = helper_id else {
                    return Err(VerificationError::InvalidInput(
                        "helper_id is required for helper verification".to_string(),
                    ));
                };

                let helper = match HelperProfileRepository::new(&self.store).get(helper_id) {
                    Ok(helper) => helper,
                    Err(StorageError::NotFound(_)) => {
                        return Err(VerificationError::InvalidInput(format!(
                            "No helper profile found for {helper_id}"
                        )));
                    }
                    Err(error) => return Err(error.into()),
                };

                if helper.created_by != actor_id {
                    return Err(VerificationError::InvalidInput(
                        "You can only verify helpers that you have added".to_string(),
                    ));
                }
                if helper.verification_status == VerificationStatus::Verified {
                    return Err(VerificationError::InvalidInput(
                        "This helper is already verified".to_string(),
                    ));
                }
                // For maids the profile key is the Aadhaar number itself.
                if helper.helper_type == HelperType::Maid && helper.helper_id != subject_id {
                    return Err(VerificationError::InvalidInput(
                        "The Aadhaar number does not match the one used during registration"
                            .to_string(),
                    ));
                }

                Ok(Some(helper_id.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{KycAddress, KycRecord, OtpChallenge};
    use crate::storage::StoragePaths;
    use crate::verification::ProviderRejection;
    use std::collections::VecDeque;
    use std::fs;
    use std::sync::Mutex as StdMutex;

    /// Provider double returning scripted results in order.
    #[derive(Default)]
    struct ScriptedProvider {
        otp_results: StdMutex<VecDeque<Result<OtpChallenge, VerificationError>>>,
        verify_results: StdMutex<VecDeque<Result<KycRecord, VerificationError>>>,
        otp_calls: StdMutex<Vec<String>>,
        verify_calls: StdMutex<Vec<(String, String)>>,
    }

    impl ScriptedProvider {
        fn push_otp(&self, result: Result<OtpChallenge, VerificationError>) {
            self.otp_results.lock().unwrap().push_back(result);
        }

        fn push_verify(&self, result: Result<KycRecord, VerificationError>) {
            self.verify_results.lock().unwrap().push_back(result);
        }

        fn otp_call_count(&self) -> usize {
            self.otp_calls.lock().unwrap().len()
        }

        fn verify_call_count(&self) -> usize {
            self.verify_calls.lock().unwrap().len()
        }
    }

    impl IdentityProvider for ScriptedProvider {
        async fn request_otp(
            &self,
            subject_id: &str,
            _ctx: &CallContext,
        ) -> Result<OtpChallenge, VerificationError> {
            self.otp_calls.lock().unwrap().push(subject_id.to_string());
            self.otp_results
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected request_otp call")
        }

        async fn verify_otp(
            &self,
            reference_id: &str,
            otp: &str,
            _ctx: &CallContext,
        ) -> Result<KycRecord, VerificationError> {
            self.verify_calls
                .lock()
                .unwrap()
                .push((reference_id.to_string(), otp.to_string()));
            self.verify_results
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected verify_otp call")
        }
    }

    fn test_service() -> (VerificationService<ScriptedProvider>, Arc<ScriptedProvider>) {
        let dir = std::env::temp_dir().join(format!("test-service-{}", uuid::Uuid::new_v4()));
        let mut store = JsonStore::new(StoragePaths::new(&dir));
        store.initialize().expect("initialize test store");
        let provider = Arc::new(ScriptedProvider::default());
        (VerificationService::new(store, provider.clone()), provider)
    }

    fn cleanup(service: &VerificationService<ScriptedProvider>) {
        let _ = fs::remove_dir_all(service.store().paths().root());
    }

    fn challenge(reference_id: &str) -> OtpChallenge {
        OtpChallenge {
            reference_id: reference_id.to_string(),
            message: "OTP sent successfully".to_string(),
        }
    }

    fn identity() -> KycRecord {
        KycRecord {
            status: "VALID".to_string(),
            name: "SURESH KUMAR".to_string(),
            gender: "M".to_string(),
            date_of_birth: "11-02-1984".to_string(),
            address: KycAddress {
                district: "Bengaluru Urban".to_string(),
                state: "Karnataka".to_string(),
                pincode: "560038".to_string(),
                landmark: "MG Road".to_string(),
                house: "12".to_string(),
                ..KycAddress::default()
            },
            ..KycRecord::default()
        }
    }

    fn expired_rejection() -> VerificationError {
        VerificationError::ProviderRejected {
            subtype: ProviderRejection::Expired,
            message: "OTP has expired".to_string(),
        }
    }

    fn invalid_otp_rejection() -> VerificationError {
        VerificationError::ProviderRejected {
            subtype: ProviderRejection::InvalidOtp,
            message: "Invalid OTP".to_string(),
        }
    }

    #[tokio::test]
    async fn successful_otp_request_stores_pending_attempt() {
        let (service, provider) = test_service();
        provider.push_otp(Ok(challenge("REF1")));

        let requested = service
            .request_otp(
                "user_1",
                VerificationFlow::OwnerRegistration,
                "123456789012",
                None,
            )
            .await
            .unwrap();

        assert_eq!(requested.reference_id, "REF1");
        assert_eq!(provider.otp_call_count(), 1);

        let status = service
            .status("user_1", VerificationFlow::OwnerRegistration, None)
            .unwrap();
        assert_eq!(status.phase, FlowPhase::OtpPending);
        assert_eq!(status.reference_id.as_deref(), Some("REF1"));
        assert_eq!(status.subject_masked.as_deref(), Some("XXXX-XXXX-9012"));

        cleanup(&service);
    }

    #[tokio::test]
    async fn failed_otp_request_leaves_prior_attempt_untouched() {
        let (service, provider) = test_service();
        provider.push_otp(Ok(challenge("REF1")));
        provider.push_otp(Err(VerificationError::Transport("timeout".to_string())));

        service
            .request_otp(
                "user_1",
                VerificationFlow::OwnerReVerification,
                "123456789012",
                None,
            )
            .await
            .unwrap();
        let result = service
            .request_otp(
                "user_1",
                VerificationFlow::OwnerReVerification,
                "123456789012",
                None,
            )
            .await;

        assert!(matches!(result, Err(VerificationError::Transport(_))));
        let status = service
            .status("user_1", VerificationFlow::OwnerReVerification, None)
            .unwrap();
        assert_eq!(status.reference_id.as_deref(), Some("REF1"));

        cleanup(&service);
    }

    #[tokio::test]
    async fn verify_without_challenge_is_rejected_without_provider_call() {
        let (service, provider) = test_service();

        let result = service
            .verify_otp(
                "user_1",
                VerificationFlow::OwnerReVerification,
                "123456",
                None,
                None,
            )
            .await;

        assert!(matches!(result, Err(VerificationError::InvalidInput(_))));
        assert_eq!(provider.verify_call_count(), 0);

        cleanup(&service);
    }

    #[tokio::test]
    async fn mismatched_reference_is_rejected_and_attempt_kept() {
        let (service, provider) = test_service();
        provider.push_otp(Ok(challenge("REF1")));

        service
            .request_otp(
                "user_1",
                VerificationFlow::OwnerReVerification,
                "123456789012",
                None,
            )
            .await
            .unwrap();

        let result = service
            .verify_otp(
                "user_1",
                VerificationFlow::OwnerReVerification,
                "123456",
                Some("FORGED"),
                None,
            )
            .await;

        assert!(matches!(result, Err(VerificationError::InvalidInput(_))));
        assert_eq!(provider.verify_call_count(), 0);

        let status = service
            .status("user_1", VerificationFlow::OwnerReVerification, None)
            .unwrap();
        assert_eq!(status.phase, FlowPhase::OtpPending);

        cleanup(&service);
    }

    #[tokio::test]
    async fn reverification_commits_profile_and_clears_attempt() {
        let (service, provider) = test_service();
        provider.push_otp(Ok(challenge("REF1")));
        provider.push_verify(Ok(identity()));

        service
            .request_otp(
                "user_1",
                VerificationFlow::OwnerReVerification,
                "123456789012",
                None,
            )
            .await
            .unwrap();
        let outcome = service
            .verify_otp(
                "user_1",
                VerificationFlow::OwnerReVerification,
                "123456",
                Some("REF1"),
                None,
            )
            .await
            .unwrap();

        match outcome {
            VerifyOutcome::Committed(CommittedProfile::Owner(profile)) => {
                assert_eq!(profile.aadhaar_id.as_deref(), Some("123456789012"));
                assert_eq!(profile.verification_status, VerificationStatus::Verified);
            }
            _ => panic!("expected committed owner profile"),
        }

        let status = service
            .status("user_1", VerificationFlow::OwnerReVerification, None)
            .unwrap();
        assert_eq!(status.phase, FlowPhase::Unstarted);
        assert_eq!(status.profile_status, VerificationStatus::Verified);

        cleanup(&service);
    }

    #[tokio::test]
    async fn expired_otp_clears_reference_and_forces_regeneration() {
        let (service, provider) = test_service();
        provider.push_otp(Ok(challenge("REF1")));
        provider.push_verify(Err(expired_rejection()));

        service
            .request_otp(
                "user_1",
                VerificationFlow::OwnerReVerification,
                "123456789012",
                None,
            )
            .await
            .unwrap();
        let result = service
            .verify_otp(
                "user_1",
                VerificationFlow::OwnerReVerification,
                "000000",
                None,
                None,
            )
            .await;

        match result {
            Err(VerificationError::ProviderRejected { subtype, .. }) => {
                assert_eq!(subtype, ProviderRejection::Expired);
                assert!(subtype.retry_recommended());
            }
            other => panic!("expected expired rejection, got {other:?}"),
        }

        let status = service
            .status("user_1", VerificationFlow::OwnerReVerification, None)
            .unwrap();
        assert_eq!(status.phase, FlowPhase::Unstarted);
        assert!(status.reference_id.is_none());

        cleanup(&service);
    }

    #[tokio::test]
    async fn wrong_otp_keeps_challenge_for_retry() {
        let (service, provider) = test_service();
        provider.push_otp(Ok(challenge("REF1")));
        provider.push_verify(Err(invalid_otp_rejection()));

        service
            .request_otp(
                "user_1",
                VerificationFlow::OwnerReVerification,
                "123456789012",
                None,
            )
            .await
            .unwrap();
        let result = service
            .verify_otp(
                "user_1",
                VerificationFlow::OwnerReVerification,
                "999999",
                None,
                None,
            )
            .await;

        assert!(matches!(
            result,
            Err(VerificationError::ProviderRejected { .. })
        ));

        let status = service
            .status("user_1", VerificationFlow::OwnerReVerification, None)
            .unwrap();
        assert_eq!(status.phase, FlowPhase::OtpPending);
        assert_eq!(status.reference_id.as_deref(), Some("REF1"));

        cleanup(&service);
    }

    #[tokio::test]
    async fn registration_parks_identity_then_commit_creates_profile() {
        let (service, provider) = test_service();
        provider.push_otp(Ok(challenge("REF1")));
        provider.push_verify(Ok(identity()));

        service
            .request_otp(
                "user_1",
                VerificationFlow::OwnerRegistration,
                "123456789012",
                None,
            )
            .await
            .unwrap();
        let outcome = service
            .verify_otp(
                "user_1",
                VerificationFlow::OwnerRegistration,
                "123456",
                None,
                None,
            )
            .await
            .unwrap();
        assert!(matches!(outcome, VerifyOutcome::AwaitingRegistration));

        let status = service
            .status("user_1", VerificationFlow::OwnerRegistration, None)
            .unwrap();
        assert_eq!(status.phase, FlowPhase::AwaitingRegistration);

        let profile = service.complete_registration("user_1", "9876543210").unwrap();
        assert_eq!(profile.phone_number.as_deref(), Some("9876543210"));
        assert_eq!(profile.name.as_deref(), Some("SURESH KUMAR"));

        let status = service
            .status("user_1", VerificationFlow::OwnerRegistration, None)
            .unwrap();
        assert_eq!(status.phase, FlowPhase::Unstarted);
        assert_eq!(status.profile_status, VerificationStatus::Verified);

        cleanup(&service);
    }

    #[tokio::test]
    async fn duplicate_registration_is_terminal() {
        let (service, provider) = test_service();

        // First registrant claims the government id.
        provider.push_otp(Ok(challenge("REF1")));
        provider.push_verify(Ok(identity()));
        service
            .request_otp(
                "user_1",
                VerificationFlow::OwnerRegistration,
                "123456789012",
                None,
            )
            .await
            .unwrap();
        service
            .verify_otp(
                "user_1",
                VerificationFlow::OwnerRegistration,
                "123456",
                None,
                None,
            )
            .await
            .unwrap();
        service.complete_registration("user_1", "9876543210").unwrap();

        // Second registrant verifies the same id.
        provider.push_otp(Ok(challenge("REF2")));
        provider.push_verify(Ok(identity()));
        service
            .request_otp(
                "user_2",
                VerificationFlow::OwnerRegistration,
                "123456789012",
                None,
            )
            .await
            .unwrap();
        service
            .verify_otp(
                "user_2",
                VerificationFlow::OwnerRegistration,
                "123456",
                None,
                None,
            )
            .await
            .unwrap();

        let result = service.complete_registration("user_2", "9123456789");
        assert!(matches!(
            result,
            Err(VerificationError::DuplicateIdentity(_))
        ));

        // The attempt is discarded and the original profile intact.
        let status = service
            .status("user_2", VerificationFlow::OwnerRegistration, None)
            .unwrap();
        assert_eq!(status.phase, FlowPhase::Unstarted);
        let repo = OwnerProfileRepository::new(service.store());
        assert_eq!(
            repo.get("user_1").unwrap().phone_number.as_deref(),
            Some("9876543210")
        );
        assert!(!repo.exists("user_2"));

        cleanup(&service);
    }

    #[tokio::test]
    async fn registration_refused_when_profile_exists() {
        let (service, provider) = test_service();
        provider.push_otp(Ok(challenge("REF1")));
        provider.push_verify(Ok(identity()));

        service
            .request_otp(
                "user_1",
                VerificationFlow::OwnerReVerification,
                "123456789012",
                None,
            )
            .await
            .unwrap();
        service
            .verify_otp(
                "user_1",
                VerificationFlow::OwnerReVerification,
                "123456",
                None,
                None,
            )
            .await
            .unwrap();

        let result = service
            .request_otp(
                "user_1",
                VerificationFlow::OwnerRegistration,
                "123456789012",
                None,
            )
            .await;
        assert!(matches!(result, Err(VerificationError::InvalidInput(_))));
        assert_eq!(provider.otp_call_count(), 1);

        cleanup(&service);
    }

    #[tokio::test]
    async fn helper_flow_enforces_creator_and_id_match() {
        let (service, provider) = test_service();
        let repo = HelperProfileRepository::new(service.store());
        repo.create(&HelperProfileRecord::new(
            "123456789012".to_string(),
            HelperType::Maid,
            "Asha".to_string(),
            "9000000000".to_string(),
            "user_1".to_string(),
        ))
        .unwrap();

        // Not the creator.
        let result = service
            .request_otp(
                "user_2",
                VerificationFlow::HelperVerification,
                "123456789012",
                Some("123456789012"),
            )
            .await;
        assert!(matches!(result, Err(VerificationError::InvalidInput(_))));

        // Subject must match the maid's registered Aadhaar number.
        let result = service
            .request_otp(
                "user_1",
                VerificationFlow::HelperVerification,
                "210987654321",
                Some("123456789012"),
            )
            .await;
        assert!(matches!(result, Err(VerificationError::InvalidInput(_))));

        assert_eq!(provider.otp_call_count(), 0);

        cleanup(&service);
    }

    #[tokio::test]
    async fn helper_verification_updates_profile() {
        let (service, provider) = test_service();
        let repo = HelperProfileRepository::new(service.store());
        repo.create(&HelperProfileRecord::new(
            "123456789012".to_string(),
            HelperType::Maid,
            "Asha".to_string(),
            "9000000000".to_string(),
            "user_1".to_string(),
        ))
        .unwrap();

        provider.push_otp(Ok(challenge("REF1")));
        provider.push_verify(Ok(identity()));

        service
            .request_otp(
                "user_1",
                VerificationFlow::HelperVerification,
                "123456789012",
                Some("123456789012"),
            )
            .await
            .unwrap();
        let outcome = service
            .verify_otp(
                "user_1",
                VerificationFlow::HelperVerification,
                "123456",
                None,
                Some("123456789012"),
            )
            .await
            .unwrap();

        match outcome {
            VerifyOutcome::Committed(CommittedProfile::Helper(profile)) => {
                assert_eq!(profile.verification_status, VerificationStatus::Verified);
                assert_eq!(profile.name, "SURESH KUMAR");
            }
            _ => panic!("expected committed helper profile"),
        }

        // Already verified: a second round is refused up front.
        let result = service
            .request_otp(
                "user_1",
                VerificationFlow::HelperVerification,
                "123456789012",
                Some("123456789012"),
            )
            .await;
        assert!(matches!(result, Err(VerificationError::InvalidInput(_))));

        cleanup(&service);
    }

    #[tokio::test]
    async fn helper_verify_with_mismatched_target_is_rejected() {
        let (service, provider) = test_service();
        let repo = HelperProfileRepository::new(service.store());
        repo.create(&HelperProfileRecord::new(
            "123456789012".to_string(),
            HelperType::Maid,
            "Asha".to_string(),
            "9000000000".to_string(),
            "user_1".to_string(),
        ))
        .unwrap();

        provider.push_otp(Ok(challenge("REF1")));
        service
            .request_otp(
                "user_1",
                VerificationFlow::HelperVerification,
                "123456789012",
                Some("123456789012"),
            )
            .await
            .unwrap();

        let result = service
            .verify_otp(
                "user_1",
                VerificationFlow::HelperVerification,
                "123456",
                None,
                Some("999999999999"),
            )
            .await;

        assert!(matches!(result, Err(VerificationError::InvalidInput(_))));
        assert_eq!(provider.verify_call_count(), 0);

        cleanup(&service);
    }

    #[tokio::test]
    async fn abandon_clears_any_state() {
        let (service, provider) = test_service();
        provider.push_otp(Ok(challenge("REF1")));

        service
            .request_otp(
                "user_1",
                VerificationFlow::OwnerReVerification,
                "123456789012",
                None,
            )
            .await
            .unwrap();
        service
            .abandon("user_1", VerificationFlow::OwnerReVerification)
            .unwrap();

        let status = service
            .status("user_1", VerificationFlow::OwnerReVerification, None)
            .unwrap();
        assert_eq!(status.phase, FlowPhase::Unstarted);

        // Abandoning an empty slot is fine.
        service
            .abandon("user_1", VerificationFlow::OwnerReVerification)
            .unwrap();

        cleanup(&service);
    }

    #[test]
    fn phone_number_validation() {
        assert!(validate_phone_number("9876543210").is_ok());
        assert!(validate_phone_number("919876543210").is_ok());
        assert!(validate_phone_number("123").is_err());
        assert!(validate_phone_number("98765432101234567").is_err());
        assert!(validate_phone_number("98765abc10").is_err());
    }
}
