// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HouseHelp Network

//! Owner profile repository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{JsonStore, StorageError, StorageResult};
use super::{AddressComponents, LegacyAddress, VerificationStatus};

/// Persisted owner profile.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OwnerProfileRecord {
    /// Marketplace user id owning this profile.
    pub user_id: String,
    /// 12-digit Aadhaar number, once verification has started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aadhaar_id: Option<String>,
    /// Verification lifecycle status.
    pub verification_status: VerificationStatus,
    /// When the identity was last confirmed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,
    /// Name as per Aadhaar.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Gender as per Aadhaar.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Date of birth as per Aadhaar (provider's DD-MM-YYYY string).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    /// Care-of line as per Aadhaar.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub care_of: Option<String>,
    /// Complete address string as per Aadhaar.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_address: Option<String>,
    /// Base64 photo from Aadhaar. Never returned through list endpoints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    /// Structured address from the provider.
    #[serde(default)]
    pub address: AddressComponents,
    /// Denormalized address for older consumers.
    #[serde(default)]
    pub legacy_address: LegacyAddress,
    /// Contact number collected at registration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl OwnerProfileRecord {
    /// Construct an unverified profile shell for a user.
    pub fn new(user_id: String) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            aadhaar_id: None,
            verification_status: VerificationStatus::Unverified,
            verified_at: None,
            name: None,
            gender: None,
            date_of_birth: None,
            care_of: None,
            full_address: None,
            photo: None,
            address: AddressComponents::default(),
            legacy_address: LegacyAddress::default(),
            phone_number: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Repository for owner profiles.
pub struct OwnerProfileRepository<'a> {
    store: &'a JsonStore,
}

impl<'a> OwnerProfileRepository<'a> {
    pub fn new(store: &'a JsonStore) -> Self {
        Self { store }
    }

    /// Check if a profile exists for a user.
    pub fn exists(&self, user_id: &str) -> bool {
        self.store.exists(self.store.paths().owner_profile(user_id))
    }

    /// Get a profile by user id.
    pub fn get(&self, user_id: &str) -> StorageResult<OwnerProfileRecord> {
        let path = self.store.paths().owner_profile(user_id);
        if !self.store.exists(&path) {
            return Err(StorageError::NotFound(format!("Owner profile {user_id}")));
        }
        self.store.read_json(path)
    }

    /// Find the profile carrying a given government id, if any.
    ///
    /// Linear scan; the owner population is small and this only runs on
    /// profile creation and duplicate checks.
    pub fn find_by_government_id(
        &self,
        aadhaar_id: &str,
    ) -> StorageResult<Option<OwnerProfileRecord>> {
        let ids = self
            .store
            .list_files(self.store.paths().owners_dir(), "json")?;

        for user_id in ids {
            if let Ok(record) = self.get(&user_id) {
                if record.aadhaar_id.as_deref() == Some(aadhaar_id) {
                    return Ok(Some(record));
                }
            }
        }
        Ok(None)
    }

    /// Persist a new profile.
    ///
    /// Refuses when the user already has a profile, or when any existing
    /// profile carries the same government id — at most one owner profile
    /// per distinct Aadhaar number.
    pub fn create(&self, record: &OwnerProfileRecord) -> StorageResult<()> {
        if self.exists(&record.user_id) {
            return Err(StorageError::AlreadyExists(format!(
                "Owner profile {}",
                record.user_id
            )));
        }
        if let Some(aadhaar_id) = record.aadhaar_id.as_deref() {
            if self.find_by_government_id(aadhaar_id)?.is_some() {
                return Err(StorageError::AlreadyExists(format!(
                    "Owner profile for Aadhaar ending {}",
                    masked_tail(aadhaar_id)
                )));
            }
        }
        self.store
            .write_json(self.store.paths().owner_profile(&record.user_id), record)
    }

    /// Update an existing profile in place.
    pub fn update(&self, record: &OwnerProfileRecord) -> StorageResult<()> {
        if !self.exists(&record.user_id) {
            return Err(StorageError::NotFound(format!(
                "Owner profile {}",
                record.user_id
            )));
        }
        self.store
            .write_json(self.store.paths().owner_profile(&record.user_id), record)
    }
}

/// Last four digits of a government id, for error text and status views.
pub fn masked_tail(id: &str) -> &str {
    let len = id.len();
    if len >= 4 {
        &id[len - 4..]
    } else {
        id
    }
}
