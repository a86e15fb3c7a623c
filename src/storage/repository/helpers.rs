// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HouseHelp Network

//! Helper profile repository.
//!
//! Helper profiles are keyed by the helper's government id (the Aadhaar
//! number for maids, the driving licence number for drivers), so the
//! one-profile-per-id invariant is the file key itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{JsonStore, StorageError, StorageResult};
use super::{AddressComponents, LegacyAddress, VerificationStatus};

/// Kind of helper the profile describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum HelperType {
    /// Domestic helper; the profile key is their Aadhaar number.
    Maid,
    /// Driver; the profile key is their driving licence number.
    Driver,
}

/// Persisted helper profile.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HelperProfileRecord {
    /// Government id keying the profile.
    pub helper_id: String,
    /// Maid or driver.
    pub helper_type: HelperType,
    /// Helper's name.
    pub name: String,
    /// Contact number.
    pub phone_number: String,
    /// Gender, once known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Comma-separated spoken languages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<String>,
    /// Marketplace user who registered this helper.
    pub created_by: String,
    /// Verification lifecycle status.
    pub verification_status: VerificationStatus,
    /// When the identity was last confirmed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,
    /// Date of birth as per Aadhaar.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    /// Care-of line as per Aadhaar.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub care_of: Option<String>,
    /// Complete address string as per Aadhaar.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_address: Option<String>,
    /// Base64 photo from Aadhaar.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    /// Structured address from the provider.
    #[serde(default)]
    pub address: AddressComponents,
    /// Denormalized address for older consumers.
    #[serde(default)]
    pub legacy_address: LegacyAddress,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl HelperProfileRecord {
    /// Construct an unverified helper profile.
    pub fn new(
        helper_id: String,
        helper_type: HelperType,
        name: String,
        phone_number: String,
        created_by: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            helper_id,
            helper_type,
            name,
            phone_number,
            gender: None,
            languages: None,
            created_by,
            verification_status: VerificationStatus::Unverified,
            verified_at: None,
            date_of_birth: None,
            care_of: None,
            full_address: None,
            photo: None,
            address: AddressComponents::default(),
            legacy_address: LegacyAddress::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Repository for helper profiles.
pub struct HelperProfileRepository<'a> {
    store: &'a JsonStore,
}

impl<'a> HelperProfileRepository<'a> {
    pub fn new(store: &'a JsonStore) -> Self {
        Self { store }
    }

    /// Check if a helper profile exists.
    pub fn exists(&self, helper_id: &str) -> bool {
        self.store
            .exists(self.store.paths().helper_profile(helper_id))
    }

    /// Get a helper profile by government id.
    pub fn get(&self, helper_id: &str) -> StorageResult<HelperProfileRecord> {
        let path = self.store.paths().helper_profile(helper_id);
        if !self.store.exists(&path) {
            return Err(StorageError::NotFound(format!("Helper profile {helper_id}")));
        }
        self.store.read_json(path)
    }

    /// Persist a new helper profile.
    pub fn create(&self, record: &HelperProfileRecord) -> StorageResult<()> {
        if self.exists(&record.helper_id) {
            return Err(StorageError::AlreadyExists(format!(
                "Helper profile {}",
                record.helper_id
            )));
        }
        self.store
            .write_json(self.store.paths().helper_profile(&record.helper_id), record)
    }

    /// Update an existing helper profile in place.
    pub fn update(&self, record: &HelperProfileRecord) -> StorageResult<()> {
        if !self.exists(&record.helper_id) {
            return Err(StorageError::NotFound(format!(
                "Helper profile {}",
                record.helper_id
            )));
        }
        self.store
            .write_json(self.store.paths().helper_profile(&record.helper_id), record)
    }

    /// List helpers registered by an owner, newest first.
    pub fn list_by_creator(&self, created_by: &str) -> StorageResult<Vec<HelperProfileRecord>> {
        let ids = self
            .store
            .list_files(self.store.paths().helpers_dir(), "json")?;

        let mut records = Vec::new();
        for id in ids {
            if let Ok(record) = self.get(&id) {
                if record.created_by == created_by {
                    records.push(record);
                }
            }
        }

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }
}
