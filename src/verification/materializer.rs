// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HouseHelp Network

//! Profile materialization.
//!
//! Maps a verified identity payload onto owner and helper profile
//! records: the provider's structured address sub-fields, plus the
//! denormalized legacy address fields older marketplace consumers read.
//! Re-running with the same payload leaves the same stored state
//! (timestamps aside).

use chrono::Utc;

use crate::provider::{KycAddress, KycRecord};
use crate::storage::{
    AddressComponents, HelperProfileRecord, HelperProfileRepository, JsonStore, LegacyAddress,
    OwnerProfileRecord, OwnerProfileRepository, StorageError, VerificationStatus,
};

use super::error::VerificationError;
use crate::storage::repository::owners::masked_tail;

/// Structured address columns from the provider payload.
fn address_components(address: &KycAddress) -> AddressComponents {
    AddressComponents {
        house: address.house.clone(),
        landmark: address.landmark.clone(),
        vtc: address.vtc.clone(),
        district: address.district.clone(),
        state: address.state.clone(),
        pincode: address.pincode.clone(),
        country: address.country.clone(),
        post_office: address.post_office.clone(),
        street: address.street.clone(),
        subdistrict: address.subdistrict.clone(),
    }
}

/// Legacy address fields: city is the district, falling back to the
/// village/town/city; society is the landmark; apartment is the house.
fn legacy_address(address: &KycAddress, existing: &LegacyAddress) -> LegacyAddress {
    let pick = |fresh: &str, old: &str| {
        if fresh.is_empty() {
            old.to_string()
        } else {
            fresh.to_string()
        }
    };

    let city = if address.district.is_empty() {
        &address.vtc
    } else {
        &address.district
    };

    LegacyAddress {
        city: pick(city, &existing.city),
        state: pick(&address.state, &existing.state),
        society: pick(&address.landmark, &existing.society),
        street: pick(&address.street, &existing.street),
        apartment_number: pick(&address.house, &existing.apartment_number),
        pincode: pick(&address.pincode, &existing.pincode),
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Stamp verified identity attributes onto an owner profile.
fn apply_to_owner(record: &mut OwnerProfileRecord, subject_id: &str, identity: &KycRecord) {
    record.aadhaar_id = Some(subject_id.to_string());
    record.verification_status = VerificationStatus::Verified;
    record.verified_at = Some(Utc::now());
    record.name = non_empty(&identity.name);
    record.gender = non_empty(&identity.gender);
    record.date_of_birth = non_empty(&identity.date_of_birth);
    record.care_of = non_empty(&identity.care_of);
    record.full_address = non_empty(&identity.full_address);
    record.photo = non_empty(&identity.photo);
    record.legacy_address = legacy_address(&identity.address, &record.legacy_address);
    record.address = address_components(&identity.address);
    record.updated_at = Utc::now();
}

/// Stamp verified identity attributes onto a helper profile.
fn apply_to_helper(record: &mut HelperProfileRecord, identity: &KycRecord) {
    record.verification_status = VerificationStatus::Verified;
    record.verified_at = Some(Utc::now());
    if let Some(name) = non_empty(&identity.name) {
        record.name = name;
    }
    if let Some(gender) = non_empty(&identity.gender) {
        record.gender = Some(gender);
    }
    record.date_of_birth = non_empty(&identity.date_of_birth);
    record.care_of = non_empty(&identity.care_of);
    record.full_address = non_empty(&identity.full_address);
    record.photo = non_empty(&identity.photo);
    record.legacy_address = legacy_address(&identity.address, &record.legacy_address);
    record.address = address_components(&identity.address);
    record.updated_at = Utc::now();
}

fn duplicate_error(subject_id: &str) -> VerificationError {
    VerificationError::DuplicateIdentity(format!(
        "An owner profile already exists for the Aadhaar number ending {}",
        masked_tail(subject_id)
    ))
}

/// Create a new owner profile from a verified identity (registration).
///
/// Refuses with a duplicate-identity error when any owner profile
/// already carries the same government id, or when the actor already
/// has a profile.
pub fn create_owner_profile(
    store: &JsonStore,
    actor_id: &str,
    subject_id: &str,
    identity: &KycRecord,
    phone_number: String,
) -> Result<OwnerProfileRecord, VerificationError> {
    let repo = OwnerProfileRepository::new(store);

    if repo.exists(actor_id) {
        return Err(VerificationError::DuplicateIdentity(
            "An owner profile already exists for this account".to_string(),
        ));
    }
    if repo.find_by_government_id(subject_id)?.is_some() {
        return Err(duplicate_error(subject_id));
    }

    let mut record = OwnerProfileRecord::new(actor_id.to_string());
    record.phone_number = Some(phone_number);
    apply_to_owner(&mut record, subject_id, identity);

    match repo.create(&record) {
        Ok(()) => Ok(record),
        // The repository re-checks uniqueness; surface it as the same tag.
        Err(StorageError::AlreadyExists(_)) => Err(duplicate_error(subject_id)),
        Err(error) => Err(error.into()),
    }
}

/// Create or refresh the actor's owner profile (re-verification).
///
/// Updating in place with the same payload is idempotent. The subject
/// id may not be claimed by another owner's profile.
pub fn materialize_owner_profile(
    store: &JsonStore,
    actor_id: &str,
    subject_id: &str,
    identity: &KycRecord,
) -> Result<OwnerProfileRecord, VerificationError> {
    let repo = OwnerProfileRepository::new(store);

    if let Some(holder) = repo.find_by_government_id(subject_id)? {
        if holder.user_id != actor_id {
            return Err(duplicate_error(subject_id));
        }
    }

    match repo.get(actor_id) {
        Ok(mut record) => {
            apply_to_owner(&mut record, subject_id, identity);
            repo.update(&record)?;
            Ok(record)
        }
        Err(StorageError::NotFound(_)) => {
            let mut record = OwnerProfileRecord::new(actor_id.to_string());
            apply_to_owner(&mut record, subject_id, identity);
            match repo.create(&record) {
                Ok(()) => Ok(record),
                Err(StorageError::AlreadyExists(_)) => Err(duplicate_error(subject_id)),
                Err(error) => Err(error.into()),
            }
        }
        Err(error) => Err(error.into()),
    }
}

/// Refresh an existing helper profile with a verified identity.
pub fn materialize_helper_profile(
    store: &JsonStore,
    helper_id: &str,
    identity: &KycRecord,
) -> Result<HelperProfileRecord, VerificationError> {
    let repo = HelperProfileRepository::new(store);
    let mut record = repo.get(helper_id)?;
    apply_to_helper(&mut record, identity);
    repo.update(&record)?;
    Ok(record)
}
