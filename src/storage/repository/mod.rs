// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HouseHelp Network

//! Profile repositories over the JSON data store.
//!
//! Owner profiles are keyed by marketplace user id; helper profiles by
//! the helper's government id. Both carry the identity attributes the
//! eKYC provider returns, a structured address, and the denormalized
//! legacy address fields older marketplace consumers still read.

pub mod helpers;
pub mod owners;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use helpers::{HelperProfileRecord, HelperProfileRepository, HelperType};
pub use owners::{OwnerProfileRecord, OwnerProfileRepository};

/// Profile verification lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// No verification has been attempted.
    Unverified,
    /// Verification started but not completed.
    Pending,
    /// Identity confirmed by the eKYC provider.
    Verified,
    /// Rejected by an administrator.
    Rejected,
}

impl Default for VerificationStatus {
    fn default() -> Self {
        Self::Unverified
    }
}

/// Structured address components as returned by the eKYC provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AddressComponents {
    /// House number or name.
    #[serde(default)]
    pub house: String,
    /// Landmark.
    #[serde(default)]
    pub landmark: String,
    /// Village, town or city.
    #[serde(default)]
    pub vtc: String,
    /// District.
    #[serde(default)]
    pub district: String,
    /// State.
    #[serde(default)]
    pub state: String,
    /// Pincode.
    #[serde(default)]
    pub pincode: String,
    /// Country.
    #[serde(default)]
    pub country: String,
    /// Post office.
    #[serde(default)]
    pub post_office: String,
    /// Street.
    #[serde(default)]
    pub street: String,
    /// Subdistrict.
    #[serde(default)]
    pub subdistrict: String,
}

/// Denormalized address fields kept for older marketplace consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LegacyAddress {
    /// City (district, falling back to village/town/city).
    #[serde(default)]
    pub city: String,
    /// State.
    #[serde(default)]
    pub state: String,
    /// Society (mapped from the landmark).
    #[serde(default)]
    pub society: String,
    /// Street.
    #[serde(default)]
    pub street: String,
    /// Apartment number (mapped from the house field).
    #[serde(default)]
    pub apartment_number: String,
    /// Pincode.
    #[serde(default)]
    pub pincode: String,
}
