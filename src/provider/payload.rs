// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HouseHelp Network

//! Typed provider payloads.
//!
//! The sandbox KYC API returns loosely-shaped JSON; these types are the
//! parse boundary — nothing outside the gateway touches raw maps.

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Result of a successful OTP generation call.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OtpChallenge {
    /// Opaque token correlating this challenge to its verification call.
    #[serde(deserialize_with = "string_or_number")]
    pub reference_id: String,
    /// Provider's user-facing delivery message.
    #[serde(default = "default_otp_message")]
    pub message: String,
}

fn default_otp_message() -> String {
    "OTP sent successfully".to_string()
}

/// Structured address inside a verified identity payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct KycAddress {
    #[serde(default)]
    pub house: String,
    #[serde(default)]
    pub landmark: String,
    /// Village / town / city.
    #[serde(default)]
    pub vtc: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub state: String,
    /// The wire format sends this as a bare number.
    #[serde(default, deserialize_with = "string_or_number")]
    pub pincode: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub post_office: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub subdistrict: String,
}

/// Verified identity payload returned on OTP redemption.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct KycRecord {
    /// Provider record status (e.g. "VALID").
    #[serde(default)]
    pub status: String,
    /// Provider message (e.g. "Aadhaar Card Exists").
    #[serde(default)]
    pub message: String,
    /// Name as per the identity record.
    #[serde(default)]
    pub name: String,
    /// Gender code ("M"/"F"/"T").
    #[serde(default)]
    pub gender: String,
    /// Date of birth, DD-MM-YYYY.
    #[serde(default)]
    pub date_of_birth: String,
    /// Year of birth.
    #[serde(default)]
    pub year_of_birth: Option<i32>,
    /// Care-of line (guardian/spouse).
    #[serde(default)]
    pub care_of: String,
    /// Complete address as one string.
    #[serde(default)]
    pub full_address: String,
    /// Base64-encoded photo.
    #[serde(default)]
    pub photo: String,
    /// Structured address components.
    #[serde(default)]
    pub address: KycAddress,
}

/// Accept a JSON string or number and normalize to String.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        String(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::String(value) => value,
        Raw::Number(value) => value.to_string(),
    })
}
