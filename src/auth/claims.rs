// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HouseHelp Network

//! Authenticated user representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;

/// Authenticated user information extracted from the JWT.
///
/// This is the type used throughout the application to represent the
/// user making a request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Canonical user ID (the `sub` claim).
    pub user_id: String,

    /// User's role.
    pub role: Role,

    /// Marketplace session ID, if present in the token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Token expiration (Unix timestamp, not serialized).
    #[serde(skip)]
    pub expires_at: i64,
}

impl AuthenticatedUser {
    /// Whether this user may use admin endpoints.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_check_follows_role() {
        let admin = AuthenticatedUser {
            user_id: "user_1".to_string(),
            role: Role::Admin,
            session_id: None,
            expires_at: 0,
        };
        let owner = AuthenticatedUser {
            user_id: "user_2".to_string(),
            role: Role::Owner,
            session_id: None,
            expires_at: 0,
        };
        assert!(admin.is_admin());
        assert!(!owner.is_admin());
    }
}
