// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HouseHelp Network

//! # Authentication Module
//!
//! Bearer-token authentication for the verification API.
//!
//! ## Auth Flow
//!
//! 1. The marketplace web app authenticates the user and mints a JWT
//!    signed with the shared `APP_JWT_SECRET` (HS256)
//! 2. Requests arrive with `Authorization: Bearer <JWT>`
//! 3. This service verifies signature and expiry and extracts:
//!    - `sub` → canonical `user_id`
//!    - `role` → authorization role (`owner` by default)
//!
//! ## Security
//!
//! - All non-health endpoints require authentication
//! - Clock skew tolerance is 60 seconds
//! - Without `APP_JWT_SECRET` the service runs in development mode:
//!   token structure and expiry are checked, signatures are not

pub mod claims;
pub mod error;
pub mod extractor;
pub mod roles;

pub use claims::AuthenticatedUser;
pub use error::AuthError;
pub use extractor::{AdminOnly, Auth};
pub use roles::Role;
