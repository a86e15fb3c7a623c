// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HouseHelp Network

//! # Persistent Storage Module
//!
//! File-backed storage under the configured data directory.
//!
//! ## Storage Layout
//!
//! ```text
//! {DATA_DIR}/
//!   owners/{user_id}.json          # Owner profiles
//!   helpers/{helper_id}.json       # Helper profiles (keyed by government id)
//!   verification/{actor_id}/       # In-flight verification attempts
//!     {flow}.json
//!   audit/{date}/events.jsonl      # Daily audit logs (append-only)
//! ```

pub mod audit;
pub mod fs;
pub mod paths;
pub mod repository;

pub use audit::{AuditLogRepository, AuditRecord, AuditRequestKind, AuditSink, FsAuditSink};
pub use fs::{JsonStore, StorageError, StorageResult};
pub use paths::StoragePaths;
pub use repository::{
    AddressComponents, HelperProfileRecord, HelperProfileRepository, HelperType, LegacyAddress,
    OwnerProfileRecord, OwnerProfileRepository, VerificationStatus,
};
