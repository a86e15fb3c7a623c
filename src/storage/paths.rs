// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HouseHelp Network

//! Path constants and utilities for the data directory layout.

use std::path::{Path, PathBuf};

/// Default base directory for persistent data when `DATA_DIR` is unset.
pub const DATA_ROOT: &str = "/var/lib/hhn-kyc/data";

/// Storage path utilities for the data directory.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all persistent data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========== Owner Profile Paths ==========

    /// Directory containing all owner profiles.
    pub fn owners_dir(&self) -> PathBuf {
        self.root.join("owners")
    }

    /// Path to a specific owner profile, keyed by the marketplace user id.
    pub fn owner_profile(&self, user_id: &str) -> PathBuf {
        self.owners_dir().join(format!("{user_id}.json"))
    }

    // ========== Helper Profile Paths ==========

    /// Directory containing all helper profiles.
    pub fn helpers_dir(&self) -> PathBuf {
        self.root.join("helpers")
    }

    /// Path to a specific helper profile, keyed by the helper's government id.
    pub fn helper_profile(&self, helper_id: &str) -> PathBuf {
        self.helpers_dir().join(format!("{helper_id}.json"))
    }

    // ========== Verification Attempt Paths ==========

    /// Directory containing in-flight verification attempts.
    pub fn verification_dir(&self) -> PathBuf {
        self.root.join("verification")
    }

    /// Directory for one actor's in-flight attempts.
    pub fn verification_actor_dir(&self, actor_id: &str) -> PathBuf {
        self.verification_dir().join(actor_id)
    }

    /// Path to the attempt record for one actor+flow slot.
    pub fn verification_attempt(&self, actor_id: &str, slot: &str) -> PathBuf {
        self.verification_actor_dir(actor_id)
            .join(format!("{slot}.json"))
    }

    // ========== Audit Log Paths ==========

    /// Directory containing audit logs.
    pub fn audit_dir(&self) -> PathBuf {
        self.root.join("audit")
    }

    /// Directory for a specific date's audit logs.
    pub fn audit_date_dir(&self, date: &str) -> PathBuf {
        self.audit_dir().join(date)
    }

    /// Path to a daily audit events file (JSONL format).
    pub fn audit_events_file(&self, date: &str) -> PathBuf {
        self.audit_date_dir(date).join("events.jsonl")
    }
}
