// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HouseHelp Network

//! Audit logging for eKYC provider interactions.
//!
//! Every gateway call — token acquisition, OTP generation, OTP
//! verification — is recorded here, success or failure. The log is
//! append-only JSONL, one file per day; business logic never reads it
//! back, only the admin surface does.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use super::{JsonStore, StorageResult};

/// The provider call a record describes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditRequestKind {
    /// Credential exchange for a bearer token.
    TokenAcquisition,
    /// OTP generation for a subject.
    OtpRequest,
    /// OTP redemption against a reference id.
    OtpVerify,
}

impl AuditRequestKind {
    /// Stable wire name, used for query filtering.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditRequestKind::TokenAcquisition => "token_acquisition",
            AuditRequestKind::OtpRequest => "otp_request",
            AuditRequestKind::OtpVerify => "otp_verify",
        }
    }
}

/// One provider interaction, as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditRecord {
    /// Unique record ID.
    pub entry_id: String,
    /// When the call happened.
    pub timestamp: DateTime<Utc>,
    /// Which provider endpoint was called.
    pub request_kind: AuditRequestKind,
    /// Aadhaar number under verification (absent for token calls).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
    /// Provider challenge reference (absent for token and OTP requests).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
    /// Snapshot of what was sent. Never contains credentials.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub request_payload: Option<serde_json::Value>,
    /// Snapshot of what came back. Photo blobs are dropped.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub response_payload: Option<serde_json::Value>,
    /// Whether the call succeeded.
    pub succeeded: bool,
    /// Error text when the call failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_text: Option<String>,
    /// User who triggered the call, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,
    /// Ties together all calls of one verification attempt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl AuditRecord {
    /// Start a record for a provider call.
    pub fn new(request_kind: AuditRequestKind) -> Self {
        Self {
            entry_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            request_kind,
            subject_id: None,
            reference_id: None,
            request_payload: None,
            response_payload: None,
            succeeded: true,
            error_text: None,
            actor_id: None,
            correlation_id: None,
        }
    }

    /// Set the subject under verification.
    pub fn with_subject(mut self, subject_id: impl Into<String>) -> Self {
        self.subject_id = Some(subject_id.into());
        self
    }

    /// Set the challenge reference.
    pub fn with_reference(mut self, reference_id: impl Into<String>) -> Self {
        self.reference_id = Some(reference_id.into());
        self
    }

    /// Attach the outbound payload snapshot.
    pub fn with_request_payload(mut self, payload: serde_json::Value) -> Self {
        self.request_payload = Some(payload);
        self
    }

    /// Attach the inbound payload snapshot.
    pub fn with_response_payload(mut self, payload: serde_json::Value) -> Self {
        self.response_payload = Some(payload);
        self
    }

    /// Attach actor and correlation attribution.
    pub fn with_context(
        mut self,
        actor_id: Option<String>,
        correlation_id: Option<String>,
    ) -> Self {
        self.actor_id = actor_id;
        self.correlation_id = correlation_id;
        self
    }

    /// Mark as failed with error text.
    pub fn failed(mut self, error: impl Into<String>) -> Self {
        self.succeeded = false;
        self.error_text = Some(error.into());
        self
    }
}

/// Destination for audit records.
///
/// `record` is best-effort: implementations must swallow their own
/// failures — an audit write must never fail the verification call that
/// produced it.
pub trait AuditSink: Send + Sync {
    fn record(&self, record: AuditRecord);
}

/// Audit sink appending to daily JSONL files in the data directory.
#[derive(Debug, Clone)]
pub struct FsAuditSink {
    store: JsonStore,
}

impl FsAuditSink {
    pub fn new(store: JsonStore) -> Self {
        Self { store }
    }
}

impl AuditSink for FsAuditSink {
    fn record(&self, record: AuditRecord) {
        let date = record.timestamp.format("%Y-%m-%d").to_string();
        let path = self.store.paths().audit_events_file(&date);

        let line = match serde_json::to_string(&record) {
            Ok(line) => line,
            Err(error) => {
                warn!(%error, "failed to serialize audit record");
                return;
            }
        };

        if let Err(error) = self.store.append_line(&path, &line) {
            warn!(%error, entry_id = %record.entry_id, "failed to append audit record");
        }
    }
}

/// Read access to the audit log for the admin surface.
pub struct AuditLogRepository<'a> {
    store: &'a JsonStore,
}

impl<'a> AuditLogRepository<'a> {
    pub fn new(store: &'a JsonStore) -> Self {
        Self { store }
    }

    /// Read all records for a specific date (YYYY-MM-DD).
    pub fn read_records(&self, date: &str) -> StorageResult<Vec<AuditRecord>> {
        let path = self.store.paths().audit_events_file(date);
        if !self.store.exists(&path) {
            return Ok(Vec::new());
        }
        let content = self.store.read_text(&path)?;

        let mut records = Vec::new();
        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<AuditRecord>(line) {
                Ok(record) => records.push(record),
                // A torn tail line (crash mid-append) is skipped, not fatal.
                Err(error) => warn!(%error, %date, "skipping unparseable audit line"),
            }
        }

        Ok(records)
    }

    /// Read records for an inclusive date range.
    pub fn read_records_range(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> StorageResult<Vec<AuditRecord>> {
        use chrono::NaiveDate;

        let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d")
            .map_err(|e| super::StorageError::NotFound(format!("invalid start date: {e}")))?;
        let end = NaiveDate::parse_from_str(end_date, "%Y-%m-%d")
            .map_err(|e| super::StorageError::NotFound(format!("invalid end date: {e}")))?;

        let mut all_records = Vec::new();
        let mut current = start;

        while current <= end {
            let date_str = current.format("%Y-%m-%d").to_string();
            all_records.extend(self.read_records(&date_str)?);
            let Some(next) = current.succ_opt() else {
                break;
            };
            current = next;
        }

        Ok(all_records)
    }
}
