//! # moodlog: Request/Response DTOs
//!
//! API contract types that are not domain models themselves.
//!
//! Conventions:
//! - `*Request`  → deserialized from client JSON body or query params
//! - `*Response` → serialized to client JSON

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::mood_entry::{EntryId, MetricsPatch, MoodEntry, MoodMetrics};
use crate::services::reconcile::RowEdit;

// ============================================================================
// Auth
// ============================================================================

/// POST /api/auth/login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

/// Response for POST /api/auth/login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub session_id: Uuid,
}

/// GET /api/session
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub authenticated: bool,
    pub session_id: Uuid,
    pub issued_at: DateTime<Utc>,
}

// ============================================================================
// Entries
// ============================================================================

/// GET /api/entries
#[derive(Debug, Serialize)]
pub struct EntryListResponse {
    pub total: usize,
    pub entries: Vec<MoodEntry>,
}

/// POST /api/entries/today. Omitted metrics take the form defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct SaveEntryRequest {
    pub metrics: MetricsPatch,
}

impl SaveEntryRequest {
    pub fn into_metrics(self) -> MoodMetrics {
        let mut metrics = MoodMetrics::default();
        self.metrics.apply_to(&mut metrics);
        metrics
    }
}

/// One row of the snapshot the client edited. Extra columns are ignored so
/// clients can send back the rows they fetched.
#[derive(Debug, Deserialize)]
pub struct SnapshotRow {
    pub id: EntryId,
}

/// POST /api/entries/edits
#[derive(Debug, Deserialize, Validate)]
pub struct ApplyEditsRequest {
    /// Rows in the order they were displayed.
    pub snapshot: Vec<SnapshotRow>,

    /// Row position → changed columns.
    #[validate(length(min = 1, message = "edited_rows must not be empty"))]
    pub edited_rows: BTreeMap<usize, RowEdit>,
}

impl ApplyEditsRequest {
    pub fn snapshot_ids(&self) -> Vec<EntryId> {
        self.snapshot.iter().map(|r| r.id).collect()
    }
}

/// Standard delete confirmation
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub id: EntryId,
}

// ============================================================================
// Dashboard
// ============================================================================

/// GET /api/dashboard query params
#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    /// "7d", "30d" or "90d". Default: "30d".
    pub range: Option<String>,
}
