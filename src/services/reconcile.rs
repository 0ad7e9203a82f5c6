//! Applies history-table edits made against a fetched snapshot back to the
//! store. Rows are written one store call at a time with no atomicity
//! across rows; callers re-fetch afterwards to see the reconciled state.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::mood_entry::{EntryId, MetricField, MetricsPatch, MoodEntry};
use crate::store::{MoodStore, StoreResult};

/// Raw column → value edits for one row, as a table editor sends them.
pub type RowEdit = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RowStatus {
    Updated,
    /// Nothing editable was left after filtering; no store call was made.
    Skipped,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowOutcome {
    pub row: usize,
    pub id: Option<EntryId>,
    #[serde(flatten)]
    pub status: RowStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconcileReport {
    pub updated: usize,
    pub rows: Vec<RowOutcome>,
}

pub async fn list_all(store: &dyn MoodStore) -> StoreResult<Vec<MoodEntry>> {
    store.list_desc().await
}

/// Keeps only metric columns. `id`, `created_at` and unknown keys are
/// dropped; a metric with a value that is not a non-negative `i32` is an
/// error for the whole row.
pub fn metric_patch(edit: &RowEdit) -> Result<MetricsPatch, String> {
    let mut patch = MetricsPatch::default();
    for (key, value) in edit {
        let Some(field) = MetricField::from_column(key) else {
            continue;
        };
        let parsed = value
            .as_i64()
            .filter(|v| *v >= 0)
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| format!("{} must be a non-negative integer", key))?;
        patch.set(field, parsed);
    }
    Ok(patch)
}

pub async fn apply_edits(
    store: &dyn MoodStore,
    snapshot: &[EntryId],
    edits: &BTreeMap<usize, RowEdit>,
) -> ReconcileReport {
    let mut rows = Vec::with_capacity(edits.len());
    let mut updated = 0;

    for (&row, edit) in edits {
        let Some(&id) = snapshot.get(row) else {
            rows.push(RowOutcome {
                row,
                id: None,
                status: RowStatus::Failed {
                    reason: format!("row {} is outside the snapshot", row),
                },
            });
            continue;
        };

        let patch = match metric_patch(edit) {
            Ok(patch) => patch,
            Err(reason) => {
                rows.push(RowOutcome {
                    row,
                    id: Some(id),
                    status: RowStatus::Failed { reason },
                });
                continue;
            }
        };

        if patch.is_empty() {
            rows.push(RowOutcome {
                row,
                id: Some(id),
                status: RowStatus::Skipped,
            });
            continue;
        }

        let status = match store.update(id, &patch).await {
            Ok(Some(_)) => {
                updated += 1;
                RowStatus::Updated
            }
            Ok(None) => RowStatus::Failed {
                reason: format!("entry {} no longer exists", id),
            },
            Err(e) => {
                tracing::error!(error = %e, row, entry_id = id, "Row update failed");
                RowStatus::Failed {
                    reason: e.to_string(),
                }
            }
        };
        rows.push(RowOutcome {
            row,
            id: Some(id),
            status,
        });
    }

    tracing::info!(updated, attempted = edits.len(), "Applied history edits");
    ReconcileReport { updated, rows }
}

/// `true` when a row was removed.
pub async fn delete(store: &dyn MoodStore, id: EntryId) -> StoreResult<bool> {
    let removed = store.delete(id).await?;
    if removed.is_some() {
        tracing::info!(entry_id = id, "Deleted entry");
    }
    Ok(removed.is_some())
}
