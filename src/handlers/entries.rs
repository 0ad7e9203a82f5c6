use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use validator::Validate;

use crate::dto::{ApplyEditsRequest, DeleteResponse, EntryListResponse, SaveEntryRequest};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::models::mood_entry::{EntryId, MoodMetrics};
use crate::services::daily_upsert::{self, SaveOutcome};
use crate::services::reconcile::{self, ReconcileReport};
use crate::AppState;

pub async fn form_defaults() -> Json<MoodMetrics> {
    Json(MoodMetrics::default())
}

pub async fn save_today(
    State(state): State<AppState>,
    AppJson(body): AppJson<SaveEntryRequest>,
) -> AppResult<Json<SaveOutcome>> {
    let outcome =
        daily_upsert::save_today(state.store.as_ref(), body.into_metrics(), Utc::now()).await?;
    Ok(Json(outcome))
}

pub async fn list_entries(State(state): State<AppState>) -> AppResult<Json<EntryListResponse>> {
    let entries = reconcile::list_all(state.store.as_ref()).await?;
    Ok(Json(EntryListResponse {
        total: entries.len(),
        entries,
    }))
}

pub async fn apply_edits(
    State(state): State<AppState>,
    AppJson(body): AppJson<ApplyEditsRequest>,
) -> AppResult<Json<ReconcileReport>> {
    body.validate()?;

    let snapshot = body.snapshot_ids();
    let report = reconcile::apply_edits(state.store.as_ref(), &snapshot, &body.edited_rows).await;
    Ok(Json(report))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<EntryId>,
) -> AppResult<Json<DeleteResponse>> {
    if !reconcile::delete(state.store.as_ref(), entry_id).await? {
        return Err(AppError::NotFound("Entry not found".into()));
    }

    Ok(Json(DeleteResponse {
        deleted: true,
        id: entry_id,
    }))
}
