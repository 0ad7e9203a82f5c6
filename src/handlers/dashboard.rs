use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;

use crate::dto::DashboardQuery;
use crate::error::{AppError, AppResult};
use crate::services::analytics::{build_dashboard, Dashboard, DashboardRange};
use crate::services::reconcile;
use crate::AppState;

pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Json<Dashboard>> {
    let range = DashboardRange::parse(query.range.as_deref()).map_err(AppError::Validation)?;

    let entries = reconcile::list_all(state.store.as_ref()).await?;
    Ok(Json(build_dashboard(&entries, range, Utc::now())))
}
