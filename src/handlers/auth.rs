use axum::{extract::State, Extension, Json};

use crate::auth::{
    gate::authorize,
    session::{create_session_token, Session},
};
use crate::dto::{LoginRequest, LoginResponse, SessionResponse};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::AppState;

pub async fn login(
    State(state): State<AppState>,
    AppJson(body): AppJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    if !authorize(&state.config.access_password, &body.password) {
        tracing::warn!("Login rejected");
        return Err(AppError::Unauthorized);
    }

    let (token, session) = create_session_token(&state.config)?;
    tracing::info!(session_id = %session.id, "Session started");

    Ok(Json(LoginResponse {
        token,
        session_id: session.id,
    }))
}

pub async fn current_session(Extension(session): Extension<Session>) -> Json<SessionResponse> {
    Json(SessionResponse {
        authenticated: true,
        session_id: session.id,
        issued_at: session.issued_at,
    })
}
