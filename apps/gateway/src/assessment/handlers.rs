//! Axum route handlers for the Assessment API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::assessment::models::SessionConfig;
use crate::assessment::session::{Direction, SessionView};
use crate::auth::UserContext;
use crate::errors::AppError;
use crate::state::AppState;
use crate::voice::{Speech, VoiceClip};

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    /// Zero-based question index; the current question when omitted.
    #[serde(default)]
    pub index: Option<usize>,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct VoiceAnswerRequest {
    #[serde(default)]
    pub index: Option<usize>,
    #[serde(flatten)]
    pub clip: VoiceClip,
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub direction: Direction,
}

#[derive(Debug, Default, Deserialize)]
pub struct SpeechRequest {
    #[serde(default)]
    pub index: Option<usize>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/assessments
pub async fn handle_create(
    State(state): State<AppState>,
    user: UserContext,
    Json(config): Json<SessionConfig>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    let view = state.sessions.create(&user, config).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/v1/assessments/:id
pub async fn handle_get(
    State(state): State<AppState>,
    user: UserContext,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.sessions.get(&user, id).await?))
}

/// PUT /api/v1/assessments/:id/config
pub async fn handle_reconfigure(
    State(state): State<AppState>,
    user: UserContext,
    Path(id): Path<Uuid>,
    Json(config): Json<SessionConfig>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.sessions.reconfigure(&user, id, config).await?))
}

/// POST /api/v1/assessments/:id/generate
pub async fn handle_generate(
    State(state): State<AppState>,
    user: UserContext,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.sessions.generate(&user, id).await?))
}

/// POST /api/v1/assessments/:id/answers
pub async fn handle_answer(
    State(state): State<AppState>,
    user: UserContext,
    Path(id): Path<Uuid>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<SessionView>, AppError> {
    let view = state
        .sessions
        .select_answer(&user, id, request.index, request.answer)
        .await?;
    Ok(Json(view))
}

/// POST /api/v1/assessments/:id/answers/voice
pub async fn handle_voice_answer(
    State(state): State<AppState>,
    user: UserContext,
    Path(id): Path<Uuid>,
    Json(request): Json<VoiceAnswerRequest>,
) -> Result<Json<SessionView>, AppError> {
    let view = state
        .sessions
        .answer_by_voice(&user, id, request.index, request.clip)
        .await?;
    Ok(Json(view))
}

/// POST /api/v1/assessments/:id/navigate
pub async fn handle_navigate(
    State(state): State<AppState>,
    user: UserContext,
    Path(id): Path<Uuid>,
    Json(request): Json<NavigateRequest>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(
        state.sessions.navigate(&user, id, request.direction).await?,
    ))
}

/// POST /api/v1/assessments/:id/submit
pub async fn handle_submit(
    State(state): State<AppState>,
    user: UserContext,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.sessions.submit(&user, id).await?))
}

/// POST /api/v1/assessments/:id/restart
///
/// Returns the replacement session; the old id stops resolving.
pub async fn handle_restart(
    State(state): State<AppState>,
    user: UserContext,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    let view = state.sessions.restart(&user, id).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// DELETE /api/v1/assessments/:id
pub async fn handle_discard(
    State(state): State<AppState>,
    user: UserContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.discard(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/assessments/:id/speech
///
/// The body is optional; without one the current question is read.
pub async fn handle_speech(
    State(state): State<AppState>,
    user: UserContext,
    Path(id): Path<Uuid>,
    body: Option<Json<SpeechRequest>>,
) -> Result<Json<Speech>, AppError> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    Ok(Json(
        state.sessions.speak_question(&user, id, request.index).await?,
    ))
}
