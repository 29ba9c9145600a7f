//! Axum route handlers for the career tools.

use axum::{extract::State, Json};
use serde_json::Value;
use tracing::info;

use crate::auth::UserContext;
use crate::backend_client::paths;
use crate::career::jobs::{JobRecommendations, JobSearchRequest, RawJobs};
use crate::career::learning::LearningPlanRequest;
use crate::career::resume::{ResumeTextRequest, StructuredResume};
use crate::career::strip_envelope;
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/v1/jobs/recommend
pub async fn handle_recommend_jobs(
    State(state): State<AppState>,
    user: UserContext,
    Json(request): Json<JobSearchRequest>,
) -> Result<Json<JobRecommendations>, AppError> {
    let payload = request.into_payload()?;
    let _guard = state.in_flight.acquire(&user.user_id, "job search")?;

    info!(skills = payload.skills.len(), role = %payload.target_role, "Requesting job recommendations");
    let raw: RawJobs = state
        .backend
        .post_envelope(paths::JOBS_RECOMMEND, &user.user_id, &payload)
        .await?;

    Ok(Json(JobRecommendations::from(raw)))
}

/// POST /api/v1/learning/plan
pub async fn handle_learning_plan(
    State(state): State<AppState>,
    user: UserContext,
    Json(request): Json<LearningPlanRequest>,
) -> Result<Json<Value>, AppError> {
    let payload = request.into_payload()?;
    let _guard = state.in_flight.acquire(&user.user_id, "learning plan")?;

    let plan: Value = state
        .backend
        .post_envelope(paths::LEARNING_GENERATE, &user.user_id, &payload)
        .await?;

    Ok(Json(strip_envelope(plan)))
}

/// POST /api/v1/resume/analyze
pub async fn handle_resume_analyze(
    State(state): State<AppState>,
    user: UserContext,
    Json(request): Json<ResumeTextRequest>,
) -> Result<Json<Value>, AppError> {
    resume_text_call(&state, &user, paths::RESUME_ANALYZE, "resume analysis", request).await
}

/// POST /api/v1/resume/enhance
pub async fn handle_resume_enhance(
    State(state): State<AppState>,
    user: UserContext,
    Json(request): Json<ResumeTextRequest>,
) -> Result<Json<Value>, AppError> {
    resume_text_call(&state, &user, paths::RESUME_ENHANCE, "resume enhancement", request).await
}

/// POST /api/v1/resume/generate
pub async fn handle_resume_generate(
    State(state): State<AppState>,
    user: UserContext,
    Json(resume): Json<StructuredResume>,
) -> Result<Json<Value>, AppError> {
    resume.validate()?;
    let resume = resume.cleaned();
    let _guard = state.in_flight.acquire(&user.user_id, "resume generation")?;

    let generated: Value = state
        .backend
        .post_envelope(paths::RESUME_GENERATE, &user.user_id, &resume)
        .await?;

    Ok(Json(strip_envelope(generated)))
}

async fn resume_text_call(
    state: &AppState,
    user: &UserContext,
    path: &str,
    action: &'static str,
    request: ResumeTextRequest,
) -> Result<Json<Value>, AppError> {
    request.validate()?;
    let _guard = state.in_flight.acquire(&user.user_id, action)?;

    let response: Value = state
        .backend
        .post_envelope(path, &user.user_id, &request)
        .await?;

    Ok(Json(strip_envelope(response)))
}
