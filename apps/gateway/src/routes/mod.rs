pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::assessment::handlers as assessments;
use crate::career::handlers as career;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Assessment sessions
        .route("/api/v1/assessments", post(assessments::handle_create))
        .route(
            "/api/v1/assessments/:id",
            get(assessments::handle_get).delete(assessments::handle_discard),
        )
        .route(
            "/api/v1/assessments/:id/config",
            put(assessments::handle_reconfigure),
        )
        .route(
            "/api/v1/assessments/:id/generate",
            post(assessments::handle_generate),
        )
        .route(
            "/api/v1/assessments/:id/answers",
            post(assessments::handle_answer),
        )
        .route(
            "/api/v1/assessments/:id/answers/voice",
            post(assessments::handle_voice_answer),
        )
        .route(
            "/api/v1/assessments/:id/navigate",
            post(assessments::handle_navigate),
        )
        .route(
            "/api/v1/assessments/:id/submit",
            post(assessments::handle_submit),
        )
        .route(
            "/api/v1/assessments/:id/restart",
            post(assessments::handle_restart),
        )
        .route(
            "/api/v1/assessments/:id/speech",
            post(assessments::handle_speech),
        )
        // Career tools
        .route("/api/v1/jobs/recommend", post(career::handle_recommend_jobs))
        .route("/api/v1/learning/plan", post(career::handle_learning_plan))
        .route(
            "/api/v1/resume/analyze",
            post(career::handle_resume_analyze),
        )
        .route(
            "/api/v1/resume/enhance",
            post(career::handle_resume_enhance),
        )
        .route(
            "/api/v1/resume/generate",
            post(career::handle_resume_generate),
        )
        .with_state(state)
}
