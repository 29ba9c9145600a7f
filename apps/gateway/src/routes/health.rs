use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version and enabled features.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "assessment-gateway",
        "quiz_evaluation": state.config.quiz_evaluation.as_str(),
        "voice_enabled": state.config.voice_enabled,
    }))
}
