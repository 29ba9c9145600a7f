//! Helpers shared by the unit tests: a throwaway backend server and a
//! fully wired `AppState` pointing at it.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;

use crate::assessment::{HttpAssessmentBackend, SessionController};
use crate::backend_client::BackendClient;
use crate::config::{Config, EvaluationMode};
use crate::inflight::InFlight;
use crate::state::AppState;
use crate::voice::DisabledVoice;

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn_backend(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

pub fn test_config(backend_url: &str) -> Config {
    Config {
        backend_url: backend_url.to_string(),
        backend_timeout_secs: 5,
        quiz_evaluation: EvaluationMode::Remote,
        voice_enabled: false,
        session_idle_secs: 1800,
        port: 0,
        rust_log: "debug".to_string(),
    }
}

/// Builds the same state `main` does, with voice disabled.
pub fn test_state(backend_url: &str) -> AppState {
    let config = test_config(backend_url);
    let backend = BackendClient::new(
        &config.backend_url,
        Duration::from_secs(config.backend_timeout_secs),
    )
    .unwrap();
    let sessions = SessionController::new(
        Arc::new(HttpAssessmentBackend::new(backend.clone())),
        Arc::new(DisabledVoice),
        config.quiz_evaluation,
        Duration::from_secs(config.session_idle_secs),
    );
    AppState {
        backend,
        sessions,
        in_flight: InFlight::default(),
        config,
    }
}
