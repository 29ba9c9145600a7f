mod assessment;
mod auth;
mod backend_client;
mod career;
mod config;
mod errors;
mod inflight;
mod routes;
mod state;
mod voice;

#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assessment::{HttpAssessmentBackend, SessionController};
use crate::backend_client::BackendClient;
use crate::config::Config;
use crate::inflight::InFlight;
use crate::routes::build_router;
use crate::state::AppState;
use crate::voice::{BackendVoice, DisabledVoice, VoiceCapability};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting assessment gateway v{}", env!("CARGO_PKG_VERSION"));

    let backend = BackendClient::new(
        &config.backend_url,
        Duration::from_secs(config.backend_timeout_secs),
    )?;
    info!(
        "Backend client initialized ({}, timeout {}s)",
        backend.base_url(),
        config.backend_timeout_secs
    );

    let voice: Arc<dyn VoiceCapability> = if config.voice_enabled {
        Arc::new(BackendVoice::new(backend.clone()))
    } else {
        Arc::new(DisabledVoice)
    };
    info!(
        "Voice {}, quiz evaluation: {}",
        if config.voice_enabled { "enabled" } else { "disabled" },
        config.quiz_evaluation.as_str()
    );

    let sessions = SessionController::new(
        Arc::new(HttpAssessmentBackend::new(backend.clone())),
        voice,
        config.quiz_evaluation,
        Duration::from_secs(config.session_idle_secs),
    );
    sessions.spawn_sweeper();
    info!("Idle sessions expire after {}s", config.session_idle_secs);

    // Build app state
    let state = AppState {
        backend,
        sessions,
        in_flight: InFlight::default(),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the web client's host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
