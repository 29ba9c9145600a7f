use crate::assessment::SessionController;
use crate::backend_client::BackendClient;
use crate::config::Config;
use crate::inflight::InFlight;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Used directly by the single-shot career calls.
    pub backend: BackendClient,
    pub sessions: SessionController,
    pub in_flight: InFlight,
    pub config: Config,
}
