// Assessment sessions: quiz and mock interview.
// Implements: answer normalization, the session state machine, local scoring,
// and the remote evaluator binding. All backend calls go through backend_client.

pub mod controller;
pub mod evaluator;
pub mod handlers;
pub mod models;
pub mod normalizer;
pub mod scoring;
pub mod session;

pub use controller::SessionController;
pub use evaluator::HttpAssessmentBackend;
