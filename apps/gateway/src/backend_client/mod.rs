/// Backend client: the single point of entry for all calls to the assessment backend.
///
/// ARCHITECTURAL RULE: No other module may issue HTTP requests to the backend.
/// Every request uses the `{ user_id, data }` envelope and every response must
/// carry `"status": "ok"` to count as a success.
///
/// No retries: a failed call is surfaced and the user re-triggers the action.
use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod paths;

const SUCCESS_STATUS: &str = "ok";

#[derive(Debug, Error)]
pub enum BackendError {
    /// No response at all: connection refused, DNS, timeout.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP error! status: {status}")]
    Status { status: u16, message: String },

    /// HTTP 2xx, but the envelope status was not "ok".
    #[error("Backend rejected the request (status '{status}'): {message}")]
    Rejected { status: String, message: String },

    #[error("Malformed backend response: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct Envelope<'a, D: Serialize + ?Sized> {
    user_id: &'a str,
    data: &'a D,
}

/// The single backend client used by all services in the gateway.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POSTs `{ user_id, data }` to `path` and deserializes the response body as `T`.
    ///
    /// The body is checked in this order: HTTP status, JSON syntax, envelope
    /// `status` field, then the shape of `T`.
    pub async fn post_envelope<D, T>(
        &self,
        path: &str,
        user_id: &str,
        data: &D,
    ) -> Result<T, BackendError>
    where
        D: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!(%url, "Calling backend");

        let response = self
            .client
            .post(&url)
            .json(&Envelope { user_id, data })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("Backend {} returned {}", path, status);
            return Err(BackendError::Status {
                status: status.as_u16(),
                message: extract_message(&body).unwrap_or(body),
            });
        }

        let value: Value = serde_json::from_str(&body)?;
        check_envelope_status(&value)?;

        Ok(serde_json::from_value(value)?)
    }
}

/// Succeeds only when the body is an object whose `status` is `"ok"`.
fn check_envelope_status(value: &Value) -> Result<(), BackendError> {
    let status = value.get("status").and_then(Value::as_str);
    if status == Some(SUCCESS_STATUS) {
        return Ok(());
    }

    let status = status.unwrap_or("missing").to_string();
    let message = value
        .get("message")
        .or_else(|| value.get("error"))
        .or_else(|| value.get("detail"))
        .and_then(Value::as_str)
        .unwrap_or("no details provided")
        .to_string();
    warn!("Backend envelope status '{status}': {message}");
    Err(BackendError::Rejected { status, message })
}

/// Pulls a human-readable message out of an error body, if it is JSON.
fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["detail", "message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_backend;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Echo {
        user_id: String,
        skill: String,
    }

    fn client(base_url: String) -> BackendClient {
        BackendClient::new(base_url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_check_envelope_status_ok() {
        assert!(check_envelope_status(&json!({"status": "ok"})).is_ok());
    }

    #[test]
    fn test_check_envelope_status_rejects_other_values() {
        let err = check_envelope_status(&json!({"status": "error", "message": "quota"}))
            .unwrap_err();
        match err {
            BackendError::Rejected { status, message } => {
                assert_eq!(status, "error");
                assert_eq!(message, "quota");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_check_envelope_status_missing_field() {
        let err = check_envelope_status(&json!({"questions": []})).unwrap_err();
        assert!(matches!(err, BackendError::Rejected { ref status, .. } if status == "missing"));
    }

    #[test]
    fn test_extract_message_prefers_detail() {
        let body = r#"{"detail": "skill is required", "message": "bad"}"#;
        assert_eq!(extract_message(body).as_deref(), Some("skill is required"));
        assert_eq!(extract_message("<html>oops</html>"), None);
    }

    #[tokio::test]
    async fn test_post_envelope_sends_user_id_and_data() {
        let router = Router::new().route(
            "/quiz/generate",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "status": "ok",
                    "user_id": body["user_id"],
                    "skill": body["data"]["skill"],
                }))
            }),
        );
        let backend = client(spawn_backend(router).await);

        let echo: Echo = backend
            .post_envelope("quiz/generate", "ada", &json!({"skill": "Rust"}))
            .await
            .unwrap();

        assert_eq!(echo.user_id, "ada");
        assert_eq!(echo.skill, "Rust");
    }

    #[tokio::test]
    async fn test_post_envelope_maps_http_500() {
        let router = Router::new().route(
            "/quiz/evaluate",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"detail": "evaluator crashed"})),
                )
            }),
        );
        let backend = client(spawn_backend(router).await);

        let err = backend
            .post_envelope::<_, Value>("quiz/evaluate", "ada", &json!({}))
            .await
            .unwrap_err();

        match err {
            BackendError::Status { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "evaluator crashed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_post_envelope_treats_non_ok_status_as_failure() {
        let router = Router::new().route(
            "/quiz/generate",
            post(|| async { Json(json!({"status": "failed", "error": "unknown skill"})) }),
        );
        let backend = client(spawn_backend(router).await);

        let err = backend
            .post_envelope::<_, Value>("quiz/generate", "ada", &json!({}))
            .await
            .unwrap_err();

        assert!(matches!(err, BackendError::Rejected { .. }));
    }

    #[tokio::test]
    async fn test_post_envelope_transport_failure() {
        // Bind then drop a listener so the port is very likely closed.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let backend = client(format!("http://{addr}"));
        let err = backend
            .post_envelope::<_, Value>("quiz/generate", "ada", &json!({}))
            .await
            .unwrap_err();

        assert!(matches!(err, BackendError::Transport(_)));
    }
}
