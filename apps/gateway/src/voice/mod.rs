//! Optional voice capability for interviews: speech-to-text for answers and
//! text-to-speech for reading questions aloud.
//!
//! The assessment core only sees the `VoiceCapability` trait. With voice
//! disabled, `DisabledVoice` is installed and both calls return 501.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend_client::{paths, BackendClient};
use crate::errors::AppError;

const DEFAULT_AUDIO_MIME: &str = "audio/webm";

/// A recorded answer, base64-encoded as captured by the browser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceClip {
    pub audio_base64: String,
    #[serde(default = "default_mime")]
    pub mime_type: String,
}

/// Synthesized audio for a piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Speech {
    pub audio_base64: String,
    #[serde(default = "default_mime")]
    pub mime_type: String,
}

fn default_mime() -> String {
    DEFAULT_AUDIO_MIME.to_string()
}

#[async_trait]
pub trait VoiceCapability: Send + Sync {
    async fn transcribe(&self, user_id: &str, clip: &VoiceClip) -> Result<String, AppError>;

    async fn speak(&self, user_id: &str, text: &str) -> Result<Speech, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// BackendVoice
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
enum VoiceRequest<'a> {
    Transcribe {
        audio_base64: &'a str,
        mime_type: &'a str,
    },
    Speak {
        text: &'a str,
    },
}

#[derive(Debug, Deserialize)]
struct TranscriptResponse {
    #[serde(alias = "text")]
    transcript: String,
}

/// Voice over the backend's `voice/process` endpoint.
pub struct BackendVoice {
    client: BackendClient,
}

impl BackendVoice {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VoiceCapability for BackendVoice {
    async fn transcribe(&self, user_id: &str, clip: &VoiceClip) -> Result<String, AppError> {
        if clip.audio_base64.trim().is_empty() {
            return Err(AppError::Validation("The recording is empty".to_string()));
        }

        let request = VoiceRequest::Transcribe {
            audio_base64: &clip.audio_base64,
            mime_type: &clip.mime_type,
        };
        let response: TranscriptResponse = self
            .client
            .post_envelope(paths::VOICE_PROCESS, user_id, &request)
            .await?;

        let transcript = response.transcript.trim().to_string();
        if transcript.is_empty() {
            return Err(AppError::Validation(
                "No speech was recognised in the recording".to_string(),
            ));
        }
        debug!(chars = transcript.len(), "Transcribed voice answer");
        Ok(transcript)
    }

    async fn speak(&self, user_id: &str, text: &str) -> Result<Speech, AppError> {
        let request = VoiceRequest::Speak { text };
        Ok(self
            .client
            .post_envelope(paths::VOICE_PROCESS, user_id, &request)
            .await?)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// DisabledVoice
// ────────────────────────────────────────────────────────────────────────────

pub struct DisabledVoice;

#[async_trait]
impl VoiceCapability for DisabledVoice {
    async fn transcribe(&self, _user_id: &str, _clip: &VoiceClip) -> Result<String, AppError> {
        Err(AppError::NotImplemented(
            "Voice input is not enabled on this server".to_string(),
        ))
    }

    async fn speak(&self, _user_id: &str, _text: &str) -> Result<Speech, AppError> {
        Err(AppError::NotImplemented(
            "Voice output is not enabled on this server".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_backend;
    use axum::{routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::time::Duration;

    async fn voice_backend() -> BackendVoice {
        let router = Router::new().route(
            "/voice/process",
            post(|Json(body): Json<Value>| async move {
                match body["data"]["mode"].as_str() {
                    Some("transcribe") => Json(json!({"status": "ok", "text": "  I would use a channel.  "})),
                    Some("speak") => Json(json!({"status": "ok", "audio_base64": "UklGRg=="})),
                    _ => Json(json!({"status": "error", "message": "unknown mode"})),
                }
            }),
        );
        let url = spawn_backend(router).await;
        BackendVoice::new(BackendClient::new(url, Duration::from_secs(5)).unwrap())
    }

    #[test]
    fn test_voice_request_is_tagged_by_mode() {
        let value = serde_json::to_value(VoiceRequest::Speak { text: "hi" }).unwrap();
        assert_eq!(value, json!({"mode": "speak", "text": "hi"}));
    }

    #[tokio::test]
    async fn test_transcribe_trims_transcript() {
        let voice = voice_backend().await;
        let clip = VoiceClip {
            audio_base64: "AAAA".into(),
            mime_type: default_mime(),
        };
        let text = voice.transcribe("ada", &clip).await.unwrap();
        assert_eq!(text, "I would use a channel.");
    }

    #[tokio::test]
    async fn test_transcribe_rejects_empty_clip() {
        let voice = voice_backend().await;
        let clip = VoiceClip {
            audio_base64: " ".into(),
            mime_type: default_mime(),
        };
        assert!(matches!(
            voice.transcribe("ada", &clip).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_speak_defaults_mime_type() {
        let voice = voice_backend().await;
        let speech = voice.speak("ada", "Question one").await.unwrap();
        assert_eq!(speech.audio_base64, "UklGRg==");
        assert_eq!(speech.mime_type, DEFAULT_AUDIO_MIME);
    }

    #[tokio::test]
    async fn test_disabled_voice_is_not_implemented() {
        let clip = VoiceClip {
            audio_base64: "AAAA".into(),
            mime_type: default_mime(),
        };
        assert!(matches!(
            DisabledVoice.transcribe("ada", &clip).await,
            Err(AppError::NotImplemented(_))
        ));
        assert!(matches!(
            DisabledVoice.speak("ada", "hi").await,
            Err(AppError::NotImplemented(_))
        ));
    }
}
