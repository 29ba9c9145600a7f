use anyhow::{bail, Context, Result};

/// How quiz submissions are scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationMode {
    /// Answers are sent to the backend's `quiz/evaluate` endpoint.
    Remote,
    /// Answers are scored in-process against each question's correct answer.
    Local,
}

impl EvaluationMode {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(EvaluationMode::Remote),
            "local" => Ok(EvaluationMode::Local),
            other => bail!("QUIZ_EVALUATION must be 'remote' or 'local', got '{other}'"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EvaluationMode::Remote => "remote",
            EvaluationMode::Local => "local",
        }
    }
}

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend_url: String,
    pub backend_timeout_secs: u64,
    pub quiz_evaluation: EvaluationMode,
    pub voice_enabled: bool,
    /// Sessions untouched for this long are discarded.
    pub session_idle_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            backend_url: require_env("BACKEND_URL")?
                .trim_end_matches('/')
                .to_string(),
            backend_timeout_secs: std::env::var("BACKEND_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse::<u64>()
                .context("BACKEND_TIMEOUT_SECS must be a whole number of seconds")?,
            quiz_evaluation: EvaluationMode::parse(
                &std::env::var("QUIZ_EVALUATION").unwrap_or_else(|_| "remote".to_string()),
            )?,
            voice_enabled: parse_flag(
                &std::env::var("VOICE_ENABLED").unwrap_or_else(|_| "false".to_string()),
            )
            .context("VOICE_ENABLED must be true or false")?,
            session_idle_secs: parse_idle_secs(
                &std::env::var("SESSION_IDLE_SECS").unwrap_or_else(|_| "1800".to_string()),
            )?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_idle_secs(value: &str) -> Result<u64> {
    let secs = value
        .trim()
        .parse::<u64>()
        .context("SESSION_IDLE_SECS must be a whole number of seconds")?;
    if secs == 0 {
        bail!("SESSION_IDLE_SECS must be greater than zero");
    }
    Ok(secs)
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("unrecognised flag value '{other}'"),
    }
}
