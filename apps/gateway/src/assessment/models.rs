use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::errors::AppError;

/// Upper bound on questions per session.
pub const MAX_QUESTIONS: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentKind {
    Quiz,
    Interview,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

fn default_num_questions() -> u32 {
    5
}

/// What the user asked for before the question set is fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionConfig {
    Quiz {
        skill: String,
        #[serde(default)]
        difficulty: Difficulty,
        #[serde(default = "default_num_questions")]
        num_questions: u32,
    },
    Interview {
        domain: String,
        role: String,
        #[serde(default)]
        difficulty: Difficulty,
        #[serde(default = "default_num_questions")]
        num_questions: u32,
    },
}

impl SessionConfig {
    pub fn kind(&self) -> AssessmentKind {
        match self {
            SessionConfig::Quiz { .. } => AssessmentKind::Quiz,
            SessionConfig::Interview { .. } => AssessmentKind::Interview,
        }
    }

    /// The skill (quiz) or role (interview) the session is assessing.
    pub fn target(&self) -> &str {
        match self {
            SessionConfig::Quiz { skill, .. } => skill,
            SessionConfig::Interview { role, .. } => role,
        }
    }

    /// Rejects blank required fields and out-of-range question counts.
    pub fn validate(&self) -> Result<(), AppError> {
        let num_questions = match self {
            SessionConfig::Quiz {
                skill,
                num_questions,
                ..
            } => {
                require_text("skill", skill)?;
                *num_questions
            }
            SessionConfig::Interview {
                domain,
                role,
                num_questions,
                ..
            } => {
                require_text("domain", domain)?;
                require_text("role", role)?;
                *num_questions
            }
        };

        if !(1..=MAX_QUESTIONS).contains(&num_questions) {
            return Err(AppError::Validation(format!(
                "num_questions must be between 1 and {MAX_QUESTIONS}"
            )));
        }
        Ok(())
    }
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionMetadata {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
}

/// A single question as fetched from the backend. Immutable once a session has it.
///
/// The backend is inconsistent about field names, so the common spellings are
/// all accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(alias = "question")]
    pub text: String,
    #[serde(default, alias = "choices")]
    pub options: Vec<String>,
    #[serde(
        default,
        alias = "correct",
        alias = "answer",
        deserialize_with = "string_or_number"
    )]
    pub correct_answer: String,
    #[serde(default, alias = "reason")]
    pub explanation: Option<String>,
    #[serde(flatten)]
    pub metadata: QuestionMetadata,
    #[serde(default, alias = "key_points")]
    pub expected_points: Vec<String>,
}

/// Accepts `"B"`, `2` or `null` for the correct answer.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// What a generate call returns: the questions plus the backend's id for an
/// interview, when it assigns one.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QuestionSet {
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default, deserialize_with = "optional_id")]
    pub interview_id: Option<String>,
}

impl From<Vec<Question>> for QuestionSet {
    fn from(questions: Vec<Question>) -> Self {
        Self {
            questions,
            interview_id: None,
        }
    }
}

fn optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Per-question feedback inside an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionDetail {
    /// 1-based question number.
    pub question: usize,
    pub correct: bool,
    #[serde(default)]
    pub your_answer: String,
    #[serde(default)]
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: Option<String>,
}

/// The backend's scoring/feedback payload. Stored and displayed as received;
/// fields this service does not know about are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<QuestionDetail>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
