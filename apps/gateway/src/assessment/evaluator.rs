//! Remote evaluator binding: pluggable, trait-based access to question
//! generation and answer evaluation.
//!
//! Default: `HttpAssessmentBackend`, which speaks the backend's envelope protocol.
//! The controller holds an `Arc<dyn AssessmentBackend>` so tests can swap in stubs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::assessment::models::{Difficulty, EvaluationResult, Question, QuestionSet, SessionConfig};
use crate::backend_client::{paths, BackendClient, BackendError};
use crate::errors::AppError;

// ────────────────────────────────────────────────────────────────────────────
// Submission snapshot
// ────────────────────────────────────────────────────────────────────────────

/// Everything needed to evaluate an attempt, copied out of the session so the
/// session lock is not held across the network call.
#[derive(Debug, Clone)]
pub struct Submission {
    pub config: SessionConfig,
    pub questions: Vec<Question>,
    /// One entry per question, `""` where unanswered.
    pub answers: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait AssessmentBackend: Send + Sync {
    async fn generate(
        &self,
        user_id: &str,
        config: &SessionConfig,
    ) -> Result<QuestionSet, AppError>;

    async fn evaluate(
        &self,
        user_id: &str,
        submission: &Submission,
    ) -> Result<EvaluationResult, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct QuizGenerateData<'a> {
    skill: &'a str,
    difficulty: Difficulty,
    num_questions: u32,
}

#[derive(Debug, Serialize)]
struct InterviewStartData<'a> {
    domain: &'a str,
    role: &'a str,
    difficulty: Difficulty,
    num_questions: u32,
}

#[derive(Debug, Serialize)]
struct QuizQuestionPayload<'a> {
    question: &'a str,
    options: &'a [String],
    correct: &'a str,
}

#[derive(Debug, Serialize)]
struct QuizEvaluateData<'a> {
    skill: &'a str,
    questions: Vec<QuizQuestionPayload<'a>>,
    answers: &'a [String],
}

#[derive(Debug, Serialize)]
struct InterviewQuestionPayload<'a> {
    question: &'a str,
    expected_points: &'a [String],
}

#[derive(Debug, Serialize)]
struct InterviewEvaluateData<'a> {
    domain: &'a str,
    role: &'a str,
    questions: Vec<InterviewQuestionPayload<'a>>,
    answers: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EvaluationEnvelope {
    #[serde(alias = "evaluation")]
    result: EvaluationResult,
}

// ────────────────────────────────────────────────────────────────────────────
// HttpAssessmentBackend (default implementation)
// ────────────────────────────────────────────────────────────────────────────

pub struct HttpAssessmentBackend {
    client: BackendClient,
}

impl HttpAssessmentBackend {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AssessmentBackend for HttpAssessmentBackend {
    async fn generate(
        &self,
        user_id: &str,
        config: &SessionConfig,
    ) -> Result<QuestionSet, AppError> {
        let response: QuestionSet = match config {
            SessionConfig::Quiz {
                skill,
                difficulty,
                num_questions,
            } => {
                let data = QuizGenerateData {
                    skill: skill.trim(),
                    difficulty: *difficulty,
                    num_questions: *num_questions,
                };
                self.client
                    .post_envelope(paths::QUIZ_GENERATE, user_id, &data)
                    .await?
            }
            SessionConfig::Interview {
                domain,
                role,
                difficulty,
                num_questions,
            } => {
                let data = InterviewStartData {
                    domain: domain.trim(),
                    role: role.trim(),
                    difficulty: *difficulty,
                    num_questions: *num_questions,
                };
                self.client
                    .post_envelope(paths::INTERVIEW_START, user_id, &data)
                    .await?
            }
        };

        if response.questions.is_empty() {
            return Err(BackendError::Rejected {
                status: "ok".to_string(),
                message: "The backend returned no questions".to_string(),
            }
            .into());
        }
        Ok(response)
    }

    async fn evaluate(
        &self,
        user_id: &str,
        submission: &Submission,
    ) -> Result<EvaluationResult, AppError> {
        let envelope: EvaluationEnvelope = match &submission.config {
            SessionConfig::Quiz { skill, .. } => {
                let data = QuizEvaluateData {
                    skill: skill.trim(),
                    questions: submission
                        .questions
                        .iter()
                        .map(|q| QuizQuestionPayload {
                            question: &q.text,
                            options: &q.options,
                            correct: &q.correct_answer,
                        })
                        .collect(),
                    answers: &submission.answers,
                };
                self.client
                    .post_envelope(paths::QUIZ_EVALUATE, user_id, &data)
                    .await?
            }
            SessionConfig::Interview { domain, role, .. } => {
                let data = InterviewEvaluateData {
                    domain: domain.trim(),
                    role: role.trim(),
                    questions: submission
                        .questions
                        .iter()
                        .map(|q| InterviewQuestionPayload {
                            question: &q.text,
                            expected_points: &q.expected_points,
                        })
                        .collect(),
                    answers: &submission.answers,
                };
                self.client
                    .post_envelope(paths::INTERVIEW_EVALUATE, user_id, &data)
                    .await?
            }
        };
        Ok(envelope.result)
    }
}
