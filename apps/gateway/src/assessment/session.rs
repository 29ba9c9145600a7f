//! The assessment session state machine.
//!
//! `configuring → in_progress → submitted_evaluated`, forward only. Restarting
//! builds a new session instead of rewinding this one. All methods are
//! synchronous and perform no I/O; the controller owns the network calls.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::{Duration, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::assessment::models::{
    AssessmentKind, EvaluationResult, Question, QuestionMetadata, QuestionSet, SessionConfig,
};
use crate::assessment::normalizer::{has_mixed_markers, normalize_options, OptionToken};
use crate::assessment::scoring::calculate_score;
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Configuring,
    InProgress,
    SubmittedEvaluated,
}

/// Backend-bound actions. At most one is in flight per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Generate,
    Evaluate,
    Transcribe,
}

impl Operation {
    fn describe(self) -> &'static str {
        match self {
            Operation::Generate => "Question generation",
            Operation::Evaluate => "Evaluation",
            Operation::Transcribe => "Transcription",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Next,
    Previous,
}

/// Outcome of an answer selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Recorded,
    /// The session is already evaluated; nothing changed.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct AssessmentSession {
    id: Uuid,
    user_id: String,
    config: SessionConfig,
    phase: SessionPhase,
    questions: Vec<Question>,
    interview_id: Option<String>,
    answers: BTreeMap<usize, String>,
    current_index: usize,
    evaluation: Option<EvaluationResult>,
    last_error: Option<String>,
    in_flight: Option<Operation>,
    epoch: u64,
    created_at: DateTime<Utc>,
    evaluated_at: Option<DateTime<Utc>>,
    last_active: Instant,
}

impl AssessmentSession {
    pub fn new(user_id: impl Into<String>, config: SessionConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            config,
            phase: SessionPhase::Configuring,
            questions: Vec::new(),
            interview_id: None,
            answers: BTreeMap::new(),
            current_index: 0,
            evaluation: None,
            last_error: None,
            in_flight: None,
            epoch: 0,
            created_at: Utc::now(),
            evaluated_at: None,
            last_active: Instant::now(),
        }
    }

    /// A fresh session for the same user and configuration.
    pub fn restarted(&self) -> Self {
        Self::new(self.user_id.clone(), self.config.clone())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn kind(&self) -> AssessmentKind {
        self.config.kind()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &BTreeMap<usize, String> {
        &self.answers
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn in_flight(&self) -> Option<Operation> {
        self.in_flight
    }

    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    /// Untouched for at least `timeout` with nothing in flight.
    pub fn is_idle(&self, now: Instant, timeout: Duration) -> bool {
        self.in_flight.is_none() && now.saturating_duration_since(self.last_active) >= timeout
    }

    /// Replaces the configuration. Any generate response still on its way
    /// is dropped when it arrives.
    pub fn reconfigure(&mut self, config: SessionConfig) -> Result<(), AppError> {
        if self.phase != SessionPhase::Configuring {
            return Err(AppError::Conflict(
                "Configuration can only change before questions are loaded".to_string(),
            ));
        }
        self.config = config;
        self.epoch += 1;
        self.in_flight = None;
        self.last_error = None;
        Ok(())
    }

    /// Checks that `op` may start now, without marking it in flight.
    pub fn check_operation(&self, op: Operation) -> Result<(), AppError> {
        if let Some(active) = self.in_flight {
            return Err(AppError::Conflict(format!(
                "{} is already in progress",
                active.describe()
            )));
        }

        match (op, self.phase) {
            (Operation::Generate, SessionPhase::Configuring) => Ok(()),
            (Operation::Generate, _) => Err(AppError::Conflict(
                "Questions are already loaded; restart to take another".to_string(),
            )),
            (_, SessionPhase::Configuring) => Err(AppError::Conflict(
                "No questions have been loaded yet".to_string(),
            )),
            (_, SessionPhase::SubmittedEvaluated) => Err(AppError::Conflict(
                "This assessment has already been submitted".to_string(),
            )),
            (Operation::Transcribe, SessionPhase::InProgress) => {
                if self.kind() != AssessmentKind::Interview {
                    return Err(AppError::Validation(
                        "Voice answers are only accepted for interviews".to_string(),
                    ));
                }
                Ok(())
            }
            (Operation::Evaluate, SessionPhase::InProgress) => {
                if !self.is_complete() {
                    return Err(AppError::Validation(format!(
                        "Please answer all {} questions before submitting ({} answered)",
                        self.questions.len(),
                        self.answered_count()
                    )));
                }
                Ok(())
            }
        }
    }

    /// Marks `op` in flight and returns the ticket its response must present.
    pub fn start_operation(&mut self, op: Operation) -> Result<u64, AppError> {
        self.check_operation(op)?;
        self.in_flight = Some(op);
        self.last_error = None;
        Ok(self.epoch)
    }

    /// True if a response issued under `ticket` still belongs to this session state.
    pub fn is_current(&self, ticket: u64) -> bool {
        self.epoch == ticket
    }

    pub fn finish_operation(&mut self) {
        self.in_flight = None;
    }

    /// `configuring → in_progress` with a freshly fetched question set.
    pub fn begin(&mut self, set: QuestionSet) -> Result<(), AppError> {
        if self.phase != SessionPhase::Configuring {
            return Err(AppError::Conflict(
                "Questions are already loaded for this session".to_string(),
            ));
        }

        let QuestionSet {
            questions,
            interview_id,
        } = set;
        for (index, question) in questions.iter().enumerate() {
            if has_mixed_markers(&question.options) {
                warn!(
                    session_id = %self.id,
                    question = index + 1,
                    "Options mix marked and unmarked entries; tokens are assigned per option"
                );
            }
        }

        self.questions = questions;
        self.interview_id = interview_id;
        self.answers.clear();
        self.current_index = 0;
        self.phase = SessionPhase::InProgress;
        self.last_error = None;
        Ok(())
    }

    /// Records an answer for `index`, or for the current question when `index` is `None`.
    /// Overwrites any previous answer for that question.
    pub fn select_answer(
        &mut self,
        index: Option<usize>,
        answer: String,
    ) -> Result<Selection, AppError> {
        match self.phase {
            SessionPhase::SubmittedEvaluated => {
                debug!(session_id = %self.id, "Ignoring answer after submission");
                return Ok(Selection::Ignored);
            }
            SessionPhase::Configuring => {
                return Err(AppError::Conflict(
                    "No questions have been loaded yet".to_string(),
                ));
            }
            SessionPhase::InProgress => {}
        }

        if self.in_flight == Some(Operation::Evaluate) {
            return Err(AppError::Conflict(
                "Answers cannot change while the evaluation is in progress".to_string(),
            ));
        }

        let index = index.unwrap_or(self.current_index);
        let question = self.questions.get(index).ok_or_else(|| {
            AppError::Validation(format!(
                "Question {} does not exist (this assessment has {})",
                index + 1,
                self.questions.len()
            ))
        })?;

        let answer = match self.kind() {
            AssessmentKind::Quiz => {
                let token = answer.trim();
                let offered = normalize_options(&question.options);
                if !offered.iter().any(|o| o.token == token) {
                    return Err(AppError::Validation(format!(
                        "'{token}' is not one of the options for question {}",
                        index + 1
                    )));
                }
                token.to_string()
            }
            AssessmentKind::Interview => answer,
        };

        self.answers.insert(index, answer);
        self.last_error = None;
        Ok(Selection::Recorded)
    }

    /// Moves the cursor, clamped to the question range. Returns the new index.
    pub fn navigate(&mut self, direction: Direction) -> Result<usize, AppError> {
        if self.phase != SessionPhase::InProgress {
            return Err(AppError::Conflict(
                "Navigation is only possible while answering".to_string(),
            ));
        }
        let last = self.questions.len().saturating_sub(1);
        self.current_index = match direction {
            Direction::Next => (self.current_index + 1).min(last),
            Direction::Previous => self.current_index.saturating_sub(1),
        };
        Ok(self.current_index)
    }

    pub fn answered_count(&self) -> usize {
        self.answers
            .values()
            .filter(|answer| !answer.trim().is_empty())
            .count()
    }

    /// Every question has a non-blank answer.
    pub fn is_complete(&self) -> bool {
        !self.questions.is_empty()
            && (0..self.questions.len()).all(|i| {
                self.answers
                    .get(&i)
                    .is_some_and(|answer| !answer.trim().is_empty())
            })
    }

    /// Answers by position, with `""` for anything unanswered.
    pub fn answers_in_order(&self) -> Vec<String> {
        (0..self.questions.len())
            .map(|i| self.answers.get(&i).cloned().unwrap_or_default())
            .collect()
    }

    /// Percentage correct computed in-process. Quizzes only.
    pub fn local_score(&self) -> Option<u32> {
        match self.kind() {
            AssessmentKind::Quiz => Some(calculate_score(&self.questions, &self.answers)),
            AssessmentKind::Interview => None,
        }
    }

    /// `in_progress → submitted_evaluated`, keeping the result as received.
    pub fn apply_evaluation(&mut self, result: EvaluationResult) -> Result<(), AppError> {
        if self.phase != SessionPhase::InProgress {
            return Err(AppError::Conflict(
                "This assessment is not awaiting evaluation".to_string(),
            ));
        }
        self.evaluation = Some(result);
        self.phase = SessionPhase::SubmittedEvaluated;
        self.evaluated_at = Some(Utc::now());
        self.last_error = None;
        Ok(())
    }

    /// Keeps phase and answers; only the error message changes.
    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    pub fn view(&self) -> SessionView {
        let revealed = self.phase == SessionPhase::SubmittedEvaluated;

        let questions = self
            .questions
            .iter()
            .enumerate()
            .map(|(index, q)| QuestionView {
                index,
                text: q.text.clone(),
                options: normalize_options(&q.options),
                metadata: q.metadata.clone(),
                expected_points: q.expected_points.clone(),
                correct_answer: revealed.then(|| q.correct_answer.clone()),
                explanation: if revealed { q.explanation.clone() } else { None },
            })
            .collect();

        SessionView {
            id: self.id,
            kind: self.kind(),
            phase: self.phase,
            config: self.config.clone(),
            interview_id: self.interview_id.clone(),
            questions,
            answers: self.answers.clone(),
            answered: self.answered_count(),
            total: self.questions.len(),
            current_index: self.current_index,
            complete: self.is_complete(),
            score: if revealed { self.display_score() } else { None },
            evaluation: self.evaluation.clone(),
            error: self.last_error.clone(),
            in_flight: self.in_flight,
            created_at: self.created_at,
            evaluated_at: self.evaluated_at,
        }
    }

    /// The backend's score when it sent one, otherwise the local score.
    fn display_score(&self) -> Option<u32> {
        self.evaluation
            .as_ref()
            .and_then(|e| e.score)
            .map(|s| s.round().max(0.0) as u32)
            .or_else(|| self.local_score())
    }
}

/// A question as shown to the user. The correct answer and explanation stay
/// hidden until the session is evaluated.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub index: usize,
    pub text: String,
    pub options: Vec<OptionToken>,
    #[serde(flatten)]
    pub metadata: QuestionMetadata,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub expected_points: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub kind: AssessmentKind,
    pub phase: SessionPhase,
    pub config: SessionConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview_id: Option<String>,
    pub questions: Vec<QuestionView>,
    pub answers: BTreeMap<usize, String>,
    pub answered: usize,
    pub total: usize,
    pub current_index: usize,
    pub complete: bool,
    pub score: Option<u32>,
    pub evaluation: Option<EvaluationResult>,
    pub error: Option<String>,
    pub in_flight: Option<Operation>,
    pub created_at: DateTime<Utc>,
    pub evaluated_at: Option<DateTime<Utc>>,
}
