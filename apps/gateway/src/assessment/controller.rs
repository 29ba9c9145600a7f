//! Session controller: drives `AssessmentSession`s against the backend.
//!
//! Sessions live in memory only. Network calls happen outside the store lock;
//! each one carries the session's epoch as a ticket and its response is applied
//! only if the session still exists with that epoch. Anything else is a stale
//! response and is dropped.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::assessment::evaluator::{AssessmentBackend, Submission};
use crate::assessment::models::{AssessmentKind, SessionConfig};
use crate::assessment::scoring::local_evaluation;
use crate::assessment::session::{
    AssessmentSession, Direction, Operation, SessionPhase, SessionView,
};
use crate::auth::UserContext;
use crate::config::EvaluationMode;
use crate::errors::AppError;
use crate::voice::{Speech, VoiceCapability, VoiceClip};

pub type SessionStore = Arc<RwLock<HashMap<Uuid, AssessmentSession>>>;

const SUPERSEDED: &str = "This request was superseded by a newer action on the session";

/// Upper bound on how often idle sessions are swept.
const MAX_SWEEP_PERIOD: Duration = Duration::from_secs(60);

enum PendingSubmit {
    /// Scored in-process; nothing left to send.
    Scored(SessionView),
    Remote(u64, Submission),
}

enum PendingVoice {
    /// Already evaluated; the recording is not transcribed.
    Ignored(SessionView),
    Transcribe(u64, usize),
}

#[derive(Clone)]
pub struct SessionController {
    sessions: SessionStore,
    backend: Arc<dyn AssessmentBackend>,
    voice: Arc<dyn VoiceCapability>,
    quiz_evaluation: EvaluationMode,
    idle_timeout: Duration,
}

impl SessionController {
    pub fn new(
        backend: Arc<dyn AssessmentBackend>,
        voice: Arc<dyn VoiceCapability>,
        quiz_evaluation: EvaluationMode,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            backend,
            voice,
            quiz_evaluation,
            idle_timeout,
        }
    }

    /// Drops sessions nobody has touched within the idle timeout. A client
    /// that navigates away never says so; this is how its session goes.
    pub async fn evict_idle(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, s| {
            let idle = s.is_idle(now, self.idle_timeout);
            if idle {
                debug!(session_id = %id, "Evicting idle assessment session");
            }
            !idle
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!(evicted, remaining = sessions.len(), "Idle assessment sessions evicted");
        }
        evicted
    }

    /// Runs `evict_idle` periodically for the life of the process.
    pub fn spawn_sweeper(&self) -> JoinHandle<()> {
        let period = self.idle_timeout.min(MAX_SWEEP_PERIOD);
        let this = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                this.evict_idle().await;
            }
        })
    }

    pub async fn create(
        &self,
        user: &UserContext,
        config: SessionConfig,
    ) -> Result<SessionView, AppError> {
        config.validate()?;
        let session = AssessmentSession::new(user.user_id.clone(), config);
        let view = session.view();
        info!(session_id = %view.id, kind = ?view.kind, "Assessment session created");
        self.sessions.write().await.insert(session.id(), session);
        Ok(view)
    }

    /// Reading a session counts as activity.
    pub async fn get(&self, user: &UserContext, id: Uuid) -> Result<SessionView, AppError> {
        self.with_session(user, id, |s| Ok(s.view())).await
    }

    pub async fn reconfigure(
        &self,
        user: &UserContext,
        id: Uuid,
        config: SessionConfig,
    ) -> Result<SessionView, AppError> {
        config.validate()?;
        self.with_session(user, id, |s| {
            s.reconfigure(config)?;
            Ok(s.view())
        })
        .await
    }

    /// Fetches the question set: `configuring → in_progress` on success.
    pub async fn generate(&self, user: &UserContext, id: Uuid) -> Result<SessionView, AppError> {
        let (ticket, config) = self
            .with_session(user, id, |s| {
                let ticket = s.start_operation(Operation::Generate)?;
                Ok((ticket, s.config().clone()))
            })
            .await?;

        info!(session_id = %id, topic = config.target(), "Generating questions");
        let this = self.clone();
        let user = user.clone();
        detached(async move {
            let outcome = this.backend.generate(&user.user_id, &config).await;
            this.settle(&user, id, ticket, outcome, |s, questions| s.begin(questions))
                .await
        })
        .await
    }

    pub async fn select_answer(
        &self,
        user: &UserContext,
        id: Uuid,
        index: Option<usize>,
        answer: String,
    ) -> Result<SessionView, AppError> {
        self.with_session(user, id, |s| {
            s.select_answer(index, answer)?;
            Ok(s.view())
        })
        .await
    }

    pub async fn navigate(
        &self,
        user: &UserContext,
        id: Uuid,
        direction: Direction,
    ) -> Result<SessionView, AppError> {
        self.with_session(user, id, |s| {
            s.navigate(direction)?;
            Ok(s.view())
        })
        .await
    }

    /// Submits a fully answered session: `in_progress → submitted_evaluated` on success.
    /// Incomplete sessions are rejected before any network call.
    pub async fn submit(&self, user: &UserContext, id: Uuid) -> Result<SessionView, AppError> {
        let local = self.quiz_evaluation == EvaluationMode::Local;

        let pending = self
            .with_session(user, id, |s| {
                if local && s.kind() == AssessmentKind::Quiz {
                    s.check_operation(Operation::Evaluate)?;
                    let result = local_evaluation(s.questions(), s.answers());
                    s.apply_evaluation(result)?;
                    info!(session_id = %id, "Quiz scored locally");
                    return Ok(PendingSubmit::Scored(s.view()));
                }

                let ticket = s.start_operation(Operation::Evaluate)?;
                Ok(PendingSubmit::Remote(
                    ticket,
                    Submission {
                        config: s.config().clone(),
                        questions: s.questions().to_vec(),
                        answers: s.answers_in_order(),
                    },
                ))
            })
            .await?;

        let (ticket, submission) = match pending {
            PendingSubmit::Scored(view) => return Ok(view),
            PendingSubmit::Remote(ticket, submission) => (ticket, submission),
        };

        info!(session_id = %id, questions = submission.questions.len(), "Submitting answers");
        let this = self.clone();
        let user = user.clone();
        detached(async move {
            let outcome = this.backend.evaluate(&user.user_id, &submission).await;
            this.settle(&user, id, ticket, outcome, |s, result| s.apply_evaluation(result))
                .await
        })
        .await
    }

    /// Transcribes a recorded answer and stores it like a typed one.
    pub async fn answer_by_voice(
        &self,
        user: &UserContext,
        id: Uuid,
        index: Option<usize>,
        clip: VoiceClip,
    ) -> Result<SessionView, AppError> {
        let pending = self
            .with_session(user, id, |s| {
                if s.phase() == SessionPhase::SubmittedEvaluated {
                    debug!(session_id = %id, "Ignoring voice answer after submission");
                    return Ok(PendingVoice::Ignored(s.view()));
                }
                let ticket = s.start_operation(Operation::Transcribe)?;
                Ok(PendingVoice::Transcribe(
                    ticket,
                    index.unwrap_or(s.current_index()),
                ))
            })
            .await?;

        let (ticket, index) = match pending {
            PendingVoice::Ignored(view) => return Ok(view),
            PendingVoice::Transcribe(ticket, index) => (ticket, index),
        };

        let this = self.clone();
        let user = user.clone();
        detached(async move {
            let outcome = this.voice.transcribe(&user.user_id, &clip).await;
            this.settle(&user, id, ticket, outcome, |s, transcript| {
                s.select_answer(Some(index), transcript).map(|_| ())
            })
            .await
        })
        .await
    }

    /// Synthesizes speech for a question. Does not touch session state.
    pub async fn speak_question(
        &self,
        user: &UserContext,
        id: Uuid,
        index: Option<usize>,
    ) -> Result<Speech, AppError> {
        let text = self
            .with_session(user, id, |s| {
                let index = index.unwrap_or(s.current_index());
                s.questions()
                    .get(index)
                    .map(|q| q.text.clone())
                    .ok_or_else(|| {
                        AppError::Validation(format!("Question {} does not exist", index + 1))
                    })
            })
            .await?;
        self.voice.speak(&user.user_id, &text).await
    }

    /// Replaces the session with a brand-new one for the same configuration.
    /// Responses still in flight for the old session are dropped on arrival.
    pub async fn restart(&self, user: &UserContext, id: Uuid) -> Result<SessionView, AppError> {
        let mut sessions = self.sessions.write().await;
        let fresh = sessions
            .get(&id)
            .filter(|s| s.user_id() == user.user_id)
            .map(AssessmentSession::restarted)
            .ok_or_else(|| not_found(id))?;
        sessions.remove(&id);

        let view = fresh.view();
        info!(old_session_id = %id, session_id = %view.id, "Assessment session restarted");
        sessions.insert(fresh.id(), fresh);
        Ok(view)
    }

    /// Forgets the session, e.g. when the user navigates away.
    pub async fn discard(&self, user: &UserContext, id: Uuid) -> Result<(), AppError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get(&id) {
            Some(s) if s.user_id() == user.user_id => {
                sessions.remove(&id);
                info!(session_id = %id, "Assessment session discarded");
                Ok(())
            }
            _ => Err(not_found(id)),
        }
    }

    /// Runs `f` against the user's session under the write lock. Validation
    /// failures are also recorded on the session so the UI can show them.
    async fn with_session<R>(
        &self,
        user: &UserContext,
        id: Uuid,
        f: impl FnOnce(&mut AssessmentSession) -> Result<R, AppError>,
    ) -> Result<R, AppError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&id)
            .filter(|s| s.user_id() == user.user_id)
            .ok_or_else(|| not_found(id))?;

        session.touch();
        let result = f(&mut *session);
        if let Err(AppError::Validation(message)) = &result {
            session.record_failure(message.clone());
        }
        result
    }

    /// Applies a backend outcome if its ticket is still current.
    async fn settle<T>(
        &self,
        user: &UserContext,
        id: Uuid,
        ticket: u64,
        outcome: Result<T, AppError>,
        apply: impl FnOnce(&mut AssessmentSession, T) -> Result<(), AppError>,
    ) -> Result<SessionView, AppError> {
        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions
            .get_mut(&id)
            .filter(|s| s.user_id() == user.user_id)
        else {
            warn!(session_id = %id, "Dropping response for a session that no longer exists");
            return Err(AppError::Conflict(SUPERSEDED.to_string()));
        };

        if !session.is_current(ticket) {
            warn!(session_id = %id, ticket, "Dropping stale response");
            return Err(AppError::Conflict(SUPERSEDED.to_string()));
        }

        session.finish_operation();
        session.touch();
        let applied = match outcome {
            Ok(value) => apply(&mut *session, value),
            Err(e) => Err(e),
        };
        match applied {
            Ok(()) => Ok(session.view()),
            Err(e) => {
                warn!(session_id = %id, "Session transition failed: {e}");
                session.record_failure(e.user_message());
                Err(e)
            }
        }
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Assessment session {id} not found"))
}

/// Runs `fut` on its own task so it completes even if the caller disconnects;
/// otherwise the session would keep its in-flight marker forever.
async fn detached<F, T>(fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(fut)
        .await
        .map_err(|e| AppError::Internal(anyhow::Error::new(e)))?
}
