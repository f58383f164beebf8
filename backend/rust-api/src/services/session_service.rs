use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::{ANSWER_TOLERANCE, BOSS_STREAK_THRESHOLD};
use crate::metrics::{GENERATOR_REQUESTS_TOTAL, ROUNDS_TOTAL, SESSIONS_TOTAL};
use crate::models::feedback::{FeedbackRequest, Language};
use crate::models::problem::{Difficulty, Problem};
use crate::models::{
    AdvanceResponse, CreateSessionResponse, Outcome, Phase, RoundInfo, SessionSnapshot,
    SubmitAnswerResponse,
};
use crate::services::community_service::CommunityService;
use crate::services::feedback_service::FeedbackGenerator;
use crate::services::problem_generator::generate_problem;

const CORRECT_SCORE: i64 = 10;
const BOSS_BONUS_SCORE: i64 = 5;

/// Idle time after which an abandoned session is reclaimed from the store.
const SESSION_TTL_SECONDS: i64 = 3600;

/// Shown when the generator is down and the player left no suggestion of
/// their own to fall back on.
const DEGRADED_FEEDBACK: &str =
    "AI roaster is taking a break. Round still counts, hit next when ready.";

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("session not found")]
    SessionNotFound,
    #[error("round is not accepting answers")]
    RoundLocked,
    #[error("round feedback is not ready yet")]
    NotInFeedback,
    #[error("round already advanced")]
    RoundSuperseded,
    #[error("already voted on this feedback line")]
    AlreadyVoted,
}

/// State of one play session. Owned exclusively by the store; mutated only
/// through the named engine operations below.
struct GameSession {
    id: String,
    language: Language,
    round: u32,
    /// Bumped on every round start. A timer tick or a generation result
    /// carrying an older epoch is a provable no-op.
    epoch: u64,
    problem: Problem,
    difficulty: Difficulty,
    streak: u32,
    score: i64,
    phase: Phase,
    deadline: DateTime<Utc>,
    /// Last engine activity; drives idle eviction.
    touched_at: DateTime<Utc>,
    last_input: Option<String>,
    last_outcome: Option<Outcome>,
    last_feedback: Option<String>,
    /// The player's own latest suggestion, offered as the substitute line
    /// when the generator is unavailable.
    own_suggestion: Option<String>,
    /// Feedback record ids this session has already voted on.
    voted: HashSet<String>,
    timer: Option<JoinHandle<()>>,
}

#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<String, GameSession>>>,
}

#[derive(Clone)]
pub struct SessionService {
    store: SessionStore,
    generator: Arc<dyn FeedbackGenerator>,
    community: CommunityService,
    round_seconds: u32,
}

impl SessionService {
    pub fn new(
        store: SessionStore,
        generator: Arc<dyn FeedbackGenerator>,
        community: CommunityService,
        round_seconds: u32,
    ) -> Self {
        Self {
            store,
            generator,
            community,
            round_seconds,
        }
    }

    pub async fn create_session(&self, language: Language) -> CreateSessionResponse {
        let session_id = Uuid::new_v4().to_string();

        let mut session = GameSession {
            id: session_id.clone(),
            language,
            round: 0,
            epoch: 0,
            problem: generate_problem(Difficulty::Easy, &mut rand::rng()),
            difficulty: Difficulty::Easy,
            streak: 0,
            score: 0,
            phase: Phase::Feedback,
            deadline: Utc::now(),
            touched_at: Utc::now(),
            last_input: None,
            last_outcome: None,
            last_feedback: None,
            own_suggestion: None,
            voted: HashSet::new(),
            timer: None,
        };
        let round = self.begin_round(&mut session);

        {
            let mut sessions = self.store.inner.lock().await;
            Self::sweep_expired(&mut sessions);
            sessions.insert(session_id.clone(), session);
        }

        SESSIONS_TOTAL.with_label_values(&["created"]).inc();
        tracing::info!("Session created: {} language={:?}", session_id, language);

        CreateSessionResponse {
            session_id,
            language,
            streak: 0,
            score: 0,
            round,
        }
    }

    pub async fn get_snapshot(&self, session_id: &str) -> Result<SessionSnapshot, EngineError> {
        let mut sessions = self.store.inner.lock().await;
        Self::sweep_expired(&mut sessions);
        let session = sessions
            .get_mut(session_id)
            .ok_or(EngineError::SessionNotFound)?;
        session.touched_at = Utc::now();

        let remaining_seconds = if session.phase == Phase::Active {
            (session.deadline - Utc::now()).num_seconds().max(0) as u32
        } else {
            0
        };

        Ok(SessionSnapshot {
            session_id: session.id.clone(),
            phase: session.phase,
            round: session.round,
            question: session.problem.question_text(),
            difficulty: session.difficulty,
            remaining_seconds,
            round_seconds: self.round_seconds,
            streak: session.streak,
            score: session.score,
            language: session.language,
            last_outcome: session.last_outcome,
            last_feedback: session.last_feedback.clone(),
        })
    }

    /// Accepts at most one submission per round: valid only in Active phase.
    pub async fn submit_answer(
        &self,
        session_id: &str,
        raw_input: &str,
    ) -> Result<SubmitAnswerResponse, EngineError> {
        self.resolve_round(session_id, Some(raw_input.to_string()), None)
            .await
    }

    /// Fired by the countdown task. Idempotent: a stale epoch or a round
    /// that already left the Active phase is a no-op.
    pub async fn handle_timeout(&self, session_id: &str, epoch: u64) -> Result<(), EngineError> {
        match self.resolve_round(session_id, None, Some(epoch)).await {
            Ok(_) => Ok(()),
            Err(
                EngineError::SessionNotFound
                | EngineError::RoundLocked
                | EngineError::RoundSuperseded,
            ) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// The sole way out of the Feedback phase.
    pub async fn advance_to_next(&self, session_id: &str) -> Result<AdvanceResponse, EngineError> {
        let mut sessions = self.store.inner.lock().await;
        Self::sweep_expired(&mut sessions);
        let session = sessions
            .get_mut(session_id)
            .ok_or(EngineError::SessionNotFound)?;
        session.touched_at = Utc::now();

        if session.phase != Phase::Feedback {
            return Err(EngineError::NotInFeedback);
        }

        let round = self.begin_round(session);
        Ok(AdvanceResponse {
            session_id: session.id.clone(),
            streak: session.streak,
            score: session.score,
            round,
        })
    }

    pub async fn session_score(&self, session_id: &str) -> Result<i64, EngineError> {
        let mut sessions = self.store.inner.lock().await;
        Self::sweep_expired(&mut sessions);
        sessions
            .get(session_id)
            .map(|s| s.score)
            .ok_or(EngineError::SessionNotFound)
    }

    /// Stashes the player's own suggestion as the degraded-mode substitute.
    pub async fn attach_suggestion(
        &self,
        session_id: &str,
        text: &str,
    ) -> Result<(), EngineError> {
        let mut sessions = self.store.inner.lock().await;
        Self::sweep_expired(&mut sessions);
        let session = sessions
            .get_mut(session_id)
            .ok_or(EngineError::SessionNotFound)?;
        session.touched_at = Utc::now();
        session.own_suggestion = Some(text.to_string());
        Ok(())
    }

    pub async fn has_voted(
        &self,
        session_id: &str,
        feedback_id: &str,
    ) -> Result<bool, EngineError> {
        let mut sessions = self.store.inner.lock().await;
        Self::sweep_expired(&mut sessions);
        let session = sessions
            .get(session_id)
            .ok_or(EngineError::SessionNotFound)?;
        Ok(session.voted.contains(feedback_id))
    }

    pub async fn mark_voted(&self, session_id: &str, feedback_id: &str) -> Result<(), EngineError> {
        let mut sessions = self.store.inner.lock().await;
        Self::sweep_expired(&mut sessions);
        let session = sessions
            .get_mut(session_id)
            .ok_or(EngineError::SessionNotFound)?;
        session.touched_at = Utc::now();
        session.voted.insert(feedback_id.to_string());
        Ok(())
    }

    /// Drops sessions idle past the TTL, cancelling their timers. Runs on
    /// every store access, so an abandoned session is reclaimed the next
    /// time anything touches the map.
    fn sweep_expired(sessions: &mut HashMap<String, GameSession>) {
        let cutoff = Utc::now() - chrono::Duration::seconds(SESSION_TTL_SECONDS);
        sessions.retain(|id, session| {
            if session.touched_at >= cutoff {
                return true;
            }
            if let Some(handle) = session.timer.take() {
                handle.abort();
            }
            tracing::info!("Idle session evicted: {}", id);
            false
        });
    }

    /// Installs a fresh round: new epoch, tier recomputed from the streak,
    /// new problem, countdown restarted. Any previous timer is cancelled
    /// first so a stale tick can never touch the new round.
    fn begin_round(&self, session: &mut GameSession) -> RoundInfo {
        if let Some(handle) = session.timer.take() {
            handle.abort();
        }

        session.round += 1;
        session.epoch += 1;
        session.difficulty = Difficulty::for_streak(session.streak);
        session.problem = generate_problem(session.difficulty, &mut rand::rng());
        session.phase = Phase::Active;
        session.last_input = None;
        session.last_outcome = None;
        session.last_feedback = None;
        session.deadline = Utc::now() + chrono::Duration::seconds(self.round_seconds as i64);
        session.timer = Some(self.spawn_timer(session.id.clone(), session.epoch));

        RoundInfo {
            round: session.round,
            question: session.problem.question_text(),
            difficulty: session.difficulty,
            round_seconds: self.round_seconds,
            deadline: session.deadline,
        }
    }

    fn spawn_timer(&self, session_id: String, epoch: u64) -> JoinHandle<()> {
        let service = self.clone();
        let seconds = self.round_seconds as u64;
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_secs(seconds)).await;
            if let Err(e) = service.handle_timeout(&session_id, epoch).await {
                tracing::warn!("Countdown handling failed for session {}: {}", session_id, e);
            }
        })
    }

    /// Shared path for submissions and timeouts: classify, lock the round,
    /// call the generator (the only suspending operation), then move to
    /// Feedback. The lock is never held across the generator await; the
    /// epoch re-check on re-entry discards late results.
    async fn resolve_round(
        &self,
        session_id: &str,
        raw_input: Option<String>,
        expected_epoch: Option<u64>,
    ) -> Result<SubmitAnswerResponse, EngineError> {
        let (request, epoch, outcome, boss, awarded, correct_answer, problem, own_suggestion) = {
            let mut sessions = self.store.inner.lock().await;
            Self::sweep_expired(&mut sessions);
            let session = sessions
                .get_mut(session_id)
                .ok_or(EngineError::SessionNotFound)?;
            session.touched_at = Utc::now();

            if let Some(expected) = expected_epoch {
                if session.epoch != expected {
                    return Err(EngineError::RoundSuperseded);
                }
            }
            if session.phase != Phase::Active {
                return Err(EngineError::RoundLocked);
            }

            // Freeze input immediately: stop the countdown, lock the phase.
            if let Some(handle) = session.timer.take() {
                handle.abort();
            }

            let outcome = classify(raw_input.as_deref(), session.problem.answer);
            let pre_streak = session.streak;

            let (boss, prompt_streak, awarded) = if outcome.is_correct() {
                session.streak += 1;
                let boss = session.streak >= BOSS_STREAK_THRESHOLD;
                let awarded = CORRECT_SCORE + if boss { BOSS_BONUS_SCORE } else { 0 };
                session.score += awarded;
                (boss, session.streak, awarded)
            } else {
                // "You just broke a streak of N" framing uses the pre-reset value.
                session.streak = 0;
                (pre_streak >= BOSS_STREAK_THRESHOLD, pre_streak, 0)
            };

            session.last_input = raw_input.clone();
            session.last_outcome = Some(outcome);
            session.phase = Phase::Locked;

            let user_answer = match outcome {
                Outcome::TimedOut => None,
                _ => raw_input.clone(),
            };
            let request = build_feedback_request(
                &session.problem,
                outcome,
                user_answer,
                session.language,
                boss,
                prompt_streak,
            );

            (
                request,
                session.epoch,
                outcome,
                boss,
                awarded,
                session.problem.answer,
                session.problem.clone(),
                session.own_suggestion.clone(),
            )
        };

        ROUNDS_TOTAL
            .with_label_values(&[outcome_label(outcome)])
            .inc();

        let generated = self.generator.generate(&request).await;

        let variant = request_label(&request);
        let status = if generated.is_ok() { "success" } else { "error" };
        GENERATOR_REQUESTS_TOTAL
            .with_label_values(&[variant, status])
            .inc();

        let (feedback, feedback_kind, feedback_id, degraded) = match generated {
            Ok(line) => {
                let feedback_id = self.community.record_feedback(&line, &problem).await;
                (line.text, line.kind, feedback_id, false)
            }
            Err(e) => {
                tracing::warn!("Feedback generation failed for session {}: {}", session_id, e);
                let substitute = own_suggestion
                    .unwrap_or_else(|| DEGRADED_FEEDBACK.to_string());
                (substitute, request.kind(), None, true)
            }
        };

        let mut sessions = self.store.inner.lock().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or(EngineError::SessionNotFound)?;

        // The round advanced while the generator was thinking: drop the result.
        if session.epoch != epoch || session.phase != Phase::Locked {
            tracing::debug!("Discarding late generation result for session {}", session_id);
            return Err(EngineError::RoundSuperseded);
        }

        if degraded {
            // A round the generator lost counts as a lost round: no streak,
            // no points.
            session.streak = 0;
            session.score -= awarded;
        }
        session.last_feedback = Some(feedback.clone());
        session.phase = Phase::Feedback;

        Ok(SubmitAnswerResponse {
            outcome,
            correct: outcome.is_correct(),
            correct_answer,
            streak: session.streak,
            score: session.score,
            boss,
            celebrate: outcome.is_correct(),
            degraded,
            feedback_kind,
            feedback,
            feedback_id,
        })
    }
}

/// Empty or non-numeric input is an outcome, not an error; the literal text
/// still travels to the generator.
fn classify(raw_input: Option<&str>, correct_answer: f64) -> Outcome {
    match raw_input {
        None => Outcome::TimedOut,
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Outcome::Invalid;
            }
            match trimmed.parse::<f64>() {
                Ok(value) if (value - correct_answer).abs() < ANSWER_TOLERANCE => Outcome::Correct,
                Ok(_) => Outcome::Incorrect,
                Err(_) => Outcome::Invalid,
            }
        }
    }
}

fn build_feedback_request(
    problem: &Problem,
    outcome: Outcome,
    user_answer: Option<String>,
    language: Language,
    boss: bool,
    streak: u32,
) -> FeedbackRequest {
    let question = problem.expression();
    if outcome.is_correct() {
        if boss {
            FeedbackRequest::BossCompliment {
                question,
                answer: problem.answer,
                streak,
                language,
            }
        } else {
            FeedbackRequest::Compliment {
                question,
                answer: problem.answer,
                language,
            }
        }
    } else {
        let topic = problem.operator.topic().to_string();
        if boss {
            FeedbackRequest::BossRoast {
                topic,
                question,
                user_answer,
                language,
                streak,
            }
        } else {
            FeedbackRequest::Roast {
                topic,
                question,
                user_answer,
                language,
            }
        }
    }
}

fn outcome_label(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Correct => "correct",
        Outcome::Incorrect => "incorrect",
        Outcome::Invalid => "invalid",
        Outcome::TimedOut => "timed_out",
    }
}

fn request_label(request: &FeedbackRequest) -> &'static str {
    match request {
        FeedbackRequest::Roast { .. } => "roast",
        FeedbackRequest::Compliment { .. } => "compliment",
        FeedbackRequest::BossRoast { .. } => "boss_roast",
        FeedbackRequest::BossCompliment { .. } => "boss_compliment",
    }
}

#[cfg(test)]
impl SessionService {
    async fn current_answer(&self, session_id: &str) -> f64 {
        let sessions = self.store.inner.lock().await;
        sessions.get(session_id).unwrap().problem.answer
    }

    async fn current_epoch(&self, session_id: &str) -> u64 {
        let sessions = self.store.inner.lock().await;
        sessions.get(session_id).unwrap().epoch
    }

    async fn force_streak(&self, session_id: &str, streak: u32) {
        let mut sessions = self.store.inner.lock().await;
        sessions.get_mut(session_id).unwrap().streak = streak;
    }

    async fn age_session(&self, session_id: &str, seconds: i64) {
        let mut sessions = self.store.inner.lock().await;
        let session = sessions.get_mut(session_id).unwrap();
        session.touched_at = Utc::now() - chrono::Duration::seconds(seconds);
    }

    async fn current_phase(&self, session_id: &str) -> Phase {
        let sessions = self.store.inner.lock().await;
        sessions.get(session_id).unwrap().phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::feedback::FeedbackKind;
    use crate::services::feedback_service::{GeneratedLine, GeneratorError};
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    struct ScriptedGenerator {
        fail: bool,
        seen: StdMutex<Vec<FeedbackRequest>>,
    }

    impl ScriptedGenerator {
        fn ok() -> Arc<Self> {
            Arc::new(Self {
                fail: false,
                seen: StdMutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                fail: true,
                seen: StdMutex::new(Vec::new()),
            })
        }

        fn last_request(&self) -> FeedbackRequest {
            self.seen.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl FeedbackGenerator for ScriptedGenerator {
        async fn generate(
            &self,
            request: &FeedbackRequest,
        ) -> Result<GeneratedLine, GeneratorError> {
            self.seen.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(GeneratorError::Unavailable("model overloaded".to_string()));
            }
            Ok(GeneratedLine {
                kind: request.kind(),
                text: "scripted line".to_string(),
            })
        }
    }

    fn service_with(generator: Arc<ScriptedGenerator>) -> SessionService {
        SessionService::new(
            SessionStore::default(),
            generator,
            CommunityService::new(None),
            10,
        )
    }

    #[tokio::test]
    async fn correct_answer_increments_streak_and_celebrates() {
        let generator = ScriptedGenerator::ok();
        let service = service_with(generator.clone());
        let created = service.create_session(Language::RomanUrdu).await;

        let answer = service.current_answer(&created.session_id).await;
        let response = service
            .submit_answer(&created.session_id, &answer.to_string())
            .await
            .unwrap();

        assert_eq!(response.outcome, Outcome::Correct);
        assert_eq!(response.streak, 1);
        assert!(response.celebrate);
        assert!(!response.boss);
        assert_eq!(response.feedback_kind, FeedbackKind::Compliment);
        assert_eq!(service.current_phase(&created.session_id).await, Phase::Feedback);
    }

    #[tokio::test]
    async fn incorrect_answer_resets_streak_to_zero() {
        let generator = ScriptedGenerator::ok();
        let service = service_with(generator.clone());
        let created = service.create_session(Language::RomanUrdu).await;
        service.force_streak(&created.session_id, 3).await;

        let answer = service.current_answer(&created.session_id).await;
        let wrong = answer + 1.0;
        let response = service
            .submit_answer(&created.session_id, &wrong.to_string())
            .await
            .unwrap();

        assert_eq!(response.outcome, Outcome::Incorrect);
        assert_eq!(response.streak, 0);
        assert!(!response.boss);
        assert_eq!(response.feedback_kind, FeedbackKind::Roast);
    }

    #[tokio::test]
    async fn second_submission_is_rejected_without_state_change() {
        let generator = ScriptedGenerator::ok();
        let service = service_with(generator.clone());
        let created = service.create_session(Language::RomanUrdu).await;

        let answer = service.current_answer(&created.session_id).await;
        service
            .submit_answer(&created.session_id, &answer.to_string())
            .await
            .unwrap();

        let err = service
            .submit_answer(&created.session_id, "0")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::RoundLocked));

        let snapshot = service.get_snapshot(&created.session_id).await.unwrap();
        assert_eq!(snapshot.streak, 1);
        assert_eq!(snapshot.last_outcome, Some(Outcome::Correct));
    }

    #[tokio::test]
    async fn fifth_correct_answer_requests_boss_compliment() {
        let generator = ScriptedGenerator::ok();
        let service = service_with(generator.clone());
        let created = service.create_session(Language::RomanUrdu).await;
        service.force_streak(&created.session_id, 4).await;

        let answer = service.current_answer(&created.session_id).await;
        let response = service
            .submit_answer(&created.session_id, &answer.to_string())
            .await
            .unwrap();

        assert_eq!(response.streak, 5);
        assert!(response.boss);
        match generator.last_request() {
            FeedbackRequest::BossCompliment { streak, .. } => assert_eq!(streak, 5),
            other => panic!("expected boss compliment, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn timeout_on_long_streak_requests_boss_roast_with_pre_reset_value() {
        let generator = ScriptedGenerator::ok();
        let service = service_with(generator.clone());
        let created = service.create_session(Language::RomanUrdu).await;
        service.force_streak(&created.session_id, 7).await;

        let epoch = service.current_epoch(&created.session_id).await;
        service
            .handle_timeout(&created.session_id, epoch)
            .await
            .unwrap();

        match generator.last_request() {
            FeedbackRequest::BossRoast {
                streak,
                user_answer,
                ..
            } => {
                assert_eq!(streak, 7);
                assert!(user_answer.is_none());
            }
            other => panic!("expected boss roast, got {:?}", other),
        }

        let snapshot = service.get_snapshot(&created.session_id).await.unwrap();
        assert_eq!(snapshot.streak, 0);
        assert_eq!(snapshot.last_outcome, Some(Outcome::TimedOut));

        // Next round recomputes the tier from the reset streak.
        let next = service.advance_to_next(&created.session_id).await.unwrap();
        assert_eq!(next.round.difficulty, Difficulty::Easy);
    }

    #[tokio::test]
    async fn gibberish_input_is_invalid_and_forwarded_verbatim() {
        let generator = ScriptedGenerator::ok();
        let service = service_with(generator.clone());
        let created = service.create_session(Language::RomanUrdu).await;

        let response = service
            .submit_answer(&created.session_id, "banana")
            .await
            .unwrap();

        assert_eq!(response.outcome, Outcome::Invalid);
        assert_eq!(response.streak, 0);
        match generator.last_request() {
            FeedbackRequest::Roast { user_answer, .. } => {
                assert_eq!(user_answer.as_deref(), Some("banana"));
            }
            other => panic!("expected roast, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn duplicate_timeout_is_a_no_op() {
        let generator = ScriptedGenerator::ok();
        let service = service_with(generator.clone());
        let created = service.create_session(Language::RomanUrdu).await;

        let epoch = service.current_epoch(&created.session_id).await;
        service
            .handle_timeout(&created.session_id, epoch)
            .await
            .unwrap();
        let requests_after_first = generator.seen.lock().unwrap().len();

        // Same epoch again, and a stale epoch: both must do nothing.
        service
            .handle_timeout(&created.session_id, epoch)
            .await
            .unwrap();
        service
            .handle_timeout(&created.session_id, epoch.wrapping_sub(1))
            .await
            .unwrap();

        assert_eq!(generator.seen.lock().unwrap().len(), requests_after_first);
    }

    #[tokio::test]
    async fn advance_is_only_valid_from_feedback_phase() {
        let generator = ScriptedGenerator::ok();
        let service = service_with(generator.clone());
        let created = service.create_session(Language::RomanUrdu).await;

        let err = service
            .advance_to_next(&created.session_id)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotInFeedback));

        let answer = service.current_answer(&created.session_id).await;
        service
            .submit_answer(&created.session_id, &answer.to_string())
            .await
            .unwrap();

        let next = service.advance_to_next(&created.session_id).await.unwrap();
        assert_eq!(next.round.round, 2);
        assert_eq!(service.current_phase(&created.session_id).await, Phase::Active);
    }

    #[tokio::test]
    async fn generator_failure_degrades_and_offers_own_suggestion() {
        let generator = ScriptedGenerator::failing();
        let service = service_with(generator.clone());
        let created = service.create_session(Language::RomanUrdu).await;
        service
            .attach_suggestion(&created.session_id, "Mera apna roast hai yeh")
            .await
            .unwrap();

        let answer = service.current_answer(&created.session_id).await;
        let response = service
            .submit_answer(&created.session_id, &answer.to_string())
            .await
            .unwrap();

        assert!(response.degraded);
        assert_eq!(response.feedback, "Mera apna roast hai yeh");
        // Round completes so the player can proceed; streak and points are
        // both forfeited as a lost round.
        assert_eq!(response.streak, 0);
        assert_eq!(response.score, 0);
        assert!(service.advance_to_next(&created.session_id).await.is_ok());
    }

    #[tokio::test]
    async fn generator_failure_without_suggestion_uses_stock_message() {
        let generator = ScriptedGenerator::failing();
        let service = service_with(generator);
        let created = service.create_session(Language::RomanUrdu).await;

        let response = service
            .submit_answer(&created.session_id, "5000")
            .await
            .unwrap();

        assert!(response.degraded);
        assert_eq!(response.feedback, DEGRADED_FEEDBACK);
    }

    #[tokio::test]
    async fn countdown_timer_times_out_the_round() {
        let generator = ScriptedGenerator::ok();
        let service = SessionService::new(
            SessionStore::default(),
            generator.clone(),
            CommunityService::new(None),
            1,
        );
        let created = service.create_session(Language::RomanUrdu).await;

        tokio::time::sleep(std::time::Duration::from_millis(1500)).await;

        let snapshot = service.get_snapshot(&created.session_id).await.unwrap();
        assert_eq!(snapshot.last_outcome, Some(Outcome::TimedOut));
        assert_eq!(snapshot.phase, Phase::Feedback);
    }

    #[tokio::test]
    async fn idle_sessions_are_evicted_on_next_store_access() {
        let generator = ScriptedGenerator::ok();
        let service = service_with(generator);
        let stale = service.create_session(Language::RomanUrdu).await;
        let fresh = service.create_session(Language::RomanUrdu).await;
        service
            .age_session(&stale.session_id, SESSION_TTL_SECONDS + 1)
            .await;

        // Touching any session sweeps the idle one out of the store.
        assert!(service.get_snapshot(&fresh.session_id).await.is_ok());

        let err = service.get_snapshot(&stale.session_id).await.unwrap_err();
        assert!(matches!(err, EngineError::SessionNotFound));
    }

    #[tokio::test]
    async fn vote_bookkeeping_is_per_session() {
        let generator = ScriptedGenerator::ok();
        let service = service_with(generator);
        let created = service.create_session(Language::RomanUrdu).await;

        assert!(!service.has_voted(&created.session_id, "fb-1").await.unwrap());
        service.mark_voted(&created.session_id, "fb-1").await.unwrap();
        assert!(service.has_voted(&created.session_id, "fb-1").await.unwrap());
        assert!(!service.has_voted(&created.session_id, "fb-2").await.unwrap());
    }

    #[test]
    fn classification_handles_tolerance_and_gibberish() {
        assert_eq!(classify(Some("4"), 4.0), Outcome::Correct);
        assert_eq!(classify(Some("4.0004"), 4.0), Outcome::Correct);
        assert_eq!(classify(Some("4.01"), 4.0), Outcome::Incorrect);
        assert_eq!(classify(Some("banana"), 4.0), Outcome::Invalid);
        assert_eq!(classify(Some("   "), 4.0), Outcome::Invalid);
        assert_eq!(classify(None, 4.0), Outcome::TimedOut);
    }
}
