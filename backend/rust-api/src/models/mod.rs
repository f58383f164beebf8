use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::feedback::{FeedbackKind, Language};
use crate::models::problem::Difficulty;

/// Lifecycle of one round. Every transition is a named engine operation:
/// Active -(submit | timeout)-> Locked -(generator resolves)-> Feedback
/// -(advance)-> Active again with a fresh problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Active,
    Locked,
    Feedback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Correct,
    Incorrect,
    Invalid,
    TimedOut,
}

impl Outcome {
    pub fn is_correct(&self) -> bool {
        matches!(self, Outcome::Correct)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    /// Target language for generated feedback lines; defaults to Roman Urdu.
    pub language: Option<Language>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoundInfo {
    pub round: u32,
    pub question: String,
    pub difficulty: Difficulty,
    pub round_seconds: u32,
    pub deadline: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub language: Language,
    pub streak: u32,
    pub score: i64,
    pub round: RoundInfo,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub phase: Phase,
    pub round: u32,
    pub question: String,
    pub difficulty: Difficulty,
    pub remaining_seconds: u32,
    pub round_seconds: u32,
    pub streak: u32,
    pub score: i64,
    pub language: Language,
    pub last_outcome: Option<Outcome>,
    pub last_feedback: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub answer: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitAnswerResponse {
    pub outcome: Outcome,
    pub correct: bool,
    pub correct_answer: f64,
    pub streak: u32,
    pub score: i64,
    /// True when the boss feedback variant was selected for this round.
    pub boss: bool,
    /// Client cue for the confetti burst on a correct answer.
    pub celebrate: bool,
    /// True when the generator was unavailable and a fallback line is shown.
    pub degraded: bool,
    pub feedback_kind: FeedbackKind,
    pub feedback: String,
    pub feedback_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdvanceResponse {
    pub session_id: String,
    pub streak: u32,
    pub score: i64,
    pub round: RoundInfo,
}

pub mod feedback;
pub mod leaderboard;
pub mod problem;
pub mod suggestion;
pub mod timer;
