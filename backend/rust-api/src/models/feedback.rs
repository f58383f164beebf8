use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::problem::Problem;

/// Target language for generated lines. Fixed enumerated set; the original
/// game shipped with Roman Urdu snark as the default voice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    RomanUrdu,
    Urdu,
    English,
    Hindi,
}

impl Language {
    pub const ALL: [Language; 4] = [
        Language::RomanUrdu,
        Language::Urdu,
        Language::English,
        Language::Hindi,
    ];

    /// Name sent to the generator inside prompts ("Roman Urdu", "English", ...).
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::RomanUrdu => "Roman Urdu",
            Language::Urdu => "Urdu",
            Language::English => "English",
            Language::Hindi => "Hindi",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Roast,
    Compliment,
}

/// One of the four request shapes accepted by the generation service.
///
/// `user_answer` carries the literal submitted text (gibberish included) so
/// the generator can reference exactly what was typed; it is `None` when the
/// round timed out with no input.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedbackRequest {
    Roast {
        topic: String,
        question: String,
        user_answer: Option<String>,
        language: Language,
    },
    Compliment {
        question: String,
        answer: f64,
        language: Language,
    },
    BossRoast {
        topic: String,
        question: String,
        user_answer: Option<String>,
        language: Language,
        streak: u32,
    },
    BossCompliment {
        question: String,
        answer: f64,
        streak: u32,
        language: Language,
    },
}

impl FeedbackRequest {
    pub fn kind(&self) -> FeedbackKind {
        match self {
            FeedbackRequest::Roast { .. } | FeedbackRequest::BossRoast { .. } => {
                FeedbackKind::Roast
            }
            FeedbackRequest::Compliment { .. } | FeedbackRequest::BossCompliment { .. } => {
                FeedbackKind::Compliment
            }
        }
    }

    pub fn is_boss(&self) -> bool {
        matches!(
            self,
            FeedbackRequest::BossRoast { .. } | FeedbackRequest::BossCompliment { .. }
        )
    }
}

/// A generated line persisted at creation time with zero votes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub kind: FeedbackKind,
    pub text: String,
    pub problem: Problem,
    pub upvotes: i64,
    pub downvotes: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteDirection {
    Up,
    Down,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub session_id: String,
    pub direction: VoteDirection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VoteResponse {
    pub feedback_id: String,
    pub recorded: bool,
}
