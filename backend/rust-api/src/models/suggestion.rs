use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::feedback::FeedbackKind;

/// A community-suggested roast or compliment. Append-only log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "_id")]
    pub id: String,
    pub kind: FeedbackKind,
    pub text: String,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSuggestionRequest {
    /// When present, the text is also stashed on the session as the
    /// substitute line for degraded generator responses.
    pub session_id: Option<String>,
    pub kind: FeedbackKind,
    #[validate(length(min = 1, max = 280))]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSuggestionResponse {
    pub id: Option<String>,
    pub persisted: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListSuggestionsQuery {
    pub kind: Option<FeedbackKind>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoastOfTheDayResponse {
    pub roast: String,
    pub date: String,
}
