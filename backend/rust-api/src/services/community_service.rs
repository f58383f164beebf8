use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::{Collection, Database};
use uuid::Uuid;

use crate::models::feedback::{FeedbackKind, FeedbackRecord, VoteDirection};
use crate::models::problem::Problem;
use crate::models::suggestion::{RoastOfTheDayResponse, Suggestion};
use crate::services::feedback_service::GeneratedLine;
use crate::utils::retry::{retry_async_with_config, RetryConfig};

const FEEDBACK_COLLECTION: &str = "feedback";
const SUGGESTIONS_COLLECTION: &str = "suggestions";

const DEFAULT_SUGGESTIONS_LIMIT: i64 = 20;
const MAX_SUGGESTIONS_LIMIT: i64 = 100;

/// House roasts served on days the generator has nothing to say about.
const DAILY_ROASTS: [&str; 7] = [
    "Are you a magician? Because whenever you do math, numbers disappear... into wrong answers.",
    "Your math skills are like a broken pencil... pointless.",
    "I've seen better calculations on a restaurant bill after three rounds of drinks.",
    "If math was a sport, you'd be the one bringing oranges for the team.",
    "Were you absent the day they taught numbers?",
    "I'm not saying you're bad at math, but 2+2 for you is probably 'not enough information'.",
    "Your math solutions are so creative, they belong in an art gallery, not a textbook.",
];

/// Feedback records, votes and the community suggestion log. Works without a
/// configured store: reads return empty, writes report not-persisted.
#[derive(Clone)]
pub struct CommunityService {
    mongo: Option<Database>,
}

impl CommunityService {
    pub fn new(mongo: Option<Database>) -> Self {
        Self { mongo }
    }

    pub fn is_persistent(&self) -> bool {
        self.mongo.is_some()
    }

    fn feedback_collection(&self) -> Option<Collection<FeedbackRecord>> {
        self.mongo
            .as_ref()
            .map(|db| db.collection(FEEDBACK_COLLECTION))
    }

    fn suggestions_collection(&self) -> Option<Collection<Suggestion>> {
        self.mongo
            .as_ref()
            .map(|db| db.collection(SUGGESTIONS_COLLECTION))
    }

    /// Persists a generated line with zero votes. Best-effort: a write
    /// failure only costs the line its votability, never the round.
    pub async fn record_feedback(
        &self,
        line: &GeneratedLine,
        problem: &Problem,
    ) -> Option<String> {
        let collection = self.feedback_collection()?;
        let record = FeedbackRecord {
            id: Uuid::new_v4().to_string(),
            kind: line.kind,
            text: line.text.clone(),
            problem: problem.clone(),
            upvotes: 0,
            downvotes: 0,
            created_at: Utc::now(),
        };

        let result = retry_async_with_config(RetryConfig::default(), || async {
            collection.insert_one(&record).await
        })
        .await;

        match result {
            Ok(_) => Some(record.id),
            Err(e) => {
                tracing::warn!("Failed to persist feedback record: {}", e);
                None
            }
        }
    }

    /// Atomic counter bump; returns false when no such record exists.
    pub async fn vote(&self, feedback_id: &str, direction: VoteDirection) -> Result<bool> {
        let collection = self
            .feedback_collection()
            .context("feedback store is not configured")?;

        let field = match direction {
            VoteDirection::Up => "upvotes",
            VoteDirection::Down => "downvotes",
        };

        let result = collection
            .update_one(doc! { "_id": feedback_id }, doc! { "$inc": { field: 1 } })
            .await?;

        Ok(result.matched_count > 0)
    }

    pub async fn create_suggestion(
        &self,
        kind: FeedbackKind,
        text: &str,
    ) -> Result<Option<String>> {
        let Some(collection) = self.suggestions_collection() else {
            return Ok(None);
        };

        let suggestion = Suggestion {
            id: Uuid::new_v4().to_string(),
            kind,
            text: text.to_string(),
            submitted_at: Utc::now(),
        };

        retry_async_with_config(RetryConfig::default(), || async {
            collection.insert_one(&suggestion).await
        })
        .await?;

        tracing::info!("Suggestion recorded: {} kind={:?}", suggestion.id, kind);
        Ok(Some(suggestion.id))
    }

    pub async fn list_suggestions(
        &self,
        kind: Option<FeedbackKind>,
        limit: Option<i64>,
    ) -> Result<Vec<Suggestion>> {
        let Some(collection) = self.suggestions_collection() else {
            return Ok(Vec::new());
        };

        let mut filter = doc! {};
        if let Some(kind) = kind {
            filter.insert("kind", kind_label(kind));
        }
        let limit = limit
            .unwrap_or(DEFAULT_SUGGESTIONS_LIMIT)
            .clamp(1, MAX_SUGGESTIONS_LIMIT);

        let cursor = collection
            .find(filter)
            .sort(doc! { "submitted_at": -1 })
            .limit(limit)
            .await?;

        Ok(cursor.try_collect().await?)
    }

    /// Deterministic pick from the house list, stable within a calendar day.
    pub fn roast_of_the_day(&self) -> RoastOfTheDayResponse {
        let today = Utc::now().date_naive();
        let index = today.num_days_from_ce().rem_euclid(DAILY_ROASTS.len() as i32) as usize;
        RoastOfTheDayResponse {
            roast: DAILY_ROASTS[index].to_string(),
            date: today.to_string(),
        }
    }
}

fn kind_label(kind: FeedbackKind) -> &'static str {
    match kind {
        FeedbackKind::Roast => "roast",
        FeedbackKind::Compliment => "compliment",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::problem::Operator;

    fn sample_problem() -> Problem {
        Problem {
            first_operand: 12,
            second_operand: 4,
            operator: Operator::Div,
            answer: 3.0,
        }
    }

    #[test]
    fn roast_of_the_day_is_stable_within_a_day() {
        let service = CommunityService::new(None);
        let first = service.roast_of_the_day();
        let second = service.roast_of_the_day();
        assert_eq!(first.roast, second.roast);
        assert!(DAILY_ROASTS.contains(&first.roast.as_str()));
    }

    #[tokio::test]
    async fn unconfigured_store_degrades_instead_of_failing() {
        let service = CommunityService::new(None);
        assert!(!service.is_persistent());

        let line = GeneratedLine {
            kind: FeedbackKind::Roast,
            text: "Itna ghalat jawab?".to_string(),
        };
        assert!(service.record_feedback(&line, &sample_problem()).await.is_none());

        let created = service
            .create_suggestion(FeedbackKind::Compliment, "Shabash yaar")
            .await
            .unwrap();
        assert!(created.is_none());

        let listed = service.list_suggestions(None, None).await.unwrap();
        assert!(listed.is_empty());

        assert!(service.vote("fb-1", VoteDirection::Up).await.is_err());
    }
}
