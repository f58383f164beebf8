use anyhow::Result;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::{Collection, Database};

use crate::config::LEADERBOARD_SIZE;
use crate::models::leaderboard::{LeaderboardEntry, LeaderboardResponse, SaveScoreResponse};
use crate::utils::retry::{retry_async_with_config, RetryConfig};

const SCORES_COLLECTION: &str = "scores";

/// Served when the score store is unconfigured or unreachable, so the
/// board is never empty.
const FALLBACK_BOARD: [(&str, i64); 5] = [
    ("MathLordSupreme", 10000),
    ("CalculusCrusher", 9500),
    ("AlgebraAssassin", 9000),
    ("GeomGenius", 8500),
    ("NumberNinja", 8000),
];

#[derive(Clone)]
pub struct LeaderboardService {
    mongo: Option<Database>,
}

impl LeaderboardService {
    pub fn new(mongo: Option<Database>) -> Self {
        Self { mongo }
    }

    pub fn is_persistent(&self) -> bool {
        self.mongo.is_some()
    }

    fn collection(&self) -> Option<Collection<LeaderboardEntry>> {
        self.mongo.as_ref().map(|db| db.collection(SCORES_COLLECTION))
    }

    /// Top scores, highest first. A broken store serves the static board
    /// with the degraded flag set instead of an error.
    pub async fn top_scores(&self) -> LeaderboardResponse {
        let Some(collection) = self.collection() else {
            return fallback_response();
        };

        match self.fetch_top(&collection).await {
            Ok(entries) => LeaderboardResponse {
                entries,
                degraded: false,
            },
            Err(e) => {
                tracing::warn!("Leaderboard query failed, serving fallback: {}", e);
                fallback_response()
            }
        }
    }

    async fn fetch_top(
        &self,
        collection: &Collection<LeaderboardEntry>,
    ) -> Result<Vec<LeaderboardEntry>> {
        let cursor = collection
            .find(doc! {})
            .sort(doc! { "score": -1, "recorded_at": 1 })
            .limit(LEADERBOARD_SIZE)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn save_score(&self, player_name: &str, score: i64) -> Result<SaveScoreResponse> {
        let collection = self
            .collection()
            .ok_or_else(|| anyhow::anyhow!("score store is not configured"))?;

        let entry = LeaderboardEntry {
            player_name: player_name.to_string(),
            score,
            recorded_at: Utc::now(),
        };

        retry_async_with_config(RetryConfig::default(), || async {
            collection.insert_one(&entry).await
        })
        .await?;

        tracing::info!("Score saved: {} -> {}", player_name, score);
        Ok(SaveScoreResponse {
            player_name: entry.player_name,
            score: entry.score,
        })
    }
}

fn fallback_response() -> LeaderboardResponse {
    let now = Utc::now();
    LeaderboardResponse {
        entries: FALLBACK_BOARD
            .iter()
            .map(|(name, score)| LeaderboardEntry {
                player_name: (*name).to_string(),
                score: *score,
                recorded_at: now,
            })
            .collect(),
        degraded: true,
    }
}
