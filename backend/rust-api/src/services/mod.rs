use std::sync::Arc;

use mongodb::{Client as MongoClient, Database};

use crate::config::Config;
use crate::services::feedback_service::FeedbackGenerator;
use crate::services::session_service::SessionStore;

pub struct AppState {
    pub config: Config,
    pub mongo: Option<Database>,
    pub generator: Arc<dyn FeedbackGenerator>,
    pub sessions: SessionStore,
}

impl AppState {
    pub async fn new(
        config: Config,
        mongo_client: Option<MongoClient>,
        generator: Arc<dyn FeedbackGenerator>,
    ) -> anyhow::Result<Self> {
        let mongo = match mongo_client {
            Some(client) => {
                let db = client.database(&config.mongo_database);

                tracing::info!("Testing MongoDB connection with ping...");
                tokio::time::timeout(
                    std::time::Duration::from_secs(5),
                    db.run_command(mongodb::bson::doc! { "ping": 1 }),
                )
                .await
                .map_err(|_| anyhow::anyhow!("MongoDB ping timeout after 5s"))??;
                tracing::info!("MongoDB connection established successfully");

                Some(db)
            }
            None => {
                tracing::warn!(
                    "No MongoDB configured: leaderboard and suggestions run in degraded mode"
                );
                None
            }
        };

        Ok(Self {
            config,
            mongo,
            generator,
            sessions: SessionStore::default(),
        })
    }
}

pub mod community_service;
pub mod feedback_service;
pub mod leaderboard_service;
pub mod problem_generator;
pub mod session_service;
