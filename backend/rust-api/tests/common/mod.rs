use async_trait::async_trait;
use axum::Router;
use std::sync::Arc;

use savagemath_api::config::{Config, DEFAULT_ROUND_SECONDS};
use savagemath_api::models::feedback::FeedbackRequest;
use savagemath_api::services::feedback_service::{
    FeedbackGenerator, GeneratedLine, GeneratorError,
};
use savagemath_api::{create_router, services::AppState};

/// In-process stand-in for the generation service. `fail: true` simulates
/// the generator being down so degraded-mode paths can be exercised.
pub struct StubGenerator {
    pub fail: bool,
}

#[async_trait]
impl FeedbackGenerator for StubGenerator {
    async fn generate(&self, request: &FeedbackRequest) -> Result<GeneratedLine, GeneratorError> {
        if self.fail {
            return Err(GeneratorError::Unavailable("stub offline".to_string()));
        }
        let text = if request.is_boss() {
            "BOSS line from stub"
        } else {
            "line from stub"
        };
        Ok(GeneratedLine {
            kind: request.kind(),
            text: text.to_string(),
        })
    }
}

fn test_config() -> Config {
    Config {
        // No store: integration tests run against the degraded persistence
        // path and need no external services.
        mongo_uri: None,
        mongo_database: "savagemath_test".to_string(),
        generator_url: "http://localhost:9400".to_string(),
        round_seconds: DEFAULT_ROUND_SECONDS,
    }
}

pub async fn create_test_app() -> Router {
    create_test_app_with(Arc::new(StubGenerator { fail: false })).await
}

#[allow(dead_code)]
pub async fn create_degraded_test_app() -> Router {
    create_test_app_with(Arc::new(StubGenerator { fail: true })).await
}

pub async fn create_test_app_with(generator: Arc<dyn FeedbackGenerator>) -> Router {
    // Initialize tracing for tests
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let app_state = Arc::new(
        AppState::new(test_config(), None, generator)
            .await
            .expect("Failed to initialize test app state"),
    );

    create_router(app_state)
}
