use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use savagemath_api::services::feedback_service::HttpFeedbackGenerator;
use savagemath_api::{config::Config, create_router, services::AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "savagemath_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting SavageMath API");

    let config = Config::load().expect("Failed to load configuration");
    tracing::info!(
        "Configuration loaded for environment: {:?}",
        std::env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string())
    );

    // The store is optional: without it the game still runs, only the
    // leaderboard, suggestion log and votes degrade.
    let mongo_client = match &config.mongo_uri {
        Some(uri) => Some(
            mongodb::Client::with_uri_str(uri)
                .await
                .expect("Failed to connect to MongoDB"),
        ),
        None => None,
    };

    let generator = Arc::new(HttpFeedbackGenerator::new(config.generator_url.clone()));

    let app_state = Arc::new(
        AppState::new(config, mongo_client, generator)
            .await
            .expect("Failed to initialize application state"),
    );

    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8081").await.unwrap();

    tracing::info!("Server listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
