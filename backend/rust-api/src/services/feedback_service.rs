use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use thiserror::Error;

use crate::models::feedback::{FeedbackKind, FeedbackRequest};

/// Failures of the external text generator. Both variants are recoverable:
/// the engine finishes the round on a degraded path instead of blocking.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("feedback generator unavailable: {0}")]
    Unavailable(String),
    #[error("malformed generator response: {0}")]
    BadResponse(String),
}

#[derive(Debug, Clone)]
pub struct GeneratedLine {
    pub kind: FeedbackKind,
    pub text: String,
}

/// Seam between the session engine and the generation backend. The engine
/// only ever sees `generate(request) -> line or recoverable error`.
#[async_trait]
pub trait FeedbackGenerator: Send + Sync {
    async fn generate(&self, request: &FeedbackRequest) -> Result<GeneratedLine, GeneratorError>;
}

pub struct HttpFeedbackGenerator {
    http_client: Client,
    base_url: String,
}

impl HttpFeedbackGenerator {
    pub fn new(base_url: String) -> Self {
        Self {
            http_client: Client::new(),
            base_url,
        }
    }
}

/// Path segment and response field for each of the four request shapes.
fn wire_shape(request: &FeedbackRequest) -> (&'static str, &'static str) {
    match request {
        FeedbackRequest::Roast { .. } => ("roast", "roast"),
        FeedbackRequest::Compliment { .. } => ("compliment", "compliment"),
        FeedbackRequest::BossRoast { .. } => ("boss-roast", "bossRoast"),
        FeedbackRequest::BossCompliment { .. } => ("boss-compliment", "bossCompliment"),
    }
}

fn wire_body(request: &FeedbackRequest) -> serde_json::Value {
    match request {
        FeedbackRequest::Roast {
            topic,
            question,
            user_answer,
            language,
        } => {
            let mut body = json!({
                "topic": topic,
                "question": question,
                "language": language.display_name(),
            });
            if let Some(answer) = user_answer {
                body["userAnswer"] = json!(answer);
            }
            body
        }
        FeedbackRequest::Compliment {
            question,
            answer,
            language,
        } => json!({
            "question": question,
            "answer": answer,
            "language": language.display_name(),
        }),
        FeedbackRequest::BossRoast {
            topic,
            question,
            user_answer,
            language,
            streak,
        } => {
            let mut body = json!({
                "topic": topic,
                "question": question,
                "language": language.display_name(),
                "streak": streak,
            });
            if let Some(answer) = user_answer {
                body["userAnswer"] = json!(answer);
            }
            body
        }
        FeedbackRequest::BossCompliment {
            question,
            answer,
            streak,
            language,
        } => json!({
            "question": question,
            "answer": answer,
            "streak": streak,
            "language": language.display_name(),
        }),
    }
}

#[async_trait]
impl FeedbackGenerator for HttpFeedbackGenerator {
    async fn generate(&self, request: &FeedbackRequest) -> Result<GeneratedLine, GeneratorError> {
        let (path, field) = wire_shape(request);
        let url = format!("{}/v1/generate/{}", self.base_url, path);

        tracing::debug!("Calling feedback generator: {}", url);

        let response = self
            .http_client
            .post(&url)
            .json(&wire_body(request))
            .timeout(std::time::Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| GeneratorError::Unavailable(e.to_string()))?;

        // Overloaded or broken backend both degrade the same way; no retry.
        if !response.status().is_success() {
            return Err(GeneratorError::Unavailable(format!(
                "generator returned status {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GeneratorError::BadResponse(e.to_string()))?;

        let text = body[field]
            .as_str()
            .ok_or_else(|| GeneratorError::BadResponse(format!("missing field '{}'", field)))?
            .to_string();

        Ok(GeneratedLine {
            kind: request.kind(),
            text,
        })
    }
}
