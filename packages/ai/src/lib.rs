#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Text-generation client for dashboard summaries and policy suggestions.
//!
//! Builds a prompt from fixed templates ([`prompts`]) and hands it to a
//! [`providers::TextGenerator`]. The only provider is a Gemini-style API
//! that is asked for its model list on every call; there is no retry and
//! nothing is cached.

pub mod prompts;
pub mod providers;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

pub use prompts::InsightRequest;
pub use providers::{TextGenerator, create_provider_from_env};

/// Errors that can occur during text generation.
#[derive(Debug, Error)]
pub enum AiError {
    /// HTTP request to the provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },

    /// Listing the available models failed.
    #[error("Model discovery failed: {message}")]
    Discovery {
        /// Description of what went wrong.
        message: String,
    },

    /// No listed model supports content generation.
    #[error("No available model supports content generation")]
    NoCapableModel,

    /// The generation request was rejected.
    #[error("Generation failed: {message}")]
    Generation {
        /// Description of what went wrong.
        message: String,
    },

    /// The provider answered without any usable candidate text.
    #[error("The model returned no candidates")]
    NoCandidates,
}

/// What kind of text to generate.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InsightKind {
    /// Plain-language summary of the overview metrics.
    Summary,
    /// Policy recommendations derived from the overview metrics.
    Policy,
    /// Analysis of a single station.
    Location,
}

/// Builds the prompt for `request` and generates text for it.
///
/// # Errors
///
/// Returns [`AiError`] if the provider fails.
pub async fn generate_insight(
    generator: &dyn TextGenerator,
    request: &InsightRequest<'_>,
) -> Result<String, AiError> {
    let prompt = request.prompt();
    log::info!(
        "Generating {} insight ({} prompt chars)",
        request.kind(),
        prompt.len()
    );
    generator.generate(&prompt).await
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use noise_map_analytics_models::DashboardMetrics;

    use super::*;

    struct EchoGenerator {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl TextGenerator for EchoGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, AiError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("ok".to_string())
        }
    }

    struct FailingGenerator;

    #[async_trait::async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, AiError> {
            Err(AiError::NoCandidates)
        }
    }

    fn metrics() -> DashboardMetrics {
        DashboardMetrics {
            loudest_station: "ito".to_string(),
            highest_avg_noise: 76.2,
            avg_violation_rate: 64.5,
            station_count: 9,
        }
    }

    #[tokio::test]
    async fn passes_summary_prompt_to_generator() {
        let generator = EchoGenerator {
            prompts: Mutex::new(Vec::new()),
        };
        let metrics = metrics();
        let text = generate_insight(&generator, &InsightRequest::Summary(&metrics))
            .await
            .unwrap();
        assert_eq!(text, "ok");

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("ito"));
        assert!(prompts[0].contains("76.2"));
    }

    #[tokio::test]
    async fn surfaces_generator_errors() {
        let metrics = metrics();
        let err = generate_insight(&FailingGenerator, &InsightRequest::Policy(&metrics))
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::NoCandidates));
    }
}
