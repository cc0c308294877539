//! Text-generation provider abstraction.

pub mod gemini;

use crate::AiError;

/// Default API root for the Gemini provider.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Trait for text-generation backends.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates text for a single prompt.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] if the request fails or yields no text.
    async fn generate(&self, prompt: &str) -> Result<String, AiError>;
}

/// Creates the text-generation provider from environment variables.
///
/// Requires `GEMINI_API_KEY`. `GEMINI_BASE_URL` overrides the API root
/// (useful for proxies and local stubs).
///
/// # Errors
///
/// Returns [`AiError::Config`] if `GEMINI_API_KEY` is unset or empty.
pub fn create_provider_from_env() -> Result<Box<dyn TextGenerator>, AiError> {
    let api_key = std::env::var("GEMINI_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| AiError::Config {
            message: "GEMINI_API_KEY environment variable not set".to_string(),
        })?;
    let base_url = std::env::var("GEMINI_BASE_URL")
        .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string());

    log::info!("Using Gemini text generation at {base_url}");
    Ok(Box::new(gemini::GeminiProvider::new(api_key, &base_url)))
}
