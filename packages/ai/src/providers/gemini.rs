//! Gemini-style `generateContent` provider.
//!
//! Every call lists the available models, picks the first one that
//! supports `generateContent`, and sends a single request with fixed
//! sampling parameters.

use serde::{Deserialize, Serialize};

use super::TextGenerator;
use crate::AiError;

/// Generation method a model must advertise to be selected.
pub const GENERATE_METHOD: &str = "generateContent";

const TEMPERATURE: f32 = 0.7;
const TOP_P: f32 = 0.95;
const TOP_K: u32 = 40;
const MAX_OUTPUT_TOKENS: u32 = 500;

const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Gemini API provider.
pub struct GeminiProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Creates a new provider rooted at `base_url`.
    #[must_use]
    pub fn new(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Lists the models and returns the name of the first one that supports
    /// [`GENERATE_METHOD`].
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Discovery`] if the listing fails and
    /// [`AiError::NoCapableModel`] if nothing qualifies.
    pub async fn discover_model(&self) -> Result<String, AiError> {
        let resp = self
            .client
            .get(format!("{}/v1beta/models", self.base_url))
            .query(&[("key", &self.api_key)])
            .send()
            .await
            .map_err(|e| AiError::Discovery {
                message: e.to_string(),
            })?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(AiError::Discovery {
                message: error_message(status, &body),
            });
        }

        let list: ModelList = serde_json::from_str(&body)?;
        let name = select_model(&list).ok_or(AiError::NoCapableModel)?;
        log::debug!("Selected model {name}");
        Ok(name.to_string())
    }
}

/// Response of the model listing endpoint.
#[derive(Debug, Deserialize)]
pub struct ModelList {
    #[serde(default)]
    pub models: Vec<ModelInfo>,
}

/// One entry of [`ModelList`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    /// Resource name, e.g. `models/gemini-1.5-flash`.
    pub name: String,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

/// Returns the first model supporting [`GENERATE_METHOD`].
#[must_use]
pub fn select_model(list: &ModelList) -> Option<&str> {
    list.models
        .iter()
        .find(|m| {
            m.supported_generation_methods
                .iter()
                .any(|method| method == GENERATE_METHOD)
        })
        .map(|m| m.name.as_str())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

impl<'a> GenerateRequest<'a> {
    fn new(prompt: &'a str) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                top_k: TOP_K,
                top_p: TOP_P,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
            safety_settings: HARM_CATEGORIES
                .into_iter()
                .map(|category| SafetySetting {
                    category,
                    threshold: "BLOCK_NONE",
                })
                .collect(),
        }
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<GeminiError>(body)
        .map_or_else(|_| format!("HTTP {status}: {body}"), |e| e.error.message)
}

/// Returns the trimmed text of the first candidate's first text part.
fn first_candidate_text(response: GenerateResponse) -> Result<String, AiError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(AiError::NoCandidates)?;

    candidate
        .content
        .into_iter()
        .flat_map(|c| c.parts)
        .find_map(|p| p.text)
        .map(|text| text.trim().to_string())
        .ok_or(AiError::NoCandidates)
}

#[async_trait::async_trait]
impl TextGenerator for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        let model = self.discover_model().await?;

        let resp = self
            .client
            .post(format!("{}/v1beta/{model}:{GENERATE_METHOD}", self.base_url))
            .query(&[("key", &self.api_key)])
            .json(&GenerateRequest::new(prompt))
            .send()
            .await
            .map_err(|e| AiError::Generation {
                message: e.to_string(),
            })?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(AiError::Generation {
                message: error_message(status, &body),
            });
        }

        let response: GenerateResponse = serde_json::from_str(&body)?;
        first_candidate_text(response)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use actix_web::dev::ServerHandle;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, HttpServer, web};
    use serde_json::{Value, json};

    use super::*;

    /// Status and JSON body a stub endpoint answers with.
    type Reply = (u16, Value);

    struct Stub {
        base_url: String,
        listings: Arc<AtomicUsize>,
        handle: ServerHandle,
    }

    fn respond((status, body): Reply) -> HttpResponse {
        let status = StatusCode::from_u16(status).unwrap();
        HttpResponse::build(status).json(body)
    }

    /// Serves `models` on the listing endpoint and `generation` on every
    /// generate call, counting how often the models are listed.
    fn spawn_stub(models: Reply, generation: Reply) -> Stub {
        let listings = Arc::new(AtomicUsize::new(0));
        let counter = listings.clone();

        let server = HttpServer::new(move || {
            let counter = counter.clone();
            let models = models.clone();
            let generation = generation.clone();
            App::new()
                .route(
                    "/v1beta/models",
                    web::get().to(move || {
                        counter.fetch_add(1, Ordering::SeqCst);
                        let reply = models.clone();
                        async move { respond(reply) }
                    }),
                )
                .route(
                    "/v1beta/models/{call}",
                    web::post().to(move || {
                        let reply = generation.clone();
                        async move { respond(reply) }
                    }),
                )
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();

        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        Stub {
            base_url: format!("http://{addr}"),
            listings,
            handle,
        }
    }

    fn model_list() -> Reply {
        (
            200,
            json!({
                "models": [
                    { "name": "models/embedding-001", "supportedGenerationMethods": ["embedContent"] },
                    { "name": "models/gemini-1.5-flash", "supportedGenerationMethods": ["generateContent"] }
                ]
            }),
        )
    }

    fn answer(text: &str) -> Reply {
        (
            200,
            json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] }),
        )
    }

    #[actix_web::test]
    async fn every_call_rediscovers_the_model() {
        let stub = spawn_stub(model_list(), answer(" Traffic dominates.\n"));
        let provider = GeminiProvider::new("key".to_string(), &stub.base_url);

        assert_eq!(provider.generate("one").await.unwrap(), "Traffic dominates.");
        assert_eq!(provider.generate("two").await.unwrap(), "Traffic dominates.");
        assert_eq!(stub.listings.load(Ordering::SeqCst), 2);

        stub.handle.stop(false).await;
    }

    #[actix_web::test]
    async fn rejected_listing_is_a_discovery_error() {
        let stub = spawn_stub(
            (403, json!({ "error": { "code": 403, "message": "API key not valid" } })),
            answer("unused"),
        );
        let provider = GeminiProvider::new("bad".to_string(), &stub.base_url);

        match provider.generate("prompt").await {
            Err(AiError::Discovery { message }) => assert_eq!(message, "API key not valid"),
            other => panic!("expected a discovery error, got {other:?}"),
        }

        stub.handle.stop(false).await;
    }

    #[actix_web::test]
    async fn listing_without_generators_is_no_capable_model() {
        let stub = spawn_stub(
            (
                200,
                json!({ "models": [{ "name": "models/embedding-001", "supportedGenerationMethods": ["embedContent"] }] }),
            ),
            answer("unused"),
        );
        let provider = GeminiProvider::new("key".to_string(), &stub.base_url);

        assert!(matches!(
            provider.generate("prompt").await,
            Err(AiError::NoCapableModel)
        ));

        stub.handle.stop(false).await;
    }

    #[actix_web::test]
    async fn failed_generation_is_a_generation_error() {
        let stub = spawn_stub(
            model_list(),
            (500, json!({ "error": { "code": 500, "message": "backend overloaded" } })),
        );
        let provider = GeminiProvider::new("key".to_string(), &stub.base_url);

        match provider.generate("prompt").await {
            Err(AiError::Generation { message }) => assert_eq!(message, "backend overloaded"),
            other => panic!("expected a generation error, got {other:?}"),
        }

        stub.handle.stop(false).await;
    }

    #[actix_web::test]
    async fn empty_candidate_list_is_no_candidates() {
        let stub = spawn_stub(model_list(), (200, json!({ "candidates": [] })));
        let provider = GeminiProvider::new("key".to_string(), &stub.base_url);

        assert!(matches!(
            provider.generate("prompt").await,
            Err(AiError::NoCandidates)
        ));

        stub.handle.stop(false).await;
    }

    #[test]
    fn selects_first_generation_capable_model() {
        let list: ModelList = serde_json::from_value(serde_json::json!({
            "models": [
                { "name": "models/embedding-001", "supportedGenerationMethods": ["embedContent"] },
                { "name": "models/gemini-1.5-flash", "supportedGenerationMethods": ["generateContent", "countTokens"] },
                { "name": "models/gemini-1.5-pro", "supportedGenerationMethods": ["generateContent"] }
            ]
        }))
        .unwrap();
        assert_eq!(select_model(&list), Some("models/gemini-1.5-flash"));
    }

    #[test]
    fn no_capable_model() {
        let list: ModelList = serde_json::from_value(serde_json::json!({
            "models": [{ "name": "models/embedding-001" }]
        }))
        .unwrap();
        assert_eq!(select_model(&list), None);

        let empty: ModelList = serde_json::from_str("{}").unwrap();
        assert_eq!(select_model(&empty), None);
    }

    #[test]
    fn request_uses_fixed_sampling_parameters() {
        let json = serde_json::to_value(GenerateRequest::new("hello")).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
        let config = &json["generationConfig"];
        assert!((config["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert!((config["topP"].as_f64().unwrap() - 0.95).abs() < 1e-6);
        assert_eq!(config["topK"], 40);
        assert_eq!(config["maxOutputTokens"], 500);

        let safety = json["safetySettings"].as_array().unwrap();
        assert_eq!(safety.len(), 4);
        assert!(safety.iter().all(|s| s["threshold"] == "BLOCK_NONE"));
    }

    #[test]
    fn extracts_trimmed_first_candidate() {
        let response: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [
                { "content": { "parts": [{ "text": "  Noise is high.\n" }] } },
                { "content": { "parts": [{ "text": "second" }] } }
            ]
        }))
        .unwrap();
        assert_eq!(first_candidate_text(response).unwrap(), "Noise is high.");
    }

    #[test]
    fn empty_candidates_is_an_error() {
        let response: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            first_candidate_text(response),
            Err(AiError::NoCandidates)
        ));

        let blocked: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        }))
        .unwrap();
        assert!(matches!(
            first_candidate_text(blocked),
            Err(AiError::NoCandidates)
        ));
    }

    #[test]
    fn error_body_message_is_preferred() {
        let msg = error_message(
            reqwest::StatusCode::FORBIDDEN,
            r#"{"error":{"code":403,"message":"API key not valid"}}"#,
        );
        assert_eq!(msg, "API key not valid");

        let msg = error_message(reqwest::StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(msg, "HTTP 502 Bad Gateway: upstream down");
    }
}
