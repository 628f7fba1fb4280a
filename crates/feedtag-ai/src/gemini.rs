//! HTTP client for Gemini's `generateContent` endpoint.

use feedtag_core::{DEFAULT_FUNCTION_NAME, FunctionCall, RawModelPayload};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::analyze::Requester;
use crate::config::{GeminiConfig, GenerationConfig};
use crate::prompt;

const GENERIC_API_ERROR: &str = "Failed to get summary from Gemini API";
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("API key not set. Please configure your Gemini API key.")]
    MissingApiKey,
    #[error("post text is empty")]
    EmptyText,
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

// ── Wire types ──

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<RequestContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

impl RequestContent {
    fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![RequestPart { text: text.into() }],
        }
    }
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct FunctionDeclaration {
    name: &'static str,
    description: &'static str,
    parameters: Value,
}

/// The parts of a `generateContent` response the analysis flow reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub function_call: Option<FunctionCall>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

/// Map a response onto the normalizer's input.
///
/// Only the first candidate is read. Its first function call and its first
/// non-blank text part are both kept; the normalizer decides which to trust.
pub fn payload_from_response(response: &GenerateContentResponse) -> RawModelPayload {
    let Some(parts) = response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|c| &c.parts)
    else {
        return RawModelPayload::empty();
    };

    RawModelPayload {
        function_call: parts.iter().find_map(|p| p.function_call.clone()),
        text: parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .find(|t| !t.trim().is_empty())
            .map(str::to_string),
    }
}

/// Gemini client holding the credential and request settings.
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(mut config: GeminiConfig) -> Self {
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Endpoint URL, without the key.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }

    fn analysis_request(&self, post: &str) -> GenerateContentRequest {
        let tag_set = self.config.tag_set;
        let (user_prompt, tools) = if self.config.structured_output {
            let declaration = FunctionDeclaration {
                name: DEFAULT_FUNCTION_NAME,
                description: prompt::FUNCTION_DESCRIPTION,
                parameters: prompt::output_schema(tag_set),
            };
            (
                prompt::build_user_prompt(post),
                vec![Tool {
                    function_declarations: vec![declaration],
                }],
            )
        } else {
            (prompt::build_text_prompt(post, tag_set), Vec::new())
        };

        GenerateContentRequest {
            contents: vec![RequestContent::text(user_prompt)],
            generation_config: self.config.generation.clone(),
            system_instruction: Some(RequestContent::text(prompt::SYSTEM_INSTRUCTION)),
            tools,
        }
    }

    async fn generate(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, TransportError> {
        if self.config.api_key.is_empty() {
            return Err(TransportError::MissingApiKey);
        }

        let url = self.endpoint();
        info!(url = %url, tools = request.tools.len(), "calling Gemini");
        let resp = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, self.config.api_key.expose())
            .json(request)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(TransportError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        let response: GenerateContentResponse = serde_json::from_str(&body)?;
        debug!(candidates = response.candidates.len(), "Gemini responded");
        Ok(response)
    }

    /// Send the post for analysis and return the raw model output.
    pub async fn fetch_analysis(&self, post: &str) -> Result<RawModelPayload, TransportError> {
        let post = post.trim();
        if post.is_empty() {
            return Err(TransportError::EmptyText);
        }
        let response = self.generate(&self.analysis_request(post)).await?;
        Ok(payload_from_response(&response))
    }

    /// Check that the key is accepted with a minimal request.
    pub async fn verify_key(&self) -> Result<(), TransportError> {
        let request = GenerateContentRequest {
            contents: vec![RequestContent::text(prompt::VERIFY_PROMPT)],
            generation_config: GenerationConfig {
                max_output_tokens: 10,
                ..GenerationConfig::default()
            },
            system_instruction: None,
            tools: Vec::new(),
        };
        self.generate(&request).await?;
        info!("API key verified");
        Ok(())
    }
}

impl Requester for GeminiClient {
    async fn fetch_analysis(&self, text: &str) -> Result<RawModelPayload, TransportError> {
        GeminiClient::fetch_analysis(self, text).await
    }
}

/// `error.message` from an API error body, or a generic message.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| GENERIC_API_ERROR.to_string())
}
