//! Content analysis: turn a device description into an e-waste assessment
//! with Gemini `generateContent`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use ecoscan_core::{ContentAnalyzer, EcoScanError, Result};

use crate::prompt::analysis_prompt;
use crate::{ErrorBody, transport_error};

pub const MODEL: &str = "gemini-2.0-flash";
pub const TEMPERATURE: f32 = 0.4;
pub const TOP_P: f32 = 0.95;
pub const TOP_K: u32 = 40;
pub const MAX_OUTPUT_TOKENS: u32 = 8192;

const SERVICE: &str = "gemini";

/// Gemini-backed content analyzer. Generation parameters are fixed.
pub struct GeminiAnalyzer {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl GeminiAnalyzer {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| EcoScanError::config("Missing GEMINI_API_KEY environment variable"))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Request body for one analysis.
pub fn generate_request(description: &str) -> serde_json::Value {
    let body = GenerateRequest {
        contents: vec![Content {
            parts: vec![Part {
                text: analysis_prompt(description),
            }],
        }],
        generation_config: GenerationConfig {
            temperature: TEMPERATURE,
            top_p: TOP_P,
            top_k: TOP_K,
            max_output_tokens: MAX_OUTPUT_TOKENS,
            response_mime_type: "application/json",
        },
    };
    serde_json::to_value(body).unwrap_or_default()
}

/// Extract the model's text from a `generateContent` reply.
pub fn parse_generate_response(status: u16, body: &str) -> Result<String> {
    let parsed: Option<GenerateResponse> = serde_json::from_str(body).ok();
    let success = (200..300).contains(&status);

    let parsed = match parsed {
        Some(parsed) if success && parsed.error.is_none() => parsed,
        Some(GenerateResponse { error: Some(error), .. }) => {
            return Err(EcoScanError::upstream(SERVICE, error.message));
        }
        _ if !success => {
            return Err(EcoScanError::upstream(SERVICE, format!("HTTP {status}: {body}")));
        }
        _ => return Err(EcoScanError::upstream(SERVICE, "unreadable generateContent response")),
    };

    if let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(EcoScanError::upstream(SERVICE, format!("prompt blocked: {reason}")));
    }

    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(EcoScanError::upstream(SERVICE, "model returned no text"));
    }
    Ok(text)
}

#[async_trait]
impl ContentAnalyzer for GeminiAnalyzer {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn analyze(&self, description: &str) -> Result<String> {
        let api_key = self.api_key()?;
        info!(model = %self.model, "[Gemini] Requesting device analysis");
        debug!(description, "[Gemini] Description");

        let resp = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .query(&[("key", api_key)])
            .json(&generate_request(description))
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;

        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(|e| transport_error(SERVICE, e))?;
        parse_generate_response(status, &body)
    }
}
