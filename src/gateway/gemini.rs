// src/gateway/gemini.rs

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::{
    config::Config,
    gateway::{CompletionClient, GatewayError, Prompt},
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Google Gemini `generateContent` client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: Url,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.gateway_timeout())
            .build()
            .map_err(|e| GatewayError::Http(e.to_string()))?;

        let endpoint = config
            .gemini_base_url
            .join(&format!("models/{}:generateContent", config.gemini_model))
            .map_err(|e| GatewayError::Http(e.to_string()))?;

        info!(model = %config.gemini_model, "Creating Gemini client");
        Ok(Self {
            client,
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
            endpoint,
        })
    }
}

fn build_request(prompt: Prompt) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![Part { text: prompt.text }],
        }],
        system_instruction: prompt.system_instruction.map(|text| Content {
            role: None,
            parts: vec![Part { text }],
        }),
        generation_config: GenerationConfig {
            temperature: if prompt.json { 0.4 } else { 0.7 },
            response_mime_type: prompt.json.then_some("application/json"),
        },
    }
}

/// Concatenates the text parts of the first candidate.
fn first_candidate_text(response: GenerateResponse) -> Option<String> {
    let content = response.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().map(|p| p.text).collect();
    (!text.trim().is_empty()).then_some(text)
}

#[async_trait]
impl CompletionClient for GeminiClient {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.text.len(), model = %self.model))]
    async fn complete(&self, prompt: Prompt) -> Result<String, GatewayError> {
        let request = build_request(prompt);

        debug!("Sending request to Gemini API");
        let response = self
            .client
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    warn!("Gemini request timed out");
                    GatewayError::Timeout
                } else {
                    error!(error = %e, "HTTP request failed");
                    GatewayError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        debug!(status = %status, "Received response from Gemini API");

        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("Gemini API rate limit exceeded");
            return Err(GatewayError::RateLimit);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            error!("Gemini API authentication failed");
            return Err(GatewayError::Authentication);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %body, "Gemini API error");
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout
            } else {
                error!(error = %e, "Failed to parse Gemini response JSON");
                GatewayError::Http(e.to_string())
            }
        })?;

        let text = first_candidate_text(parsed).ok_or_else(|| {
            error!("No text in Gemini response");
            GatewayError::Empty
        })?;
        info!(response_len = text.len(), "Received Gemini response");
        Ok(text)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
