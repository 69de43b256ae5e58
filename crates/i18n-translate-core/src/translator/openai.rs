use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Lang;
use crate::error::{Error, Result};
use super::traits::{BatchRequest, BatchTranslator, TranslatorInfo};

/// OpenAI-compatible API translator
/// Works with: llama.cpp server, Ollama, DeepSeek, OpenAI, etc.
///
/// A batch goes out as one chat completion carrying a JSON array of texts;
/// the model must answer with an array of the same length.
pub struct OpenAiBatchTranslator {
    client: Client,
    /// Base URL for the API (e.g., "http://localhost:8080/v1")
    pub api_base: String,
    /// Optional API key for authentication
    pub api_key: Option<String>,
    /// Model identifier
    pub model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<String>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

impl OpenAiBatchTranslator {
    pub fn new(
        api_base: String,
        api_key: Option<String>,
        model: String,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Error::TranslationRequest(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base,
            api_key,
            model,
        })
    }

    /// Create translation prompt
    fn create_prompt(texts: &[String], source: &Lang, target: &Lang) -> Result<String> {
        let payload = serde_json::to_string(texts)
            .map_err(|e| Error::TranslationRequest(format!("failed to encode texts: {e}")))?;

        Ok(format!(
            "Translate every string in the following JSON array from {} into {}. \
            Keep placeholders such as {{name}} unchanged. \
            Reply with only a JSON array of {} translated strings, in the same order.\n\n{}",
            language_name(source),
            language_name(target),
            texts.len(),
            payload
        ))
    }

    async fn request(&self, request: &BatchRequest) -> Result<Vec<String>> {
        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        let prompt = Self::create_prompt(&request.texts, &request.source, &request.target)?;

        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt,
            }],
            temperature: Some(0.3), // Lower temperature for more consistent translations
            user: (request.project_id != 0).then(|| format!("project-{}", request.project_id)),
        };

        debug!("Translation request for {} texts to {}", request.texts.len(), url);

        let mut req = self.client.post(&url).json(&body);

        // Add API key if configured
        if let Some(ref key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {key}"));
        }

        let response = req.send().await.map_err(|e| {
            warn!("Request failed: {}", e);
            Error::TranslationRequest(e.to_string())
        })?;

        let status = response.status();
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());

            warn!("Rate limited, retry after {:?}s", retry_after);
            return Err(Error::TranslationRateLimited { retry_after });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("API error: {} - {}", status, body);
            return Err(Error::TranslationRequest(format!("HTTP {status}: {body}")));
        }

        let chat_response = response
            .json::<ChatResponse>()
            .await
            .map_err(|e| Error::TranslationInvalidResponse(e.to_string()))?;

        let choice = chat_response.choices.first().ok_or_else(|| {
            Error::TranslationInvalidResponse("No choices in response".to_string())
        })?;

        parse_translations(&choice.message.content)
    }
}

/// Extract the JSON array of translations from a model reply
fn parse_translations(content: &str) -> Result<Vec<String>> {
    let trimmed = content.trim();
    // Models like to wrap JSON in a markdown fence
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    serde_json::from_str::<Vec<String>>(unfenced)
        .map_err(|e| Error::TranslationInvalidResponse(format!("expected a JSON array of strings: {e}")))
}

#[async_trait]
impl BatchTranslator for OpenAiBatchTranslator {
    fn info(&self) -> TranslatorInfo {
        TranslatorInfo {
            name: "OpenAI Compatible",
        }
    }

    async fn translate_batch(&self, request: &BatchRequest) -> Result<Vec<String>> {
        if request.texts.is_empty() {
            return Ok(Vec::new());
        }

        // Skip if source and target are the same
        if request.source == request.target {
            return Ok(request.texts.clone());
        }

        self.request(request).await
    }
}

/// Convert language code to human-readable name for prompts
fn language_name(lang: &Lang) -> &'static str {
    match lang.as_str() {
        "en" => "English",
        "zh" | "zh-CN" => "Simplified Chinese",
        "zh-TW" => "Traditional Chinese",
        "ja" => "Japanese",
        "ko" => "Korean",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "it" => "Italian",
        "pt" => "Portuguese",
        "ru" => "Russian",
        "ar" => "Arabic",
        "hi" => "Hindi",
        "th" => "Thai",
        "vi" => "Vietnamese",
        // For unknown languages, the LLM should still understand most ISO codes
        _ => "the specified language",
    }
}
