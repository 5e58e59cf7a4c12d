//! Chat-completions client for transcription and summarization
//!
//! Both capabilities are one request/response exchange against
//! `{base_url}/chat/completions`. Any non-2xx status, or a body without
//! `choices[0].message.content`, is a capability failure.

use async_trait::async_trait;
use base64::Engine;
use inkwell_common::config::CapabilityConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::prompts::{self, summary_prompt};
use super::{CapabilityError, ImagePayload, Summarizer, SummaryMode, Transcriber};

const USER_AGENT: &str = concat!("inkwell-scribe/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Vision/language provider client
pub struct OpenAiClient {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
    vision_model: String,
    title_model: String,
    insight_model: String,
}

impl OpenAiClient {
    /// Build a client from validated configuration
    pub fn new(config: &CapabilityConfig) -> Result<Self, CapabilityError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(CapabilityError::Unauthorized)?
            .to_string();

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| CapabilityError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            vision_model: config.vision_model.clone(),
            title_model: config.title_model.clone(),
            insight_model: config.insight_model.clone(),
        })
    }

    async fn complete(&self, request: &ChatRequest<'_>) -> Result<String, CapabilityError> {
        let url = format!("{}/chat/completions", self.base_url);
        tracing::debug!(url = %url, model = request.model, "Calling chat completions");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| CapabilityError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(CapabilityError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Provider returned error status");
            return Err(CapabilityError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| CapabilityError::MalformedResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                CapabilityError::MalformedResponse("no choices[0].message.content".to_string())
            })
    }

    fn model_for(&self, mode: SummaryMode) -> &str {
        match mode {
            SummaryMode::Title => &self.title_model,
            _ => &self.insight_model,
        }
    }
}

#[async_trait]
impl Transcriber for OpenAiClient {
    async fn transcribe(&self, image: &ImagePayload) -> Result<String, CapabilityError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&image.bytes[..]);
        let request = ChatRequest {
            model: &self.vision_model,
            messages: vec![ChatMessage {
                role: "user",
                content: MessageContent::Parts(vec![
                    ContentPart::Text {
                        text: prompts::TRANSCRIBE_INSTRUCTION.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: format!("data:{};base64,{}", image.mime_type, encoded),
                        },
                    },
                ]),
            }],
            max_tokens: 500,
            temperature: 0.0,
        };

        let mut text = self.complete(&request).await?;
        if text.trim().is_empty() {
            text = prompts::NO_TEXT_DETECTED.to_string();
        }
        tracing::info!(
            file_name = %image.file_name,
            chars = text.len(),
            "Image transcribed"
        );
        Ok(text)
    }
}

#[async_trait]
impl Summarizer for OpenAiClient {
    async fn summarize(&self, text: &str, mode: SummaryMode) -> Result<String, CapabilityError> {
        let prompt = summary_prompt(text, mode);
        let request = ChatRequest {
            model: self.model_for(mode),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(prompt.system.to_string()),
                },
                ChatMessage {
                    role: "user",
                    content: MessageContent::Text(prompt.user),
                },
            ],
            max_tokens: prompt.max_tokens,
            temperature: prompt.temperature,
        };

        let reply = self.complete(&request).await?;
        match mode {
            SummaryMode::Title => Ok(prompts::clean_title(&reply)),
            _ => Ok(reply),
        }
    }
}
