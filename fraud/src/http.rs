//! OpenAI-compatible vision classifier.
//!
//! Sends the artifact as a base64 data URL alongside a fixed rubric prompt
//! and parses the JSON object the model is asked to reply with.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};

use crate::{Artifact, Classifier, ClassifierError, RawAssessment};

const RUBRIC_PROMPT: &str = "Analyze this certificate for authenticity. \
Rate from 0-100 (0=authentic, 100=forged):\n\
1. Logo quality and clarity\n\
2. Font consistency and professionalism\n\
3. Design elements and layout\n\
4. Signs of digital manipulation\n\
5. Watermark or security features\n\n\
Respond ONLY with JSON: {\"fraudScore\": number, \"verdict\": \"authentic|suspicious|forged\", \
\"concerns\": [], \"confidence\": number, \"recommendation\": \"auto_approve|flag_for_review|auto_reject\"}";

const MAX_TOKENS: u32 = 300;

#[derive(Clone, Debug)]
pub struct HttpClassifierConfig {
    /// Base URL up to and including the API version, e.g. `https://api.openai.com/v1`.
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    /// Transport-level timeout. The gate applies its own, usually shorter, deadline.
    pub request_timeout: Duration,
}

pub struct HttpClassifier {
    client: Client,
    config: HttpClassifierConfig,
}

impl HttpClassifier {
    pub fn new(config: HttpClassifierConfig) -> Result<Self, ClassifierError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClassifierError::Network(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.endpoint.trim_end_matches('/'))
    }

    fn request_body(&self, artifact: &Artifact) -> ChatRequest {
        let data_url = format!(
            "data:{};base64,{}",
            artifact.content_type,
            BASE64.encode(&artifact.bytes)
        );
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: RUBRIC_PROMPT.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: data_url },
                    },
                ],
            }],
            max_tokens: MAX_TOKENS,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Vec<ContentPart>,
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
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageResponse,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Option<String>,
}

#[async_trait]
impl Classifier for HttpClassifier {
    fn id(&self) -> &str {
        &self.config.model
    }

    async fn classify(&self, artifact: &Artifact) -> Result<RawAssessment, ClassifierError> {
        if artifact.is_empty() {
            return Err(ClassifierError::EmptyArtifact);
        }

        let mut request = self
            .client
            .post(self.chat_completions_url())
            .json(&self.request_body(artifact));
        if let Some(key) = &self.config.api_key {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClassifierError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Status { status, body });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::Malformed(e.to_string()))?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ClassifierError::Malformed("no choices in response".to_string()))?;

        parse_reply(&content)
    }
}

/// Parse the model's reply, tolerating a surrounding markdown code fence.
pub fn parse_reply(content: &str) -> Result<RawAssessment, ClassifierError> {
    serde_json::from_str(strip_code_fence(content))
        .map_err(|e| ClassifierError::Malformed(e.to_string()))
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the opening fence line.
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}
