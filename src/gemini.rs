//! Gemini API client
//!
//! The external model collaborator: builds a role-tagged request from the
//! conversation history plus the new user message, attaches the fixed
//! system instruction and generation/safety configuration, and returns the
//! reply text. Uses a long-lived reqwest::Client for connection pooling.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

use crate::chat::ChatModel;
use crate::error::ChatError;
use crate::models::Turn;

const MODEL_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fixed persona: child-friendly assistant that surfaces and gently
/// corrects gender and racial bias. Not configurable.
const SYSTEM_INSTRUCTION: &str = "You are a child-friendly and helpful assistant. You should identify instances of gender and racial bias in conversations and provide age-appropriate feedback that encourages inclusivity. When a bias is detected, respond by explaining why it is wrong and offer alternative inclusive suggestions. Begin by asking appropriate questions that may result in a biased response from children (implicit or explicit). After 4 questions, ask a few final questions to see if the child's bias (if any) has decreased after reading your responses. Avoid using more complex language and sentences, since the responses will be read by children ages 5-10.";

/// Reusable Gemini client (connection-pooled)
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            base_url: MODEL_ENDPOINT.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl ChatModel for GeminiClient {
    async fn generate(&self, history: &[Turn], user_message: &str) -> crate::Result<String> {
        if self.api_key.is_empty() {
            return Err(ChatError::ModelError(
                "GEMINI_API_KEY not configured".to_string(),
            ));
        }

        let url = format!("{}?key={}", self.base_url, self.api_key);
        let request = build_request(history, user_message);

        info!("Calling Gemini API with {} content entries", request.contents.len());

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Gemini API request failed: {}", e);
                if e.is_timeout() {
                    ChatError::ModelTimeout(format!("Gemini API timeout: {}", e))
                } else {
                    ChatError::ModelError(format!("Gemini API error: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Gemini API error response: {}", error_text);
            return Err(ChatError::ModelError(format!(
                "Gemini API error: {}",
                error_text
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Gemini response: {}", e);
            ChatError::ModelError(format!("Gemini parse error: {}", e))
        })?;

        extract_reply(gemini_response)
    }
}

/// Map stored turns plus the new user message into the wire request
fn build_request(history: &[Turn], user_message: &str) -> GeminiRequest {
    let mut contents: Vec<Content> = history
        .iter()
        .map(|turn| Content {
            role: turn.role.as_gemini_role().to_string(),
            parts: vec![Part {
                text: turn.text.clone(),
            }],
        })
        .collect();

    contents.push(Content {
        role: "user".to_string(),
        parts: vec![Part {
            text: user_message.to_string(),
        }],
    });

    GeminiRequest {
        contents,
        generation_config: GenerationConfig {
            temperature: 0.7,
            top_p: 0.95,
            max_output_tokens: 1024,
            response_modalities: vec!["TEXT".to_string()],
        },
        safety_settings: default_safety_settings(),
        system_instruction: SystemInstruction {
            parts: vec![Part {
                text: SYSTEM_INSTRUCTION.to_string(),
            }],
        },
    }
}

/// Block medium-or-above severity across all four harm categories
fn default_safety_settings() -> Vec<SafetySetting> {
    [
        "HARM_CATEGORY_HATE_SPEECH",
        "HARM_CATEGORY_DANGEROUS_CONTENT",
        "HARM_CATEGORY_SEXUALLY_EXPLICIT",
        "HARM_CATEGORY_HARASSMENT",
    ]
    .iter()
    .map(|category| SafetySetting {
        category: category.to_string(),
        threshold: "BLOCK_MEDIUM_AND_ABOVE".to_string(),
    })
    .collect()
}

/// Pull the reply text out of the response, surfacing safety blocks and
/// empty candidates as errors rather than an empty reply.
fn extract_reply(response: GeminiResponse) -> crate::Result<String> {
    if let Some(feedback) = &response.prompt_feedback {
        if let Some(reason) = &feedback.block_reason {
            return Err(ChatError::EmptyModelResponse(format!(
                "prompt blocked: {}",
                reason
            )));
        }
    }

    let candidate = response.candidates.into_iter().next().ok_or_else(|| {
        ChatError::EmptyModelResponse("no candidates returned".to_string())
    })?;

    // A candidate may split its reply across several parts
    let text: String = candidate
        .content
        .map(|content| content.parts.into_iter().map(|part| part.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate
            .finish_reason
            .unwrap_or_else(|| "unknown".to_string());
        return Err(ChatError::EmptyModelResponse(format!(
            "no text in candidate (finish reason: {})",
            reason
        )));
    }

    Ok(text)
}

//
// ================= Wire Types =================
//

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
    system_instruction: SystemInstruction,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    max_output_tokens: i32,
    response_modalities: Vec<String>,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: String,
    threshold: String,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}
