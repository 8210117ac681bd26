use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::ports::{GenerationClient, GenerationClientError};
use crate::domain::GenerationRequest;
use crate::infrastructure::observability::sanitize_prompt;
use crate::presentation::config::LlmSettings;

/// OpenAI-compatible chat completions client that asks for JSON-object output.
pub struct ChatCompletionsClient {
    client: Client,
    provider: String,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionsClient {
    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.provider == "azure" {
            request.header("api-key", &self.api_key)
        } else {
            request.header("Authorization", format!("Bearer {}", self.api_key))
        }
    }
}

#[async_trait]
impl GenerationClient for ChatCompletionsClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationClientError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            temperature: self.temperature,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        tracing::debug!(
            model = %self.model,
            exam_type = %request.exam_type,
            prompt = %sanitize_prompt(&request.user_prompt),
            "Sending chat completion request"
        );

        let http_request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body);
        let response = self
            .apply_auth(http_request)
            .send()
            .await
            .map_err(|e| GenerationClientError::ApiRequestFailed(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GenerationClientError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationClientError::ApiRequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| GenerationClientError::InvalidResponse(e.to_string()))?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| GenerationClientError::InvalidResponse("empty choices".to_string()))?;

        // An empty message is an empty object, not an error: no questions.
        Ok(choice
            .message
            .content
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| "{}".to_string()))
    }
}

pub fn create_generation_client(
    settings: &LlmSettings,
) -> Result<ChatCompletionsClient, GenerationClientError> {
    let base_url = match settings.provider.as_str() {
        "openai" => "https://api.openai.com/v1".to_string(),
        "groq" => "https://api.groq.com/openai/v1".to_string(),
        "compatible" => settings
            .base_url
            .clone()
            .ok_or_else(|| {
                GenerationClientError::InvalidResponse(
                    "base_url required for compatible provider".to_string(),
                )
            })?
            .trim_end_matches('/')
            .to_string(),
        "azure" => {
            let endpoint = settings.base_url.as_ref().ok_or_else(|| {
                GenerationClientError::InvalidResponse(
                    "base_url required for azure provider".to_string(),
                )
            })?;
            format!(
                "{}/openai/deployments/{}",
                endpoint.trim_end_matches('/'),
                settings.model
            )
        }
        _ => {
            return Err(GenerationClientError::InvalidResponse(format!(
                "unknown provider: {}",
                settings.provider
            )));
        }
    };

    let client = Client::builder()
        .timeout(Duration::from_secs(settings.request_timeout_secs))
        .build()
        .map_err(|e| GenerationClientError::ApiRequestFailed(e.to_string()))?;

    Ok(ChatCompletionsClient {
        client,
        provider: settings.provider.clone(),
        base_url,
        api_key: settings.api_key.clone(),
        model: settings.model.clone(),
        temperature: settings.temperature,
    })
}
