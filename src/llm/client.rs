use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use crate::error::PipelineError;
use crate::models::AnnotationResponse;

/// Configuration for the OpenAI-compatible audio chat endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key (from OPENAI_API_KEY env var)
    pub api_key: String,
    /// Audio-understanding model to use
    pub model: String,
    /// Temperature (0-1, lower = more deterministic)
    pub temperature: f64,
    /// Maximum completion tokens in the response
    pub max_completion_tokens: u32,
    /// Endpoint URL, overridable for tests and proxies
    pub endpoint: String,
}

impl OpenAiConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .context("OPENAI_API_KEY environment variable not set")?;
        Ok(Self::new(api_key))
    }

    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: "gpt-audio".to_string(),
            temperature: 0.1,
            max_completion_tokens: 16_384,
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
        }
    }
}

/// One segment's classification outcome: the parsed per-line scores plus the
/// provider's raw payload, persisted alongside the scored rows for diagnosis.
#[derive(Debug)]
pub struct SegmentAnnotation {
    pub response: AnnotationResponse,
    pub raw: Value,
}

/// Client for the audio emotion-classification calls.
pub struct OpenAiClient {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Classify one (transcript segment, audio segment) pair.
    ///
    /// The request carries the newline-joined transcript and the base64 wav
    /// payload. A response whose finish_reason is not "stop" is incomplete:
    /// the full payload is logged and the call fails so the chapter aborts
    /// rather than merging a partial emotion distribution.
    pub async fn classify_segment(
        &self,
        system: &str,
        dialogue_text: &str,
        audio_wav: &[u8],
    ) -> Result<SegmentAnnotation> {
        let audio_b64 = BASE64.encode(audio_wav);

        let request = ChatRequest {
            model: self.config.model.clone(),
            temperature: self.config.temperature,
            max_completion_tokens: self.config.max_completion_tokens,
            messages: vec![
                Message {
                    role: "system",
                    content: MessageContent::Text(system.to_string()),
                },
                Message {
                    role: "user",
                    content: MessageContent::Parts(vec![
                        ContentPart::InputAudio {
                            input_audio: InputAudio {
                                data: audio_b64,
                                format: "wav",
                            },
                        },
                        ContentPart::Text {
                            text: format!(
                                "TRANSCRIPT (DO NOT USE FOR CLASSIFICATION):\n{dialogue_text}"
                            ),
                        },
                    ]),
                },
            ],
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to model endpoint")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Model API error: {} - {}", status, body);
        }

        let raw: Value = response
            .json()
            .await
            .context("Failed to parse model response body")?;

        let finish_reason = raw["choices"][0]["finish_reason"]
            .as_str()
            .unwrap_or("")
            .to_string();
        if finish_reason != "stop" {
            error!(
                "Incomplete model response:\n{}",
                serde_json::to_string_pretty(&raw).unwrap_or_default()
            );
            return Err(PipelineError::IncompleteResponse { finish_reason }.into());
        }

        let content = raw["choices"][0]["message"]["content"]
            .as_str()
            .context("No message content in model response")?;
        let response: AnnotationResponse = serde_json::from_str(content)
            .context("Model reply was not a JSON emotion-score object")?;

        Ok(SegmentAnnotation {
            response,
            raw,
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    temperature: f64,
    max_completion_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
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
    InputAudio { input_audio: InputAudio },
    Text { text: String },
}

#[derive(Debug, Serialize)]
struct InputAudio {
    data: String,
    format: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let request = ChatRequest {
            model: "gpt-audio".to_string(),
            temperature: 0.1,
            max_completion_tokens: 16_384,
            messages: vec![Message {
                role: "user",
                content: MessageContent::Parts(vec![
                    ContentPart::InputAudio {
                        input_audio: InputAudio {
                            data: "AAAA".to_string(),
                            format: "wav",
                        },
                    },
                    ContentPart::Text {
                        text: "TRANSCRIPT".to_string(),
                    },
                ]),
            }],
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["content"][0]["type"], "input_audio");
        assert_eq!(
            json["messages"][0]["content"][0]["input_audio"]["format"],
            "wav"
        );
        assert_eq!(json["messages"][0]["content"][1]["type"], "text");
    }

    #[test]
    fn test_config_defaults() {
        let config = OpenAiConfig::new("sk-test".to_string());
        assert_eq!(config.model, "gpt-audio");
        assert_eq!(config.max_completion_tokens, 16_384);
    }
}
