use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::error::NarrativeError;
use super::model::NarrativeModel;

/// Configuration for a local Ollama server.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Base URL, e.g. `http://localhost:11434`.
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl OllamaConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        OllamaConfig {
            base_url: base_url.into(),
            model: "llama3".to_string(),
            temperature: 0.5,
            timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for the Ollama `/api/generate` endpoint, non-streaming.
#[derive(Debug)]
pub struct OllamaClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> Result<Self, NarrativeError> {
        if config.base_url.trim().is_empty() {
            return Err(NarrativeError::NotConfigured("empty Ollama base URL".into()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NarrativeError::NotConfigured(format!("failed to build HTTP client: {e}")))?;

        Ok(OllamaClient {
            client,
            endpoint: format!("{}/api/generate", config.base_url.trim().trim_end_matches('/')),
            model: config.model,
            temperature: config.temperature,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl NarrativeModel for OllamaClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, NarrativeError> {
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
            },
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|source| NarrativeError::Http {
                endpoint: self.endpoint.clone(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NarrativeError::Api {
                status: status.as_u16(),
                body: body.chars().take(512).collect(),
            });
        }

        let parsed: GenerateResponse = resp.json().await.map_err(|source| NarrativeError::Http {
            endpoint: self.endpoint.clone(),
            source,
        })?;

        if parsed.response.trim().is_empty() {
            return Err(NarrativeError::EmptyResponse);
        }
        Ok(parsed.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_and_body() {
        let client = OllamaClient::new(OllamaConfig::new("http://localhost:11434/")).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:11434/api/generate");
        assert_eq!(client.name(), "llama3");

        let body = GenerateRequest {
            model: "llama3",
            prompt: "hi",
            stream: false,
            options: GenerateOptions { temperature: 0.5 },
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "model": "llama3",
                "prompt": "hi",
                "stream": false,
                "options": { "temperature": 0.5 }
            })
        );
    }

    #[test]
    fn test_blank_base_url_rejected() {
        let result = OllamaClient::new(OllamaConfig::new(" "));
        assert!(matches!(result, Err(NarrativeError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_http_error() {
        let mut config = OllamaConfig::new("http://127.0.0.1:1");
        config.timeout = Duration::from_millis(200);
        let client = OllamaClient::new(config).unwrap();

        let err = client.generate("hi").await.unwrap_err();
        assert!(matches!(err, NarrativeError::Http { .. }));
    }
}
