use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::error::NarrativeError;
use super::model::NarrativeModel;

/// Configuration for the Gemini HTTP adapter.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    /// Base URL, e.g. `https://generativelanguage.googleapis.com`.
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        GeminiConfig {
            api_key: api_key.into(),
            model: model.into(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// HTTP client for the Gemini `generateContent` API.
#[derive(Debug)]
pub struct GeminiClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, NarrativeError> {
        if config.api_key.trim().is_empty() {
            return Err(NarrativeError::NotConfigured("empty API key".into()));
        }

        let mut headers = reqwest::header::HeaderMap::new();
        let mut key = reqwest::header::HeaderValue::from_str(config.api_key.trim())
            .map_err(|_| NarrativeError::NotConfigured("invalid API key characters".into()))?;
        key.set_sensitive(true);
        headers.insert("x-goog-api-key", key);

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| NarrativeError::NotConfigured(format!("failed to build HTTP client: {e}")))?;

        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            config.model
        );

        Ok(GeminiClient {
            client,
            endpoint,
            model: config.model,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Concatenate the text parts of the first candidate.
fn first_candidate_text(response: GenerateResponse) -> Result<String, NarrativeError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(NarrativeError::EmptyResponse)?;

    Ok(candidate
        .content
        .map(|c| c.parts.into_iter().map(|p| p.text).collect::<String>())
        .unwrap_or_default())
}

#[async_trait]
impl NarrativeModel for GeminiClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, NarrativeError> {
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
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

        first_candidate_text(parsed)
    }
}
