use super::{build_prompt, parse_response, CorrectionProvider};
use crate::error::ProviderError;
use crate::Config;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Correction provider backed by the Gemini `generateContent` endpoint.
pub struct GeminiProvider {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiProvider {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    /// Build from configuration, reading the key from `config.api_key_env`.
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ProviderError::MissingApiKey(config.api_key_env.clone()))?;

        Self::new(
            api_key.trim(),
            config.model.as_str(),
            config.endpoint.as_str(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<PromptPart<'a>>,
}

#[derive(Serialize)]
struct PromptPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Debug, Deserialize)]
struct ReplyPart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first candidate, all parts concatenated.
    fn text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

impl CorrectionProvider for GeminiProvider {
    fn correct(&self, text: &str) -> Result<String, ProviderError> {
        let prompt = build_prompt(text);
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![PromptPart { text: &prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        tracing::info!(model = %self.model, chars = text.len(), "requesting correction");
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let reply: GenerateResponse = response.json()?;
        let raw = reply.text().ok_or(ProviderError::EmptyReply)?;
        tracing::debug!(raw = %raw, "provider reply");

        parse_response(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![PromptPart { text: "hi" }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
    }

    #[test]
    fn test_reply_text_joins_parts() {
        let reply: GenerateResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "{\"corrected\": "}, {"text": "\"ok\"}"}]}}]}"#,
        )
        .unwrap();
        let raw = reply.text().unwrap();
        assert_eq!(parse_response(&raw).unwrap(), "ok");
    }

    #[test]
    fn test_empty_reply() {
        let reply: GenerateResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(reply.text().is_none());
        let reply: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(reply.text().is_none());
    }

    #[test]
    fn test_url_and_missing_key() {
        let provider = GeminiProvider::new(
            "key",
            "gemini-2.0-flash",
            "https://example.test/v1beta/",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            provider.url(),
            "https://example.test/v1beta/models/gemini-2.0-flash:generateContent"
        );

        let config = Config {
            api_key_env: "AMEND_TEST_KEY_THAT_IS_NOT_SET".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            GeminiProvider::from_config(&config),
            Err(ProviderError::MissingApiKey(_))
        ));
    }
}
