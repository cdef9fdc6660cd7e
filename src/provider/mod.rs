pub mod gemini;

use crate::error::ProviderError;
use serde::Deserialize;

pub use gemini::GeminiProvider;

/// Something that turns a text into its corrected form.
pub trait CorrectionProvider {
    fn correct(&self, text: &str) -> Result<String, ProviderError>;
}

impl<F> CorrectionProvider for F
where
    F: Fn(&str) -> Result<String, ProviderError>,
{
    fn correct(&self, text: &str) -> Result<String, ProviderError> {
        self(text)
    }
}

/// Always answers with the same corrected text.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    corrected: String,
}

impl StaticProvider {
    pub fn new(corrected: impl Into<String>) -> Self {
        Self {
            corrected: corrected.into(),
        }
    }
}

impl CorrectionProvider for StaticProvider {
    fn correct(&self, _text: &str) -> Result<String, ProviderError> {
        Ok(self.corrected.clone())
    }
}

/// Instruction sent along with the text to correct.
pub fn build_prompt(text: &str) -> String {
    format!(
        r#"You are an experienced copy editor.
Tasks:
1. Fix spelling mistakes and typos (e.g. "dukhách" -> "du khách").
2. Restore words missing from common phrases, proper names or job titles (e.g. "Ban quản Núi Bà Đen" -> "Ban Quản lý Núi Bà Đen").
3. Fix grammar and punctuation.

IMPORTANT:
- Do NOT change the style of the text.
- Do NOT rewrite sentences unless necessary.
- Keep the original meaning.

Original text: "{text}"

Answer with JSON in this format:
{{
    "corrected": "the complete corrected text"
}}"#
    )
}

#[derive(Deserialize)]
struct Reply {
    corrected: Option<String>,
}

/// Pull the corrected text out of a model reply that should contain a JSON
/// object `{"corrected": "..."}`, possibly wrapped in prose or code fences.
pub fn parse_response(raw: &str) -> Result<String, ProviderError> {
    let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) else {
        return Err(ProviderError::NoJson);
    };
    if end <= start {
        return Err(ProviderError::NoJson);
    }

    let reply: Reply = serde_json::from_str(&raw[start..=end])?;
    reply.corrected.ok_or(ProviderError::MissingCorrection)
}
