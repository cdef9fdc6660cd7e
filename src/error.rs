use crate::document::Scope;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure of a correction pass as seen by the caller.
#[derive(Debug, Error)]
pub enum Error {
    #[error("correction provider failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("nothing to check: the {0} is empty")]
    EmptyInput(Scope),

    #[error("document host error: {0}")]
    HostSync(#[from] HostError),
}

/// The correction call failed or its reply could not be understood.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("API key not set (expected in ${0})")]
    MissingApiKey(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("provider reply contains no text")]
    EmptyReply,

    #[error("no JSON object found in provider reply")]
    NoJson,

    #[error("malformed JSON in provider reply: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("provider reply has no \"corrected\" text")]
    MissingCorrection,
}

/// Communication with the document host failed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("span {start}..{end} is from revision {span_revision}, document is at {revision}")]
    StaleSpan {
        start: usize,
        end: usize,
        span_revision: u64,
        revision: u64,
    },

    #[error("span {start}..{end} is outside the document (length {len})")]
    OutOfRange { start: usize, end: usize, len: usize },

    #[error("document has changes that were not synced before reading")]
    Unsynced,

    #[error("host unavailable: {0}")]
    Unavailable(String),
}
