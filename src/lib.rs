pub mod cli;
pub mod config;
pub mod diff;
pub mod document;
pub mod error;
pub mod patch;
pub mod provider;
pub mod session;

pub use config::Config;
pub use diff::{BlockKind, BlockStatus, DiffResult, EditBlock, Ordinal, ReviewCard};
pub use document::{memory::MemoryDocument, Document, Highlight, Scope, SearchOptions};
pub use error::{Error, HostError, ProviderError, Result};
pub use patch::{ApplyOutcome, BulkReport, Patcher};
pub use provider::{CorrectionProvider, StaticProvider};
pub use session::{CheckReport, Command, Session};

/// A span of the host document, valid for the revision it was produced at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSpan {
    pub start: usize,
    pub end: usize,
    pub revision: u64,
}

impl TextSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}
