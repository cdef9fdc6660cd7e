pub mod memory;

use crate::error::HostError;
use crate::TextSpan;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Portion of the document a check runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Selection,
    Whole,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Selection => write!(f, "selection"),
            Scope::Whole => write!(f, "document"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub case_insensitive: bool,
    pub whole_token: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            case_insensitive: true,
            whole_token: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Highlight {
    Yellow,
    Green,
    Cyan,
    Pink,
}

impl FromStr for Highlight {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yellow" => Ok(Highlight::Yellow),
            "green" => Ok(Highlight::Green),
            "cyan" => Ok(Highlight::Cyan),
            "pink" => Ok(Highlight::Pink),
            _ => Err(format!("Unknown highlight colour: {}", s)),
        }
    }
}

/// Request/response access to a live, externally owned document.
///
/// Results of `search` are only trustworthy after `sync`, and a mutation is
/// not guaranteed to be visible to the next call until `sync` returns. Spans
/// handed back by `search` may go stale once the document changes.
pub trait Document {
    fn text(&mut self, scope: Scope) -> Result<String, HostError>;

    /// All matches of `needle` inside `scope`, in document order.
    fn search(
        &mut self,
        scope: Scope,
        needle: &str,
        options: SearchOptions,
    ) -> Result<Vec<TextSpan>, HostError>;

    /// Replace the span's content and return the span now covering `text`.
    fn replace(&mut self, span: &TextSpan, text: &str) -> Result<TextSpan, HostError>;

    fn delete(&mut self, span: &TextSpan) -> Result<(), HostError>;

    fn set_highlight(
        &mut self,
        span: &TextSpan,
        highlight: Option<Highlight>,
    ) -> Result<(), HostError>;

    fn clear_highlights(&mut self, scope: Scope) -> Result<(), HostError>;

    /// Flush queued requests and wait for the host.
    fn sync(&mut self) -> Result<(), HostError>;
}

impl<D: Document + ?Sized> Document for &mut D {
    fn text(&mut self, scope: Scope) -> Result<String, HostError> {
        (**self).text(scope)
    }

    fn search(
        &mut self,
        scope: Scope,
        needle: &str,
        options: SearchOptions,
    ) -> Result<Vec<TextSpan>, HostError> {
        (**self).search(scope, needle, options)
    }

    fn replace(&mut self, span: &TextSpan, text: &str) -> Result<TextSpan, HostError> {
        (**self).replace(span, text)
    }

    fn delete(&mut self, span: &TextSpan) -> Result<(), HostError> {
        (**self).delete(span)
    }

    fn set_highlight(
        &mut self,
        span: &TextSpan,
        highlight: Option<Highlight>,
    ) -> Result<(), HostError> {
        (**self).set_highlight(span, highlight)
    }

    fn clear_highlights(&mut self, scope: Scope) -> Result<(), HostError> {
        (**self).clear_highlights(scope)
    }

    fn sync(&mut self) -> Result<(), HostError> {
        (**self).sync()
    }
}
