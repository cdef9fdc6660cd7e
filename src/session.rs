use crate::diff::{DiffResult, Ordinal, ReviewCard};
use crate::document::{Document, Scope};
use crate::error::{Error, Result};
use crate::patch::highlight::{self, HighlightOptions};
use crate::patch::{ApplyOutcome, BulkReport, Patcher};
use crate::provider::CorrectionProvider;
use crate::Config;
use serde::Serialize;

/// A user decision about the current correction pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Apply(Ordinal),
    Skip(Ordinal),
    ApplyAll,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied(ApplyOutcome),
    Skipped(bool),
    Bulk(BulkReport),
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub scope: Scope,
    pub edits: usize,
    pub highlighted: usize,
}

/// One live correction pass over a document.
///
/// A new `check` replaces the previous pass wholesale; `reset` discards it.
/// Blocks are only ever mutated through this type.
pub struct Session<D: Document> {
    document: D,
    scope: Scope,
    original: String,
    diff: Option<DiffResult>,
    patcher: Patcher,
    highlight: HighlightOptions,
    context_before: usize,
    context_after: usize,
}

impl<D: Document> Session<D> {
    pub fn new(document: D, config: &Config) -> Self {
        Self {
            document,
            scope: Scope::default(),
            original: String::new(),
            diff: None,
            patcher: Patcher::new(),
            highlight: HighlightOptions::from(config),
            context_before: config.context_before,
            context_after: config.context_after,
        }
    }

    /// Run a correction pass over `scope`.
    ///
    /// Nothing about the session changes unless the provider answers: a
    /// failed check leaves the previous pass (if any) in place.
    pub fn check<P>(&mut self, scope: Scope, provider: &P) -> Result<CheckReport>
    where
        P: CorrectionProvider + ?Sized,
    {
        let original = self.document.text(scope)?;
        if original.trim().is_empty() {
            return Err(Error::EmptyInput(scope));
        }

        let corrected = provider.correct(&original)?;
        let diff = DiffResult::compute(&original, &corrected);
        tracing::info!(%scope, edits = diff.error_count(), "correction pass ready");

        if self.diff.is_some() && self.scope != scope {
            // marks of the superseded pass may lie outside the new scope
            if let Err(e) = self.document.clear_highlights(self.scope) {
                tracing::warn!(error = %e, "could not clear highlights of previous pass");
            }
        }
        let highlighted = highlight::highlight(&mut self.document, scope, &diff, &self.highlight);
        let report = CheckReport {
            scope,
            edits: diff.error_count(),
            highlighted,
        };

        self.scope = scope;
        self.original = original;
        self.diff = Some(diff);
        Ok(report)
    }

    /// Apply one edit. Host failures are surfaced since the user asked for it.
    pub fn apply(&mut self, ordinal: Ordinal) -> Result<ApplyOutcome> {
        let Some(diff) = self.diff.as_mut() else {
            return Ok(ApplyOutcome::Ignored);
        };
        Ok(self
            .patcher
            .apply(&mut self.document, self.scope, diff, ordinal)?)
    }

    /// Dismiss a suggestion without touching the document.
    pub fn skip(&mut self, ordinal: Ordinal) -> bool {
        self.diff
            .as_mut()
            .is_some_and(|diff| diff.mark_dismissed(ordinal))
    }

    /// Apply every open fix and removal, then end the pass.
    pub fn apply_all(&mut self) -> BulkReport {
        let report = match self.diff.as_mut() {
            Some(diff) => self.patcher.apply_all(&mut self.document, self.scope, diff),
            None => BulkReport::default(),
        };
        self.reset();
        report
    }

    /// Discard the current pass and clear highlights. Cleanup failures are
    /// only logged.
    pub fn reset(&mut self) {
        self.original.clear();
        self.diff = None;

        let cleared = self
            .document
            .clear_highlights(Scope::Whole)
            .and_then(|_| self.document.sync());
        if let Err(e) = cleared {
            tracing::warn!(error = %e, "could not clear highlights on reset");
        }
    }

    pub fn dispatch(&mut self, command: Command) -> Result<CommandOutcome> {
        Ok(match command {
            Command::Apply(ordinal) => CommandOutcome::Applied(self.apply(ordinal)?),
            Command::Skip(ordinal) => CommandOutcome::Skipped(self.skip(ordinal)),
            Command::ApplyAll => CommandOutcome::Bulk(self.apply_all()),
            Command::Reset => {
                self.reset();
                CommandOutcome::Reset
            }
        })
    }

    /// Review cards of the still-open edits.
    pub fn cards(&self) -> Vec<ReviewCard> {
        self.diff
            .as_ref()
            .map(|diff| diff.cards(self.context_before, self.context_after))
            .unwrap_or_default()
    }

    /// Edits found by the current pass, applied or not.
    pub fn error_count(&self) -> usize {
        self.diff.as_ref().map_or(0, DiffResult::error_count)
    }

    pub fn open_count(&self) -> usize {
        self.diff.as_ref().map_or(0, DiffResult::open_count)
    }

    pub fn diff(&self) -> Option<&DiffResult> {
        self.diff.as_ref()
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn original_text(&self) -> &str {
        &self.original
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn into_document(self) -> D {
        self.document
    }
}
