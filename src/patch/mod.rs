pub mod highlight;
pub mod locator;

use crate::diff::{BlockKind, DiffResult, Ordinal};
use crate::document::{Document, Scope};
use crate::error::HostError;
use locator::{Locator, OccurrenceLocator};
use serde::Serialize;

/// What happened when a single edit was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyOutcome {
    /// The document was changed and the block is now applied.
    Applied,
    /// The occurrence could not be found any more (the document was edited
    /// by someone else). Nothing changed but the block is applied anyway.
    NotFound,
    /// Additions have no anchor in the document and are left to the user.
    NoAnchor,
    /// Unknown ordinal, or the block already left the open state.
    Ignored,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BulkReport {
    pub applied: usize,
    pub not_found: usize,
    pub failed: usize,
}

/// Applies edit blocks to a live document.
#[derive(Debug, Clone, Default)]
pub struct Patcher<L = OccurrenceLocator> {
    locator: L,
}

impl Patcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<L: Locator> Patcher<L> {
    pub fn with_locator(locator: L) -> Self {
        Self { locator }
    }

    /// Apply one block. A host failure before the mutation is issued leaves
    /// the block open so it can be retried; once the mutation has been issued
    /// the block counts as applied even if the following sync fails.
    pub fn apply<D: Document + ?Sized>(
        &self,
        document: &mut D,
        scope: Scope,
        diff: &mut DiffResult,
        ordinal: Ordinal,
    ) -> Result<ApplyOutcome, HostError> {
        let Some(index) = diff.position(ordinal) else {
            return Ok(ApplyOutcome::Ignored);
        };
        let block = &diff.blocks()[index];
        if !block.is_open() {
            return Ok(ApplyOutcome::Ignored);
        }
        let kind = block.kind().clone();
        if matches!(kind, BlockKind::Add { .. } | BlockKind::Keep { .. }) {
            return Ok(ApplyOutcome::NoAnchor);
        }

        let Some(span) = self.locator.locate(document, scope, diff, index)? else {
            tracing::warn!(%ordinal, "occurrence not found, skipping edit");
            diff.mark_applied(ordinal);
            return Ok(ApplyOutcome::NotFound);
        };

        match &kind {
            BlockKind::Replace { new, .. } => {
                let replaced = document.replace(&span, new)?;
                diff.mark_applied(ordinal);
                if let Err(e) = document.set_highlight(&replaced, None) {
                    tracing::warn!(%ordinal, error = %e, "could not clear highlight of applied edit");
                }
            }
            BlockKind::Delete { .. } => {
                document.delete(&span)?;
                diff.mark_applied(ordinal);
            }
            BlockKind::Keep { .. } | BlockKind::Add { .. } => {}
        }
        document.sync()?;

        tracing::info!(%ordinal, start = span.start, len = span.len(), "applied edit");
        Ok(ApplyOutcome::Applied)
    }

    /// Apply every open fix and removal, last ordinal first. A failing block
    /// is logged and the sweep continues.
    pub fn apply_all<D: Document + ?Sized>(
        &self,
        document: &mut D,
        scope: Scope,
        diff: &mut DiffResult,
    ) -> BulkReport {
        let mut ordinals: Vec<Ordinal> = diff
            .blocks()
            .iter()
            .filter(|b| b.is_open() && b.search_text().is_some())
            .filter_map(|b| b.ordinal())
            .collect();
        ordinals.sort_unstable_by(|a, b| b.cmp(a));

        let mut report = BulkReport::default();
        for ordinal in ordinals {
            match self.apply(document, scope, diff, ordinal) {
                Ok(ApplyOutcome::Applied) => report.applied += 1,
                Ok(ApplyOutcome::NotFound) => report.not_found += 1,
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(%ordinal, error = %e, "edit failed during bulk apply");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            applied = report.applied,
            not_found = report.not_found,
            failed = report.failed,
            "bulk apply finished"
        );
        report
    }
}
