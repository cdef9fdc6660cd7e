use crate::config::Config;
use crate::diff::DiffResult;
use crate::document::{Document, Highlight, Scope, SearchOptions};
use std::collections::{BTreeSet, HashMap};
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightOptions {
    pub max_words: usize,
    pub min_chars: usize,
    pub colour: Highlight,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            max_words: 50,
            min_chars: 2,
            colour: Highlight::Yellow,
        }
    }
}

impl From<&Config> for HighlightOptions {
    fn from(config: &Config) -> Self {
        Self {
            max_words: config.max_highlight_words,
            min_chars: config.min_highlight_chars,
            colour: config.highlight,
        }
    }
}

/// A text to search for and which of its occurrences are errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightTarget {
    pub text: String,
    pub occurrences: BTreeSet<usize>,
}

/// Work out what to highlight before any edit is applied.
///
/// The original text is replayed block by block (additions are not part of
/// it). Every block's old side counts as one occurrence of that text; the
/// occurrences belonging to fixes and removals are the errors. Targets come
/// out in order of first appearance, capped at `max_words`, and texts shorter
/// than `min_chars` are dropped unless their first occurrence is an error.
pub fn plan(diff: &DiffResult, options: &HighlightOptions) -> Vec<HighlightTarget> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    let mut errors: HashMap<&str, BTreeSet<usize>> = HashMap::new();

    for block in diff.blocks() {
        let Some(text) = block.old_side() else {
            continue;
        };
        let seen = counts.entry(text).or_insert_with(|| {
            order.push(text);
            0
        });
        if block.search_text().is_some() {
            errors.entry(text).or_default().insert(*seen);
        }
        *seen += 1;
    }

    order
        .into_iter()
        .filter_map(|text| errors.remove(text).map(|occurrences| (text, occurrences)))
        .take(options.max_words)
        .filter(|(text, occurrences)| {
            text.graphemes(true).count() >= options.min_chars || occurrences.contains(&0)
        })
        .map(|(text, occurrences)| HighlightTarget {
            text: text.to_string(),
            occurrences,
        })
        .collect()
}

/// Mark erroneous occurrences in the document. Best effort: a failing search
/// or highlight is logged and the pass moves on. Returns how many spans were
/// marked.
pub fn highlight<D: Document + ?Sized>(
    document: &mut D,
    scope: Scope,
    diff: &DiffResult,
    options: &HighlightOptions,
) -> usize {
    if let Err(e) = document.clear_highlights(scope) {
        tracing::warn!(error = %e, "could not clear old highlights");
    }

    let mut marked = 0;
    for target in plan(diff, options) {
        let spans = match document
            .search(scope, &target.text, SearchOptions::default())
            .and_then(|spans| document.sync().map(|_| spans))
        {
            Ok(spans) => spans,
            Err(e) => {
                tracing::warn!(text = %target.text, error = %e, "highlight search failed");
                continue;
            }
        };

        for (i, span) in spans.iter().enumerate() {
            if !target.occurrences.contains(&i) {
                continue;
            }
            match document.set_highlight(span, Some(options.colour)) {
                Ok(()) => marked += 1,
                Err(e) => tracing::warn!(text = %target.text, error = %e, "highlight failed"),
            }
        }
    }

    if let Err(e) = document.sync() {
        tracing::warn!(error = %e, "highlight sync failed");
    }
    tracing::debug!(marked, "highlight pass done");
    marked
}
