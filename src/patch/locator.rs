use crate::diff::DiffResult;
use crate::document::{Document, Scope, SearchOptions};
use crate::error::HostError;
use crate::TextSpan;

/// Maps a block of a diff onto the live document.
pub trait Locator {
    /// Current document span of `diff.blocks()[index]`, or `None` when the
    /// block has no anchor or can no longer be found.
    fn locate<D: Document + ?Sized>(
        &self,
        document: &mut D,
        scope: Scope,
        diff: &DiffResult,
        index: usize,
    ) -> Result<Option<TextSpan>, HostError>;
}

/// Which occurrence of its search text the block at `index` is, counting only
/// earlier error blocks with the same search text that have not been applied.
///
/// Keep blocks never count, even when their text matches.
pub fn occurrence_index(diff: &DiffResult, index: usize) -> Option<usize> {
    let blocks = diff.blocks();
    let needle = blocks.get(index)?.search_text()?;

    Some(
        blocks[..index]
            .iter()
            .filter(|b| !b.is_consumed() && b.search_text() == Some(needle))
            .count(),
    )
}

/// Finds a block by counting occurrences of its text.
#[derive(Debug, Clone, Copy, Default)]
pub struct OccurrenceLocator;

impl Locator for OccurrenceLocator {
    fn locate<D: Document + ?Sized>(
        &self,
        document: &mut D,
        scope: Scope,
        diff: &DiffResult,
        index: usize,
    ) -> Result<Option<TextSpan>, HostError> {
        let Some(occurrence) = occurrence_index(diff, index) else {
            return Ok(None);
        };
        let Some(needle) = diff.blocks()[index].search_text() else {
            return Ok(None);
        };

        let spans = document.search(scope, needle, SearchOptions::default())?;
        document.sync()?;

        tracing::debug!(
            needle,
            occurrence,
            found = spans.len(),
            "located occurrence"
        );
        Ok(spans.get(occurrence).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::Ordinal;
    use crate::document::memory::MemoryDocument;

    #[test]
    fn test_occurrence_counts_only_error_blocks() {
        let diff = DiffResult::compute("teh cat teh dog teh", "the cat the dog the");
        let indices: Vec<_> = (0..diff.blocks().len())
            .map(|i| occurrence_index(&diff, i))
            .collect();
        assert_eq!(indices, vec![Some(0), None, Some(1), None, Some(2)]);
    }

    #[test]
    fn test_applied_blocks_stop_counting() {
        let mut diff = DiffResult::compute("teh cat teh dog teh", "the cat the dog the");
        diff.mark_applied(Ordinal(0));
        assert_eq!(occurrence_index(&diff, 2), Some(0));
        assert_eq!(occurrence_index(&diff, 4), Some(1));
    }

    #[test]
    fn test_dismissed_blocks_keep_counting() {
        let mut diff = DiffResult::compute("teh cat teh", "the cat the");
        diff.mark_dismissed(Ordinal(0));
        assert_eq!(occurrence_index(&diff, 2), Some(1));
    }

    #[test]
    fn test_additions_have_no_occurrence() {
        let diff = DiffResult::compute("", "hello");
        assert_eq!(occurrence_index(&diff, 0), None);
        assert_eq!(occurrence_index(&diff, 9), None);
    }

    #[test]
    fn test_occurrence_is_below_original_count() {
        let original = "a b a b a c b";
        let diff = DiffResult::compute(original, "a x a y a c z");
        for (i, block) in diff.blocks().iter().enumerate() {
            if let (Some(n), Some(text)) = (occurrence_index(&diff, i), block.search_text()) {
                let total = original.split_whitespace().filter(|t| *t == text).count();
                assert!(n < total);
            }
        }
    }

    #[test]
    fn test_locate_picks_matching_occurrence() {
        let diff = DiffResult::compute("teh cat teh dog", "the cat the dog");
        let mut doc = MemoryDocument::new("teh cat teh dog");
        let span = OccurrenceLocator
            .locate(&mut doc, Scope::Whole, &diff, 2)
            .unwrap()
            .unwrap();
        assert_eq!(span.start, 8);
        assert_eq!(OccurrenceLocator.locate(&mut doc, Scope::Whole, &diff, 1).unwrap(), None);
    }
}
