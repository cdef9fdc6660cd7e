pub mod aligner;
pub mod grouper;

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Stable handle of a non-keep block within one `DiffResult`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Ordinal(pub usize);

impl fmt::Display for Ordinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl FromStr for Ordinal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim_start_matches('#')
            .parse::<usize>()
            .map(Ordinal)
            .map_err(|_| format!("Invalid edit number: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Keep { text: String },
    Add { text: String },
    Delete { text: String },
    Replace { old: String, new: String },
}

impl BlockKind {
    pub fn label(&self) -> &'static str {
        match self {
            BlockKind::Keep { .. } => "keep",
            BlockKind::Add { .. } => "addition",
            BlockKind::Delete { .. } => "removal",
            BlockKind::Replace { .. } => "fix",
        }
    }
}

/// Lifecycle of a non-keep block. Transitions only leave `Open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockStatus {
    Open,
    /// The document change was applied or attempted. Excluded from
    /// occurrence counting from now on.
    Applied,
    /// Rejected by the user. The text is still in the document, so the block
    /// keeps counting toward occurrence numbering.
    Dismissed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBlock {
    kind: BlockKind,
    ordinal: Option<Ordinal>,
    status: BlockStatus,
}

impl EditBlock {
    pub(crate) fn keep(text: String) -> Self {
        Self {
            kind: BlockKind::Keep { text },
            ordinal: None,
            status: BlockStatus::Open,
        }
    }

    pub(crate) fn change(kind: BlockKind, ordinal: Ordinal) -> Self {
        Self {
            kind,
            ordinal: Some(ordinal),
            status: BlockStatus::Open,
        }
    }

    pub fn kind(&self) -> &BlockKind {
        &self.kind
    }

    pub fn ordinal(&self) -> Option<Ordinal> {
        self.ordinal
    }

    pub fn status(&self) -> BlockStatus {
        self.status
    }

    pub fn is_keep(&self) -> bool {
        matches!(self.kind, BlockKind::Keep { .. })
    }

    pub fn is_open(&self) -> bool {
        !self.is_keep() && self.status == BlockStatus::Open
    }

    pub fn is_consumed(&self) -> bool {
        self.status == BlockStatus::Applied
    }

    /// Text to look for in the document: the removed side of a `Delete` or
    /// `Replace`. Additions have no anchor and keeps are never touched.
    pub fn search_text(&self) -> Option<&str> {
        match &self.kind {
            BlockKind::Delete { text } => Some(text),
            BlockKind::Replace { old, .. } => Some(old),
            BlockKind::Keep { .. } | BlockKind::Add { .. } => None,
        }
    }

    /// This block's contribution to the original text.
    pub fn old_side(&self) -> Option<&str> {
        match &self.kind {
            BlockKind::Keep { text } | BlockKind::Delete { text } => Some(text),
            BlockKind::Replace { old, .. } => Some(old),
            BlockKind::Add { .. } => None,
        }
    }

    /// This block's contribution to the corrected text.
    pub fn new_side(&self) -> Option<&str> {
        match &self.kind {
            BlockKind::Keep { text } | BlockKind::Add { text } => Some(text),
            BlockKind::Replace { new, .. } => Some(new),
            BlockKind::Delete { .. } => None,
        }
    }
}

/// Grouped edit blocks of one correction pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    blocks: Vec<EditBlock>,
}

impl DiffResult {
    /// Align `original` against `corrected` word by word and group the result.
    pub fn compute(original: &str, corrected: &str) -> Self {
        let original = aligner::tokenize(original);
        let corrected = aligner::tokenize(corrected);
        let ops = aligner::align(&original, &corrected);
        Self {
            blocks: grouper::group(&ops),
        }
    }

    pub fn blocks(&self) -> &[EditBlock] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of non-keep blocks, whatever their status.
    pub fn error_count(&self) -> usize {
        self.blocks.iter().filter(|b| !b.is_keep()).count()
    }

    pub fn open_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_open()).count()
    }

    /// Position of the block carrying `ordinal` within `blocks()`.
    pub fn position(&self, ordinal: Ordinal) -> Option<usize> {
        self.blocks.iter().position(|b| b.ordinal == Some(ordinal))
    }

    pub fn get(&self, ordinal: Ordinal) -> Option<&EditBlock> {
        self.position(ordinal).map(|pos| &self.blocks[pos])
    }

    /// Mark an open block as applied. Returns false if the block is unknown
    /// or already left the open state.
    pub fn mark_applied(&mut self, ordinal: Ordinal) -> bool {
        self.transition(ordinal, BlockStatus::Applied)
    }

    pub fn mark_dismissed(&mut self, ordinal: Ordinal) -> bool {
        self.transition(ordinal, BlockStatus::Dismissed)
    }

    fn transition(&mut self, ordinal: Ordinal, to: BlockStatus) -> bool {
        match self.position(ordinal) {
            Some(pos) if self.blocks[pos].is_open() => {
                self.blocks[pos].status = to;
                true
            }
            _ => false,
        }
    }

    /// Rebuild the original text from keep and removed sides.
    pub fn original_text(&self) -> String {
        self.blocks
            .iter()
            .filter_map(EditBlock::old_side)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Rebuild the corrected text from keep and added sides.
    pub fn corrected_text(&self) -> String {
        self.blocks
            .iter()
            .filter_map(EditBlock::new_side)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Review cards for every block that is still open.
    pub fn cards(&self, context_before: usize, context_after: usize) -> Vec<ReviewCard> {
        let mut cards = Vec::new();

        for (index, block) in self.blocks.iter().enumerate() {
            let Some(ordinal) = block.ordinal else {
                continue;
            };
            if !block.is_open() {
                continue;
            }

            let before = index
                .checked_sub(1)
                .and_then(|i| self.keep_text(i))
                .map(|text| {
                    let words: Vec<&str> = text.split(' ').collect();
                    words[words.len().saturating_sub(context_before)..].join(" ")
                })
                .unwrap_or_default();
            let after = self
                .keep_text(index + 1)
                .map(|text| {
                    text.split(' ')
                        .take(context_after)
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .unwrap_or_default();

            cards.push(ReviewCard {
                ordinal,
                kind: block.kind.label(),
                old: block.search_text().unwrap_or_default().to_string(),
                new: match &block.kind {
                    BlockKind::Delete { .. } => String::new(),
                    _ => block.new_side().unwrap_or_default().to_string(),
                },
                before,
                after,
            });
        }

        cards
    }

    fn keep_text(&self, index: usize) -> Option<&str> {
        match self.blocks.get(index).map(EditBlock::kind) {
            Some(BlockKind::Keep { text }) => Some(text),
            _ => None,
        }
    }
}

/// One reviewable suggestion with a little surrounding context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewCard {
    pub ordinal: Ordinal,
    pub kind: &'static str,
    pub old: String,
    pub new: String,
    pub before: String,
    pub after: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error_ordinals(diff: &DiffResult) -> Vec<usize> {
        diff.blocks()
            .iter()
            .filter_map(|b| b.ordinal().map(|o| o.0))
            .collect()
    }

    #[test]
    fn test_identical_text_is_single_keep() {
        let diff = DiffResult::compute("the  cat sat", "the cat\nsat");
        assert_eq!(diff.blocks().len(), 1);
        assert!(diff.blocks()[0].is_keep());
        assert_eq!(diff.error_count(), 0);
    }

    #[test]
    fn test_reconstructs_both_sides() {
        let original = "Ban quan Nui Ba Den mo cua tu 6 gio";
        let corrected = "Ban Quản lý Núi Bà Đen mở cửa từ 6 giờ";
        let diff = DiffResult::compute(original, corrected);
        assert_eq!(diff.original_text(), original);
        assert_eq!(diff.corrected_text(), corrected);
    }

    #[test]
    fn test_all_tokens_differ() {
        let diff = DiffResult::compute("Toi di hoc", "Tôi đi học");
        assert!(diff.blocks().iter().all(|b| !b.is_keep()));
        assert_eq!(
            diff.blocks()[0].kind(),
            &BlockKind::Replace {
                old: "Toi di hoc".to_string(),
                new: "Tôi đi học".to_string()
            }
        );
    }

    #[test]
    fn test_missing_word_with_casing_fix() {
        let diff = DiffResult::compute("Ban quan Nui Ba Den", "Ban Quản lý Núi Bà Đen");
        let blocks = diff.blocks();
        assert_eq!(
            blocks[0].kind(),
            &BlockKind::Keep {
                text: "Ban".to_string()
            }
        );
        assert_eq!(
            blocks[1].kind(),
            &BlockKind::Replace {
                old: "quan Nui Ba Den".to_string(),
                new: "Quản lý Núi Bà Đen".to_string()
            }
        );
        assert_eq!(error_ordinals(&diff), vec![0]);
    }

    #[test]
    fn test_empty_original_is_one_addition() {
        let diff = DiffResult::compute("", "brand new text");
        assert_eq!(diff.blocks().len(), 1);
        assert_eq!(
            diff.blocks()[0].kind(),
            &BlockKind::Add {
                text: "brand new text".to_string()
            }
        );
        assert_eq!(diff.blocks()[0].search_text(), None);
    }

    #[test]
    fn test_ordinals_are_contiguous() {
        let diff = DiffResult::compute("a b c d e f g", "a x c d y f z");
        let ordinals = error_ordinals(&diff);
        assert_eq!(ordinals, (0..ordinals.len()).collect::<Vec<_>>());
        assert_eq!(ordinals.len(), 3);
    }

    #[test]
    fn test_status_only_leaves_open() {
        let mut diff = DiffResult::compute("a b c", "a x c");
        assert!(diff.mark_applied(Ordinal(0)));
        assert!(!diff.mark_dismissed(Ordinal(0)));
        assert!(!diff.mark_applied(Ordinal(0)));
        assert!(!diff.mark_applied(Ordinal(7)));
        assert_eq!(diff.get(Ordinal(0)).unwrap().status(), BlockStatus::Applied);
        assert!(diff.get(Ordinal(0)).unwrap().is_consumed());
        assert_eq!(diff.open_count(), 0);
    }

    #[test]
    fn test_cards_carry_context() {
        let diff = DiffResult::compute(
            "one two three four five six seven eigth nine ten eleven",
            "one two three four five six seven eight nine ten eleven",
        );
        let cards = diff.cards(5, 3);
        assert_eq!(cards.len(), 1);
        let card = &cards[0];
        assert_eq!(card.kind, "fix");
        assert_eq!(card.old, "eigth");
        assert_eq!(card.new, "eight");
        assert_eq!(card.before, "three four five six seven");
        assert_eq!(card.after, "nine ten eleven");
    }

    #[test]
    fn test_cards_skip_consumed_and_dismissed() {
        let mut diff = DiffResult::compute("a b c d e", "a x c y e extra");
        assert_eq!(diff.cards(5, 3).len(), 3);
        diff.mark_applied(Ordinal(0));
        diff.mark_dismissed(Ordinal(2));
        let cards = diff.cards(5, 3);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].ordinal, Ordinal(1));
    }

    #[test]
    fn test_removal_card_has_empty_new_side() {
        let diff = DiffResult::compute("keep the the word", "keep the word");
        let cards = diff.cards(5, 3);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].kind, "removal");
        assert_eq!(cards[0].old, "the");
        assert!(cards[0].new.is_empty());
    }

    #[test]
    fn test_ordinal_parsing() {
        assert_eq!("3".parse::<Ordinal>(), Ok(Ordinal(3)));
        assert_eq!("#12".parse::<Ordinal>(), Ok(Ordinal(12)));
        assert!("x".parse::<Ordinal>().is_err());
    }
}
