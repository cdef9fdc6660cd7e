use super::{Document, Highlight, Scope, SearchOptions};
use crate::error::HostError;
use crate::TextSpan;
use regex::RegexBuilder;
use std::ops::Range;

/// A document held in memory.
///
/// Reads (`text`, `search`) are refused while a mutation has not been synced,
/// which keeps callers honest about the request/response protocol a real
/// host imposes.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    text: String,
    selection: Option<Range<usize>>,
    highlights: Vec<(Range<usize>, Highlight)>,
    revision: u64,
    dirty: bool,
}

impl MemoryDocument {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Select a byte range, clamped to the text and widened to character
    /// boundaries.
    pub fn with_selection(mut self, range: Range<usize>) -> Self {
        let mut start = range.start.min(self.text.len());
        let mut end = range.end.clamp(start, self.text.len());
        while !self.text.is_char_boundary(start) {
            start -= 1;
        }
        while !self.text.is_char_boundary(end) {
            end += 1;
        }
        self.selection = Some(start..end);
        self
    }

    pub fn content(&self) -> &str {
        &self.text
    }

    pub fn into_content(self) -> String {
        self.text
    }

    pub fn selection(&self) -> Option<Range<usize>> {
        self.selection.clone()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Highlighted ranges in document order.
    pub fn highlights(&self) -> Vec<(Range<usize>, Highlight)> {
        let mut highlights = self.highlights.clone();
        highlights.sort_by_key(|(range, _)| range.start);
        highlights
    }

    /// Highlighted text fragments in document order.
    pub fn highlighted_text(&self) -> Vec<&str> {
        self.highlights()
            .into_iter()
            .map(|(range, _)| &self.text[range])
            .collect()
    }

    fn scope_range(&self, scope: Scope) -> Range<usize> {
        match scope {
            Scope::Whole => 0..self.text.len(),
            Scope::Selection => self.selection.clone().unwrap_or(0..0),
        }
    }

    fn ensure_synced(&self) -> Result<(), HostError> {
        if self.dirty {
            return Err(HostError::Unsynced);
        }
        Ok(())
    }

    fn check_span(&self, span: &TextSpan) -> Result<Range<usize>, HostError> {
        if span.revision != self.revision {
            return Err(HostError::StaleSpan {
                start: span.start,
                end: span.end,
                span_revision: span.revision,
                revision: self.revision,
            });
        }
        if span.start > span.end
            || span.end > self.text.len()
            || !self.text.is_char_boundary(span.start)
            || !self.text.is_char_boundary(span.end)
        {
            return Err(HostError::OutOfRange {
                start: span.start,
                end: span.end,
                len: self.text.len(),
            });
        }
        Ok(span.start..span.end)
    }

    fn edit(&mut self, range: Range<usize>, replacement: &str) -> Range<usize> {
        let removed = range.end - range.start;
        let inserted = replacement.len();
        let new_range = range.start..range.start + inserted;
        self.text.replace_range(range.clone(), replacement);

        let shift = |pos: usize| pos - removed + inserted;

        if let Some(selection) = self.selection.as_mut() {
            if range.end <= selection.start && range.start < selection.start {
                selection.start = shift(selection.start);
                selection.end = shift(selection.end);
            } else if range.start < selection.end || range.start == selection.start {
                selection.start = selection.start.min(range.start);
                selection.end = shift(selection.end.max(range.end));
            }
        }

        let mut highlights = Vec::with_capacity(self.highlights.len());
        for (hl, colour) in self.highlights.drain(..) {
            if hl == range {
                highlights.push((new_range.clone(), colour));
            } else if hl.end <= range.start {
                highlights.push((hl, colour));
            } else if hl.start >= range.end {
                highlights.push((shift(hl.start)..shift(hl.end), colour));
            }
        }
        self.highlights = highlights;

        self.revision += 1;
        self.dirty = true;
        new_range
    }

    /// Grow a deletion by one separating whitespace so no double gap is left.
    fn deletion_range(&self, range: Range<usize>) -> Range<usize> {
        let before = self.text[..range.start].chars().next_back();
        let after = self.text[range.end..].chars().next();
        let open_before = before.map_or(true, char::is_whitespace);

        match (before, after) {
            (_, Some(c)) if c.is_whitespace() && open_before => {
                range.start..range.end + c.len_utf8()
            }
            (Some(c), None) if c.is_whitespace() => range.start - c.len_utf8()..range.end,
            _ => range,
        }
    }
}

impl Document for MemoryDocument {
    fn text(&mut self, scope: Scope) -> Result<String, HostError> {
        self.ensure_synced()?;
        Ok(self.text[self.scope_range(scope)].to_string())
    }

    fn search(
        &mut self,
        scope: Scope,
        needle: &str,
        options: SearchOptions,
    ) -> Result<Vec<TextSpan>, HostError> {
        self.ensure_synced()?;

        let tokens: Vec<String> = needle.split_whitespace().map(regex::escape).collect();
        if tokens.is_empty() {
            return Ok(Vec::new());
        }
        let pattern = RegexBuilder::new(&tokens.join(r"\s+"))
            .case_insensitive(options.case_insensitive)
            .build()
            .map_err(|e| HostError::Unavailable(e.to_string()))?;

        let range = self.scope_range(scope);
        let haystack = &self.text[..range.end];
        let mut spans = Vec::new();
        let mut pos = range.start;

        while let Some(m) = pattern.find_at(haystack, pos) {
            // tokens are whitespace-delimited, so punctuation belongs to the token
            let bounded = !options.whole_token
                || (self.text[..m.start()]
                    .chars()
                    .next_back()
                    .map_or(true, char::is_whitespace)
                    && self.text[m.end()..]
                        .chars()
                        .next()
                        .map_or(true, char::is_whitespace));

            if bounded {
                spans.push(TextSpan {
                    start: m.start(),
                    end: m.end(),
                    revision: self.revision,
                });
                pos = m.end();
            } else {
                pos = m.start() + haystack[m.start()..].chars().next().map_or(1, char::len_utf8);
            }
        }

        Ok(spans)
    }

    fn replace(&mut self, span: &TextSpan, text: &str) -> Result<TextSpan, HostError> {
        let range = self.check_span(span)?;
        let new_range = self.edit(range, text);
        Ok(TextSpan {
            start: new_range.start,
            end: new_range.end,
            revision: self.revision,
        })
    }

    fn delete(&mut self, span: &TextSpan) -> Result<(), HostError> {
        let range = self.check_span(span)?;
        let range = self.deletion_range(range);
        self.edit(range, "");
        Ok(())
    }

    fn set_highlight(
        &mut self,
        span: &TextSpan,
        highlight: Option<Highlight>,
    ) -> Result<(), HostError> {
        let range = self.check_span(span)?;
        self.highlights
            .retain(|(hl, _)| hl.end <= range.start || hl.start >= range.end);
        if let Some(colour) = highlight {
            self.highlights.push((range, colour));
        }
        Ok(())
    }

    fn clear_highlights(&mut self, scope: Scope) -> Result<(), HostError> {
        let range = self.scope_range(scope);
        match scope {
            Scope::Whole => self.highlights.clear(),
            Scope::Selection => self
                .highlights
                .retain(|(hl, _)| hl.end <= range.start || hl.start >= range.end),
        }
        Ok(())
    }

    fn sync(&mut self) -> Result<(), HostError> {
        self.dirty = false;
        Ok(())
    }
}
