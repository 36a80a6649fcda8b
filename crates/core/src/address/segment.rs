//! Whitespace normalization and comma segmentation
//!
//! The normalized text keeps a byte map back to the caller's input so every
//! diagnostic span points into the original string.

use postkit_domain::Span;

/// Input with whitespace runs collapsed and ends trimmed
#[derive(Debug, Clone)]
pub(crate) struct Normalized {
    text: String,
    /// Original start offset of each normalized byte
    starts: Vec<usize>,
    /// Original end offset of each normalized byte
    ends: Vec<usize>,
}

impl Normalized {
    pub(crate) fn new(input: &str) -> Self {
        let mut text = String::with_capacity(input.len());
        let mut starts = Vec::with_capacity(input.len());
        let mut ends = Vec::with_capacity(input.len());
        let mut pending_space: Option<(usize, usize)> = None;

        for (offset, ch) in input.char_indices() {
            if ch.is_whitespace() {
                if pending_space.is_none() {
                    pending_space = Some((offset, offset + ch.len_utf8()));
                }
                continue;
            }
            if let Some((start, end)) = pending_space.take() {
                if !text.is_empty() {
                    text.push(' ');
                    starts.push(start);
                    ends.push(end);
                }
            }
            text.push(ch);
            let char_end = offset + ch.len_utf8();
            for _ in 0..ch.len_utf8() {
                starts.push(offset);
                ends.push(char_end);
            }
        }

        Self { text, starts, ends }
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.text
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Map a normalized byte range back to the original input
    pub(crate) fn original_span(&self, start: usize, end: usize) -> Span {
        if start >= end || end > self.starts.len() {
            let at = self.starts.get(start).copied().unwrap_or_default();
            return Span::new(at, at);
        }
        Span::new(self.starts[start], self.ends[end - 1])
    }

    /// Comma separated, trimmed, non-empty segments
    pub(crate) fn segments(&self) -> Vec<Segment<'_>> {
        let mut segments = Vec::new();
        let mut offset = 0;
        for piece in self.text.split(',') {
            let leading = piece.len() - piece.trim_start().len();
            let trimmed = piece.trim();
            if !trimmed.is_empty() {
                segments.push(Segment { text: trimmed, start: offset + leading });
            }
            offset += piece.len() + 1;
        }
        segments
    }
}

/// One comma separated piece of the normalized input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Segment<'a> {
    pub text: &'a str,
    /// Offset into the normalized text
    pub start: usize,
}

impl<'a> Segment<'a> {
    pub(crate) fn end(&self) -> usize {
        self.start + self.text.len()
    }

    /// Space separated tokens with their normalized offsets
    pub(crate) fn tokens(&self) -> Vec<Token<'a>> {
        let mut tokens = Vec::new();
        let mut offset = self.start;
        for word in self.text.split(' ') {
            if !word.is_empty() {
                tokens.push(Token { text: word, start: offset });
            }
            offset += word.len() + 1;
        }
        tokens
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token<'a> {
    pub text: &'a str,
    pub start: usize,
}

impl Token<'_> {
    pub(crate) fn end(&self) -> usize {
        self.start + self.text.len()
    }
}
