//! Query buffer state

use serde::Serialize;

/// Clamp `cursor` into `[0, text.len()]`, snapping down to a char boundary
pub fn clamp_cursor(text: &str, cursor: usize) -> usize {
    let mut cursor = cursor.min(text.len());
    while !text.is_char_boundary(cursor) {
        cursor -= 1;
    }
    cursor
}

/// Full text buffer and cursor offset (in bytes)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryState {
    text: String,
    cursor: usize,
}

impl QueryState {
    /// Create a query state; the cursor is clamped into range
    pub fn new(text: impl Into<String>, cursor: usize) -> Self {
        let text = text.into();
        let cursor = clamp_cursor(&text, cursor);
        Self { text, cursor }
    }

    /// Create a query state with the cursor at the end of `text`
    pub fn at_end(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.len();
        Self { text, cursor }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Text before the cursor
    pub fn before_cursor(&self) -> &str {
        &self.text[..self.cursor]
    }

    /// Text after the cursor
    pub fn after_cursor(&self) -> &str {
        &self.text[self.cursor..]
    }

    /// Whether the buffer holds only whitespace
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Replace `[token_start, cursor)` with `replacement`.
    ///
    /// Text after the cursor is left untouched and the cursor ends up right
    /// after the inserted text.
    pub fn splice(&self, token_start: usize, replacement: &str) -> Self {
        let start = clamp_cursor(&self.text, token_start.min(self.cursor));
        let mut text = String::with_capacity(self.text.len() + replacement.len());
        text.push_str(&self.text[..start]);
        text.push_str(replacement);
        let cursor = text.len();
        text.push_str(self.after_cursor());
        Self { text, cursor }
    }
}
