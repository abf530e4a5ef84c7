//! Suggestion popup selection state
//!
//! A UI-agnostic model of the local suggestion popup: the list, the selected
//! row, and a scroll window of at most `max_visible` rows.

use std::ops::Range;

use super::engine::Suggestion;

/// Default number of rows the popup shows at once
pub const DEFAULT_VISIBLE_ROWS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionPopup {
    suggestions: Vec<Suggestion>,
    selected: usize,
    scroll_offset: usize,
    visible: bool,
    max_visible: usize,
}

impl Default for SuggestionPopup {
    fn default() -> Self {
        Self::new(DEFAULT_VISIBLE_ROWS)
    }
}

impl SuggestionPopup {
    /// Create a hidden popup showing up to `max_visible` rows (at least one)
    pub fn new(max_visible: usize) -> Self {
        Self {
            suggestions: Vec::new(),
            selected: 0,
            scroll_offset: 0,
            visible: false,
            max_visible: max_visible.max(1),
        }
    }

    /// Replace the list; selection and scroll go back to the top
    pub fn set_suggestions(&mut self, suggestions: Vec<Suggestion>) {
        self.visible = !suggestions.is_empty();
        self.suggestions = suggestions;
        self.selected = 0;
        self.scroll_offset = 0;
    }

    /// Move the selection down, wrapping to the first row
    pub fn next(&mut self) {
        if self.suggestions.is_empty() {
            return;
        }

        self.selected += 1;
        if self.selected >= self.suggestions.len() {
            self.selected = 0;
            self.scroll_offset = 0;
        } else if self.selected >= self.scroll_offset + self.max_visible {
            self.scroll_offset = self.selected + 1 - self.max_visible;
        }
    }

    /// Move the selection up, wrapping to the last row
    pub fn previous(&mut self) {
        if self.suggestions.is_empty() {
            return;
        }

        if self.selected == 0 {
            self.selected = self.suggestions.len() - 1;
            self.scroll_offset = self.suggestions.len().saturating_sub(self.max_visible);
        } else {
            self.selected -= 1;
            if self.selected < self.scroll_offset {
                self.scroll_offset = self.selected;
            }
        }
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&Suggestion> {
        if !self.visible {
            return None;
        }
        self.suggestions.get(self.selected)
    }

    /// Text of the selected row
    pub fn selected_text(&self) -> Option<&str> {
        self.selected().map(|s| s.text.as_str())
    }

    /// Text to splice into the query for row `index`
    pub fn accept(&self, index: usize) -> Option<String> {
        if !self.visible {
            return None;
        }
        self.suggestions.get(index).map(|s| s.text.clone())
    }

    /// Clear the list and hide the popup
    pub fn hide(&mut self) {
        self.suggestions.clear();
        self.selected = 0;
        self.scroll_offset = 0;
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn max_visible(&self) -> usize {
        self.max_visible
    }

    /// Index range of the rows currently in the scroll window
    pub fn visible_range(&self) -> Range<usize> {
        let end = (self.scroll_offset + self.max_visible).min(self.suggestions.len());
        self.scroll_offset.min(end)..end
    }

    /// Rows currently in the scroll window
    pub fn visible_suggestions(&self) -> &[Suggestion] {
        &self.suggestions[self.visible_range()]
    }
}
