//! Custom prompt implementation for kqlsh

use reedline::{Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus};
use std::borrow::Cow;

/// Prompt showing the active catalog and whether AI suggestions are on
pub struct KqlPrompt {
    /// Catalog (workspace) name
    catalog: String,
    /// Whether a remote suggester is configured
    ai_enabled: bool,
}

impl KqlPrompt {
    /// Create a new prompt
    ///
    /// # Arguments
    /// * `catalog` - Catalog name shown in the prompt
    /// * `ai_enabled` - Whether remote suggestions are available
    pub fn new(catalog: impl Into<String>, ai_enabled: bool) -> Self {
        Self {
            catalog: catalog.into(),
            ai_enabled,
        }
    }
}

impl Prompt for KqlPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        if self.ai_enabled {
            format!("{}> ", self.catalog).into()
        } else {
            format!("{} (local)> ", self.catalog).into()
        }
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        "".into()
    }

    fn render_prompt_indicator(&self, _prompt_mode: PromptEditMode) -> Cow<'_, str> {
        "".into()
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        "... ".into()
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };

        format!("({}reverse-search: {}) ", prefix, history_search.term).into()
    }
}
