//! Output formatting for one-shot commands
//!
//! The `complete` and `context` subcommands print what the composer would
//! offer for a query. Output is either a table for people or JSON for scripts.

mod table;

pub use table::{TableFormatter, TableStyle};

use serde::Serialize;

use crate::error::Result;
use crate::repl::completion::{Context, Suggestion};

/// Output format for one-shot commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable tables
    #[default]
    Table,
    /// Single-line JSON
    Json,
    /// Indented JSON
    JsonPretty,
}

/// Context and suggestions for one cursor position
#[derive(Debug, Serialize)]
pub struct CompletionReport<'a> {
    pub context: &'a Context,
    pub suggestions: &'a [Suggestion],
}

/// Formatter for completion results
pub struct Formatter {
    format: OutputFormat,
    table: TableFormatter,
}

impl Formatter {
    /// Create a new formatter
    ///
    /// # Arguments
    /// * `format` - Output format
    /// * `use_colors` - Color table headers
    pub fn new(format: OutputFormat, use_colors: bool) -> Self {
        Self {
            format,
            table: TableFormatter::with_colors(use_colors),
        }
    }

    /// Selected output format
    pub fn output_format(&self) -> OutputFormat {
        self.format
    }

    /// Format the context and the ranked suggestions for a query
    pub fn format_completion(&self, context: &Context, suggestions: &[Suggestion]) -> Result<String> {
        let report = CompletionReport {
            context,
            suggestions,
        };

        match self.format {
            OutputFormat::Table => Ok(format!(
                "{}\n{}",
                self.table.format_context(context),
                self.table.format_suggestions(suggestions)
            )),
            OutputFormat::Json => Ok(serde_json::to_string(&report)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(&report)?),
        }
    }

    /// Format a parsed context on its own
    pub fn format_context(&self, context: &Context) -> Result<String> {
        match self.format {
            OutputFormat::Table => Ok(self.table.format_context(context)),
            OutputFormat::Json => Ok(serde_json::to_string(context)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(context)?),
        }
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(OutputFormat::Table, false)
    }
}
