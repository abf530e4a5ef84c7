//! Table formatting for suggestion lists using tabled

use tabled::{
    Table,
    builder::Builder,
    settings::{Alignment, Color, Modify, Style, object::Columns, object::Rows, width::Width},
};

use crate::repl::completion::{Context, Suggestion};

/// Maximum width of the description column (characters)
const DEFAULT_MAX_COLUMN_WIDTH: usize = 48;

/// Table formatter for suggestions and contexts
pub struct TableFormatter {
    max_column_width: usize,
    style: TableStyle,
    use_colors: bool,
}

/// Available table styles
#[derive(Debug, Clone, Copy)]
pub enum TableStyle {
    Modern,
    Ascii,
    Rounded,
    Markdown,
    Psql,
}

impl TableFormatter {
    /// Create a table formatter with default settings
    pub fn new() -> Self {
        Self {
            max_column_width: DEFAULT_MAX_COLUMN_WIDTH,
            style: TableStyle::Modern,
            use_colors: false,
        }
    }

    /// Create a table formatter with colored headers
    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors,
            ..Self::new()
        }
    }

    /// Set the table style
    pub fn with_style(mut self, style: TableStyle) -> Self {
        self.style = style;
        self
    }

    /// Set maximum column width
    pub fn with_max_column_width(mut self, width: usize) -> Self {
        self.max_column_width = width;
        self
    }

    /// Format ranked suggestions as `Text | Kind | Score | Description`
    pub fn format_suggestions(&self, suggestions: &[Suggestion]) -> String {
        if suggestions.is_empty() {
            return "(no suggestions)".to_string();
        }

        let mut builder = Builder::default();
        builder.push_record(["Text", "Kind", "Score", "Description"]);
        for suggestion in suggestions {
            builder.push_record([
                suggestion.text.clone(),
                suggestion.kind.to_string(),
                suggestion.score.to_string(),
                suggestion.description.clone(),
            ]);
        }

        let mut table = builder.build();
        table.with(Modify::new(Columns::new(2..=2)).with(Alignment::right()));
        table.with(Modify::new(Columns::new(3..=3)).with(Width::wrap(self.max_column_width)));
        self.finish(table)
    }

    /// Format a parsed context as a two-column field/value table
    pub fn format_context(&self, context: &Context) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        builder.push_record(["kind".to_string(), context.kind.to_string()]);
        builder.push_record(["token".to_string(), format!("{:?}", context.token)]);
        builder.push_record(["token_start".to_string(), context.token_start.to_string()]);
        builder.push_record([
            "current_table".to_string(),
            context.current_table.clone().unwrap_or_else(|| "-".to_string()),
        ]);
        builder.push_record([
            "referenced_tables".to_string(),
            if context.referenced_tables.is_empty() {
                "-".to_string()
            } else {
                context.referenced_tables.join(", ")
            },
        ]);
        builder.push_record([
            "after_keyword".to_string(),
            context.after_keyword.clone().unwrap_or_else(|| "-".to_string()),
        ]);

        let mut table = builder.build();
        table.with(Modify::new(Columns::new(1..=1)).with(Width::wrap(self.max_column_width)));
        self.finish(table)
    }

    /// Apply style and header formatting
    fn finish(&self, mut table: Table) -> String {
        match self.style {
            TableStyle::Modern => table.with(Style::modern()),
            TableStyle::Ascii => table.with(Style::ascii()),
            TableStyle::Rounded => table.with(Style::rounded()),
            TableStyle::Markdown => table.with(Style::markdown()),
            TableStyle::Psql => table.with(Style::psql()),
        };

        table.with(Modify::new(Rows::first()).with(Alignment::center()));

        if self.use_colors {
            table.modify(Rows::first(), Color::FG_CYAN | Color::BOLD);
        }

        table.to_string()
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}
