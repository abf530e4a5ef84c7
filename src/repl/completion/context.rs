//! Completion context detection
//!
//! This module classifies the cursor position in a pipe-delimited query into
//! the kind of token that is expected next. It is a heuristic classifier, not a
//! grammar: it looks at the text after the last pipe and at a handful of
//! keywords, and it never fails.
//!
//! Keyword detection is substring based. A value such as `"lookup by id"` in a
//! `where` clause will therefore look like a `by` clause; callers rely on this
//! behaviour, so it is kept.

use serde::Serialize;
use std::fmt;

use super::query::clamp_cursor;

/// What kind of completion is expected at the cursor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKind {
    /// Start of query, or after `join`
    TableName,
    /// Right after a pipe
    Operator,
    /// After `where`, `project`, `extend`, `by` or `on`
    ColumnName,
    /// Inside `summarize`, expecting an aggregation
    Function,
    /// A literal value; nothing to suggest
    Value,
    /// Could not tell
    #[default]
    Unknown,
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContextKind::TableName => "table_name",
            ContextKind::Operator => "operator",
            ContextKind::ColumnName => "column_name",
            ContextKind::Function => "function",
            ContextKind::Value => "value",
            ContextKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Parsed completion context for a cursor position
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Context {
    /// Expected token kind
    pub kind: ContextKind,
    /// Partial token being typed
    pub token: String,
    /// Byte offset where the partial token starts
    pub token_start: usize,
    /// Known tables referenced anywhere in the query, in document order
    pub referenced_tables: Vec<String>,
    /// First referenced table; columns are suggested from it
    pub current_table: Option<String>,
    /// Keyword preceding the cursor (e.g. "where", "summarize")
    pub after_keyword: Option<String>,
}

/// Keywords after which column names are expected. Order decides which one is
/// reported when several occur in the same segment.
const COLUMN_KEYWORDS: &[&str] = &["where", "project", "extend", "by", "on"];

/// Text that may directly precede a table name
const TABLE_LEADERS: &[&str] = &["|", "| ", "union ", "join ", "join ("];

/// Identifier characters for partial tokens
fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// Parse the completion context at `cursor` in `text`.
///
/// `tables` is the list of known table names; it is only used to find the
/// tables the query references.
pub fn parse_context(text: &str, cursor: usize, tables: &[String]) -> Context {
    let cursor = clamp_cursor(text, cursor);
    let before = &text[..cursor];

    let (token, token_start) = current_token(before);
    let referenced_tables = referenced_tables(text, tables);
    let current_table = referenced_tables.first().cloned();
    let (kind, after_keyword) = classify(before);

    Context {
        kind,
        token: token.to_string(),
        token_start,
        referenced_tables,
        current_table,
        after_keyword,
    }
}

/// Maximal trailing run of identifier characters and its start offset
fn current_token(before: &str) -> (&str, usize) {
    let start = before
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_ident_char(*c))
        .last()
        .map(|(i, _)| i)
        .unwrap_or(before.len());
    (&before[start..], start)
}

/// Known tables referenced by `query`, ordered by first occurrence.
///
/// A table counts as referenced when the query starts with it or when it
/// follows a pipe, `union ` or `join `. Matching is case-insensitive.
pub fn referenced_tables(query: &str, tables: &[String]) -> Vec<String> {
    let lower = query.to_lowercase();
    let mut found: Vec<(usize, &String)> = Vec::new();

    for table in tables {
        if table.is_empty() || found.iter().any(|(_, t)| *t == table) {
            continue;
        }
        let name = table.to_lowercase();

        let position = if lower.starts_with(&name) {
            Some(0)
        } else {
            TABLE_LEADERS
                .iter()
                .filter_map(|leader| {
                    lower
                        .find(&format!("{leader}{name}"))
                        .map(|i| i + leader.len())
                })
                .min()
        };

        if let Some(position) = position {
            found.push((position, table));
        }
    }

    // Stable: ties keep known-table order
    found.sort_by_key(|(position, _)| *position);
    found.into_iter().map(|(_, t)| t.clone()).collect()
}

fn classify(before: &str) -> (ContextKind, Option<String>) {
    let trimmed = before.trim();

    if trimmed.is_empty() {
        return (ContextKind::TableName, None);
    }

    if trimmed.ends_with('|') {
        return (ContextKind::Operator, None);
    }

    if let Some(pipe) = before.rfind('|') {
        let segment = before[pipe + 1..].trim_start();
        let lower = segment.to_lowercase();

        // Still typing the operator itself
        if !segment.contains(char::is_whitespace) {
            return (ContextKind::Operator, None);
        }

        if let Some(keyword) = COLUMN_KEYWORDS
            .iter()
            .find(|kw| lower.contains(&format!("{kw} ")))
        {
            return (ContextKind::ColumnName, Some(keyword.to_string()));
        }

        if lower.contains("summarize ") {
            return (ContextKind::Function, Some("summarize".to_string()));
        }

        if lower.ends_with("join ") || lower.ends_with("union ") {
            return (ContextKind::TableName, None);
        }

        return (ContextKind::Unknown, None);
    }

    if !trimmed.contains(char::is_whitespace) {
        return (ContextKind::TableName, None);
    }

    (ContextKind::Unknown, None)
}
