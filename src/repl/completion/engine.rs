//! Local suggestion engine - ranks candidates for a completion context
//!
//! Candidates come from the static vocabulary, the known table names and the
//! schema cache. Ranking is synchronous and does no I/O: a table whose schema is
//! not cached simply contributes no columns.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use super::context::{Context, ContextKind, parse_context};
use super::schema_cache::SchemaCache;
use super::vocabulary::{
    AGGREGATION_FUNCTIONS, COMPARISON_OPERATORS, OPERATORS, TIME_FUNCTIONS, is_common_column,
    is_common_function, is_common_operator,
};

/// Score for a case-insensitive prefix match
pub const SCORE_PREFIX: i32 = 100;
/// Score for a case-insensitive exact match
pub const SCORE_EXACT: i32 = 200;
/// Boost for curated common items
pub const SCORE_COMMON_BOOST: i32 = 50;

/// Category of a suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Table,
    Column,
    Keyword,
    Function,
    Operator,
}

impl fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SuggestionKind::Table => "table",
            SuggestionKind::Column => "column",
            SuggestionKind::Keyword => "keyword",
            SuggestionKind::Function => "function",
            SuggestionKind::Operator => "operator",
        };
        f.write_str(name)
    }
}

/// A ranked local suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    /// Text inserted in place of the partial token
    pub text: String,
    pub kind: SuggestionKind,
    /// Short description shown next to the text
    pub description: String,
    pub score: i32,
}

/// Local suggestion engine.
///
/// Holds the known tables and the schema cache. Both are shared behind `Arc`s,
/// so a clone is a cheap point-in-time snapshot.
#[derive(Debug, Clone, Default)]
pub struct SuggestionEngine {
    tables: Arc<Vec<String>>,
    schemas: SchemaCache,
}

impl SuggestionEngine {
    /// Create an engine over `tables` and `schemas`
    pub fn new(tables: Vec<String>, schemas: SchemaCache) -> Self {
        Self {
            tables: Arc::new(tables),
            schemas,
        }
    }

    /// Known table names
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    /// Replace the known table names
    pub fn set_tables(&mut self, tables: Vec<String>) {
        self.tables = Arc::new(tables);
    }

    pub fn schemas(&self) -> &SchemaCache {
        &self.schemas
    }

    pub fn schemas_mut(&mut self) -> &mut SchemaCache {
        &mut self.schemas
    }

    /// Parse the context at `cursor` against the known tables
    pub fn parse_context(&self, text: &str, cursor: usize) -> Context {
        parse_context(text, cursor, &self.tables)
    }

    /// Ranked suggestions for `context`.
    ///
    /// # Arguments
    /// * `context` - Parsed completion context
    /// * `limit` - Maximum number of suggestions; 0 means no limit
    pub fn suggestions(&self, context: &Context, limit: usize) -> Vec<Suggestion> {
        // 1. Score every candidate of the context's categories
        let mut suggestions = match context.kind {
            ContextKind::TableName => self.table_candidates(&context.token),
            ContextKind::Operator => operator_candidates(&context.token),
            ContextKind::ColumnName => {
                let mut list = self.column_candidates(context);
                list.extend(comparison_candidates(&context.token));
                list
            }
            ContextKind::Function => function_candidates(&context.token),
            ContextKind::Value => Vec::new(),
            ContextKind::Unknown => {
                let mut list = operator_candidates(&context.token);
                list.extend(self.column_candidates(context));
                list
            }
        };

        // 2. Highest score first; equal scores keep source order
        suggestions.sort_by(|a, b| b.score.cmp(&a.score));

        // 3. Nothing to insert for the word already typed
        suggestions.retain(|s| s.text != context.token);

        if limit > 0 {
            suggestions.truncate(limit);
        }
        suggestions
    }

    /// Parse and rank in one step
    pub fn complete(&self, text: &str, cursor: usize, limit: usize) -> (Context, Vec<Suggestion>) {
        let context = self.parse_context(text, cursor);
        let suggestions = self.suggestions(&context, limit);
        (context, suggestions)
    }

    fn table_candidates(&self, token: &str) -> Vec<Suggestion> {
        self.tables
            .iter()
            .filter_map(|table| {
                let score = score(table, token, false)?;
                Some(suggestion(table, SuggestionKind::Table, "Table", score))
            })
            .collect()
    }

    fn column_candidates(&self, context: &Context) -> Vec<Suggestion> {
        let Some(columns) = context
            .current_table
            .as_deref()
            .and_then(|table| self.schemas.get(table))
        else {
            return Vec::new();
        };

        columns
            .iter()
            .filter_map(|column| {
                let score = score(&column.name, &context.token, is_common_column(&column.name))?;
                Some(suggestion(
                    &column.name,
                    SuggestionKind::Column,
                    &column.column_type,
                    score,
                ))
            })
            .collect()
    }
}

fn operator_candidates(token: &str) -> Vec<Suggestion> {
    OPERATORS
        .iter()
        .filter_map(|op| {
            let score = score(op, token, is_common_operator(op))?;
            Some(suggestion(op, SuggestionKind::Operator, "Operator", score))
        })
        .collect()
}

fn comparison_candidates(token: &str) -> Vec<Suggestion> {
    COMPARISON_OPERATORS
        .iter()
        .filter_map(|op| {
            let score = score(op, token, false)?;
            let kind = if op.starts_with(|c: char| c.is_ascii_alphabetic()) {
                SuggestionKind::Keyword
            } else {
                SuggestionKind::Operator
            };
            Some(suggestion(op, kind, "Comparison", score))
        })
        .collect()
}

fn function_candidates(token: &str) -> Vec<Suggestion> {
    AGGREGATION_FUNCTIONS
        .iter()
        .chain(TIME_FUNCTIONS)
        .filter_map(|f| {
            let score = score(f, token, is_common_function(f))?;
            Some(suggestion(f, SuggestionKind::Function, "Function", score))
        })
        .collect()
}

/// Score `candidate` against the typed token; `None` when it does not match
fn score(candidate: &str, token: &str, common: bool) -> Option<i32> {
    let candidate = candidate.to_lowercase();
    let token = token.to_lowercase();

    if !candidate.starts_with(&token) {
        return None;
    }

    let mut score = if candidate == token {
        SCORE_EXACT
    } else {
        SCORE_PREFIX
    };
    if common {
        score += SCORE_COMMON_BOOST;
    }
    Some(score)
}

fn suggestion(text: &str, kind: SuggestionKind, description: &str, score: i32) -> Suggestion {
    Suggestion {
        text: text.to_string(),
        kind,
        description: description.to_string(),
        score,
    }
}
