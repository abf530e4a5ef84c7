//! Remote (AI-assisted) query suggestions
//!
//! A remote suggester receives the whole query, the known table names and the
//! cached schemas of the tables the query references, and returns one proposed
//! query. Calls are slow and may fail; the orchestrator tags each request and
//! ignores results that are no longer current.

mod chat;

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::catalog::Column;
use crate::error::RemoteError;
use crate::repl::completion::GenerationTag;

pub use chat::{ChatCompletionSuggester, ChatMessage};

/// Everything a remote suggester needs for one call
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRequest {
    /// Generation tag the result must be delivered with
    pub tag: GenerationTag,
    /// Full query text
    pub query: String,
    /// Known table names of the data source
    pub tables: Vec<String>,
    /// Cached schemas of the tables the query references
    pub schemas: BTreeMap<String, Vec<Column>>,
}

/// Produces a full-query suggestion for a partial query
#[async_trait]
pub trait RemoteSuggester: Send + Sync {
    /// Suggest a completed or improved query.
    ///
    /// Callers run this under their own deadline and cancellation signal; an
    /// implementation only has to be cancel-safe (dropping the future aborts it).
    async fn suggest(&self, request: &RemoteRequest) -> std::result::Result<String, RemoteError>;
}

const SYSTEM_PROMPT: &str = "You are a KQL (Kusto Query Language) expert assistant for Azure Log Analytics.
Your task is to complete or suggest KQL queries based on partial input.

Guidelines:
- Complete the query in a syntactically correct way
- Keep suggestions concise and relevant
- If the query looks complete, suggest improvements or variations
- Only use columns that exist in the provided schemas
- Focus on practical, commonly-used query patterns
- Only output the query suggestion, no explanations";

/// Build the system prompt for a request, listing tables and referenced schemas
pub fn system_prompt(request: &RemoteRequest) -> String {
    let mut prompt = String::from(SYSTEM_PROMPT);

    if !request.tables.is_empty() {
        prompt.push_str("\n\nAvailable tables in this workspace: ");
        prompt.push_str(&request.tables.join(", "));
    }

    if !request.schemas.is_empty() {
        prompt.push_str("\n\nSchemas of the tables referenced by the query:");
        for (table, columns) in &request.schemas {
            let columns = columns
                .iter()
                .map(|c| format!("{} ({})", c.name, c.column_type))
                .collect::<Vec<_>>()
                .join(", ");
            prompt.push_str(&format!("\n- {table}: {columns}"));
        }
    }

    prompt
}

/// Build the user prompt for a request
pub fn user_prompt(request: &RemoteRequest) -> String {
    format!(
        "Complete or suggest a KQL query based on this input:\n{}",
        request.query
    )
}

/// Strip markdown code fences and surrounding blank lines from a model answer
pub fn clean_suggestion(raw: &str) -> String {
    let trimmed = raw.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };

    // Drop the info string (e.g. "kql") on the opening fence line. A fence
    // that opens and closes on one line has no info string.
    let body = match body.split_once('\n') {
        Some((_, rest)) => rest,
        None => body,
    };
    let body = body.trim_end();
    let body = body.strip_suffix("```").unwrap_or(body);
    body.trim().to_string()
}
