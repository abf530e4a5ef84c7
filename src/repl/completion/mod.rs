//! Suggestion system for the kqlsh composer
//!
//! This module provides context-aware autocomplete for pipe-delimited KQL
//! queries. Local suggestions are computed synchronously on every keystroke;
//! remote (AI) suggestions are requested after a debounce window and dropped
//! when a newer request has been issued in the meantime.
//!
//! # Architecture
//!
//! - **Context**: classifies what kind of token is expected at the cursor
//! - **Engine**: ranks tables, operators, columns and functions for a context
//! - **SchemaCache**: session-lifetime table to column mapping
//! - **Popup**: selection state of the local suggestion list
//! - **Orchestrator**: debounce and generation-tag state machine
//! - **Runtime**: tokio task that owns the orchestrator and runs its effects
//!
//! # Examples
//!
//! ```
//! use kqlsh::repl::completion::{ContextKind, SchemaCache, SuggestionEngine};
//!
//! let engine = SuggestionEngine::new(vec!["AzureActivity".to_string()], SchemaCache::new());
//! let (context, suggestions) = engine.complete("A", 1, 10);
//!
//! assert_eq!(context.kind, ContextKind::TableName);
//! assert_eq!(suggestions[0].text, "AzureActivity");
//! ```

mod context;
mod engine;
mod orchestrator;
mod popup;
mod query;
mod runtime;
mod schema_cache;
mod session;
pub mod vocabulary;

pub use context::{Context, ContextKind, parse_context, referenced_tables};
pub use engine::{
    SCORE_COMMON_BOOST, SCORE_EXACT, SCORE_PREFIX, Suggestion, SuggestionEngine, SuggestionKind,
};
pub use orchestrator::{Effect, Orchestrator, SuggestionEvent, SuggestionSettings, ghost_text};
pub use popup::{DEFAULT_VISIBLE_ROWS, SuggestionPopup};
pub use query::{QueryState, clamp_cursor};
pub use runtime::{
    Collaborators, SuggestionHandle, SuggestionService, SuggestionSnapshot, Timer, TokioTimer,
};
pub use schema_cache::SchemaCache;
pub use session::{GenerationTag, SuggestionSession};
