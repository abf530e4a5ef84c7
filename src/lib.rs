//! kqlsh library
//!
//! Context-aware autocomplete for pipe-delimited KQL queries, plus the
//! interactive composer built on top of it.
//!
//! # Modules
//!
//! - `catalog`: Table listing and schema fetching collaborators
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Configuration management
//! - `error`: Error types and handling
//! - `formatter`: Table and JSON output for one-shot commands
//! - `remote`: AI suggestion client
//! - `repl`: Interactive composer and the suggestion core (`repl::completion`)
//!
//! # Example
//!
//! ```
//! use kqlsh::catalog::{CatalogTable, Column, StaticCatalog};
//! use kqlsh::repl::completion::{ContextKind, SchemaCache, SuggestionEngine};
//!
//! let catalog = StaticCatalog::new([CatalogTable {
//!     name: "AzureActivity".to_string(),
//!     columns: vec![Column::new("OperationName", "string")],
//! }]);
//!
//! let mut schemas = SchemaCache::new();
//! schemas.set("AzureActivity", catalog.columns("AzureActivity").unwrap().to_vec());
//!
//! let engine = SuggestionEngine::new(catalog.table_names().to_vec(), schemas);
//! let (context, suggestions) = engine.complete("AzureActivity | where Op", 24, 10);
//!
//! assert_eq!(context.kind, ContextKind::ColumnName);
//! assert_eq!(suggestions[0].text, "OperationName");
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod formatter;
pub mod remote;
pub mod repl;

pub use config::Config;
pub use error::{KqlshError, Result};
pub use formatter::Formatter;
pub use repl::ReplEngine;
pub use repl::completion::{SuggestionEngine, SuggestionHandle, SuggestionService};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
pub fn version() -> &'static str {
    VERSION
}
