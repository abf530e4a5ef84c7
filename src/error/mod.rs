//! Error handling module for kqlsh.
//!
//! This module provides the crate-wide error type and the narrower error kinds
//! raised by configuration loading, the table catalog and remote suggesters.
//!
//! Errors from the suggestion core are recovered locally; only the outer shell
//! (config files, catalog files, command-line handling) reports them.
//!
//! # Example
//!
//! ```rust
//! use kqlsh::error::{KqlshError, RemoteError, Result};
//!
//! fn suggest() -> Result<String> {
//!     Err(RemoteError::Timeout.into())
//! }
//!
//! assert!(matches!(suggest(), Err(KqlshError::Remote(RemoteError::Timeout))));
//! ```

pub mod kinds;

// Re-export commonly used types
pub use kinds::{CatalogError, ConfigError, KqlshError, RemoteError, Result};
