use std::{fmt, io};

/// Crate-wide `Result` type using [`KqlshError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, KqlshError>;

/// Top-level error type for kqlsh operations.
///
/// Errors raised inside the suggestion core never reach the user as-is: the
/// orchestrator downgrades them to "no suggestion available". This type is
/// what the surrounding shell (config loading, catalog files, CLI) returns.
#[derive(Debug)]
pub enum KqlshError {
    /// Configuration errors.
    Config(ConfigError),

    /// Table catalog errors (listing tables, fetching schemas).
    Catalog(CatalogError),

    /// Remote suggestion errors.
    Remote(RemoteError),

    /// I/O errors.
    Io(io::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },

    /// Generic configuration error.
    Generic(String),
}

/// Errors raised by table listing and schema fetching collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// No data source is available yet.
    NotConnected,

    /// The requested table does not exist in the data source.
    UnknownTable(String),

    /// The fetch did not complete within its deadline.
    Timeout(String),

    /// Catalog file could not be parsed.
    InvalidCatalog(String),

    /// Fetch failed for another reason.
    FetchFailed(String),
}

/// Errors raised by a remote suggester.
///
/// Every variant is recovered locally and only ever surfaces as the absence
/// of an AI suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// No remote suggester is configured.
    Unavailable,

    /// The request exceeded its deadline.
    Timeout,

    /// The request was cancelled by the caller.
    Cancelled,

    /// Transport-level failure.
    Connection(String),

    /// The service answered with an error status or error payload.
    Api { status: u16, message: String },

    /// The service answered without any completion text.
    EmptyResponse,

    /// The response body could not be decoded.
    Malformed(String),
}

impl fmt::Display for KqlshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KqlshError::Config(e) => write!(f, "Configuration error: {e}"),
            KqlshError::Catalog(e) => write!(f, "Catalog error: {e}"),
            KqlshError::Remote(e) => write!(f, "Suggestion error: {e}"),
            KqlshError::Io(e) => write!(f, "I/O error: {e}"),
            KqlshError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
            ConfigError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::NotConnected => write!(f, "No data source available"),
            CatalogError::UnknownTable(table) => write!(f, "Unknown table: {table}"),
            CatalogError::Timeout(table) => write!(f, "Schema fetch timed out for {table}"),
            CatalogError::InvalidCatalog(msg) => write!(f, "Invalid catalog: {msg}"),
            CatalogError::FetchFailed(msg) => write!(f, "Fetch failed: {msg}"),
        }
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::Unavailable => write!(f, "Remote suggester not available"),
            RemoteError::Timeout => write!(f, "Remote suggestion timed out"),
            RemoteError::Cancelled => write!(f, "Remote suggestion cancelled"),
            RemoteError::Connection(msg) => write!(f, "Request failed: {msg}"),
            RemoteError::Api { status, message } => {
                write!(f, "API error (status {status}): {message}")
            }
            RemoteError::EmptyResponse => write!(f, "No completion returned"),
            RemoteError::Malformed(msg) => write!(f, "Failed to parse response: {msg}"),
        }
    }
}

impl std::error::Error for KqlshError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for CatalogError {}
impl std::error::Error for RemoteError {}

/* ========================= Conversions to KqlshError ========================= */

impl From<io::Error> for KqlshError {
    fn from(err: io::Error) -> Self {
        KqlshError::Io(err)
    }
}

impl From<ConfigError> for KqlshError {
    fn from(err: ConfigError) -> Self {
        KqlshError::Config(err)
    }
}

impl From<CatalogError> for KqlshError {
    fn from(err: CatalogError) -> Self {
        KqlshError::Catalog(err)
    }
}

impl From<RemoteError> for KqlshError {
    fn from(err: RemoteError) -> Self {
        KqlshError::Remote(err)
    }
}

impl From<toml::de::Error> for KqlshError {
    fn from(err: toml::de::Error) -> Self {
        KqlshError::Config(ConfigError::InvalidFormat(err.to_string()))
    }
}

impl From<toml::ser::Error> for KqlshError {
    fn from(err: toml::ser::Error) -> Self {
        KqlshError::Config(ConfigError::InvalidFormat(err.to_string()))
    }
}

impl From<serde_json::Error> for KqlshError {
    fn from(err: serde_json::Error) -> Self {
        KqlshError::Generic(format!("JSON serialization failed: {err}"))
    }
}

impl From<String> for KqlshError {
    fn from(msg: String) -> Self {
        KqlshError::Generic(msg)
    }
}

impl From<&str> for KqlshError {
    fn from(msg: &str) -> Self {
        KqlshError::Generic(msg.to_owned())
    }
}

impl From<reedline::ReedlineError> for KqlshError {
    fn from(err: reedline::ReedlineError) -> Self {
        KqlshError::Generic(format!("Line editor error: {err}"))
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RemoteError::Timeout
        } else if err.is_decode() {
            RemoteError::Malformed(err.to_string())
        } else {
            RemoteError::Connection(err.to_string())
        }
    }
}
