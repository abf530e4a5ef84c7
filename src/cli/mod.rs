//! Command-line interface for kqlsh
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and CLI overrides
//! - Catalog loading for the composer and one-shot commands
//! - Subcommands (`complete`, `context`, `config`, `completion`, `version`)

pub mod completion;

use clap::{Parser, Subcommand, ValueHint};
use std::path::{Path, PathBuf};

use crate::catalog::StaticCatalog;
use crate::config::{Config, LogLevel};
use crate::error::{ConfigError, Result};
use crate::formatter::{Formatter, OutputFormat};
use crate::repl::completion::{SchemaCache, SuggestionEngine, referenced_tables};

/// Prompt name used when no catalog name can be derived
const DEFAULT_CATALOG_NAME: &str = "kql";

/// kqlsh - interactive KQL query composer
#[derive(Parser, Debug)]
#[command(
    name = "kqlsh",
    version,
    about = "Interactive KQL query composer with context-aware suggestions",
    long_about = "Compose pipe-delimited KQL queries with ranked local completions for tables,
operators, columns and aggregation functions, plus optional AI suggestions shown as ghost text."
)]
pub struct CliArgs {
    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub config_file: Option<PathBuf>,

    /// Table catalog file (TOML)
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub catalog: Option<PathBuf>,

    /// Disable AI suggestions
    #[arg(long = "no-ai")]
    pub no_ai: bool,

    /// Debounce window before requesting an AI suggestion
    #[arg(long, value_name = "MS")]
    pub debounce_ms: Option<u64>,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Quiet mode (minimal output)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands for kqlsh
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print local suggestions for a query
    Complete {
        /// Query text
        #[arg(value_name = "QUERY")]
        query: String,

        /// Cursor byte offset (defaults to the end of the query)
        #[arg(long)]
        cursor: Option<usize>,

        /// Maximum number of suggestions (0 for no limit)
        #[arg(long)]
        limit: Option<usize>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Indent JSON output
        #[arg(long, requires = "json")]
        pretty: bool,
    },

    /// Print the completion context for a query
    Context {
        /// Query text
        #[arg(value_name = "QUERY")]
        query: String,

        /// Cursor byte offset (defaults to the end of the query)
        #[arg(long)]
        cursor: Option<usize>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Validate configuration file
        #[arg(long)]
        validate: bool,

        /// Write a default configuration file if none exists
        #[arg(long)]
        init: bool,
    },

    /// Generate shell completion script
    Completion {
        /// Shell type (bash, zsh, fish)
        #[arg(value_name = "SHELL")]
        shell: String,
    },

    /// Show version information
    Version,
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Effective configuration
    config: Config,
}

impl CliInterface {
    /// Parse process arguments and load configuration
    pub fn new() -> Result<Self> {
        Self::from_args(CliArgs::parse())
    }

    /// Build the interface from already parsed arguments
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let config = Self::load_config(&args)?;
        Ok(Self { args, config })
    }

    /// Load configuration from file and merge with arguments
    ///
    /// Logging is not set up yet at this point, so problems go to stderr.
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load_from_file(args.config_file.as_deref())?;
        Self::apply_args_to_config(&mut config, args);

        if let Err(e) = config.validate() {
            eprintln!("Warning: Configuration validation failed: {e}");
            eprintln!("Using default configuration instead.");
            config = Config::default();
            Self::apply_args_to_config(&mut config, args);
        }

        Ok(config)
    }

    /// Effective configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parsed arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Override configuration values with CLI arguments where provided
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        Self::apply_suggest_args(config, args);
        Self::apply_display_args(config, args);
        Self::apply_logging_args(config, args);
    }

    fn apply_suggest_args(config: &mut Config, args: &CliArgs) {
        if let Some(path) = &args.catalog {
            config.catalog.path = Some(path.clone());
        }

        if args.no_ai {
            config.remote.enabled = false;
        }

        if let Some(ms) = args.debounce_ms {
            config.suggest.debounce_ms = ms;
        }
    }

    fn apply_display_args(config: &mut Config, args: &CliArgs) {
        if args.no_color {
            config.display.color_output = false;
        }
    }

    fn apply_logging_args(config: &mut Config, args: &CliArgs) {
        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };
    }

    /// Load the configured table catalog, or an empty one when none is set
    pub fn load_catalog(&self) -> Result<StaticCatalog> {
        match &self.config.catalog.path {
            Some(path) => StaticCatalog::from_file(path),
            None => Ok(StaticCatalog::default()),
        }
    }

    /// Name shown in the prompt: configured name, then catalog file stem
    pub fn catalog_name(&self) -> String {
        if let Some(name) = &self.config.catalog.name {
            return name.clone();
        }

        self.config
            .catalog
            .path
            .as_deref()
            .and_then(|p| p.file_stem())
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_CATALOG_NAME.to_string())
    }

    /// Handle subcommands
    ///
    /// # Returns
    /// * `Result<bool>` - True if a subcommand was handled, false to start the composer
    pub fn handle_subcommand(&self) -> Result<bool> {
        match &self.args.command {
            Some(Commands::Complete {
                query,
                cursor,
                limit,
                json,
                pretty,
            }) => {
                let format = match (*json, *pretty) {
                    (true, true) => OutputFormat::JsonPretty,
                    (true, false) => OutputFormat::Json,
                    _ => OutputFormat::Table,
                };
                let limit = limit.unwrap_or(self.config.suggest.popup_limit);
                println!("{}", self.complete(query, *cursor, limit, format)?);
                Ok(true)
            }
            Some(Commands::Context {
                query,
                cursor,
                json,
            }) => {
                let format = if *json {
                    OutputFormat::JsonPretty
                } else {
                    OutputFormat::Table
                };
                println!("{}", self.context(query, *cursor, format)?);
                Ok(true)
            }
            Some(Commands::Config {
                show,
                validate,
                init,
            }) => {
                self.handle_config_command(*show, *validate, *init)?;
                Ok(true)
            }
            Some(Commands::Completion { shell }) => {
                completion::generate_completion(shell)?;
                Ok(true)
            }
            Some(Commands::Version) => {
                self.show_version();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Build a local engine with the schemas of the tables `query` references
    fn engine_for(&self, query: &str) -> Result<SuggestionEngine> {
        let catalog = self.load_catalog()?;
        let tables = catalog.table_names().to_vec();

        let mut schemas = SchemaCache::new();
        for table in referenced_tables(query, &tables) {
            if let Some(columns) = catalog.columns(&table) {
                schemas.set(table, columns.to_vec());
            }
        }

        Ok(SuggestionEngine::new(tables, schemas))
    }

    /// Render ranked local suggestions for `query` at `cursor`
    pub fn complete(
        &self,
        query: &str,
        cursor: Option<usize>,
        limit: usize,
        format: OutputFormat,
    ) -> Result<String> {
        let engine = self.engine_for(query)?;
        let (context, suggestions) = engine.complete(query, cursor.unwrap_or(query.len()), limit);
        tracing::debug!(
            "{} suggestions for {} context",
            suggestions.len(),
            context.kind
        );
        self.formatter(format)
            .format_completion(&context, &suggestions)
    }

    /// Render the completion context for `query` at `cursor`
    pub fn context(&self, query: &str, cursor: Option<usize>, format: OutputFormat) -> Result<String> {
        let engine = self.engine_for(query)?;
        let context = engine.parse_context(query, cursor.unwrap_or(query.len()));
        self.formatter(format).format_context(&context)
    }

    fn formatter(&self, format: OutputFormat) -> Formatter {
        Formatter::new(format, self.config.display.color_output)
    }

    fn show_version(&self) {
        println!("kqlsh version {}", env!("CARGO_PKG_VERSION"));
    }

    /// Handle config subcommand
    fn handle_config_command(&self, show: bool, validate: bool, init: bool) -> Result<()> {
        if init {
            let path = self.get_config_path();
            init_config(&path)?;
            println!("Wrote default configuration to {}", path.display());
        }

        if validate {
            self.validate_config_file();
        }

        if show {
            self.show_config()?;
        }

        Ok(())
    }

    /// Validate the configuration file on disk, reporting to stdout
    fn validate_config_file(&self) {
        let path = self.get_config_path();
        println!("Validating configuration file: {}", path.display());

        if !path.exists() {
            println!("❌ Configuration file does not exist");
            return;
        }

        match Config::from_file(&path) {
            Ok(config) => match config.validate() {
                Ok(()) => println!("✅ Configuration is valid"),
                Err(e) => println!("❌ Configuration validation failed: {e}"),
            },
            Err(e) => println!("❌ Failed to load configuration: {e}"),
        }
    }

    /// Show effective configuration
    fn show_config(&self) -> Result<()> {
        println!("Configuration file: {}", self.get_config_path().display());
        println!();
        println!("=== Effective Configuration ===");
        println!();
        println!("{}", self.config.to_toml()?);
        Ok(())
    }

    /// Configuration file path (from args or default)
    fn get_config_path(&self) -> PathBuf {
        self.args
            .config_file
            .clone()
            .unwrap_or_else(Config::default_path)
    }

    /// Print startup banner
    pub fn print_banner(&self, tables: usize, ai_enabled: bool) {
        if self.args.quiet {
            return;
        }
        println!("kqlsh {}", env!("CARGO_PKG_VERSION"));
        println!(
            "Catalog: {} ({} tables), AI suggestions: {}",
            self.catalog_name(),
            tables,
            if ai_enabled { "on" } else { "off" }
        );
        println!("Tab for completions, → to accept a suggestion, Ctrl-D to exit.");
    }
}

/// Write the default configuration to `path`, refusing to overwrite
fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(ConfigError::Generic(format!(
            "configuration file already exists: {}",
            path.display()
        ))
        .into());
    }
    Config::default().save(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::fs;

    const CATALOG: &str = r#"
        [[tables]]
        name = "AzureActivity"
        columns = [
            { name = "TimeGenerated", type = "datetime" },
            { name = "OperationName", type = "string" },
            { name = "Caller", type = "string" },
        ]

        [[tables]]
        name = "Heartbeat"
        columns = [{ name = "Computer", type = "string" }]
    "#;

    /// CLI with an empty config file and the sample catalog
    fn interface(extra: &[&str]) -> (CliInterface, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        let catalog_path = dir.path().join("contoso.toml");
        fs::write(&config_path, "").unwrap();
        fs::write(&catalog_path, CATALOG).unwrap();

        let mut argv = vec![
            "kqlsh".to_string(),
            "--config".to_string(),
            config_path.display().to_string(),
            "--catalog".to_string(),
            catalog_path.display().to_string(),
        ];
        argv.extend(extra.iter().map(|s| s.to_string()));

        let args = CliArgs::try_parse_from(argv).unwrap();
        (CliInterface::from_args(args).unwrap(), dir)
    }

    #[test]
    fn test_cli_args_parsing() {
        let args = CliArgs::try_parse_from(["kqlsh"]).unwrap();
        assert!(args.config_file.is_none());
        assert!(args.catalog.is_none());
        assert!(args.command.is_none());
    }

    #[test]
    fn test_cli_args_with_flags() {
        let args =
            CliArgs::try_parse_from(["kqlsh", "--no-ai", "--no-color", "--debounce-ms", "250", "-q"])
                .unwrap();
        assert!(args.no_ai);
        assert!(args.no_color);
        assert!(args.quiet);
        assert_eq!(args.debounce_ms, Some(250));
    }

    #[test]
    fn test_complete_subcommand() {
        let args = CliArgs::try_parse_from([
            "kqlsh", "complete", "Heartbeat | wh", "--cursor", "14", "--limit", "3", "--json",
        ])
        .unwrap();
        match args.command {
            Some(Commands::Complete {
                query,
                cursor,
                limit,
                json,
                pretty,
            }) => {
                assert_eq!(query, "Heartbeat | wh");
                assert_eq!(cursor, Some(14));
                assert_eq!(limit, Some(3));
                assert!(json);
                assert!(!pretty);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_pretty_requires_json() {
        assert!(CliArgs::try_parse_from(["kqlsh", "complete", "T", "--pretty"]).is_err());
    }

    #[test]
    fn test_args_override_config() {
        let (cli, _dir) = interface(&["--no-ai", "--debounce-ms", "120", "--no-color", "--vv"]);
        let config = cli.config();
        assert!(!config.remote.enabled);
        assert_eq!(config.suggest.debounce_ms, 120);
        assert!(!config.display.color_output);
        assert_eq!(config.logging.level, LogLevel::Trace);
        assert!(config.catalog.path.is_some());
    }

    #[test]
    fn test_verbosity_flags() {
        let (cli, _dir) = interface(&["-v"]);
        assert_eq!(cli.config().logging.level, LogLevel::Debug);

        let (cli, _dir) = interface(&["-q"]);
        assert_eq!(cli.config().logging.level, LogLevel::Error);

        let (cli, _dir) = interface(&[]);
        assert_eq!(cli.config().logging.level, LogLevel::Warn);
    }

    #[test]
    fn test_invalid_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[suggest]\npopup_limit = 0\n").unwrap();

        let args = CliArgs::try_parse_from([
            "kqlsh".to_string(),
            "--config".to_string(),
            path.display().to_string(),
            "--debounce-ms".to_string(),
            "50".to_string(),
        ])
        .unwrap();
        let cli = CliInterface::from_args(args).unwrap();
        assert_eq!(cli.config().suggest.popup_limit, 10);
        assert_eq!(cli.config().suggest.debounce_ms, 50);
    }

    #[test]
    fn test_init_config_writes_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        init_config(&path).unwrap();
        let written = Config::from_file(&path).unwrap();
        assert_eq!(written.suggest.popup_limit, Config::default().suggest.popup_limit);
        assert!(written.validate().is_ok());

        fs::write(&path, "[suggest]\npopup_limit = 3\n").unwrap();
        assert!(init_config(&path).is_err());
        assert_eq!(Config::from_file(&path).unwrap().suggest.popup_limit, 3);
    }

    #[test]
    fn test_config_init_flag() {
        let args = CliArgs::try_parse_from(["kqlsh", "config", "--init"]).unwrap();
        assert!(matches!(
            args.command,
            Some(Commands::Config {
                init: true,
                show: false,
                validate: false
            })
        ));
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let args = CliArgs::try_parse_from(["kqlsh", "--config", "/nonexistent/kqlsh.toml"]).unwrap();
        assert!(CliInterface::from_args(args).is_err());
    }

    #[test]
    fn test_catalog_name() {
        let (cli, _dir) = interface(&[]);
        assert_eq!(cli.catalog_name(), "contoso");
        assert_eq!(cli.load_catalog().unwrap().len(), 2);

        let args = CliArgs::try_parse_from(["kqlsh", "--config", "/dev/null"]).unwrap();
        let cli = CliInterface {
            args,
            config: Config::default(),
        };
        assert_eq!(cli.catalog_name(), DEFAULT_CATALOG_NAME);
        assert!(cli.load_catalog().unwrap().is_empty());
    }

    #[test]
    fn test_complete_columns_from_catalog() {
        let (cli, _dir) = interface(&[]);
        let output = cli
            .complete(
                "AzureActivity | where Op",
                None,
                10,
                OutputFormat::Json,
            )
            .unwrap();

        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["context"]["kind"], "column_name");
        assert_eq!(value["context"]["current_table"], "AzureActivity");
        assert_eq!(value["suggestions"][0]["text"], "OperationName");
        assert_eq!(value["suggestions"][0]["kind"], "column");
    }

    #[test]
    fn test_complete_honours_cursor() {
        let (cli, _dir) = interface(&[]);
        let output = cli
            .complete("Heart | take 10", Some(5), 10, OutputFormat::Json)
            .unwrap();

        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["context"]["kind"], "table_name");
        assert_eq!(value["suggestions"][0]["text"], "Heartbeat");
    }

    #[test]
    fn test_context_table_output() {
        let (cli, _dir) = interface(&["--no-color"]);
        let output = cli
            .context("Heartbeat | summarize ", None, OutputFormat::Table)
            .unwrap();
        assert!(output.contains("function"));
        assert!(output.contains("summarize"));
        assert!(output.contains("Heartbeat"));
    }
}
