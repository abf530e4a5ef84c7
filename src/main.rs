//! kqlsh - interactive KQL query composer
//!
//! Composes pipe-delimited KQL queries with context-aware completions:
//! table names, pipeline operators, columns of the referenced tables and
//! aggregation functions, plus an optional AI suggestion shown as ghost text.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode with a table catalog
//! kqlsh --catalog contoso.toml
//!
//! # One-shot completion
//! kqlsh --catalog contoso.toml complete "AzureActivity | where Op"
//! ```

use std::fs::{self, OpenOptions};
use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use kqlsh::catalog::{SchemaFetcher, StaticCatalog, TableLister};
use kqlsh::cli::CliInterface;
use kqlsh::config::{Config, LoggingConfig};
use kqlsh::error::Result;
use kqlsh::remote::{ChatCompletionSuggester, RemoteSuggester};
use kqlsh::repl::ReplEngine;
use kqlsh::repl::completion::{
    Collaborators, SuggestionHandle, SuggestionService, SuggestionSession, SuggestionSettings,
    TokioTimer,
};

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Handle subcommands or start the interactive composer
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli.config().logging)?;

    if cli.handle_subcommand()? {
        return Ok(());
    }

    run_interactive_mode(&cli).await
}

/// Run the composer until Ctrl-D or `exit`
async fn run_interactive_mode(cli: &CliInterface) -> Result<()> {
    let catalog = Arc::new(cli.load_catalog()?);
    let remote = create_remote_suggester(cli.config());
    let ai_enabled = remote.is_some();

    cli.print_banner(catalog.len(), ai_enabled);

    let suggestions = start_suggestions(cli.config(), catalog, remote);
    let mut repl = ReplEngine::new(cli.config(), &suggestions, &cli.catalog_name(), ai_enabled)?;

    // The editor blocks on terminal input; the suggestion task keeps running
    // on the other workers meanwhile.
    let result = tokio::task::block_in_place(|| run_repl_loop(&mut repl));

    suggestions.shutdown().await;
    result?;

    if !cli.args().quiet {
        println!("Goodbye!");
    }
    Ok(())
}

/// Build the AI suggester when it is enabled and fully configured
fn create_remote_suggester(config: &Config) -> Option<Arc<dyn RemoteSuggester>> {
    let suggester = ChatCompletionSuggester::from_config(&config.remote)?;
    tracing::info!("AI suggestions enabled ({})", config.remote.deployment);
    Some(Arc::new(suggester))
}

/// Spawn the suggestion runtime backed by the catalog
fn start_suggestions(
    config: &Config,
    catalog: Arc<StaticCatalog>,
    remote: Option<Arc<dyn RemoteSuggester>>,
) -> SuggestionHandle {
    let tables: Arc<dyn TableLister> = catalog.clone();
    let schemas: Arc<dyn SchemaFetcher> = catalog;

    SuggestionService::spawn(
        SuggestionSession::new(),
        SuggestionSettings::from(config),
        Collaborators {
            tables: Some(tables),
            schemas: Some(schemas),
            remote,
        },
        Arc::new(TokioTimer),
    )
}

/// Read queries and echo them; executing them is left to other tools
fn run_repl_loop(repl: &mut ReplEngine) -> Result<()> {
    while let Some(line) = repl.read_line()? {
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if matches!(query, "exit" | "quit") {
            break;
        }

        tracing::debug!("Submitted query ({} bytes)", query.len());
        println!("{query}");
    }

    Ok(())
}

/// Initialize the tracing subscriber from logging configuration.
///
/// `RUST_LOG` directives are honoured on top of the configured level. When a
/// log file is set, output goes there without ANSI colors so it does not
/// interfere with the editor.
fn initialize_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(config.level.to_tracing_level()).into())
        .from_env_lossy();

    let (writer, ansi) = match &config.file_path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        None => (BoxMakeWriter::new(io::stderr), true),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(ansi)
        .with_writer(writer);

    if config.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
    Ok(())
}
