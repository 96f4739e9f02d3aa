//! hoard CLI
//!
//! Command-line interface for inspecting and editing a hoard document store.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use hoard_core::{Config, StorageEngine, StorageError};

mod commands;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "hoard")]
#[command(about = "hoard - embedded document store")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Data directory (overrides config file and HOARD_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Password for encrypted documents
    #[arg(long, global = true, env = "HOARD_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the value of a key
    Get {
        /// Document name
        doc: String,
        /// Key
        key: String,
    },
    /// Store a value if the key is not set yet
    Put {
        /// Document name
        doc: String,
        /// Key
        key: String,
        /// Value (JSON, or a plain string)
        value: String,
    },
    /// Store a value, replacing any existing one
    Set {
        /// Document name
        doc: String,
        /// Key
        key: String,
        /// Value (JSON, or a plain string)
        value: String,
    },
    /// Remove a key
    #[command(alias = "rm")]
    Remove {
        /// Document name
        doc: String,
        /// Key
        key: String,
    },
    /// List the keys of a document
    #[command(alias = "ls")]
    Keys {
        /// Document name
        doc: String,
    },
    /// Remove every key from a document
    Clear {
        /// Document name
        doc: String,
    },
    /// Delete a document
    Delete {
        /// Document name
        doc: String,
    },
    /// Show configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if let Some(hint) = e
                .downcast_ref::<StorageError>()
                .and_then(StorageError::recovery_suggestion)
            {
                eprintln!("Hint: {}", hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    // Commands that don't need the store
    if let Commands::Config { command } = &cli.command {
        return match command {
            Some(ConfigCommands::Show) | None => commands::config::show(&config, &output),
        };
    }

    debug!(
        "Opening store at {:?} with {} cache",
        config.data_dir,
        config.cache.strategy_name()
    );
    let engine = StorageEngine::open_with_config(&config)
        .await
        .with_context(|| format!("Failed to open store at {:?}", config.data_dir))?;
    let password = cli.password.as_deref();

    match cli.command {
        Commands::Get { doc, key } => {
            commands::document::get(&engine, &doc, &key, password, &output).await
        }
        Commands::Put { doc, key, value } => {
            commands::document::put(&engine, &doc, &key, &value, password, &output).await
        }
        Commands::Set { doc, key, value } => {
            commands::document::set(&engine, &doc, &key, &value, password, &output).await
        }
        Commands::Remove { doc, key } => {
            commands::document::remove(&engine, &doc, &key, password, &output).await
        }
        Commands::Keys { doc } => commands::document::keys(&engine, &doc, &output).await,
        Commands::Clear { doc } => commands::document::clear(&engine, &doc, &output).await,
        Commands::Delete { doc } => {
            commands::document::delete(&engine, &doc, password, &output).await
        }
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

/// Log to stderr, filtered by HOARD_LOG (default: warn)
fn init_logging() {
    let env_filter = EnvFilter::try_from_env("HOARD_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_put() {
        let cli = Cli::try_parse_from(["hoard", "--json", "put", "prefs", "theme", "dark"]).unwrap();
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Commands::Put { ref doc, ref key, ref value }
                if doc == "prefs" && key == "theme" && value == "dark"
        ));
    }

    #[test]
    fn test_rm_alias() {
        let cli = Cli::try_parse_from(["hoard", "rm", "prefs", "theme"]).unwrap();
        assert!(matches!(cli.command, Commands::Remove { .. }));
    }
}
