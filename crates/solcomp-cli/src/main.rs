//! solcomp CLI - compile Solidity with the solc release the source asks for
//!
//! This CLI lets developers:
//! - Compile a source file, optionally selecting one contract
//! - See which solc release a source resolves to
//! - List published solc releases
//! - Look up the verified name of a deployed contract

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod artifacts;
mod client;
mod commands;
mod config;
mod error;
mod output;

use commands::{compile, name, resolve, versions};
use config::CliConfig;
use error::CliResult;

/// solcomp CLI application
#[derive(Parser)]
#[command(name = "solcomp")]
#[command(about = "solcomp - compile Solidity with the matching solc release", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short = 'C', long, env = "SOLCOMP_CONFIG", global = true)]
    config: Option<String>,

    /// Folder holding downloaded solc binaries
    #[arg(long, env = "SOLCOMP_STORAGE_ROOT", global = true)]
    storage_root: Option<PathBuf>,

    /// Release index endpoint
    #[arg(long, env = "SOLCOMP_CATALOG_URL", global = true)]
    catalog_url: Option<String>,

    /// Etherscan API key used by `name`
    #[arg(long, env = "ETHERSCAN_API_KEY", global = true, hide_env_values = true)]
    etherscan_api_key: Option<String>,

    /// Output format (table, json, yaml)
    #[arg(short, long, default_value = "table", global = true)]
    output: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Compile a Solidity source file
    Compile(compile::CompileArgs),

    /// Show the solc release a source resolves to
    Resolve(resolve::ResolveArgs),

    /// List published solc releases
    Versions(versions::VersionsArgs),

    /// Look up the verified name of a deployed contract
    Name(name::NameArgs),

    /// Show configuration
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = run(cli).await {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    // Load config, flags and environment win over the file
    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(storage_root) = cli.storage_root {
        config.compiler.storage_root = storage_root;
    }
    if let Some(catalog_url) = cli.catalog_url {
        config.compiler.catalog_url = catalog_url;
    }
    if let Some(api_key) = cli.etherscan_api_key {
        config.etherscan_api_key = Some(api_key);
    }

    match cli.command {
        Commands::Compile(args) => compile::execute(args, &config.compiler, cli.output).await,
        Commands::Resolve(args) => resolve::execute(args, &config.compiler, cli.output).await,
        Commands::Versions(args) => versions::execute(args, &config.compiler, cli.output).await,
        Commands::Name(args) => name::execute(args, &config).await,
        Commands::Config => {
            output::print_single(&config.compiler, cli.output);
            let key_state = if config.etherscan_api_key.is_some() {
                "set"
            } else {
                "unset"
            };
            println!("Etherscan API key: {}", key_state);
            Ok(())
        }
    }
}
