//! Resolve command

use crate::commands::read_source;
use crate::error::CliResult;
use crate::output::{self, OutputFormat};
use clap::Args;
use serde::Serialize;
use solcomp::{extract_constraint, DiskBinaryCache, SolcConfig, SolidityCompiler};
use std::path::PathBuf;

/// Arguments for `resolve`
#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Path to the Solidity (.sol) file
    #[arg(short, long)]
    pub file: PathBuf,
}

/// Resolution report
#[derive(Debug, Serialize)]
struct Resolution {
    constraint: String,
    version: String,
    cached_binary: Option<PathBuf>,
}

/// Execute the resolve command
pub async fn execute(args: ResolveArgs, config: &SolcConfig, format: OutputFormat) -> CliResult<()> {
    let source = read_source(&args.file)?;
    let constraint = extract_constraint(&source)?;

    let compiler = SolidityCompiler::new(config.clone()).await?;
    let version = compiler.resolve_version(&constraint).await?;
    let cached_binary = DiskBinaryCache::from_config(config)?.lookup(&version).await;

    output::print_single(
        &Resolution {
            constraint: constraint.to_string(),
            version: version.to_string(),
            cached_binary,
        },
        format,
    );
    Ok(())
}
