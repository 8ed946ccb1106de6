//! Release listing command

use crate::error::CliResult;
use crate::output::{self, OutputFormat};
use clap::Args;
use serde::Serialize;
use solcomp::{CatalogSource, HttpCatalogSource, RetryPolicy, SolcConfig, VersionConstraint};
use tabled::Tabled;

/// Arguments for `versions`
#[derive(Debug, Args)]
pub struct VersionsArgs {
    /// Only list releases satisfying this range (e.g. ">=0.4.6 <0.5.0")
    #[arg(short, long)]
    pub constraint: Option<String>,

    /// Maximum number of releases to list
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Table row for release display
#[derive(Debug, Serialize, Tabled)]
struct ReleaseRow {
    /// Release version
    version: String,
}

/// Execute the versions command
pub async fn execute(args: VersionsArgs, config: &SolcConfig, format: OutputFormat) -> CliResult<()> {
    let constraint = args
        .constraint
        .as_deref()
        .map(VersionConstraint::parse)
        .transpose()?;

    let source = HttpCatalogSource::from_config(config)?;
    let catalog = RetryPolicy::from(config.retry)
        .run(|_| source.fetch_catalog())
        .await?;

    let rows: Vec<ReleaseRow> = catalog
        .iter()
        .filter(|version| constraint.as_ref().map_or(true, |c| c.matches(version)))
        .take(args.limit.unwrap_or(usize::MAX))
        .map(|version| ReleaseRow {
            version: version.to_string(),
        })
        .collect();

    output::print_output(rows, format);
    Ok(())
}
