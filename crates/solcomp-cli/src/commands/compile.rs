//! Compile command

use crate::artifacts;
use crate::commands::read_source;
use crate::error::CliResult;
use crate::output::{self, print_success, print_warning, OutputFormat};
use clap::Args;
use serde::Serialize;
use solcomp::{CompileResult, Contract, SolcConfig, SolidityCompiler};
use std::path::PathBuf;
use tabled::Tabled;

/// Arguments for `compile`
#[derive(Debug, Args)]
pub struct CompileArgs {
    /// Path to the Solidity (.sol) file
    #[arg(short, long)]
    pub file: PathBuf,

    /// Name of the contract to compile (all contracts when omitted)
    #[arg(short, long)]
    pub contract: Option<String>,

    /// Write <name>.abi, <name>.bin and <name>.bin-runtime into this folder
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

/// Table row for compiled contract display
#[derive(Debug, Serialize, Tabled)]
struct ContractRow {
    /// Contract name
    name: String,
    /// ABI entries
    abi_entries: usize,
    /// Creation bytecode size in bytes
    bytecode_bytes: usize,
    /// Runtime bytecode size in bytes
    runtime_bytes: usize,
}

impl From<&Contract> for ContractRow {
    fn from(contract: &Contract) -> Self {
        let abi_entries = serde_json::from_str::<Vec<serde_json::Value>>(&contract.abi_definition)
            .map(|entries| entries.len())
            .unwrap_or(0);
        Self {
            name: contract.name.clone(),
            abi_entries,
            bytecode_bytes: hex_len(&contract.deployment_bytecode),
            runtime_bytes: hex_len(&contract.runtime_bytecode),
        }
    }
}

fn hex_len(code: &str) -> usize {
    code.trim_start_matches("0x").len() / 2
}

/// Execute the compile command
pub async fn execute(args: CompileArgs, config: &SolcConfig, format: OutputFormat) -> CliResult<()> {
    let source = read_source(&args.file)?;
    let compiler = SolidityCompiler::new(config.clone()).await?;
    let result = compiler.compile(&source, args.contract.as_deref()).await?;

    if let Some(out_dir) = &args.out_dir {
        let failed = artifacts::save_all(out_dir, result.contracts());
        if failed.is_empty() {
            print_success(&format!("Artifacts written to {}", out_dir.display()));
        } else {
            print_warning(&format!("Could not save artifacts for: {}", failed.join(", ")));
        }
    }

    match format {
        OutputFormat::Table => {
            let rows = result.contracts().iter().map(ContractRow::from).collect();
            output::print_output::<ContractRow>(rows, format);
        }
        OutputFormat::Json | OutputFormat::Yaml => match result {
            CompileResult::Single(contract) => output::print_single(&contract, format),
            CompileResult::All(contracts) => output::print_single(&contracts, format),
        },
    }
    Ok(())
}
