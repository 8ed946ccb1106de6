//! CLI command implementations

pub mod compile;
pub mod name;
pub mod resolve;
pub mod versions;

use crate::error::CliResult;
use solcomp::SolcError;
use std::path::Path;

/// Read a Solidity source file, rejecting empty input before any network work.
pub(crate) fn read_source(path: &Path) -> CliResult<String> {
    let source = std::fs::read_to_string(path)?;
    if source.is_empty() {
        return Err(SolcError::EmptySource.into());
    }
    Ok(source)
}
