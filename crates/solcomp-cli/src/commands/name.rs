//! Deployed contract name lookup

use crate::client::{EtherscanClient, DEFAULT_ETHERSCAN_ENDPOINT};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use clap::Args;

/// Arguments for `name`
#[derive(Debug, Args)]
pub struct NameArgs {
    /// Contract address (0x-prefixed)
    pub address: String,
}

/// Execute the name command
pub async fn execute(args: NameArgs, config: &CliConfig) -> CliResult<()> {
    let api_key = config
        .etherscan_api_key
        .clone()
        .ok_or_else(|| CliError::InvalidInput("an Etherscan API key is required".into()))?;

    if !is_address(&args.address) {
        return Err(CliError::InvalidInput(format!(
            "not a contract address: {}",
            args.address
        )));
    }

    let endpoint = config
        .etherscan_endpoint
        .as_deref()
        .unwrap_or(DEFAULT_ETHERSCAN_ENDPOINT);
    let client = EtherscanClient::new(endpoint, api_key)?;
    println!("{}", client.contract_name(&args.address).await?);
    Ok(())
}

fn is_address(candidate: &str) -> bool {
    candidate
        .strip_prefix("0x")
        .map(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_shape() {
        assert!(is_address("0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D"));
        assert!(!is_address("7a250d5630B4cF539739dF2C5dAcb4c659F2488D"));
        assert!(!is_address("0x1234"));
        assert!(!is_address("0xZZ250d5630B4cF539739dF2C5dAcb4c659F2488D"));
    }
}
