//! Etherscan client for deployed-contract name lookup

use crate::error::{CliError, CliResult};
use reqwest::Client;
use serde::Deserialize;

/// Default Etherscan API endpoint
pub const DEFAULT_ETHERSCAN_ENDPOINT: &str = "https://api.etherscan.io/api";

/// Returned when the explorer knows the address but not a verified name
pub const NAME_NOT_FOUND: &str = "Contract name not found";

/// HTTP client for the Etherscan contract API
pub struct EtherscanClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

/// `getsourcecode` response envelope
#[derive(Debug, Deserialize)]
struct SourceCodeResponse {
    status: String,
    message: String,
    #[serde(default)]
    result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct SourceCodeEntry {
    #[serde(rename = "ContractName", default)]
    contract_name: String,
}

impl EtherscanClient {
    /// Create a new Etherscan client
    pub fn new(endpoint: &str, api_key: impl Into<String>) -> CliResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Look up the verified contract name for `address`
    pub async fn contract_name(&self, address: &str) -> CliResult<String> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("module", "contract"),
                ("action", "getsourcecode"),
                ("address", address),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: SourceCodeResponse = response.json().await?;
        contract_name_from(body)
    }
}

fn contract_name_from(body: SourceCodeResponse) -> CliResult<String> {
    if body.status != "1" || body.message != "OK" {
        return Err(CliError::Api {
            status: body.status,
            message: body.message,
        });
    }

    let entries: Vec<SourceCodeEntry> = serde_json::from_value(body.result)?;
    let name = entries
        .into_iter()
        .next()
        .map(|entry| entry.contract_name)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| NAME_NOT_FOUND.to_string());
    Ok(name)
}
