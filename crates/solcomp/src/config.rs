//! Compiler configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default release index listing every published static build.
pub const DEFAULT_CATALOG_URL: &str = "https://binaries.soliditylang.org/linux-amd64/list.json";

/// Default base for per-release binary downloads.
pub const DEFAULT_RELEASE_DOWNLOAD_BASE: &str =
    "https://github.com/ethereum/solidity/releases/download";

/// Asset name of the statically linked linux build attached to each release.
pub const DEFAULT_PLATFORM_BINARY: &str = "solc-static-linux";

/// Configuration for a [`SolidityCompiler`](crate::SolidityCompiler)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SolcConfig {
    /// Root folder holding the binary cache
    pub storage_root: PathBuf,

    /// Release index endpoint
    pub catalog_url: String,

    /// Base URL that release tags are appended to
    pub release_download_base: String,

    /// Release asset to download
    pub platform_binary: String,

    /// Retry settings for catalog fetch and resolution
    pub retry: RetryConfig,

    /// HTTP request timeout in seconds (None = no timeout)
    pub http_timeout_secs: Option<u64>,
}

/// Retry settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetryConfig {
    /// Total number of attempts, including the first
    pub max_attempts: u32,

    /// Fixed delay between attempts in milliseconds
    pub delay_ms: u64,
}

impl Default for SolcConfig {
    fn default() -> Self {
        Self {
            storage_root: std::env::temp_dir().join("solcomp"),
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            release_download_base: DEFAULT_RELEASE_DOWNLOAD_BASE.to_string(),
            platform_binary: DEFAULT_PLATFORM_BINARY.to_string(),
            retry: RetryConfig::default(),
            http_timeout_secs: None,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay_ms: 100,
        }
    }
}

impl SolcConfig {
    /// Create a configuration rooted at the given storage folder
    pub fn with_storage_root(storage_root: impl Into<PathBuf>) -> Self {
        Self {
            storage_root: storage_root.into(),
            ..Self::default()
        }
    }

    /// Per-request timeout, if one is configured
    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout_secs.map(Duration::from_secs)
    }

    /// Build an HTTP client honouring the configured timeout
    pub(crate) fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.http_timeout() {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }
}
