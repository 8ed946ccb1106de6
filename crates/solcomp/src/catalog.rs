//! Release catalog: the descending list of published compiler versions

use crate::config::SolcConfig;
use crate::error::{SolcError, SolcResult};
use async_trait::async_trait;
use semver::{BuildMetadata, Version};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Known compiler releases, strictly descending, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionCatalog {
    versions: Vec<Version>,
}

impl VersionCatalog {
    /// Build a catalog from versions in any order.
    ///
    /// Build metadata is dropped, so `0.8.21+commit.a` and `0.8.21` are one release.
    pub fn from_versions(versions: impl IntoIterator<Item = Version>) -> Self {
        let mut versions: Vec<Version> = versions
            .into_iter()
            .map(|mut version| {
                version.build = BuildMetadata::EMPTY;
                version
            })
            .collect();
        versions.sort_unstable_by(|a, b| b.cmp(a));
        versions.dedup();
        Self { versions }
    }

    /// Build a catalog from raw release identifiers, dropping anything that is
    /// not a valid semantic version. A leading `v` is tolerated.
    pub fn from_identifiers<I, S>(identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_versions(identifiers.into_iter().filter_map(|id| {
            let id = id.as_ref().trim();
            Version::parse(id.strip_prefix('v').unwrap_or(id)).ok()
        }))
    }

    /// Whether no release is known
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Number of known releases
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// Highest release, if any
    pub fn latest(&self) -> Option<&Version> {
        self.versions.first()
    }

    /// Releases from newest to oldest
    pub fn iter(&self) -> impl Iterator<Item = &Version> {
        self.versions.iter()
    }

    /// Releases from newest to oldest, as a slice
    pub fn as_slice(&self) -> &[Version] {
        &self.versions
    }
}

/// Source of the release catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the current catalog. No retry is applied at this layer.
    async fn fetch_catalog(&self) -> SolcResult<VersionCatalog>;
}

/// Release index document. The soliditylang list keys `releases` by version;
/// a bare array of identifiers is accepted as well.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IndexDocument {
    Listing {
        releases: BTreeMap<String, String>,
    },
    Identifiers(Vec<String>),
}

impl IndexDocument {
    fn into_catalog(self) -> VersionCatalog {
        match self {
            IndexDocument::Listing { releases } => VersionCatalog::from_identifiers(releases.keys()),
            IndexDocument::Identifiers(ids) => VersionCatalog::from_identifiers(ids),
        }
    }
}

/// Catalog source reading a remote release index over HTTP
#[derive(Debug, Clone)]
pub struct HttpCatalogSource {
    client: reqwest::Client,
    url: String,
}

impl HttpCatalogSource {
    /// Source reading the index at `url` with an existing client
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Source for `config.catalog_url`, honouring the configured timeout
    pub fn from_config(config: &SolcConfig) -> SolcResult<Self> {
        let client = config
            .http_client()
            .map_err(|e| SolcError::CatalogUnavailable(e.to_string()))?;
        Ok(Self::new(client, config.catalog_url.clone()))
    }

    /// Index endpoint
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch_catalog(&self) -> SolcResult<VersionCatalog> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| SolcError::CatalogUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SolcError::CatalogUnavailable(format!(
                "{} returned HTTP {}",
                self.url,
                status.as_u16()
            )));
        }

        let document: IndexDocument = response
            .json()
            .await
            .map_err(|e| SolcError::CatalogUnavailable(e.to_string()))?;
        let catalog = document.into_catalog();

        tracing::debug!(url = %self.url, releases = catalog.len(), "Fetched release catalog");
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_strictly_descending() {
        let catalog = VersionCatalog::from_identifiers([
            "0.7.6", "0.8.21", "0.4.26", "0.8.21", "v0.8.0", "nightly", "0.8",
        ]);
        let rendered: Vec<String> = catalog.iter().map(|v| v.to_string()).collect();
        assert_eq!(rendered, vec!["0.8.21", "0.8.0", "0.7.6", "0.4.26"]);
        assert!(catalog.as_slice().windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_build_metadata_does_not_duplicate_releases() {
        let catalog = VersionCatalog::from_identifiers([
            "0.8.21+commit.d9974bed",
            "0.8.21+commit.aaaaaaaa",
            "0.8.21",
            "0.8.20+commit.a1b79de6",
        ]);
        assert_eq!(
            catalog.as_slice(),
            &[Version::new(0, 8, 21), Version::new(0, 8, 20)]
        );
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = VersionCatalog::from_identifiers(Vec::<String>::new());
        assert!(catalog.is_empty());
        assert!(catalog.latest().is_none());
    }

    #[test]
    fn test_listing_document() {
        let document: IndexDocument = serde_json::from_str(
            r#"{
                "builds": [],
                "releases": {
                    "0.8.21": "solc-linux-amd64-v0.8.21+commit.d9974bed",
                    "0.4.26": "solc-linux-amd64-v0.4.26+commit.4563c3fc"
                },
                "latestRelease": "0.8.21"
            }"#,
        )
        .unwrap();
        let catalog = document.into_catalog();
        assert_eq!(catalog.latest(), Some(&Version::new(0, 8, 21)));
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_identifier_array_document() {
        let document: IndexDocument =
            serde_json::from_str(r#"["v0.5.0", "0.6.12", "garbage"]"#).unwrap();
        let catalog = document.into_catalog();
        assert_eq!(
            catalog.as_slice(),
            &[Version::new(0, 6, 12), Version::new(0, 5, 0)]
        );
    }
}
