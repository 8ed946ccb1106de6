//! On-disk solc binary cache.
//!
//! One executable per release lives at `<storage_root>/solc/solcV<x.y.z>`.
//! Presence of a regular file at that path is a cache hit; the binary itself
//! is never re-validated.
//!
//! Downloads stream into a uniquely named `.part` file next to the final path
//! and are published with a rename, so a concurrent reader either sees no
//! binary or a complete one. Two processes missing on the same release will
//! both download; the last rename wins.

use crate::config::SolcConfig;
use crate::error::{SolcError, SolcResult};
use async_trait::async_trait;
use semver::Version;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Subfolder of the storage root holding binaries
pub const CACHE_SUBFOLDER: &str = "solc";

/// File name prefix for cached binaries
pub const BINARY_PREFIX: &str = "solcV";

/// `major.minor.patch` without pre-release or build metadata.
pub fn simplified_version(version: &Version) -> String {
    format!("{}.{}.{}", version.major, version.minor, version.patch)
}

/// Maps a release to a local executable, fetching it on first use.
#[async_trait]
pub trait BinaryStore: Send + Sync {
    /// Local path of the executable for `version`, downloading it if absent.
    async fn locate_or_fetch(&self, version: &Version) -> SolcResult<PathBuf>;
}

/// Streams a remote release asset into a writer.
#[async_trait]
pub trait BinaryFetcher: Send + Sync {
    /// Copy the body at `url` into `sink`, returning the number of bytes written.
    async fn fetch_to(
        &self,
        url: &str,
        sink: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> SolcResult<u64>;
}

/// HTTP implementation of [`BinaryFetcher`]
#[derive(Debug, Clone)]
pub struct HttpBinaryFetcher {
    client: reqwest::Client,
}

impl HttpBinaryFetcher {
    /// Fetcher sharing an existing client
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BinaryFetcher for HttpBinaryFetcher {
    async fn fetch_to(
        &self,
        url: &str,
        sink: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> SolcResult<u64> {
        let download_failed = |reason: String| SolcError::DownloadFailed {
            url: url.to_string(),
            reason,
        };

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| download_failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(download_failed(format!("HTTP {}", status.as_u16())));
        }

        let mut written = 0u64;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| download_failed(e.to_string()))?
        {
            sink.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        Ok(written)
    }
}

/// Binary cache rooted at `<storage_root>/solc`
#[derive(Clone)]
pub struct DiskBinaryCache {
    folder: PathBuf,
    release_download_base: String,
    platform_binary: String,
    fetcher: Arc<dyn BinaryFetcher>,
}

impl std::fmt::Debug for DiskBinaryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiskBinaryCache")
            .field("folder", &self.folder)
            .field("release_download_base", &self.release_download_base)
            .field("platform_binary", &self.platform_binary)
            .finish()
    }
}

impl DiskBinaryCache {
    /// Cache under `config.storage_root` using `fetcher` for misses
    pub fn new(config: &SolcConfig, fetcher: Arc<dyn BinaryFetcher>) -> Self {
        Self {
            folder: config.storage_root.join(CACHE_SUBFOLDER),
            release_download_base: config.release_download_base.trim_end_matches('/').to_string(),
            platform_binary: config.platform_binary.clone(),
            fetcher,
        }
    }

    /// Cache backed by an HTTP fetcher built from `config`
    pub fn from_config(config: &SolcConfig) -> SolcResult<Self> {
        let client = config.http_client().map_err(|e| SolcError::DownloadFailed {
            url: config.release_download_base.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self::new(config, Arc::new(HttpBinaryFetcher::new(client))))
    }

    /// Folder holding the cached binaries
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Deterministic location of the binary for `version`
    pub fn binary_path(&self, version: &Version) -> PathBuf {
        self.folder
            .join(format!("{BINARY_PREFIX}{}", simplified_version(version)))
    }

    /// Release asset URL for `version`
    pub fn download_url(&self, version: &Version) -> String {
        format!(
            "{}/v{}/{}",
            self.release_download_base,
            simplified_version(version),
            self.platform_binary
        )
    }

    /// Path of the cached binary if a regular file exists there right now.
    pub async fn lookup(&self, version: &Version) -> Option<PathBuf> {
        let path = self.binary_path(version);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Some(path),
            _ => None,
        }
    }

    async fn download(&self, version: &Version) -> SolcResult<PathBuf> {
        tokio::fs::create_dir_all(&self.folder).await?;

        let destination = self.binary_path(version);
        let partial = self.folder.join(format!(
            "{BINARY_PREFIX}{}.{}.part",
            simplified_version(version),
            uuid::Uuid::new_v4().simple()
        ));
        let url = self.download_url(version);
        tracing::info!(version = %version, url = %url, "Downloading solc binary");

        match self.write_partial(&url, &partial).await {
            Ok(bytes) => {
                if let Err(e) = tokio::fs::rename(&partial, &destination).await {
                    discard(&partial).await;
                    return Err(e.into());
                }
                tracing::info!(
                    version = %version,
                    path = %destination.display(),
                    bytes,
                    "Cached solc binary"
                );
                Ok(destination)
            }
            Err(e) => {
                discard(&partial).await;
                Err(e)
            }
        }
    }

    async fn write_partial(&self, url: &str, partial: &Path) -> SolcResult<u64> {
        let mut file = tokio::fs::File::create(partial).await?;
        let bytes = self.fetcher.fetch_to(url, &mut file).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);
        mark_executable(partial).await?;
        Ok(bytes)
    }
}

#[async_trait]
impl BinaryStore for DiskBinaryCache {
    async fn locate_or_fetch(&self, version: &Version) -> SolcResult<PathBuf> {
        if let Some(path) = self.lookup(version).await {
            tracing::debug!(version = %version, path = %path.display(), "solc cache hit");
            return Ok(path);
        }
        self.download(version).await
    }
}

async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::debug!(path = %path.display(), error = %e, "Could not remove partial download");
    }
}

#[cfg(unix)]
async fn mark_executable(path: &Path) -> SolcResult<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o777)).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn mark_executable(_path: &Path) -> SolcResult<()> {
    Ok(())
}
