//! Compile pipeline: pragma → version → binary → invocation → artifacts.

use crate::cache::{BinaryStore, DiskBinaryCache};
use crate::catalog::{CatalogSource, HttpCatalogSource, VersionCatalog};
use crate::config::SolcConfig;
use crate::constraint::{extract_constraint, VersionConstraint};
use crate::contract::{CompileResult, Contract};
use crate::error::{SolcError, SolcResult};
use crate::invoke::{invoke, ProcessRunner, SolcRunner};
use crate::resolver::resolve;
use crate::retry::RetryPolicy;
use semver::Version;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Stage of a single compile call. `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileStage {
    Idle,
    ExtractingConstraint,
    ResolvingVersion,
    LocatingBinary,
    Invoking,
    ParsingOutput,
    Done,
    Failed,
}

impl fmt::Display for CompileStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompileStage::Idle => "idle",
            CompileStage::ExtractingConstraint => "extracting_constraint",
            CompileStage::ResolvingVersion => "resolving_version",
            CompileStage::LocatingBinary => "locating_binary",
            CompileStage::Invoking => "invoking",
            CompileStage::ParsingOutput => "parsing_output",
            CompileStage::Done => "done",
            CompileStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Tracks stage transitions of one compile call for tracing.
struct StageTracker {
    stage: CompileStage,
}

impl StageTracker {
    fn new() -> Self {
        Self {
            stage: CompileStage::Idle,
        }
    }

    fn enter(&mut self, next: CompileStage) {
        tracing::debug!(from = %self.stage, to = %next, "Compile stage");
        self.stage = next;
    }

    fn fail(&mut self, err: &SolcError) {
        tracing::debug!(stage = %self.stage, error = %err, "Compile failed");
        self.stage = CompileStage::Failed;
    }
}

/// Resolves, fetches and runs the solc release a source asks for.
///
/// The release catalog is fetched once at construction. A failed fetch leaves
/// it empty and it is fetched again the next time a version must be resolved.
pub struct SolidityCompiler {
    config: SolcConfig,
    catalog: RwLock<Arc<VersionCatalog>>,
    catalog_source: Arc<dyn CatalogSource>,
    binaries: Arc<dyn BinaryStore>,
    runner: Arc<dyn SolcRunner>,
    retry: RetryPolicy,
}

impl fmt::Debug for SolidityCompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolidityCompiler")
            .field("config", &self.config)
            .field("retry", &self.retry)
            .finish()
    }
}

impl SolidityCompiler {
    /// Compiler using HTTP sources, the disk cache and child processes.
    pub async fn new(config: SolcConfig) -> SolcResult<Self> {
        let catalog_source = Arc::new(HttpCatalogSource::from_config(&config)?);
        let binaries = Arc::new(DiskBinaryCache::from_config(&config)?);
        Ok(Self::with_components(config, catalog_source, binaries, Arc::new(ProcessRunner)).await)
    }

    /// Compiler over explicit collaborators.
    pub async fn with_components(
        config: SolcConfig,
        catalog_source: Arc<dyn CatalogSource>,
        binaries: Arc<dyn BinaryStore>,
        runner: Arc<dyn SolcRunner>,
    ) -> Self {
        let initial = match catalog_source.fetch_catalog().await {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::warn!(error = %e, "Initial release catalog fetch failed, will retry lazily");
                VersionCatalog::default()
            }
        };

        Self {
            retry: config.retry.into(),
            config,
            catalog: RwLock::new(Arc::new(initial)),
            catalog_source,
            binaries,
            runner,
        }
    }

    /// Override the retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn config(&self) -> &SolcConfig {
        &self.config
    }

    /// Current catalog, fetching it if none is held yet.
    pub async fn catalog(&self) -> SolcResult<Arc<VersionCatalog>> {
        {
            let held = self.catalog.read().await;
            if !held.is_empty() {
                return Ok(held.clone());
            }
        }

        let fetched = Arc::new(self.catalog_source.fetch_catalog().await?);
        if !fetched.is_empty() {
            *self.catalog.write().await = fetched.clone();
        }
        Ok(fetched)
    }

    /// Highest catalog release satisfying `constraint`, retrying transient
    /// catalog failures according to the retry policy.
    pub async fn resolve_version(&self, constraint: &VersionConstraint) -> SolcResult<Version> {
        let version = self
            .retry
            .run(|_attempt| async move {
                let catalog = self.catalog().await?;
                resolve(&catalog, constraint)
            })
            .await?;
        tracing::info!(constraint = %constraint, version = %version, "Resolved solc version");
        Ok(version)
    }

    /// Compile `source`. With `contract_name`, only that contract is returned;
    /// otherwise every contract in the source is.
    pub async fn compile(
        &self,
        source: &str,
        contract_name: Option<&str>,
    ) -> SolcResult<CompileResult> {
        if source.is_empty() {
            return Err(SolcError::EmptySource);
        }

        let mut tracker = StageTracker::new();
        let result = self.run_stages(&mut tracker, source, contract_name).await;
        match &result {
            Ok(_) => tracker.enter(CompileStage::Done),
            Err(e) => tracker.fail(e),
        }
        result
    }

    /// Compile `source` and return the contract called `name`.
    pub async fn compile_contract(&self, name: &str, source: &str) -> SolcResult<Contract> {
        match self.compile(source, Some(name)).await? {
            CompileResult::Single(contract) => Ok(contract),
            CompileResult::All(_) => Err(SolcError::ContractNotFound(name.to_string())),
        }
    }

    async fn run_stages(
        &self,
        tracker: &mut StageTracker,
        source: &str,
        contract_name: Option<&str>,
    ) -> SolcResult<CompileResult> {
        tracker.enter(CompileStage::ExtractingConstraint);
        let constraint = extract_constraint(source)?;

        tracker.enter(CompileStage::ResolvingVersion);
        let version = self.resolve_version(&constraint).await?;

        tracker.enter(CompileStage::LocatingBinary);
        let binary = self.binaries.locate_or_fetch(&version).await?;

        tracker.enter(CompileStage::Invoking);
        let report = invoke(self.runner.as_ref(), &binary, source, &version).await?;

        tracker.enter(CompileStage::ParsingOutput);
        report.select(contract_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names() {
        assert_eq!(CompileStage::ExtractingConstraint.to_string(), "extracting_constraint");
        assert_eq!(CompileStage::Failed.to_string(), "failed");
    }

    #[test]
    fn test_tracker_ends_in_terminal_stage() {
        let mut tracker = StageTracker::new();
        assert_eq!(tracker.stage, CompileStage::Idle);
        tracker.enter(CompileStage::ResolvingVersion);
        tracker.fail(&SolcError::ConstraintNotFound);
        assert_eq!(tracker.stage, CompileStage::Failed);
    }
}
