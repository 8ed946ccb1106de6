//! solcomp - Solidity compiler resolution and invocation
//!
//! This crate compiles Solidity sources with whichever `solc` release they ask for:
//!
//! - **Constraint extraction**: reads the `pragma solidity` range from the source
//! - **Catalog & resolution**: picks the newest published release inside that range
//! - **Binary cache**: downloads each release once into a shared on-disk cache
//! - **Invocation**: runs solc over stdin and parses its `--combined-json` report
//!
//! The network, the cache and the compiler process each sit behind a trait
//! ([`CatalogSource`], [`BinaryStore`], [`SolcRunner`]) so the pipeline can be
//! driven with in-memory fakes.

#![deny(unsafe_code)]

pub mod cache;
pub mod catalog;
pub mod compiler;
pub mod config;
pub mod constraint;
pub mod contract;
pub mod error;
pub mod invoke;
pub mod output;
pub mod resolver;
pub mod retry;

// Re-exports
pub use cache::{BinaryFetcher, BinaryStore, DiskBinaryCache, HttpBinaryFetcher};
pub use catalog::{CatalogSource, HttpCatalogSource, VersionCatalog};
pub use compiler::{CompileStage, SolidityCompiler};
pub use config::{RetryConfig, SolcConfig};
pub use constraint::{extract_constraint, VersionConstraint};
pub use contract::{CompileResult, Contract};
pub use error::{SolcError, SolcResult};
pub use invoke::{build_args, invoke, ProcessRunner, RunOutput, SolcRunner};
pub use output::{strip_input_marker, CombinedOutput, CompiledEntry, ContractInfo};
pub use resolver::resolve;
pub use retry::RetryPolicy;
pub use semver::Version;
