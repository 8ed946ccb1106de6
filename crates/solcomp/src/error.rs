//! Compiler pipeline error types

use thiserror::Error;

/// Result type for compiler pipeline operations
pub type SolcResult<T> = Result<T, SolcError>;

/// Errors raised while resolving, fetching or running solc
#[derive(Debug, Error)]
pub enum SolcError {
    #[error("solc: empty source string")]
    EmptySource,

    #[error("no version pragma found in source")]
    ConstraintNotFound,

    #[error("malformed version pragma '{expression}': {reason}")]
    ConstraintMalformed { expression: String, reason: String },

    #[error("compiler release index unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("no compiler release satisfies '{constraint}'")]
    NoSatisfyingVersion { constraint: String },

    #[error("solc binary could not be downloaded from {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("solc exited with {}\n{stderr}", exit_label(.status))]
    InvocationFailed { status: Option<i32>, stderr: String },

    #[error("malformed combined-json output: {0}")]
    OutputParse(String),

    #[error("the contract '{0}' was not found in compiled code")]
    ContractNotFound(String),
}

fn exit_label(status: &Option<i32>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}

impl SolcError {
    /// Whether a retry of the same operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, SolcError::CatalogUnavailable(_))
    }
}

impl From<serde_json::Error> for SolcError {
    fn from(err: serde_json::Error) -> Self {
        SolcError::OutputParse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_catalog_outages_are_transient() {
        assert!(SolcError::CatalogUnavailable("down".into()).is_transient());
        assert!(!SolcError::ConstraintNotFound.is_transient());
        assert!(!SolcError::NoSatisfyingVersion {
            constraint: "^0.8.0".into()
        }
        .is_transient());
    }

    #[test]
    fn invocation_failure_carries_stderr() {
        let err = SolcError::InvocationFailed {
            status: Some(1),
            stderr: "ParserError: Expected ';'".into(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("exited with 1"));
        assert!(rendered.contains("ParserError"));
    }
}
