//! Running solc against a source fed over stdin

use crate::error::{SolcError, SolcResult};
use crate::output::CombinedOutput;
use crate::resolver::supports_metadata_output;
use async_trait::async_trait;
use semver::Version;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Combined-json selections understood by every supported release
const BASE_SELECTIONS: &str = "ast,bin,bin-runtime,srcmap,srcmap-runtime,abi,userdoc,devdoc";

/// Flags for `version`, without the trailing `-- -` stdin marker.
pub fn build_args(version: &Version) -> Vec<String> {
    let mut selections = BASE_SELECTIONS.to_string();
    if supports_metadata_output(version) {
        selections.push_str(",metadata,hashes");
    }
    vec![
        "--combined-json".to_string(),
        selections,
        "--optimize".to_string(),
        "--allow-paths".to_string(),
        "., ./, ../".to_string(),
    ]
}

/// Captured result of one compiler run
#[derive(Debug, Clone, Default)]
pub struct RunOutput {
    /// Exit code, None when terminated by a signal
    pub status: Option<i32>,
    pub success: bool,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// The compiler executable as an opaque capability.
#[async_trait]
pub trait SolcRunner: Send + Sync {
    async fn run(&self, binary: &Path, args: &[String], stdin: &str) -> SolcResult<RunOutput>;
}

/// Runs the binary as a child process
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl SolcRunner for ProcessRunner {
    async fn run(&self, binary: &Path, args: &[String], stdin: &str) -> SolcResult<RunOutput> {
        let mut child = Command::new(binary)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // Feed stdin concurrently so a chatty compiler cannot fill its stdout
        // pipe while we are still writing.
        let writer = child.stdin.take().map(|mut pipe| {
            let source = stdin.to_owned();
            tokio::spawn(async move {
                pipe.write_all(source.as_bytes()).await?;
                pipe.shutdown().await
            })
        });

        let output = child.wait_with_output().await?;

        if let Some(writer) = writer {
            match writer.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::debug!(error = %e, "solc closed stdin early"),
                Err(e) => tracing::debug!(error = %e, "stdin writer task failed"),
            }
        }

        Ok(RunOutput {
            status: output.status.code(),
            success: output.status.success(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// Run `binary` on `source` and parse its combined-json report.
pub async fn invoke(
    runner: &dyn SolcRunner,
    binary: &Path,
    source: &str,
    version: &Version,
) -> SolcResult<CombinedOutput> {
    let flags = build_args(version);
    let mut args = flags.clone();
    args.push("--".to_string());
    args.push("-".to_string());

    tracing::debug!(binary = %binary.display(), args = ?args, "Invoking solc");
    let output = runner.run(binary, &args, source).await?;

    if !output.success {
        return Err(SolcError::InvocationFailed {
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    CombinedOutput::parse(&output.stdout, version, &flags.join(" "))
}
