//! `--combined-json` report parsing.
//!
//! Before 0.8.0 solc embeds `abi`, `userdoc` and `devdoc` as JSON-encoded
//! strings; from 0.8.0 on they are inline JSON. The compiler version picks the
//! expected shape, and the other shape is still accepted when it shows up.

use crate::contract::{CompileResult, Contract};
use crate::error::{SolcError, SolcResult};
use semver::Version;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Marker solc prefixes to identifiers of contracts read from stdin
pub const STDIN_MARKER: &str = "<stdin>:";

/// Remove a leading [`STDIN_MARKER`]; anything else is returned unchanged.
pub fn strip_input_marker(identifier: &str) -> &str {
    identifier.strip_prefix(STDIN_MARKER).unwrap_or(identifier)
}

#[derive(Debug, Deserialize)]
struct RawReport {
    contracts: BTreeMap<String, RawEntry>,
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    abi: Option<Value>,
    bin: Option<String>,
    #[serde(rename = "bin-runtime")]
    bin_runtime: Option<String>,
    #[serde(default)]
    srcmap: Option<String>,
    #[serde(rename = "srcmap-runtime", default)]
    srcmap_runtime: Option<String>,
    #[serde(default)]
    hashes: BTreeMap<String, String>,
    #[serde(default)]
    metadata: Option<String>,
    #[serde(default)]
    userdoc: Option<Value>,
    #[serde(default)]
    devdoc: Option<Value>,
}

/// Auxiliary compiler output for one contract
#[derive(Debug, Clone, PartialEq)]
pub struct ContractInfo {
    pub language: String,
    pub language_version: String,
    pub compiler_version: String,
    pub compiler_options: String,
    pub src_map: Option<String>,
    pub src_map_runtime: Option<String>,
    /// Function signature to 4-byte selector
    pub hashes: BTreeMap<String, String>,
    pub metadata: Option<String>,
    pub user_doc: Value,
    pub developer_doc: Value,
}

/// One contract from the combined report
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledEntry {
    pub abi: Value,
    /// Creation bytecode (`0x`-prefixed)
    pub code: String,
    /// Runtime bytecode (`0x`-prefixed)
    pub runtime_code: String,
    pub info: ContractInfo,
}

/// Parsed combined-json report, keyed by compiler-assigned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedOutput {
    entries: BTreeMap<String, CompiledEntry>,
}

impl CombinedOutput {
    /// Parse raw stdout from a `--combined-json` run of `version`.
    ///
    /// Every entry must carry `abi`, `bin` and `bin-runtime`; a missing one
    /// fails the whole report.
    pub fn parse(stdout: &[u8], version: &Version, compiler_options: &str) -> SolcResult<Self> {
        let report: RawReport = serde_json::from_slice(stdout)?;
        let legacy = *version < Version::new(0, 8, 0);
        let compiler_version = report.version.unwrap_or_else(|| version.to_string());

        let entries = report
            .contracts
            .into_iter()
            .map(|(id, raw)| {
                let entry = build_entry(&id, raw, legacy, version, &compiler_version, compiler_options)?;
                Ok((id, entry))
            })
            .collect::<SolcResult<BTreeMap<_, _>>>()?;

        Ok(Self { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries in identifier order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &CompiledEntry)> {
        self.entries.iter().map(|(id, entry)| (id.as_str(), entry))
    }

    /// First entry whose stripped identifier equals `name`
    pub fn find(&self, name: &str) -> Option<&CompiledEntry> {
        self.entries
            .iter()
            .find(|(id, _)| strip_input_marker(id) == name)
            .map(|(_, entry)| entry)
    }

    /// Convert to caller-facing contracts.
    ///
    /// With a name, only that contract is returned and a missing one fails with
    /// [`SolcError::ContractNotFound`]. Without one (or with an empty name),
    /// every entry is returned.
    pub fn select(self, requested: Option<&str>) -> SolcResult<CompileResult> {
        match requested.filter(|name| !name.is_empty()) {
            Some(name) => {
                let entry = self
                    .find(name)
                    .ok_or_else(|| SolcError::ContractNotFound(name.to_string()))?;
                Ok(CompileResult::Single(to_contract(name, entry)?))
            }
            None => self
                .entries
                .iter()
                .map(|(id, entry)| to_contract(strip_input_marker(id), entry))
                .collect::<SolcResult<Vec<_>>>()
                .map(CompileResult::All),
        }
    }
}

fn to_contract(name: &str, entry: &CompiledEntry) -> SolcResult<Contract> {
    let abi = serde_json::to_string(&entry.abi)?;
    Ok(Contract::new(
        name,
        abi,
        entry.code.clone(),
        entry.runtime_code.clone(),
    ))
}

fn build_entry(
    id: &str,
    raw: RawEntry,
    legacy: bool,
    version: &Version,
    compiler_version: &str,
    compiler_options: &str,
) -> SolcResult<CompiledEntry> {
    let missing = |field: &str| SolcError::OutputParse(format!("{id}: missing '{field}'"));

    let abi = raw.abi.ok_or_else(|| missing("abi"))?;
    let bin = raw.bin.ok_or_else(|| missing("bin"))?;
    let bin_runtime = raw.bin_runtime.ok_or_else(|| missing("bin-runtime"))?;

    Ok(CompiledEntry {
        abi: decode_embedded(id, "abi", abi, legacy)?,
        code: hex_prefixed(&bin),
        runtime_code: hex_prefixed(&bin_runtime),
        info: ContractInfo {
            language: "Solidity".to_string(),
            language_version: version.to_string(),
            compiler_version: compiler_version.to_string(),
            compiler_options: compiler_options.to_string(),
            src_map: raw.srcmap,
            src_map_runtime: raw.srcmap_runtime,
            hashes: raw.hashes,
            metadata: raw.metadata,
            user_doc: decode_optional(id, "userdoc", raw.userdoc, legacy)?,
            developer_doc: decode_optional(id, "devdoc", raw.devdoc, legacy)?,
        },
    })
}

/// Unwrap a JSON document that older compilers embed as a string.
fn decode_embedded(id: &str, field: &str, value: Value, legacy: bool) -> SolcResult<Value> {
    match value {
        Value::String(text) => serde_json::from_str(&text).map_err(|e| {
            let era = if legacy { "pre-0.8" } else { "0.8+" };
            SolcError::OutputParse(format!("{id}: {field} is not valid JSON ({era} report): {e}"))
        }),
        other => Ok(other),
    }
}

fn decode_optional(id: &str, field: &str, value: Option<Value>, legacy: bool) -> SolcResult<Value> {
    match value {
        Some(value) => decode_embedded(id, field, value, legacy),
        None => Ok(Value::Null),
    }
}

fn hex_prefixed(code: &str) -> String {
    format!("0x{code}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MODERN_REPORT: &str = r#"{
        "contracts": {
            "<stdin>:A": {
                "abi": [{"inputs": [], "name": "a", "outputs": [], "stateMutability": "nonpayable", "type": "function"}],
                "bin": "6080a0",
                "bin-runtime": "6080a1",
                "srcmap": "0:1:0",
                "srcmap-runtime": "0:1:0",
                "hashes": {"a()": "0dbe671f"},
                "metadata": "{\"compiler\":{\"version\":\"0.8.21\"}}",
                "userdoc": {"kind": "user", "methods": {}},
                "devdoc": {"kind": "dev", "methods": {}}
            },
            "<stdin>:B": {
                "abi": [],
                "bin": "6080b0",
                "bin-runtime": "6080b1"
            }
        },
        "sourceList": ["<stdin>"],
        "version": "0.8.21+commit.d9974bed.Linux.g++"
    }"#;

    const LEGACY_REPORT: &str = r#"{
        "contracts": {
            "<stdin>:Legacy": {
                "abi": "[{\"constant\":true,\"inputs\":[],\"name\":\"x\",\"outputs\":[],\"type\":\"function\"}]",
                "bin": "60606040",
                "bin-runtime": "60606041",
                "userdoc": "{\"methods\":{}}",
                "devdoc": "{\"methods\":{}}"
            }
        },
        "version": "0.4.26+commit.4563c3fc.Linux.g++"
    }"#;

    fn modern() -> CombinedOutput {
        CombinedOutput::parse(MODERN_REPORT.as_bytes(), &Version::new(0, 8, 21), "--optimize").unwrap()
    }

    #[test]
    fn test_strip_is_exact_prefix() {
        assert_eq!(strip_input_marker("<stdin>:Foo"), "Foo");
        assert_eq!(strip_input_marker("Foo"), "Foo");
        assert_eq!(strip_input_marker("lib.sol:<stdin>:Foo"), "lib.sol:<stdin>:Foo");
        assert_eq!(strip_input_marker("<stdin>Foo"), "<stdin>Foo");
    }

    #[test]
    fn test_modern_report_fields() {
        let output = modern();
        assert_eq!(output.len(), 2);

        let a = output.find("A").unwrap();
        assert_eq!(a.code, "0x6080a0");
        assert_eq!(a.runtime_code, "0x6080a1");
        assert_eq!(a.abi[0]["name"], "a");
        assert_eq!(a.info.hashes.get("a()").map(String::as_str), Some("0dbe671f"));
        assert_eq!(a.info.compiler_version, "0.8.21+commit.d9974bed.Linux.g++");
        assert_eq!(a.info.compiler_options, "--optimize");
        assert_eq!(a.info.user_doc["kind"], "user");

        let b = output.find("B").unwrap();
        assert!(b.info.hashes.is_empty());
        assert_eq!(b.info.user_doc, Value::Null);
    }

    #[test]
    fn test_legacy_report_decodes_embedded_json() {
        let output =
            CombinedOutput::parse(LEGACY_REPORT.as_bytes(), &Version::new(0, 4, 26), "").unwrap();
        let entry = output.find("Legacy").unwrap();
        assert!(entry.abi.is_array());
        assert_eq!(entry.abi[0]["name"], "x");
        assert_eq!(entry.info.developer_doc, json!({"methods": {}}));
        assert_eq!(entry.code, "0x60606040");
    }

    #[test]
    fn test_select_by_name() {
        let result = modern().select(Some("A")).unwrap();
        let contract = result.single().unwrap();
        assert_eq!(contract.name, "A");
        assert_eq!(contract.deployment_bytecode, "0x6080a0");
        assert_eq!(contract.runtime_bytecode, "0x6080a1");
        let abi: Value = serde_json::from_str(&contract.abi_definition).unwrap();
        assert_eq!(abi[0]["type"], "function");
        assert!(contract.address.is_none());
    }

    #[test]
    fn test_select_all() {
        for requested in [None, Some("")] {
            let result = modern().select(requested).unwrap();
            let names: Vec<&str> = result.contracts().iter().map(|c| c.name.as_str()).collect();
            assert_eq!(names, vec!["A", "B"]);
            assert!(matches!(result, CompileResult::All(_)));
        }
    }

    #[test]
    fn test_select_missing_name() {
        let err = modern().select(Some("C")).unwrap_err();
        match err {
            SolcError::ContractNotFound(name) => assert_eq!(name, "C"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_missing_bytecode_fails_whole_report() {
        let report = r#"{"contracts": {"<stdin>:A": {"abi": [], "bin": "00"}}}"#;
        let err = CombinedOutput::parse(report.as_bytes(), &Version::new(0, 8, 0), "").unwrap_err();
        match err {
            SolcError::OutputParse(message) => assert!(message.contains("bin-runtime")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_malformed_json() {
        let err = CombinedOutput::parse(b"Warning: not json", &Version::new(0, 8, 0), "").unwrap_err();
        assert!(matches!(err, SolcError::OutputParse(_)));
    }

    #[test]
    fn test_undecodable_embedded_abi() {
        let report = r#"{"contracts": {"<stdin>:A": {"abi": "[{", "bin": "", "bin-runtime": ""}}}"#;
        let err = CombinedOutput::parse(report.as_bytes(), &Version::new(0, 5, 0), "").unwrap_err();
        assert!(matches!(err, SolcError::OutputParse(_)));
    }
}
