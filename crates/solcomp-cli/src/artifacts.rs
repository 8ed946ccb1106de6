//! Writing compiled artifacts to disk

use solcomp::Contract;
use std::path::{Path, PathBuf};

/// Write `<name>.abi`, `<name>.bin` and `<name>.bin-runtime` for one contract.
pub fn save_contract(out_dir: &Path, contract: &Contract) -> std::io::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)?;

    let files = [
        ("abi", &contract.abi_definition),
        ("bin", &contract.deployment_bytecode),
        ("bin-runtime", &contract.runtime_bytecode),
    ];

    let mut written = Vec::with_capacity(files.len());
    for (extension, contents) in files {
        let path = out_dir.join(format!("{}.{}", contract.name, extension));
        std::fs::write(&path, contents)?;
        written.push(path);
    }
    Ok(written)
}

/// Save every contract. A failure is logged and does not stop the others;
/// the names that could not be saved are returned.
pub fn save_all(out_dir: &Path, contracts: &[Contract]) -> Vec<String> {
    let mut failed = Vec::new();
    for contract in contracts {
        match save_contract(out_dir, contract) {
            Ok(paths) => {
                tracing::info!(contract = %contract.name, files = paths.len(), "Saved artifacts")
            }
            Err(e) => {
                tracing::warn!(contract = %contract.name, error = %e, "Failed to save artifacts");
                failed.push(contract.name.clone());
            }
        }
    }
    failed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_contract_files() {
        let dir = tempfile::tempdir().unwrap();
        let contract = Contract::new("Token", "[]", "0x6080", "0x6081");

        let paths = save_contract(dir.path(), &contract).unwrap();

        assert_eq!(paths.len(), 3);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("Token.bin-runtime")).unwrap(),
            "0x6081"
        );
        assert_eq!(std::fs::read_to_string(dir.path().join("Token.abi")).unwrap(), "[]");
    }

    #[test]
    fn test_one_failure_does_not_abort_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        // A directory squatting on A's artifact path makes its save fail.
        std::fs::create_dir_all(dir.path().join("A.abi")).unwrap();

        let contracts = vec![
            Contract::new("A", "[]", "0x01", "0x02"),
            Contract::new("B", "[]", "0x03", "0x04"),
        ];
        let failed = save_all(dir.path(), &contracts);

        assert_eq!(failed, vec!["A".to_string()]);
        assert!(dir.path().join("B.bin").is_file());
    }
}
