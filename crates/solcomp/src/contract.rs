//! Compiled contract artifacts

use serde::{Deserialize, Serialize};

/// A compiled contract as handed to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    /// Contract name, without the input-stream marker
    pub name: String,

    /// ABI definition, JSON-encoded
    pub abi_definition: String,

    /// Creation bytecode (`0x`-prefixed hex)
    pub deployment_bytecode: String,

    /// Deployed runtime bytecode (`0x`-prefixed hex)
    pub runtime_bytecode: String,

    /// Address once deployed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Contract {
    pub fn new(
        name: impl Into<String>,
        abi_definition: impl Into<String>,
        deployment_bytecode: impl Into<String>,
        runtime_bytecode: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            abi_definition: abi_definition.into(),
            deployment_bytecode: deployment_bytecode.into(),
            runtime_bytecode: runtime_bytecode.into(),
            address: None,
        }
    }

    /// Record the address the contract was deployed at
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

/// Result of a compile request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "contracts", rename_all = "snake_case")]
pub enum CompileResult {
    /// The single contract that was asked for by name
    Single(Contract),
    /// Every contract produced when no name was given
    All(Vec<Contract>),
}

impl CompileResult {
    pub fn contracts(&self) -> &[Contract] {
        match self {
            CompileResult::Single(contract) => std::slice::from_ref(contract),
            CompileResult::All(contracts) => contracts,
        }
    }

    pub fn into_contracts(self) -> Vec<Contract> {
        match self {
            CompileResult::Single(contract) => vec![contract],
            CompileResult::All(contracts) => contracts,
        }
    }

    pub fn single(self) -> Option<Contract> {
        match self {
            CompileResult::Single(contract) => Some(contract),
            CompileResult::All(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_unset_until_deployed() {
        let contract = Contract::new("Token", "[]", "0x6080", "0x6080");
        assert!(contract.address.is_none());
        let json = serde_json::to_value(&contract).unwrap();
        assert!(json.get("address").is_none());

        let deployed = contract.with_address("0x00000000000000000000000000000000deadbeef");
        assert!(deployed.address.is_some());
    }

    #[test]
    fn test_result_views() {
        let a = Contract::new("A", "[]", "0x01", "0x02");
        let b = Contract::new("B", "[]", "0x03", "0x04");

        let single = CompileResult::Single(a.clone());
        assert_eq!(single.contracts(), std::slice::from_ref(&a));
        assert_eq!(single.single(), Some(a.clone()));

        let all = CompileResult::All(vec![a.clone(), b.clone()]);
        assert_eq!(all.contracts().len(), 2);
        assert!(all.clone().single().is_none());
        assert_eq!(all.into_contracts(), vec![a, b]);
    }
}
