//! Contract manifests: a set of contracts and enums loaded together.

mod file;
mod parse;
mod validate;

pub use file::ManifestFile;
use indexmap::IndexMap;
use mimic_core::EnumInfo;
pub use parse::parse_manifest;
pub use validate::ParseContext;

use crate::ContractDescriptor;

/// Contracts and enums, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    pub contracts: IndexMap<String, ContractDescriptor>,
    pub enums: IndexMap<String, EnumInfo>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contract(mut self, contract: ContractDescriptor) -> Self {
        self.contracts.insert(contract.name.clone(), contract);
        self
    }

    pub fn with_enum(mut self, info: EnumInfo) -> Self {
        self.enums.insert(info.name.clone(), info);
        self
    }

    pub fn contract(&self, name: &str) -> Option<&ContractDescriptor> {
        self.contracts.get(name)
    }

    pub fn has_contract(&self, name: &str) -> bool {
        self.contracts.contains_key(name)
    }

    /// Add everything from `other`; later declarations replace earlier ones.
    pub fn merge(&mut self, other: Manifest) {
        self.contracts.extend(other.contracts);
        self.enums.extend(other.enums);
    }
}
