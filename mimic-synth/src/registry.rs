//! Named lookup of source types, enums and contracts.

use std::sync::Arc;

use indexmap::IndexMap;
use mimic_core::{EnumInfo, TypeInfo, TypeRef};
use mimic_manifest::{ContractDescriptor, Manifest};

/// Everything the engine can resolve by name during synthesis.
///
/// Source types only need registering when they are named by a static
/// binding or by [`crate::Engine::synthesize`]; adapted instances carry their
/// own [`TypeInfo`].
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: IndexMap<String, Arc<TypeInfo>>,
    enums: IndexMap<String, EnumInfo>,
    contracts: IndexMap<String, ContractDescriptor>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_type(&mut self, info: Arc<TypeInfo>) {
        self.types.insert(info.name.clone(), info);
    }

    pub fn register_enum(&mut self, info: EnumInfo) {
        self.enums.insert(info.name.clone(), info);
    }

    pub fn register_contract(&mut self, contract: ContractDescriptor) {
        self.contracts.insert(contract.name.clone(), contract);
    }

    /// Register every contract and enum of a manifest.
    pub fn load(&mut self, manifest: Manifest) {
        self.contracts.extend(manifest.contracts);
        self.enums.extend(manifest.enums);
    }

    pub fn type_info(&self, name: &str) -> Option<&Arc<TypeInfo>> {
        self.types.get(name)
    }

    pub fn enum_info(&self, name: &str) -> Option<&EnumInfo> {
        self.enums.get(name)
    }

    pub fn contract(&self, name: &str) -> Option<&ContractDescriptor> {
        self.contracts.get(name)
    }

    pub fn contracts(&self) -> impl Iterator<Item = &ContractDescriptor> {
        self.contracts.values()
    }

    pub fn is_contract(&self, name: &str) -> bool {
        self.contracts.contains_key(name)
    }

    pub fn is_enum(&self, name: &str) -> bool {
        self.enums.contains_key(name)
    }

    /// The contract a type names, if any.
    pub fn contract_of(&self, ty: &TypeRef) -> Option<&ContractDescriptor> {
        ty.name().and_then(|name| self.contract(name))
    }

    /// The enum a type names, if any.
    pub fn enum_of(&self, ty: &TypeRef) -> Option<&EnumInfo> {
        ty.name().and_then(|name| self.enum_info(name))
    }
}
