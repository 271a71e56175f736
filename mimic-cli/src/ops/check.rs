//! Check operation - manifest validation.

use std::{collections::BTreeSet, path::Path};

use eyre::{Context, Result};
use mimic_manifest::Manifest;
use mimic_synth::{TypeRegistry, outline};
use tracing::debug;

use crate::reports::{CheckReport, ContractSummary, EnumSummary};

/// Execute the check operation.
///
/// The manifest has already passed parsing, so this looks for problems that
/// only surface at synthesis time and summarizes what the manifest declares.
pub fn check(manifest: &Manifest, config_path: &Path) -> Result<CheckReport> {
    let mut registry = TypeRegistry::new();
    registry.load(manifest.clone());

    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut hooks = BTreeSet::new();
    let mut static_owners = BTreeSet::new();
    let mut contracts = Vec::new();

    for contract in manifest.contracts.values() {
        let slots = outline(&registry, &[contract.name.as_str()])
            .wrap_err_with(|| format!("Failed to outline '{}'", contract.name))?;
        debug!(contract = %contract.name, slots = slots.len(), "outlined contract");

        if contract.members.is_empty() && contract.extends.is_empty() {
            warnings.push(format!("'{}' declares no members", contract.name));
        }

        for member in &contract.members {
            hooks.extend(member.hooks().map(str::to_string));

            let Some(binding) = member.binding.as_ref().filter(|b| b.is_static()) else {
                continue;
            };
            match binding.owner.as_deref().or(contract.adapts.as_deref()) {
                Some(owner) => {
                    static_owners.insert(owner.to_string());
                }
                None => errors.push(format!(
                    "'{}.{}' binds statically but names no owner, and '{}' has no 'adapts' type",
                    contract.name, member.name, contract.name
                )),
            }
        }

        contracts.push(ContractSummary {
            name: contract.name.clone(),
            adapts: contract.adapts.clone(),
            extends: contract.extends.clone(),
            slots: slots.len(),
        });
    }

    let enums = manifest
        .enums
        .values()
        .map(|info| EnumSummary {
            name: info.name.clone(),
            variants: info.variants.len(),
        })
        .collect();

    Ok(CheckReport {
        config_path: config_path.to_path_buf(),
        errors,
        warnings,
        contracts,
        enums,
        hooks: hooks.into_iter().collect(),
        static_owners: static_owners.into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use mimic_manifest::ManifestFile;

    use super::*;

    const MANIFEST: &str = r#"
        [contracts.INamed]

        [[contracts.INamed.members]]
        name = "Name"
        kind = "property"
        type = "string"
        access = "get"

        [contracts.IPerson]
        adapts = "demo::Person"
        extends = ["INamed"]

        [[contracts.IPerson.members]]
        name = "Greet"
        kind = "method"
        returns = "string"
        returns_extension = "shout"
        params = [{ name = "other", type = "string", extension = { hook = "trim" } }]

        [[contracts.IPerson.members]]
        name = "Version"
        kind = "property"
        type = "string"
        access = "get"
        bind = { binding = "static", owner = "demo::Helpers" }

        [contracts.IEmpty]

        [enums.Mood]
        repr = "i32"
        variants = { Calm = 0, Loud = 1 }
    "#;

    fn manifest(content: &str) -> Manifest {
        content.parse().expect("Failed to parse test manifest")
    }

    #[test]
    fn test_summarizes_contracts() {
        let report = check(&manifest(MANIFEST), Path::new("mimic.toml")).unwrap();

        assert!(report.is_valid());
        let names: Vec<_> = report.contracts.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["INamed", "IPerson", "IEmpty"]);
        assert_eq!(report.contracts[1].slots, 3);
        assert_eq!(report.enums[0].variants, 2);
        assert_eq!(report.hooks, vec!["shout", "trim"]);
        assert_eq!(report.static_owners, vec!["demo::Helpers"]);
        assert_eq!(report.warnings, vec!["'IEmpty' declares no members"]);
    }

    #[test]
    fn test_manifest_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mimic.toml");
        std::fs::write(&path, MANIFEST).unwrap();

        let file = ManifestFile::open(&path).unwrap();
        let report = check(file.manifest(), &path).unwrap();

        assert_eq!(report.config_path, path);
        assert_eq!(report.contracts.len(), 3);
    }

    #[test]
    fn test_static_binding_without_owner() {
        let content = r#"
            [contracts.IHelpers]

            [[contracts.IHelpers.members]]
            name = "Version"
            kind = "property"
            type = "string"
            access = "get"
            bind = { binding = "static" }
        "#;
        let report = check(&manifest(content), Path::new("mimic.toml")).unwrap();

        assert!(!report.is_valid());
        assert!(report.errors[0].contains("IHelpers.Version"));
    }
}
