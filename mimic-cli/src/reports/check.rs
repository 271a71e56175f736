//! Check command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// Report data from manifest validation.
#[derive(Debug)]
pub struct CheckReport {
    /// Path to the manifest file.
    pub config_path: PathBuf,
    /// Problems that would make synthesis fail.
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub contracts: Vec<ContractSummary>,
    pub enums: Vec<EnumSummary>,
    /// Hooks the host must register before adapting.
    pub hooks: Vec<String>,
    /// Types the host must register for static bindings.
    pub static_owners: Vec<String>,
}

/// One declared contract.
#[derive(Debug)]
pub struct ContractSummary {
    pub name: String,
    pub adapts: Option<String>,
    pub extends: Vec<String>,
    /// Slots an adapter for this contract alone exposes, inherited ones included.
    pub slots: usize,
}

#[derive(Debug)]
pub struct EnumSummary {
    pub name: String,
    pub variants: usize,
}

impl CheckReport {
    /// Whether the check passed (no errors).
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

fn plural(count: usize, noun: &str) -> String {
    format!("{} {}{}", count, noun, if count == 1 { "" } else { "s" })
}

impl Report for CheckReport {
    fn render(&self, out: &mut dyn Output) {
        for error in &self.errors {
            out.error(error);
        }
        for warning in &self.warnings {
            out.warning(warning);
        }
        if !self.is_valid() {
            return;
        }
        if !self.warnings.is_empty() {
            out.newline();
        }

        out.preformatted(&format!("✓ {} is valid", self.config_path.display()));
        out.newline();

        out.preformatted(&format!("  {}:", plural(self.contracts.len(), "contract")));
        for contract in &self.contracts {
            let mut relations = Vec::new();
            if let Some(adapts) = &contract.adapts {
                relations.push(format!("adapts {}", adapts));
            }
            if !contract.extends.is_empty() {
                relations.push(format!("extends {}", contract.extends.join(", ")));
            }
            let relations = if relations.is_empty() {
                String::new()
            } else {
                format!(" ({})", relations.join(", "))
            };
            out.preformatted(&format!(
                "    {}{} - {}",
                contract.name,
                relations,
                plural(contract.slots, "slot")
            ));
        }

        if !self.enums.is_empty() {
            out.newline();
            out.preformatted(&format!("  {}:", plural(self.enums.len(), "enum")));
            for info in &self.enums {
                out.preformatted(&format!(
                    "    {} ({})",
                    info.name,
                    plural(info.variants, "variant")
                ));
            }
        }

        if !self.hooks.is_empty() {
            out.newline();
            out.preformatted("  Hooks to register:");
            for hook in &self.hooks {
                out.preformatted(&format!("    - {}", hook));
            }
        }

        if !self.static_owners.is_empty() {
            out.newline();
            out.preformatted("  Static owners to register:");
            for owner in &self.static_owners {
                out.preformatted(&format!("    - {}", owner));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::output::BufferOutput;

    fn report() -> CheckReport {
        CheckReport {
            config_path: PathBuf::from("mimic.toml"),
            errors: Vec::new(),
            warnings: Vec::new(),
            contracts: vec![
                ContractSummary {
                    name: "INamed".into(),
                    adapts: None,
                    extends: Vec::new(),
                    slots: 1,
                },
                ContractSummary {
                    name: "IPerson".into(),
                    adapts: Some("demo::Person".into()),
                    extends: vec!["INamed".into()],
                    slots: 3,
                },
            ],
            enums: vec![EnumSummary {
                name: "Mood".into(),
                variants: 2,
            }],
            hooks: vec!["trim".into()],
            static_owners: Vec::new(),
        }
    }

    #[test]
    fn test_render_valid() {
        let rendered = BufferOutput::render(&report());
        let expected = [
            "✓ mimic.toml is valid",
            "",
            "  2 contracts:",
            "    INamed - 1 slot",
            "    IPerson (adapts demo::Person, extends INamed) - 3 slots",
            "",
            "  1 enum:",
            "    Mood (2 variants)",
            "",
            "  Hooks to register:",
            "    - trim",
        ]
        .join("\n");

        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_render_errors_only() {
        let mut report = report();
        report.errors.push("'IHelpers.Version' has no owner".into());

        assert_eq!(
            BufferOutput::render(&report),
            "error: 'IHelpers.Version' has no owner"
        );
    }
}
