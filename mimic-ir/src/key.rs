//! Cache identity of a synthesized adapter type.

use std::fmt;

use serde::Serialize;

/// (source type, ordered contract set) identity of an adapter type.
///
/// Contract names are deduplicated keeping their first occurrence, so
/// `[A, B, A]` and `[A, B]` share a key while `[B, A]` does not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SynthesisKey {
    pub source: String,
    pub contracts: Vec<String>,
}

impl SynthesisKey {
    pub fn new<S: Into<String>>(
        source: impl Into<String>,
        contracts: impl IntoIterator<Item = S>,
    ) -> Self {
        let mut deduped: Vec<String> = Vec::new();
        for contract in contracts {
            let contract = contract.into();
            if !deduped.contains(&contract) {
                deduped.push(contract);
            }
        }

        Self {
            source: source.into(),
            contracts: deduped,
        }
    }

    /// Deterministic name of the adapter type for this key.
    pub fn canonical_name(&self) -> String {
        format!("{}@{}", self.contracts.join("+"), self.source)
    }
}

impl fmt::Display for SynthesisKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_name())
    }
}
