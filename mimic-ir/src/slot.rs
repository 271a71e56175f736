//! Dispatch slots of a synthesized adapter.

use std::fmt;

use serde::Serialize;

/// What kind of access a slot serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlotKind {
    Get,
    Set,
    Call,
    IndexGet,
    IndexSet,
}

/// Identity of one member signature: (kind, name, arity).
///
/// Contract members flattened across inherited contracts are deduplicated by
/// this key. Indexer slots have an empty name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SlotKey {
    pub kind: SlotKind,
    pub name: String,
    pub arity: usize,
}

impl SlotKey {
    pub fn get(name: impl Into<String>) -> Self {
        Self {
            kind: SlotKind::Get,
            name: name.into(),
            arity: 0,
        }
    }

    pub fn set(name: impl Into<String>) -> Self {
        Self {
            kind: SlotKind::Set,
            name: name.into(),
            arity: 1,
        }
    }

    pub fn call(name: impl Into<String>, arity: usize) -> Self {
        Self {
            kind: SlotKind::Call,
            name: name.into(),
            arity,
        }
    }

    pub fn index_get(arity: usize) -> Self {
        Self {
            kind: SlotKind::IndexGet,
            name: String::new(),
            arity,
        }
    }

    pub fn index_set(arity: usize) -> Self {
        Self {
            kind: SlotKind::IndexSet,
            name: String::new(),
            arity,
        }
    }

    pub fn is_indexer(&self) -> bool {
        matches!(self.kind, SlotKind::IndexGet | SlotKind::IndexSet)
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SlotKind::Get => write!(f, "get {}", self.name),
            SlotKind::Set => write!(f, "set {}", self.name),
            SlotKind::Call => write!(f, "call {}/{}", self.name, self.arity),
            SlotKind::IndexGet => write!(f, "index get/{}", self.arity),
            SlotKind::IndexSet => write!(f, "index set/{}", self.arity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_display() {
        assert_eq!(SlotKey::get("Name").to_string(), "get Name");
        assert_eq!(SlotKey::call("Add", 2).to_string(), "call Add/2");
        assert_eq!(SlotKey::index_set(2).to_string(), "index set/2");
    }

    #[test]
    fn test_indexers_distinct_by_arity() {
        assert_ne!(SlotKey::index_get(1), SlotKey::index_get(2));
        assert!(SlotKey::index_get(1).is_indexer());
        assert!(!SlotKey::call("Item", 1).is_indexer());
    }
}
