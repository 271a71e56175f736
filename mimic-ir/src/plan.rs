//! Per-member binding plans.

use std::fmt;

use mimic_core::{IntWidth, TypeRef};
use serde::Serialize;

use crate::SlotKey;

/// How a bound source member is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CallShape {
    /// On the wrapped instance.
    Instance,
    /// On the owner type, without a receiver.
    Static,
    /// On the owner type, with the wrapped instance as first argument.
    Extension,
}

/// The resolved implementation of one slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BindingTarget {
    Property {
        owner: String,
        name: String,
        shape: CallShape,
    },
    Field {
        owner: String,
        name: String,
    },
    Method {
        owner: String,
        name: String,
        shape: CallShape,
    },
    Indexer {
        owner: String,
        arity: usize,
    },
    /// Owned entirely by a registered strategy.
    Strategy { name: String },
    /// Executed by a registered hook instead of a source member.
    Hook { name: String },
    /// Fails with `NotImplemented` when invoked.
    Unresolved { reason: String },
}

impl BindingTarget {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, BindingTarget::Unresolved { .. })
    }
}

impl fmt::Display for BindingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingTarget::Property { owner, name, shape } => {
                write!(f, "property {}.{} ({:?})", owner, name, shape)
            }
            BindingTarget::Field { owner, name } => write!(f, "field {}.{}", owner, name),
            BindingTarget::Method { owner, name, shape } => {
                write!(f, "method {}.{} ({:?})", owner, name, shape)
            }
            BindingTarget::Indexer { owner, arity } => write!(f, "indexer {}[{}]", owner, arity),
            BindingTarget::Strategy { name } => write!(f, "strategy {}", name),
            BindingTarget::Hook { name } => write!(f, "hook {}", name),
            BindingTarget::Unresolved { reason } => write!(f, "unresolved: {}", reason),
        }
    }
}

/// A value conversion applied at a call boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Coercion {
    None,
    /// Integral width change.
    Int { width: IntWidth },
    /// Integral (or other enum) value to an enum, narrowed to its repr.
    IntToEnum { target: String, width: IntWidth },
    /// Enum value to an integral.
    EnumToInt { width: IntWidth },
    /// Adapt a single value to a contract.
    Adapt { contract: String },
    /// Adapt every element of an array to a contract.
    AdaptArray { contract: String },
    /// Replace an adapted view with the object it wraps.
    Unwrap,
    UnwrapArray,
    /// Decided per call from the caller's type arguments.
    GenericReturn { template: TypeRef },
    /// Decided per call from the runtime shape of the value.
    Dynamic { target: TypeRef },
}

impl Coercion {
    pub fn is_none(&self) -> bool {
        matches!(self, Coercion::None)
    }
}

impl fmt::Display for Coercion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coercion::None => write!(f, "none"),
            Coercion::Int { width } => write!(f, "int({})", width.as_str()),
            Coercion::IntToEnum { target, .. } => write!(f, "enum({})", target),
            Coercion::EnumToInt { width } => write!(f, "from-enum({})", width.as_str()),
            Coercion::Adapt { contract } => write!(f, "adapt({})", contract),
            Coercion::AdaptArray { contract } => write!(f, "adapt({}[])", contract),
            Coercion::Unwrap => write!(f, "unwrap"),
            Coercion::UnwrapArray => write!(f, "unwrap[]"),
            Coercion::GenericReturn { template } => write!(f, "generic({})", template),
            Coercion::Dynamic { target } => write!(f, "dynamic({})", target),
        }
    }
}

/// Where a parameter hook runs relative to the argument's coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HookPlacement {
    Before,
    After,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HookPlan {
    pub name: String,
    pub placement: HookPlacement,
}

/// Plan for one argument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArgPlan {
    pub name: String,
    pub coercion: Coercion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hook: Option<HookPlan>,
}

/// The resolved binding of one slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberPlan {
    pub slot: SlotKey,
    /// The contract that declared the member.
    pub contract: String,
    pub target: BindingTarget,
    pub args: Vec<ArgPlan>,
    pub returns: Coercion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_hook: Option<String>,
}

impl MemberPlan {
    /// A plan for a slot with no binding.
    pub fn unresolved(slot: SlotKey, contract: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            slot,
            contract: contract.into(),
            target: BindingTarget::Unresolved {
                reason: reason.into(),
            },
            args: Vec::new(),
            returns: Coercion::None,
            return_hook: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_serializes() {
        let plan = MemberPlan {
            slot: SlotKey::call("GetChild", 0),
            contract: "IParent".into(),
            target: BindingTarget::Property {
                owner: "demo::Parent".into(),
                name: "Child".into(),
                shape: CallShape::Instance,
            },
            args: Vec::new(),
            returns: Coercion::Adapt {
                contract: "IChild".into(),
            },
            return_hook: None,
        };

        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["target"]["kind"], "property");
        assert_eq!(json["target"]["shape"], "instance");
        assert_eq!(json["returns"]["op"], "adapt");
        assert_eq!(json["slot"]["kind"], "call");
        assert!(json.get("return_hook").is_none());
    }

    #[test]
    fn test_unresolved() {
        let plan = MemberPlan::unresolved(SlotKey::get("Missing"), "IThing", "no member");
        assert!(!plan.target.is_resolved());
        assert_eq!(plan.target.to_string(), "unresolved: no member");
    }

    #[test]
    fn test_coercion_display() {
        let c = Coercion::AdaptArray {
            contract: "IChild".into(),
        };
        assert_eq!(c.to_string(), "adapt(IChild[])");
        assert!(Coercion::None.is_none());
    }
}
