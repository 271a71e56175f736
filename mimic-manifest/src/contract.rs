//! Contract descriptors: the named member sets objects are adapted to.

use mimic_core::TypeRef;

use crate::{BindingDirective, ExtensionDirective};

/// Which accessors a property or indexer exposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Access {
    Get,
    Set,
    #[default]
    GetSet,
}

impl Access {
    pub fn can_get(&self) -> bool {
        matches!(self, Access::Get | Access::GetSet)
    }

    pub fn can_set(&self) -> bool {
        matches!(self, Access::Set | Access::GetSet)
    }
}

/// A method or indexer parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeRef,
    /// Hook applied to the argument.
    pub extension: Option<ExtensionDirective>,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            extension: None,
        }
    }

    pub fn with_extension(mut self, extension: ExtensionDirective) -> Self {
        self.extension = Some(extension);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberKind {
    Property {
        ty: TypeRef,
        access: Access,
    },
    Method {
        params: Vec<Param>,
        returns: TypeRef,
        /// Method-level generic parameters.
        generics: Vec<String>,
    },
    Indexer {
        params: Vec<Param>,
        ty: TypeRef,
        access: Access,
    },
}

/// One member of a contract, with its directives.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractMember {
    pub name: String,
    pub kind: MemberKind,
    pub binding: Option<BindingDirective>,
    /// Hook that executes the whole member instead of a source member.
    pub extension: Option<String>,
    /// Hook applied to the source member's result.
    pub return_extension: Option<String>,
    /// Contract to adapt the result to, overriding the declared type.
    pub adapt_as: Option<String>,
}

impl ContractMember {
    fn new(name: impl Into<String>, kind: MemberKind) -> Self {
        Self {
            name: name.into(),
            kind,
            binding: None,
            extension: None,
            return_extension: None,
            adapt_as: None,
        }
    }

    pub fn property(name: impl Into<String>, ty: TypeRef, access: Access) -> Self {
        Self::new(name, MemberKind::Property { ty, access })
    }

    pub fn method(name: impl Into<String>, params: Vec<Param>, returns: TypeRef) -> Self {
        Self::new(
            name,
            MemberKind::Method {
                params,
                returns,
                generics: Vec::new(),
            },
        )
    }

    /// Indexers are named `Item` unless renamed.
    pub fn indexer(params: Vec<Param>, ty: TypeRef, access: Access) -> Self {
        Self::new("Item", MemberKind::Indexer { params, ty, access })
    }

    pub fn with_generics(mut self, names: &[&str]) -> Self {
        if let MemberKind::Method { generics, .. } = &mut self.kind {
            *generics = names.iter().map(|n| n.to_string()).collect();
        }
        self
    }

    pub fn with_binding(mut self, binding: BindingDirective) -> Self {
        self.binding = Some(binding);
        self
    }

    pub fn with_extension(mut self, hook: impl Into<String>) -> Self {
        self.extension = Some(hook.into());
        self
    }

    pub fn with_return_extension(mut self, hook: impl Into<String>) -> Self {
        self.return_extension = Some(hook.into());
        self
    }

    pub fn with_adapt_as(mut self, contract: impl Into<String>) -> Self {
        self.adapt_as = Some(contract.into());
        self
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            MemberKind::Property { .. } => "property",
            MemberKind::Method { .. } => "method",
            MemberKind::Indexer { .. } => "indexer",
        }
    }

    pub fn params(&self) -> &[Param] {
        match &self.kind {
            MemberKind::Property { .. } => &[],
            MemberKind::Method { params, .. } | MemberKind::Indexer { params, .. } => params,
        }
    }

    pub fn arity(&self) -> usize {
        self.params().len()
    }

    /// The property type, method return type or indexer element type.
    pub fn value_type(&self) -> &TypeRef {
        match &self.kind {
            MemberKind::Property { ty, .. } | MemberKind::Indexer { ty, .. } => ty,
            MemberKind::Method { returns, .. } => returns,
        }
    }

    pub fn generics(&self) -> &[String] {
        match &self.kind {
            MemberKind::Method { generics, .. } => generics,
            _ => &[],
        }
    }

    /// Identity used to deduplicate inherited members: (kind, name, arity).
    pub fn signature(&self) -> String {
        match &self.kind {
            MemberKind::Property { .. } => format!("property {}", self.name),
            MemberKind::Method { params, .. } => format!("method {}/{}", self.name, params.len()),
            MemberKind::Indexer { params, .. } => format!("indexer {}/{}", self.name, params.len()),
        }
    }

    /// Every hook named by this member's directives.
    pub fn hooks(&self) -> impl Iterator<Item = &str> {
        self.extension
            .as_deref()
            .into_iter()
            .chain(self.return_extension.as_deref())
            .chain(
                self.params()
                    .iter()
                    .filter_map(|p| p.extension.as_ref().map(|e| e.hook.as_str())),
            )
    }
}

/// A named member set with optional inheritance.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractDescriptor {
    pub name: String,
    /// Default source type when the contract is used standalone.
    pub adapts: Option<String>,
    pub extends: Vec<String>,
    /// Contract-level generic parameters.
    pub generics: Vec<String>,
    pub members: Vec<ContractMember>,
}

impl ContractDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            adapts: None,
            extends: Vec::new(),
            generics: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn adapts(mut self, source: impl Into<String>) -> Self {
        self.adapts = Some(source.into());
        self
    }

    pub fn extends(mut self, contract: impl Into<String>) -> Self {
        self.extends.push(contract.into());
        self
    }

    pub fn generic(mut self, name: impl Into<String>) -> Self {
        self.generics.push(name.into());
        self
    }

    pub fn member(mut self, member: ContractMember) -> Self {
        self.members.push(member);
        self
    }

    pub fn member_named(&self, name: &str) -> Option<&ContractMember> {
        self.members.iter().find(|m| m.name == name)
    }
}
