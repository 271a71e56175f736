//! Binding and extension directives attached to contract members.

use serde::Deserialize;

/// Whether a binding targets the wrapped instance or a type's static surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingKind {
    #[default]
    Instance,
    Static,
}

/// Which kind of source member a directive targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Property,
    Method,
}

/// Redirects a contract member to a differently named, differently shaped or
/// static source member.
///
/// ```toml
/// bind = { target = "Child", kind = "property" }
/// bind = { binding = "static", owner = "demo::Helpers" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BindingDirective {
    /// Source member name; defaults to the contract member's name.
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub binding: BindingKind,
    /// Owner type for static bindings; defaults to the contract's `adapts` type.
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub kind: Option<TargetKind>,
}

impl BindingDirective {
    /// Bind to a source member with another name.
    pub fn to(target: impl Into<String>) -> Self {
        Self {
            target: Some(target.into()),
            ..Self::default()
        }
    }

    /// Bind to a static or extension member of `owner`.
    pub fn static_on(owner: impl Into<String>) -> Self {
        Self {
            binding: BindingKind::Static,
            owner: Some(owner.into()),
            ..Self::default()
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn as_property(mut self) -> Self {
        self.kind = Some(TargetKind::Property);
        self
    }

    pub fn as_method(mut self) -> Self {
        self.kind = Some(TargetKind::Method);
        self
    }

    pub fn is_static(&self) -> bool {
        self.binding == BindingKind::Static
    }

    /// The source member name for a contract member called `member`.
    pub fn target_or<'a>(&'a self, member: &'a str) -> &'a str {
        self.target.as_deref().unwrap_or(member)
    }
}

/// Where a parameter hook runs relative to the argument's coercion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    #[default]
    Before,
    After,
}

/// Names a registered hook applied to a parameter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtensionDirective {
    pub hook: String,
    #[serde(default)]
    pub placement: Placement,
}

impl ExtensionDirective {
    pub fn before(hook: impl Into<String>) -> Self {
        Self {
            hook: hook.into(),
            placement: Placement::Before,
        }
    }

    pub fn after(hook: impl Into<String>) -> Self {
        Self {
            hook: hook.into(),
            placement: Placement::After,
        }
    }
}
