//! Declarative contract metadata for the mimic adapter engine.
//!
//! Contracts can be built in code with [`ContractDescriptor`] or declared in a
//! TOML contract manifest:
//!
//! ```toml
//! [contracts.IChild]
//! adapts = "demo::Child"
//!
//! [[contracts.IChild.members]]
//! kind = "property"
//! name = "Test"
//! type = "string"
//! access = "get"
//! ```

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod contract;
mod directive;
mod error;
mod manifest;

pub use contract::{Access, ContractDescriptor, ContractMember, MemberKind, Param};
pub use directive::{BindingDirective, BindingKind, ExtensionDirective, Placement, TargetKind};
pub use error::{Error, Result, SourceContext};
pub use manifest::{Manifest, ManifestFile, ParseContext, parse_manifest};
