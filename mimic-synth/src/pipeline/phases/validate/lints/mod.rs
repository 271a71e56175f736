//! Built-in lints.

mod adapt_target;
mod static_owner;
mod unknown_hook;

pub use adapt_target::AdaptTargetLint;
pub use static_owner::StaticOwnerLint;
pub use unknown_hook::UnknownHookLint;
