use miette::Diagnostic;
use thiserror::Error;

/// Result type for adapter synthesis and adapted calls.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum Error {
    #[error("invalid argument '{name}': {reason}")]
    #[diagnostic(code(mimic::argument))]
    Argument { name: String, reason: String },

    #[error("cannot generate adapter '{adapter}': {reason}")]
    #[diagnostic(
        code(mimic::adapter_generation),
        help("check the binding directives of the contracts being adapted")
    )]
    AdapterGeneration { adapter: String, reason: String },

    #[error("'{member}' is not implemented by '{adapter}'")]
    #[diagnostic(code(mimic::not_implemented))]
    NotImplemented { adapter: String, member: String },

    #[error("{message}")]
    #[diagnostic(code(mimic::invalid_operation))]
    InvalidOperation { message: String },

    #[error("{message}")]
    #[diagnostic(code(mimic::source))]
    Source { message: String },
}

impl Error {
    /// Create an argument error.
    pub fn argument(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Argument {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an adapter generation error.
    pub fn generation(adapter: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::AdapterGeneration {
            adapter: adapter.into(),
            reason: reason.into(),
        }
    }

    /// Create a not-implemented error for an adapter member.
    pub fn not_implemented(adapter: impl Into<String>, member: impl Into<String>) -> Self {
        Error::NotImplemented {
            adapter: adapter.into(),
            member: member.into(),
        }
    }

    /// Create an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Error::InvalidOperation {
            message: message.into(),
        }
    }

    /// Create an error raised by source member code.
    pub fn source(message: impl Into<String>) -> Self {
        Error::Source {
            message: message.into(),
        }
    }

    /// Returns true if this is a synthesis-time generation error.
    pub fn is_generation(&self) -> bool {
        matches!(self, Error::AdapterGeneration { .. })
    }

    /// Returns true if this is a runtime not-implemented error.
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Error::NotImplemented { .. })
    }
}
