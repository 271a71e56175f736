use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for manifest operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Source context for error reporting.
///
/// Holds the manifest text and filename so error factories don't need them
/// passed separately.
///
/// # Example
///
/// ```ignore
/// let ctx = SourceContext::new(content, "contracts.toml");
/// ctx.validation_error("contract has no members");
/// ctx.unknown_contract_error("IMissing", "extends of 'IChild'", span);
/// ```
#[derive(Debug, Clone)]
pub struct SourceContext {
    src: String,
    filename: String,
}

impl SourceContext {
    pub fn new(src: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            filename: filename.into(),
        }
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Create a NamedSource for miette error reporting.
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.filename, self.src.clone())
    }

    /// Create a parse error from a toml error.
    pub fn parse_error(&self, source: toml::de::Error) -> Box<Error> {
        let span = source.span().map(SourceSpan::from);
        Box::new(Error::Parse {
            src: self.named_source(),
            span,
            source,
        })
    }

    pub fn validation_error(&self, message: impl Into<String>) -> Box<Error> {
        Box::new(Error::Validation {
            src: self.named_source(),
            span: None,
            message: message.into(),
        })
    }

    pub fn validation_error_at(
        &self,
        message: impl Into<String>,
        span: Option<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::Validation {
            src: self.named_source(),
            span,
            message: message.into(),
        })
    }

    pub fn invalid_type_error(
        &self,
        ty: impl Into<String>,
        context: impl Into<String>,
        reason: impl Into<String>,
        span: Option<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::InvalidType {
            src: self.named_source(),
            span,
            ty: ty.into(),
            context: context.into(),
            reason: reason.into(),
        })
    }

    pub fn unknown_contract_error(
        &self,
        name: impl Into<String>,
        context: impl Into<String>,
        span: Option<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::UnknownContract {
            src: self.named_source(),
            span,
            name: name.into(),
            context: context.into(),
        })
    }

    pub fn duplicate_member_error(
        &self,
        contract: impl Into<String>,
        signature: impl Into<String>,
        span: Option<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::DuplicateMember {
            src: self.named_source(),
            span,
            contract: contract.into(),
            signature: signature.into(),
        })
    }

    pub fn inheritance_cycle_error(
        &self,
        cycle: &[String],
        span: Option<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::InheritanceCycle {
            src: self.named_source(),
            span,
            cycle: cycle.join(" -> "),
        })
    }

    pub fn invalid_identifier_error(
        &self,
        name: impl Into<String>,
        context: impl Into<String>,
        reason: impl Into<String>,
        span: Option<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::InvalidIdentifier {
            src: self.named_source(),
            span,
            name: name.into(),
            context: context.into(),
            reason: reason.into(),
        })
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    #[diagnostic(code(mimic::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse contract manifest")]
    #[diagnostic(code(mimic::parse_error))]
    Parse {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid type '{ty}' in {context}")]
    #[diagnostic(
        code(mimic::invalid_type),
        help(
            "{reason}. Valid types are: void, bool, i8, i16, i32, i64, int, float, string, object, callback, a type name, T[] and future<T>"
        )
    )]
    InvalidType {
        #[source_code]
        src: NamedSource<String>,
        #[label("unknown type")]
        span: Option<SourceSpan>,
        ty: String,
        context: String,
        reason: String,
    },

    #[error("unknown contract '{name}' in {context}")]
    #[diagnostic(
        code(mimic::unknown_contract),
        help("declare it with a [contracts.{name}] table")
    )]
    UnknownContract {
        #[source_code]
        src: NamedSource<String>,
        #[label("not declared in this manifest")]
        span: Option<SourceSpan>,
        name: String,
        context: String,
    },

    #[error("contract '{contract}' declares '{signature}' more than once")]
    #[diagnostic(code(mimic::duplicate_member))]
    DuplicateMember {
        #[source_code]
        src: NamedSource<String>,
        #[label("duplicate declaration")]
        span: Option<SourceSpan>,
        contract: String,
        signature: String,
    },

    #[error("contract inheritance cycle: {cycle}")]
    #[diagnostic(
        code(mimic::inheritance_cycle),
        help("remove one of the 'extends' entries on the cycle")
    )]
    InheritanceCycle {
        #[source_code]
        src: NamedSource<String>,
        #[label("cycle starts here")]
        span: Option<SourceSpan>,
        cycle: String,
    },

    #[error("{message}")]
    #[diagnostic(code(mimic::validation_error))]
    Validation {
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: Option<SourceSpan>,
        message: String,
    },

    #[error("invalid {context} name '{name}'")]
    #[diagnostic(help(
        "{reason}. Use only letters, numbers, and underscores, starting with a letter or underscore."
    ))]
    InvalidIdentifier {
        #[source_code]
        src: NamedSource<String>,
        #[label("invalid identifier")]
        span: Option<SourceSpan>,
        name: String,
        context: String,
        reason: String,
    },
}
