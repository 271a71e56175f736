//! Validation context and utilities for manifest parsing.

use std::sync::Arc;

use miette::SourceSpan;
use mimic_core::TypeRef;

use crate::{Result, error::SourceContext};

/// Parsing and validation context that carries source information.
///
/// Holds the shared source plus the current path through the manifest, so
/// nested validation can name where an error happened.
///
/// # Example
///
/// ```ignore
/// let ctx = ParseContext::new(src, "contracts.toml");
/// ctx.validate_name("IChild", "contract")?;
///
/// let nested = ctx.push("IChild");
/// nested.validate_name("Test", "member")?;
/// ```
#[derive(Debug, Clone)]
pub struct ParseContext<'a> {
    source: Arc<SourceContext>,
    /// Path segments, e.g. ["IParent", "GetChild"]
    path: Vec<&'a str>,
}

impl<'a> ParseContext<'a> {
    pub fn new(src: &str, filename: &str) -> Self {
        Self {
            source: Arc::new(SourceContext::new(src, filename)),
            path: Vec::new(),
        }
    }

    pub fn src(&self) -> &str {
        self.source.src()
    }

    pub fn source_context(&self) -> &SourceContext {
        &self.source
    }

    /// Push a path segment and return a new context.
    pub fn push(&self, segment: &'a str) -> Self {
        let mut path = self.path.clone();
        path.push(segment);
        Self {
            source: Arc::clone(&self.source),
            path,
        }
    }

    pub fn path_string(&self) -> String {
        self.path.join(".")
    }

    /// Describe a position for error messages, e.g. "parameter in 'IParent.Add'".
    pub fn context_for(&self, kind: &str) -> String {
        if self.path.is_empty() {
            kind.to_string()
        } else {
            format!("{} in '{}'", kind, self.path_string())
        }
    }

    pub fn find_span(&self, name: &str) -> Option<SourceSpan> {
        find_name_span(self.source.src(), name)
    }

    pub fn find_value_span(&self, key: &str, value: &str) -> Option<SourceSpan> {
        find_value_span(self.source.src(), key, value)
    }

    /// Validate that a name is a valid identifier.
    pub fn validate_name(&self, name: &str, kind: &str) -> Result<()> {
        if let Some(reason) = validate_identifier(name) {
            return Err(self.source.invalid_identifier_error(
                name,
                self.context_for(kind),
                reason,
                self.find_span(name),
            ));
        }
        Ok(())
    }

    /// Parse a type expression found under `key`.
    pub fn parse_type(&self, input: &str, generics: &[String], key: &str) -> Result<TypeRef> {
        TypeRef::parse_with_generics(input, generics).map_err(|e| {
            self.source.invalid_type_error(
                input,
                self.context_for(key),
                e.reason,
                self.find_value_span(key, input),
            )
        })
    }

    /// Error for a required key that is absent.
    pub fn missing(&self, key: &str, kind: &str) -> Box<crate::Error> {
        self.source.validation_error_at(
            format!("{} is missing '{}'", self.context_for(kind), key),
            self.path.last().and_then(|name| self.find_span(name)),
        )
    }
}

/// Find the span of a name in the TOML source.
/// Searches for `.name]`, `.name.` and `name = "value"` patterns.
pub(crate) fn find_name_span(src: &str, name: &str) -> Option<SourceSpan> {
    // Table headers, e.g. [contracts.IChild] or [[contracts.IChild.members]]
    let header_patterns = [format!(".{}]", name), format!(".{}.", name)];

    for pattern in &header_patterns {
        if let Some(pos) = src.find(pattern) {
            let start = pos + 1;
            return Some(SourceSpan::from((start, name.len())));
        }
    }

    // Inline tables, e.g. variants = { Red = 0 }
    let inline_patterns = [
        (format!("{{ {} ", name), 2usize),
        (format!("{{ {}=", name), 2usize),
        (format!("{{{}=", name), 1usize),
        (format!(", {} ", name), 2usize),
        (format!(", {}=", name), 2usize),
        (format!(",{}=", name), 1usize),
    ];

    for (pattern, skip) in &inline_patterns {
        if let Some(pos) = src.find(pattern) {
            let start = pos + skip;
            return Some(SourceSpan::from((start, name.len())));
        }
    }

    find_value_span(src, "name", name)
}

/// Find the span of a quoted value assigned to `key`, e.g. `type = "Foo"`.
pub(crate) fn find_value_span(src: &str, key: &str, value: &str) -> Option<SourceSpan> {
    for quote in ['"', '\''] {
        let pattern = format!("{} = {}{}{}", key, quote, value, quote);
        if let Some(pos) = src.find(&pattern) {
            let start = pos + key.len() + 4;
            return Some(SourceSpan::from((start, value.len())));
        }
    }
    None
}

/// Find the span of a quoted string anywhere, e.g. inside an `extends` array.
pub(crate) fn find_quoted_span(src: &str, value: &str) -> Option<SourceSpan> {
    let pattern = format!("\"{}\"", value);
    src.find(&pattern)
        .map(|pos| SourceSpan::from((pos + 1, value.len())))
}

/// Validate that a name is a valid identifier.
/// Returns None if valid, Some(reason) if invalid.
pub(crate) fn validate_identifier(name: &str) -> Option<&'static str> {
    let mut chars = name.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        Some(_) => return Some("name must start with a letter or underscore"),
        None => return Some("name cannot be empty"),
    }

    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Some("name must contain only letters, numbers, and underscores");
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers() {
        assert!(validate_identifier("IChild").is_none());
        assert!(validate_identifier("get_Price").is_none());
        assert!(validate_identifier("_private").is_none());
        assert!(validate_identifier("Item2").is_none());
    }

    #[test]
    fn test_invalid_identifiers() {
        assert!(validate_identifier("").is_some());
        assert!(validate_identifier("   ").is_some());
        assert!(validate_identifier("1st").is_some());
        assert!(validate_identifier("my-contract").is_some());
        assert!(validate_identifier("demo::Child").is_some());
    }

    #[test]
    fn test_find_name_span_header() {
        let src = r#"[contracts.IChild]
adapts = "demo::Child""#;
        let span = find_name_span(src, "IChild").unwrap();
        assert_eq!(span.offset(), 11);
        assert_eq!(span.len(), 6);
    }

    #[test]
    fn test_find_name_span_member() {
        let src = r#"[[contracts.IChild.members]]
kind = "property"
name = "Test""#;
        let span = find_name_span(src, "Test").unwrap();
        assert_eq!(span.offset(), 55);
        assert_eq!(span.len(), 4);
    }

    #[test]
    fn test_find_value_span() {
        let src = r#"type = "strnig""#;
        let span = find_value_span(src, "type", "strnig").unwrap();
        assert_eq!(span.offset(), 8);
        assert_eq!(span.len(), 6);
        assert!(find_value_span(src, "returns", "strnig").is_none());
    }

    #[test]
    fn test_find_quoted_span() {
        let src = r#"extends = ["INamed", "IMissing"]"#;
        let span = find_quoted_span(src, "IMissing").unwrap();
        assert_eq!(span.offset(), 22);
    }

    #[test]
    fn test_context_for() {
        let ctx = ParseContext::new("", "contracts.toml");
        assert_eq!(ctx.context_for("contract"), "contract");
        let nested = ctx.push("IParent").push("Add");
        assert_eq!(nested.context_for("parameter"), "parameter in 'IParent.Add'");
    }
}
