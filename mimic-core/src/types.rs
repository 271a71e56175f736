//! Type expressions used in contract and source signatures.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Width of an integral type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntWidth {
    I8,
    I16,
    I32,
    I64,
}

impl IntWidth {
    /// Get the lowercase string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            IntWidth::I8 => "i8",
            IntWidth::I16 => "i16",
            IntWidth::I32 => "i32",
            IntWidth::I64 => "i64",
        }
    }

    /// Parse a width name (`int` is an alias for `i64`).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "i8" => Some(IntWidth::I8),
            "i16" => Some(IntWidth::I16),
            "i32" => Some(IntWidth::I32),
            "i64" | "int" => Some(IntWidth::I64),
            _ => None,
        }
    }

    /// Truncate a value to this width, wrapping like a numeric cast.
    pub fn narrow(&self, value: i64) -> i64 {
        match self {
            IntWidth::I8 => value as i8 as i64,
            IntWidth::I16 => value as i16 as i64,
            IntWidth::I32 => value as i32 as i64,
            IntWidth::I64 => value,
        }
    }
}

/// A type expression.
///
/// `Named` covers everything resolved by name at synthesis time: source
/// types, contracts and enums.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum TypeRef {
    Void,
    Bool,
    Int(IntWidth),
    Float,
    String,
    /// Any value; no static shape.
    Object,
    /// A completion callback, as taken by `Begin*` methods.
    Callback,
    Named(String),
    Array(Box<TypeRef>),
    Future(Box<TypeRef>),
    /// A generic type parameter of the enclosing method or contract.
    Generic(String),
}

impl TypeRef {
    pub const I8: TypeRef = TypeRef::Int(IntWidth::I8);
    pub const I16: TypeRef = TypeRef::Int(IntWidth::I16);
    pub const I32: TypeRef = TypeRef::Int(IntWidth::I32);
    pub const I64: TypeRef = TypeRef::Int(IntWidth::I64);

    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn array(element: TypeRef) -> Self {
        TypeRef::Array(Box::new(element))
    }

    pub fn future(output: TypeRef) -> Self {
        TypeRef::Future(Box::new(output))
    }

    pub fn generic(name: impl Into<String>) -> Self {
        TypeRef::Generic(name.into())
    }

    /// Parse a type expression where the given names are generic parameters.
    pub fn parse_with_generics(
        input: &str,
        generics: &[String],
    ) -> std::result::Result<Self, TypeParseError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(TypeParseError::new(input, "type is empty"));
        }

        if let Some(element) = s.strip_suffix("[]") {
            return Ok(TypeRef::array(Self::parse_with_generics(element, generics)?));
        }

        if let Some(inner) = s.strip_prefix("future<").and_then(|r| r.strip_suffix('>')) {
            return Ok(TypeRef::future(Self::parse_with_generics(inner, generics)?));
        }

        if let Some(width) = IntWidth::parse(s) {
            return Ok(TypeRef::Int(width));
        }

        match s {
            "void" => return Ok(TypeRef::Void),
            "bool" => return Ok(TypeRef::Bool),
            "float" | "f64" => return Ok(TypeRef::Float),
            "string" => return Ok(TypeRef::String),
            "object" => return Ok(TypeRef::Object),
            "callback" => return Ok(TypeRef::Callback),
            _ => {}
        }

        let valid = s.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_')
            && s
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '_' | ':' | '.'));
        if !valid {
            return Err(TypeParseError::new(input, "not a valid type name"));
        }

        if generics.iter().any(|g| g == s) {
            Ok(TypeRef::Generic(s.to_string()))
        } else {
            Ok(TypeRef::Named(s.to_string()))
        }
    }

    /// The name of a `Named` type.
    pub fn name(&self) -> Option<&str> {
        match self {
            TypeRef::Named(name) => Some(name),
            _ => None,
        }
    }

    /// The element type of an array.
    pub fn element(&self) -> Option<&TypeRef> {
        match self {
            TypeRef::Array(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Void)
    }

    /// Returns true if this type mentions the given generic parameter.
    pub fn mentions_generic(&self, param: &str) -> bool {
        match self {
            TypeRef::Generic(name) => name == param,
            TypeRef::Array(inner) | TypeRef::Future(inner) => inner.mentions_generic(param),
            _ => false,
        }
    }

    /// Returns true if this type mentions any generic parameter.
    pub fn is_generic(&self) -> bool {
        match self {
            TypeRef::Generic(_) => true,
            TypeRef::Array(inner) | TypeRef::Future(inner) => inner.is_generic(),
            _ => false,
        }
    }

    /// Replace generic parameters with the bound types.
    pub fn substitute(&self, bindings: &[(String, TypeRef)]) -> TypeRef {
        match self {
            TypeRef::Generic(name) => bindings
                .iter()
                .find(|(param, _)| param == name)
                .map(|(_, ty)| ty.clone())
                .unwrap_or_else(|| self.clone()),
            TypeRef::Array(inner) => TypeRef::array(inner.substitute(bindings)),
            TypeRef::Future(inner) => TypeRef::future(inner.substitute(bindings)),
            _ => self.clone(),
        }
    }
}

impl FromStr for TypeRef {
    type Err = TypeParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse_with_generics(s, &[])
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Void => write!(f, "void"),
            TypeRef::Bool => write!(f, "bool"),
            TypeRef::Int(width) => write!(f, "{}", width.as_str()),
            TypeRef::Float => write!(f, "float"),
            TypeRef::String => write!(f, "string"),
            TypeRef::Object => write!(f, "object"),
            TypeRef::Callback => write!(f, "callback"),
            TypeRef::Named(name) | TypeRef::Generic(name) => write!(f, "{}", name),
            TypeRef::Array(element) => write!(f, "{}[]", element),
            TypeRef::Future(output) => write!(f, "future<{}>", output),
        }
    }
}

/// Error from parsing a type expression.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid type '{input}': {reason}")]
pub struct TypeParseError {
    pub input: String,
    pub reason: String,
}

impl TypeParseError {
    fn new(input: &str, reason: &str) -> Self {
        Self {
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }
}
