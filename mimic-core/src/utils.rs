//! Member naming utilities.

/// Property accessor direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accessor {
    Get,
    Set,
}

impl Accessor {
    pub fn prefix(&self) -> &'static str {
        match self {
            Accessor::Get => "get",
            Accessor::Set => "set",
        }
    }
}

/// Convert a string to PascalCase (e.g., "hello_world" -> "HelloWorld")
pub fn to_pascal_case(s: &str) -> String {
    s.split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => c.to_uppercase().chain(chars).collect(),
            }
        })
        .collect()
}

/// Accessor method name for a property (e.g., `get_Price`).
pub fn accessor_name(accessor: Accessor, property: &str) -> String {
    format!("{}_{}", accessor.prefix(), property)
}

/// Split a getter/setter-shaped method name into its accessor and property.
///
/// Accepts `get_Price`, `getPrice` and `GetPrice`; rejects names like
/// `getaway` where the prefix is not followed by a word boundary.
pub fn split_accessor(name: &str) -> Option<(Accessor, &str)> {
    let prefix = name.get(..3)?;
    let accessor = if prefix.eq_ignore_ascii_case("get") {
        Accessor::Get
    } else if prefix.eq_ignore_ascii_case("set") {
        Accessor::Set
    } else {
        return None;
    };

    let rest = &name[3..];
    if let Some(property) = rest.strip_prefix('_') {
        return (!property.is_empty()).then_some((accessor, property));
    }

    rest.chars()
        .next()
        .filter(|c| c.is_uppercase())
        .map(|_| (accessor, rest))
}

/// Strip the `Async` marker from a method name (`OperationAsync` -> `Operation`).
pub fn strip_async_suffix(name: &str) -> Option<&str> {
    name.strip_suffix("Async").filter(|base| !base.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_pascal_case() {
        assert_eq!(to_pascal_case("hello"), "Hello");
        assert_eq!(to_pascal_case("hello_world"), "HelloWorld");
        assert_eq!(to_pascal_case("operation"), "Operation");
        assert_eq!(to_pascal_case(""), "");
    }

    #[test]
    fn test_split_accessor() {
        assert_eq!(split_accessor("get_Price"), Some((Accessor::Get, "Price")));
        assert_eq!(split_accessor("GetChild"), Some((Accessor::Get, "Child")));
        assert_eq!(split_accessor("setName"), Some((Accessor::Set, "Name")));
        assert_eq!(split_accessor("getaway"), None);
        assert_eq!(split_accessor("get_"), None);
        assert_eq!(split_accessor("Run"), None);
    }

    #[test]
    fn test_accessor_name() {
        assert_eq!(accessor_name(Accessor::Set, "Cost"), "set_Cost");
    }

    #[test]
    fn test_strip_async_suffix() {
        assert_eq!(strip_async_suffix("OperationAsync"), Some("Operation"));
        assert_eq!(strip_async_suffix("operationAsync"), Some("operation"));
        assert_eq!(strip_async_suffix("Async"), None);
        assert_eq!(strip_async_suffix("Operation"), None);
    }
}
