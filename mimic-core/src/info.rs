//! Reflective type descriptions.
//!
//! Source types describe their members with [`TypeBuilder`]. Member bodies are
//! closures over the concrete Rust type; the builder wraps them so they accept
//! a type-erased receiver and downcast it on entry.

use std::{fmt, sync::Arc};

use indexmap::IndexMap;

use crate::{Error, IntWidth, Object, Result, TypeRef, Value};

/// Property or field read. The receiver is `None` for static members.
pub type Getter = Arc<dyn Fn(Option<&dyn Object>) -> Result<Value> + Send + Sync>;
/// Property or field write. The receiver is `None` for static members.
pub type Setter = Arc<dyn Fn(Option<&dyn Object>, Value) -> Result<()> + Send + Sync>;
/// Method body. The receiver is `None` for static and extension methods.
pub type MethodFn = Arc<dyn Fn(Option<&dyn Object>, &Invocation) -> Result<Value> + Send + Sync>;
pub type IndexGetter = Arc<dyn Fn(&dyn Object, &[Value]) -> Result<Value> + Send + Sync>;
pub type IndexSetter = Arc<dyn Fn(&dyn Object, &[Value], Value) -> Result<()> + Send + Sync>;

/// Arguments of a method call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Invocation {
    pub args: Vec<Value>,
    /// Type arguments for generic methods.
    pub type_args: Vec<TypeRef>,
}

impl Invocation {
    pub fn new(args: Vec<Value>) -> Self {
        Self {
            args,
            type_args: Vec::new(),
        }
    }

    pub fn with_type_args(mut self, type_args: Vec<TypeRef>) -> Self {
        self.type_args = type_args;
        self
    }

    /// Get an argument by position.
    pub fn arg(&self, index: usize) -> Result<&Value> {
        self.args.get(index).ok_or_else(|| {
            Error::argument(
                format!("#{}", index),
                format!("expected at least {} argument(s)", index + 1),
            )
        })
    }
}

/// A named, typed parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamInfo {
    pub name: String,
    pub ty: TypeRef,
}

#[derive(Clone)]
pub struct PropertyInfo {
    pub name: String,
    pub ty: TypeRef,
    pub is_static: bool,
    pub getter: Option<Getter>,
    pub setter: Option<Setter>,
}

/// A public field. Fields are only bound as a fallback for property accessors.
#[derive(Clone)]
pub struct FieldInfo {
    pub name: String,
    pub ty: TypeRef,
    pub getter: Getter,
    pub setter: Option<Setter>,
}

#[derive(Clone)]
pub struct MethodInfo {
    pub name: String,
    pub params: Vec<ParamInfo>,
    pub returns: TypeRef,
    pub generics: Vec<String>,
    pub is_static: bool,
    /// A static method whose first parameter is the receiver.
    pub is_extension: bool,
    pub invoke: MethodFn,
}

impl MethodInfo {
    /// Number of parameters a caller supplies (the receiver of an
    /// extension method does not count).
    pub fn arity(&self) -> usize {
        if self.is_extension {
            self.params.len().saturating_sub(1)
        } else {
            self.params.len()
        }
    }

    /// Parameters a caller supplies.
    pub fn call_params(&self) -> &[ParamInfo] {
        if self.is_extension && !self.params.is_empty() {
            &self.params[1..]
        } else {
            &self.params
        }
    }

    /// The receiver parameter of an extension method.
    pub fn receiver(&self) -> Option<&ParamInfo> {
        if self.is_extension {
            self.params.first()
        } else {
            None
        }
    }
}

#[derive(Clone)]
pub struct IndexerInfo {
    pub params: Vec<ParamInfo>,
    pub ty: TypeRef,
    pub getter: Option<IndexGetter>,
    pub setter: Option<IndexSetter>,
}

/// Reflective description of a source type.
#[derive(Clone, Default)]
pub struct TypeInfo {
    /// Fully-qualified name; the type's identity for caching.
    pub name: String,
    pub properties: Vec<PropertyInfo>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    pub indexers: Vec<IndexerInfo>,
    /// Instances implement [`crate::DynamicMembers`].
    pub dynamic: bool,
}

impl TypeInfo {
    /// Start describing a type.
    pub fn builder(name: impl Into<String>) -> TypeBuilder {
        TypeBuilder::new(name)
    }

    pub fn property(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// All overloads with the given name, in declaration order.
    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MethodInfo> {
        self.methods.iter().filter(move |m| m.name == name)
    }

    pub fn has_method(&self, name: &str, arity: usize) -> bool {
        self.methods_named(name).any(|m| m.arity() == arity)
    }

    pub fn indexer(&self, arity: usize) -> Option<&IndexerInfo> {
        self.indexers.iter().find(|i| i.params.len() == arity)
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("name", &self.name)
            .field(
                "properties",
                &self.properties.iter().map(|p| &p.name).collect::<Vec<_>>(),
            )
            .field(
                "fields",
                &self.fields.iter().map(|p| &p.name).collect::<Vec<_>>(),
            )
            .field(
                "methods",
                &self.methods.iter().map(|m| &m.name).collect::<Vec<_>>(),
            )
            .field("indexers", &self.indexers.len())
            .field("dynamic", &self.dynamic)
            .finish()
    }
}

/// An enum type with an integral representation.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumInfo {
    pub name: String,
    pub repr: IntWidth,
    pub variants: IndexMap<String, i64>,
}

impl EnumInfo {
    pub fn new(name: impl Into<String>, repr: IntWidth) -> Self {
        Self {
            name: name.into(),
            repr,
            variants: IndexMap::new(),
        }
    }

    pub fn variant(mut self, name: impl Into<String>, value: i64) -> Self {
        self.variants.insert(name.into(), value);
        self
    }

    /// Build a tagged enum value from a raw integer, narrowing to the repr.
    pub fn value(&self, raw: i64) -> Value {
        Value::Enum {
            ty: self.name.clone(),
            value: self.repr.narrow(raw),
        }
    }

    pub fn variant_name(&self, value: i64) -> Option<&str> {
        self.variants
            .iter()
            .find(|(_, v)| **v == value)
            .map(|(name, _)| name.as_str())
    }
}

/// Builder for [`TypeInfo`].
///
/// # Example
///
/// ```ignore
/// let info = TypeInfo::builder("demo::Person")
///     .property_rw(
///         "Name",
///         TypeRef::String,
///         |p: &Person| Ok(p.name.lock().clone().into()),
///         |p: &Person, v| { *p.name.lock() = v.as_str().unwrap_or_default().into(); Ok(()) },
///     )
///     .method("Greet", &[("other", TypeRef::String)], TypeRef::String, |p: &Person, inv| {
///         Ok(format!("hi {}", inv.arg(0)?.as_str().unwrap_or_default()).into())
///     })
///     .build();
/// ```
pub struct TypeBuilder {
    info: TypeInfo,
}

impl TypeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            info: TypeInfo {
                name: name.into(),
                ..TypeInfo::default()
            },
        }
    }

    /// Flag instances as implementing [`crate::DynamicMembers`].
    pub fn dynamic(mut self) -> Self {
        self.info.dynamic = true;
        self
    }

    /// Add a read-only instance property.
    pub fn property<T: Object>(
        mut self,
        name: impl Into<String>,
        ty: TypeRef,
        get: impl Fn(&T) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        let getter = self.getter(get);
        self.info.properties.push(PropertyInfo {
            name: name.into(),
            ty,
            is_static: false,
            getter: Some(getter),
            setter: None,
        });
        self
    }

    /// Add a read-write instance property.
    pub fn property_rw<T: Object>(
        mut self,
        name: impl Into<String>,
        ty: TypeRef,
        get: impl Fn(&T) -> Result<Value> + Send + Sync + 'static,
        set: impl Fn(&T, Value) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        let getter = self.getter(get);
        let setter = self.setter(set);
        self.info.properties.push(PropertyInfo {
            name: name.into(),
            ty,
            is_static: false,
            getter: Some(getter),
            setter: Some(setter),
        });
        self
    }

    /// Add a read-only static property.
    pub fn static_property(
        mut self,
        name: impl Into<String>,
        ty: TypeRef,
        get: impl Fn() -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        self.info.properties.push(PropertyInfo {
            name: name.into(),
            ty,
            is_static: true,
            getter: Some(Arc::new(move |_: Option<&dyn Object>| get())),
            setter: None,
        });
        self
    }

    /// Add a public field, optionally writable.
    pub fn field<T: Object>(
        mut self,
        name: impl Into<String>,
        ty: TypeRef,
        get: impl Fn(&T) -> Result<Value> + Send + Sync + 'static,
        set: Option<fn(&T, Value) -> Result<()>>,
    ) -> Self {
        let getter = self.getter(get);
        let setter = set.map(|set| self.setter(set));
        self.info.fields.push(FieldInfo {
            name: name.into(),
            ty,
            getter,
            setter,
        });
        self
    }

    /// Add an instance method.
    pub fn method<T: Object>(
        self,
        name: impl Into<String>,
        params: &[(&str, TypeRef)],
        returns: TypeRef,
        f: impl Fn(&T, &Invocation) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        self.generic_method(name, &[], params, returns, f)
    }

    /// Add a generic instance method.
    pub fn generic_method<T: Object>(
        mut self,
        name: impl Into<String>,
        generics: &[&str],
        params: &[(&str, TypeRef)],
        returns: TypeRef,
        f: impl Fn(&T, &Invocation) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        let owner = self.info.name.clone();
        let invoke: MethodFn = Arc::new(move |recv: Option<&dyn Object>, inv: &Invocation| {
            f(receiver::<T>(recv, &owner)?, inv)
        });
        self.info.methods.push(MethodInfo {
            name: name.into(),
            params: to_params(params),
            returns,
            generics: generics.iter().map(|g| g.to_string()).collect(),
            is_static: false,
            is_extension: false,
            invoke,
        });
        self
    }

    /// Add a static method.
    pub fn static_method(
        mut self,
        name: impl Into<String>,
        params: &[(&str, TypeRef)],
        returns: TypeRef,
        f: impl Fn(&Invocation) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        self.info.methods.push(MethodInfo {
            name: name.into(),
            params: to_params(params),
            returns,
            generics: Vec::new(),
            is_static: true,
            is_extension: false,
            invoke: Arc::new(move |_: Option<&dyn Object>, inv: &Invocation| f(inv)),
        });
        self
    }

    /// Add an extension method: a static method whose first parameter is the
    /// receiver it extends.
    pub fn extension_method(
        mut self,
        name: impl Into<String>,
        params: &[(&str, TypeRef)],
        returns: TypeRef,
        f: impl Fn(&Invocation) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        self.info.methods.push(MethodInfo {
            name: name.into(),
            params: to_params(params),
            returns,
            generics: Vec::new(),
            is_static: true,
            is_extension: true,
            invoke: Arc::new(move |_: Option<&dyn Object>, inv: &Invocation| f(inv)),
        });
        self
    }

    /// Add a read-only indexer.
    pub fn indexer<T: Object>(
        mut self,
        params: &[(&str, TypeRef)],
        ty: TypeRef,
        get: impl Fn(&T, &[Value]) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        let getter = self.index_getter(get);
        self.info.indexers.push(IndexerInfo {
            params: to_params(params),
            ty,
            getter: Some(getter),
            setter: None,
        });
        self
    }

    /// Add a read-write indexer.
    pub fn indexer_rw<T: Object>(
        mut self,
        params: &[(&str, TypeRef)],
        ty: TypeRef,
        get: impl Fn(&T, &[Value]) -> Result<Value> + Send + Sync + 'static,
        set: impl Fn(&T, &[Value], Value) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        let getter = self.index_getter(get);
        let owner = self.info.name.clone();
        let setter: IndexSetter = Arc::new(move |recv: &dyn Object, args: &[Value], value| {
            set(receiver::<T>(Some(recv), &owner)?, args, value)
        });
        self.info.indexers.push(IndexerInfo {
            params: to_params(params),
            ty,
            getter: Some(getter),
            setter: Some(setter),
        });
        self
    }

    pub fn build(self) -> Arc<TypeInfo> {
        Arc::new(self.info)
    }

    fn getter<T: Object>(
        &self,
        get: impl Fn(&T) -> Result<Value> + Send + Sync + 'static,
    ) -> Getter {
        let owner = self.info.name.clone();
        Arc::new(move |recv: Option<&dyn Object>| get(receiver::<T>(recv, &owner)?))
    }

    fn setter<T: Object>(
        &self,
        set: impl Fn(&T, Value) -> Result<()> + Send + Sync + 'static,
    ) -> Setter {
        let owner = self.info.name.clone();
        Arc::new(move |recv: Option<&dyn Object>, value| set(receiver::<T>(recv, &owner)?, value))
    }

    fn index_getter<T: Object>(
        &self,
        get: impl Fn(&T, &[Value]) -> Result<Value> + Send + Sync + 'static,
    ) -> IndexGetter {
        let owner = self.info.name.clone();
        Arc::new(move |recv: &dyn Object, args: &[Value]| {
            get(receiver::<T>(Some(recv), &owner)?, args)
        })
    }
}

fn to_params(params: &[(&str, TypeRef)]) -> Vec<ParamInfo> {
    params
        .iter()
        .map(|(name, ty)| ParamInfo {
            name: name.to_string(),
            ty: ty.clone(),
        })
        .collect()
}

/// Downcast a type-erased receiver to the concrete type a member was declared on.
fn receiver<'a, T: Object>(recv: Option<&'a dyn Object>, owner: &str) -> Result<&'a T> {
    recv.and_then(|obj| obj.as_any().downcast_ref::<T>())
        .ok_or_else(|| {
            Error::invalid_operation(format!("receiver is not an instance of '{}'", owner))
        })
}

#[cfg(test)]
mod tests {
    use std::any::Any;

    use parking_lot::Mutex;

    use super::*;

    struct Counter {
        count: Mutex<i64>,
    }

    struct Other;

    impl Object for Counter {
        fn type_info(&self) -> Arc<TypeInfo> {
            counter_type()
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    impl Object for Other {
        fn type_info(&self) -> Arc<TypeInfo> {
            TypeInfo::builder("tests::Other").build()
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn counter_type() -> Arc<TypeInfo> {
        TypeInfo::builder("tests::Counter")
            .property_rw(
                "Count",
                TypeRef::I64,
                |c: &Counter| Ok(Value::Int(*c.count.lock())),
                |c: &Counter, v| {
                    *c.count.lock() = v.as_int().unwrap_or_default();
                    Ok(())
                },
            )
            .method("Add", &[("by", TypeRef::I64)], TypeRef::I64, |c: &Counter, inv| {
                let mut count = c.count.lock();
                *count += inv.arg(0)?.as_int().unwrap_or_default();
                Ok(Value::Int(*count))
            })
            .build()
    }

    #[test]
    fn test_builder_members() {
        let info = counter_type();
        assert_eq!(info.name, "tests::Counter");
        assert!(info.property("Count").is_some());
        assert!(info.has_method("Add", 1));
        assert!(!info.has_method("Add", 2));
    }

    #[test]
    fn test_invoke_through_erased_receiver() {
        let info = counter_type();
        let counter = Counter {
            count: Mutex::new(1),
        };
        let add = info.methods_named("Add").next().unwrap();
        let result = (add.invoke)(Some(&counter), &Invocation::new(vec![Value::Int(4)])).unwrap();
        assert_eq!(result, Value::Int(5));

        let setter = info.property("Count").unwrap().setter.clone().unwrap();
        setter(Some(&counter), Value::Int(10)).unwrap();
        assert_eq!(*counter.count.lock(), 10);
    }

    #[test]
    fn test_wrong_receiver_is_invalid_operation() {
        let info = counter_type();
        let getter = info.property("Count").unwrap().getter.clone().unwrap();
        let err = getter(Some(&Other)).unwrap_err();
        assert!(matches!(err, Error::InvalidOperation { .. }));
        assert!(getter(None).is_err());
    }

    #[test]
    fn test_extension_arity_excludes_receiver() {
        let info = TypeInfo::builder("tests::Helpers")
            .extension_method(
                "Describe",
                &[("this", TypeRef::named("tests::Counter")), ("prefix", TypeRef::String)],
                TypeRef::String,
                |_| Ok(Value::Null),
            )
            .build();
        let method = info.methods_named("Describe").next().unwrap();
        assert_eq!(method.arity(), 1);
        assert_eq!(method.call_params().len(), 1);
        assert_eq!(method.receiver().unwrap().ty, TypeRef::named("tests::Counter"));
    }

    #[test]
    fn test_enum_value_narrows() {
        let color = EnumInfo::new("Color", IntWidth::I8)
            .variant("Red", 0)
            .variant("Green", 1);
        assert_eq!(
            color.value(257),
            Value::Enum {
                ty: "Color".into(),
                value: 1
            }
        );
        assert_eq!(color.variant_name(1), Some("Green"));
    }
}
