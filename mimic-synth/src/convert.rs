//! Coercion planning and application.
//!
//! Planning runs once per slot at synthesis time and decides which
//! [`Coercion`] bridges a contract type and a source type. Application runs
//! on every call.

use mimic_core::{Error, IntWidth, Result, TypeRef, Value};
use mimic_ir::Coercion;

use crate::{CallEnv, TypeRegistry};

/// Generic parameter bindings of one call.
pub type Bindings = [(String, TypeRef)];

/// Decides coercions against the registered contracts and enums.
pub struct Planner<'a> {
    registry: &'a TypeRegistry,
}

impl<'a> Planner<'a> {
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self { registry }
    }

    /// Coercion from a source member's result to the type the contract
    /// declares. `None` if no rule applies.
    pub fn plan_return(&self, contract: &TypeRef, source: &TypeRef) -> Option<Coercion> {
        if contract.is_generic() {
            return (source.is_generic() || *source == TypeRef::Object).then(|| {
                Coercion::GenericReturn {
                    template: contract.clone(),
                }
            });
        }

        if contract == source || contract.is_void() || *contract == TypeRef::Object {
            return Some(Coercion::None);
        }

        if let Some(coercion) = self.plan_integral(contract, source) {
            return Some(coercion);
        }

        if let Some(element) = contract.element() {
            if let (Some(contract_name), Some(source_element)) =
                (self.contract_name(element), source.element())
            {
                if self.is_adaptable(source_element) {
                    return Some(Coercion::AdaptArray {
                        contract: contract_name.to_string(),
                    });
                }
            }
        }

        if let Some(contract_name) = self.contract_name(contract) {
            if self.is_adaptable(source) {
                return Some(Coercion::Adapt {
                    contract: contract_name.to_string(),
                });
            }
        }

        if *source == TypeRef::Object {
            return Some(Coercion::Dynamic {
                target: contract.clone(),
            });
        }

        None
    }

    /// Coercion from a caller's argument to the type the source member
    /// declares. `None` if no rule applies.
    pub fn plan_argument(&self, source: &TypeRef, contract: &TypeRef) -> Option<Coercion> {
        if contract == source || *source == TypeRef::Object {
            return Some(Coercion::None);
        }

        if source.is_generic() || contract.is_generic() {
            return Some(Coercion::Dynamic {
                target: source.clone(),
            });
        }

        if let Some(coercion) = self.plan_integral(source, contract) {
            return Some(coercion);
        }

        if let (Some(source_element), Some(contract_element)) = (source.element(), contract.element())
        {
            if self.contract_name(contract_element).is_some() && self.is_concrete(source_element) {
                return Some(Coercion::UnwrapArray);
            }
            if let Some(name) = self.contract_name(source_element) {
                if self.is_adaptable(contract_element) {
                    return Some(Coercion::AdaptArray {
                        contract: name.to_string(),
                    });
                }
            }
        }

        if self.contract_name(contract).is_some() && self.is_concrete(source) {
            return Some(Coercion::Unwrap);
        }

        if let Some(name) = self.contract_name(source) {
            if self.is_adaptable(contract) {
                return Some(Coercion::Adapt {
                    contract: name.to_string(),
                });
            }
        }

        if *contract == TypeRef::Object {
            return Some(Coercion::Dynamic {
                target: source.clone(),
            });
        }

        None
    }

    /// Enum and integer-width conversions toward `target`.
    fn plan_integral(&self, target: &TypeRef, from: &TypeRef) -> Option<Coercion> {
        let from_integral = matches!(from, TypeRef::Int(_)) || self.registry.enum_of(from).is_some();

        if let Some(info) = self.registry.enum_of(target) {
            return from_integral.then(|| Coercion::IntToEnum {
                target: info.name.clone(),
                width: info.repr,
            });
        }

        match (target, from) {
            (TypeRef::Int(width), TypeRef::Int(_)) => Some(Coercion::Int { width: *width }),
            (TypeRef::Int(width), _) if from_integral => Some(Coercion::EnumToInt { width: *width }),
            _ => None,
        }
    }

    fn contract_name<'t>(&self, ty: &'t TypeRef) -> Option<&'t str> {
        ty.name().filter(|name| self.registry.is_contract(name))
    }

    /// A type whose values are objects that can be wrapped in an adapter.
    fn is_adaptable(&self, ty: &TypeRef) -> bool {
        match ty {
            TypeRef::Object => true,
            TypeRef::Named(name) => !self.registry.is_enum(name),
            _ => false,
        }
    }

    /// A named source-domain type: not a contract, not an enum.
    fn is_concrete(&self, ty: &TypeRef) -> bool {
        ty.name()
            .is_some_and(|name| !self.registry.is_contract(name) && !self.registry.is_enum(name))
    }
}

/// Apply a planned coercion to one value.
pub fn apply(env: &CallEnv, coercion: &Coercion, value: Value, bindings: &Bindings) -> Result<Value> {
    match coercion {
        Coercion::None => Ok(value),
        Coercion::Int { width } | Coercion::EnumToInt { width } => Ok(to_int(value, *width)),
        Coercion::IntToEnum { target, width } => Ok(to_enum(value, target, *width)),
        Coercion::Adapt { contract } => env.adapt(value, contract),
        Coercion::AdaptArray { contract } => map_array(value, |item| env.adapt(item, contract)),
        Coercion::Unwrap => Ok(unwrap(value)),
        Coercion::UnwrapArray => map_array(value, |item| Ok(unwrap(item))),
        Coercion::GenericReturn { template } => dynamic(env, value, &template.substitute(bindings)),
        Coercion::Dynamic { target } => dynamic(env, value, &target.substitute(bindings)),
    }
}

/// Convert toward `target` by looking at the value's runtime shape.
pub fn dynamic(env: &CallEnv, value: Value, target: &TypeRef) -> Result<Value> {
    let registry = env.registry();
    match (target, value) {
        (_, Value::Null) => Ok(Value::Null),
        (TypeRef::Array(element), Value::Array(items)) => items
            .into_iter()
            .map(|item| dynamic(env, item, element))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        (TypeRef::Int(width), value @ Value::Enum { .. }) => Ok(to_int(value, *width)),
        (TypeRef::Named(name), value @ Value::Object(_)) if registry.is_contract(name) => {
            env.adapt(value, name)
        }
        (TypeRef::Named(name), Value::Object(obj)) => {
            let inner = obj
                .as_adapted()
                .filter(|_| obj.type_info().name != *name)
                .map(|view| view.inner().clone());
            Ok(Value::Object(inner.unwrap_or(obj)))
        }
        (TypeRef::Named(name), value @ (Value::Int(_) | Value::Enum { .. })) => {
            match registry.enum_info(name) {
                Some(info) => Ok(to_enum(value, &info.name, info.repr)),
                None => Ok(value),
            }
        }
        (_, value) => Ok(value),
    }
}

fn to_int(value: Value, width: IntWidth) -> Value {
    match value.as_int() {
        Some(raw) => Value::Int(width.narrow(raw)),
        None => value,
    }
}

fn to_enum(value: Value, target: &str, width: IntWidth) -> Value {
    match value.as_int() {
        Some(raw) => Value::Enum {
            ty: target.to_string(),
            value: width.narrow(raw),
        },
        None => value,
    }
}

/// The escape hatch applied to a value: adapted views become their inner object.
fn unwrap(value: Value) -> Value {
    match value {
        Value::Object(obj) => {
            let inner = obj.as_adapted().map(|view| view.inner().clone());
            Value::Object(inner.unwrap_or(obj))
        }
        other => other,
    }
}

/// Map every element of an array; null stays null.
fn map_array(value: Value, mut f: impl FnMut(Value) -> Result<Value>) -> Result<Value> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Array(items) => items
            .into_iter()
            .map(&mut f)
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        other => Err(Error::invalid_operation(format!(
            "expected an array, got {}",
            other.kind()
        ))),
    }
}
