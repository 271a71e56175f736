//! Source members a slot may bind to.

use mimic_core::{Accessor, MethodInfo, TypeInfo, TypeRef};
use mimic_ir::{BindingTarget, CallShape};

use super::SourceCall;

/// A source member seen through the shape of a slot: the arguments it takes
/// and the value it produces.
pub(super) struct Candidate {
    pub target: BindingTarget,
    pub params: Vec<TypeRef>,
    pub returns: TypeRef,
    pub generics: Vec<String>,
    pub call: SourceCall,
}

pub(super) fn property(
    owner: &TypeInfo,
    name: &str,
    accessor: Accessor,
    shape: CallShape,
) -> Option<Candidate> {
    let prop = owner
        .property(name)
        .filter(|p| p.is_static == (shape == CallShape::Static))?;
    let target = BindingTarget::Property {
        owner: owner.name.clone(),
        name: prop.name.clone(),
        shape,
    };

    match accessor {
        Accessor::Get => prop.getter.clone().map(|getter| Candidate {
            target,
            params: Vec::new(),
            returns: prop.ty.clone(),
            generics: Vec::new(),
            call: SourceCall::Get(getter, shape),
        }),
        Accessor::Set => prop.setter.clone().map(|setter| Candidate {
            target,
            params: vec![prop.ty.clone()],
            returns: TypeRef::Void,
            generics: Vec::new(),
            call: SourceCall::Set(setter, shape),
        }),
    }
}

pub(super) fn field(owner: &TypeInfo, name: &str, accessor: Accessor) -> Option<Candidate> {
    let field = owner.field(name)?;
    let target = BindingTarget::Field {
        owner: owner.name.clone(),
        name: field.name.clone(),
    };

    match accessor {
        Accessor::Get => Some(Candidate {
            target,
            params: Vec::new(),
            returns: field.ty.clone(),
            generics: Vec::new(),
            call: SourceCall::Get(field.getter.clone(), CallShape::Instance),
        }),
        Accessor::Set => field.setter.clone().map(|setter| Candidate {
            target,
            params: vec![field.ty.clone()],
            returns: TypeRef::Void,
            generics: Vec::new(),
            call: SourceCall::Set(setter, CallShape::Instance),
        }),
    }
}

/// Overloads of `name` taking `arity` arguments, in declaration order.
pub(super) fn methods(owner: &TypeInfo, name: &str, arity: usize, shape: CallShape) -> Vec<Candidate> {
    owner
        .methods_named(name)
        .filter(|m| m.arity() == arity && has_shape(m, shape))
        .map(|m| method(owner, m, shape))
        .collect()
}

pub(super) fn method(owner: &TypeInfo, m: &MethodInfo, shape: CallShape) -> Candidate {
    Candidate {
        target: BindingTarget::Method {
            owner: owner.name.clone(),
            name: m.name.clone(),
            shape,
        },
        params: m.call_params().iter().map(|p| p.ty.clone()).collect(),
        returns: m.returns.clone(),
        generics: m.generics.clone(),
        call: SourceCall::Method(m.invoke.clone(), shape),
    }
}

pub(super) fn indexer(owner: &TypeInfo, arity: usize, accessor: Accessor) -> Option<Candidate> {
    let indexer = owner.indexer(arity)?;
    let target = BindingTarget::Indexer {
        owner: owner.name.clone(),
        arity,
    };
    let mut params: Vec<TypeRef> = indexer.params.iter().map(|p| p.ty.clone()).collect();

    match accessor {
        Accessor::Get => indexer.getter.clone().map(|getter| Candidate {
            target,
            params,
            returns: indexer.ty.clone(),
            generics: Vec::new(),
            call: SourceCall::IndexGet(getter),
        }),
        Accessor::Set => indexer.setter.clone().map(|setter| {
            params.push(indexer.ty.clone());
            Candidate {
                target,
                params,
                returns: TypeRef::Void,
                generics: Vec::new(),
                call: SourceCall::IndexSet(setter),
            }
        }),
    }
}

fn has_shape(m: &MethodInfo, shape: CallShape) -> bool {
    match shape {
        CallShape::Instance => !m.is_static,
        CallShape::Static => m.is_static && !m.is_extension,
        CallShape::Extension => m.is_extension,
    }
}
