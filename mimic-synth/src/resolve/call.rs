//! Calls into source members, with the receiver shape decided at synthesis.

use mimic_core::{
    Getter, IndexGetter, IndexSetter, Invocation, MethodFn, Object, ObjectRef, Result, Setter,
    TypeRef, Value,
};
use mimic_ir::CallShape;

/// A bound source member.
#[derive(Clone)]
pub(crate) enum SourceCall {
    Get(Getter, CallShape),
    Set(Setter, CallShape),
    Method(MethodFn, CallShape),
    IndexGet(IndexGetter),
    IndexSet(IndexSetter),
}

impl SourceCall {
    /// Invoke against `source` with already-coerced arguments. Setters take
    /// the assigned value as their last argument and return `Null`.
    pub(crate) fn invoke(
        &self,
        source: &ObjectRef,
        mut args: Vec<Value>,
        type_args: Vec<TypeRef>,
    ) -> Result<Value> {
        match self {
            SourceCall::Get(getter, shape) => getter(receiver(source, *shape)),
            SourceCall::Set(setter, shape) => {
                let value = args.pop().unwrap_or_default();
                setter(receiver(source, *shape), value).map(|_| Value::Null)
            }
            SourceCall::Method(invoke, shape) => {
                if *shape == CallShape::Extension {
                    args.insert(0, Value::Object(source.clone()));
                }
                let invocation = Invocation::new(args).with_type_args(type_args);
                invoke(receiver(source, *shape), &invocation)
            }
            SourceCall::IndexGet(getter) => getter(&**source, &args),
            SourceCall::IndexSet(setter) => {
                let value = args.pop().unwrap_or_default();
                setter(&**source, &args, value).map(|_| Value::Null)
            }
        }
    }
}

fn receiver(source: &ObjectRef, shape: CallShape) -> Option<&dyn Object> {
    match shape {
        CallShape::Instance => Some(&**source),
        CallShape::Static | CallShape::Extension => None,
    }
}
