//! Reflective description of a synthesized adapter.
//!
//! Every member forwards to the adapter's own slots, so an adapted view can
//! itself be bound against: adapted again, passed where a source type is
//! expected, or inspected.

use std::{collections::HashSet, sync::Arc};

use indexmap::IndexMap;
use mimic_core::{
    Error, Getter, IndexGetter, IndexSetter, IndexerInfo, Invocation, MethodFn, MethodInfo,
    Object, ParamInfo, PropertyInfo, Result, Setter, TypeInfo, Value,
};
use mimic_ir::SlotKey;
use mimic_manifest::{MemberKind, Param};

use crate::{
    AdaptedInstance, Slot,
    resolve::{FlatMember, produced_type},
};

pub(super) fn describe(
    name: &str,
    members: &[FlatMember],
    slots: &IndexMap<SlotKey, Slot>,
) -> Arc<TypeInfo> {
    let mut info = TypeInfo {
        name: name.to_string(),
        ..TypeInfo::default()
    };
    let exposed = |key: &SlotKey| slots.contains_key(key);
    let mut described = HashSet::new();

    for flat in members {
        let member = &flat.member;
        // Redeclared members share slots with the first declaration.
        if !described.insert(member.signature()) {
            continue;
        }
        match &member.kind {
            MemberKind::Property { .. } => {
                let get = SlotKey::get(member.name.as_str());
                let set = SlotKey::set(member.name.as_str());
                info.properties.push(PropertyInfo {
                    name: member.name.clone(),
                    ty: produced_type(member),
                    is_static: false,
                    getter: exposed(&get).then(|| getter(get)),
                    setter: exposed(&set).then(|| setter(set)),
                });
            }
            MemberKind::Method {
                params, generics, ..
            } => {
                let call = SlotKey::call(member.name.as_str(), params.len());
                if exposed(&call) {
                    info.methods.push(MethodInfo {
                        name: member.name.clone(),
                        params: to_params(params),
                        returns: produced_type(member),
                        generics: generics.clone(),
                        is_static: false,
                        is_extension: false,
                        invoke: method(call),
                    });
                }
            }
            MemberKind::Indexer { params, .. } => {
                let get = SlotKey::index_get(params.len());
                let set = SlotKey::index_set(params.len());
                info.indexers.push(IndexerInfo {
                    params: to_params(params),
                    ty: produced_type(member),
                    getter: exposed(&get).then(|| index_getter(get)),
                    setter: exposed(&set).then(|| index_setter(set)),
                });
            }
        }
    }

    Arc::new(info)
}

fn to_params(params: &[Param]) -> Vec<ParamInfo> {
    params
        .iter()
        .map(|p| ParamInfo {
            name: p.name.clone(),
            ty: p.ty.clone(),
        })
        .collect()
}

fn view<'a>(recv: Option<&'a dyn Object>) -> Result<&'a AdaptedInstance> {
    recv.and_then(|obj| obj.as_any().downcast_ref::<AdaptedInstance>())
        .ok_or_else(|| Error::invalid_operation("receiver is not an adapted instance"))
}

fn getter(key: SlotKey) -> Getter {
    Arc::new(move |recv: Option<&dyn Object>| view(recv)?.invoke(&key, Invocation::default()))
}

fn setter(key: SlotKey) -> Setter {
    Arc::new(move |recv: Option<&dyn Object>, value: Value| {
        view(recv)?
            .invoke(&key, Invocation::new(vec![value]))
            .map(|_| ())
    })
}

fn method(key: SlotKey) -> MethodFn {
    Arc::new(move |recv: Option<&dyn Object>, inv: &Invocation| {
        view(recv)?.invoke(&key, inv.clone())
    })
}

fn index_getter(key: SlotKey) -> IndexGetter {
    Arc::new(move |recv: &dyn Object, args: &[Value]| {
        view(Some(recv))?.invoke(&key, Invocation::new(args.to_vec()))
    })
}

fn index_setter(key: SlotKey) -> IndexSetter {
    Arc::new(move |recv: &dyn Object, args: &[Value], value: Value| {
        let mut args = args.to_vec();
        args.push(value);
        view(Some(recv))?
            .invoke(&key, Invocation::new(args))
            .map(|_| ())
    })
}
