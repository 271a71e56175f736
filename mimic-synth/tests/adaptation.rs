//! End-to-end adaptation through the engine.
//!
//! Every test builds an engine over the `demo::*` source types below and the
//! contracts declared in [`MANIFEST`].

use std::{
    any::Any,
    collections::HashMap,
    str::FromStr,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
};

use mimic_core::{
    DynamicMembers, Error, IndexCall, IntWidth, Invocation, Object, ObjectRef, Result, ServiceMap,
    TypeInfo, TypeRef, Value,
};
use mimic_ir::{BindingTarget, SlotKey, SynthesisKey};
use mimic_manifest::Manifest;
use mimic_synth::{
    AdaptedInstance, Engine, EngineBuilder, FnHook, HookCall, Severity,
    pipeline::{Plugin, SynthesisContext},
};
use once_cell::sync::Lazy;
use parking_lot::Mutex;

const MANIFEST: &str = r#"
[enums.Color]
repr = "i8"
variants = { Red = 0, Green = 1 }

[contracts.IChild]
adapts = "demo::Child"

[[contracts.IChild.members]]
kind = "property"
name = "Test"
type = "string"
access = "get"

[[contracts.IChild.members]]
kind = "method"
name = "Describe"
returns = "string"
bind = { binding = "static", owner = "demo::Helpers" }

[[contracts.IChild.members]]
kind = "method"
name = "Version"
returns = "string"
bind = { binding = "static", owner = "demo::Helpers" }

[contracts.INamed]

[[contracts.INamed.members]]
kind = "property"
name = "Name"
type = "string"

[contracts.IParent]
adapts = "demo::Parent"
extends = ["INamed"]

[[contracts.IParent.members]]
kind = "method"
name = "GetChild"
returns = "IChild"
bind = { target = "Child", kind = "property" }

[[contracts.IParent.members]]
kind = "property"
name = "Children"
type = "IChild[]"
access = "get"

[[contracts.IParent.members]]
kind = "method"
name = "Add"
returns = "i64"
params = [
    { name = "a", type = "i32" },
    { name = "b", type = "i32", extension = { hook = "double", placement = "after" } },
]

[[contracts.IParent.members]]
kind = "method"
name = "Shade"
returns = "Color"

[[contracts.IParent.members]]
kind = "method"
name = "Find"
generics = ["T"]
returns = "T"
params = [{ name = "name", type = "string" }]

[[contracts.IParent.members]]
kind = "method"
name = "Greet"
returns = "string"
returns_extension = "shout"
params = [{ name = "other", type = "string", extension = { hook = "trim", placement = "before" } }]

[[contracts.IParent.members]]
kind = "method"
name = "Adopt"
returns = "bool"
params = [{ name = "child", type = "IChild" }]

[[contracts.IParent.members]]
kind = "method"
name = "Summary"
returns = "string"
extension = "summary"

[[contracts.IParent.members]]
kind = "property"
name = "Missing"
type = "string"
access = "get"

[[contracts.IParent.members]]
kind = "indexer"
type = "string"
access = "get"
params = [{ name = "row", type = "i32" }]

[[contracts.IParent.members]]
kind = "indexer"
type = "string"
access = "get"
params = [{ name = "row", type = "i32" }, { name = "column", type = "i32" }]

[contracts.IDescribed]

[[contracts.IDescribed.members]]
kind = "method"
name = "Describe"
returns = "string"
bind = { binding = "static", owner = "demo::Helpers" }

[contracts.IBroken]

[[contracts.IBroken.members]]
kind = "property"
name = "Name"
type = "bool"
access = "get"

[contracts.IOpaque]

[contracts.IBag]

[[contracts.IBag.members]]
kind = "property"
name = "Title"
type = "string"

[[contracts.IBag.members]]
kind = "indexer"
type = "i32"
params = [{ name = "key", type = "string" }]
"#;

struct Child {
    test: String,
}

impl Object for Child {
    fn type_info(&self) -> Arc<TypeInfo> {
        CHILD_TYPE.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

static CHILD_TYPE: Lazy<Arc<TypeInfo>> = Lazy::new(|| {
    TypeInfo::builder("demo::Child")
        .property("Test", TypeRef::String, |c: &Child| Ok(c.test.clone().into()))
        .build()
});

struct Parent {
    name: Mutex<String>,
    child: ObjectRef,
    children: Option<Vec<ObjectRef>>,
}

impl Object for Parent {
    fn type_info(&self) -> Arc<TypeInfo> {
        PARENT_TYPE.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

static PARENT_TYPE: Lazy<Arc<TypeInfo>> = Lazy::new(|| {
    let child = || TypeRef::named("demo::Child");
    let int = |value: &Value| value.as_int().unwrap_or_default();

    TypeInfo::builder("demo::Parent")
        .property_rw(
            "Name",
            TypeRef::String,
            |p: &Parent| Ok(p.name.lock().clone().into()),
            |p: &Parent, v| {
                *p.name.lock() = v.as_str().unwrap_or_default().to_string();
                Ok(())
            },
        )
        .property("Child", child(), |p: &Parent| Ok(Value::Object(p.child.clone())))
        .property("Children", TypeRef::array(child()), |p: &Parent| {
            Ok(match &p.children {
                Some(children) => Value::Array(children.iter().cloned().map(Value::Object).collect()),
                None => Value::Null,
            })
        })
        .method(
            "Add",
            &[("a", TypeRef::I64), ("b", TypeRef::I64)],
            TypeRef::I64,
            move |_: &Parent, inv| Ok(Value::Int(int(inv.arg(0)?) + int(inv.arg(1)?))),
        )
        .method("Shade", &[], TypeRef::I32, |_: &Parent, _| Ok(Value::Int(257)))
        .generic_method(
            "Find",
            &["T"],
            &[("name", TypeRef::String)],
            TypeRef::generic("T"),
            |p: &Parent, inv| match inv.type_args.first() {
                Some(TypeRef::Named(name)) if name == "demo::Child" => {
                    Ok(Value::Object(p.child.clone()))
                }
                _ => Ok(Value::Null),
            },
        )
        .method(
            "Greet",
            &[("other", TypeRef::String)],
            TypeRef::String,
            |_: &Parent, inv| Ok(format!("hi {}", inv.arg(0)?.as_str().unwrap_or_default()).into()),
        )
        .method(
            "Adopt",
            &[("child", child())],
            TypeRef::Bool,
            |_: &Parent, inv| {
                let adopted = inv
                    .arg(0)?
                    .as_object()
                    .is_some_and(|obj| obj.as_any().is::<Child>());
                Ok(adopted.into())
            },
        )
        .indexer(&[("row", TypeRef::I64)], TypeRef::String, move |_: &Parent, args| {
            Ok(format!("row {}", int(&args[0])).into())
        })
        .indexer(
            &[("row", TypeRef::I64), ("column", TypeRef::I64)],
            TypeRef::String,
            move |_: &Parent, args| Ok(format!("cell {},{}", int(&args[0]), int(&args[1])).into()),
        )
        .build()
});

fn helpers_type() -> Arc<TypeInfo> {
    TypeInfo::builder("demo::Helpers")
        .static_method("Version", &[], TypeRef::String, |_| Ok("1.0".into()))
        .extension_method(
            "Describe",
            &[("child", TypeRef::named("demo::Child"))],
            TypeRef::String,
            |inv| {
                let child = inv
                    .arg(0)?
                    .as_object()
                    .and_then(|obj| obj.as_any().downcast_ref::<Child>())
                    .ok_or_else(|| Error::invalid_operation("not a child"))?;
                Ok(format!("child {}", child.test).into())
            },
        )
        .build()
}

#[derive(Default)]
struct Bag {
    members: Mutex<HashMap<String, Value>>,
}

impl Object for Bag {
    fn type_info(&self) -> Arc<TypeInfo> {
        TypeInfo::builder("demo::Bag").dynamic().build()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_dynamic(&self) -> Option<&dyn DynamicMembers> {
        Some(self)
    }
}

impl DynamicMembers for Bag {
    fn try_get_member(&self, name: &str) -> Option<Value> {
        self.members.lock().get(name).cloned()
    }

    fn try_set_member(&self, name: &str, value: Value) -> bool {
        self.members.lock().insert(name.to_string(), value);
        true
    }

    fn try_get_index(&self, call: &IndexCall) -> Option<Value> {
        let key = call.args.first()?.as_str()?;
        self.members.lock().get(&format!("{}[{}]", call.names[0], key)).cloned()
    }

    fn try_set_index(&self, call: &IndexCall, value: Value) -> bool {
        let Some(key) = call.args.first().and_then(Value::as_str) else {
            return false;
        };
        self.members
            .lock()
            .insert(format!("{}[{}]", call.names[0], key), value);
        true
    }
}

fn child(test: &str) -> ObjectRef {
    Arc::new(Child {
        test: test.to_string(),
    })
}

fn parent(children: Option<Vec<ObjectRef>>) -> ObjectRef {
    Arc::new(Parent {
        name: Mutex::new("Ada".to_string()),
        child: child("yikes"),
        children,
    })
}

fn builder() -> EngineBuilder {
    let manifest = Manifest::from_str(MANIFEST).expect("Failed to parse test manifest");
    Engine::builder()
        .manifest(manifest)
        .source_type(CHILD_TYPE.clone())
        .source_type(PARENT_TYPE.clone())
        .source_type(helpers_type())
        .with_default_strategies()
        .hook(
            "double",
            FnHook::new(|call: HookCall<'_>| {
                Ok(Value::Int(call.value.as_int().unwrap_or_default() * 2))
            }),
        )
        .hook(
            "trim",
            FnHook::new(|call: HookCall<'_>| {
                Ok(call.value.as_str().unwrap_or_default().trim().into())
            })
            .returns(TypeRef::String),
        )
        .hook(
            "shout",
            FnHook::new(|call: HookCall<'_>| {
                Ok(call.value.as_str().unwrap_or_default().to_uppercase().into())
            }),
        )
        .hook(
            "summary",
            FnHook::new(|call: HookCall<'_>| {
                let parent = call
                    .source
                    .as_any()
                    .downcast_ref::<Parent>()
                    .ok_or_else(|| Error::invalid_operation("not a parent"))?;
                Ok(format!("{} via {}", parent.name.lock(), call.member).into())
            }),
        )
}

fn engine() -> Engine {
    builder().build()
}

fn adapt(engine: &Engine, object: ObjectRef, contract: &str) -> Arc<AdaptedInstance> {
    engine
        .adapt(Some(object), contract, None)
        .expect("adaptation failed")
        .expect("instance was present")
}

fn view(value: &Value) -> &AdaptedInstance {
    AdaptedInstance::from_value(value).expect("value is not an adapted view")
}

fn same_object(a: &ObjectRef, b: &ObjectRef) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

#[test]
fn test_synthesis_is_idempotent() {
    let engine = engine();
    let first = engine.synthesize("demo::Parent", &["IParent"]).unwrap();
    let second = engine.synthesize("demo::Parent", &["IParent", "IParent"]).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(engine.cache().builds(), 1);
    assert_eq!(first.name(), "IParent@demo::Parent");
    assert_eq!(first.implemented(), &["IParent", "INamed"]);

    let a = adapt(&engine, parent(None), "IParent");
    let b = adapt(&engine, parent(None), "IParent");
    assert!(Arc::ptr_eq(a.adapter_type(), b.adapter_type()));
    assert_eq!(engine.cache().builds(), 1);
}

#[test]
fn test_contract_order_is_significant() {
    let engine = engine();
    let ab = engine.synthesize("demo::Parent", &["IParent", "INamed"]).unwrap();
    let ba = engine.synthesize("demo::Parent", &["INamed", "IParent"]).unwrap();

    assert!(!Arc::ptr_eq(&ab, &ba));
    assert_eq!(ba.name(), "INamed+IParent@demo::Parent");
    assert_eq!(engine.cache().len(), 2);
}

#[test]
fn test_escape_hatch_returns_the_wrapped_object() {
    let engine = engine();
    let source = parent(None);
    let adapted = adapt(&engine, source.clone(), "IParent");

    assert!(same_object(adapted.inner(), &source));
    assert!(adapted.services().is_none());

    let as_object: ObjectRef = adapted.clone();
    let hatch = as_object.as_adapted().expect("adapted views expose the escape hatch");
    assert!(same_object(hatch.inner(), &source));
    assert!(hatch.implements("IParent"));
    assert!(hatch.implements("INamed"));
    assert!(!hatch.implements("IChild"));
}

#[test]
fn test_properties_read_and_write_through() {
    let engine = engine();
    let source = parent(None);
    let adapted = adapt(&engine, source.clone(), "IParent");

    assert_eq!(adapted.get("Name").unwrap(), Value::from("Ada"));
    adapted.set("Name", "Grace").unwrap();

    let parent = source.as_any().downcast_ref::<Parent>().unwrap();
    assert_eq!(*parent.name.lock(), "Grace");
    assert_eq!(adapted.get("Name").unwrap(), Value::from("Grace"));
}

#[test]
fn test_nested_contract_is_adapted() {
    let engine = engine();
    let adapted = adapt(&engine, parent(None), "IParent");

    let child = adapted.call("GetChild", vec![]).unwrap();
    let child = view(&child);
    assert_eq!(child.get("Test").unwrap(), Value::from("yikes"));
    assert_eq!(child.adapter_type().name(), "IChild@demo::Child");
}

#[test]
fn test_arrays_adapt_element_wise() {
    let engine = engine();
    let adapted = adapt(
        &engine,
        parent(Some(vec![child("a"), child("b"), child("c")])),
        "IParent",
    );

    let children = adapted.get("Children").unwrap();
    let children = children.as_array().unwrap();
    assert_eq!(children.len(), 3);
    let tests: Vec<Value> = children
        .iter()
        .map(|c| view(c).get("Test").unwrap())
        .collect();
    assert_eq!(tests, vec![Value::from("a"), Value::from("b"), Value::from("c")]);

    let empty = adapt(&engine, parent(None), "IParent");
    assert_eq!(empty.get("Children").unwrap(), Value::Null);
}

#[test]
fn test_arguments_are_unwrapped() {
    let engine = engine();
    let adapted = adapt(&engine, parent(None), "IParent");
    let child = adapt(&engine, child("x"), "IChild");

    let adopted = adapted
        .call("Adopt", vec![Value::Object(child)])
        .unwrap();
    assert_eq!(adopted, Value::Bool(true));
}

#[test]
fn test_unresolved_member_is_not_implemented() {
    let engine = engine();
    let ty = engine.synthesize("demo::Parent", &["IParent"]).unwrap();

    let plan = &ty.slot(&SlotKey::get("Missing")).unwrap().plan;
    assert!(matches!(plan.target, BindingTarget::Unresolved { .. }));
    assert!(ty.diagnostics().iter().any(|d| {
        d.severity == Severity::Warning && d.location.as_deref() == Some("IParent.Missing")
    }));

    let adapted = adapt(&engine, parent(None), "IParent");
    let err = adapted.get("Missing").unwrap_err();
    assert!(err.is_not_implemented());
    assert_eq!(
        err,
        Error::not_implemented("IParent@demo::Parent", "Missing")
    );
}

#[test]
fn test_unexposed_slot_is_invalid() {
    let engine = engine();
    let adapted = adapt(&engine, parent(None), "IParent");

    let err = adapted.set("Children", Value::Null).unwrap_err();
    assert!(matches!(err, Error::InvalidOperation { .. }));
}

#[test]
fn test_indexers_by_arity() {
    let engine = engine();
    let adapted = adapt(&engine, parent(None), "IParent");

    assert_eq!(
        adapted.index(vec![Value::Int(3)]).unwrap(),
        Value::from("row 3")
    );
    assert_eq!(
        adapted.index(vec![Value::Int(1), Value::Int(2)]).unwrap(),
        Value::from("cell 1,2")
    );
    assert!(adapted.index(vec![]).is_err());
}

#[test]
fn test_integral_and_enum_conversions() {
    let engine = engine();
    let adapted = adapt(&engine, parent(None), "IParent");

    assert_eq!(
        adapted.call("Shade", vec![]).unwrap(),
        Value::Enum {
            ty: "Color".into(),
            value: 1
        }
    );
    assert_eq!(engine.registry().enum_info("Color").unwrap().repr, IntWidth::I8);
}

#[test]
fn test_argument_count_is_checked() {
    let engine = engine();
    let adapted = adapt(&engine, parent(None), "IParent");

    let err = adapted.call("Add", vec![Value::Int(1)]).unwrap_err();
    assert!(matches!(err, Error::InvalidOperation { .. }));

    // Reflective calls reach the slot directly and are checked there.
    let recv: &dyn Object = &*adapted;
    let info = recv.type_info();
    let add = info.methods_named("Add").next().unwrap();
    let err = (add.invoke)(Some(recv), &Invocation::new(vec![Value::Int(1)])).unwrap_err();
    assert!(matches!(err, Error::Argument { .. }));
    let sum = (add.invoke)(
        Some(recv),
        &Invocation::new(vec![Value::Int(2), Value::Int(3)]),
    )
    .unwrap();
    assert_eq!(sum, Value::Int(8));
}

#[test]
fn test_static_and_extension_bindings() {
    let engine = engine();
    let adapted = adapt(&engine, child("yikes"), "IChild");

    assert_eq!(adapted.call("Version", vec![]).unwrap(), Value::from("1.0"));
    assert_eq!(
        adapted.call("Describe", vec![]).unwrap(),
        Value::from("child yikes")
    );

    let ty = adapted.adapter_type();
    let plan = &ty.slot(&SlotKey::call("Describe", 0)).unwrap().plan;
    assert!(matches!(
        plan.target,
        BindingTarget::Method {
            shape: mimic_ir::CallShape::Extension,
            ..
        }
    ));
}

#[test]
fn test_extension_receiver_mismatch() {
    let engine = engine();
    let err = engine
        .adapt(Some(parent(None)), "IDescribed", None)
        .unwrap_err();

    match err {
        Error::InvalidOperation { message } => {
            assert!(message.contains("does not accept 'demo::Parent'"), "{}", message)
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let described = adapt(&engine, child("ok"), "IDescribed");
    assert_eq!(
        described.call("Describe", vec![]).unwrap(),
        Value::from("child ok")
    );
}

#[test]
fn test_parameter_and_return_hooks() {
    let engine = engine();
    let adapted = adapt(&engine, parent(None), "IParent");

    // b is doubled after conversion.
    assert_eq!(
        adapted.call("Add", vec![Value::Int(1), Value::Int(2)]).unwrap(),
        Value::Int(5)
    );
    assert_eq!(
        adapted.call("Greet", vec!["  bob ".into()]).unwrap(),
        Value::from("HI BOB")
    );
}

#[test]
fn test_execution_hook() {
    let engine = engine();
    let adapted = adapt(&engine, parent(None), "IParent");

    assert_eq!(
        adapted.call("Summary", vec![]).unwrap(),
        Value::from("Ada via Summary")
    );

    let ty = adapted.adapter_type();
    let plan = &ty.slot(&SlotKey::call("Summary", 0)).unwrap().plan;
    assert_eq!(
        plan.target,
        BindingTarget::Hook {
            name: "summary".into()
        }
    );
}

#[test]
fn test_generic_return_is_rebound() {
    let engine = engine();
    let adapted = adapt(&engine, parent(None), "IParent");

    let found = adapted
        .call_generic("Find", vec![TypeRef::named("IChild")], vec!["yikes".into()])
        .unwrap();
    assert_eq!(view(&found).get("Test").unwrap(), Value::from("yikes"));

    let err = adapted
        .call_generic("Find", vec![TypeRef::named("IOpaque")], vec!["x".into()])
        .unwrap_err();
    assert!(err.is_generation());

    let err = adapted.call("Find", vec!["x".into()]).unwrap_err();
    assert!(matches!(err, Error::Argument { .. }));
}

#[test]
fn test_dynamic_members() {
    let engine = engine();
    let bag: ObjectRef = Arc::new(Bag::default());
    let adapted = adapt(&engine, bag, "IBag");

    assert_eq!(adapted.get("Title").unwrap(), Value::Null);
    adapted.set("Title", "inventory").unwrap();
    assert_eq!(adapted.get("Title").unwrap(), Value::from("inventory"));

    assert_eq!(adapted.index(vec!["apples".into()]).unwrap(), Value::Null);
    adapted
        .set_index(vec!["apples".into()], Value::Int(3))
        .unwrap();
    assert_eq!(
        adapted.index(vec!["apples".into()]).unwrap(),
        Value::Int(3)
    );
}

#[test]
fn test_adapted_view_can_be_adapted_again() {
    let engine = engine();
    let adapted: ObjectRef = adapt(&engine, parent(None), "IParent");

    let named = adapt(&engine, adapted.clone(), "INamed");
    assert_eq!(named.adapter_type().name(), "INamed@IParent@demo::Parent");
    assert_eq!(named.get("Name").unwrap(), Value::from("Ada"));
    assert!(same_object(named.inner(), &adapted));
}

#[test]
fn test_adapt_all() {
    let engine = engine();
    let adapted = engine
        .adapt_all(Some(parent(None)), &["INamed", "IParent"], None)
        .unwrap()
        .unwrap();

    assert!(adapted.adapter_type().implements("INamed"));
    assert!(adapted.adapter_type().implements("IParent"));
    assert_eq!(adapted.get("Name").unwrap(), Value::from("Ada"));
}

#[test]
fn test_services_are_shared_with_nested_views() {
    let engine = engine();
    let services = ServiceMap::new().with(42u32).into_ref();
    let adapted = engine
        .adapt(Some(parent(None)), "IParent", Some(services))
        .unwrap()
        .unwrap();

    let child = adapted.call("GetChild", vec![]).unwrap();
    let resolved = view(&child).services().and_then(|s| s.resolve::<u32>());
    assert_eq!(resolved.as_deref(), Some(&42));
}

#[test]
fn test_null_instance_adapts_to_none() {
    let engine = engine();
    assert!(engine.adapt(None, "IParent", None).unwrap().is_none());
    assert!(
        engine
            .adapt_all(None, &["IParent", "INamed"], None)
            .unwrap()
            .is_none()
    );
    assert!(engine.cache().is_empty());
}

#[test]
fn test_argument_errors() {
    let engine = engine();
    fn is_argument<T>(result: Result<T>) -> bool {
        matches!(result, Err(Error::Argument { .. }))
    }

    assert!(is_argument(engine.adapt(Some(parent(None)), "", None)));
    assert!(is_argument(engine.adapt(Some(parent(None)), "INope", None)));
    assert!(is_argument(engine.adapt(None, "INope", None)));
    assert!(is_argument(engine.adapt_all(Some(parent(None)), &[], None)));
    assert!(is_argument(engine.synthesize("", &["IParent"])));
    assert!(is_argument(engine.synthesize("demo::Unknown", &["IParent"])));
    assert_eq!(engine.cache().builds(), 0);
}

#[test]
fn test_failed_synthesis_is_not_cached() {
    let engine = engine();
    let key = SynthesisKey::new("demo::Parent", ["IBroken"]);

    for attempt in 1..=2 {
        let err = engine.synthesize("demo::Parent", &["IBroken"]).unwrap_err();
        assert!(err.is_generation(), "{:?}", err);
        assert_eq!(engine.cache().builds(), attempt);
        assert!(engine.cache().get(&key).is_none());
    }
}

#[test]
fn test_concurrent_synthesis_builds_once() {
    let engine = engine();

    let types = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine = engine.clone();
                scope.spawn(move || adapt(&engine, parent(None), "IParent").adapter_type().clone())
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>()
    });

    assert_eq!(engine.cache().builds(), 1);
    assert!(types.iter().all(|ty| Arc::ptr_eq(ty, &types[0])));
}

#[test]
fn test_imported_types_are_reused() {
    let first = engine();
    let ty = first.synthesize("demo::Parent", &["IParent"]).unwrap();

    let second = builder().import(ty.clone()).build();
    let reused = second.synthesize("demo::Parent", &["IParent"]).unwrap();
    assert!(Arc::ptr_eq(&ty, &reused));
    assert_eq!(second.cache().builds(), 0);
}

struct AbortEmit {
    calls: Arc<AtomicUsize>,
}

impl Plugin for AbortEmit {
    fn name(&self) -> &'static str {
        "abort-emit"
    }

    fn on_before_phase(&self, phase: &str, ctx: &mut SynthesisContext<'_>) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if phase == "emit" {
            return Err(Error::generation(ctx.request.adapter_name(), "emit disabled"));
        }
        Ok(())
    }
}

#[test]
fn test_plugin_can_abort_synthesis() {
    let calls = Arc::new(AtomicUsize::new(0));
    let engine = builder()
        .plugin(AbortEmit {
            calls: calls.clone(),
        })
        .build();

    let err = engine.synthesize("demo::Child", &["IChild"]).unwrap_err();
    assert_eq!(
        err,
        Error::generation("IChild@demo::Child", "emit disabled")
    );
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert!(engine.cache().is_empty());
}

const HIERARCHY: &str = r#"
[contracts.IBase]

[[contracts.IBase.members]]
kind = "property"
name = "Name"
type = "string"

[contracts.ILeft]
extends = ["IBase"]

[[contracts.ILeft.members]]
kind = "method"
name = "Greet"
returns = "string"
params = [{ name = "other", type = "string" }]

[contracts.IRight]
extends = ["IBase"]

[[contracts.IRight.members]]
kind = "method"
name = "Add"
returns = "i64"
params = [{ name = "a", type = "i64" }, { name = "b", type = "i64" }]

[contracts.IDerived]
extends = ["ILeft", "IRight"]

[contracts.IReadName]
extends = ["IBase"]

[[contracts.IReadName.members]]
kind = "property"
name = "Name"
type = "string"
access = "get"
"#;

fn hierarchy_engine() -> Engine {
    let manifest = Manifest::from_str(HIERARCHY).expect("Failed to parse test manifest");
    Engine::builder()
        .manifest(manifest)
        .source_type(CHILD_TYPE.clone())
        .source_type(PARENT_TYPE.clone())
        .build()
}

#[test]
fn test_diamond_inheritance() {
    let engine = hierarchy_engine();
    let ty = engine.synthesize("demo::Parent", &["IDerived"]).unwrap();

    assert_eq!(ty.implemented(), &["IDerived", "ILeft", "IBase", "IRight"]);
    let slots: Vec<String> = ty.plans().map(|plan| plan.slot.to_string()).collect();
    assert_eq!(slots, vec!["call Greet/1", "get Name", "set Name", "call Add/2"]);

    let plan = serde_json::to_value(&ty.slot(&SlotKey::get("Name")).unwrap().plan).unwrap();
    assert_eq!(plan["contract"], "IBase");
    assert_eq!(plan["slot"]["kind"], "get");

    let adapted = adapt(&engine, parent(None), "IDerived");
    assert_eq!(adapted.get("Name").unwrap(), Value::from("Ada"));
    assert_eq!(
        adapted.call("Add", vec![Value::Int(2), Value::Int(3)]).unwrap(),
        Value::Int(5)
    );
}

#[test]
fn test_narrower_redeclaration_keeps_inherited_setter() {
    let engine = hierarchy_engine();
    let adapted = adapt(&engine, parent(None), "IReadName");

    assert!(adapted.adapter_type().implements("IBase"));
    let setter = adapted.adapter_type().slot(&SlotKey::set("Name")).unwrap();
    assert_eq!(setter.plan.contract, "IBase");

    adapted.set("Name", "Grace").unwrap();
    assert_eq!(adapted.get("Name").unwrap(), Value::from("Grace"));
}
