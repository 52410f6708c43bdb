use objmodel_core::{
    Body, CallArgs, ClassDecl, ClassModality, ConstructionError, Delegation, DelegationArgs,
    InterfaceDecl, MemberSlot, ParamDecl, PrimaryCtor, RuntimeError, SecondaryCtorDecl, TypeRef,
    Value, Visibility,
};
use objmodel_registry::DeclTable;
use std::sync::Arc;

use super::{emit, object, returns, runtime, runtime_with};
use crate::{Runtime, RuntimeConfig};

fn emitting_value(line: &'static str, value: &'static str) -> Body {
    Body::new(move |ctx| {
        ctx.emit(line.to_string());
        Ok(Value::from(value))
    })
}

#[test]
fn init_units_run_in_declaration_order() {
    let mut rt = runtime(vec![
        ClassDecl::new("Initialization")
            .with_property(
                MemberSlot::val("one", TypeRef::String),
                emitting_value("one", "1"),
            )
            .with_init(emit("first init"))
            .with_property(
                MemberSlot::val("two", TypeRef::String),
                emitting_value("two", "2"),
            )
            .with_init(emit("second init"))
            .into(),
    ]);

    let handle = object(rt.construct("Initialization", CallArgs::new()).unwrap());
    assert_eq!(
        rt.journal().lines(),
        ["one", "first init", "two", "second init"]
    );
    assert_eq!(rt.get(handle, "two").unwrap(), Value::from("2"));
}

#[test]
fn superclass_initialization_completes_first() {
    let mut rt = runtime(vec![
        ClassDecl::new("Parent")
            .open()
            .with_init(emit("parent a"))
            .with_init(emit("parent b"))
            .into(),
        ClassDecl::new("Child")
            .with_superclass("Parent")
            .with_init(emit("child"))
            .into(),
    ]);

    rt.construct("Child", CallArgs::new()).unwrap();
    assert_eq!(rt.journal().lines(), ["parent a", "parent b", "child"]);
}

#[test]
fn this_then_super_delegation_order() {
    let mut rt = runtime(vec![
        ClassDecl::new("Base").open().with_init(emit("base init")).into(),
        ClassDecl::new("Derived")
            .with_superclass("Base")
            .with_init(emit("derived init"))
            .with_secondary(
                SecondaryCtorDecl::new(
                    vec![
                        ParamDecl::new("a", TypeRef::Int),
                        ParamDecl::new("b", TypeRef::Int),
                    ],
                    Delegation::This(DelegationArgs::forward(&["a"])),
                )
                .with_body(emit("two-arg body")),
            )
            .with_secondary(
                SecondaryCtorDecl::new(
                    vec![ParamDecl::new("a", TypeRef::Int)],
                    Delegation::Super(DelegationArgs::none()),
                )
                .with_body(emit("one-arg body")),
            )
            .into(),
    ]);

    rt.construct("Derived", CallArgs::new().positional(1).positional(2))
        .unwrap();
    assert_eq!(
        rt.journal().lines(),
        ["base init", "derived init", "one-arg body", "two-arg body"]
    );
}

#[test]
fn promoted_parameters_become_properties() {
    let mut rt = runtime(vec![
        ClassDecl::new("Person")
            .with_primary(PrimaryCtor::new(vec![
                ParamDecl::new("name", TypeRef::String).val(),
                ParamDecl::new("age", TypeRef::Int).var(),
                ParamDecl::new("nickname", TypeRef::String).with_default_value("none"),
            ]))
            .with_property(
                MemberSlot::val("greeting", TypeRef::String),
                Body::new(|ctx| Ok(Value::string(format!("Hi, {}", ctx.arg_str("name")?)))),
            )
            .into(),
    ]);

    let person = object(
        rt.construct("Person", CallArgs::new().positional("Ann").positional(30))
            .unwrap(),
    );
    assert_eq!(rt.get(person, "name").unwrap(), Value::from("Ann"));
    assert_eq!(rt.get(person, "greeting").unwrap(), Value::from("Hi, Ann"));

    rt.set(person, "age", Value::from(31)).unwrap();
    assert_eq!(rt.get(person, "age").unwrap(), Value::from(31));
    assert!(matches!(
        rt.set(person, "name", Value::from("Bob")),
        Err(RuntimeError::ReadOnlyProperty { .. })
    ));
    assert!(matches!(
        rt.get(person, "nickname"),
        Err(RuntimeError::UnknownMember { .. })
    ));
}

#[test]
fn implicit_super_needs_zero_argument_constructor() {
    let mut rt = runtime(vec![
        ClassDecl::new("Animal")
            .open()
            .with_primary(PrimaryCtor::new(vec![ParamDecl::new("name", TypeRef::String)]))
            .into(),
        ClassDecl::new("Dog").with_superclass("Animal").into(),
    ]);

    let err = rt.construct("Dog", CallArgs::new()).unwrap_err();
    assert_eq!(
        err,
        ConstructionError::NoDefaultSuperConstructor {
            class: "Dog".into(),
            superclass: "Animal".into(),
        }
    );
}

#[test]
fn implicit_super_reports_failures_inside_the_default_constructor() {
    let mut rt = runtime(vec![
        ClassDecl::new("Animal")
            .open()
            .with_primary(PrimaryCtor::new(vec![ParamDecl::new("name", TypeRef::String)]))
            .with_secondary(SecondaryCtorDecl::new(
                vec![],
                Delegation::This(DelegationArgs::new(|_| Ok(CallArgs::new().positional(42)))),
            ))
            .into(),
        ClassDecl::new("Dog").with_superclass("Animal").into(),
    ]);

    let err = rt.construct("Dog", CallArgs::new()).unwrap_err();
    assert!(matches!(
        err,
        ConstructionError::NoMatchingConstructor { ref class, .. }
            | ConstructionError::Bind { ref class, .. } if class == "Animal"
    ));
    assert_eq!(rt.heap().live_count(), 0);
}

#[test]
fn header_super_arguments_reach_the_superclass() {
    let mut rt = runtime(vec![
        ClassDecl::new("Animal")
            .open()
            .with_primary(PrimaryCtor::new(vec![
                ParamDecl::new("name", TypeRef::String).val(),
            ]))
            .into(),
        ClassDecl::new("Dog")
            .with_superclass("Animal")
            .with_primary(
                PrimaryCtor::new(vec![ParamDecl::new("breed", TypeRef::String)]).with_super_args(
                    DelegationArgs::new(|scope| {
                        Ok(CallArgs::new().positional(format!("{} dog", scope.get("breed")?)))
                    }),
                ),
            )
            .into(),
    ]);

    let dog = object(rt.construct("Dog", CallArgs::new().positional("Husky")).unwrap());
    assert_eq!(rt.get(dog, "name").unwrap(), Value::from("Husky dog"));
}

#[test]
fn cyclic_this_delegation_is_detected() {
    let mut rt = runtime(vec![
        ClassDecl::new("Loop")
            .with_secondary(SecondaryCtorDecl::new(
                vec![ParamDecl::new("n", TypeRef::Int)],
                Delegation::This(DelegationArgs::new(|_| Ok(CallArgs::new().positional("s")))),
            ))
            .with_secondary(SecondaryCtorDecl::new(
                vec![ParamDecl::new("s", TypeRef::String)],
                Delegation::This(DelegationArgs::new(|_| Ok(CallArgs::new().positional(1)))),
            ))
            .into(),
    ]);

    let err = rt.construct("Loop", CallArgs::new().positional(7)).unwrap_err();
    assert!(matches!(
        err,
        ConstructionError::CyclicDelegation { class, constructor }
            if class == "Loop" && constructor == "Loop(Int)"
    ));
    assert_eq!(rt.heap().live_count(), 0);
}

#[test]
fn tied_constructors_are_ambiguous() {
    let mut rt = runtime(vec![
        ClassDecl::new("Shape")
            .with_secondary(SecondaryCtorDecl::new(
                vec![ParamDecl::new("sides", TypeRef::Int).with_default_value(3)],
                Delegation::Implicit,
            ))
            .with_secondary(SecondaryCtorDecl::new(
                vec![ParamDecl::new("name", TypeRef::String).with_default_value("square")],
                Delegation::Implicit,
            ))
            .into(),
    ]);

    let err = rt.construct("Shape", CallArgs::new()).unwrap_err();
    assert!(matches!(
        err,
        ConstructionError::AmbiguousConstructor { candidates, .. } if candidates.len() == 2
    ));

    // An argument picks one.
    assert!(rt.construct("Shape", CallArgs::new().positional(4)).is_ok());
}

#[test]
fn no_viable_constructor_lists_candidates() {
    let mut rt = runtime(vec![
        ClassDecl::new("Pair")
            .with_secondary(SecondaryCtorDecl::new(
                vec![ParamDecl::new("a", TypeRef::Int)],
                Delegation::Implicit,
            ))
            .with_secondary(SecondaryCtorDecl::new(
                vec![ParamDecl::new("s", TypeRef::String)],
                Delegation::Implicit,
            ))
            .into(),
    ]);

    let err = rt
        .construct("Pair", CallArgs::new().positional(true))
        .unwrap_err();
    assert_eq!(
        err,
        ConstructionError::NoMatchingConstructor {
            class: "Pair".into(),
            candidates: vec!["Pair(Int)".into(), "Pair(String)".into()],
        }
    );
}

#[test]
fn private_constructor_is_rejected_from_outside() {
    let mut rt = runtime(vec![
        ClassDecl::new("DoNotCreateMe")
            .with_primary(
                PrimaryCtor::new(vec![ParamDecl::new("title", TypeRef::String)])
                    .with_visibility(Visibility::Private),
            )
            .into(),
    ]);

    let err = rt
        .construct("DoNotCreateMe", CallArgs::new().positional("x"))
        .unwrap_err();
    assert!(matches!(
        err,
        ConstructionError::InaccessibleConstructor {
            visibility: Visibility::Private,
            ..
        }
    ));
    assert_eq!(rt.heap().live_count(), 0);
}

#[test]
fn non_instantiable_types() {
    let mut rt = runtime(vec![
        InterfaceDecl::new("Clickable").into(),
        ClassDecl::new("Shape")
            .with_modality(ClassModality::Abstract)
            .into(),
    ]);

    assert!(matches!(
        rt.construct("Clickable", CallArgs::new()),
        Err(ConstructionError::NotInstantiable { .. })
    ));
    assert!(matches!(
        rt.construct("Shape", CallArgs::new()),
        Err(ConstructionError::AbstractInstantiation { .. })
    ));
    assert_eq!(
        rt.construct("Missing", CallArgs::new()),
        Err(ConstructionError::UnknownType("Missing".into()))
    );
}

#[test]
fn failed_construction_frees_instance_and_keeps_journal() {
    let mut rt = runtime(vec![
        ClassDecl::new("Base").open().with_init(emit("base")).into(),
        ClassDecl::new("Broken")
            .with_superclass("Base")
            .with_init(Body::new(|_| Err(RuntimeError::failed("boom"))))
            .with_init(emit("never"))
            .into(),
    ]);

    let err = rt.construct("Broken", CallArgs::new()).unwrap_err();
    assert!(matches!(
        err,
        ConstructionError::Runtime { class, source }
            if class == "Broken" && *source == RuntimeError::failed("boom")
    ));
    assert_eq!(rt.journal().lines(), ["base"]);
    assert_eq!(rt.heap().live_count(), 0);
}

fn open_property_classes() -> Vec<objmodel_core::DeclEntry> {
    vec![
        ClassDecl::new("Base")
            .open()
            .with_property(
                MemberSlot::val("name", TypeRef::String).open(),
                returns("base"),
            )
            .with_init(Body::new(|ctx| {
                let name = ctx.get("name")?;
                ctx.emit(format!("name = {name}"));
                Ok(Value::Unit)
            }))
            .into(),
        ClassDecl::new("Derived")
            .with_superclass("Base")
            .with_property(
                MemberSlot::val("name", TypeRef::String).overriding(),
                returns("derived"),
            )
            .into(),
    ]
}

#[test]
fn open_property_read_during_superclass_init_is_null() {
    let mut rt = runtime(open_property_classes());

    let derived = object(rt.construct("Derived", CallArgs::new()).unwrap());
    assert_eq!(rt.take_journal(), vec!["name = null"]);
    assert_eq!(rt.get(derived, "name").unwrap(), Value::from("derived"));
    assert_eq!(rt.field(derived, "Base", "name").unwrap(), Value::from("base"));

    rt.construct("Base", CallArgs::new()).unwrap();
    assert_eq!(rt.take_journal(), vec!["name = base"]);
}

#[test]
fn strict_mode_rejects_uninitialized_reads() {
    let mut rt = runtime_with(
        open_property_classes(),
        RuntimeConfig::new().with_strict_uninitialized(true),
    );

    let err = rt.construct("Derived", CallArgs::new()).unwrap_err();
    assert!(matches!(
        err,
        ConstructionError::Runtime { class, source }
            if class == "Base"
                && matches!(*source, RuntimeError::UninitializedProperty { ref owner, .. } if owner == "Derived")
    ));
}

#[test]
fn runaway_construction_hits_the_depth_limit() {
    let mut rt = runtime_with(
        vec![
            ClassDecl::new("Recursive")
                .with_init(Body::new(|ctx| ctx.construct("Recursive", CallArgs::new())))
                .into(),
        ],
        RuntimeConfig::new().with_max_depth(8),
    );

    assert!(rt.construct("Recursive", CallArgs::new()).is_err());
    assert_eq!(rt.heap().live_count(), 0);
}

#[test]
fn inner_class_needs_an_outer_instance() {
    let mut rt = runtime(vec![
        ClassDecl::new("Outer")
            .with_member(MemberSlot::function(
                "makeInner",
                vec![],
                Body::new(|ctx| ctx.construct("Inner", CallArgs::new())),
            ))
            .into(),
        ClassDecl::new("Inner")
            .inner_of("Outer")
            .with_member(MemberSlot::function(
                "hasOuter",
                vec![],
                Body::new(|ctx| Ok(Value::Bool(ctx.outer().is_some()))),
            ))
            .into(),
    ]);

    assert!(matches!(
        rt.construct("Inner", CallArgs::new()),
        Err(ConstructionError::MissingOuterInstance { .. })
    ));

    let outer = object(rt.construct("Outer", CallArgs::new()).unwrap());
    let inner = object(rt.construct_inner(outer, "Inner", CallArgs::new()).unwrap());
    assert_eq!(rt.instance(inner).unwrap().outer(), Some(outer));

    let made = object(rt.invoke(outer, "makeInner", CallArgs::new()).unwrap());
    assert_eq!(
        rt.invoke(made, "hasOuter", CallArgs::new()).unwrap(),
        Value::Bool(true)
    );
}

#[test]
fn unfrozen_table_is_rejected() {
    let table = DeclTable::new();
    assert!(matches!(
        Runtime::with_table(Arc::new(table)),
        Err(ConstructionError::TableNotFrozen)
    ));
}
