//! Plan-composition invariants, exercised through the public registry and
//! plan API rather than through full record assembly.

use rigid_plan::{
    ProcessorRegistry, SerializerKind, SerializingPlan, TypeContext,
};
use rigid_resolve::{
    CompilationIndex, CompilationIndexBuilder, IndexEntry, NoArtifacts, TypeResolver,
};
use rigid_types::tree::{Annotation, AnnotationArg, Ident, TypeNode};
use rigid_types::Span;

fn sp() -> Span {
    Span::point(1, 1)
}

fn ann(name: &str, args: Vec<AnnotationArg>) -> Annotation {
    Annotation::new(Ident::new(name, sp()), args)
}

fn default_to(provider: &str) -> Annotation {
    ann("Default", vec![AnnotationArg::Ref(provider.into())])
}

fn marked_index(simple: &str, qualified: &str) -> CompilationIndex {
    let mut builder = CompilationIndexBuilder::new();
    builder
        .add(
            simple,
            IndexEntry {
                qualified_name: qualified.into(),
                annotations: vec![ann("Fixed", vec![])],
            },
        )
        .unwrap();
    builder.finish()
}

// ══════════════════════════════════════════════════════════════════════════════
// Wrapping order
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn wrap_null_always_acquires_default_first() {
    // A nullable user type: the plan must be Nullable(WithDefault(Fuzzy)),
    // never Nullable(Fuzzy) directly.
    let index = marked_index("Counterparty", "com.app.Counterparty");
    let resolver = TypeResolver::new("Deal.rg", "com.app", &[], &NoArtifacts, &index).unwrap();

    let mut node = TypeNode::named("Counterparty", sp());
    node.nullable = true;
    node.annotations.push(default_to("com.app.noOne"));
    let ctx = TypeContext::new(&node, &resolver, "Deal.rg");

    let plan = ProcessorRegistry::new().build(&ctx).unwrap();
    match plan {
        SerializingPlan::Nullable(inner) => match *inner {
            SerializingPlan::WithDefault { ref provider, ref inner } => {
                assert_eq!(provider, "com.app.noOne");
                assert!(matches!(**inner, SerializingPlan::Fuzzy { .. }));
            }
            other => panic!("nullable must wrap a defaulted plan, got {other:?}"),
        },
        other => panic!("expected Nullable, got {other:?}"),
    }
}

#[test]
fn explicit_provider_beats_intrinsic_default() {
    // Int self-provides a zero default, but an explicit @Default provider
    // still forces a WithDefault wrapper.
    let index = CompilationIndex::empty();
    let resolver = TypeResolver::new("Deal.rg", "com.app", &[], &NoArtifacts, &index).unwrap();

    let mut node = TypeNode::named("Int", sp());
    node.nullable = true;
    node.annotations.push(default_to("deals.zero"));
    let ctx = TypeContext::new(&node, &resolver, "Deal.rg");

    let plan = ProcessorRegistry::new().build(&ctx).unwrap();
    assert!(matches!(
        plan,
        SerializingPlan::Nullable(ref inner)
            if matches!(**inner, SerializingPlan::WithDefault { .. })
    ));
}

// ══════════════════════════════════════════════════════════════════════════════
// wrap_default idempotence
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn wrap_default_is_idempotent() {
    let index = CompilationIndex::empty();
    let resolver = TypeResolver::new("Deal.rg", "com.app", &[], &NoArtifacts, &index).unwrap();
    let node = TypeNode::named("Int", sp());
    let ctx = TypeContext::new(&node, &resolver, "Deal.rg");

    // A self-defaulting kind passes through unchanged.
    let int_plan = SerializingPlan::leaf(SerializerKind::Int(rigid_plan::IntWidth::I32));
    let once = int_plan.clone().wrap_default(&ctx).unwrap();
    assert_eq!(once, int_plan);

    // An already-wrapped plan passes through unchanged, even when the node
    // carries a provider annotation.
    let mut annotated = TypeNode::named("Int", sp());
    annotated.annotations.push(default_to("deals.zero"));
    let annotated_ctx = TypeContext::new(&annotated, &resolver, "Deal.rg");
    let wrapped = int_plan.wrap_default(&annotated_ctx).unwrap();
    assert!(matches!(wrapped, SerializingPlan::WithDefault { .. }));
    let twice = wrapped.clone().wrap_default(&annotated_ctx).unwrap();
    assert_eq!(twice, wrapped);
}

// ══════════════════════════════════════════════════════════════════════════════
// Arity
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn built_collection_plans_have_exact_arity() {
    let index = CompilationIndex::empty();
    let resolver = TypeResolver::new("Deal.rg", "com.app", &[], &NoArtifacts, &index).unwrap();

    let mut list = TypeNode::named("List", sp());
    list.annotations.push(ann("Size", vec![AnnotationArg::Int(3)]));
    list.args.push(TypeNode::named("Int", sp()));
    let list_ctx = TypeContext::new(&list, &resolver, "Deal.rg");
    match ProcessorRegistry::new().build(&list_ctx).unwrap() {
        SerializingPlan::Explicit { kind, children } => {
            assert_eq!(kind, SerializerKind::FixedList { max_size: 3 });
            assert_eq!(children.len(), 1);
        }
        other => panic!("expected Explicit list, got {other:?}"),
    }

    let mut map = TypeNode::named("Map", sp());
    map.annotations.push(ann("Size", vec![AnnotationArg::Int(5)]));
    map.args.push({
        let mut key = TypeNode::named("String", sp());
        key.annotations
            .push(ann("Ascii", vec![AnnotationArg::Int(4)]));
        key
    });
    map.args.push(TypeNode::named("Bool", sp()));
    let map_ctx = TypeContext::new(&map, &resolver, "Deal.rg");
    match ProcessorRegistry::new().build(&map_ctx).unwrap() {
        SerializingPlan::Explicit { kind, children } => {
            assert_eq!(kind, SerializerKind::FixedMap { max_size: 5 });
            assert_eq!(children.len(), 2);
            // Key first, value second.
            assert!(matches!(
                children[0],
                SerializingPlan::Explicit {
                    kind: SerializerKind::AsciiString { max_length: 4 },
                    ..
                }
            ));
            assert!(matches!(
                children[1],
                SerializingPlan::Explicit {
                    kind: SerializerKind::Bool,
                    ..
                }
            ));
        }
        other => panic!("expected Explicit map, got {other:?}"),
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Context queries
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn supported_collection_flag_matches_registry() {
    let index = CompilationIndex::empty();
    let resolver = TypeResolver::new("Deal.rg", "com.app", &[], &NoArtifacts, &index).unwrap();

    for (name, expected) in [("List", true), ("Set", true), ("Map", true), ("Int", false)] {
        let node = TypeNode::named(name, sp());
        let ctx = TypeContext::new(&node, &resolver, "Deal.rg");
        assert_eq!(ctx.is_supported_collection(), expected, "{name}");
    }
}

#[test]
fn context_rewrites_reach_every_level() {
    let index = CompilationIndex::empty();
    let resolver = TypeResolver::new("Deal.rg", "com.app", &[], &NoArtifacts, &index).unwrap();

    let mut list = TypeNode::named("List", sp());
    list.annotations.push(ann("Size", vec![AnnotationArg::Int(2)]));
    let mut inner = TypeNode::named("String", sp());
    inner.nullable = true;
    list.args.push(inner);

    let ctx = TypeContext::new(&list, &resolver, "Deal.rg");
    let stripped = ctx.strip_annotations();
    assert_eq!(stripped.render(), "List<String?>");

    let attached = ctx.attach_annotation(&ann("Fixed", vec![]));
    assert!(attached.annotations.iter().any(|a| a.name.name == "Fixed"));
    assert!(attached.args[0]
        .annotations
        .iter()
        .any(|a| a.name.name == "Fixed"));
    assert!(attached.args[0].nullable);
}
