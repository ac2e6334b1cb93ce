//! Forward references across a simulated compilation pass.

mod common;

use common::{at, sym};
use kestrel_types::{GlobalEnvironment, Modifiers, ParentSpec, Type, TypeError};

#[test]
fn test_three_references_one_placeholder() {
    let mut env = GlobalEnvironment::new();
    let root = env.root();

    let references: Vec<_> = (1..=3)
        .map(|line| env.reference_constant(root, sym("Foo"), at(line)))
        .collect();

    let Type::ConstantPlaceholder(id) = references[0] else {
        panic!("expected a constant placeholder, got {:?}", references[0]);
    };
    assert!(references.iter().all(|r| *r == references[0]));
    assert_eq!(env.placeholder(id).locations.len(), 3);

    env.try_define_class(root, "", Modifiers::default(), sym("Foo"), ParentSpec::Default)
        .unwrap();

    assert!(env.placeholder(id).replaced);
    assert!(env.check_placeholders().is_empty());
}

#[test]
fn test_every_use_site_is_reported() {
    let mut env = GlobalEnvironment::new();
    let root = env.root();
    for line in [3, 8, 21] {
        env.reference_constant(root, sym("Nowhere"), at(line));
    }

    let errors = env.check_placeholders();
    let lines: Vec<_> = errors
        .iter()
        .filter_map(TypeError::location)
        .map(|location| location.line())
        .collect();

    assert_eq!(lines, [3, 8, 21]);
    assert!(errors.iter().all(|e| !e.is_fatal()));
    assert_eq!(errors[0].to_string(), "undefined constant `Nowhere` at test.kes:3:1");
}

#[test]
fn test_definition_inside_forward_declared_namespace() {
    let mut env = GlobalEnvironment::new();
    let root = env.root();

    // `Geometry::Point` is used before `Geometry` is declared.
    let geometry = env.reference_namespace(root, sym("Geometry"), at(1));
    let point = env
        .try_define_class(geometry, "", Modifiers::default(), sym("Point"), ParentSpec::Default)
        .unwrap();
    assert_eq!(env.namespace_full_name(point), "Geometry::Point");

    let real = env.try_define_module(root, "", sym("Geometry")).unwrap();

    assert_eq!(env.subtype(real, sym("Point")), Some(&Type::Namespace(point)));
    assert_eq!(env.lookup_full_name("Geometry::Point"), Some(point));
    assert!(env.namespaces_are_equal(geometry, real));
    assert!(env.check_placeholders().is_empty());
}

#[test]
fn test_constant_inside_placeholder_namespace_resolves() {
    let mut env = GlobalEnvironment::new();
    let root = env.root();

    let config = env.reference_namespace(root, sym("Config"), at(1));
    env.reference_constant(config, sym("LIMIT"), at(2));
    env.try_define_module(root, "", sym("Config")).unwrap();
    env.define_constant(config, sym("LIMIT"), Type::Any);

    assert!(env.check_placeholders().is_empty());
}

#[test]
fn test_mixed_resolved_and_unresolved() {
    let mut env = GlobalEnvironment::new();
    let root = env.root();
    env.reference_constant(root, sym("Defined"), at(1));
    env.reference_subtype(root, sym("Undefined"), at(2));
    env.reference_namespace(root, sym("Ghost"), at(3));
    env.define_constant(root, sym("Defined"), Type::Nil);

    let errors = env.check_placeholders();

    assert_eq!(errors.len(), 2);
    assert!(matches!(&errors[0], TypeError::UndefinedConstant { name, .. } if name == "Undefined"));
    assert!(matches!(&errors[1], TypeError::UndefinedNamespace { name, .. } if name == "Ghost"));

    // A second pass sees nothing new.
    assert!(env.check_placeholders().is_empty());
}

#[test]
fn test_type_alias_does_not_satisfy_constant_reference() {
    let mut env = GlobalEnvironment::new();
    let root = env.root();
    env.define_subtype(root, sym("Alias"), Type::Any);

    let reference = env.reference_constant(root, sym("Alias"), at(5));
    let Type::ConstantPlaceholder(id) = reference else {
        panic!("expected a constant placeholder, got {reference:?}");
    };
    assert_eq!(env.placeholder(id).sibling, None);
    assert_eq!(env.subtype(root, sym("Alias")), Some(&Type::Any));

    let errors = env.check_placeholders();
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], TypeError::UndefinedConstant { name, .. } if name == "Alias"));
    assert_eq!(errors[0].location().map(|location| location.line()), Some(5));
}

#[test]
fn test_constant_does_not_satisfy_type_reference_until_defined() {
    let mut env = GlobalEnvironment::new();
    let root = env.root();
    env.define_constant(root, sym("VERSION"), Type::Any);
    env.reference_subtype(root, sym("VERSION"), at(2));
    env.reference_subtype(root, sym("VERSION"), at(4));

    let mut unresolved = env.clone();
    assert_eq!(unresolved.check_placeholders().len(), 2);

    env.define_subtype(root, sym("VERSION"), Type::Nil);
    assert!(env.check_placeholders().is_empty());
    assert_eq!(env.constant(root, sym("VERSION")), Some(&Type::Any));
}
