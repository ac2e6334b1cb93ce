//! Cross-environment copies and forks.
//!
//! Run with: `cargo test --test deep_copy_test`

mod common;

use common::{ancestry, class, mixin, sym};
use kestrel_mem::well_known;
use kestrel_types::{
    DeepCopier, GlobalEnvironment, Method, TypeParameter, Type, Variance, deep_copy_env,
};
use std::thread;

#[test]
fn test_union_structure_is_preserved() {
    let mut old = GlobalEnvironment::new();
    let a = class(&mut old, "A");
    let b = class(&mut old, "B");
    let ty = Type::union(vec![Type::Namespace(a), Type::nilable(Type::Namespace(b))]);

    let mut new = GlobalEnvironment::new();
    let copied = deep_copy_env(&ty, &old, &mut new);

    let Type::Union(elements) = &copied else {
        panic!("expected a union, got {copied:?}");
    };
    assert_eq!(elements.len(), 2);
    assert_eq!(elements[0].inspect(&new), Type::Namespace(a).inspect(&old));
    let Type::Nilable(inner) = &elements[1] else {
        panic!("expected a nilable, got {:?}", elements[1]);
    };
    assert_eq!(inner.inspect(&new), "B");
    assert_eq!(copied.inspect(&new), ty.inspect(&old));

    // The copies live in `new` only.
    let copied_a = elements[0].as_namespace().unwrap();
    new.define_method(copied_a, Method::new(sym("only_in_new")));
    assert!(old.method(a, sym("only_in_new")).is_none());
}

#[test]
fn test_singleton_cycle_terminates() {
    let mut old = GlobalEnvironment::new();
    let widget = class(&mut old, "Widget");
    let singleton = old.singleton_class_of(widget).unwrap();
    // Both directions of the cycle carry references back.
    old.define_method(widget, Method::new(sym("class")).returning(Type::Namespace(singleton)));
    old.define_method(singleton, Method::new(sym("new")).returning(Type::Namespace(widget)));

    let mut new = GlobalEnvironment::new();
    let copied = deep_copy_env(&Type::Namespace(singleton), &old, &mut new);
    let copied_singleton = copied.as_namespace().unwrap();
    let copied_widget = new.attached_object_of(copied_singleton).unwrap();

    assert_eq!(new.singleton_class_of(copied_widget), Some(copied_singleton));
    assert_eq!(
        new.method(copied_widget, sym("class")).unwrap().return_type,
        Type::Namespace(copied_singleton)
    );
    assert_eq!(
        new.method(copied_singleton, sym("new")).unwrap().return_type,
        Type::Namespace(copied_widget)
    );
}

#[test]
fn test_self_referential_generic_terminates() {
    let mut old = GlobalEnvironment::new();
    let node = class(&mut old, "Node");
    old.define_type_parameter(node, TypeParameter::new(sym("T"), Variance::Covariant));
    let generic = old.instantiate(node, vec![Type::Nil]);
    old.define_instance_variable(node, sym("next"), Type::nilable(generic.clone()));

    let mut new = GlobalEnvironment::new();
    let Type::Generic(copied) = deep_copy_env(&generic, &old, &mut new) else {
        panic!("expected a generic");
    };

    let copied_node = new.generic(copied).namespace;
    assert_eq!(
        new.instance_variable(copied_node, sym("next")),
        Some(&Type::nilable(Type::Generic(copied)))
    );
}

#[test]
fn test_one_copier_shares_copies() {
    let mut old = GlobalEnvironment::new();
    let shared = class(&mut old, "Shared");

    let mut new = GlobalEnvironment::new();
    let mut copier = DeepCopier::new(&old, &mut new);
    let first = copier.copy_type(&Type::Namespace(shared));
    let second = copier.copy_type(&Type::nilable(Type::Namespace(shared)));

    assert_eq!(Type::nilable(first), second);
}

#[test]
fn test_fork_copies_mixins_and_keeps_lookup() {
    let mut env = GlobalEnvironment::new();
    let greets = mixin(&mut env, "Greets");
    let person = class(&mut env, "Person");
    env.define_method(greets, Method::new(sym("greet")));
    env.include_mixin(person, greets);

    let mut forked = env.fork();
    let forked_person = forked.lookup_full_name("Person").unwrap();
    let forked_greets = forked.lookup_full_name("Greets").unwrap();

    assert_eq!(ancestry(&forked, forked_person), ancestry(&env, person));
    assert!(forked.method_in_namespace(forked_person, sym("greet")).is_some());

    forked.define_method(forked_greets, Method::new(sym("shout")));
    assert!(forked.method_in_namespace(forked_person, sym("shout")).is_some());
    assert!(env.method_in_namespace(person, sym("shout")).is_none());
}

#[test]
fn test_fork_keeps_std() {
    let env = GlobalEnvironment::new();
    let forked = env.fork();

    let int = forked.std_namespace(well_known::INT).unwrap();
    assert_eq!(forked.namespace_full_name(int), "Std::Int");
    assert_eq!(ancestry(&forked, int), ["Std::Int", "Std::Value"]);
    let value = forked.std_subtype(well_known::VALUE).unwrap().clone();
    assert!(forked.is_subtype(&Type::True, &value));
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_concurrent_readers() {
    let mut env = GlobalEnvironment::new();
    let base = class(&mut env, "Base");
    env.define_method(base, Method::new(sym("run")));
    let value = env.std_subtype(well_known::VALUE).unwrap().clone();

    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..100 {
                    assert!(env.method_in_namespace(base, sym("run")).is_some());
                    assert!(env.is_subtype(&Type::Namespace(base), &value));
                    assert_eq!(Type::Namespace(base).inspect(&env), "Base");
                }
            });
        }
    });
}

#[test]
fn test_concurrent_copies_from_one_source() {
    let mut old = GlobalEnvironment::new();
    let a = class(&mut old, "A");
    let b = class(&mut old, "B");
    let ty = Type::union(vec![Type::Namespace(a), Type::nilable(Type::Namespace(b))]);
    let expected = ty.inspect(&old);

    let results: Vec<String> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    let mut new = GlobalEnvironment::new();
                    let copied = deep_copy_env(&ty, &old, &mut new);
                    copied.inspect(&new)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(results.iter().all(|r| *r == expected));
}
