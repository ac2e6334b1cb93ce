// Shared helpers for the kestrel-types integration tests.

#![allow(dead_code)]

use kestrel_mem::Symbol;
use kestrel_types::{GlobalEnvironment, Location, Modifiers, NamespaceId, ParentSpec};

pub fn sym(name: &str) -> Symbol {
    Symbol::intern(name)
}

pub fn at(line: usize) -> Location {
    Location::at("test.kes", line, 1)
}

/// Declares a class in `Root` with the default superclass.
pub fn class(env: &mut GlobalEnvironment, name: &str) -> NamespaceId {
    let root = env.root();
    env.try_define_class(root, "", Modifiers::default(), sym(name), ParentSpec::Default)
        .expect("Failed to define test class")
}

pub fn subclass(env: &mut GlobalEnvironment, name: &str, parent: NamespaceId) -> NamespaceId {
    let root = env.root();
    env.try_define_class(root, "", Modifiers::default(), sym(name), ParentSpec::Namespace(parent))
        .expect("Failed to define test subclass")
}

pub fn mixin(env: &mut GlobalEnvironment, name: &str) -> NamespaceId {
    let root = env.root();
    env.try_define_mixin(root, "", false, sym(name))
        .expect("Failed to define test mixin")
}

/// Full names along the ancestry of `id`, nearest first.
pub fn ancestry(env: &GlobalEnvironment, id: NamespaceId) -> Vec<String> {
    env.ancestors(id)
        .map(|ancestor| env.namespace_full_name(ancestor).to_string())
        .collect()
}
