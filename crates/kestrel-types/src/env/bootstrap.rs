//! The `Std` module every environment starts with.

use crate::env::GlobalEnvironment;
use crate::namespace::{Modifiers, NamespaceId, ParentSpec};
use kestrel_log::debug;
use kestrel_mem::{Symbol, well_known};

/// Primitive value classes, all direct subclasses of `Std::Value`.
const PRIMITIVES: &[Symbol] = &[
    well_known::NIL,
    well_known::BOOL,
    well_known::INT,
    well_known::INT64,
    well_known::INT32,
    well_known::INT16,
    well_known::INT8,
    well_known::UINT64,
    well_known::UINT32,
    well_known::UINT16,
    well_known::UINT8,
    well_known::FLOAT,
    well_known::FLOAT64,
    well_known::FLOAT32,
    well_known::BIG_FLOAT,
    well_known::STRING,
    well_known::CHAR,
    well_known::SYMBOL,
];

/// Defines `Std` and its core hierarchy in a bare environment.
///
/// ```text
/// Value
/// ├── Object
/// │   └── Module ── Class, Mixin, Interface
/// ├── Nil
/// ├── Bool ── True, False
/// └── Int, Float, String, ... (primitives)
/// ```
pub(super) fn define_std(env: &mut GlobalEnvironment) {
    let root = env.root();
    let std = match env.try_define_module(root, "", well_known::STD) {
        Ok(std) => std,
        Err(err) => unreachable!("Std in a bare environment: {err}"),
    };
    env.set_std(std);

    let value = class(env, std, well_known::VALUE, ParentSpec::None, Modifiers::ABSTRACT);
    let object = class(env, std, well_known::OBJECT, ParentSpec::Namespace(value), Modifiers::default());
    let module = class(env, std, well_known::MODULE, ParentSpec::Namespace(object), Modifiers::default());
    for metaclass in [well_known::CLASS, well_known::MIXIN, well_known::INTERFACE] {
        class(env, std, metaclass, ParentSpec::Namespace(module), Modifiers::default());
    }

    for &name in PRIMITIVES {
        class(env, std, name, ParentSpec::Namespace(value), Modifiers::PRIMITIVE);
    }

    let bool_ = env.subtype(std, well_known::BOOL).and_then(|ty| ty.as_namespace());
    if let Some(bool_) = bool_ {
        class(env, std, well_known::TRUE, ParentSpec::Namespace(bool_), Modifiers::PRIMITIVE);
        class(env, std, well_known::FALSE, ParentSpec::Namespace(bool_), Modifiers::PRIMITIVE);
    }

    link_early_singletons(env);
    debug!("Std bootstrapped with {} namespaces", env.namespace_count());
}

fn class(
    env: &mut GlobalEnvironment,
    std: NamespaceId,
    name: Symbol,
    parent: ParentSpec,
    modifiers: Modifiers,
) -> NamespaceId {
    let id = match env.try_define_class(std, "", modifiers, name, parent) {
        Ok(id) => id,
        Err(err) => unreachable!("Std::{name} in a fresh Std: {err}"),
    };
    env.namespace_mut(id).set_state(true, false);
    id
}

/// Singletons created before `Std::Class` and friends existed have no
/// parent yet.
fn link_early_singletons(env: &mut GlobalEnvironment) {
    for index in 0..env.namespace_count() {
        let id = NamespaceId(index as u32);
        let Some(singleton) = env.namespace(id).singleton() else {
            continue;
        };
        if env.namespace(singleton).parent().is_none() {
            let parent = env.default_singleton_parent(id);
            env.set_superclass(singleton, parent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::Namespace;

    fn ancestry(env: &GlobalEnvironment, id: NamespaceId) -> Vec<String> {
        env.ancestors(id)
            .map(|a| env.namespace_full_name(a).to_string())
            .collect()
    }

    #[test]
    fn test_core_hierarchy() {
        let env = GlobalEnvironment::new();
        let class = env.std_namespace(well_known::CLASS).unwrap();
        let truthy = env.std_namespace(well_known::TRUE).unwrap();

        assert_eq!(
            ancestry(&env, class),
            ["Std::Class", "Std::Module", "Std::Object", "Std::Value"]
        );
        assert_eq!(ancestry(&env, truthy), ["Std::True", "Std::Bool", "Std::Value"]);
    }

    #[test]
    fn test_primitives_are_flagged() {
        let env = GlobalEnvironment::new();
        for &name in PRIMITIVES {
            let id = env.std_namespace(name).unwrap();
            let Namespace::Class(class) = env.namespace(id) else {
                panic!("Std::{name} is not a class");
            };
            assert!(class.modifiers.primitive, "Std::{name}");
            assert!(class.defined);
        }
    }

    #[test]
    fn test_every_singleton_has_a_parent() {
        let env = GlobalEnvironment::new();
        let class = env.std_namespace(well_known::CLASS).unwrap();
        let module = env.std_namespace(well_known::MODULE).unwrap();

        let value = env.std_namespace(well_known::VALUE).unwrap();
        let value_singleton = env.singleton_class_of(value).unwrap();
        assert_eq!(env.namespace(value_singleton).parent(), Some(class));

        let std_singleton = env.singleton_class_of(env.std().unwrap()).unwrap();
        assert_eq!(env.namespace(std_singleton).parent(), Some(module));

        let int = env.std_namespace(well_known::INT).unwrap();
        let int_singleton = env.singleton_class_of(int).unwrap();
        assert!(env.is_ancestor(int_singleton, class));
    }
}
