//! Lookup along the ancestry chain.
//!
//! A namespace's ancestry is the linked list formed by `parent` links,
//! starting at the namespace itself. Included mixins and interfaces appear
//! as proxy links. Lookup is linear: the first link that defines a name
//! wins, so a namespace always shadows what it includes, and a mixin
//! included later shadows one included earlier.

use crate::env::GlobalEnvironment;
use crate::namespace::{Namespace, NamespaceId};
use crate::types::{Method, Type};
use fxhash::FxHashSet;
use kestrel_mem::Symbol;

/// Iterator over a namespace and its ancestors, nearest first.
pub struct Ancestors<'a> {
    env: &'a GlobalEnvironment,
    next: Option<NamespaceId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NamespaceId;

    fn next(&mut self) -> Option<NamespaceId> {
        let current = self.env.resolve(self.next?);
        self.next = self.env.namespace(current).parent();
        Some(current)
    }
}

impl GlobalEnvironment {
    /// Iterates `id` followed by every link of its parent chain.
    #[must_use]
    pub fn ancestors(&self, id: NamespaceId) -> Ancestors<'_> {
        Ancestors {
            env: self,
            next: Some(id),
        }
    }

    /// First ancestor of `id` (excluding itself) that is not a proxy.
    #[must_use]
    pub fn superclass(&self, id: NamespaceId) -> Option<NamespaceId> {
        self.ancestors(id)
            .skip(1)
            .find(|ancestor| !self.namespace(*ancestor).is_proxy())
    }

    #[must_use]
    pub fn singleton_class_of(&self, id: NamespaceId) -> Option<NamespaceId> {
        self.namespace(self.unwrap_namespace(id)).singleton()
    }

    /// The namespace a singleton class belongs to.
    #[must_use]
    pub fn attached_object_of(&self, singleton: NamespaceId) -> Option<NamespaceId> {
        match self.namespace(self.unwrap_namespace(singleton)) {
            Namespace::SingletonClass(singleton) => Some(singleton.attached),
            _ => None,
        }
    }

    /// True if `ancestor` appears anywhere in the ancestry of `id`,
    /// looking through proxies.
    #[must_use]
    pub fn is_ancestor(&self, id: NamespaceId, ancestor: NamespaceId) -> bool {
        self.ancestors(id)
            .any(|link| self.namespaces_are_equal(link, ancestor))
    }

    /// Finds `name` in the nearest ancestor that defines it.
    #[must_use]
    pub fn method_in_namespace(&self, id: NamespaceId, name: Symbol) -> Option<&Method> {
        self.ancestors(id)
            .find_map(|ancestor| self.base(ancestor).methods.get(&name))
    }

    #[must_use]
    pub fn instance_variable_in_namespace(&self, id: NamespaceId, name: Symbol) -> Option<&Type> {
        self.ancestors(id)
            .find_map(|ancestor| self.base(ancestor).instance_variables.get(&name))
    }

    /// Finds a constant in the nearest ancestor that defines it.
    #[must_use]
    pub fn constant_in_namespace(&self, id: NamespaceId, name: Symbol) -> Option<&Type> {
        self.ancestors(id)
            .find_map(|ancestor| self.base(ancestor).constants.get(&name))
            .map(|constant| &constant.ty)
    }

    /// Calls `f` once per method name visible from `id`, with the method
    /// that lookup would resolve to.
    pub fn foreach_method<'a>(&'a self, id: NamespaceId, mut f: impl FnMut(Symbol, &'a Method)) {
        let mut seen = FxHashSet::default();
        for ancestor in self.ancestors(id) {
            for (name, method) in &self.base(ancestor).methods {
                if seen.insert(*name) {
                    f(*name, method);
                }
            }
        }
    }

    /// Calls `f` once per instance variable name visible from `id`.
    pub fn foreach_instance_variable<'a>(
        &'a self,
        id: NamespaceId,
        mut f: impl FnMut(Symbol, &'a Type),
    ) {
        let mut seen = FxHashSet::default();
        for ancestor in self.ancestors(id) {
            for (name, ty) in &self.base(ancestor).instance_variables {
                if seen.insert(*name) {
                    f(*name, ty);
                }
            }
        }
    }

    /// Every visible method, nearest definition first.
    #[must_use]
    pub fn methods_in_namespace(&self, id: NamespaceId) -> Vec<(Symbol, &Method)> {
        let mut methods = Vec::new();
        self.foreach_method(id, |name, method| methods.push((name, method)));
        methods
    }

    #[must_use]
    pub fn instance_variables_in_namespace(&self, id: NamespaceId) -> Vec<(Symbol, &Type)> {
        let mut ivars = Vec::new();
        self.foreach_instance_variable(id, |name, ty| ivars.push((name, ty)));
        ivars
    }
}
