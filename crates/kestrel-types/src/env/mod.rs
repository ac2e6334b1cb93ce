//! The global environment.
//!
//! A [`GlobalEnvironment`] owns one type universe: the namespace arena
//! rooted at `Root`, the generic arena and the placeholder table. There
//! is no process-wide registry; every operation that resolves a name takes
//! the environment explicitly.
//!
//! One environment is built per compilation unit or REPL session.
//! [`GlobalEnvironment::fork`] produces an independent copy for sandboxes
//! such as macro expansion.
//!
//! # Concurrency
//!
//! The environment is plain owned data (`Send + Sync`). Mutation needs
//! `&mut self`, so writers are serialized by the borrow checker or by the
//! caller's lock. Any number of threads may query a shared `&GlobalEnvironment`.
//!
//! # Example
//!
//! ```
//! use kestrel_mem::{Symbol, well_known};
//! use kestrel_types::{GlobalEnvironment, Modifiers, ParentSpec};
//!
//! let mut env = GlobalEnvironment::new();
//! let root = env.root();
//! let foo = env
//!     .try_define_class(root, "", Modifiers::default(), Symbol::intern("Foo"), ParentSpec::Default)
//!     .unwrap();
//!
//! assert_eq!(env.lookup_full_name("Foo"), Some(foo));
//! assert!(env.std_namespace(well_known::INT).is_some());
//! ```

mod bootstrap;
mod copy;

pub use copy::{DeepCopier, deep_copy_env};

use crate::namespace::{Module, Namespace, NamespaceBase, NamespaceId};
use crate::placeholder::PlaceholderData;
use crate::types::{Generic, GenericId, Type};
use kestrel_mem::{Symbol, symbol_table, well_known};

#[derive(Debug, Clone)]
pub struct GlobalEnvironment {
    pub(crate) namespaces: Vec<Namespace>,
    pub(crate) generics: Vec<Generic>,
    pub(crate) placeholders: Vec<PlaceholderData>,
    root: NamespaceId,
    std: Option<NamespaceId>,
}

impl GlobalEnvironment {
    /// Creates an environment with `Root` and the bootstrapped `Std` module.
    #[must_use]
    pub fn new() -> Self {
        let mut env = Self::bare();
        bootstrap::define_std(&mut env);
        env
    }

    /// Creates an environment containing only an empty `Root` module.
    #[must_use]
    pub fn bare() -> Self {
        let root = Namespace::Module(Module {
            base: NamespaceBase::new(well_known::ROOT, "Root".to_string(), None),
            parent: None,
            singleton: None,
            defined: true,
            compiled: false,
        });

        GlobalEnvironment {
            namespaces: vec![root],
            generics: Vec::new(),
            placeholders: Vec::new(),
            root: NamespaceId(0),
            std: None,
        }
    }

    // ========================================================================
    // Well-known namespaces
    // ========================================================================

    #[must_use]
    pub const fn root(&self) -> NamespaceId {
        self.root
    }

    #[must_use]
    pub fn is_root(&self, id: NamespaceId) -> bool {
        self.resolve(id) == self.root
    }

    /// The `Std` module, absent in a bare environment.
    #[must_use]
    pub const fn std(&self) -> Option<NamespaceId> {
        self.std
    }

    pub(crate) fn set_std(&mut self, std: NamespaceId) {
        self.std = Some(std);
    }

    /// Looks up a subtype of `Std` by name.
    #[must_use]
    pub fn std_subtype(&self, name: Symbol) -> Option<&Type> {
        self.subtype(self.std?, name)
    }

    /// Looks up a namespace defined directly in `Std`.
    #[must_use]
    pub fn std_namespace(&self, name: Symbol) -> Option<NamespaceId> {
        let id = self.std_subtype(name)?.as_namespace()?;
        Some(self.resolve(id))
    }

    // ========================================================================
    // Arena access
    // ========================================================================

    /// Returns the namespace stored at `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different environment and is out of range.
    #[must_use]
    pub fn namespace(&self, id: NamespaceId) -> &Namespace {
        &self.namespaces[id.index()]
    }

    pub fn namespace_mut(&mut self, id: NamespaceId) -> &mut Namespace {
        &mut self.namespaces[id.index()]
    }

    #[must_use]
    pub fn namespace_count(&self) -> usize {
        self.namespaces.len()
    }

    pub(crate) fn alloc_namespace(&mut self, namespace: Namespace) -> NamespaceId {
        let id = NamespaceId(self.namespaces.len() as u32);
        self.namespaces.push(namespace);
        id
    }

    #[must_use]
    pub fn generic(&self, id: GenericId) -> &Generic {
        &self.generics[id.0 as usize]
    }

    pub(crate) fn generic_mut(&mut self, id: GenericId) -> &mut Generic {
        &mut self.generics[id.0 as usize]
    }

    pub(crate) fn alloc_generic(&mut self, generic: Generic) -> GenericId {
        let id = GenericId(self.generics.len() as u32);
        self.generics.push(generic);
        id
    }

    // ========================================================================
    // Identity
    // ========================================================================

    /// Follows replaced namespace placeholders to the namespace that took
    /// their place. Proxies are left alone.
    #[must_use]
    pub fn resolve(&self, mut id: NamespaceId) -> NamespaceId {
        while let Namespace::Placeholder(placeholder) = self.namespace(id) {
            match placeholder.replaced_by {
                Some(next) => id = next,
                None => break,
            }
        }
        id
    }

    /// Follows proxies and replaced placeholders to the canonical namespace.
    #[must_use]
    pub fn unwrap_namespace(&self, mut id: NamespaceId) -> NamespaceId {
        loop {
            id = self.resolve(id);
            match self.namespace(id).proxy_target() {
                Some(target) => id = target,
                None => return id,
            }
        }
    }

    /// True if `a` and `b` denote the same namespace, looking through any
    /// number of proxy layers.
    #[must_use]
    pub fn namespaces_are_equal(&self, a: NamespaceId, b: NamespaceId) -> bool {
        self.unwrap_namespace(a) == self.unwrap_namespace(b)
    }

    /// Member storage of the canonical namespace behind `id`.
    #[must_use]
    pub fn base(&self, id: NamespaceId) -> &NamespaceBase {
        match self.namespace(self.unwrap_namespace(id)).base() {
            Some(base) => base,
            None => unreachable!("unwrapped namespace is never a proxy"),
        }
    }

    pub fn base_mut(&mut self, id: NamespaceId) -> &mut NamespaceBase {
        let id = self.unwrap_namespace(id);
        match self.namespace_mut(id).base_mut() {
            Some(base) => base,
            None => unreachable!("unwrapped namespace is never a proxy"),
        }
    }

    #[must_use]
    pub fn namespace_full_name(&self, id: NamespaceId) -> &str {
        &self.base(id).full_name
    }

    // ========================================================================
    // Name resolution
    // ========================================================================

    /// Finds a namespace by its full name, e.g. `Std::Int`, `&Std::Int` or
    /// `(&Foo)::Bar`.
    #[must_use]
    pub fn lookup_full_name(&self, full_name: &str) -> Option<NamespaceId> {
        if full_name == "Root" {
            return Some(self.root);
        }
        if let Some(attached) = full_name.strip_prefix('&') {
            let owner = self.lookup_full_name(attached)?;
            return self.singleton_class_of(owner);
        }

        let mut current = self.root;
        for segment in split_path(full_name) {
            current = match segment.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
                Some(inner) => self.lookup_full_name(inner)?,
                None => {
                    let name = symbol_table().get(segment)?;
                    let id = self.subtype(current, name)?.as_namespace()?;
                    self.resolve(id)
                }
            };
        }
        Some(current)
    }
}

impl Default for GlobalEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits a full name on `::` outside parentheses.
fn split_path(full_name: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let bytes = full_name.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                segments.push(&full_name[start..i]);
                i += 2;
                start = i;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    segments.push(&full_name[start..]);
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::{Modifiers, ParentSpec};

    #[test]
    fn test_environment_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GlobalEnvironment>();
    }

    #[test]
    fn test_bare_environment() {
        let env = GlobalEnvironment::bare();

        assert_eq!(env.namespace_count(), 1);
        assert!(env.std().is_none());
        assert!(env.std_subtype(well_known::INT).is_none());
        assert_eq!(env.namespace_full_name(env.root()), "Root");
        assert_eq!(env.lookup_full_name("Root"), Some(env.root()));
    }

    #[test]
    fn test_split_path() {
        assert_eq!(split_path("Foo"), vec!["Foo"]);
        assert_eq!(split_path("Std::Int"), vec!["Std", "Int"]);
        assert_eq!(split_path("(&Std::Foo)::Bar"), vec!["(&Std::Foo)", "Bar"]);
    }

    #[test]
    fn test_lookup_full_name() {
        let mut env = GlobalEnvironment::new();
        let root = env.root();
        let outer = env
            .try_define_module(root, "", Symbol::intern("Outer"))
            .unwrap();
        let inner = env
            .try_define_class(outer, "", Modifiers::default(), Symbol::intern("Inner"), ParentSpec::Default)
            .unwrap();

        assert_eq!(env.lookup_full_name("Outer::Inner"), Some(inner));
        assert_eq!(env.lookup_full_name("Outer::Missing"), None);
        assert_eq!(env.lookup_full_name("Never::Interned::Xyzzy"), None);

        let singleton = env.singleton_class_of(inner).unwrap();
        assert_eq!(env.namespace_full_name(singleton), "&Outer::Inner");
        assert_eq!(env.lookup_full_name("&Outer::Inner"), Some(singleton));
    }

    #[test]
    fn test_lookup_inside_singleton() {
        let mut env = GlobalEnvironment::new();
        let root = env.root();
        let foo = env
            .try_define_class(root, "", Modifiers::default(), Symbol::intern("Foo"), ParentSpec::Default)
            .unwrap();
        let singleton = env.singleton_class_of(foo).unwrap();
        let nested = env
            .try_define_class(singleton, "", Modifiers::default(), Symbol::intern("Nested"), ParentSpec::Default)
            .unwrap();

        assert_eq!(env.namespace_full_name(nested), "(&Foo)::Nested");
        assert_eq!(env.lookup_full_name("(&Foo)::Nested"), Some(nested));
    }
}
