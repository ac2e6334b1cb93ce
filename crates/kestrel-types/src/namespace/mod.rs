//! The namespace graph.
//!
//! Classes, modules, mixins and interfaces are stored in an arena owned by
//! the [`GlobalEnvironment`] and referred to by [`NamespaceId`]. Identity is
//! the id: two ids denote the same entity iff they unwrap (through proxies
//! and replaced placeholders) to the same slot.
//!
//! # Variants
//!
//! - **Named namespaces** (`Class`, `Module`, `Mixin`, `Interface`) own a
//!   [`NamespaceBase`] and a singleton class `&Name`
//! - **`SingletonClass`** holds class-level members; `attached` points back
//!   at its owner without owning it
//! - **Proxies** (`MixinProxy`, `InterfaceProxy`) give one inclusion site
//!   its own ancestry link while sharing the canonical target
//! - **`Placeholder`** and **`TemporaryParent`** stand in for namespaces
//!   that have been referenced but not yet defined
//!
//! Every operation that reads or writes members first unwraps proxies to
//! their target, so members are always defined on canonical namespaces.
//!
//! [`GlobalEnvironment`]: crate::GlobalEnvironment

mod define;
mod lookup;
mod proxy;

pub use lookup::Ancestors;

use crate::location::Location;
use crate::types::{Method, MethodAlias, Type, TypeParameter};
use fxhash::FxBuildHasher;
use indexmap::IndexMap;
use kestrel_mem::Symbol;
use std::fmt;

/// Insertion-ordered map keyed by symbol.
pub type SymbolMap<V> = IndexMap<Symbol, V, FxBuildHasher>;

/// Index of a namespace in its environment's arena.
///
/// Ids are only meaningful for the environment that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespaceId(pub(crate) u32);

impl NamespaceId {
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A constant or subtype entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    /// Path from `Root`, e.g. `Std::Int` or `(&Foo)::Bar`.
    pub full_name: String,
    pub ty: Type,
}

impl Constant {
    #[must_use]
    pub fn new(full_name: impl Into<String>, ty: Type) -> Self {
        Self {
            full_name: full_name.into(),
            ty,
        }
    }
}

/// Storage shared by every namespace that can hold members.
#[derive(Debug, Clone)]
pub struct NamespaceBase {
    pub doc_comment: String,
    /// Simple name, not qualified.
    pub name: Symbol,
    pub full_name: String,
    /// Namespace this one was defined in. `None` for `Root` and for
    /// detached namespaces.
    pub container: Option<NamespaceId>,
    pub constants: SymbolMap<Constant>,
    pub subtypes: SymbolMap<Constant>,
    pub instance_variables: SymbolMap<Type>,
    pub methods: SymbolMap<Method>,
    pub method_aliases: SymbolMap<MethodAlias>,
}

impl NamespaceBase {
    pub(crate) fn new(name: Symbol, full_name: String, container: Option<NamespaceId>) -> Self {
        Self {
            doc_comment: String::new(),
            name,
            full_name,
            container,
            constants: SymbolMap::default(),
            subtypes: SymbolMap::default(),
            instance_variables: SymbolMap::default(),
            methods: SymbolMap::default(),
            method_aliases: SymbolMap::default(),
        }
    }

    /// Appends `doc` to the doc comment, separating paragraphs by a blank line.
    pub(crate) fn append_doc(&mut self, doc: &str) {
        if doc.is_empty() {
            return;
        }
        if self.doc_comment.is_empty() {
            self.doc_comment = doc.to_string();
        } else {
            self.doc_comment.push_str("\n\n");
            self.doc_comment.push_str(doc);
        }
    }

    /// Qualified name of a member called `name` defined in this namespace.
    #[must_use]
    pub fn member_full_name(&self, name: Symbol, is_root: bool) -> String {
        if is_root {
            name.as_str().to_string()
        } else if self.full_name.starts_with('&') {
            format!("({})::{}", self.full_name, name)
        } else {
            format!("{}::{}", self.full_name, name)
        }
    }
}

/// Declaration modifiers compared when a namespace is reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub abstract_: bool,
    pub sealed: bool,
    pub primitive: bool,
    pub no_init: bool,
}

impl Modifiers {
    /// Modifiers of the built-in value classes.
    pub const PRIMITIVE: Modifiers = Modifiers {
        abstract_: false,
        sealed: true,
        primitive: true,
        no_init: true,
    };

    pub const ABSTRACT: Modifiers = Modifiers {
        abstract_: true,
        sealed: false,
        primitive: false,
        no_init: false,
    };
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags: Vec<&str> = [
            (self.abstract_, "abstract"),
            (self.sealed, "sealed"),
            (self.primitive, "primitive"),
            (self.no_init, "noinit"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect();

        if flags.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&flags.join(" "))
        }
    }
}

/// Superclass requested by a class declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentSpec {
    /// `Std::Object` when it exists
    Default,
    /// No superclass at all (`Std::Value`)
    None,
    Namespace(NamespaceId),
    /// A superclass named before it is known; replaced by the first real
    /// parent given in a later declaration
    Temporary(Symbol),
}

#[derive(Debug, Clone)]
pub struct Class {
    pub base: NamespaceBase,
    pub parent: Option<NamespaceId>,
    pub singleton: Option<NamespaceId>,
    pub modifiers: Modifiers,
    pub defined: bool,
    pub compiled: bool,
    pub type_parameters: Vec<TypeParameter>,
}

#[derive(Debug, Clone)]
pub struct Module {
    pub base: NamespaceBase,
    pub parent: Option<NamespaceId>,
    pub singleton: Option<NamespaceId>,
    pub defined: bool,
    pub compiled: bool,
}

#[derive(Debug, Clone)]
pub struct Mixin {
    pub base: NamespaceBase,
    /// Head of the proxy chain of mixins included into this one.
    pub parent: Option<NamespaceId>,
    pub singleton: Option<NamespaceId>,
    pub abstract_: bool,
    pub defined: bool,
    pub compiled: bool,
    pub type_parameters: Vec<TypeParameter>,
}

#[derive(Debug, Clone)]
pub struct Interface {
    pub base: NamespaceBase,
    pub parent: Option<NamespaceId>,
    pub singleton: Option<NamespaceId>,
    pub defined: bool,
    pub compiled: bool,
    pub type_parameters: Vec<TypeParameter>,
}

#[derive(Debug, Clone)]
pub struct SingletonClass {
    pub base: NamespaceBase,
    pub parent: Option<NamespaceId>,
    /// The namespace this is the singleton of.
    pub attached: NamespaceId,
    pub defined: bool,
    pub compiled: bool,
}

/// One link of an inclusion chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Proxy {
    /// The canonical mixin or interface.
    pub target: NamespaceId,
    pub parent: Option<NamespaceId>,
}

/// A namespace opened through a forward reference.
#[derive(Debug, Clone)]
pub struct NamespacePlaceholder {
    pub base: NamespaceBase,
    pub locations: Vec<Location>,
    /// Real namespace that took over this slot.
    pub replaced_by: Option<NamespaceId>,
    pub checked: bool,
}

/// Stand-in superclass named before its definition was seen.
#[derive(Debug, Clone)]
pub struct TemporaryParent {
    pub base: NamespaceBase,
}

#[derive(Debug, Clone)]
pub enum Namespace {
    Class(Class),
    Module(Module),
    Mixin(Mixin),
    Interface(Interface),
    SingletonClass(SingletonClass),
    MixinProxy(Proxy),
    InterfaceProxy(Proxy),
    Placeholder(NamespacePlaceholder),
    TemporaryParent(TemporaryParent),
}

impl Namespace {
    /// Human-readable kind, used in diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Namespace::Class(_) => "class",
            Namespace::Module(_) => "module",
            Namespace::Mixin(_) => "mixin",
            Namespace::Interface(_) => "interface",
            Namespace::SingletonClass(_) => "singleton class",
            Namespace::MixinProxy(_) => "mixin proxy",
            Namespace::InterfaceProxy(_) => "interface proxy",
            Namespace::Placeholder(_) => "namespace placeholder",
            Namespace::TemporaryParent(_) => "temporary parent",
        }
    }

    /// Member storage; `None` for proxies.
    #[must_use]
    pub const fn base(&self) -> Option<&NamespaceBase> {
        match self {
            Namespace::Class(ns) => Some(&ns.base),
            Namespace::Module(ns) => Some(&ns.base),
            Namespace::Mixin(ns) => Some(&ns.base),
            Namespace::Interface(ns) => Some(&ns.base),
            Namespace::SingletonClass(ns) => Some(&ns.base),
            Namespace::Placeholder(ns) => Some(&ns.base),
            Namespace::TemporaryParent(ns) => Some(&ns.base),
            Namespace::MixinProxy(_) | Namespace::InterfaceProxy(_) => None,
        }
    }

    pub fn base_mut(&mut self) -> Option<&mut NamespaceBase> {
        match self {
            Namespace::Class(ns) => Some(&mut ns.base),
            Namespace::Module(ns) => Some(&mut ns.base),
            Namespace::Mixin(ns) => Some(&mut ns.base),
            Namespace::Interface(ns) => Some(&mut ns.base),
            Namespace::SingletonClass(ns) => Some(&mut ns.base),
            Namespace::Placeholder(ns) => Some(&mut ns.base),
            Namespace::TemporaryParent(ns) => Some(&mut ns.base),
            Namespace::MixinProxy(_) | Namespace::InterfaceProxy(_) => None,
        }
    }

    /// Next link in the ancestry chain.
    #[must_use]
    pub const fn parent(&self) -> Option<NamespaceId> {
        match self {
            Namespace::Class(ns) => ns.parent,
            Namespace::Module(ns) => ns.parent,
            Namespace::Mixin(ns) => ns.parent,
            Namespace::Interface(ns) => ns.parent,
            Namespace::SingletonClass(ns) => ns.parent,
            Namespace::MixinProxy(proxy) | Namespace::InterfaceProxy(proxy) => proxy.parent,
            Namespace::Placeholder(_) | Namespace::TemporaryParent(_) => None,
        }
    }

    /// Sets the next ancestry link. Placeholders have no ancestry and
    /// ignore the call.
    pub fn set_parent(&mut self, parent: Option<NamespaceId>) {
        match self {
            Namespace::Class(ns) => ns.parent = parent,
            Namespace::Module(ns) => ns.parent = parent,
            Namespace::Mixin(ns) => ns.parent = parent,
            Namespace::Interface(ns) => ns.parent = parent,
            Namespace::SingletonClass(ns) => ns.parent = parent,
            Namespace::MixinProxy(proxy) | Namespace::InterfaceProxy(proxy) => {
                proxy.parent = parent;
            }
            Namespace::Placeholder(_) | Namespace::TemporaryParent(_) => {}
        }
    }

    #[must_use]
    pub const fn singleton(&self) -> Option<NamespaceId> {
        match self {
            Namespace::Class(ns) => ns.singleton,
            Namespace::Module(ns) => ns.singleton,
            Namespace::Mixin(ns) => ns.singleton,
            Namespace::Interface(ns) => ns.singleton,
            _ => None,
        }
    }

    pub(crate) fn set_singleton(&mut self, singleton: NamespaceId) {
        match self {
            Namespace::Class(ns) => ns.singleton = Some(singleton),
            Namespace::Module(ns) => ns.singleton = Some(singleton),
            Namespace::Mixin(ns) => ns.singleton = Some(singleton),
            Namespace::Interface(ns) => ns.singleton = Some(singleton),
            _ => {}
        }
    }

    #[must_use]
    pub fn type_parameters(&self) -> &[TypeParameter] {
        match self {
            Namespace::Class(ns) => &ns.type_parameters,
            Namespace::Mixin(ns) => &ns.type_parameters,
            Namespace::Interface(ns) => &ns.type_parameters,
            _ => &[],
        }
    }

    /// Target of a proxy, `None` for anything else.
    #[must_use]
    pub const fn proxy_target(&self) -> Option<NamespaceId> {
        match self {
            Namespace::MixinProxy(proxy) | Namespace::InterfaceProxy(proxy) => Some(proxy.target),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_proxy(&self) -> bool {
        matches!(self, Namespace::MixinProxy(_) | Namespace::InterfaceProxy(_))
    }

    #[must_use]
    pub const fn is_class(&self) -> bool {
        matches!(self, Namespace::Class(_))
    }

    /// `(defined, compiled)` flags of namespaces that carry them.
    #[must_use]
    pub const fn state(&self) -> Option<(bool, bool)> {
        match self {
            Namespace::Class(ns) => Some((ns.defined, ns.compiled)),
            Namespace::Module(ns) => Some((ns.defined, ns.compiled)),
            Namespace::Mixin(ns) => Some((ns.defined, ns.compiled)),
            Namespace::Interface(ns) => Some((ns.defined, ns.compiled)),
            Namespace::SingletonClass(ns) => Some((ns.defined, ns.compiled)),
            _ => None,
        }
    }

    /// Sets `(defined, compiled)` on namespaces that carry them.
    pub fn set_state(&mut self, defined: bool, compiled: bool) {
        let flags = match self {
            Namespace::Class(ns) => (&mut ns.defined, &mut ns.compiled),
            Namespace::Module(ns) => (&mut ns.defined, &mut ns.compiled),
            Namespace::Mixin(ns) => (&mut ns.defined, &mut ns.compiled),
            Namespace::Interface(ns) => (&mut ns.defined, &mut ns.compiled),
            Namespace::SingletonClass(ns) => (&mut ns.defined, &mut ns.compiled),
            _ => return,
        };
        *flags.0 = defined;
        *flags.1 = compiled;
    }
}
