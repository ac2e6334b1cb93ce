//! The definition protocol.
//!
//! Member definitions (`define_constant`, `define_method`, ...) write into
//! the canonical namespace behind an id and overwrite silently.
//!
//! Namespace declarations (`try_define_class` and friends) are
//! declare-or-merge: the first declaration creates the namespace, later
//! ones reopen it, append their doc comment and must agree with the first
//! declaration's kind and modifiers.

use crate::env::GlobalEnvironment;
use crate::error::{Result, TypeError};
use crate::namespace::{
    Class, Constant, Interface, Mixin, Modifiers, Module, Namespace, NamespaceBase, NamespaceId,
    ParentSpec, SingletonClass, TemporaryParent,
};
use crate::types::{Method, MethodAlias, Type, TypeParameter};
use kestrel_log::{debug, trace, warn};
use kestrel_mem::{Symbol, well_known};

/// What a `try_define_*` call asks for.
#[derive(Debug, Clone, Copy)]
enum Declaration {
    Class {
        modifiers: Modifiers,
        parent: ParentSpec,
    },
    Module,
    Mixin {
        abstract_: bool,
    },
    Interface,
}

impl Declaration {
    const fn kind_name(self) -> &'static str {
        match self {
            Declaration::Class { .. } => "class",
            Declaration::Module => "module",
            Declaration::Mixin { .. } => "mixin",
            Declaration::Interface => "interface",
        }
    }
}

impl GlobalEnvironment {
    // ========================================================================
    // Members
    // ========================================================================

    /// Qualified name a member called `name` gets inside `namespace`.
    #[must_use]
    pub fn member_full_name(&self, namespace: NamespaceId, name: Symbol) -> String {
        self.base(namespace)
            .member_full_name(name, self.is_root(namespace))
    }

    /// Defines a constant (a value-level name). Overwrites any previous
    /// entry; a constant placeholder in the slot is marked replaced.
    pub fn define_constant(&mut self, namespace: NamespaceId, name: Symbol, ty: Type) {
        let namespace = self.unwrap_namespace(namespace);
        let full_name = self.member_full_name(namespace, name);
        let previous = self
            .base_mut(namespace)
            .constants
            .insert(name, Constant::new(full_name, ty));

        if let Some(Constant {
            ty: Type::ConstantPlaceholder(placeholder),
            ..
        }) = previous
        {
            self.mark_replaced(placeholder);
        }
    }

    /// Defines a subtype (a type-level name). Overwrites any previous
    /// entry; a subtype placeholder in the slot is marked replaced.
    pub fn define_subtype(&mut self, namespace: NamespaceId, name: Symbol, ty: Type) {
        let namespace = self.unwrap_namespace(namespace);
        let full_name = self.member_full_name(namespace, name);
        let previous = self
            .base_mut(namespace)
            .subtypes
            .insert(name, Constant::new(full_name, ty));

        if let Some(Constant {
            ty: Type::Placeholder(placeholder),
            ..
        }) = previous
        {
            self.mark_replaced(placeholder);
        }
    }

    /// Defines `method` under its own name.
    pub fn define_method(&mut self, namespace: NamespaceId, method: Method) {
        self.set_method(namespace, method.name, method);
    }

    /// Stores `method` under `name`, which may differ from `method.name`.
    pub fn set_method(&mut self, namespace: NamespaceId, name: Symbol, method: Method) {
        trace!("method defined: {}#{}", self.namespace_full_name(namespace), name);
        self.base_mut(namespace).methods.insert(name, method);
    }

    /// Registers `name` as an alias of `method` and stores the method
    /// under `name` too, so plain lookup finds the alias.
    pub fn set_method_alias(&mut self, namespace: NamespaceId, name: Symbol, method: Method) {
        let base = self.base_mut(namespace);
        base.method_aliases.insert(
            name,
            MethodAlias {
                name,
                method: method.clone(),
            },
        );
        base.methods.insert(name, method);
    }

    pub fn define_instance_variable(&mut self, namespace: NamespaceId, name: Symbol, ty: Type) {
        self.base_mut(namespace).instance_variables.insert(name, ty);
    }

    /// Declares a type parameter on a class, mixin or interface and makes
    /// it visible as a subtype inside the namespace.
    pub fn define_type_parameter(&mut self, namespace: NamespaceId, mut param: TypeParameter) {
        let namespace = self.unwrap_namespace(namespace);
        param.namespace.get_or_insert(namespace);

        let params = match self.namespace_mut(namespace) {
            Namespace::Class(ns) => &mut ns.type_parameters,
            Namespace::Mixin(ns) => &mut ns.type_parameters,
            Namespace::Interface(ns) => &mut ns.type_parameters,
            other => {
                warn!("type parameter `{}` ignored on a {}", param.name, other.kind_name());
                return;
            }
        };

        let name = param.name;
        params.push(param.clone());
        self.define_subtype(namespace, name, Type::type_parameter(param));
    }

    #[must_use]
    pub fn constant(&self, namespace: NamespaceId, name: Symbol) -> Option<&Type> {
        self.base(namespace).constants.get(&name).map(|c| &c.ty)
    }

    #[must_use]
    pub fn subtype(&self, namespace: NamespaceId, name: Symbol) -> Option<&Type> {
        self.base(namespace).subtypes.get(&name).map(|c| &c.ty)
    }

    /// Looks up a method defined directly in `namespace`. Inherited
    /// methods are found by [`method_in_namespace`](Self::method_in_namespace).
    #[must_use]
    pub fn method(&self, namespace: NamespaceId, name: Symbol) -> Option<&Method> {
        self.base(namespace).methods.get(&name)
    }

    #[must_use]
    pub fn method_alias(&self, namespace: NamespaceId, name: Symbol) -> Option<&MethodAlias> {
        self.base(namespace).method_aliases.get(&name)
    }

    #[must_use]
    pub fn instance_variable(&self, namespace: NamespaceId, name: Symbol) -> Option<&Type> {
        self.base(namespace).instance_variables.get(&name)
    }

    #[must_use]
    pub fn type_parameters(&self, namespace: NamespaceId) -> &[TypeParameter] {
        self.namespace(self.unwrap_namespace(namespace))
            .type_parameters()
    }

    // ========================================================================
    // Namespace declarations
    // ========================================================================

    /// Declares class `name` in `container`, or reopens it.
    ///
    /// # Errors
    ///
    /// - [`TypeError::KindMismatch`] if `name` is already something other
    ///   than a class
    /// - [`TypeError::ModifierMismatch`] if `modifiers` differ from the
    ///   first declaration
    /// - [`TypeError::SuperclassMismatch`] if `parent` names a different
    ///   superclass than the one already recorded
    pub fn try_define_class(
        &mut self,
        container: NamespaceId,
        doc: &str,
        modifiers: Modifiers,
        name: Symbol,
        parent: ParentSpec,
    ) -> Result<NamespaceId> {
        self.try_define(container, doc, name, Declaration::Class { modifiers, parent })
    }

    /// Declares module `name` in `container`, or reopens it.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::KindMismatch`] if `name` is something else.
    pub fn try_define_module(
        &mut self,
        container: NamespaceId,
        doc: &str,
        name: Symbol,
    ) -> Result<NamespaceId> {
        self.try_define(container, doc, name, Declaration::Module)
    }

    /// Declares mixin `name` in `container`, or reopens it.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::KindMismatch`] or [`TypeError::ModifierMismatch`].
    pub fn try_define_mixin(
        &mut self,
        container: NamespaceId,
        doc: &str,
        abstract_: bool,
        name: Symbol,
    ) -> Result<NamespaceId> {
        self.try_define(container, doc, name, Declaration::Mixin { abstract_ })
    }

    /// Declares interface `name` in `container`, or reopens it.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::KindMismatch`] if `name` is something else.
    pub fn try_define_interface(
        &mut self,
        container: NamespaceId,
        doc: &str,
        name: Symbol,
    ) -> Result<NamespaceId> {
        self.try_define(container, doc, name, Declaration::Interface)
    }

    /// Creates a mixin that is not registered in any container.
    pub fn new_mixin(&mut self, name: Symbol) -> NamespaceId {
        let base = NamespaceBase::new(name, name.as_str().to_string(), None);
        self.create_detached(base, Declaration::Mixin { abstract_: false })
    }

    /// Creates an interface that is not registered in any container.
    pub fn new_interface(&mut self, name: Symbol) -> NamespaceId {
        let base = NamespaceBase::new(name, name.as_str().to_string(), None);
        self.create_detached(base, Declaration::Interface)
    }

    fn try_define(
        &mut self,
        container: NamespaceId,
        doc: &str,
        name: Symbol,
        declaration: Declaration,
    ) -> Result<NamespaceId> {
        let container = self.unwrap_namespace(container);

        match self.subtype(container, name).cloned() {
            Some(Type::Namespace(existing)) => {
                let existing = self.resolve(existing);
                if matches!(self.namespace(existing), Namespace::Placeholder(_)) {
                    let id = self.create_namespace(container, doc, name, declaration);
                    self.absorb_placeholder(existing, id);
                    Ok(id)
                } else {
                    self.reopen(existing, doc, declaration)
                }
            }
            None | Some(Type::Placeholder(_)) => {
                Ok(self.create_namespace(container, doc, name, declaration))
            }
            Some(_) => Err(TypeError::KindMismatch {
                name: self.member_full_name(container, name),
                previous: "type",
                found: declaration.kind_name(),
            }),
        }
    }

    fn create_namespace(
        &mut self,
        container: NamespaceId,
        doc: &str,
        name: Symbol,
        declaration: Declaration,
    ) -> NamespaceId {
        let full_name = self.member_full_name(container, name);
        let mut base = NamespaceBase::new(name, full_name, Some(container));
        base.append_doc(doc);

        let id = self.create_detached(base, declaration);
        self.define_subtype(container, name, Type::Namespace(id));
        self.define_constant(container, name, Type::singleton_of(Type::Namespace(id)));
        id
    }

    fn create_detached(&mut self, base: NamespaceBase, declaration: Declaration) -> NamespaceId {
        debug!("{} created: {}", declaration.kind_name(), base.full_name);

        let namespace = match declaration {
            Declaration::Class { modifiers, parent } => {
                let parent = self.parent_from_spec(parent);
                Namespace::Class(Class {
                    base,
                    parent,
                    singleton: None,
                    modifiers,
                    defined: false,
                    compiled: false,
                    type_parameters: Vec::new(),
                })
            }
            Declaration::Module => Namespace::Module(Module {
                base,
                parent: None,
                singleton: None,
                defined: false,
                compiled: false,
            }),
            Declaration::Mixin { abstract_ } => Namespace::Mixin(Mixin {
                base,
                parent: None,
                singleton: None,
                abstract_,
                defined: false,
                compiled: false,
                type_parameters: Vec::new(),
            }),
            Declaration::Interface => Namespace::Interface(Interface {
                base,
                parent: None,
                singleton: None,
                defined: false,
                compiled: false,
                type_parameters: Vec::new(),
            }),
        };

        let id = self.alloc_namespace(namespace);
        self.attach_singleton(id);
        id
    }

    fn parent_from_spec(&mut self, spec: ParentSpec) -> Option<NamespaceId> {
        match spec {
            ParentSpec::Default => self.std_namespace(well_known::OBJECT),
            ParentSpec::None => None,
            ParentSpec::Namespace(parent) => Some(self.resolve(parent)),
            ParentSpec::Temporary(name) => {
                let base = NamespaceBase::new(name, name.as_str().to_string(), None);
                Some(self.alloc_namespace(Namespace::TemporaryParent(TemporaryParent { base })))
            }
        }
    }

    /// Creates the singleton class `&Name` of `id`.
    fn attach_singleton(&mut self, id: NamespaceId) -> NamespaceId {
        let base = self.base(id);
        let name = Symbol::intern(&format!("&{}", base.name));
        let full_name = format!("&{}", base.full_name);
        let parent = self.default_singleton_parent(id);

        let singleton = self.alloc_namespace(Namespace::SingletonClass(SingletonClass {
            base: NamespaceBase::new(name, full_name, None),
            parent,
            attached: id,
            defined: false,
            compiled: false,
        }));
        self.namespace_mut(id).set_singleton(singleton);
        singleton
    }

    /// Superclass of the singleton of `id`: the superclass's singleton
    /// for classes, otherwise the matching `Std` metaclass.
    pub(crate) fn default_singleton_parent(&self, id: NamespaceId) -> Option<NamespaceId> {
        let metaclass = match self.namespace(id) {
            Namespace::Class(_) => {
                let inherited = self
                    .superclass(id)
                    .and_then(|parent| self.namespace(self.resolve(parent)).singleton());
                if inherited.is_some() {
                    return inherited;
                }
                well_known::CLASS
            }
            Namespace::Module(_) => well_known::MODULE,
            Namespace::Mixin(_) => well_known::MIXIN,
            Namespace::Interface(_) => well_known::INTERFACE,
            _ => return None,
        };
        self.std_namespace(metaclass)
    }

    fn reopen(
        &mut self,
        id: NamespaceId,
        doc: &str,
        declaration: Declaration,
    ) -> Result<NamespaceId> {
        let full_name = self.namespace_full_name(id).to_string();

        match (self.namespace(id), declaration) {
            (Namespace::Class(class), Declaration::Class { modifiers, .. })
                if class.modifiers != modifiers =>
            {
                return Err(TypeError::ModifierMismatch {
                    name: full_name,
                    previous: class.modifiers,
                    found: modifiers,
                });
            }
            (Namespace::Mixin(mixin), Declaration::Mixin { abstract_ })
                if mixin.abstract_ != abstract_ =>
            {
                let as_modifiers = |abstract_| Modifiers {
                    abstract_,
                    ..Modifiers::default()
                };
                return Err(TypeError::ModifierMismatch {
                    name: full_name,
                    previous: as_modifiers(mixin.abstract_),
                    found: as_modifiers(abstract_),
                });
            }
            (Namespace::Class(_), Declaration::Class { .. })
            | (Namespace::Module(_), Declaration::Module)
            | (Namespace::Mixin(_), Declaration::Mixin { .. })
            | (Namespace::Interface(_), Declaration::Interface) => {}
            (existing, declaration) => {
                return Err(TypeError::KindMismatch {
                    name: full_name,
                    previous: existing.kind_name(),
                    found: declaration.kind_name(),
                });
            }
        }

        if let Declaration::Class { parent, .. } = declaration {
            self.reconcile_superclass(id, parent)?;
        }

        self.base_mut(id).append_doc(doc);
        debug!("{} reopened: {}", declaration.kind_name(), full_name);
        Ok(id)
    }

    /// Checks a reopened class's requested superclass against the recorded
    /// one, replacing a temporary parent with the first real one.
    fn reconcile_superclass(&mut self, class: NamespaceId, spec: ParentSpec) -> Result<()> {
        let ParentSpec::Namespace(requested) = spec else {
            return Ok(());
        };
        let requested = self.resolve(requested);
        let current = self.superclass(class);

        match current {
            Some(current)
                if matches!(self.namespace(current), Namespace::TemporaryParent(_)) =>
            {
                debug!(
                    "temporary parent `{}` of {} replaced by {}",
                    self.namespace_full_name(current),
                    self.namespace_full_name(class),
                    self.namespace_full_name(requested)
                );
                self.set_superclass(class, Some(requested));
                if let Some(singleton) = self.namespace(class).singleton() {
                    let parent = self.default_singleton_parent(class);
                    self.set_superclass(singleton, parent);
                }
                Ok(())
            }
            Some(current) if self.namespaces_are_equal(current, requested) => Ok(()),
            current => Err(TypeError::SuperclassMismatch {
                name: self.namespace_full_name(class).to_string(),
                previous: current
                    .map_or_else(|| "none".to_string(), |id| self.namespace_full_name(id).to_string()),
                found: self.namespace_full_name(requested).to_string(),
            }),
        }
    }

    /// Replaces the first non-proxy ancestor of `id`, keeping any included
    /// proxies in front of it.
    pub(crate) fn set_superclass(&mut self, id: NamespaceId, superclass: Option<NamespaceId>) {
        let mut link = id;
        while let Some(next) = self.namespace(link).parent() {
            if !self.namespace(next).is_proxy() {
                break;
            }
            link = next;
        }
        self.namespace_mut(link).set_parent(superclass);
    }

    /// Moves everything defined inside a namespace placeholder into the
    /// real namespace and points the placeholder at it.
    fn absorb_placeholder(&mut self, placeholder: NamespaceId, real: NamespaceId) {
        let Namespace::Placeholder(data) = self.namespace_mut(placeholder) else {
            return;
        };
        data.replaced_by = Some(real);
        let absorbed = std::mem::replace(
            &mut data.base,
            NamespaceBase::new(Symbol::new(0), String::new(), None),
        );

        let base = self.base_mut(real);
        base.append_doc(&absorbed.doc_comment);
        base.constants.extend(absorbed.constants);
        base.subtypes.extend(absorbed.subtypes);
        base.instance_variables.extend(absorbed.instance_variables);
        base.methods.extend(absorbed.methods);
        base.method_aliases.extend(absorbed.method_aliases);

        debug!("namespace placeholder resolved: {}", absorbed.full_name);
    }
}
