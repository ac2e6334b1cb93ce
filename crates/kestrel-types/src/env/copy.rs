//! Copying type graphs between environments.
//!
//! Ids are only meaningful inside the environment that issued them, so a
//! type moved to another environment has to be rebuilt there. Named
//! namespaces are matched by full name: one that already exists in the
//! target is reused, anything else is created at the same path.
//!
//! Graphs are cyclic (a class and its singleton point at each other, a
//! generic's `self` argument is the generic itself), so every node is
//! registered in the target and memoized *before* its children are copied.

use crate::env::GlobalEnvironment;
use crate::namespace::{
    Class, Constant, Interface, Mixin, Module, Namespace, NamespaceBase, NamespaceId,
    NamespacePlaceholder, Proxy, SingletonClass, SymbolMap, TemporaryParent,
};
use crate::placeholder::PlaceholderId;
use crate::types::{
    Generic, GenericId, GenericNamedType, Method, MethodAlias, NamedType, Type, TypeArgument,
    TypeArguments, TypeParameter,
};
use fxhash::FxHashMap;
use kestrel_log::{debug, trace};

/// Copies types out of `old` into `new`, remembering everything it has
/// already copied so shared and cyclic structure is preserved.
///
/// One copier can be reused for several types; they then share copies of
/// common namespaces.
pub struct DeepCopier<'a> {
    old: &'a GlobalEnvironment,
    new: &'a mut GlobalEnvironment,
    namespaces: FxHashMap<NamespaceId, NamespaceId>,
    generics: FxHashMap<GenericId, GenericId>,
    placeholders: FxHashMap<PlaceholderId, PlaceholderId>,
}

/// Copies `ty` from `old` into `new`.
///
/// # Panics
///
/// Panics if `ty` reaches a namespace whose full name does not resolve in
/// `old`, such as a mixin created with [`GlobalEnvironment::new_mixin`].
/// Such a graph was built incorrectly and cannot be re-anchored.
pub fn deep_copy_env(ty: &Type, old: &GlobalEnvironment, new: &mut GlobalEnvironment) -> Type {
    DeepCopier::new(old, new).copy_type(ty)
}

impl<'a> DeepCopier<'a> {
    pub fn new(old: &'a GlobalEnvironment, new: &'a mut GlobalEnvironment) -> Self {
        let mut namespaces = FxHashMap::default();
        namespaces.insert(old.root(), new.root());

        Self {
            old,
            new,
            namespaces,
            generics: FxHashMap::default(),
            placeholders: FxHashMap::default(),
        }
    }

    pub fn copy_type(&mut self, ty: &Type) -> Type {
        match ty {
            Type::Never
            | Type::Any
            | Type::Untyped
            | Type::Void
            | Type::Nothing
            | Type::NoValue
            | Type::Nil
            | Type::True
            | Type::False
            | Type::Literal(_)
            | Type::SelfType
            | Type::Callable => ty.clone(),

            Type::Union(elements) => Type::Union(self.copy_types(elements)),
            Type::Intersection(elements) => Type::Intersection(self.copy_types(elements)),
            Type::Not(inner) => Type::not(self.copy_type(inner)),
            Type::Nilable(inner) => Type::Nilable(Box::new(self.copy_type(inner))),
            Type::SingletonOf(inner) => Type::singleton_of(self.copy_type(inner)),
            Type::InstanceOf(inner) => Type::instance_of(self.copy_type(inner)),

            Type::Namespace(id) => Type::Namespace(self.copy_namespace(*id)),
            Type::Generic(id) => Type::Generic(self.copy_generic(*id)),
            Type::TypeParameter(param) => Type::type_parameter(self.copy_type_parameter(param)),
            Type::Named(named) => Type::Named(Box::new(NamedType {
                name: named.name,
                ty: self.copy_type(&named.ty),
            })),
            Type::GenericNamed(named) => Type::GenericNamed(Box::new(GenericNamedType {
                name: named.name,
                type_parameters: self.copy_type_parameters(&named.type_parameters),
                ty: self.copy_type(&named.ty),
            })),
            Type::Closure(method) => Type::closure(self.copy_method(method)),
            Type::Method(method) => Type::Method(Box::new(self.copy_method(method))),

            Type::ConstantPlaceholder(id) => Type::ConstantPlaceholder(self.copy_placeholder(*id)),
            Type::Placeholder(id) => Type::Placeholder(self.copy_placeholder(*id)),
        }
    }

    fn copy_types(&mut self, types: &[Type]) -> Vec<Type> {
        types.iter().map(|ty| self.copy_type(ty)).collect()
    }

    // ========================================================================
    // Namespaces
    // ========================================================================

    /// Returns the counterpart of `id` in the target environment, copying
    /// it first if needed.
    pub fn copy_namespace(&mut self, id: NamespaceId) -> NamespaceId {
        let old = self.old;
        let id = old.resolve(id);
        if let Some(&copied) = self.namespaces.get(&id) {
            return copied;
        }

        match old.namespace(id) {
            Namespace::MixinProxy(proxy) | Namespace::InterfaceProxy(proxy) => {
                self.copy_proxy(id, proxy)
            }
            Namespace::SingletonClass(singleton) => {
                let attached = self.copy_namespace(singleton.attached);
                match self.namespaces.get(&id) {
                    Some(&copied) => copied,
                    None => self.adopt_singleton(id, attached),
                }
            }
            Namespace::TemporaryParent(temporary) => {
                let base = NamespaceBase::new(
                    temporary.base.name,
                    temporary.base.full_name.clone(),
                    None,
                );
                let copied = self
                    .new
                    .alloc_namespace(Namespace::TemporaryParent(TemporaryParent { base }));
                self.namespaces.insert(id, copied);
                copied
            }
            Namespace::Class(_)
            | Namespace::Module(_)
            | Namespace::Mixin(_)
            | Namespace::Interface(_)
            | Namespace::Placeholder(_) => self.copy_named(id),
        }
    }

    fn copy_proxy(&mut self, id: NamespaceId, proxy: &Proxy) -> NamespaceId {
        let target = self.copy_namespace(proxy.target);
        let shell = Proxy {
            target,
            parent: None,
        };
        let copied = self.new.alloc_namespace(match self.old.namespace(id) {
            Namespace::InterfaceProxy(_) => Namespace::InterfaceProxy(shell),
            _ => Namespace::MixinProxy(shell),
        });
        self.namespaces.insert(id, copied);

        let parent = proxy.parent.map(|parent| self.copy_namespace(parent));
        self.new.namespace_mut(copied).set_parent(parent);
        copied
    }

    /// Maps a singleton onto the one its attached namespace already has in
    /// the target environment.
    fn adopt_singleton(&mut self, id: NamespaceId, attached: NamespaceId) -> NamespaceId {
        match self.new.singleton_class_of(attached) {
            Some(singleton) => {
                self.namespaces.insert(id, singleton);
                singleton
            }
            None => panic!(
                "deep copy: `{}` has no singleton class in the target environment",
                self.old.namespace_full_name(id)
            ),
        }
    }

    fn copy_named(&mut self, id: NamespaceId) -> NamespaceId {
        let old = self.old;
        let base = old.base(id);
        let full_name = base.full_name.as_str();

        if let Some(existing) = self.new.lookup_full_name(full_name) {
            self.namespaces.insert(id, existing);
            return existing;
        }
        let (Some(container), Some(_)) = (base.container, old.lookup_full_name(full_name)) else {
            panic!("deep copy: dangling reference to `{full_name}`");
        };

        let container = self.copy_namespace(container);
        // The container's copy may have pulled this namespace in already.
        if let Some(&copied) = self.namespaces.get(&id) {
            return copied;
        }

        trace!("deep copy: {}", full_name);
        let shell_base = NamespaceBase::new(base.name, base.full_name.clone(), Some(container));
        let copied = self.new.alloc_namespace(shell(old.namespace(id), shell_base));
        self.namespaces.insert(id, copied);

        self.new.define_subtype(container, base.name, Type::Namespace(copied));
        self.new.define_constant(
            container,
            base.name,
            Type::singleton_of(Type::Namespace(copied)),
        );

        let singleton = old.namespace(id).singleton().map(|singleton| {
            let copied_singleton = self.copy_singleton_shell(singleton, copied);
            (singleton, copied_singleton)
        });

        self.populate(id, copied);
        if let Some((singleton, copied_singleton)) = singleton {
            self.populate(singleton, copied_singleton);
        }
        copied
    }

    fn copy_singleton_shell(&mut self, singleton: NamespaceId, attached: NamespaceId) -> NamespaceId {
        let old = self.old;
        let Namespace::SingletonClass(source) = old.namespace(singleton) else {
            unreachable!("singleton slot holds a singleton class");
        };

        let base = NamespaceBase::new(source.base.name, source.base.full_name.clone(), None);
        let copied = self
            .new
            .alloc_namespace(Namespace::SingletonClass(SingletonClass {
                base,
                parent: None,
                attached,
                defined: source.defined,
                compiled: source.compiled,
            }));
        self.new.namespace_mut(attached).set_singleton(copied);
        self.namespaces.insert(singleton, copied);
        copied
    }

    /// Fills a registered shell with copies of everything `id` holds.
    fn populate(&mut self, id: NamespaceId, copied: NamespaceId) {
        let old = self.old;
        let source = old.namespace(id);

        let parent = source.parent().map(|parent| self.copy_namespace(parent));
        self.new.namespace_mut(copied).set_parent(parent);

        let params = self.copy_type_parameters(source.type_parameters());
        match self.new.namespace_mut(copied) {
            Namespace::Class(ns) => ns.type_parameters = params,
            Namespace::Mixin(ns) => ns.type_parameters = params,
            Namespace::Interface(ns) => ns.type_parameters = params,
            _ => {}
        }

        let base = old.base(id);
        let methods: Vec<_> = base
            .methods
            .iter()
            .map(|(name, method)| (*name, self.copy_method(method)))
            .collect();
        let aliases: Vec<_> = base
            .method_aliases
            .iter()
            .map(|(name, alias)| {
                let method = self.copy_method(&alias.method);
                (*name, MethodAlias { name: alias.name, method })
            })
            .collect();
        let ivars: Vec<_> = base
            .instance_variables
            .iter()
            .map(|(name, ty)| (*name, self.copy_type(ty)))
            .collect();
        let subtypes = self.copy_constants(&base.subtypes);
        let constants = self.copy_constants(&base.constants);

        let target = self.new.base_mut(copied);
        target.doc_comment.clone_from(&base.doc_comment);
        target.methods.extend(methods);
        target.method_aliases.extend(aliases);
        target.instance_variables.extend(ivars);
        // Keep the source's order; entries registered during recursion are
        // already in the source too.
        target.subtypes = merge_in_order(subtypes, std::mem::take(&mut target.subtypes));
        target.constants = merge_in_order(constants, std::mem::take(&mut target.constants));
    }

    fn copy_constants(&mut self, constants: &SymbolMap<Constant>) -> SymbolMap<Constant> {
        constants
            .iter()
            .map(|(name, constant)| {
                (*name, Constant::new(constant.full_name.clone(), self.copy_type(&constant.ty)))
            })
            .collect()
    }

    // ========================================================================
    // Generics, signatures, placeholders
    // ========================================================================

    fn copy_generic(&mut self, id: GenericId) -> GenericId {
        if let Some(&copied) = self.generics.get(&id) {
            return copied;
        }

        let copied = self.new.alloc_generic(Generic {
            namespace: self.new.root(),
            type_arguments: TypeArguments::new(),
        });
        self.generics.insert(id, copied);

        let old = self.old;
        let source = old.generic(id);
        let namespace = self.copy_namespace(source.namespace);

        let argument_map = source
            .type_arguments
            .argument_map
            .iter()
            .map(|(name, arg)| (*name, TypeArgument::new(self.copy_type(&arg.ty), arg.variance)))
            .collect();

        let generic = self.new.generic_mut(copied);
        generic.namespace = namespace;
        generic.type_arguments = TypeArguments {
            argument_map,
            argument_order: source.type_arguments.argument_order.clone(),
        };
        copied
    }

    fn copy_type_parameter(&mut self, param: &TypeParameter) -> TypeParameter {
        TypeParameter {
            name: param.name,
            namespace: param.namespace.map(|ns| self.copy_namespace(ns)),
            lower_bound: self.copy_type(&param.lower_bound),
            upper_bound: self.copy_type(&param.upper_bound),
            default: param.default.as_ref().map(|ty| self.copy_type(ty)),
            variance: param.variance,
        }
    }

    fn copy_type_parameters(&mut self, params: &[TypeParameter]) -> Vec<TypeParameter> {
        params.iter().map(|p| self.copy_type_parameter(p)).collect()
    }

    fn copy_method(&mut self, method: &Method) -> Method {
        let mut copied = method.clone();
        copied.type_parameters = self.copy_type_parameters(&method.type_parameters);
        for param in &mut copied.params {
            param.ty = self.copy_type(&param.ty);
        }
        copied.return_type = self.copy_type(&method.return_type);
        copied.throw_type = method.throw_type.as_ref().map(|ty| self.copy_type(ty));
        copied
    }

    fn copy_placeholder(&mut self, id: PlaceholderId) -> PlaceholderId {
        if let Some(&copied) = self.placeholders.get(&id) {
            return copied;
        }

        let old = self.old;
        let source = old.placeholder(id);
        let mut data = source.clone();
        data.container = self.new.root();
        data.sibling = None;

        let copied = self.new.alloc_placeholder(data);
        self.placeholders.insert(id, copied);

        let container = self.copy_namespace(source.container);
        let sibling = source.sibling.map(|sibling| self.copy_placeholder(sibling));
        let data = &mut self.new.placeholders[copied.0 as usize];
        data.container = container;
        data.sibling = sibling;
        copied
    }
}

impl GlobalEnvironment {
    /// Creates an independent copy of this environment.
    ///
    /// Everything reachable from `Root` is copied; the two environments
    /// share nothing afterwards.
    #[must_use]
    pub fn fork(&self) -> GlobalEnvironment {
        let mut forked = GlobalEnvironment::bare();

        let std = {
            let mut copier = DeepCopier::new(self, &mut forked);
            let root = self.root();
            copier.populate(root, root);
            self.std.map(|std| copier.copy_namespace(std))
        };
        if let Some(std) = std {
            forked.set_std(std);
        }

        debug!(
            "environment forked: {} namespaces, {} generics",
            forked.namespace_count(),
            forked.generics.len()
        );
        forked
    }
}

/// Empty counterpart of a named namespace, with its flags but no links.
fn shell(source: &Namespace, base: NamespaceBase) -> Namespace {
    match source {
        Namespace::Class(class) => Namespace::Class(Class {
            base,
            parent: None,
            singleton: None,
            modifiers: class.modifiers,
            defined: class.defined,
            compiled: class.compiled,
            type_parameters: Vec::new(),
        }),
        Namespace::Module(module) => Namespace::Module(Module {
            base,
            parent: None,
            singleton: None,
            defined: module.defined,
            compiled: module.compiled,
        }),
        Namespace::Mixin(mixin) => Namespace::Mixin(Mixin {
            base,
            parent: None,
            singleton: None,
            abstract_: mixin.abstract_,
            defined: mixin.defined,
            compiled: mixin.compiled,
            type_parameters: Vec::new(),
        }),
        Namespace::Interface(interface) => Namespace::Interface(Interface {
            base,
            parent: None,
            singleton: None,
            defined: interface.defined,
            compiled: interface.compiled,
            type_parameters: Vec::new(),
        }),
        Namespace::Placeholder(placeholder) => Namespace::Placeholder(NamespacePlaceholder {
            base,
            locations: placeholder.locations.clone(),
            replaced_by: None,
            checked: placeholder.checked,
        }),
        other => unreachable!("{} is not a named namespace", other.kind_name()),
    }
}

fn merge_in_order(ordered: SymbolMap<Constant>, extra: SymbolMap<Constant>) -> SymbolMap<Constant> {
    let mut merged = ordered;
    for (name, constant) in extra {
        merged.entry(name).or_insert(constant);
    }
    merged
}
