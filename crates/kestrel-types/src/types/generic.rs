//! Generics: type parameters, type arguments and instantiated generics.
//!
//! A [`Generic`] pairs a template namespace (e.g. `Std::ArrayList`) with
//! bound [`TypeArguments`]. Generics live in the environment's generic
//! arena so the implicit `self` argument can point back at the generic
//! that owns it.

use crate::env::GlobalEnvironment;
use crate::namespace::NamespaceId;
use crate::types::Type;
use fxhash::FxHashMap;
use kestrel_mem::{Symbol, well_known};
use std::fmt;

/// Index of a [`Generic`] in its environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GenericId(pub(crate) u32);

impl GenericId {
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

/// Subtyping direction of a type parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Variance {
    #[default]
    Invariant,
    Covariant,
    Contravariant,
}

impl Variance {
    /// Prefix used when printing a parameter declaration.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Variance::Invariant => "",
            Variance::Covariant => "+",
            Variance::Contravariant => "-",
        }
    }
}

/// A declared type parameter such as `+V < Std::Value`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeParameter {
    pub name: Symbol,
    /// Namespace or method owner the parameter was declared in.
    pub namespace: Option<NamespaceId>,
    pub lower_bound: Type,
    pub upper_bound: Type,
    pub default: Option<Type>,
    pub variance: Variance,
}

impl TypeParameter {
    /// Creates an unbounded parameter (`never` below, `any` above).
    #[must_use]
    pub fn new(name: Symbol, variance: Variance) -> Self {
        Self {
            name,
            namespace: None,
            lower_bound: Type::Never,
            upper_bound: Type::Any,
            default: None,
            variance,
        }
    }

    #[must_use]
    pub fn with_namespace(mut self, namespace: NamespaceId) -> Self {
        self.namespace = Some(namespace);
        self
    }

    #[must_use]
    pub fn with_upper_bound(mut self, bound: Type) -> Self {
        self.upper_bound = bound;
        self
    }

    #[must_use]
    pub fn with_lower_bound(mut self, bound: Type) -> Self {
        self.lower_bound = bound;
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: Type) -> Self {
        self.default = Some(default);
        self
    }

    /// Formats the declaration form, e.g. `+V > Std::Int < Std::Value = Std::Int`.
    #[must_use]
    pub fn inspect_declaration(&self, env: &GlobalEnvironment) -> String {
        let mut out = format!("{}{}", self.variance.prefix(), self.name);
        if self.lower_bound != Type::Never {
            out.push_str(&format!(" > {}", self.lower_bound.display(env)));
        }
        if self.upper_bound != Type::Any {
            out.push_str(&format!(" < {}", self.upper_bound.display(env)));
        }
        if let Some(default) = &self.default {
            out.push_str(&format!(" = {}", default.display(env)));
        }
        out
    }
}

/// A type bound to one parameter of a generic.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeArgument {
    pub ty: Type,
    pub variance: Variance,
}

impl TypeArgument {
    #[must_use]
    pub fn new(ty: Type, variance: Variance) -> Self {
        Self { ty, variance }
    }
}

/// Arguments of a generic, keyed by parameter name.
///
/// `argument_order` lists the explicitly passed parameters in declaration
/// order; `argument_map` may hold more entries than the order (the implicit
/// `self` argument is never ordered).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypeArguments {
    pub argument_map: FxHashMap<Symbol, TypeArgument>,
    pub argument_order: Vec<Symbol>,
}

impl TypeArguments {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an argument, keeping declaration order.
    pub fn push(&mut self, name: Symbol, argument: TypeArgument) {
        if self.argument_map.insert(name, argument).is_none() {
            self.argument_order.push(name);
        }
    }

    #[must_use]
    pub fn get(&self, name: Symbol) -> Option<&TypeArgument> {
        self.argument_map.get(&name)
    }

    /// Iterates the ordered arguments.
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &TypeArgument)> {
        self.argument_order
            .iter()
            .filter_map(|name| self.argument_map.get(name).map(|arg| (*name, arg)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.argument_order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.argument_order.is_empty()
    }
}

impl FromIterator<(Symbol, TypeArgument)> for TypeArguments {
    fn from_iter<I: IntoIterator<Item = (Symbol, TypeArgument)>>(iter: I) -> Self {
        let mut args = TypeArguments::new();
        for (name, arg) in iter {
            args.push(name, arg);
        }
        args
    }
}

/// An instantiated generic such as `Std::Map[Std::String, Std::Int]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Generic {
    /// The template being instantiated.
    pub namespace: NamespaceId,
    pub type_arguments: TypeArguments,
}

impl GlobalEnvironment {
    /// Instantiates `template` with `args` and returns the generic type.
    ///
    /// A `self` argument bound to the new generic itself (invariant) is
    /// always inserted into the argument map, replacing any `self` entry
    /// the caller supplied.
    ///
    /// ```
    /// use kestrel_mem::{Symbol, well_known};
    /// use kestrel_types::{GlobalEnvironment, Type, TypeArgument, TypeArguments, Variance};
    ///
    /// let mut env = GlobalEnvironment::new();
    /// let object = env.std_namespace(well_known::OBJECT).unwrap();
    /// let int = env.std_subtype(well_known::INT).cloned().unwrap();
    ///
    /// let mut args = TypeArguments::new();
    /// args.push(Symbol::intern("E"), TypeArgument::new(int, Variance::Covariant));
    /// let generic = env.new_generic(object, args);
    ///
    /// let Type::Generic(id) = generic else { unreachable!() };
    /// let self_arg = env.generic(id).type_arguments.get(well_known::SELF).unwrap();
    /// assert_eq!(self_arg.ty, Type::Generic(id));
    /// ```
    pub fn new_generic(&mut self, template: NamespaceId, args: TypeArguments) -> Type {
        let id = self.alloc_generic(Generic {
            namespace: template,
            type_arguments: args,
        });
        self.bind_self_argument(id);
        Type::Generic(id)
    }

    /// Builds a generic from a template and its own declared parameters,
    /// taking each argument's variance from the matching parameter.
    pub fn instantiate(&mut self, template: NamespaceId, types: Vec<Type>) -> Type {
        let params = self.type_parameters(template).to_vec();
        let args = params
            .iter()
            .zip(types)
            .map(|(param, ty)| (param.name, TypeArgument::new(ty, param.variance)))
            .collect();
        self.new_generic(template, args)
    }

    pub(crate) fn bind_self_argument(&mut self, id: GenericId) {
        let self_arg = TypeArgument::new(Type::Generic(id), Variance::Invariant);
        self.generic_mut(id)
            .type_arguments
            .argument_map
            .insert(well_known::SELF, self_arg);
    }
}

impl fmt::Display for Variance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Variance::Invariant => "invariant",
            Variance::Covariant => "covariant",
            Variance::Contravariant => "contravariant",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::{Modifiers, ParentSpec};

    fn define_list(env: &mut GlobalEnvironment) -> NamespaceId {
        let root = env.root();
        let list = env
            .try_define_class(root, "", Modifiers::default(), Symbol::intern("List"), ParentSpec::Default)
            .unwrap();
        env.define_type_parameter(list, TypeParameter::new(Symbol::intern("E"), Variance::Covariant));
        list
    }

    #[test]
    fn test_self_argument_is_injected_and_unordered() {
        let mut env = GlobalEnvironment::new();
        let list = define_list(&mut env);

        let generic = env.instantiate(list, vec![Type::Nil]);
        let Type::Generic(id) = generic else {
            panic!("expected a generic");
        };

        let args = &env.generic(id).type_arguments;
        assert_eq!(args.len(), 1);
        assert_eq!(args.argument_map.len(), 2);
        assert_eq!(args.get(well_known::SELF).unwrap().ty, Type::Generic(id));
        assert_eq!(args.get(well_known::SELF).unwrap().variance, Variance::Invariant);
        assert_eq!(args.get(Symbol::intern("E")).unwrap().variance, Variance::Covariant);
    }

    #[test]
    fn test_caller_supplied_self_is_overwritten() {
        let mut env = GlobalEnvironment::new();
        let list = define_list(&mut env);

        let mut args = TypeArguments::new();
        args.argument_map
            .insert(well_known::SELF, TypeArgument::new(Type::Nil, Variance::Covariant));
        let Type::Generic(id) = env.new_generic(list, args) else {
            panic!("expected a generic");
        };

        assert_eq!(
            env.generic(id).type_arguments.get(well_known::SELF).unwrap().ty,
            Type::Generic(id)
        );
    }

    #[test]
    fn test_type_arguments_keep_order() {
        let names = ["K", "V", "A"].map(Symbol::intern);
        let args: TypeArguments = names
            .iter()
            .map(|n| (*n, TypeArgument::new(Type::Any, Variance::Invariant)))
            .collect();

        let order: Vec<_> = args.iter().map(|(name, _)| name).collect();
        assert_eq!(order, names);
    }

    #[test]
    fn test_duplicate_push_replaces_without_reordering() {
        let k = Symbol::intern("K");
        let mut args = TypeArguments::new();
        args.push(k, TypeArgument::new(Type::Nil, Variance::Invariant));
        args.push(k, TypeArgument::new(Type::Any, Variance::Invariant));

        assert_eq!(args.len(), 1);
        assert_eq!(args.get(k).unwrap().ty, Type::Any);
    }

    #[test]
    fn test_declaration_form() {
        let env = GlobalEnvironment::new();
        let int = env.std_subtype(well_known::INT).cloned().unwrap();
        let value = env.std_subtype(well_known::VALUE).cloned().unwrap();

        let param = TypeParameter::new(Symbol::intern("V"), Variance::Covariant)
            .with_lower_bound(int.clone())
            .with_upper_bound(value)
            .with_default(int);

        assert_eq!(
            param.inspect_declaration(&env),
            "+V > Std::Int < Std::Value = Std::Int"
        );
        assert_eq!(
            TypeParameter::new(Symbol::intern("T"), Variance::Contravariant).inspect_declaration(&env),
            "-T"
        );
    }
}
