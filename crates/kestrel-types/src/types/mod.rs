//! The type algebra.
//!
//! [`Type`] is a closed enum covering every type the checker works with:
//!
//! - **Terminals**: `never`, `any`, `untyped`, `void`, `nothing` and the
//!   internal no-value marker
//! - **Literals**: `nil`, `true`, `false` and the [`Literal`] families
//! - **Combinators**: unions, intersections, negation, nilable wrapping,
//!   singleton-of and instance-of
//! - **Nominal types**: namespaces (by arena id), generics, type parameters,
//!   `self`, aliases, closures and method signatures
//! - **Placeholders**: stand-ins for constants referenced before they are
//!   defined
//!
//! Nominal variants hold ids into a [`GlobalEnvironment`], so any operation
//! that needs names or ancestry takes the environment explicitly.

mod display;
mod generic;
mod literal;
mod method;

pub use display::DisplayType;
pub use generic::{Generic, GenericId, TypeArgument, TypeArguments, TypeParameter, Variance};
pub use literal::{Literal, LiteralKind};
pub use method::{Method, MethodAlias, MethodFlags, Parameter, ParameterKind};

use crate::env::GlobalEnvironment;
use crate::namespace::NamespaceId;
use crate::placeholder::PlaceholderId;
use kestrel_mem::{Symbol, well_known};

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// Bottom type, subtype of everything
    Never,
    /// Top type
    Any,
    /// Opts out of checking; compatible in both directions
    Untyped,
    /// Absence of a return value, only compatible with itself
    Void,
    /// Type of expressions that never produce a value
    Nothing,
    /// Internal marker for "no value was produced"
    NoValue,

    Nil,
    True,
    False,
    Literal(Literal),

    /// A value of at least one element type, in insertion order
    Union(Vec<Type>),
    /// A value of every element type, in insertion order
    Intersection(Vec<Type>),
    /// Complement of the wrapped type
    Not(Box<Type>),
    /// `T?`, equivalent to `T | nil`
    Nilable(Box<Type>),
    /// The metaclass of the wrapped type
    SingletonOf(Box<Type>),
    /// The instance type of the wrapped singleton
    InstanceOf(Box<Type>),

    Namespace(NamespaceId),
    Generic(GenericId),
    TypeParameter(Box<TypeParameter>),
    /// The contextual receiver type
    SelfType,
    Named(Box<NamedType>),
    GenericNamed(Box<GenericNamedType>),
    /// Any closure regardless of signature
    Callable,
    Closure(Box<Method>),
    Method(Box<Method>),

    /// A constant referenced before its definition
    ConstantPlaceholder(PlaceholderId),
    /// The subtype-slot sibling of a constant placeholder
    Placeholder(PlaceholderId),
}

/// A type alias (`typedef Name = Type`).
#[derive(Debug, Clone, PartialEq)]
pub struct NamedType {
    pub name: Symbol,
    pub ty: Type,
}

/// A generic type alias (`typedef Name[T] = Type`).
#[derive(Debug, Clone, PartialEq)]
pub struct GenericNamedType {
    pub name: Symbol,
    pub type_parameters: Vec<TypeParameter>,
    pub ty: Type,
}

impl Type {
    /// Wraps `ty` as nilable.
    ///
    /// Returns `ty` unchanged when it already admits `nil` (it is `nil`, a
    /// nilable, or a union with a direct `nil` element). Intersections are
    /// wrapped whole, never distributed over their elements.
    ///
    /// ```
    /// use kestrel_types::Type;
    ///
    /// let once = Type::nilable(Type::Any);
    /// assert_eq!(Type::nilable(once.clone()), once);
    /// assert_eq!(Type::nilable(Type::Nil), Type::Nil);
    /// ```
    #[must_use]
    pub fn nilable(ty: Type) -> Type {
        match ty {
            Type::Nil | Type::Nilable(_) => ty,
            Type::Union(ref elements) if elements.contains(&Type::Nil) => ty,
            other => Type::Nilable(Box::new(other)),
        }
    }

    #[must_use]
    pub fn union(elements: Vec<Type>) -> Type {
        Type::Union(elements)
    }

    #[must_use]
    pub fn intersection(elements: Vec<Type>) -> Type {
        Type::Intersection(elements)
    }

    #[must_use]
    pub fn not(ty: Type) -> Type {
        Type::Not(Box::new(ty))
    }

    #[must_use]
    pub fn singleton_of(ty: Type) -> Type {
        Type::SingletonOf(Box::new(ty))
    }

    #[must_use]
    pub fn instance_of(ty: Type) -> Type {
        Type::InstanceOf(Box::new(ty))
    }

    #[must_use]
    pub fn literal(kind: LiteralKind, value: impl Into<String>) -> Type {
        Type::Literal(Literal::new(kind, value))
    }

    #[must_use]
    pub fn named(name: Symbol, ty: Type) -> Type {
        Type::Named(Box::new(NamedType { name, ty }))
    }

    #[must_use]
    pub fn closure(signature: Method) -> Type {
        Type::Closure(Box::new(signature))
    }

    #[must_use]
    pub fn type_parameter(param: TypeParameter) -> Type {
        Type::TypeParameter(Box::new(param))
    }

    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(self, Type::Nil | Type::True | Type::False | Type::Literal(_))
    }

    /// True for types that cannot produce a value at all.
    #[must_use]
    pub const fn is_bottom(&self) -> bool {
        matches!(self, Type::Never | Type::Nothing)
    }

    /// True if `nil` is directly one of the alternatives of this type.
    #[must_use]
    pub fn is_nilable(&self) -> bool {
        match self {
            Type::Nil | Type::Nilable(_) => true,
            Type::Union(elements) => elements.iter().any(Type::is_nilable),
            _ => false,
        }
    }

    #[must_use]
    pub const fn as_namespace(&self) -> Option<NamespaceId> {
        match self {
            Type::Namespace(id) => Some(*id),
            _ => None,
        }
    }

    /// Widens literal types to their nominal `Std` classes.
    ///
    /// Combinators are widened element-wise. Without a `Std` module in
    /// `env` literals are returned unchanged.
    #[must_use]
    pub fn to_non_literal(&self, env: &GlobalEnvironment) -> Type {
        let std_class = |name: Symbol| env.std_subtype(name).cloned();

        let widened = match self {
            Type::Nil => std_class(well_known::NIL),
            Type::True => std_class(well_known::TRUE),
            Type::False => std_class(well_known::FALSE),
            Type::Literal(lit) => lit.to_non_literal(env),
            Type::Union(elements) => Some(Type::Union(
                elements.iter().map(|t| t.to_non_literal(env)).collect(),
            )),
            Type::Intersection(elements) => Some(Type::Intersection(
                elements.iter().map(|t| t.to_non_literal(env)).collect(),
            )),
            Type::Nilable(inner) => Some(Type::nilable(inner.to_non_literal(env))),
            Type::Not(inner) => Some(Type::not(inner.to_non_literal(env))),
            _ => None,
        };

        widened.unwrap_or_else(|| self.clone())
    }

    /// Returns the canonical textual form of this type.
    #[must_use]
    pub fn inspect(&self, env: &GlobalEnvironment) -> String {
        self.display(env).to_string()
    }
}

impl From<Literal> for Type {
    fn from(lit: Literal) -> Self {
        Type::Literal(lit)
    }
}

impl From<NamespaceId> for Type {
    fn from(id: NamespaceId) -> Self {
        Type::Namespace(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_lit(v: &str) -> Type {
        Type::literal(LiteralKind::Int, v)
    }

    #[test]
    fn test_nilable_idempotent() {
        let once = Type::nilable(int_lit("1"));
        let twice = Type::nilable(once.clone());

        assert_eq!(once, twice);
        assert_eq!(once, Type::Nilable(Box::new(int_lit("1"))));
    }

    #[test]
    fn test_nilable_leaves_nil_unions_alone() {
        let union = Type::union(vec![int_lit("1"), Type::Nil]);
        assert_eq!(Type::nilable(union.clone()), union);
        assert_eq!(Type::nilable(Type::Nil), Type::Nil);
    }

    #[test]
    fn test_nilable_wraps_whole_intersection() {
        let inter = Type::intersection(vec![Type::Any, Type::SelfType]);
        assert_eq!(
            Type::nilable(inter.clone()),
            Type::Nilable(Box::new(inter))
        );
    }

    #[test]
    fn test_nilable_wraps_union_without_direct_nil() {
        let union = Type::union(vec![int_lit("1"), int_lit("2")]);
        assert!(matches!(Type::nilable(union), Type::Nilable(_)));
    }

    #[test]
    fn test_predicates() {
        assert!(Type::True.is_literal());
        assert!(!Type::Any.is_literal());
        assert!(Type::Nothing.is_bottom());
        assert!(Type::union(vec![Type::Any, Type::nilable(Type::Any)]).is_nilable());
        assert!(!Type::intersection(vec![Type::Nil]).is_nilable());
    }

    #[test]
    fn test_to_non_literal_widens_elementwise() {
        let env = GlobalEnvironment::new();
        let ty = Type::union(vec![
            int_lit("1"),
            Type::literal(LiteralKind::String, "foo"),
            Type::nilable(Type::True),
        ]);

        assert_eq!(
            ty.to_non_literal(&env).inspect(&env),
            "Std::Int | Std::String | Std::True?"
        );
    }

    #[test]
    fn test_to_non_literal_without_std() {
        let env = GlobalEnvironment::bare();
        assert_eq!(Type::Nil.to_non_literal(&env), Type::Nil);
        assert_eq!(Type::Any.to_non_literal(&env), Type::Any);
    }
}
