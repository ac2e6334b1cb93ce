//! Subtyping.
//!
//! `is_subtype(a, b)` answers "can a value of type `a` be used where `b`
//! is expected". Nominal types relate through their ancestry, which
//! includes mixin and interface proxies, so a class is a subtype of every
//! mixin it includes.

use crate::env::GlobalEnvironment;
use crate::namespace::{Namespace, NamespaceId};
use crate::placeholder::PlaceholderKind;
use crate::types::{GenericId, Method, Type, Variance};

impl GlobalEnvironment {
    /// True if `a` is assignable to `b`.
    ///
    /// ```
    /// use kestrel_mem::well_known;
    /// use kestrel_types::{GlobalEnvironment, Type};
    ///
    /// let env = GlobalEnvironment::new();
    /// let int = env.std_subtype(well_known::INT).cloned().unwrap();
    /// let value = env.std_subtype(well_known::VALUE).cloned().unwrap();
    ///
    /// assert!(env.is_subtype(&int, &value));
    /// assert!(env.is_subtype(&Type::Nil, &Type::nilable(int.clone())));
    /// assert!(!env.is_subtype(&value, &int));
    /// ```
    #[must_use]
    pub fn is_subtype(&self, a: &Type, b: &Type) -> bool {
        if a == b {
            return true;
        }
        if let Some(a) = self.unalias(a) {
            return self.is_subtype(&a, b);
        }
        if let Some(b) = self.unalias(b) {
            return self.is_subtype(a, &b);
        }

        match (a, b) {
            (Type::Void, _) | (_, Type::Void) => return false,
            (Type::Untyped, _) | (_, Type::Untyped) => return true,
            (Type::Never | Type::Nothing, _) | (_, Type::Any) => return true,
            (Type::NoValue, _) | (_, Type::NoValue) => return false,
            _ => {}
        }

        // Combinators. Left unions split before right unions so that
        // `A | B <: B | A` holds.
        match (a, b) {
            (Type::Union(elements), _) => return elements.iter().all(|e| self.is_subtype(e, b)),
            (Type::Nilable(inner), _) => {
                return self.is_subtype(&Type::Nil, b) && self.is_subtype(inner, b);
            }
            (_, Type::Intersection(elements)) => {
                return elements.iter().all(|e| self.is_subtype(a, e));
            }
            (_, Type::Union(elements)) => {
                if elements.iter().any(|e| self.is_subtype(a, e)) {
                    return true;
                }
            }
            (_, Type::Nilable(inner)) => {
                if self.is_subtype(a, &Type::Nil) || self.is_subtype(a, inner) {
                    return true;
                }
            }
            _ => {}
        }
        // Left-hand parameters and instance types expand before a right-hand
        // union or nilable can reject them.
        match (a, b) {
            (Type::TypeParameter(param), _) => return self.is_subtype(&param.upper_bound, b),
            (Type::InstanceOf(inner), _) => {
                return self
                    .instance_type(inner)
                    .is_some_and(|instance| self.is_subtype(&instance, b));
            }
            (Type::Intersection(elements), _) => {
                return elements.iter().any(|e| self.is_subtype(e, b));
            }
            (Type::Not(a), Type::Not(b)) => return self.is_subtype(b, a),
            (Type::Not(_), _) => return false,
            (_, Type::Not(excluded)) => return self.is_disjoint(a, excluded),
            (_, Type::Union(_) | Type::Nilable(_)) => return false,
            _ => {}
        }

        if a.is_literal() {
            return self.is_literal_subtype(a, b);
        }

        match (a, b) {
            (Type::Namespace(a), Type::Namespace(b)) => self.is_ancestor(*a, *b),
            (Type::Namespace(a), Type::SingletonOf(attached)) => self
                .attached_object_of(*a)
                .is_some_and(|owner| self.is_subtype(&Type::Namespace(owner), attached)),

            (Type::Generic(a), Type::Generic(b)) => self.is_generic_subtype(*a, *b),
            (Type::Generic(a), Type::Namespace(b)) => self.is_ancestor(self.generic(*a).namespace, *b),

            (Type::SingletonOf(a), Type::SingletonOf(b)) => self.is_subtype(a, b),
            (Type::SingletonOf(attached), Type::Namespace(b)) => self
                .singleton_of_attached(attached)
                .is_some_and(|singleton| self.is_ancestor(singleton, *b)),

            (_, Type::InstanceOf(inner)) => self
                .instance_type(inner)
                .is_some_and(|instance| self.is_subtype(a, &instance)),

            (_, Type::TypeParameter(param)) => self.is_subtype(a, &param.lower_bound),

            (Type::Closure(_), Type::Callable) => true,
            (Type::Closure(a), Type::Closure(b)) | (Type::Method(a), Type::Method(b)) => {
                self.is_signature_subtype(a, b)
            }

            _ => false,
        }
    }

    /// True if no value can belong to both `a` and `b`.
    ///
    /// Only classes are considered disjoint from each other: a mixin or
    /// interface can still be included into an unrelated class later.
    #[must_use]
    pub fn is_disjoint(&self, a: &Type, b: &Type) -> bool {
        if let Some(a) = self.unalias(a) {
            return self.is_disjoint(&a, b);
        }
        if let Some(b) = self.unalias(b) {
            return self.is_disjoint(a, &b);
        }

        match (a, b) {
            (Type::Never | Type::Nothing, _) | (_, Type::Never | Type::Nothing) => true,
            (Type::Any | Type::Untyped, _) | (_, Type::Any | Type::Untyped) => false,

            (Type::Union(elements), other) | (other, Type::Union(elements)) => {
                elements.iter().all(|e| self.is_disjoint(e, other))
            }
            (Type::Nilable(inner), other) | (other, Type::Nilable(inner)) => {
                self.is_disjoint(&Type::Nil, other) && self.is_disjoint(inner, other)
            }
            (Type::Intersection(elements), other) | (other, Type::Intersection(elements)) => {
                elements.iter().any(|e| self.is_disjoint(e, other))
            }
            (Type::Not(excluded), other) | (other, Type::Not(excluded)) => {
                self.is_subtype(other, excluded)
            }

            _ if self.is_subtype(a, b) || self.is_subtype(b, a) => false,

            (lit, other) | (other, lit) if lit.is_literal() => {
                other.is_literal() || !self.is_subtype(lit, other)
            }

            _ => match (self.nominal_class(a), self.nominal_class(b)) {
                (Some(a), Some(b)) => !self.is_ancestor(a, b) && !self.is_ancestor(b, a),
                _ => false,
            },
        }
    }

    /// The type a named or placeholder type stands for, if it stands for
    /// something else.
    fn unalias(&self, ty: &Type) -> Option<Type> {
        match ty {
            Type::Named(named) => Some(named.ty.clone()),
            Type::ConstantPlaceholder(id) | Type::Placeholder(id) => {
                let data = self.placeholder(*id);
                if !data.replaced {
                    return None;
                }
                let slot = match data.kind {
                    PlaceholderKind::Constant => self.constant(data.container, data.as_name),
                    PlaceholderKind::Subtype => self.subtype(data.container, data.as_name),
                };
                slot.filter(|ty| !matches!(ty, Type::ConstantPlaceholder(_) | Type::Placeholder(_)))
                    .cloned()
            }
            _ => None,
        }
    }

    fn is_literal_subtype(&self, literal: &Type, other: &Type) -> bool {
        if let Type::Literal(lit) = literal {
            if lit.is_subtype_of(other, self) {
                return true;
            }
        }
        if other.is_literal() {
            return false;
        }

        let widened = literal.to_non_literal(self);
        widened != *literal && self.is_subtype(&widened, other)
    }

    fn is_generic_subtype(&self, a: GenericId, b: GenericId) -> bool {
        let (a, b) = (self.generic(a), self.generic(b));
        if !self.namespaces_are_equal(a.namespace, b.namespace) {
            return false;
        }

        b.type_arguments.iter().all(|(name, expected)| {
            let Some(actual) = a.type_arguments.get(name) else {
                return false;
            };
            match expected.variance {
                Variance::Covariant => self.is_subtype(&actual.ty, &expected.ty),
                Variance::Contravariant => self.is_subtype(&expected.ty, &actual.ty),
                Variance::Invariant => {
                    self.is_subtype(&actual.ty, &expected.ty)
                        && self.is_subtype(&expected.ty, &actual.ty)
                }
            }
        })
    }

    /// Parameters are contravariant, the return type covariant.
    fn is_signature_subtype(&self, a: &Method, b: &Method) -> bool {
        if a.params.len() != b.params.len() || a.required_param_count() > b.required_param_count() {
            return false;
        }
        let params = a
            .params
            .iter()
            .zip(&b.params)
            .all(|(a, b)| self.is_subtype(&b.ty, &a.ty));
        let throws = match (&a.throw_type, &b.throw_type) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(a), Some(b)) => self.is_subtype(a, b),
        };

        params && throws && self.is_subtype(&a.return_type, &b.return_type)
    }

    fn singleton_of_attached(&self, attached: &Type) -> Option<NamespaceId> {
        match attached {
            Type::Namespace(id) => self.singleton_class_of(*id),
            Type::Generic(id) => self.singleton_class_of(self.generic(*id).namespace),
            _ => None,
        }
    }

    /// `InstanceOf(SingletonOf(T))` is `T`; the instance of a singleton
    /// class is its attached namespace.
    fn instance_type(&self, inner: &Type) -> Option<Type> {
        match inner {
            Type::SingletonOf(attached) => Some((**attached).clone()),
            Type::Namespace(id) => self.attached_object_of(*id).map(Type::Namespace),
            _ => None,
        }
    }

    fn nominal_class(&self, ty: &Type) -> Option<NamespaceId> {
        let id = match ty {
            Type::Namespace(id) => *id,
            Type::Generic(id) => self.generic(*id).namespace,
            _ => return None,
        };
        let id = self.unwrap_namespace(id);
        matches!(self.namespace(id), Namespace::Class(_) | Namespace::SingletonClass(_)).then_some(id)
    }
}
