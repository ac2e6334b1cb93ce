//! Type pretty-printing.
//!
//! Namespace names live in the environment, so printing goes through the
//! [`DisplayType`] wrapper which carries both the type and the environment.
//! The output is the canonical `inspect` form used in diagnostics:
//!
//! | Type | Printed |
//! |------|---------|
//! | union | `A \| B` |
//! | intersection | `A & B` |
//! | negation | `~A` |
//! | nilable | `A?` |
//! | singleton of | `&A` |
//! | instance of | `^A` |
//!
//! Nested unions and intersections are parenthesized.

use crate::env::GlobalEnvironment;
use crate::types::Type;
use std::fmt;

pub struct DisplayType<'a> {
    ty: &'a Type,
    env: &'a GlobalEnvironment,
}

impl<'a> DisplayType<'a> {
    pub fn new(ty: &'a Type, env: &'a GlobalEnvironment) -> Self {
        Self { ty, env }
    }
}

impl fmt::Display for DisplayType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.format_type(self.ty, f)
    }
}

/// Compound types that need parentheses when nested in another operator.
const fn needs_parens(ty: &Type) -> bool {
    matches!(ty, Type::Union(_) | Type::Intersection(_))
}

impl DisplayType<'_> {
    fn format_type(&self, ty: &Type, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match ty {
            Type::Never => write!(f, "never"),
            Type::Any => write!(f, "any"),
            Type::Untyped => write!(f, "untyped"),
            Type::Void => write!(f, "void"),
            Type::Nothing => write!(f, "nothing"),
            Type::NoValue => write!(f, "<novalue>"),
            Type::Nil => write!(f, "nil"),
            Type::True => write!(f, "true"),
            Type::False => write!(f, "false"),
            Type::Literal(lit) => write!(f, "{lit}"),

            Type::Union(elements) => self.format_joined(elements, " | ", f),
            Type::Intersection(elements) => self.format_joined(elements, " & ", f),
            Type::Not(inner) => {
                write!(f, "~")?;
                self.format_operand(inner, f)
            }
            Type::Nilable(inner) => {
                self.format_operand(inner, f)?;
                write!(f, "?")
            }
            Type::SingletonOf(inner) => {
                write!(f, "&")?;
                self.format_operand(inner, f)
            }
            Type::InstanceOf(inner) => {
                write!(f, "^")?;
                self.format_operand(inner, f)
            }

            Type::Namespace(id) => write!(f, "{}", self.env.namespace_full_name(*id)),
            Type::Generic(id) => {
                let generic = self.env.generic(*id);
                write!(f, "{}", self.env.namespace_full_name(generic.namespace))?;
                if generic.type_arguments.is_empty() {
                    return Ok(());
                }
                write!(f, "[")?;
                for (i, (_, arg)) in generic.type_arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    self.format_type(&arg.ty, f)?;
                }
                write!(f, "]")
            }
            Type::TypeParameter(param) => write!(f, "{}", param.name),
            Type::SelfType => write!(f, "self"),
            Type::Named(named) => write!(f, "{}", named.name),
            Type::GenericNamed(named) => write!(f, "{}", named.name),
            Type::Callable => write!(f, "Closure"),
            Type::Closure(signature) => write!(f, "{}", signature.inspect_closure(self.env)),
            Type::Method(method) => write!(f, "{}", method.inspect(self.env)),

            Type::ConstantPlaceholder(id) | Type::Placeholder(id) => {
                write!(f, "{}", self.env.placeholder(*id).full_name)
            }
        }
    }

    fn format_operand(&self, ty: &Type, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if needs_parens(ty) {
            write!(f, "(")?;
            self.format_type(ty, f)?;
            write!(f, ")")
        } else {
            self.format_type(ty, f)
        }
    }

    fn format_joined(&self, elements: &[Type], sep: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, element) in elements.iter().enumerate() {
            if i > 0 {
                write!(f, "{sep}")?;
            }
            self.format_operand(element, f)?;
        }
        Ok(())
    }
}

impl Type {
    /// Creates a display wrapper resolving names through `env`.
    pub fn display<'a>(&'a self, env: &'a GlobalEnvironment) -> DisplayType<'a> {
        DisplayType::new(self, env)
    }
}

#[cfg(test)]
mod tests {
    use crate::env::GlobalEnvironment;
    use crate::types::{LiteralKind, Type};
    use kestrel_mem::well_known;

    fn std(env: &GlobalEnvironment, name: kestrel_mem::Symbol) -> Type {
        env.std_subtype(name).cloned().unwrap()
    }

    #[test]
    fn test_terminals() {
        let env = GlobalEnvironment::bare();
        let printed: Vec<_> = [
            Type::Never,
            Type::Any,
            Type::Untyped,
            Type::Void,
            Type::Nothing,
            Type::Nil,
            Type::True,
            Type::False,
            Type::SelfType,
        ]
        .iter()
        .map(|t| t.inspect(&env))
        .collect();

        insta::assert_snapshot!(printed.join(" "), @"never any untyped void nothing nil true false self");
    }

    #[test]
    fn test_nested_combinators_are_parenthesized() {
        let env = GlobalEnvironment::new();
        let int = std(&env, well_known::INT);
        let string = std(&env, well_known::STRING);

        let ty = Type::union(vec![
            Type::intersection(vec![int.clone(), string.clone()]),
            Type::union(vec![Type::Nil, Type::literal(LiteralKind::Symbol, "ok")]),
            Type::not(int.clone()),
        ]);
        insta::assert_snapshot!(ty.inspect(&env), @"(Std::Int & Std::String) | (nil | :ok) | ~Std::Int");

        let ty = Type::nilable(Type::intersection(vec![int.clone(), string]));
        insta::assert_snapshot!(ty.inspect(&env), @"(Std::Int & Std::String)?");

        let ty = Type::singleton_of(int.clone());
        assert_eq!(ty.inspect(&env), "&Std::Int");
        assert_eq!(Type::instance_of(ty).inspect(&env), "^&Std::Int");
    }

    #[test]
    fn test_union_keeps_insertion_order() {
        let env = GlobalEnvironment::bare();
        let ty = Type::union(vec![Type::True, Type::Nil, Type::True]);
        assert_eq!(ty.inspect(&env), "true | nil | true");
    }

    #[test]
    fn test_generic_display() {
        let mut env = GlobalEnvironment::new();
        let object = env.std_namespace(well_known::OBJECT).unwrap();
        let int = std(&env, well_known::INT);

        let generic = env.new_generic(
            object,
            [(
                kestrel_mem::Symbol::intern("T"),
                crate::types::TypeArgument::new(int, crate::types::Variance::Invariant),
            )]
            .into_iter()
            .collect(),
        );

        insta::assert_snapshot!(generic.inspect(&env), @"Std::Object[Std::Int]");
    }
}
