//! Literal types.
//!
//! A literal type is inhabited by exactly one value, spelled by its raw
//! source text. Each literal family widens to one nominal class in `Std`.

use crate::env::GlobalEnvironment;
use crate::types::Type;
use kestrel_mem::{Symbol, well_known};
use std::fmt;

/// Literal families, each tied to a `Std` class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Int,
    Int64,
    Int32,
    Int16,
    Int8,
    UInt64,
    UInt32,
    UInt16,
    UInt8,
    Float,
    Float64,
    Float32,
    BigFloat,
    String,
    Char,
    Symbol,
}

impl LiteralKind {
    /// Name of the `Std` class this literal widens to.
    #[must_use]
    pub const fn class_name(self) -> Symbol {
        match self {
            LiteralKind::Int => well_known::INT,
            LiteralKind::Int64 => well_known::INT64,
            LiteralKind::Int32 => well_known::INT32,
            LiteralKind::Int16 => well_known::INT16,
            LiteralKind::Int8 => well_known::INT8,
            LiteralKind::UInt64 => well_known::UINT64,
            LiteralKind::UInt32 => well_known::UINT32,
            LiteralKind::UInt16 => well_known::UINT16,
            LiteralKind::UInt8 => well_known::UINT8,
            LiteralKind::Float => well_known::FLOAT,
            LiteralKind::Float64 => well_known::FLOAT64,
            LiteralKind::Float32 => well_known::FLOAT32,
            LiteralKind::BigFloat => well_known::BIG_FLOAT,
            LiteralKind::String => well_known::STRING,
            LiteralKind::Char => well_known::CHAR,
            LiteralKind::Symbol => well_known::SYMBOL,
        }
    }

    /// Suffix printed after numeric literals of sized kinds.
    const fn suffix(self) -> &'static str {
        match self {
            LiteralKind::Int64 => "i64",
            LiteralKind::Int32 => "i32",
            LiteralKind::Int16 => "i16",
            LiteralKind::Int8 => "i8",
            LiteralKind::UInt64 => "u64",
            LiteralKind::UInt32 => "u32",
            LiteralKind::UInt16 => "u16",
            LiteralKind::UInt8 => "u8",
            LiteralKind::Float64 => "f64",
            LiteralKind::Float32 => "f32",
            LiteralKind::BigFloat => "bf",
            _ => "",
        }
    }

    pub const ALL: [LiteralKind; 16] = [
        LiteralKind::Int,
        LiteralKind::Int64,
        LiteralKind::Int32,
        LiteralKind::Int16,
        LiteralKind::Int8,
        LiteralKind::UInt64,
        LiteralKind::UInt32,
        LiteralKind::UInt16,
        LiteralKind::UInt8,
        LiteralKind::Float,
        LiteralKind::Float64,
        LiteralKind::Float32,
        LiteralKind::BigFloat,
        LiteralKind::String,
        LiteralKind::Char,
        LiteralKind::Symbol,
    ];
}

/// A literal value type such as `1i8`, `"foo"` or `:bar`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal {
    pub kind: LiteralKind,
    /// Raw value text without quotes or suffix.
    pub value: String,
}

impl Literal {
    #[must_use]
    pub fn new(kind: LiteralKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// Returns the `Std` class this literal widens to, if `Std` exists.
    #[must_use]
    pub fn to_non_literal(&self, env: &GlobalEnvironment) -> Option<Type> {
        env.std_subtype(self.kind.class_name()).cloned()
    }

    /// A literal is a subtype of an identical literal or of exactly its own
    /// `Std` class. Wider classes are handled by the full subtype check.
    #[must_use]
    pub fn is_subtype_of(&self, other: &Type, env: &GlobalEnvironment) -> bool {
        match other {
            Type::Literal(other) => self == other,
            Type::Namespace(id) => env
                .std_namespace(self.kind.class_name())
                .is_some_and(|class| env.namespaces_are_equal(class, *id)),
            _ => false,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LiteralKind::String => write!(f, "{:?}", self.value),
            LiteralKind::Char => write!(f, "`{}`", self.value),
            LiteralKind::Symbol => write!(f, ":{}", self.value),
            kind => write!(f, "{}{}", self.value, kind.suffix()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_display() {
        assert_eq!(Literal::new(LiteralKind::Int, "1").to_string(), "1");
        assert_eq!(Literal::new(LiteralKind::Int64, "1").to_string(), "1i64");
        assert_eq!(Literal::new(LiteralKind::UInt8, "255").to_string(), "255u8");
        assert_eq!(Literal::new(LiteralKind::Float64, "1.5").to_string(), "1.5f64");
        assert_eq!(Literal::new(LiteralKind::Float, "1.5").to_string(), "1.5");
        assert_eq!(Literal::new(LiteralKind::BigFloat, "1.5").to_string(), "1.5bf");
        assert_eq!(Literal::new(LiteralKind::String, "foo").to_string(), "\"foo\"");
        assert_eq!(Literal::new(LiteralKind::Char, "a").to_string(), "`a`");
        assert_eq!(Literal::new(LiteralKind::Symbol, "foo").to_string(), ":foo");
    }

    #[test]
    fn test_literal_subtype_of_own_class_only() {
        let env = GlobalEnvironment::new();
        let one = Literal::new(LiteralKind::Int, "1");

        let int = env.std_subtype(well_known::INT).cloned().unwrap();
        let float = env.std_subtype(well_known::FLOAT).cloned().unwrap();
        let value = env.std_subtype(well_known::VALUE).cloned().unwrap();

        assert!(one.is_subtype_of(&int, &env));
        assert!(!one.is_subtype_of(&float, &env));
        assert!(!one.is_subtype_of(&value, &env));
    }

    #[test]
    fn test_literal_subtype_of_equal_literal() {
        let env = GlobalEnvironment::bare();
        let a = Literal::new(LiteralKind::String, "foo");

        assert!(a.is_subtype_of(&Type::Literal(a.clone()), &env));
        assert!(!a.is_subtype_of(&Type::Literal(Literal::new(LiteralKind::String, "bar")), &env));
        assert!(!a.is_subtype_of(&Type::Literal(Literal::new(LiteralKind::Symbol, "foo")), &env));
    }

    #[test]
    fn test_to_non_literal_needs_std() {
        let lit = Literal::new(LiteralKind::Char, "x");

        assert!(lit.to_non_literal(&GlobalEnvironment::bare()).is_none());

        let env = GlobalEnvironment::new();
        let widened = lit.to_non_literal(&env).unwrap();
        assert_eq!(widened.inspect(&env), "Std::Char");
    }

    #[test]
    fn test_every_kind_has_a_std_class() {
        let env = GlobalEnvironment::new();
        for kind in LiteralKind::ALL {
            assert!(env.std_namespace(kind.class_name()).is_some(), "{kind:?}");
        }
    }
}
