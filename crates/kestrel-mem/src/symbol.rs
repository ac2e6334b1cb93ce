//! Interned string handles.
//!
//! A [`Symbol`] is a 4-byte index into the process-wide [`SymbolTable`].
//! Because the table is global, a symbol created while building one type
//! environment means the same name in every other environment, which is
//! what lets deep copies carry member names across unchanged.
//!
//! [`SymbolTable`]: crate::interner::SymbolTable

use crate::interner::symbol_table;
use std::fmt;

/// Handle to an interned string.
///
/// Equality and hashing compare the index only.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

impl Symbol {
    /// Wraps a raw table index.
    #[inline]
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Symbol(id)
    }

    /// Interns `s` in the global symbol table.
    ///
    /// ```
    /// use kestrel_mem::Symbol;
    ///
    /// let a = Symbol::intern("Greeter");
    /// let b = Symbol::intern("Greeter");
    /// assert_eq!(a, b);
    /// assert_eq!(a.as_str(), "Greeter");
    /// ```
    #[must_use]
    pub fn intern(s: &str) -> Self {
        symbol_table().intern(s)
    }

    /// Returns the raw table index.
    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Returns the interned string.
    ///
    /// A symbol that was never produced by the global table resolves to
    /// `"<unknown>"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        symbol_table().resolve(self).unwrap_or("<unknown>")
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({}, {:?})", self.0, self.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Symbol::intern(s)
    }
}

/// Names every table is seeded with, in index order.
pub(crate) const WELL_KNOWN: &[&str] = &[
    "Root", "Std", "self", "Value", "Object", "Class", "Module", "Mixin", "Interface", "Nil",
    "Bool", "True", "False", "Int", "Int64", "Int32", "Int16", "Int8", "UInt64", "UInt32",
    "UInt16", "UInt8", "Float", "Float64", "Float32", "BigFloat", "String", "Char", "Symbol",
];

/// Pre-interned symbols with fixed indices.
pub mod well_known {
    use super::Symbol;

    pub const ROOT: Symbol = Symbol::new(0);
    pub const STD: Symbol = Symbol::new(1);
    /// Name of the parameter injected into every generic.
    pub const SELF: Symbol = Symbol::new(2);
    pub const VALUE: Symbol = Symbol::new(3);
    pub const OBJECT: Symbol = Symbol::new(4);
    pub const CLASS: Symbol = Symbol::new(5);
    pub const MODULE: Symbol = Symbol::new(6);
    pub const MIXIN: Symbol = Symbol::new(7);
    pub const INTERFACE: Symbol = Symbol::new(8);
    pub const NIL: Symbol = Symbol::new(9);
    pub const BOOL: Symbol = Symbol::new(10);
    pub const TRUE: Symbol = Symbol::new(11);
    pub const FALSE: Symbol = Symbol::new(12);
    pub const INT: Symbol = Symbol::new(13);
    pub const INT64: Symbol = Symbol::new(14);
    pub const INT32: Symbol = Symbol::new(15);
    pub const INT16: Symbol = Symbol::new(16);
    pub const INT8: Symbol = Symbol::new(17);
    pub const UINT64: Symbol = Symbol::new(18);
    pub const UINT32: Symbol = Symbol::new(19);
    pub const UINT16: Symbol = Symbol::new(20);
    pub const UINT8: Symbol = Symbol::new(21);
    pub const FLOAT: Symbol = Symbol::new(22);
    pub const FLOAT64: Symbol = Symbol::new(23);
    pub const FLOAT32: Symbol = Symbol::new(24);
    pub const BIG_FLOAT: Symbol = Symbol::new(25);
    pub const STRING: Symbol = Symbol::new(26);
    pub const CHAR: Symbol = Symbol::new(27);
    pub const SYMBOL: Symbol = Symbol::new(28);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_known_indices_match_names() {
        let pairs = [
            (well_known::ROOT, "Root"),
            (well_known::STD, "Std"),
            (well_known::SELF, "self"),
            (well_known::OBJECT, "Object"),
            (well_known::NIL, "Nil"),
            (well_known::UINT8, "UInt8"),
            (well_known::BIG_FLOAT, "BigFloat"),
            (well_known::SYMBOL, "Symbol"),
        ];

        for (symbol, name) in pairs {
            assert_eq!(symbol.as_str(), name);
            assert_eq!(Symbol::intern(name), symbol);
        }
        assert_eq!(WELL_KNOWN.len(), well_known::SYMBOL.as_u32() as usize + 1);
    }

    #[test]
    fn test_display_and_debug() {
        let sym = Symbol::intern("Greeting");
        assert_eq!(sym.to_string(), "Greeting");
        assert!(format!("{sym:?}").contains("\"Greeting\""));
    }

    #[test]
    fn test_unknown_symbol_resolves_to_marker() {
        assert_eq!(Symbol::new(u32::MAX).as_str(), "<unknown>");
    }

    #[test]
    fn test_from_str() {
        let sym: Symbol = "Tally".into();
        assert_eq!(sym, Symbol::intern("Tally"));
    }
}
