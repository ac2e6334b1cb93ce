//! Thread-safe string interning.
//!
//! [`SymbolTable`] maps strings to [`Symbol`]s and back. String bytes are
//! copied into the process-wide [`global_arena`] once and never move, so
//! lookups hand out `&'static str` without cloning.
//!
//! Reads take a shared lock; interning a new string takes the write lock
//! and re-checks the map, so two threads racing on the same string agree
//! on one symbol.

use crate::arena::global_arena;
use crate::symbol::{Symbol, WELL_KNOWN};
use hashbrown::HashMap;
use std::sync::{OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct TableInner {
    strings: Vec<&'static str>,
    symbols: HashMap<&'static str, Symbol>,
}

/// Bidirectional string/symbol table.
pub struct SymbolTable {
    inner: RwLock<TableInner>,
}

impl SymbolTable {
    /// Creates a table pre-seeded with the [`well_known`] symbols.
    ///
    /// [`well_known`]: crate::symbol::well_known
    #[must_use]
    pub fn new() -> Self {
        let mut inner = TableInner::default();
        for (index, &name) in WELL_KNOWN.iter().enumerate() {
            let symbol = Symbol::new(index as u32);
            inner.strings.push(name);
            inner.symbols.insert(name, symbol);
        }

        SymbolTable {
            inner: RwLock::new(inner),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, TableInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TableInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the symbol for `s`, interning it on first sight.
    pub fn intern(&self, s: &str) -> Symbol {
        if let Some(&symbol) = self.read().symbols.get(s) {
            return symbol;
        }

        let mut inner = self.write();
        if let Some(&symbol) = inner.symbols.get(s) {
            return symbol;
        }

        let stored: &'static str = global_arena().alloc_str(s);
        let symbol = Symbol::new(inner.strings.len() as u32);
        inner.strings.push(stored);
        inner.symbols.insert(stored, symbol);
        symbol
    }

    /// Returns the symbol for `s` without interning it.
    #[must_use]
    pub fn get(&self, s: &str) -> Option<Symbol> {
        self.read().symbols.get(s).copied()
    }

    /// Returns the string behind `symbol`, if it came from this table.
    #[must_use]
    pub fn resolve(&self, symbol: Symbol) -> Option<&'static str> {
        self.read().strings.get(symbol.as_u32() as usize).copied()
    }

    /// Number of interned strings, well-known ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().strings.len()
    }

    /// Always false: the well-known symbols are present from the start.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().strings.is_empty()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the process-wide symbol table.
pub fn symbol_table() -> &'static SymbolTable {
    static TABLE: OnceLock<SymbolTable> = OnceLock::new();
    TABLE.get_or_init(SymbolTable::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_table() -> &'static SymbolTable {
        Box::leak(Box::new(SymbolTable::new()))
    }

    #[test]
    fn test_intern_is_stable() {
        let table = fresh_table();

        let a = table.intern("Greeter");
        let b = table.intern("Greeter");
        let c = table.intern("Farewell");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(table.resolve(a), Some("Greeter"));
        assert_eq!(table.resolve(c), Some("Farewell"));
    }

    #[test]
    fn test_seeded_with_well_known() {
        let table = fresh_table();

        assert_eq!(table.len(), WELL_KNOWN.len());
        assert!(!table.is_empty());
        assert_eq!(table.get("Std"), Some(crate::well_known::STD));
        assert_eq!(table.intern("Object"), crate::well_known::OBJECT);
    }

    #[test]
    fn test_get_does_not_intern() {
        let table = fresh_table();

        assert_eq!(table.get("Unseen"), None);
        assert_eq!(table.len(), WELL_KNOWN.len());
    }

    #[test]
    fn test_new_symbols_follow_well_known() {
        let table = fresh_table();
        let sym = table.intern("Fresh");

        assert_eq!(sym.as_u32() as usize, WELL_KNOWN.len());
    }

    #[test]
    fn test_resolve_out_of_range() {
        let table = fresh_table();
        assert_eq!(table.resolve(Symbol::new(9_999)), None);
    }

    #[test]
    fn test_concurrent_interning_agrees() {
        let table = fresh_table();
        let names: Vec<String> = (0..64).map(|i| format!("name_{i}")).collect();

        let results: Vec<Vec<Symbol>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let names = &names;
                    scope.spawn(move || names.iter().map(|n| table.intern(n)).collect())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for other in &results[1..] {
            assert_eq!(&results[0], other);
        }
        assert_eq!(table.len(), WELL_KNOWN.len() + names.len());
    }

    #[test]
    fn test_strings_live_in_global_arena() {
        let table = fresh_table();
        let before = global_arena().stats().total_allocated;

        let sym = table.intern("stored_in_the_shared_arena");

        assert!(global_arena().stats().total_allocated >= before + "stored_in_the_shared_arena".len());
        assert_eq!(table.resolve(sym), Some("stored_in_the_shared_arena"));
    }

    #[test]
    fn test_empty_string() {
        let table = fresh_table();
        let sym = table.intern("");
        assert_eq!(table.resolve(sym), Some(""));
    }
}
