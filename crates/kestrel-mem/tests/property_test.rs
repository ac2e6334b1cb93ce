//! Property tests for symbol interning.

use kestrel_mem::Symbol;
use proptest::prelude::*;

proptest! {
    #[test]
    fn interning_round_trips(s in ".{0,40}") {
        let sym = Symbol::intern(&s);
        prop_assert_eq!(sym.as_str(), s.as_str());
    }

    #[test]
    fn equal_strings_share_a_symbol(s in "[A-Za-z_][A-Za-z0-9_]{0,20}") {
        let owned = s.clone();
        prop_assert_eq!(Symbol::intern(&s), Symbol::intern(&owned));
    }

    #[test]
    fn distinct_strings_get_distinct_symbols(a in "[a-z]{1,12}", b in "[a-z]{1,12}") {
        prop_assume!(a != b);
        prop_assert_ne!(Symbol::intern(&a), Symbol::intern(&b));
    }
}
