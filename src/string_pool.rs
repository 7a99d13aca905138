//! Per-parse string interning
//!
//! Documents repeat the same short strings thousands of times (annotation
//! names, species, library names, modification names). A [`StringPool`]
//! hands out one shared allocation per distinct value. A pool lives for a
//! single parse and is never shared between parses.

use std::collections::HashSet;
use std::sync::Arc;

/// Deduplicating store of strings seen during one parse
#[derive(Debug, Default)]
pub struct StringPool {
    strings: HashSet<Arc<str>>,
}

impl StringPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the pooled copy of `value`, adding it on first sight.
    ///
    /// Equal inputs interned in the same pool return pointer-identical
    /// `Arc`s.
    pub fn intern(&mut self, value: &str) -> Arc<str> {
        if let Some(existing) = self.strings.get(value) {
            return Arc::clone(existing);
        }
        let interned: Arc<str> = Arc::from(value);
        self.strings.insert(Arc::clone(&interned));
        interned
    }

    /// Intern an optional value
    pub fn intern_opt(&mut self, value: Option<&str>) -> Option<Arc<str>> {
        value.map(|v| self.intern(v))
    }

    /// Number of distinct strings held
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Whether nothing has been interned yet
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_same_pool_shares_allocation() {
        let mut pool = StringPool::new();
        let a = pool.intern("Homo sapiens");
        let b = pool.intern(&String::from("Homo sapiens"));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_separate_pools_do_not_share() {
        let mut first = StringPool::new();
        let mut second = StringPool::new();
        let a = first.intern("Note");
        let b = second.intern("Note");
        assert_eq!(a, b);
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_intern_opt() {
        let mut pool = StringPool::new();
        assert!(pool.intern_opt(None).is_none());
        assert!(pool.is_empty());
        assert_eq!(pool.intern_opt(Some("x")).as_deref(), Some("x"));
    }

    proptest! {
        #[test]
        fn prop_interning_is_idempotent(values in prop::collection::vec("[a-zA-Z ]{0,12}", 1..40)) {
            let mut pool = StringPool::new();
            let first: Vec<_> = values.iter().map(|v| pool.intern(v)).collect();
            let second: Vec<_> = values.iter().map(|v| pool.intern(v)).collect();
            for (a, b) in first.iter().zip(second.iter()) {
                prop_assert!(Arc::ptr_eq(a, b));
            }
            let distinct: HashSet<&String> = values.iter().collect();
            prop_assert_eq!(pool.len(), distinct.len());
        }
    }
}
