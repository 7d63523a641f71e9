//! Shared string storage for names repeated across parsed objects.

use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;

/// Deduplicates strings into shared `Arc<str>` instances.
///
/// Interning is idempotent and order-independent, so one interner can be
/// handed to parsers running concurrently.
#[derive(Debug, Default)]
pub struct StringInterner {
    strings: RwLock<HashSet<Arc<str>>>,
}

impl StringInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the shared instance equal to `value`, inserting it if needed.
    pub fn intern(&self, value: &str) -> Arc<str> {
        if let Some(existing) = self.strings.read().get(value) {
            return Arc::clone(existing);
        }

        let mut strings = self.strings.write();
        if let Some(existing) = strings.get(value) {
            return Arc::clone(existing);
        }
        let shared: Arc<str> = Arc::from(value);
        strings.insert(Arc::clone(&shared));
        shared
    }

    pub fn len(&self) -> usize {
        self.strings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.read().is_empty()
    }
}

/// Intern through `interner` when one is supplied, otherwise allocate.
pub(crate) fn share(interner: Option<&StringInterner>, value: &str) -> Arc<str> {
    match interner {
        Some(interner) => interner.intern(value),
        None => Arc::from(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_returns_same_instance() {
        let interner = StringInterner::new();
        let a = interner.intern("src");
        let b = interner.intern("src");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn distinct_values_are_kept_apart() {
        let interner = StringInterner::new();
        interner.intern("a");
        interner.intern("b");
        assert_eq!(interner.len(), 2);
        assert!(!interner.is_empty());
    }

    #[test]
    fn concurrent_interning_converges() {
        let interner = Arc::new(StringInterner::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let interner = Arc::clone(&interner);
                std::thread::spawn(move || interner.intern("README.md"))
            })
            .collect();
        let values: Vec<Arc<str>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(values.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(interner.len(), 1);
    }
}
