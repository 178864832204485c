//! String interning for declaration and member names
//!
//! The typed tree and the backend IR share one interner, so a [`Name`]
//! produced while building the typed tree can be stored on IR nodes as is.

pub use lasso::Spur as Name;
use lasso::ThreadedRodeo;
use std::fmt;
use std::sync::Arc;

/// Thread-safe string interner
///
/// Cloning is cheap: every clone interns into the same table.
#[derive(Clone)]
pub struct Interner {
    inner: Arc<ThreadedRodeo>,
}

impl Interner {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ThreadedRodeo::new()),
        }
    }

    /// Intern `text`, returning the existing name if it was seen before
    pub fn intern(&self, text: &str) -> Name {
        self.inner.get_or_intern(text)
    }

    /// Look up an already interned string without adding it
    pub fn get(&self, text: &str) -> Option<Name> {
        self.inner.get(text)
    }

    pub fn resolve(&self, name: Name) -> &str {
        self.inner.resolve(&name)
    }

    pub fn try_resolve(&self, name: Name) -> Option<&str> {
        self.inner.try_resolve(&name)
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Interner {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Interner")
            .field("len", &self.inner.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_shared_between_clones() {
        let interner = Interner::new();
        let copy = interner.clone();
        let first = interner.intern("component1");
        let second = copy.intern("component1");
        assert_eq!(first, second);
        assert_eq!(copy.resolve(first), "component1");
    }

    #[test]
    fn get_does_not_intern() {
        let interner = Interner::new();
        assert!(interner.get("copy").is_none());
        let name = interner.intern("copy");
        assert_eq!(interner.get("copy"), Some(name));
    }
}
