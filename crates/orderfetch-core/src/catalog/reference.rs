//! Scope-bound relation references.
//!
//! A relation is either already loaded (fetch-joined) or only known by key.
//! Either way it remembers the read scope that produced it; the loader refuses
//! to resolve it with any other scope.

use std::fmt;

/// Identity of one read scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub(crate) u64);

impl ScopeId {
    /// Raw scope number.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single-valued relation (many-to-one or one-to-one).
#[derive(Debug, Clone)]
pub struct Ref<T> {
    key: i64,
    scope: ScopeId,
    loaded: Option<T>,
}

impl<T> Ref<T> {
    /// Reference known only by key; resolving it costs a round trip.
    pub(crate) fn lazy(key: i64, scope: ScopeId) -> Self {
        Self {
            key,
            scope,
            loaded: None,
        }
    }

    /// Reference whose target arrived in the same round trip as its owner.
    pub(crate) fn loaded(key: i64, scope: ScopeId, value: T) -> Self {
        Self {
            key,
            scope,
            loaded: Some(value),
        }
    }

    /// Key of the referenced row.
    pub fn key(&self) -> i64 {
        self.key
    }

    /// Scope that produced this reference.
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// Whether the target was fetch-joined.
    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub(crate) fn get(&self) -> Option<&T> {
        self.loaded.as_ref()
    }
}

/// A collection-valued relation keyed by its owner.
#[derive(Debug, Clone)]
pub struct Children<T> {
    owner: i64,
    scope: ScopeId,
    loaded: Option<Vec<T>>,
}

impl<T> Children<T> {
    pub(crate) fn lazy(owner: i64, scope: ScopeId) -> Self {
        Self {
            owner,
            scope,
            loaded: None,
        }
    }

    pub(crate) fn loaded(owner: i64, scope: ScopeId, values: Vec<T>) -> Self {
        Self {
            owner,
            scope,
            loaded: Some(values),
        }
    }

    /// Key of the owning row.
    pub fn owner(&self) -> i64 {
        self.owner
    }

    /// Scope that produced this collection.
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// Whether the collection was fetched together with its owner.
    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub(crate) fn get(&self) -> Option<&[T]> {
        self.loaded.as_deref()
    }

    /// Attach a collection fetched by a later batched query.
    pub(crate) fn attach(&mut self, values: Vec<T>) {
        self.loaded = Some(values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lazy_ref_has_no_value() {
        let r: Ref<String> = Ref::lazy(7, ScopeId(1));
        assert_eq!(r.key(), 7);
        assert!(!r.is_loaded());
        assert!(r.get().is_none());
    }

    #[test]
    fn test_children_attach_loads_collection() {
        let mut c: Children<i64> = Children::lazy(3, ScopeId(1));
        assert!(!c.is_loaded());
        c.attach(vec![10, 11]);
        assert_eq!(c.owner(), 3);
        assert_eq!(c.get(), Some(&[10, 11][..]));
    }
}
