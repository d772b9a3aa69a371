//! Interned names for router blocks and traffic flows.

use lasso::ThreadedRodeo;
use serde::{Deserialize, Serialize};

/// Handle to a block or flow name held by an [`Interner`].
///
/// Names are only needed when diagnostics or the placement file are
/// written.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Ident(u32);

impl Ident {
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    pub fn as_raw(self) -> u32 {
        self.0
    }
}

// SAFETY: `try_from_usize` rejects anything wider than `u32`.
unsafe impl lasso::Key for Ident {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn try_from_usize(int: usize) -> Option<Self> {
        u32::try_from(int).ok().map(Ident)
    }
}

/// Name table shared by the loader, the diagnostics and the placement
/// writer. Safe to intern into from several threads.
pub struct Interner {
    names: ThreadedRodeo<Ident>,
}

impl Default for Interner {
    fn default() -> Self {
        Self {
            names: ThreadedRodeo::new(),
        }
    }
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handle for `name`, adding it on first use.
    pub fn get_or_intern(&self, name: &str) -> Ident {
        self.names.get_or_intern(name)
    }

    /// Panics if `ident` came from another interner.
    pub fn resolve(&self, ident: Ident) -> &str {
        self.names.resolve(&ident)
    }

    pub fn try_resolve(&self, ident: Ident) -> Option<&str> {
        self.names.try_resolve(&ident)
    }

    /// Number of distinct names interned so far.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_names_are_deduplicated() {
        let interner = Interner::new();
        let a = interner.get_or_intern("dma_to_ddr");
        let b = interner.get_or_intern("router_blk_3");
        assert_eq!(interner.get_or_intern("dma_to_ddr"), a);
        assert_ne!(a, b);
        assert_eq!(interner.len(), 2);
        assert_eq!(interner.resolve(b), "router_blk_3");
    }

    #[test]
    fn foreign_ident_does_not_resolve() {
        let interner = Interner::new();
        assert!(interner.is_empty());
        interner.get_or_intern("only");
        assert!(interner.try_resolve(Ident::from_raw(17)).is_none());
    }

    #[test]
    fn ident_serializes_as_its_index() {
        let id = Ident::from_raw(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        let back: Ident = serde_json::from_str("42").unwrap();
        assert_eq!(back.as_raw(), 42);
    }
}
