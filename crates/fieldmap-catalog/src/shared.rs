//! Process-wide catalog handle with atomic replacement.

use std::sync::{Arc, RwLock};

use tracing::info;

use crate::catalog::Catalog;

/// Cheaply clonable handle to the current catalog.
///
/// Readers take a [`snapshot`](SharedCatalog::snapshot) and keep it for the
/// whole call, so a concurrent [`replace`](SharedCatalog::replace) is never
/// observed halfway through.
#[derive(Debug, Clone, Default)]
pub struct SharedCatalog {
    inner: Arc<RwLock<Arc<Catalog>>>,
}

impl SharedCatalog {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(catalog))),
        }
    }

    pub fn snapshot(&self) -> Arc<Catalog> {
        match self.inner.read() {
            Ok(guard) => Arc::clone(&guard),
            // The lock only ever guards a pointer swap, so a poisoned value is
            // still a complete catalog.
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Swap in a new catalog, returning the previous one.
    pub fn replace(&self, catalog: Catalog) -> Arc<Catalog> {
        let next = Arc::new(catalog);
        let fields = next.len();
        let previous = match self.inner.write() {
            Ok(mut guard) => std::mem::replace(&mut *guard, next),
            Err(poisoned) => std::mem::replace(&mut *poisoned.into_inner(), next),
        };
        info!(fields, previous = previous.len(), "catalog replaced");
        previous
    }
}

impl From<Catalog> for SharedCatalog {
    fn from(catalog: Catalog) -> Self {
        Self::new(catalog)
    }
}
