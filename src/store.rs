//! Read access to the revealed areas persisted by the application.

use crate::error::Result;
use crate::geojson::Feature;
use async_trait::async_trait;
use std::sync::{PoisonError, RwLock};

/// Source of the revealed areas a fog calculation subtracts.
///
/// The engine only ever reads from it.
#[async_trait]
pub trait RevealedAreaStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Feature>>;
}

/// A store kept in memory, handy for tests and small embeddings.
#[derive(Debug, Default)]
pub struct MemoryStore {
    areas: RwLock<Vec<Feature>>,
}

impl MemoryStore {
    pub fn new(areas: Vec<Feature>) -> Self {
        Self {
            areas: RwLock::new(areas),
        }
    }

    pub fn push(&self, area: Feature) {
        self.areas
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(area);
    }

    pub fn replace(&self, areas: Vec<Feature>) {
        *self.areas.write().unwrap_or_else(PoisonError::into_inner) = areas;
    }

    pub fn len(&self) -> usize {
        self.areas.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RevealedAreaStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Feature>> {
        Ok(self
            .areas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64) -> Feature {
        Feature::polygon(vec![vec![
            [x, 0.0],
            [x + 1.0, 0.0],
            [x + 1.0, 1.0],
            [x, 1.0],
            [x, 0.0],
        ]])
    }

    #[tokio::test]
    async fn test_memory_store_lists_snapshot() {
        let store = MemoryStore::new(vec![square(0.0)]);
        let before = store.list().await.unwrap();
        store.push(square(5.0));
        assert_eq!(before.len(), 1);
        assert_eq!(store.list().await.unwrap().len(), 2);

        store.replace(Vec::new());
        assert!(store.is_empty());
    }
}
