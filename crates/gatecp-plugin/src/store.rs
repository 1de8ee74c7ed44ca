//! Where dynamically authored plugin schemas live.
//!
//! The bridge never talks to storage directly. A [`StoreLoader`] resolves the
//! request's cluster to a [`SchemaStore`], which hands out schema sources by
//! plugin name.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::context::ClusterRef;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("unknown cluster: {0}")]
    UnknownCluster(String),

    #[error("schema store failure: {0}")]
    Backend(String),
}

/// Plugin schema sources of one cluster.
pub trait SchemaStore: Send + Sync {
    /// The source stored under `name`, if any.
    fn get(&self, name: &str) -> Result<Option<String>, StoreError>;

    /// Stored plugin names, sorted.
    fn list(&self) -> Result<Vec<String>, StoreError>;
}

/// Resolves a cluster reference to its store.
pub trait StoreLoader: Send + Sync {
    fn load(&self, cluster: &ClusterRef) -> Result<Arc<dyn SchemaStore>, StoreError>;
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sources: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, name: impl Into<String>, source: impl Into<String>) {
        self.sources.write().insert(name.into(), source.into());
    }
}

impl SchemaStore for MemoryStore {
    fn get(&self, name: &str) -> Result<Option<String>, StoreError> {
        Ok(self.sources.read().get(name).cloned())
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.sources.read().keys().cloned().collect())
    }
}

/// In-process loader keyed by cluster id.
#[derive(Default)]
pub struct MemoryLoader {
    stores: RwLock<HashMap<String, Arc<MemoryStore>>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, cluster_id: impl Into<String>, store: Arc<MemoryStore>) {
        self.stores.write().insert(cluster_id.into(), store);
    }
}

impl StoreLoader for MemoryLoader {
    fn load(&self, cluster: &ClusterRef) -> Result<Arc<dyn SchemaStore>, StoreError> {
        match self.stores.read().get(&cluster.id) {
            Some(store) => Ok(Arc::clone(store) as Arc<dyn SchemaStore>),
            None => Err(StoreError::UnknownCluster(cluster.id.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_resolves_known_clusters_only() {
        let store = Arc::new(MemoryStore::new());
        store.insert("b-plugin", "{}");
        store.insert("a-plugin", "{}");
        let loader = MemoryLoader::new();
        loader.insert("c1", Arc::clone(&store));

        let resolved = loader.load(&ClusterRef::new("c1")).unwrap();
        assert_eq!(resolved.list().unwrap(), vec!["a-plugin", "b-plugin"]);
        assert_eq!(resolved.get("a-plugin").unwrap().as_deref(), Some("{}"));
        assert_eq!(resolved.get("missing").unwrap(), None);

        assert_eq!(
            loader.load(&ClusterRef::new("c2")).err(),
            Some(StoreError::UnknownCluster("c2".to_string()))
        );
    }
}
