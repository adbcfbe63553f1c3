//! In-process cache store with optional file snapshot.

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cache::{CacheError, CacheStore};

/// A thread-safe in-memory store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<DashMap<String, Vec<u8>>>,
    persistence_path: Option<PathBuf>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that can be saved to `path` with [`MemoryStore::save_to_file`].
    pub fn with_persistence(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            persistence_path: Some(path.into()),
        }
    }

    /// Load a snapshot if the file exists; start empty otherwise.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let path = path.as_ref();
        let store = Self::with_persistence(path);
        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            let map: HashMap<String, Vec<u8>> = serde_json::from_reader(reader)?;
            for (k, v) in map {
                store.inner.insert(k, v);
            }
            tracing::info!(entries = store.inner.len(), path = %path.display(), "Loaded cache snapshot");
        }
        Ok(store)
    }

    /// Write a snapshot. Does nothing without a persistence path.
    pub fn save_to_file(&self) -> Result<(), CacheError> {
        let Some(path) = &self.persistence_path else {
            return Ok(());
        };
        let map: HashMap<String, Vec<u8>> = self
            .inner
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, &map)?;
        tracing::info!(entries = map.len(), path = %path.display(), "Saved cache snapshot");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.inner.get(key).map(|r| r.value().clone()))
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        self.inner.insert(key.to_string(), value);
        Ok(())
    }
}
