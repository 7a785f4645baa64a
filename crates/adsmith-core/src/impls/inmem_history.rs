//! InMemoryHistoryStorage - テスト用のメモリ上ストレージ

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::HistoryError;
use crate::ports::HistoryStorage;

/// HashMap-backed storage. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistoryStorage {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryHistoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates a namespace, e.g. with corrupted data.
    pub async fn seed(&self, namespace: &str, payload: impl Into<String>) {
        self.slots
            .lock()
            .await
            .insert(namespace.to_string(), payload.into());
    }

    /// Raw stored payload.
    pub async fn snapshot(&self, namespace: &str) -> Option<String> {
        self.slots.lock().await.get(namespace).cloned()
    }
}

#[async_trait]
impl HistoryStorage for InMemoryHistoryStorage {
    async fn read(&self, namespace: &str) -> Result<Option<String>, HistoryError> {
        Ok(self.snapshot(namespace).await)
    }

    async fn write(&self, namespace: &str, payload: String) -> Result<(), HistoryError> {
        self.slots.lock().await.insert(namespace.to_string(), payload);
        Ok(())
    }

    async fn remove(&self, namespace: &str) -> Result<(), HistoryError> {
        self.slots.lock().await.remove(namespace);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clones_share_state() {
        let storage = InMemoryHistoryStorage::new();
        let other = storage.clone();

        storage.write("ns", "x".into()).await.unwrap();
        assert_eq!(other.read("ns").await.unwrap().as_deref(), Some("x"));

        other.remove("ns").await.unwrap();
        assert!(storage.read("ns").await.unwrap().is_none());
    }
}
