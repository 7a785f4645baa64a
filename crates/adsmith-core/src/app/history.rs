//! HistoryStore - 過去の生成物の上限つき永続ログ
//!
//! # 構成
//! - media class ごとに 1 本のログ（新しい順）
//! - 起動時に 1 回読み込み、変更のたびに全体を書き戻す
//! - 上限を超えた分は古い順に捨てる（FIFO）
//!
//! # エラー
//! ストレージの失敗は warn ログを出して握りつぶす。生成自体は失敗させない。

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{Artifact, ArtifactId, HistoryEntry, HistoryError, MediaClass};
use crate::ports::HistoryStorage;

/// Maximum entries kept per media class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryCapacity {
    pub image: usize,
    pub video: usize,
}

impl HistoryCapacity {
    pub fn new(image: usize, video: usize) -> Self {
        Self { image, video }
    }

    pub fn get(&self, media: MediaClass) -> usize {
        match media {
            MediaClass::Image => self.image,
            MediaClass::Video => self.video,
        }
    }
}

impl Default for HistoryCapacity {
    fn default() -> Self {
        Self::new(50, 20)
    }
}

#[derive(Debug, Default)]
struct MediaLog {
    entries: Vec<HistoryEntry>,
    next_sequence: u64,
}

impl MediaLog {
    fn from_entries(mut entries: Vec<HistoryEntry>, capacity: usize) -> Self {
        entries.truncate(capacity);
        let next_sequence = entries.iter().map(|e| e.sequence + 1).max().unwrap_or(0);
        Self {
            entries,
            next_sequence,
        }
    }
}

pub struct HistoryStore {
    storage: Arc<dyn HistoryStorage>,
    capacity: HistoryCapacity,
    logs: Mutex<HashMap<MediaClass, MediaLog>>,
}

impl HistoryStore {
    /// Creates the store and loads every media class.
    pub async fn open(storage: Arc<dyn HistoryStorage>, capacity: HistoryCapacity) -> Self {
        let store = Self {
            storage,
            capacity,
            logs: Mutex::new(HashMap::new()),
        };
        for media in MediaClass::ALL {
            store.load(media).await;
        }
        store
    }

    pub fn capacity(&self) -> HistoryCapacity {
        self.capacity
    }

    /// (Re)reads one media class from storage.
    ///
    /// Missing data yields an empty history. Malformed data also yields an
    /// empty history, with a warning.
    pub async fn load(&self, media: MediaClass) {
        let namespace = media.history_namespace();
        let entries = match self.read_entries(namespace).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(%media, namespace, error = %e, "discarding unreadable history");
                Vec::new()
            }
        };
        tracing::debug!(%media, entries = entries.len(), "history loaded");

        let log = MediaLog::from_entries(entries, self.capacity.get(media));
        self.logs.lock().await.insert(media, log);
    }

    async fn read_entries(&self, namespace: &str) -> Result<Vec<HistoryEntry>, HistoryError> {
        match self.storage.read(namespace).await? {
            Some(payload) => Ok(serde_json::from_str(&payload)?),
            None => Ok(Vec::new()),
        }
    }

    /// Entries of one media class, newest first.
    pub async fn entries(&self, media: MediaClass) -> Vec<HistoryEntry> {
        self.logs
            .lock()
            .await
            .get(&media)
            .map(|log| log.entries.clone())
            .unwrap_or_default()
    }

    /// Prepends `artifacts` (keeping their order) and evicts the oldest
    /// entries beyond capacity.
    pub async fn append(&self, media: MediaClass, artifacts: &[Artifact]) {
        if artifacts.is_empty() {
            return;
        }
        let mut logs = self.logs.lock().await;
        let log = logs.entry(media).or_default();

        let fresh: Vec<HistoryEntry> = artifacts
            .iter()
            .enumerate()
            .map(|(i, artifact)| HistoryEntry {
                sequence: log.next_sequence + i as u64,
                artifact: artifact.clone(),
            })
            .collect();
        log.next_sequence += artifacts.len() as u64;
        log.entries.splice(0..0, fresh);
        log.entries.truncate(self.capacity.get(media));

        let snapshot = serde_json::to_string(&log.entries);
        // Written under the lock so snapshots reach storage in order.
        match snapshot {
            Ok(payload) => {
                if let Err(e) = self.storage.write(media.history_namespace(), payload).await {
                    tracing::warn!(%media, error = %e, "failed to persist history");
                }
            }
            Err(e) => tracing::warn!(%media, error = %e, "failed to serialize history"),
        }
    }

    /// Drops the in-memory and persisted history of one media class.
    pub async fn clear(&self, media: MediaClass) {
        let mut logs = self.logs.lock().await;
        logs.insert(media, MediaLog::default());
        if let Err(e) = self.storage.remove(media.history_namespace()).await {
            tracing::warn!(%media, error = %e, "failed to remove persisted history");
        }
    }

    /// Looks an artifact up in every media class.
    pub async fn find(&self, id: ArtifactId) -> Option<Artifact> {
        let logs = self.logs.lock().await;
        logs.values()
            .flat_map(|log| log.entries.iter())
            .find(|entry| entry.artifact.id == id)
            .map(|entry| entry.artifact.clone())
    }
}
