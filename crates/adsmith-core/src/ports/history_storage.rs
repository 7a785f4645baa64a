//! HistoryStorage port - 履歴スナップショットの永続化
//!
//! # 実装
//! - **FileHistoryStorage**: namespace ごとの JSON ファイル
//! - **InMemoryHistoryStorage**: テスト用

use async_trait::async_trait;

use crate::domain::HistoryError;

/// Stores one serialized snapshot per namespace.
///
/// The history store is the only caller; it serializes and validates the
/// payload itself.
#[async_trait]
pub trait HistoryStorage: Send + Sync {
    /// `Ok(None)` when nothing was stored under `namespace`.
    async fn read(&self, namespace: &str) -> Result<Option<String>, HistoryError>;

    async fn write(&self, namespace: &str, payload: String) -> Result<(), HistoryError>;

    async fn remove(&self, namespace: &str) -> Result<(), HistoryError>;
}
