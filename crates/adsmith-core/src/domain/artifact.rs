//! Artifact: one produced creative, and its persisted history form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::brief::{Brief, MediaClass};
use super::ids::ArtifactId;

/// Inline payload returned by providers that answer with bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlinePayload {
    pub mime: String,
    /// Base64 (standard alphabet) encoded bytes.
    pub data: String,
}

/// Where the artifact content lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ContentRef {
    Url(String),
    Inline(InlinePayload),
}

impl ContentRef {
    pub fn url(url: impl Into<String>) -> Self {
        ContentRef::Url(url.into())
    }

    pub fn inline(mime: impl Into<String>, data: impl Into<String>) -> Self {
        ContentRef::Inline(InlinePayload {
            mime: mime.into(),
            data: data.into(),
        })
    }
}

/// Artifact は生成物 1 件
///
/// プレースホルダー（degraded）の結果も同じスキーマを使う。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: ArtifactId,
    pub media_class: MediaClass,
    pub content: ContentRef,
    /// 元の brief のスナップショット（regenerate で再利用）
    pub brief: Brief,
    pub title: String,
    pub description: String,
    pub note: String,
    #[serde(default)]
    pub degraded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Persisted form of an artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Insertion sequence number, increasing per media class.
    pub sequence: u64,
    pub artifact: Artifact,
}
