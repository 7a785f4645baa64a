//! Domain identifiers (strongly-typed IDs).
//!
//! すべての ID は ULID を `Id<T>` で包んだもの。`T` はサイズ 0 のマーカー型で、
//! コンパイル時にだけ存在します。
//!
//! ## ULID の特性
//! - **時刻でソート可能**: 履歴ファイルが生成順に並ぶ
//! - **同一ミリ秒でも一意**: `ports::id_generator` の単調増加ジェネレータを使う
//!
//! ## Phantom Type パターン
//! - `ArtifactId` と `RequestId` は混同できない
//! - Display のプレフィックス（`art-`, `req-`）はマーカーが提供

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use ulid::Ulid;

/// IdMarker は各 ID 型のマーカー trait
pub trait IdMarker: Send + Sync + 'static {
    /// Display で使うプレフィックス（例: "art-"）
    fn prefix() -> &'static str;
}

/// ジェネリック ID 型
///
/// `T` は PhantomData で、実行時にはメモリを消費しません。
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

/// Error returned when a displayed ID cannot be parsed back.
#[derive(Debug, thiserror::Error)]
#[error("invalid identifier '{0}'")]
pub struct ParseIdError(String);

impl<T: IdMarker> FromStr for Id<T> {
    type Err = ParseIdError;

    /// Accepts both the prefixed display form and a bare ULID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix(T::prefix()).unwrap_or(s);
        Ulid::from_string(raw)
            .map(Self::from_ulid)
            .map_err(|_| ParseIdError(s.to_string()))
    }
}

// ========================================
// Marker types
// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactMarker {}

impl IdMarker for ArtifactMarker {
    fn prefix() -> &'static str {
        "art-"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RequestMarker {}

impl IdMarker for RequestMarker {
    fn prefix() -> &'static str {
        "req-"
    }
}

/// Identifier of a produced artifact (image, video or placeholder).
pub type ArtifactId = Id<ArtifactMarker>;

/// Identifier of one submission; used to correlate log lines.
pub type RequestId = Id<RequestMarker>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_display_with_prefix() {
        let ulid = Ulid::new();
        let artifact = ArtifactId::from_ulid(ulid);
        let request = RequestId::from_ulid(ulid);

        assert_eq!(artifact.as_ulid(), ulid);
        assert!(artifact.to_string().starts_with("art-"));
        assert!(request.to_string().starts_with("req-"));
    }

    #[test]
    fn ids_parse_from_display_and_bare_form() {
        let id = ArtifactId::from_ulid(Ulid::new());

        let displayed: ArtifactId = id.to_string().parse().unwrap();
        let bare: ArtifactId = id.as_ulid().to_string().parse().unwrap();

        assert_eq!(displayed, id);
        assert_eq!(bare, id);
        assert!("art-not-a-ulid".parse::<ArtifactId>().is_err());
    }

    #[test]
    fn ids_serialize_as_plain_ulid_string() {
        let id = ArtifactId::from_ulid(Ulid::new());

        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_ulid()));

        let back: ArtifactId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn phantom_data_does_not_consume_memory() {
        use std::mem::size_of;

        assert_eq!(size_of::<ArtifactId>(), size_of::<Ulid>());
        assert_eq!(size_of::<RequestId>(), 16);
    }
}
