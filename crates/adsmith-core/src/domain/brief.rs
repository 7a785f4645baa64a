//! Creative brief - ユーザーが依頼した広告の内容
//!
//! フォーム入力をそのまま保持します。送信後は変更しません。

use serde::{Deserialize, Serialize};
use std::fmt;

/// スタイル未指定時のタグ
pub const DEFAULT_STYLE: &str = "modern-marketing";

/// Default size selector (square).
pub const DEFAULT_SIZE: &str = "1024x1024";

/// 生成物の種類。履歴はこの単位で分かれる
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaClass {
    Image,
    Video,
}

impl MediaClass {
    pub const ALL: [MediaClass; 2] = [MediaClass::Image, MediaClass::Video];

    /// HistoryStorage の namespace
    pub fn history_namespace(self) -> &'static str {
        match self {
            MediaClass::Image => "generated_images",
            MediaClass::Video => "generated_videos",
        }
    }
}

impl fmt::Display for MediaClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaClass::Image => f.write_str("image"),
            MediaClass::Video => f.write_str("video"),
        }
    }
}

/// AdapterRegistry のキー（例: `google-gemini`）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(String);

impl ServiceId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ServiceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Aspect ratios understood by the providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectRatio {
    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "1:1" => Some(AspectRatio::Square),
            "16:9" => Some(AspectRatio::Landscape),
            "9:16" => Some(AspectRatio::Portrait),
            _ => None,
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw size selector as picked in the form (`1024x1024`, `1792x1024`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SizeSelector(String);

impl SizeSelector {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// プロバイダに渡すアスペクト比に変換
    ///
    /// 認識するのは `1792x1024` と `1024x1792` だけ。それ以外は 1:1 として扱う。
    pub fn aspect_ratio(&self) -> AspectRatio {
        if self.0.contains("1792x1024") {
            AspectRatio::Landscape
        } else if self.0.contains("1024x1792") {
            AspectRatio::Portrait
        } else {
            if self.0 != DEFAULT_SIZE {
                tracing::debug!(size = %self.0, "unrecognised size selector, using 1:1");
            }
            AspectRatio::Square
        }
    }

    /// Pixel dimensions parsed from `WxH`, defaulting to 1024x1024.
    pub fn dimensions(&self) -> (u32, u32) {
        let parsed = self.0.split_once('x').and_then(|(w, h)| {
            let w = w.trim().parse::<u32>().ok()?;
            let h = h.trim().parse::<u32>().ok()?;
            (w > 0 && h > 0).then_some((w, h))
        });
        parsed.unwrap_or((1024, 1024))
    }
}

impl Default for SizeSelector {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE)
    }
}

/// A validated reference image plus the instruction for using it.
///
/// The bytes come from the asset-capture collaborator and are trusted as
/// `image/*` and at most 10MB. They are not persisted with history snapshots.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceAsset {
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub mime: String,
    pub file_name: String,
    /// Contextual prompt: how the reference should be incorporated.
    pub context: String,
}

impl ReferenceAsset {
    pub fn new(
        bytes: Vec<u8>,
        mime: impl Into<String>,
        file_name: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            bytes,
            mime: mime.into(),
            file_name: file_name.into(),
            context: context.into(),
        }
    }

    pub fn has_bytes(&self) -> bool {
        !self.bytes.is_empty()
    }
}

impl fmt::Debug for ReferenceAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceAsset")
            .field("bytes", &self.bytes.len())
            .field("mime", &self.mime)
            .field("file_name", &self.file_name)
            .field("context", &self.context)
            .finish()
    }
}

/// A creative brief. Immutable once handed to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Brief {
    pub headline: String,
    pub secondary_text: String,
    pub cta: String,
    pub description: String,
    pub style: String,
    pub size: SizeSelector,
    /// Explicit aspect ratio (video forms pick it directly).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect: Option<AspectRatio>,
    pub service: ServiceId,
    /// Requested artifact count before the adapter cap is applied.
    pub count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<ReferenceAsset>,
}

impl Default for Brief {
    fn default() -> Self {
        Self {
            headline: String::new(),
            secondary_text: String::new(),
            cta: String::new(),
            description: String::new(),
            style: DEFAULT_STYLE.to_string(),
            size: SizeSelector::default(),
            aspect: None,
            service: ServiceId::new(""),
            count: 1,
            reference: None,
        }
    }
}

impl Brief {
    pub fn new(service: impl Into<ServiceId>) -> Self {
        Self {
            service: service.into(),
            ..Self::default()
        }
    }

    pub fn with_headline(mut self, headline: impl Into<String>) -> Self {
        self.headline = headline.into();
        self
    }

    pub fn with_secondary_text(mut self, text: impl Into<String>) -> Self {
        self.secondary_text = text.into();
        self
    }

    pub fn with_cta(mut self, cta: impl Into<String>) -> Self {
        self.cta = cta.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = SizeSelector::new(size);
        self
    }

    pub fn with_aspect(mut self, aspect: AspectRatio) -> Self {
        self.aspect = Some(aspect);
        self
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn with_reference(mut self, reference: ReferenceAsset) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Explicit aspect if present, otherwise derived from the size selector.
    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect.unwrap_or_else(|| self.size.aspect_ratio())
    }

    /// Contextual prompt of the reference asset, if any.
    pub fn context(&self) -> Option<&str> {
        self.reference
            .as_ref()
            .map(|r| r.context.trim())
            .filter(|c| !c.is_empty())
    }

    /// Short human-readable title used in listings.
    pub fn title(&self, media: MediaClass) -> String {
        let headline = self.headline.trim();
        if let Some(context) = self.context() {
            let lead = if headline.is_empty() { "Contextual Ad" } else { headline };
            return format!("{lead} - {context}");
        }

        let (default_lead, default_tail) = match media {
            MediaClass::Image => ("Ad", "Generated advertisement"),
            MediaClass::Video => ("Video Ad", "Generated video advertisement"),
        };
        let lead = if headline.is_empty() { default_lead } else { headline };
        let description = self.description.trim();
        let tail = if description.is_empty() { default_tail } else { description };
        format!("{lead} - {tail}")
    }
}
