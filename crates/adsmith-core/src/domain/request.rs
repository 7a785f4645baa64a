//! GenerationRequest: one submission, built once and never mutated.

use super::brief::{Brief, MediaClass, ServiceId};
use super::ids::RequestId;

/// GenerationRequest は brief + 実効 count + 合成済み prompt
///
/// フィールドは非公開。orchestrator が組み立てた後は変更できない。
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    id: RequestId,
    brief: Brief,
    media_class: MediaClass,
    count: u32,
    prompt: String,
}

impl GenerationRequest {
    pub fn new(
        id: RequestId,
        brief: Brief,
        media_class: MediaClass,
        count: u32,
        prompt: String,
    ) -> Self {
        Self {
            id,
            brief,
            media_class,
            count,
            prompt,
        }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn brief(&self) -> &Brief {
        &self.brief
    }

    pub fn service(&self) -> &ServiceId {
        &self.brief.service
    }

    pub fn media_class(&self) -> MediaClass {
        self.media_class
    }

    /// Requested count clamped to `[1, adapter max]`.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Composed prompt (PromptTemplate output).
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Prompt sent to reference-conditioned providers: the contextual
    /// instruction followed by the composed prompt.
    pub fn contextual_prompt(&self) -> String {
        match self.brief.context() {
            Some(context) => format!("{context}. {}", self.prompt),
            None => self.prompt.clone(),
        }
    }
}
