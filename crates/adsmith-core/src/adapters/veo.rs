//! kie.ai Veo video generation (async task).
//!
//! submit でタスク ID を受け取り、`record-info` を polling して動画 URL を得ます。

use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde::Serialize;

use super::kie::{self, KieSubmit};
use super::ProviderAdapter;
use crate::domain::{
    AspectRatio, ContentRef, GenerationError, GenerationRequest, MediaClass, PollConfig,
    ServiceId, SubmitOutcome, TaskHandle, TaskStatus,
};
use crate::ports::{Clock, Credential, CredentialFamily, SystemClock};

const URL_KEY: &str = "videoUrl";

/// Veo variants offered by kie.ai, one service id each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VeoModel {
    Veo2,
    Veo3Fast,
    Veo3Quality,
}

impl VeoModel {
    pub const ALL: [VeoModel; 3] = [VeoModel::Veo3Quality, VeoModel::Veo3Fast, VeoModel::Veo2];

    pub fn service_id(self) -> &'static str {
        match self {
            VeoModel::Veo2 => "veo-2",
            VeoModel::Veo3Fast => "veo-3-fast",
            VeoModel::Veo3Quality => "veo-3-quality",
        }
    }

    /// Model name on the wire.
    pub fn wire_name(self) -> &'static str {
        match self {
            VeoModel::Veo2 => "veo2",
            VeoModel::Veo3Fast => "veo3_fast",
            VeoModel::Veo3Quality => "veo3",
        }
    }

    fn label(self) -> &'static str {
        match self {
            VeoModel::Veo2 => "kie.ai VEO 2",
            VeoModel::Veo3Fast => "kie.ai VEO 3-FAST",
            VeoModel::Veo3Quality => "kie.ai VEO 3-QUALITY",
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    prompt: &'a str,
    model: &'static str,
    aspect_ratio: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    watermark: Option<&'a str>,
    enable_fallback: bool,
    seeds: u32,
}

pub struct VeoAdapter {
    id: ServiceId,
    model: VeoModel,
    client: Client,
    base_url: String,
    poll: PollConfig,
    watermark: Option<String>,
    clock: Arc<dyn Clock>,
}

impl VeoAdapter {
    pub fn new(client: Client, base_url: &str, model: VeoModel, poll: PollConfig) -> Self {
        Self {
            id: ServiceId::new(model.service_id()),
            model,
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            poll,
            watermark: None,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_watermark(mut self, watermark: Option<String>) -> Self {
        self.watermark = watermark.filter(|w| !w.trim().is_empty());
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

/// Veo renders landscape or portrait only.
fn video_aspect(aspect: AspectRatio) -> AspectRatio {
    match aspect {
        AspectRatio::Portrait => AspectRatio::Portrait,
        AspectRatio::Landscape | AspectRatio::Square => AspectRatio::Landscape,
    }
}

#[async_trait]
impl ProviderAdapter for VeoAdapter {
    fn id(&self) -> &ServiceId {
        &self.id
    }

    fn label(&self) -> &str {
        self.model.label()
    }

    fn media_class(&self) -> MediaClass {
        MediaClass::Video
    }

    fn credential_family(&self) -> CredentialFamily {
        CredentialFamily::Kie
    }

    fn poll_config(&self) -> Option<PollConfig> {
        Some(self.poll)
    }

    fn describe(&self, request: &GenerationRequest) -> String {
        format!(
            "AI-generated video advertisement using {}: {}",
            self.model.wire_name(),
            request.prompt()
        )
    }

    async fn submit(
        &self,
        request: &GenerationRequest,
        credential: &Credential,
    ) -> Result<SubmitOutcome, GenerationError> {
        let url = format!("{}/veo/generate", self.base_url);
        let aspect = match request.brief().aspect {
            Some(aspect) => video_aspect(aspect),
            None => AspectRatio::Landscape,
        };
        let body = GenerateRequest {
            prompt: request.prompt(),
            model: self.model.wire_name(),
            aspect_ratio: aspect.as_str(),
            watermark: self.watermark.as_deref(),
            enable_fallback: true,
            seeds: rand::thread_rng().gen_range(10_000..=99_999),
        };
        tracing::debug!(service = %self.id, %url, model = body.model, seed = body.seeds, "veo submit");

        let response = self
            .client
            .post(&url)
            .bearer_auth(credential.expose())
            .json(&body)
            .send()
            .await?;

        Ok(match kie::read_submit(&self.id, response, URL_KEY).await? {
            KieSubmit::Task(task_id) => SubmitOutcome::Pending(
                TaskHandle {
                    task_id,
                    service: self.id.clone(),
                    created_at: self.clock.now(),
                },
                self.poll,
            ),
            KieSubmit::Url(url) => SubmitOutcome::Immediate(vec![ContentRef::Url(url)]),
            KieSubmit::Rejected(rejection) => SubmitOutcome::Rejected(rejection),
        })
    }

    async fn poll_status(
        &self,
        handle: &TaskHandle,
        credential: &Credential,
    ) -> Result<TaskStatus, GenerationError> {
        let url = format!("{}/veo/record-info", self.base_url);
        kie::fetch_status(&self.client, &url, &handle.task_id, credential, URL_KEY).await
    }
}
