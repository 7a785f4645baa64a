//! kie.ai Flux Kontext: reference-conditioned image generation (async task).

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};

use super::kie::{self, KieSubmit};
use super::ProviderAdapter;
use crate::domain::{
    ContentRef, GenerationError, GenerationRequest, MediaClass, PollConfig, ServiceId,
    SubmitOutcome, TaskHandle, TaskStatus,
};
use crate::ports::{Clock, Credential, CredentialFamily, SystemClock};

pub const SERVICE_ID: &str = "flux-kontext";
const MODEL: &str = "flux1-kontext";
const URL_KEY: &str = "imageUrl";

pub struct FluxKontextAdapter {
    id: ServiceId,
    client: Client,
    base_url: String,
    poll: PollConfig,
    strength: f32,
    clock: Arc<dyn Clock>,
}

impl FluxKontextAdapter {
    pub fn new(client: Client, base_url: &str, poll: PollConfig) -> Self {
        Self {
            id: ServiceId::new(SERVICE_ID),
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            poll,
            strength: 0.6,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn form(&self, request: &GenerationRequest) -> Result<Form, GenerationError> {
        let reference = request
            .brief()
            .reference
            .as_ref()
            .filter(|r| r.has_bytes())
            .ok_or_else(|| GenerationError::Validation("a reference image is required".into()))?;

        let file_name = if reference.file_name.is_empty() {
            "reference".to_string()
        } else {
            reference.file_name.clone()
        };
        let image = Part::bytes(reference.bytes.clone())
            .file_name(file_name)
            .mime_str(&reference.mime)
            .map_err(|e| GenerationError::Validation(format!("invalid reference mime: {e}")))?;

        Ok(Form::new()
            .part("image", image)
            .text("prompt", request.contextual_prompt())
            .text("model", MODEL)
            .text("aspectRatio", request.brief().aspect_ratio().as_str())
            .text("strength", self.strength.to_string())
            .text("enableFallback", "true"))
    }
}

#[async_trait]
impl ProviderAdapter for FluxKontextAdapter {
    fn id(&self) -> &ServiceId {
        &self.id
    }

    fn label(&self) -> &str {
        "kie.ai Flux Kontext"
    }

    fn media_class(&self) -> MediaClass {
        MediaClass::Image
    }

    fn credential_family(&self) -> CredentialFamily {
        CredentialFamily::Kie
    }

    fn requires_reference(&self) -> bool {
        true
    }

    fn poll_config(&self) -> Option<PollConfig> {
        Some(self.poll)
    }

    fn note(&self) -> String {
        "Generated with kie.ai Flux Kontext (Contextual)".to_string()
    }

    fn describe(&self, request: &GenerationRequest) -> String {
        format!(
            "AI-generated advertisement using Flux Kontext: {}",
            request.brief().context().unwrap_or_default()
        )
    }

    async fn submit(
        &self,
        request: &GenerationRequest,
        credential: &Credential,
    ) -> Result<SubmitOutcome, GenerationError> {
        let url = format!("{}/flux/kontext/generate", self.base_url);
        let form = self.form(request)?;
        tracing::debug!(service = %self.id, %url, "flux kontext submit");

        let response = self
            .client
            .post(&url)
            .bearer_auth(credential.expose())
            .multipart(form)
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
        let url = format!("{}/flux/kontext/record-info", self.base_url);
        kie::fetch_status(&self.client, &url, &handle.task_id, credential, URL_KEY).await
    }
}
