//! OpenAI images/generations adapter.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ProviderAdapter, http};
use crate::domain::{
    AspectRatio, ContentRef, GenerationError, GenerationRequest, MediaClass, Rejection,
    ServiceId, SubmitOutcome,
};
use crate::ports::{Credential, CredentialFamily};

pub const SERVICE_ID: &str = "openai-gpt-image";

#[derive(Debug, Serialize)]
struct ImagesRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'static str,
    quality: &'static str,
    output_format: &'static str,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
    b64_json: Option<String>,
}

fn size_for(aspect: AspectRatio) -> &'static str {
    match aspect {
        AspectRatio::Landscape => "1792x1024",
        AspectRatio::Portrait => "1024x1792",
        AspectRatio::Square => "1024x1024",
    }
}

pub struct GptImageAdapter {
    id: ServiceId,
    client: Client,
    base_url: String,
    model: String,
}

impl GptImageAdapter {
    pub fn new(client: Client, base_url: &str, model: &str) -> Self {
        Self {
            id: ServiceId::new(SERVICE_ID),
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl ProviderAdapter for GptImageAdapter {
    fn id(&self) -> &ServiceId {
        &self.id
    }

    fn label(&self) -> &str {
        "OpenAI GPT Image"
    }

    fn media_class(&self) -> MediaClass {
        MediaClass::Image
    }

    fn credential_family(&self) -> CredentialFamily {
        CredentialFamily::OpenAi
    }

    fn describe(&self, request: &GenerationRequest) -> String {
        format!(
            "AI-generated advertisement using GPT Image: {}",
            request.prompt()
        )
    }

    async fn submit(
        &self,
        request: &GenerationRequest,
        credential: &Credential,
    ) -> Result<SubmitOutcome, GenerationError> {
        let url = format!("{}/images/generations", self.base_url);
        let body = ImagesRequest {
            model: &self.model,
            prompt: request.prompt(),
            n: request.count().min(self.max_count()),
            size: size_for(request.brief().aspect_ratio()),
            quality: "auto",
            output_format: "jpeg",
        };
        tracing::debug!(service = %self.id, %url, size = body.size, "openai image generation");

        let response = self
            .client
            .post(&url)
            .bearer_auth(credential.expose())
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Ok(SubmitOutcome::Rejected(http::rejection(response).await));
        }

        let body: ImagesResponse = http::decode(&self.id, response).await?;
        let content: Vec<ContentRef> = body
            .data
            .into_iter()
            .filter_map(|d| match (d.url, d.b64_json) {
                (Some(url), _) => Some(ContentRef::Url(url)),
                (None, Some(data)) => Some(ContentRef::inline("image/jpeg", data)),
                (None, None) => None,
            })
            .collect();

        if content.is_empty() {
            return Ok(SubmitOutcome::Rejected(Rejection::classify(
                None,
                "no images were returned",
            )));
        }
        Ok(SubmitOutcome::Immediate(content))
    }
}
