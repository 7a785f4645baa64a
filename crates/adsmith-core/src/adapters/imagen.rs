//! Google Imagen `:predict` adapter (synchronous, inline PNG results).
//!
//! 403 と権限エラーは `CapabilityUnavailable` として返します。

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ProviderAdapter, http};
use crate::domain::{
    ContentRef, GenerationError, GenerationRequest, MediaClass, Rejection, ServiceId,
    SubmitOutcome,
};
use crate::ports::{Credential, CredentialFamily};

pub const SERVICE_ID: &str = "google-gemini";
const MAX_COUNT: u32 = 4;

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    instances: [Instance<'a>; 1],
    parameters: Parameters,
}

#[derive(Debug, Serialize)]
struct Instance<'a> {
    prompt: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Parameters {
    sample_count: u32,
    aspect_ratio: &'static str,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
}

pub struct ImagenAdapter {
    id: ServiceId,
    client: Client,
    base_url: String,
    model: String,
}

impl ImagenAdapter {
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
impl ProviderAdapter for ImagenAdapter {
    fn id(&self) -> &ServiceId {
        &self.id
    }

    fn label(&self) -> &str {
        "Google Imagen 4"
    }

    fn media_class(&self) -> MediaClass {
        MediaClass::Image
    }

    fn credential_family(&self) -> CredentialFamily {
        CredentialFamily::Google
    }

    fn max_count(&self) -> u32 {
        MAX_COUNT
    }

    async fn submit(
        &self,
        request: &GenerationRequest,
        credential: &Credential,
    ) -> Result<SubmitOutcome, GenerationError> {
        let url = format!("{}/models/{}:predict", self.base_url, self.model);
        let body = PredictRequest {
            instances: [Instance {
                prompt: request.prompt(),
            }],
            parameters: Parameters {
                sample_count: request.count(),
                aspect_ratio: request.brief().aspect_ratio().as_str(),
            },
        };
        tracing::debug!(service = %self.id, %url, count = request.count(), "imagen predict");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", credential.expose())
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Ok(SubmitOutcome::Rejected(http::rejection(response).await));
        }

        let body: PredictResponse = http::decode(&self.id, response).await?;
        let content: Vec<ContentRef> = body
            .predictions
            .into_iter()
            .filter_map(|p| {
                let data = p.bytes_base64_encoded?;
                let mime = p.mime_type.unwrap_or_else(|| "image/png".to_string());
                Some(ContentRef::inline(mime, data))
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
