//! Provider adapters.
//!
//! adapter は `GenerationRequest` を各プロバイダのワイヤ形式に変換し、
//! 応答を 即時結果 / 非同期タスク / 拒否 に分類します。
//!
//! # 実装
//! - **ImagenAdapter**: Google Imagen 4（同期、inline base64）
//! - **GptImageAdapter**: OpenAI GPT Image（同期、URL または base64）
//! - **FluxKontextAdapter**: kie.ai Flux Kontext（参照画像つき、ポーリング）
//! - **VeoAdapter**: kie.ai Veo 2 / 3（動画、ポーリング）
//!
//! adapter は `AdapterRegistry` から `ServiceId` で引きます。

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Settings;
use crate::domain::{
    GenerationError, GenerationRequest, MediaClass, PollConfig, ServiceId, SubmitOutcome,
    TaskHandle, TaskStatus,
};
use crate::ports::{Clock, Credential, CredentialFamily};

pub mod flux_kontext;
pub mod gemini_text;
pub mod gpt_image;
pub mod http;
pub mod imagen;
pub mod kie;
pub mod registry;
pub mod veo;

pub use self::flux_kontext::FluxKontextAdapter;
pub use self::gemini_text::GeminiDescriber;
pub use self::gpt_image::GptImageAdapter;
pub use self::imagen::ImagenAdapter;
pub use self::registry::AdapterRegistry;
pub use self::veo::{VeoAdapter, VeoModel};

/// ProviderAdapter は 1 つの生成プロバイダ
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn id(&self) -> &ServiceId;

    /// Human-readable provider name.
    fn label(&self) -> &str;

    fn media_class(&self) -> MediaClass;

    fn credential_family(&self) -> CredentialFamily;

    /// Upper bound on artifacts per submission.
    fn max_count(&self) -> u32 {
        1
    }

    /// Whether briefs must carry a reference image and a contextual prompt.
    fn requires_reference(&self) -> bool {
        false
    }

    /// Polling schedule for asynchronous providers.
    fn poll_config(&self) -> Option<PollConfig> {
        None
    }

    /// Note attached to artifacts produced by this adapter.
    fn note(&self) -> String {
        format!("Generated with {}", self.label())
    }

    /// Description attached to artifacts produced by this adapter.
    fn describe(&self, request: &GenerationRequest) -> String {
        format!("AI-generated advertisement: {}", request.prompt())
    }

    async fn submit(
        &self,
        request: &GenerationRequest,
        credential: &Credential,
    ) -> Result<SubmitOutcome, GenerationError>;

    /// Only called for handles this adapter returned from `submit`.
    async fn poll_status(
        &self,
        handle: &TaskHandle,
        _credential: &Credential,
    ) -> Result<TaskStatus, GenerationError> {
        Err(GenerationError::Configuration(format!(
            "service {} does not run background tasks (task {})",
            self.id(),
            handle.task_id
        )))
    }
}

/// Builds every built-in adapter from settings. Task handles are stamped
/// with `clock`.
pub fn standard_adapters(
    settings: &Settings,
    clock: Arc<dyn Clock>,
) -> Result<Vec<Arc<dyn ProviderAdapter>>, GenerationError> {
    let client = http::build_client(settings.http.timeout())?;
    let providers = &settings.providers;

    let mut adapters: Vec<Arc<dyn ProviderAdapter>> = vec![
        Arc::new(ImagenAdapter::new(
            client.clone(),
            &providers.google_base_url,
            &providers.imagen_model,
        )),
        Arc::new(GptImageAdapter::new(
            client.clone(),
            &providers.openai_base_url,
            &providers.openai_image_model,
        )),
        Arc::new(
            FluxKontextAdapter::new(client.clone(), &providers.kie_base_url, settings.polling.flux())
                .with_strength(providers.flux_strength)
                .with_clock(clock.clone()),
        ),
    ];
    for model in VeoModel::ALL {
        adapters.push(Arc::new(
            VeoAdapter::new(
                client.clone(),
                &providers.kie_base_url,
                model,
                settings.polling.veo(),
            )
            .with_watermark(providers.veo_watermark.clone())
            .with_clock(clock.clone()),
        ));
    }
    Ok(adapters)
}
