//! OrchestratorBuilder - wiring and startup checks.
//!
//! # Fail-fast
//! - `expect_services()` で必須サービスを宣言
//! - `build()` で expected ⊆ registered、credential provider の有無、
//!   primary の登録を検証
//! - 足りなければリクエスト前に `BuildError`

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::history::{HistoryCapacity, HistoryStore};
use super::orchestrator::{RequestOrchestrator, StatusChannels};
use super::stamps::GenerationStamps;
use crate::adapters::{self, AdapterRegistry, GeminiDescriber, ProviderAdapter, http};
use crate::config::Settings;
use crate::domain::{GenerationError, MediaClass, RegistryError, ServiceId};
use crate::impls::{FileHistoryStorage, InMemoryHistoryStorage};
use crate::ports::{
    Clock, CredentialProvider, Describer, HistoryStorage, IdGenerator, Scheduler, SystemClock,
    TokioScheduler, UlidGenerator,
};

/// Service used when none is configured; the only one with a fallback.
pub const DEFAULT_PRIMARY: &str = "google-gemini";

/// Builds a `RequestOrchestrator`.
///
/// # Example
/// ```ignore
/// let orchestrator = OrchestratorBuilder::from_settings(&settings)?
///     .expect_services(&["google-gemini", "veo-3-fast"])
///     .build()
///     .await?;
/// ```
///
/// Unset ports default to `TokioScheduler`, `SystemClock`, a ULID generator
/// on that clock and in-memory history. Credentials have no default.
pub struct OrchestratorBuilder {
    registry: AdapterRegistry,
    expected_services: Option<Vec<String>>,
    credentials: Option<Arc<dyn CredentialProvider>>,
    history_storage: Option<Arc<dyn HistoryStorage>>,
    capacity: HistoryCapacity,
    scheduler: Option<Arc<dyn Scheduler>>,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn IdGenerator>>,
    describer: Option<Arc<dyn Describer>>,
    primary: ServiceId,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing services: {0:?}. These services were expected but not registered.")]
    MissingServices(Vec<String>),

    #[error("No credential provider configured.")]
    MissingCredentials,

    #[error("Primary service '{0}' is not registered.")]
    MissingPrimary(ServiceId),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("failed to set up adapters: {0}")]
    Adapter(GenerationError),
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            registry: AdapterRegistry::new(),
            expected_services: None,
            credentials: None,
            history_storage: None,
            capacity: HistoryCapacity::default(),
            scheduler: None,
            clock: None,
            ids: None,
            describer: None,
            primary: ServiceId::new(DEFAULT_PRIMARY),
        }
    }

    /// Builder with every built-in adapter, the Gemini describer, env
    /// credentials and file-backed history, all taken from `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self, BuildError> {
        Self::from_settings_with_clock(settings, Arc::new(SystemClock))
    }

    /// Same as `from_settings`; the adapters and the orchestrator share `clock`.
    pub fn from_settings_with_clock(
        settings: &Settings,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, BuildError> {
        let mut builder = Self::new();
        for adapter in
            adapters::standard_adapters(settings, clock.clone()).map_err(BuildError::Adapter)?
        {
            builder = builder.register(adapter)?;
        }

        let client = http::build_client(settings.http.timeout()).map_err(BuildError::Adapter)?;
        let describer = GeminiDescriber::new(
            client,
            &settings.providers.google_base_url,
            &settings.providers.gemini_text_model,
        );

        Ok(builder
            .clock(clock)
            .describer(Arc::new(describer))
            .credentials(Arc::new(settings.credentials.env_provider()))
            .history_storage(Arc::new(FileHistoryStorage::new(settings.history_dir())))
            .capacity(HistoryCapacity::new(
                settings.history.capacity(MediaClass::Image),
                settings.history.capacity(MediaClass::Video),
            ))
            .primary(settings.general.primary_service.as_str()))
    }

    /// Registers an adapter. A second adapter with the same id is rejected.
    pub fn register(mut self, adapter: Arc<dyn ProviderAdapter>) -> Result<Self, RegistryError> {
        self.registry.register(adapter)?;
        Ok(self)
    }

    /// Services that `build()` must find registered.
    pub fn expect_services(mut self, services: &[&str]) -> Self {
        self.expected_services = Some(services.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn credentials(mut self, credentials: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn history_storage(mut self, storage: Arc<dyn HistoryStorage>) -> Self {
        self.history_storage = Some(storage);
        self
    }

    pub fn capacity(mut self, capacity: HistoryCapacity) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn describer(mut self, describer: Arc<dyn Describer>) -> Self {
        self.describer = Some(describer);
        self
    }

    /// Service whose capability rejections trigger the placeholder fallback.
    pub fn primary(mut self, service: impl Into<ServiceId>) -> Self {
        self.primary = service.into();
        self
    }

    /// Checks the wiring and loads history.
    pub async fn build(self) -> Result<RequestOrchestrator, BuildError> {
        if let Some(expected) = &self.expected_services {
            let missing: Vec<String> = expected
                .iter()
                .filter(|id| !self.registry.contains(&ServiceId::new(id.as_str())))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(BuildError::MissingServices(missing));
            }
        }
        let credentials = self.credentials.ok_or(BuildError::MissingCredentials)?;
        if !self.registry.contains(&self.primary) {
            return Err(BuildError::MissingPrimary(self.primary));
        }

        let clock: Arc<dyn Clock> = match self.clock {
            Some(clock) => clock,
            None => Arc::new(SystemClock),
        };
        let ids: Arc<dyn IdGenerator> = match self.ids {
            Some(ids) => ids,
            None => Arc::new(UlidGenerator::new(clock.clone())),
        };
        let scheduler: Arc<dyn Scheduler> = match self.scheduler {
            Some(scheduler) => scheduler,
            None => Arc::new(TokioScheduler),
        };
        let storage: Arc<dyn HistoryStorage> = match self.history_storage {
            Some(storage) => storage,
            None => Arc::new(InMemoryHistoryStorage::new()),
        };
        let history = HistoryStore::open(storage, self.capacity).await;

        tracing::info!(
            services = ?self.registry.service_ids(),
            primary = %self.primary,
            describer = self.describer.is_some(),
            "orchestrator ready"
        );

        Ok(RequestOrchestrator {
            registry: self.registry,
            credentials,
            scheduler,
            clock,
            ids,
            describer: self.describer,
            primary: self.primary,
            history,
            stamps: GenerationStamps::new(),
            results: Mutex::new(HashMap::new()),
            status: StatusChannels::new(),
        })
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
