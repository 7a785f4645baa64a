//! RequestOrchestrator - the entry point for generating creatives.
//!
//! # Flow
//! brief -> validate -> adapter.submit ->
//! { Immediate | Pending -> TaskPoller | Rejected -> fallback } ->
//! commit (results + history) -> `Generation`
//!
//! # 古い結果
//! `generate` は `GenerationStamps` からスタンプを取得します。
//! ステータス更新とコミットは、そのスタンプが media class の最新である間だけ。
//! 最新でなければ結果を捨てて `Generation::Superseded` を返します。
//! `regenerate` は現在のスタンプを使うので、後続の `generate` で同様に破棄されます。

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, watch};

use super::fallback;
use super::history::HistoryStore;
use super::poller::{PollOutcome, TaskPoller};
use super::stamps::GenerationStamps;
use crate::adapters::{AdapterRegistry, ProviderAdapter};
use crate::domain::{
    Artifact, ArtifactId, Brief, ContentRef, Generation, GenerationError, GenerationRequest,
    HistoryEntry, MediaClass, RejectionKind, ServiceId, SubmitOutcome, TaskHandle,
};
use crate::ports::{Clock, Credential, CredentialProvider, Describer, IdGenerator, Scheduler};
use crate::prompt;

/// Latest state of the generation running for one media class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationStatus {
    Idle,
    Submitting {
        service: ServiceId,
    },
    Polling {
        task_id: String,
        attempt: u32,
        max_attempts: u32,
    },
    Completed {
        count: usize,
    },
    StillProcessing {
        task_id: String,
    },
    Failed {
        message: String,
    },
}

/// One watch channel per media class.
pub(super) struct StatusChannels {
    image: watch::Sender<GenerationStatus>,
    video: watch::Sender<GenerationStatus>,
}

impl StatusChannels {
    pub(super) fn new() -> Self {
        Self {
            image: watch::Sender::new(GenerationStatus::Idle),
            video: watch::Sender::new(GenerationStatus::Idle),
        }
    }

    fn get(&self, media: MediaClass) -> &watch::Sender<GenerationStatus> {
        match media {
            MediaClass::Image => &self.image,
            MediaClass::Video => &self.video,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// A fresh `generate` replaces the current result set.
    Replace,
    /// `regenerate` puts its result in front of the current set.
    Prepend,
}

/// Result of running a request, before the stamp check.
enum Executed {
    Artifacts(Vec<Artifact>),
    TimedOut(TaskHandle),
}

struct ArtifactMeta {
    description: String,
    note: String,
    degraded: bool,
    task_id: Option<String>,
}

/// Built by `OrchestratorBuilder`.
pub struct RequestOrchestrator {
    pub(super) registry: AdapterRegistry,
    pub(super) credentials: Arc<dyn CredentialProvider>,
    pub(super) scheduler: Arc<dyn Scheduler>,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) ids: Arc<dyn IdGenerator>,
    pub(super) describer: Option<Arc<dyn Describer>>,
    pub(super) primary: ServiceId,
    pub(super) history: HistoryStore,
    pub(super) stamps: GenerationStamps,
    pub(super) results: Mutex<HashMap<MediaClass, Vec<Artifact>>>,
    pub(super) status: StatusChannels,
}

impl RequestOrchestrator {
    /// Generates artifacts for `brief` with the service it names.
    pub async fn generate(&self, brief: Brief) -> Result<Generation, GenerationError> {
        let adapter = self.adapter(&brief.service)?;
        validate(adapter.as_ref(), &brief)?;
        let credential = self.credential(adapter.as_ref())?;

        let stamp = self.stamps.advance(adapter.media_class());
        let requested = brief.count;
        self.run(adapter, credential, brief, requested, stamp, Mode::Replace)
            .await
    }

    /// Generates one more artifact from the brief snapshot of `artifact`.
    ///
    /// The snapshot's service and credential are used, regardless of which
    /// service later requests picked.
    pub async fn regenerate(&self, artifact: &Artifact) -> Result<Generation, GenerationError> {
        let brief = artifact.brief.clone();
        let adapter = self.adapter(&brief.service)?;
        validate(adapter.as_ref(), &brief)?;
        let credential = self.credential(adapter.as_ref())?;

        let stamp = self.stamps.current(adapter.media_class());
        tracing::info!(
            service = %brief.service,
            source = %artifact.id,
            "regenerating artifact"
        );
        self.run(adapter, credential, brief, 1, stamp, Mode::Prepend)
            .await
    }

    /// Watch stream of status updates for one media class.
    pub fn subscribe(&self, media: MediaClass) -> watch::Receiver<GenerationStatus> {
        self.status.get(media).subscribe()
    }

    /// Artifacts of the latest generation (plus regenerations) for `media`.
    pub async fn current_results(&self, media: MediaClass) -> Vec<Artifact> {
        self.results
            .lock()
            .await
            .get(&media)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn history(&self, media: MediaClass) -> Vec<HistoryEntry> {
        self.history.entries(media).await
    }

    pub async fn clear_history(&self, media: MediaClass) {
        self.history.clear(media).await;
    }

    /// Finds an artifact in the current results or in history.
    pub async fn find_artifact(&self, id: ArtifactId) -> Option<Artifact> {
        let current = {
            let results = self.results.lock().await;
            results
                .values()
                .flatten()
                .find(|artifact| artifact.id == id)
                .cloned()
        };
        match current {
            Some(artifact) => Some(artifact),
            None => self.history.find(id).await,
        }
    }

    /// Registered service ids, sorted.
    pub fn services(&self) -> Vec<ServiceId> {
        self.registry.service_ids()
    }

    pub fn primary(&self) -> &ServiceId {
        &self.primary
    }

    /// Media class produced by `service`, if it is registered.
    pub fn media_class(&self, service: &ServiceId) -> Option<MediaClass> {
        self.registry.get(service).map(|adapter| adapter.media_class())
    }

    fn adapter(&self, service: &ServiceId) -> Result<Arc<dyn ProviderAdapter>, GenerationError> {
        self.registry
            .get(service)
            .ok_or_else(|| GenerationError::Configuration(format!("unknown service '{service}'")))
    }

    fn credential(&self, adapter: &dyn ProviderAdapter) -> Result<Credential, GenerationError> {
        let family = adapter.credential_family();
        self.credentials.resolve(family).ok_or_else(|| {
            GenerationError::Configuration(format!("no credential configured for {family}"))
        })
    }

    async fn run(
        &self,
        adapter: Arc<dyn ProviderAdapter>,
        credential: Credential,
        brief: Brief,
        requested: u32,
        stamp: u64,
        mode: Mode,
    ) -> Result<Generation, GenerationError> {
        let media = adapter.media_class();
        match self.execute(&adapter, &credential, brief, requested, stamp).await {
            Ok(Executed::Artifacts(artifacts)) => Ok(self.commit(media, stamp, artifacts, mode).await),
            Ok(Executed::TimedOut(handle)) => {
                if !self.stamps.is_current(media, stamp) {
                    return Ok(Generation::Superseded);
                }
                tracing::warn!(
                    service = %handle.service,
                    task_id = %handle.task_id,
                    "task still processing after max attempts"
                );
                self.publish(
                    media,
                    stamp,
                    GenerationStatus::StillProcessing {
                        task_id: handle.task_id.clone(),
                    },
                );
                Ok(Generation::StillProcessing(handle))
            }
            Err(e) => {
                if !self.stamps.is_current(media, stamp) {
                    tracing::debug!(%media, error = %e, "dropping error of superseded request");
                    return Ok(Generation::Superseded);
                }
                tracing::warn!(service = %adapter.id(), %media, error = %e, "generation failed");
                self.publish(
                    media,
                    stamp,
                    GenerationStatus::Failed {
                        message: e.to_string(),
                    },
                );
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        adapter: &Arc<dyn ProviderAdapter>,
        credential: &Credential,
        brief: Brief,
        requested: u32,
        stamp: u64,
    ) -> Result<Executed, GenerationError> {
        let media = adapter.media_class();
        let count = requested.clamp(1, adapter.max_count().max(1));
        let prompt = prompt::compose_for(media, &brief);
        let request = GenerationRequest::new(self.ids.request_id(), brief, media, count, prompt);

        tracing::info!(
            service = %adapter.id(),
            %media,
            request_id = %request.id(),
            count,
            "submitting generation request"
        );
        tracing::debug!(request_id = %request.id(), prompt = request.prompt(), "composed prompt");
        self.publish(
            media,
            stamp,
            GenerationStatus::Submitting {
                service: adapter.id().clone(),
            },
        );

        match adapter.submit(&request, credential).await? {
            SubmitOutcome::Immediate(contents) => {
                tracing::info!(service = %adapter.id(), count = contents.len(), "provider returned content");
                let meta = ArtifactMeta {
                    description: adapter.describe(&request),
                    note: adapter.note(),
                    degraded: false,
                    task_id: None,
                };
                Ok(Executed::Artifacts(self.artifacts(&request, contents, meta)))
            }
            SubmitOutcome::Pending(handle, config) => {
                tracing::info!(
                    service = %adapter.id(),
                    task_id = %handle.task_id,
                    max_attempts = config.max_attempts,
                    "task accepted, polling"
                );
                self.publish(
                    media,
                    stamp,
                    GenerationStatus::Polling {
                        task_id: handle.task_id.clone(),
                        attempt: 0,
                        max_attempts: config.max_attempts,
                    },
                );

                let task_id = handle.task_id.clone();
                let poller = TaskPoller::new(
                    adapter.clone(),
                    credential.clone(),
                    handle,
                    config,
                    self.scheduler.clone(),
                );
                let outcome = poller
                    .run(|progress| {
                        self.publish(
                            media,
                            stamp,
                            GenerationStatus::Polling {
                                task_id: progress.task_id,
                                attempt: progress.attempt,
                                max_attempts: progress.max_attempts,
                            },
                        )
                    })
                    .await;

                match outcome {
                    PollOutcome::Completed(contents) => {
                        tracing::info!(service = %adapter.id(), %task_id, "task completed");
                        let meta = ArtifactMeta {
                            description: adapter.describe(&request),
                            note: adapter.note(),
                            degraded: false,
                            task_id: Some(task_id),
                        };
                        Ok(Executed::Artifacts(self.artifacts(&request, contents, meta)))
                    }
                    PollOutcome::Failed(reason) => Err(GenerationError::Provider {
                        service: adapter.id().clone(),
                        status: None,
                        message: reason,
                    }),
                    PollOutcome::TimedOut(handle) => Ok(Executed::TimedOut(handle)),
                }
            }
            SubmitOutcome::Rejected(rejection) => {
                let eligible = rejection.kind == RejectionKind::CapabilityUnavailable
                    && adapter.id() == &self.primary;
                if !eligible {
                    return Err(rejection.into_error(adapter.id()));
                }

                tracing::warn!(
                    service = %adapter.id(),
                    reason = %rejection.message,
                    "primary service unavailable, using placeholders"
                );
                let degraded =
                    fallback::degrade(self.describer.as_ref(), self.credentials.as_ref(), &request)
                        .await?;
                let meta = ArtifactMeta {
                    description: degraded.description,
                    note: fallback::DEGRADED_NOTE.to_string(),
                    degraded: true,
                    task_id: None,
                };
                Ok(Executed::Artifacts(self.artifacts(&request, degraded.contents, meta)))
            }
        }
    }

    fn artifacts(
        &self,
        request: &GenerationRequest,
        contents: Vec<ContentRef>,
        meta: ArtifactMeta,
    ) -> Vec<Artifact> {
        let media = request.media_class();
        let title = request.brief().title(media);
        let created_at = self.clock.now();
        contents
            .into_iter()
            .map(|content| Artifact {
                id: self.ids.artifact_id(),
                media_class: media,
                content,
                brief: request.brief().clone(),
                title: title.clone(),
                description: meta.description.clone(),
                note: meta.note.clone(),
                degraded: meta.degraded,
                task_id: meta.task_id.clone(),
                created_at,
            })
            .collect()
    }

    async fn commit(
        &self,
        media: MediaClass,
        stamp: u64,
        artifacts: Vec<Artifact>,
        mode: Mode,
    ) -> Generation {
        // Held through the history append so both stay in the same order.
        let mut results = self.results.lock().await;
        if !self.stamps.is_current(media, stamp) {
            tracing::debug!(%media, stamp, "dropping superseded result");
            return Generation::Superseded;
        }

        let slot = results.entry(media).or_default();
        match mode {
            Mode::Replace => *slot = artifacts.clone(),
            Mode::Prepend => {
                slot.splice(0..0, artifacts.iter().cloned());
            }
        }
        self.history.append(media, &artifacts).await;
        drop(results);

        tracing::info!(%media, count = artifacts.len(), "generation completed");
        self.publish(
            media,
            stamp,
            GenerationStatus::Completed {
                count: artifacts.len(),
            },
        );
        Generation::Completed(artifacts)
    }

    fn publish(&self, media: MediaClass, stamp: u64, status: GenerationStatus) {
        if self.stamps.is_current(media, stamp) {
            self.status.get(media).send_replace(status);
        }
    }
}

/// Checks the brief before any network call.
fn validate(adapter: &dyn ProviderAdapter, brief: &Brief) -> Result<(), GenerationError> {
    if adapter.requires_reference() {
        let has_bytes = brief.reference.as_ref().is_some_and(|r| r.has_bytes());
        if !has_bytes {
            return Err(GenerationError::Validation(format!(
                "{} needs a reference image",
                adapter.label()
            )));
        }
        if brief.context().is_none() {
            return Err(GenerationError::Validation(format!(
                "{} needs a contextual prompt for the reference image",
                adapter.label()
            )));
        }
        return Ok(());
    }

    if brief.description.trim().is_empty() && brief.headline.trim().is_empty() {
        return Err(GenerationError::Validation(
            "a description or a headline is required".to_string(),
        ));
    }
    Ok(())
}
