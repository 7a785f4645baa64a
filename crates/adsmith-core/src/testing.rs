//! Test doubles shared by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::adapters::ProviderAdapter;
use crate::domain::{
    Artifact, ArtifactId, Brief, ContentRef, GenerationError, GenerationRequest, MediaClass,
    PollConfig, ServiceId, SubmitOutcome, TaskHandle, TaskStatus,
};
use crate::ports::{Credential, CredentialFamily, Describer, Scheduler};

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap()
}

/// Returns immediately and records every requested delay.
#[derive(Debug, Default)]
pub struct RecordingScheduler {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delays(&self) -> Vec<Duration> {
        lock(&self.delays).clone()
    }
}

#[async_trait]
impl Scheduler for RecordingScheduler {
    async fn delay(&self, duration: Duration) {
        lock(&self.delays).push(duration);
        tokio::task::yield_now().await;
    }
}

/// Like `RecordingScheduler`, but a gated delay waits until released.
#[derive(Debug, Default)]
pub struct GatedScheduler {
    gate: Mutex<Option<Arc<Notify>>>,
    entered: Arc<Notify>,
    delays: Mutex<Vec<Duration>>,
}

impl GatedScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next delay wait until the returned handle is notified.
    pub fn gate_next_delay(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *lock(&self.gate) = Some(gate.clone());
        gate
    }

    /// Notified each time a delay starts.
    pub fn entered(&self) -> Arc<Notify> {
        self.entered.clone()
    }

    pub fn delays(&self) -> Vec<Duration> {
        lock(&self.delays).clone()
    }
}

#[async_trait]
impl Scheduler for GatedScheduler {
    async fn delay(&self, duration: Duration) {
        lock(&self.delays).push(duration);
        self.entered.notify_one();
        let gate = lock(&self.gate).take();
        match gate {
            Some(gate) => gate.notified().await,
            None => tokio::task::yield_now().await,
        }
    }
}

/// Adapter answering from a script.
///
/// Without scripted submit outcomes it answers `Immediate` with one URL per
/// requested artifact; without scripted statuses it reports `Processing`.
pub struct ScriptedAdapter {
    id: ServiceId,
    media: MediaClass,
    family: CredentialFamily,
    max_count: u32,
    requires_reference: bool,
    poll: Option<PollConfig>,
    submits: Mutex<VecDeque<Result<SubmitOutcome, GenerationError>>>,
    statuses: Mutex<VecDeque<Result<TaskStatus, GenerationError>>>,
    gate: Mutex<Option<Arc<Notify>>>,
    entered: Arc<Notify>,
    submissions: Mutex<Vec<GenerationRequest>>,
    credentials: Mutex<Vec<Credential>>,
    polls: AtomicU32,
}

impl ScriptedAdapter {
    pub fn new(id: &str, media: MediaClass) -> Self {
        Self {
            id: ServiceId::new(id),
            media,
            family: CredentialFamily::Google,
            max_count: 1,
            requires_reference: false,
            poll: None,
            submits: Mutex::new(VecDeque::new()),
            statuses: Mutex::new(VecDeque::new()),
            gate: Mutex::new(None),
            entered: Arc::new(Notify::new()),
            submissions: Mutex::new(Vec::new()),
            credentials: Mutex::new(Vec::new()),
            polls: AtomicU32::new(0),
        }
    }

    pub fn with_family(mut self, family: CredentialFamily) -> Self {
        self.family = family;
        self
    }

    pub fn with_max_count(mut self, max_count: u32) -> Self {
        self.max_count = max_count;
        self
    }

    pub fn requiring_reference(mut self) -> Self {
        self.requires_reference = true;
        self
    }

    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = Some(poll);
        self
    }

    pub fn push_submit(&self, outcome: Result<SubmitOutcome, GenerationError>) {
        lock(&self.submits).push_back(outcome);
    }

    pub fn push_status(&self, status: Result<TaskStatus, GenerationError>) {
        lock(&self.statuses).push_back(status);
    }

    /// Makes the next submit wait until the returned handle is notified.
    pub fn gate_next_submit(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *lock(&self.gate) = Some(gate.clone());
        gate
    }

    /// Notified each time a submit starts.
    pub fn entered(&self) -> Arc<Notify> {
        self.entered.clone()
    }

    pub fn submissions(&self) -> Vec<GenerationRequest> {
        lock(&self.submissions).clone()
    }

    pub fn credentials_seen(&self) -> Vec<Credential> {
        lock(&self.credentials).clone()
    }

    pub fn poll_count(&self) -> u32 {
        self.polls.load(Ordering::SeqCst)
    }

    /// Pending outcome for a fresh task.
    pub fn pending(&self, task_id: &str) -> SubmitOutcome {
        SubmitOutcome::Pending(
            TaskHandle {
                task_id: task_id.to_string(),
                service: self.id.clone(),
                created_at: chrono::Utc::now(),
            },
            self.poll.unwrap_or_default(),
        )
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedAdapter {
    fn id(&self) -> &ServiceId {
        &self.id
    }

    fn label(&self) -> &str {
        "Scripted"
    }

    fn media_class(&self) -> MediaClass {
        self.media
    }

    fn credential_family(&self) -> CredentialFamily {
        self.family
    }

    fn max_count(&self) -> u32 {
        self.max_count
    }

    fn requires_reference(&self) -> bool {
        self.requires_reference
    }

    fn poll_config(&self) -> Option<PollConfig> {
        self.poll
    }

    async fn submit(
        &self,
        request: &GenerationRequest,
        credential: &Credential,
    ) -> Result<SubmitOutcome, GenerationError> {
        lock(&self.submissions).push(request.clone());
        lock(&self.credentials).push(credential.clone());
        self.entered.notify_one();

        let gate = lock(&self.gate).take();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let scripted = lock(&self.submits).pop_front();
        scripted.unwrap_or_else(|| {
            Ok(SubmitOutcome::Immediate(
                (0..request.count())
                    .map(|i| ContentRef::url(format!("https://cdn.test/{}/{i}", self.id)))
                    .collect(),
            ))
        })
    }

    async fn poll_status(
        &self,
        _handle: &TaskHandle,
        _credential: &Credential,
    ) -> Result<TaskStatus, GenerationError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let scripted = lock(&self.statuses).pop_front();
        scripted.unwrap_or(Ok(TaskStatus::Processing(None)))
    }
}

/// Describer returning a fixed answer and recording prompts.
pub struct FakeDescriber {
    answer: Mutex<Option<Result<Option<String>, GenerationError>>>,
    prompts: Mutex<Vec<String>>,
}

impl FakeDescriber {
    pub fn answering(text: Option<&str>) -> Self {
        Self {
            answer: Mutex::new(Some(Ok(text.map(str::to_string)))),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: GenerationError) -> Self {
        Self {
            answer: Mutex::new(Some(Err(err))),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }
}

#[async_trait]
impl Describer for FakeDescriber {
    fn credential_family(&self) -> CredentialFamily {
        CredentialFamily::Google
    }

    async fn describe(
        &self,
        prompt: &str,
        _credential: &Credential,
    ) -> Result<Option<String>, GenerationError> {
        lock(&self.prompts).push(prompt.to_string());
        match lock(&self.answer).as_ref() {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(err)) => Err(GenerationError::Transport(err.to_string())),
            None => Ok(None),
        }
    }
}

/// A plain artifact whose title is `label`.
pub fn artifact(media: MediaClass, label: &str) -> Artifact {
    Artifact {
        id: ArtifactId::from_ulid(ulid::Ulid::new()),
        media_class: media,
        content: ContentRef::url(format!("https://cdn.test/{label}")),
        brief: Brief::new("google-gemini").with_headline(label),
        title: label.to_string(),
        description: String::new(),
        note: String::new(),
        degraded: false,
        task_id: None,
        created_at: chrono::Utc::now(),
    }
}
