//! TaskPoller - drives one background task to a terminal state.
//!
//! # 構成
//! - `advance`: 純粋な状態遷移（state + observation -> next state + 次の動作）
//! - `TaskPoller::run`: wait → query → advance のループ
//! - 待機は `Scheduler` port 経由
//!
//! # 試行回数
//! ステータス問い合わせは最大 `max_attempts` 回。
//! 1 回目は `initial_delay` 後、以降は `interval` ごと。
//! transport エラーも `Processing` と同じく 1 回と数えます。

use std::sync::Arc;
use std::time::Duration;

use crate::adapters::ProviderAdapter;
use crate::domain::{ContentRef, GenerationError, PollConfig, PollState, TaskHandle, TaskStatus};
use crate::ports::{Credential, Scheduler};

/// What one status query told us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// Still running, with the provider's raw status if it gave one.
    Processing(Option<String>),
    Completed(Vec<ContentRef>),
    Failed(String),
    /// The status endpoint could not be reached or read.
    Unreachable,
}

impl From<Result<TaskStatus, GenerationError>> for Observation {
    fn from(result: Result<TaskStatus, GenerationError>) -> Self {
        match result {
            Ok(TaskStatus::Processing(hint)) => Observation::Processing(hint),
            Ok(TaskStatus::Completed(content)) => Observation::Completed(content),
            Ok(TaskStatus::Failed(reason)) => Observation::Failed(reason),
            Err(_) => Observation::Unreachable,
        }
    }
}

/// Terminal result of the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Terminal {
    Completed(Vec<ContentRef>),
    Failed(String),
    TimedOut,
}

/// Next action after an observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Reschedule(Duration),
    Finish(Terminal),
}

/// Pure transition function.
pub fn advance(state: PollState, observation: Observation, config: &PollConfig) -> (PollState, Step) {
    let attempt = state.attempts() + 1;
    match observation {
        Observation::Completed(content) => (PollState::Completed, Step::Finish(Terminal::Completed(content))),
        Observation::Failed(reason) => (PollState::Failed, Step::Finish(Terminal::Failed(reason))),
        Observation::Processing(_) | Observation::Unreachable => {
            if attempt < config.max_attempts {
                (
                    PollState::Polling { attempt },
                    Step::Reschedule(config.next_delay(attempt)),
                )
            } else {
                (PollState::TimedOut, Step::Finish(Terminal::TimedOut))
            }
        }
    }
}

/// Progress after a non-terminal poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollProgress {
    pub task_id: String,
    pub attempt: u32,
    pub max_attempts: u32,
    pub hint: Option<String>,
}

/// How polling ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Completed(Vec<ContentRef>),
    Failed(String),
    /// Attempts exhausted; the handle is kept so the user can follow up.
    TimedOut(TaskHandle),
}

/// Polls one task. Owns its handle for the whole lifecycle.
pub struct TaskPoller {
    adapter: Arc<dyn ProviderAdapter>,
    credential: Credential,
    handle: TaskHandle,
    config: PollConfig,
    scheduler: Arc<dyn Scheduler>,
    state: PollState,
}

impl TaskPoller {
    pub fn new(
        adapter: Arc<dyn ProviderAdapter>,
        credential: Credential,
        handle: TaskHandle,
        config: PollConfig,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        Self {
            adapter,
            credential,
            handle,
            config,
            scheduler,
            state: PollState::Submitted,
        }
    }

    pub async fn run<F>(mut self, mut on_progress: F) -> PollOutcome
    where
        F: FnMut(PollProgress) + Send,
    {
        let mut delay = self.config.next_delay(0);
        loop {
            self.scheduler.delay(delay).await;

            let result = self.adapter.poll_status(&self.handle, &self.credential).await;
            if let Err(e) = &result {
                tracing::warn!(
                    task_id = %self.handle.task_id,
                    attempt = self.state.attempts() + 1,
                    error = %e,
                    "status check failed, will retry"
                );
            }

            let observation = Observation::from(result);
            let hint = match &observation {
                Observation::Processing(hint) => hint.clone(),
                _ => None,
            };
            let (next, step) = advance(self.state, observation, &self.config);
            self.state = next;
            match step {
                Step::Reschedule(next_delay) => {
                    tracing::debug!(
                        task_id = %self.handle.task_id,
                        attempt = next.attempts(),
                        max_attempts = self.config.max_attempts,
                        hint = hint.as_deref().unwrap_or("-"),
                        "task still processing"
                    );
                    on_progress(PollProgress {
                        task_id: self.handle.task_id.clone(),
                        attempt: next.attempts(),
                        max_attempts: self.config.max_attempts,
                        hint,
                    });
                    delay = next_delay;
                }
                Step::Finish(Terminal::Completed(content)) => return PollOutcome::Completed(content),
                Step::Finish(Terminal::Failed(reason)) => return PollOutcome::Failed(reason),
                Step::Finish(Terminal::TimedOut) => {
                    tracing::warn!(
                        task_id = %self.handle.task_id,
                        max_attempts = self.config.max_attempts,
                        "poll attempts exhausted"
                    );
                    return PollOutcome::TimedOut(self.handle);
                }
            }
        }
    }
}
