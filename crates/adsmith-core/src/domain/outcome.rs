//! Outcome - プロバイダの応答の分類
//!
//! # 型
//! - **SubmitOutcome**: 送信結果（即時 / 非同期タスク / 拒否）
//! - **TaskStatus**: 1 回のステータス問い合わせの結果
//! - **Generation**: `generate` / `regenerate` の最終結果

use chrono::{DateTime, Utc};

use super::artifact::{Artifact, ContentRef};
use super::brief::ServiceId;
use super::errors::GenerationError;
use super::poll::PollConfig;

/// RejectionKind は拒否の分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    /// The account cannot use this capability (model not enabled, no
    /// permission). Eligible for the degraded fallback on the primary service.
    CapabilityUnavailable,
    /// Any other provider-side failure.
    Provider,
}

/// A provider said no.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub kind: RejectionKind,
    pub status: Option<u16>,
    pub message: String,
}

impl Rejection {
    /// Builds a rejection and classifies it from its message.
    pub fn classify(status: Option<u16>, message: impl Into<String>) -> Self {
        let message = message.into();
        let lowered = message.to_lowercase();
        let kind = if lowered.contains("not enabled") || lowered.contains("permission") {
            RejectionKind::CapabilityUnavailable
        } else {
            RejectionKind::Provider
        };
        Self {
            kind,
            status,
            message,
        }
    }

    pub fn into_error(self, service: &ServiceId) -> GenerationError {
        GenerationError::Provider {
            service: service.clone(),
            status: self.status,
            message: self.message,
        }
    }
}

/// TaskHandle はプロバイダ側のバックグラウンドタスク
///
/// 作成した TaskPoller が専有する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskHandle {
    pub task_id: String,
    pub service: ServiceId,
    pub created_at: DateTime<Utc>,
}

/// Result of `ProviderAdapter::submit`.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    Immediate(Vec<ContentRef>),
    Pending(TaskHandle, PollConfig),
    Rejected(Rejection),
}

/// Result of one status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    /// Still running; the hint is the raw provider status when it was not one
    /// of the known values.
    Processing(Option<String>),
    Completed(Vec<ContentRef>),
    Failed(String),
}

/// Outcome of a `generate` or `regenerate` call.
#[derive(Debug, Clone)]
pub enum Generation {
    Completed(Vec<Artifact>),
    /// Polling ran out of attempts; the provider may still finish the task.
    StillProcessing(TaskHandle),
    /// A newer generate call for the same media class started meanwhile.
    Superseded,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Imagen API is not enabled for this project", RejectionKind::CapabilityUnavailable)]
    #[case("Permission denied on resource", RejectionKind::CapabilityUnavailable)]
    #[case("caller does not have PERMISSION", RejectionKind::CapabilityUnavailable)]
    #[case("quota exceeded", RejectionKind::Provider)]
    #[case("", RejectionKind::Provider)]
    fn rejection_is_classified_from_message(#[case] message: &str, #[case] kind: RejectionKind) {
        assert_eq!(Rejection::classify(Some(403), message).kind, kind);
    }

    #[test]
    fn rejection_converts_to_provider_error() {
        let err = Rejection::classify(Some(400), "bad prompt").into_error(&ServiceId::new("veo-2"));
        assert!(matches!(
            err,
            GenerationError::Provider { status: Some(400), ref message, .. } if message == "bad prompt"
        ));
    }
}
