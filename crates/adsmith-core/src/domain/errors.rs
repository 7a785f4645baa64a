//! Errors - エラー型と分類
//!
//! すべてのエラーは `kind()` で運用上の分類（ErrorKind）を返します。

use super::brief::ServiceId;

/// ErrorKind はエラーの運用分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown service, missing credential, bad wiring.
    Configuration,
    /// Brief is missing required fields.
    Validation,
    /// Network failure talking to a provider.
    Transport,
    /// Provider answered with an error.
    Provider,
    /// History storage could not be read or written.
    Persistence,
}

/// GenerationError は orchestrator と adapter が返すエラー
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid brief: {0}")]
    Validation(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("provider {service} failed{}: {message}", status_suffix(.status))]
    Provider {
        service: ServiceId,
        status: Option<u16>,
        message: String,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl GenerationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerationError::Configuration(_) | GenerationError::Registry(_) => {
                ErrorKind::Configuration
            }
            GenerationError::Validation(_) => ErrorKind::Validation,
            GenerationError::Transport(_) => ErrorKind::Transport,
            GenerationError::Provider { .. } => ErrorKind::Provider,
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        GenerationError::Transport(e.to_string())
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

/// Errors of the adapter registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("adapter for service '{0}' is already registered")]
    DuplicateAdapter(ServiceId),
}

/// HistoryError は永続化の失敗
///
/// HistoryStore の中で回復され、呼び出し側には返らない。
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history io: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed history data: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("history task failed: {0}")]
    Task(String),
}

impl HistoryError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Persistence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_display_includes_status() {
        let err = GenerationError::Provider {
            service: ServiceId::new("openai-gpt-image"),
            status: Some(429),
            message: "slow down".into(),
        };
        assert_eq!(
            err.to_string(),
            "provider openai-gpt-image failed (HTTP 429): slow down"
        );

        let err = GenerationError::Provider {
            service: ServiceId::new("veo-2"),
            status: None,
            message: "content policy".into(),
        };
        assert_eq!(err.to_string(), "provider veo-2 failed: content policy");
    }

    #[test]
    fn errors_map_to_kinds() {
        assert_eq!(
            GenerationError::Configuration("x".into()).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            GenerationError::from(RegistryError::DuplicateAdapter(ServiceId::new("a"))).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(GenerationError::Transport("x".into()).kind(), ErrorKind::Transport);
        assert_eq!(
            HistoryError::Task("join".into()).kind(),
            ErrorKind::Persistence
        );
    }
}
