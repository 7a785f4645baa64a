//! Shared HTTP plumbing for the adapters.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::{GenerationError, Rejection, ServiceId};

pub fn build_client(timeout: Duration) -> Result<Client, GenerationError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| GenerationError::Configuration(format!("cannot build http client: {e}")))
}

/// Error text of a provider body, in order of preference:
/// `error.message`, `message`, `error`, `msg`.
pub fn error_message(body: &Value) -> Option<String> {
    let candidates = [
        body.pointer("/error/message"),
        body.get("message"),
        body.get("error"),
        body.get("msg"),
    ];
    candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Converts a non-2xx response into a classified rejection.
pub async fn rejection(response: Response) -> Rejection {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    rejection_from_text(status, &text)
}

pub fn rejection_from_text(status: StatusCode, text: &str) -> Rejection {
    let message = serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|body| error_message(&body))
        .or_else(|| {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| format!("request failed with {status}"));
    Rejection::classify(Some(status.as_u16()), message)
}

/// Reads a 2xx body as JSON. A body that does not decode is a provider error.
pub async fn decode<T: DeserializeOwned>(
    service: &ServiceId,
    response: Response,
) -> Result<T, GenerationError> {
    let status = response.status();
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| GenerationError::Provider {
        service: service.clone(),
        status: Some(status.as_u16()),
        message: format!("unexpected response body: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RejectionKind;
    use serde_json::json;

    #[test]
    fn error_message_prefers_nested_message() {
        let body = json!({"error": {"message": "Imagen is not enabled"}, "message": "outer"});
        assert_eq!(error_message(&body).as_deref(), Some("Imagen is not enabled"));

        let body = json!({"message": "", "error": "bad key"});
        assert_eq!(error_message(&body).as_deref(), Some("bad key"));

        let body = json!({"code": 401, "msg": "unauthorized"});
        assert_eq!(error_message(&body).as_deref(), Some("unauthorized"));

        assert!(error_message(&json!({"error": {"code": 3}})).is_none());
    }

    #[test]
    fn rejection_classifies_capability_errors() {
        let rejection = rejection_from_text(
            StatusCode::FORBIDDEN,
            r#"{"error":{"message":"The caller does not have permission"}}"#,
        );
        assert_eq!(rejection.kind, RejectionKind::CapabilityUnavailable);
        assert_eq!(rejection.status, Some(403));
    }

    #[test]
    fn rejection_falls_back_to_raw_text_then_status() {
        let rejection = rejection_from_text(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(rejection.message, "upstream down");
        assert_eq!(rejection.kind, RejectionKind::Provider);

        let rejection = rejection_from_text(StatusCode::BAD_GATEWAY, "");
        assert!(rejection.message.contains("502"));
    }
}
