//! kie.ai task API helpers shared by the Flux Kontext and Veo adapters.
//!
//! submit / status の body は 2 通り:
//! - フィールドがトップレベルにある
//! - `{ code, msg, data: { ... } }` で包まれている
//!
//! どちらも受け付けます。

use reqwest::{Client, Response};
use serde_json::Value;

use super::http;
use crate::domain::{ContentRef, GenerationError, Rejection, ServiceId, TaskStatus};
use crate::ports::Credential;

/// What a kie.ai submit answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KieSubmit {
    Task(String),
    Url(String),
    Rejected(Rejection),
}

fn layers(body: &Value) -> impl Iterator<Item = &Value> {
    std::iter::once(body).chain(body.get("data").filter(|d| d.is_object()))
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn task_id(body: &Value) -> Option<String> {
    layers(body).find_map(|layer| non_empty_str(layer.get("taskId")))
}

/// Result URL under `<url_key>`, `result.<url_key>` or `url`.
pub fn result_url(body: &Value, url_key: &str) -> Option<String> {
    layers(body).find_map(|layer| {
        non_empty_str(layer.get(url_key))
            .or_else(|| non_empty_str(layer.get("result").and_then(|r| r.get(url_key))))
            .or_else(|| non_empty_str(layer.get("url")))
    })
}

/// Application-level failure carried by a 2xx body (`code` other than 200).
pub fn application_error(body: &Value) -> Option<Rejection> {
    let code = body.get("code").and_then(Value::as_i64)?;
    if code == 200 {
        return None;
    }
    let message = http::error_message(body).unwrap_or_else(|| format!("kie.ai error code {code}"));
    let status = u16::try_from(code).ok();
    Some(Rejection::classify(status, message))
}

/// Maps a status body onto `TaskStatus`.
pub fn parse_status(body: &Value, url_key: &str) -> TaskStatus {
    let status = layers(body).find_map(|layer| non_empty_str(layer.get("status")));
    let url = result_url(body, url_key);

    match (status.as_deref(), url) {
        (_, Some(url)) => TaskStatus::Completed(vec![ContentRef::Url(url)]),
        (Some("completed"), None) => {
            TaskStatus::Failed("task completed without a result url".to_string())
        }
        (Some("processing") | Some("pending") | None, None) => TaskStatus::Processing(None),
        (Some("failed") | Some("error"), None) => {
            let reason = layers(body)
                .find_map(|layer| non_empty_str(layer.get("error")))
                .unwrap_or_else(|| "Unknown error".to_string());
            TaskStatus::Failed(reason)
        }
        (Some(other), None) => TaskStatus::Processing(Some(other.to_string())),
    }
}

/// Reads a submit response.
pub async fn read_submit(
    service: &ServiceId,
    response: Response,
    url_key: &str,
) -> Result<KieSubmit, GenerationError> {
    if !response.status().is_success() {
        return Ok(KieSubmit::Rejected(http::rejection(response).await));
    }
    let body: Value = http::decode(service, response).await?;
    if let Some(rejection) = application_error(&body) {
        return Ok(KieSubmit::Rejected(rejection));
    }
    if let Some(id) = task_id(&body) {
        return Ok(KieSubmit::Task(id));
    }
    if let Some(url) = result_url(&body, url_key) {
        return Ok(KieSubmit::Url(url));
    }
    Ok(KieSubmit::Rejected(Rejection::classify(
        None,
        "response carried neither a task id nor a result url",
    )))
}

/// Queries `record-info` for a task.
///
/// Anything short of a readable status body is reported as a transport
/// error so the poller retries it within max_attempts.
pub async fn fetch_status(
    client: &Client,
    url: &str,
    task_id: &str,
    credential: &Credential,
    url_key: &str,
) -> Result<TaskStatus, GenerationError> {
    let response = client
        .get(url)
        .query(&[("taskId", task_id)])
        .bearer_auth(credential.expose())
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(GenerationError::Transport(format!(
            "status check for task {task_id} returned {status}"
        )));
    }
    let body: Value = response.json().await?;
    if let Some(rejection) = application_error(&body) {
        return Err(GenerationError::Transport(rejection.message));
    }
    Ok(parse_status(&body, url_key))
}
