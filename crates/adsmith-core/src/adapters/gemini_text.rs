//! Gemini `generateContent` text describer, used by the degraded fallback.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::domain::GenerationError;
use crate::ports::{Credential, CredentialFamily, Describer};

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

pub struct GeminiDescriber {
    client: Client,
    base_url: String,
    model: String,
}

impl GeminiDescriber {
    pub fn new(client: Client, base_url: &str, model: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl Describer for GeminiDescriber {
    fn credential_family(&self) -> CredentialFamily {
        CredentialFamily::Google
    }

    async fn describe(
        &self,
        prompt: &str,
        credential: &Credential,
    ) -> Result<Option<String>, GenerationError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = GenerateContentRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", credential.expose())
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "description request rejected");
            return Ok(None);
        }

        let text = response.text().await?;
        let Ok(parsed) = serde_json::from_str::<GenerateContentResponse>(&text) else {
            tracing::warn!("description response did not decode");
            return Ok(None);
        };

        Ok(parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn describer(server: &MockServer) -> GeminiDescriber {
        let client = http::build_client(Duration::from_secs(5)).unwrap();
        GeminiDescriber::new(client, &server.uri(), "gemini-1.5-flash")
    }

    #[tokio::test]
    async fn returns_first_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:generateContent"))
            .and(header("x-goog-api-key", "g-key"))
            .and(body_partial_json(json!({"contents": [{"parts": [{"text": "describe"}]}]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": " A sunny shop window. "}]}}]
            })))
            .mount(&server)
            .await;

        let text = describer(&server)
            .describe("describe", &Credential::new("g-key"))
            .await
            .unwrap();
        assert_eq!(text.as_deref(), Some("A sunny shop window."));
    }

    #[tokio::test]
    async fn rejected_or_empty_answers_are_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({"error": {}})))
            .mount(&server)
            .await;
        assert!(
            describer(&server)
                .describe("d", &Credential::new("k"))
                .await
                .unwrap()
                .is_none()
        );

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;
        assert!(
            describer(&server)
                .describe("d", &Credential::new("k"))
                .await
                .unwrap()
                .is_none()
        );
    }
}
