//! Fallback - primary サービスが使えないときの degraded モード
//!
//! primary が CapabilityUnavailable で拒否したときだけ動きます。
//! - 決定的なプレースホルダー画像 URL（picsum.photos）
//! - Describer による画像の説明文
//! - `degraded = true` と固定の note

use std::sync::Arc;

use crate::domain::{ContentRef, GenerationError, GenerationRequest};
use crate::ports::{CredentialProvider, Describer};

pub const DEFAULT_DESCRIPTION: &str = "Description generated";

pub const DEGRADED_NOTE: &str = "Imagen 4 API access may require additional permissions. Using placeholder images with AI-generated descriptions.";

/// Prompt sent to the describer.
pub fn description_prompt(prompt: &str) -> String {
    format!(
        "Create a vivid, detailed description of an image: \"{prompt}\". Describe it as if the image exists."
    )
}

/// First 16 hex digits of blake3(prompt || index).
pub fn placeholder_seed(prompt: &str, index: u32) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(prompt.as_bytes());
    hasher.update(index.to_string().as_bytes());
    let hex = hasher.finalize().to_hex();
    hex.as_str()[..16].to_string()
}

pub fn placeholder_url(seed: &str, width: u32, height: u32) -> String {
    format!("https://picsum.photos/seed/{seed}/{width}/{height}")
}

/// Content and shared description for a degraded batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Degraded {
    pub description: String,
    pub contents: Vec<ContentRef>,
}

/// Builds the degraded batch for `request`.
///
/// A describer that answers without text yields `DEFAULT_DESCRIPTION`. A
/// transport failure reaching the describer is returned as is.
pub async fn degrade(
    describer: Option<&Arc<dyn Describer>>,
    credentials: &dyn CredentialProvider,
    request: &GenerationRequest,
) -> Result<Degraded, GenerationError> {
    let description = match describer {
        Some(describer) => match credentials.resolve(describer.credential_family()) {
            Some(credential) => describer
                .describe(&description_prompt(request.prompt()), &credential)
                .await?
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            None => {
                tracing::warn!(
                    family = %describer.credential_family(),
                    "no credential for describer, using default description"
                );
                DEFAULT_DESCRIPTION.to_string()
            }
        },
        None => {
            tracing::warn!("no describer configured, using default description");
            DEFAULT_DESCRIPTION.to_string()
        }
    };

    let (width, height) = request.brief().size.dimensions();
    let contents = (0..request.count())
        .map(|i| ContentRef::url(placeholder_url(&placeholder_seed(request.prompt(), i), width, height)))
        .collect();

    Ok(Degraded {
        description,
        contents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Brief, MediaClass, RequestId};
    use crate::ports::{CredentialFamily, StaticCredentials};
    use crate::testing::FakeDescriber;

    fn request(count: u32, size: &str) -> GenerationRequest {
        let brief = Brief::new("google-gemini")
            .with_headline("Summer Sale")
            .with_size(size);
        GenerationRequest::new(
            RequestId::from_ulid(ulid::Ulid::new()),
            brief,
            MediaClass::Image,
            count,
            "a beach".to_string(),
        )
    }

    fn google() -> StaticCredentials {
        StaticCredentials::new().with(CredentialFamily::Google, "g-key")
    }

    #[test]
    fn seed_is_deterministic_and_index_sensitive() {
        let a = placeholder_seed("a beach", 0);
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(a, placeholder_seed("a beach", 0));
        assert_ne!(a, placeholder_seed("a beach", 1));
        assert_ne!(a, placeholder_seed("a forest", 0));
    }

    #[test]
    fn description_prompt_quotes_the_prompt() {
        assert_eq!(
            description_prompt("a beach"),
            "Create a vivid, detailed description of an image: \"a beach\". Describe it as if the image exists."
        );
    }

    #[tokio::test]
    async fn placeholders_follow_count_and_size() {
        let describer: Arc<dyn Describer> = Arc::new(FakeDescriber::answering(Some("Sunny")));
        let degraded = degrade(Some(&describer), &google(), &request(2, "1792x1024"))
            .await
            .unwrap();

        assert_eq!(degraded.description, "Sunny");
        assert_eq!(
            degraded.contents,
            vec![
                ContentRef::url(placeholder_url(&placeholder_seed("a beach", 0), 1792, 1024)),
                ContentRef::url(placeholder_url(&placeholder_seed("a beach", 1), 1792, 1024)),
            ]
        );
    }

    #[tokio::test]
    async fn missing_text_uses_default_description() {
        let describer: Arc<dyn Describer> = Arc::new(FakeDescriber::answering(None));
        let degraded = degrade(Some(&describer), &google(), &request(1, "1024x1024"))
            .await
            .unwrap();
        assert_eq!(degraded.description, DEFAULT_DESCRIPTION);

        let degraded = degrade(None, &google(), &request(1, "1024x1024")).await.unwrap();
        assert_eq!(degraded.description, DEFAULT_DESCRIPTION);

        let degraded = degrade(Some(&describer), &StaticCredentials::new(), &request(1, "1024x1024"))
            .await
            .unwrap();
        assert_eq!(degraded.description, DEFAULT_DESCRIPTION);
    }

    #[tokio::test]
    async fn describer_transport_failure_propagates() {
        let describer: Arc<dyn Describer> = Arc::new(FakeDescriber::failing(
            GenerationError::Transport("connection refused".into()),
        ));
        let result = degrade(Some(&describer), &google(), &request(1, "1024x1024")).await;
        assert!(matches!(result, Err(GenerationError::Transport(_))));
    }
}
