//! Describer port - degraded fallback 用のテキスト説明

use async_trait::async_trait;

use crate::domain::GenerationError;
use crate::ports::credentials::{Credential, CredentialFamily};

/// Produces a textual description for a prompt.
#[async_trait]
pub trait Describer: Send + Sync {
    /// Family of the credential the describer needs.
    fn credential_family(&self) -> CredentialFamily;

    /// 使えるテキストが無ければ `Ok(None)`。`Err` は通信失敗のときだけ。
    async fn describe(
        &self,
        prompt: &str,
        credential: &Credential,
    ) -> Result<Option<String>, GenerationError>;
}
