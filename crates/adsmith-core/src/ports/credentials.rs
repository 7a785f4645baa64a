//! CredentialProvider port - プロバイダの秘密鍵の解決
//!
//! 鍵はサービスごとではなく family（google / openai / kie）ごとに 1 つ。
//! Debug 出力には出さない。

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Provider families sharing one secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialFamily {
    Google,
    OpenAi,
    Kie,
}

impl fmt::Display for CredentialFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialFamily::Google => f.write_str("google"),
            CredentialFamily::OpenAi => f.write_str("openai"),
            CredentialFamily::Kie => f.write_str("kie"),
        }
    }
}

/// A provider secret. Redacted in `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Maps a credential family to its secret, resolved on demand.
pub trait CredentialProvider: Send + Sync {
    fn resolve(&self, family: CredentialFamily) -> Option<Credential>;
}

/// Reads secrets from environment variables.
#[derive(Debug, Clone)]
pub struct EnvCredentialProvider {
    vars: HashMap<CredentialFamily, String>,
}

impl EnvCredentialProvider {
    pub fn new(google: impl Into<String>, openai: impl Into<String>, kie: impl Into<String>) -> Self {
        let mut vars = HashMap::new();
        vars.insert(CredentialFamily::Google, google.into());
        vars.insert(CredentialFamily::OpenAi, openai.into());
        vars.insert(CredentialFamily::Kie, kie.into());
        Self { vars }
    }

    /// Name of the variable consulted for `family`.
    pub fn var_name(&self, family: CredentialFamily) -> Option<&str> {
        self.vars.get(&family).map(String::as_str)
    }
}

impl Default for EnvCredentialProvider {
    fn default() -> Self {
        Self::new("GEMINI_API_KEY", "OPENAI_API_KEY", "KIE_AI_API_KEY")
    }
}

impl CredentialProvider for EnvCredentialProvider {
    fn resolve(&self, family: CredentialFamily) -> Option<Credential> {
        let var = self.vars.get(&family)?;
        std::env::var(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(Credential)
    }
}

/// Fixed secrets, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    secrets: HashMap<CredentialFamily, Credential>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, family: CredentialFamily, secret: impl Into<String>) -> Self {
        self.secrets.insert(family, Credential::new(secret));
        self
    }
}

impl CredentialProvider for StaticCredentials {
    fn resolve(&self, family: CredentialFamily) -> Option<Credential> {
        self.secrets.get(&family).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_debug_is_redacted() {
        let cred = Credential::new("sk-very-secret");
        let shown = format!("{cred:?}");
        assert!(!shown.contains("sk-very-secret"));

        let creds = StaticCredentials::new().with(CredentialFamily::OpenAi, "sk-very-secret");
        assert!(!format!("{creds:?}").contains("sk-very-secret"));
    }

    #[test]
    fn static_credentials_resolve_per_family() {
        let creds = StaticCredentials::new().with(CredentialFamily::Kie, "kie-key");
        assert_eq!(
            creds.resolve(CredentialFamily::Kie).map(|c| c.expose().to_string()),
            Some("kie-key".to_string())
        );
        assert!(creds.resolve(CredentialFamily::Google).is_none());
    }

    #[test]
    fn env_provider_ignores_unset_variables() {
        let provider = EnvCredentialProvider::new(
            "ADSMITH_TEST_UNSET_GOOGLE_KEY",
            "ADSMITH_TEST_UNSET_OPENAI_KEY",
            "ADSMITH_TEST_UNSET_KIE_KEY",
        );
        assert!(provider.resolve(CredentialFamily::Google).is_none());
        assert_eq!(
            provider.var_name(CredentialFamily::Kie),
            Some("ADSMITH_TEST_UNSET_KIE_KEY")
        );
    }
}
