//! Settings loaded from `config.toml`.
//!
//! すべてのセクションにデフォルトがあり、空のファイルや存在しないファイルも
//! 有効な設定として扱います。
//!
//! ```toml
//! [general]
//! primary_service = "google-gemini"
//!
//! [polling]
//! veo_max_attempts = 60
//!
//! [history]
//! dir = "/var/lib/adsmith"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{MediaClass, PollConfig};
use crate::ports::EnvCredentialProvider;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Top-level settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub http: HttpSettings,
    pub providers: ProviderSettings,
    pub credentials: CredentialSettings,
    pub polling: PollingSettings,
    pub history: HistorySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Service whose capability rejections trigger the degraded fallback.
    pub primary_service: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub google_base_url: String,
    pub imagen_model: String,
    pub gemini_text_model: String,
    pub openai_base_url: String,
    pub openai_image_model: String,
    pub kie_base_url: String,
    pub flux_strength: f32,
    /// Watermark text stamped on Veo videos; none when unset.
    pub veo_watermark: Option<String>,
}

/// Names of the environment variables holding each provider secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialSettings {
    pub google_env: String,
    pub openai_env: String,
    pub kie_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingSettings {
    pub initial_delay_ms: u64,
    pub interval_ms: u64,
    pub flux_max_attempts: u32,
    pub veo_max_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Override of the history directory.
    pub dir: Option<PathBuf>,
    pub image_capacity: usize,
    pub video_capacity: usize,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            primary_service: "google-gemini".to_string(),
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self { timeout_secs: 120 }
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            google_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            imagen_model: "imagen-4.0-generate-001".to_string(),
            gemini_text_model: "gemini-1.5-flash".to_string(),
            openai_base_url: "https://api.openai.com/v1".to_string(),
            openai_image_model: "gpt-image-1".to_string(),
            kie_base_url: "https://api.kie.ai/api/v1".to_string(),
            flux_strength: 0.6,
            veo_watermark: None,
        }
    }
}

impl Default for CredentialSettings {
    fn default() -> Self {
        Self {
            google_env: "GEMINI_API_KEY".to_string(),
            openai_env: "OPENAI_API_KEY".to_string(),
            kie_env: "KIE_AI_API_KEY".to_string(),
        }
    }
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            initial_delay_ms: 3_000,
            interval_ms: 5_000,
            flux_max_attempts: 30,
            veo_max_attempts: 60,
        }
    }
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            dir: None,
            image_capacity: 50,
            video_capacity: 20,
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl PollingSettings {
    fn config(&self, max_attempts: u32) -> PollConfig {
        PollConfig::new(
            Duration::from_millis(self.initial_delay_ms),
            Duration::from_millis(self.interval_ms),
            max_attempts,
        )
    }

    pub fn flux(&self) -> PollConfig {
        self.config(self.flux_max_attempts)
    }

    pub fn veo(&self) -> PollConfig {
        self.config(self.veo_max_attempts)
    }
}

impl HistorySettings {
    pub fn capacity(&self, media: MediaClass) -> usize {
        match media {
            MediaClass::Image => self.image_capacity,
            MediaClass::Video => self.video_capacity,
        }
    }
}

impl CredentialSettings {
    pub fn env_provider(&self) -> EnvCredentialProvider {
        EnvCredentialProvider::new(&self.google_env, &self.openai_env, &self.kie_env)
    }
}

impl Settings {
    /// Loads settings.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// tried and a missing file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_path(), false),
        };

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };

        let settings = Self::from_toml(&contents).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(settings)
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("adsmith").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// History directory: override or platform data dir.
    pub fn history_dir(&self) -> PathBuf {
        self.history.dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("adsmith"))
                .unwrap_or_else(|| PathBuf::from("adsmith-data"))
        })
    }
}
