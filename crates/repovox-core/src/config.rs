use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

/// Top-level configuration for the Repovox application.
///
/// Loaded from `~/.repovox/config.toml` by default. Each section corresponds
/// to one subsystem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepovoxConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
}

impl RepovoxConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RepovoxConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Ingestion/chat backend service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the backend HTTP service.
    pub base_url: String,
    /// Request timeout in seconds. Ingestion of a large repository can be
    /// slow, so this applies to both ingest and chat calls.
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout_secs: 120,
        }
    }
}

/// Speech synthesis and playback settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Whether assistant replies are read aloud.
    pub enabled: bool,
    /// Full URL of the text-to-speech endpoint (including the voice id).
    pub synthesis_url: String,
    /// Synthesis model identifier sent with each request.
    pub model_id: String,
    /// Name of the environment variable holding the synthesis API key.
    pub api_key_env: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            synthesis_url: "https://api.elevenlabs.io/v1/text-to-speech/josh".to_string(),
            model_id: "eleven_monolingual_v1".to_string(),
            api_key_env: "ELEVENLABS_API_KEY".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RepovoxConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.backend.base_url, "http://localhost:8000");
        assert_eq!(config.backend.request_timeout_secs, 120);
        assert!(config.speech.enabled);
        assert_eq!(config.speech.model_id, "eleven_monolingual_v1");
        assert_eq!(config.speech.api_key_env, "ELEVENLABS_API_KEY");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_str = r#"
            [backend]
            base_url = "http://10.0.0.5:9000"
        "#;
        let config: RepovoxConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.backend.base_url, "http://10.0.0.5:9000");
        // Everything else falls back to defaults.
        assert_eq!(config.backend.request_timeout_secs, 120);
        assert_eq!(config.general.log_level, "info");
        assert!(config.speech.enabled);
    }

    #[test]
    fn test_empty_toml_is_all_defaults() {
        let config: RepovoxConfig = toml::from_str("").unwrap();
        assert_eq!(config.backend.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = RepovoxConfig::default();
        config.backend.base_url = "http://example.com".to_string();
        config.speech.enabled = false;
        config.save(&path).unwrap();

        let loaded = RepovoxConfig::load(&path).unwrap();
        assert_eq!(loaded.backend.base_url, "http://example.com");
        assert!(!loaded.speech.enabled);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist.toml");
        assert!(RepovoxConfig::load(&path).is_err());
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist.toml");
        let config = RepovoxConfig::load_or_default(&path);
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_load_or_default_on_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not valid toml [[[").unwrap();
        let config = RepovoxConfig::load_or_default(&path);
        assert_eq!(config.backend.base_url, "http://localhost:8000");
    }
}
