//! CLI argument definitions for the Repovox application.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// Repovox — chat about a code repository with your keyboard or your voice.
#[derive(Parser, Debug)]
#[command(name = "repovox", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Base URL of the ingestion/chat backend service.
    #[arg(short = 'b', long = "backend-url")]
    pub backend_url: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Disable speech synthesis; replies stay text-only.
    #[arg(long = "no-speech")]
    pub no_speech: bool,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > REPOVOX_CONFIG env var > ~/.repovox/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("REPOVOX_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the backend base URL.
    ///
    /// Priority: --backend-url flag > REPOVOX_BACKEND_URL env var > config
    /// file value.
    pub fn resolve_backend_url(&self, config_url: &str) -> String {
        if let Some(ref url) = self.backend_url {
            return url.clone();
        }
        if let Ok(url) = std::env::var("REPOVOX_BACKEND_URL") {
            return url;
        }
        config_url.to_string()
    }

    /// Resolve the log level used when RUST_LOG is unset.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

/// Platform default config location: ~/.repovox/config.toml.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".repovox").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".repovox").join("config.toml");
    }
    PathBuf::from("config.toml")
}
