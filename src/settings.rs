//! Application settings storage
//!
//! Configuration like API keys, transport mode and tuning knobs, stored as
//! a JSON file. No global state: callers load a `Settings` value and pass
//! it (or clients built from it) into the engine explicitly.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ai_client::Transport;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Completions API key. The `GROQ_API_KEY` environment variable takes
    /// precedence over this stored value.
    #[serde(default)]
    pub groq_api_key: Option<String>,
    /// When set, requests go through this proxy endpoint instead of the
    /// provider; the proxy holds the real key.
    #[serde(default)]
    pub proxy_url: Option<String>,
    /// Session token sent as the bearer credential in proxy mode.
    #[serde(default)]
    pub proxy_token: Option<String>,
    /// Base URL of a hosted classification service, for deployments that
    /// run the whole pipeline server-side.
    #[serde(default)]
    pub service_url: Option<String>,
    #[serde(default)]
    pub service_token: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    /// Quiet period before classify-as-you-type fires.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Per-request timeout for model calls; a timeout is treated like any
    /// other model failure.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_model() -> String {
    "llama-3.1-8b-instant".to_string()
}

fn default_debounce_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            groq_api_key: None,
            proxy_url: None,
            proxy_token: None,
            service_url: None,
            service_token: None,
            model: default_model(),
            debounce_ms: default_debounce_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Settings {
    /// Load settings from disk or fall back to defaults.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
                Err(_) => Settings::default(),
            }
        } else {
            Settings::default()
        }
    }

    /// Save settings to disk, creating the parent directory if needed.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(path, content).map_err(|e| format!("Failed to write settings: {}", e))?;

        Ok(())
    }

    /// Default config file location under the platform config directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("notesift")
            .join("settings.json")
    }

    /// Current API key: environment variable first, then the stored value.
    pub fn api_key(&self) -> Option<String> {
        if let Ok(key) = std::env::var("GROQ_API_KEY") {
            if !key.is_empty() {
                return Some(key);
            }
        }
        self.groq_api_key.clone().filter(|k| !k.is_empty())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    /// Masked API key for display (shows first/last characters only).
    pub fn masked_api_key(&self) -> Option<String> {
        self.api_key().map(|key| {
            if key.len() > 12 {
                format!("{}...{}", &key[..8], &key[key.len() - 4..])
            } else {
                "*".repeat(key.len())
            }
        })
    }

    /// Pick the completion transport: proxy when configured, otherwise
    /// direct with the API key. `None` means no AI is available and the
    /// engine runs keyword-only.
    pub fn transport(&self) -> Option<Transport> {
        if let (Some(url), Some(token)) = (&self.proxy_url, &self.proxy_token) {
            if !url.is_empty() {
                return Some(Transport::Proxy {
                    url: url.clone(),
                    token: token.clone(),
                });
            }
        }
        self.api_key().map(|api_key| Transport::Direct { api_key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.model, "llama-3.1-8b-instant");
        assert_eq!(settings.debounce_ms, 1000);
        assert_eq!(settings.request_timeout_secs, 10);
        assert!(settings.groq_api_key.is_none());
    }

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("nope.json"));
        assert_eq!(settings.model, "llama-3.1-8b-instant");
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join("settings.json");

        let mut settings = Settings::default();
        settings.groq_api_key = Some("gsk_test_key_1234567890".to_string());
        settings.debounce_ms = 800;
        settings.save(&path).unwrap();

        let loaded = Settings::load(&path);
        assert_eq!(loaded.groq_api_key.as_deref(), Some("gsk_test_key_1234567890"));
        assert_eq!(loaded.debounce_ms, 800);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"debounce_ms": 500}"#).unwrap();

        let loaded = Settings::load(&path);
        assert_eq!(loaded.debounce_ms, 500);
        assert_eq!(loaded.model, "llama-3.1-8b-instant");
    }

    #[test]
    fn test_proxy_transport_preferred_when_configured() {
        let mut settings = Settings::default();
        settings.groq_api_key = Some("gsk_direct".to_string());
        settings.proxy_url = Some("https://edge.example.test/groq-proxy".to_string());
        settings.proxy_token = Some("session-token".to_string());

        match settings.transport() {
            Some(Transport::Proxy { url, token }) => {
                assert_eq!(url, "https://edge.example.test/groq-proxy");
                assert_eq!(token, "session-token");
            }
            other => panic!("expected proxy transport, got {:?}", other),
        }
    }

    #[test]
    fn test_masked_api_key() {
        std::env::remove_var("GROQ_API_KEY");
        let mut settings = Settings::default();
        settings.groq_api_key = Some("gsk_abcdefghijklmnop".to_string());
        let masked = settings.masked_api_key().unwrap();
        assert!(masked.starts_with("gsk_abcd"));
        assert!(masked.ends_with("mnop"));
        assert!(masked.contains("..."));
    }
}
