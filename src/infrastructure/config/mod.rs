//! Configuration management

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::application::errors::ConfigError;
use crate::application::ReconnectPolicy;
use crate::infrastructure::media::DEFAULT_RESOLVER_URL;
use crate::infrastructure::qr::{QrMode, QrPresenter, QR_LINK_BASE};

/// Bot configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub bot: BotConfig,
    pub session: SessionConfig,
    pub bridge: BridgeConfig,
    pub media: MediaConfig,
    pub reconnect: ReconnectConfig,
    pub qr: QrConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotConfig {
    pub name: String,
    /// Client identification sent on connect: [os, browser, version]
    pub browser: [String; 3],
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SessionConfig {
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BridgeConfig {
    pub url: String,
    pub poll_timeout_seconds: u64,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct MediaConfig {
    pub resolver_url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ReconnectConfig {
    pub max_attempts: u32,
    pub delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct QrConfig {
    pub mode: QrMode,
    pub link_base: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "wa-groupbot".to_string(),
            browser: ["Ubuntu".to_string(), "Chrome".to_string(), "22.04.4".to_string()],
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("auth_info"),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8787".to_string(),
            poll_timeout_seconds: 30,
            request_timeout_seconds: 30,
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            resolver_url: DEFAULT_RESOLVER_URL.to_string(),
            timeout_seconds: 20,
        }
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay_ms: 1000,
        }
    }
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            mode: QrMode::Link,
            link_base: QR_LINK_BASE.to_string(),
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Defaults with environment overrides applied
    pub fn load_env() -> Self {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("WA_BRIDGE_URL") {
            self.bridge.url = url;
        }

        if let Ok(dir) = std::env::var("WA_SESSION_DIR") {
            self.session.directory = PathBuf::from(dir);
        }

        if let Ok(url) = std::env::var("WA_MEDIA_RESOLVER") {
            self.media.resolver_url = url;
        }

        if let Ok(mode) = std::env::var("WA_QR_MODE") {
            match mode.to_lowercase().as_str() {
                "terminal" => self.qr.mode = QrMode::Terminal,
                "link" => self.qr.mode = QrMode::Link,
                other => tracing::warn!("Ignoring unknown WA_QR_MODE {}", other),
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.media.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue("media.timeout-seconds must be positive".to_string()));
        }
        if self.bridge.poll_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue("bridge.poll-timeout-seconds must be positive".to_string()));
        }
        if self.bridge.request_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue("bridge.request-timeout-seconds must be positive".to_string()));
        }
        if let Err(e) = Url::parse(&self.qr.link_base) {
            return Err(ConfigError::InvalidValue(format!("qr.link-base {}: {}", self.qr.link_base, e)));
        }
        Ok(())
    }

    pub fn media_timeout(&self) -> Duration {
        Duration::from_secs(self.media.timeout_seconds)
    }

    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            max_attempts: self.reconnect.max_attempts,
            delay: Duration::from_millis(self.reconnect.delay_ms),
        }
    }

    pub fn qr_presenter(&self) -> QrPresenter {
        QrPresenter::new(self.qr.mode, self.qr.link_base.clone())
    }
}
