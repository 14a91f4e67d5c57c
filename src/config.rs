// src/config.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::utils::{ensure_dir_exists, resolve_path};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplierConfig {
    pub perception_url: String,
    pub request_timeout_secs: u64,
    pub screenshot_dir: PathBuf,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub settle_delay_ms: u64,
    pub signin_settle_ms: u64,
    pub max_page_depth: u32,
    pub max_submit_attempts: u32,
}

impl Default for ApplierConfig {
    fn default() -> Self {
        Self {
            perception_url: "http://127.0.0.1:3100".to_string(),
            request_timeout_secs: 120,
            screenshot_dir: PathBuf::from("screenshots"),
            max_retries: 2,
            retry_backoff_ms: 2000,
            settle_delay_ms: 2000,
            signin_settle_ms: 3000,
            max_page_depth: 8,
            max_submit_attempts: 3,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: ApplierConfig,
    #[serde(default)]
    production: ApplierConfig,
}

/// Timing and bound knobs the applier state machine runs with.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplierSettings {
    pub max_retries: u32,
    pub retry_backoff: Duration,
    pub settle_delay: Duration,
    pub signin_settle: Duration,
    pub max_page_depth: u32,
    pub max_submit_attempts: u32,
}

impl Default for ApplierSettings {
    fn default() -> Self {
        ApplierConfig::default().settings()
    }
}

impl ApplierSettings {
    /// Same bounds, no waiting. Handy for tests and dry runs against fakes.
    pub fn without_delays(mut self) -> Self {
        self.retry_backoff = Duration::ZERO;
        self.settle_delay = Duration::ZERO;
        self.signin_settle = Duration::ZERO;
        self
    }
}

impl ApplierConfig {
    /// Load `path`, picking the section named by the environment. A missing file means defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let environment = Self::get_environment();
        info!("Loading configuration for environment: {}", environment);

        if !path.exists() {
            warn!("{} not found, using default configuration", path.display());
            return Self::default().resolved();
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content, &environment)?.resolved()
    }

    fn from_yaml(content: &str, environment: &str) -> Result<Self> {
        let config_file: ConfigFile =
            serde_yaml::from_str(content).context("Failed to parse configuration file")?;

        let config = match environment {
            "production" => config_file.production,
            _ => config_file.local,
        };
        config.validate()?;
        Ok(config)
    }

    fn get_environment() -> String {
        std::env::var("APPLIER_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .or_else(|_| std::env::var("ENV"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn validate(&self) -> Result<()> {
        if self.perception_url.trim().is_empty() {
            anyhow::bail!("perception_url must not be empty");
        }
        if self.max_page_depth == 0 {
            anyhow::bail!("max_page_depth must be at least 1");
        }
        if self.max_submit_attempts == 0 {
            anyhow::bail!("max_submit_attempts must be at least 1");
        }
        Ok(())
    }

    fn resolved(mut self) -> Result<Self> {
        self.screenshot_dir = resolve_path(&self.screenshot_dir)?;
        Ok(self)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn settings(&self) -> ApplierSettings {
        ApplierSettings {
            max_retries: self.max_retries,
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            signin_settle: Duration::from_millis(self.signin_settle_ms),
            max_page_depth: self.max_page_depth,
            max_submit_attempts: self.max_submit_attempts,
        }
    }

    pub async fn ensure_directories(&self) -> Result<()> {
        ensure_dir_exists(&self.screenshot_dir).await?;
        info!("Screenshot directory ready: {}", self.screenshot_dir.display());
        Ok(())
    }
}
