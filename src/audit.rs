// src/audit.rs
//! Screenshot checkpoints taken while a job is processed.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::perception::PerceptionPort;
use crate::types::Job;
use crate::utils::screenshot_file_path;

/// Receives named checkpoints. Best-effort: a failed capture never aborts the caller.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Returns where the capture was stored, if anywhere
    async fn checkpoint(&self, job: &Job, tag: &str) -> Option<PathBuf>;
}

/// Captures a PNG through the perception engine for every checkpoint.
pub struct ScreenshotAudit {
    port: Arc<dyn PerceptionPort>,
    screenshot_dir: PathBuf,
}

impl ScreenshotAudit {
    pub fn new(port: Arc<dyn PerceptionPort>, screenshot_dir: PathBuf) -> Self {
        Self {
            port,
            screenshot_dir,
        }
    }
}

#[async_trait]
impl AuditSink for ScreenshotAudit {
    async fn checkpoint(&self, job: &Job, tag: &str) -> Option<PathBuf> {
        let path = screenshot_file_path(&self.screenshot_dir, tag, &job.company);

        match self.port.screenshot(&path).await {
            Ok(()) => {
                debug!("Saved {} screenshot: {}", tag, path.display());
                Some(path)
            }
            Err(e) => {
                warn!("Failed to capture {} screenshot for {}: {}", tag, job.company, e);
                None
            }
        }
    }
}

pub struct NoopAudit;

#[async_trait]
impl AuditSink for NoopAudit {
    async fn checkpoint(&self, _job: &Job, _tag: &str) -> Option<PathBuf> {
        None
    }
}
