// src/types/outcome.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::Job;

/// What a page handler reports back to its caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationStepOutcome {
    pub success: bool,
    pub should_retry: bool,
    pub message: Option<String>,
    pub fields_filled: Vec<String>,
}

impl ApplicationStepOutcome {
    pub fn completed(fields_filled: Vec<String>) -> Self {
        Self {
            success: true,
            should_retry: false,
            message: None,
            fields_filled,
        }
    }

    pub fn retryable(message: impl Into<String>) -> Self {
        Self {
            success: false,
            should_retry: true,
            message: Some(message.into()),
            fields_filled: Vec::new(),
        }
    }

    pub fn terminal(message: impl Into<String>) -> Self {
        Self {
            success: false,
            should_retry: false,
            message: Some(message.into()),
            fields_filled: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields_filled = fields;
        self
    }

    /// Put `earlier` labels in front of this outcome's own, dropping repeats.
    pub fn after_fields(mut self, earlier: &[String]) -> Self {
        let mut merged = earlier.to_vec();
        merge_labels(&mut merged, &self.fields_filled);
        self.fields_filled = merged;
        self
    }
}

/// Append labels that are not present yet, keeping first-seen order.
pub fn merge_labels(into: &mut Vec<String>, labels: &[String]) {
    for label in labels {
        if !into.contains(label) {
            into.push(label.clone());
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Success,
    Skipped,
    Error,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Success => "success",
            ProcessingStatus::Skipped => "skipped",
            ProcessingStatus::Error => "error",
        }
    }
}

/// Terminal record of one job. Written once by the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobProcessingResult {
    pub job_title: String,
    pub company: String,
    pub job_url: String,
    pub status: ProcessingStatus,
    pub last_screenshot: Option<PathBuf>,
    pub description: String,
    pub message: String,
    pub fields_filled: Vec<String>,
    pub attempts: u32,
    pub processing_time_ms: u64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl JobProcessingResult {
    pub(crate) fn for_job(job: &Job, status: ProcessingStatus, start_time: DateTime<Utc>) -> Self {
        Self {
            job_title: job.title.clone(),
            company: job.company.clone(),
            job_url: job.url.clone(),
            status,
            last_screenshot: None,
            description: String::new(),
            message: String::new(),
            fields_filled: Vec::new(),
            attempts: 0,
            processing_time_ms: 0,
            start_time,
            end_time: start_time,
        }
    }
}
