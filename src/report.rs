// src/report.rs
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::types::{JobProcessingResult, ProcessingStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub errored: usize,
}

impl RunSummary {
    pub fn from_results(results: &[JobProcessingResult]) -> Self {
        let count = |status: ProcessingStatus| results.iter().filter(|r| r.status == status).count();

        Self {
            total: results.len(),
            succeeded: count(ProcessingStatus::Success),
            skipped: count(ProcessingStatus::Skipped),
            errored: count(ProcessingStatus::Error),
        }
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} job(s): {} succeeded, {} skipped, {} errored",
            self.total, self.succeeded, self.skipped, self.errored
        )
    }
}

/// Everything one run produced, in processing order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub results: Vec<JobProcessingResult>,
    pub summary: RunSummary,
}

/// Flat row for the CSV companion of the JSON report.
#[derive(Debug, Serialize)]
struct ResultRow<'a> {
    job_title: &'a str,
    company: &'a str,
    job_url: &'a str,
    status: &'static str,
    message: &'a str,
    description: &'a str,
    fields_filled: String,
    attempts: u32,
    processing_time_ms: u64,
    last_screenshot: String,
    start_time: String,
    end_time: String,
}

impl<'a> From<&'a JobProcessingResult> for ResultRow<'a> {
    fn from(result: &'a JobProcessingResult) -> Self {
        Self {
            job_title: &result.job_title,
            company: &result.company,
            job_url: &result.job_url,
            status: result.status.as_str(),
            message: &result.message,
            description: &result.description,
            fields_filled: result.fields_filled.join("; "),
            attempts: result.attempts,
            processing_time_ms: result.processing_time_ms,
            last_screenshot: result
                .last_screenshot
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            start_time: result.start_time.to_rfc3339(),
            end_time: result.end_time.to_rfc3339(),
        }
    }
}

impl RunReport {
    pub fn new(started_at: DateTime<Utc>, results: Vec<JobProcessingResult>) -> Self {
        let summary = RunSummary::from_results(&results);

        Self {
            run_id: Uuid::new_v4(),
            started_at,
            finished_at: Utc::now(),
            results,
            summary,
        }
    }

    /// CSV companion path: same location and stem as the JSON report.
    pub fn csv_path(json_path: &Path) -> PathBuf {
        json_path.with_extension("csv")
    }

    /// Write the JSON report to `path` and the CSV next to it. Returns the CSV path.
    pub fn write(&self, path: &Path) -> Result<PathBuf> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create report directory: {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize run report")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;

        let csv_path = Self::csv_path(path);
        let mut writer = csv::Writer::from_path(&csv_path)
            .with_context(|| format!("Failed to create CSV report: {}", csv_path.display()))?;
        for result in &self.results {
            writer
                .serialize(ResultRow::from(result))
                .context("Failed to write CSV row")?;
        }
        writer.flush().context("Failed to flush CSV report")?;

        Ok(csv_path)
    }
}
