// src/applier/mod.rs
//! Page-classification-and-application state machine.
//!
//! One [`JobApplier`] drives a single browser session through every job of a
//! run, strictly one job at a time. Each attempt navigates to the job, asks
//! the perception engine what kind of page it is looking at, and hands the
//! page to the matching handler. Handlers may act, re-classify, and recurse;
//! the recursion is bounded by `max_page_depth`.

pub mod classifier;
pub mod error;
pub mod filler;
pub mod handlers;
pub mod mapping;
pub mod remediation;
pub mod upload;

#[cfg(test)]
mod testing;
#[cfg(test)]
mod tests;

pub use classifier::parse_classification;
pub use error::ApplyError;
pub use mapping::{build_field_mappings, find_mapping, FieldMapping};
pub use upload::UploadTier;

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, info_span, warn, Instrument};

use crate::audit::AuditSink;
use crate::config::ApplierSettings;
use crate::perception::{FormFieldDescriptor, PerceptionPort};
use crate::types::{
    merge_labels, ApplicationStepOutcome, Job, JobProcessingResult, PersonalInfo,
    ProcessingStatus,
};

/// Decides whether an observed field must be filled.
pub type RequiredPredicate = Arc<dyn Fn(&FormFieldDescriptor) -> bool + Send + Sync>;

/// Default predicate: the observation flagged the field as required.
pub fn mentions_required(field: &FormFieldDescriptor) -> bool {
    crate::utils::contains_any(&field.description, &["required"])
}

pub struct JobApplier {
    port: Arc<dyn PerceptionPort>,
    audit: Arc<dyn AuditSink>,
    personal_info: PersonalInfo,
    field_mappings: Vec<FieldMapping>,
    is_required: RequiredPredicate,
    settings: ApplierSettings,
}

/// Running state of one `process` call.
struct AttemptLog {
    start_time: DateTime<Utc>,
    started: Instant,
    attempts: u32,
    description: String,
    fields_filled: Vec<String>,
    last_screenshot: Option<PathBuf>,
}

impl AttemptLog {
    fn new() -> Self {
        Self {
            start_time: Utc::now(),
            started: Instant::now(),
            attempts: 0,
            description: String::new(),
            fields_filled: Vec::new(),
            last_screenshot: None,
        }
    }

    fn record_screenshot(&mut self, path: Option<PathBuf>) {
        if path.is_some() {
            self.last_screenshot = path;
        }
    }

    fn finish(self, job: &Job, status: ProcessingStatus, message: String) -> JobProcessingResult {
        let mut result = JobProcessingResult::for_job(job, status, self.start_time);
        result.last_screenshot = self.last_screenshot;
        result.description = self.description;
        result.message = message;
        result.fields_filled = self.fields_filled;
        result.attempts = self.attempts;
        result.processing_time_ms = self.started.elapsed().as_millis() as u64;
        result.end_time = Utc::now();
        result
    }
}

impl JobApplier {
    /// The field mapping table is built here, once per applier, from `personal_info`.
    pub fn new(
        port: Arc<dyn PerceptionPort>,
        audit: Arc<dyn AuditSink>,
        personal_info: PersonalInfo,
        settings: ApplierSettings,
    ) -> Self {
        let field_mappings = build_field_mappings(&personal_info);

        Self {
            port,
            audit,
            personal_info,
            field_mappings,
            is_required: Arc::new(mentions_required),
            settings,
        }
    }

    pub fn with_required_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&FormFieldDescriptor) -> bool + Send + Sync + 'static,
    {
        self.is_required = Arc::new(predicate);
        self
    }

    pub fn field_mappings(&self) -> &[FieldMapping] {
        &self.field_mappings
    }

    pub fn settings(&self) -> &ApplierSettings {
        &self.settings
    }

    /// Apply to `job` with the configured retry budget. Never fails: every
    /// outcome, including errors, ends up in the returned result.
    pub async fn process(&self, job: &Job) -> JobProcessingResult {
        self.process_with_retries(job, self.settings.max_retries)
            .await
    }

    pub async fn process_with_retries(&self, job: &Job, max_retries: u32) -> JobProcessingResult {
        let span = info_span!("job", company = %job.company, title = %job.title);
        self.run(job, max_retries).instrument(span).await
    }

    async fn run(&self, job: &Job, max_retries: u32) -> JobProcessingResult {
        let mut log = AttemptLog::new();
        let mut current_retry = 0;
        let mut last_error: Option<String> = None;

        while current_retry <= max_retries {
            log.attempts += 1;

            match self.attempt(job, &mut log).await {
                Ok(outcome) => {
                    merge_labels(&mut log.fields_filled, &outcome.fields_filled);

                    if outcome.success {
                        info!("Successfully processed job: {}", job.title);
                        let shot = self.audit.checkpoint(job, "success").await;
                        log.record_screenshot(shot);
                        let message = outcome
                            .message
                            .unwrap_or_else(|| "Application submitted".to_string());
                        return log.finish(job, ProcessingStatus::Success, message);
                    }

                    if outcome.should_retry && current_retry < max_retries {
                        warn!(
                            "Retrying... ({}/{}): {}",
                            current_retry + 1,
                            max_retries,
                            outcome.message.as_deref().unwrap_or("no details")
                        );
                        last_error = outcome.message;
                        current_retry += 1;
                        tokio::time::sleep(self.settings.retry_backoff).await;
                        continue;
                    }

                    info!("Skipping job after {} attempts", log.attempts);
                    let shot = self.audit.checkpoint(job, "skipped").await;
                    log.record_screenshot(shot);
                    let message = outcome
                        .message
                        .unwrap_or_else(|| "max retries exceeded".to_string());
                    return log.finish(job, ProcessingStatus::Skipped, message);
                }
                Err(e) => {
                    error!("Error in attempt {}: {}", log.attempts, e);
                    let shot = self.audit.checkpoint(job, "error").await;
                    log.record_screenshot(shot);
                    last_error = Some(e.to_string());
                    current_retry += 1;

                    if current_retry > max_retries {
                        return log.finish(job, ProcessingStatus::Error, e.to_string());
                    }
                }
            }
        }

        let message = last_error.unwrap_or_else(|| "Job processing ended without a result".to_string());
        log.finish(job, ProcessingStatus::Error, message)
    }

    async fn attempt(
        &self,
        job: &Job,
        log: &mut AttemptLog,
    ) -> Result<ApplicationStepOutcome, ApplyError> {
        info!("Navigating to: {}", job.url);
        self.port.navigate(&job.url).await?;
        let shot = self.audit.checkpoint(job, "initial").await;
        log.record_screenshot(shot);

        let classification = self.classify().await?;
        info!(
            page_type = %classification.page_type,
            "Initial page analysis: {}", classification.details
        );
        log.description = classification.details.clone();

        Ok(self.dispatch(job, classification, 0).await)
    }

    async fn settle(&self) {
        tokio::time::sleep(self.settings.settle_delay).await;
    }
}
