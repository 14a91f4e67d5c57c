// src/applier/remediation.rs
use tracing::{debug, info, warn};

use super::{ApplyError, JobApplier};
use crate::rules;

impl JobApplier {
    /// One best-effort pass over the validation errors currently shown.
    /// Returns how many errors were reported.
    pub(crate) async fn remediate_errors(&self) -> Result<usize, ApplyError> {
        let errors = self.port.observe(rules::OBSERVE_FORM_ERRORS).await?;

        if errors.is_empty() {
            debug!("No form errors detected");
            return Ok(0);
        }

        for error in &errors {
            warn!("Form error detected: {}", error.description);
            let instruction =
                rules::fix_error_instruction(&error.description, error.selector.as_deref());
            self.port.act(&instruction).await?;
            self.settle().await;
        }

        info!("Attempted to fix {} form error(s)", errors.len());
        Ok(errors.len())
    }

    /// Submit and wait for a confirmation, remediating errors between attempts.
    /// Returns the attempt that got confirmed.
    pub(crate) async fn submit_application(&self) -> Result<u32, ApplyError> {
        let max_attempts = self.settings.max_submit_attempts;

        for attempt in 1..=max_attempts {
            self.port.act(rules::SUBMIT_APPLICATION_RULE).await?;
            self.settle().await;

            let confirmation = self
                .port
                .observe(rules::OBSERVE_SUBMISSION_CONFIRMATION)
                .await?;
            if let Some(message) = confirmation.first() {
                info!("Submission confirmed: {}", message.description);
                return Ok(attempt);
            }

            warn!("Submission not confirmed (attempt {}/{})", attempt, max_attempts);
            if attempt < max_attempts {
                self.remediate_errors().await?;
            }
        }

        Err(ApplyError::SubmissionNotConfirmed {
            attempts: max_attempts,
        })
    }
}
