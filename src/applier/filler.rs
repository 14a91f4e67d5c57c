// src/applier/filler.rs
use tracing::{debug, error, info, warn};

use super::{find_mapping, ApplyError, JobApplier};
use crate::perception::{FormFieldDescriptor, ObservedElement};
use crate::rules;
use crate::types::{merge_labels, ApplicationStepOutcome, Job};
use crate::utils::{contains_any, contains_word};

pub const RESUME_UPLOAD_LABEL: &str = "Resume Upload";

const UPLOAD_KEYWORDS: &[&str] = &["resume", "résumé", "upload", "cv", "file"];
const CONTINUE_KEYWORDS: &[&str] = &["continue", "proceed", "next"];

/// Whole words only: "Profile" is not a file field.
pub fn is_upload_field(field: &FormFieldDescriptor) -> bool {
    contains_word(&field.description, UPLOAD_KEYWORDS)
}

/// Button that advances a multi-step form rather than submitting it
pub fn find_continue_button(buttons: &[ObservedElement]) -> Option<&ObservedElement> {
    buttons
        .iter()
        .find(|button| contains_any(&button.description, CONTINUE_KEYWORDS))
}

impl JobApplier {
    /// Fill one page of an application form, then either advance to the next
    /// step or submit. Returned labels are in fill order, without repeats.
    pub(crate) async fn fill_application_form(
        &self,
        job: &Job,
        fields: &[FormFieldDescriptor],
        depth: u32,
    ) -> ApplicationStepOutcome {
        info!("Starting form fill process with {} observed fields", fields.len());
        let mut filled = Vec::new();

        match self.try_fill(job, fields, depth, &mut filled).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Error filling application form: {}", e);
                ApplicationStepOutcome::retryable(format!("Error filling application form: {}", e))
                    .with_fields(filled)
            }
        }
    }

    async fn try_fill(
        &self,
        job: &Job,
        fields: &[FormFieldDescriptor],
        depth: u32,
        filled: &mut Vec<String>,
    ) -> Result<ApplicationStepOutcome, ApplyError> {
        self.fill_fields(job, fields, filled, true).await?;
        self.remediate_errors().await?;

        let buttons = self.port.observe(rules::OBSERVE_BUTTONS).await?;
        debug!("Observed {} buttons", buttons.len());

        if let Some(button) = find_continue_button(&buttons) {
            info!("Continuing to next step via '{}'", button.description);
            let instruction =
                rules::click_button_instruction(&button.description, button.selector.as_deref());
            self.port.act(&instruction).await?;
            self.settle().await;

            let next = self.classify().await?;
            info!(page_type = %next.page_type, "Next step analysis: {}", next.details);
            let nested = self.dispatch(job, next, depth + 1).await;
            return Ok(nested.after_fields(filled));
        }

        info!("No continue button found, preparing final submission");
        self.remediate_errors().await?;
        self.fill_fields(job, fields, filled, false).await?;

        match self.submit_application().await {
            Ok(attempts) => {
                info!("Application submitted after {} attempt(s)", attempts);
                Ok(ApplicationStepOutcome::completed(filled.clone()).with_message("submitted"))
            }
            Err(ApplyError::SubmissionNotConfirmed { attempts }) => {
                warn!("Submission was never confirmed");
                Ok(ApplicationStepOutcome::terminal(format!(
                    "Submission not confirmed after {} attempts",
                    attempts
                ))
                .with_fields(filled.clone()))
            }
            Err(e) => Err(e),
        }
    }

    /// One pass over the observed fields. Uploads run at most once per pass.
    async fn fill_fields(
        &self,
        job: &Job,
        fields: &[FormFieldDescriptor],
        filled: &mut Vec<String>,
        include_uploads: bool,
    ) -> Result<(), ApplyError> {
        let mut resume_handled = !include_uploads;

        for field in fields {
            if is_upload_field(field) {
                if !resume_handled {
                    resume_handled = true;
                    if self.upload_resume(job, fields).await.is_some() {
                        merge_labels(filled, &[RESUME_UPLOAD_LABEL.to_string()]);
                    }
                }
                continue;
            }

            if !(self.is_required)(field) {
                debug!("Skipping optional field: {}", field.description);
                continue;
            }

            let label = match find_mapping(&self.field_mappings, &field.description) {
                Some(mapping) => {
                    debug!("Filling '{}' as {}", field.description, mapping.label);
                    self.port.act(&mapping.instruction).await?;
                    mapping.label.to_string()
                }
                None => {
                    info!("No mapping for '{}', improvising", field.description);
                    let instruction =
                        rules::improvise_field_instruction(&field.description, &self.personal_info);
                    self.port.act(&instruction).await?;
                    field.description.clone()
                }
            };
            merge_labels(filled, &[label]);
        }

        Ok(())
    }
}
