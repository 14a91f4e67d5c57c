// src/applier/handlers.rs
use async_recursion::async_recursion;
use tracing::{debug, error, info, warn};

use super::{ApplyError, JobApplier};
use crate::rules;
use crate::types::{ApplicationStepOutcome, Job, PageClassification, PageType};

impl JobApplier {
    /// Route a classified page to its handler. `depth` counts the page
    /// transitions already followed in this attempt.
    #[async_recursion]
    pub(crate) async fn dispatch(
        &self,
        job: &Job,
        classification: PageClassification,
        depth: u32,
    ) -> ApplicationStepOutcome {
        if depth > self.settings.max_page_depth {
            warn!(
                depth,
                "Giving up on page that keeps changing: {}", classification.details
            );
            return ApplicationStepOutcome::retryable(format!(
                "Page did not stabilize after {} transitions",
                self.settings.max_page_depth
            ));
        }

        debug!(depth, page_type = %classification.page_type, "Dispatching page");

        match classification.page_type {
            PageType::JobNotFound => self.handle_job_not_found(job, &classification).await,
            PageType::SigninPage => self.handle_signin_page(job, &classification, depth).await,
            PageType::JobDetail => self.handle_job_detail(job, depth).await,
            PageType::ApplicationForm => self.handle_application_form(job, depth).await,
            PageType::Other => self.handle_unknown_page(job, &classification).await,
        }
    }

    async fn handle_job_not_found(
        &self,
        job: &Job,
        classification: &PageClassification,
    ) -> ApplicationStepOutcome {
        warn!("Job not found or expired: {}", job.title);
        self.audit.checkpoint(job, "job_not_found").await;
        ApplicationStepOutcome::terminal(format!(
            "Job not found or expired: {}",
            classification.details
        ))
    }

    async fn handle_signin_page(
        &self,
        job: &Job,
        classification: &PageClassification,
        depth: u32,
    ) -> ApplicationStepOutcome {
        info!("Sign-in required, attempting sign-in with provided details...");
        match self.sign_in(job, classification, depth).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Sign-in failed: {}", e);
                ApplicationStepOutcome::retryable(format!("Sign-in failed: {}", e))
            }
        }
    }

    async fn sign_in(
        &self,
        job: &Job,
        classification: &PageClassification,
        depth: u32,
    ) -> Result<ApplicationStepOutcome, ApplyError> {
        let linkedin = crate::utils::contains_any(&classification.details, &["linkedin"]);
        let instruction = rules::signin_instruction(&self.personal_info, linkedin);
        self.port.act(&instruction).await?;

        if let Err(e) = self.port.act(rules::CLICK_CONTINUE_IF_PRESENT).await {
            debug!("No continue button after sign-in: {}", e);
        }
        tokio::time::sleep(self.settings.signin_settle).await;

        let next = self.classify().await?;
        info!(page_type = %next.page_type, "Post sign-in analysis: {}", next.details);
        Ok(self.dispatch(job, next, depth + 1).await)
    }

    async fn handle_job_detail(&self, job: &Job, depth: u32) -> ApplicationStepOutcome {
        info!("Job details page found, looking for Apply button...");
        match self.click_apply(job, depth).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Failed to click Apply button: {}", e);
                ApplicationStepOutcome::retryable(format!("Failed to click Apply: {}", e))
            }
        }
    }

    async fn click_apply(&self, job: &Job, depth: u32) -> Result<ApplicationStepOutcome, ApplyError> {
        self.port.act(rules::CLICK_APPLY_INSTRUCTION).await?;
        self.settle().await;

        let next = self.classify().await?;
        info!(page_type = %next.page_type, "Post-apply analysis: {}", next.details);

        if next.page_type == PageType::ApplicationForm && depth < self.settings.max_page_depth {
            Ok(self.handle_application_form(job, depth + 1).await)
        } else {
            Ok(self.dispatch(job, next, depth + 1).await)
        }
    }

    pub(crate) async fn handle_application_form(&self, job: &Job, depth: u32) -> ApplicationStepOutcome {
        info!("Application form detected");

        let fields = match self.port.observe(rules::OBSERVE_FORM_FIELDS).await {
            Ok(fields) => fields,
            Err(e) => {
                error!("Error handling application form: {}", e);
                self.audit.checkpoint(job, "application_error").await;
                return ApplicationStepOutcome::retryable(format!(
                    "Error handling application form: {}",
                    e
                ));
            }
        };
        debug!("Form analysis found {} fields", fields.len());

        let outcome = self.fill_application_form(job, &fields, depth).await;

        if outcome.success {
            info!("Application form completed successfully");
            self.audit.checkpoint(job, "application_completed").await;
            ApplicationStepOutcome {
                success: true,
                should_retry: false,
                ..outcome
            }
        } else {
            self.audit.checkpoint(job, "application_failed").await;
            ApplicationStepOutcome {
                success: false,
                ..outcome
            }
        }
    }

    async fn handle_unknown_page(
        &self,
        job: &Job,
        classification: &PageClassification,
    ) -> ApplicationStepOutcome {
        warn!("Unknown page type, details: {}", classification.details);
        self.audit.checkpoint(job, "unknown_page").await;
        ApplicationStepOutcome::retryable(format!("Unrecognized page: {}", classification.details))
    }
}
