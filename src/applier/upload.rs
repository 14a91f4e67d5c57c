// src/applier/upload.rs
//! Résumé upload with a chain of increasingly generic strategies.

use std::path::Path;
use tracing::{debug, error, info, warn};

use super::JobApplier;
use crate::perception::{FileTarget, FormFieldDescriptor, PerceptionError};
use crate::rules;
use crate::types::Job;
use crate::utils::contains_any;

const RESUME_TEST_ID: &str = "ResumeField";
const FILE_CONTEXT_KEYWORDS: &[&str] = &["resume", "cv", "upload"];
/// Looser than the fill routing: only used to pick a locator for tier 1
const SELECTOR_FIELD_KEYWORDS: &[&str] = &["resume", "résumé", "upload", "cv", "file", "attach"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadTier {
    /// Locator reported for the upload field by the form observation
    ObservedSelector,
    /// Well-known résumé field test id
    ResumeTestId,
    /// First file input accepting PDF
    PdfInput,
    /// Natural-language instruction to the perception engine
    Instruction,
    /// Scan of every file input and the text around it
    FileInputScan,
}

impl UploadTier {
    pub const ALL: [UploadTier; 5] = [
        UploadTier::ObservedSelector,
        UploadTier::ResumeTestId,
        UploadTier::PdfInput,
        UploadTier::Instruction,
        UploadTier::FileInputScan,
    ];

    pub fn number(&self) -> u8 {
        match self {
            UploadTier::ObservedSelector => 1,
            UploadTier::ResumeTestId => 2,
            UploadTier::PdfInput => 3,
            UploadTier::Instruction => 4,
            UploadTier::FileInputScan => 5,
        }
    }
}

impl JobApplier {
    /// Try every tier in order and stop at the first that works. Failure is
    /// logged, never raised: the form fill goes on without a résumé.
    pub(crate) async fn upload_resume(
        &self,
        job: &Job,
        fields: &[FormFieldDescriptor],
    ) -> Option<UploadTier> {
        let Some(resume) = self.personal_info.resume_path.as_deref() else {
            warn!("No resume path configured, skipping resume upload");
            return None;
        };

        info!("Looking for resume file input fields...");
        for tier in UploadTier::ALL {
            match self.try_upload_tier(tier, resume, fields).await {
                Ok(()) => {
                    info!("Resume uploaded via tier {} ({:?})", tier.number(), tier);
                    self.settle().await;
                    self.audit
                        .checkpoint(job, &format!("resume_upload_tier_{}", tier.number()))
                        .await;
                    return Some(tier);
                }
                Err(e) => debug!("Upload tier {} failed: {}", tier.number(), e),
            }
        }

        error!("All resume upload methods failed for {}", job.company);
        self.audit.checkpoint(job, "resume_upload_error").await;
        None
    }

    async fn try_upload_tier(
        &self,
        tier: UploadTier,
        resume: &Path,
        fields: &[FormFieldDescriptor],
    ) -> Result<(), PerceptionError> {
        match tier {
            UploadTier::ObservedSelector => {
                let selector = fields
                    .iter()
                    .filter(|field| contains_any(&field.description, SELECTOR_FIELD_KEYWORDS))
                    .find_map(|field| field.selector.clone())
                    .ok_or_else(|| {
                        PerceptionError::Upload("no observed upload field with a selector".to_string())
                    })?;
                self.port
                    .set_input_files(&FileTarget::Selector(selector), resume)
                    .await
            }
            UploadTier::ResumeTestId => {
                self.port
                    .set_input_files(&FileTarget::TestId(RESUME_TEST_ID.to_string()), resume)
                    .await
            }
            UploadTier::PdfInput => self.port.set_input_files(&FileTarget::AcceptsPdf, resume).await,
            UploadTier::Instruction => {
                self.port
                    .act(&rules::upload_resume_instruction(resume))
                    .await
            }
            UploadTier::FileInputScan => self.upload_to_scanned_input(resume).await,
        }
    }

    async fn upload_to_scanned_input(&self, resume: &Path) -> Result<(), PerceptionError> {
        let inputs = self.port.file_inputs().await?;
        debug!("Found {} file input(s), checking for resume-related ones", inputs.len());

        let related = inputs.iter().filter(|input| {
            input
                .context_text
                .as_deref()
                .map(|text| contains_any(text, FILE_CONTEXT_KEYWORDS))
                .unwrap_or(false)
        });
        for input in related {
            match self
                .port
                .set_input_files(&FileTarget::Index(input.index), resume)
                .await
            {
                Ok(()) => return Ok(()),
                Err(e) => debug!("File input {} rejected the resume: {}", input.index, e),
            }
        }

        let first = inputs
            .first()
            .ok_or_else(|| PerceptionError::Upload("no file inputs on the page".to_string()))?;
        self.port
            .set_input_files(&FileTarget::Index(first.index), resume)
            .await
    }
}
