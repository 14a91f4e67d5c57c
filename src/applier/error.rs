// src/applier/error.rs
use thiserror::Error;

use crate::perception::PerceptionError;

#[derive(Debug, Error)]
pub enum ApplyError {
    /// Extraction output was not a JSON object at all
    #[error("Could not parse page classification: {reason}")]
    ClassificationParse { reason: String, raw: String },

    #[error(transparent)]
    Perception(#[from] PerceptionError),

    #[error("Submission not confirmed after {attempts} attempts")]
    SubmissionNotConfirmed { attempts: u32 },
}
