// src/perception/error.rs
use thiserror::Error;

/// Failures reported by the perception engine.
#[derive(Debug, Error)]
pub enum PerceptionError {
    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    /// No matching element or the action could not be performed
    #[error("Action failed: {0}")]
    Action(String),

    #[error("Observation failed: {0}")]
    Observation(String),

    #[error("File upload failed: {0}")]
    Upload(String),

    #[error("Screenshot failed: {0}")]
    Screenshot(String),

    /// The engine could not be reached or answered garbage
    #[error("Perception service error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for PerceptionError {
    fn from(e: reqwest::Error) -> Self {
        PerceptionError::Transport(e.to_string())
    }
}
