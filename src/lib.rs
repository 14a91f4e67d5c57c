// src/lib.rs
//! Automated job applications driven by an AI perception engine.
//!
//! A [`JobApplier`] visits each job URL, asks the perception engine to
//! classify the page, and reacts: signs in, clicks Apply, fills and submits
//! the application form, or gives up on pages that are gone.

pub mod applier;
pub mod audit;
pub mod config;
pub mod perception;
pub mod report;
pub mod rules;
pub mod types;
pub mod utils;

pub use applier::{ApplyError, JobApplier};
pub use audit::{AuditSink, NoopAudit, ScreenshotAudit};
pub use config::{ApplierConfig, ApplierSettings};
pub use perception::{PerceptionError, PerceptionPort, PerceptionServiceClient};
pub use report::{RunReport, RunSummary};
pub use types::{load_jobs, Job, JobProcessingResult, PersonalInfo, ProcessingStatus};
