// src/types/mod.rs
pub mod job;
pub mod outcome;
pub mod page;
pub mod personal_info;

pub use job::{load_jobs, Job};
pub use outcome::{merge_labels, ApplicationStepOutcome, JobProcessingResult, ProcessingStatus};
pub use page::{PageClassification, PageType};
pub use personal_info::PersonalInfo;
