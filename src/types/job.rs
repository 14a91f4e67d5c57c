// src/types/job.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One job posting to apply to. Read-only input of the applier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    #[serde(rename = "job_title", alias = "title")]
    pub title: String,
    #[serde(rename = "company_name", alias = "company")]
    pub company: String,
    #[serde(rename = "job_url", alias = "url")]
    pub url: String,
    #[serde(
        rename = "application_status",
        alias = "status",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_applied: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Job {
    pub fn new(title: &str, company: &str, url: &str) -> Self {
        Self {
            title: title.to_string(),
            company: company.to_string(),
            url: url.to_string(),
            status: None,
            date_applied: None,
            notes: None,
        }
    }

    /// Whether the list already marks this job as applied
    pub fn already_applied(&self) -> bool {
        self.status
            .as_deref()
            .map(|s| s.trim().eq_ignore_ascii_case("applied"))
            .unwrap_or(false)
    }
}

/// Load the job list from a `.json` array or a `.csv` file with a header row.
pub fn load_jobs(path: &Path) -> Result<Vec<Job>> {
    let extension = crate::utils::get_file_extension(&path.to_string_lossy());

    let jobs = match extension.as_deref() {
        Some("json") => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read job list: {}", path.display()))?;
            serde_json::from_str::<Vec<Job>>(&content)
                .with_context(|| format!("Failed to parse job list: {}", path.display()))?
        }
        Some("csv") => {
            let mut reader = csv::ReaderBuilder::new()
                .trim(csv::Trim::All)
                .from_path(path)
                .with_context(|| format!("Failed to open job list: {}", path.display()))?;

            let mut jobs = Vec::new();
            for (index, record) in reader.deserialize::<Job>().enumerate() {
                let job = record.with_context(|| format!("Invalid job on row {}", index + 2))?;
                jobs.push(normalize_empty_fields(job));
            }
            jobs
        }
        _ => anyhow::bail!(
            "Unsupported job list format: {}. Use .json or .csv",
            path.display()
        ),
    };

    for job in &jobs {
        if job.url.trim().is_empty() {
            anyhow::bail!("Job '{}' at '{}' has no URL", job.title, job.company);
        }
    }

    Ok(jobs)
}

// csv yields empty strings for blank optional columns
fn normalize_empty_fields(mut job: Job) -> Job {
    for field in [&mut job.status, &mut job.date_applied, &mut job.notes] {
        if field.as_deref().map(str::is_empty).unwrap_or(false) {
            *field = None;
        }
    }
    job
}
