// src/types/page.rs
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageType {
    JobDetail,
    ApplicationForm,
    SigninPage,
    JobNotFound,
    Other,
}

impl PageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageType::JobDetail => "job_detail",
            PageType::ApplicationForm => "application_form",
            PageType::SigninPage => "signin_page",
            PageType::JobNotFound => "job_not_found",
            PageType::Other => "other",
        }
    }

    /// Map a raw label from the perception engine; anything unrecognized is `Other`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "job_detail" => PageType::JobDetail,
            "application_form" => PageType::ApplicationForm,
            "signin_page" | "sign_in_page" | "login_page" => PageType::SigninPage,
            "job_not_found" => PageType::JobNotFound,
            _ => PageType::Other,
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one classification call. Never mutated; re-classifying yields a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageClassification {
    pub page_type: PageType,
    pub details: String,
}

impl PageClassification {
    pub fn new(page_type: PageType, details: impl Into<String>) -> Self {
        Self {
            page_type,
            details: details.into(),
        }
    }

    /// Whether the details suggest the page should be translated first
    pub fn needs_translation(&self) -> bool {
        crate::utils::contains_any(&self.details, &["translate", "language"])
    }
}
