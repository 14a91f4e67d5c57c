// src/types/personal_info.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Applicant record used to fill applications. Read-only to the applier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub phone_without_country_code: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub city: Option<String>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub resume_path: Option<PathBuf>,
    /// Expected salary keyed by currency code, e.g. `EUR = "65000"`
    pub salary_expectations: BTreeMap<String, String>,
    pub experience_level: Option<String>,
    pub education_level: Option<String>,
    pub skills: Vec<String>,
    pub projects: Vec<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    #[serde(skip_serializing)]
    pub linkedin_password: Option<String>,
}

impl PersonalInfo {
    /// Read the applicant from `APPLICANT_*` environment variables
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Load a TOML applicant profile
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile: {}", path.display()))?;
        let info: PersonalInfo = toml::from_str(&content)
            .with_context(|| format!("Failed to parse profile: {}", path.display()))?;
        info!("Loaded applicant profile from {}", path.display());
        Ok(info)
    }

    /// Environment variables take precedence over profile values
    pub fn with_env_overrides(mut self) -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        if let Some(v) = var("APPLICANT_FIRST_NAME") {
            self.first_name = v;
        }
        if let Some(v) = var("APPLICANT_LAST_NAME") {
            self.last_name = v;
        }
        if let Some(v) = var("APPLICANT_EMAIL") {
            self.email = v;
        }
        if let Some(v) = var("APPLICANT_PHONE") {
            self.phone = v;
        }

        let optional = [
            ("APPLICANT_PHONE_WITHOUT_COUNTRY_CODE", &mut self.phone_without_country_code),
            ("APPLICANT_COUNTRY", &mut self.country),
            ("APPLICANT_COUNTRY_CODE", &mut self.country_code),
            ("APPLICANT_CITY", &mut self.city),
            ("APPLICANT_LINKEDIN", &mut self.linkedin_url),
            ("APPLICANT_GITHUB", &mut self.github_url),
            ("APPLICANT_PORTFOLIO", &mut self.portfolio_url),
            ("DEFAULT_PASSWORD", &mut self.password),
            ("LINKEDIN_PASSWORD", &mut self.linkedin_password),
        ];
        for (name, slot) in optional {
            if let Some(v) = var(name) {
                *slot = Some(v);
            }
        }

        if let Some(v) = var("RESUME_PATH") {
            self.resume_path = Some(PathBuf::from(v));
        }

        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() || !self.email.contains('@') {
            anyhow::bail!("Applicant email is missing or invalid: '{}'", self.email);
        }

        if let Some(resume) = &self.resume_path {
            if !resume.exists() {
                anyhow::bail!("Resume file not found: {}", resume.display());
            }
        }

        Ok(())
    }

    /// JSON rendering handed to the perception engine when a field must be improvised.
    /// Passwords are never included.
    pub fn to_prompt_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
