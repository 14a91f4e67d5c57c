// src/applier/testing.rs
//! Scripted perception engine and audit sink for state machine tests.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::JobApplier;
use crate::audit::AuditSink;
use crate::config::ApplierSettings;
use crate::perception::{FileInput, FileTarget, ObservedElement, PerceptionError, PerceptionPort};
use crate::types::{Job, PersonalInfo};

pub fn page(page_type: &str, details: &str) -> String {
    serde_json::json!({ "pageType": page_type, "details": details }).to_string()
}

pub fn elements(descriptions: &[&str]) -> Vec<ObservedElement> {
    descriptions.iter().map(|d| ObservedElement::new(*d)).collect()
}

#[derive(Default)]
pub struct FakePort {
    extractions: Mutex<VecDeque<String>>,
    /// Served once the scripted extractions run out
    fallback_extraction: Mutex<Option<String>>,
    observations: Mutex<HashMap<String, VecDeque<Vec<ObservedElement>>>>,
    failing_acts: Mutex<Vec<String>>,
    failing_targets: Mutex<Vec<FileTarget>>,
    file_inputs: Mutex<Vec<FileInput>>,
    navigation_error: Mutex<Option<String>>,

    pub navigations: Mutex<Vec<String>>,
    pub extract_calls: Mutex<usize>,
    pub acts: Mutex<Vec<String>>,
    pub observes: Mutex<Vec<String>>,
    pub uploads: Mutex<Vec<FileTarget>>,
    pub file_input_scans: Mutex<usize>,
}

impl FakePort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extraction(self, raw: String) -> Self {
        self.extractions.lock().unwrap().push_back(raw);
        self
    }

    pub fn always_extract(self, raw: String) -> Self {
        *self.fallback_extraction.lock().unwrap() = Some(raw);
        self
    }

    /// Queue one answer for `query`; an exhausted queue answers with no elements.
    pub fn observation(self, query: &str, answer: Vec<ObservedElement>) -> Self {
        self.observations
            .lock()
            .unwrap()
            .entry(query.to_string())
            .or_default()
            .push_back(answer);
        self
    }

    /// Every act whose instruction contains `needle` fails.
    pub fn fail_act(self, needle: &str) -> Self {
        self.failing_acts.lock().unwrap().push(needle.to_string());
        self
    }

    pub fn fail_upload(self, target: FileTarget) -> Self {
        self.failing_targets.lock().unwrap().push(target);
        self
    }

    pub fn with_file_inputs(self, inputs: Vec<FileInput>) -> Self {
        *self.file_inputs.lock().unwrap() = inputs;
        self
    }

    pub fn fail_navigation(self, message: &str) -> Self {
        *self.navigation_error.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn navigation_count(&self) -> usize {
        self.navigations.lock().unwrap().len()
    }

    pub fn acts_containing(&self, needle: &str) -> usize {
        self.acts
            .lock()
            .unwrap()
            .iter()
            .filter(|act| act.contains(needle))
            .count()
    }

    pub fn observe_count(&self, query: &str) -> usize {
        self.observes
            .lock()
            .unwrap()
            .iter()
            .filter(|q| q.as_str() == query)
            .count()
    }
}

#[async_trait]
impl PerceptionPort for FakePort {
    async fn navigate(&self, url: &str) -> Result<(), PerceptionError> {
        self.navigations.lock().unwrap().push(url.to_string());
        match self.navigation_error.lock().unwrap().clone() {
            Some(message) => Err(PerceptionError::Navigation(message)),
            None => Ok(()),
        }
    }

    async fn extract(&self, _rule: &str) -> Result<String, PerceptionError> {
        *self.extract_calls.lock().unwrap() += 1;
        let scripted = self.extractions.lock().unwrap().pop_front();
        scripted
            .or_else(|| self.fallback_extraction.lock().unwrap().clone())
            .ok_or_else(|| PerceptionError::Extraction("no scripted extraction left".to_string()))
    }

    async fn act(&self, instruction: &str) -> Result<(), PerceptionError> {
        self.acts.lock().unwrap().push(instruction.to_string());
        let fails = self
            .failing_acts
            .lock()
            .unwrap()
            .iter()
            .any(|needle| instruction.contains(needle.as_str()));
        if fails {
            Err(PerceptionError::Action(format!("no element for: {}", instruction)))
        } else {
            Ok(())
        }
    }

    async fn observe(&self, query: &str) -> Result<Vec<ObservedElement>, PerceptionError> {
        self.observes.lock().unwrap().push(query.to_string());
        Ok(self
            .observations
            .lock()
            .unwrap()
            .get_mut(query)
            .and_then(|answers| answers.pop_front())
            .unwrap_or_default())
    }

    async fn screenshot(&self, _path: &Path) -> Result<(), PerceptionError> {
        Ok(())
    }

    async fn set_input_files(&self, target: &FileTarget, _path: &Path) -> Result<(), PerceptionError> {
        self.uploads.lock().unwrap().push(target.clone());
        if self.failing_targets.lock().unwrap().contains(target) {
            Err(PerceptionError::Upload(format!("{:?} not found", target)))
        } else {
            Ok(())
        }
    }

    async fn file_inputs(&self) -> Result<Vec<FileInput>, PerceptionError> {
        *self.file_input_scans.lock().unwrap() += 1;
        Ok(self.file_inputs.lock().unwrap().clone())
    }
}

/// Remembers checkpoint tags instead of capturing anything.
#[derive(Default)]
pub struct RecordingAudit {
    pub tags: Mutex<Vec<String>>,
}

impl RecordingAudit {
    pub fn count(&self, tag: &str) -> usize {
        self.tags.lock().unwrap().iter().filter(|t| t.as_str() == tag).count()
    }
}

#[async_trait]
impl AuditSink for RecordingAudit {
    async fn checkpoint(&self, _job: &Job, tag: &str) -> Option<PathBuf> {
        self.tags.lock().unwrap().push(tag.to_string());
        Some(PathBuf::from(format!("{}.png", tag)))
    }
}

pub fn applicant() -> PersonalInfo {
    PersonalInfo {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        phone: "+441234567890".to_string(),
        city: Some("London".to_string()),
        resume_path: Some(PathBuf::from("/tmp/ada_cv.pdf")),
        password: Some("s3cret".to_string()),
        ..Default::default()
    }
}

pub fn job() -> Job {
    Job::new("Rust Engineer", "Acme Corp", "https://jobs.acme.test/rust")
}

pub fn fixture(port: FakePort) -> (JobApplier, Arc<FakePort>, Arc<RecordingAudit>) {
    fixture_with(port, ApplierSettings::default())
}

pub fn fixture_with(
    port: FakePort,
    settings: ApplierSettings,
) -> (JobApplier, Arc<FakePort>, Arc<RecordingAudit>) {
    let port = Arc::new(port);
    let audit = Arc::new(RecordingAudit::default());
    let applier = JobApplier::new(
        port.clone(),
        audit.clone(),
        applicant(),
        settings.without_delays(),
    );
    (applier, port, audit)
}
