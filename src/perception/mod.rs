// src/perception/mod.rs
//! Boundary to the browser-automation / perception engine.
//!
//! The applier never touches the DOM itself: it asks the engine to navigate,
//! extract JSON through a natural-language rule, act on a described element,
//! observe candidate elements, and capture screenshots.

pub mod error;
pub mod service_client;

pub use error::PerceptionError;
pub use service_client::PerceptionServiceClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Element returned by an observe query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ObservedElement {
    pub description: String,
    pub selector: Option<String>,
    pub method: Option<String>,
    pub arguments: Vec<String>,
}

/// Observed form fields are plain observed elements, valid only for the page they came from.
pub type FormFieldDescriptor = ObservedElement;

impl ObservedElement {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }
}

// The engine sometimes answers with bare strings instead of objects
#[derive(Deserialize)]
#[serde(untagged)]
enum RawElement {
    Text(String),
    Structured {
        #[serde(default)]
        description: String,
        #[serde(default, alias = "selectors")]
        selector: Option<String>,
        #[serde(default)]
        method: Option<String>,
        #[serde(default)]
        arguments: Vec<String>,
    },
}

impl<'de> Deserialize<'de> for ObservedElement {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(match RawElement::deserialize(deserializer)? {
            RawElement::Text(description) => ObservedElement::new(description),
            RawElement::Structured {
                description,
                selector,
                method,
                arguments,
            } => ObservedElement {
                description,
                selector: selector.filter(|s| !s.trim().is_empty()),
                method,
                arguments,
            },
        })
    }
}

/// How a file input is located for `set_input_files`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FileTarget {
    /// Concrete locator reported by an observe call
    Selector(String),
    /// `data-testid` of a container holding a file input
    TestId(String),
    /// First `input[type=file]` whose `accept` mentions PDF
    AcceptsPdf,
    /// N-th `input[type=file]` on the page, as enumerated by `file_inputs`
    Index(usize),
}

/// A file input found on the page together with the text around it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInput {
    pub index: usize,
    #[serde(default)]
    pub context_text: Option<String>,
}

#[async_trait]
pub trait PerceptionPort: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), PerceptionError>;

    /// Returns the raw JSON text produced for `rule`. Untrusted.
    async fn extract(&self, rule: &str) -> Result<String, PerceptionError>;

    async fn act(&self, instruction: &str) -> Result<(), PerceptionError>;

    async fn observe(&self, query: &str) -> Result<Vec<ObservedElement>, PerceptionError>;

    async fn screenshot(&self, path: &Path) -> Result<(), PerceptionError>;

    async fn set_input_files(&self, target: &FileTarget, path: &Path) -> Result<(), PerceptionError>;

    async fn file_inputs(&self) -> Result<Vec<FileInput>, PerceptionError>;
}
