// src/perception/service_client.rs
//! HTTP client for a browser-automation sidecar speaking JSON.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, trace};

use super::{FileInput, FileTarget, ObservedElement, PerceptionError, PerceptionPort};

const NAVIGATE_ENDPOINT: &str = "/navigate";
const EXTRACT_ENDPOINT: &str = "/extract";
const ACT_ENDPOINT: &str = "/act";
const OBSERVE_ENDPOINT: &str = "/observe";
const SCREENSHOT_ENDPOINT: &str = "/screenshot";
const SET_INPUT_FILES_ENDPOINT: &str = "/set-input-files";
const FILE_INPUTS_ENDPOINT: &str = "/file-inputs";

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    extraction: String,
}

#[derive(Debug, Deserialize)]
struct Ack {
    #[serde(default = "default_true")]
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize)]
struct SetInputFilesRequest<'a> {
    target: &'a FileTarget,
    path: String,
}

pub struct PerceptionServiceClient {
    client: reqwest::Client,
    base_url: String,
}

impl PerceptionServiceClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// POST `payload` and return the body text, mapping a non-2xx status through `on_error`.
    async fn post<T>(
        &self,
        endpoint: &str,
        payload: &T,
        on_error: fn(String) -> PerceptionError,
    ) -> Result<String, PerceptionError>
    where
        T: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        trace!("POST {}", url);

        let response = self.client.post(&url).json(payload).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("Perception service error on {}: {} {}", endpoint, status, body);
            return Err(on_error(format!("{} returned {}: {}", endpoint, status, body)));
        }
        Ok(body)
    }

    /// POST `payload` and decode the body as `R`. An empty body decodes as `if_empty`.
    async fn post_json<T, R>(
        &self,
        endpoint: &str,
        payload: &T,
        on_error: fn(String) -> PerceptionError,
        if_empty: &str,
    ) -> Result<R, PerceptionError>
    where
        T: Serialize + ?Sized,
        R: serde::de::DeserializeOwned,
    {
        let body = self.post(endpoint, payload, on_error).await?;
        decode(endpoint, &body, if_empty)
    }

    async fn post_ack<T>(
        &self,
        endpoint: &str,
        payload: &T,
        on_error: fn(String) -> PerceptionError,
    ) -> Result<(), PerceptionError>
    where
        T: Serialize + ?Sized,
    {
        let ack: Ack = self.post_json(endpoint, payload, on_error, "{}").await?;
        if ack.success {
            Ok(())
        } else {
            Err(on_error(
                ack.message
                    .unwrap_or_else(|| format!("{} reported failure", endpoint)),
            ))
        }
    }
}

fn decode<R>(endpoint: &str, body: &str, if_empty: &str) -> Result<R, PerceptionError>
where
    R: serde::de::DeserializeOwned,
{
    let body = if body.trim().is_empty() { if_empty } else { body };

    serde_json::from_str::<R>(body).map_err(|e| {
        PerceptionError::Transport(format!(
            "Failed to parse {} response: {}. Raw response: {}",
            endpoint, e, body
        ))
    })
}

#[async_trait]
impl PerceptionPort for PerceptionServiceClient {
    async fn navigate(&self, url: &str) -> Result<(), PerceptionError> {
        debug!("Navigating to {}", url);
        self.post_ack(
            NAVIGATE_ENDPOINT,
            &serde_json::json!({ "url": url }),
            PerceptionError::Navigation,
        )
        .await
    }

    async fn extract(&self, rule: &str) -> Result<String, PerceptionError> {
        let response: ExtractResponse = self
            .post_json(
                EXTRACT_ENDPOINT,
                &serde_json::json!({ "instruction": rule }),
                PerceptionError::Extraction,
                "{}",
            )
            .await?;
        Ok(response.extraction)
    }

    async fn act(&self, instruction: &str) -> Result<(), PerceptionError> {
        self.post_ack(
            ACT_ENDPOINT,
            &serde_json::json!({ "action": instruction }),
            PerceptionError::Action,
        )
        .await
    }

    async fn observe(&self, query: &str) -> Result<Vec<ObservedElement>, PerceptionError> {
        self.post_json(
            OBSERVE_ENDPOINT,
            &serde_json::json!({ "instruction": query }),
            PerceptionError::Observation,
            "[]",
        )
        .await
    }

    async fn screenshot(&self, path: &Path) -> Result<(), PerceptionError> {
        self.post_ack(
            SCREENSHOT_ENDPOINT,
            &serde_json::json!({ "path": path.to_string_lossy() }),
            PerceptionError::Screenshot,
        )
        .await
    }

    async fn set_input_files(&self, target: &FileTarget, path: &Path) -> Result<(), PerceptionError> {
        let request = SetInputFilesRequest {
            target,
            path: path.to_string_lossy().to_string(),
        };
        self.post_ack(SET_INPUT_FILES_ENDPOINT, &request, PerceptionError::Upload)
            .await
    }

    async fn file_inputs(&self) -> Result<Vec<FileInput>, PerceptionError> {
        let url = format!("{}{}", self.base_url, FILE_INPUTS_ENDPOINT);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PerceptionError::Observation(format!(
                "{} returned {}: {}",
                FILE_INPUTS_ENDPOINT, status, body
            )));
        }

        response
            .json::<Vec<FileInput>>()
            .await
            .map_err(|e| PerceptionError::Transport(format!("Failed to parse file inputs: {}", e)))
    }
}
