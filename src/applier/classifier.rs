// src/applier/classifier.rs
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{ApplyError, JobApplier};
use crate::rules;
use crate::types::{PageClassification, PageType};

impl JobApplier {
    /// Classify the current page, translating it first when the engine says it is not in English.
    pub async fn classify(&self) -> Result<PageClassification, ApplyError> {
        let classification = self.extract_classification().await?;

        if !classification.needs_translation() {
            return Ok(classification);
        }

        info!("Non-English content detected, attempting translation...");
        if let Err(e) = self.port.act(rules::TRANSLATE_PAGE_INSTRUCTION).await {
            warn!("Translation failed, continuing with original content: {}", e);
            return Ok(classification);
        }

        match self.extract_classification().await {
            Ok(translated) => {
                info!(
                    page_type = %translated.page_type,
                    "Post-translation analysis: {}", translated.details
                );
                Ok(translated)
            }
            Err(e) => {
                warn!("Re-analysis after translation failed, keeping original: {}", e);
                Ok(classification)
            }
        }
    }

    async fn extract_classification(&self) -> Result<PageClassification, ApplyError> {
        let raw = self.port.extract(rules::CLASSIFY_PAGE_RULE).await?;
        debug!("Raw page classification: {}", raw);
        parse_classification(&raw)
    }
}

/// Turn untrusted extraction text into a classification.
///
/// Text that holds no JSON object at all is an error. An object with a
/// missing or unknown `pageType` is a schema violation and becomes `Other`.
pub fn parse_classification(raw: &str) -> Result<PageClassification, ApplyError> {
    let object = parse_json_object(raw).ok_or_else(|| ApplyError::ClassificationParse {
        reason: "extraction is not a JSON object".to_string(),
        raw: raw.to_string(),
    })?;

    let details = object
        .get("details")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let page_type = match object
        .get("pageType")
        .or_else(|| object.get("page_type"))
        .and_then(Value::as_str)
    {
        Some(label) => PageType::from_label(label),
        None => {
            warn!("Classification without pageType, treating page as other: {}", raw);
            PageType::Other
        }
    };

    Ok(PageClassification::new(page_type, details))
}

fn parse_json_object(raw: &str) -> Option<serde_json::Map<String, Value>> {
    let text = strip_code_fence(raw.trim());

    if let Some(object) = as_object(text) {
        return Some(object);
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    let sliced = &text[start..=end];

    as_object(sliced).or_else(|| as_object(&relax_js_object(sliced)))
}

fn as_object(text: &str) -> Option<serde_json::Map<String, Value>> {
    match serde_json::from_str::<Value>(text).ok()? {
        Value::Object(map) => Some(map),
        // double-encoded payloads
        Value::String(inner) => match serde_json::from_str::<Value>(&inner).ok()? {
            Value::Object(map) => Some(map),
            _ => None,
        },
        _ => None,
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Rewrite a JavaScript-style object literal (`{pageType: 'x'}`) as JSON.
fn relax_js_object(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 16);
    let mut expect_key = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' | '\'' => {
                let quote = c;
                out.push('"');
                i += 1;
                while i < chars.len() && chars[i] != quote {
                    match chars[i] {
                        '\\' if i + 1 < chars.len() => {
                            if chars[i + 1] == '\'' {
                                out.push('\'');
                            } else {
                                out.push('\\');
                                out.push(chars[i + 1]);
                            }
                            i += 2;
                            continue;
                        }
                        '"' => out.push_str("\\\""),
                        other => out.push(other),
                    }
                    i += 1;
                }
                out.push('"');
                i += 1;
                expect_key = false;
            }
            '{' | ',' => {
                out.push(c);
                expect_key = true;
                i += 1;
            }
            c if expect_key && (c.is_alphabetic() || c == '_') => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let ident: String = chars[start..i].iter().collect();

                let mut j = i;
                while j < chars.len() && chars[j].is_whitespace() {
                    j += 1;
                }
                if j < chars.len() && chars[j] == ':' {
                    out.push('"');
                    out.push_str(&ident);
                    out.push('"');
                } else {
                    out.push_str(&ident);
                }
                expect_key = false;
            }
            c => {
                if !c.is_whitespace() {
                    expect_key = false;
                }
                out.push(c);
                i += 1;
            }
        }
    }

    out
}
