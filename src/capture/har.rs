//! HAR parsing
//!
//! Reads a browser HAR export and keeps only the portal's batch calls.
//! Entries that cannot be decoded are logged and skipped so one odd
//! recording does not hide the rest of the session.

use super::{batch_prefix, unpack, BatchEnvelope, CapturedRequest};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct HarFile {
    log: HarLog,
}

#[derive(Debug, Deserialize)]
struct HarLog {
    #[serde(default)]
    entries: Vec<HarEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HarEntry {
    #[serde(default)]
    started_date_time: Option<String>,
    request: HarRequest,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HarRequest {
    url: String,
    #[serde(default)]
    post_data: Option<HarPostData>,
}

#[derive(Debug, Deserialize)]
struct HarPostData {
    #[serde(default)]
    text: Option<String>,
}

/// Extract batched ARM requests from HAR text
pub fn from_har(text: &str, endpoint: &str) -> Result<Vec<CapturedRequest>> {
    let har: HarFile = serde_json::from_str(text)?;
    Ok(collect(har, endpoint))
}

pub(super) fn from_har_value(document: Value, endpoint: &str) -> Result<Vec<CapturedRequest>> {
    let har: HarFile = serde_json::from_value(document)?;
    Ok(collect(har, endpoint))
}

fn collect(har: HarFile, endpoint: &str) -> Vec<CapturedRequest> {
    let prefix = batch_prefix(endpoint);
    let mut captured = Vec::new();

    for entry in har.log.entries {
        if !entry.request.url.starts_with(&prefix) {
            continue;
        }

        let Some(body) = entry.request.post_data.and_then(|data| data.text) else {
            tracing::warn!(
                "batch request detected but no requests found: {}",
                entry.request.url
            );
            continue;
        };

        let envelope: BatchEnvelope = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!("skipping unreadable batch body: {}", e);
                continue;
            }
        };

        let captured_at = entry
            .started_date_time
            .as_deref()
            .and_then(parse_timestamp);
        captured.extend(unpack(envelope, endpoint, captured_at));
    }

    tracing::info!("extracted {} requests from HAR", captured.len());
    captured
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|timestamp| timestamp.with_timezone(&Utc))
}
