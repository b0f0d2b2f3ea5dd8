//! Captured traffic intake
//!
//! The Azure portal bundles its ARM calls into POSTs against the `/batch`
//! endpoint. This module unpacks those envelopes, either from a raw batch
//! body or from a browser HAR export, into [`CapturedRequest`]s.
//!
//! - [`har`] - Pulls batch bodies out of HAR files

mod har;

pub use har::from_har;

use crate::azure::RawRequest;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a portal `/batch` call.
///
/// Inner requests stay as raw JSON until unpacked so that one malformed
/// record is skipped instead of rejecting the whole batch.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchEnvelope {
    #[serde(default)]
    pub requests: Vec<Value>,
}

/// A request pulled out of captured traffic
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedRequest {
    pub request: RawRequest,
    /// When the enclosing batch call was sent, if the capture recorded it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,
}

/// URL prefix of the batch endpoint under `endpoint`
pub fn batch_prefix(endpoint: &str) -> String {
    format!("{}/batch", endpoint.trim_end_matches('/'))
}

/// Parse a batch envelope body into normalized requests
pub fn from_envelope(text: &str, endpoint: &str) -> Result<Vec<CapturedRequest>> {
    let envelope: BatchEnvelope = serde_json::from_str(text)?;
    Ok(unpack(envelope, endpoint, None))
}

/// Load captured requests from either a HAR export or a batch envelope.
///
/// Documents with a top-level `log` object are treated as HAR.
pub fn load(text: &str, endpoint: &str) -> Result<Vec<CapturedRequest>> {
    let document: Value = serde_json::from_str(text)?;

    if document.get("log").is_some_and(Value::is_object) {
        tracing::debug!("input looks like a HAR export");
        har::from_har_value(document, endpoint)
    } else {
        tracing::debug!("input looks like a batch envelope");
        let envelope: BatchEnvelope = serde_json::from_value(document)?;
        Ok(unpack(envelope, endpoint, None))
    }
}

fn unpack(
    envelope: BatchEnvelope,
    endpoint: &str,
    captured_at: Option<DateTime<Utc>>,
) -> Vec<CapturedRequest> {
    envelope
        .requests
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<RawRequest>(value) {
            Ok(request) => Some(request),
            Err(e) => {
                tracing::warn!("skipping malformed batch request #{}: {}", index + 1, e);
                None
            }
        })
        .map(|request| {
            let request = normalize(request, endpoint);
            tracing::info!(
                "captured request: {} {} {}",
                request.http_method,
                request.command_name,
                request.url
            );
            CapturedRequest {
                request,
                captured_at,
            }
        })
        .collect()
}

/// Strip the management host from the URL and a trailing `.` from the command name
pub fn normalize(mut request: RawRequest, endpoint: &str) -> RawRequest {
    let host = endpoint.trim_end_matches('/');
    if let Some(path) = request.url.strip_prefix(host) {
        request.url = path.to_string();
    }
    if let Some(command_name) = request.command_name.strip_suffix('.') {
        request.command_name = command_name.to_string();
    }
    request
}
