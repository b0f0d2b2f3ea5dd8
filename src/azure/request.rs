//! Captured request records
//!
//! One [`RawRequest`] per logical ARM call found in a batch envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single ARM call as captured from the portal's batch traffic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireRequest", rename_all = "camelCase")]
pub struct RawRequest {
    pub http_method: String,
    /// Request name assigned by the portal (often a GUID)
    pub name: String,
    /// Portal command that issued the call, e.g. `Microsoft_Azure_Compute.GetVm`
    pub command_name: String,
    /// Absolute URL or root-relative path, including the query string
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
}

impl RawRequest {
    pub fn new(http_method: &str, url: &str) -> Self {
        Self {
            http_method: http_method.to_string(),
            name: String::new(),
            command_name: String::new(),
            url: url.to_string(),
            content: None,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_command_name(mut self, command_name: &str) -> Self {
        self.command_name = command_name.to_string();
        self
    }

    pub fn with_content(mut self, content: Value) -> Self {
        self.content = Some(content);
        self
    }
}

/// Shape of a request inside the portal's batch body.
///
/// The portal nests the command name under `requestHeaderDetails`; a flat
/// `commandName` is accepted too so hand-written envelopes stay short.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest {
    http_method: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    command_name: Option<String>,
    #[serde(default)]
    request_header_details: Option<HeaderDetails>,
    url: String,
    #[serde(default)]
    content: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HeaderDetails {
    #[serde(default)]
    command_name: Option<String>,
}

impl From<WireRequest> for RawRequest {
    fn from(wire: WireRequest) -> Self {
        let command_name = wire
            .request_header_details
            .and_then(|details| details.command_name)
            .or(wire.command_name)
            .unwrap_or_default();

        Self {
            http_method: wire.http_method,
            name: wire.name,
            command_name,
            url: wire.url,
            content: wire.content.filter(|content| !content.is_null()),
        }
    }
}
