//! Request pipeline
//!
//! Drives each captured request through extract → identify → classify →
//! render. Requests are independent: a failure is logged and recorded
//! against that request only.

use crate::azure::{self, ParsedCommand, RawRequest, MANAGEMENT_ENDPOINT};
use crate::capture::CapturedRequest;
use crate::error::Result;
use crate::script;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Everything produced for one successfully parsed request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rendered {
    pub command: ParsedCommand,
    pub script: String,
    /// Formatted KQL, query commands only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Resource Graph Explorer link, query commands only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portal_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Rendered(Rendered),
    Failed { error: String },
}

/// Result of processing one captured request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    /// 1-based position in capture order
    pub id: usize,
    pub http_method: String,
    pub command_name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl Outcome {
    pub fn rendered(&self) -> Option<&Rendered> {
        match &self.status {
            OutcomeStatus::Rendered(rendered) => Some(rendered),
            OutcomeStatus::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, OutcomeStatus::Failed { .. })
    }
}

/// Request-to-script pipeline bound to a management endpoint
#[derive(Debug, Clone)]
pub struct Pipeline {
    endpoint: String,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(MANAGEMENT_ENDPOINT)
    }
}

impl Pipeline {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
        }
    }

    /// Parse and render a single request
    pub fn process(&self, raw: &RawRequest) -> Result<Rendered> {
        let command = azure::parse_request(raw, &self.endpoint)?;
        let script = script::generate(&command);
        let query = script::render_query(&command);
        let portal_url = query.as_deref().map(script::portal_query_url);

        tracing::debug!(
            "rendered {} {} as {}",
            raw.http_method,
            raw.url,
            if command.is_query() { "graph query" } else { "resource command" }
        );

        Ok(Rendered {
            command,
            script,
            query,
            portal_url,
        })
    }

    /// Process every request in capture order, isolating failures
    pub fn process_all(&self, requests: &[CapturedRequest]) -> Vec<Outcome> {
        let outcomes: Vec<Outcome> = requests
            .iter()
            .enumerate()
            .map(|(index, captured)| {
                let raw = &captured.request;
                let status = match self.process(raw) {
                    Ok(rendered) => OutcomeStatus::Rendered(rendered),
                    Err(e) => {
                        tracing::warn!(
                            "skipping request #{} {} {}: {}",
                            index + 1,
                            raw.http_method,
                            raw.url,
                            e
                        );
                        OutcomeStatus::Failed {
                            error: e.to_string(),
                        }
                    }
                };

                Outcome {
                    id: index + 1,
                    http_method: raw.http_method.clone(),
                    command_name: raw.command_name.clone(),
                    url: raw.url.clone(),
                    captured_at: captured.captured_at,
                    status,
                }
            })
            .collect();

        let failed = outcomes.iter().filter(|outcome| outcome.is_failed()).count();
        tracing::info!(
            "processed {} requests: {} rendered, {} failed",
            outcomes.len(),
            outcomes.len() - failed,
            failed
        );

        outcomes
    }
}
