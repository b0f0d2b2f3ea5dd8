//! Errors raised while turning a captured request into a script.
//!
//! Every variant describes malformed input for a single request. Callers
//! log them and move on to the next request.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum XrayError {
    #[error("no api-version found in URL {url}; this parameter is required")]
    MissingApiVersion { url: String },

    #[error("invalid Azure resource path {path} (doesn't begin with /subscriptions or /providers)")]
    InvalidResourcePath { path: String },

    #[error("detected a Resource Graph query, but the request body has no string `query` field")]
    MissingQueryBody,

    #[error("cannot parse URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for request parsing operations
pub type Result<T> = std::result::Result<T, XrayError>;
