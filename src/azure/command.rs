//! Request classification
//!
//! A captured request is either a plain ARM resource operation or a
//! Resource Graph query (a POST whose body carries KQL).

use super::request::RawRequest;
use super::resource_id::ResourceIdentity;
use super::url::{UrlComponents, API_VERSION_PARAM};
use crate::error::{Result, XrayError};
use serde::Serialize;
use serde_json::Value;

/// Provider namespace that serves KQL queries
pub const RESOURCE_GRAPH_PROVIDER: &str = "Microsoft.ResourceGraph";

/// A parsed ARM resource operation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceCommand {
    pub http_method: String,
    pub name: String,
    pub command_name: String,
    pub resource_id: ResourceIdentity,
    pub api_version: String,
    /// Query parameters other than `api-version`, in original order
    pub query_params: Vec<(String, String)>,
    #[serde(skip)]
    pub api_version_position: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    pub path: String,
    /// Scheme and authority the request was addressed to
    pub origin: String,
}

impl ResourceCommand {
    /// True when the request carries query parameters besides `api-version`
    pub fn has_extra_params(&self) -> bool {
        !self.query_params.is_empty()
    }

    /// GET is implied by `Invoke-AzRestMethod` and never needs spelling out
    pub fn uses_default_method(&self) -> bool {
        self.http_method.eq_ignore_ascii_case("GET")
    }

    /// Body to send, if any
    pub fn payload(&self) -> Option<&Value> {
        self.content.as_ref().filter(|content| !content.is_null())
    }

    /// Full request URI with `api-version` back in its original position.
    ///
    /// Keys are written as captured; only values are percent-encoded.
    pub fn request_uri(&self) -> String {
        let mut pairs = self.query_params.clone();
        let position = self.api_version_position.min(pairs.len());
        pairs.insert(
            position,
            (API_VERSION_PARAM.to_string(), self.api_version.clone()),
        );

        let query_parts: Vec<String> = pairs
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect();

        format!("{}{}?{}", self.origin, self.path, query_parts.join("&"))
    }
}

/// A request after classification
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParsedCommand {
    /// Generic ARM operation
    Resource(ResourceCommand),
    /// KQL query sent to the Resource Graph provider
    ResourceGraphQuery {
        #[serde(flatten)]
        command: ResourceCommand,
        query: String,
    },
}

impl ParsedCommand {
    pub fn command(&self) -> &ResourceCommand {
        match self {
            Self::Resource(command) => command,
            Self::ResourceGraphQuery { command, .. } => command,
        }
    }

    pub fn resource_id(&self) -> &ResourceIdentity {
        &self.command().resource_id
    }

    /// Raw KQL text for Resource Graph queries
    pub fn query(&self) -> Option<&str> {
        match self {
            Self::Resource(_) => None,
            Self::ResourceGraphQuery { query, .. } => Some(query),
        }
    }

    pub fn is_query(&self) -> bool {
        matches!(self, Self::ResourceGraphQuery { .. })
    }
}

/// Classify a request whose URL has already been decomposed
pub fn classify(
    raw: &RawRequest,
    components: UrlComponents,
    resource_id: ResourceIdentity,
) -> Result<ParsedCommand> {
    let is_graph_query = raw.http_method.eq_ignore_ascii_case("POST")
        && resource_id
            .provider
            .as_deref()
            .is_some_and(|provider| provider.eq_ignore_ascii_case(RESOURCE_GRAPH_PROVIDER));

    let command = ResourceCommand {
        http_method: raw.http_method.clone(),
        name: raw.name.clone(),
        command_name: raw.command_name.clone(),
        resource_id,
        api_version: components.api_version,
        query_params: components.params,
        api_version_position: components.api_version_position,
        content: raw.content.clone(),
        path: components.path,
        origin: components.origin,
    };

    if !is_graph_query {
        return Ok(ParsedCommand::Resource(command));
    }

    let Some(query) = raw
        .content
        .as_ref()
        .and_then(|content| content.get("query"))
        .and_then(Value::as_str)
    else {
        return Err(XrayError::MissingQueryBody);
    };

    Ok(ParsedCommand::ResourceGraphQuery {
        query: query.to_string(),
        command,
    })
}
