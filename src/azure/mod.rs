//! Azure Resource Manager request parsing
//!
//! Turns a captured [`RawRequest`] into a typed [`ParsedCommand`].
//!
//! # Module Structure
//!
//! - [`request`] - Captured request records as they appear in a batch envelope
//! - [`url`] - Splits a request URL into path, api-version and query parameters
//! - [`resource_id`] - Decomposes a resource path into a [`ResourceIdentity`]
//! - [`command`] - Classifies a request as a resource command or a Resource Graph query
//!
//! # Example
//!
//! ```ignore
//! use azxray::azure::{parse_request, RawRequest, MANAGEMENT_ENDPOINT};
//!
//! let raw = RawRequest::new("GET", "/subscriptions/abc?api-version=2022-12-01");
//! let command = parse_request(&raw, MANAGEMENT_ENDPOINT)?;
//! assert_eq!(command.resource_id().subscription_id.as_deref(), Some("abc"));
//! ```

pub mod command;
pub mod request;
pub mod resource_id;
pub mod url;

pub use command::{classify, ParsedCommand, ResourceCommand, RESOURCE_GRAPH_PROVIDER};
pub use request::RawRequest;
pub use resource_id::{ResourceIdentity, SubResource};
pub use self::url::{UrlComponents, API_VERSION_PARAM, MANAGEMENT_ENDPOINT};

use crate::error::Result;

/// Run the full parse of one captured request: extract, identify, classify.
pub fn parse_request(raw: &RawRequest, endpoint: &str) -> Result<ParsedCommand> {
    let components = self::url::extract_with_base(&raw.url, endpoint)?;
    tracing::debug!(
        "extracted api-version={} path={} extra_params={}",
        components.api_version,
        components.path,
        components.params.len()
    );

    let resource_id = resource_id::parse(&components.path)?;
    tracing::debug!("resource identity: {:?}", resource_id);

    classify(raw, components, resource_id)
}
