//! Request URL decomposition
//!
//! Splits a captured request URL into its path, its mandatory
//! `api-version` and the remaining query parameters.

use crate::error::{Result, XrayError};
use url::Url;

/// Base URL that root-relative request paths are resolved against
pub const MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";

/// Query parameter every ARM call must carry
pub const API_VERSION_PARAM: &str = "api-version";

/// Parts of a request URL needed by the rest of the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlComponents {
    pub api_version: String,
    /// Percent-encoded path, without query string
    pub path: String,
    /// Decoded query parameters other than `api-version`, in original order
    pub params: Vec<(String, String)>,
    /// Index in `params` where `api-version` originally sat
    pub api_version_position: usize,
    /// Scheme and authority, e.g. `https://management.azure.com`
    pub origin: String,
}

/// Extract URL components, resolving relative paths against [`MANAGEMENT_ENDPOINT`]
pub fn extract(raw_url: &str) -> Result<UrlComponents> {
    extract_with_base(raw_url, MANAGEMENT_ENDPOINT)
}

/// Extract URL components, resolving relative paths against `base`
pub fn extract_with_base(raw_url: &str, base: &str) -> Result<UrlComponents> {
    let url = resolve(raw_url, base)?;

    let mut api_version: Option<(usize, String)> = None;
    let mut params: Vec<(String, String)> = Vec::new();

    for (key, value) in url.query_pairs() {
        if key == API_VERSION_PARAM {
            if api_version.is_none() {
                api_version = Some((params.len(), value.into_owned()));
            }
            continue;
        }
        params.push((key.into_owned(), value.into_owned()));
    }

    let Some((api_version_position, api_version)) =
        api_version.filter(|(_, version)| !version.is_empty())
    else {
        return Err(XrayError::MissingApiVersion {
            url: raw_url.to_string(),
        });
    };

    Ok(UrlComponents {
        api_version,
        path: url.path().to_string(),
        params,
        api_version_position,
        origin: url.origin().ascii_serialization(),
    })
}

fn resolve(raw_url: &str, base: &str) -> Result<Url> {
    let parsed = match Url::parse(raw_url) {
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            // A leading `//` would otherwise be read as a host
            let rooted = format!("/{}", raw_url.trim_start_matches('/'));
            Url::parse(base).and_then(|base| base.join(&rooted))
        }
        other => other,
    };

    parsed.map_err(|source| XrayError::InvalidUrl {
        url: raw_url.to_string(),
        source,
    })
}
