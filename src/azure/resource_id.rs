//! Resource path parsing
//!
//! Walks the `/`-separated segments of an ARM path and builds a
//! [`ResourceIdentity`]. Extension resources (a second `providers/...`
//! group, e.g. diagnostic settings on a VM) carry the resource they hang
//! off as their `parent`.

use crate::error::{Result, XrayError};
use serde::Serialize;
use std::borrow::Cow;

/// Provider reported for the generic `/resources` listing endpoint
pub const RESOURCES_PROVIDER: &str = "Microsoft.Resources";

/// Structured address of an ARM resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceIdentity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Child type/name pairs below `resource_type/name`, e.g. `databases/db1`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sub_resources: Vec<SubResource>,
    /// Resource an extension resource is attached to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Box<ResourceIdentity>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubResource {
    pub resource_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ResourceIdentity {
    /// Resource types from the top-level type down through sub-resources
    pub fn resource_types(&self) -> Vec<&str> {
        self.resource_type
            .iter()
            .map(String::as_str)
            .chain(self.sub_resources.iter().map(|sub| sub.resource_type.as_str()))
            .collect()
    }

    /// Resource names matching [`Self::resource_types`]; the last may be missing
    pub fn names(&self) -> Vec<&str> {
        self.name
            .iter()
            .map(String::as_str)
            .chain(self.sub_resources.iter().filter_map(|sub| sub.name.as_deref()))
            .collect()
    }
}

/// Parse an ARM resource path (query string allowed) into a [`ResourceIdentity`]
pub fn parse(path: &str) -> Result<ResourceIdentity> {
    let without_query = path.split('?').next().unwrap_or_default();
    let segments: Vec<String> = without_query
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(decode_segment)
        .collect();

    match segments.first() {
        // Location-scoped calls carry nothing worth decomposing
        Some(first) if is_keyword(first, "locations") => Ok(ResourceIdentity {
            provider: Some("locations".to_string()),
            ..Default::default()
        }),
        Some(first) if is_keyword(first, "subscriptions") || is_keyword(first, "providers") => {
            Ok(scan(&segments))
        }
        _ => {
            tracing::debug!("rejecting resource path: {}", path);
            Err(XrayError::InvalidResourcePath {
                path: path.to_string(),
            })
        }
    }
}

fn scan(segments: &[String]) -> ResourceIdentity {
    let mut identity = ResourceIdentity::default();
    let mut index = 0;

    while index < segments.len() {
        match segments[index].to_ascii_lowercase().as_str() {
            "subscriptions" => {
                identity.subscription_id = segments.get(index + 1).cloned();
                index += 2;
            }
            "resourcegroups" => {
                identity.resource_group = segments.get(index + 1).cloned();
                index += 2;
            }
            "resources" => {
                identity.provider = Some(RESOURCES_PROVIDER.to_string());
                identity.resource_type = Some("resources".to_string());
                index += 1;
            }
            "providers" => {
                parse_provider_group(&mut identity, segments, index);
                break;
            }
            _ => index += 1,
        }
    }

    identity
}

/// Fill provider/type/name from the segments after `segments[start]` (a `providers` keyword).
///
/// Only the second `providers` occurrence splits parent from child.
fn parse_provider_group(identity: &mut ResourceIdentity, segments: &[String], start: usize) {
    let nested_at = segments[start + 1..]
        .iter()
        .position(|segment| is_keyword(segment, "providers"))
        .map(|offset| start + 1 + offset);

    let own = match nested_at {
        Some(nested_at) => {
            identity.parent = Some(Box::new(scan(&segments[..nested_at])));
            &segments[nested_at + 1..]
        }
        None => &segments[start + 1..],
    };

    identity.provider = own.first().cloned();
    identity.resource_type = own.get(1).cloned();
    identity.name = own.get(2).cloned();
    identity.sub_resources = own
        .get(3..)
        .unwrap_or_default()
        .chunks(2)
        .map(|pair| SubResource {
            resource_type: pair[0].clone(),
            name: pair.get(1).cloned(),
        })
        .collect();
}

fn is_keyword(segment: &str, keyword: &str) -> bool {
    segment.eq_ignore_ascii_case(keyword)
}

fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| segment.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_resource_path() {
        let id = parse(
            "/subscriptions/abc/resourceGroups/rg1/providers/Microsoft.Compute/virtualMachines/vm1",
        )
        .unwrap();

        assert_eq!(id.subscription_id.as_deref(), Some("abc"));
        assert_eq!(id.resource_group.as_deref(), Some("rg1"));
        assert_eq!(id.provider.as_deref(), Some("Microsoft.Compute"));
        assert_eq!(id.resource_type.as_deref(), Some("virtualMachines"));
        assert_eq!(id.name.as_deref(), Some("vm1"));
        assert!(id.parent.is_none());
        assert!(id.sub_resources.is_empty());
    }

    #[test]
    fn test_subscription_only() {
        let id = parse("/subscriptions/abc").unwrap();
        assert_eq!(id.subscription_id.as_deref(), Some("abc"));
        assert!(id.provider.is_none());
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let id = parse("/Subscriptions/abc/RESOURCEGROUPS/rg1/Providers/Microsoft.Web/sites").unwrap();
        assert_eq!(id.subscription_id.as_deref(), Some("abc"));
        assert_eq!(id.resource_group.as_deref(), Some("rg1"));
        assert_eq!(id.provider.as_deref(), Some("Microsoft.Web"));
        assert_eq!(id.resource_type.as_deref(), Some("sites"));
        assert!(id.name.is_none());
    }

    #[test]
    fn test_provider_list_call() {
        let id = parse("/providers/Microsoft.Compute").unwrap();
        assert_eq!(id.provider.as_deref(), Some("Microsoft.Compute"));
        assert!(id.resource_type.is_none());
        assert!(id.subscription_id.is_none());
    }

    #[test]
    fn test_nested_extension_resource() {
        let id = parse(
            "/subscriptions/abc/resourceGroups/rg1/providers/Microsoft.Compute/virtualMachines/vm1/providers/Microsoft.Insights/diagnosticSettings/ds1",
        )
        .unwrap();

        assert_eq!(id.provider.as_deref(), Some("Microsoft.Insights"));
        assert_eq!(id.resource_type.as_deref(), Some("diagnosticSettings"));
        assert_eq!(id.name.as_deref(), Some("ds1"));
        assert_eq!(id.subscription_id.as_deref(), Some("abc"));

        let parent = id.parent.expect("parent identity");
        assert_eq!(parent.provider.as_deref(), Some("Microsoft.Compute"));
        assert_eq!(parent.resource_type.as_deref(), Some("virtualMachines"));
        assert_eq!(parent.name.as_deref(), Some("vm1"));
        assert_eq!(parent.resource_group.as_deref(), Some("rg1"));
        assert!(parent.parent.is_none());
    }

    #[test]
    fn test_second_providers_occurrence_splits_parent() {
        let id = parse(
            "/providers/A.One/t1/n1/providers/B.Two/t2/n2/providers/C.Three/t3/n3",
        )
        .unwrap();

        assert_eq!(id.provider.as_deref(), Some("B.Two"));
        assert_eq!(id.resource_type.as_deref(), Some("t2"));
        assert_eq!(id.name.as_deref(), Some("n2"));

        let parent = id.parent.as_ref().unwrap();
        assert_eq!(parent.provider.as_deref(), Some("A.One"));
        assert_eq!(parent.name.as_deref(), Some("n1"));
        assert!(parent.parent.is_none());
    }

    #[test]
    fn test_child_resources_become_sub_resources() {
        let id = parse(
            "/subscriptions/abc/resourceGroups/rg1/providers/Microsoft.Sql/servers/s1/databases/db1/backups",
        )
        .unwrap();

        assert_eq!(id.resource_types(), vec!["servers", "databases", "backups"]);
        assert_eq!(id.names(), vec!["s1", "db1"]);
    }

    #[test]
    fn test_generic_resources_listing() {
        let id = parse("/subscriptions/abc/resources").unwrap();
        assert_eq!(id.provider.as_deref(), Some(RESOURCES_PROVIDER));
        assert_eq!(id.resource_type.as_deref(), Some("resources"));

        let id = parse("/subscriptions/abc/resourceGroups/rg1/resources").unwrap();
        assert_eq!(id.resource_group.as_deref(), Some("rg1"));
        assert_eq!(id.provider.as_deref(), Some(RESOURCES_PROVIDER));
    }

    #[test]
    fn test_resource_group_named_resources_is_not_a_keyword() {
        let id = parse("/subscriptions/abc/resourceGroups/resources").unwrap();
        assert_eq!(id.resource_group.as_deref(), Some("resources"));
        assert!(id.provider.is_none());
    }

    #[test]
    fn test_locations_special_case() {
        let id = parse("/locations/westeurope/operationResults/xyz").unwrap();
        assert_eq!(
            id,
            ResourceIdentity {
                provider: Some("locations".to_string()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_unknown_segments_are_skipped() {
        let id = parse("/subscriptions/abc/locations/westeurope/usages").unwrap();
        assert_eq!(id.subscription_id.as_deref(), Some("abc"));
        assert!(id.provider.is_none());
    }

    #[test]
    fn test_trailing_slash_and_empty_segments() {
        let id = parse("//subscriptions//abc/resourceGroups/rg1/").unwrap();
        assert_eq!(id.subscription_id.as_deref(), Some("abc"));
        assert_eq!(id.resource_group.as_deref(), Some("rg1"));
    }

    #[test]
    fn test_query_string_is_ignored() {
        let id = parse("/subscriptions/abc/resourceGroups/rg1?api-version=2021-04-01").unwrap();
        assert_eq!(id.resource_group.as_deref(), Some("rg1"));
    }

    #[test]
    fn test_segments_are_percent_decoded() {
        let id = parse("/subscriptions/abc/resourceGroups/my%20rg").unwrap();
        assert_eq!(id.resource_group.as_deref(), Some("my rg"));
    }

    #[test]
    fn test_invalid_root_is_rejected() {
        for path in ["/tenants", "", "/", "/batch"] {
            let err = parse(path).unwrap_err();
            assert!(
                matches!(err, XrayError::InvalidResourcePath { .. }),
                "{path} should be rejected"
            );
        }
    }
}
