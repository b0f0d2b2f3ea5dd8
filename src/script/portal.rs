//! Azure portal deep links

/// Resource Graph Explorer blade; the query is appended percent-encoded
const ARG_QUERY_BLADE_URL: &str =
    "https://portal.azure.com/?feature.customportal=false#blade/HubsExtension/ArgQueryBlade/query/";

/// Link that opens `query` in the portal's Resource Graph Explorer
pub fn portal_query_url(query: &str) -> String {
    format!("{}{}", ARG_QUERY_BLADE_URL, urlencoding::encode(query))
}
