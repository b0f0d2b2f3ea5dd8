//! Output rendering
//!
//! Formats pipeline outcomes for the terminal or for other tools.

use crate::error::Result;
use crate::pipeline::{Outcome, OutcomeStatus};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How outcomes are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// PowerShell scripts with comment headers
    #[default]
    Text,
    Json,
    Yaml,
}

/// Output switches
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    /// Only emit formatted KQL for Resource Graph queries
    pub query_only: bool,
    /// Add Resource Graph Explorer links to text output
    pub portal_links: bool,
}

/// Render outcomes in the requested format
pub fn render(outcomes: &[Outcome], format: OutputFormat, options: ReportOptions) -> Result<String> {
    let selected: Vec<&Outcome> = outcomes
        .iter()
        .filter(|outcome| !options.query_only || has_query(outcome))
        .collect();

    match format {
        OutputFormat::Text => Ok(render_text(&selected, options)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&selected)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(&selected)?),
    }
}

fn has_query(outcome: &Outcome) -> bool {
    outcome
        .rendered()
        .is_some_and(|rendered| rendered.query.is_some())
}

fn render_text(outcomes: &[&Outcome], options: ReportOptions) -> String {
    let blocks: Vec<String> = outcomes
        .iter()
        .map(|outcome| {
            if options.query_only {
                query_block(outcome)
            } else {
                script_block(outcome, options.portal_links)
            }
        })
        .collect();

    blocks.join("\n\n")
}

fn script_block(outcome: &Outcome, portal_links: bool) -> String {
    let mut block = format!(
        "# [{}] {} {}\n# {}\n",
        outcome.id, outcome.http_method, outcome.command_name, outcome.url
    );

    match &outcome.status {
        OutcomeStatus::Rendered(rendered) => {
            block.push_str(&rendered.script);
            if let Some(url) = rendered.portal_url.as_deref().filter(|_| portal_links) {
                block.push_str(&format!("\n# Portal: {}", url));
            }
        }
        OutcomeStatus::Failed { error } => {
            block.push_str(&format!("# skipped: {}", error));
        }
    }

    block
}

fn query_block(outcome: &Outcome) -> String {
    let query = outcome
        .rendered()
        .and_then(|rendered| rendered.query.as_deref())
        .unwrap_or_default();
    format!("// [{}] {}\n{}", outcome.id, outcome.command_name, query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::azure::RawRequest;
    use crate::capture::CapturedRequest;
    use crate::pipeline::Pipeline;
    use serde_json::json;

    fn sample_outcomes() -> Vec<Outcome> {
        let requests = [
            RawRequest::new("GET", "/subscriptions/abc?api-version=2022-12-01")
                .with_command_name("Browse"),
            RawRequest::new(
                "POST",
                "/providers/Microsoft.ResourceGraph/resources?api-version=2021-03-01",
            )
            .with_command_name("ArgQuery")
            .with_content(json!({ "query": "Resources | take 1" })),
            RawRequest::new("GET", "/tenants?api-version=2020-01-01").with_command_name("Tenants"),
        ];

        let captured: Vec<CapturedRequest> = requests
            .into_iter()
            .map(|request| CapturedRequest {
                request,
                captured_at: None,
            })
            .collect();

        Pipeline::default().process_all(&captured)
    }

    #[test]
    fn test_text_report() {
        let text = render(&sample_outcomes(), OutputFormat::Text, ReportOptions::default()).unwrap();

        assert!(text.starts_with(
            "# [1] GET Browse\n# /subscriptions/abc?api-version=2022-12-01\n$armParams = @{\n"
        ));
        assert!(text.contains("# [2] POST ArgQuery\n"));
        assert!(text.contains("Search-AzGraph -Query $query"));
        assert!(text.contains("# [3] GET Tenants\n# /tenants?api-version=2020-01-01\n# skipped: "));
        assert!(!text.contains("# Portal:"));
    }

    #[test]
    fn test_text_report_with_portal_links() {
        let options = ReportOptions {
            portal_links: true,
            ..Default::default()
        };
        let text = render(&sample_outcomes(), OutputFormat::Text, options).unwrap();

        assert_eq!(text.matches("# Portal: https://portal.azure.com/").count(), 1);
    }

    #[test]
    fn test_query_only_text() {
        let options = ReportOptions {
            query_only: true,
            ..Default::default()
        };
        let text = render(&sample_outcomes(), OutputFormat::Text, options).unwrap();

        assert_eq!(text, "// [2] ArgQuery\nResources\n| take 1");
    }

    #[test]
    fn test_json_report() {
        let text = render(&sample_outcomes(), OutputFormat::Json, ReportOptions::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        let entries = value.as_array().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0]["status"], "rendered");
        assert_eq!(entries[0]["command"]["kind"], "resource");
        assert_eq!(entries[0]["command"]["resourceId"]["subscriptionId"], "abc");
        assert_eq!(entries[1]["command"]["kind"], "resource_graph_query");
        assert_eq!(entries[1]["query"], "Resources\n| take 1");
        assert_eq!(entries[2]["status"], "failed");
    }

    #[test]
    fn test_yaml_report_query_only() {
        let options = ReportOptions {
            query_only: true,
            ..Default::default()
        };
        let text = render(&sample_outcomes(), OutputFormat::Yaml, options).unwrap();

        assert!(text.contains("commandName: ArgQuery"));
        assert!(!text.contains("commandName: Browse"));
    }
}
