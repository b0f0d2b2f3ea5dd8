//! PowerShell script generation
//!
//! Renders a [`ParsedCommand`] as an `Invoke-AzRestMethod` splat, or as a
//! `Search-AzGraph` call for Resource Graph queries.

use super::kql::format_query;
use crate::azure::{ParsedCommand, ResourceCommand};

const INDENT: &str = "  ";

/// Render the PowerShell equivalent of a parsed request
pub fn generate(command: &ParsedCommand) -> String {
    match command {
        ParsedCommand::ResourceGraphQuery { query, .. } => graph_query_script(query),
        // Named parameters cannot carry arbitrary query strings, so fall back to the URI
        ParsedCommand::Resource(command) if command.has_extra_params() => uri_script(command),
        ParsedCommand::Resource(command) => structured_script(command),
    }
}

/// Formatted KQL for query commands, `None` for everything else
pub fn render_query(command: &ParsedCommand) -> Option<String> {
    command.query().map(format_query)
}

fn graph_query_script(query: &str) -> String {
    let mut script = String::from("#requires -Module Az.ResourceGraph\n\n");
    script.push_str(&format!("$query = @'\n{}\n'@\n\n", format_query(query)));
    script.push_str("Search-AzGraph -Query $query");
    script
}

fn structured_script(command: &ResourceCommand) -> String {
    let id = &command.resource_id;
    let mut script = String::from("$armParams = @{\n");

    if let Some(subscription_id) = &id.subscription_id {
        push_param(&mut script, "SubscriptionId", &quote(subscription_id));
    }
    if let Some(resource_group) = &id.resource_group {
        push_param(&mut script, "ResourceGroupName", &quote(resource_group));
    }
    if let Some(provider) = &id.provider {
        push_param(&mut script, "ResourceProviderName", &quote(provider));
    }

    let types = id.resource_types();
    if !types.is_empty() {
        push_param(&mut script, "ResourceType", &quote_list(&types));
    }
    let names = id.names();
    if !names.is_empty() {
        push_param(&mut script, "Name", &quote_list(&names));
    }

    push_param(&mut script, "ApiVersion", &quote(&command.api_version));
    push_method_and_payload(&mut script, command);

    script.push_str("}\n\n");
    script.push_str("Invoke-AzRestMethod @armParams");
    script
}

fn uri_script(command: &ResourceCommand) -> String {
    let mut script = String::from("$armParams = @{\n");
    push_param(&mut script, "Uri", &quote(&command.request_uri()));
    push_method_and_payload(&mut script, command);

    script.push_str("}\n\n");
    script.push_str("Invoke-AzRestMethod @armParams");
    script
}

fn push_method_and_payload(script: &mut String, command: &ResourceCommand) {
    if !command.uses_default_method() {
        push_param(script, "Method", &quote(&command.http_method.to_uppercase()));
    }

    let payload = command
        .payload()
        .and_then(|content| serde_json::to_string_pretty(content).ok());
    if let Some(payload) = payload {
        push_param(script, "Payload", &format!("@'\n{}\n'@", payload));
    }
}

fn push_param(script: &mut String, key: &str, value: &str) {
    script.push_str(&format!("{}{} = {}\n", INDENT, key, value));
}

/// Single-quoted PowerShell literal
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn quote_list(values: &[&str]) -> String {
    values
        .iter()
        .map(|value| quote(value))
        .collect::<Vec<_>>()
        .join(", ")
}
