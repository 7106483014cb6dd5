//! Turns backend responses into agent messages.

use chrono::{DateTime, Utc};

use crate::api::gateway::GatewayError;
use crate::api::{
    ArtifactSpec, ChatTurnResponse, Scalar, Severity, TableSpec, ToolDescriptor, ToolResult,
    ToolStatus, UploadDataResponse,
};
use crate::core::message::{Message, MessageId, Role, StatusBadge};

/// Reduce tool results to a single badge: error > warning > success > none.
///
/// This is a reduction over the whole multiset, so the order of `results`
/// never changes the outcome.
pub fn derive_status(results: &[ToolResult]) -> Option<StatusBadge> {
    if results.is_empty() {
        return None;
    }

    let any_error = results
        .iter()
        .any(|result| result.result.status == ToolStatus::Error);
    if any_error {
        return Some(StatusBadge::Error);
    }

    let any_warning = results
        .iter()
        .flat_map(|result| result.result.issues.iter())
        .any(|issue| issue.severity == Severity::Warning);
    if any_warning {
        return Some(StatusBadge::Warning);
    }

    Some(StatusBadge::Success)
}

/// One-line summary of a tool result, e.g. `validate_data: success (2 warnings)`.
pub fn summarize_tool_result(result: &ToolResult) -> String {
    let outcome = &result.result;
    let mut summary = format!("{}: {}", display_tool_name(result), outcome.status.as_str());

    let warnings = outcome
        .issues
        .iter()
        .filter(|issue| issue.severity == Severity::Warning)
        .count();
    let errors = outcome
        .issues
        .iter()
        .filter(|issue| issue.severity == Severity::Error)
        .count();
    let mut counts = Vec::new();
    if errors > 0 {
        counts.push(plural(errors, "error"));
    }
    if warnings > 0 {
        counts.push(plural(warnings, "warning"));
    }
    if !counts.is_empty() {
        summary.push_str(&format!(" ({})", counts.join(", ")));
    }

    if let Some(error) = outcome.error.as_deref().filter(|e| !e.trim().is_empty()) {
        summary.push_str(&format!(" - {}", error.trim()));
    }
    summary
}

fn display_tool_name(result: &ToolResult) -> &str {
    if result.tool_name.is_empty() {
        "tool"
    } else {
        &result.tool_name
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseInterpreter;

impl ResponseInterpreter {
    pub fn new() -> Self {
        Self
    }

    /// Build the agent message for a successful chat turn. Backend order of
    /// components and tool results is kept as-is.
    pub fn interpret(
        &self,
        id: MessageId,
        timestamp: DateTime<Utc>,
        response: ChatTurnResponse,
    ) -> Message {
        let status = derive_status(&response.tool_results);
        Message {
            id,
            role: Role::Agent,
            content: response.message,
            timestamp,
            components: response.components,
            tool_results: response.tool_results,
            status,
        }
    }

    /// Agent message for a directly executed tool.
    pub fn tool_execution(
        &self,
        id: MessageId,
        timestamp: DateTime<Utc>,
        result: ToolResult,
    ) -> Message {
        let content = format!("Ran {}", summarize_tool_result(&result));
        let tool_results = vec![result];
        let status = derive_status(&tool_results);
        Message {
            id,
            role: Role::Agent,
            content,
            timestamp,
            components: Vec::new(),
            tool_results,
            status,
        }
    }

    /// Agent message listing the backend's tools as a table.
    pub fn tool_listing(
        &self,
        id: MessageId,
        timestamp: DateTime<Utc>,
        tools: &[ToolDescriptor],
    ) -> Message {
        let content = match tools.len() {
            0 => "The agent reports no available tools.".to_string(),
            1 => "1 tool is available.".to_string(),
            n => format!("{n} tools are available."),
        };

        let mut message = Message::agent_text(id, timestamp, content);
        if !tools.is_empty() {
            let rows = tools
                .iter()
                .map(|tool| {
                    vec![
                        Scalar::from(tool.name.as_str()),
                        Scalar::from(tool.description.as_str()),
                        Scalar::from(parameter_names(tool).join(", ")),
                    ]
                })
                .collect();
            message.components.push(ArtifactSpec::Table(TableSpec {
                title: "Available Tools".to_string(),
                headers: vec![
                    "Tool".to_string(),
                    "Description".to_string(),
                    "Parameters".to_string(),
                ],
                rows,
            }));
        }
        message
    }

    pub fn data_source_registered(
        &self,
        id: MessageId,
        timestamp: DateTime<Utc>,
        path: &str,
        response: &UploadDataResponse,
    ) -> Message {
        let content = response
            .message
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Data file set to: {path}"));
        Message::agent_text(id, timestamp, content)
    }

    /// Synthetic agent bubble carrying a gateway failure.
    pub fn failure(&self, id: MessageId, timestamp: DateTime<Utc>, error: &GatewayError) -> Message {
        Message::agent_text(id, timestamp, format!("Sorry, something went wrong: {error}"))
    }
}

fn parameter_names(tool: &ToolDescriptor) -> Vec<String> {
    tool.parameters
        .as_object()
        .map(|params| params.keys().cloned().collect())
        .unwrap_or_default()
}
