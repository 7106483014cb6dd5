//! Wire types for the data-quality agent's REST contract.
//!
//! Responses are decoded leniently: optional arrays default to empty, unknown
//! fields are ignored, and artifacts or tool results that cannot be decoded
//! are dropped instead of failing the whole turn.

pub mod gateway;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

#[derive(Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

#[derive(Serialize)]
pub struct UploadDataRequest<'a> {
    pub file_path: &'a str,
}

#[derive(Serialize)]
pub struct ToolRequest<'a> {
    pub params: &'a Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UploadDataResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of a successful `POST /chat`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChatTurnResponse {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub message: String,
    #[serde(default, deserialize_with = "lenient_artifacts")]
    pub components: Vec<ArtifactSpec>,
    #[serde(
        default,
        rename = "tool_results",
        alias = "toolResults",
        deserialize_with = "lenient_tool_results"
    )]
    pub tool_results: Vec<ToolResult>,
}

/// A structured attachment to an agent message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ArtifactSpec {
    Table(TableSpec),
    Chart(ChartSpec),
    Button(ButtonSpec),
}

impl ArtifactSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            ArtifactSpec::Table(_) => "table",
            ArtifactSpec::Chart(_) => "chart",
            ArtifactSpec::Button(_) => "button",
        }
    }

    pub fn as_button(&self) -> Option<&ButtonSpec> {
        match self {
            ArtifactSpec::Button(button) => Some(button),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Scalar>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    #[serde(
        default,
        rename = "chart_type",
        alias = "chartKind",
        alias = "chart_kind"
    )]
    pub kind: ChartKind,
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "data", alias = "series")]
    pub series: ChartSeries,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Bar,
    Line,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    #[serde(default)]
    pub x: Vec<Scalar>,
    #[serde(default)]
    pub y: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonSpec {
    #[serde(rename = "text", alias = "label")]
    pub label: String,
    #[serde(rename = "action", alias = "actionId", alias = "action_id")]
    pub action_id: String,
    #[serde(
        default,
        rename = "style",
        alias = "styleHint",
        alias = "style_hint",
        skip_serializing_if = "Option::is_none"
    )]
    pub style_hint: Option<String>,
}

/// A single table cell or chart category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
    Null,
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(text) => f.write_str(text),
            Scalar::Number(number) => write!(f, "{number}"),
            Scalar::Bool(value) => write!(f, "{value}"),
            Scalar::Null => f.write_str("—"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Number(value.into())
    }
}

/// Outcome of one backend analysis tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    #[serde(
        default,
        rename = "tool",
        alias = "toolName",
        alias = "tool_name",
        deserialize_with = "text_or_empty"
    )]
    pub tool_name: String,
    pub result: ToolOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawToolOutcome")]
pub struct ToolOutcome {
    pub status: ToolStatus,
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(
        default,
        rename = "result",
        skip_serializing_if = "Option::is_none"
    )]
    pub payload: Option<Value>,
}

impl ToolOutcome {
    pub fn success() -> Self {
        Self {
            status: ToolStatus::Success,
            issues: Vec::new(),
            error: None,
            payload: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            status: ToolStatus::Error,
            issues: Vec::new(),
            error: Some(error.into()),
            payload: None,
        }
    }

    pub fn with_issue(mut self, severity: Severity, description: impl Into<String>) -> Self {
        self.issues.push(Issue {
            severity,
            description: description.into(),
        });
        self
    }
}

// Only `status` is strict; a result with a readable status is never dropped.
// The backend nests validation issues inside the tool payload
// (`result.result.issues`); top-level `issues` wins when both exist.
#[derive(Deserialize)]
struct RawToolOutcome {
    status: ToolStatus,
    #[serde(default)]
    issues: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    result: Option<Value>,
}

impl From<RawToolOutcome> for ToolOutcome {
    fn from(raw: RawToolOutcome) -> Self {
        let issues = match raw.issues.as_ref().filter(|issues| !issues.is_null()) {
            Some(issues) => decode_issues(issues),
            None => raw
                .result
                .as_ref()
                .and_then(|payload| payload.get("issues"))
                .map(decode_issues)
                .unwrap_or_default(),
        };

        let error = raw.error.and_then(|error| match error {
            Value::Null => None,
            Value::String(text) => Some(text),
            other => Some(other.to_string()),
        });

        Self {
            status: raw.status,
            issues,
            error,
            payload: raw.result,
        }
    }
}

fn decode_issues(issues: &Value) -> Vec<Issue> {
    issues
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| match serde_json::from_value::<Issue>(entry.clone()) {
                    Ok(issue) => Some(issue),
                    Err(err) => {
                        debug!(error = %err, "dropping malformed issue");
                        None
                    }
                })
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Success,
    Error,
}

impl ToolStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolStatus::Success => "success",
            ToolStatus::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(default, deserialize_with = "lenient_severity")]
    pub severity: Severity,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub description: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
    #[default]
    #[serde(other)]
    Info,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: Value,
}

#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum ToolsResponse {
    Wrapped { tools: Vec<ToolDescriptor> },
    Bare(Vec<ToolDescriptor>),
}

impl ToolsResponse {
    pub(crate) fn into_tools(self) -> Vec<ToolDescriptor> {
        match self {
            ToolsResponse::Wrapped { tools } => tools,
            ToolsResponse::Bare(tools) => tools,
        }
    }
}

/// Decode the body of `POST /tool/{name}`.
///
/// The backend answers with a flat `{tool, status, result?, error?}` object;
/// the nested `{tool, result: {status, ...}}` shape used inside chat turns is
/// accepted too. A top-level `status` key selects the flat form.
pub fn decode_tool_execution(requested: &str, body: Value) -> Result<ToolResult, serde_json::Error> {
    if body.get("status").is_some() {
        let tool_name = body
            .get("tool")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .unwrap_or(requested)
            .to_string();
        let result = serde_json::from_value::<ToolOutcome>(body)?;
        return Ok(ToolResult { tool_name, result });
    }

    let mut decoded = serde_json::from_value::<ToolResult>(body)?;
    if decoded.tool_name.is_empty() {
        decoded.tool_name = requested.to_string();
    }
    Ok(decoded)
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Strings pass through, `null` is empty, anything else is its JSON text.
fn text_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text,
        Some(other) => other.to_string(),
    })
}

fn lenient_severity<'de, D>(deserializer: D) -> Result<Severity, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw.as_ref().and_then(Value::as_str) {
        Some("warning") => Severity::Warning,
        Some("error") => Severity::Error,
        _ => Severity::Info,
    })
}

fn lenient_artifacts<'de, D>(deserializer: D) -> Result<Vec<ArtifactSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(entries
        .into_iter()
        .filter_map(|entry| {
            let tag = entry
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("<missing>")
                .to_string();
            match serde_json::from_value::<ArtifactSpec>(entry) {
                Ok(artifact) => Some(artifact),
                Err(err) => {
                    debug!(artifact_type = %tag, error = %err, "dropping unrecognized artifact");
                    None
                }
            }
        })
        .collect())
}

fn lenient_tool_results<'de, D>(deserializer: D) -> Result<Vec<ToolResult>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<ToolResult>(entry) {
            Ok(result) => Some(result),
            Err(err) => {
                debug!(error = %err, "dropping malformed tool result");
                None
            }
        })
        .collect())
}
