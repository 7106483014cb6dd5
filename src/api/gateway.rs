//! The sole boundary to the backend agent.
//!
//! Failures are classified into three kinds: no response at all
//! ([`GatewayError::Connectivity`]), a non-2xx or undecodable response
//! ([`GatewayError::Server`]), and a rejected data-source registration
//! ([`GatewayError::DataSource`]).

use std::error::Error as StdError;
use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::api::{
    decode_tool_execution, ChatRequest, ChatTurnResponse, ToolDescriptor, ToolRequest,
    ToolResult, ToolsResponse, UploadDataRequest, UploadDataResponse,
};
use crate::utils::url::{construct_api_url, construct_tool_url};

/// Upper bound for every backend call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(30_000);

pub const CONNECTIVITY_MESSAGE: &str = "cannot reach backend";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// No response reached the caller (refused connection, DNS, timeout).
    Connectivity,
    /// The backend answered but signaled failure.
    Server {
        status: Option<u16>,
        detail: String,
    },
    /// The backend rejected a data-source registration.
    DataSource {
        status: Option<u16>,
        detail: String,
    },
}

impl GatewayError {
    pub fn server(status: Option<u16>, detail: impl Into<String>) -> Self {
        GatewayError::Server {
            status,
            detail: detail.into(),
        }
    }

    pub fn is_connectivity(&self) -> bool {
        matches!(self, GatewayError::Connectivity)
    }

    /// Data-source rejections count as server errors.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            GatewayError::Server { .. } | GatewayError::DataSource { .. }
        )
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Connectivity => None,
            GatewayError::Server { status, .. } | GatewayError::DataSource { status, .. } => {
                *status
            }
        }
    }

    fn into_data_source(self) -> Self {
        match self {
            GatewayError::Server { status, detail } => GatewayError::DataSource { status, detail },
            other => other,
        }
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Connectivity => f.write_str(CONNECTIVITY_MESSAGE),
            GatewayError::Server { detail, .. } => f.write_str(detail),
            GatewayError::DataSource { detail, .. } => {
                write!(f, "data source rejected: {detail}")
            }
        }
    }
}

impl StdError for GatewayError {}

#[async_trait]
pub trait ApiGateway: Send + Sync {
    async fn health_check(&self) -> Result<(), GatewayError>;

    async fn register_data_source(&self, path: &str) -> Result<UploadDataResponse, GatewayError>;

    async fn send_chat_turn(&self, text: &str) -> Result<ChatTurnResponse, GatewayError>;

    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, GatewayError>;

    async fn execute_tool(
        &self,
        name: &str,
        params: &Map<String, Value>,
    ) -> Result<ToolResult, GatewayError>;
}

/// [`ApiGateway`] over HTTP/JSON.
#[derive(Clone, Debug)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| GatewayError::server(None, format!("request failed: {err}")))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn send(&self, label: &str, request: RequestBuilder) -> Result<Response, GatewayError> {
        let started = Instant::now();
        let outcome = request.send().await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let response = match outcome {
            Ok(response) => response,
            Err(err) => {
                let classified = classify_transport_error(&err);
                warn!(call = label, elapsed_ms, error = %err, "backend call failed");
                return Err(classified);
            }
        };

        let status = response.status();
        debug!(call = label, elapsed_ms, status = status.as_u16(), "backend responded");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::server(
            Some(status.as_u16()),
            error_detail(status, &body),
        ))
    }

    async fn decode<T: DeserializeOwned>(label: &str, response: Response) -> Result<T, GatewayError> {
        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| classify_transport_error(&err))?;
        serde_json::from_slice::<T>(&bytes).map_err(|err| {
            warn!(call = label, error = %err, "undecodable backend response");
            GatewayError::server(Some(status), format!("invalid response from backend: {err}"))
        })
    }
}

#[async_trait]
impl ApiGateway for HttpGateway {
    /// Any failure, including a non-2xx reply, means the backend is not
    /// usable and is reported as [`GatewayError::Connectivity`].
    async fn health_check(&self) -> Result<(), GatewayError> {
        let url = construct_api_url(&self.base_url, "health");
        match self.send("health", self.client.get(url)).await {
            Ok(_) => Ok(()),
            Err(GatewayError::Connectivity) => Err(GatewayError::Connectivity),
            Err(err) => {
                warn!(error = %err, "health check rejected");
                Err(GatewayError::Connectivity)
            }
        }
    }

    async fn register_data_source(&self, path: &str) -> Result<UploadDataResponse, GatewayError> {
        let url = construct_api_url(&self.base_url, "upload-data");
        let request = self
            .client
            .post(url)
            .json(&UploadDataRequest { file_path: path });
        let response = self
            .send("upload-data", request)
            .await
            .map_err(GatewayError::into_data_source)?;
        Self::decode("upload-data", response).await
    }

    async fn send_chat_turn(&self, text: &str) -> Result<ChatTurnResponse, GatewayError> {
        let url = construct_api_url(&self.base_url, "chat");
        let request = self.client.post(url).json(&ChatRequest { message: text });
        let response = self.send("chat", request).await?;
        Self::decode("chat", response).await
    }

    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, GatewayError> {
        let url = construct_api_url(&self.base_url, "tools");
        let response = self.send("tools", self.client.get(url)).await?;
        let tools: ToolsResponse = Self::decode("tools", response).await?;
        Ok(tools.into_tools())
    }

    async fn execute_tool(
        &self,
        name: &str,
        params: &Map<String, Value>,
    ) -> Result<ToolResult, GatewayError> {
        let url = construct_tool_url(&self.base_url, name)
            .map_err(|err| GatewayError::server(None, format!("request failed: {err}")))?;
        let request = self.client.post(url).json(&ToolRequest { params });
        let response = self.send("tool", request).await?;
        let status = response.status().as_u16();
        let body: Value = Self::decode("tool", response).await?;
        decode_tool_execution(name, body).map_err(|err| {
            GatewayError::server(Some(status), format!("invalid response from backend: {err}"))
        })
    }
}

/// Errors raised before a response arrived are connectivity failures;
/// request construction problems are wrapped as generic server errors.
fn classify_transport_error(err: &reqwest::Error) -> GatewayError {
    if err.is_builder() {
        return GatewayError::server(None, format!("request failed: {err}"));
    }
    if let Some(status) = err.status() {
        return GatewayError::server(Some(status.as_u16()), format!("server error: {status}"));
    }
    GatewayError::Connectivity
}

/// Pick the human-readable failure text from an error body.
///
/// FastAPI reports `{"detail": ...}`; other servers use `{"message": ...}`.
/// Anything else falls back to `server error: <status>`.
pub fn error_detail(status: StatusCode, body: &str) -> String {
    let parsed = serde_json::from_str::<Value>(body.trim()).ok();
    let detail = parsed.as_ref().and_then(|value| {
        value
            .get("detail")
            .and_then(detail_text)
            .or_else(|| value.get("message").and_then(detail_text))
    });

    detail.unwrap_or_else(|| format!("server error: {}", status.as_u16()))
}

fn detail_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
            (!collapsed.is_empty()).then_some(collapsed)
        }
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
