//! Scripted gateway double for session tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::api::gateway::{ApiGateway, GatewayError};
use crate::api::{ChatTurnResponse, ToolDescriptor, ToolOutcome, ToolResult, UploadDataResponse};

pub(crate) enum Step<T> {
    Ready(Result<T, GatewayError>),
    After(Duration, Result<T, GatewayError>),
    /// Never answers; only a timeout ends the call.
    Hang,
}

impl<T> Step<T> {
    async fn play(self) -> Result<T, GatewayError> {
        match self {
            Step::Ready(outcome) => outcome,
            Step::After(delay, outcome) => {
                tokio::time::sleep(delay).await;
                outcome
            }
            Step::Hang => std::future::pending().await,
        }
    }
}

/// Answers each call from its queue; an empty queue falls back to a
/// healthy default, and chat turns echo the submitted text.
#[derive(Default)]
pub(crate) struct MockGateway {
    health: Mutex<VecDeque<Step<()>>>,
    uploads: Mutex<VecDeque<Step<UploadDataResponse>>>,
    chats: Mutex<VecDeque<Step<ChatTurnResponse>>>,
    tools: Mutex<VecDeque<Step<Vec<ToolDescriptor>>>>,
    executions: Mutex<VecDeque<Step<ToolResult>>>,
    chat_requests: Mutex<Vec<String>>,
    tool_requests: Mutex<Vec<(String, Map<String, Value>)>>,
}

impl MockGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_health(&self, step: Step<()>) -> &Self {
        self.health.lock().unwrap().push_back(step);
        self
    }

    pub(crate) fn push_upload(&self, step: Step<UploadDataResponse>) -> &Self {
        self.uploads.lock().unwrap().push_back(step);
        self
    }

    pub(crate) fn push_chat(&self, step: Step<ChatTurnResponse>) -> &Self {
        self.chats.lock().unwrap().push_back(step);
        self
    }

    pub(crate) fn push_tools(&self, step: Step<Vec<ToolDescriptor>>) -> &Self {
        self.tools.lock().unwrap().push_back(step);
        self
    }

    pub(crate) fn push_execution(&self, step: Step<ToolResult>) -> &Self {
        self.executions.lock().unwrap().push_back(step);
        self
    }

    pub(crate) fn chat_requests(&self) -> Vec<String> {
        self.chat_requests.lock().unwrap().clone()
    }

    pub(crate) fn tool_requests(&self) -> Vec<(String, Map<String, Value>)> {
        self.tool_requests.lock().unwrap().clone()
    }
}

pub(crate) fn reply(text: &str) -> ChatTurnResponse {
    ChatTurnResponse {
        message: text.to_string(),
        ..ChatTurnResponse::default()
    }
}

#[async_trait]
impl ApiGateway for MockGateway {
    async fn health_check(&self) -> Result<(), GatewayError> {
        let step = self.health.lock().unwrap().pop_front();
        step.unwrap_or(Step::Ready(Ok(()))).play().await
    }

    async fn register_data_source(&self, _path: &str) -> Result<UploadDataResponse, GatewayError> {
        let step = self.uploads.lock().unwrap().pop_front();
        step.unwrap_or(Step::Ready(Ok(UploadDataResponse::default())))
            .play()
            .await
    }

    async fn send_chat_turn(&self, text: &str) -> Result<ChatTurnResponse, GatewayError> {
        self.chat_requests.lock().unwrap().push(text.to_string());
        let step = self.chats.lock().unwrap().pop_front();
        step.unwrap_or_else(|| Step::Ready(Ok(reply(&format!("echo: {text}")))))
            .play()
            .await
    }

    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, GatewayError> {
        let step = self.tools.lock().unwrap().pop_front();
        step.unwrap_or(Step::Ready(Ok(Vec::new()))).play().await
    }

    async fn execute_tool(
        &self,
        name: &str,
        params: &Map<String, Value>,
    ) -> Result<ToolResult, GatewayError> {
        self.tool_requests
            .lock()
            .unwrap()
            .push((name.to_string(), params.clone()));
        let step = self.executions.lock().unwrap().pop_front();
        let fallback = ToolResult {
            tool_name: name.to_string(),
            result: ToolOutcome::success(),
        };
        step.unwrap_or(Step::Ready(Ok(fallback))).play().await
    }
}
