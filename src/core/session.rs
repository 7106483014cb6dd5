//! Session orchestration: status machine, conversation log, and gateway
//! calls wired together.
//!
//! A [`Session`] has a single writer. Share it through a [`SessionHandle`],
//! which queues operations so that log order always matches submission
//! order, while status changes stay observable through a watch channel.

use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::api::gateway::{ApiGateway, GatewayError, REQUEST_TIMEOUT};
use crate::api::ToolDescriptor;
use crate::core::clock::{Clock, MessageIdSource, SystemClock};
use crate::core::conversation::{ConversationLog, LogError};
use crate::core::interpreter::ResponseInterpreter;
use crate::core::message::{Message, MessageId};
use crate::core::quick_actions::QuickActionDispatcher;
use crate::core::status::{Operation, SessionStatus, SessionStatusMachine, TransitionError};

/// Why an operation was refused before reaching the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    EmptyInput,
    Rejected(TransitionError),
    Log(LogError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::EmptyInput => f.write_str("message cannot be empty"),
            SessionError::Rejected(err) => write!(f, "{err}"),
            SessionError::Log(err) => write!(f, "{err}"),
        }
    }
}

impl StdError for SessionError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            SessionError::EmptyInput => None,
            SessionError::Rejected(err) => Some(err),
            SessionError::Log(err) => Some(err),
        }
    }
}

impl From<TransitionError> for SessionError {
    fn from(err: TransitionError) -> Self {
        SessionError::Rejected(err)
    }
}

impl From<LogError> for SessionError {
    fn from(err: LogError) -> Self {
        SessionError::Log(err)
    }
}

/// How a backend operation ended. Either way an agent message was appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Succeeded(MessageId),
    Failed {
        message: MessageId,
        error: GatewayError,
    },
}

impl Completion {
    pub fn message_id(&self) -> MessageId {
        match self {
            Completion::Succeeded(id) => *id,
            Completion::Failed { message, .. } => *message,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Completion::Succeeded(_))
    }

    pub fn error(&self) -> Option<&GatewayError> {
        match self {
            Completion::Succeeded(_) => None,
            Completion::Failed { error, .. } => Some(error),
        }
    }
}

pub struct Session {
    gateway: Arc<dyn ApiGateway>,
    machine: SessionStatusMachine,
    log: ConversationLog,
    clock: Arc<dyn Clock>,
    ids: MessageIdSource,
    interpreter: ResponseInterpreter,
    quick_actions: QuickActionDispatcher,
    status_tx: watch::Sender<SessionStatus>,
}

impl Session {
    pub fn new(gateway: Arc<dyn ApiGateway>) -> Self {
        Self::with_clock(gateway, Arc::new(SystemClock))
    }

    pub fn with_clock(gateway: Arc<dyn ApiGateway>, clock: Arc<dyn Clock>) -> Self {
        let machine = SessionStatusMachine::new();
        let (status_tx, _) = watch::channel(machine.status());
        Self {
            gateway,
            machine,
            log: ConversationLog::new(),
            clock,
            ids: MessageIdSource::new(),
            interpreter: ResponseInterpreter::new(),
            quick_actions: QuickActionDispatcher::new(),
            status_tx,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.machine.status()
    }

    pub fn data_loaded(&self) -> bool {
        self.machine.data_loaded()
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SessionStatus> {
        self.status_tx.subscribe()
    }

    /// Initial health check: `idle → connecting → connected | disconnected`.
    pub async fn connect(&mut self) -> Result<Completion, SessionError> {
        self.enter(Operation::HealthCheck)?;
        let gateway = Arc::clone(&self.gateway);
        match self.finish(async move { gateway.health_check().await }).await? {
            Ok(()) => {
                info!("connected to backend");
                let id = self.push_text("Connected to the data quality agent.")?;
                Ok(Completion::Succeeded(id))
            }
            Err(error) => self.push_failure(error),
        }
    }

    /// Explicit recovery after an error or a lost connection. Re-runs the
    /// health check; nothing is retried automatically.
    pub async fn recover(&mut self) -> Result<Completion, SessionError> {
        debug!(from = %self.status(), "recovering session");
        self.connect().await
    }

    pub async fn register_data_source(&mut self, path: &str) -> Result<Completion, SessionError> {
        let path = path.trim();
        if path.is_empty() {
            return Err(SessionError::EmptyInput);
        }

        self.enter(Operation::RegisterDataSource)?;
        let gateway = Arc::clone(&self.gateway);
        let owned = path.to_string();
        let outcome = self
            .finish(async move { gateway.register_data_source(&owned).await })
            .await?;
        match outcome {
            Ok(response) => {
                info!(path, "data source registered");
                let (id, timestamp) = self.stamp();
                let message =
                    self.interpreter
                        .data_source_registered(id, timestamp, path, &response);
                self.log.append(message)?;
                Ok(Completion::Succeeded(id))
            }
            Err(error) => self.push_failure(error),
        }
    }

    /// Send one chat turn. The user message is logged before the call is
    /// issued; the interpreted reply (or a failure bubble) follows it.
    pub async fn submit(&mut self, text: &str) -> Result<Completion, SessionError> {
        if text.trim().is_empty() {
            return Err(SessionError::EmptyInput);
        }

        self.enter(Operation::ChatTurn)?;
        let (id, timestamp) = self.stamp();
        if let Err(err) = self.log.append(Message::user(id, timestamp, text)) {
            self.abort();
            return Err(err.into());
        }

        let gateway = Arc::clone(&self.gateway);
        let owned = text.to_string();
        match self
            .finish(async move { gateway.send_chat_turn(&owned).await })
            .await?
        {
            Ok(response) => {
                let (id, timestamp) = self.stamp();
                let message = self.interpreter.interpret(id, timestamp, response);
                debug!(
                    components = message.components.len(),
                    tool_results = message.tool_results.len(),
                    badge = ?message.status,
                    "chat turn answered"
                );
                self.log.append(message)?;
                Ok(Completion::Succeeded(id))
            }
            Err(error) => self.push_failure(error),
        }
    }

    /// Expand a quick-action id into its prompt and submit it.
    pub async fn invoke_quick_action(&mut self, action_id: &str) -> Result<Completion, SessionError> {
        let prompt = self.quick_actions.resolve(action_id).to_string();
        self.submit(&prompt).await
    }

    /// Fetch the tool catalogue and log it as a table.
    pub async fn list_tools(
        &mut self,
    ) -> Result<(Completion, Vec<ToolDescriptor>), SessionError> {
        self.enter(Operation::ToolCall)?;
        let gateway = Arc::clone(&self.gateway);
        match self.finish(async move { gateway.list_tools().await }).await? {
            Ok(tools) => {
                let (id, timestamp) = self.stamp();
                let message = self.interpreter.tool_listing(id, timestamp, &tools);
                self.log.append(message)?;
                Ok((Completion::Succeeded(id), tools))
            }
            Err(error) => Ok((self.push_failure(error)?, Vec::new())),
        }
    }

    /// Run one tool directly; the result is logged as a badged agent message.
    pub async fn execute_tool(
        &mut self,
        name: &str,
        params: Map<String, Value>,
    ) -> Result<Completion, SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyInput);
        }

        self.enter(Operation::ToolCall)?;
        let gateway = Arc::clone(&self.gateway);
        let owned = name.to_string();
        match self
            .finish(async move { gateway.execute_tool(&owned, &params).await })
            .await?
        {
            Ok(result) => {
                let (id, timestamp) = self.stamp();
                let message = self.interpreter.tool_execution(id, timestamp, result);
                self.log.append(message)?;
                Ok(Completion::Succeeded(id))
            }
            Err(error) => self.push_failure(error),
        }
    }

    fn enter(&mut self, operation: Operation) -> Result<(), SessionError> {
        let status = self.machine.begin(operation)?;
        self.status_tx.send_replace(status);
        Ok(())
    }

    /// Await the in-flight call under the fixed timeout and perform the
    /// matching exit transition. An elapsed timeout counts as connectivity
    /// loss.
    async fn finish<T, F>(&mut self, call: F) -> Result<Result<T, GatewayError>, SessionError>
    where
        F: Future<Output = Result<T, GatewayError>>,
    {
        let outcome = match tokio::time::timeout(REQUEST_TIMEOUT, call).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(timeout_ms = REQUEST_TIMEOUT.as_millis() as u64, "backend call timed out");
                Err(GatewayError::Connectivity)
            }
        };
        let status = self.machine.complete(outcome.is_ok())?;
        self.status_tx.send_replace(status);
        Ok(outcome)
    }

    fn abort(&mut self) {
        if let Ok(status) = self.machine.complete(false) {
            self.status_tx.send_replace(status);
        }
    }

    fn stamp(&mut self) -> (MessageId, chrono::DateTime<chrono::Utc>) {
        let timestamp = self.clock.now();
        (self.ids.next(timestamp), timestamp)
    }

    fn push_text(&mut self, content: &str) -> Result<MessageId, SessionError> {
        let (id, timestamp) = self.stamp();
        self.log.append(Message::agent_text(id, timestamp, content))?;
        Ok(id)
    }

    fn push_failure(&mut self, error: GatewayError) -> Result<Completion, SessionError> {
        warn!(error = %error, status = %self.status(), "operation failed");
        let (id, timestamp) = self.stamp();
        self.log
            .append(self.interpreter.failure(id, timestamp, &error))?;
        Ok(Completion::Failed { message: id, error })
    }
}

/// Cloneable, queue-serialized access to one [`Session`].
///
/// Operations wait for the session lock in arrival order, so two
/// submissions issued back to back are answered, and logged, in that order.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<Session>>,
    status_rx: watch::Receiver<SessionStatus>,
}

impl SessionHandle {
    pub fn new(session: Session) -> Self {
        let status_rx = session.subscribe_status();
        Self {
            inner: Arc::new(Mutex::new(session)),
            status_rx,
        }
    }

    /// Latest status without waiting for an in-flight operation.
    pub fn status(&self) -> SessionStatus {
        *self.status_rx.borrow()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SessionStatus> {
        self.status_rx.clone()
    }

    pub async fn connect(&self) -> Result<Completion, SessionError> {
        self.inner.lock().await.connect().await
    }

    pub async fn recover(&self) -> Result<Completion, SessionError> {
        self.inner.lock().await.recover().await
    }

    pub async fn register_data_source(&self, path: &str) -> Result<Completion, SessionError> {
        self.inner.lock().await.register_data_source(path).await
    }

    pub async fn submit(&self, text: &str) -> Result<Completion, SessionError> {
        self.inner.lock().await.submit(text).await
    }

    pub async fn invoke_quick_action(&self, action_id: &str) -> Result<Completion, SessionError> {
        self.inner.lock().await.invoke_quick_action(action_id).await
    }

    pub async fn list_tools(&self) -> Result<(Completion, Vec<ToolDescriptor>), SessionError> {
        self.inner.lock().await.list_tools().await
    }

    pub async fn execute_tool(
        &self,
        name: &str,
        params: Map<String, Value>,
    ) -> Result<Completion, SessionError> {
        self.inner.lock().await.execute_tool(name, params).await
    }

    pub async fn data_loaded(&self) -> bool {
        self.inner.lock().await.data_loaded()
    }

    /// Snapshot of the whole log.
    pub async fn messages(&self) -> Vec<Message> {
        self.inner.lock().await.log().all().to_vec()
    }

    /// Snapshot of messages appended after the first `seen`.
    pub async fn messages_since(&self, seen: usize) -> Vec<Message> {
        self.inner.lock().await.log().since(seen).to_vec()
    }
}

#[cfg(test)]
pub(crate) mod test_support;
