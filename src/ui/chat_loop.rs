//! Interactive chat loop
//!
//! Reads lines, dispatches slash commands and chat turns to the session, and
//! prints every newly logged message. While an operation is in flight the
//! loop keeps reading input: a terminal user is told to wait, piped input is
//! queued and replayed in order.

use std::collections::VecDeque;
use std::error::Error;
use std::future::Future;
use std::io::Write;
use std::path::Path;

use chrono::Utc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::watch;
use tracing::debug;

use crate::commands::{process_input, CommandResult};
use crate::core::session::{Completion, SessionError, SessionHandle};
use crate::core::status::SessionStatus;
use crate::ui::text::render_text;
use crate::utils::transcript::{default_transcript_name, dump_transcript};

#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub base_url: String,
    pub data_path: Option<String>,
    pub show_tool_results: bool,
    pub width: usize,
    /// Whether input comes from a person at a terminal.
    pub interactive: bool,
}

struct Input<R> {
    lines: Lines<R>,
    pending: VecDeque<String>,
    closed: bool,
    interactive: bool,
}

impl<R: AsyncBufRead + Unpin> Input<R> {
    async fn next(&mut self) -> std::io::Result<Option<String>> {
        if let Some(line) = self.pending.pop_front() {
            return Ok(Some(line));
        }
        if self.closed {
            return Ok(None);
        }
        let line = self.lines.next_line().await?;
        if line.is_none() {
            self.closed = true;
        }
        Ok(line)
    }
}

struct ChatView {
    seen: usize,
    width: usize,
    show_tool_results: bool,
    echo_user: bool,
}

impl ChatView {
    async fn flush<W: Write>(&mut self, handle: &SessionHandle, out: &mut W) -> std::io::Result<()> {
        let fresh = handle.messages_since(self.seen).await;
        self.seen += fresh.len();
        for message in fresh {
            if message.is_user() && !self.echo_user {
                continue;
            }
            writeln!(out, "{}\n", render_text(&message, self.width, self.show_tool_results))?;
        }
        out.flush()
    }
}

/// Await `operation` while still servicing input and status changes.
///
/// A terminal line that arrives while the session is busy is refused with a
/// notice on `out`; piped lines are queued for the main loop.
async fn drive<R, W, F, T>(
    input: &mut Input<R>,
    status: &mut watch::Receiver<SessionStatus>,
    out: &mut W,
    operation: F,
) -> std::io::Result<T>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    F: Future<Output = T>,
{
    tokio::pin!(operation);
    let mut watching = true;
    loop {
        tokio::select! {
            biased;
            output = &mut operation => return Ok(output),
            changed = status.changed(), if watching => {
                match changed {
                    Ok(()) => {
                        let current = *status.borrow_and_update();
                        if current.is_busy() {
                            eprintln!("… {current}");
                        }
                    }
                    Err(_) => watching = false,
                }
            }
            line = input.lines.next_line(), if !input.closed => {
                match line {
                    Ok(Some(line)) if input.interactive && !status.borrow().accepts_input() => {
                        if !line.trim().is_empty() {
                            writeln!(out, "Still waiting for the agent; \"{}\" was not sent.", line.trim())?;
                            out.flush()?;
                        }
                    }
                    Ok(Some(line)) => input.pending.push_back(line),
                    Ok(None) | Err(_) => input.closed = true,
                }
            }
        }
    }
}

fn report<W: Write>(
    out: &mut W,
    outcome: Result<Completion, SessionError>,
    status: SessionStatus,
    base_url: &str,
) -> std::io::Result<()> {
    match outcome {
        Ok(Completion::Succeeded(_)) => Ok(()),
        Ok(Completion::Failed { error, .. }) => {
            debug!(%error, %status, "operation failed");
            if error.is_connectivity() {
                writeln!(out, "(is the agent running at {base_url}?)")?;
            }
            if matches!(status, SessionStatus::Error | SessionStatus::Disconnected) {
                writeln!(out, "(status: {status}; type /recover to re-check the backend)")?;
            }
            Ok(())
        }
        Err(SessionError::EmptyInput) => Ok(()),
        Err(err) => writeln!(out, "{err}"),
    }
}

pub async fn run_chat_with<R, W>(
    handle: SessionHandle,
    options: ChatOptions,
    reader: R,
    out: &mut W,
) -> Result<(), Box<dyn Error>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut input = Input {
        lines: reader.lines(),
        pending: VecDeque::new(),
        closed: false,
        interactive: options.interactive,
    };
    let mut status = handle.subscribe_status();
    let mut view = ChatView {
        seen: 0,
        width: options.width,
        show_tool_results: options.show_tool_results,
        echo_user: !options.interactive,
    };

    writeln!(out, "dqchat {} - agent at {}", env!("CARGO_PKG_VERSION"), options.base_url)?;
    writeln!(out, "Type /help for commands, /quit to leave.\n")?;

    let connected = drive(&mut input, &mut status, &mut *out, handle.connect()).await?;
    let connected_ok = matches!(connected, Ok(Completion::Succeeded(_)));
    view.flush(&handle, out).await?;
    report(out, connected, handle.status(), &options.base_url)?;

    if let (true, Some(path)) = (connected_ok, options.data_path.as_deref()) {
        let outcome = drive(&mut input, &mut status, &mut *out, handle.register_data_source(path)).await?;
        view.flush(&handle, out).await?;
        report(out, outcome, handle.status(), &options.base_url)?;
    }

    while let Some(line) = input.next().await? {
        let outcome = match process_input(&line) {
            CommandResult::Notice(text) => {
                writeln!(out, "{text}")?;
                continue;
            }
            CommandResult::ProcessAsMessage(text) => {
                if text.trim().is_empty() {
                    continue;
                }
                drive(&mut input, &mut status, &mut *out, handle.submit(&text)).await?
            }
            CommandResult::Upload(path) => {
                drive(&mut input, &mut status, &mut *out, handle.register_data_source(&path)).await?
            }
            CommandResult::ListTools => drive(&mut input, &mut status, &mut *out, handle.list_tools())
                .await?
                .map(|(completion, _)| completion),
            CommandResult::RunTool { name, params } => {
                drive(&mut input, &mut status, &mut *out, handle.execute_tool(&name, params)).await?
            }
            CommandResult::QuickAction(action_id) => {
                drive(&mut input, &mut status, &mut *out, handle.invoke_quick_action(&action_id)).await?
            }
            CommandResult::Recover => drive(&mut input, &mut status, &mut *out, handle.recover()).await?,
            CommandResult::ShowStatus => {
                writeln!(
                    out,
                    "Status: {} | data loaded: {} | agent: {}",
                    handle.status(),
                    if handle.data_loaded().await { "yes" } else { "no" },
                    options.base_url
                )?;
                continue;
            }
            CommandResult::Dump(filename) => {
                let filename = filename.unwrap_or_else(|| default_transcript_name(Utc::now()));
                match dump_transcript(Path::new(&filename), &handle.messages().await) {
                    Ok(()) => writeln!(out, "Dumped: {filename}")?,
                    Err(err) => writeln!(out, "Dump error: {err}")?,
                }
                continue;
            }
            CommandResult::Quit => break,
        };
        view.flush(&handle, out).await?;
        report(out, outcome, handle.status(), &options.base_url)?;
    }

    Ok(())
}

/// Run the chat against the process's stdin and stdout.
pub async fn run_chat(handle: SessionHandle, options: ChatOptions) -> Result<(), Box<dyn Error>> {
    let reader = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    run_chat_with(handle, options, reader, &mut stdout).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::api::gateway::{ApiGateway, GatewayError};
    use crate::core::session::test_support::{reply, MockGateway, Step};
    use crate::core::session::Session;

    fn options() -> ChatOptions {
        ChatOptions {
            base_url: "http://localhost:8000".to_string(),
            data_path: None,
            show_tool_results: true,
            width: 80,
            interactive: false,
        }
    }

    async fn run(gateway: &Arc<MockGateway>, options: ChatOptions, script: &str) -> String {
        let handle = SessionHandle::new(Session::new(Arc::clone(gateway) as Arc<dyn ApiGateway>));
        let mut out = Vec::new();
        run_chat_with(handle, options, script.as_bytes(), &mut out)
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn piped_turns_are_answered_in_order() {
        let gateway = Arc::new(MockGateway::new());
        let output = run(&gateway, options(), "hello\n/action get_insights\n/quit\nnever sent\n").await;

        let hello = output.find("echo: hello").unwrap();
        let insights = output
            .find("echo: Please give me insights about my campaign data")
            .unwrap();
        assert!(hello < insights);
        assert!(!output.contains("never sent"));
        assert_eq!(
            gateway.chat_requests(),
            vec!["hello", "Please give me insights about my campaign data"]
        );
    }

    #[tokio::test]
    async fn configured_data_path_is_registered_after_connect() {
        let gateway = Arc::new(MockGateway::new());
        let options = ChatOptions {
            data_path: Some("campaigns.csv".to_string()),
            ..options()
        };
        let output = run(&gateway, options, "/status\n").await;

        assert!(output.contains("Data file set to: campaigns.csv"));
        assert!(output.contains("Status: connected | data loaded: yes"));
    }

    #[tokio::test]
    async fn failed_connect_suggests_recover() {
        let gateway = Arc::new(MockGateway::new());
        gateway.push_health(Step::Ready(Err(GatewayError::Connectivity)));
        let output = run(&gateway, options(), "/recover\n/status\n").await;

        assert!(output.contains("cannot reach backend"));
        assert!(output.contains("type /recover"));
        assert!(output.contains("Status: connected"));
    }

    #[tokio::test]
    async fn notices_are_printed_without_contacting_the_agent() {
        let gateway = Arc::new(MockGateway::new());
        let output = run(&gateway, options(), "/upload\n/nope\n   \n").await;

        assert!(output.contains("Usage: /upload <path>"));
        assert!(output.contains("Unknown command /nope"));
        assert!(gateway.chat_requests().is_empty());
    }

    #[tokio::test]
    async fn typed_line_is_refused_while_a_turn_is_pending() {
        let gateway = Arc::new(MockGateway::new());
        gateway.push_chat(Step::After(
            Duration::from_millis(50),
            Ok(reply("checked")),
        ));
        let options = ChatOptions {
            interactive: true,
            ..options()
        };

        let output = run(&gateway, options, "Check my data\nand the clicks too\n").await;

        assert!(output.contains("Still waiting for the agent; \"and the clicks too\" was not sent."));
        assert!(output.contains("checked"));
        assert_eq!(gateway.chat_requests(), vec!["Check my data"]);
        // Typed input is not echoed back
        assert!(!output.contains("You:"));
    }

    #[tokio::test]
    async fn unreachable_agent_hints_at_the_base_url() {
        let gateway = Arc::new(MockGateway::new());
        gateway.push_health(Step::Ready(Err(GatewayError::Connectivity)));
        let output = run(&gateway, options(), "").await;

        assert!(output.contains("(is the agent running at http://localhost:8000?)"));
    }

    #[tokio::test]
    async fn dump_writes_a_transcript() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("chat.txt");
        let gateway = Arc::new(MockGateway::new());
        let script = format!("hi\n/dump {}\n", path.display());

        let output = run(&gateway, options(), &script).await;

        assert!(output.contains("Dumped:"));
        let transcript = std::fs::read_to_string(&path).unwrap();
        assert!(transcript.contains("echo: hi"));
    }
}
