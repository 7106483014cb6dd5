//! Slash-command parsing for the interactive chat.
//!
//! Handlers only parse; the chat loop performs the resulting action against
//! the session.

mod registry;

pub use registry::{all_commands, matching_commands, CommandInvocation};

use serde_json::{Map, Value};

use crate::core::quick_actions::QuickActionDispatcher;

#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    /// Print this text locally; nothing is sent.
    Notice(String),
    ProcessAsMessage(String),
    Upload(String),
    ListTools,
    RunTool {
        name: String,
        params: Map<String, Value>,
    },
    QuickAction(String),
    ShowStatus,
    Recover,
    Dump(Option<String>),
    Quit,
}

pub fn process_input(input: &str) -> CommandResult {
    let trimmed = input.trim();

    if !trimmed.starts_with('/') {
        return CommandResult::ProcessAsMessage(input.to_string());
    }

    let mut parts = trimmed[1..].splitn(2, char::is_whitespace);
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return CommandResult::ProcessAsMessage(input.to_string()),
    };
    let args = parts.next().unwrap_or("").trim();

    match registry::find_command(command_name) {
        Some(command) => {
            let invocation = CommandInvocation {
                input: trimmed,
                args,
            };
            (command.handler)(invocation)
        }
        None => {
            let suggestions: Vec<_> = matching_commands(command_name)
                .iter()
                .map(|command| format!("/{}", command.name))
                .collect();
            if suggestions.is_empty() {
                CommandResult::Notice(format!(
                    "Unknown command /{command_name}. Type /help for commands."
                ))
            } else {
                CommandResult::Notice(format!(
                    "Unknown command /{command_name}. Did you mean {}?",
                    suggestions.join(" or ")
                ))
            }
        }
    }
}

pub fn help_text() -> String {
    let width = all_commands()
        .iter()
        .map(|command| command.usage.len())
        .max()
        .unwrap_or(0);
    let mut help = String::from("Commands:\n");
    for command in all_commands() {
        help.push_str(&format!("  {:width$}  {}\n", command.usage, command.help));
    }
    help.push_str("Anything else is sent to the agent as a chat message.");
    help
}

pub(super) fn handle_help(_invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Notice(help_text())
}

pub(super) fn handle_upload(invocation: CommandInvocation<'_>) -> CommandResult {
    if invocation.args.is_empty() {
        return CommandResult::Notice("Usage: /upload <path>".to_string());
    }
    CommandResult::Upload(invocation.args.to_string())
}

pub(super) fn handle_tools(_invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::ListTools
}

pub(super) fn handle_tool(invocation: CommandInvocation<'_>) -> CommandResult {
    let mut parts = invocation.args.splitn(2, char::is_whitespace);
    let name = match parts.next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return CommandResult::Notice("Usage: /tool <name> [json params]".to_string()),
    };
    match parse_params(parts.next().unwrap_or("")) {
        Ok(params) => CommandResult::RunTool { name, params },
        Err(message) => CommandResult::Notice(message),
    }
}

/// Parse tool parameters: empty input is an empty object, anything else
/// must be a JSON object.
pub fn parse_params(raw: &str) -> Result<Map<String, Value>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(params)) => Ok(params),
        Ok(_) => Err(
            "Tool parameters must be a JSON object, e.g. {\"column\": \"spend\"}".to_string(),
        ),
        Err(err) => Err(format!("Invalid tool parameters: {err}")),
    }
}

pub(super) fn handle_action(invocation: CommandInvocation<'_>) -> CommandResult {
    if invocation.args.is_empty() {
        return CommandResult::Notice("Usage: /action <id> (see /actions)".to_string());
    }
    CommandResult::QuickAction(invocation.args.to_string())
}

pub(super) fn handle_actions(_invocation: CommandInvocation<'_>) -> CommandResult {
    let dispatcher = QuickActionDispatcher::new();
    let width = dispatcher
        .actions()
        .iter()
        .map(|action| action.id.len())
        .max()
        .unwrap_or(0);
    let mut text = String::from("Quick actions:\n");
    for action in dispatcher.actions() {
        text.push_str(&format!("  {:width$}  \"{}\"\n", action.id, action.prompt));
    }
    text.push_str("Other ids are sent as typed.");
    CommandResult::Notice(text)
}

pub(super) fn handle_status(_invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::ShowStatus
}

pub(super) fn handle_recover(_invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Recover
}

pub(super) fn handle_dump(invocation: CommandInvocation<'_>) -> CommandResult {
    let parts: Vec<&str> = invocation.input.split_whitespace().collect();
    match parts.len() {
        1 => CommandResult::Dump(None),
        2 => CommandResult::Dump(Some(parts[1].to_string())),
        _ => CommandResult::Notice("Usage: /dump [filename]".to_string()),
    }
}

pub(super) fn handle_quit(_invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Quit
}

#[cfg(test)]
mod tests;
