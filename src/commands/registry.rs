use super::CommandResult;

pub type CommandHandler = fn(CommandInvocation<'_>) -> CommandResult;

pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub help: &'static str,
    pub handler: CommandHandler,
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub input: &'a str,
    pub args: &'a str,
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands()
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

pub fn matching_commands(prefix: &str) -> Vec<&'static Command> {
    let prefix = prefix.to_ascii_lowercase();
    all_commands()
        .iter()
        .filter(|command| command.name.starts_with(&prefix))
        .collect()
}

const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        usage: "/help",
        help: "Show available commands.",
        handler: super::handle_help,
    },
    Command {
        name: "upload",
        usage: "/upload <path>",
        help: "Register a data file with the agent.",
        handler: super::handle_upload,
    },
    Command {
        name: "tools",
        usage: "/tools",
        help: "List the agent's analysis tools.",
        handler: super::handle_tools,
    },
    Command {
        name: "tool",
        usage: "/tool <name> [json params]",
        help: "Run one tool directly.",
        handler: super::handle_tool,
    },
    Command {
        name: "action",
        usage: "/action <id>",
        help: "Send the prompt behind a quick action.",
        handler: super::handle_action,
    },
    Command {
        name: "actions",
        usage: "/actions",
        help: "List known quick-action ids.",
        handler: super::handle_actions,
    },
    Command {
        name: "status",
        usage: "/status",
        help: "Show the session status.",
        handler: super::handle_status,
    },
    Command {
        name: "recover",
        usage: "/recover",
        help: "Re-run the health check after an error.",
        handler: super::handle_recover,
    },
    Command {
        name: "dump",
        usage: "/dump [file]",
        help: "Export the conversation to a text file.",
        handler: super::handle_dump,
    },
    Command {
        name: "quit",
        usage: "/quit",
        help: "Leave the chat.",
        handler: super::handle_quit,
    },
];
