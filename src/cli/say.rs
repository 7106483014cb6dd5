//! Single-turn "say" command

use std::error::Error;

use crate::cli::{exit_on_failure, print_agent_messages};
use crate::core::config::ResolvedConfig;
use crate::core::session::SessionHandle;

pub async fn run_say(
    handle: &SessionHandle,
    resolved: &ResolvedConfig,
    prompt: Vec<String>,
) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.trim().is_empty() {
        eprintln!("Usage: dqchat say <message>");
        std::process::exit(1);
    }

    let mut seen = 0;
    if let Some(path) = resolved.data_path.as_deref() {
        let completion = handle.register_data_source(path).await?;
        seen = print_agent_messages(handle, seen, resolved.show_tool_results).await;
        exit_on_failure(&completion);
    }

    let completion = handle.submit(&prompt).await?;
    print_agent_messages(handle, seen, resolved.show_tool_results).await;
    exit_on_failure(&completion);
    Ok(())
}
