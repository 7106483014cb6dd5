//! Tool catalogue and direct tool execution

use std::error::Error;

use crate::cli::{exit_on_failure, print_agent_messages};
use crate::commands::parse_params;
use crate::core::session::{Completion, SessionHandle};

pub async fn list_tools(handle: &SessionHandle) -> Result<(), Box<dyn Error>> {
    let (completion, tools) = handle.list_tools().await?;
    exit_on_failure_with_log(handle, &completion).await;

    if tools.is_empty() {
        println!("The agent reports no tools.");
        return Ok(());
    }

    let width = tools.iter().map(|tool| tool.name.len()).max().unwrap_or(0);
    println!("Available tools:");
    for tool in &tools {
        if tool.description.is_empty() {
            println!("  {}", tool.name);
        } else {
            println!("  {:width$}  {}", tool.name, tool.description);
        }
    }
    Ok(())
}

pub async fn run_tool(
    handle: &SessionHandle,
    name: &str,
    params: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let params = match parse_params(params.unwrap_or("")) {
        Ok(params) => params,
        Err(message) => {
            eprintln!("❌ {message}");
            std::process::exit(2);
        }
    };

    let completion = handle.execute_tool(name, params).await?;
    print_agent_messages(handle, 0, true).await;
    exit_on_failure(&completion);
    Ok(())
}

async fn exit_on_failure_with_log(handle: &SessionHandle, completion: &Completion) {
    if !completion.is_success() {
        print_agent_messages(handle, 0, false).await;
    }
    exit_on_failure(completion);
}
