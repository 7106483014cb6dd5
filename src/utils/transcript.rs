//! Plain-text export of the conversation log.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::api::ArtifactSpec;
use crate::core::interpreter::summarize_tool_result;
use crate::core::message::Message;

pub fn default_transcript_name(now: DateTime<Utc>) -> String {
    format!("dqchat-{}.txt", now.format("%Y-%m-%d"))
}

fn artifact_summary(artifact: &ArtifactSpec) -> String {
    match artifact {
        ArtifactSpec::Table(table) => format!(
            "[table] {} ({} rows)",
            table.title,
            table.rows.len()
        ),
        ArtifactSpec::Chart(chart) => format!(
            "[chart] {} ({} points)",
            chart.title,
            chart.series.x.len().min(chart.series.y.len())
        ),
        ArtifactSpec::Button(button) => {
            format!("[button] {} -> {}", button.label, button.action_id)
        }
    }
}

pub fn write_transcript<W: Write>(writer: &mut W, messages: &[Message]) -> std::io::Result<()> {
    for message in messages {
        let badge = message
            .status
            .map(|badge| format!(" [{}]", badge.as_str()))
            .unwrap_or_default();
        writeln!(
            writer,
            "{}{} [{}]:",
            message.role,
            badge,
            message.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(writer, "{}", message.content)?;
        for artifact in &message.components {
            writeln!(writer, "  {}", artifact_summary(artifact))?;
        }
        for result in &message.tool_results {
            writeln!(writer, "  [tool] {}", summarize_tool_result(result))?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Write `messages` to a new file at `path`. Existing files are never
/// overwritten.
pub fn dump_transcript(path: &Path, messages: &[Message]) -> Result<(), Box<dyn std::error::Error>> {
    if messages.is_empty() {
        return Err("No conversation to dump - the chat history is empty.".into());
    }

    let file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
            return Err(format!(
                "File '{}' already exists. Please specify a different filename with /dump <filename>.",
                path.display()
            )
            .into());
        }
        Err(err) => return Err(err.into()),
    };
    let mut writer = BufWriter::new(file);
    write_transcript(&mut writer, messages)?;
    writer.flush()?;
    Ok(())
}
