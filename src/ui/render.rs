//! Artifact dispatch for rendering a [`Message`].
//!
//! Every artifact kind has exactly one handler on [`ComponentRenderer`], and
//! [`render_message`] matches exhaustively, so a new kind cannot be added
//! without a renderer for it. Artifacts the backend sends that do not decode
//! never reach this layer.

use crate::api::{ArtifactSpec, ButtonSpec, ChartSpec, TableSpec, ToolResult};
use crate::core::message::{Message, Role, StatusBadge};

pub trait ComponentRenderer {
    type Output;

    fn header(&mut self, role: Role, badge: Option<StatusBadge>);

    fn narrative(&mut self, text: &str);

    fn table(&mut self, table: &TableSpec);

    fn chart(&mut self, chart: &ChartSpec);

    fn button(&mut self, button: &ButtonSpec);

    fn tool_results(&mut self, _results: &[ToolResult]) {}

    /// Compact strip repeating every button of the message.
    fn quick_actions(&mut self, buttons: &[&ButtonSpec]);

    fn finish(self) -> Self::Output;
}

/// Drive `renderer` over one message: header, narrative, artifacts in
/// backend order, tool results, then the quick-action strip.
pub fn render_message<R: ComponentRenderer>(mut renderer: R, message: &Message) -> R::Output {
    renderer.header(message.role, message.status);
    renderer.narrative(&message.content);
    for component in &message.components {
        match component {
            ArtifactSpec::Table(table) => renderer.table(table),
            ArtifactSpec::Chart(chart) => renderer.chart(chart),
            ArtifactSpec::Button(button) => renderer.button(button),
        }
    }
    if !message.tool_results.is_empty() {
        renderer.tool_results(&message.tool_results);
    }
    let strip: Vec<&ButtonSpec> = message.buttons().collect();
    if !strip.is_empty() {
        renderer.quick_actions(&strip);
    }
    renderer.finish()
}
