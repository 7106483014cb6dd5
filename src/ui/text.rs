//! Plain-text terminal rendering of messages and their artifacts.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::api::{ButtonSpec, ChartKind, ChartSpec, TableSpec, ToolResult};
use crate::core::interpreter::summarize_tool_result;
use crate::core::message::{Message, Role, StatusBadge};
use crate::ui::render::{render_message, ComponentRenderer};

pub const DEFAULT_WIDTH: usize = 80;

const INDENT: &str = "  ";
const MIN_COLUMN_WIDTH: usize = 3;
const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

pub struct TextRenderer {
    width: usize,
    show_tool_results: bool,
    lines: Vec<String>,
}

impl TextRenderer {
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(20),
            show_tool_results: true,
            lines: Vec::new(),
        }
    }

    pub fn show_tool_results(mut self, show: bool) -> Self {
        self.show_tool_results = show;
        self
    }

    fn content_width(&self) -> usize {
        self.width.saturating_sub(INDENT.len())
    }

    fn push(&mut self, line: impl AsRef<str>) {
        self.lines.push(format!("{INDENT}{}", line.as_ref()));
    }

    fn blank(&mut self) {
        if self.lines.last().is_some_and(|line| !line.is_empty()) {
            self.lines.push(String::new());
        }
    }
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH)
    }
}

/// Render one message as terminal text.
pub fn render_text(message: &Message, width: usize, show_tool_results: bool) -> String {
    render_message(
        TextRenderer::new(width).show_tool_results(show_tool_results),
        message,
    )
}

impl ComponentRenderer for TextRenderer {
    type Output = String;

    fn header(&mut self, role: Role, badge: Option<StatusBadge>) {
        let name = match role {
            Role::User => "You",
            Role::Agent => "Agent",
        };
        match badge {
            Some(badge) => self.lines.push(format!("{name} [{}]:", badge.as_str())),
            None => self.lines.push(format!("{name}:")),
        }
    }

    fn narrative(&mut self, text: &str) {
        let width = self.content_width();
        for paragraph in text.trim_end().lines() {
            if paragraph.trim().is_empty() {
                self.lines.push(String::new());
                continue;
            }
            for line in wrap_text(paragraph, width) {
                self.push(line);
            }
        }
    }

    fn table(&mut self, table: &TableSpec) {
        self.blank();
        if !table.title.trim().is_empty() {
            self.push(table.title.trim());
        }

        let columns = table
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(table.headers.len()))
            .max()
            .unwrap_or(0);
        if columns == 0 {
            self.push("(empty table)");
            return;
        }

        let cell = |row: &[String], i: usize| row.get(i).cloned().unwrap_or_default();
        let header: Vec<String> = (0..columns).map(|i| cell(&table.headers, i)).collect();
        let body: Vec<Vec<String>> = table
            .rows
            .iter()
            .map(|row| {
                let texts: Vec<String> = row
                    .iter()
                    .map(|value| single_line(&value.to_string()))
                    .collect();
                (0..columns).map(|i| cell(&texts, i)).collect()
            })
            .collect();

        let mut ideal = vec![0usize; columns];
        for row in std::iter::once(&header).chain(body.iter()) {
            for (i, text) in row.iter().enumerate() {
                ideal[i] = ideal[i].max(UnicodeWidthStr::width(text.as_str()));
            }
        }
        // borders: one leading bar plus " x |" per column
        let overhead = 1 + columns * 3;
        let widths = fit_columns(&ideal, self.content_width().saturating_sub(overhead));

        self.push(border("┌", "┬", "┐", &widths));
        let has_header = header.iter().any(|text| !text.is_empty());
        if has_header {
            self.push(table_row(&header, &widths));
            if !body.is_empty() {
                self.push(border("├", "┼", "┤", &widths));
            }
        }
        for row in &body {
            self.push(table_row(row, &widths));
        }
        self.push(border("└", "┴", "┘", &widths));
    }

    fn chart(&mut self, chart: &ChartSpec) {
        self.blank();
        let title = chart.title.trim();
        let kind = match chart.kind {
            ChartKind::Bar => "bar chart",
            ChartKind::Line => "line chart",
        };
        if title.is_empty() {
            self.push(format!("({kind})"));
        } else {
            self.push(format!("{title} ({kind})"));
        }

        let points: Vec<(String, f64)> = chart
            .series
            .x
            .iter()
            .zip(chart.series.y.iter())
            .filter(|(_, y)| y.is_finite())
            .map(|(x, y)| (single_line(&x.to_string()), *y))
            .collect();
        if points.is_empty() {
            self.push("(no data)");
            return;
        }

        match chart.kind {
            ChartKind::Bar => self.bar_chart(&points),
            ChartKind::Line => self.line_chart(&points),
        }
    }

    fn button(&mut self, button: &ButtonSpec) {
        self.push(format!("[{}] (/action {})", button.label, button.action_id));
    }

    fn tool_results(&mut self, results: &[ToolResult]) {
        if !self.show_tool_results {
            return;
        }
        self.blank();
        for result in results {
            self.push(format!("• {}", summarize_tool_result(result)));
            for issue in &result.result.issues {
                self.push(format!("    {}: {}", issue.severity.as_str(), issue.description));
            }
        }
    }

    fn quick_actions(&mut self, buttons: &[&ButtonSpec]) {
        self.blank();
        let labels: Vec<String> = buttons
            .iter()
            .map(|button| format!("[{}]", button.label))
            .collect();
        self.push(format!("Quick actions: {}", labels.join(" ")));
    }

    fn finish(self) -> String {
        self.lines.join("\n")
    }
}

impl TextRenderer {
    fn bar_chart(&mut self, points: &[(String, f64)]) {
        let label_width = points
            .iter()
            .map(|(label, _)| UnicodeWidthStr::width(label.as_str()))
            .max()
            .unwrap_or(0)
            .min(self.content_width() / 3);
        let values: Vec<String> = points.iter().map(|(_, y)| format_value(*y)).collect();
        let value_width = values.iter().map(String::len).max().unwrap_or(0);
        let bar_space = self
            .content_width()
            .saturating_sub(label_width + value_width + 4)
            .max(1);
        let max = points.iter().map(|(_, y)| *y).fold(0.0_f64, f64::max);

        for ((label, y), value) in points.iter().zip(values) {
            let length = if max > 0.0 && *y > 0.0 {
                ((y / max) * bar_space as f64).round().max(1.0) as usize
            } else {
                0
            };
            let label = pad_to_width(&truncate_to_width(label, label_width), label_width);
            let bar = "█".repeat(length);
            self.push(format!("{label} │{bar} {value:>value_width$}"));
        }
    }

    fn line_chart(&mut self, points: &[(String, f64)]) {
        let (min, max) = points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, y)| {
                (lo.min(*y), hi.max(*y))
            });
        let span = max - min;
        let spark: String = points
            .iter()
            .map(|(_, y)| {
                if span <= 0.0 {
                    SPARK_LEVELS[SPARK_LEVELS.len() / 2]
                } else {
                    let level = ((y - min) / span * (SPARK_LEVELS.len() - 1) as f64).round();
                    SPARK_LEVELS[level as usize]
                }
            })
            .collect();
        self.push(spark);

        let first = points.first().map(|(label, _)| label.as_str()).unwrap_or("");
        let last = points.last().map(|(label, _)| label.as_str()).unwrap_or("");
        self.push(format!(
            "{first} → {last}  (min {}, max {})",
            format_value(min),
            format_value(max)
        ));
    }
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value:.2}")
    }
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Shrink the widest columns until the total fits `available`.
fn fit_columns(ideal: &[usize], available: usize) -> Vec<usize> {
    let mut widths: Vec<usize> = ideal.iter().map(|w| (*w).max(1)).collect();
    while widths.iter().sum::<usize>() > available {
        let Some((index, widest)) = widths
            .iter()
            .copied()
            .enumerate()
            .max_by_key(|(_, width)| *width)
        else {
            break;
        };
        if widest <= MIN_COLUMN_WIDTH {
            break;
        }
        widths[index] = widest - 1;
    }
    widths
}

fn border(left: &str, join: &str, right: &str, widths: &[usize]) -> String {
    let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
    format!("{left}{}{right}", segments.join(join))
}

fn table_row(cells: &[String], widths: &[usize]) -> String {
    let rendered: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(text, width)| {
            format!(" {} ", pad_to_width(&truncate_to_width(text, *width), *width))
        })
        .collect();
    format!("│{}│", rendered.join("│"))
}

fn pad_to_width(text: &str, width: usize) -> String {
    let current = UnicodeWidthStr::width(text);
    format!("{text}{}", " ".repeat(width.saturating_sub(current)))
}

/// Cut `text` to at most `width` display columns, ending in `…` when cut.
pub(crate) fn truncate_to_width(text: &str, width: usize) -> String {
    if UnicodeWidthStr::width(text) <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// Greedy word wrap by display width; words wider than a line are split.
pub(crate) fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for word in text.split_whitespace() {
        let word_width = UnicodeWidthStr::width(word);
        if current_width > 0 && current_width + 1 + word_width <= width {
            current.push(' ');
            current.push_str(word);
            current_width += 1 + word_width;
            continue;
        }
        if current_width > 0 {
            lines.push(std::mem::take(&mut current));
            current_width = 0;
        }
        if word_width <= width {
            current.push_str(word);
            current_width = word_width;
            continue;
        }
        for ch in word.chars() {
            let w = UnicodeWidthChar::width(ch).unwrap_or(0);
            if current_width + w > width && current_width > 0 {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }
            current.push(ch);
            current_width += w;
        }
    }
    if current_width > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}
