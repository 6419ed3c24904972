use crossterm::style::Stylize;

use crate::config::Config;
use crate::llm::Reply;

use super::text::{display_width, pad_to_width, wrap_text};

/// Narrowest block we will draw, whatever the terminal reports.
const MIN_WIDTH: usize = 20;
/// Width assumed when the terminal size is unknown.
const FALLBACK_WIDTH: usize = 80;

/// Current terminal width in columns.
pub fn terminal_width() -> usize {
    crossterm::terminal::size()
        .map(|(cols, _)| cols as usize)
        .unwrap_or(FALLBACK_WIDTH)
}

/// Draw `body` in a box with a title row, `width` columns wide in total.
pub fn bordered_block(title: &str, body: &str, width: usize) -> Vec<String> {
    let width = width.max(MIN_WIDTH);
    let content_width = width - 4;
    let horizontal = "─".repeat(width - 2);

    let mut lines = Vec::new();
    lines.push(format!("┌{horizontal}┐"));
    lines.push(format!("│ {} │", pad_to_width(title, content_width)));
    lines.push(format!("├{horizontal}┤"));
    for line in wrap_text(body, content_width) {
        lines.push(format!("│ {} │", pad_to_width(&line, content_width)));
    }
    lines.push(format!("└{horizontal}┘"));
    lines
}

/// A reply in chat layout: a `label:` header followed by the wrapped body.
pub fn chat_block(label: &str, body: &str, width: usize) -> Vec<String> {
    let mut lines = vec![format!("{label}:")];
    if body.is_empty() {
        lines.push("(no response)".to_string());
    } else {
        lines.extend(wrap_text(body, width.max(MIN_WIDTH)));
    }
    lines
}

/// Render rows as a left-aligned table with a rule under the header.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(display_width(cell));
        }
    }

    let format_row = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| pad_to_width(cell, *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = Vec::new();
    out.push(format_row(headers.to_vec()));
    out.push(
        widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        out.push(format_row(row.iter().map(String::as_str).collect()));
    }
    out.join("\n")
}

/// The configured models as a table, default marked with `✓`.
pub fn models_table(config: &Config) -> String {
    let rows: Vec<Vec<String>> = config
        .models
        .iter()
        .map(|(name, model)| {
            vec![
                name.clone(),
                if *name == config.default_model { "✓" } else { "" }.to_string(),
                model.api_base.clone(),
                model.model.clone(),
                model.provider.clone().unwrap_or_else(|| name.clone()),
            ]
        })
        .collect();
    table(&["Name", "Default", "API Base", "Model", "Provider"], &rows)
}

/// Print a bordered block with a highlighted title.
pub fn print_bordered(title: &str, body: &str) {
    let lines = bordered_block(title, body, terminal_width());
    for (i, line) in lines.iter().enumerate() {
        if i == 1 {
            println!("{}", line.as_str().green().bold());
        } else {
            println!("{line}");
        }
    }
}

/// Print a reply under the persona's label. Errors are shown in red.
pub fn print_reply(label: &str, reply: &Reply) {
    let lines = chat_block(label, reply.text(), terminal_width());
    println!();
    println!("{}", lines[0].as_str().green().bold());
    for line in &lines[1..] {
        if reply.is_error() {
            println!("{}", line.as_str().red());
        } else {
            println!("{line}");
        }
    }
    println!();
}
