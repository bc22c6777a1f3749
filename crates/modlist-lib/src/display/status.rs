//! Status display for user feedback
//!
//! Semantic status lines, summaries and tables written to stdout with
//! terminal-capability-aware formatting.

use super::styling::StyleManager;
use console::measure_text_width;
use std::io::{self, Write};

/// Status display manager for semantic user feedback
pub struct StatusDisplay<'a> {
    styling: &'a StyleManager,
}

impl<'a> StatusDisplay<'a> {
    pub(crate) fn new(styling: &'a StyleManager) -> Self {
        Self { styling }
    }

    /// Display a working status
    ///
    /// Output: `→ Checking fabric-api...`
    pub fn checking(&self, task: &str) {
        let message = format!("Checking {}...", task);
        println!("{}", self.styling.format_working(&message));
        io::stdout().flush().unwrap_or(());
    }

    /// Display a success status with optional details
    ///
    /// Output: `✓ fabric-api: 0.92.0+1.21.5`
    pub fn success(&self, item: &str, details: &str) {
        println!("{}", self.styling.format_success(&join_details(item, details)));
    }

    /// Display an error status with details
    ///
    /// Output: `✗ sodium: not found`
    pub fn error(&self, item: &str, details: &str) {
        println!("{}", self.styling.format_error(&join_details(item, details)));
    }

    pub fn warning(&self, message: &str) {
        println!("{}", self.styling.format_warning(message));
    }

    pub fn info(&self, message: &str) {
        println!("{}", self.styling.format_info(message));
    }

    /// Display a simple message without status symbols
    pub fn message(&self, text: &str) {
        println!("{}", text);
    }

    pub fn subtle(&self, text: &str) {
        println!("{}", self.styling.style_subtle(text));
    }

    /// Display a list of items with bullets
    pub fn list(&self, items: &[&str]) {
        for item in items {
            println!("  {} {}", self.styling.bullet(), item);
        }
    }

    /// Display a completion message
    pub fn complete(&self, task: &str) {
        println!("{}", self.styling.format_success(task));
    }

    /// Display a header for a section of work
    pub fn section(&self, title: &str) {
        println!();
        println!("{}", self.styling.style_emphasis(title));
    }

    /// Display a step in a multi-step process
    ///
    /// Output: `[1/3] Loading database`
    pub fn step(&self, current: usize, total: usize, description: &str) {
        let prefix = format!("[{}/{}]", current, total);
        println!("{} {}", self.styling.style_subtle(&prefix), description);
    }

    /// Display labelled counters, one per line, labels aligned
    ///
    /// Output:
    /// ```text
    /// Total               3
    /// Update available    1
    /// ```
    pub fn counts(&self, title: &str, entries: &[(&str, usize)]) {
        self.section(title);
        print!("{}", render_counts(entries));
    }

    /// Display rows as aligned columns under a bold header
    pub fn table(&self, headers: &[&str], rows: &[Vec<String>]) {
        let rendered = render_table(headers, rows);
        let mut lines = rendered.lines();
        if let Some(header) = lines.next() {
            println!("{}", self.styling.style_emphasis(header));
        }
        for line in lines {
            println!("{}", line);
        }
    }
}

fn join_details(item: &str, details: &str) -> String {
    if details.is_empty() {
        item.to_string()
    } else {
        format!("{}: {}", item, details)
    }
}

pub(crate) fn render_counts(entries: &[(&str, usize)]) -> String {
    let width = entries
        .iter()
        .map(|(label, _)| measure_text_width(label))
        .max()
        .unwrap_or(0);

    entries
        .iter()
        .map(|(label, count)| format!("  {:<width$}  {}\n", label, count, width = width))
        .collect()
}

pub(crate) fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| measure_text_width(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let width = measure_text_width(cell);
            match widths.get_mut(i) {
                Some(existing) => *existing = (*existing).max(width),
                None => widths.push(width),
            }
        }
    }

    let render_row = |cells: Vec<&str>| -> String {
        let line = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect::<Vec<_>>()
            .join("  ");
        format!("{}\n", line.trim_end())
    };

    let mut out = render_row(headers.to_vec());
    for row in rows {
        out.push_str(&render_row(row.iter().map(String::as_str).collect()));
    }
    out
}

#[cfg(test)]
mod tests {
    include!("status.test.rs");
}
