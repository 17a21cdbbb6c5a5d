// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::CastEntry;

pub const NO_MATCHES: &str = "No matches.";
pub const COLUMN_COUNT: usize = 5;

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            other => escaped.push(other),
        }
    }
    escaped
}

pub fn render_row_html(entry: &CastEntry) -> String {
    format!(
        "<tr><td>{}</td><td>{}</td><td class=\"mono\"><span class=\"pill\">{}</span></td><td class=\"mono\"><span class=\"pill\">{}</span></td><td>{}</td></tr>",
        escape_html(&entry.character),
        escape_html(&entry.actor),
        escape_html(&entry.first),
        escape_html(&entry.last),
        escape_html(&entry.end),
    )
}

pub fn render_placeholder_html() -> String {
    format!("<tr><td colspan=\"{COLUMN_COUNT}\">{NO_MATCHES}</td></tr>")
}

/// Inner markup for the table body: one row per entry, or the placeholder.
pub fn render_rows_html(rows: &[&CastEntry]) -> String {
    if rows.is_empty() {
        return render_placeholder_html();
    }
    rows.iter()
        .map(|entry| render_row_html(entry))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_load_failure_html(source: &str, error: &str) -> String {
    format!(
        "<tr><td colspan=\"{COLUMN_COUNT}\"><span class=\"warn\">Couldn't load the data file.</span><br>Make sure <span class=\"mono\">{}</span> exists and is reachable from here.<br>Details: {}</td></tr>",
        escape_html(source),
        escape_html(error),
    )
}
