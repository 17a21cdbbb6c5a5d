// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use castlist_app::markup::NO_MATCHES;
use castlist_app::{
    CastEntry, SortKey, TableBody, TableController, ViewCommand, parse_season_selector,
};
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintFormat {
    Text,
    Html,
    Json,
}

impl PrintFormat {
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "text" => Ok(Self::Text),
            "html" => Ok(Self::Html),
            "json" => Ok(Self::Json),
            other => bail!("unknown print format {other:?}; use text, html, or json"),
        }
    }
}

/// View options given on the command line, replayed through the reducer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewOptions {
    pub query: Option<String>,
    pub season: Option<String>,
    pub sorts: Vec<SortKey>,
}

impl ViewOptions {
    pub fn commands(&self) -> Result<Vec<ViewCommand>> {
        let mut commands = Vec::new();
        if let Some(query) = &self.query {
            commands.push(ViewCommand::SetQuery(query.clone()));
        }
        if let Some(season) = &self.season {
            let season = parse_season_selector(season).context("invalid --season")?;
            commands.push(ViewCommand::SetSeason(season));
        }
        commands.extend(self.sorts.iter().copied().map(ViewCommand::SortBy));
        Ok(commands)
    }

    pub fn apply(&self, controller: &mut TableController) -> Result<()> {
        for command in self.commands()? {
            controller.dispatch(command);
        }
        Ok(())
    }
}

/// Writes the view to stdout. On a failed load html still prints the
/// warning row before the error is returned.
pub fn print_view(controller: &TableController, format: PrintFormat) -> Result<()> {
    let view = controller.render();
    if format == PrintFormat::Html && matches!(view.body, TableBody::LoadFailed(_)) {
        println!("{}", view.to_html());
    }
    println!("{}", render(controller, format)?);
    Ok(())
}

/// Renders the current view. A failed load is an error in every format.
pub fn render(controller: &TableController, format: PrintFormat) -> Result<String> {
    let view = controller.render();
    if let TableBody::LoadFailed(failure) = &view.body {
        bail!("load dataset from {}: {}", failure.source, failure.message);
    }

    match format {
        PrintFormat::Html => Ok(view.to_html()),
        PrintFormat::Json => {
            let rows = controller.rows().collect::<Vec<_>>();
            serde_json::to_string_pretty(&rows).context("encode matched entries")
        }
        PrintFormat::Text => {
            let rows = controller.rows().collect::<Vec<_>>();
            Ok(render_text(&view.sort_label, &rows))
        }
    }
}

fn render_text(sort_label: &str, rows: &[&CastEntry]) -> String {
    let mut out = format!("sort {sort_label} | {} matches\n", rows.len());
    if rows.is_empty() {
        out.push_str(NO_MATCHES);
        return out;
    }

    let mut widths = SortKey::ALL.map(|key| key.label().chars().count());
    for entry in rows {
        for (width, key) in widths.iter_mut().zip(SortKey::ALL) {
            *width = (*width).max(entry.field(key).chars().count());
        }
    }

    let header = SortKey::ALL.map(SortKey::label);
    push_text_row(&mut out, &widths, header);
    for entry in rows {
        push_text_row(&mut out, &widths, SortKey::ALL.map(|key| entry.field(key)));
    }
    out.truncate(out.trim_end().len());
    out
}

fn push_text_row(out: &mut String, widths: &[usize; 5], cells: [&str; 5]) {
    let mut line = String::new();
    for (index, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if index > 0 {
            line.push_str("  ");
        }
        let width = *width;
        let _ = write!(line, "{cell:<width$}");
    }
    out.push_str(line.trim_end());
    out.push('\n');
}
