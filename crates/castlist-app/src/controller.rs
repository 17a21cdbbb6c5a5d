// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::markup::{render_load_failure_html, render_rows_html};
use crate::view::{max_season, sort_label, view_indices};
use crate::{CastEntry, ViewCommand, ViewEvent, ViewState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub source: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Pending,
    Loaded,
    Failed(LoadFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableBody<'a> {
    Rows(Vec<&'a CastEntry>),
    NoMatches,
    LoadFailed(&'a LoadFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedView<'a> {
    pub count: usize,
    pub sort_label: String,
    pub body: TableBody<'a>,
}

impl RenderedView<'_> {
    pub fn to_html(&self) -> String {
        match &self.body {
            TableBody::Rows(rows) => render_rows_html(rows),
            TableBody::NoMatches => render_rows_html(&[]),
            TableBody::LoadFailed(failure) => {
                render_load_failure_html(&failure.source, &failure.message)
            }
        }
    }
}

/// Owns the dataset and view state; recomputes the view on every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableController {
    entries: Vec<CastEntry>,
    load: LoadState,
    state: ViewState,
    view: Vec<usize>,
}

impl Default for TableController {
    fn default() -> Self {
        Self::new(ViewState::default())
    }
}

impl TableController {
    /// Starts pending: commands apply, but over an empty dataset.
    pub fn new(state: ViewState) -> Self {
        Self {
            entries: Vec::new(),
            load: LoadState::Pending,
            state,
            view: Vec::new(),
        }
    }

    pub fn with_entries(entries: Vec<CastEntry>) -> Self {
        let mut controller = Self::default();
        controller.finish_load(Ok(entries));
        controller
    }

    /// Applies the one-shot load result. Later results are ignored.
    pub fn finish_load(&mut self, result: Result<Vec<CastEntry>, LoadFailure>) -> bool {
        if self.load != LoadState::Pending {
            return false;
        }

        match result {
            Ok(entries) => {
                self.entries = entries;
                self.load = LoadState::Loaded;
            }
            Err(failure) => {
                self.load = LoadState::Failed(failure);
            }
        }
        self.recompute();
        true
    }

    pub fn dispatch(&mut self, command: ViewCommand) -> Vec<ViewEvent> {
        let events = self.state.dispatch(command);
        if !events.is_empty() {
            self.recompute();
        }
        events
    }

    fn recompute(&mut self) {
        self.view = view_indices(&self.entries, &self.state);
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    pub fn entries(&self) -> &[CastEntry] {
        &self.entries
    }

    pub fn rows(&self) -> impl Iterator<Item = &CastEntry> + '_ {
        self.view.iter().map(|index| &self.entries[*index])
    }

    pub fn row(&self, position: usize) -> Option<&CastEntry> {
        self.view.get(position).map(|index| &self.entries[*index])
    }

    pub fn count(&self) -> usize {
        self.view.len()
    }

    pub fn sort_label(&self) -> String {
        sort_label(self.state.sort_key, self.state.sort_direction)
    }

    pub fn max_season(&self) -> Option<u32> {
        max_season(&self.entries)
    }

    pub fn render(&self) -> RenderedView<'_> {
        let body = match &self.load {
            LoadState::Failed(failure) => TableBody::LoadFailed(failure),
            LoadState::Pending | LoadState::Loaded if self.view.is_empty() => TableBody::NoMatches,
            LoadState::Pending | LoadState::Loaded => TableBody::Rows(self.rows().collect()),
        };
        RenderedView {
            count: self.count(),
            sort_label: self.sort_label(),
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LoadFailure, LoadState, TableBody, TableController};
    use crate::{CastEntry, SortDirection, SortKey, ViewCommand, ViewState};

    fn entry(character: &str, first: &str, last: &str) -> CastEntry {
        CastEntry {
            character: character.to_owned(),
            actor: format!("{character} actor"),
            first: first.to_owned(),
            last: last.to_owned(),
            end: String::new(),
        }
    }

    fn sample() -> Vec<CastEntry> {
        vec![
            entry("Eddard Stark", "S01E01", "S01E09"),
            entry("Daenerys Targaryen", "S01E01", "S08E06"),
            entry("Oberyn Martell", "S04E01", "S04E08"),
        ]
    }

    #[test]
    fn pending_controller_accepts_commands_over_empty_dataset() {
        let mut controller = TableController::default();

        controller.dispatch(ViewCommand::SetQuery("stark".to_owned()));
        controller.dispatch(ViewCommand::SortBy(SortKey::First));
        assert_eq!(controller.count(), 0);
        assert_eq!(controller.render().body, TableBody::NoMatches);

        assert!(controller.finish_load(Ok(sample())));
        assert_eq!(controller.count(), 1);
        assert_eq!(controller.state().sort_key, SortKey::First);
    }

    #[test]
    fn load_completes_only_once() {
        let mut controller = TableController::default();
        assert!(controller.finish_load(Ok(sample())));
        assert!(!controller.finish_load(Err(LoadFailure {
            source: "cast.json".to_owned(),
            message: "late".to_owned(),
        })));
        assert_eq!(controller.load_state(), &LoadState::Loaded);
        assert_eq!(controller.count(), 3);
    }

    #[test]
    fn dispatch_recomputes_view() {
        let mut controller = TableController::with_entries(sample());
        let names = |controller: &TableController| {
            controller
                .rows()
                .map(|row| row.character.clone())
                .collect::<Vec<_>>()
        };

        assert_eq!(
            names(&controller),
            vec!["Daenerys Targaryen", "Eddard Stark", "Oberyn Martell"]
        );

        controller.dispatch(ViewCommand::SetSeason(Some(4)));
        assert_eq!(names(&controller), vec!["Daenerys Targaryen", "Oberyn Martell"]);

        controller.dispatch(ViewCommand::SortBy(SortKey::Character));
        assert_eq!(controller.state().sort_direction, SortDirection::Desc);
        assert_eq!(names(&controller), vec!["Oberyn Martell", "Daenerys Targaryen"]);
        assert_eq!(controller.sort_label(), "Character (Z→A)");

        controller.dispatch(ViewCommand::Reset);
        assert_eq!(controller.state(), &ViewState::default());
        assert_eq!(controller.count(), 3);
    }

    #[test]
    fn fully_filtered_view_renders_placeholder_with_zero_count() {
        let mut controller = TableController::with_entries(sample());
        controller.dispatch(ViewCommand::SetQuery("nobody".to_owned()));

        let rendered = controller.render();
        assert_eq!(rendered.count, 0);
        assert_eq!(rendered.body, TableBody::NoMatches);
        assert_eq!(
            rendered.to_html(),
            "<tr><td colspan=\"5\">No matches.</td></tr>"
        );
    }

    #[test]
    fn empty_dataset_renders_placeholder() {
        let controller = TableController::with_entries(Vec::new());
        let rendered = controller.render();
        assert_eq!(rendered.count, 0);
        assert_eq!(rendered.to_html().matches("<tr>").count(), 1);
        assert_eq!(controller.max_season(), None);
    }

    #[test]
    fn failed_load_replaces_body_with_warning() {
        let mut controller = TableController::default();
        controller.finish_load(Err(LoadFailure {
            source: "cast.json".to_owned(),
            message: "HTTP 500".to_owned(),
        }));

        let rendered = controller.render();
        assert!(matches!(rendered.body, TableBody::LoadFailed(_)));
        assert!(rendered.to_html().contains("Details: HTTP 500"));
        assert_eq!(rendered.count, 0);
    }

    #[test]
    fn row_lookup_follows_view_order() {
        let mut controller = TableController::with_entries(sample());
        controller.dispatch(ViewCommand::SortBy(SortKey::Last));
        controller.dispatch(ViewCommand::SortBy(SortKey::Last));

        assert_eq!(
            controller.row(0).map(|row| row.character.as_str()),
            Some("Daenerys Targaryen")
        );
        assert!(controller.row(3).is_none());
        assert_eq!(controller.max_season(), Some(8));
    }
}
