// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{CastEntry, EpisodeKey, SortDirection, SortKey, ViewState};
use icu_collator::options::CollatorOptions;
use icu_collator::{Collator, CollatorBorrowed};
use std::cmp::Ordering;
use std::sync::LazyLock;

// Root locale with compiled data; loading it only fails if the data is missing.
static COLLATOR: LazyLock<Option<CollatorBorrowed<'static>>> =
    LazyLock::new(|| Collator::try_new(Default::default(), CollatorOptions::default()).ok());

fn normalise(value: &str) -> String {
    value.to_lowercase()
}

/// Lowercases then trims, matching how queries are typed into the search box.
pub fn normalise_query(query: &str) -> String {
    normalise(query).trim().to_owned()
}

/// Season-level presence: episode numbers inside the boundary seasons are ignored.
pub fn matches_season(entry: &CastEntry, season: Option<u32>) -> bool {
    let Some(season) = season else {
        return true;
    };
    !(entry.first_episode().starts_after_season(season)
        || entry.last_episode().ends_before_season(season))
}

/// `normalised_query` must already be lowercased and trimmed.
pub fn matches_query(entry: &CastEntry, normalised_query: &str) -> bool {
    if normalised_query.is_empty() {
        return true;
    }

    let haystack = [
        entry.character.as_str(),
        entry.actor.as_str(),
        entry.end.as_str(),
        entry.first.as_str(),
        entry.last.as_str(),
    ]
    .map(normalise)
    .join(" ");
    haystack.contains(normalised_query)
}

/// Collates the lowercased text, then falls back to code points so the order
/// stays total.
fn compare_text(left: &str, right: &str) -> Ordering {
    let (left, right) = (normalise(left), normalise(right));
    let collated = COLLATOR
        .as_ref()
        .map_or(Ordering::Equal, |collator| collator.compare(&left, &right));
    collated.then_with(|| left.cmp(&right))
}

pub fn compare_entries(
    left: &CastEntry,
    right: &CastEntry,
    key: SortKey,
    direction: SortDirection,
) -> Ordering {
    let ordering = if key.is_episode() {
        EpisodeKey::parse(left.field(key))
            .cmp(&EpisodeKey::parse(right.field(key)))
            .then_with(|| compare_text(&left.character, &right.character))
    } else {
        compare_text(left.field(key), right.field(key))
    };
    direction.apply(ordering)
}

/// Dataset indices of the rows in the current view, filtered then sorted.
///
/// The sort is stable, so rows that tie under the comparator keep dataset
/// order in both directions.
pub fn view_indices(entries: &[CastEntry], state: &ViewState) -> Vec<usize> {
    let query = normalise_query(&state.query);
    let mut indices = entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| matches_season(entry, state.season) && matches_query(entry, &query))
        .map(|(index, _)| index)
        .collect::<Vec<_>>();

    indices.sort_by(|left, right| {
        compare_entries(
            &entries[*left],
            &entries[*right],
            state.sort_key,
            state.sort_direction,
        )
    });
    indices
}

pub fn sort_label(key: SortKey, direction: SortDirection) -> String {
    if key.is_episode() {
        let order = match direction {
            SortDirection::Asc => "earlier→later",
            SortDirection::Desc => "later→earlier",
        };
        format!("{} ({order})", key.as_str().to_uppercase())
    } else {
        let order = match direction {
            SortDirection::Asc => "A→Z",
            SortDirection::Desc => "Z→A",
        };
        format!("{} ({order})", key.label())
    }
}

/// Highest season number named by any parsable first/last code.
pub fn max_season(entries: &[CastEntry]) -> Option<u32> {
    entries
        .iter()
        .flat_map(|entry| [entry.first_episode(), entry.last_episode()])
        .filter_map(EpisodeKey::season)
        .max()
}
