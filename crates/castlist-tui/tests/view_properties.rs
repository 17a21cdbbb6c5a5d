// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use castlist_app::{CastEntry, EpisodeKey, SortKey, TableController, ViewCommand};
use castlist_testkit::CastFaker;
use std::collections::BTreeSet;

const SEEDS: std::ops::Range<u64> = 1..21;

fn characters(controller: &TableController) -> Vec<String> {
    controller
        .rows()
        .map(|entry| entry.character.clone())
        .collect()
}

fn spans_season(entry: &CastEntry, season: u32) -> bool {
    let starts = entry.first_episode().season();
    let ends = entry.last_episode().season().unwrap_or(u32::MAX);
    starts.is_some_and(|first| first <= season) && season <= ends
}

#[test]
fn character_descending_reverses_ascending() {
    for seed in SEEDS {
        let mut controller = TableController::with_entries(CastFaker::new(seed).unique_dataset(40));
        let ascending = characters(&controller);

        controller.dispatch(ViewCommand::SortBy(SortKey::Character));
        let mut descending = characters(&controller);
        descending.reverse();
        assert_eq!(descending, ascending, "seed {seed}");
    }
}

#[test]
fn malformed_first_codes_sort_after_parsed_ones() {
    for seed in SEEDS {
        let mut controller = TableController::with_entries(CastFaker::new(seed).unique_dataset(40));
        controller.dispatch(ViewCommand::SortBy(SortKey::First));

        let keys = controller
            .rows()
            .map(CastEntry::first_episode)
            .collect::<Vec<_>>();
        let first_malformed = keys
            .iter()
            .position(|key| *key == EpisodeKey::Unparsed)
            .unwrap_or(keys.len());
        assert!(
            keys[first_malformed..]
                .iter()
                .all(|key| *key == EpisodeKey::Unparsed),
            "seed {seed}: {keys:?}"
        );
        assert!(keys[..first_malformed].is_sorted(), "seed {seed}");
    }
}

#[test]
fn season_filter_keeps_exactly_spanning_rows() {
    for seed in SEEDS {
        let entries = CastFaker::new(seed).unique_dataset(40);
        let mut controller = TableController::with_entries(entries.clone());
        let max = controller.max_season().unwrap_or(0);

        for season in 1..=max {
            controller.dispatch(ViewCommand::SetSeason(Some(season)));
            let kept = characters(&controller).into_iter().collect::<BTreeSet<_>>();
            let expected = entries
                .iter()
                .filter(|entry| spans_season(entry, season))
                .map(|entry| entry.character.clone())
                .collect::<BTreeSet<_>>();
            assert_eq!(kept, expected, "seed {seed}, season {season}");
        }
    }
}
