// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{SortDirection, SortKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub query: String,
    pub season: Option<u32>,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            query: String::new(),
            season: None,
            sort_key: SortKey::Character,
            sort_direction: SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCommand {
    SetQuery(String),
    PushQueryChar(char),
    PopQueryChar,
    SetSeason(Option<u32>),
    /// Steps through "all seasons" followed by `1..=max`, wrapping.
    CycleSeason {
        delta: isize,
        max: u32,
    },
    SortBy(SortKey),
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    QueryChanged(String),
    SeasonChanged(Option<u32>),
    SortChanged {
        key: SortKey,
        direction: SortDirection,
    },
    Reset,
}

impl ViewState {
    pub fn dispatch(&mut self, command: ViewCommand) -> Vec<ViewEvent> {
        match command {
            ViewCommand::SetQuery(query) => self.set_query(query),
            ViewCommand::PushQueryChar(ch) => {
                let mut query = self.query.clone();
                query.push(ch);
                self.set_query(query)
            }
            ViewCommand::PopQueryChar => {
                let mut query = self.query.clone();
                if query.pop().is_none() {
                    return Vec::new();
                }
                self.set_query(query)
            }
            ViewCommand::SetSeason(season) => self.set_season(season),
            ViewCommand::CycleSeason { delta, max } => self.cycle_season(delta, max),
            ViewCommand::SortBy(key) => {
                if self.sort_key == key {
                    self.sort_direction = self.sort_direction.flipped();
                } else {
                    self.sort_key = key;
                    self.sort_direction = SortDirection::Asc;
                }
                vec![ViewEvent::SortChanged {
                    key: self.sort_key,
                    direction: self.sort_direction,
                }]
            }
            ViewCommand::Reset => {
                *self = Self::default();
                vec![ViewEvent::Reset]
            }
        }
    }

    fn set_query(&mut self, query: String) -> Vec<ViewEvent> {
        if self.query == query {
            return Vec::new();
        }
        self.query = query;
        vec![ViewEvent::QueryChanged(self.query.clone())]
    }

    fn set_season(&mut self, season: Option<u32>) -> Vec<ViewEvent> {
        if self.season == season {
            return Vec::new();
        }
        self.season = season;
        vec![ViewEvent::SeasonChanged(season)]
    }

    fn cycle_season(&mut self, delta: isize, max: u32) -> Vec<ViewEvent> {
        if max == 0 {
            return self.set_season(None);
        }

        // Slot 0 is "all seasons"; slot n is season n.
        let slots = max as isize + 1;
        let current = self.season.map_or(0, |season| season.min(max)) as isize;
        let next = (current + delta).rem_euclid(slots) as u32;
        self.set_season((next != 0).then_some(next))
    }
}
