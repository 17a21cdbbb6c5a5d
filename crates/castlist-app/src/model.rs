// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// One row of the cast dataset.
///
/// Every field decodes from a JSON string; a missing or `null` field becomes
/// the empty string so downstream comparisons never see an absent value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CastEntry {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub character: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub actor: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub first: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub last: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub end: String,
}

impl CastEntry {
    pub fn field(&self, key: SortKey) -> &str {
        match key {
            SortKey::Character => &self.character,
            SortKey::Actor => &self.actor,
            SortKey::First => &self.first,
            SortKey::Last => &self.last,
            SortKey::End => &self.end,
        }
    }

    pub fn first_episode(&self) -> EpisodeKey {
        EpisodeKey::parse(&self.first)
    }

    pub fn last_episode(&self) -> EpisodeKey {
        EpisodeKey::parse(&self.last)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Character,
    Actor,
    First,
    Last,
    End,
}

impl SortKey {
    pub const ALL: [Self; 5] = [
        Self::Character,
        Self::Actor,
        Self::First,
        Self::Last,
        Self::End,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Actor => "actor",
            Self::First => "first",
            Self::Last => "last",
            Self::End => "end",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "character" => Some(Self::Character),
            "actor" => Some(Self::Actor),
            "first" => Some(Self::First),
            "last" => Some(Self::Last),
            "end" => Some(Self::End),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Character => "Character",
            Self::Actor => "Actor",
            Self::First => "First",
            Self::Last => "Last",
            Self::End => "End",
        }
    }

    /// First/last columns order by parsed episode codes instead of text.
    pub const fn is_episode(self) -> bool {
        matches!(self, Self::First | Self::Last)
    }

    pub fn column_index(self) -> usize {
        Self::ALL.iter().position(|key| *key == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

/// Sort key for an `S##E##` episode code.
///
/// Anything that does not match the exact pattern becomes [`EpisodeKey::Unparsed`],
/// which orders after every parsed code and equal to other unparsed keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EpisodeKey {
    Code { season: u32, episode: u32 },
    Unparsed,
}

impl EpisodeKey {
    pub fn parse(value: &str) -> Self {
        let bytes = value.as_bytes();
        if bytes.len() != 6 || bytes[0] != b'S' || bytes[3] != b'E' {
            return Self::Unparsed;
        }

        match (two_digits(bytes[1], bytes[2]), two_digits(bytes[4], bytes[5])) {
            (Some(season), Some(episode)) => Self::Code { season, episode },
            _ => Self::Unparsed,
        }
    }

    pub const fn season(self) -> Option<u32> {
        match self {
            Self::Code { season, .. } => Some(season),
            Self::Unparsed => None,
        }
    }

    /// An unparsed code counts as season +infinity, so it always starts after.
    pub const fn starts_after_season(self, season: u32) -> bool {
        match self {
            Self::Code { season: own, .. } => own > season,
            Self::Unparsed => true,
        }
    }

    pub const fn ends_before_season(self, season: u32) -> bool {
        match self {
            Self::Code { season: own, .. } => own < season,
            Self::Unparsed => false,
        }
    }
}

impl fmt::Display for EpisodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code { season, episode } => write!(f, "S{season:02}E{episode:02}"),
            Self::Unparsed => f.write_str("?"),
        }
    }
}

fn two_digits(tens: u8, ones: u8) -> Option<u32> {
    if !tens.is_ascii_digit() || !ones.is_ascii_digit() {
        return None;
    }
    Some(u32::from(tens - b'0') * 10 + u32::from(ones - b'0'))
}

/// Selector value for a season, e.g. `S03`.
pub fn season_selector_value(season: u32) -> String {
    format!("S{season:02}")
}

/// Parses a season selector value: `""` clears the filter, `S<digits>` selects.
pub fn parse_season_selector(value: &str) -> Result<Option<u32>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let Some(digits) = trimmed.strip_prefix('S') else {
        bail!("invalid season {value:?}; use S## (for example S03) or \"\" for all seasons");
    };
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        bail!("invalid season {value:?}; use S## (for example S03) or \"\" for all seasons");
    }

    match digits.parse::<u32>() {
        Ok(season) => Ok(Some(season)),
        Err(_) => bail!("season {value:?} is out of range"),
    }
}

#[cfg(test)]
mod tests {
    use super::{CastEntry, EpisodeKey, SortDirection, SortKey, parse_season_selector};
    use std::cmp::Ordering;

    #[test]
    fn well_formed_episode_code_parses() {
        assert_eq!(
            EpisodeKey::parse("S02E03"),
            EpisodeKey::Code {
                season: 2,
                episode: 3
            }
        );
        assert_eq!(EpisodeKey::parse("S10E00").season(), Some(10));
    }

    #[test]
    fn malformed_episode_codes_are_unparsed() {
        for raw in [
            "", "garbage", "S2E3", "s02e03", "S02E03 ", " S02E03", "S02E3x", "S0AE03", "S02X03",
            "S٠٢E03",
        ] {
            assert_eq!(EpisodeKey::parse(raw), EpisodeKey::Unparsed, "input {raw:?}");
        }
    }

    #[test]
    fn unparsed_sorts_after_every_code() {
        let latest = EpisodeKey::parse("S99E99");
        assert_eq!(EpisodeKey::Unparsed.cmp(&latest), Ordering::Greater);
        assert_eq!(
            EpisodeKey::Unparsed.cmp(&EpisodeKey::Unparsed),
            Ordering::Equal
        );
        assert!(EpisodeKey::parse("S01E02") < EpisodeKey::parse("S02E01"));
    }

    #[test]
    fn unparsed_counts_as_infinite_season() {
        assert!(EpisodeKey::Unparsed.starts_after_season(99));
        assert!(!EpisodeKey::Unparsed.ends_before_season(1));
    }

    #[test]
    fn null_and_missing_fields_decode_to_empty_strings() {
        let entry: CastEntry =
            serde_json::from_str(r#"{"character":"Hodor","actor":null,"first":"S01E03"}"#)
                .expect("decode entry");
        assert_eq!(entry.actor, "");
        assert_eq!(entry.last, "");
        assert_eq!(entry.end, "");
        assert_eq!(entry.last_episode(), EpisodeKey::Unparsed);
    }

    #[test]
    fn sort_key_round_trips_through_str() {
        for key in SortKey::ALL {
            assert_eq!(SortKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(SortKey::parse("Character"), None);
        assert_eq!(SortKey::End.column_index(), 4);
    }

    #[test]
    fn direction_flips_and_applies() {
        assert_eq!(SortDirection::Asc.flipped(), SortDirection::Desc);
        assert_eq!(SortDirection::Desc.apply(Ordering::Less), Ordering::Greater);
    }

    #[test]
    fn season_selector_parses_empty_and_prefixed_values() {
        assert_eq!(parse_season_selector("").expect("empty"), None);
        assert_eq!(parse_season_selector("S03").expect("S03"), Some(3));
        assert_eq!(parse_season_selector("S10").expect("S10"), Some(10));

        let error = parse_season_selector("3").expect_err("missing prefix");
        assert!(error.to_string().contains("use S##"));
        assert!(parse_season_selector("S").is_err());
        assert!(parse_season_selector("Sx1").is_err());
    }
}
