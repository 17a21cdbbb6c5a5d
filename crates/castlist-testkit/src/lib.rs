// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use castlist_app::CastEntry;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use tiny_http::{Header, Response, Server};

const GIVEN_NAMES: [&str; 20] = [
    "Alys", "Benjen", "Brynden", "Dacey", "Edric", "Gendry", "Hoster", "Jeyne", "Lyanna",
    "Lysa", "Meera", "Myrcella", "Olenna", "Podrick", "Quentyn", "Rickon", "Roslin", "Shireen",
    "Tommen", "Walder",
];

const HOUSES: [&str; 12] = [
    "Arryn", "Bolton", "Frey", "Greyjoy", "Lannister", "Martell", "Mormont", "Reed", "Stark",
    "Tarly", "Tully", "Tyrell",
];

const ACTOR_FIRST_NAMES: [&str; 16] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Cameron", "Hayden", "Rowan",
];

const ACTOR_LAST_NAMES: [&str; 18] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Campbell", "Turner", "Flores", "Bennett", "Price", "Morris", "Foster", "Brooks",
];

const FATES: [&str; 10] = [
    "Killed in battle",
    "Poisoned at a feast",
    "Exiled across the Narrow Sea",
    "Survives the war",
    "Burned by dragonfire",
    "Takes the black",
    "Lost beyond the Wall",
    "Executed for treason",
    "Crowned at the end",
    "Fate unknown",
];

const MALFORMED_CODES: [&str; 5] = ["", "TBD", "S1E1", "s02e03", "S03E1x"];

pub fn entry(character: &str, actor: &str, first: &str, last: &str, end: &str) -> CastEntry {
    CastEntry {
        character: character.to_owned(),
        actor: actor.to_owned(),
        first: first.to_owned(),
        last: last.to_owned(),
        end: end.to_owned(),
    }
}

/// Small hand-written dataset covering spans, fates, and a malformed code.
pub fn sample_cast() -> Vec<CastEntry> {
    vec![
        entry(
            "Eddard Stark",
            "Sean Bean",
            "S01E01",
            "S01E09",
            "Executed at the Great Sept",
        ),
        entry(
            "Tyrion Lannister",
            "Peter Dinklage",
            "S01E01",
            "S08E06",
            "Hand of the King",
        ),
        entry(
            "Oberyn Martell",
            "Pedro Pascal",
            "S04E01",
            "S04E08",
            "Killed in trial by combat",
        ),
        entry(
            "Brienne of Tarth",
            "Gwendoline Christie",
            "S02E03",
            "S08E06",
            "Lord Commander of the Kingsguard",
        ),
        entry(
            "Robb Stark",
            "Richard Madden",
            "S01E01",
            "S03E09",
            "Killed at the Red Wedding",
        ),
        entry("Nymeria", "", "unknown", "S01E02", "Runs wild in the Riverlands"),
    ]
}

pub fn dataset_json(entries: &[CastEntry]) -> Result<String> {
    serde_json::to_string_pretty(entries).context("encode dataset")
}

pub fn write_dataset(entries: &[CastEntry]) -> Result<(tempfile::TempDir, PathBuf)> {
    write_raw_dataset(&dataset_json(entries)?)
}

pub fn write_raw_dataset(raw: &str) -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("got_main_cast.json");
    std::fs::write(&path, raw).with_context(|| format!("write dataset {}", path.display()))?;
    Ok((dir, path))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Serves exactly one response from a local mock server.
///
/// Returns the server base URL and a handle yielding the recorded request.
pub fn serve_once(
    status: u16,
    body: impl Into<String>,
) -> Result<(String, JoinHandle<Result<RecordedRequest>>)> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let base_url = format!("http://{}", server.server_addr());
    let body = body.into();

    let handle = thread::spawn(move || {
        let request = server.recv().context("receive mock request")?;
        let recorded = RecordedRequest {
            url: request.url().to_owned(),
            headers: request
                .headers()
                .iter()
                .map(|header| {
                    (
                        header.field.as_str().as_str().to_owned(),
                        header.value.as_str().to_owned(),
                    )
                })
                .collect(),
        };
        let content_type = Header::from_bytes("Content-Type", "application/json")
            .map_err(|()| anyhow!("invalid content type header"))?;
        let response = Response::from_string(body)
            .with_status_code(status)
            .with_header(content_type);
        request.respond(response).context("send mock response")?;
        Ok(recorded)
    });

    Ok((base_url, handle))
}

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Seeded generator for cast datasets.
#[derive(Debug, Clone)]
pub struct CastFaker {
    rng: DeterministicRng,
}

impl CastFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    /// Episode code with a one-in-eight chance of being malformed.
    pub fn episode_code(&mut self, min_season: u32) -> String {
        if self.int_n(8) == 0 {
            return self.pick(&MALFORMED_CODES).to_owned();
        }
        let season = min_season + self.int_n(3) as u32;
        let episode = 1 + self.int_n(10) as u32;
        format!("S{season:02}E{episode:02}")
    }

    pub fn cast_entry(&mut self) -> CastEntry {
        let character = format!("{} {}", self.pick(&GIVEN_NAMES), self.pick(&HOUSES));
        let actor = format!(
            "{} {}",
            self.pick(&ACTOR_FIRST_NAMES),
            self.pick(&ACTOR_LAST_NAMES)
        );
        let first_season = 1 + self.int_n(5) as u32;
        let first = self.episode_code(first_season);
        let last = self.episode_code(first_season + 1);

        CastEntry {
            character,
            actor,
            first,
            last,
            end: self.pick(&FATES).to_owned(),
        }
    }

    pub fn dataset(&mut self, len: usize) -> Vec<CastEntry> {
        (0..len).map(|_| self.cast_entry()).collect()
    }

    /// Dataset whose character names are pairwise distinct, ignoring case.
    pub fn unique_dataset(&mut self, len: usize) -> Vec<CastEntry> {
        let mut entries = self.dataset(len);
        for (index, entry) in entries.iter_mut().enumerate() {
            entry.character = format!("{} {index:03}", entry.character);
        }
        entries
    }

    fn pick<'a>(&mut self, options: &'a [&'a str]) -> &'a str {
        options[self.rng.int_n(options.len())]
    }
}
