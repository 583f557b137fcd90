//! Canonical U.S. state enumeration (50 states + DC) and the Census region
//! taxonomy used by the coverage rollup.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Tokens that upstream systems use for "no state" and that must never be
/// matched against the table.
const BLOCKLISTED_TOKENS: [&str; 8] = ["", "n/a", "na", "none", "null", "undefined", "-", "--"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Northeast,
    Midwest,
    South,
    West,
    Unknown,
}

impl Region {
    pub const fn ordered() -> [Self; 4] {
        [Self::Northeast, Self::Midwest, Self::South, Self::West]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Northeast => "Northeast",
            Self::Midwest => "Midwest",
            Self::South => "South",
            Self::West => "West",
            Self::Unknown => "Unknown",
        }
    }
}

impl Ord for Region {
    fn cmp(&self, other: &Self) -> Ordering {
        self.label().cmp(other.label())
    }
}

impl PartialOrd for Region {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A canonical placement state. Ordering is alphabetical by full name, which
/// is the secondary key of every ranked view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Alabama,
    Alaska,
    Arizona,
    Arkansas,
    California,
    Colorado,
    Connecticut,
    Delaware,
    DistrictOfColumbia,
    Florida,
    Georgia,
    Hawaii,
    Idaho,
    Illinois,
    Indiana,
    Iowa,
    Kansas,
    Kentucky,
    Louisiana,
    Maine,
    Maryland,
    Massachusetts,
    Michigan,
    Minnesota,
    Mississippi,
    Missouri,
    Montana,
    Nebraska,
    Nevada,
    NewHampshire,
    NewJersey,
    NewMexico,
    NewYork,
    NorthCarolina,
    NorthDakota,
    Ohio,
    Oklahoma,
    Oregon,
    Pennsylvania,
    RhodeIsland,
    SouthCarolina,
    SouthDakota,
    Tennessee,
    Texas,
    Utah,
    Vermont,
    Virginia,
    Washington,
    WestVirginia,
    Wisconsin,
    Wyoming,
    Unknown,
}

struct StateEntry {
    state: State,
    abbreviation: &'static str,
    name: &'static str,
    region: Region,
}

const fn entry(
    state: State,
    abbreviation: &'static str,
    name: &'static str,
    region: Region,
) -> StateEntry {
    StateEntry {
        state,
        abbreviation,
        name,
        region,
    }
}

/// Indexed by the `State` discriminant; `Unknown` has no entry.
const STATE_TABLE: [StateEntry; 51] = [
    entry(State::Alabama, "AL", "Alabama", Region::South),
    entry(State::Alaska, "AK", "Alaska", Region::West),
    entry(State::Arizona, "AZ", "Arizona", Region::West),
    entry(State::Arkansas, "AR", "Arkansas", Region::South),
    entry(State::California, "CA", "California", Region::West),
    entry(State::Colorado, "CO", "Colorado", Region::West),
    entry(State::Connecticut, "CT", "Connecticut", Region::Northeast),
    entry(State::Delaware, "DE", "Delaware", Region::South),
    entry(
        State::DistrictOfColumbia,
        "DC",
        "District of Columbia",
        Region::South,
    ),
    entry(State::Florida, "FL", "Florida", Region::South),
    entry(State::Georgia, "GA", "Georgia", Region::South),
    entry(State::Hawaii, "HI", "Hawaii", Region::West),
    entry(State::Idaho, "ID", "Idaho", Region::West),
    entry(State::Illinois, "IL", "Illinois", Region::Midwest),
    entry(State::Indiana, "IN", "Indiana", Region::Midwest),
    entry(State::Iowa, "IA", "Iowa", Region::Midwest),
    entry(State::Kansas, "KS", "Kansas", Region::Midwest),
    entry(State::Kentucky, "KY", "Kentucky", Region::South),
    entry(State::Louisiana, "LA", "Louisiana", Region::South),
    entry(State::Maine, "ME", "Maine", Region::Northeast),
    entry(State::Maryland, "MD", "Maryland", Region::South),
    entry(State::Massachusetts, "MA", "Massachusetts", Region::Northeast),
    entry(State::Michigan, "MI", "Michigan", Region::Midwest),
    entry(State::Minnesota, "MN", "Minnesota", Region::Midwest),
    entry(State::Mississippi, "MS", "Mississippi", Region::South),
    entry(State::Missouri, "MO", "Missouri", Region::Midwest),
    entry(State::Montana, "MT", "Montana", Region::West),
    entry(State::Nebraska, "NE", "Nebraska", Region::Midwest),
    entry(State::Nevada, "NV", "Nevada", Region::West),
    entry(State::NewHampshire, "NH", "New Hampshire", Region::Northeast),
    entry(State::NewJersey, "NJ", "New Jersey", Region::Northeast),
    entry(State::NewMexico, "NM", "New Mexico", Region::West),
    entry(State::NewYork, "NY", "New York", Region::Northeast),
    entry(State::NorthCarolina, "NC", "North Carolina", Region::South),
    entry(State::NorthDakota, "ND", "North Dakota", Region::Midwest),
    entry(State::Ohio, "OH", "Ohio", Region::Midwest),
    entry(State::Oklahoma, "OK", "Oklahoma", Region::South),
    entry(State::Oregon, "OR", "Oregon", Region::West),
    entry(State::Pennsylvania, "PA", "Pennsylvania", Region::Northeast),
    entry(State::RhodeIsland, "RI", "Rhode Island", Region::Northeast),
    entry(State::SouthCarolina, "SC", "South Carolina", Region::South),
    entry(State::SouthDakota, "SD", "South Dakota", Region::Midwest),
    entry(State::Tennessee, "TN", "Tennessee", Region::South),
    entry(State::Texas, "TX", "Texas", Region::South),
    entry(State::Utah, "UT", "Utah", Region::West),
    entry(State::Vermont, "VT", "Vermont", Region::Northeast),
    entry(State::Virginia, "VA", "Virginia", Region::South),
    entry(State::Washington, "WA", "Washington", Region::West),
    entry(State::WestVirginia, "WV", "West Virginia", Region::South),
    entry(State::Wisconsin, "WI", "Wisconsin", Region::Midwest),
    entry(State::Wyoming, "WY", "Wyoming", Region::West),
];

impl State {
    /// Number of canonical states, excluding `Unknown`.
    pub const COUNT: usize = STATE_TABLE.len();

    /// Every canonical state in alphabetical order. Never yields `Unknown`.
    pub fn enumerated() -> impl Iterator<Item = State> {
        STATE_TABLE.iter().map(|entry| entry.state)
    }

    fn table_entry(self) -> Option<&'static StateEntry> {
        match self {
            Self::Unknown => None,
            known => STATE_TABLE.get(known as usize),
        }
    }

    pub fn name(self) -> &'static str {
        self.table_entry().map_or("Unknown", |entry| entry.name)
    }

    pub fn abbreviation(self) -> Option<&'static str> {
        self.table_entry().map(|entry| entry.abbreviation)
    }

    pub fn region(self) -> Region {
        self.table_entry().map_or(Region::Unknown, |entry| entry.region)
    }

    pub const fn is_unknown(self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Resolves a free-form state token.
    ///
    /// Abbreviations are matched on the trimmed, uppercased token. Full names
    /// are matched on letters only, case-folded, so `"new-york"` and
    /// `"NEW YORK"` both resolve. Blank and placeholder tokens, and anything
    /// left unmatched, resolve to `Unknown`.
    pub fn canonicalize(token: &str) -> State {
        let trimmed = token.trim();
        if is_blocklisted(trimmed) {
            return Self::Unknown;
        }

        let upper = trimmed.to_ascii_uppercase();
        if let Some(entry) = STATE_TABLE
            .iter()
            .find(|entry| entry.abbreviation == upper)
        {
            return entry.state;
        }

        let folded = fold_letters(trimmed);
        if folded.is_empty() {
            return Self::Unknown;
        }

        STATE_TABLE
            .iter()
            .find(|entry| fold_letters(entry.name) == folded)
            .map_or(Self::Unknown, |entry| entry.state)
    }
}

fn is_blocklisted(token: &str) -> bool {
    BLOCKLISTED_TOKENS
        .iter()
        .any(|blocked| blocked.eq_ignore_ascii_case(token))
}

fn fold_letters(value: &str) -> String {
    value
        .chars()
        .filter(|ch| ch.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect()
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name().cmp(other.name())
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for State {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for State {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(State::canonicalize(&raw))
    }
}
