//! Tally how consumer attacks turned out, per season.
//!
//! This works straight off raw attack descriptions and does not use the
//! merge engine.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::event::RawEvent;

/// Mutually exclusive outcome of one attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Chorby,
    Defended,
    Cannon,
    Wrestled,
}

impl Outcome {
    pub const ALL: [Self; 5] = [
        Self::Success,
        Self::Chorby,
        Self::Defended,
        Self::Cannon,
        Self::Wrestled,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Chorby => "chorby",
            Self::Defended => "defended",
            Self::Cannon => "cannon",
            Self::Wrestled => "wrestled",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify one description. The substring tests run in a fixed order.
#[must_use]
pub fn classify_outcome(description: &str) -> Outcome {
    if description.contains("DEFENDS") {
        Outcome::Defended
    } else if description.contains("CHORBY SOUL") {
        Outcome::Chorby
    } else if description.contains("A CONSUMER") {
        Outcome::Wrestled
    } else if description.contains("SALMON") {
        Outcome::Cannon
    } else {
        Outcome::Success
    }
}

/// Per-outcome counts indexed by season. Seasons never seen read as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OutcomeTally {
    counts: BTreeMap<Outcome, BTreeMap<i64, u64>>,
}

impl OutcomeTally {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: Outcome, season: i64) {
        *self
            .counts
            .entry(outcome)
            .or_default()
            .entry(season)
            .or_insert(0) += 1;
    }

    #[must_use]
    pub fn get(&self, outcome: Outcome, season: i64) -> u64 {
        self.counts
            .get(&outcome)
            .and_then(|seasons| seasons.get(&season))
            .copied()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn total(&self, outcome: Outcome) -> u64 {
        self.counts
            .get(&outcome)
            .map_or(0, |seasons| seasons.values().sum())
    }

    /// Every season with at least one recorded attack, ascending.
    #[must_use]
    pub fn seasons(&self) -> Vec<i64> {
        let mut seasons: Vec<i64> = self
            .counts
            .values()
            .flat_map(|per_season| per_season.keys().copied())
            .collect();
        seasons.sort_unstable();
        seasons.dedup();
        seasons
    }
}

/// Tally every event's outcome at its season.
#[must_use]
pub fn count<'a>(events: impl IntoIterator<Item = &'a RawEvent>) -> OutcomeTally {
    events
        .into_iter()
        .fold(OutcomeTally::new(), |mut tally, event| {
            tally.record(classify_outcome(&event.description), event.season);
            tally
        })
}
