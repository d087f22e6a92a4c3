// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Rank ladder lookup.
//!
//! Ranks are a pure function of accumulated flight time. The ladder is
//! configuration supplied by the operator; [`RankTable::standard`] is the
//! built-in default.

use crate::error::DomainError;
use crate::types::FlightTime;
use serde::{Deserialize, Serialize};

/// One step of the rank ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rank {
    /// Display name.
    pub name: String,
    /// Hours required to hold this rank.
    pub min_hours: u32,
    /// What the rank unlocks.
    pub unlock_description: String,
}

impl Rank {
    /// Creates a new rank step.
    #[must_use]
    pub fn new(name: &str, min_hours: u32, unlock_description: &str) -> Self {
        Self {
            name: name.to_string(),
            min_hours,
            unlock_description: unlock_description.to_string(),
        }
    }

    const fn min_minutes(&self) -> i64 {
        self.min_hours as i64 * 60
    }
}

/// The result of a rank lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankProgress {
    /// The rank currently held.
    pub rank_name: String,
    /// What the current rank unlocks.
    pub unlock_description: String,
    /// The next rank, if any.
    pub next_rank_name: Option<String>,
    /// Hours required for the next rank, if any.
    pub next_rank_hours: Option<u32>,
}

/// An ordered rank ladder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankTable {
    ranks: Vec<Rank>,
}

impl RankTable {
    /// Creates a rank table.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidRankTable` if the ladder is empty, does
    /// not start at zero hours, or is not strictly ascending.
    pub fn new(ranks: Vec<Rank>) -> Result<Self, DomainError> {
        let Some(first) = ranks.first() else {
            return Err(DomainError::InvalidRankTable(String::from(
                "at least one rank is required",
            )));
        };
        if first.min_hours != 0 {
            return Err(DomainError::InvalidRankTable(format!(
                "first rank '{}' must start at 0 hours",
                first.name
            )));
        }
        for pair in ranks.windows(2) {
            if pair[1].min_hours <= pair[0].min_hours {
                return Err(DomainError::InvalidRankTable(format!(
                    "rank '{}' must require more hours than '{}'",
                    pair[1].name, pair[0].name
                )));
            }
        }
        if ranks.iter().any(|r| r.name.trim().is_empty()) {
            return Err(DomainError::InvalidRankTable(String::from(
                "rank names must not be empty",
            )));
        }
        Ok(Self { ranks })
    }

    /// The built-in ten-step ladder.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            ranks: vec![
                Rank::new("Cadet", 0, "Short-haul routes and group flights"),
                Rank::new("First Officer", 10, "Medium-haul routes"),
                Rank::new("Senior First Officer", 50, "Route of the week suggestions"),
                Rank::new("Captain", 100, "All short, medium and long-haul routes"),
                Rank::new("Senior Captain", 200, "Partner airline routes"),
                Rank::new("Elite Captain", 400, "Lounge access"),
                Rank::new("Crown Captain", 700, "One-time points multiplier"),
                Rank::new("Special Commander", 1000, "Gate selection for events"),
                Rank::new("Falcon Commander", 1500, "Personal route of the week"),
                Rank::new("Sultan of the Skies", 2500, "Highest rank"),
            ],
        }
    }

    /// Returns the ranks in ascending order.
    #[must_use]
    pub fn ranks(&self) -> &[Rank] {
        &self.ranks
    }

    /// Returns the entry rank.
    #[must_use]
    pub fn entry_rank(&self) -> &Rank {
        // `new` and `standard` both guarantee a non-empty ladder.
        &self.ranks[0]
    }

    /// Looks up the rank held for the given accumulated flight time.
    #[must_use]
    pub fn rank_for(&self, flight_time: FlightTime) -> RankProgress {
        let index: usize = self
            .ranks
            .iter()
            .rposition(|r| flight_time.minutes() >= r.min_minutes())
            .unwrap_or(0);
        let current: &Rank = &self.ranks[index];
        let next: Option<&Rank> = self.ranks.get(index + 1);

        RankProgress {
            rank_name: current.name.clone(),
            unlock_description: current.unlock_description.clone(),
            next_rank_name: next.map(|r| r.name.clone()),
            next_rank_hours: next.map(|r| r.min_hours),
        }
    }
}

impl Default for RankTable {
    fn default() -> Self {
        Self::standard()
    }
}
