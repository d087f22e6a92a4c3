// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Runtime configuration for the career API.

/// Tunables carried by the server and passed to every handler.
///
/// Values are process-wide and reset on restart; nothing here is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CareerConfig {
    /// How many times a transition is reloaded and re-applied after a
    /// concurrent modification before the conflict is reported.
    pub max_conflict_retries: u32,
    /// Leaderboard size when the caller does not ask for one.
    pub default_leaderboard_limit: usize,
    /// Upper bound on any requested leaderboard size.
    pub max_leaderboard_limit: usize,
}

impl Default for CareerConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: 3,
            default_leaderboard_limit: 10,
            max_leaderboard_limit: 100,
        }
    }
}

impl CareerConfig {
    /// Resolves the leaderboard size for a request.
    ///
    /// Zero and missing values fall back to the default; anything above
    /// the maximum is capped.
    #[must_use]
    pub fn leaderboard_limit(&self, requested: Option<usize>) -> usize {
        let ceiling: usize = self.max_leaderboard_limit.max(1);
        requested
            .filter(|limit| *limit > 0)
            .unwrap_or(self.default_leaderboard_limit)
            .clamp(1, ceiling)
    }
}
