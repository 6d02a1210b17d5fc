//! Validates raw rosters and request parameters.
//!
//! This module turns untrusted input (decoded CSV rows or a JSON player list, plus the request
//! parameters) into a [`BalanceRequest`] the search can rely on.
//!
//! # Overview
//!
//! The main entry point is the [`BalanceRequestBuilder`] struct, which uses a builder pattern
//! to collect parameters before validating everything at once in
//! [`build`](BalanceRequestBuilder::build):
//!
//! - **Parameters**: `num_teams` in `[2, 10]`, a positive finite `time_limit` no larger than the
//!   configured maximum, and `num_attempts` between one and the configured maximum
//! - **Rows**: non-empty name, `overall` a number in `[0, 5]`, `position` one of `DEF`/`MID`/`ATT`
//! - **Roster size**: at least four players and at least one player per team
//!
//! Parameters are checked first, then each row in order, then the roster size. Parameters left
//! unset fall back to [`RequestDefaults`].
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use team_balancer::normalizer::{BalanceRequestBuilder, RawPlayer};
//!
//! let roster = vec![
//!     RawPlayer::new("Ana", 4.0, "DEF"),
//!     RawPlayer::new("Bo", 3.0, "MID"),
//!     RawPlayer::new("Cy", 2.5, "ATT"),
//!     RawPlayer::new("Di", 3.5, "MID"),
//! ];
//!
//! let request = BalanceRequestBuilder::new(roster)
//!     .with_num_teams(2)
//!     .with_time_limit(Duration::from_secs(5))
//!     .with_num_attempts(10)
//!     .build()
//!     .unwrap();
//! assert_eq!(request.players().len(), 4);
//! ```
//!
//! Normalization is idempotent: feeding [`BalanceRequest::players`] back through the builder
//! yields the identical roster.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::{BalanceError, BalanceResult};
use crate::player::{Player, Position};

/// Smallest accepted team count.
pub const MIN_TEAMS: usize = 2;
/// Largest accepted team count.
pub const MAX_TEAMS: usize = 10;
/// Smallest accepted roster, regardless of the team count.
pub const MIN_PLAYERS: usize = 4;
/// Highest accepted rating.
pub const MAX_RATING: f64 = 5.0;

/// A rating as it arrives on the wire: a JSON number or text from a CSV cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawRating {
    /// Already numeric.
    Number(f64),
    /// Still needs parsing.
    Text(String),
}

impl fmt::Display for RawRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawRating::Number(n) => write!(f, "{n}"),
            RawRating::Text(s) => write!(f, "{s}"),
        }
    }
}

/// An unvalidated roster row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPlayer {
    /// Player name, trimmed during normalization.
    #[serde(default)]
    pub name: String,
    /// Rating, missing when the row did not provide one.
    #[serde(default)]
    pub overall: Option<RawRating>,
    /// Position code.
    #[serde(default)]
    pub position: String,
}

impl RawPlayer {
    /// Convenience constructor for an already numeric row.
    pub fn new(name: impl Into<String>, overall: f64, position: impl Into<String>) -> RawPlayer {
        RawPlayer {
            name: name.into(),
            overall: Some(RawRating::Number(overall)),
            position: position.into(),
        }
    }
}

impl From<&Player> for RawPlayer {
    fn from(player: &Player) -> Self {
        RawPlayer::new(player.name.clone(), player.overall, player.position.code())
    }
}

/// Values used for parameters the caller did not set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestDefaults {
    /// Default team count.
    pub num_teams: usize,
    /// Default search budget.
    pub time_limit: Duration,
    /// Default attempt ceiling.
    pub num_attempts: usize,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        RequestDefaults {
            num_teams: 2,
            time_limit: Duration::from_secs(30),
            num_attempts: 5,
        }
    }
}

/// Upper bounds the service enforces on caller-supplied parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestLimits {
    /// Largest accepted search budget.
    pub max_time_limit: Duration,
    /// Largest accepted attempt ceiling.
    pub max_attempts: usize,
}

impl Default for RequestLimits {
    fn default() -> Self {
        RequestLimits {
            max_time_limit: Duration::from_secs(300),
            max_attempts: 1000,
        }
    }
}

/// A builder collecting a raw roster and its parameters.
///
/// Nothing is validated until [`build`](Self::build) is called.
#[derive(Debug, Default)]
pub struct BalanceRequestBuilder {
    players: Vec<RawPlayer>,
    num_teams: Option<usize>,
    time_limit_secs: Option<f64>,
    num_attempts: Option<usize>,
    seed: Option<u64>,
    defaults: RequestDefaults,
    limits: RequestLimits,
}

impl BalanceRequestBuilder {
    /// Creates a builder for `players` with default parameters and limits.
    #[must_use]
    pub fn new(players: Vec<RawPlayer>) -> Self {
        Self {
            players,
            ..Self::default()
        }
    }

    /// Sets the number of teams to form.
    #[must_use]
    pub fn with_num_teams(self, num_teams: usize) -> Self {
        Self {
            num_teams: Some(num_teams),
            ..self
        }
    }

    /// Sets the total wall-clock budget of the search.
    #[must_use]
    pub fn with_time_limit(self, time_limit: Duration) -> Self {
        self.with_time_limit_secs(time_limit.as_secs_f64())
    }

    /// Sets the search budget in (possibly fractional) seconds, as received from callers.
    ///
    /// Non-finite or non-positive values are rejected by [`build`](Self::build).
    #[must_use]
    pub fn with_time_limit_secs(self, secs: f64) -> Self {
        Self {
            time_limit_secs: Some(secs),
            ..self
        }
    }

    /// Sets the maximum number of randomized attempts.
    #[must_use]
    pub fn with_num_attempts(self, num_attempts: usize) -> Self {
        Self {
            num_attempts: Some(num_attempts),
            ..self
        }
    }

    /// Fixes the random seed of the search, making the result reproducible.
    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..self
        }
    }

    /// Sets the fallback values for unset parameters.
    #[must_use]
    pub fn with_defaults(self, defaults: RequestDefaults) -> Self {
        Self { defaults, ..self }
    }

    /// Sets the upper bounds enforced on parameters.
    #[must_use]
    pub fn with_limits(self, limits: RequestLimits) -> Self {
        Self { limits, ..self }
    }

    /// Consumes the builder and returns a validated [`BalanceRequest`].
    ///
    /// # Errors
    ///
    /// - [`BalanceError::InvalidParameter`] when a parameter is out of range
    /// - [`BalanceError::Validation`] for the first malformed row
    /// - [`BalanceError::InsufficientPlayers`] when the roster cannot fill the teams
    pub fn build(self) -> BalanceResult<BalanceRequest> {
        let num_teams = self.num_teams.unwrap_or(self.defaults.num_teams);
        if !(MIN_TEAMS..=MAX_TEAMS).contains(&num_teams) {
            return Err(BalanceError::InvalidParameter(format!(
                "num_teams must be between {MIN_TEAMS} and {MAX_TEAMS}, got {num_teams}"
            )));
        }

        let time_limit = match self.time_limit_secs {
            None => self.defaults.time_limit,
            Some(secs) => {
                let max = self.limits.max_time_limit.as_secs_f64();
                if !secs.is_finite() || secs <= 0.0 || secs > max {
                    return Err(BalanceError::InvalidParameter(format!(
                        "time_limit must be a positive number of seconds no larger than {max}, got {secs}"
                    )));
                }
                Duration::from_secs_f64(secs)
            }
        };

        let num_attempts = self.num_attempts.unwrap_or(self.defaults.num_attempts);
        if num_attempts == 0 || num_attempts > self.limits.max_attempts {
            return Err(BalanceError::InvalidParameter(format!(
                "num_attempts must be between 1 and {}, got {num_attempts}",
                self.limits.max_attempts
            )));
        }

        let players = normalize_roster(&self.players)?;

        let minimum = MIN_PLAYERS.max(num_teams);
        if players.len() < minimum {
            return Err(BalanceError::InsufficientPlayers {
                players: players.len(),
                num_teams,
                minimum,
            });
        }

        Ok(BalanceRequest {
            players,
            num_teams,
            time_limit,
            num_attempts,
            seed: self.seed,
        })
    }
}

/// A validated balancing request. Obtained using [`BalanceRequestBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceRequest {
    pub(crate) players: Vec<Player>,
    pub(crate) num_teams: usize,
    pub(crate) time_limit: Duration,
    pub(crate) num_attempts: usize,
    pub(crate) seed: Option<u64>,
}

impl BalanceRequest {
    /// Creates a [`BalanceRequestBuilder`].
    pub fn builder(players: Vec<RawPlayer>) -> BalanceRequestBuilder {
        BalanceRequestBuilder::new(players)
    }

    /// The normalized roster, in input order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Number of teams to form.
    pub fn num_teams(&self) -> usize {
        self.num_teams
    }

    /// Total search budget.
    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }

    /// Attempt ceiling.
    pub fn num_attempts(&self) -> usize {
        self.num_attempts
    }

    /// Fixed seed, if any.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

/// Validates every row of `rows`, failing on the first malformed one.
pub fn normalize_roster(rows: &[RawPlayer]) -> BalanceResult<Vec<Player>> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| normalize_player(i + 1, row))
        .collect()
}

/// Validates one row. `row_number` is 1-based and only used in error messages.
pub fn normalize_player(row_number: usize, raw: &RawPlayer) -> BalanceResult<Player> {
    let name = raw.name.trim();
    if name.is_empty() {
        return Err(BalanceError::Validation(format!(
            "player #{row_number}: name must not be empty"
        )));
    }

    let overall = match &raw.overall {
        None => {
            return Err(BalanceError::Validation(format!(
                "player #{row_number} ({name}): missing overall rating"
            )))
        }
        Some(RawRating::Number(n)) => *n,
        Some(RawRating::Text(s)) => s.trim().parse::<f64>().map_err(|_| {
            BalanceError::Validation(format!(
                "player #{row_number} ({name}): overall '{s}' is not a number"
            ))
        })?,
    };
    if !overall.is_finite() || !(0.0..=MAX_RATING).contains(&overall) {
        return Err(BalanceError::Validation(format!(
            "player #{row_number} ({name}): overall must be between 0 and {MAX_RATING}, got {overall}"
        )));
    }

    let position = raw
        .position
        .trim()
        .parse::<Position>()
        .map_err(|e| BalanceError::Validation(format!("player #{row_number} ({name}): {e}")))?;

    Ok(Player::new(name, overall, position))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(n: usize) -> Vec<RawPlayer> {
        (0..n)
            .map(|i| RawPlayer::new(format!("p{i}"), (i % 6) as f64, "MID"))
            .collect()
    }

    #[test]
    fn test_defaults_are_applied() {
        let request = BalanceRequestBuilder::new(roster(6)).build().unwrap();
        assert_eq!(request.num_teams(), 2);
        assert_eq!(request.time_limit(), Duration::from_secs(30));
        assert_eq!(request.num_attempts(), 5);
        assert_eq!(request.seed(), None);
    }

    #[test]
    fn test_num_teams_out_of_range() {
        for n in [0, 1, 11] {
            let err = BalanceRequestBuilder::new(roster(20))
                .with_num_teams(n)
                .build()
                .unwrap_err();
            assert!(matches!(err, BalanceError::InvalidParameter(_)), "{err}");
        }
    }

    #[test]
    fn test_time_limit_and_attempts_out_of_range() {
        for secs in [0.0, -1.0, f64::NAN, f64::INFINITY, 301.0] {
            let err = BalanceRequestBuilder::new(roster(6))
                .with_time_limit_secs(secs)
                .build()
                .unwrap_err();
            assert!(matches!(err, BalanceError::InvalidParameter(_)));
        }
        let err = BalanceRequestBuilder::new(roster(6))
            .with_num_attempts(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, BalanceError::InvalidParameter(_)));

        let err = BalanceRequestBuilder::new(roster(6))
            .with_limits(RequestLimits {
                max_time_limit: Duration::from_secs(1),
                max_attempts: 3,
            })
            .with_num_attempts(4)
            .build()
            .unwrap_err();
        assert!(matches!(err, BalanceError::InvalidParameter(_)));
    }

    #[test]
    fn test_fractional_time_limit() {
        let request = BalanceRequestBuilder::new(roster(6))
            .with_time_limit_secs(0.25)
            .build()
            .unwrap();
        assert_eq!(request.time_limit(), Duration::from_millis(250));
    }

    #[test]
    fn test_rating_validation() {
        for overall in [-0.1, 5.01, f64::NAN] {
            let rows = vec![RawPlayer::new("a", overall, "DEF")];
            assert!(matches!(
                normalize_roster(&rows),
                Err(BalanceError::Validation(_))
            ));
        }
        let text = RawPlayer {
            name: "a".into(),
            overall: Some(RawRating::Text(" 4.5 ".into())),
            position: "ATT".into(),
        };
        assert_eq!(normalize_player(1, &text).unwrap().overall, 4.5);

        let bad_text = RawPlayer {
            overall: Some(RawRating::Text("four".into())),
            ..text.clone()
        };
        assert!(normalize_player(1, &bad_text).is_err());

        let missing = RawPlayer {
            overall: None,
            ..text
        };
        assert!(normalize_player(1, &missing).is_err());
    }

    #[test]
    fn test_bounds_are_inclusive() {
        assert!(normalize_player(1, &RawPlayer::new("a", 0.0, "DEF")).is_ok());
        assert!(normalize_player(1, &RawPlayer::new("a", 5.0, "DEF")).is_ok());
    }

    #[test]
    fn test_position_and_name_validation() {
        let err = normalize_player(3, &RawPlayer::new("a", 3.0, "mid")).unwrap_err();
        assert!(matches!(&err, BalanceError::Validation(msg) if msg.contains("#3")));
        assert!(normalize_player(1, &RawPlayer::new("   ", 3.0, "MID")).is_err());
    }

    #[test]
    fn test_first_bad_row_is_reported() {
        let mut rows = roster(6);
        rows[2].position = "GK".into();
        rows[4].name = String::new();
        let err = BalanceRequestBuilder::new(rows).build().unwrap_err();
        assert!(matches!(&err, BalanceError::Validation(msg) if msg.contains("#3")));
    }

    #[test]
    fn test_insufficient_players() {
        let err = BalanceRequestBuilder::new(roster(3)).build().unwrap_err();
        assert_eq!(
            err,
            BalanceError::InsufficientPlayers {
                players: 3,
                num_teams: 2,
                minimum: 4
            }
        );

        let err = BalanceRequestBuilder::new(roster(5))
            .with_num_teams(6)
            .build()
            .unwrap_err();
        assert!(matches!(err, BalanceError::InsufficientPlayers { minimum: 6, .. }));

        assert!(BalanceRequestBuilder::new(roster(6))
            .with_num_teams(6)
            .build()
            .is_ok());
    }

    #[test]
    fn test_parameters_are_checked_before_rows() {
        let rows = vec![RawPlayer::new("", 9.0, "??")];
        let err = BalanceRequestBuilder::new(rows)
            .with_num_teams(42)
            .build()
            .unwrap_err();
        assert!(matches!(err, BalanceError::InvalidParameter(_)));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let rows = vec![
            RawPlayer::new("  Ana ", 4.0, "DEF"),
            RawPlayer::new("Bo", 3.25, " MID"),
            RawPlayer::new("Cy", 0.0, "ATT"),
            RawPlayer::new("Cy", 5.0, "ATT"),
        ];
        let once = normalize_roster(&rows).unwrap();
        let again = normalize_roster(&once.iter().map(RawPlayer::from).collect::<Vec<_>>()).unwrap();
        assert_eq!(once, again);
        assert_eq!(once[0].name, "Ana");
    }
}
