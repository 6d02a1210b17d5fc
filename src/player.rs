//! Player values as they flow through the balancer.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Field position of a player.
///
/// Serialized (and parsed) as the case-sensitive codes `DEF`, `MID` and `ATT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    /// Defender (`DEF`).
    #[serde(rename = "DEF")]
    Defender,
    /// Midfielder (`MID`).
    #[serde(rename = "MID")]
    Midfielder,
    /// Attacker (`ATT`).
    #[serde(rename = "ATT")]
    Attacker,
}

impl Position {
    /// Every position, in `DEF`, `MID`, `ATT` order.
    pub const ALL: [Position; 3] = [Position::Defender, Position::Midfielder, Position::Attacker];

    /// The wire code of this position.
    pub fn code(self) -> &'static str {
        match self {
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Attacker => "ATT",
        }
    }

    /// Dense index used by per-position counters.
    pub(crate) fn index(self) -> usize {
        match self {
            Position::Defender => 0,
            Position::Midfielder => 1,
            Position::Attacker => 2,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Returned when a position code is not one of `DEF`, `MID` or `ATT`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown position '{0}', expected one of DEF, MID, ATT")]
pub struct ParsePositionError(pub String);

impl FromStr for Position {
    type Err = ParsePositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEF" => Ok(Position::Defender),
            "MID" => Ok(Position::Midfielder),
            "ATT" => Ok(Position::Attacker),
            other => Err(ParsePositionError(other.to_owned())),
        }
    }
}

/// A validated roster entry.
///
/// Players have no identity beyond their fields: two entries with the same name are two players.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Display name, never empty.
    pub name: String,
    /// Skill rating in `[0, 5]`.
    pub overall: f64,
    /// Field position.
    pub position: Position,
}

impl Player {
    /// Create a player. No validation happens here, see [`crate::normalizer`].
    pub fn new(name: impl Into<String>, overall: f64, position: Position) -> Player {
        Player {
            name: name.into(),
            overall,
            position,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.position, self.overall)
    }
}
