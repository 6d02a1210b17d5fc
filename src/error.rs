//! Error taxonomy of the balancer.

use thiserror::Error;

/// Everything that can go wrong while balancing a roster.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BalanceError {
    /// A roster field is malformed (bad rating, unknown position, empty name, bad CSV).
    #[error("validation error: {0}")]
    Validation(String),

    /// `num_teams`, `time_limit` or `num_attempts` is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The roster is too small for the requested number of teams.
    #[error("insufficient players: got {players}, need at least {minimum} for {num_teams} teams")]
    InsufficientPlayers {
        /// Roster size.
        players: usize,
        /// Requested team count.
        num_teams: usize,
        /// Smallest acceptable roster size.
        minimum: usize,
    },

    /// No attempt produced a valid partition.
    #[error("search exhausted: {0}")]
    SearchExhausted(String),

    /// Unexpected fault outside the search itself (worker panic, task join failure).
    #[error("internal error: {0}")]
    Internal(String),
}

impl BalanceError {
    /// Short machine-readable kind, used as the `error` field of HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            BalanceError::Validation(_) => "validation_error",
            BalanceError::InvalidParameter(_) => "invalid_parameter",
            BalanceError::InsufficientPlayers { .. } => "insufficient_players",
            BalanceError::SearchExhausted(_) => "search_exhausted",
            BalanceError::Internal(_) => "internal_error",
        }
    }

    /// True for errors caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            BalanceError::Validation(_)
                | BalanceError::InvalidParameter(_)
                | BalanceError::InsufficientPlayers { .. }
        )
    }
}

/// Shorthand used across the crate.
pub type BalanceResult<T> = Result<T, BalanceError>;
