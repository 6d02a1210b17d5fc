//! # Team Balancer
//!
//! A modular Rust crate for splitting a roster of players into fair teams, and the HTTP service
//! exposing it.
//!
//! It provides:
//! - Roster validation and request building (`BalanceRequestBuilder`)
//! - A randomized partition search under a time budget (`Balancer`)
//! - Per-team statistics of the winning partition (`BalanceResponse`)
//! - An axum router serving `POST /balance/csv` and `POST /balance/json`
//!
//! Each player has a name, a rating between 0 and 5 and a position (`DEF`, `MID` or `ATT`). The
//! search minimizes the spread of team average ratings while spreading every position evenly
//! across teams, and team sizes never differ by more than one.
//!
//! # Documentation Overview
//!
//! - For the search itself and its time budget, see the [`balancer`] module.
//! - For validation rules and request parameters, see [`normalizer`].
//! - For the fairness score, see [`objective`].
//! - For service settings and environment variables, see
//!   [`Configuration`](crate::configuration::Configuration).
//! - For the HTTP routes and error bodies, see [`api`].
//!
//! # Usage Example
//!
//! ```
//! use team_balancer::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let csv = "name,overall,position\n\
//!                Ana,5,DEF\nBo,4,MID\nCy,4,ATT\nDi,3,DEF\n\
//!                Ed,3,MID\nFa,2,ATT\nGu,2,MID\nHo,1,DEF\n";
//!
//!     let balancer = Balancer::new(Configuration::new());
//!     let request = balancer
//!         .request_builder(read_csv_roster(csv.as_bytes())?)
//!         .with_num_teams(2)
//!         .with_num_attempts(20)
//!         .build()?;
//!
//!     let response = balancer.balance(request)?;
//!     for team in &response.teams {
//!         println!("team {}: {:.2}", team.team_number, team.average_rating);
//!     }
//!     println!("max difference: {:.2}", response.max_rating_difference);
//!     Ok(())
//! }
//! ```
#![warn(missing_docs)]

pub mod aggregator;
pub mod api;
mod attempt;
mod attempt_scheduler;
pub mod balancer;
pub mod configuration;
pub mod error;
pub mod logger;
pub mod normalizer;
pub mod objective;
pub mod partition;
pub mod player;
pub mod roster;

/// Commonly used types and functions for quick access.
///
/// Import this prelude to get started easily:
/// ```rust
/// use team_balancer::prelude::*;
/// ```
///
/// Includes:
/// - [`Balancer`](crate::balancer::Balancer) and [`Configuration`](crate::configuration::Configuration)
/// - request building: [`BalanceRequestBuilder`](crate::normalizer::BalanceRequestBuilder), [`RawPlayer`](crate::normalizer::RawPlayer)
/// - results: [`BalanceResponse`](crate::aggregator::BalanceResponse), [`TeamOutput`](crate::aggregator::TeamOutput)
/// - [`BalanceError`](crate::error::BalanceError)
pub mod prelude {
    pub use crate::aggregator::{BalanceResponse, PositionDistribution, TeamOutput};
    pub use crate::balancer::{Balancer, SearchReport};
    pub use crate::configuration::Configuration;
    pub use crate::error::{BalanceError, BalanceResult};
    pub use crate::normalizer::{BalanceRequest, BalanceRequestBuilder, RawPlayer};
    pub use crate::player::{Player, Position};
    pub use crate::roster::read_csv_roster;
}
