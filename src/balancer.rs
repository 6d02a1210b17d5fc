//! Core balancing logic.
//!
//! This module defines the [`Balancer`] type, which orchestrates the three stages of a request:
//!
//! - Validating the roster and parameters (see [`crate::normalizer`])
//! - Running the partition search: randomized attempts spread over worker threads, under a
//!   wall-clock budget and an attempt ceiling
//! - Aggregating the best partition into a [`BalanceResponse`]
//!
//! # Search
//!
//! Each attempt hands every team its fair share of seats per position, fills them greedily
//! (highest rated first, onto the lowest-total team with a free seat for that position), then
//! improves the partition with pairwise swaps until no swap lowers the fairness score. Attempts get their own seed drawn from a
//! per-request master seed, so a request with a fixed seed always yields the same response as
//! long as the same attempts complete.
//!
//! The time limit is checked before launching each attempt: attempts already running are
//! allowed to finish, and the first attempt always runs. A cancellation flag is honored the same
//! way.
//!
//! # Example
//!
//! ```
//! use team_balancer::prelude::*;
//!
//! let balancer = Balancer::new(Configuration::new().with_workers(2));
//! let roster = vec![
//!     RawPlayer::new("Ana", 5.0, "MID"),
//!     RawPlayer::new("Bo", 4.0, "MID"),
//!     RawPlayer::new("Cy", 2.0, "MID"),
//!     RawPlayer::new("Di", 1.0, "MID"),
//! ];
//! let request = balancer.request_builder(roster).with_seed(7).build().unwrap();
//! let response = balancer.balance(request).unwrap();
//! assert_eq!(response.teams.len(), 2);
//! assert_eq!(response.max_rating_difference, 0.0);
//! ```

use std::{
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
    thread,
    time::{Duration, Instant},
};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, instrument, trace};

use crate::aggregator::{aggregate, BalanceResponse};
use crate::attempt::{AttemptContext, AttemptResult, AttemptSettings};
use crate::attempt_scheduler::AttemptScheduler;
use crate::configuration::Configuration;
use crate::error::{BalanceError, BalanceResult};
use crate::normalizer::{BalanceRequest, BalanceRequestBuilder, RawPlayer};
use crate::objective::{FairnessScore, Objective};
use crate::partition::Partition;

/// The main type for balancing rosters.
///
/// It holds no per-request state and can be shared between threads.
#[derive(Debug, Clone)]
pub struct Balancer {
    config: Configuration,
}

/// Summary of one partition search.
#[derive(Debug, Clone)]
pub struct SearchReport {
    /// Best partition found.
    pub partition: Partition,
    /// Its fairness score.
    pub score: FairnessScore,
    /// Index of the attempt that found it.
    pub best_attempt: usize,
    /// Attempts that ran to completion.
    pub attempts_completed: usize,
    /// Attempts that were started.
    pub attempts_launched: usize,
    /// Wall-clock duration of the search.
    pub elapsed: Duration,
}

impl Balancer {
    /// Create a [`Balancer`] with the given [`Configuration`].
    #[instrument(skip_all)]
    pub fn new(config: Configuration) -> Balancer {
        trace!(?config);
        Balancer { config }
    }

    /// The configuration this balancer was built with.
    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    /// A [`BalanceRequestBuilder`] using the configured defaults and limits.
    pub fn request_builder(&self, players: Vec<RawPlayer>) -> BalanceRequestBuilder {
        BalanceRequestBuilder::new(players)
            .with_defaults(self.config.defaults)
            .with_limits(self.config.limits)
    }

    /// Balances `request` and aggregates the best partition found.
    ///
    /// # Errors
    /// Returns [`BalanceError::SearchExhausted`] if no attempt produced a valid partition.
    pub fn balance(&self, request: BalanceRequest) -> BalanceResult<BalanceResponse> {
        self.balance_with_cancel(request, &AtomicBool::new(false))
    }

    /// Same as [`balance`](Self::balance), but stops launching attempts once `cancel` is set.
    pub fn balance_with_cancel(
        &self,
        request: BalanceRequest,
        cancel: &AtomicBool,
    ) -> BalanceResult<BalanceResponse> {
        let report = self.search(&request, cancel)?;
        Ok(aggregate(&request.players, &report.partition))
    }

    /// Runs the partition search alone.
    #[instrument(skip_all, fields(players = request.players.len(), teams = request.num_teams))]
    pub fn search(
        &self,
        request: &BalanceRequest,
        cancel: &AtomicBool,
    ) -> BalanceResult<SearchReport> {
        let start = Instant::now();

        let mut master = match request.seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        };
        let seeds = (0..request.num_attempts)
            .map(|_| master.gen::<u64>())
            .collect::<Vec<_>>();

        let workers = self.config.workers.min(request.num_attempts);
        let deadline = start + request.time_limit;
        let mut scheduler = AttemptScheduler::new(seeds, workers, deadline);

        let context = AttemptContext {
            roster: &request.players,
            num_teams: request.num_teams,
            objective: Objective::new(&request.players, request.num_teams, self.config.weights),
            max_swap_passes: self.config.max_swap_passes,
        };

        let (tx_result, rx_result) = mpsc::channel::<AttemptResult>();
        thread::scope(|scope| -> BalanceResult<()> {
            let context = &context;
            let launch = |settings: AttemptSettings| {
                let tx_result = tx_result.clone();
                scope.spawn(move || {
                    let result = panic::catch_unwind(AssertUnwindSafe(|| context.run(settings)))
                        .unwrap_or_else(|_| AttemptResult {
                            settings,
                            outcome: Err(BalanceError::Internal(format!("{settings} panicked"))),
                            elapsed: Duration::ZERO,
                        });
                    // the receiver only goes away if the search loop bailed out
                    let _ = tx_result.send(result);
                });
            };

            for settings in scheduler.advance(cancel.load(Ordering::Relaxed)) {
                launch(settings);
            }

            // not finished <=> attempt running <=> result to receive
            while !scheduler.is_finished() {
                let result = rx_result
                    .recv()
                    .map_err(|_| BalanceError::Internal("attempt workers hung up".to_owned()))?;
                for settings in scheduler.on_result(result, cancel.load(Ordering::Relaxed)) {
                    launch(settings);
                }
            }
            Ok(())
        })?;

        let attempts_completed = scheduler.completed();
        let attempts_launched = scheduler.launched();
        let best = scheduler.into_best()?;
        let elapsed = start.elapsed();

        info!(
            attempts_completed,
            attempts_launched,
            best_attempt = best.index,
            score = best.score.total,
            rating_spread = best.score.rating_spread,
            position_penalty = best.score.position_penalty,
            ?elapsed,
            "search finished"
        );

        Ok(SearchReport {
            partition: best.partition,
            score: best.score,
            best_attempt: best.index,
            attempts_completed,
            attempts_launched,
            elapsed,
        })
    }
}
