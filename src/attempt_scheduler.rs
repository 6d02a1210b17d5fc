use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::attempt::{AttemptOutcome, AttemptResult, AttemptSettings};
use crate::error::BalanceError;

/// Decides which attempts run next and keeps the best outcome.
///
/// Attempts are launched while a worker is free, the attempt ceiling is not reached and the
/// deadline has not passed. The first attempt is always launched, whatever the deadline.
pub(crate) struct AttemptScheduler {
    seeds: Vec<u64>,
    next_attempt: usize,
    running_attempts: usize,
    workers: usize,
    deadline: Instant,
    best: Option<AttemptOutcome>,
    completed: usize,
    last_error: Option<BalanceError>,
    is_finished: bool,
}

impl AttemptScheduler {
    pub fn new(seeds: Vec<u64>, workers: usize, deadline: Instant) -> Self {
        AttemptScheduler {
            seeds,
            next_attempt: 0,
            running_attempts: 0,
            workers: workers.max(1),
            deadline,
            best: None,
            completed: 0,
            last_error: None,
            is_finished: false,
        }
    }

    pub fn advance(&mut self, cancelled: bool) -> Vec<AttemptSettings> {
        let mut attempts_to_run = vec![];

        while self.running_attempts + attempts_to_run.len() < self.workers
            && self.next_attempt < self.seeds.len()
        {
            if self.next_attempt > 0 {
                if cancelled {
                    trace!("cancelled, no more attempts");
                    break;
                }
                if Instant::now() >= self.deadline {
                    trace!("time limit reached, no more attempts");
                    break;
                }
            }
            attempts_to_run.push(AttemptSettings {
                index: self.next_attempt,
                seed: self.seeds[self.next_attempt],
            });
            self.next_attempt += 1;
        }

        self.running_attempts += attempts_to_run.len();
        if self.running_attempts == 0 {
            trace!("no more attempts");
            self.is_finished = true;
        }
        attempts_to_run
    }

    pub fn on_result(&mut self, result: AttemptResult, cancelled: bool) -> Vec<AttemptSettings> {
        self.running_attempts -= 1;
        match result.outcome {
            Ok(outcome) => {
                debug!(
                    attempt = outcome.index,
                    score = outcome.score.total,
                    swaps = outcome.swaps,
                    passes = outcome.passes,
                    elapsed = ?result.elapsed,
                );
                self.completed += 1;
                if self
                    .best
                    .as_ref()
                    .map_or(true, |best| outcome.is_better_than(best))
                {
                    self.best = Some(outcome);
                }
            }
            Err(e) => {
                warn!(attempt = %result.settings, error = %e, "attempt failed");
                self.last_error = Some(e);
            }
        }
        self.advance(cancelled)
    }

    /// All launched attempts reported back and no new one will start.
    pub fn is_finished(&self) -> bool {
        self.is_finished
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn launched(&self) -> usize {
        self.next_attempt
    }

    pub fn into_best(self) -> Result<AttemptOutcome, BalanceError> {
        match (self.best, self.last_error) {
            (Some(best), _) => Ok(best),
            (None, Some(e)) => Err(e),
            (None, None) => Err(BalanceError::SearchExhausted(
                "no attempt completed".to_owned(),
            )),
        }
    }
}
