//! One randomized construction-plus-local-search trial.

use std::{
    fmt::Display,
    time::{Duration, Instant},
};

use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::trace;

use crate::error::{BalanceError, BalanceResult};
use crate::objective::{FairnessScore, Objective, TeamStats};
use crate::partition::Partition;
use crate::player::{Player, Position};

/// Swaps must beat the current score by more than this to count as improvements.
const IMPROVEMENT_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AttemptSettings {
    pub index: usize,
    pub seed: u64,
}

impl Display for AttemptSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "attempt #{}", self.index)
    }
}

/// What an attempt produced.
#[derive(Debug, Clone)]
pub(crate) struct AttemptOutcome {
    pub index: usize,
    pub partition: Partition,
    pub score: FairnessScore,
    pub swaps: usize,
    pub passes: usize,
}

impl AttemptOutcome {
    /// Lower total wins, the earlier attempt wins ties.
    pub fn is_better_than(&self, other: &AttemptOutcome) -> bool {
        self.score.total < other.score.total
            || (self.score.total == other.score.total && self.index < other.index)
    }
}

#[derive(Debug)]
pub(crate) struct AttemptResult {
    pub settings: AttemptSettings,
    pub outcome: BalanceResult<AttemptOutcome>,
    pub elapsed: Duration,
}

/// Read-only inputs shared by every attempt of a search.
#[derive(Debug)]
pub(crate) struct AttemptContext<'a> {
    pub roster: &'a [Player],
    pub num_teams: usize,
    pub objective: Objective,
    pub max_swap_passes: usize,
}

impl AttemptContext<'_> {
    pub fn run(&self, settings: AttemptSettings) -> AttemptResult {
        let start = Instant::now();
        let outcome = self.run_inner(settings);
        AttemptResult {
            settings,
            outcome,
            elapsed: start.elapsed(),
        }
    }

    fn run_inner(&self, settings: AttemptSettings) -> BalanceResult<AttemptOutcome> {
        let mut rng = ChaCha8Rng::seed_from_u64(settings.seed);

        let order = self.construction_order(&mut rng);
        let quotas = self.position_quotas(&mut rng);
        let mut assignment = self.greedy_assignment(&order, &quotas)?;
        let (swaps, passes) = self.hill_climb(&mut assignment);

        let partition = Partition::new(assignment, self.num_teams);
        partition.validate(self.roster.len())?;
        let score = self
            .objective
            .score(&partition.team_stats(self.roster));

        trace!(%settings, swaps, passes, score = score.total);
        Ok(AttemptOutcome {
            index: settings.index,
            partition,
            score,
            swaps,
            passes,
        })
    }

    /// Players in random order, then stably sorted by descending rating.
    ///
    /// Equal ratings end up in random order, across positions as well as within them.
    fn construction_order(&self, rng: &mut ChaCha8Rng) -> Vec<usize> {
        let mut order = (0..self.roster.len()).collect::<Vec<_>>();
        order.shuffle(rng);
        order.sort_by(|&a, &b| self.roster[b].overall.total_cmp(&self.roster[a].overall));
        order
    }

    /// Seats per team and position.
    ///
    /// Dealing the roster round-robin, grouped by position, hands every team `floor` or `ceil`
    /// of each position's share, and team sizes within one of each other. Which teams get the
    /// extra seats depends on the shuffled team and position orders.
    fn position_quotas(&self, rng: &mut ChaCha8Rng) -> Vec<[usize; 3]> {
        let mut teams = (0..self.num_teams).collect::<Vec<_>>();
        teams.shuffle(rng);
        let mut positions = Position::ALL;
        positions.shuffle(rng);

        let mut quotas = vec![[0; 3]; self.num_teams];
        let mut seat = 0;
        for position in positions {
            for _ in 0..self.objective.position_count(position) {
                quotas[teams[seat % self.num_teams]][position.index()] += 1;
                seat += 1;
            }
        }
        quotas
    }

    /// Longest-processing-time-first construction.
    ///
    /// Every player goes to the lowest-total team that still has a free seat for the player's
    /// position. Seats add up to the position counts, so there always is one.
    fn greedy_assignment(
        &self,
        order: &[usize],
        quotas: &[[usize; 3]],
    ) -> BalanceResult<Vec<usize>> {
        let mut stats = vec![TeamStats::default(); self.num_teams];
        let mut assignment = vec![usize::MAX; self.roster.len()];

        for &i in order {
            let player = &self.roster[i];
            let p = player.position.index();
            let team = stats
                .iter()
                .enumerate()
                .filter(|&(team, t)| t.positions[p] < quotas[team][p])
                .min_by(|(_, a), (_, b)| a.total.total_cmp(&b.total))
                .map(|(team, _)| team)
                .ok_or_else(|| {
                    BalanceError::SearchExhausted(format!("no free seat for {player}"))
                })?;

            stats[team].add(player);
            assignment[i] = team;
        }

        Ok(assignment)
    }

    /// First-improvement pairwise swaps. Returns `(swaps, passes)`.
    fn hill_climb(&self, assignment: &mut [usize]) -> (usize, usize) {
        let partition = Partition::new(assignment.to_vec(), self.num_teams);
        let mut stats = partition.team_stats(self.roster);
        let mut current = self.objective.score(&stats);

        let mut swaps = 0;
        let mut passes = 0;
        while passes < self.max_swap_passes {
            passes += 1;
            let mut improved = false;

            for a in 0..self.roster.len() {
                for b in (a + 1)..self.roster.len() {
                    let (ta, tb) = (assignment[a], assignment[b]);
                    let (pa, pb) = (&self.roster[a], &self.roster[b]);
                    if ta == tb || (pa.position == pb.position && pa.overall == pb.overall) {
                        continue;
                    }

                    let (saved_a, saved_b) = (stats[ta], stats[tb]);
                    stats[ta].remove(pa);
                    stats[ta].add(pb);
                    stats[tb].remove(pb);
                    stats[tb].add(pa);

                    let candidate = self.objective.score(&stats);
                    if candidate.total < current.total - IMPROVEMENT_EPSILON {
                        assignment.swap(a, b);
                        current = candidate;
                        swaps += 1;
                        improved = true;
                    } else {
                        stats[ta] = saved_a;
                        stats[tb] = saved_b;
                    }
                }
            }

            if !improved {
                break;
            }
        }

        (swaps, passes)
    }
}
