//! Fairness objective minimized by the partition search.
//!
//! The score of a partition is a weighted sum of three terms, lower is better:
//!
//! - **rating spread**: highest team average minus lowest team average
//! - **rating variance**: population variance of the team averages, which keeps hill-climbing
//!   moving when a swap improves the middle teams without touching the extremes
//! - **position penalty**: for every team and position, how far the team's count is from the
//!   nearest whole share (`floor` or `ceil` of `count(position) / num_teams`)
//!
//! Ratings lie in `[0, 5]`, so the spread never exceeds 5 and the variance never exceeds 6.25.
//! With the default weights one unit of position penalty costs more than any rating gain, so
//! positional balance always comes first.

use serde::Serialize;

use crate::player::{Player, Position};

/// Relative weight of each objective term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObjectiveWeights {
    /// Weight of the max-min spread of team averages.
    pub rating_spread: f64,
    /// Weight of the variance of team averages.
    pub rating_variance: f64,
    /// Weight of one unit of position penalty. Keep it above
    /// `5 * rating_spread + 6.25 * rating_variance` to never trade positions for ratings.
    pub position_balance: f64,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        ObjectiveWeights {
            rating_spread: 1.0,
            rating_variance: 0.1,
            position_balance: 10.0,
        }
    }
}

/// Score of one partition.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FairnessScore {
    /// Highest minus lowest team average.
    pub rating_spread: f64,
    /// Variance of team averages.
    pub rating_variance: f64,
    /// Sum of per-team, per-position distances to the ideal share.
    pub position_penalty: usize,
    /// Weighted total, the value being minimized.
    pub total: f64,
}

/// Running aggregate of one team, cheap to update on swaps.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct TeamStats {
    pub total: f64,
    pub size: usize,
    pub positions: [usize; 3],
}

impl TeamStats {
    pub fn add(&mut self, player: &Player) {
        self.total += player.overall;
        self.size += 1;
        self.positions[player.position.index()] += 1;
    }

    pub fn remove(&mut self, player: &Player) {
        self.total -= player.overall;
        self.size -= 1;
        self.positions[player.position.index()] -= 1;
    }

    pub fn average(&self) -> f64 {
        if self.size == 0 {
            0.0
        } else {
            self.total / self.size as f64
        }
    }
}

/// Scores partitions of one roster.
#[derive(Debug, Clone)]
pub(crate) struct Objective {
    weights: ObjectiveWeights,
    counts: [usize; 3],
    share_floor: [usize; 3],
    share_ceil: [usize; 3],
}

impl Objective {
    pub fn new(players: &[Player], num_teams: usize, weights: ObjectiveWeights) -> Objective {
        let mut counts = [0usize; 3];
        for player in players {
            counts[player.position.index()] += 1;
        }
        Objective {
            weights,
            counts,
            share_floor: counts.map(|c| c / num_teams),
            share_ceil: counts.map(|c| c.div_ceil(num_teams)),
        }
    }

    /// Number of players of `position` in the roster.
    pub fn position_count(&self, position: Position) -> usize {
        self.counts[position.index()]
    }

    fn position_penalty(&self, team: &TeamStats) -> usize {
        (0..3)
            .map(|i| {
                let count = team.positions[i];
                if count < self.share_floor[i] {
                    self.share_floor[i] - count
                } else if count > self.share_ceil[i] {
                    count - self.share_ceil[i]
                } else {
                    0
                }
            })
            .sum()
    }

    pub fn score(&self, teams: &[TeamStats]) -> FairnessScore {
        let averages = teams.iter().map(TeamStats::average).collect::<Vec<_>>();
        let max = averages.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = averages.iter().copied().fold(f64::INFINITY, f64::min);
        let rating_spread = if averages.is_empty() { 0.0 } else { max - min };

        let mean = averages.iter().sum::<f64>() / averages.len().max(1) as f64;
        let rating_variance = averages.iter().map(|a| (a - mean).powi(2)).sum::<f64>()
            / averages.len().max(1) as f64;

        let position_penalty = teams.iter().map(|t| self.position_penalty(t)).sum();

        let total = self.weights.rating_spread * rating_spread
            + self.weights.rating_variance * rating_variance
            + self.weights.position_balance * position_penalty as f64;

        FairnessScore {
            rating_spread,
            rating_variance,
            position_penalty,
            total,
        }
    }
}
