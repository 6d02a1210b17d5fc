//! Turns the winning partition into the response sent to callers.

use serde::{Deserialize, Serialize};

use crate::partition::Partition;
use crate::player::{Player, Position};

/// Number of players per position on one team. All three keys are always serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PositionDistribution {
    /// Defenders.
    #[serde(rename = "DEF")]
    pub def: usize,
    /// Midfielders.
    #[serde(rename = "MID")]
    pub mid: usize,
    /// Attackers.
    #[serde(rename = "ATT")]
    pub att: usize,
}

impl PositionDistribution {
    /// Count for `position`.
    pub fn get(&self, position: Position) -> usize {
        match position {
            Position::Defender => self.def,
            Position::Midfielder => self.mid,
            Position::Attacker => self.att,
        }
    }

    fn increment(&mut self, position: Position) {
        match position {
            Position::Defender => self.def += 1,
            Position::Midfielder => self.mid += 1,
            Position::Attacker => self.att += 1,
        }
    }
}

/// One team of the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamOutput {
    /// 1-based team number.
    pub team_number: usize,
    /// Members, in roster order.
    pub players: Vec<Player>,
    /// Mean rating of the members.
    pub average_rating: f64,
    /// Per-position member counts.
    pub position_distribution: PositionDistribution,
    /// Sum of member ratings.
    pub total_rating: f64,
}

/// Result of a balancing request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceResponse {
    /// One entry per team, ordered by team number.
    pub teams: Vec<TeamOutput>,
    /// Mean rating over the whole roster.
    pub overall_mean: f64,
    /// Largest difference between two team averages.
    pub max_rating_difference: f64,
}

/// Builds the response for `partition` over `roster`.
pub fn aggregate(roster: &[Player], partition: &Partition) -> BalanceResponse {
    let teams = (0..partition.num_teams())
        .map(|team| {
            let players = partition
                .members(team)
                .map(|i| roster[i].clone())
                .collect::<Vec<_>>();
            let total_rating = players.iter().map(|p| p.overall).sum::<f64>();
            let average_rating = if players.is_empty() {
                0.0
            } else {
                total_rating / players.len() as f64
            };
            let mut position_distribution = PositionDistribution::default();
            for player in &players {
                position_distribution.increment(player.position);
            }
            TeamOutput {
                team_number: team + 1,
                players,
                average_rating,
                position_distribution,
                total_rating,
            }
        })
        .collect::<Vec<_>>();

    let overall_mean = if roster.is_empty() {
        0.0
    } else {
        roster.iter().map(|p| p.overall).sum::<f64>() / roster.len() as f64
    };

    BalanceResponse {
        max_rating_difference: max_rating_difference(&teams),
        teams,
        overall_mean,
    }
}

fn max_rating_difference(teams: &[TeamOutput]) -> f64 {
    let mut max_difference = 0.0_f64;
    for (i, a) in teams.iter().enumerate() {
        for b in &teams[i + 1..] {
            max_difference = max_difference.max((a.average_rating - b.average_rating).abs());
        }
    }
    max_difference
}
