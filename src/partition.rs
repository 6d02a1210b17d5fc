//! Candidate solutions of the search.

use crate::error::{BalanceError, BalanceResult};
use crate::objective::TeamStats;
use crate::player::Player;

/// Assignment of every roster player (by index) to a team in `0..num_teams`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    assignment: Vec<usize>,
    num_teams: usize,
}

impl Partition {
    pub(crate) fn new(assignment: Vec<usize>, num_teams: usize) -> Partition {
        Partition {
            assignment,
            num_teams,
        }
    }

    /// Number of teams.
    pub fn num_teams(&self) -> usize {
        self.num_teams
    }

    /// Team index of each player, in roster order.
    pub fn assignment(&self) -> &[usize] {
        &self.assignment
    }

    /// Roster indices of the members of `team`, in roster order.
    pub fn members(&self, team: usize) -> impl Iterator<Item = usize> + '_ {
        self.assignment
            .iter()
            .enumerate()
            .filter(move |(_, &t)| t == team)
            .map(|(i, _)| i)
    }

    /// Size of every team.
    pub fn team_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.num_teams];
        for &team in &self.assignment {
            if let Some(size) = sizes.get_mut(team) {
                *size += 1;
            }
        }
        sizes
    }

    /// Checks that every one of the `roster_len` players sits on exactly one existing team and
    /// that no team is empty.
    pub fn validate(&self, roster_len: usize) -> BalanceResult<()> {
        if self.assignment.len() != roster_len {
            return Err(BalanceError::SearchExhausted(format!(
                "partition covers {} players, roster has {roster_len}",
                self.assignment.len()
            )));
        }
        if let Some(team) = self.assignment.iter().find(|&&t| t >= self.num_teams) {
            return Err(BalanceError::SearchExhausted(format!(
                "player assigned to team {team}, only {} teams exist",
                self.num_teams
            )));
        }
        if let Some(team) = self.team_sizes().iter().position(|&size| size == 0) {
            return Err(BalanceError::SearchExhausted(format!("team {team} is empty")));
        }
        Ok(())
    }

    /// Recomputes team aggregates from scratch.
    pub(crate) fn team_stats(&self, roster: &[Player]) -> Vec<TeamStats> {
        let mut stats = vec![TeamStats::default(); self.num_teams];
        for (player, &team) in roster.iter().zip(&self.assignment) {
            stats[team].add(player);
        }
        stats
    }
}
