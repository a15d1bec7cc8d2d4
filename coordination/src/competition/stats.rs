//! Running competition statistics
//!
//! One instance per client. Only the engine's fold step writes here;
//! counters only ever grow.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::result::CompetitionOutcome;
use crate::agents::AgentId;

/// Counters for one agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentTally {
    pub wins: u32,
    pub corrections: u32,
    /// Winning times in seconds, one per win, in fold order
    pub response_times: Vec<f64>,
}

impl AgentTally {
    /// Mean winning time, `None` without wins
    pub fn average_response_time(&self) -> Option<f64> {
        if self.response_times.is_empty() {
            return None;
        }
        Some(self.response_times.iter().sum::<f64>() / self.response_times.len() as f64)
    }
}

/// Aggregate statistics over every folded competition.
///
/// Invariants: the wins sum to `total_competitions`, and each agent has
/// exactly one recorded time per win.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionStatistics {
    total_competitions: u64,
    tallies: HashMap<AgentId, AgentTally>,
}

impl Default for CompetitionStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl CompetitionStatistics {
    /// Zeroed counters for every competing agent
    pub fn new() -> Self {
        Self {
            total_competitions: 0,
            tallies: AgentId::competitors()
                .iter()
                .map(|id| (*id, AgentTally::default()))
                .collect(),
        }
    }

    /// Fold one validated result in.
    pub(crate) fn apply(&mut self, outcome: &CompetitionOutcome) {
        self.total_competitions += 1;

        let winner = self.tallies.entry(outcome.winner).or_default();
        winner.wins += 1;
        winner.response_times.push(outcome.winning_time);

        if let Some(correction) = &outcome.correction {
            self.tallies.entry(correction.agent).or_default().corrections += 1;
        }
    }

    pub fn total_competitions(&self) -> u64 {
        self.total_competitions
    }

    /// Counters for an agent; zero for agents that never placed
    pub fn tally(&self, agent: AgentId) -> AgentTally {
        self.tallies.get(&agent).cloned().unwrap_or_default()
    }

    pub fn wins(&self, agent: AgentId) -> u32 {
        self.tallies.get(&agent).map_or(0, |t| t.wins)
    }

    pub fn corrections(&self, agent: AgentId) -> u32 {
        self.tallies.get(&agent).map_or(0, |t| t.corrections)
    }

    pub fn response_times(&self, agent: AgentId) -> &[f64] {
        self.tallies
            .get(&agent)
            .map_or(&[][..], |t| t.response_times.as_slice())
    }

    pub fn average_response_time(&self, agent: AgentId) -> Option<f64> {
        self.tallies
            .get(&agent)
            .and_then(AgentTally::average_response_time)
    }

    /// Tallies in agent declaration order
    pub fn ordered(&self) -> Vec<(AgentId, AgentTally)> {
        AgentId::competitors()
            .iter()
            .map(|id| (*id, self.tally(*id)))
            .collect()
    }
}
