//! Leaderboard and dashboard projections
//!
//! Pure functions of [`CompetitionStatistics`]; nothing here mutates.

use serde::{Deserialize, Serialize};

use crate::agents::AgentId;
use crate::competition::CompetitionStatistics;

/// One ranked leaderboard line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    /// 1-based
    pub rank: usize,
    pub agent: AgentId,
    pub wins: u32,
    pub corrections: u32,
    /// `None` renders as "no data"
    pub avg_response_time: Option<f64>,
}

/// One bar/slice of a dashboard chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub agent: AgentId,
    pub value: f64,
}

/// Ranks agents by wins
pub struct LeaderboardProjector;

impl LeaderboardProjector {
    /// Rank every competing agent by wins, descending.
    ///
    /// Ties keep agent declaration order (`sort_by` is stable), so equal
    /// wins never reorder between projections.
    pub fn project(stats: &CompetitionStatistics) -> Vec<LeaderboardRow> {
        let mut rows: Vec<LeaderboardRow> = stats
            .ordered()
            .into_iter()
            .map(|(agent, tally)| LeaderboardRow {
                rank: 0,
                agent,
                wins: tally.wins,
                corrections: tally.corrections,
                avg_response_time: tally.average_response_time(),
            })
            .collect();

        rows.sort_by(|a, b| b.wins.cmp(&a.wins));
        for (i, row) in rows.iter_mut().enumerate() {
            row.rank = i + 1;
        }
        rows
    }

    /// Mean winning time per agent in declaration order; 0 without data.
    pub fn response_time_chart(stats: &CompetitionStatistics) -> Vec<ChartPoint> {
        AgentId::competitors()
            .iter()
            .map(|agent| ChartPoint {
                agent: *agent,
                value: stats.average_response_time(*agent).unwrap_or(0.0),
            })
            .collect()
    }

    /// Wins per agent in declaration order
    pub fn win_distribution(stats: &CompetitionStatistics) -> Vec<ChartPoint> {
        AgentId::competitors()
            .iter()
            .map(|agent| ChartPoint {
                agent: *agent,
                value: f64::from(stats.wins(*agent)),
            })
            .collect()
    }
}
