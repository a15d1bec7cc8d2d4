//! Validation of `/api/compete` replies
//!
//! A reply is accepted whole or not at all: any missing or ill-typed field
//! rejects it before statistics are touched.

use crate::agents::AgentId;
use crate::backend::CompeteReply;
use crate::conversation::{Analysis, CompetitionExchange, Correction};
use crate::error::{PanelError, PanelResult};

/// A validated competition result
#[derive(Debug, Clone, PartialEq)]
pub struct CompetitionOutcome {
    pub winner: AgentId,
    pub winning_response: String,
    pub winning_time: f64,
    pub winning_provider: Option<String>,
    /// In agent declaration order
    pub analyses: Vec<Analysis>,
    pub correction: Option<Correction>,
}

/// How a reply is interpreted
#[derive(Debug, Clone, PartialEq)]
pub enum CompetitionVerdict {
    /// A result to fold in
    Decided(CompetitionOutcome),
    /// The backend answered with an `error` message
    Rejected(String),
}

fn malformed(msg: impl Into<String>) -> PanelError {
    PanelError::MalformedResponse(msg.into())
}

fn competitor(field: &str, raw: &str) -> PanelResult<AgentId> {
    AgentId::parse_competitor(raw)
        .map_err(|_| malformed(format!("{} '{}' is not a competing agent", field, raw)))
}

impl CompetitionVerdict {
    /// Interpret a reply. `error` takes precedence over any result fields.
    pub fn from_reply(reply: CompeteReply) -> PanelResult<Self> {
        if let Some(error) = reply.error {
            return Ok(CompetitionVerdict::Rejected(error));
        }

        let winner = reply
            .winner
            .as_deref()
            .ok_or_else(|| malformed("missing winner"))
            .and_then(|raw| competitor("winner", raw))?;

        let winning_response = reply
            .winning_response
            .ok_or_else(|| malformed("missing winning_response"))?;

        let winning_time = reply
            .winning_time
            .ok_or_else(|| malformed("missing winning_time"))?;
        if !winning_time.is_finite() || winning_time < 0.0 {
            return Err(malformed(format!(
                "winning_time {} is not a non-negative duration",
                winning_time
            )));
        }

        let raw_analyses = reply.analyses.ok_or_else(|| malformed("missing analyses"))?;
        let mut analyses = Vec::with_capacity(raw_analyses.len());
        for (agent, text) in raw_analyses {
            analyses.push(Analysis {
                agent: competitor("analysis agent", &agent)?,
                text,
            });
        }
        analyses.sort_by_key(|a| a.agent);

        let correction = if reply.correction_needed.unwrap_or(false) {
            let agent = reply
                .correction_winner
                .as_deref()
                .ok_or_else(|| malformed("correction_needed without correction_winner"))
                .and_then(|raw| competitor("correction_winner", raw))?;
            let response = reply
                .correction_response
                .ok_or_else(|| malformed("correction_needed without correction_response"))?;
            Some(Correction { agent, response })
        } else {
            if reply.correction_winner.is_some() || reply.correction_response.is_some() {
                return Err(malformed("correction fields present without correction_needed"));
            }
            None
        };

        Ok(CompetitionVerdict::Decided(CompetitionOutcome {
            winner,
            winning_response,
            winning_time,
            winning_provider: reply.winning_provider,
            analyses,
            correction,
        }))
    }
}

impl From<CompetitionOutcome> for CompetitionExchange {
    fn from(outcome: CompetitionOutcome) -> Self {
        CompetitionExchange {
            winner: outcome.winner,
            winning_response: outcome.winning_response,
            winning_time: outcome.winning_time,
            winning_provider: outcome.winning_provider,
            analyses: outcome.analyses,
            correction: outcome.correction,
        }
    }
}
