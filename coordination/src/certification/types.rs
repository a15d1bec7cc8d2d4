//! Certification records and the views derived from them

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::agents::AgentId;
use crate::backend::StatusEntry;
use crate::error::{PanelError, PanelResult};

/// Backend-reported certification state of one agent.
///
/// `certified` and `training_in_progress` are never both true; a payload
/// claiming otherwise is rejected before it reaches the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificationRecord {
    pub certified: bool,
    pub final_score: Option<f64>,
    pub certification_date: Option<DateTime<Utc>>,
    pub training_in_progress: bool,
    /// Percent, 0–100
    pub progress: f64,
}

impl CertificationRecord {
    /// Validate one status entry.
    pub fn from_entry(agent: AgentId, entry: &StatusEntry) -> PanelResult<Self> {
        let training_in_progress = entry.training_in_progress.unwrap_or(false);
        if entry.certified && training_in_progress {
            return Err(PanelError::MalformedResponse(format!(
                "{} reported as both certified and in training",
                agent
            )));
        }

        let progress = entry
            .progress
            .filter(|p| p.is_finite())
            .unwrap_or(0.0)
            .clamp(0.0, 100.0);

        let certification_date = entry.certification_date.as_deref().and_then(|raw| {
            let parsed = parse_timestamp(raw);
            if parsed.is_none() {
                warn!(agent = %agent, raw, "Unparseable certification date, treating as absent");
            }
            parsed
        });

        Ok(Self {
            certified: entry.certified,
            final_score: entry.reported_score(),
            certification_date,
            training_in_progress,
            progress,
        })
    }

    /// Derive the badge shown next to the agent.
    pub fn badge(&self) -> BadgeState {
        if self.certified {
            BadgeState::Certified {
                score: self.final_score,
                date: self.certification_date,
            }
        } else if self.training_in_progress {
            BadgeState::Pending {
                progress: self.progress,
            }
        } else {
            BadgeState::NotCertified
        }
    }
}

/// Accepts RFC 3339, or a naive ISO 8601 timestamp taken as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Badge derived from a record; exactly one variant applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BadgeState {
    Certified {
        score: Option<f64>,
        date: Option<DateTime<Utc>>,
    },
    Pending {
        progress: f64,
    },
    NotCertified,
}

/// Client-side display state of a training request.
///
/// Kept apart from [`CertificationRecord`] so the optimistic and failed
/// states never overwrite backend truth.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TrainingDisplay {
    #[default]
    Idle,
    /// Request issued, no answer yet
    Initiating,
    Failed {
        reason: String,
    },
}

/// Affordance offered on the certification detail panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingAction {
    StartTraining,
    Retry,
}

/// What the certification detail panel shows for the selected agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CertificationDetail {
    /// Training request in flight; no action offered
    Initiating,
    Failed {
        reason: String,
        action: TrainingAction,
    },
    Certified {
        score: Option<f64>,
        date: Option<DateTime<Utc>>,
    },
    Pending {
        progress: f64,
    },
    NotCertified {
        action: TrainingAction,
    },
}

impl CertificationDetail {
    /// Combine the display state with the badge.
    pub fn derive(display: &TrainingDisplay, badge: BadgeState) -> Self {
        match display {
            TrainingDisplay::Initiating => CertificationDetail::Initiating,
            TrainingDisplay::Failed { reason } => CertificationDetail::Failed {
                reason: reason.clone(),
                action: TrainingAction::Retry,
            },
            TrainingDisplay::Idle => match badge {
                BadgeState::Certified { score, date } => {
                    CertificationDetail::Certified { score, date }
                }
                BadgeState::Pending { progress } => CertificationDetail::Pending { progress },
                BadgeState::NotCertified => CertificationDetail::NotCertified {
                    action: TrainingAction::StartTraining,
                },
            },
        }
    }

    /// The action the user may take, if any
    pub fn action(&self) -> Option<TrainingAction> {
        match self {
            CertificationDetail::Failed { action, .. }
            | CertificationDetail::NotCertified { action } => Some(*action),
            _ => None,
        }
    }
}
