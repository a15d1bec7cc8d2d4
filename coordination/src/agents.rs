//! Agent catalogue
//!
//! The panel is a closed set of specialist agents plus the `all`
//! pseudo-agent that stands for the whole panel. Profiles are static
//! configuration; the roster fetched from the backend only adds the
//! provider each agent runs on.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PanelError;

/// Identifier of an agent, in declaration order.
///
/// Declaration order matters: it is the leaderboard tie-break order and
/// the order analyses are listed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentId {
    /// The full expert panel
    All,
    Compliance,
    DataAnalytics,
    ProjectManagement,
    RiskForecasting,
    SystemsIntegration,
    ImplementationSupport,
}

/// Static display attributes of an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentProfile {
    pub display_name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
}

impl AgentId {
    /// Every agent id including the panel pseudo-agent.
    pub fn all_ids() -> &'static [AgentId] {
        &[
            AgentId::All,
            AgentId::Compliance,
            AgentId::DataAnalytics,
            AgentId::ProjectManagement,
            AgentId::RiskForecasting,
            AgentId::SystemsIntegration,
            AgentId::ImplementationSupport,
        ]
    }

    /// The real agents that can be certified and compete.
    pub fn competitors() -> &'static [AgentId] {
        &Self::all_ids()[1..]
    }

    /// Whether this is the `all` pseudo-agent
    pub fn is_panel(&self) -> bool {
        matches!(self, AgentId::All)
    }

    /// Wire name as used by the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentId::All => "all",
            AgentId::Compliance => "compliance",
            AgentId::DataAnalytics => "data_analytics",
            AgentId::ProjectManagement => "project_management",
            AgentId::RiskForecasting => "risk_forecasting",
            AgentId::SystemsIntegration => "systems_integration",
            AgentId::ImplementationSupport => "implementation_support",
        }
    }

    pub fn profile(&self) -> AgentProfile {
        match self {
            AgentId::All => AgentProfile {
                display_name: "All Experts",
                icon: "bi-people-fill",
                description: "Consulting the entire expert panel",
            },
            AgentId::Compliance => AgentProfile {
                display_name: "Dr. Compliance & Policy",
                icon: "bi-shield-check",
                description: "IPMDAR regulations & DoD policies",
            },
            AgentId::DataAnalytics => AgentProfile {
                display_name: "Dr. Data Analytics",
                icon: "bi-graph-up",
                description: "Performance data & EVM metrics",
            },
            AgentId::ProjectManagement => AgentProfile {
                display_name: "Dr. Project Management",
                icon: "bi-kanban",
                description: "IPMDAR tailoring & implementation",
            },
            AgentId::RiskForecasting => AgentProfile {
                display_name: "Dr. Risk & Forecasting",
                icon: "bi-exclamation-triangle",
                description: "Predictive analytics & risk mitigation",
            },
            AgentId::SystemsIntegration => AgentProfile {
                display_name: "Dr. Systems Integration",
                icon: "bi-gear-wide-connected",
                description: "Technical integration & JSON formatting",
            },
            AgentId::ImplementationSupport => AgentProfile {
                display_name: "Dr. Implementation Support",
                icon: "bi-life-preserver",
                description: "Step-by-step guidance & assistance",
            },
        }
    }

    /// Shorthand for `profile().display_name`
    pub fn display_name(&self) -> &'static str {
        self.profile().display_name
    }

    /// Parse a wire id that must name a real agent (not `all`).
    pub fn parse_competitor(s: &str) -> Result<AgentId, PanelError> {
        let id: AgentId = s.parse()?;
        if id.is_panel() {
            return Err(PanelError::InvalidAgent(s.to_string()));
        }
        Ok(id)
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentId {
    type Err = PanelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all_ids()
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| PanelError::InvalidAgent(s.to_string()))
    }
}

// ── Roster ───────────────────────────────────────────────────────────

/// One row of `GET /api/agents`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: AgentId,
    pub name: String,
    #[serde(default)]
    pub expertise: String,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub certified: bool,
    #[serde(default)]
    pub description: String,
}

/// Backend-reported agent details, replaced wholesale on each load.
#[derive(Debug, Clone, Default)]
pub struct AgentRoster {
    entries: HashMap<AgentId, RosterEntry>,
}

impl AgentRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the roster contents. The panel pseudo-agent is never listed.
    pub fn replace(&mut self, entries: Vec<RosterEntry>) {
        self.entries = entries
            .into_iter()
            .filter(|e| !e.id.is_panel())
            .map(|e| (e.id, e))
            .collect();
    }

    pub fn get(&self, agent: AgentId) -> Option<&RosterEntry> {
        self.entries.get(&agent)
    }

    /// LLM provider serving this agent, when known
    pub fn provider(&self, agent: AgentId) -> Option<&str> {
        self.entries.get(&agent).and_then(|e| e.provider.as_deref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
