//! Exchange types recorded in the conversation log

use serde::{Deserialize, Serialize};

use crate::agents::AgentId;

/// Correlation token tying a submitted message to its eventual reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExchangeHandle(pub u64);

impl std::fmt::Display for ExchangeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// Discriminant of an [`Exchange`], plus the pending placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeKind {
    UserQuery,
    Pending,
    SingleAgentReply,
    PanelReply,
    CompetitionResult,
    SystemNotice,
}

/// A reply attributed to one agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentReply {
    pub agent: AgentId,
    pub body: String,
    pub accuracy: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Backend-side error text for a member that failed inside a panel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentReply {
    pub fn new(agent: AgentId, body: impl Into<String>, accuracy: impl Into<String>) -> Self {
        Self {
            agent,
            body: body.into(),
            accuracy: accuracy.into(),
            certified: None,
            provider: None,
            error: None,
        }
    }
}

/// Another agent's review of the winning reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub agent: AgentId,
    pub text: String,
}

/// Corrected answer proposed after the winning reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correction {
    pub agent: AgentId,
    pub response: String,
}

/// Outcome of one competition round as shown in the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionExchange {
    pub winner: AgentId,
    pub winning_response: String,
    /// Seconds
    pub winning_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winning_provider: Option<String>,
    /// In agent declaration order
    pub analyses: Vec<Analysis>,
    /// Rendered as a separate follow-up after the winning reply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correction: Option<Correction>,
}

/// An immutable transcript record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Exchange {
    UserQuery { text: String },
    SingleAgentReply(AgentReply),
    PanelReply { replies: Vec<AgentReply> },
    CompetitionResult(CompetitionExchange),
    SystemNotice { title: String, message: String },
}

impl Exchange {
    pub fn kind(&self) -> ExchangeKind {
        match self {
            Exchange::UserQuery { .. } => ExchangeKind::UserQuery,
            Exchange::SingleAgentReply(_) => ExchangeKind::SingleAgentReply,
            Exchange::PanelReply { .. } => ExchangeKind::PanelReply,
            Exchange::CompetitionResult(_) => ExchangeKind::CompetitionResult,
            Exchange::SystemNotice { .. } => ExchangeKind::SystemNotice,
        }
    }

    pub fn notice(title: impl Into<String>, message: impl Into<String>) -> Self {
        Exchange::SystemNotice {
            title: title.into(),
            message: message.into(),
        }
    }

    /// Whether this exchange may replace a pending placeholder
    pub fn is_reply(&self) -> bool {
        !matches!(self, Exchange::UserQuery { .. })
    }
}

/// Contents of one log position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Slot {
    /// Typing indicator waiting for its reply
    Pending { agent: AgentId },
    Resolved { exchange: Exchange },
}

/// One position in the conversation log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Correlation handle; `None` for tail-appended system notices
    pub handle: Option<ExchangeHandle>,
    pub slot: Slot,
    /// Show/hide state of competition analyses
    #[serde(default)]
    pub analyses_visible: bool,
}

impl LogEntry {
    pub fn kind(&self) -> ExchangeKind {
        match &self.slot {
            Slot::Pending { .. } => ExchangeKind::Pending,
            Slot::Resolved { exchange } => exchange.kind(),
        }
    }

    pub fn exchange(&self) -> Option<&Exchange> {
        match &self.slot {
            Slot::Resolved { exchange } => Some(exchange),
            Slot::Pending { .. } => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.slot, Slot::Pending { .. })
    }
}
