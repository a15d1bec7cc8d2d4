//! Standard (non-competition) queries
//!
//! The reply shape decides the exchange: `error` wins over everything,
//! then a `responses` list becomes a panel reply whatever agent was asked,
//! then a lone `response` is attributed to the submitted agent.

use std::sync::Arc;

use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

use crate::agents::AgentId;
use crate::backend::{PanelEntryReply, QueryReply, QueryRequest, SharedBackend};
use crate::conversation::{AgentReply, Exchange, ExchangeHandle, SharedConversation};
use crate::error::{PanelError, PanelResult};

/// Shared reference to QueryDispatcher
pub type SharedDispatcher = Arc<QueryDispatcher>;

const FAILURE_TITLE: &str = "Error";

/// How a `/api/query` reply is interpreted
#[derive(Debug, Clone, PartialEq)]
pub enum QueryVerdict {
    Answered(Exchange),
    /// The backend answered with an `error` message
    Rejected(String),
}

impl QueryVerdict {
    pub fn from_reply(agent: AgentId, reply: QueryReply) -> PanelResult<Self> {
        if let Some(error) = reply.error {
            return Ok(QueryVerdict::Rejected(error));
        }

        if let Some(entries) = reply.responses {
            let replies = entries
                .into_iter()
                .map(panel_member)
                .collect::<PanelResult<Vec<_>>>()?;
            return Ok(QueryVerdict::Answered(Exchange::PanelReply { replies }));
        }

        match reply.response {
            Some(body) => {
                let mut single = AgentReply::new(agent, body, reply.accuracy.unwrap_or_default());
                single.certified = reply.certified;
                single.provider = reply.provider;
                Ok(QueryVerdict::Answered(Exchange::SingleAgentReply(single)))
            }
            None => Err(PanelError::MalformedResponse(
                "reply carried neither error, responses nor response".to_string(),
            )),
        }
    }
}

fn panel_member(entry: PanelEntryReply) -> PanelResult<AgentReply> {
    let agent = AgentId::parse_competitor(&entry.agent).map_err(|_| {
        PanelError::MalformedResponse(format!("panel reply from unknown agent '{}'", entry.agent))
    })?;

    // A member that failed carries its error instead of a body.
    let body = match (entry.response, &entry.error) {
        (Some(body), _) => body,
        (None, Some(_)) => String::new(),
        (None, None) => {
            return Err(PanelError::MalformedResponse(format!(
                "panel reply from {} has no response",
                agent
            )))
        }
    };

    Ok(AgentReply {
        agent,
        body,
        accuracy: entry.accuracy.unwrap_or_default(),
        certified: entry.certified,
        provider: entry.provider,
        error: entry.error,
    })
}

/// Sends standard queries and resolves their placeholders
pub struct QueryDispatcher {
    backend: SharedBackend,
    conversation: SharedConversation,
    tracker: TaskTracker,
}

impl QueryDispatcher {
    pub fn new(
        backend: SharedBackend,
        conversation: SharedConversation,
        tracker: TaskTracker,
    ) -> Self {
        Self {
            backend,
            conversation,
            tracker,
        }
    }

    pub fn shared(self) -> SharedDispatcher {
        Arc::new(self)
    }

    /// Open a new exchange addressed to `agent`.
    pub fn submit(self: &Arc<Self>, agent: AgentId, query: impl Into<String>) -> ExchangeHandle {
        let query = query.into();
        let handle = self.conversation.open_exchange(query.clone(), agent);
        self.dispatch(handle, agent, query);
        handle
    }

    /// Send `query` for an exchange whose placeholder is already in the log.
    pub fn dispatch(self: &Arc<Self>, handle: ExchangeHandle, agent: AgentId, query: String) {
        debug!(%handle, agent = %agent, "Query submitted");
        let dispatcher = Arc::clone(self);
        self.tracker.spawn(async move {
            dispatcher.execute(handle, agent, query).await;
        });
    }

    async fn execute(&self, handle: ExchangeHandle, agent: AgentId, query: String) {
        let verdict = self
            .backend
            .query(&QueryRequest { query, agent })
            .await
            .map_err(PanelError::from)
            .and_then(|reply| QueryVerdict::from_reply(agent, reply));

        let exchange = match verdict {
            Ok(QueryVerdict::Answered(exchange)) => exchange,
            Ok(QueryVerdict::Rejected(message)) => {
                warn!(%handle, error = %message, "Backend rejected query");
                Exchange::notice(FAILURE_TITLE, message)
            }
            Err(e) => {
                warn!(%handle, error = %e, "Query failed");
                Exchange::notice(FAILURE_TITLE, e.user_message())
            }
        };

        if let Err(e) = self.conversation.resolve(handle, exchange) {
            warn!(%handle, error = %e, "Discarding query reply");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_reply_uses_submitted_agent() {
        let reply = QueryReply {
            response: Some("y".into()),
            accuracy: Some("95%".into()),
            ..Default::default()
        };
        let verdict = QueryVerdict::from_reply(AgentId::Compliance, reply).unwrap();
        assert_eq!(
            verdict,
            QueryVerdict::Answered(Exchange::SingleAgentReply(AgentReply::new(
                AgentId::Compliance,
                "y",
                "95%"
            )))
        );
    }

    #[test]
    fn test_responses_win_over_agent_field() {
        let reply = QueryReply {
            responses: Some(vec![
                PanelEntryReply {
                    agent: "compliance".into(),
                    response: Some("a".into()),
                    accuracy: Some("90%".into()),
                    ..Default::default()
                },
                PanelEntryReply {
                    agent: "risk_forecasting".into(),
                    error: Some("timeout".into()),
                    ..Default::default()
                },
            ]),
            response: Some("ignored".into()),
            ..Default::default()
        };
        match QueryVerdict::from_reply(AgentId::Compliance, reply).unwrap() {
            QueryVerdict::Answered(Exchange::PanelReply { replies }) => {
                assert_eq!(replies.len(), 2);
                assert_eq!(replies[1].error.as_deref(), Some("timeout"));
                assert_eq!(replies[1].body, "");
            }
            other => panic!("expected panel reply, got {:?}", other),
        }
    }

    #[test]
    fn test_error_takes_precedence() {
        let reply = QueryReply {
            error: Some("Agent not certified".into()),
            response: Some("y".into()),
            ..Default::default()
        };
        assert_eq!(
            QueryVerdict::from_reply(AgentId::Compliance, reply).unwrap(),
            QueryVerdict::Rejected("Agent not certified".into())
        );
    }

    #[test]
    fn test_empty_reply_is_malformed() {
        assert!(matches!(
            QueryVerdict::from_reply(AgentId::All, QueryReply::default()),
            Err(PanelError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_unknown_panel_member_is_malformed() {
        let reply = QueryReply {
            responses: Some(vec![PanelEntryReply {
                agent: "oracle".into(),
                response: Some("a".into()),
                ..Default::default()
            }]),
            ..Default::default()
        };
        assert!(QueryVerdict::from_reply(AgentId::All, reply).is_err());
    }
}
