//! Conversation transcript
//!
//! [`ConversationLog`] is the plain data structure; [`Conversation`] wraps it
//! for sharing between asynchronous completions and publishes a change
//! event after each operation.

pub mod exchange;
pub mod log;

pub use exchange::{
    AgentReply, Analysis, CompetitionExchange, Correction, Exchange, ExchangeHandle,
    ExchangeKind, LogEntry, Slot,
};
pub use log::{Conversation, ConversationLog, LogError, LogResult, SharedConversation};
