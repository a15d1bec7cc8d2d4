//! In-process backend used by the integration tests
//!
//! Replies are scripted per endpoint and handed out in call order. Query
//! and competition replies can instead be gated per query text: the call
//! parks until the test releases that query's reply, which makes
//! out-of-order arrival deterministic.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use coordination::{
    AgentsReply, BackendError, BackendResult, CompeteReply, CompeteRequest, PanelBackend,
    QueryReply, QueryRequest, StatusEntry, StatusPayload, TrainReply, TrainRequest,
};
use tokio::sync::oneshot;

type Gate<T> = oneshot::Receiver<BackendResult<T>>;

#[derive(Default)]
pub struct FakeBackend {
    status: Mutex<VecDeque<BackendResult<StatusPayload>>>,
    train: Mutex<VecDeque<BackendResult<TrainReply>>>,
    query: Mutex<VecDeque<BackendResult<QueryReply>>>,
    compete: Mutex<VecDeque<BackendResult<CompeteReply>>>,
    agents: Mutex<VecDeque<BackendResult<AgentsReply>>>,
    query_gates: Mutex<HashMap<String, Gate<QueryReply>>>,
    compete_gates: Mutex<HashMap<String, Gate<CompeteReply>>>,
    pub queries: Mutex<Vec<QueryRequest>>,
    pub trains: Mutex<Vec<TrainRequest>>,
}

fn next<T>(queue: &Mutex<VecDeque<BackendResult<T>>>, endpoint: &str) -> BackendResult<T> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(BackendError::Transport(format!("no scripted {} reply", endpoint))))
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_status(&self, reply: BackendResult<StatusPayload>) {
        self.status.lock().unwrap().push_back(reply);
    }

    pub fn push_train(&self, reply: BackendResult<TrainReply>) {
        self.train.lock().unwrap().push_back(reply);
    }

    pub fn push_query(&self, reply: BackendResult<QueryReply>) {
        self.query.lock().unwrap().push_back(reply);
    }

    pub fn push_compete(&self, reply: BackendResult<CompeteReply>) {
        self.compete.lock().unwrap().push_back(reply);
    }

    pub fn push_agents(&self, reply: BackendResult<AgentsReply>) {
        self.agents.lock().unwrap().push_back(reply);
    }

    /// Park the query with this text until the returned sender fires.
    pub fn gate_query(&self, text: &str) -> oneshot::Sender<BackendResult<QueryReply>> {
        let (tx, rx) = oneshot::channel();
        self.query_gates.lock().unwrap().insert(text.to_string(), rx);
        tx
    }

    /// Park the competition with this text until the returned sender fires.
    pub fn gate_compete(&self, text: &str) -> oneshot::Sender<BackendResult<CompeteReply>> {
        let (tx, rx) = oneshot::channel();
        self.compete_gates.lock().unwrap().insert(text.to_string(), rx);
        tx
    }
}

#[async_trait]
impl PanelBackend for FakeBackend {
    async fn training_status(&self) -> BackendResult<StatusPayload> {
        next(&self.status, "status")
    }

    async fn train(&self, request: &TrainRequest) -> BackendResult<TrainReply> {
        self.trains.lock().unwrap().push(request.clone());
        next(&self.train, "train")
    }

    async fn query(&self, request: &QueryRequest) -> BackendResult<QueryReply> {
        self.queries.lock().unwrap().push(request.clone());
        let gate = self.query_gates.lock().unwrap().remove(&request.query);
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(BackendError::Transport("gate dropped".into()))),
            None => next(&self.query, "query"),
        }
    }

    async fn compete(&self, request: &CompeteRequest) -> BackendResult<CompeteReply> {
        let gate = self.compete_gates.lock().unwrap().remove(&request.query);
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(BackendError::Transport("gate dropped".into()))),
            None => next(&self.compete, "compete"),
        }
    }

    async fn agents(&self) -> BackendResult<AgentsReply> {
        next(&self.agents, "agents")
    }
}

// ── Reply builders ───────────────────────────────────────────────────

pub fn certified(score: f64) -> StatusEntry {
    StatusEntry {
        certified: true,
        final_score: Some(score),
        certification_date: Some("2024-05-01T10:00:00".into()),
        ..Default::default()
    }
}

pub fn training(progress: f64) -> StatusEntry {
    StatusEntry {
        training_in_progress: Some(true),
        progress: Some(progress),
        ..Default::default()
    }
}

pub fn status(entries: &[(&str, StatusEntry)]) -> StatusPayload {
    entries
        .iter()
        .map(|(id, entry)| (id.to_string(), entry.clone()))
        .collect()
}

pub fn single(response: &str, accuracy: &str) -> QueryReply {
    QueryReply {
        response: Some(response.into()),
        accuracy: Some(accuracy.into()),
        ..Default::default()
    }
}

pub fn win(winner: &str, time: f64) -> CompeteReply {
    CompeteReply {
        winner: Some(winner.into()),
        winning_response: Some(format!("{} wins", winner)),
        winning_time: Some(time),
        analyses: Some(HashMap::new()),
        correction_needed: Some(false),
        ..Default::default()
    }
}

pub fn win_with_correction(winner: &str, time: f64, corrector: &str) -> CompeteReply {
    CompeteReply {
        correction_needed: Some(true),
        correction_winner: Some(corrector.into()),
        correction_response: Some(format!("{} corrects", corrector)),
        ..win(winner, time)
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
