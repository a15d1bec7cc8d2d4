//! HTTP implementation of the panel backend
//!
//! Errors map onto [`BackendError`]: connection problems and timeouts are
//! `Transport`, non-2xx statuses are `Status`, undecodable bodies are
//! `Malformed`. A non-2xx reply whose body still carries the endpoint's
//! `error` field is passed through as a normal reply so the caller can
//! show the backend's own message.

use anyhow::{Context, Result};
use async_trait::async_trait;
use coordination::{
    AgentsReply, BackendError, BackendResult, CompeteReply, CompeteRequest, PanelBackend,
    QueryReply, QueryRequest, StatusPayload, TrainReply, TrainRequest,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::ClientConfig;

/// Reply types that can report a failure in-band
trait InBandError {
    fn has_error(&self) -> bool;
}

impl InBandError for TrainReply {
    fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

impl InBandError for QueryReply {
    fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

impl InBandError for CompeteReply {
    fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Backend reached over HTTP with a shared connection pool
pub struct HttpBackend {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpBackend {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> BackendResult<(u16, String)> {
        let response = request
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        Ok((status, body))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> BackendResult<T> {
        let url = self.config.endpoint(path);
        debug!(url = %url, "GET");
        let (status, body) = self.send(self.client.get(&url)).await?;
        if !(200..300).contains(&status) {
            return Err(BackendError::Status { status, body });
        }
        decode(&body)
    }

    async fn post<B, T>(&self, path: &str, payload: &B) -> BackendResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + InBandError,
    {
        let url = self.config.endpoint(path);
        debug!(url = %url, "POST");
        let (status, body) = self.send(self.client.post(&url).json(payload)).await?;
        if (200..300).contains(&status) {
            return decode(&body);
        }
        match serde_json::from_str::<T>(&body) {
            Ok(reply) if reply.has_error() => Ok(reply),
            _ => Err(BackendError::Status { status, body }),
        }
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> BackendResult<T> {
    serde_json::from_str(body).map_err(|e| BackendError::Malformed(e.to_string()))
}

#[async_trait]
impl PanelBackend for HttpBackend {
    async fn training_status(&self) -> BackendResult<StatusPayload> {
        self.get("/api/training/status").await
    }

    async fn train(&self, request: &TrainRequest) -> BackendResult<TrainReply> {
        self.post("/api/training/train", request).await
    }

    async fn query(&self, request: &QueryRequest) -> BackendResult<QueryReply> {
        self.post("/api/query", request).await
    }

    async fn compete(&self, request: &CompeteRequest) -> BackendResult<CompeteReply> {
        self.post("/api/compete", request).await
    }

    async fn agents(&self) -> BackendResult<AgentsReply> {
        self.get("/api/agents").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_maps_to_malformed() {
        let err = decode::<QueryReply>("<html>").unwrap_err();
        assert!(matches!(err, BackendError::Malformed(_)));
    }

    #[test]
    fn test_decode_status_payload() {
        let payload: StatusPayload =
            decode(r#"{"compliance": {"certified": true, "final_score": 93.1}}"#).unwrap();
        assert!(payload["compliance"].certified);
    }

    #[test]
    fn test_in_band_error_detection() {
        let reply: CompeteReply = decode(r#"{"error": "No query provided"}"#).unwrap();
        assert!(reply.has_error());
        assert!(!QueryReply::default().has_error());
    }
}
