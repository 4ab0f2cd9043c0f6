//! `reqwest`-backed source tiers, available behind the `http` feature.
//!
//! Both tiers decode through [`decode_envelope`], so a backend answering
//! either the structured `{success, data, summary}` shape or a bare array
//! slots into the chain unchanged.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::Value;

use crate::error::SourceError;
use crate::model::{DateRange, SourceBatch};
use crate::source::{decode_envelope, DataSource};

/// Primary tier: the structured report endpoint.
#[derive(Clone)]
pub struct StructuredApiSource {
    client: Client,
    base_url: String,
}

impl StructuredApiSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl DataSource for StructuredApiSource {
    fn name(&self) -> &str {
        "structured-api"
    }

    async fn attempt(
        &self,
        range: DateRange,
        filter: Option<&str>,
    ) -> Result<SourceBatch, SourceError> {
        let mut request = self
            .client
            .get(format!("{}/reports", self.base_url))
            .query(&[
                ("start", range.start.to_string()),
                ("end", range.end.to_string()),
            ]);
        if let Some(category) = filter {
            request = request.query(&[("category", category)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Transport(format!("status {status}")));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| SourceError::MalformedPayload(e.to_string()))?;

        decode_envelope(&payload, Utc::now().date_naive())
    }
}

/// Secondary tier: the raw transaction endpoint, which predates the report
/// envelope and may answer with a bare array.
#[derive(Clone)]
pub struct RawHttpSource {
    client: Client,
    base_url: String,
}

impl RawHttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl DataSource for RawHttpSource {
    fn name(&self) -> &str {
        "raw-http"
    }

    async fn attempt(
        &self,
        range: DateRange,
        _filter: Option<&str>,
    ) -> Result<SourceBatch, SourceError> {
        let response = self
            .client
            .get(format!("{}/transactions", self.base_url))
            .query(&[
                ("from", range.start.to_string()),
                ("to", range.end.to_string()),
            ])
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Transport(format!("status {status}")));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| SourceError::MalformedPayload(e.to_string()))?;

        decode_envelope(&payload, Utc::now().date_naive())
    }
}
