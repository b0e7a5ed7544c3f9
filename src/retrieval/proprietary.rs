//! Proprietary-document corpus client
//!
//! `POST {base_url}/v1/search` with `{"query": .., "limit": ..}`; the corpus
//! answers with internally scored documents and, optionally, its own
//! confidence in the match set.

use crate::retrieval::{ProprietaryCorpus, ProprietaryMatches};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

const COLLABORATOR: &str = "proprietary-corpus";

#[derive(Debug, Serialize)]
struct SearchBody<'a> {
    query: &'a str,
    limit: usize,
}

pub struct HttpProprietaryCorpus {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    max_documents: usize,
}

impl HttpProprietaryCorpus {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::Configuration(format!("Failed to build proprietary corpus client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            max_documents: usize::MAX,
        })
    }

    /// Cap on documents requested per query regardless of the caller's limit.
    pub fn with_max_documents(mut self, max_documents: usize) -> Self {
        self.max_documents = max_documents.max(1);
        self
    }
}

#[async_trait]
impl ProprietaryCorpus for HttpProprietaryCorpus {
    async fn search(&self, query: &str, limit: usize) -> Result<ProprietaryMatches> {
        let limit = limit.min(self.max_documents);
        let mut request = self
            .client
            .post(format!("{}/v1/search", self.base_url))
            .json(&SearchBody { query, limit });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let mut matches: ProprietaryMatches = request
            .send()
            .await
            .map_err(|e| AppError::retrieval(COLLABORATOR, e.to_string()))?
            .error_for_status()
            .map_err(|e| AppError::retrieval(COLLABORATOR, e.to_string()))?
            .json()
            .await
            .map_err(|e| AppError::retrieval(COLLABORATOR, format!("Malformed response: {}", e)))?;

        matches.documents.truncate(limit);
        Ok(matches)
    }
}
