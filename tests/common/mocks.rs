//! Mock completion service and retrieval collaborators.
//!
//! Every mock counts its calls so tests can assert that a request was
//! rejected before any collaborator was touched.

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use synthesis::llm::LLMClient;
use synthesis::retrieval::{
    Collaborators, DeepResearch, DeepResearchOptions, DeepResearchReport, MarketData, PricePoint,
    ProprietaryCorpus, ProprietaryMatches, SearchOptions, SearchResponse, WebSearch,
};
use synthesis::types::{AppError, Result, RetrievedDocument, Timeframe};
use synthesis::utils::toml_config::{ConfidenceConfig, ResearchConfig};
use synthesis::SynthesisOrchestrator;

type Script = dyn Fn(&str) -> Result<String> + Send + Sync;

/// Completion service answering each prompt through a closure.
pub struct MockLLMClient {
    script: Box<Script>,
    calls: AtomicUsize,
}

impl MockLLMClient {
    pub fn scripted(script: impl Fn(&str) -> Result<String> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            script: Box::new(script),
            calls: AtomicUsize::new(0),
        })
    }

    /// Same answer for every prompt.
    pub fn new(response: &str) -> Arc<Self> {
        let response = response.to_string();
        Self::scripted(move |_| Ok(response.clone()))
    }

    pub fn failing() -> Arc<Self> {
        Self::scripted(|_| Err(AppError::LLM("Mock LLM failure".to_string())))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.script)(prompt)
    }

    async fn generate_with_system(&self, _system: &str, prompt: &str) -> Result<String> {
        self.generate(prompt).await
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

// ============= Retrieval Mocks =============

type SearchScript = dyn Fn(&str) -> Result<Vec<RetrievedDocument>> + Send + Sync;

pub struct MockWebSearch {
    script: Box<SearchScript>,
    calls: AtomicUsize,
}

impl MockWebSearch {
    pub fn scripted(
        script: impl Fn(&str) -> Result<Vec<RetrievedDocument>> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            script: Box::new(script),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn returning(documents: Vec<RetrievedDocument>) -> Arc<Self> {
        Self::scripted(move |_| Ok(documents.clone()))
    }

    pub fn failing() -> Arc<Self> {
        Self::scripted(|_| Err(AppError::retrieval("web-search", "connection refused")))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WebSearch for MockWebSearch {
    async fn search(&self, query: &str, _options: &SearchOptions) -> Result<SearchResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let results = (self.script)(query)?;
        Ok(SearchResponse {
            total_results: results.len(),
            results,
            execution_time_ms: 1,
        })
    }
}

pub struct MockDeepResearch {
    report: Option<DeepResearchReport>,
    calls: AtomicUsize,
}

impl MockDeepResearch {
    pub fn returning(report: DeepResearchReport) -> Arc<Self> {
        Arc::new(Self {
            report: Some(report),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            report: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeepResearch for MockDeepResearch {
    async fn deep_research(
        &self,
        _query: &str,
        _options: &DeepResearchOptions,
    ) -> Result<DeepResearchReport> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.report
            .clone()
            .ok_or_else(|| AppError::retrieval("deep-research", "upstream timeout"))
    }
}

pub struct MockMarketData {
    points: Option<Vec<PricePoint>>,
    calls: AtomicUsize,
}

impl MockMarketData {
    pub fn returning(points: Vec<PricePoint>) -> Arc<Self> {
        Arc::new(Self {
            points: Some(points),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            points: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketData for MockMarketData {
    async fn price_history(&self, _symbol: &str, _timeframe: Timeframe) -> Result<Vec<PricePoint>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.points
            .clone()
            .ok_or_else(|| AppError::retrieval("market-data", "503 Service Unavailable"))
    }
}

pub struct MockProprietaryCorpus {
    matches: Option<ProprietaryMatches>,
    calls: AtomicUsize,
}

impl MockProprietaryCorpus {
    pub fn returning(documents: Vec<RetrievedDocument>, confidence: Option<f64>) -> Arc<Self> {
        Arc::new(Self {
            matches: Some(ProprietaryMatches {
                documents,
                confidence,
            }),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            matches: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProprietaryCorpus for MockProprietaryCorpus {
    async fn search(&self, _query: &str, limit: usize) -> Result<ProprietaryMatches> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut matches = self
            .matches
            .clone()
            .ok_or_else(|| AppError::retrieval("proprietary-corpus", "index offline"))?;
        matches.documents.truncate(limit);
        Ok(matches)
    }
}

// ============= Fixtures =============

pub fn document(title: &str, url: &str, snippet: &str, relevance: f64) -> RetrievedDocument {
    RetrievedDocument {
        title: title.to_string(),
        url: url.to_string(),
        snippet: snippet.to_string(),
        source: "example.com".to_string(),
        published_at: Some(Utc.with_ymd_and_hms(2024, 10, 2, 12, 0, 0).unwrap()),
        relevance,
    }
}

/// Daily closes 100 -> 110 -> 121.
pub fn rising_quotes() -> Vec<PricePoint> {
    let start = Utc.with_ymd_and_hms(2024, 10, 1, 0, 0, 0).unwrap();
    [100.0, 110.0, 121.0]
        .iter()
        .enumerate()
        .map(|(i, close)| PricePoint {
            timestamp: start + Duration::days(i as i64),
            open: *close,
            high: *close,
            low: *close,
            close: *close,
            volume: 1_000_000.0,
        })
        .collect()
}

/// Prompt-routed responses for a Tesla research run: one entity, one
/// positive sentiment, two topics, one trend, one pattern and a narrative.
pub fn tesla_responses(prompt: &str) -> Result<String> {
    let response = if prompt.contains("Extract structured information") {
        json!({
            "entities": [{"name": "Tesla", "type": "company", "confidence": 0.9, "mentions": 3}],
            "sentiments": [{"text": "Deliveries beat expectations", "sentiment": "positive", "score": 0.6}],
            "topics": [{"label": "electric vehicles", "relevance": 0.9}, {"label": "autonomous driving", "relevance": 0.6}]
        })
        .to_string()
    } else if prompt.contains("Identify directional trends") {
        json!({"trends": [{
            "description": "EV deliveries accelerating",
            "direction": "upward",
            "timeframe": "past-month",
            "confidence": 0.8
        }]})
        .to_string()
    } else if prompt.contains("Identify recurring structural patterns") {
        json!({"patterns": [{
            "name": "Quarter-end delivery push",
            "type": "seasonal",
            "frequency": "quarterly",
            "confidence": 0.7
        }]})
        .to_string()
    } else if prompt.contains("Write a concise research summary") {
        json!({
            "summary": "Tesla delivered a record quarter.",
            "insights": ["Deliveries outpaced production"],
            "recommendations": ["Track Tesla margin guidance next quarter"]
        })
        .to_string()
    } else if prompt.contains("Combine these research summaries") {
        "Across sources, Tesla shows strong delivery momentum.".to_string()
    } else {
        "{}".to_string()
    };
    Ok(response)
}

pub fn research_config() -> ResearchConfig {
    ResearchConfig::default()
}

pub fn orchestrator(
    llm: Arc<MockLLMClient>,
    collaborators: Collaborators,
) -> SynthesisOrchestrator {
    SynthesisOrchestrator::new(
        llm,
        collaborators,
        research_config(),
        ConfidenceConfig::default(),
    )
}
