//! Retrieval Collaborators
//!
//! The engine never crawls or indexes anything itself. Each research strategy
//! acquires material through one of the capability traits below, so any
//! concrete backend (or a test double) can be substituted without touching the
//! strategies.
//!
//! | Trait | Default implementation |
//! |-------|------------------------|
//! | [`WebSearch`] | [`web::DaedraSearch`] (DuckDuckGo via daedra) |
//! | [`DeepResearch`] | [`deep::ResearchCoordinator`] (question fan-out over web search) |
//! | [`MarketData`] | [`market::HttpMarketData`] (optional) |
//! | [`ProprietaryCorpus`] | [`proprietary::HttpProprietaryCorpus`] (optional) |

/// LLM-driven deep research over the web-search collaborator.
pub mod deep;
/// HTTP market-data feed client and ticker detection.
pub mod market;
/// HTTP proprietary-document corpus client.
pub mod proprietary;
/// Open-web search via daedra.
pub mod web;

use crate::types::{ResearchDepth, Result, RetrievedDocument, Timeframe};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============= Web Search =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    Basic,
    Advanced,
}

impl From<ResearchDepth> for SearchDepth {
    fn from(depth: ResearchDepth) -> Self {
        match depth {
            ResearchDepth::Basic | ResearchDepth::Standard => SearchDepth::Basic,
            ResearchDepth::Comprehensive => SearchDepth::Advanced,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub depth: SearchDepth,
    pub timeframe: Timeframe,
    pub max_results: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SearchResponse {
    pub results: Vec<RetrievedDocument>,
    pub total_results: usize,
    pub execution_time_ms: u64,
}

#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<SearchResponse>;
}

// ============= Deep Research =============

#[derive(Debug, Clone, Default)]
pub struct DeepResearchOptions {
    pub depth: ResearchDepth,
    pub focus_areas: Vec<String>,
}

/// An already-synthesised report from the deep-research collaborator.
#[derive(Debug, Clone, Default)]
pub struct DeepResearchReport {
    pub summary: String,
    pub key_findings: Vec<String>,
    pub sources: Vec<RetrievedDocument>,
    pub related_topics: Vec<String>,
    pub confidence: f64,
}

#[async_trait]
pub trait DeepResearch: Send + Sync {
    async fn deep_research(
        &self,
        query: &str,
        options: &DeepResearchOptions,
    ) -> Result<DeepResearchReport>;
}

// ============= Market Data =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub open: f64,
    #[serde(default)]
    pub high: f64,
    #[serde(default)]
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

#[async_trait]
pub trait MarketData: Send + Sync {
    /// Time-ordered price history for `symbol`. An empty vector means the feed
    /// knows nothing about the symbol.
    async fn price_history(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<PricePoint>>;
}

// ============= Proprietary Corpus =============

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProprietaryMatches {
    #[serde(default, alias = "matches")]
    pub documents: Vec<RetrievedDocument>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

#[async_trait]
pub trait ProprietaryCorpus: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<ProprietaryMatches>;
}

// ============= Collaborator Bundle =============

/// The retrieval collaborators available to the strategy executors.
#[derive(Clone)]
pub struct Collaborators {
    pub web: Arc<dyn WebSearch>,
    pub deep: Arc<dyn DeepResearch>,
    pub market: Option<Arc<dyn MarketData>>,
    pub proprietary: Option<Arc<dyn ProprietaryCorpus>>,
}

impl Collaborators {
    pub fn new(web: Arc<dyn WebSearch>, deep: Arc<dyn DeepResearch>) -> Self {
        Self {
            web,
            deep,
            market: None,
            proprietary: None,
        }
    }

    pub fn with_market_data(mut self, market: Arc<dyn MarketData>) -> Self {
        self.market = Some(market);
        self
    }

    pub fn with_proprietary_corpus(mut self, proprietary: Arc<dyn ProprietaryCorpus>) -> Self {
        self.proprietary = Some(proprietary);
        self
    }
}
