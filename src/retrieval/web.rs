//! Open-web search collaborator powered by daedra
//!
//! daedra uses DuckDuckGo as the search backend. It reports neither publish
//! dates nor scores, so relevance is derived from result rank.

use crate::retrieval::{SearchOptions, SearchResponse, WebSearch};
use crate::types::{AppError, Result, RetrievedDocument, Timeframe};
use async_trait::async_trait;
use std::time::Instant;

const COLLABORATOR: &str = "web-search";

/// Web search collaborator backed by daedra
pub struct DaedraSearch;

impl DaedraSearch {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DaedraSearch {
    fn default() -> Self {
        Self::new()
    }
}

/// Relevance in (0, 1] decaying linearly with rank.
fn rank_relevance(rank: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    1.0 - rank as f64 / (total as f64 + 1.0)
}

fn host_of(url: &str) -> String {
    url.split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(url)
        .split('/')
        .next()
        .unwrap_or_default()
        .trim_start_matches("www.")
        .to_string()
}

/// DuckDuckGo's `df` filter code for a timeframe.
fn time_range(timeframe: Timeframe) -> Option<String> {
    let code = match timeframe {
        Timeframe::PastDay => "d",
        Timeframe::PastWeek => "w",
        Timeframe::PastMonth => "m",
        Timeframe::PastYear => "y",
        Timeframe::AllTime => return None,
    };
    Some(code.to_string())
}

#[async_trait]
impl WebSearch for DaedraSearch {
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<SearchResponse> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput("Search query is empty".to_string()));
        }

        let start = Instant::now();
        tracing::debug!(
            query,
            depth = ?options.depth,
            timeframe = options.timeframe.as_str(),
            max_results = options.max_results,
            "Running web search"
        );

        let search_args = daedra::SearchArgs {
            query: query.to_string(),
            options: Some(daedra::SearchOptions {
                num_results: options.max_results,
                time_range: time_range(options.timeframe),
                ..Default::default()
            }),
        };

        let response = daedra::tools::search::perform_search(&search_args)
            .await
            .map_err(|e| AppError::retrieval(COLLABORATOR, format!("Search failed: {}", e)))?;

        let total = response.data.len();
        let results: Vec<RetrievedDocument> = response
            .data
            .iter()
            .take(options.max_results)
            .enumerate()
            .map(|(rank, r)| RetrievedDocument {
                title: r.title.to_string(),
                url: r.url.to_string(),
                snippet: r.description.to_string(),
                source: host_of(&r.url),
                published_at: None,
                relevance: rank_relevance(rank, total),
            })
            .collect();

        Ok(SearchResponse {
            total_results: total,
            results,
            execution_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}
