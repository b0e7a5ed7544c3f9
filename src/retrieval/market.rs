//! Market-data feed client
//!
//! Talks to a quote service exposing `GET {base_url}/v1/quotes/{symbol}?range=..`
//! and returning `{"symbol": "...", "points": [{timestamp, open, high, low, close, volume}]}`.
//! Topics that do not name a tradable instrument simply have no market data.

use crate::retrieval::{MarketData, PricePoint};
use crate::types::{AppError, Result, Timeframe};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const COLLABORATOR: &str = "market-data";

/// Upper-case tokens that look like tickers but almost never are.
const NON_TICKERS: &[&str] = &[
    "A", "I", "AI", "AND", "API", "CEO", "CFO", "EPS", "ESG", "ETF", "EU", "EV", "FED", "GDP",
    "IPO", "IT", "M&A", "OR", "Q1", "Q2", "Q3", "Q4", "THE", "UK", "US", "USA", "USD",
];

/// Well-known names mapped to their symbols.
const KNOWN_SYMBOLS: &[(&str, &str)] = &[
    ("tesla", "TSLA"),
    ("apple", "AAPL"),
    ("microsoft", "MSFT"),
    ("nvidia", "NVDA"),
    ("amazon", "AMZN"),
    ("alphabet", "GOOGL"),
    ("google", "GOOGL"),
    ("meta", "META"),
    ("netflix", "NFLX"),
    ("bitcoin", "BTC-USD"),
    ("ethereum", "ETH-USD"),
];

/// Best-effort symbol detection from a free-text topic.
///
/// Tries, in order: a `$TICKER` cashtag, a bare all-caps token of 1-5 letters,
/// then a table of well-known company and asset names.
pub fn detect_symbol(topic: &str) -> Option<String> {
    let tokens: Vec<&str> = topic
        .split(|c: char| c.is_whitespace() || c == ',' || c == '(' || c == ')')
        .filter(|t| !t.is_empty())
        .collect();

    if let Some(cashtag) = tokens.iter().find_map(|t| {
        let symbol = t.strip_prefix('$')?.trim_end_matches(|c: char| !c.is_ascii_alphanumeric());
        (!symbol.is_empty() && symbol.chars().all(|c| c.is_ascii_alphabetic()))
            .then(|| symbol.to_ascii_uppercase())
    }) {
        return Some(cashtag);
    }

    if let Some(ticker) = tokens.iter().find_map(|t| {
        let t = t.trim_end_matches(|c: char| !c.is_ascii_alphanumeric());
        let looks_like_ticker = (1..=5).contains(&t.len())
            && t.chars().all(|c| c.is_ascii_uppercase())
            && !NON_TICKERS.contains(&t);
        looks_like_ticker.then(|| t.to_string())
    }) {
        return Some(ticker);
    }

    let lowered = topic.to_lowercase();
    KNOWN_SYMBOLS
        .iter()
        .find(|(name, _)| {
            lowered
                .split(|c: char| !c.is_alphanumeric())
                .any(|word| word == *name)
        })
        .map(|(_, symbol)| symbol.to_string())
}

fn range_param(timeframe: Timeframe) -> &'static str {
    match timeframe {
        Timeframe::PastDay => "1d",
        Timeframe::PastWeek => "5d",
        Timeframe::PastMonth => "1mo",
        Timeframe::PastYear => "1y",
        Timeframe::AllTime => "max",
    }
}

#[derive(Debug, Deserialize)]
struct QuotesResponse {
    #[serde(default, alias = "data")]
    points: Vec<PricePoint>,
}

/// HTTP market-data client
pub struct HttpMarketData {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpMarketData {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::Configuration(format!("Failed to build market-data client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl MarketData for HttpMarketData {
    async fn price_history(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<PricePoint>> {
        let url = format!("{}/v1/quotes/{}", self.base_url, symbol);
        let mut request = self
            .client
            .get(&url)
            .query(&[("range", range_param(timeframe))]);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::retrieval(COLLABORATOR, e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!(symbol, "Market-data feed has no quotes for symbol");
            return Ok(vec![]);
        }

        let quotes: QuotesResponse = response
            .error_for_status()
            .map_err(|e| AppError::retrieval(COLLABORATOR, e.to_string()))?
            .json()
            .await
            .map_err(|e| AppError::retrieval(COLLABORATOR, format!("Malformed quotes: {}", e)))?;

        let mut points = quotes.points;
        points.sort_by_key(|p| p.timestamp);
        Ok(points)
    }
}
