use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

// ============= Request Types =============

/// The research strategy (or fan-out of strategies) a request asks for.
///
/// Wire form is kebab-case. Any other string is rejected with
/// [`AppError::UnsupportedResearchType`] before a collaborator is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum ResearchType {
    WebSearch,
    DeepResearch,
    MarketAnalysis,
    ProprietaryAnalysis,
    Comprehensive,
}

impl ResearchType {
    /// All recognised research types, in dispatch order.
    pub const ALL: [ResearchType; 5] = [
        ResearchType::WebSearch,
        ResearchType::DeepResearch,
        ResearchType::MarketAnalysis,
        ResearchType::ProprietaryAnalysis,
        ResearchType::Comprehensive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResearchType::WebSearch => "web-search",
            ResearchType::DeepResearch => "deep-research",
            ResearchType::MarketAnalysis => "market-analysis",
            ResearchType::ProprietaryAnalysis => "proprietary-analysis",
            ResearchType::Comprehensive => "comprehensive",
        }
    }
}

impl fmt::Display for ResearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResearchType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        ResearchType::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| AppError::UnsupportedResearchType(s.to_string()))
    }
}

impl TryFrom<String> for ResearchType {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResearchDepth {
    Basic,
    #[default]
    Standard,
    Comprehensive,
}

impl ResearchDepth {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResearchDepth::Basic => "basic",
            ResearchDepth::Standard => "standard",
            ResearchDepth::Comprehensive => "comprehensive",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Timeframe {
    PastDay,
    PastWeek,
    #[default]
    PastMonth,
    PastYear,
    AllTime,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::PastDay => "past-day",
            Timeframe::PastWeek => "past-week",
            Timeframe::PastMonth => "past-month",
            Timeframe::PastYear => "past-year",
            Timeframe::AllTime => "all-time",
        }
    }
}

/// Optional knobs of a research request. Absent values take engine defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ResearchParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<Timeframe>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<ResearchDepth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub focus_areas: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_market_data: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_proprietary_data: Option<bool>,
}

impl ResearchParameters {
    pub fn depth(&self) -> ResearchDepth {
        self.depth.unwrap_or_default()
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe.unwrap_or_default()
    }

    pub fn max_results_or(&self, default: usize) -> usize {
        self.max_results.unwrap_or(default)
    }

    pub fn include_market_data(&self) -> bool {
        self.include_market_data.unwrap_or(true)
    }

    pub fn include_proprietary_data(&self) -> bool {
        self.include_proprietary_data.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResearchRequest {
    pub topic: String,
    pub research_type: ResearchType,
    #[serde(default)]
    pub parameters: ResearchParameters,
}

impl ResearchRequest {
    pub fn new(topic: impl Into<String>, research_type: ResearchType) -> Self {
        Self {
            topic: topic.into(),
            research_type,
            parameters: ResearchParameters::default(),
        }
    }

    pub fn with_parameters(mut self, parameters: ResearchParameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Parse a request from untyped JSON.
    ///
    /// An unrecognised `researchType` is reported as
    /// [`AppError::UnsupportedResearchType`] rather than a generic parse error.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        if let Some(raw) = value.get("researchType").and_then(|v| v.as_str()) {
            raw.parse::<ResearchType>()?;
        }
        serde_json::from_value(value)
            .map_err(|e| AppError::InvalidInput(format!("Malformed research request: {}", e)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.topic.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Research topic must not be empty".to_string(),
            ));
        }
        if self.parameters.max_results == Some(0) {
            return Err(AppError::InvalidInput(
                "maxResults must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// ============= Retrieval Types =============

/// A document handed back by a retrieval collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RetrievedDocument {
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, alias = "content")]
    pub snippet: String,
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "score")]
    pub relevance: f64,
}

impl From<&RetrievedDocument> for ResearchSource {
    fn from(doc: &RetrievedDocument) -> Self {
        let excerpts = if doc.snippet.trim().is_empty() {
            vec![]
        } else {
            vec![doc.snippet.clone()]
        };
        Self {
            title: doc.title.clone(),
            url: doc.url.clone(),
            source: doc.source.clone(),
            last_modified: doc.published_at,
            relevance: clamp_unit(doc.relevance),
            excerpts,
        }
    }
}

// ============= Extraction Types =============

fn default_confidence() -> f64 {
    0.5
}

fn default_mentions() -> u32 {
    1
}

fn default_entity_type() -> String {
    "concept".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub name: String,
    #[serde(rename = "type", default = "default_entity_type")]
    pub entity_type: String,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default = "default_mentions")]
    pub mentions: u32,
    #[serde(default)]
    pub context: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeyMetric {
    pub name: String,
    pub value: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub source: String,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl From<String> for Sentiment {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "positive" | "bullish" => Sentiment::Positive,
            "negative" | "bearish" => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SentimentStatement {
    #[serde(alias = "statement")]
    pub text: String,
    #[serde(default)]
    pub sentiment: Sentiment,
    #[serde(default)]
    pub score: f64,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default)]
    pub aspects: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    #[serde(alias = "name", alias = "topic")]
    pub label: String,
    #[serde(default = "default_confidence")]
    pub relevance: f64,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default = "default_mentions")]
    pub frequency: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub entity1: String,
    pub entity2: String,
    #[serde(alias = "type")]
    pub relationship: String,
    #[serde(default = "default_confidence")]
    pub strength: f64,
    #[serde(default)]
    pub context: String,
}

/// Structured signal pulled out of free text by the information extractor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractedInformation {
    pub entities: Vec<Entity>,
    pub key_metrics: Vec<KeyMetric>,
    pub sentiments: Vec<SentimentStatement>,
    pub topics: Vec<Topic>,
    pub relationships: Vec<Relationship>,
}

impl ExtractedInformation {
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
            && self.key_metrics.is_empty()
            && self.sentiments.is_empty()
            && self.topics.is_empty()
            && self.relationships.is_empty()
    }

    /// Mean sentiment score, or `None` when nothing was extracted.
    pub fn aggregate_sentiment(&self) -> Option<f64> {
        mean(self.sentiments.iter().map(|s| s.score))
    }
}

// ============= Trend & Pattern Types =============

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum TrendDirection {
    Upward,
    Downward,
    #[default]
    Stable,
}

impl From<String> for TrendDirection {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "upward" | "up" | "increasing" | "rising" | "bullish" => TrendDirection::Upward,
            "downward" | "down" | "decreasing" | "falling" | "bearish" => {
                TrendDirection::Downward
            }
            _ => TrendDirection::Stable,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum TrendStrength {
    Strong,
    #[default]
    Moderate,
    Weak,
}

impl From<String> for TrendStrength {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "strong" | "high" => TrendStrength::Strong,
            "weak" | "low" => TrendStrength::Weak,
            _ => TrendStrength::Moderate,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum PredictiveValue {
    High,
    #[default]
    Medium,
    Low,
}

impl From<String> for PredictiveValue {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "high" | "strong" => PredictiveValue::High,
            "low" | "weak" => PredictiveValue::Low,
            _ => PredictiveValue::Medium,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Trend {
    #[serde(alias = "trend")]
    pub description: String,
    #[serde(default)]
    pub direction: TrendDirection,
    #[serde(default)]
    pub strength: TrendStrength,
    #[serde(default)]
    pub timeframe: String,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default)]
    pub supporting_evidence: Vec<String>,
    #[serde(default)]
    pub implications: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    #[serde(alias = "pattern")]
    pub name: String,
    #[serde(rename = "type", default)]
    pub pattern_type: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default = "default_confidence")]
    pub strength: f64,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub historical_occurrences: u32,
    #[serde(default)]
    pub predictive_value: PredictiveValue,
}

// ============= Result Types =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResearchSource {
    pub title: String,
    pub url: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    pub relevance: f64,
    pub excerpts: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarketInsights {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_change_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volatility: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_volume: Option<f64>,
    pub data_points: usize,
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProprietaryInsights {
    pub matched_documents: usize,
    pub average_relevance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corpus_confidence: Option<f64>,
    pub insights: Vec<String>,
}

/// The unit returned by every strategy and by the orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResearchResult {
    pub summary: String,
    pub key_findings: Vec<String>,
    pub trends: Vec<Trend>,
    pub patterns: Vec<Pattern>,
    pub sources: Vec<ResearchSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_insights: Option<MarketInsights>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proprietary_insights: Option<ProprietaryInsights>,
    pub confidence: f64,
    pub recommendations: Vec<String>,
    pub related_topics: Vec<String>,
    /// Elapsed wall-clock time for producing this result, in milliseconds
    pub execution_time_ms: u64,
}

// ============= Numeric Helpers =============

/// Clamp into [0, 1]; non-finite values collapse to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Arithmetic mean over finite values, `None` for an empty input.
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Append `items` to `target`, skipping exact duplicates and keeping first-seen order.
pub fn extend_unique<I>(target: &mut Vec<String>, items: I)
where
    I: IntoIterator<Item = String>,
{
    for item in items {
        if !target.contains(&item) {
            target.push(item);
        }
    }
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unsupported research type: {0}")]
    UnsupportedResearchType(String),

    #[error("Unsupported message: {0}")]
    UnsupportedMessage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{collaborator} retrieval failed: {message}")]
    Retrieval {
        collaborator: String,
        message: String,
    },

    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn retrieval(collaborator: &str, message: impl Into<String>) -> Self {
        AppError::Retrieval {
            collaborator: collaborator.to_string(),
            message: message.into(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let status = match &self {
            AppError::UnsupportedResearchType(_)
            | AppError::UnsupportedMessage(_)
            | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Retrieval { .. } => StatusCode::BAD_GATEWAY,
            AppError::Configuration(_) | AppError::LLM(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = serde_json::json!({
            "error": self.to_string()
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("web-search", ResearchType::WebSearch)]
    #[case("deep-research", ResearchType::DeepResearch)]
    #[case("market-analysis", ResearchType::MarketAnalysis)]
    #[case("proprietary-analysis", ResearchType::ProprietaryAnalysis)]
    #[case("comprehensive", ResearchType::Comprehensive)]
    fn test_research_type_parses(#[case] raw: &str, #[case] expected: ResearchType) {
        assert_eq!(raw.parse::<ResearchType>().unwrap(), expected);
        assert_eq!(expected.as_str(), raw);
    }

    #[test]
    fn test_unknown_research_type_is_unsupported() {
        let err = "unsupported".parse::<ResearchType>().unwrap_err();
        assert!(matches!(err, AppError::UnsupportedResearchType(ref t) if t == "unsupported"));
    }

    #[test]
    fn test_request_from_value_reports_unsupported_type() {
        let err = ResearchRequest::from_value(json!({
            "topic": "bitcoin",
            "researchType": "unsupported"
        }))
        .unwrap_err();
        assert!(matches!(err, AppError::UnsupportedResearchType(_)));
    }

    #[test]
    fn test_request_deserializes_with_parameters() {
        let request = ResearchRequest::from_value(json!({
            "topic": "Tesla stock analysis",
            "researchType": "web-search",
            "parameters": {
                "timeframe": "past-month",
                "depth": "standard",
                "maxResults": 10
            }
        }))
        .unwrap();

        assert_eq!(request.research_type, ResearchType::WebSearch);
        assert_eq!(request.parameters.timeframe(), Timeframe::PastMonth);
        assert_eq!(request.parameters.depth(), ResearchDepth::Standard);
        assert_eq!(request.parameters.max_results_or(5), 10);
        assert!(request.parameters.include_market_data());
        assert!(request.parameters.include_proprietary_data());
    }

    #[test]
    fn test_validate_rejects_blank_topic() {
        let request = ResearchRequest::new("   ", ResearchType::WebSearch);
        assert!(matches!(request.validate(), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_validate_rejects_zero_max_results() {
        let request = ResearchRequest::new("rust", ResearchType::WebSearch).with_parameters(
            ResearchParameters {
                max_results: Some(0),
                ..Default::default()
            },
        );
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_lenient_enums() {
        let trend: Trend = serde_json::from_value(json!({
            "description": "EV adoption",
            "direction": "Increasing",
            "strength": "high"
        }))
        .unwrap();
        assert_eq!(trend.direction, TrendDirection::Upward);
        assert_eq!(trend.strength, TrendStrength::Strong);
        assert_eq!(trend.confidence, 0.5);

        let statement: SentimentStatement =
            serde_json::from_value(json!({"text": "x", "sentiment": "mixed"})).unwrap();
        assert_eq!(statement.sentiment, Sentiment::Neutral);
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = ResearchResult {
            key_findings: vec!["a".to_string()],
            ..Default::default()
        };
        let value = serde_json::to_value(&result).unwrap();
        assert!(value.get("keyFindings").is_some());
        assert!(value.get("relatedTopics").is_some());
        assert!(value.get("marketInsights").is_none());
    }

    #[test]
    fn test_clamp_and_mean() {
        assert_eq!(clamp_unit(1.7), 1.0);
        assert_eq!(clamp_unit(-0.2), 0.0);
        assert_eq!(clamp_unit(f64::NAN), 0.0);
        assert_eq!(mean(Vec::<f64>::new()), None);
        let m = mean([0.8, 0.75, 0.9]).unwrap();
        assert!((m - 0.8167).abs() < 1e-3);
    }

    #[test]
    fn test_extend_unique_keeps_first_seen_order() {
        let mut topics = vec!["bitcoin".to_string()];
        extend_unique(
            &mut topics,
            ["ethereum", "bitcoin", "defi"].map(String::from),
        );
        assert_eq!(topics, vec!["bitcoin", "ethereum", "defi"]);
    }
}
