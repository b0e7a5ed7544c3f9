//! Strategy Executors
//!
//! Four independent acquisition paths sharing one output contract
//! ([`ResearchResult`]). Each executor:
//!
//! 1. calls its primary retrieval collaborator (errors propagate),
//! 2. runs extraction, trend and pattern identification over the material
//!    (errors degrade to empty),
//! 3. asks the completion service for a narrative and recommendations
//!    (errors degrade to a locally built summary).

/// Deep-research strategy.
pub mod deep;
/// Market-analysis strategy.
pub mod market;
/// Proprietary-corpus strategy.
pub mod proprietary;
/// Open-web search strategy.
pub mod web;

pub use deep::DeepResearchStrategy;
pub use market::MarketAnalysisStrategy;
pub use proprietary::ProprietaryAnalysisStrategy;
pub use web::WebSearchStrategy;

use crate::analysis::{InformationExtractor, PatternIdentifier, TrendIdentifier, truncate_chars};
use crate::llm::{LLMClient, structured};
use crate::retrieval::Collaborators;
use crate::types::{
    Entity, ExtractedInformation, Pattern, ResearchDepth, ResearchRequest, ResearchResult,
    Result, RetrievedDocument, Trend, TrendDirection, clamp_unit, extend_unique, mean,
};
use crate::utils::toml_config::{ConfidenceConfig, ResearchConfig};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

/// One research acquisition path.
#[async_trait]
pub trait StrategyExecutor: Send + Sync {
    /// Strategy name as used in `researchType`.
    fn name(&self) -> &'static str;

    async fn execute(&self, request: &ResearchRequest) -> Result<ResearchResult>;
}

const NARRATIVE_SYSTEM_PROMPT: &str = "You are a senior research analyst writing for \
investment professionals. Be specific, cite figures from the material, and answer only \
with the JSON object requested.";

/// Longest material block sent for a narrative.
const MAX_NARRATIVE_CHARS: usize = 10_000;

/// Everything the strategies share: the completion service, the retrieval
/// collaborators, configured defaults and the three analysers.
pub struct StrategyContext {
    pub llm: Arc<dyn LLMClient>,
    pub collaborators: Collaborators,
    pub research: ResearchConfig,
    pub confidence: ConfidenceConfig,
    extractor: InformationExtractor,
    trends: TrendIdentifier,
    patterns: PatternIdentifier,
}

impl StrategyContext {
    pub fn new(
        llm: Arc<dyn LLMClient>,
        collaborators: Collaborators,
        research: ResearchConfig,
        confidence: ConfidenceConfig,
    ) -> Self {
        Self {
            extractor: InformationExtractor::new(Arc::clone(&llm)),
            trends: TrendIdentifier::new(Arc::clone(&llm)),
            patterns: PatternIdentifier::new(Arc::clone(&llm)),
            llm,
            collaborators,
            research,
            confidence,
        }
    }

    pub fn depth(&self, request: &ResearchRequest) -> ResearchDepth {
        request
            .parameters
            .depth
            .unwrap_or(self.research.default_depth)
    }

    pub fn max_results(&self, request: &ResearchRequest) -> usize {
        request.parameters.max_results_or(self.research.max_results)
    }

    /// Extraction over the concatenated material, trend and pattern
    /// identification over the document list. The three calls are independent
    /// and run concurrently.
    pub async fn analyse(&self, documents: &[RetrievedDocument], topic: &str) -> Analysis {
        let text = material_text(documents);
        let (info, trends, patterns) = tokio::join!(
            self.extractor.extract(&text),
            self.trends.identify_trends(documents, topic),
            self.patterns.identify_patterns(documents, topic),
        );
        Analysis {
            info,
            trends,
            patterns,
        }
    }

    /// Extraction only, for strategies that do not derive trends or patterns.
    pub async fn extract(&self, text: &str) -> ExtractedInformation {
        self.extractor.extract(text).await
    }

    /// Narrative summary, recommendations and (optionally) insight lines.
    ///
    /// A prose answer instead of JSON is kept as the summary; any other
    /// failure yields an empty narrative for the caller to fill in.
    pub async fn narrate(&self, brief: NarrativeBrief<'_>) -> Narrative {
        let insights = if brief.with_insights {
            "\n  \"insights\": [\"short, specific insight\"],"
        } else {
            ""
        };
        let prompt = format!(
            r#"Write a concise research summary about "{topic}" based on the {angle} material below.

MATERIAL:
{material}

Respond with a JSON object:
{{
  "summary": "three to five sentences",{insights}
  "recommendations": ["actionable recommendation"]
}}"#,
            topic = brief.topic,
            angle = brief.angle,
            material = truncate_chars(&brief.material, MAX_NARRATIVE_CHARS),
        );

        let response = match self
            .llm
            .generate_with_system(NARRATIVE_SYSTEM_PROMPT, &prompt)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    topic = brief.topic,
                    angle = brief.angle,
                    "Narrative generation failed"
                );
                return Narrative::default();
            }
        };

        if let Some(narrative) = structured::parse_object::<Narrative>(&response) {
            return narrative.cleaned();
        }

        if structured::parse_value_where(&response, serde_json::Value::is_object).is_none()
            && !response.trim().is_empty()
        {
            tracing::debug!(topic = brief.topic, "Narrative returned as prose, using it verbatim");
            return Narrative {
                summary: response.trim().to_string(),
                ..Default::default()
            };
        }

        tracing::warn!(topic = brief.topic, "Narrative response was not usable");
        Narrative::default()
    }

    /// Seeded exposure recommendation followed by the narrative's own.
    pub fn recommendations(
        &self,
        topic: &str,
        info: &ExtractedInformation,
        narrative_recommendations: Vec<String>,
    ) -> Vec<String> {
        let mut recommendations = vec![exposure_recommendation(
            topic,
            info.aggregate_sentiment(),
            self.confidence.sentiment_threshold,
        )];
        recommendations.extend(narrative_recommendations);
        recommendations
    }
}

/// Input to [`StrategyContext::narrate`].
pub struct NarrativeBrief<'a> {
    pub topic: &'a str,
    /// Kind of material, e.g. "open-web search"
    pub angle: &'a str,
    pub material: String,
    pub with_insights: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Narrative {
    pub summary: String,
    pub recommendations: Vec<String>,
    pub insights: Vec<String>,
}

impl Narrative {
    fn cleaned(mut self) -> Self {
        self.summary = self.summary.trim().to_string();
        self.recommendations = non_empty(self.recommendations);
        self.insights = non_empty(self.insights);
        self
    }

    /// The summary, or `fallback()` when the service gave none.
    pub fn summary_or(&mut self, fallback: impl FnOnce() -> String) -> String {
        if self.summary.is_empty() {
            fallback()
        } else {
            std::mem::take(&mut self.summary)
        }
    }
}

fn non_empty(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Output of the three analysers over one document set.
#[derive(Debug, Default)]
pub struct Analysis {
    pub info: ExtractedInformation,
    pub trends: Vec<Trend>,
    pub patterns: Vec<Pattern>,
}

impl Analysis {
    /// One finding per entity, then per trend, then per pattern.
    pub fn key_findings(&self) -> Vec<String> {
        let mut findings = Vec::new();
        extend_unique(&mut findings, findings_from_entities(&self.info.entities));
        extend_unique(&mut findings, findings_from_trends(&self.trends));
        extend_unique(&mut findings, findings_from_patterns(&self.patterns));
        findings
    }

    pub fn related_topics(&self) -> Vec<String> {
        let mut topics = Vec::new();
        extend_unique(
            &mut topics,
            self.info.topics.iter().map(|t| t.label.trim().to_string()),
        );
        topics
    }

    /// Mean of entity, trend and pattern confidences, never below `floor`.
    pub fn blended_confidence(&self, floor: f64) -> f64 {
        blend_confidence(
            self.info
                .entities
                .iter()
                .map(|e| e.confidence)
                .chain(self.trends.iter().map(|t| t.confidence))
                .chain(self.patterns.iter().map(|p| p.confidence)),
            floor,
        )
    }
}

/// Mean of the signals bounded below by `floor`; `floor` alone when there are none.
pub fn blend_confidence(signals: impl IntoIterator<Item = f64>, floor: f64) -> f64 {
    let floor = clamp_unit(floor);
    clamp_unit(mean(signals).unwrap_or(floor).max(floor))
}

pub fn findings_from_entities(entities: &[Entity]) -> Vec<String> {
    entities
        .iter()
        .map(|e| {
            let mentions = if e.mentions == 1 {
                "1 mention".to_string()
            } else {
                format!("{} mentions", e.mentions)
            };
            format!(
                "{} ({}) is a central subject: {}, {:.0}% confidence",
                e.name.trim(),
                e.entity_type,
                mentions,
                e.confidence * 100.0
            )
        })
        .collect()
}

pub fn findings_from_trends(trends: &[Trend]) -> Vec<String> {
    trends
        .iter()
        .map(|t| {
            let direction = match t.direction {
                TrendDirection::Upward => "Upward",
                TrendDirection::Downward => "Downward",
                TrendDirection::Stable => "Stable",
            };
            if t.timeframe.trim().is_empty() {
                format!("{} trend: {}", direction, t.description.trim())
            } else {
                format!(
                    "{} trend ({}): {}",
                    direction,
                    t.timeframe.trim(),
                    t.description.trim()
                )
            }
        })
        .collect()
}

pub fn findings_from_patterns(patterns: &[Pattern]) -> Vec<String> {
    patterns
        .iter()
        .map(|p| {
            let kind = if p.pattern_type.trim().is_empty() {
                "Recurring"
            } else {
                p.pattern_type.trim()
            };
            let mut finding = format!("{} pattern: {}", capitalize(kind), p.name.trim());
            if !p.frequency.trim().is_empty() {
                finding.push_str(&format!(", recurring {}", p.frequency.trim()));
            }
            finding
        })
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Topic-specific exposure suggestion gated by aggregate sentiment polarity.
pub fn exposure_recommendation(topic: &str, sentiment: Option<f64>, threshold: f64) -> String {
    match sentiment {
        Some(score) if score > threshold => format!(
            "Consider increasing exposure to {}: aggregate sentiment across sources is positive ({:+.2})",
            topic, score
        ),
        Some(score) if score < -threshold => format!(
            "Consider decreasing exposure to {}: aggregate sentiment across sources is negative ({:+.2})",
            topic, score
        ),
        Some(score) => format!(
            "Monitor {} before changing exposure: sentiment is mixed ({:+.2})",
            topic, score
        ),
        None => format!(
            "Monitor {} before changing exposure: no clear sentiment signal in the sources",
            topic
        ),
    }
}

/// Title and snippet of every document, as one block for extraction.
pub fn material_text(documents: &[RetrievedDocument]) -> String {
    documents
        .iter()
        .map(|d| {
            if d.snippet.trim().is_empty() {
                d.title.clone()
            } else {
                format!("{}\n{}", d.title, d.snippet)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Material for a narrative prompt: findings first, then the documents.
pub fn briefing(findings: &[String], documents: &[RetrievedDocument]) -> String {
    let mut out = String::new();
    if !findings.is_empty() {
        out.push_str("Key findings:\n");
        for finding in findings {
            out.push_str("- ");
            out.push_str(finding);
            out.push('\n');
        }
        out.push('\n');
    }
    out.push_str(&material_text(documents));
    out
}

/// Summary built without the completion service.
pub fn fallback_summary(
    angle: &str,
    topic: &str,
    source_count: usize,
    findings: &[String],
) -> String {
    if source_count == 0 {
        return format!("No {} material was found for \"{}\".", angle, topic);
    }
    let mut summary = format!(
        "{} research on \"{}\" drew on {} source{}.",
        capitalize(angle),
        topic,
        source_count,
        if source_count == 1 { "" } else { "s" }
    );
    if !findings.is_empty() {
        let lead = findings
            .iter()
            .take(3)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("; ");
        summary.push_str(&format!(" Key findings: {}.", lead));
    }
    summary
}
