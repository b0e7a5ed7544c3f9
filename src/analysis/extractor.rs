use crate::analysis::truncate_chars;
use crate::llm::{LLMClient, structured};
use crate::types::{ExtractedInformation, Sentiment, clamp_unit};
use serde_json::Value;
use std::sync::Arc;

const SYSTEM_PROMPT: &str = "You are an information extraction engine for financial and \
market research. You read text and return a single JSON object. Never add commentary.";

/// Longest text sent in one extraction call.
const MAX_INPUT_CHARS: usize = 12_000;

/// Converts free text into entities, metrics, sentiment, topics and relationships
/// with one completion call.
pub struct InformationExtractor {
    llm: Arc<dyn LLMClient>,
}

impl InformationExtractor {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }

    fn build_prompt(text: &str) -> String {
        format!(
            r#"Extract structured information from the text below.

Return a JSON object with exactly these keys:
{{
  "entities": [{{"name": "", "type": "company|person|product|concept|location", "confidence": 0.0-1.0, "mentions": 1, "context": ["excerpt"]}}],
  "keyMetrics": [{{"name": "", "value": 0.0, "unit": "", "context": "", "source": "", "confidence": 0.0-1.0}}],
  "sentiments": [{{"text": "", "sentiment": "positive|negative|neutral", "score": -1.0-1.0, "confidence": 0.0-1.0, "aspects": [""]}}],
  "topics": [{{"label": "", "relevance": 0.0-1.0, "keywords": [""], "frequency": 1}}],
  "relationships": [{{"entity1": "", "entity2": "", "relationship": "", "strength": 0.0-1.0, "context": ""}}]
}}

Use empty arrays for anything the text does not support.

TEXT:
{}"#,
            truncate_chars(text, MAX_INPUT_CHARS)
        )
    }

    /// Extract structured signal from `text`.
    ///
    /// Never fails: a completion error or an unparseable payload yields the
    /// all-empty structure.
    pub async fn extract(&self, text: &str) -> ExtractedInformation {
        if text.trim().is_empty() {
            return ExtractedInformation::default();
        }

        let response = match self
            .llm
            .generate_with_system(SYSTEM_PROMPT, &Self::build_prompt(text))
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Information extraction failed, continuing without it");
                return ExtractedInformation::default();
            }
        };

        let Some(payload) = structured::parse_value_where(&response, Value::is_object) else {
            tracing::warn!(
                excerpt = %response.chars().take(120).collect::<String>(),
                "Extraction response held no JSON object"
            );
            return ExtractedInformation::default();
        };

        let info = ExtractedInformation {
            entities: structured::list_field(&payload, "entities"),
            key_metrics: structured::list_field(&payload, "keyMetrics"),
            sentiments: structured::list_field(&payload, "sentiments"),
            topics: structured::list_field(&payload, "topics"),
            relationships: structured::list_field(&payload, "relationships"),
        };

        let info = normalize(info);
        tracing::debug!(
            entities = info.entities.len(),
            metrics = info.key_metrics.len(),
            sentiments = info.sentiments.len(),
            topics = info.topics.len(),
            relationships = info.relationships.len(),
            "Extraction complete"
        );
        info
    }
}

/// Clamp scores into range and drop nameless entries.
fn normalize(mut info: ExtractedInformation) -> ExtractedInformation {
    info.entities.retain(|e| !e.name.trim().is_empty());
    for entity in &mut info.entities {
        entity.confidence = clamp_unit(entity.confidence);
    }

    info.key_metrics.retain(|m| !m.name.trim().is_empty() && m.value.is_finite());
    for metric in &mut info.key_metrics {
        metric.confidence = clamp_unit(metric.confidence);
    }

    for statement in &mut info.sentiments {
        let score = if statement.score.is_finite() {
            statement.score.clamp(-1.0, 1.0)
        } else {
            0.0
        };
        // The label wins when it disagrees with the sign of the score.
        statement.score = match statement.sentiment {
            Sentiment::Positive => score.abs(),
            Sentiment::Negative => -score.abs(),
            Sentiment::Neutral => score,
        };
        statement.confidence = clamp_unit(statement.confidence);
    }

    info.topics.retain(|t| !t.label.trim().is_empty());
    for topic in &mut info.topics {
        topic.relevance = clamp_unit(topic.relevance);
    }

    info.relationships
        .retain(|r| !r.entity1.trim().is_empty() && !r.entity2.trim().is_empty());
    for relationship in &mut info.relationships {
        relationship.strength = clamp_unit(relationship.strength);
    }

    info
}
