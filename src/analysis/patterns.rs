use crate::analysis::document_digest;
use crate::llm::{LLMClient, structured};
use crate::types::{Pattern, RetrievedDocument, clamp_unit};
use std::sync::Arc;

const SYSTEM_PROMPT: &str = "You are a quantitative research analyst. You look for \
recurring structural patterns in historical material and answer only with JSON.";

const MAX_DOCUMENTS: usize = 25;

/// Derives recurring patterns (cyclical, seasonal, structural) from a document set.
pub struct PatternIdentifier {
    llm: Arc<dyn LLMClient>,
}

impl PatternIdentifier {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }

    fn build_prompt(documents: &[RetrievedDocument], topic: &str) -> String {
        format!(
            r#"Identify recurring structural patterns related to "{topic}" in the documents below.
Look for cyclical, seasonal, structural or behavioural regularities, not one-off events.

DOCUMENTS:
{}

Return a JSON object of the form:
{{
  "patterns": [
    {{
      "name": "short pattern name",
      "type": "cyclical|seasonal|structural|behavioral",
      "frequency": "how often it recurs",
      "strength": 0.0-1.0,
      "confidence": 0.0-1.0,
      "description": "what the pattern looks like",
      "historicalOccurrences": 0,
      "predictiveValue": "high|medium|low"
    }}
  ]
}}"#,
            document_digest(documents, MAX_DOCUMENTS)
        )
    }

    /// Same call, parse and degrade shape as trend identification.
    pub async fn identify_patterns(
        &self,
        documents: &[RetrievedDocument],
        topic: &str,
    ) -> Vec<Pattern> {
        if documents.is_empty() {
            return vec![];
        }

        let response = match self
            .llm
            .generate_with_system(SYSTEM_PROMPT, &Self::build_prompt(documents, topic))
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, topic, "Pattern identification failed");
                return vec![];
            }
        };

        let Some(mut patterns) = structured::parse_list::<Pattern>(&response, "patterns") else {
            tracing::warn!(topic, "Pattern response held no pattern list");
            return vec![];
        };

        patterns.retain(|p| !p.name.trim().is_empty());
        for pattern in &mut patterns {
            pattern.strength = clamp_unit(pattern.strength);
            pattern.confidence = clamp_unit(pattern.confidence);
        }
        patterns
    }
}
