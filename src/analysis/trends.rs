use crate::analysis::document_digest;
use crate::llm::{LLMClient, structured};
use crate::types::{RetrievedDocument, Trend, clamp_unit};
use std::sync::Arc;

const SYSTEM_PROMPT: &str = "You are a market research analyst. You infer directional \
trends from news and research snippets and answer only with JSON.";

/// Documents included in one trend prompt.
const MAX_DOCUMENTS: usize = 25;

/// Derives directional trends from a document set with one completion call.
pub struct TrendIdentifier {
    llm: Arc<dyn LLMClient>,
}

impl TrendIdentifier {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }

    fn build_prompt(documents: &[RetrievedDocument], topic: &str) -> String {
        format!(
            r#"Identify directional trends about "{topic}" in the documents below.

DOCUMENTS:
{}

Return a JSON object of the form:
{{
  "trends": [
    {{
      "description": "what is changing",
      "direction": "upward|downward|stable",
      "strength": "strong|moderate|weak",
      "timeframe": "period the trend covers",
      "confidence": 0.0-1.0,
      "supportingEvidence": ["document evidence"],
      "implications": ["consequence"]
    }}
  ]
}}

Return an empty list if the documents show no clear trend."#,
            document_digest(documents, MAX_DOCUMENTS)
        )
    }

    /// Trends in the order the completion service emitted them.
    ///
    /// An empty document set makes no call. Service errors and unparseable
    /// payloads degrade to an empty list.
    pub async fn identify_trends(
        &self,
        documents: &[RetrievedDocument],
        topic: &str,
    ) -> Vec<Trend> {
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
                tracing::warn!(error = %e, topic, "Trend identification failed");
                return vec![];
            }
        };

        let Some(mut trends) = structured::parse_list::<Trend>(&response, "trends") else {
            tracing::warn!(topic, "Trend response held no trend list");
            return vec![];
        };

        trends.retain(|t| !t.description.trim().is_empty());
        for trend in &mut trends {
            trend.confidence = clamp_unit(trend.confidence);
        }
        tracing::debug!(topic, count = trends.len(), "Trends identified");
        trends
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AppError, Result, TrendDirection, TrendStrength};
    use async_trait::async_trait;

    struct CannedLLM(Result<String>);

    #[async_trait]
    impl LLMClient for CannedLLM {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            match &self.0 {
                Ok(s) => Ok(s.clone()),
                Err(e) => Err(AppError::LLM(e.to_string())),
            }
        }

        async fn generate_with_system(&self, _system: &str, prompt: &str) -> Result<String> {
            self.generate(prompt).await
        }

        fn model_name(&self) -> &str {
            "canned"
        }
    }

    fn doc(title: &str) -> RetrievedDocument {
        RetrievedDocument {
            title: title.to_string(),
            url: format!("https://example.com/{}", title.len()),
            snippet: "snippet".to_string(),
            source: "example.com".to_string(),
            published_at: None,
            relevance: 0.8,
        }
    }

    #[tokio::test]
    async fn test_preserves_emitted_order() {
        let llm = Arc::new(CannedLLM(Ok(r#"{"trends": [
            {"description": "EV adoption rising", "direction": "upward", "strength": "strong", "confidence": 0.9},
            {"trend": "Margins compressing", "direction": "falling", "confidence": 1.7}
        ]}"#
        .to_string())));
        let trends = TrendIdentifier::new(llm)
            .identify_trends(&[doc("Tesla")], "Tesla")
            .await;

        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].description, "EV adoption rising");
        assert_eq!(trends[0].strength, TrendStrength::Strong);
        assert_eq!(trends[1].direction, TrendDirection::Downward);
        assert_eq!(trends[1].confidence, 1.0);
    }

    #[tokio::test]
    async fn test_accepts_bare_array() {
        let llm = Arc::new(CannedLLM(Ok(
            r#"Here you go: [{"description": "Flat demand"}]"#.to_string(),
        )));
        let trends = TrendIdentifier::new(llm)
            .identify_trends(&[doc("x")], "x")
            .await;
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].direction, TrendDirection::Stable);
    }

    #[tokio::test]
    async fn test_citations_do_not_hide_trends() {
        let llm = Arc::new(CannedLLM(Ok(
            r#"Per sources [1] and [2]: {"trends": [{"description": "Battery costs falling"}]}"#
                .to_string(),
        )));
        let trends = TrendIdentifier::new(llm)
            .identify_trends(&[doc("x")], "x")
            .await;
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].description, "Battery costs falling");
    }

    #[tokio::test]
    async fn test_degrades_to_empty() {
        let garbage = TrendIdentifier::new(Arc::new(CannedLLM(Ok("no idea".to_string()))));
        assert!(garbage.identify_trends(&[doc("x")], "x").await.is_empty());

        let failing = TrendIdentifier::new(Arc::new(CannedLLM(Err(AppError::LLM(
            "down".to_string(),
        )))));
        assert!(failing.identify_trends(&[doc("x")], "x").await.is_empty());
    }

    #[test]
    fn test_prompt_names_topic() {
        let prompt = TrendIdentifier::build_prompt(&[doc("Tesla deliveries")], "Tesla");
        assert!(prompt.contains("Identify directional trends about \"Tesla\""));
        assert!(prompt.contains("Tesla deliveries"));
    }
}
