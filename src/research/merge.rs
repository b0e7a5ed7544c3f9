//! Fan-in for comprehensive mode.
//!
//! Parts arrive in executor order (web, market, proprietary) and that order is
//! preserved for findings, topics, recommendations, sources, trends and
//! patterns.

use crate::llm::LLMClient;
use crate::types::{ResearchResult, clamp_unit, extend_unique, mean};
use std::sync::Arc;

const MERGE_SYSTEM_PROMPT: &str = "You are a senior research analyst. You merge several \
research summaries into one coherent narrative without repeating yourself.";

/// Merge everything except the summary, which needs the completion service.
///
/// The merged summary is the plain concatenation of the parts' summaries so
/// the result is complete even if [`combine_summaries`] is never reached.
pub fn merge_results(parts: Vec<ResearchResult>) -> ResearchResult {
    let confidence = clamp_unit(mean(parts.iter().map(|p| p.confidence)).unwrap_or(0.0));
    let summary = joined_summaries(&parts);
    let mut merged = ResearchResult {
        summary,
        confidence,
        ..Default::default()
    };

    for part in parts {
        extend_unique(&mut merged.key_findings, part.key_findings);
        extend_unique(&mut merged.related_topics, part.related_topics);
        merged.recommendations.extend(part.recommendations);
        merged.trends.extend(part.trends);
        merged.patterns.extend(part.patterns);

        for source in part.sources {
            // Corpus hits often carry no url; those are distinct documents.
            let duplicate = !source.url.is_empty()
                && merged.sources.iter().any(|s| s.url == source.url);
            if !duplicate {
                merged.sources.push(source);
            }
        }

        if merged.market_insights.is_none() {
            merged.market_insights = part.market_insights;
        }
        if merged.proprietary_insights.is_none() {
            merged.proprietary_insights = part.proprietary_insights;
        }
    }

    merged
}

fn joined_summaries(parts: &[ResearchResult]) -> String {
    parts
        .iter()
        .map(|p| p.summary.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// One final narrative over the individual summaries; falls back to their
/// concatenation when the completion service fails or answers with nothing.
pub async fn combine_summaries(
    llm: &Arc<dyn LLMClient>,
    topic: &str,
    parts: &[ResearchResult],
) -> String {
    let joined = joined_summaries(parts);
    if parts.len() < 2 {
        return joined;
    }

    let prompt = format!(
        r#"Combine these research summaries about "{topic}" into a single summary of one or two paragraphs.
Keep concrete figures. Reply with the summary text only.

{summaries}"#,
        summaries = parts
            .iter()
            .enumerate()
            .map(|(i, p)| format!("SUMMARY {}:\n{}", i + 1, p.summary.trim()))
            .collect::<Vec<_>>()
            .join("\n\n")
    );

    match llm.generate_with_system(MERGE_SYSTEM_PROMPT, &prompt).await {
        Ok(summary) if !summary.trim().is_empty() => summary.trim().to_string(),
        Ok(_) => {
            tracing::warn!(topic, "Summary merge returned nothing, concatenating summaries");
            joined
        }
        Err(e) => {
            tracing::warn!(topic, error = %e, "Summary merge failed, concatenating summaries");
            joined
        }
    }
}
