//! Signal Extraction and Analysis
//!
//! Three completion-service backed analysers turn unstructured material into
//! structured signal:
//!
//! - [`extractor::InformationExtractor`] - entities, metrics, sentiment, topics, relationships
//! - [`trends::TrendIdentifier`] - directional trends across a document set
//! - [`patterns::PatternIdentifier`] - recurring structural patterns across a document set
//!
//! All three share one failure policy: a completion error or an unparseable
//! payload is logged and turned into an empty result. None of them ever
//! returns an error, so a bad generation can never abort a research request.

/// Structured information extraction from free text.
pub mod extractor;
/// Recurring pattern identification.
pub mod patterns;
/// Directional trend identification.
pub mod trends;

pub use extractor::InformationExtractor;
pub use patterns::PatternIdentifier;
pub use trends::TrendIdentifier;

use crate::types::RetrievedDocument;

/// Numbered digest of documents (date, title, snippet) for analysis prompts.
pub(crate) fn document_digest(documents: &[RetrievedDocument], limit: usize) -> String {
    documents
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, doc)| {
            let date = doc
                .published_at
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "undated".to_string());
            format!("{}. [{}] {}: {}", i + 1, date, doc.title, doc.snippet)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Truncate on a char boundary so prompts stay within model context.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_document_digest_formats_dates() {
        let docs = vec![
            RetrievedDocument {
                title: "Tesla deliveries beat".to_string(),
                url: "https://a".to_string(),
                snippet: "Record quarter".to_string(),
                source: "a".to_string(),
                published_at: Some(chrono::Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()),
                relevance: 0.9,
            },
            RetrievedDocument {
                title: "Second".to_string(),
                url: "https://b".to_string(),
                snippet: "More".to_string(),
                source: "b".to_string(),
                published_at: None,
                relevance: 0.5,
            },
        ];
        let digest = document_digest(&docs, 10);
        assert!(digest.starts_with("1. [2024-03-01] Tesla deliveries beat: Record quarter"));
        assert!(digest.contains("2. [undated] Second"));
        assert_eq!(document_digest(&docs, 1).lines().count(), 1);
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
