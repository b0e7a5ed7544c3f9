//! Deep-research collaborator
//!
//! Breaks a query into focused research questions, searches them concurrently
//! through the web-search collaborator, optionally follows up once, and asks
//! the completion service for a synthesised report.

use crate::llm::{LLMClient, structured};
use crate::retrieval::{
    DeepResearch, DeepResearchOptions, DeepResearchReport, SearchDepth, SearchOptions, WebSearch,
};
use crate::types::{AppError, ResearchDepth, Result, RetrievedDocument, Timeframe, clamp_unit, mean};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tokio::task::JoinSet;

pub struct ResearchCoordinator {
    llm: Arc<dyn LLMClient>,
    search: Arc<dyn WebSearch>,
    question_count: usize,
    max_iterations: u8,
    results_per_question: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SynthesisPayload {
    summary: String,
    key_findings: Vec<String>,
    related_topics: Vec<String>,
    confidence: Option<f64>,
}

impl ResearchCoordinator {
    pub fn new(
        llm: Arc<dyn LLMClient>,
        search: Arc<dyn WebSearch>,
        question_count: usize,
        max_iterations: u8,
        results_per_question: usize,
    ) -> Self {
        Self {
            llm,
            search,
            question_count: question_count.max(1),
            max_iterations: max_iterations.max(1),
            results_per_question: results_per_question.max(1),
        }
    }

    /// Questions per round; `question_count` caps the comprehensive depth.
    fn question_count(&self, depth: ResearchDepth) -> usize {
        match depth {
            ResearchDepth::Basic => self.question_count.min(2),
            ResearchDepth::Standard => self.question_count.min(3),
            ResearchDepth::Comprehensive => self.question_count,
        }
    }

    fn iterations(&self, depth: ResearchDepth) -> u8 {
        match depth {
            ResearchDepth::Comprehensive => self.max_iterations,
            _ => 1,
        }
    }

    async fn generate_research_questions(
        &self,
        query: &str,
        focus_areas: &[String],
        count: usize,
    ) -> Vec<String> {
        let focus = if focus_areas.is_empty() {
            String::new()
        } else {
            format!("\nGive particular attention to: {}", focus_areas.join(", "))
        };

        let prompt = format!(
            r#"Generate {count} focused research questions to comprehensively answer: {query}{focus}

Return only the questions, one per line, numbered 1-{count}.

Example:

1. [QUESTION 1]
2. [QUESTION 2]
..."#
        );

        let mut questions = match self.llm.generate(&prompt).await {
            Ok(response) => parse_numbered_lines(&response, count),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Question generation failed, searching the query directly"
                );
                vec![]
            }
        };

        if questions.is_empty() {
            questions.push(query.to_string());
            questions.extend(
                focus_areas
                    .iter()
                    .take(count.saturating_sub(1))
                    .map(|area| format!("{} {}", query, area)),
            );
        }
        questions
    }

    /// Search every question concurrently.
    ///
    /// Individual failures are tolerated; the call only fails when no search
    /// succeeded.
    async fn parallel_research(
        &self,
        questions: &[String],
        depth: ResearchDepth,
    ) -> Result<Vec<RetrievedDocument>> {
        let mut set = JoinSet::new();
        let options = SearchOptions {
            depth: SearchDepth::from(depth),
            timeframe: Timeframe::AllTime,
            max_results: self.results_per_question,
        };

        for question in questions {
            let search = Arc::clone(&self.search);
            let question = question.clone();
            let options = options.clone();
            set.spawn(async move { search.search(&question, &options).await });
        }

        let mut documents = Vec::new();
        let mut first_error = None;
        let mut succeeded = 0usize;

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(Ok(response)) => {
                    succeeded += 1;
                    documents.extend(response.results);
                }
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "Research question search failed");
                    first_error.get_or_insert(e);
                }
                Err(e) => {
                    first_error.get_or_insert(AppError::Internal(format!(
                        "Search task panicked: {}",
                        e
                    )));
                }
            }
        }

        if succeeded == 0 {
            if let Some(e) = first_error {
                return Err(e);
            }
        }

        Ok(documents)
    }

    async fn generate_followup_questions(
        &self,
        query: &str,
        documents: &[RetrievedDocument],
    ) -> Vec<String> {
        if documents.is_empty() {
            return vec![];
        }

        let prompt = format!(
            r#"Original question: {}

Findings so far:
{}

Generate 2-3 follow-up research questions that would fill the largest gaps.

ONLY output the questions, one per line."#,
            query,
            digest(documents, 12)
        );

        match self.llm.generate(&prompt).await {
            Ok(response) => parse_numbered_lines(&response, 3),
            Err(e) => {
                tracing::warn!(error = %e, "Follow-up question generation failed");
                vec![]
            }
        }
    }

    async fn synthesize_findings(
        &self,
        query: &str,
        documents: &[RetrievedDocument],
    ) -> SynthesisPayload {
        let prompt = format!(
            r#"Original query: {}

Research material:
{}

Synthesize this material into a JSON object with exactly these keys:
{{
  "summary": "comprehensive, well-structured answer",
  "keyFindings": ["finding", "..."],
  "relatedTopics": ["topic", "..."],
  "confidence": 0.0-1.0
}}

Only respond with valid JSON."#,
            query,
            digest(documents, 25)
        );

        match self.llm.generate(&prompt).await {
            Ok(response) => structured::parse_object(&response).unwrap_or_else(|| {
                tracing::warn!("Deep research synthesis was not valid JSON");
                SynthesisPayload::default()
            }),
            Err(e) => {
                tracing::warn!(error = %e, "Deep research synthesis failed");
                SynthesisPayload::default()
            }
        }
    }
}

#[async_trait]
impl DeepResearch for ResearchCoordinator {
    async fn deep_research(
        &self,
        query: &str,
        options: &DeepResearchOptions,
    ) -> Result<DeepResearchReport> {
        let count = self.question_count(options.depth);
        let iterations = self.iterations(options.depth);

        let mut questions = self
            .generate_research_questions(query, &options.focus_areas, count)
            .await;
        let mut documents: Vec<RetrievedDocument> = Vec::new();

        for iteration in 0..iterations {
            tracing::info!("Deep research iteration {}/{}", iteration + 1, iterations);

            let found = match self.parallel_research(&questions, options.depth).await {
                Ok(found) => found,
                // Only the first round is load-bearing.
                Err(e) if iteration > 0 => {
                    tracing::warn!(
                        error = %e,
                        "Follow-up searches failed, keeping first-round material"
                    );
                    break;
                }
                Err(e) => return Err(e),
            };

            for doc in found {
                let duplicate =
                    !doc.url.is_empty() && documents.iter().any(|d| d.url == doc.url);
                if !duplicate {
                    documents.push(doc);
                }
            }

            if iteration + 1 < iterations {
                questions = self.generate_followup_questions(query, &documents).await;
                if questions.is_empty() {
                    break;
                }
            }
        }

        documents.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));

        let payload = self.synthesize_findings(query, &documents).await;
        let fallback_confidence = mean(documents.iter().map(|d| d.relevance)).unwrap_or(0.0);

        let summary = if payload.summary.trim().is_empty() {
            fallback_summary(query, &documents)
        } else {
            payload.summary
        };

        Ok(DeepResearchReport {
            summary,
            key_findings: payload.key_findings,
            related_topics: payload.related_topics,
            confidence: clamp_unit(payload.confidence.unwrap_or(fallback_confidence)),
            sources: documents,
        })
    }
}

/// Strip list numbering/bullets and keep at most `limit` non-empty lines.
fn parse_numbered_lines(response: &str, limit: usize) -> Vec<String> {
    response
        .lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(|c: char| {
                    c.is_numeric() || c == '.' || c == ')' || c == '-' || c == '*'
                })
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .take(limit)
        .collect()
}

fn digest(documents: &[RetrievedDocument], limit: usize) -> String {
    documents
        .iter()
        .take(limit)
        .map(|d| format!("- {}: {}", d.title, d.snippet))
        .collect::<Vec<_>>()
        .join("\n")
}

fn fallback_summary(query: &str, documents: &[RetrievedDocument]) -> String {
    if documents.is_empty() {
        return format!("No material was found for \"{}\".", query);
    }
    let titles = documents
        .iter()
        .take(3)
        .map(|d| d.title.as_str())
        .collect::<Vec<_>>()
        .join("; ");
    format!(
        "Research on \"{}\" gathered {} sources, led by: {}.",
        query,
        documents.len(),
        titles
    )
}
