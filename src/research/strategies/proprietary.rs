use crate::research::strategies::{
    NarrativeBrief, StrategyContext, StrategyExecutor, briefing, fallback_summary,
};
use crate::types::{
    AppError, ProprietaryInsights, ResearchRequest, ResearchResult, ResearchSource, Result,
    clamp_unit, mean,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

const ANGLE: &str = "proprietary";

/// Internal documents surfaced as insight lines.
const TOP_DOCUMENTS: usize = 3;

/// Analysis over the internal proprietary-document corpus.
pub struct ProprietaryAnalysisStrategy {
    ctx: Arc<StrategyContext>,
}

impl ProprietaryAnalysisStrategy {
    pub fn new(ctx: Arc<StrategyContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl StrategyExecutor for ProprietaryAnalysisStrategy {
    fn name(&self) -> &'static str {
        "proprietary-analysis"
    }

    async fn execute(&self, request: &ResearchRequest) -> Result<ResearchResult> {
        let started = Instant::now();
        let topic = request.topic.as_str();

        let corpus = self.ctx.collaborators.proprietary.as_ref().ok_or_else(|| {
            AppError::Configuration("No proprietary corpus is configured".to_string())
        })?;

        let matches = corpus.search(topic, self.ctx.max_results(request)).await?;
        let mut documents = matches.documents;
        documents.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));

        tracing::info!(
            topic,
            documents = documents.len(),
            corpus_confidence = ?matches.confidence,
            "Proprietary corpus matched"
        );

        let analysis = self.ctx.analyse(&documents, topic).await;
        let key_findings = analysis.key_findings();

        let mut narrative = if documents.is_empty() {
            Default::default()
        } else {
            self.ctx
                .narrate(NarrativeBrief {
                    topic,
                    angle: "internal proprietary",
                    material: briefing(&key_findings, &documents),
                    with_insights: true,
                })
                .await
        };

        let summary =
            narrative.summary_or(|| fallback_summary(ANGLE, topic, documents.len(), &key_findings));

        let mut insights: Vec<String> = documents
            .iter()
            .take(TOP_DOCUMENTS)
            .map(|d| format!("Internal document \"{}\" (relevance {:.2})", d.title, d.relevance))
            .collect();
        insights.extend(
            analysis
                .info
                .topics
                .iter()
                .map(|t| format!("Recurring internal theme: {}", t.label)),
        );
        insights.extend(std::mem::take(&mut narrative.insights));

        let corpus_confidence = matches.confidence.map(clamp_unit);
        let proprietary_insights = ProprietaryInsights {
            matched_documents: documents.len(),
            average_relevance: mean(documents.iter().map(|d| clamp_unit(d.relevance)))
                .unwrap_or(0.0),
            corpus_confidence,
            insights,
        };

        let confidence = corpus_confidence
            .unwrap_or_else(|| analysis.blended_confidence(self.ctx.confidence.proprietary));

        let recommendations = self.ctx.recommendations(
            topic,
            &analysis.info,
            std::mem::take(&mut narrative.recommendations),
        );

        Ok(ResearchResult {
            summary,
            confidence,
            related_topics: analysis.related_topics(),
            key_findings,
            trends: analysis.trends,
            patterns: analysis.patterns,
            sources: documents.iter().map(ResearchSource::from).collect(),
            market_insights: None,
            proprietary_insights: Some(proprietary_insights),
            recommendations,
            execution_time_ms: started.elapsed().as_millis() as u64,
        })
    }
}
