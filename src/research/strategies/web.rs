use crate::research::strategies::{
    NarrativeBrief, StrategyContext, StrategyExecutor, briefing, fallback_summary,
};
use crate::retrieval::SearchOptions;
use crate::types::{ResearchRequest, ResearchResult, ResearchSource, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

const ANGLE: &str = "open-web search";

/// Open-web search followed by local extraction, trend and pattern analysis.
pub struct WebSearchStrategy {
    ctx: Arc<StrategyContext>,
}

impl WebSearchStrategy {
    pub fn new(ctx: Arc<StrategyContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl StrategyExecutor for WebSearchStrategy {
    fn name(&self) -> &'static str {
        "web-search"
    }

    async fn execute(&self, request: &ResearchRequest) -> Result<ResearchResult> {
        let started = Instant::now();
        let topic = request.topic.as_str();
        let max_results = self.ctx.max_results(request);

        let options = SearchOptions {
            depth: self.ctx.depth(request).into(),
            timeframe: request.parameters.timeframe(),
            max_results,
        };
        let response = self.ctx.collaborators.web.search(topic, &options).await?;
        let mut documents = response.results;
        documents.truncate(max_results);

        tracing::info!(
            topic,
            documents = documents.len(),
            total = response.total_results,
            "Web search retrieved material"
        );

        let analysis = self.ctx.analyse(&documents, topic).await;
        let key_findings = analysis.key_findings();

        let mut narrative = if documents.is_empty() {
            Default::default()
        } else {
            self.ctx
                .narrate(NarrativeBrief {
                    topic,
                    angle: ANGLE,
                    material: briefing(&key_findings, &documents),
                    with_insights: false,
                })
                .await
        };

        let summary =
            narrative.summary_or(|| fallback_summary(ANGLE, topic, documents.len(), &key_findings));
        let recommendations = self.ctx.recommendations(
            topic,
            &analysis.info,
            std::mem::take(&mut narrative.recommendations),
        );

        Ok(ResearchResult {
            summary,
            confidence: analysis.blended_confidence(self.ctx.confidence.web),
            related_topics: analysis.related_topics(),
            key_findings,
            trends: analysis.trends,
            patterns: analysis.patterns,
            sources: documents.iter().map(ResearchSource::from).collect(),
            market_insights: None,
            proprietary_insights: None,
            recommendations,
            execution_time_ms: started.elapsed().as_millis() as u64,
        })
    }
}
