use crate::research::strategies::{
    StrategyContext, StrategyExecutor, fallback_summary, findings_from_entities, material_text,
};
use crate::retrieval::DeepResearchOptions;
use crate::types::{
    ResearchRequest, ResearchResult, ResearchSource, Result, clamp_unit, extend_unique,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Delegates retrieval and summarisation to the deep-research collaborator and
/// only enriches its report with entity-derived findings.
pub struct DeepResearchStrategy {
    ctx: Arc<StrategyContext>,
}

impl DeepResearchStrategy {
    pub fn new(ctx: Arc<StrategyContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl StrategyExecutor for DeepResearchStrategy {
    fn name(&self) -> &'static str {
        "deep-research"
    }

    async fn execute(&self, request: &ResearchRequest) -> Result<ResearchResult> {
        let started = Instant::now();
        let topic = request.topic.as_str();

        let options = DeepResearchOptions {
            depth: self.ctx.depth(request),
            focus_areas: request.parameters.focus_areas.clone(),
        };
        let report = self
            .ctx
            .collaborators
            .deep
            .deep_research(topic, &options)
            .await?;

        tracing::info!(
            topic,
            sources = report.sources.len(),
            findings = report.key_findings.len(),
            "Deep research report received"
        );

        let mut material = report.summary.clone();
        for finding in &report.key_findings {
            material.push_str("\n- ");
            material.push_str(finding);
        }
        material.push_str("\n\n");
        material.push_str(&material_text(&report.sources));
        let info = self.ctx.extract(&material).await;

        let mut key_findings = Vec::new();
        extend_unique(
            &mut key_findings,
            report
                .key_findings
                .iter()
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty()),
        );
        extend_unique(&mut key_findings, findings_from_entities(&info.entities));

        let mut related_topics = Vec::new();
        extend_unique(
            &mut related_topics,
            report
                .related_topics
                .iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
        );
        extend_unique(
            &mut related_topics,
            info.topics.iter().map(|t| t.label.trim().to_string()),
        );

        let summary = if report.summary.trim().is_empty() {
            fallback_summary("deep", topic, report.sources.len(), &key_findings)
        } else {
            report.summary.trim().to_string()
        };

        let recommendations = self.ctx.recommendations(topic, &info, vec![]);

        Ok(ResearchResult {
            summary,
            key_findings,
            trends: vec![],
            patterns: vec![],
            sources: report.sources.iter().map(ResearchSource::from).collect(),
            market_insights: None,
            proprietary_insights: None,
            confidence: clamp_unit(report.confidence).max(clamp_unit(self.ctx.confidence.deep)),
            recommendations,
            related_topics,
            execution_time_ms: started.elapsed().as_millis() as u64,
        })
    }
}
