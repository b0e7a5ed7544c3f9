use crate::llm::LLMClient;
use crate::research::merge::{combine_summaries, merge_results};
use crate::research::strategies::{
    DeepResearchStrategy, MarketAnalysisStrategy, ProprietaryAnalysisStrategy, StrategyContext,
    StrategyExecutor, WebSearchStrategy,
};
use crate::retrieval::Collaborators;
use crate::types::{ResearchRequest, ResearchResult, ResearchType, Result};
use crate::utils::toml_config::{ConfidenceConfig, EngineConfig, ResearchConfig};
use std::sync::Arc;
use std::time::Instant;

/// Entry point of the engine: one [`ResearchRequest`] in, one
/// [`ResearchResult`] (or a typed error) out.
///
/// Holds no per-request state, so one instance serves concurrent requests.
pub struct SynthesisOrchestrator {
    ctx: Arc<StrategyContext>,
    web: WebSearchStrategy,
    deep: DeepResearchStrategy,
    market: MarketAnalysisStrategy,
    proprietary: ProprietaryAnalysisStrategy,
}

impl SynthesisOrchestrator {
    pub fn new(
        llm: Arc<dyn LLMClient>,
        collaborators: Collaborators,
        research: ResearchConfig,
        confidence: ConfidenceConfig,
    ) -> Self {
        let ctx = Arc::new(StrategyContext::new(llm, collaborators, research, confidence));
        Self {
            web: WebSearchStrategy::new(Arc::clone(&ctx)),
            deep: DeepResearchStrategy::new(Arc::clone(&ctx)),
            market: MarketAnalysisStrategy::new(Arc::clone(&ctx)),
            proprietary: ProprietaryAnalysisStrategy::new(Arc::clone(&ctx)),
            ctx,
        }
    }

    /// Wire the orchestrator to the collaborators `config` describes.
    pub fn from_config(config: &EngineConfig, llm: Arc<dyn LLMClient>) -> Result<Self> {
        let collaborators = config.collaborators(Arc::clone(&llm))?;
        Ok(Self::new(
            llm,
            collaborators,
            config.research.clone(),
            config.confidence,
        ))
    }

    /// Run one research request.
    ///
    /// Invalid requests fail before any collaborator is called. Primary
    /// retrieval failures fail the request; enrichment failures never do.
    pub async fn synthesize(&self, request: &ResearchRequest) -> Result<ResearchResult> {
        request.validate()?;

        tracing::info!(
            topic = %request.topic,
            research_type = %request.research_type,
            "Research request received"
        );

        let outcome = match request.research_type {
            ResearchType::WebSearch => self.web.execute(request).await,
            ResearchType::DeepResearch => self.deep.execute(request).await,
            ResearchType::MarketAnalysis => self.market.execute(request).await,
            ResearchType::ProprietaryAnalysis => self.proprietary.execute(request).await,
            ResearchType::Comprehensive => self.comprehensive(request).await,
        };

        match &outcome {
            Ok(result) => tracing::info!(
                topic = %request.topic,
                research_type = %request.research_type,
                confidence = result.confidence,
                findings = result.key_findings.len(),
                sources = result.sources.len(),
                elapsed_ms = result.execution_time_ms,
                "Research completed"
            ),
            Err(e) => tracing::error!(
                topic = %request.topic,
                research_type = %request.research_type,
                error = %e,
                "Research failed"
            ),
        }

        outcome
    }

    /// Run a request given as untyped JSON (the message-envelope payload).
    pub async fn synthesize_json(&self, value: serde_json::Value) -> Result<ResearchResult> {
        let request = ResearchRequest::from_value(value)?;
        self.synthesize(&request).await
    }

    /// Web search always runs; market and proprietary analysis run when the
    /// request includes them. All three run to completion concurrently before
    /// any failure is surfaced.
    async fn comprehensive(&self, request: &ResearchRequest) -> Result<ResearchResult> {
        let started = Instant::now();
        let params = &request.parameters;

        let run_market = params.include_market_data();
        let run_proprietary =
            params.include_proprietary_data() && self.ctx.collaborators.proprietary.is_some();
        if params.include_proprietary_data() && !run_proprietary {
            tracing::warn!(
                topic = %request.topic,
                "No proprietary corpus configured, comprehensive research continues without it"
            );
        }

        let (web, market, proprietary) = tokio::join!(
            self.web.execute(request),
            async {
                if run_market {
                    Some(self.market.execute(request).await)
                } else {
                    None
                }
            },
            async {
                if run_proprietary {
                    Some(self.proprietary.execute(request).await)
                } else {
                    None
                }
            },
        );

        let mut parts = vec![web?];
        if let Some(market) = market {
            parts.push(market?);
        }
        if let Some(proprietary) = proprietary {
            parts.push(proprietary?);
        }

        tracing::debug!(strategies = parts.len(), "Merging strategy results");

        let summary = combine_summaries(&self.ctx.llm, &request.topic, &parts).await;
        let mut merged = merge_results(parts);
        merged.summary = summary;
        merged.execution_time_ms = started.elapsed().as_millis() as u64;
        Ok(merged)
    }
}
