use crate::research::strategies::{
    NarrativeBrief, StrategyContext, StrategyExecutor, briefing, fallback_summary,
};
use crate::retrieval::market::detect_symbol;
use crate::retrieval::{PricePoint, SearchOptions};
use crate::types::{
    MarketInsights, ResearchRequest, ResearchResult, ResearchSource, Result, Timeframe, mean,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

const ANGLE: &str = "market";

/// Summary statistics over a price history.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteStats {
    pub latest_close: f64,
    /// Percentage change from the first to the last close
    pub change_percent: Option<f64>,
    /// Population standard deviation of daily returns
    pub volatility: Option<f64>,
    pub average_volume: Option<f64>,
}

impl QuoteStats {
    /// `None` for an empty history. Points must be in time order.
    pub fn from_points(points: &[PricePoint]) -> Option<Self> {
        let first = points.first()?;
        let last = points.last()?;

        let change_percent = (points.len() > 1 && first.close > 0.0)
            .then(|| (last.close - first.close) / first.close * 100.0);

        let returns: Vec<f64> = points
            .windows(2)
            .filter(|w| w[0].close > 0.0)
            .map(|w| w[1].close / w[0].close - 1.0)
            .collect();
        let volatility = if returns.len() >= 2 {
            mean(returns.iter().copied()).and_then(|avg| {
                mean(returns.iter().map(|r| (r - avg).powi(2))).map(f64::sqrt)
            })
        } else {
            None
        };

        let average_volume = mean(points.iter().map(|p| p.volume).filter(|v| *v > 0.0));

        Some(Self {
            latest_close: last.close,
            change_percent,
            volatility,
            average_volume,
        })
    }

    /// Human-readable insight lines, quantitative figures only.
    pub fn insight_lines(&self, symbol: &str, timeframe: Timeframe) -> Vec<String> {
        let window = timeframe.as_str().replace('-', " ");
        let mut lines = vec![format!("{} last closed at {:.2}", symbol, self.latest_close)];
        if let Some(change) = self.change_percent {
            let verb = if change >= 0.0 { "gained" } else { "lost" };
            lines.push(format!(
                "{} {} {:.2}% over the {}",
                symbol,
                verb,
                change.abs(),
                window
            ));
        }
        if let Some(volatility) = self.volatility {
            lines.push(format!(
                "Daily volatility of {:.2}% (standard deviation of daily returns)",
                volatility * 100.0
            ));
        }
        if let Some(volume) = self.average_volume {
            lines.push(format!("Average daily volume of {:.0}", volume));
        }
        lines
    }
}

/// Market-oriented web research enriched with optional quantitative market data.
pub struct MarketAnalysisStrategy {
    ctx: Arc<StrategyContext>,
}

impl MarketAnalysisStrategy {
    pub fn new(ctx: Arc<StrategyContext>) -> Self {
        Self { ctx }
    }

    /// Price history for the topic's symbol, if there is one and a feed is
    /// configured. Feed failures degrade to no data.
    async fn fetch_quotes(&self, request: &ResearchRequest) -> Option<(String, Vec<PricePoint>)> {
        if !request.parameters.include_market_data() {
            return None;
        }
        let market = self.ctx.collaborators.market.as_ref()?;
        let symbol = detect_symbol(&request.topic)?;

        match market
            .price_history(&symbol, request.parameters.timeframe())
            .await
        {
            Ok(points) => {
                tracing::debug!(symbol = %symbol, points = points.len(), "Market data retrieved");
                Some((symbol, points))
            }
            Err(e) => {
                tracing::warn!(
                    symbol = %symbol,
                    error = %e,
                    "Market data unavailable, continuing without it"
                );
                None
            }
        }
    }
}

#[async_trait]
impl StrategyExecutor for MarketAnalysisStrategy {
    fn name(&self) -> &'static str {
        "market-analysis"
    }

    async fn execute(&self, request: &ResearchRequest) -> Result<ResearchResult> {
        let started = Instant::now();
        let topic = request.topic.as_str();
        let timeframe = request.parameters.timeframe();
        let max_results = self.ctx.max_results(request);

        let query = format!("{} market analysis", topic);
        let options = SearchOptions {
            depth: self.ctx.depth(request).into(),
            timeframe,
            max_results,
        };
        let (search, quotes) = tokio::join!(
            self.ctx.collaborators.web.search(&query, &options),
            self.fetch_quotes(request),
        );
        let mut documents = search?.results;
        documents.truncate(max_results);

        let analysis = self.ctx.analyse(&documents, topic).await;
        let key_findings = analysis.key_findings();

        let (symbol, stats, data_points) = match &quotes {
            Some((symbol, points)) => (
                Some(symbol.clone()),
                QuoteStats::from_points(points),
                points.len(),
            ),
            None => (None, None, 0),
        };
        let quantitative = match (&symbol, &stats) {
            (Some(symbol), Some(stats)) => stats.insight_lines(symbol, timeframe),
            _ => vec![],
        };

        tracing::info!(
            topic,
            documents = documents.len(),
            symbol = symbol.as_deref().unwrap_or("-"),
            data_points,
            "Market material gathered"
        );

        let mut narrative = if documents.is_empty() && quantitative.is_empty() {
            Default::default()
        } else {
            let mut material = String::new();
            if !quantitative.is_empty() {
                material.push_str("Market data:\n");
                for line in &quantitative {
                    material.push_str("- ");
                    material.push_str(line);
                    material.push('\n');
                }
                material.push('\n');
            }
            material.push_str(&briefing(&key_findings, &documents));
            self.ctx
                .narrate(NarrativeBrief {
                    topic,
                    angle: "market-oriented",
                    material,
                    with_insights: true,
                })
                .await
        };

        let summary = narrative.summary_or(|| {
            fallback_summary(ANGLE, topic, documents.len() + data_points.min(1), &key_findings)
        });

        let mut insights = quantitative;
        insights.extend(std::mem::take(&mut narrative.insights));

        let market_insights = MarketInsights {
            symbol,
            latest_price: stats.as_ref().map(|s| s.latest_close),
            price_change_percent: stats.as_ref().and_then(|s| s.change_percent),
            volatility: stats.as_ref().and_then(|s| s.volatility),
            average_volume: stats.as_ref().and_then(|s| s.average_volume),
            data_points,
            insights,
        };

        let recommendations = self.ctx.recommendations(
            topic,
            &analysis.info,
            std::mem::take(&mut narrative.recommendations),
        );

        Ok(ResearchResult {
            summary,
            confidence: analysis.blended_confidence(self.ctx.confidence.market),
            related_topics: analysis.related_topics(),
            key_findings,
            trends: analysis.trends,
            patterns: analysis.patterns,
            sources: documents.iter().map(ResearchSource::from).collect(),
            market_insights: Some(market_insights),
            proprietary_insights: None,
            recommendations,
            execution_time_ms: started.elapsed().as_millis() as u64,
        })
    }
}
