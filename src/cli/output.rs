//! Colored output helpers for the CLI
//!
//! Renders research results and configuration summaries for humans; `--json`
//! bypasses all of this.

use crate::types::{MarketInsights, ProprietaryInsights, ResearchResult, TrendDirection};
use owo_colors::OwoColorize;

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    pub fn banner(&self) {
        let title = "Research Synthesis Engine";
        let version = format!("v{}", env!("CARGO_PKG_VERSION"));
        if self.colored {
            println!("\n  {} {}\n", title.bright_cyan().bold(), version.dimmed());
        } else {
            println!("\n  {} {}\n", title, version);
        }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            eprintln!("  [WARN] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a header for a section
    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Print a subheader
    pub fn subheader(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.cyan().bold());
        } else {
            println!("\n  --- {} ---", title);
        }
    }

    /// Print a key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    /// Print a list item
    pub fn list_item(&self, item: &str) {
        if self.colored {
            println!("    {} {}", "•".blue(), item);
        } else {
            println!("    - {}", item);
        }
    }

    /// Print a hint/tip message
    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {}", message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    /// Print wrapped paragraph text
    pub fn paragraph(&self, text: &str) {
        for line in wrap(text, 76) {
            println!("    {}", line);
        }
    }

    /// Confidence as a ten-cell bar plus percentage
    pub fn confidence(&self, value: f64) {
        let bar = confidence_bar(value);
        let percent = format!("{:.0}%", value * 100.0);
        if self.colored {
            let bar = if value >= 0.7 {
                bar.green().to_string()
            } else if value >= 0.4 {
                bar.yellow().to_string()
            } else {
                bar.red().to_string()
            };
            println!("    {}: {} {}", "confidence".dimmed(), bar, percent.bright_white());
        } else {
            println!("    confidence: {} {}", bar, percent);
        }
    }

    /// Full human-readable research report
    pub fn research_report(&self, topic: &str, result: &ResearchResult) {
        self.header(&format!("Research: {}", topic));
        self.confidence(result.confidence);
        self.kv("sources", &result.sources.len().to_string());
        self.kv("elapsed", &format!("{} ms", result.execution_time_ms));

        self.subheader("Summary");
        self.paragraph(&result.summary);

        if !result.key_findings.is_empty() {
            self.subheader("Key findings");
            for finding in &result.key_findings {
                self.list_item(finding);
            }
        }

        if !result.trends.is_empty() {
            self.subheader("Trends");
            for trend in &result.trends {
                let arrow = match trend.direction {
                    TrendDirection::Upward => "↑",
                    TrendDirection::Downward => "↓",
                    TrendDirection::Stable => "→",
                };
                self.list_item(&format!("{} {}", arrow, trend.description));
            }
        }

        if !result.patterns.is_empty() {
            self.subheader("Patterns");
            for pattern in &result.patterns {
                self.list_item(&format!("{} ({})", pattern.name, pattern.pattern_type));
            }
        }

        if let Some(market) = &result.market_insights {
            self.market_insights(market);
        }
        if let Some(proprietary) = &result.proprietary_insights {
            self.proprietary_insights(proprietary);
        }

        if !result.recommendations.is_empty() {
            self.subheader("Recommendations");
            for recommendation in &result.recommendations {
                self.list_item(recommendation);
            }
        }

        if !result.related_topics.is_empty() {
            self.subheader("Related topics");
            self.paragraph(&result.related_topics.join(", "));
        }

        if !result.sources.is_empty() {
            self.subheader("Sources");
            for source in &result.sources {
                self.list_item(&format!("{} <{}>", source.title, source.url));
            }
        }
        println!();
    }

    fn market_insights(&self, market: &MarketInsights) {
        self.subheader("Market");
        if let Some(symbol) = &market.symbol {
            self.kv("symbol", symbol);
        }
        self.kv("data points", &market.data_points.to_string());
        for insight in &market.insights {
            self.list_item(insight);
        }
    }

    fn proprietary_insights(&self, proprietary: &ProprietaryInsights) {
        self.subheader("Proprietary corpus");
        self.kv("matched", &proprietary.matched_documents.to_string());
        self.kv(
            "average relevance",
            &format!("{:.2}", proprietary.average_relevance),
        );
        for insight in &proprietary.insights {
            self.list_item(insight);
        }
    }
}

/// Ten-cell bar, filled to the nearest tenth.
pub fn confidence_bar(value: f64) -> String {
    let filled = (value.clamp(0.0, 1.0) * 10.0).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}

/// Greedy word wrap.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > width {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }
    lines
}
