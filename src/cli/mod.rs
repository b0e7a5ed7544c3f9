//! CLI module for the synthesis engine
//!
//! Provides command-line interface parsing for the synthesis-engine binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod output;

use crate::types::{
    ResearchDepth, ResearchParameters, ResearchRequest, ResearchType, Timeframe,
};
use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use std::path::PathBuf;

/// Research Synthesis Engine
///
/// Researches a topic across web, deep, market and proprietary sources and
/// synthesizes one confidence-scored result.
#[derive(Parser, Debug)]
#[command(
    name = "synthesis-engine",
    version,
    about = "Research Synthesis Engine",
    long_about = "Researches a topic across open-web search, deep research, market data and a\n\
                  proprietary corpus, and synthesizes one confidence-scored result.\n\n\
                  Run without arguments to start the server.",
    after_help = "EXAMPLES:\n    \
                  synthesis-engine                                   # Start the server\n    \
                  synthesis-engine research \"Tesla stock analysis\"   # One web-search request\n    \
                  synthesis-engine research bitcoin --type comprehensive --json\n    \
                  synthesis-engine config --validate                 # Check synthesis.toml"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "synthesis.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server (the default)
    Serve,

    /// Run one research request and print the result
    Research(ResearchArgs),

    /// Show configuration information
    Config {
        /// Show the full configuration as TOML
        #[arg(short = 'f', long)]
        full: bool,

        /// Validate the configuration file
        #[arg(long)]
        validate: bool,
    },
}

#[derive(Args, Debug)]
pub struct ResearchArgs {
    /// Topic to research
    pub topic: String,

    /// web-search, deep-research, market-analysis, proprietary-analysis or comprehensive
    #[arg(short = 't', long = "type", default_value = "web-search")]
    pub research_type: ResearchType,

    /// basic, standard or comprehensive
    #[arg(short, long, value_parser = parse_enum::<ResearchDepth>)]
    pub depth: Option<ResearchDepth>,

    /// past-day, past-week, past-month, past-year or all-time
    #[arg(long, value_parser = parse_enum::<Timeframe>)]
    pub timeframe: Option<Timeframe>,

    /// Maximum number of retrieved documents
    #[arg(short = 'n', long)]
    pub max_results: Option<usize>,

    /// Focus area, repeatable
    #[arg(long = "focus")]
    pub focus_areas: Vec<String>,

    /// Skip quantitative market data
    #[arg(long)]
    pub no_market_data: bool,

    /// Skip the proprietary corpus
    #[arg(long)]
    pub no_proprietary_data: bool,

    /// Print the raw JSON result
    #[arg(long)]
    pub json: bool,
}

impl ResearchArgs {
    pub fn to_request(&self) -> ResearchRequest {
        ResearchRequest::new(self.topic.clone(), self.research_type).with_parameters(
            ResearchParameters {
                timeframe: self.timeframe,
                depth: self.depth,
                max_results: self.max_results,
                focus_areas: self.focus_areas.clone(),
                include_market_data: self.no_market_data.then_some(false),
                include_proprietary_data: self.no_proprietary_data.then_some(false),
            },
        )
    }
}

/// Parse a kebab/lowercase enum through its serde representation.
fn parse_enum<T: DeserializeOwned>(value: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .map_err(|_| format!("unrecognized value '{}'", value))
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_command_means_serve() {
        let cli = Cli::try_parse_from(["synthesis-engine"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("synthesis.toml"));
    }

    #[test]
    fn test_research_args_to_request() {
        let cli = Cli::try_parse_from([
            "synthesis-engine",
            "research",
            "Tesla stock analysis",
            "--type",
            "comprehensive",
            "--depth",
            "basic",
            "--timeframe",
            "past-year",
            "-n",
            "5",
            "--focus",
            "margins",
            "--focus",
            "deliveries",
            "--no-market-data",
        ])
        .unwrap();

        let Some(Commands::Research(args)) = cli.command else {
            panic!("expected research command");
        };
        let request = args.to_request();
        assert_eq!(request.topic, "Tesla stock analysis");
        assert_eq!(request.research_type, ResearchType::Comprehensive);
        assert_eq!(request.parameters.depth, Some(ResearchDepth::Basic));
        assert_eq!(request.parameters.timeframe, Some(Timeframe::PastYear));
        assert_eq!(request.parameters.max_results, Some(5));
        assert_eq!(request.parameters.focus_areas, vec!["margins", "deliveries"]);
        assert!(!request.parameters.include_market_data());
        assert!(request.parameters.include_proprietary_data());
    }

    #[test]
    fn test_unsupported_type_rejected_by_parser() {
        let err =
            Cli::try_parse_from(["synthesis-engine", "research", "x", "--type", "unsupported"]);
        assert!(err.is_err());
    }

    #[test]
    fn test_bad_depth_rejected() {
        let err = Cli::try_parse_from(["synthesis-engine", "research", "x", "--depth", "deep"]);
        assert!(err.is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from([
            "synthesis-engine",
            "config",
            "--validate",
            "--config",
            "other.toml",
            "--no-color",
        ])
        .unwrap();
        assert!(cli.no_color);
        assert_eq!(cli.config, PathBuf::from("other.toml"));
        assert!(matches!(cli.command, Some(Commands::Config { validate: true, .. })));
    }
}
