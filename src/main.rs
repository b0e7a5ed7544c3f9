//! Research Synthesis Engine - server and CLI entry point

use anyhow::Context;
use synthesis::{
    AppState, ConfigManager, EngineConfig, LLMClient, LLMClientFactory, SynthesisOrchestrator,
    api::routes::create_router,
    cli::{Cli, Commands, ResearchArgs, output::Output},
    utils::toml_config::{ConfigError, LogFormat},
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    match cli.command {
        Some(Commands::Config { full, validate }) => {
            run_config(&cli.config, full, validate, &output)
        }
        Some(Commands::Research(ref args)) => {
            let manager = load_config(&cli.config, &output)?;
            init_logging(&manager.config(), cli.verbose);
            run_research(manager, args, &output).await
        }
        Some(Commands::Serve) | None => {
            let manager = load_config(&cli.config, &output)?;
            init_logging(&manager.config(), cli.verbose);
            output.banner();
            serve(manager).await
        }
    }
}

/// Load the config file, falling back to defaults when it does not exist.
fn load_config(path: &std::path::Path, output: &Output) -> anyhow::Result<ConfigManager> {
    match ConfigManager::new(path) {
        Ok(manager) => Ok(manager),
        Err(ConfigError::FileNotFound(_)) => {
            output.warning(&format!(
                "{} not found, using built-in defaults",
                path.display()
            ));
            Ok(ConfigManager::from_config(EngineConfig::default()))
        }
        Err(e) => Err(e).with_context(|| format!("Failed to load {}", path.display())),
    }
}

/// Logs go to stderr so `research --json` stays machine-readable.
fn init_logging(config: &EngineConfig, verbose: bool) {
    let level = if verbose {
        "debug"
    } else {
        config.server.log_level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    match config.server.log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init(),
    }
}

async fn build_orchestrator(config: &EngineConfig) -> anyhow::Result<SynthesisOrchestrator> {
    let provider = config.provider()?;
    let llm = LLMClientFactory::new(provider)
        .create_shared()
        .await
        .context("Failed to create completion client")?;
    tracing::info!(model = %llm.model_name(), "Completion client ready");

    Ok(SynthesisOrchestrator::from_config(config, llm)?)
}

async fn serve(manager: ConfigManager) -> anyhow::Result<()> {
    let config = manager.config();
    let orchestrator = build_orchestrator(&config).await?;
    let state = AppState::new(manager, orchestrator);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(%addr, "Research synthesis engine listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}

async fn run_research(
    manager: ConfigManager,
    args: &ResearchArgs,
    output: &Output,
) -> anyhow::Result<()> {
    let config = manager.config();
    let orchestrator = build_orchestrator(&config).await?;
    let request = args.to_request();

    if !args.json {
        output.info(&format!(
            "Researching \"{}\" ({})",
            request.topic, request.research_type
        ));
    }

    let result = match orchestrator.synthesize(&request).await {
        Ok(result) => result,
        Err(e) => {
            output.error(&e.to_string());
            return Err(e.into());
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        output.research_report(&request.topic, &result);
    }
    Ok(())
}

fn run_config(
    path: &std::path::Path,
    full: bool,
    validate: bool,
    output: &Output,
) -> anyhow::Result<()> {
    let config = match EngineConfig::load(path) {
        Ok(config) => config,
        Err(e) => {
            output.error(&e.to_string());
            output.hint("Run with a valid --config path or create synthesis.toml");
            return Err(e.into());
        }
    };

    if validate {
        output.success(&format!("{} is valid", path.display()));
    }

    output.header("Configuration");
    output.kv("File", &path.display().to_string());
    output.kv(
        "Server",
        &format!("{}:{}", config.server.host, config.server.port),
    );
    output.kv("Model", config.llm.model());
    output.kv("Max results", &config.research.max_results.to_string());
    output.kv("Default depth", config.research.default_depth.as_str());
    output.kv(
        "Market data",
        config
            .market_data
            .as_ref()
            .map(|m| m.base_url.as_str())
            .unwrap_or("not configured"),
    );
    output.kv(
        "Proprietary corpus",
        config
            .proprietary
            .as_ref()
            .map(|p| p.base_url.as_str())
            .unwrap_or("not configured"),
    );

    if full {
        output.subheader("Full configuration");
        println!("{}", toml::to_string_pretty(&config)?);
    }

    Ok(())
}
