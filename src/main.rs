//! intelpipe - Intelligence Derivation Pipeline
//!
//! A CLI tool that derives signals, alerts, recommendations, and impact
//! scenarios from ingested news events, and runs deep research queries.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad input, config failure, research failure, etc.)

use anyhow::{Context, Result};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use intelpipe::cli::{Args, OutputFormat};
use intelpipe::clients::{
    completion::CompletionConfig, market::MarketConfig, search::SearchConfig, Collaborators,
    HttpMarketDataClient, OpenAiCompletionClient, TavilySearchClient,
};
use intelpipe::config::Config;
use intelpipe::derive::{AlertThresholds, UserContext};
use intelpipe::models::ResearchOutcome;
use intelpipe::report::{self, Briefing, BriefingMetadata};
use intelpipe::research::{CancelSignal, ResearchOptions};
use intelpipe::store::JsonEventStore;
use intelpipe::Pipeline;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("intelpipe v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the pipeline
    match run_pipeline(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Pipeline failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .intelpipe.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".intelpipe.toml");

    if path.exists() {
        eprintln!("⚠️  .intelpipe.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .intelpipe.toml")?;

    println!("✅ Created .intelpipe.toml with default settings.");
    println!("   Edit it to customize model, thresholds, research, and more.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete pipeline workflow. Returns exit code.
async fn run_pipeline(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // Step 1: Load events
    let events_path = args
        .events
        .as_ref()
        .context("No events file provided")?;

    println!("📥 Loading events: {}", events_path.display());
    let store = JsonEventStore::load(events_path)?;
    let event_count = store.len();
    info!("Loaded {} events", event_count);

    // Step 2: Build collaborators
    let collaborators = build_collaborators(&config, store)?;
    let llm_available = collaborators.completion.is_configured() && !args.dry_run;

    if !llm_available && !args.dry_run {
        println!("⚠️  No OPENAI_API_KEY set; skipping LLM agents (derivation only).");
    }

    let thresholds = AlertThresholds {
        impact_threshold: config.thresholds.impact,
        confidence_threshold: config.thresholds.confidence,
        severity_level: config.thresholds.severity_floor,
    };

    let pipeline = Pipeline::new(collaborators, thresholds)
        .with_subtask_timeout(Duration::from_secs(config.research.subtask_timeout_seconds));

    // Step 3: Deterministic derivation chain
    println!("\n🔬 Deriving intelligence...");
    let events = pipeline
        .fetch_events(&Default::default())
        .await
        .context("Failed to read events from the store")?;

    let signals = pipeline.derive_signals(&events);
    let alerts = pipeline.derive_alerts(&signals);

    let user_context = build_user_context(&args);
    let recommendations =
        pipeline.derive_recommendations(&signals, &events, user_context.as_ref());

    println!("   Signals: {}", signals.len());
    println!("   Alerts: {}", alerts.len());
    println!("   Recommendations: {}", recommendations.len());

    // Step 4: LLM agents
    let impacts = if llm_available && !signals.is_empty() {
        println!("\n🤖 Projecting impact scenarios...");
        println!("   Model: {}", config.model.name);
        pipeline
            .project_impacts(&signals, &events, user_context.as_ref())
            .await
    } else {
        Vec::new()
    };

    if llm_available {
        if let Some(ref symbol) = args.symbol {
            println!("\n📈 Checking {} for a price/signal disconnect...", symbol);
            let disconnect = pipeline.detect_market_disconnect(symbol, &signals).await;
            if disconnect.disconnect_detected {
                println!("   ⚠️  Disconnect detected: {}", disconnect.narrative);
            } else {
                println!("   No disconnect detected.");
            }
        }
    }

    // Step 5: Deep research
    let research = if let Some(ref query) = args.research {
        Some(run_research(&pipeline, &args, &config, query).await?)
    } else {
        None
    };

    // Step 6: Build and save the briefing
    println!("\n📝 Generating briefing...");
    let duration = start_time.elapsed().as_secs_f64();

    let briefing = Briefing {
        metadata: BriefingMetadata {
            generated_at: Utc::now(),
            model_used: config.model.name.clone(),
            events_considered: event_count,
            duration_seconds: duration,
        },
        signals,
        alerts,
        recommendations,
        impacts,
        research,
    };

    let output = match args.format {
        OutputFormat::Json => report::generate_json_briefing(&briefing)?,
        OutputFormat::Markdown => report::generate_markdown_briefing(&briefing),
    };

    std::fs::write(&args.output, &output)
        .with_context(|| format!("Failed to write briefing to {}", args.output.display()))?;

    // Print summary
    println!("\n📊 Derivation Summary:");
    println!("   Events considered: {}", event_count);
    println!("   Signals: {}", briefing.signals.len());
    for alert in &briefing.alerts {
        println!(
            "   {} {} - {}",
            alert.severity.emoji(),
            alert.severity,
            alert.trigger_reason
        );
    }
    println!("   Duration: {:.1}s", duration);
    println!(
        "\n✅ Done! Briefing saved to: {}",
        args.output.display()
    );

    Ok(0)
}

/// Run a deep research query with a progress spinner.
async fn run_research(
    pipeline: &Pipeline,
    args: &Args,
    config: &Config,
    query: &str,
) -> Result<ResearchOutcome> {
    println!("\n🔎 Researching: {}", query);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("collecting and analyzing sources...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let opts = ResearchOptions {
        focus_areas: args.focus.clone().unwrap_or_default(),
        time_horizon: args.horizon.map(Into::into),
        max_sources: config.research.max_sources,
    };

    let outcome = pipeline
        .run_deep_research(query, &opts, CancelSignal::never())
        .await;

    spinner.finish_and_clear();

    let outcome = outcome.context("Deep research failed")?;
    println!(
        "   Analysis confidence: {} ({} sources, {:.1}s)",
        outcome.analysis.confidence,
        outcome.sources.len(),
        outcome.elapsed_ms as f64 / 1000.0
    );

    Ok(outcome)
}

/// Load configuration from --config or the default location.
fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref path) = args.config {
        return Config::load(path);
    }

    Ok(Config::load_default()?.unwrap_or_default())
}

/// Build the collaborator bundle from config, environment, and the loaded
/// event store.
fn build_collaborators(config: &Config, store: JsonEventStore) -> Result<Collaborators> {
    let completion = OpenAiCompletionClient::new(CompletionConfig {
        base_url: config.model.api_url.clone(),
        api_key: std::env::var("OPENAI_API_KEY").ok(),
        model: config.model.name.clone(),
        temperature: config.model.temperature,
        timeout_seconds: config.model.timeout_seconds,
    })?;

    let search = TavilySearchClient::new(SearchConfig {
        api_key: std::env::var("TAVILY_API_KEY").ok(),
        ..SearchConfig::default()
    })?;

    let market = HttpMarketDataClient::new(MarketConfig {
        api_key: std::env::var("FMP_API_KEY").ok(),
        ..MarketConfig::default()
    })?;

    Ok(Collaborators {
        store: Arc::new(store),
        completion: Arc::new(completion),
        search: Arc::new(search),
        market: Arc::new(market),
    })
}

/// Assemble the reader profile from CLI flags, if any were given.
fn build_user_context(args: &Args) -> Option<UserContext> {
    if args.sector.is_none() && args.role.is_none() && args.company.is_none() {
        return None;
    }

    Some(UserContext {
        role: args.role.clone(),
        company: args.company.clone(),
        sector: args.sector.clone(),
    })
}
