//! costgpt - Measure and attribute the cost of LLM API calls

use clap::Parser;
use costgpt::{
    CostCalculator, CostTracker, PriceCatalog, Result, TokenCounts, TrackOptions, TrackerConfig,
    cli::{Cli, Command},
    output::{CostQuote, get_formatter},
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // --quiet and --verbose override RUST_LOG
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("warn")
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::new("costgpt=debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("costgpt=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let formatter = get_formatter(cli.json);

    match cli.command {
        Command::Cost { model, tokens } => {
            let catalog = PriceCatalog::builtin();
            let tokens = TokenCounts::new(tokens.input, tokens.output);
            let resolved = catalog.resolve(&model);

            let quote = CostQuote {
                model: &model,
                resolved,
                tokens,
                cost: CostCalculator::compute_cost(resolved, &tokens),
            };
            println!("{}", formatter.format_cost(&quote));
        }
        Command::Models => {
            println!("{}", formatter.format_models(PriceCatalog::builtin()));
        }
        Command::Track {
            model,
            tokens,
            user_id,
            feature,
            duration_ms,
            metadata,
            api_key,
            api_url,
        } => {
            let mut config = TrackerConfig::from_env()?;
            if let Some(api_key) = api_key {
                config = config.with_api_key(api_key);
            }
            if let Some(api_url) = api_url {
                config = config.with_api_url(api_url);
            }

            let tracker = CostTracker::from_config(&config)?;
            if tracker.is_remote() {
                info!("Sending event to {}", config.base_url());
            } else {
                info!("No API key configured, recording locally only");
            }

            let mut options = TrackOptions::new().metadata(metadata.into_iter().collect());
            options.user_id = user_id;
            options.feature = feature;
            options.duration_ms = duration_ms;

            let event = tracker
                .track(&model, tokens.input, tokens.output, options)
                .await;
            println!("{}", formatter.format_event(&event));
        }
    }

    Ok(())
}
