use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::Mutex;

use livechart::config::MARKET;
use livechart::{
    ChartOrchestrator, ChartRange, ChartSelection, Cli, HttpMarketApi, MarketDataSource, Poller,
    RecordingSurface,
};

#[tokio::main]
async fn main() -> Result<()> {
    // A. Init Logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    // B. Parse Args
    let args = Cli::parse();
    #[cfg(debug_assertions)]
    log::info!("Parsed arguments: {:?}", args);

    let range = ChartRange::from_str(&args.range)
        .with_context(|| format!("Unknown range '{}'", args.range))?;

    // C. Wire the engine against a recording surface (no GUI in the demo;
    // the surface just logs what a real chart library would be told to do).
    let source: Arc<dyn MarketDataSource> = Arc::new(match &args.base_url {
        Some(base) => HttpMarketApi::new(base.clone()),
        None => HttpMarketApi::default(),
    });
    log::info!("Data source: {}", source.signature());

    let selection = ChartSelection {
        range,
        ..ChartSelection::default()
    };
    let mut orchestrator =
        ChartOrchestrator::new(RecordingSurface::new(), source, args.id.clone(), selection);

    // D. Initial load
    orchestrator.initial_load().await?;
    if orchestrator.has_no_data() {
        log::warn!("No data available for '{}'", args.id);
        return Ok(());
    }
    log::info!(
        "Loaded {} candles (scale factor {})",
        orchestrator.candles().len(),
        orchestrator.scale_factor()
    );
    if let Some(summary) = orchestrator.ath() {
        log::info!(
            "ATH {} ({:+.2}% from last close)",
            summary.ath,
            summary.percent_from_ath
        );
    }

    // E. Background refresh loop, cancelled after the requested tick count
    let orchestrator = Arc::new(Mutex::new(orchestrator));
    let (poller, handle) = Poller::new(MARKET.poll.interval_ms, MARKET.poll.max_failed_attempts);

    let tick_orchestrator = orchestrator.clone();
    let tick_handle = handle.clone();
    let max_refreshes = args.refreshes;
    let mut ticks = 0u32;
    poller
        .run(move || {
            let orchestrator = tick_orchestrator.clone();
            ticks += 1;
            if ticks >= max_refreshes {
                tick_handle.cancel();
            }
            async move { orchestrator.lock().await.refresh().await }
        })
        .await;

    // F. Teardown and summary
    let mut orchestrator = orchestrator.lock().await;
    orchestrator.shutdown();
    log::info!(
        "Done after {} refreshes; {} render commands issued",
        args.refreshes,
        orchestrator.surface().commands().len()
    );
    Ok(())
}
