//! Hazard Feed CLI
//!
//! Ranks hazard alerts for a location and prints the aid and report queues.
//!
//! Usage:
//!   rank-alerts alerts --lat 19.076 --lon 72.8777 --radius-km 50 --store data/store.json
//!   rank-alerts alerts --store data/store.json            # severity-only, no location
//!   rank-alerts aid --store data/store.json --all
//!   rank-alerts classify --text "Oil spill near the beach"

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use hazard_scoring::aid::{prioritized_view, AidQueueSummary, AidView};
use hazard_scoring::ranking::to_geojson;
use hazard_scoring::reports::prioritize_open;
use hazard_scoring::trends::HazardDistribution;
use hazard_scoring::{DedupConfig, HeuristicConfig, RankingConfig};
use serde::Serialize;
use signal_sources::{
    AggregatorConfig, Aggregator, AlertStore, Feed, FeedQuery, HazardFeed, InMemoryStore,
    JsonFileStore, MarineAdapter, SeismicAdapter, WeatherAdapter,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::prelude::*;

const DEFAULT_LOG_FILTER: &str = "hazard_feed=info,signal_sources=info,hazard_scoring=info";

#[derive(Parser, Debug)]
#[command(name = "rank-alerts", about = "Prioritized coastal hazard alerts and aid queue")]
struct Cli {
    /// Heuristic tables (keywords, urgency tiers, criticality weights) as JSON
    #[arg(long, global = true, env = "HAZARD_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ranked alert feed (severity-only without --lat/--lon)
    Alerts(AlertsArgs),
    /// Aid request queue, most urgent first
    Aid {
        #[command(flatten)]
        store: StoreArgs,
        /// Include resolved and dismissed requests
        #[arg(long)]
        all: bool,
    },
    /// Open incident reports, most severe first
    Reports {
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Alert counts by hazard category
    Trends {
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Score free text without touching any store
    Classify {
        /// Report text to score for hazard severity
        #[arg(long)]
        text: Option<String>,
        /// Aid request needs
        #[arg(long)]
        needs: Option<String>,
        /// Aid request description
        #[arg(long, default_value = "")]
        description: String,
    },
}

#[derive(Args, Debug)]
struct StoreArgs {
    /// Persisted store export (JSON); empty store when omitted
    #[arg(short, long)]
    store: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct AlertsArgs {
    #[command(flatten)]
    store: StoreArgs,

    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Search radius in km
    #[arg(long, default_value_t = signal_sources::feed::DEFAULT_RADIUS_KM)]
    radius_km: f64,

    /// Per-source timeout in seconds
    #[arg(long, env = "HAZARD_ADAPTER_TIMEOUT_SECS", default_value_t = 4)]
    adapter_timeout_secs: u64,

    /// Overall deadline for live sources in milliseconds
    #[arg(long)]
    deadline_ms: Option<u64>,

    /// Skip live sources and rank persisted alerts only
    #[arg(long)]
    offline: bool,

    /// Collapse alerts from different sources describing the same event
    #[arg(long)]
    dedup: bool,

    /// Output JSON file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write GeoJSON next to --output
    #[arg(long, requires = "output")]
    geojson: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        DEFAULT_LOG_FILTER.replace("=info", "=debug")
    } else {
        DEFAULT_LOG_FILTER.to_string()
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or(default),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn load_heuristics(path: Option<&Path>) -> Result<HeuristicConfig> {
    match path {
        Some(p) => HeuristicConfig::load(p).with_context(|| format!("loading heuristics from {:?}", p)),
        None => Ok(HeuristicConfig::default()),
    }
}

fn open_store(args: &StoreArgs, heuristics: &HeuristicConfig) -> Arc<dyn AlertStore> {
    match &args.store {
        Some(path) => Arc::new(JsonFileStore::new(path, heuristics.classifier())),
        None => Arc::new(InMemoryStore::new()),
    }
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            info!("Writing output to {:?}", path);
            let file = File::create(path).with_context(|| format!("creating {:?}", path))?;
            serde_json::to_writer_pretty(BufWriter::new(file), value)?;
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            serde_json::to_writer_pretty(&mut lock, value)?;
            writeln!(lock)?;
        }
    }
    Ok(())
}

async fn run_alerts(args: AlertsArgs, heuristics: &HeuristicConfig) -> Result<()> {
    let config = AggregatorConfig {
        adapter_timeout: Duration::from_secs(args.adapter_timeout_secs),
        dedup: args.dedup.then(DedupConfig::default),
    };

    let mut aggregator = Aggregator::new(open_store(&args.store, heuristics), config);
    if !args.offline {
        aggregator = aggregator
            .with_adapter(Arc::new(WeatherAdapter::open_meteo()?))
            .with_adapter(Arc::new(SeismicAdapter::usgs()?))
            .with_adapter(Arc::new(MarineAdapter::open_meteo()?));
    }
    info!("Live sources: {:?}", aggregator.adapter_names());

    let feed = HazardFeed::new(aggregator, heuristics.ranking_engine(RankingConfig::default()));
    let query = FeedQuery {
        location: args.lat.zip(args.lon),
        radius_km: args.radius_km,
    };

    let result = match args.deadline_ms {
        Some(ms) => {
            let deadline = tokio::time::Instant::now() + Duration::from_millis(ms);
            feed.build_until(&query, deadline).await
        }
        None => feed.build(&query).await,
    };
    info!("Feed contains {} alerts", result.len());

    write_json(&result, args.output.as_deref())?;

    if args.geojson {
        if let (Feed::Ranked(ranked), Some(output)) = (&result, &args.output) {
            let geojson_path = output.with_extension("geojson");
            info!("Writing GeoJSON to {:?}", geojson_path);
            write_json(&to_geojson(ranked), Some(&geojson_path))?;
        } else {
            info!("GeoJSON needs a location; skipped for severity-only feed");
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct AidOutput {
    summary: AidQueueSummary,
    requests: Vec<hazard_scoring::AidRequest>,
}

#[derive(Serialize)]
struct ClassifyOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    severity_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    urgency_class: Option<hazard_scoring::UrgencyClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    urgency_score: Option<u8>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let heuristics = load_heuristics(cli.config.as_deref())?;

    match cli.command {
        Command::Alerts(args) => run_alerts(args, &heuristics).await?,
        Command::Aid { store, all } => {
            let requests = open_store(&store, &heuristics).list_aid_requests(None)?;
            let summary = AidQueueSummary::from_requests(&requests);
            let view = if all { AidView::All } else { AidView::Active };
            let requests = prioritized_view(requests, view);
            info!("Aid queue ({:?}): {} requests", view, requests.len());
            write_json(&AidOutput { summary, requests }, None)?;
        }
        Command::Reports { store } => {
            let reports = prioritize_open(open_store(&store, &heuristics).list_reports()?);
            write_json(&reports, None)?;
        }
        Command::Trends { store } => {
            let alerts = open_store(&store, &heuristics).list_alerts()?;
            write_json(&HazardDistribution::from_alerts(&alerts), None)?;
        }
        Command::Classify {
            text,
            needs,
            description,
        } => {
            let classifier = heuristics.classifier();
            let urgency = needs.map(|n| classifier.classify_aid_urgency(&n, &description));
            let output = ClassifyOutput {
                severity_score: text.map(|t| classifier.classify_hazard_severity(&t)),
                urgency_class: urgency.map(|u| u.0),
                urgency_score: urgency.map(|u| u.1),
            };
            write_json(&output, None)?;
        }
    }

    Ok(())
}
