//! Batch annotation of scraped listings.
//!
//! Reads listings as JSON lines, annotates each one and writes the
//! annotated records as JSON lines, optionally posting them to Slack.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use manzanita::config::{Config, SlackConfig};
use manzanita::lookup::GoogleMapsClient;
use manzanita::slack::SlackWebhook;
use manzanita::{AnnotatedListing, Enricher, Listing, RegionCatalog};

#[derive(Parser, Debug)]
#[command(name = "annotate")]
#[command(about = "Annotate scraped listings with neighborhood and transit context")]
struct Args {
    /// Path to the TOML configuration
    #[arg(short, long, default_value = "manzanita.toml")]
    config: PathBuf,

    /// Listings as JSON lines ("-" for stdin)
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Write annotated listings here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Slack incoming webhook URL (overrides the config file)
    #[arg(long)]
    slack_webhook: Option<String>,

    /// Do not post to Slack even if a webhook is configured
    #[arg(long)]
    no_post: bool,
}

#[derive(Debug, Default)]
struct Summary {
    annotated: usize,
    malformed: usize,
    skipped: usize,
    posted: usize,
    post_failures: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr, stdout carries the annotated listings
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Manzanita Batch Annotator");

    let config = Config::load_from_file(&args.config)?;
    let catalog = Arc::new(RegionCatalog::from_config(&config).context("Invalid region catalog")?);
    let destination = catalog.destination();

    let google = Arc::new(
        GoogleMapsClient::new(&config.google).context("Failed to create Google Maps client")?,
    );
    let enricher = Enricher::new(catalog, google.clone(), google);

    let slack = if args.no_post {
        None
    } else {
        let slack_config = match (&args.slack_webhook, &config.slack) {
            (Some(url), Some(configured)) => Some(SlackConfig {
                webhook_url: url.clone(),
                ..configured.clone()
            }),
            (Some(url), None) => Some(SlackConfig::with_webhook(url.clone())),
            (None, configured) => configured.clone(),
        };
        slack_config.map(|c| SlackWebhook::new(c, config.google.maps_key.clone(), destination))
    };

    let input = read_input(&args.input)?;
    let lines: Vec<&str> = input.lines().filter(|l| !l.trim().is_empty()).collect();
    info!("Read {} listings from {}", lines.len(), args.input);

    let (mut out, pb): (Box<dyn Write>, Option<ProgressBar>) = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let pb = ProgressBar::new(lines.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")?
                    .progress_chars("#>-"),
            );
            (Box::new(BufWriter::new(file)), Some(pb))
        }
        None => (Box::new(BufWriter::new(io::stdout())), None),
    };

    let mut summary = Summary::default();

    for (line_no, line) in lines.iter().enumerate() {
        if let Some(pb) = &pb {
            pb.inc(1);
        }

        let listing: Listing = match serde_json::from_str(line) {
            Ok(l) => l,
            Err(e) => {
                warn!("Skipping malformed listing on line {}: {}", line_no + 1, e);
                summary.malformed += 1;
                continue;
            }
        };

        let annotation = match enricher.annotate(&listing).await {
            Ok(a) => a,
            Err(e) => {
                warn!("Skipping listing '{}': {}", listing.name, e);
                summary.skipped += 1;
                continue;
            }
        };
        debug!("Annotated '{}': {:?}", listing.name, annotation);

        if let Some(hook) = &slack {
            match hook.post_listing(&listing, &annotation).await {
                Ok(()) => summary.posted += 1,
                Err(e) => {
                    warn!("Could not post '{}' to Slack: {}", listing.name, e);
                    summary.post_failures += 1;
                }
            }
        }

        let record = AnnotatedListing {
            listing,
            annotation,
        };
        serde_json::to_writer(&mut out, &record)?;
        out.write_all(b"\n")?;
        summary.annotated += 1;
    }

    out.flush()?;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    info!(
        "Done: {} annotated, {} malformed, {} skipped, {} posted, {} post failures",
        summary.annotated,
        summary.malformed,
        summary.skipped,
        summary.posted,
        summary.post_failures
    );

    Ok(())
}

fn read_input(input: &str) -> Result<String> {
    let mut content = String::new();
    if input == "-" {
        io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read listings from stdin")?;
    } else {
        File::open(input)
            .and_then(|mut f| f.read_to_string(&mut content))
            .with_context(|| format!("Failed to read listings from {}", input))?;
    }
    Ok(content)
}
