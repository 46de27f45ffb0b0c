mod assembler;
mod config;
mod error;
mod fetch;
mod parser;
mod record;
mod resolver;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use crate::assembler::Assembler;
use crate::config::Settings;
use crate::error::{ErrorBody, Result};
use crate::fetch::{HttpFetcher, SearchQuery, StaticFetcher};
use crate::record::Extraction;

#[derive(Parser)]
#[command(name = "bcpa_scraper", about = "Broward County property record scraper")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Indent the JSON output
    #[arg(long, global = true)]
    pretty: bool,
    /// Wrap the output as {record, diagnostics}
    #[arg(long, global = true)]
    diagnostics: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the live site by street address and extract the parcel found
    Search {
        #[arg(long)]
        number: String,
        #[arg(long, default_value = "")]
        unit: String,
        /// Pre-direction (N, S, E, W, NE, ...)
        #[arg(long, default_value = "")]
        direction: String,
        #[arg(long)]
        street: String,
        /// ST, AVE, BLVD, ...
        #[arg(long, default_value = "")]
        street_type: String,
        #[arg(long, default_value = "")]
        post_dir: String,
        #[arg(long, default_value = "")]
        city: String,
    },
    /// Extract the parcel behind a record page URL
    Record {
        /// e.g. http://www.bcpa.net/RecInfo.asp?URL_Folio=504210010010
        url: String,
    },
    /// Extract from saved pages instead of the live site
    Parse {
        /// Saved primary record page
        primary: PathBuf,
        /// Saved card pages, in the order the primary page links them
        #[arg(long = "card")]
        cards: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    match run(&cli).await {
        Ok(extraction) => {
            println!("{}", render(&cli, &extraction)?);
            info!("Done in {:.1}s", t0.elapsed().as_secs_f64());
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("{}", e);
            let body = serde_json::to_string(&ErrorBody::from(&e)).context("serializing error body")?;
            println!("{}", body);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run(cli: &Cli) -> Result<Extraction> {
    let settings = Settings::load()?;

    match &cli.command {
        Commands::Search {
            number,
            unit,
            direction,
            street,
            street_type,
            post_dir,
            city,
        } => {
            let query = SearchQuery {
                street_number: number.clone(),
                unit_number: unit.clone(),
                street_direction: direction.clone(),
                street_name: street.clone(),
                street_type: street_type.clone(),
                post_direction: post_dir.clone(),
                city: city.clone(),
            };
            let fetcher = Arc::new(HttpFetcher::new(&settings)?);
            let primary = fetcher.search(&settings, &query).await?;

            let extraction = Assembler::new(fetcher, &settings)?
                .assemble(&primary)
                .await?;
            extraction.record.validate()?;
            Ok(extraction)
        }
        Commands::Record { url } => {
            let fetcher = Arc::new(HttpFetcher::new(&settings)?);
            let extraction = Assembler::new(fetcher, &settings)?.assemble_url(url).await?;
            extraction.record.validate()?;
            Ok(extraction)
        }
        Commands::Parse { primary, cards } => {
            let primary = std::fs::read_to_string(primary)?;

            // Serve each saved card under the URL its stub resolves to.
            // A card whose link does not resolve is reported by the resolver; its file is skipped.
            let targets = Assembler::new(Arc::new(StaticFetcher::new()), &settings)?
                .card_targets(&primary)?;
            if targets.len() != cards.len() {
                info!(
                    "Primary page links {} card(s), {} file(s) given",
                    targets.len(),
                    cards.len()
                );
            }
            let mut fetcher = StaticFetcher::new();
            for (target, path) in targets.iter().zip(cards) {
                if let Some(target) = target {
                    fetcher.insert(target.as_str(), std::fs::read_to_string(path)?);
                }
            }

            Assembler::new(Arc::new(fetcher), &settings)?
                .assemble(&primary)
                .await
        }
    }
}

fn render(cli: &Cli, extraction: &Extraction) -> anyhow::Result<String> {
    let json = match (cli.diagnostics, cli.pretty) {
        (true, true) => serde_json::to_string_pretty(extraction),
        (true, false) => serde_json::to_string(extraction),
        (false, true) => serde_json::to_string_pretty(&extraction.record),
        (false, false) => serde_json::to_string(&extraction.record),
    };
    json.context("serializing record")
}
