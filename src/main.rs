use clap::{Parser, Subcommand};
use eventfix::config::Config;
use eventfix::fetch::ReqwestFetcher;
use eventfix::logging;
use eventfix::reconcile::{Reconciler, RunMode, RunReport};
use eventfix::registry::VenueRegistry;
use eventfix::storage::EventStore;
use eventfix::types::{EventFilter, PriceState};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "eventfix")]
#[command(about = "Ticket-link and price cleanup for the Bergen event directory")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace aggregator ticket links with venue or source URLs
    FixUrls {
        /// Restrict to specific scrape sources (comma-separated)
        #[arg(long)]
        sources: Option<String>,
        /// Only consider rows whose ticket URL contains this substring
        #[arg(long)]
        url_contains: Option<String>,
        /// Maximum number of rows to consider
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Extract and normalize missing prices
    FixPrices {
        /// Restrict to specific scrape sources (comma-separated)
        #[arg(long)]
        sources: Option<String>,
        /// Maximum number of rows to consider
        #[arg(long)]
        limit: Option<usize>,
        /// Fetch the ticket/venue page when the stored text has no price
        #[arg(long)]
        fetch: bool,
    },
}

fn parse_sources(raw: Option<String>) -> Option<Vec<String>> {
    raw.map(|list| list.split(',').map(|s| s.trim().to_string()).collect())
}

#[cfg(feature = "db")]
async fn build_store() -> Result<Arc<dyn EventStore>, Box<dyn std::error::Error>> {
    Ok(Arc::new(eventfix::db::LibsqlEventStore::from_env().await?))
}

#[cfg(not(feature = "db"))]
async fn build_store() -> Result<Arc<dyn EventStore>, Box<dyn std::error::Error>> {
    tracing::warn!("built without the `db` feature; using an empty in-memory store");
    Ok(Arc::new(eventfix::storage::InMemoryEventStore::new()))
}

fn print_report(report: &RunReport) {
    println!("\n📊 Reconcile results:");
    println!("   Considered: {}", report.considered);
    println!("   Already OK: {}", report.already_ok);
    println!("   Fixed: {}", report.fixed);
    println!("   Unresolved: {}", report.unresolved);
    println!("   Failed: {}", report.failed);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("No usable config.toml ({}), falling back to defaults", e);
            Config::default()
        }
    };
    let registry = Arc::new(VenueRegistry::load(&config.registry_path)?);
    let store = build_store().await?;

    match cli.command {
        Commands::FixUrls {
            sources,
            url_contains,
            limit,
        } => {
            println!("🔗 Fixing aggregator ticket links...");
            let filter = EventFilter {
                sources: parse_sources(sources),
                price_state: None,
                ticket_url_contains: url_contains,
                limit,
            };
            let reconciler = Reconciler::new(store, registry);
            let report = reconciler.run(RunMode::FixTicketUrls, &filter).await?;
            print_report(&report);
        }
        Commands::FixPrices {
            sources,
            limit,
            fetch,
        } => {
            println!("💰 Filling in missing prices...");
            let filter = EventFilter {
                sources: parse_sources(sources),
                price_state: Some(PriceState::Unknown),
                ticket_url_contains: None,
                limit,
            };
            let mut reconciler = Reconciler::new(store, registry);
            if fetch {
                let fetcher = Arc::new(ReqwestFetcher::new(Duration::from_secs(
                    config.fetch.timeout_seconds,
                ))?);
                reconciler =
                    reconciler.with_fetcher(fetcher, Duration::from_millis(config.fetch.delay_ms));
            }
            let report = reconciler
                .run(RunMode::FixPrices { fetch_pages: fetch }, &filter)
                .await?;
            print_report(&report);
        }
    }
    Ok(())
}
