use crate::classify::is_aggregator;
use crate::fetch::MarkupFetcher;
use crate::price;
use crate::registry::VenueRegistry;
use crate::resolver;
use crate::storage::EventStore;
use crate::types::{EventFilter, EventRecord, Price};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// What a run repairs. One concern at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Replace aggregator ticket links per the resolver fallback order.
    FixTicketUrls,
    /// Fill in missing prices from stored text, optionally fetching the
    /// ticket/venue page when the stored text has none.
    FixPrices { fetch_pages: bool },
}

/// Outcome counts for a single run. Every considered row lands in exactly
/// one of the four outcome buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub considered: usize,
    pub already_ok: usize,
    pub fixed: usize,
    pub unresolved: usize,
    pub failed: usize,
}

/// Walks a working set of event rows and writes back only genuine changes.
/// Rows are processed strictly sequentially; a failed write or fetch is
/// recorded in the report and the batch moves on. No retries.
pub struct Reconciler {
    store: Arc<dyn EventStore>,
    registry: Arc<VenueRegistry>,
    fetcher: Option<Arc<dyn MarkupFetcher>>,
    fetch_delay: Duration,
}

impl Reconciler {
    pub fn new(store: Arc<dyn EventStore>, registry: Arc<VenueRegistry>) -> Self {
        Self {
            store,
            registry,
            fetcher: None,
            fetch_delay: Duration::from_millis(1500),
        }
    }

    /// Required for `FixPrices { fetch_pages: true }` runs.
    pub fn with_fetcher(mut self, fetcher: Arc<dyn MarkupFetcher>, delay: Duration) -> Self {
        self.fetcher = Some(fetcher);
        self.fetch_delay = delay;
        self
    }

    /// A failed initial read aborts the run; nothing has been modified yet.
    /// Every later failure is per-row and only shows up in the counts.
    #[instrument(skip(self, filter))]
    pub async fn run(&self, mode: RunMode, filter: &EventFilter) -> crate::error::Result<RunReport> {
        let started_at = Utc::now();
        let events = self.store.fetch_events(filter).await?;
        info!(rows = events.len(), ?mode, "fetched working set");

        let mut report = RunReport {
            considered: events.len(),
            ..RunReport::default()
        };
        // Politeness toward third-party sites: no delay before the first
        // fetch, an enforced minimum between consecutive ones.
        let mut fetched_before = false;

        for event in &events {
            match mode {
                RunMode::FixTicketUrls => self.fix_ticket_url(event, &mut report).await,
                RunMode::FixPrices { fetch_pages } => {
                    self.fix_price(event, fetch_pages, &mut fetched_before, &mut report)
                        .await
                }
            }
        }

        let elapsed = Utc::now() - started_at;
        info!(
            considered = report.considered,
            already_ok = report.already_ok,
            fixed = report.fixed,
            unresolved = report.unresolved,
            failed = report.failed,
            elapsed_ms = elapsed.num_milliseconds(),
            "reconcile run finished"
        );
        Ok(report)
    }

    async fn fix_ticket_url(&self, event: &EventRecord, report: &mut RunReport) {
        let candidate = resolver::resolve(
            &self.registry,
            &event.venue_name,
            event.ticket_url.as_deref(),
            event.source_url.as_deref(),
        );
        match candidate {
            Some(new_url) => match self.store.update_ticket_url(event.id, &new_url).await {
                Ok(()) => {
                    info!(id = event.id, url = %new_url, "ticket url replaced");
                    report.fixed += 1;
                }
                Err(e) => {
                    error!(id = event.id, error = %e, "ticket url update failed");
                    report.failed += 1;
                }
            },
            None => {
                // Aggregator link with nothing better known stays unresolved;
                // anything else was never in need of fixing.
                if is_aggregator(event.ticket_url.as_deref()) {
                    report.unresolved += 1;
                } else {
                    report.already_ok += 1;
                }
            }
        }
    }

    async fn fix_price(
        &self,
        event: &EventRecord,
        fetch_pages: bool,
        fetched_before: &mut bool,
        report: &mut RunReport,
    ) {
        if event.price != Price::Unknown {
            report.already_ok += 1;
            return;
        }

        let mut candidate = event
            .description
            .as_deref()
            .and_then(price::extract_from_text);

        if candidate.is_none() && fetch_pages {
            let page_url = event
                .ticket_url
                .as_deref()
                .or(event.source_url.as_deref());
            match (&self.fetcher, page_url) {
                (Some(fetcher), Some(url)) => {
                    if *fetched_before {
                        tokio::time::sleep(self.fetch_delay).await;
                    }
                    *fetched_before = true;
                    match fetcher.fetch(url).await {
                        Some(html) => candidate = price::extract_from_markup(&html),
                        None => {
                            warn!(id = event.id, %url, "page fetch failed, skipping row");
                            report.unresolved += 1;
                            return;
                        }
                    }
                }
                _ => {}
            }
        }

        match candidate {
            Some(amount) => {
                let new_price = Price::from_store(&amount);
                if new_price == event.price {
                    report.already_ok += 1;
                    return;
                }
                match self.store.update_price(event.id, &new_price).await {
                    Ok(()) => {
                        info!(id = event.id, price = %new_price.to_store(), "price filled in");
                        report.fixed += 1;
                    }
                    Err(e) => {
                        error!(id = event.id, error = %e, "price update failed");
                        report.failed += 1;
                    }
                }
            }
            None => report.unresolved += 1,
        }
    }
}
