use serde::{Deserialize, Serialize};

/// The subset of a stored event row that this pipeline reads and repairs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: i64,
    pub title: String,
    pub venue_name: String,
    /// Page the row was originally scraped from.
    pub source_url: Option<String>,
    pub ticket_url: Option<String>,
    pub price: Price,
    /// Name of the scrape source that produced this row.
    pub source: String,
    pub description: Option<String>,
}

/// Price as stored on an event row. The store encodes this as a plain string
/// ("" = unknown, "0" = confirmed free, other digits = whole kroner); the
/// conversion happens only at the store edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Price {
    Unknown,
    Free,
    Priced(u64),
}

impl Price {
    pub fn from_store(raw: &str) -> Price {
        match raw.trim() {
            "" => Price::Unknown,
            "0" => Price::Free,
            other => match other.parse::<u64>() {
                Ok(amount) => Price::Priced(amount),
                // Unparseable garbage from a scraper is treated the same as unset.
                Err(_) => Price::Unknown,
            },
        }
    }

    pub fn to_store(&self) -> String {
        match self {
            Price::Unknown => String::new(),
            Price::Free => "0".to_string(),
            Price::Priced(amount) => amount.to_string(),
        }
    }

    pub fn state(&self) -> PriceState {
        match self {
            Price::Unknown => PriceState::Unknown,
            Price::Free => PriceState::Free,
            Price::Priced(_) => PriceState::Priced,
        }
    }
}

/// Which of the three price states a filter should select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceState {
    Unknown,
    Free,
    Priced,
}

/// Row selection passed to the event store when assembling a working set.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Restrict to rows from any of these scrape sources.
    pub sources: Option<Vec<String>>,
    pub price_state: Option<PriceState>,
    /// Substring match on the ticket URL.
    pub ticket_url_contains: Option<String>,
    pub limit: Option<usize>,
}
