use crate::error::Result;
use crate::types::{EventFilter, EventRecord, Price};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Event store surface used by the reconciliation driver: filtered reads and
/// per-field updates by row id. Each call is an independent request; there is
/// no client-side locking or cross-row transaction.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn fetch_events(&self, filter: &EventFilter) -> Result<Vec<EventRecord>>;
    async fn update_ticket_url(&self, id: i64, ticket_url: &str) -> Result<()>;
    async fn update_price(&self, id: i64, price: &Price) -> Result<()>;
}

/// In-memory store implementation for development/testing
pub struct InMemoryEventStore {
    events: Arc<Mutex<HashMap<i64, EventRecord>>>,
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn seed(&self, records: impl IntoIterator<Item = EventRecord>) {
        let mut events = self.events.lock().unwrap();
        for record in records {
            events.insert(record.id, record);
        }
    }

    pub fn get(&self, id: i64) -> Option<EventRecord> {
        self.events.lock().unwrap().get(&id).cloned()
    }
}

fn matches(record: &EventRecord, filter: &EventFilter) -> bool {
    if let Some(sources) = &filter.sources {
        if !sources.iter().any(|s| s == &record.source) {
            return false;
        }
    }
    if let Some(state) = filter.price_state {
        if record.price.state() != state {
            return false;
        }
    }
    if let Some(pattern) = &filter.ticket_url_contains {
        let hit = record
            .ticket_url
            .as_deref()
            .map(|url| url.contains(pattern.as_str()))
            .unwrap_or(false);
        if !hit {
            return false;
        }
    }
    true
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn fetch_events(&self, filter: &EventFilter) -> Result<Vec<EventRecord>> {
        let events = self.events.lock().unwrap();
        let mut selected: Vec<EventRecord> = events
            .values()
            .filter(|record| matches(record, filter))
            .cloned()
            .collect();

        // Deterministic order so repeated runs walk rows the same way
        selected.sort_by_key(|record| record.id);
        if let Some(limit) = filter.limit {
            selected.truncate(limit);
        }
        Ok(selected)
    }

    async fn update_ticket_url(&self, id: i64, ticket_url: &str) -> Result<()> {
        let mut events = self.events.lock().unwrap();
        if let Some(record) = events.get_mut(&id) {
            record.ticket_url = Some(ticket_url.to_string());
            debug!(id, %ticket_url, "updated ticket url");
        }
        Ok(())
    }

    async fn update_price(&self, id: i64, price: &Price) -> Result<()> {
        let mut events = self.events.lock().unwrap();
        if let Some(record) = events.get_mut(&id) {
            record.price = *price;
            debug!(id, price = %price.to_store(), "updated price");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PriceState;

    fn record(id: i64, source: &str, price: Price, ticket_url: Option<&str>) -> EventRecord {
        EventRecord {
            id,
            title: format!("Event {id}"),
            venue_name: "USF Verftet".to_string(),
            source_url: None,
            ticket_url: ticket_url.map(str::to_string),
            price,
            source: source.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_filters_compose_and_order_is_stable() {
        let store = InMemoryEventStore::new();
        store.seed([
            record(3, "venuesite", Price::Unknown, Some("https://visitbergen.com/e/3")),
            record(1, "venuesite", Price::Unknown, Some("https://visitbergen.com/e/1")),
            record(2, "listings", Price::Free, Some("https://usf.no/program/2")),
        ]);

        let filter = EventFilter {
            sources: Some(vec!["venuesite".to_string()]),
            price_state: Some(PriceState::Unknown),
            ticket_url_contains: Some("visitbergen.com".to_string()),
            limit: None,
        };
        let rows = store.fetch_events(&filter).await.unwrap();
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 3]);

        let limited = store
            .fetch_events(&EventFilter {
                limit: Some(2),
                ..EventFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[tokio::test]
    async fn test_update_by_id_touches_only_the_named_field() {
        let store = InMemoryEventStore::new();
        store.seed([record(1, "venuesite", Price::Unknown, Some("https://visitbergen.com/e/1"))]);

        store.update_price(1, &Price::Priced(250)).await.unwrap();
        let row = store.get(1).unwrap();
        assert_eq!(row.price, Price::Priced(250));
        assert_eq!(row.ticket_url.as_deref(), Some("https://visitbergen.com/e/1"));
    }
}
