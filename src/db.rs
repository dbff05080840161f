use crate::error::{FixupError, Result};
use crate::storage::EventStore;
use crate::types::{EventFilter, EventRecord, Price, PriceState};
use async_trait::async_trait;
use libsql::{Builder, Connection, Database};
use std::env;
use tracing::{debug, info};

/// Turso/libSQL-backed event store.
pub struct LibsqlEventStore {
    db: Database,
}

impl LibsqlEventStore {
    /// Connects using LIBSQL_URL and LIBSQL_AUTH_TOKEN from the environment.
    pub async fn from_env() -> Result<Self> {
        let url = env::var("LIBSQL_URL").map_err(|_| FixupError::Store {
            message: "LIBSQL_URL environment variable not set".to_string(),
        })?;

        let auth_token = env::var("LIBSQL_AUTH_TOKEN").map_err(|_| FixupError::Store {
            message: "LIBSQL_AUTH_TOKEN environment variable not set".to_string(),
        })?;

        info!("Connecting to Turso database at {}", url);

        let db = Builder::new_remote(url, auth_token)
            .build()
            .await
            .map_err(|e| FixupError::Store {
                message: format!("Failed to connect to database: {e}"),
            })?;

        Ok(Self { db })
    }

    async fn connection(&self) -> Result<Connection> {
        self.db.connect().map_err(|e| FixupError::Store {
            message: format!("Failed to get database connection: {e}"),
        })
    }
}

fn store_error(context: &str, e: impl std::fmt::Display) -> FixupError {
    FixupError::Store {
        message: format!("{context}: {e}"),
    }
}

fn build_query(filter: &EventFilter) -> (String, Vec<libsql::Value>) {
    let mut sql = String::from(
        "SELECT id, title, venue_name, source_url, ticket_url, price, source, description \
         FROM events",
    );
    let mut conditions: Vec<String> = Vec::new();
    let mut params: Vec<libsql::Value> = Vec::new();

    if let Some(sources) = &filter.sources {
        let placeholders = vec!["?"; sources.len()].join(", ");
        conditions.push(format!("source IN ({placeholders})"));
        for source in sources {
            params.push(source.clone().into());
        }
    }
    if let Some(state) = filter.price_state {
        conditions.push(
            match state {
                PriceState::Unknown => "price = ''",
                PriceState::Free => "price = '0'",
                PriceState::Priced => "price != '' AND price != '0'",
            }
            .to_string(),
        );
    }
    if let Some(pattern) = &filter.ticket_url_contains {
        conditions.push("ticket_url LIKE '%' || ? || '%'".to_string());
        params.push(pattern.clone().into());
    }

    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    sql.push_str(" ORDER BY id ASC");
    if let Some(limit) = filter.limit {
        sql.push_str(" LIMIT ?");
        params.push((limit as i64).into());
    }

    (sql, params)
}

#[async_trait]
impl EventStore for LibsqlEventStore {
    async fn fetch_events(&self, filter: &EventFilter) -> Result<Vec<EventRecord>> {
        let conn = self.connection().await?;
        let (sql, params) = build_query(filter);
        debug!(%sql, "querying events");

        let mut rows = conn
            .query(&sql, libsql::params_from_iter(params))
            .await
            .map_err(|e| store_error("Failed to query events", e))?;

        let mut events = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| store_error("Failed to read row", e))?
        {
            let price: String = row
                .get(5)
                .map_err(|e| store_error("Failed to get price", e))?;
            events.push(EventRecord {
                id: row.get(0).map_err(|e| store_error("Failed to get id", e))?,
                title: row.get(1).map_err(|e| store_error("Failed to get title", e))?,
                venue_name: row
                    .get(2)
                    .map_err(|e| store_error("Failed to get venue_name", e))?,
                source_url: row
                    .get(3)
                    .map_err(|e| store_error("Failed to get source_url", e))?,
                ticket_url: row
                    .get(4)
                    .map_err(|e| store_error("Failed to get ticket_url", e))?,
                price: Price::from_store(&price),
                source: row.get(6).map_err(|e| store_error("Failed to get source", e))?,
                description: row
                    .get(7)
                    .map_err(|e| store_error("Failed to get description", e))?,
            });
        }
        Ok(events)
    }

    async fn update_ticket_url(&self, id: i64, ticket_url: &str) -> Result<()> {
        let conn = self.connection().await?;
        conn.execute(
            "UPDATE events SET ticket_url = ? WHERE id = ?",
            libsql::params![ticket_url, id],
        )
        .await
        .map_err(|e| store_error("Failed to update ticket_url", e))?;
        Ok(())
    }

    async fn update_price(&self, id: i64, price: &Price) -> Result<()> {
        let conn = self.connection().await?;
        conn.execute(
            "UPDATE events SET price = ? WHERE id = ?",
            libsql::params![price.to_store(), id],
        )
        .await
        .map_err(|e| store_error("Failed to update price", e))?;
        Ok(())
    }
}
