pub mod classify;
pub mod config;
#[cfg(feature = "db")]
pub mod db;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod price;
pub mod reconcile;
pub mod registry;
pub mod resolver;
pub mod storage;
pub mod types;
