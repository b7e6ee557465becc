pub mod calculators;
pub mod config;
pub mod dashboard;
pub mod database;
pub mod entity;
pub mod error;
pub mod market_data;
pub mod metrics;
pub mod repositories;
pub mod services;
pub mod validation;

pub use config::Config;
pub use database::{connect_and_migrate, connect_in_memory, get_db_connection};
pub use error::{TrackerError, TrackerResult};
pub use market_data::{MarketDataProvider, YahooFinanceClient};
