use dotenv::dotenv;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://database/investment_tracker.db?mode=rwc";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_MARKET_DATA_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_MARKET_DATA_TIMEOUT_SECS: u64 = 10;
/// Yahoo symbol quoting how many CAD one USD buys.
pub const DEFAULT_EXCHANGE_RATE_SYMBOL: &str = "CAD=X";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub market_data_base_url: String,
    pub market_data_timeout: Duration,
    pub exchange_rate_symbol: String,
    pub static_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenv().ok();

        let timeout_secs = match std::env::var("MARKET_DATA_TIMEOUT_SECS") {
            Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(
                    "Invalid MARKET_DATA_TIMEOUT_SECS '{}', using {}",
                    raw,
                    DEFAULT_MARKET_DATA_TIMEOUT_SECS
                );
                DEFAULT_MARKET_DATA_TIMEOUT_SECS
            }),
            Err(_) => DEFAULT_MARKET_DATA_TIMEOUT_SECS,
        };

        Ok(Config {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            bind_addr: std::env::var("BIND_ADDR")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            market_data_base_url: std::env::var("MARKET_DATA_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_MARKET_DATA_BASE_URL.to_string()),
            market_data_timeout: Duration::from_secs(timeout_secs),
            exchange_rate_symbol: std::env::var("EXCHANGE_RATE_SYMBOL")
                .unwrap_or_else(|_| DEFAULT_EXCHANGE_RATE_SYMBOL.to_string()),
            static_dir: std::env::var("STATIC_DIR").ok().map(PathBuf::from),
        })
    }
}
