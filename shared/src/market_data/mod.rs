//! Quote provider abstraction used to enrich assets with market fields.

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

pub mod yahoo;

pub use yahoo::YahooFinanceClient;

/// Latest market fields for one ticker. Any field may be missing when the
/// provider did not report a usable number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Quote {
    pub current_price: Option<f64>,
    pub price_yesterday: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub name: Option<String>,
}

/// One daily close, dated `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: String,
    pub close: f64,
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch_quote(&self, ticker: &str) -> Result<Quote>;

    /// Rate for a currency pair symbol such as `CAD=X`.
    async fn fetch_exchange_rate(&self, pair: &str) -> Result<f64>;

    /// Daily closes over the last year, oldest first.
    async fn fetch_yearly_history(&self, ticker: &str) -> Result<Vec<ChartPoint>>;
}
