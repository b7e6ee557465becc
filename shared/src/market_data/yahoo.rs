use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use super::{ChartPoint, MarketDataProvider, Quote};

const USER_AGENT: &str = concat!("folio/", env!("CARGO_PKG_VERSION"));

/// Client for the Yahoo Finance chart endpoint.
#[derive(Debug, Clone)]
pub struct YahooFinanceClient {
    base_url: Url,
    client: reqwest::Client,
}

#[derive(Deserialize, Debug)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Deserialize, Debug)]
struct ChartBody {
    result: Option<Vec<ChartItem>>,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
    previous_close: Option<f64>,
    chart_previous_close: Option<f64>,
    fifty_two_week_high: Option<f64>,
    fifty_two_week_low: Option<f64>,
    short_name: Option<String>,
    long_name: Option<String>,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    quote: Vec<QuoteSeries>,
}

#[derive(Deserialize, Debug)]
struct QuoteSeries {
    close: Option<Vec<Option<f64>>>,
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

impl ChartItem {
    /// Closes with gaps and non-finite values removed, oldest first.
    fn closes(&self) -> Vec<f64> {
        self.indicators
            .as_ref()
            .and_then(|inds| inds.quote.first())
            .and_then(|q| q.close.as_ref())
            .map(|closes| closes.iter().filter_map(|c| finite(*c)).collect())
            .unwrap_or_default()
    }

    fn dated_closes(&self) -> Vec<ChartPoint> {
        let (Some(timestamps), Some(closes)) = (
            self.timestamp.as_ref(),
            self.indicators
                .as_ref()
                .and_then(|inds| inds.quote.first())
                .and_then(|q| q.close.as_ref()),
        ) else {
            return Vec::new();
        };

        timestamps
            .iter()
            .zip(closes.iter())
            .filter_map(|(ts, close)| {
                let close = finite(*close)?;
                let date = Utc.timestamp_opt(*ts, 0).single()?;
                Some(ChartPoint {
                    date: date.format("%Y-%m-%d").to_string(),
                    close,
                })
            })
            .collect()
    }

    fn into_quote(self) -> Quote {
        let closes = self.closes();
        let last = closes.last().copied();
        let second_last = closes.len().checked_sub(2).map(|i| closes[i]);
        let name = self
            .meta
            .short_name
            .filter(|n| !n.trim().is_empty())
            .or(self.meta.long_name.filter(|n| !n.trim().is_empty()));

        Quote {
            current_price: last.or(finite(self.meta.regular_market_price)),
            price_yesterday: second_last
                .or(finite(self.meta.previous_close))
                .or(finite(self.meta.chart_previous_close)),
            fifty_two_week_high: finite(self.meta.fifty_two_week_high),
            fifty_two_week_low: finite(self.meta.fifty_two_week_low),
            name,
        }
    }
}

impl YahooFinanceClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        let base_url = Url::parse(base_url)
            .map_err(|e| anyhow!("Invalid market data base URL '{}': {}", base_url, e))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("Market data base URL cannot hold a path: {}", base_url));
        }

        Ok(Self { base_url, client })
    }

    async fn fetch_chart(&self, symbol: &str, range: &str) -> Result<ChartItem> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Market data base URL cannot hold a path: {}", self.base_url))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart"])
            .push(symbol);
        debug!("Requesting chart data from {} (range {})", url, range);

        let response = self
            .client
            .get(url)
            .query(&[("range", range), ("interval", "1d")])
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for symbol: {}", e, symbol))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for symbol: {}",
                response.status(),
                symbol
            ));
        }

        let text = response.text().await?;
        let data: ChartResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", symbol, e))?;

        data.chart
            .result
            .and_then(|items| items.into_iter().next())
            .ok_or_else(|| anyhow!("No price data found for symbol: {}", symbol))
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceClient {
    #[instrument(name = "YahooQuoteFetch", skip(self), fields(ticker = %ticker))]
    async fn fetch_quote(&self, ticker: &str) -> Result<Quote> {
        let item = self.fetch_chart(ticker, "5d").await?;
        Ok(item.into_quote())
    }

    #[instrument(name = "YahooRateFetch", skip(self), fields(pair = %pair))]
    async fn fetch_exchange_rate(&self, pair: &str) -> Result<f64> {
        let item = self.fetch_chart(pair, "1d").await?;
        item.closes()
            .last()
            .copied()
            .or(finite(item.meta.regular_market_price))
            .ok_or_else(|| anyhow!("No rate data found for currency pair: {}", pair))
    }

    #[instrument(name = "YahooHistoryFetch", skip(self), fields(ticker = %ticker))]
    async fn fetch_yearly_history(&self, ticker: &str) -> Result<Vec<ChartPoint>> {
        let item = self.fetch_chart(ticker, "1y").await?;
        Ok(item.dated_closes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_chart(symbol: &str, range: &str, status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/v8/finance/chart/{symbol}")))
            .and(query_param("range", range))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }

    fn client(server: &MockServer) -> YahooFinanceClient {
        YahooFinanceClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_quote_uses_last_two_closes() {
        let body = r#"{
            "chart": {
                "result": [{
                    "meta": {
                        "regularMarketPrice": 190.5,
                        "chartPreviousClose": 170.0,
                        "fiftyTwoWeekHigh": 199.62,
                        "fiftyTwoWeekLow": 164.08,
                        "shortName": "Apple Inc.",
                        "longName": "Apple Inc. (Long)"
                    },
                    "timestamp": [1700000000, 1700086400, 1700172800],
                    "indicators": { "quote": [{ "close": [185.0, 187.25, 189.75] }] }
                }],
                "error": null
            }
        }"#;
        let server = mock_chart("AAPL", "5d", 200, body).await;

        let quote = client(&server).fetch_quote("AAPL").await.unwrap();
        assert_eq!(quote.current_price, Some(189.75));
        assert_eq!(quote.price_yesterday, Some(187.25));
        assert_eq!(quote.fifty_two_week_high, Some(199.62));
        assert_eq!(quote.fifty_two_week_low, Some(164.08));
        assert_eq!(quote.name.as_deref(), Some("Apple Inc."));
    }

    #[tokio::test]
    async fn test_quote_falls_back_to_meta_without_bars() {
        let body = r#"{
            "chart": {
                "result": [{
                    "meta": {
                        "regularMarketPrice": 42.0,
                        "previousClose": 40.0,
                        "longName": "Long Only Corp"
                    }
                }]
            }
        }"#;
        let server = mock_chart("LONG", "5d", 200, body).await;

        let quote = client(&server).fetch_quote("LONG").await.unwrap();
        assert_eq!(quote.current_price, Some(42.0));
        assert_eq!(quote.price_yesterday, Some(40.0));
        assert_eq!(quote.fifty_two_week_high, None);
        assert_eq!(quote.name.as_deref(), Some("Long Only Corp"));
    }

    #[tokio::test]
    async fn test_quote_skips_null_closes() {
        let body = r#"{
            "chart": {
                "result": [{
                    "meta": { "regularMarketPrice": 11.0, "chartPreviousClose": 9.0 },
                    "timestamp": [1, 2, 3],
                    "indicators": { "quote": [{ "close": [null, 10.0, null] }] }
                }]
            }
        }"#;
        let server = mock_chart("GAPS", "5d", 200, body).await;

        let quote = client(&server).fetch_quote("GAPS").await.unwrap();
        assert_eq!(quote.current_price, Some(10.0));
        assert_eq!(quote.price_yesterday, Some(9.0));
    }

    #[tokio::test]
    async fn test_symbol_is_sent_as_one_path_segment() {
        let body = r#"{"chart": {"result": [{"meta": {"regularMarketPrice": 3100.0}}]}}"#;
        let server = mock_chart("M&M.NS", "5d", 200, body).await;
        let quote = client(&server).fetch_quote("M&M.NS").await.unwrap();
        assert_eq!(quote.current_price, Some(3100.0));

        let server = mock_chart("BRK%2FB%3FX", "5d", 200, body).await;
        let quote = client(&server).fetch_quote("BRK/B?X").await.unwrap();
        assert_eq!(quote.current_price, Some(3100.0));
    }

    #[test]
    fn test_base_url_must_parse() {
        assert!(YahooFinanceClient::new("not a url", Duration::from_secs(1)).is_err());
        assert!(YahooFinanceClient::new("http://localhost:9/", Duration::from_secs(1)).is_ok());
    }

    #[tokio::test]
    async fn test_quote_not_found() {
        let body = r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found"}}}"#;
        let server = mock_chart("NOPE", "5d", 404, body).await;

        let err = client(&server).fetch_quote("NOPE").await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP error: 404 Not Found for symbol: NOPE");
    }

    #[tokio::test]
    async fn test_quote_empty_result() {
        let server = mock_chart("EMPTY", "5d", 200, r#"{"chart": {"result": []}}"#).await;

        let err = client(&server).fetch_quote("EMPTY").await.unwrap_err();
        assert_eq!(err.to_string(), "No price data found for symbol: EMPTY");
    }

    #[tokio::test]
    async fn test_quote_malformed_response() {
        let server = mock_chart("BAD", "5d", 200, r#"{"charts": []}"#).await;

        let err = client(&server).fetch_quote("BAD").await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse JSON response for BAD"));
    }

    #[tokio::test]
    async fn test_exchange_rate() {
        let body = r#"{
            "chart": {
                "result": [{
                    "meta": { "regularMarketPrice": 1.37 },
                    "timestamp": [1700000000],
                    "indicators": { "quote": [{ "close": [1.3712] }] }
                }]
            }
        }"#;
        let server = mock_chart("CAD=X", "1d", 200, body).await;

        let rate = client(&server).fetch_exchange_rate("CAD=X").await.unwrap();
        assert_eq!(rate, 1.3712);
    }

    #[tokio::test]
    async fn test_exchange_rate_missing() {
        let body = r#"{"chart": {"result": [{"meta": {}}]}}"#;
        let server = mock_chart("CAD=X", "1d", 200, body).await;

        let err = client(&server).fetch_exchange_rate("CAD=X").await.unwrap_err();
        assert_eq!(err.to_string(), "No rate data found for currency pair: CAD=X");
    }

    #[tokio::test]
    async fn test_yearly_history_dates_closes() {
        let body = r#"{
            "chart": {
                "result": [{
                    "meta": { "regularMarketPrice": 3.0 },
                    "timestamp": [1704067200, 1704153600, 1704240000],
                    "indicators": { "quote": [{ "close": [1.0, null, 3.0] }] }
                }]
            }
        }"#;
        let server = mock_chart("MSFT", "1y", 200, body).await;

        let points = client(&server).fetch_yearly_history("MSFT").await.unwrap();
        assert_eq!(
            points,
            vec![
                ChartPoint { date: "2024-01-01".to_string(), close: 1.0 },
                ChartPoint { date: "2024-01-03".to_string(), close: 3.0 },
            ]
        );
    }
}
