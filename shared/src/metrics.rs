//! Per-asset figures derived from stored fields.

use serde::Serialize;

use crate::entity::assets;

/// `part / whole * 100`, or zero when nothing was invested.
pub fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AssetMetrics {
    pub current_value: f64,
    pub profit_loss_dollars: f64,
    pub profit_loss_percent: f64,
    pub day_change_percent: f64,
    /// Negative while below the 52-week high.
    pub percent_to_52_week_high: Option<f64>,
}

impl AssetMetrics {
    pub fn compute(asset: &assets::Model) -> Self {
        let current_value = asset
            .current_price
            .map(|price| asset.quantity * price)
            .unwrap_or(0.0);
        let profit_loss_dollars = current_value - asset.total_invested;

        let day_change_percent = match (asset.current_price, asset.price_yesterday) {
            (Some(now), Some(prev)) if prev > 0.0 => (now - prev) / prev * 100.0,
            _ => 0.0,
        };

        let percent_to_52_week_high = match (asset.current_price, asset.fifty_two_week_high) {
            (Some(now), Some(high)) if high > 0.0 => Some((now - high) / high * 100.0),
            _ => None,
        };

        Self {
            current_value,
            profit_loss_dollars,
            profit_loss_percent: percent_of(profit_loss_dollars, asset.total_invested),
            day_change_percent,
            percent_to_52_week_high,
        }
    }
}

/// An asset row together with its derived figures.
#[derive(Debug, Clone, Serialize)]
pub struct AssetView {
    pub asset: assets::Model,
    pub metrics: AssetMetrics,
}

impl From<assets::Model> for AssetView {
    fn from(asset: assets::Model) -> Self {
        let metrics = AssetMetrics::compute(&asset);
        Self { asset, metrics }
    }
}

#[cfg(test)]
pub(crate) fn sample_asset(asset_id: i32, account_id: i32, ticker: &str) -> assets::Model {
    assets::Model {
        asset_id,
        account_id,
        ticker_symbol: ticker.to_string(),
        name: None,
        quantity: 10.0,
        average_cost: 10.0,
        total_invested: 100.0,
        current_price: None,
        price_yesterday: None,
        fifty_two_week_high: None,
        fifty_two_week_low: None,
        notes: None,
    }
}
