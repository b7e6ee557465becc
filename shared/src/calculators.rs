//! Hypothetical sell and buy arithmetic on an existing holding.

use serde::Serialize;

use crate::entity::assets;
use crate::error::{TrackerError, TrackerResult};
use crate::metrics::percent_of;
use crate::validation::{non_empty, parse_number};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SellSimulation {
    pub asset_id: i32,
    pub hypothetical_sale_price: f64,
    pub total_proceeds: f64,
    pub original_cost: f64,
    pub profit_dollars: f64,
    pub profit_percent: f64,
}

impl SellSimulation {
    pub fn compute(asset: &assets::Model, sale_price: f64) -> TrackerResult<Self> {
        if !sale_price.is_finite() || sale_price < 0.0 {
            return Err(TrackerError::validation(
                "Hypothetical sale price cannot be negative.",
            ));
        }

        let original_cost = asset.total_invested;
        let total_proceeds = asset.quantity * sale_price;
        let profit_dollars = total_proceeds - original_cost;

        Ok(Self {
            asset_id: asset.asset_id,
            hypothetical_sale_price: sale_price,
            total_proceeds,
            original_cost,
            profit_dollars,
            profit_percent: percent_of(profit_dollars, original_cost),
        })
    }
}

/// What the user wants to buy: a cash amount or a share count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BuyOrder {
    Amount(f64),
    Shares(f64),
}

impl BuyOrder {
    /// The amount wins when both fields are filled in.
    pub fn parse(investment_amount: &str, shares_to_buy: &str) -> TrackerResult<Self> {
        match (non_empty(investment_amount), non_empty(shares_to_buy)) {
            (None, None) => Err(TrackerError::validation(
                "Either Investment Amount or Number of Shares to Buy is required.",
            )),
            (Some(amount), _) => {
                let amount = parse_number(amount).ok_or_else(|| {
                    TrackerError::validation("Invalid number for Investment Amount or Shares to Buy.")
                })?;
                if amount <= 0.0 {
                    return Err(TrackerError::validation("Investment Amount must be positive."));
                }
                Ok(Self::Amount(amount))
            }
            (None, Some(shares)) => {
                let shares = parse_number(shares).ok_or_else(|| {
                    TrackerError::validation("Invalid number for Investment Amount or Shares to Buy.")
                })?;
                if shares <= 0.0 {
                    return Err(TrackerError::validation(
                        "Number of Shares to Buy must be positive.",
                    ));
                }
                Ok(Self::Shares(shares))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuySimulation {
    pub asset_id: i32,
    pub ticker_symbol: String,
    pub shares_purchased: f64,
    pub cost_of_purchase: f64,
    pub new_total_quantity: f64,
    pub new_total_invested: f64,
    pub new_average_cost: f64,
    pub new_current_total_value: f64,
    pub new_profit_loss_dollars: f64,
    pub new_profit_loss_percent: f64,
    pub current_profit_loss_dollars: f64,
    pub current_profit_loss_percent: f64,
}

impl BuySimulation {
    pub fn compute(asset: &assets::Model, order: BuyOrder) -> TrackerResult<Self> {
        let price = asset.current_price.ok_or_else(|| {
            TrackerError::market_data(format!(
                "Current price for {} is not available. Please refresh asset data.",
                asset.ticker_symbol
            ))
        })?;
        if price <= 0.0 {
            return Err(TrackerError::validation(format!(
                "Current price for {} is not usable for a buy simulation.",
                asset.ticker_symbol
            )));
        }

        let (shares_purchased, cost_of_purchase) = match order {
            BuyOrder::Amount(amount) => {
                let shares = amount / price;
                (shares, shares * price)
            }
            BuyOrder::Shares(shares) => (shares, shares * price),
        };

        let new_total_quantity = asset.quantity + shares_purchased;
        let new_total_invested = asset.total_invested + cost_of_purchase;
        let new_average_cost = if new_total_quantity > 0.0 {
            new_total_invested / new_total_quantity
        } else {
            0.0
        };
        let new_current_total_value = new_total_quantity * price;
        let new_profit_loss_dollars = new_current_total_value - new_total_invested;

        let current_profit_loss_dollars = asset.quantity * price - asset.total_invested;

        Ok(Self {
            asset_id: asset.asset_id,
            ticker_symbol: asset.ticker_symbol.clone(),
            shares_purchased,
            cost_of_purchase,
            new_total_quantity,
            new_total_invested,
            new_average_cost,
            new_current_total_value,
            new_profit_loss_dollars,
            new_profit_loss_percent: percent_of(new_profit_loss_dollars, new_total_invested),
            current_profit_loss_dollars,
            current_profit_loss_percent: percent_of(current_profit_loss_dollars, asset.total_invested),
        })
    }
}
