//! Parsing of raw form input into typed drafts.

use chrono::NaiveDate;

use crate::error::{TrackerError, TrackerResult};

/// Trimmed, non-empty text.
pub fn non_empty(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Upper-cased ticker, e.g. ` brk-b ` becomes `BRK-B`.
pub fn normalize_ticker(raw: &str) -> TrackerResult<String> {
    let ticker = raw.trim().to_uppercase();
    if ticker.is_empty() {
        return Err(TrackerError::validation("Ticker symbol cannot be empty."));
    }
    if ticker.chars().any(char::is_whitespace) {
        return Err(TrackerError::validation(format!(
            "Ticker symbol '{}' cannot contain spaces.",
            ticker
        )));
    }
    Ok(ticker)
}

pub fn parse_name(raw: &str, kind: &str) -> TrackerResult<String> {
    non_empty(raw)
        .map(str::to_string)
        .ok_or_else(|| TrackerError::validation(format!("{} name cannot be empty.", kind)))
}

pub fn parse_date(raw: &str) -> TrackerResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        TrackerError::validation(format!(
            "Invalid date '{}'. Use the YYYY-MM-DD format.",
            raw.trim()
        ))
    })
}

/// Non-negative amount such as a goal or a snapshot value.
pub fn parse_amount(raw: &str, label: &str) -> TrackerResult<f64> {
    if non_empty(raw).is_none() {
        return Err(TrackerError::validation(format!("{} cannot be empty.", label)));
    }
    let value = parse_number(raw).ok_or_else(|| {
        TrackerError::validation(format!("Invalid {}. Please enter a number.", label.to_lowercase()))
    })?;
    if value < 0.0 {
        return Err(TrackerError::validation(format!("{} cannot be negative.", label)));
    }
    Ok(value)
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountDraft {
    pub user_id: i32,
    pub platform_id: i32,
    pub account_type: String,
    pub account_name: String,
    pub cash_balance: f64,
}

impl AccountDraft {
    pub fn parse(
        user_id: &str,
        platform_id: &str,
        account_type: &str,
        account_name: &str,
        cash_balance: &str,
    ) -> TrackerResult<Self> {
        let (Some(user_id), Some(platform_id), Some(account_type), Some(account_name)) = (
            non_empty(user_id),
            non_empty(platform_id),
            non_empty(account_type),
            non_empty(account_name),
        ) else {
            return Err(TrackerError::validation(
                "User, Platform, Account Type, and Account Name are all required fields.",
            ));
        };

        let user_id = user_id
            .parse()
            .map_err(|_| TrackerError::validation("Please select a valid user."))?;
        let platform_id = platform_id
            .parse()
            .map_err(|_| TrackerError::validation("Please select a valid platform."))?;

        let cash_balance = match non_empty(cash_balance) {
            None => 0.0,
            Some(raw) => parse_number(raw).ok_or_else(|| {
                TrackerError::validation(format!(
                    "Invalid cash balance '{}'. Please enter a valid number.",
                    raw
                ))
            })?,
        };

        Ok(Self {
            user_id,
            platform_id,
            account_type: account_type.to_string(),
            account_name: account_name.to_string(),
            cash_balance,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetDraft {
    pub ticker_symbol: String,
    /// Blank means "keep whatever the provider or the stored row has".
    pub name: Option<String>,
    pub quantity: f64,
    pub average_cost: f64,
    pub total_invested: f64,
}

impl AssetDraft {
    pub fn parse(
        ticker_symbol: &str,
        name: &str,
        quantity: &str,
        average_cost: &str,
        total_invested: &str,
    ) -> TrackerResult<Self> {
        if [ticker_symbol, quantity, average_cost, total_invested]
            .iter()
            .any(|field| non_empty(field).is_none())
        {
            return Err(TrackerError::validation(
                "Ticker, Quantity, Average Cost, and Total Invested are required.",
            ));
        }

        let ticker_symbol = normalize_ticker(ticker_symbol)?;

        let (Some(quantity), Some(average_cost), Some(total_invested)) = (
            parse_number(quantity),
            parse_number(average_cost),
            parse_number(total_invested),
        ) else {
            return Err(TrackerError::validation(
                "Invalid number for Quantity, Average Cost, or Total Invested.",
            ));
        };

        if quantity <= 0.0 || average_cost < 0.0 || total_invested < 0.0 {
            return Err(TrackerError::validation(
                "Quantity must be positive. Costs must be non-negative.",
            ));
        }

        Ok(Self {
            ticker_symbol,
            name: non_empty(name).map(str::to_string),
            quantity,
            average_cost,
            total_invested,
        })
    }
}
