//! Portfolio aggregation for the dashboard: totals, rankings, the
//! user → platform → account breakdown and allocation chart data.

use serde::Serialize;
use std::collections::HashMap;

use crate::entity::{assets, users};
use crate::metrics::{percent_of, AssetView};
use crate::repositories::account_repository::AccountListing;

/// An asset with the account it is held in.
#[derive(Debug, Clone, Serialize)]
pub struct Holding {
    #[serde(flatten)]
    pub view: AssetView,
    pub account_name: String,
    pub account_type: String,
    pub user_name: String,
    pub platform_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GlobalTotals {
    pub total_invested_assets: f64,
    pub total_invested_assets_plus_cash: f64,
    pub current_value_of_assets: f64,
    pub total_cash: f64,
    pub profit_loss_amount: f64,
    pub profit_loss_percent: f64,
    pub overall_portfolio_value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountSummary {
    pub account_id: i32,
    pub account_name: String,
    pub account_type: String,
    pub cash_balance: f64,
    pub total_invested: f64,
    pub current_value_of_assets: f64,
    pub profit_loss_amount: f64,
    pub profit_loss_percent: f64,
    pub assets: Vec<AssetView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlatformSummary {
    pub platform_id: i32,
    pub platform_name: String,
    pub total_invested: f64,
    pub current_value_of_assets: f64,
    pub total_cash: f64,
    pub profit_loss_amount: f64,
    pub profit_loss_percent: f64,
    pub accounts: Vec<AccountSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub user_id: i32,
    pub user_name: String,
    pub total_invested: f64,
    pub current_value_of_assets: f64,
    pub total_cash: f64,
    pub profit_loss_amount: f64,
    pub profit_loss_percent: f64,
    pub platforms: Vec<PlatformSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountPerformance {
    pub account_id: i32,
    pub user_name: String,
    pub platform_name: String,
    pub account_name: String,
    /// `user - account (platform)`
    pub display_name: String,
    pub total_invested: f64,
    pub current_value_of_assets: f64,
    pub total_value: f64,
    pub profit_loss_dollars: f64,
    pub profit_loss_percent: f64,
}

/// One slice of a pie chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationSlice {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Portfolio {
    pub totals: GlobalTotals,
    /// Assets with money invested, best P/L percent first.
    pub ranked_assets: Vec<Holding>,
    pub breakdown: Vec<UserSummary>,
    pub account_type_allocation: Vec<AllocationSlice>,
    pub user_allocation: Vec<AllocationSlice>,
    pub account_allocation: Vec<AllocationSlice>,
    pub ranked_accounts: Vec<AccountPerformance>,
}

impl Portfolio {
    /// `users` ordered by name and `accounts` ordered by user, platform and
    /// account name, as the repositories return them.
    pub fn build(
        users: &[users::Model],
        accounts: &[AccountListing],
        assets: Vec<assets::Model>,
    ) -> Self {
        let mut by_account: HashMap<i32, Vec<AssetView>> = HashMap::new();
        for asset in assets {
            by_account
                .entry(asset.account_id)
                .or_default()
                .push(AssetView::from(asset));
        }

        let mut totals = GlobalTotals::default();
        let mut holdings = Vec::new();
        for account in accounts {
            totals.total_cash += account.cash();
            for view in by_account.get(&account.account_id).into_iter().flatten() {
                totals.total_invested_assets += view.asset.total_invested;
                totals.current_value_of_assets += view.metrics.current_value;
                holdings.push(Holding {
                    view: view.clone(),
                    account_name: account.account_name.clone(),
                    account_type: account.account_type.clone(),
                    user_name: account.user_name.clone(),
                    platform_name: account.platform_name.clone(),
                });
            }
        }
        totals.total_invested_assets_plus_cash = totals.total_invested_assets + totals.total_cash;
        totals.profit_loss_amount = totals.current_value_of_assets - totals.total_invested_assets;
        totals.profit_loss_percent =
            percent_of(totals.profit_loss_amount, totals.total_invested_assets);
        totals.overall_portfolio_value = totals.current_value_of_assets + totals.total_cash;

        let mut ranked_assets: Vec<Holding> = holdings
            .into_iter()
            .filter(|h| h.view.asset.total_invested > 0.0)
            .collect();
        ranked_assets.sort_by(|a, b| {
            b.view
                .metrics
                .profit_loss_percent
                .total_cmp(&a.view.metrics.profit_loss_percent)
        });

        let mut performance = Vec::new();
        let breakdown: Vec<UserSummary> = users
            .iter()
            .map(|user| summarize_user(user, accounts, &mut by_account, &mut performance))
            .collect();

        let mut type_values: Vec<(String, f64)> = Vec::new();
        for account in breakdown
            .iter()
            .flat_map(|u| &u.platforms)
            .flat_map(|p| &p.accounts)
        {
            let value = account.current_value_of_assets + account.cash_balance;
            match type_values.iter_mut().find(|(t, _)| *t == account.account_type) {
                Some((_, total)) => *total += value,
                None => type_values.push((account.account_type.clone(), value)),
            }
        }

        let account_type_allocation = positive_slices(type_values);
        let user_allocation = positive_slices(
            breakdown
                .iter()
                .map(|u| (u.user_name.clone(), u.current_value_of_assets + u.total_cash)),
        );
        let account_allocation = positive_slices(
            performance
                .iter()
                .map(|a| (a.display_name.clone(), a.total_value)),
        );

        let mut ranked_accounts: Vec<AccountPerformance> = performance
            .into_iter()
            .filter(|a| a.total_invested > 0.0)
            .collect();
        ranked_accounts.sort_by(|a, b| b.profit_loss_percent.total_cmp(&a.profit_loss_percent));

        Self {
            totals,
            ranked_assets,
            breakdown,
            account_type_allocation,
            user_allocation,
            account_allocation,
            ranked_accounts,
        }
    }

    pub fn best_asset(&self) -> Option<&Holding> {
        self.ranked_assets.first()
    }

    pub fn worst_asset(&self) -> Option<&Holding> {
        self.ranked_assets.last()
    }
}

fn summarize_user(
    user: &users::Model,
    accounts: &[AccountListing],
    by_account: &mut HashMap<i32, Vec<AssetView>>,
    performance: &mut Vec<AccountPerformance>,
) -> UserSummary {
    let mut platforms: Vec<PlatformSummary> = Vec::new();

    for account in accounts.iter().filter(|a| a.user_id == user.user_id) {
        let assets = by_account.remove(&account.account_id).unwrap_or_default();
        let total_invested: f64 = assets.iter().map(|a| a.asset.total_invested).sum();
        let current_value: f64 = assets.iter().map(|a| a.metrics.current_value).sum();
        let profit_loss_amount = current_value - total_invested;
        let profit_loss_percent = percent_of(profit_loss_amount, total_invested);

        performance.push(AccountPerformance {
            account_id: account.account_id,
            user_name: user.name.clone(),
            platform_name: account.platform_name.clone(),
            account_name: account.account_name.clone(),
            display_name: format!(
                "{} - {} ({})",
                user.name, account.account_name, account.platform_name
            ),
            total_invested,
            current_value_of_assets: current_value,
            total_value: current_value + account.cash(),
            profit_loss_dollars: profit_loss_amount,
            profit_loss_percent,
        });

        let summary = AccountSummary {
            account_id: account.account_id,
            account_name: account.account_name.clone(),
            account_type: account.account_type.clone(),
            cash_balance: account.cash(),
            total_invested,
            current_value_of_assets: current_value,
            profit_loss_amount,
            profit_loss_percent,
            assets,
        };

        let platform = match platforms
            .iter_mut()
            .position(|p| p.platform_id == account.platform_id)
        {
            Some(index) => &mut platforms[index],
            None => {
                platforms.push(PlatformSummary {
                    platform_id: account.platform_id,
                    platform_name: account.platform_name.clone(),
                    total_invested: 0.0,
                    current_value_of_assets: 0.0,
                    total_cash: 0.0,
                    profit_loss_amount: 0.0,
                    profit_loss_percent: 0.0,
                    accounts: Vec::new(),
                });
                let last = platforms.len() - 1;
                &mut platforms[last]
            }
        };
        platform.total_invested += summary.total_invested;
        platform.current_value_of_assets += summary.current_value_of_assets;
        platform.total_cash += summary.cash_balance;
        platform.accounts.push(summary);
    }

    let mut user_summary = UserSummary {
        user_id: user.user_id,
        user_name: user.name.clone(),
        total_invested: 0.0,
        current_value_of_assets: 0.0,
        total_cash: 0.0,
        profit_loss_amount: 0.0,
        profit_loss_percent: 0.0,
        platforms: Vec::new(),
    };

    for mut platform in platforms {
        platform.profit_loss_amount = platform.current_value_of_assets - platform.total_invested;
        platform.profit_loss_percent =
            percent_of(platform.profit_loss_amount, platform.total_invested);
        user_summary.total_invested += platform.total_invested;
        user_summary.current_value_of_assets += platform.current_value_of_assets;
        user_summary.total_cash += platform.total_cash;
        user_summary.platforms.push(platform);
    }
    user_summary.profit_loss_amount =
        user_summary.current_value_of_assets - user_summary.total_invested;
    user_summary.profit_loss_percent =
        percent_of(user_summary.profit_loss_amount, user_summary.total_invested);

    user_summary
}

/// Zero and negative values never make it into a pie chart.
fn positive_slices(values: impl IntoIterator<Item = (String, f64)>) -> Vec<AllocationSlice> {
    values
        .into_iter()
        .filter(|(_, value)| *value > 0.0)
        .map(|(label, value)| AllocationSlice { label, value })
        .collect()
}
