use chrono::NaiveDate;
use sea_orm::prelude::DatabaseConnection;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::dashboard::{Holding, Portfolio};
use crate::entity::portfolio_history;
use crate::error::TrackerResult;
use crate::market_data::{ChartPoint, MarketDataProvider};
use crate::repositories::{
    account_repository::AccountRepository,
    asset_repository::AssetRepository,
    history_repository::HistoryRepository,
    settings_repository::{SettingsRepository, EXCHANGE_RATE_KEY, TARGET_GOAL_KEY},
    user_repository::UserRepository,
};
use crate::validation::parse_amount;

pub const DEFAULT_TARGET_GOAL: f64 = 100_000.0;
pub const DEFAULT_EXCHANGE_RATE: f64 = 1.35;

/// Best or worst asset with its closing prices over the last year.
#[derive(Debug, Clone, Serialize)]
pub struct Spotlight {
    pub holding: Holding,
    pub yearly_chart: Vec<ChartPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub portfolio: Portfolio,
    pub target_goal: f64,
    pub usd_to_cad_exchange_rate: f64,
    /// Oldest first.
    pub history: Vec<portfolio_history::Model>,
    pub best: Option<Spotlight>,
    pub worst: Option<Spotlight>,
}

pub struct DashboardService {
    users: UserRepository,
    accounts: AccountRepository,
    assets: AssetRepository,
    settings: SettingsRepository,
    history: HistoryRepository,
    provider: Arc<dyn MarketDataProvider>,
}

impl DashboardService {
    pub fn new(db: Arc<DatabaseConnection>, provider: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            users: UserRepository::new(db.clone()),
            accounts: AccountRepository::new(db.clone()),
            assets: AssetRepository::new(db.clone()),
            settings: SettingsRepository::new(db.clone()),
            history: HistoryRepository::new(db),
            provider,
        }
    }

    /// Builds the dashboard and records `today`'s snapshot if there is none.
    pub async fn overview(&self, today: NaiveDate) -> TrackerResult<DashboardView> {
        let users = self.users.list_all().await?;
        let accounts = self.accounts.list_with_owners().await?;
        let assets = self.assets.list_all().await?;
        let portfolio = Portfolio::build(&users, &accounts, assets);

        let value = portfolio.totals.overall_portfolio_value;
        if self.history.insert_if_absent(today, value).await? {
            info!("Recorded portfolio value for {}: {:.2}", today, value);
        }
        let history = self.history.list_oldest_first().await?;

        let target_goal = self
            .settings
            .get_f64(TARGET_GOAL_KEY, DEFAULT_TARGET_GOAL)
            .await?;
        let usd_to_cad_exchange_rate = self
            .settings
            .get_f64(EXCHANGE_RATE_KEY, DEFAULT_EXCHANGE_RATE)
            .await?;

        let best = match portfolio.best_asset() {
            Some(holding) => Some(self.spotlight(holding).await),
            None => None,
        };
        let worst = match (portfolio.worst_asset(), &best) {
            (Some(holding), Some(best))
                if holding.view.asset.asset_id == best.holding.view.asset.asset_id =>
            {
                Some(best.clone())
            }
            (Some(holding), _) => Some(self.spotlight(holding).await),
            (None, _) => None,
        };

        Ok(DashboardView {
            portfolio,
            target_goal,
            usd_to_cad_exchange_rate,
            history,
            best,
            worst,
        })
    }

    async fn spotlight(&self, holding: &Holding) -> Spotlight {
        let ticker = &holding.view.asset.ticker_symbol;
        let yearly_chart = self
            .provider
            .fetch_yearly_history(ticker)
            .await
            .unwrap_or_else(|e| {
                warn!("No yearly history for {}: {}", ticker, e);
                Vec::new()
            });
        Spotlight {
            holding: holding.clone(),
            yearly_chart,
        }
    }

    pub async fn set_goal(&self, raw_goal: &str) -> TrackerResult<f64> {
        let goal = parse_amount(raw_goal, "Target goal value")?;
        self.settings.set(TARGET_GOAL_KEY, &goal.to_string()).await?;
        info!("Target goal set to {}", goal);
        Ok(goal)
    }
}
