use sea_orm::prelude::DatabaseConnection;
use std::sync::Arc;
use tracing::{info, warn};

use crate::entity::assets;
use crate::error::{TrackerError, TrackerResult};
use crate::market_data::MarketDataProvider;
use crate::repositories::{
    asset_repository::AssetRepository,
    settings_repository::{SettingsRepository, EXCHANGE_RATE_KEY},
};

#[derive(Debug, Clone)]
pub struct AssetRefresh {
    pub asset: assets::Model,
    /// False when the provider failed and the stored fields were kept.
    pub refreshed: bool,
}

/// Outcome of refreshing every distinct ticker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshReport {
    pub attempted: usize,
    pub updated: usize,
    /// Sorted, no duplicates.
    pub failed: Vec<String>,
    /// The new rate, or `None` when it could not be fetched.
    pub exchange_rate: Option<f64>,
}

impl RefreshReport {
    pub fn has_assets(&self) -> bool {
        self.attempted > 0
    }
}

pub struct RefreshService {
    assets: AssetRepository,
    settings: SettingsRepository,
    provider: Arc<dyn MarketDataProvider>,
    exchange_rate_symbol: String,
}

impl RefreshService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        provider: Arc<dyn MarketDataProvider>,
        exchange_rate_symbol: impl Into<String>,
    ) -> Self {
        Self {
            assets: AssetRepository::new(db.clone()),
            settings: SettingsRepository::new(db),
            provider,
            exchange_rate_symbol: exchange_rate_symbol.into(),
        }
    }

    pub async fn refresh_asset(&self, asset_id: i32) -> TrackerResult<AssetRefresh> {
        let asset = self
            .assets
            .find_by_id(asset_id)
            .await?
            .ok_or_else(|| TrackerError::not_found("Asset not found."))?;

        match self.provider.fetch_quote(&asset.ticker_symbol).await {
            Ok(quote) => {
                let asset = self.assets.apply_quote(&asset, &quote).await?;
                info!("Refreshed market data for {}", asset.ticker_symbol);
                Ok(AssetRefresh {
                    asset,
                    refreshed: true,
                })
            }
            Err(e) => {
                warn!("Refresh of {} failed: {}", asset.ticker_symbol, e);
                Ok(AssetRefresh {
                    asset,
                    refreshed: false,
                })
            }
        }
    }

    /// One provider call per distinct ticker, applied to every asset holding
    /// it, then the exchange rate. Nothing is fetched when there are no assets.
    pub async fn refresh_all(&self) -> TrackerResult<RefreshReport> {
        let tickers = self.assets.distinct_tickers().await?;
        if tickers.is_empty() {
            return Ok(RefreshReport::default());
        }

        let mut report = RefreshReport {
            attempted: tickers.len(),
            ..Default::default()
        };

        for ticker in &tickers {
            let quote = match self.provider.fetch_quote(ticker).await {
                Ok(quote) => quote,
                Err(e) => {
                    warn!("Failed to fetch data for {}: {}", ticker, e);
                    report.failed.push(ticker.clone());
                    continue;
                }
            };
            for asset in self.assets.list_by_ticker(ticker).await? {
                self.assets.apply_quote(&asset, &quote).await?;
            }
            report.updated += 1;
        }
        report.failed.sort();
        report.failed.dedup();

        match self
            .provider
            .fetch_exchange_rate(&self.exchange_rate_symbol)
            .await
        {
            Ok(rate) => {
                self.settings
                    .set(EXCHANGE_RATE_KEY, &rate.to_string())
                    .await?;
                report.exchange_rate = Some(rate);
            }
            Err(e) => warn!("Could not refresh exchange rate: {}", e),
        }

        info!(
            "Refresh complete: {} tickers, {} updated, {} failed",
            report.attempted,
            report.updated,
            report.failed.len()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{account_repository::AccountRepository, asset_repository::AssetRepository};
    use crate::services::platform_service::PlatformService;
    use crate::services::testing::{test_db, StubProvider};
    use crate::services::user_service::UserService;
    use crate::validation::{AccountDraft, AssetDraft};

    /// Two accounts both holding VFV, one holding a ticker the provider
    /// does not know.
    async fn seed(db: Arc<DatabaseConnection>) -> Vec<assets::Model> {
        let user = UserService::new(db.clone()).create_user("Alice").await.unwrap();
        let platform = PlatformService::new(db.clone())
            .create_platform("Questrade")
            .await
            .unwrap();
        let accounts = AccountRepository::new(db.clone());
        let assets = AssetRepository::new(db.clone());
        let mut created = Vec::new();
        for (name, tickers) in [("TFSA", ["VFV", "DEAD"]), ("RRSP", ["VFV", "XEQT"])] {
            let account = accounts
                .create(&AccountDraft {
                    user_id: user.user_id,
                    platform_id: platform.platform_id,
                    account_type: name.into(),
                    account_name: name.into(),
                    cash_balance: 0.0,
                })
                .await
                .unwrap();
            for ticker in tickers {
                let draft = AssetDraft::parse(ticker, "", "1", "1", "1").unwrap();
                created.push(assets.create(account.account_id, &draft, None).await.unwrap());
            }
        }
        created
    }

    #[tokio::test]
    async fn test_refresh_asset_success_keeps_existing_name() {
        let db = test_db().await;
        let seeded = seed(db.clone()).await;
        let assets = AssetRepository::new(db.clone());
        let named = AssetDraft::parse("VFV", "Mine", "1", "1", "1").unwrap();
        let vfv = assets.update_details(&seeded[0], &named).await.unwrap();

        let provider = StubProvider::default().with_quote("VFV", 100.0, Some("Vanguard"));
        let service = RefreshService::new(db, Arc::new(provider), "CAD=X");

        let outcome = service.refresh_asset(vfv.asset_id).await.unwrap();
        assert!(outcome.refreshed);
        assert_eq!(outcome.asset.current_price, Some(100.0));
        assert_eq!(outcome.asset.name.as_deref(), Some("Mine"));
    }

    #[tokio::test]
    async fn test_refresh_asset_failure_leaves_fields() {
        let db = test_db().await;
        let seeded = seed(db.clone()).await;
        let assets = AssetRepository::new(db.clone());
        let quote = crate::market_data::Quote {
            current_price: Some(5.0),
            ..Default::default()
        };
        let dead = assets.apply_quote(&seeded[1], &quote).await.unwrap();

        let service = RefreshService::new(db, Arc::new(StubProvider::default()), "CAD=X");
        let outcome = service.refresh_asset(dead.asset_id).await.unwrap();
        assert!(!outcome.refreshed);
        assert_eq!(outcome.asset.current_price, Some(5.0));

        assert!(matches!(
            service.refresh_asset(999).await.unwrap_err(),
            TrackerError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_refresh_all() {
        let db = test_db().await;
        seed(db.clone()).await;
        let provider = Arc::new(
            StubProvider::default()
                .with_quote("VFV", 100.0, Some("Vanguard S&P 500"))
                .with_quote("XEQT", 30.0, None)
                .with_rate(1.3712),
        );
        let service = RefreshService::new(db.clone(), provider.clone(), "CAD=X");

        let report = service.refresh_all().await.unwrap();
        assert_eq!(report.attempted, 3);
        assert_eq!(report.updated, 2);
        assert_eq!(report.failed, vec!["DEAD".to_string()]);
        assert_eq!(report.exchange_rate, Some(1.3712));

        let quote_calls = provider
            .calls()
            .iter()
            .filter(|c| c.as_str() == "quote:VFV")
            .count();
        assert_eq!(quote_calls, 1);

        let vfv = AssetRepository::new(db.clone()).list_by_ticker("VFV").await.unwrap();
        assert_eq!(vfv.len(), 2);
        assert!(vfv.iter().all(|a| a.current_price == Some(100.0)));
        assert!(vfv.iter().all(|a| a.name.as_deref() == Some("Vanguard S&P 500")));

        let rate = SettingsRepository::new(db).get(EXCHANGE_RATE_KEY).await.unwrap();
        assert_eq!(rate.as_deref(), Some("1.3712"));
    }

    #[tokio::test]
    async fn test_refresh_all_without_assets_fetches_nothing() {
        let provider = Arc::new(StubProvider::default().with_rate(1.4));
        let service = RefreshService::new(test_db().await, provider.clone(), "CAD=X");

        let report = service.refresh_all().await.unwrap();
        assert!(!report.has_assets());
        assert_eq!(report.exchange_rate, None);
        assert!(provider.calls().is_empty());
    }
}
