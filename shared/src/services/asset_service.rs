use sea_orm::prelude::DatabaseConnection;
use std::sync::Arc;
use tracing::{info, warn};

use crate::calculators::{BuyOrder, BuySimulation, SellSimulation};
use crate::entity::assets;
use crate::error::{TrackerError, TrackerResult};
use crate::market_data::MarketDataProvider;
use crate::metrics::AssetView;
use crate::repositories::{
    account_repository::{AccountListing, AccountRepository},
    asset_repository::AssetRepository,
};
use crate::validation::{non_empty, parse_number, AssetDraft};

/// Result of adding an asset. `market_data_fetched` is false when the
/// provider failed and the prices were left blank.
#[derive(Debug, Clone)]
pub struct AddedAsset {
    pub asset: assets::Model,
    pub market_data_fetched: bool,
}

#[derive(Debug, Clone)]
pub struct UpdatedAsset {
    pub asset: assets::Model,
    /// The ticker changed, so the cached prices were dropped.
    pub market_data_cleared: bool,
}

pub struct AssetService {
    repo: AssetRepository,
    accounts: AccountRepository,
    provider: Arc<dyn MarketDataProvider>,
}

impl AssetService {
    pub fn new(db: Arc<DatabaseConnection>, provider: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            repo: AssetRepository::new(db.clone()),
            accounts: AccountRepository::new(db),
            provider,
        }
    }

    /// The account header and its holdings, ordered by ticker.
    pub async fn account_assets(
        &self,
        account_id: i32,
    ) -> TrackerResult<(AccountListing, Vec<AssetView>)> {
        let account = self.accounts.find_listing(account_id).await?.ok_or_else(|| {
            TrackerError::not_found(format!("Account with ID {} not found.", account_id))
        })?;
        let assets = self
            .repo
            .list_for_account(account_id)
            .await?
            .into_iter()
            .map(AssetView::from)
            .collect();
        Ok((account, assets))
    }

    pub async fn get_asset(&self, asset_id: i32) -> TrackerResult<assets::Model> {
        self.repo
            .find_by_id(asset_id)
            .await?
            .ok_or_else(|| TrackerError::not_found("Asset not found."))
    }

    pub async fn add_asset(&self, account_id: i32, draft: &AssetDraft) -> TrackerResult<AddedAsset> {
        if self.accounts.find_by_id(account_id).await?.is_none() {
            return Err(TrackerError::not_found(format!(
                "Account with ID {} not found.",
                account_id
            )));
        }
        if self
            .repo
            .find_in_account(account_id, &draft.ticker_symbol, None)
            .await?
            .is_some()
        {
            return Err(TrackerError::conflict(format!(
                "Asset '{}' already exists in this account. Use 'Edit' to modify.",
                draft.ticker_symbol
            )));
        }

        let quote = match self.provider.fetch_quote(&draft.ticker_symbol).await {
            Ok(quote) => Some(quote),
            Err(e) => {
                warn!("Could not fetch market data for {}: {}", draft.ticker_symbol, e);
                None
            }
        };

        let asset = self.repo.create(account_id, draft, quote.as_ref()).await?;
        info!(
            "Added asset {} ({}) to account {}",
            asset.ticker_symbol, asset.asset_id, account_id
        );
        Ok(AddedAsset {
            asset,
            market_data_fetched: quote.is_some(),
        })
    }

    pub async fn update_asset(
        &self,
        asset_id: i32,
        draft: &AssetDraft,
    ) -> TrackerResult<UpdatedAsset> {
        let existing = self.get_asset(asset_id).await?;
        let ticker_changed = draft.ticker_symbol != existing.ticker_symbol;

        if ticker_changed
            && self
                .repo
                .find_in_account(existing.account_id, &draft.ticker_symbol, Some(asset_id))
                .await?
                .is_some()
        {
            return Err(TrackerError::conflict(format!(
                "Another asset with ticker '{}' already exists in this account.",
                draft.ticker_symbol
            )));
        }

        let name_changed = draft
            .name
            .as_ref()
            .is_some_and(|name| Some(name) != existing.name.as_ref());
        let unchanged = !ticker_changed
            && !name_changed
            && draft.quantity == existing.quantity
            && draft.average_cost == existing.average_cost
            && draft.total_invested == existing.total_invested;
        if unchanged {
            return Err(TrackerError::no_changes(
                "No changes detected for the manually entered asset details.",
            ));
        }

        let asset = self.repo.update_details(&existing, draft).await?;
        if ticker_changed {
            info!(
                "Ticker changed {} -> {}, market data cleared",
                existing.ticker_symbol, asset.ticker_symbol
            );
        }
        Ok(UpdatedAsset {
            asset,
            market_data_cleared: ticker_changed,
        })
    }

    pub async fn delete_asset(&self, asset_id: i32) -> TrackerResult<assets::Model> {
        let asset = self
            .repo
            .find_by_id(asset_id)
            .await?
            .ok_or_else(|| TrackerError::not_found("Asset not found or already deleted."))?;
        if self.repo.delete(asset_id).await? == 0 {
            return Err(TrackerError::not_found(format!(
                "Asset '{}' not found or already deleted.",
                asset.ticker_symbol
            )));
        }
        info!("Deleted asset {} ({})", asset.ticker_symbol, asset.asset_id);
        Ok(asset)
    }

    /// Looks up an asset by the raw id posted from a calculator form,
    /// restricted to the account being viewed.
    async fn asset_in_account(
        &self,
        account_id: i32,
        raw_asset_id: &str,
        not_found: &str,
    ) -> TrackerResult<assets::Model> {
        let asset_id: i32 = raw_asset_id
            .trim()
            .parse()
            .map_err(|_| TrackerError::validation("Invalid asset ID."))?;
        self.repo
            .find_by_id(asset_id)
            .await?
            .filter(|asset| asset.account_id == account_id)
            .ok_or_else(|| TrackerError::not_found(not_found))
    }

    pub async fn simulate_sell(
        &self,
        account_id: i32,
        raw_asset_id: &str,
        raw_sale_price: &str,
    ) -> TrackerResult<SellSimulation> {
        if non_empty(raw_asset_id).is_none() || non_empty(raw_sale_price).is_none() {
            return Err(TrackerError::validation(
                "Asset ID and hypothetical sale price are required for simulation.",
            ));
        }
        let sale_price = parse_number(raw_sale_price).ok_or_else(|| {
            TrackerError::validation("Invalid number for asset ID or hypothetical sale price.")
        })?;
        let asset = self
            .asset_in_account(account_id, raw_asset_id, "Asset for simulation not found.")
            .await?;
        SellSimulation::compute(&asset, sale_price)
    }

    pub async fn simulate_buy(
        &self,
        account_id: i32,
        raw_asset_id: &str,
        raw_amount: &str,
        raw_shares: &str,
    ) -> TrackerResult<BuySimulation> {
        if non_empty(raw_asset_id).is_none() {
            return Err(TrackerError::validation("Asset ID is missing for buy simulation."));
        }
        let order = BuyOrder::parse(raw_amount, raw_shares)?;
        let asset = self
            .asset_in_account(account_id, raw_asset_id, "Asset to simulate buy for not found.")
            .await?;
        BuySimulation::compute(&asset, order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::account_repository::AccountRepository;
    use crate::services::platform_service::PlatformService;
    use crate::services::testing::{test_db, StubProvider};
    use crate::services::user_service::UserService;
    use crate::validation::AccountDraft;

    async fn setup(provider: StubProvider) -> (AssetService, i32) {
        let db = test_db().await;
        let user = UserService::new(db.clone()).create_user("Alice").await.unwrap();
        let platform = PlatformService::new(db.clone())
            .create_platform("Questrade")
            .await
            .unwrap();
        let account = AccountRepository::new(db.clone())
            .create(&AccountDraft {
                user_id: user.user_id,
                platform_id: platform.platform_id,
                account_type: "TFSA".into(),
                account_name: "Main".into(),
                cash_balance: 0.0,
            })
            .await
            .unwrap();
        (
            AssetService::new(db, Arc::new(provider)),
            account.account_id,
        )
    }

    fn draft(ticker: &str, name: &str, quantity: &str) -> AssetDraft {
        AssetDraft::parse(ticker, name, quantity, "10", "100").unwrap()
    }

    #[tokio::test]
    async fn test_add_asset_fetches_market_data() {
        let provider = StubProvider::default().with_quote("XEQT", 30.0, Some("iShares Core Equity"));
        let (service, account_id) = setup(provider).await;

        let added = service.add_asset(account_id, &draft("xeqt", "", "10")).await.unwrap();
        assert!(added.market_data_fetched);
        assert_eq!(added.asset.ticker_symbol, "XEQT");
        assert_eq!(added.asset.name.as_deref(), Some("iShares Core Equity"));
        assert_eq!(added.asset.current_price, Some(30.0));
        assert_eq!(added.asset.price_yesterday, Some(29.0));
        assert_eq!(added.asset.fifty_two_week_high, Some(60.0));
    }

    #[tokio::test]
    async fn test_add_asset_manual_name_wins() {
        let provider = StubProvider::default().with_quote("XEQT", 30.0, Some("Provider Name"));
        let (service, account_id) = setup(provider).await;

        let added = service
            .add_asset(account_id, &draft("XEQT", "My ETF", "10"))
            .await
            .unwrap();
        assert_eq!(added.asset.name.as_deref(), Some("My ETF"));
    }

    #[tokio::test]
    async fn test_add_asset_without_market_data() {
        let (service, account_id) = setup(StubProvider::default()).await;

        let added = service.add_asset(account_id, &draft("NOPE", "", "1")).await.unwrap();
        assert!(!added.market_data_fetched);
        assert_eq!(added.asset.current_price, None);
        assert_eq!(added.asset.name, None);

        let dup = service.add_asset(account_id, &draft("NOPE", "", "2")).await.unwrap_err();
        assert_eq!(
            dup.to_string(),
            "Asset 'NOPE' already exists in this account. Use 'Edit' to modify."
        );

        let missing = service.add_asset(999, &draft("NOPE", "", "2")).await.unwrap_err();
        assert!(matches!(missing, TrackerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_account_assets_sorted_with_metrics() {
        let provider = StubProvider::default()
            .with_quote("VFV", 20.0, None)
            .with_quote("AAPL", 5.0, None);
        let (service, account_id) = setup(provider).await;
        service.add_asset(account_id, &draft("VFV", "", "10")).await.unwrap();
        service.add_asset(account_id, &draft("AAPL", "", "10")).await.unwrap();

        let (account, assets) = service.account_assets(account_id).await.unwrap();
        assert_eq!(account.account_name, "Main");
        assert_eq!(account.user_name, "Alice");
        let tickers: Vec<&str> = assets.iter().map(|a| a.asset.ticker_symbol.as_str()).collect();
        assert_eq!(tickers, vec!["AAPL", "VFV"]);
        assert_eq!(assets[1].metrics.current_value, 200.0);
        assert_eq!(assets[1].metrics.profit_loss_dollars, 100.0);
    }

    #[tokio::test]
    async fn test_update_asset() {
        let provider = StubProvider::default()
            .with_quote("VFV", 20.0, Some("Vanguard S&P 500"))
            .with_quote("XEQT", 30.0, None);
        let (service, account_id) = setup(provider).await;
        let vfv = service.add_asset(account_id, &draft("VFV", "", "10")).await.unwrap().asset;
        service.add_asset(account_id, &draft("XEQT", "", "10")).await.unwrap();

        let unchanged = service
            .update_asset(vfv.asset_id, &draft("VFV", "", "10"))
            .await
            .unwrap_err();
        assert!(matches!(unchanged, TrackerError::NoChanges(_)));

        let clash = service
            .update_asset(vfv.asset_id, &draft("XEQT", "", "10"))
            .await
            .unwrap_err();
        assert_eq!(
            clash.to_string(),
            "Another asset with ticker 'XEQT' already exists in this account."
        );

        let qty = service
            .update_asset(vfv.asset_id, &draft("VFV", "", "12"))
            .await
            .unwrap();
        assert!(!qty.market_data_cleared);
        assert_eq!(qty.asset.quantity, 12.0);
        assert_eq!(qty.asset.current_price, Some(20.0));
        assert_eq!(qty.asset.name.as_deref(), Some("Vanguard S&P 500"));

        let renamed = service
            .update_asset(vfv.asset_id, &draft("VOO", "", "12"))
            .await
            .unwrap();
        assert!(renamed.market_data_cleared);
        assert_eq!(renamed.asset.ticker_symbol, "VOO");
        assert_eq!(renamed.asset.current_price, None);
        assert_eq!(renamed.asset.price_yesterday, None);
        assert_eq!(renamed.asset.fifty_two_week_high, None);
        assert_eq!(renamed.asset.fifty_two_week_low, None);
    }

    #[tokio::test]
    async fn test_blank_name_keeps_stored_name() {
        let (service, account_id) = setup(StubProvider::default()).await;
        let asset = service
            .add_asset(account_id, &draft("VFV", "My S&P fund", "10"))
            .await
            .unwrap()
            .asset;

        let blank = service
            .update_asset(asset.asset_id, &draft("VFV", "  ", "10"))
            .await
            .unwrap_err();
        assert!(matches!(blank, TrackerError::NoChanges(_)));
        let stored = service.get_asset(asset.asset_id).await.unwrap();
        assert_eq!(stored.name.as_deref(), Some("My S&P fund"));

        let blank_with_qty = service
            .update_asset(asset.asset_id, &draft("VFV", "", "11"))
            .await
            .unwrap();
        assert_eq!(blank_with_qty.asset.name.as_deref(), Some("My S&P fund"));
    }

    #[tokio::test]
    async fn test_delete_asset() {
        let (service, account_id) = setup(StubProvider::default()).await;
        let asset = service.add_asset(account_id, &draft("VFV", "", "1")).await.unwrap().asset;

        assert_eq!(service.delete_asset(asset.asset_id).await.unwrap().ticker_symbol, "VFV");
        assert_eq!(
            service.delete_asset(asset.asset_id).await.unwrap_err().to_string(),
            "Asset not found or already deleted."
        );
    }

    #[tokio::test]
    async fn test_simulations() {
        let provider = StubProvider::default().with_quote("VFV", 20.0, None);
        let (service, account_id) = setup(provider).await;
        let vfv = service.add_asset(account_id, &draft("VFV", "", "10")).await.unwrap().asset;
        let id = vfv.asset_id.to_string();

        let sell = service.simulate_sell(account_id, &id, "15").await.unwrap();
        assert_eq!(sell.total_proceeds, 150.0);
        assert_eq!(sell.profit_dollars, 50.0);

        let buy = service.simulate_buy(account_id, &id, "", "5").await.unwrap();
        assert_eq!(buy.cost_of_purchase, 100.0);
        assert_eq!(buy.new_total_quantity, 15.0);

        assert_eq!(
            service.simulate_sell(account_id, &id, "").await.unwrap_err().to_string(),
            "Asset ID and hypothetical sale price are required for simulation."
        );
        assert_eq!(
            service.simulate_sell(account_id + 1, &id, "1").await.unwrap_err().to_string(),
            "Asset for simulation not found."
        );
        assert_eq!(
            service.simulate_buy(account_id, "", "1", "").await.unwrap_err().to_string(),
            "Asset ID is missing for buy simulation."
        );
    }
}
