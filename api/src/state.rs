use sea_orm::DatabaseConnection;
use shared::market_data::MarketDataProvider;
use shared::services::{
    account_service::AccountService, asset_service::AssetService,
    dashboard_service::DashboardService, history_service::HistoryService,
    platform_service::PlatformService, refresh_service::RefreshService,
    user_service::UserService,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub platform_service: Arc<PlatformService>,
    pub account_service: Arc<AccountService>,
    pub asset_service: Arc<AssetService>,
    pub refresh_service: Arc<RefreshService>,
    pub dashboard_service: Arc<DashboardService>,
    pub history_service: Arc<HistoryService>,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        provider: Arc<dyn MarketDataProvider>,
        exchange_rate_symbol: &str,
    ) -> Self {
        Self {
            user_service: Arc::new(UserService::new(db.clone())),
            platform_service: Arc::new(PlatformService::new(db.clone())),
            account_service: Arc::new(AccountService::new(db.clone())),
            asset_service: Arc::new(AssetService::new(db.clone(), provider.clone())),
            refresh_service: Arc::new(RefreshService::new(
                db.clone(),
                provider.clone(),
                exchange_rate_symbol,
            )),
            dashboard_service: Arc::new(DashboardService::new(db.clone(), provider)),
            history_service: Arc::new(HistoryService::new(db)),
        }
    }
}
