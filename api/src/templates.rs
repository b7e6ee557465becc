use askama::Template;
use serde::Serialize;
use shared::calculators::{BuySimulation, SellSimulation};
use shared::dashboard::AllocationSlice;
use shared::entity::{accounts, assets, platforms, portfolio_history, users};
use shared::market_data::ChartPoint;
use shared::metrics::AssetView;
use shared::repositories::account_repository::AccountListing;
use shared::services::dashboard_service::DashboardView;

use crate::filters;
use crate::flash::Flash;

pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")");

/// Shared by every page: pending messages and the footer version.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub flashes: Vec<Flash>,
    pub version: &'static str,
}

impl Layout {
    pub fn new(flashes: Vec<Flash>) -> Self {
        Self {
            flashes,
            version: VERSION,
        }
    }
}

/// JSON that is safe to inline in a `<script>` element.
pub fn script_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

#[derive(Debug, Serialize)]
struct HistoryPoint {
    date: String,
    value: f64,
}

/// Everything the dashboard charts draw, serialized once per request.
#[derive(Debug, Serialize)]
pub struct DashboardCharts<'a> {
    history: Vec<HistoryPoint>,
    target_goal: f64,
    account_types: &'a [AllocationSlice],
    users: &'a [AllocationSlice],
    accounts: &'a [AllocationSlice],
    best_yearly: &'a [ChartPoint],
    worst_yearly: &'a [ChartPoint],
}

impl<'a> DashboardCharts<'a> {
    pub fn new(view: &'a DashboardView) -> Self {
        Self {
            history: view
                .history
                .iter()
                .map(|h| HistoryPoint {
                    date: h.snapshot_date.format("%Y-%m-%d").to_string(),
                    value: h.total_portfolio_value,
                })
                .collect(),
            target_goal: view.target_goal,
            account_types: &view.portfolio.account_type_allocation,
            users: &view.portfolio.user_allocation,
            accounts: &view.portfolio.account_allocation,
            best_yearly: view
                .best
                .as_ref()
                .map(|s| s.yearly_chart.as_slice())
                .unwrap_or_default(),
            worst_yearly: view
                .worst
                .as_ref()
                .map(|s| s.yearly_chart.as_slice())
                .unwrap_or_default(),
        }
    }
}

#[derive(Template)]
#[template(path = "dashboard.html.jinja", escape = "html")]
pub struct DashboardTemplate {
    pub layout: Layout,
    pub view: DashboardView,
    pub charts_json: String,
    /// Share of the goal reached, capped at 100 for the progress bar.
    pub goal_progress: f64,
}

impl DashboardTemplate {
    pub fn new(layout: Layout, view: DashboardView) -> Self {
        let charts_json = script_json(&DashboardCharts::new(&view));
        let overall = view.portfolio.totals.overall_portfolio_value;
        let goal_progress = if view.target_goal > 0.0 {
            (overall / view.target_goal * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };
        Self {
            layout,
            view,
            charts_json,
            goal_progress,
        }
    }
}

#[derive(Template)]
#[template(path = "users.html.jinja", escape = "html")]
pub struct UsersTemplate {
    pub layout: Layout,
    pub users: Vec<users::Model>,
}

#[derive(Template)]
#[template(path = "edit_user.html.jinja", escape = "html")]
pub struct EditUserTemplate {
    pub layout: Layout,
    pub user: users::Model,
}

#[derive(Template)]
#[template(path = "platforms.html.jinja", escape = "html")]
pub struct PlatformsTemplate {
    pub layout: Layout,
    pub platforms: Vec<platforms::Model>,
}

#[derive(Template)]
#[template(path = "edit_platform.html.jinja", escape = "html")]
pub struct EditPlatformTemplate {
    pub layout: Layout,
    pub platform: platforms::Model,
}

#[derive(Template)]
#[template(path = "accounts.html.jinja", escape = "html")]
pub struct AccountsTemplate {
    pub layout: Layout,
    pub accounts: Vec<AccountListing>,
    pub users: Vec<users::Model>,
    pub platforms: Vec<platforms::Model>,
}

#[derive(Template)]
#[template(path = "edit_account.html.jinja", escape = "html")]
pub struct EditAccountTemplate {
    pub layout: Layout,
    pub account: accounts::Model,
    pub users: Vec<users::Model>,
    pub platforms: Vec<platforms::Model>,
}

/// Raw buy calculator inputs, echoed back into the form.
#[derive(Debug, Clone, Default)]
pub struct BuyInputs {
    pub asset_id: Option<i32>,
    pub investment_amount: String,
    pub shares_to_buy: String,
}

#[derive(Template)]
#[template(path = "manage_assets.html.jinja", escape = "html")]
pub struct ManageAssetsTemplate {
    pub layout: Layout,
    pub account: AccountListing,
    pub assets: Vec<AssetView>,
    pub total_invested: f64,
    pub total_value: f64,
    pub sell: Option<SellSimulation>,
    pub buy: Option<BuySimulation>,
    pub buy_inputs: BuyInputs,
}

impl ManageAssetsTemplate {
    pub fn new(layout: Layout, account: AccountListing, assets: Vec<AssetView>) -> Self {
        let total_invested = assets.iter().map(|a| a.asset.total_invested).sum();
        let total_value = assets.iter().map(|a| a.metrics.current_value).sum();
        Self {
            layout,
            account,
            assets,
            total_invested,
            total_value,
            sell: None,
            buy: None,
            buy_inputs: BuyInputs::default(),
        }
    }

    fn is_buy_target(&self, asset_id: &i32) -> bool {
        self.buy_inputs.asset_id == Some(*asset_id)
    }
}

#[derive(Template)]
#[template(path = "edit_asset.html.jinja", escape = "html")]
pub struct EditAssetTemplate {
    pub layout: Layout,
    pub asset: assets::Model,
}

#[derive(Template)]
#[template(path = "history.html.jinja", escape = "html")]
pub struct HistoryTemplate {
    pub layout: Layout,
    pub snapshots: Vec<portfolio_history::Model>,
    pub today: String,
}

#[derive(Template)]
#[template(path = "edit_history.html.jinja", escape = "html")]
pub struct EditHistoryTemplate {
    pub layout: Layout,
    pub snapshot: portfolio_history::Model,
}

#[derive(Template)]
#[template(path = "error.html.jinja", escape = "html")]
pub struct ErrorTemplate {
    pub layout: Layout,
    pub message: String,
}

impl ErrorTemplate {
    pub fn new(message: String) -> Self {
        Self {
            layout: Layout::new(Vec::new()),
            message,
        }
    }
}
