use axum::extract::{Path, State};
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use axum_extra::extract::Form;
use serde::Deserialize;
use shared::validation::AssetDraft;
use shared::TrackerError;

use super::{flash_error, layout, redirect, render};
use crate::error::{user_facing, AppResult};
use crate::flash::{self, Flash, FlashLevel};
use crate::state::AppState;
use crate::templates::{BuyInputs, EditAssetTemplate, ManageAssetsTemplate};

/// Every form on the manage page posts here, told apart by `action`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ManageForm {
    action: String,
    ticker_symbol: String,
    asset_name: String,
    quantity: String,
    average_cost: String,
    total_invested: String,
    simulate_sell_asset_id: String,
    hypothetical_sale_price: String,
    simulate_buy_asset_id: String,
    buy_investment_amount: String,
    buy_shares_to_buy: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AssetForm {
    ticker_symbol: String,
    asset_name: String,
    quantity: String,
    average_cost: String,
    total_invested: String,
}

impl AssetForm {
    fn draft(&self) -> Result<AssetDraft, TrackerError> {
        AssetDraft::parse(
            &self.ticker_symbol,
            &self.asset_name,
            &self.quantity,
            &self.average_cost,
            &self.total_invested,
        )
    }
}

fn assets_page(account_id: i32) -> String {
    format!("/account/{}/assets", account_id)
}

/// Builds the manage page, or redirects to the account list when the
/// account does not exist.
async fn manage_page(
    state: &AppState,
    account_id: i32,
    jar: CookieJar,
) -> AppResult<Result<(CookieJar, ManageAssetsTemplate), Response>> {
    match state.asset_service.account_assets(account_id).await {
        Ok((account, assets)) => {
            let (jar, layout) = layout(jar);
            Ok(Ok((jar, ManageAssetsTemplate::new(layout, account, assets))))
        }
        Err(e) => Ok(Err(redirect(flash_error(jar, e)?, "/accounts")?)),
    }
}

pub async fn manage(
    State(state): State<AppState>,
    Path(account_id): Path<i32>,
    jar: CookieJar,
) -> AppResult<Response> {
    match manage_page(&state, account_id, jar).await? {
        Ok((jar, page)) => render(jar, page),
        Err(response) => Ok(response),
    }
}

pub async fn manage_action(
    State(state): State<AppState>,
    Path(account_id): Path<i32>,
    jar: CookieJar,
    Form(form): Form<ManageForm>,
) -> AppResult<Response> {
    match form.action.as_str() {
        "add_asset" => add_asset(&state, account_id, jar, form).await,
        "simulate_sell" => simulate_sell(&state, account_id, jar, form).await,
        "simulate_buy_existing_asset" => simulate_buy(&state, account_id, jar, form).await,
        other => {
            let jar = flash::error(jar, format!("Unknown action '{}'.", other));
            redirect(jar, &assets_page(account_id))
        }
    }
}

async fn add_asset(
    state: &AppState,
    account_id: i32,
    jar: CookieJar,
    form: ManageForm,
) -> AppResult<Response> {
    let draft = AssetDraft::parse(
        &form.ticker_symbol,
        &form.asset_name,
        &form.quantity,
        &form.average_cost,
        &form.total_invested,
    );
    let added = match draft {
        Ok(draft) => state.asset_service.add_asset(account_id, &draft).await,
        Err(e) => Err(e),
    };
    let jar = match added {
        Ok(added) => {
            let ticker = &added.asset.ticker_symbol;
            let jar = if added.market_data_fetched {
                jar
            } else {
                flash::warning(
                    jar,
                    format!(
                        "Could not fetch market data for {}. Prices will be blank. Please refresh later.",
                        ticker
                    ),
                )
            };
            flash::success(
                jar,
                format!("Asset '{}' added. Market data fetched if available.", ticker),
            )
        }
        Err(e) => flash_error(jar, e)?,
    };
    redirect(jar, &assets_page(account_id))
}

/// Calculator results render in place instead of redirecting so the
/// result and its inputs stay on screen.
async fn simulate_sell(
    state: &AppState,
    account_id: i32,
    jar: CookieJar,
    form: ManageForm,
) -> AppResult<Response> {
    let (jar, mut page) = match manage_page(state, account_id, jar).await? {
        Ok(found) => found,
        Err(response) => return Ok(response),
    };
    match state
        .asset_service
        .simulate_sell(
            account_id,
            &form.simulate_sell_asset_id,
            &form.hypothetical_sale_price,
        )
        .await
    {
        Ok(sim) => {
            page.sell = Some(sim);
            page.layout
                .flashes
                .push(Flash::new(FlashLevel::Info, "Sell simulation calculated."));
        }
        Err(e) => page.layout.flashes.push(Flash::from_error(&user_facing(e)?)),
    }
    render(jar, page)
}

async fn simulate_buy(
    state: &AppState,
    account_id: i32,
    jar: CookieJar,
    form: ManageForm,
) -> AppResult<Response> {
    let (jar, mut page) = match manage_page(state, account_id, jar).await? {
        Ok(found) => found,
        Err(response) => return Ok(response),
    };
    page.buy_inputs = BuyInputs {
        asset_id: form.simulate_buy_asset_id.trim().parse().ok(),
        investment_amount: form.buy_investment_amount.clone(),
        shares_to_buy: form.buy_shares_to_buy.clone(),
    };
    match state
        .asset_service
        .simulate_buy(
            account_id,
            &form.simulate_buy_asset_id,
            &form.buy_investment_amount,
            &form.buy_shares_to_buy,
        )
        .await
    {
        Ok(sim) => {
            page.buy = Some(sim);
            page.layout
                .flashes
                .push(Flash::new(FlashLevel::Info, "Buy simulation calculated."));
        }
        Err(e) => page.layout.flashes.push(Flash::from_error(&user_facing(e)?)),
    }
    render(jar, page)
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path(asset_id): Path<i32>,
    jar: CookieJar,
) -> AppResult<Response> {
    match state.asset_service.get_asset(asset_id).await {
        Ok(asset) => {
            let (jar, layout) = layout(jar);
            render(jar, EditAssetTemplate { layout, asset })
        }
        Err(e) => redirect(flash_error(jar, e)?, "/accounts"),
    }
}

pub async fn update(
    State(state): State<AppState>,
    Path(asset_id): Path<i32>,
    jar: CookieJar,
    Form(form): Form<AssetForm>,
) -> AppResult<Response> {
    let existing = match state.asset_service.get_asset(asset_id).await {
        Ok(asset) => asset,
        Err(e) => return redirect(flash_error(jar, e)?, "/accounts"),
    };
    let back = assets_page(existing.account_id);

    let updated = match form.draft() {
        Ok(draft) => state.asset_service.update_asset(asset_id, &draft).await,
        Err(e) => Err(e),
    };
    match updated {
        Ok(updated) => {
            let jar = flash::success(jar, "Asset manual details updated successfully!");
            let jar = if updated.market_data_cleared {
                flash::info(
                    jar,
                    "Ticker symbol changed. Market data has been cleared. Please refresh data for new ticker.",
                )
            } else {
                jar
            };
            redirect(jar, &back)
        }
        Err(e @ TrackerError::NoChanges(_)) => redirect(flash_error(jar, e)?, &back),
        Err(e) => redirect(flash_error(jar, e)?, &format!("/asset/{}/edit", asset_id)),
    }
}

pub async fn delete(
    State(state): State<AppState>,
    Path(asset_id): Path<i32>,
    jar: CookieJar,
) -> AppResult<Response> {
    match state.asset_service.delete_asset(asset_id).await {
        Ok(asset) => {
            let jar = flash::success(
                jar,
                format!("Asset '{}' deleted successfully!", asset.ticker_symbol),
            );
            redirect(jar, &assets_page(asset.account_id))
        }
        Err(e) => redirect(flash_error(jar, e)?, "/accounts"),
    }
}

pub async fn refresh(
    State(state): State<AppState>,
    Path(asset_id): Path<i32>,
    jar: CookieJar,
) -> AppResult<Response> {
    match state.refresh_service.refresh_asset(asset_id).await {
        Ok(outcome) => {
            let ticker = &outcome.asset.ticker_symbol;
            let jar = if outcome.refreshed {
                flash::success(
                    jar,
                    format!("Market data for '{}' refreshed successfully!", ticker),
                )
            } else {
                flash::warning(
                    jar,
                    format!(
                        "Could not fetch new market data for '{}'. Previous data retained if any.",
                        ticker
                    ),
                )
            };
            redirect(jar, &assets_page(outcome.asset.account_id))
        }
        Err(e) => redirect(flash_error(jar, e)?, "/accounts"),
    }
}
