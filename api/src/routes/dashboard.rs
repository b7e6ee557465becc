use axum::extract::State;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use axum_extra::extract::Form;
use chrono::Local;
use serde::Deserialize;

use super::{flash_error, layout, redirect, render};
use crate::error::AppResult;
use crate::filters;
use crate::flash;
use crate::state::AppState;
use crate::templates::DashboardTemplate;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DashboardForm {
    action: String,
    target_goal_value: String,
}

pub async fn show(State(state): State<AppState>, jar: CookieJar) -> AppResult<Response> {
    let (jar, layout) = layout(jar);
    let view = state
        .dashboard_service
        .overview(Local::now().date_naive())
        .await?;
    render(jar, DashboardTemplate::new(layout, view))
}

pub async fn submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<DashboardForm>,
) -> AppResult<Response> {
    let jar = match form.action.as_str() {
        "set_goal" => match state.dashboard_service.set_goal(&form.target_goal_value).await {
            Ok(goal) => flash::success(
                jar,
                format!("Target goal updated to {}.", filters::currency(goal)?),
            ),
            Err(e) => flash_error(jar, e)?,
        },
        other => flash::error(jar, format!("Unknown action '{}'.", other)),
    };
    redirect(jar, "/")
}

pub async fn refresh_all(State(state): State<AppState>, jar: CookieJar) -> AppResult<Response> {
    let report = state.refresh_service.refresh_all().await?;

    if !report.has_assets() {
        let jar = flash::info(jar, "No assets found in the database to refresh.");
        return redirect(jar, "/");
    }

    let jar = match report.exchange_rate {
        Some(rate) => flash::info(jar, format!("USD/CAD exchange rate updated to {:.4}.", rate)),
        None => flash::warning(jar, "Could not refresh USD/CAD exchange rate."),
    };
    let jar = if report.updated > 0 {
        flash::success(
            jar,
            format!(
                "Market data refresh attempted for {} unique tickers. Data updated for {} tickers.",
                report.attempted, report.updated
            ),
        )
    } else {
        jar
    };
    let jar = if report.failed.is_empty() {
        jar
    } else {
        flash::error(
            jar,
            format!(
                "Failed to fetch/update data for tickers: {}",
                report.failed.join(", ")
            ),
        )
    };
    redirect(jar, "/")
}
