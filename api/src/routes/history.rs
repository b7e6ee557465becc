use axum::extract::{Path, State};
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use axum_extra::extract::Form;
use chrono::Local;
use serde::Deserialize;
use shared::TrackerError;

use super::{flash_error, layout, redirect, render};
use crate::error::AppResult;
use crate::filters;
use crate::flash;
use crate::state::AppState;
use crate::templates::{EditHistoryTemplate, HistoryTemplate};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SnapshotForm {
    snapshot_date: String,
    total_portfolio_value: String,
}

pub async fn list(State(state): State<AppState>, jar: CookieJar) -> AppResult<Response> {
    let (jar, layout) = layout(jar);
    let snapshots = state.history_service.list_snapshots().await?;
    let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
    render(
        jar,
        HistoryTemplate {
            layout,
            snapshots,
            today,
        },
    )
}

pub async fn record(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SnapshotForm>,
) -> AppResult<Response> {
    let jar = match state
        .history_service
        .record_snapshot(&form.snapshot_date, &form.total_portfolio_value)
        .await
    {
        Ok((snapshot, replaced)) => {
            let value = filters::currency(snapshot.total_portfolio_value)?;
            let message = if replaced {
                format!("Snapshot for {} updated to {}.", snapshot.snapshot_date, value)
            } else {
                format!("Snapshot for {} recorded: {}.", snapshot.snapshot_date, value)
            };
            flash::success(jar, message)
        }
        Err(e) => flash_error(jar, e)?,
    };
    redirect(jar, "/history")
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path(date): Path<String>,
    jar: CookieJar,
) -> AppResult<Response> {
    match state.history_service.get_snapshot(&date).await {
        Ok(snapshot) => {
            let (jar, layout) = layout(jar);
            render(jar, EditHistoryTemplate { layout, snapshot })
        }
        Err(e) => redirect(flash_error(jar, e)?, "/history"),
    }
}

pub async fn update(
    State(state): State<AppState>,
    Path(date): Path<String>,
    jar: CookieJar,
    Form(form): Form<SnapshotForm>,
) -> AppResult<Response> {
    match state
        .history_service
        .update_snapshot(&date, &form.total_portfolio_value)
        .await
    {
        Ok(snapshot) => {
            let message = format!(
                "Snapshot for {} updated to {}.",
                snapshot.snapshot_date,
                filters::currency(snapshot.total_portfolio_value)?
            );
            redirect(flash::success(jar, message), "/history")
        }
        Err(e @ TrackerError::Validation(_)) => {
            redirect(flash_error(jar, e)?, &format!("/history/{}/edit", date))
        }
        Err(e) => redirect(flash_error(jar, e)?, "/history"),
    }
}

pub async fn delete(
    State(state): State<AppState>,
    Path(date): Path<String>,
    jar: CookieJar,
) -> AppResult<Response> {
    let jar = match state.history_service.delete_snapshot(&date).await {
        Ok(snapshot) => flash::success(
            jar,
            format!("Snapshot for {} deleted.", snapshot.snapshot_date),
        ),
        Err(e) => flash_error(jar, e)?,
    };
    redirect(jar, "/history")
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_record_edit_delete_snapshot() {
        let app = test_app().await;

        let recorded = post_form(
            &app,
            "/history",
            "snapshot_date=2025-01-31&total_portfolio_value=12000",
        )
        .await;
        let page = follow(&app, recorded).await;
        assert!(page.contains("Snapshot for 2025-01-31 recorded: $12,000.00."));

        let replaced = post_form(
            &app,
            "/history",
            "snapshot_date=2025-01-31&total_portfolio_value=12500",
        )
        .await;
        let page = follow(&app, replaced).await;
        assert!(page.contains("Snapshot for 2025-01-31 updated to $12,500.00."));

        let form = get(&app, "/history/2025-01-31/edit", None).await;
        assert_eq!(form.status(), StatusCode::OK);

        let invalid = post_form(&app, "/history/2025-01-31/edit", "total_portfolio_value=x").await;
        assert_eq!(location(&invalid), "/history/2025-01-31/edit");

        let edited = post_form(&app, "/history/2025-01-31/edit", "total_portfolio_value=13000").await;
        let page = follow(&app, edited).await;
        assert!(page.contains("$13,000.00"));

        let deleted = post_form(&app, "/history/2025-01-31/delete", "").await;
        let page = follow(&app, deleted).await;
        assert!(page.contains("Snapshot for 2025-01-31 deleted."));
        assert!(page.contains("No snapshots recorded yet."));
    }

    #[tokio::test]
    async fn test_unknown_snapshot_redirects() {
        let app = test_app().await;
        let missing = get(&app, "/history/2025-02-30/edit", None).await;
        assert_eq!(location(&missing), "/history");
    }
}
