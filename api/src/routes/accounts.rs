use axum::extract::{Path, State};
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use axum_extra::extract::Form;
use serde::Deserialize;
use shared::validation::AccountDraft;
use shared::TrackerError;

use super::{flash_error, layout, redirect, render};
use crate::error::AppResult;
use crate::flash;
use crate::state::AppState;
use crate::templates::{AccountsTemplate, EditAccountTemplate};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AccountForm {
    user_id: String,
    platform_id: String,
    account_type: String,
    account_name: String,
    cash_balance: String,
}

impl AccountForm {
    fn draft(&self) -> Result<AccountDraft, TrackerError> {
        AccountDraft::parse(
            &self.user_id,
            &self.platform_id,
            &self.account_type,
            &self.account_name,
            &self.cash_balance,
        )
    }
}

pub async fn list(State(state): State<AppState>, jar: CookieJar) -> AppResult<Response> {
    let (jar, layout) = layout(jar);
    let accounts = state.account_service.list_accounts().await?;
    let users = state.user_service.list_users().await?;
    let platforms = state.platform_service.list_platforms().await?;
    render(
        jar,
        AccountsTemplate {
            layout,
            accounts,
            users,
            platforms,
        },
    )
}

pub async fn create(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<AccountForm>,
) -> AppResult<Response> {
    let created = match form.draft() {
        Ok(draft) => state.account_service.create_account(&draft).await,
        Err(e) => Err(e),
    };
    let jar = match created {
        Ok(account) => flash::success(
            jar,
            format!(
                "Account '{}' (ID: {}) added successfully!",
                account.account_name, account.account_id
            ),
        ),
        Err(e) => flash_error(jar, e)?,
    };
    redirect(jar, "/accounts")
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path(account_id): Path<i32>,
    jar: CookieJar,
) -> AppResult<Response> {
    let account = match state.account_service.get_account(account_id).await {
        Ok(account) => account,
        Err(e) => return redirect(flash_error(jar, e)?, "/accounts"),
    };
    let (jar, layout) = layout(jar);
    let users = state.user_service.list_users().await?;
    let platforms = state.platform_service.list_platforms().await?;
    render(
        jar,
        EditAccountTemplate {
            layout,
            account,
            users,
            platforms,
        },
    )
}

pub async fn update(
    State(state): State<AppState>,
    Path(account_id): Path<i32>,
    jar: CookieJar,
    Form(form): Form<AccountForm>,
) -> AppResult<Response> {
    let updated = match form.draft() {
        Ok(draft) => state.account_service.update_account(account_id, &draft).await,
        Err(e) => Err(e),
    };
    match updated {
        Ok((before, after)) => {
            let message = if before.account_name == after.account_name {
                format!("Account '{}' updated successfully!", after.account_name)
            } else {
                format!(
                    "Account '{}' renamed to '{}' and updated successfully!",
                    before.account_name, after.account_name
                )
            };
            redirect(flash::success(jar, message), "/accounts")
        }
        Err(e @ (TrackerError::NoChanges(_) | TrackerError::NotFound(_))) => {
            redirect(flash_error(jar, e)?, "/accounts")
        }
        Err(e) => redirect(
            flash_error(jar, e)?,
            &format!("/account/{}/edit", account_id),
        ),
    }
}

pub async fn delete(
    State(state): State<AppState>,
    Path(account_id): Path<i32>,
    jar: CookieJar,
) -> AppResult<Response> {
    let jar = match state.account_service.delete_account(account_id).await {
        Ok(account) => flash::success(
            jar,
            format!(
                "Account '{}' and all its associated assets deleted successfully!",
                account.account_name
            ),
        ),
        Err(e) => flash_error(jar, e)?,
    };
    redirect(jar, "/accounts")
}
