use axum::extract::{Path, State};
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use axum_extra::extract::Form;
use shared::TrackerError;

use super::users::NameForm;
use super::{flash_error, layout, redirect, render};
use crate::error::AppResult;
use crate::flash;
use crate::state::AppState;
use crate::templates::{EditPlatformTemplate, PlatformsTemplate};

pub async fn list(State(state): State<AppState>, jar: CookieJar) -> AppResult<Response> {
    let (jar, layout) = layout(jar);
    let platforms = state.platform_service.list_platforms().await?;
    render(jar, PlatformsTemplate { layout, platforms })
}

pub async fn create(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<NameForm>,
) -> AppResult<Response> {
    let jar = match state.platform_service.create_platform(&form.name).await {
        Ok(platform) => flash::success(
            jar,
            format!(
                "Platform '{}' (ID: {}) added successfully!",
                platform.name, platform.platform_id
            ),
        ),
        Err(e) => flash_error(jar, e)?,
    };
    redirect(jar, "/platforms")
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path(platform_id): Path<i32>,
    jar: CookieJar,
) -> AppResult<Response> {
    match state.platform_service.get_platform(platform_id).await {
        Ok(platform) => {
            let (jar, layout) = layout(jar);
            render(jar, EditPlatformTemplate { layout, platform })
        }
        Err(e) => redirect(flash_error(jar, e)?, "/platforms"),
    }
}

pub async fn update(
    State(state): State<AppState>,
    Path(platform_id): Path<i32>,
    jar: CookieJar,
    Form(form): Form<NameForm>,
) -> AppResult<Response> {
    match state
        .platform_service
        .rename_platform(platform_id, &form.name)
        .await
    {
        Ok((old_name, platform)) => {
            let jar = flash::success(
                jar,
                format!(
                    "Platform '{}' updated to '{}' successfully!",
                    old_name, platform.name
                ),
            );
            redirect(jar, "/platforms")
        }
        Err(e @ (TrackerError::NoChanges(_) | TrackerError::NotFound(_))) => {
            redirect(flash_error(jar, e)?, "/platforms")
        }
        Err(e) => redirect(
            flash_error(jar, e)?,
            &format!("/platform/{}/edit", platform_id),
        ),
    }
}

pub async fn delete(
    State(state): State<AppState>,
    Path(platform_id): Path<i32>,
    jar: CookieJar,
) -> AppResult<Response> {
    let jar = match state.platform_service.delete_platform(platform_id).await {
        Ok(platform) => flash::success(
            jar,
            format!(
                "Platform '{}' and all its associated accounts and assets deleted successfully!",
                platform.name
            ),
        ),
        Err(e) => flash_error(jar, e)?,
    };
    redirect(jar, "/platforms")
}
