use axum::extract::{Path, State};
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use axum_extra::extract::Form;
use serde::Deserialize;
use shared::TrackerError;

use super::{flash_error, layout, redirect, render};
use crate::error::AppResult;
use crate::flash;
use crate::state::AppState;
use crate::templates::{EditUserTemplate, UsersTemplate};

/// Posted by the add and rename forms of users and platforms.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NameForm {
    pub name: String,
}

pub async fn list(State(state): State<AppState>, jar: CookieJar) -> AppResult<Response> {
    let (jar, layout) = layout(jar);
    let users = state.user_service.list_users().await?;
    render(jar, UsersTemplate { layout, users })
}

pub async fn create(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<NameForm>,
) -> AppResult<Response> {
    let jar = match state.user_service.create_user(&form.name).await {
        Ok(user) => flash::success(
            jar,
            format!("User '{}' (ID: {}) added successfully!", user.name, user.user_id),
        ),
        Err(e) => flash_error(jar, e)?,
    };
    redirect(jar, "/users")
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    jar: CookieJar,
) -> AppResult<Response> {
    match state.user_service.get_user(user_id).await {
        Ok(user) => {
            let (jar, layout) = layout(jar);
            render(jar, EditUserTemplate { layout, user })
        }
        Err(e) => redirect(flash_error(jar, e)?, "/users"),
    }
}

pub async fn update(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    jar: CookieJar,
    Form(form): Form<NameForm>,
) -> AppResult<Response> {
    match state.user_service.rename_user(user_id, &form.name).await {
        Ok((old_name, user)) => {
            let jar = flash::success(
                jar,
                format!("User '{}' updated to '{}' successfully!", old_name, user.name),
            );
            redirect(jar, "/users")
        }
        Err(e @ (TrackerError::NoChanges(_) | TrackerError::NotFound(_))) => {
            redirect(flash_error(jar, e)?, "/users")
        }
        Err(e) => redirect(flash_error(jar, e)?, &format!("/user/{}/edit", user_id)),
    }
}

pub async fn delete(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    jar: CookieJar,
) -> AppResult<Response> {
    let jar = match state.user_service.delete_user(user_id).await {
        Ok(user) => flash::success(
            jar,
            format!(
                "User '{}' and all associated accounts and assets deleted successfully!",
                user.name
            ),
        ),
        Err(e) => flash_error(jar, e)?,
    };
    redirect(jar, "/users")
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::*;

    #[tokio::test]
    async fn test_add_rename_delete_user() {
        let app = test_app().await;

        let added = post_form(&app, "/users", "name=Ann").await;
        assert_eq!(location(&added), "/users");
        let page = follow(&app, added).await;
        assert!(page.contains("(ID: 1) added successfully!"));

        let renamed = post_form(&app, "/user/1/edit", "name=Anne").await;
        assert_eq!(location(&renamed), "/users");
        let page = follow(&app, renamed).await;
        assert!(page.contains("updated to &#x27;Anne&#x27; successfully!"));

        let deleted = post_form(&app, "/user/1/delete", "").await;
        let page = follow(&app, deleted).await;
        assert!(page.contains("and all associated accounts and assets deleted successfully!"));
    }

    #[tokio::test]
    async fn test_user_errors() {
        let app = test_app().await;
        post_form(&app, "/users", "name=Ann").await;

        let duplicate = post_form(&app, "/users", "name=Ann").await;
        let page = follow(&app, duplicate).await;
        assert!(page.contains("already exists."));

        let blank = post_form(&app, "/user/1/edit", "name=++").await;
        assert_eq!(location(&blank), "/user/1/edit");
        let page = follow(&app, blank).await;
        assert!(page.contains("User name cannot be empty."));

        let missing = get(&app, "/user/42/edit", None).await;
        assert_eq!(location(&missing), "/users");
    }
}
