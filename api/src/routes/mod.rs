use askama::Template;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{json, Value};
use shared::TrackerError;
use std::path::Path;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::{user_facing, AppResult};
use crate::flash::{self, Flash};
use crate::state::AppState;
use crate::templates::{Layout, VERSION};

mod accounts;
mod assets;
mod dashboard;
mod history;
mod platforms;
mod users;

pub fn create_router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(dashboard::show).post(dashboard::submit))
        .route("/assets/refresh_all", post(dashboard::refresh_all))
        .route("/users", get(users::list).post(users::create))
        .route("/user/:id/edit", get(users::edit_form).post(users::update))
        .route("/user/:id/delete", post(users::delete))
        .route("/platforms", get(platforms::list).post(platforms::create))
        .route(
            "/platform/:id/edit",
            get(platforms::edit_form).post(platforms::update),
        )
        .route("/platform/:id/delete", post(platforms::delete))
        .route("/accounts", get(accounts::list).post(accounts::create))
        .route(
            "/account/:id/edit",
            get(accounts::edit_form).post(accounts::update),
        )
        .route("/account/:id/delete", post(accounts::delete))
        .route(
            "/account/:id/assets",
            get(assets::manage).post(assets::manage_action),
        )
        .route("/asset/:id/edit", get(assets::edit_form).post(assets::update))
        .route("/asset/:id/delete", post(assets::delete))
        .route("/asset/:id/refresh", post(assets::refresh))
        .route("/history", get(history::list).post(history::record))
        .route(
            "/history/:date/edit",
            get(history::edit_form).post(history::update),
        )
        .route("/history/:date/delete", post(history::delete))
        .route("/health", get(health_check))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": VERSION,
        "build_time": env!("BUILD_TIME"),
    }))
}

/// Consumes pending flash messages for the page being rendered.
fn layout(jar: CookieJar) -> (CookieJar, Layout) {
    let (jar, flashes) = flash::take(jar);
    (jar, Layout::new(flashes))
}

fn render<T: Template>(jar: CookieJar, page: T) -> AppResult<Response> {
    let body = page.render()?;
    Ok((jar, Html(body)).into_response())
}

fn redirect(jar: CookieJar, to: &str) -> AppResult<Response> {
    Ok((jar, Redirect::to(to)).into_response())
}

/// Queues the message of a user-facing error; database failures abort.
fn flash_error(jar: CookieJar, err: TrackerError) -> AppResult<CookieJar> {
    let err = user_facing(err)?;
    Ok(flash::push(jar, Flash::from_error(&err)))
}

#[cfg(test)]
pub(crate) mod test_support {
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use axum::Router;
    use shared::market_data::{ChartPoint, MarketDataProvider, Quote};
    use std::sync::Arc;
    use tower::ServiceExt;

    use super::create_router;
    use crate::state::AppState;

    /// Knows a single ticker, `XEQT`, priced at 30.
    pub struct StubProvider;

    #[async_trait]
    impl MarketDataProvider for StubProvider {
        async fn fetch_quote(&self, ticker: &str) -> Result<Quote> {
            if ticker != "XEQT" {
                return Err(anyhow!("No price data found for symbol: {}", ticker));
            }
            Ok(Quote {
                current_price: Some(30.0),
                price_yesterday: Some(29.0),
                fifty_two_week_high: Some(35.0),
                fifty_two_week_low: Some(25.0),
                name: Some("iShares Core Equity ETF".into()),
            })
        }

        async fn fetch_exchange_rate(&self, _pair: &str) -> Result<f64> {
            Ok(1.3655)
        }

        async fn fetch_yearly_history(&self, _ticker: &str) -> Result<Vec<ChartPoint>> {
            Ok(vec![ChartPoint {
                date: "2025-01-02".into(),
                close: 28.5,
            }])
        }
    }

    pub async fn test_app() -> Router {
        let db = Arc::new(shared::connect_in_memory().await.unwrap());
        let state = AppState::new(db, Arc::new(StubProvider), "CAD=X");
        create_router(state, std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("static").as_path())
    }

    pub async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        app.clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    pub async fn post_form(app: &Router, uri: &str, form: &str) -> Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(form.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    pub fn location(response: &Response) -> &str {
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    /// `name=value` of the flash cookie set by a response.
    pub fn flash_cookie(response: &Response) -> String {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with(crate::flash::FLASH_COOKIE))
            .and_then(|v| v.split(';').next())
            .unwrap_or_default()
            .to_string()
    }

    pub async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    /// Follows a post/redirect/get round trip and returns the rendered page.
    pub async fn follow(app: &Router, response: Response) -> String {
        let to = location(&response).to_string();
        let cookie = flash_cookie(&response);
        let page = get(app, &to, Some(&cookie)).await;
        assert_eq!(page.status(), StatusCode::OK);
        body_text(page).await
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_health_check() {
        let app = test_app().await;
        let response = get(&app, "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["status"], "ok");
        assert!(body["version"].as_str().unwrap().starts_with(env!("CARGO_PKG_VERSION")));
    }

    #[tokio::test]
    async fn test_static_files_are_served() {
        let app = test_app().await;
        let response = get(&app, "/static/style.css", None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unreadable_flash_cookie_is_cleared() {
        let app = test_app().await;
        let response = get(&app, "/users", Some("folio_flash=garbage!!")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let cleared = response
            .headers()
            .get_all(axum::http::header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| v.starts_with("folio_flash=") && v.contains("Max-Age=0"));
        assert!(cleared);
    }

    #[tokio::test]
    async fn test_flash_is_shown_once() {
        let app = test_app().await;
        let created = post_form(&app, "/users", "name=Ann").await;
        let cookie = flash_cookie(&created);
        assert!(!cookie.is_empty());

        let page = follow(&app, created).await;
        assert!(page.contains("added successfully!"));

        let again = body_text(get(&app, "/users", None).await).await;
        assert!(!again.contains("added successfully!"));
    }
}
