use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use shared::TrackerError;
use tracing::error;

use crate::templates::ErrorTemplate;

/// Failure a handler cannot turn into a flash message: database errors,
/// template errors and anything else unexpected. Rendered as a 500 page.
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Request failed: {:#}", self.0);

        let page = ErrorTemplate::new(self.0.to_string());
        let body = page
            .render()
            .unwrap_or_else(|_| "Internal server error".to_string());
        (StatusCode::INTERNAL_SERVER_ERROR, Html(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Splits a tracker error into the message a user should see, or the
/// error that must abort the request.
pub fn user_facing(err: TrackerError) -> AppResult<TrackerError> {
    match err {
        TrackerError::Database(_) => Err(AppError::from(err)),
        other => Ok(other),
    }
}
