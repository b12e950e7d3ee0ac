use askama::Template;
use axum::{
    body::Body,
    extract::{FromRequestParts, Path},
    http::{Response, StatusCode, request::Parts},
    response::{Html, IntoResponse},
};

use crate::http_server::templates::{InternalErrorTemplate, NotFoundTemplate};
use crate::services::error::BookingError;

/// Failure of a request handler.
///
/// `NotFound` renders the 404 page. Everything else is a generic report
/// produced via `Err(some_err).wrap_err("Some context")` and renders the
/// 500 page after being logged.
pub enum AppError {
    NotFound,
    Internal(color_eyre::Report),
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::NotFound => f.write_str("NotFound"),
            AppError::Internal(report) => report.fmt(f),
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::NotFound { .. } => AppError::NotFound,
            other => AppError::Internal(other.into()),
        }
    }
}

impl From<askama::Error> for AppError {
    fn from(err: askama::Error) -> Self {
        AppError::Internal(err.into())
    }
}

impl From<color_eyre::Report> for AppError {
    fn from(report: color_eyre::Report) -> Self {
        AppError::Internal(report)
    }
}

fn render_error_page(status: StatusCode, page: Result<String, askama::Error>) -> Response<Body> {
    match page {
        Ok(body) => (status, Html(body)).into_response(),
        Err(e) => {
            log::error!("Failed to render {} page: {}", status.as_u16(), e);
            (status, "Something went wrong".to_string()).into_response()
        }
    }
}

pub fn not_found_response() -> Response<Body> {
    render_error_page(StatusCode::NOT_FOUND, NotFoundTemplate::default().render())
}

pub fn internal_error_response() -> Response<Body> {
    render_error_page(
        StatusCode::INTERNAL_SERVER_ERROR,
        InternalErrorTemplate::default().render(),
    )
}

// Tell axum how to convert `AppError` into a response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response<Body> {
        match self {
            AppError::NotFound => not_found_response(),
            AppError::Internal(err) => {
                log::error!("{err:?}");
                internal_error_response()
            }
        }
    }
}

/// Numeric id taken from the path. Anything that is not an integer is
/// answered with the 404 page, like an unknown route.
#[derive(Debug, Clone, Copy)]
pub struct EntityId(pub i64);

impl<S> FromRequestParts<S> for EntityId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                log::debug!("Rejected path id: {}", rejection);
                AppError::NotFound
            })?;
        Ok(EntityId(id))
    }
}
