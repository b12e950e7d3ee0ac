use std::sync::Arc;

use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::http_server::error::{AppError, not_found_response};
use crate::http_server::flash::Flash;
use crate::http_server::state::AppState;
use crate::http_server::templates::HomeTemplate;

pub mod artists;
pub mod shows;
pub mod venues;

/// Number of artists and venues listed on the home page.
const RECENT_LIMIT: u64 = 10;

/// Wall-clock time used to split shows into past and upcoming.
pub fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchForm {
    pub search_term: String,
}

pub fn render_page<T: Template>(
    status: StatusCode,
    jar: CookieJar,
    template: &T,
) -> Result<Response, AppError> {
    let body = template.render()?;
    Ok((status, jar, Html(body)).into_response())
}

/// Home page with the most recently listed artists and venues. Also the
/// landing page after create submissions, showing their notices.
pub async fn render_home(state: &AppState, flash: Flash) -> Result<Response, AppError> {
    let artists = state.artists().recent(RECENT_LIMIT).await?;
    let venues = state.venues().recent(RECENT_LIMIT).await?;
    let (jar, messages) = flash.take();
    render_page(
        StatusCode::OK,
        jar,
        &HomeTemplate {
            messages,
            artists,
            venues,
        },
    )
}

pub async fn index(State(state): State<Arc<AppState>>, flash: Flash) -> Result<Response, AppError> {
    render_home(&state, flash).await
}

pub async fn not_found() -> Response {
    not_found_response()
}
