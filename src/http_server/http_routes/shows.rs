use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Response};
use axum_extra::extract::Form;

use crate::forms::FormErrors;
use crate::forms::show::ShowForm;
use crate::http_server::error::AppError;
use crate::http_server::flash::Flash;
use crate::http_server::http_routes::{now, render_home, render_page};
use crate::http_server::state::AppState;
use crate::http_server::templates::{NewShowTemplate, ShowsTemplate};
use crate::services::error::BookingError;

pub async fn shows(
    State(app_state): State<Arc<AppState>>,
    flash: Flash,
) -> Result<Response, AppError> {
    let shows = app_state.shows().list().await?;
    let (jar, messages) = flash.take();
    render_page(StatusCode::OK, jar, &ShowsTemplate { messages, shows })
}

pub async fn create_show_form(flash: Flash) -> Result<Response, AppError> {
    let (jar, messages) = flash.take();
    render_page(
        StatusCode::OK,
        jar,
        &NewShowTemplate {
            messages,
            form: ShowForm::starting_at(now()),
            errors: FormErrors::default(),
        },
    )
}

pub async fn create_show_submission(
    State(app_state): State<Arc<AppState>>,
    mut flash: Flash,
    Form(form): Form<ShowForm>,
) -> Result<Response, AppError> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            log::debug!("Invalid show submission: {:?}", errors);
            let (jar, messages) = flash.take();
            return render_page(
                StatusCode::BAD_REQUEST,
                jar,
                &NewShowTemplate {
                    messages,
                    form,
                    errors,
                },
            );
        }
    };

    match app_state.shows().create(input).await {
        Ok(_) => flash.success("Show was successfully listed!"),
        Err(BookingError::UnavailableTime { .. }) => {
            flash.error("Show time is outside of the artist's availability.");
            return Ok(flash.redirect("/shows/create"));
        }
        Err(_) => flash.error("An error occurred. Show could not be listed."),
    }

    render_home(&app_state, flash).await
}
