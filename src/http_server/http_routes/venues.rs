use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
};
use axum_extra::extract::Form;

use crate::forms::FormErrors;
use crate::forms::venue::VenueForm;
use crate::http_server::error::{AppError, EntityId};
use crate::http_server::flash::Flash;
use crate::http_server::http_routes::{SearchForm, now, render_home, render_page};
use crate::http_server::state::AppState;
use crate::http_server::templates::{
    EditVenueTemplate, NewVenueTemplate, SearchVenuesTemplate, ShowVenueTemplate, VenuesTemplate,
};

pub async fn venues(
    State(app_state): State<Arc<AppState>>,
    flash: Flash,
) -> Result<Response, AppError> {
    let areas = app_state.venues().list_areas(now()).await?;
    let (jar, messages) = flash.take();
    render_page(StatusCode::OK, jar, &VenuesTemplate { messages, areas })
}

pub async fn search_venues(
    State(app_state): State<Arc<AppState>>,
    flash: Flash,
    Form(search): Form<SearchForm>,
) -> Result<Response, AppError> {
    let results = app_state
        .venues()
        .search(&search.search_term, now())
        .await?;
    let (jar, messages) = flash.take();
    render_page(
        StatusCode::OK,
        jar,
        &SearchVenuesTemplate {
            messages,
            results,
            search_term: search.search_term,
        },
    )
}

pub async fn show_venue(
    State(app_state): State<Arc<AppState>>,
    EntityId(venue_id): EntityId,
    flash: Flash,
) -> Result<Response, AppError> {
    let detail = app_state.venues().get_detail(venue_id, now()).await?;
    let (jar, messages) = flash.take();
    render_page(StatusCode::OK, jar, &ShowVenueTemplate { messages, detail })
}

pub async fn create_venue_form(flash: Flash) -> Result<Response, AppError> {
    let (jar, messages) = flash.take();
    render_page(
        StatusCode::OK,
        jar,
        &NewVenueTemplate::new(messages, VenueForm::default(), FormErrors::default()),
    )
}

pub async fn create_venue_submission(
    State(app_state): State<Arc<AppState>>,
    mut flash: Flash,
    Form(form): Form<VenueForm>,
) -> Result<Response, AppError> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            log::debug!("Invalid venue submission: {:?}", errors);
            let (jar, messages) = flash.take();
            return render_page(
                StatusCode::BAD_REQUEST,
                jar,
                &NewVenueTemplate::new(messages, form, errors),
            );
        }
    };

    let name = input.name.clone();
    match app_state.venues().create(input).await {
        Ok(_) => flash.success(format!("Venue {name} was successfully listed!")),
        Err(_) => flash.error(format!("An error occurred. Venue {name} could not be listed.")),
    }

    render_home(&app_state, flash).await
}

pub async fn edit_venue(
    State(app_state): State<Arc<AppState>>,
    EntityId(venue_id): EntityId,
    flash: Flash,
) -> Result<Response, AppError> {
    let venue = app_state.venues().get(venue_id).await?;
    let (jar, messages) = flash.take();
    render_page(
        StatusCode::OK,
        jar,
        &EditVenueTemplate::new(
            messages,
            venue_id,
            VenueForm::from_model(&venue),
            FormErrors::default(),
        ),
    )
}

pub async fn edit_venue_submission(
    State(app_state): State<Arc<AppState>>,
    EntityId(venue_id): EntityId,
    mut flash: Flash,
    Form(form): Form<VenueForm>,
) -> Result<Response, AppError> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            log::debug!("Invalid venue edit for {}: {:?}", venue_id, errors);
            let (jar, messages) = flash.take();
            return render_page(
                StatusCode::BAD_REQUEST,
                jar,
                &EditVenueTemplate::new(messages, venue_id, form, errors),
            );
        }
    };

    match app_state.venues().update(venue_id, input).await {
        Ok(_) => flash.success("Venue was successfully updated!"),
        Err(_) => flash.error("An error occurred. Venue could not be updated."),
    }

    Ok(flash.redirect(&format!("/venues/{venue_id}")))
}

pub async fn delete_venue(
    State(app_state): State<Arc<AppState>>,
    EntityId(venue_id): EntityId,
    mut flash: Flash,
) -> Result<Response, AppError> {
    match app_state.venues().delete(venue_id).await {
        Ok(()) => flash.success("Venue was successfully deleted!"),
        Err(_) => flash.error("An error occurred. Venue could not be deleted."),
    }

    Ok(flash.redirect("/"))
}
