use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
};
use axum_extra::extract::Form;

use crate::forms::FormErrors;
use crate::forms::artist::ArtistForm;
use crate::http_server::error::{AppError, EntityId};
use crate::http_server::flash::Flash;
use crate::http_server::http_routes::{SearchForm, now, render_home, render_page};
use crate::http_server::state::AppState;
use crate::http_server::templates::{
    EditArtistTemplate, NewArtistTemplate, SearchArtistsTemplate, ShowArtistTemplate, ArtistsTemplate,
};

pub async fn artists(
    State(app_state): State<Arc<AppState>>,
    flash: Flash,
) -> Result<Response, AppError> {
    let artists = app_state.artists().list().await?;
    let (jar, messages) = flash.take();
    render_page(StatusCode::OK, jar, &ArtistsTemplate { messages, artists })
}

pub async fn search_artists(
    State(app_state): State<Arc<AppState>>,
    flash: Flash,
    Form(search): Form<SearchForm>,
) -> Result<Response, AppError> {
    let results = app_state
        .artists()
        .search(&search.search_term, now())
        .await?;
    let (jar, messages) = flash.take();
    render_page(
        StatusCode::OK,
        jar,
        &SearchArtistsTemplate {
            messages,
            results,
            search_term: search.search_term,
        },
    )
}

pub async fn show_artist(
    State(app_state): State<Arc<AppState>>,
    EntityId(artist_id): EntityId,
    flash: Flash,
) -> Result<Response, AppError> {
    let detail = app_state.artists().get_detail(artist_id, now()).await?;
    let (jar, messages) = flash.take();
    render_page(StatusCode::OK, jar, &ShowArtistTemplate { messages, detail })
}

pub async fn create_artist_form(flash: Flash) -> Result<Response, AppError> {
    let (jar, messages) = flash.take();
    render_page(
        StatusCode::OK,
        jar,
        &NewArtistTemplate::new(messages, ArtistForm::default(), FormErrors::default()),
    )
}

pub async fn create_artist_submission(
    State(app_state): State<Arc<AppState>>,
    mut flash: Flash,
    Form(form): Form<ArtistForm>,
) -> Result<Response, AppError> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            log::debug!("Invalid artist submission: {:?}", errors);
            let (jar, messages) = flash.take();
            return render_page(
                StatusCode::BAD_REQUEST,
                jar,
                &NewArtistTemplate::new(messages, form, errors),
            );
        }
    };

    let name = input.name.clone();
    match app_state.artists().create(input).await {
        Ok(_) => flash.success(format!("Artist {name} was successfully listed!")),
        Err(_) => flash.error(format!("An error occurred. Artist {name} could not be listed.")),
    }

    render_home(&app_state, flash).await
}

pub async fn edit_artist(
    State(app_state): State<Arc<AppState>>,
    EntityId(artist_id): EntityId,
    flash: Flash,
) -> Result<Response, AppError> {
    let artist = app_state.artists().get(artist_id).await?;
    let (jar, messages) = flash.take();
    render_page(
        StatusCode::OK,
        jar,
        &EditArtistTemplate::new(
            messages,
            artist_id,
            ArtistForm::from_model(&artist),
            FormErrors::default(),
        ),
    )
}

pub async fn edit_artist_submission(
    State(app_state): State<Arc<AppState>>,
    EntityId(artist_id): EntityId,
    mut flash: Flash,
    Form(form): Form<ArtistForm>,
) -> Result<Response, AppError> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            log::debug!("Invalid artist edit for {}: {:?}", artist_id, errors);
            let (jar, messages) = flash.take();
            return render_page(
                StatusCode::BAD_REQUEST,
                jar,
                &EditArtistTemplate::new(messages, artist_id, form, errors),
            );
        }
    };

    match app_state.artists().update(artist_id, input).await {
        Ok(_) => flash.success("Artist was successfully updated!"),
        Err(_) => flash.error("An error occurred. Artist could not be updated."),
    }

    Ok(flash.redirect(&format!("/artists/{artist_id}")))
}

pub async fn delete_artist(
    State(app_state): State<Arc<AppState>>,
    EntityId(artist_id): EntityId,
    mut flash: Flash,
) -> Result<Response, AppError> {
    match app_state.artists().delete(artist_id).await {
        Ok(()) => flash.success("Artist was successfully deleted!"),
        Err(_) => flash.error("An error occurred. Artist could not be deleted."),
    }

    Ok(flash.redirect("/"))
}
