use askama::Template;

use crate::entities;
use crate::forms::artist::ArtistForm;
use crate::forms::show::ShowForm;
use crate::forms::venue::VenueForm;
use crate::forms::{FormErrors, SelectOption, genre_options, state_options};
use crate::http_server::flash::FlashMessage;
use crate::services::SearchResults;
use crate::services::artist::ArtistDetail;
use crate::services::show::ShowListing;
use crate::services::venue::{VenueArea, VenueDetail};

pub mod filters {
    use std::fmt::Display;

    use crate::forms::show::parse_start_time;

    const FULL_FORMAT: &str = "%A %B, %-d, %Y at %-I:%M%p";
    const MEDIUM_FORMAT: &str = "%a %m, %d, %Y %-I:%M%p";

    /// Render a stored start time as `full` or `medium` text. Values that
    /// do not parse are shown as they are.
    pub fn format_datetime(value: &str, format: &str) -> String {
        let Some(parsed) = parse_start_time(value) else {
            return value.to_string();
        };
        let pattern = match format {
            "full" => FULL_FORMAT,
            _ => MEDIUM_FORMAT,
        };
        parsed.format(pattern).to_string()
    }

    pub fn datetime<T: Display>(value: T, format: &str) -> askama::Result<String> {
        Ok(format_datetime(&value.to_string(), format))
    }
}

// ============================================================================
// Pages
// ============================================================================

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub messages: Vec<FlashMessage>,
    pub artists: Vec<entities::artist::Model>,
    pub venues: Vec<entities::venue::Model>,
}

#[derive(Template)]
#[template(path = "pages/venues.html")]
pub struct VenuesTemplate {
    pub messages: Vec<FlashMessage>,
    pub areas: Vec<VenueArea>,
}

#[derive(Template)]
#[template(path = "pages/search_venues.html")]
pub struct SearchVenuesTemplate {
    pub messages: Vec<FlashMessage>,
    pub results: SearchResults,
    pub search_term: String,
}

#[derive(Template)]
#[template(path = "pages/show_venue.html")]
pub struct ShowVenueTemplate {
    pub messages: Vec<FlashMessage>,
    pub detail: VenueDetail,
}

#[derive(Template)]
#[template(path = "pages/artists.html")]
pub struct ArtistsTemplate {
    pub messages: Vec<FlashMessage>,
    pub artists: Vec<entities::artist::Model>,
}

#[derive(Template)]
#[template(path = "pages/search_artists.html")]
pub struct SearchArtistsTemplate {
    pub messages: Vec<FlashMessage>,
    pub results: SearchResults,
    pub search_term: String,
}

#[derive(Template)]
#[template(path = "pages/show_artist.html")]
pub struct ShowArtistTemplate {
    pub messages: Vec<FlashMessage>,
    pub detail: ArtistDetail,
}

#[derive(Template)]
#[template(path = "pages/shows.html")]
pub struct ShowsTemplate {
    pub messages: Vec<FlashMessage>,
    pub shows: Vec<ShowListing>,
}

// ============================================================================
// Forms
// ============================================================================

#[derive(Template)]
#[template(path = "forms/new_venue.html")]
pub struct NewVenueTemplate {
    pub messages: Vec<FlashMessage>,
    pub form: VenueForm,
    pub errors: FormErrors,
    pub state_options: Vec<SelectOption>,
    pub genre_options: Vec<SelectOption>,
}

impl NewVenueTemplate {
    pub fn new(messages: Vec<FlashMessage>, form: VenueForm, errors: FormErrors) -> Self {
        Self {
            messages,
            state_options: state_options(&form.state),
            genre_options: genre_options(&form.genres),
            form,
            errors,
        }
    }
}

#[derive(Template)]
#[template(path = "forms/edit_venue.html")]
pub struct EditVenueTemplate {
    pub messages: Vec<FlashMessage>,
    pub venue_id: i64,
    pub form: VenueForm,
    pub errors: FormErrors,
    pub state_options: Vec<SelectOption>,
    pub genre_options: Vec<SelectOption>,
}

impl EditVenueTemplate {
    pub fn new(
        messages: Vec<FlashMessage>,
        venue_id: i64,
        form: VenueForm,
        errors: FormErrors,
    ) -> Self {
        Self {
            messages,
            venue_id,
            state_options: state_options(&form.state),
            genre_options: genre_options(&form.genres),
            form,
            errors,
        }
    }
}

#[derive(Template)]
#[template(path = "forms/new_artist.html")]
pub struct NewArtistTemplate {
    pub messages: Vec<FlashMessage>,
    pub form: ArtistForm,
    pub errors: FormErrors,
    pub state_options: Vec<SelectOption>,
    pub genre_options: Vec<SelectOption>,
}

impl NewArtistTemplate {
    pub fn new(messages: Vec<FlashMessage>, form: ArtistForm, errors: FormErrors) -> Self {
        Self {
            messages,
            state_options: state_options(&form.state),
            genre_options: genre_options(&form.genres),
            form,
            errors,
        }
    }
}

#[derive(Template)]
#[template(path = "forms/edit_artist.html")]
pub struct EditArtistTemplate {
    pub messages: Vec<FlashMessage>,
    pub artist_id: i64,
    pub form: ArtistForm,
    pub errors: FormErrors,
    pub state_options: Vec<SelectOption>,
    pub genre_options: Vec<SelectOption>,
}

impl EditArtistTemplate {
    pub fn new(
        messages: Vec<FlashMessage>,
        artist_id: i64,
        form: ArtistForm,
        errors: FormErrors,
    ) -> Self {
        Self {
            messages,
            artist_id,
            state_options: state_options(&form.state),
            genre_options: genre_options(&form.genres),
            form,
            errors,
        }
    }
}

#[derive(Template)]
#[template(path = "forms/new_show.html")]
pub struct NewShowTemplate {
    pub messages: Vec<FlashMessage>,
    pub form: ShowForm,
    pub errors: FormErrors,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Template, Default)]
#[template(path = "errors/404.html")]
pub struct NotFoundTemplate {
    pub messages: Vec<FlashMessage>,
}

#[derive(Template, Default)]
#[template(path = "errors/500.html")]
pub struct InternalErrorTemplate {
    pub messages: Vec<FlashMessage>,
}
