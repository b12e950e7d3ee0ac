use serde::Deserialize;

use crate::entities;
use crate::forms::{
    FormErrors, checkbox, choice, choices, multi_choice, optional, optional_url, phone, required,
    show::parse_start_time,
};
use crate::services::query::format_start_time;

/// Artist fields exactly as submitted by the create and edit forms.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArtistForm {
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub genres: Vec<String>,
    pub image_link: String,
    pub facebook_link: String,
    pub website: String,
    pub seeking_venue: Option<String>,
    pub seeking_description: String,
    /// One start time per line
    pub available_times: String,
}

/// A validated artist, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistInput {
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub genres: Vec<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
    pub available_times: Vec<String>,
}

impl ArtistForm {
    pub fn from_model(artist: &entities::artist::Model) -> Self {
        Self {
            name: artist.name.clone(),
            city: artist.city.clone(),
            state: artist.state.clone(),
            phone: artist.phone.clone(),
            genres: artist.genres.0.clone(),
            image_link: artist.image_link.clone().unwrap_or_default(),
            facebook_link: artist.facebook_link.clone().unwrap_or_default(),
            website: artist.website.clone().unwrap_or_default(),
            seeking_venue: artist.seeking_venue.then(|| "y".to_string()),
            seeking_description: artist.seeking_description.clone().unwrap_or_default(),
            available_times: artist.available_times.0.join("\n"),
        }
    }

    pub fn is_seeking_venue(&self) -> bool {
        checkbox(&self.seeking_venue)
    }

    pub fn validate(&self) -> Result<ArtistInput, FormErrors> {
        let mut errors = FormErrors::default();

        let input = ArtistInput {
            name: required(&mut errors, "name", &self.name),
            city: required(&mut errors, "city", &self.city),
            state: choice(&mut errors, "state", &self.state, choices::STATES),
            phone: phone(&mut errors, "phone", &self.phone),
            genres: multi_choice(&mut errors, "genres", &self.genres, choices::GENRES),
            image_link: optional_url(&mut errors, "image_link", &self.image_link),
            facebook_link: optional_url(&mut errors, "facebook_link", &self.facebook_link),
            website: optional_url(&mut errors, "website", &self.website),
            seeking_venue: self.is_seeking_venue(),
            seeking_description: optional(&self.seeking_description),
            available_times: available_times(&mut errors, &self.available_times),
        };

        errors.finish(input)
    }
}

/// Parse the availability textarea, normalizing every line to the stored
/// start time format. Blank lines are ignored and duplicates dropped.
fn available_times(errors: &mut FormErrors, value: &str) -> Vec<String> {
    let mut times: Vec<String> = Vec::new();
    for (index, line) in value.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_start_time(line) {
            Some(time) => {
                let formatted = format_start_time(&time);
                if !times.contains(&formatted) {
                    times.push(formatted);
                }
            }
            None => errors.add(
                "available_times",
                format!("Line {}: '{}' is not a valid date and time.", index + 1, line),
            ),
        }
    }
    times
}
