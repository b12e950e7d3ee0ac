use serde::Deserialize;

use crate::entities;
use crate::forms::{
    FormErrors, checkbox, choice, choices, multi_choice, optional, optional_url, phone, required,
};

/// Venue fields exactly as submitted by the create and edit forms.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VenueForm {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: String,
    pub genres: Vec<String>,
    pub image_link: String,
    pub facebook_link: String,
    pub website: String,
    pub seeking_talent: Option<String>,
    pub seeking_description: String,
}

/// A validated venue, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueInput {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: String,
    pub genres: Vec<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
}

impl VenueForm {
    /// Prefill the edit form with the stored values.
    pub fn from_model(venue: &entities::venue::Model) -> Self {
        Self {
            name: venue.name.clone(),
            city: venue.city.clone(),
            state: venue.state.clone(),
            address: venue.address.clone(),
            phone: venue.phone.clone(),
            genres: venue.genres.0.clone(),
            image_link: venue.image_link.clone().unwrap_or_default(),
            facebook_link: venue.facebook_link.clone().unwrap_or_default(),
            website: venue.website.clone().unwrap_or_default(),
            seeking_talent: venue.seeking_talent.then(|| "y".to_string()),
            seeking_description: venue.seeking_description.clone().unwrap_or_default(),
        }
    }

    pub fn is_seeking_talent(&self) -> bool {
        checkbox(&self.seeking_talent)
    }

    pub fn validate(&self) -> Result<VenueInput, FormErrors> {
        let mut errors = FormErrors::default();

        let input = VenueInput {
            name: required(&mut errors, "name", &self.name),
            city: required(&mut errors, "city", &self.city),
            state: choice(&mut errors, "state", &self.state, choices::STATES),
            address: required(&mut errors, "address", &self.address),
            phone: phone(&mut errors, "phone", &self.phone),
            genres: multi_choice(&mut errors, "genres", &self.genres, choices::GENRES),
            image_link: optional_url(&mut errors, "image_link", &self.image_link),
            facebook_link: optional_url(&mut errors, "facebook_link", &self.facebook_link),
            website: optional_url(&mut errors, "website", &self.website),
            seeking_talent: self.is_seeking_talent(),
            seeking_description: optional(&self.seeking_description),
        };

        errors.finish(input)
    }
}
