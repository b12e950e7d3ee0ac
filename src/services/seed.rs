use std::sync::Arc;

use chrono::NaiveDateTime;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set, TransactionTrait};

use crate::database::Database;
use crate::entities::{self, StringVec};
use crate::services::error::{BookingError, BookingResult};
use crate::services::query::START_TIME_FORMAT;

struct DemoVenue {
    name: &'static str,
    genres: &'static [&'static str],
    address: &'static str,
    city: &'static str,
    state: &'static str,
    phone: &'static str,
    website: Option<&'static str>,
    facebook_link: Option<&'static str>,
    seeking_description: Option<&'static str>,
    image_link: &'static str,
}

struct DemoArtist {
    name: &'static str,
    genres: &'static [&'static str],
    city: &'static str,
    state: &'static str,
    phone: &'static str,
    website: Option<&'static str>,
    facebook_link: Option<&'static str>,
    seeking_description: Option<&'static str>,
    image_link: &'static str,
    available_times: &'static [&'static str],
}

const DEMO_VENUES: &[DemoVenue] = &[
    DemoVenue {
        name: "The Musical Hop",
        genres: &["Jazz", "Reggae", "Blues", "Classical", "Folk"],
        address: "1015 Folsom Street",
        city: "San Francisco",
        state: "CA",
        phone: "123-123-1234",
        website: Some("https://www.themusicalhop.com"),
        facebook_link: Some("https://www.facebook.com/TheMusicalHop"),
        seeking_description: Some(
            "We are on the lookout for a local artist to play every two weeks. Please call us.",
        ),
        image_link: "https://images.unsplash.com/photo-1543900694-133f37abaaa5?w=400",
    },
    DemoVenue {
        name: "The Dueling Pianos Bar",
        genres: &["Classical", "R&B", "Hip-Hop"],
        address: "335 Delancey Street",
        city: "New York",
        state: "NY",
        phone: "914-003-1132",
        website: Some("https://www.theduelingpianos.com"),
        facebook_link: Some("https://www.facebook.com/theduelingpianos"),
        seeking_description: None,
        image_link: "https://images.unsplash.com/photo-1497032205916-ac775f0649ae?w=750",
    },
    DemoVenue {
        name: "Park Square Live Music & Coffee",
        genres: &["Rock n Roll", "Jazz", "Classical", "Folk"],
        address: "34 Whiskey Moore Ave",
        city: "San Francisco",
        state: "CA",
        phone: "415-000-1234",
        website: Some("https://www.parksquarelivemusicandcoffee.com"),
        facebook_link: Some("https://www.facebook.com/ParkSquareLiveMusicAndCoffee"),
        seeking_description: None,
        image_link: "https://images.unsplash.com/photo-1485686531765-ba63b07845a7?w=747",
    },
];

const DEMO_ARTISTS: &[DemoArtist] = &[
    DemoArtist {
        name: "Guns N Petals",
        genres: &["Rock n Roll"],
        city: "San Francisco",
        state: "CA",
        phone: "326-123-5000",
        website: Some("https://www.gunsnpetalsband.com"),
        facebook_link: Some("https://www.facebook.com/GunsNPetals"),
        seeking_description: Some(
            "Looking for shows to perform at in the San Francisco Bay Area!",
        ),
        image_link: "https://images.unsplash.com/photo-1549213783-8284d0336c4f?w=300",
        available_times: &["2019-05-21 21:30:00", "2035-04-01 20:00:00"],
    },
    DemoArtist {
        name: "Matt Quevedo",
        genres: &["Jazz"],
        city: "New York",
        state: "NY",
        phone: "300-400-5000",
        website: None,
        facebook_link: Some("https://www.facebook.com/mattquevedo923251523"),
        seeking_description: None,
        image_link: "https://images.unsplash.com/photo-1495223153807-b916f75de8c5?w=334",
        available_times: &["2019-06-15 23:00:00", "2035-04-15 20:00:00"],
    },
    DemoArtist {
        name: "The Wild Sax Band",
        genres: &["Jazz", "Classical"],
        city: "San Francisco",
        state: "CA",
        phone: "432-325-5432",
        website: None,
        facebook_link: None,
        seeking_description: None,
        image_link: "https://images.unsplash.com/photo-1558369981-f9ca78462e61?w=794",
        available_times: &[
            "2035-04-01 20:00:00",
            "2035-04-08 20:00:00",
            "2035-04-15 20:00:00",
        ],
    },
];

/// (artist index, venue index, start time)
const DEMO_SHOWS: &[(usize, usize, &str)] = &[
    (0, 0, "2019-05-21 21:30:00"),
    (1, 2, "2019-06-15 23:00:00"),
    (2, 2, "2035-04-01 20:00:00"),
    (2, 2, "2035-04-08 20:00:00"),
    (2, 2, "2035-04-15 20:00:00"),
];

fn strings(values: &[&str]) -> StringVec {
    StringVec(values.iter().map(|v| v.to_string()).collect())
}

fn parse_start_time(value: &str) -> BookingResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, START_TIME_FORMAT)
        .map_err(|e| BookingError::ConstraintViolation(format!("Bad demo start time {value}: {e}")))
}

pub struct SeedService {
    db: Arc<Database>,
}

impl SeedService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert the demo data set unless any venue or artist already exists.
    /// Returns whether anything was inserted.
    pub async fn seed_demo_data(&self) -> BookingResult<bool> {
        let venues = entities::venue::Entity::find().count(&self.db.conn).await?;
        let artists = entities::artist::Entity::find().count(&self.db.conn).await?;
        if venues > 0 || artists > 0 {
            log::info!("Database already has data, skipping seed");
            return Ok(false);
        }

        self.db
            .conn
            .transaction::<_, (), BookingError>(|txn| {
                Box::pin(async move {
                    let mut venue_ids = Vec::new();
                    for demo in DEMO_VENUES {
                        let venue = entities::venue::ActiveModel {
                            name: Set(demo.name.into()),
                            city: Set(demo.city.into()),
                            state: Set(demo.state.into()),
                            address: Set(demo.address.into()),
                            phone: Set(demo.phone.into()),
                            genres: Set(strings(demo.genres)),
                            image_link: Set(Some(demo.image_link.into())),
                            facebook_link: Set(demo.facebook_link.map(Into::into)),
                            website: Set(demo.website.map(Into::into)),
                            seeking_talent: Set(demo.seeking_description.is_some()),
                            seeking_description: Set(demo.seeking_description.map(Into::into)),
                            ..Default::default()
                        };
                        venue_ids.push(venue.insert(txn).await?.id);
                    }

                    let mut artist_ids = Vec::new();
                    for demo in DEMO_ARTISTS {
                        let artist = entities::artist::ActiveModel {
                            name: Set(demo.name.into()),
                            city: Set(demo.city.into()),
                            state: Set(demo.state.into()),
                            phone: Set(demo.phone.into()),
                            genres: Set(strings(demo.genres)),
                            image_link: Set(Some(demo.image_link.into())),
                            facebook_link: Set(demo.facebook_link.map(Into::into)),
                            website: Set(demo.website.map(Into::into)),
                            seeking_venue: Set(demo.seeking_description.is_some()),
                            seeking_description: Set(demo.seeking_description.map(Into::into)),
                            available_times: Set(strings(demo.available_times)),
                            ..Default::default()
                        };
                        artist_ids.push(artist.insert(txn).await?.id);
                    }

                    for (artist, venue, start_time) in DEMO_SHOWS {
                        let show = entities::show::ActiveModel {
                            artist_id: Set(artist_ids[*artist]),
                            venue_id: Set(venue_ids[*venue]),
                            start_time: Set(parse_start_time(start_time)?),
                            ..Default::default()
                        };
                        show.insert(txn).await?;
                    }

                    Ok(())
                })
            })
            .await?;

        log::info!(
            "Seeded {} venues, {} artists and {} shows",
            DEMO_VENUES.len(),
            DEMO_ARTISTS.len(),
            DEMO_SHOWS.len()
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::venue::VenueService;
    use crate::test_utils::{at, test_db};

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let db = test_db().await;
        let service = SeedService::new(db.clone());

        assert!(service.seed_demo_data().await.unwrap());
        assert!(!service.seed_demo_data().await.unwrap());

        let shows = entities::show::Entity::find().count(&db.conn).await.unwrap();
        assert_eq!(shows, DEMO_SHOWS.len() as u64);
    }

    #[tokio::test]
    async fn test_seeded_data_answers_demo_searches() {
        let db = test_db().await;
        SeedService::new(db.clone()).seed_demo_data().await.unwrap();

        let venues = VenueService::new(db);
        let now = at("2030-01-01 00:00:00");
        let music = venues.search("Music", now).await.unwrap();
        let names: Vec<&str> = music.data.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["The Musical Hop", "Park Square Live Music & Coffee"]);
        assert_eq!(music.data[1].num_upcoming_shows, 3);
    }
}
