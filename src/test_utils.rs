use std::sync::Arc;

use chrono::NaiveDateTime;
use sea_orm::{ActiveModelTrait, Database as SeaDatabase, Set};

use crate::database::Database;
use crate::entities::{self, StringVec};

pub async fn test_db() -> Arc<Database> {
    let conn = SeaDatabase::connect("sqlite::memory:").await.unwrap();
    Arc::new(Database::from_connection(conn).await.unwrap())
}

pub fn at(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").unwrap()
}

pub async fn insert_venue(db: &Database, name: &str, city: &str, state: &str) -> entities::venue::Model {
    let venue = entities::venue::ActiveModel {
        name: Set(name.into()),
        city: Set(city.into()),
        state: Set(state.into()),
        address: Set("1015 Folsom Street".into()),
        phone: Set("123-123-1234".into()),
        genres: Set(StringVec(vec!["Jazz".into()])),
        image_link: Set(Some(format!("https://images.example.com/{}.jpg", name.len()))),
        facebook_link: Set(None),
        website: Set(None),
        seeking_talent: Set(false),
        seeking_description: Set(None),
        ..Default::default()
    };
    venue.insert(&db.conn).await.unwrap()
}

pub async fn insert_artist(
    db: &Database,
    name: &str,
    city: &str,
    state: &str,
    available_times: &[&str],
) -> entities::artist::Model {
    let artist = entities::artist::ActiveModel {
        name: Set(name.into()),
        city: Set(city.into()),
        state: Set(state.into()),
        phone: Set("326-123-5000".into()),
        genres: Set(StringVec(vec!["Rock n Roll".into()])),
        image_link: Set(None),
        facebook_link: Set(None),
        website: Set(None),
        seeking_venue: Set(false),
        seeking_description: Set(None),
        available_times: Set(StringVec(
            available_times.iter().map(|t| t.to_string()).collect(),
        )),
        ..Default::default()
    };
    artist.insert(&db.conn).await.unwrap()
}

pub async fn insert_show(
    db: &Database,
    artist_id: i64,
    venue_id: i64,
    start_time: &str,
) -> entities::show::Model {
    let show = entities::show::ActiveModel {
        artist_id: Set(artist_id),
        venue_id: Set(venue_id),
        start_time: Set(at(start_time)),
        ..Default::default()
    };
    show.insert(&db.conn).await.unwrap()
}
