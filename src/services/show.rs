use std::collections::HashMap;
use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::database::Database;
use crate::entities;
use crate::forms::show::ShowInput;
use crate::services::error::{BookingError, BookingResult, EntityKind};
use crate::services::query::format_start_time;

/// A show with the names needed to display it without further lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowListing {
    pub venue_id: i64,
    pub venue_name: String,
    pub artist_id: i64,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: String,
}

pub struct ShowService {
    db: Arc<Database>,
}

impl ShowService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> BookingResult<Vec<ShowListing>> {
        let show_artist_pairs = entities::show::Entity::find()
            .order_by_asc(entities::show::Column::StartTime)
            .find_also_related(entities::artist::Entity)
            .all(&self.db.conn)
            .await?;

        let venue_ids: Vec<i64> = show_artist_pairs.iter().map(|(s, _)| s.venue_id).collect();
        let venues: HashMap<i64, String> = entities::venue::Entity::find()
            .filter(entities::venue::Column::Id.is_in(venue_ids))
            .all(&self.db.conn)
            .await?
            .into_iter()
            .map(|v| (v.id, v.name))
            .collect();

        let mut listings = Vec::with_capacity(show_artist_pairs.len());
        for (show, artist) in show_artist_pairs {
            let (Some(artist), Some(venue_name)) = (artist, venues.get(&show.venue_id)) else {
                log::warn!("Skipping show {} with a missing artist or venue", show.id);
                continue;
            };
            listings.push(ShowListing {
                venue_id: show.venue_id,
                venue_name: venue_name.clone(),
                artist_id: artist.id,
                artist_name: artist.name,
                artist_image_link: artist.image_link,
                start_time: format_start_time(&show.start_time),
            });
        }

        Ok(listings)
    }

    /// Book an artist at a venue. The start time must be one of the artist's
    /// available times, compared as formatted text.
    pub async fn create(&self, input: ShowInput) -> BookingResult<entities::show::Model> {
        log::info!(
            "Creating show: artist {} at venue {} on {}",
            input.artist_id,
            input.venue_id,
            input.start_time
        );

        let result = self
            .db
            .conn
            .transaction::<_, entities::show::Model, BookingError>(|txn| {
                Box::pin(async move {
                    let artist = entities::artist::Entity::find_by_id(input.artist_id)
                        .one(txn)
                        .await?
                        .ok_or(BookingError::not_found(EntityKind::Artist, input.artist_id))?;

                    entities::venue::Entity::find_by_id(input.venue_id)
                        .one(txn)
                        .await?
                        .ok_or(BookingError::not_found(EntityKind::Venue, input.venue_id))?;

                    let start_time = format_start_time(&input.start_time);
                    if !artist.available_times.contains(&start_time) {
                        return Err(BookingError::UnavailableTime {
                            artist_id: artist.id,
                            start_time,
                        });
                    }

                    let show = entities::show::ActiveModel {
                        artist_id: Set(input.artist_id),
                        venue_id: Set(input.venue_id),
                        start_time: Set(input.start_time),
                        ..Default::default()
                    };
                    Ok(show.insert(txn).await?)
                })
            })
            .await;

        match result {
            Ok(show) => {
                log::info!("Show created (ID: {})", show.id);
                Ok(show)
            }
            Err(e) => {
                let err = BookingError::from(e);
                match err {
                    BookingError::UnavailableTime { .. } => log::info!("Show rejected: {}", err),
                    _ => log::error!("Error creating show: {}", err),
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{at, insert_artist, insert_show, insert_venue, test_db};

    #[tokio::test]
    async fn test_list_denormalizes_names() {
        let db = test_db().await;
        let artist = insert_artist(&db, "Guns N Petals", "San Francisco", "CA", &[]).await;
        let hop = insert_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        insert_show(&db, artist.id, hop.id, "2035-04-01 20:00:00").await;
        insert_show(&db, artist.id, hop.id, "2019-05-21 21:30:00").await;

        let service = ShowService::new(db);
        let shows = service.list().await.unwrap();

        assert_eq!(shows.len(), 2);
        assert_eq!(
            shows[0],
            ShowListing {
                venue_id: hop.id,
                venue_name: "The Musical Hop".into(),
                artist_id: artist.id,
                artist_name: "Guns N Petals".into(),
                artist_image_link: None,
                start_time: "2019-05-21 21:30:00".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_create_within_availability() {
        let db = test_db().await;
        let artist = insert_artist(
            &db,
            "Guns N Petals",
            "San Francisco",
            "CA",
            &["2035-04-01 20:00:00"],
        )
        .await;
        let hop = insert_venue(&db, "The Musical Hop", "San Francisco", "CA").await;

        let service = ShowService::new(db);
        let show = service
            .create(ShowInput {
                artist_id: artist.id,
                venue_id: hop.id,
                start_time: at("2035-04-01 20:00:00"),
            })
            .await
            .unwrap();
        assert_eq!(show.artist_id, artist.id);
        assert_eq!(show.venue_id, hop.id);
    }

    #[tokio::test]
    async fn test_create_outside_availability_is_not_persisted() {
        let db = test_db().await;
        let artist = insert_artist(
            &db,
            "Guns N Petals",
            "San Francisco",
            "CA",
            &["2035-04-01 20:00:00"],
        )
        .await;
        let hop = insert_venue(&db, "The Musical Hop", "San Francisco", "CA").await;

        let service = ShowService::new(db.clone());
        let result = service
            .create(ShowInput {
                artist_id: artist.id,
                venue_id: hop.id,
                start_time: at("2035-04-01 21:00:00"),
            })
            .await;

        assert!(matches!(result, Err(BookingError::UnavailableTime { .. })));
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_with_unknown_venue() {
        let db = test_db().await;
        let artist = insert_artist(
            &db,
            "Guns N Petals",
            "San Francisco",
            "CA",
            &["2035-04-01 20:00:00"],
        )
        .await;

        let service = ShowService::new(db);
        let result = service
            .create(ShowInput {
                artist_id: artist.id,
                venue_id: 404,
                start_time: at("2035-04-01 20:00:00"),
            })
            .await;
        assert!(matches!(
            result,
            Err(BookingError::NotFound {
                entity: EntityKind::Venue,
                id: 404
            })
        ));
    }
}
