use std::sync::Arc;

use chrono::NaiveDateTime;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};

use crate::database::Database;
use crate::entities::{self, StringVec};
use crate::forms::artist::ArtistInput;
use crate::services::error::{BookingError, BookingResult, EntityKind};
use crate::services::query::{
    SearchQuery, ShowOwner, format_start_time, partition_by_start, upcoming_show_counts,
};
use crate::services::{EntitySummary, SearchResults, ShowSummary};

#[derive(Debug, Clone)]
pub struct ArtistDetail {
    pub artist: entities::artist::Model,
    pub past_shows: Vec<ShowSummary>,
    pub upcoming_shows: Vec<ShowSummary>,
}

impl ArtistDetail {
    pub fn past_shows_count(&self) -> usize {
        self.past_shows.len()
    }

    pub fn upcoming_shows_count(&self) -> usize {
        self.upcoming_shows.len()
    }
}

pub struct ArtistService {
    db: Arc<Database>,
}

impl ArtistService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> BookingResult<Vec<entities::artist::Model>> {
        let artists = entities::artist::Entity::find()
            .order_by_asc(entities::artist::Column::Id)
            .all(&self.db.conn)
            .await?;
        Ok(artists)
    }

    pub async fn search(&self, term: &str, now: NaiveDateTime) -> BookingResult<SearchResults> {
        let search = SearchQuery::parse(term);
        log::debug!("Searching artists: {:?}", search);

        let artists: Vec<entities::artist::Model> = entities::artist::Entity::find()
            .order_by_asc(entities::artist::Column::Id)
            .all(&self.db.conn)
            .await?
            .into_iter()
            .filter(|artist| search.matches(artist))
            .collect();

        let ids: Vec<i64> = artists.iter().map(|a| a.id).collect();
        let counts = upcoming_show_counts(&self.db.conn, ShowOwner::Artist, &ids, now).await?;

        Ok(SearchResults::new(
            artists
                .into_iter()
                .map(|a| EntitySummary::new(a.id, a.name, &counts))
                .collect(),
        ))
    }

    pub async fn get(&self, id: i64) -> BookingResult<entities::artist::Model> {
        entities::artist::Entity::find_by_id(id)
            .one(&self.db.conn)
            .await?
            .ok_or(BookingError::not_found(EntityKind::Artist, id))
    }

    /// Artist with its shows split into past and upcoming, each show carrying
    /// the hosting venue's id, name and image.
    pub async fn get_detail(&self, id: i64, now: NaiveDateTime) -> BookingResult<ArtistDetail> {
        let artist = self.get(id).await?;

        let shows = entities::show::Entity::find()
            .filter(entities::show::Column::ArtistId.eq(artist.id))
            .find_also_related(entities::venue::Entity)
            .order_by_asc(entities::show::Column::StartTime)
            .all(&self.db.conn)
            .await?;

        let summaries: Vec<(NaiveDateTime, ShowSummary)> = shows
            .into_iter()
            .filter_map(|(show, venue)| {
                let venue = venue?;
                Some((
                    show.start_time,
                    ShowSummary {
                        counterpart_id: venue.id,
                        counterpart_name: venue.name,
                        counterpart_image_link: venue.image_link,
                        start_time: format_start_time(&show.start_time),
                    },
                ))
            })
            .collect();

        let partitioned = partition_by_start(summaries, now, |(start, _)| *start);

        Ok(ArtistDetail {
            artist,
            past_shows: partitioned.past.into_iter().map(|(_, s)| s).collect(),
            upcoming_shows: partitioned.upcoming.into_iter().map(|(_, s)| s).collect(),
        })
    }

    /// Most recently listed artists, newest first.
    pub async fn recent(&self, limit: u64) -> BookingResult<Vec<entities::artist::Model>> {
        let artists = entities::artist::Entity::find()
            .order_by_desc(entities::artist::Column::Id)
            .limit(limit)
            .all(&self.db.conn)
            .await?;
        Ok(artists)
    }

    pub async fn create(&self, input: ArtistInput) -> BookingResult<entities::artist::Model> {
        log::info!("Creating artist: {}", input.name);

        let result = self
            .db
            .conn
            .transaction::<_, entities::artist::Model, BookingError>(|txn| {
                Box::pin(async move {
                    let artist = entities::artist::ActiveModel {
                        name: Set(input.name),
                        city: Set(input.city),
                        state: Set(input.state),
                        phone: Set(input.phone),
                        genres: Set(StringVec(input.genres)),
                        image_link: Set(input.image_link),
                        facebook_link: Set(input.facebook_link),
                        website: Set(input.website),
                        seeking_venue: Set(input.seeking_venue),
                        seeking_description: Set(input.seeking_description),
                        available_times: Set(StringVec(input.available_times)),
                        ..Default::default()
                    };
                    Ok(artist.insert(txn).await?)
                })
            })
            .await;

        match result {
            Ok(artist) => {
                log::info!("Artist created successfully: {} (ID: {})", artist.name, artist.id);
                Ok(artist)
            }
            Err(e) => {
                let err = BookingError::from(e);
                log::error!("Error creating artist: {}", err);
                Err(err)
            }
        }
    }

    /// Overwrite every editable field with the submitted values.
    pub async fn update(
        &self,
        id: i64,
        input: ArtistInput,
    ) -> BookingResult<entities::artist::Model> {
        let result = self
            .db
            .conn
            .transaction::<_, entities::artist::Model, BookingError>(|txn| {
                Box::pin(async move {
                    let artist = entities::artist::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or(BookingError::not_found(EntityKind::Artist, id))?;

                    let mut active: entities::artist::ActiveModel = artist.into();
                    active.name = Set(input.name);
                    active.city = Set(input.city);
                    active.state = Set(input.state);
                    active.phone = Set(input.phone);
                    active.genres = Set(StringVec(input.genres));
                    active.image_link = Set(input.image_link);
                    active.facebook_link = Set(input.facebook_link);
                    active.website = Set(input.website);
                    active.seeking_venue = Set(input.seeking_venue);
                    active.seeking_description = Set(input.seeking_description);
                    active.available_times = Set(StringVec(input.available_times));
                    Ok(active.update(txn).await?)
                })
            })
            .await;

        match result {
            Ok(artist) => {
                log::info!("Artist updated: {} (ID: {})", artist.name, artist.id);
                Ok(artist)
            }
            Err(e) => {
                let err = BookingError::from(e);
                log::error!("Error updating artist {}: {}", id, err);
                Err(err)
            }
        }
    }

    /// Delete an artist together with their shows.
    pub async fn delete(&self, id: i64) -> BookingResult<()> {
        let result = self
            .db
            .conn
            .transaction::<_, (), BookingError>(|txn| {
                Box::pin(async move {
                    let artist = entities::artist::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or(BookingError::not_found(EntityKind::Artist, id))?;

                    entities::show::Entity::delete_many()
                        .filter(entities::show::Column::ArtistId.eq(id))
                        .exec(txn)
                        .await?;

                    artist.delete(txn).await?;
                    Ok(())
                })
            })
            .await;

        match result {
            Ok(()) => {
                log::info!("Artist deleted (ID: {})", id);
                Ok(())
            }
            Err(e) => {
                let err = BookingError::from(e);
                log::error!("Error deleting artist {}: {}", id, err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{at, insert_artist, insert_show, insert_venue, test_db};

    fn artist_input(name: &str) -> ArtistInput {
        ArtistInput {
            name: name.into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            phone: "326-123-5000".into(),
            genres: vec!["Rock n Roll".into()],
            image_link: Some("https://images.example.com/petals.jpg".into()),
            facebook_link: None,
            website: Some("https://www.gunsnpetalsband.com".into()),
            seeking_venue: true,
            seeking_description: Some("Looking for shows to perform at".into()),
            available_times: vec!["2035-04-01 20:00:00".into()],
        }
    }

    #[tokio::test]
    async fn test_search_matches_partial_names() {
        let db = test_db().await;
        insert_artist(&db, "Guns N Petals", "San Francisco", "CA", &[]).await;
        insert_artist(&db, "Matt Quevedo", "New York", "NY", &[]).await;
        insert_artist(&db, "The Wild Sax Band", "San Francisco", "CA", &[]).await;

        let service = ArtistService::new(db);
        let now = at("2030-01-01 00:00:00");

        assert_eq!(service.search("A", now).await.unwrap().count, 3);

        let band = service.search("band", now).await.unwrap();
        assert_eq!(band.count, 1);
        assert_eq!(band.data[0].name, "The Wild Sax Band");
    }

    #[tokio::test]
    async fn test_search_by_location_counts_upcoming() {
        let db = test_db().await;
        let petals = insert_artist(&db, "Guns N Petals", "San Francisco", "CA", &[]).await;
        insert_artist(&db, "Matt Quevedo", "New York", "NY", &[]).await;
        let hop = insert_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        insert_show(&db, petals.id, hop.id, "2035-04-01 20:00:00").await;
        insert_show(&db, petals.id, hop.id, "2019-05-21 21:30:00").await;

        let service = ArtistService::new(db);
        let results = service
            .search("san fran, ca", at("2030-01-01 00:00:00"))
            .await
            .unwrap();
        assert_eq!(results.count, 1);
        assert_eq!(results.data[0].id, petals.id);
        assert_eq!(results.data[0].num_upcoming_shows, 1);
    }

    #[tokio::test]
    async fn test_search_folds_non_ascii_case() {
        let db = test_db().await;
        let olafur = insert_artist(&db, "Ólafur Arnalds", "Reykjavík", "WA", &[]).await;
        insert_artist(&db, "Matt Quevedo", "New York", "NY", &[]).await;

        let service = ArtistService::new(db);
        let now = at("2030-01-01 00:00:00");

        let results = service.search("óLAFUR", now).await.unwrap();
        assert_eq!(results.count, 1);
        assert_eq!(results.data[0].id, olafur.id);

        let results = service.search("REYKJAVÍK, wa", now).await.unwrap();
        assert_eq!(results.count, 1);
        assert_eq!(results.data[0].id, olafur.id);
    }

    #[tokio::test]
    async fn test_get_detail_lists_venues() {
        let db = test_db().await;
        let artist = insert_artist(&db, "Guns N Petals", "San Francisco", "CA", &[]).await;
        let hop = insert_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        insert_show(&db, artist.id, hop.id, "2019-05-21 21:30:00").await;

        let service = ArtistService::new(db);
        let detail = service
            .get_detail(artist.id, at("2030-01-01 00:00:00"))
            .await
            .unwrap();
        assert_eq!(detail.past_shows_count(), 1);
        assert_eq!(detail.upcoming_shows_count(), 0);
        assert_eq!(detail.past_shows[0].counterpart_id, hop.id);
        assert_eq!(detail.past_shows[0].counterpart_name, "The Musical Hop");
        assert_eq!(detail.past_shows[0].counterpart_image_link, hop.image_link);
    }

    #[tokio::test]
    async fn test_update_overwrites_every_field() {
        let db = test_db().await;
        let service = ArtistService::new(db);
        let artist = service.create(artist_input("Guns N Petals")).await.unwrap();

        // Resubmit the same snapshot with only the city changed
        let mut input = artist_input("Guns N Petals");
        input.city = "Oakland".into();
        let updated = service.update(artist.id, input).await.unwrap();

        assert_eq!(updated.city, "Oakland");
        assert_eq!(updated.name, artist.name);
        assert_eq!(updated.genres, artist.genres);
        assert_eq!(updated.available_times, artist.available_times);

        // A snapshot that omits optional values clears them
        let mut cleared = artist_input("Guns N Petals");
        cleared.city = "Oakland".into();
        cleared.website = None;
        cleared.available_times = vec![];
        let updated = service.update(artist.id, cleared).await.unwrap();
        assert_eq!(updated.website, None);
        assert!(updated.available_times.0.is_empty());
    }

    #[tokio::test]
    async fn test_update_to_duplicate_name_fails() {
        let db = test_db().await;
        let service = ArtistService::new(db);
        service.create(artist_input("Guns N Petals")).await.unwrap();
        let other = service.create(artist_input("Matt Quevedo")).await.unwrap();

        let result = service.update(other.id, artist_input("Guns N Petals")).await;
        assert!(matches!(result, Err(BookingError::ConstraintViolation(_))));
        assert_eq!(service.get(other.id).await.unwrap().name, "Matt Quevedo");
    }

    #[tokio::test]
    async fn test_delete_removes_artist_shows() {
        let db = test_db().await;
        let artist = insert_artist(&db, "Guns N Petals", "San Francisco", "CA", &[]).await;
        let hop = insert_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        insert_show(&db, artist.id, hop.id, "2035-04-01 20:00:00").await;

        let service = ArtistService::new(db.clone());
        service.delete(artist.id).await.unwrap();

        assert!(service.list().await.unwrap().is_empty());
        let shows = entities::show::Entity::find().all(&db.conn).await.unwrap();
        assert!(shows.is_empty());
    }
}
