use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};

use crate::database::Database;
use crate::entities::{self, StringVec};
use crate::forms::venue::VenueInput;
use crate::services::error::{BookingError, BookingResult, EntityKind};
use crate::services::query::{
    SearchQuery, ShowOwner, format_start_time, partition_by_start, upcoming_show_counts,
};
use crate::services::{EntitySummary, SearchResults, ShowSummary};

/// Venues sharing one (city, state) pair.
#[derive(Debug, Clone)]
pub struct VenueArea {
    pub city: String,
    pub state: String,
    pub venues: Vec<EntitySummary>,
}

#[derive(Debug, Clone)]
pub struct VenueDetail {
    pub venue: entities::venue::Model,
    pub past_shows: Vec<ShowSummary>,
    pub upcoming_shows: Vec<ShowSummary>,
}

impl VenueDetail {
    pub fn past_shows_count(&self) -> usize {
        self.past_shows.len()
    }

    pub fn upcoming_shows_count(&self) -> usize {
        self.upcoming_shows.len()
    }
}

pub struct VenueService {
    db: Arc<Database>,
}

impl VenueService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// All venues grouped by location, areas ordered by (state, city).
    pub async fn list_areas(&self, now: NaiveDateTime) -> BookingResult<Vec<VenueArea>> {
        let venues = entities::venue::Entity::find()
            .order_by_asc(entities::venue::Column::Id)
            .all(&self.db.conn)
            .await?;

        let ids: Vec<i64> = venues.iter().map(|v| v.id).collect();
        let counts = upcoming_show_counts(&self.db.conn, ShowOwner::Venue, &ids, now).await?;

        // Keyed by (state, city) so iteration order is the display order
        let mut areas: BTreeMap<(String, String), Vec<EntitySummary>> = BTreeMap::new();
        for venue in venues {
            let summary = EntitySummary::new(venue.id, venue.name, &counts);
            areas
                .entry((venue.state, venue.city))
                .or_default()
                .push(summary);
        }

        Ok(areas
            .into_iter()
            .map(|((state, city), venues)| VenueArea {
                city,
                state,
                venues,
            })
            .collect())
    }

    pub async fn search(&self, term: &str, now: NaiveDateTime) -> BookingResult<SearchResults> {
        let search = SearchQuery::parse(term);
        log::debug!("Searching venues: {:?}", search);

        let venues: Vec<entities::venue::Model> = entities::venue::Entity::find()
            .order_by_asc(entities::venue::Column::Id)
            .all(&self.db.conn)
            .await?
            .into_iter()
            .filter(|venue| search.matches(venue))
            .collect();

        let ids: Vec<i64> = venues.iter().map(|v| v.id).collect();
        let counts = upcoming_show_counts(&self.db.conn, ShowOwner::Venue, &ids, now).await?;

        let data: Vec<EntitySummary> = venues
            .into_iter()
            .map(|v| EntitySummary::new(v.id, v.name, &counts))
            .collect();

        Ok(SearchResults::new(data))
    }

    pub async fn get(&self, id: i64) -> BookingResult<entities::venue::Model> {
        entities::venue::Entity::find_by_id(id)
            .one(&self.db.conn)
            .await?
            .ok_or(BookingError::not_found(EntityKind::Venue, id))
    }

    /// Venue with its shows split into past and upcoming, each show carrying
    /// the performing artist's id, name and image.
    pub async fn get_detail(&self, id: i64, now: NaiveDateTime) -> BookingResult<VenueDetail> {
        let venue = self.get(id).await?;

        let shows = entities::show::Entity::find()
            .filter(entities::show::Column::VenueId.eq(venue.id))
            .find_also_related(entities::artist::Entity)
            .order_by_asc(entities::show::Column::StartTime)
            .all(&self.db.conn)
            .await?;

        let summaries: Vec<(NaiveDateTime, ShowSummary)> = shows
            .into_iter()
            .filter_map(|(show, artist)| {
                let artist = artist?;
                Some((
                    show.start_time,
                    ShowSummary {
                        counterpart_id: artist.id,
                        counterpart_name: artist.name,
                        counterpart_image_link: artist.image_link,
                        start_time: format_start_time(&show.start_time),
                    },
                ))
            })
            .collect();

        let partitioned = partition_by_start(summaries, now, |(start, _)| *start);

        Ok(VenueDetail {
            venue,
            past_shows: partitioned.past.into_iter().map(|(_, s)| s).collect(),
            upcoming_shows: partitioned.upcoming.into_iter().map(|(_, s)| s).collect(),
        })
    }

    /// Most recently listed venues, newest first.
    pub async fn recent(&self, limit: u64) -> BookingResult<Vec<entities::venue::Model>> {
        let venues = entities::venue::Entity::find()
            .order_by_desc(entities::venue::Column::Id)
            .limit(limit)
            .all(&self.db.conn)
            .await?;
        Ok(venues)
    }

    pub async fn create(&self, input: VenueInput) -> BookingResult<entities::venue::Model> {
        log::info!("Creating venue: {}", input.name);

        let result = self
            .db
            .conn
            .transaction::<_, entities::venue::Model, BookingError>(|txn| {
                Box::pin(async move {
                    let venue = entities::venue::ActiveModel {
                        name: Set(input.name),
                        city: Set(input.city),
                        state: Set(input.state),
                        address: Set(input.address),
                        phone: Set(input.phone),
                        genres: Set(StringVec(input.genres)),
                        image_link: Set(input.image_link),
                        facebook_link: Set(input.facebook_link),
                        website: Set(input.website),
                        seeking_talent: Set(input.seeking_talent),
                        seeking_description: Set(input.seeking_description),
                        ..Default::default()
                    };
                    Ok(venue.insert(txn).await?)
                })
            })
            .await;

        match result {
            Ok(venue) => {
                log::info!("Venue created successfully: {} (ID: {})", venue.name, venue.id);
                Ok(venue)
            }
            Err(e) => {
                let err = BookingError::from(e);
                log::error!("Error creating venue: {}", err);
                Err(err)
            }
        }
    }

    /// Overwrite every editable field with the submitted values.
    pub async fn update(&self, id: i64, input: VenueInput) -> BookingResult<entities::venue::Model> {
        let result = self
            .db
            .conn
            .transaction::<_, entities::venue::Model, BookingError>(|txn| {
                Box::pin(async move {
                    let venue = entities::venue::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or(BookingError::not_found(EntityKind::Venue, id))?;

                    let mut active: entities::venue::ActiveModel = venue.into();
                    active.name = Set(input.name);
                    active.city = Set(input.city);
                    active.state = Set(input.state);
                    active.address = Set(input.address);
                    active.phone = Set(input.phone);
                    active.genres = Set(StringVec(input.genres));
                    active.image_link = Set(input.image_link);
                    active.facebook_link = Set(input.facebook_link);
                    active.website = Set(input.website);
                    active.seeking_talent = Set(input.seeking_talent);
                    active.seeking_description = Set(input.seeking_description);
                    Ok(active.update(txn).await?)
                })
            })
            .await;

        match result {
            Ok(venue) => {
                log::info!("Venue updated: {} (ID: {})", venue.name, venue.id);
                Ok(venue)
            }
            Err(e) => {
                let err = BookingError::from(e);
                log::error!("Error updating venue {}: {}", id, err);
                Err(err)
            }
        }
    }

    /// Delete a venue together with the shows booked there.
    pub async fn delete(&self, id: i64) -> BookingResult<()> {
        let result = self
            .db
            .conn
            .transaction::<_, (), BookingError>(|txn| {
                Box::pin(async move {
                    let venue = entities::venue::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or(BookingError::not_found(EntityKind::Venue, id))?;

                    let removed = entities::show::Entity::delete_many()
                        .filter(entities::show::Column::VenueId.eq(id))
                        .exec(txn)
                        .await?;
                    log::debug!("Removed {} shows of venue {}", removed.rows_affected, id);

                    venue.delete(txn).await?;
                    Ok(())
                })
            })
            .await;

        match result {
            Ok(()) => {
                log::info!("Venue deleted (ID: {})", id);
                Ok(())
            }
            Err(e) => {
                let err = BookingError::from(e);
                log::error!("Error deleting venue {}: {}", id, err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{at, insert_artist, insert_show, insert_venue, test_db};

    fn venue_input(name: &str) -> VenueInput {
        VenueInput {
            name: name.into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            address: "1015 Folsom Street".into(),
            phone: "123-123-1234".into(),
            genres: vec!["Jazz".into(), "Reggae".into()],
            image_link: None,
            facebook_link: Some("https://www.facebook.com/TheMusicalHop".into()),
            website: Some("https://www.themusicalhop.com".into()),
            seeking_talent: true,
            seeking_description: Some("We are on the lookout for a local artist".into()),
        }
    }

    #[tokio::test]
    async fn test_list_areas_groups_and_sorts_by_state_then_city() {
        let db = test_db().await;
        insert_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        insert_venue(&db, "The Dueling Pianos Bar", "New York", "NY").await;
        insert_venue(&db, "Park Square Live Music & Coffee", "San Francisco", "CA").await;
        insert_venue(&db, "Sunset Lounge", "Los Angeles", "CA").await;

        let service = VenueService::new(db);
        let areas = service.list_areas(at("2030-01-01 00:00:00")).await.unwrap();

        let keys: Vec<(&str, &str)> = areas
            .iter()
            .map(|a| (a.city.as_str(), a.state.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("Los Angeles", "CA"),
                ("San Francisco", "CA"),
                ("New York", "NY")
            ]
        );

        let sf: Vec<&str> = areas[1].venues.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(sf, vec!["The Musical Hop", "Park Square Live Music & Coffee"]);
    }

    #[tokio::test]
    async fn test_list_areas_counts_upcoming_shows() {
        let db = test_db().await;
        let hop = insert_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        let artist = insert_artist(&db, "Guns N Petals", "San Francisco", "CA", &[]).await;
        insert_show(&db, artist.id, hop.id, "2019-05-21 21:30:00").await;
        insert_show(&db, artist.id, hop.id, "2035-04-01 20:00:00").await;

        let service = VenueService::new(db);
        let now = at("2030-01-01 00:00:00");
        let areas = service.list_areas(now).await.unwrap();
        assert_eq!(areas[0].venues[0].id, hop.id);
        assert_eq!(areas[0].venues[0].num_upcoming_shows, 1);
    }

    #[tokio::test]
    async fn test_search_by_partial_name_is_case_insensitive() {
        let db = test_db().await;
        insert_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        insert_venue(&db, "Park Square Live Music & Coffee", "San Francisco", "CA").await;
        insert_venue(&db, "The Dueling Pianos Bar", "New York", "NY").await;

        let service = VenueService::new(db);
        let now = at("2030-01-01 00:00:00");

        let hop = service.search("Hop", now).await.unwrap();
        assert_eq!(hop.count, 1);
        assert_eq!(hop.data[0].name, "The Musical Hop");

        let music = service.search("music", now).await.unwrap();
        let names: Vec<&str> = music.data.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["The Musical Hop", "Park Square Live Music & Coffee"]);
    }

    #[tokio::test]
    async fn test_search_by_city_and_state() {
        let db = test_db().await;
        insert_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        insert_venue(&db, "The Dueling Pianos Bar", "New York", "NY").await;

        let service = VenueService::new(db);
        let results = service
            .search("new york, ny", at("2030-01-01 00:00:00"))
            .await
            .unwrap();
        assert_eq!(results.count, 1);
        assert_eq!(results.data[0].name, "The Dueling Pianos Bar");
    }

    #[tokio::test]
    async fn test_search_folds_non_ascii_case() {
        let db = test_db().await;
        insert_venue(&db, "Café Élan", "Zürich", "CA").await;
        insert_venue(&db, "The Musical Hop", "San Francisco", "CA").await;

        let service = VenueService::new(db);
        let now = at("2030-01-01 00:00:00");

        let by_name = service.search("CAFÉ ÉLAN", now).await.unwrap();
        assert_eq!(by_name.count, 1);
        assert_eq!(by_name.data[0].name, "Café Élan");

        let by_location = service.search("zÜrich, ca", now).await.unwrap();
        assert_eq!(by_location.count, 1);
        assert_eq!(by_location.data[0].name, "Café Élan");
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let db = test_db().await;
        insert_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        insert_venue(&db, "100% Jazz_Club", "New York", "NY").await;

        let service = VenueService::new(db);
        let now = at("2030-01-01 00:00:00");

        let underscore = service.search("_", now).await.unwrap();
        assert_eq!(underscore.count, 1);
        assert_eq!(underscore.data[0].name, "100% Jazz_Club");

        assert_eq!(service.search("%", now).await.unwrap().count, 1);
    }

    #[tokio::test]
    async fn test_get_detail_partitions_shows() {
        let db = test_db().await;
        let hop = insert_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        let artist = insert_artist(&db, "Guns N Petals", "San Francisco", "CA", &[]).await;
        insert_show(&db, artist.id, hop.id, "2019-05-21 21:30:00").await;
        insert_show(&db, artist.id, hop.id, "2030-01-01 00:00:00").await;
        insert_show(&db, artist.id, hop.id, "2035-04-01 20:00:00").await;

        let service = VenueService::new(db);
        let detail = service
            .get_detail(hop.id, at("2030-01-01 00:00:00"))
            .await
            .unwrap();

        assert_eq!(detail.past_shows_count(), 1);
        assert_eq!(detail.upcoming_shows_count(), 1);
        assert_eq!(detail.past_shows[0].counterpart_name, "Guns N Petals");
        assert_eq!(detail.past_shows[0].start_time, "2019-05-21 21:30:00");
        assert_eq!(detail.upcoming_shows[0].counterpart_id, artist.id);
    }

    #[tokio::test]
    async fn test_get_detail_not_found() {
        let db = test_db().await;
        let service = VenueService::new(db);
        let result = service.get_detail(999, at("2030-01-01 00:00:00")).await;
        assert!(matches!(
            result,
            Err(BookingError::NotFound {
                entity: EntityKind::Venue,
                id: 999
            })
        ));
    }

    #[tokio::test]
    async fn test_create_duplicate_name_rolls_back() {
        let db = test_db().await;
        let service = VenueService::new(db.clone());

        service.create(venue_input("The Musical Hop")).await.unwrap();
        let duplicate = service.create(venue_input("The Musical Hop")).await;
        assert!(matches!(duplicate, Err(BookingError::ConstraintViolation(_))));

        let all = entities::venue::Entity::find().all(&db.conn).await.unwrap();
        assert_eq!(all.len(), 1);

        let retry = service.create(venue_input("The Musical Hop 2")).await.unwrap();
        assert_eq!(retry.name, "The Musical Hop 2");
    }

    #[tokio::test]
    async fn test_update_overwrites_all_fields() {
        let db = test_db().await;
        let service = VenueService::new(db);
        let venue = service.create(venue_input("The Musical Hop")).await.unwrap();

        let mut input = venue_input("The Musical Hop");
        input.city = "Oakland".into();
        input.website = None;
        input.seeking_talent = false;
        input.seeking_description = None;

        let updated = service.update(venue.id, input).await.unwrap();
        assert_eq!(updated.city, "Oakland");
        assert_eq!(updated.website, None);
        assert!(!updated.seeking_talent);
        assert_eq!(updated.seeking_description, None);
        assert_eq!(updated.genres.0, vec!["Jazz", "Reggae"]);
    }

    #[tokio::test]
    async fn test_update_missing_venue() {
        let db = test_db().await;
        let service = VenueService::new(db);
        let result = service.update(5, venue_input("Ghost")).await;
        assert!(matches!(result, Err(BookingError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_removes_venue_and_its_shows() {
        let db = test_db().await;
        let hop = insert_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        let other = insert_venue(&db, "The Dueling Pianos Bar", "New York", "NY").await;
        let artist = insert_artist(&db, "Guns N Petals", "San Francisco", "CA", &[]).await;
        insert_show(&db, artist.id, hop.id, "2035-04-01 20:00:00").await;
        insert_show(&db, artist.id, other.id, "2035-04-02 20:00:00").await;

        let service = VenueService::new(db.clone());
        service.delete(hop.id).await.unwrap();

        assert!(matches!(
            service.get(hop.id).await,
            Err(BookingError::NotFound { .. })
        ));
        let shows = entities::show::Entity::find().all(&db.conn).await.unwrap();
        assert_eq!(shows.len(), 1);
        assert_eq!(shows[0].venue_id, other.id);
    }

    #[tokio::test]
    async fn test_delete_missing_venue() {
        let db = test_db().await;
        let service = VenueService::new(db);
        assert!(matches!(
            service.delete(1).await,
            Err(BookingError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_recent_newest_first() {
        let db = test_db().await;
        for i in 0..12 {
            insert_venue(&db, &format!("Venue {i}"), "Austin", "TX").await;
        }
        let service = VenueService::new(db);
        let recent = service.recent(10).await.unwrap();
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].name, "Venue 11");
        assert_eq!(recent[9].name, "Venue 2");
    }
}
