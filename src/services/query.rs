use std::collections::HashMap;

use chrono::NaiveDateTime;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect};

use crate::entities;

/// Format used for show start times everywhere they are rendered or compared as text.
pub const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_start_time(start_time: &NaiveDateTime) -> String {
    start_time.format(START_TIME_FORMAT).to_string()
}

// ============================================================================
// Search predicates
// ============================================================================

/// How a free-text search term is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    /// Case-insensitive substring match on the name
    Name(String),
    /// "city, state": case-insensitive substring match on both columns
    Location { city: String, state: String },
}

impl SearchQuery {
    /// A term that splits into exactly two comma-separated segments is a
    /// location search, anything else searches by name.
    pub fn parse(term: &str) -> Self {
        let segments: Vec<&str> = term.split(',').collect();
        match segments.as_slice() {
            [city, state] => SearchQuery::Location {
                city: city.trim().to_string(),
                state: state.trim().to_string(),
            },
            _ => SearchQuery::Name(term.to_string()),
        }
    }

    /// Unicode-aware, case-insensitive match against a record.
    ///
    /// Matching happens here rather than in SQL: SQLite's `LIKE` only folds
    /// ASCII letters and treats `%` and `_` in the term as wildcards.
    pub fn matches<T: Searchable>(&self, record: &T) -> bool {
        match self {
            SearchQuery::Name(name) => contains_folded(record.name(), name),
            SearchQuery::Location { city, state } => {
                contains_folded(record.city(), city) && contains_folded(record.state(), state)
            }
        }
    }
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Records that can be searched by name or by location.
pub trait Searchable {
    fn name(&self) -> &str;
    fn city(&self) -> &str;
    fn state(&self) -> &str;
}

impl Searchable for entities::venue::Model {
    fn name(&self) -> &str {
        &self.name
    }

    fn city(&self) -> &str {
        &self.city
    }

    fn state(&self) -> &str {
        &self.state
    }
}

impl Searchable for entities::artist::Model {
    fn name(&self) -> &str {
        &self.name
    }

    fn city(&self) -> &str {
        &self.city
    }

    fn state(&self) -> &str {
        &self.state
    }
}

// ============================================================================
// Show aggregation
// ============================================================================

/// Side of the show relation to aggregate on.
#[derive(Debug, Clone, Copy)]
pub enum ShowOwner {
    Venue,
    Artist,
}

impl ShowOwner {
    fn column(self) -> entities::show::Column {
        match self {
            ShowOwner::Venue => entities::show::Column::VenueId,
            ShowOwner::Artist => entities::show::Column::ArtistId,
        }
    }
}

/// Count shows strictly after `now` for each owner id. Owners without
/// upcoming shows are absent from the map.
pub async fn upcoming_show_counts<C: ConnectionTrait>(
    conn: &C,
    owner: ShowOwner,
    owner_ids: &[i64],
    now: NaiveDateTime,
) -> Result<HashMap<i64, i64>, DbErr> {
    if owner_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let column = owner.column();
    let rows: Vec<(i64, i64)> = entities::show::Entity::find()
        .select_only()
        .column(column)
        .column_as(entities::show::Column::Id.count(), "num_upcoming_shows")
        .filter(column.is_in(owner_ids.iter().copied()))
        .filter(entities::show::Column::StartTime.gt(now))
        .group_by(column)
        .into_tuple()
        .all(conn)
        .await?;

    Ok(rows.into_iter().collect())
}

/// Past and upcoming shows relative to a point in time.
#[derive(Debug)]
pub struct PartitionedShows<T> {
    pub past: Vec<T>,
    pub upcoming: Vec<T>,
}

/// Split items by start time. Items starting exactly at `now` belong to
/// neither bucket.
pub fn partition_by_start<T>(
    items: Vec<T>,
    now: NaiveDateTime,
    start_time: impl Fn(&T) -> NaiveDateTime,
) -> PartitionedShows<T> {
    let mut past = Vec::new();
    let mut upcoming = Vec::new();
    for item in items {
        let start = start_time(&item);
        if start < now {
            past.push(item);
        } else if start > now {
            upcoming.push(item);
        }
    }
    PartitionedShows { past, upcoming }
}
