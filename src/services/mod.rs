use std::collections::HashMap;

pub mod artist;
pub mod error;
pub mod query;
pub mod seed;
pub mod show;
pub mod venue;

/// Id and name of a venue or artist plus its number of upcoming shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySummary {
    pub id: i64,
    pub name: String,
    pub num_upcoming_shows: i64,
}

impl EntitySummary {
    pub fn new(id: i64, name: String, upcoming_counts: &HashMap<i64, i64>) -> Self {
        Self {
            id,
            name,
            num_upcoming_shows: upcoming_counts.get(&id).copied().unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchResults {
    pub count: usize,
    pub data: Vec<EntitySummary>,
}

impl SearchResults {
    pub fn new(data: Vec<EntitySummary>) -> Self {
        Self {
            count: data.len(),
            data,
        }
    }
}

/// One show on a venue or artist page, described by the other side of the booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowSummary {
    pub counterpart_id: i64,
    pub counterpart_name: String,
    pub counterpart_image_link: Option<String>,
    pub start_time: String,
}
