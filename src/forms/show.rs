use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::forms::{FormErrors, REQUIRED};
use crate::services::query::{START_TIME_FORMAT, format_start_time};

/// Format produced by `<input type="datetime-local">`.
const DATETIME_LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShowForm {
    pub artist_id: String,
    pub venue_id: String,
    pub start_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowInput {
    pub artist_id: i64,
    pub venue_id: i64,
    pub start_time: NaiveDateTime,
}

/// Accepts `YYYY-MM-DD HH:MM:SS`, its `T`-separated form and the minute
/// precision `YYYY-MM-DDTHH:MM` sent by browsers.
pub fn parse_start_time(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    [START_TIME_FORMAT, "%Y-%m-%dT%H:%M:%S", DATETIME_LOCAL_FORMAT]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

fn positive_id(errors: &mut FormErrors, field: &'static str, value: &str) -> i64 {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
        return 0;
    }
    match value.parse::<i64>() {
        Ok(id) if id > 0 => id,
        _ => {
            errors.add(field, "Not a valid id.");
            0
        }
    }
}

impl ShowForm {
    /// Empty form with the start time preset to `now`.
    pub fn starting_at(now: NaiveDateTime) -> Self {
        Self {
            start_time: format_start_time(&now),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<ShowInput, FormErrors> {
        let mut errors = FormErrors::default();

        let artist_id = positive_id(&mut errors, "artist_id", &self.artist_id);
        let venue_id = positive_id(&mut errors, "venue_id", &self.venue_id);
        let start_time = if self.start_time.trim().is_empty() {
            errors.add("start_time", REQUIRED);
            None
        } else {
            let parsed = parse_start_time(&self.start_time);
            if parsed.is_none() {
                errors.add("start_time", "Not a valid date and time.");
            }
            parsed
        };

        match start_time {
            Some(start_time) => errors.finish(ShowInput {
                artist_id,
                venue_id,
                start_time,
            }),
            None => Err(errors),
        }
    }
}
