use std::fmt;

use sea_orm::{DbErr, SqlErr, TransactionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Venue,
    Artist,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Venue => "Venue",
            EntityKind::Artist => "Artist",
        };
        f.write_str(name)
    }
}

/// Failure of a persistence operation, classified so callers can react to
/// the kind of failure instead of a bare "something went wrong".
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: i64 },

    #[error("Artist {artist_id} is not available at {start_time}")]
    UnavailableTime { artist_id: i64, start_time: String },

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Database error: {0}")]
    Database(DbErr),
}

pub type BookingResult<T> = Result<T, BookingError>;

impl BookingError {
    pub fn not_found(entity: EntityKind, id: i64) -> Self {
        Self::NotFound { entity, id }
    }
}

impl From<DbErr> for BookingError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(reason))
            | Some(SqlErr::ForeignKeyConstraintViolation(reason)) => {
                Self::ConstraintViolation(reason)
            }
            _ => Self::Database(err),
        }
    }
}

impl From<TransactionError<BookingError>> for BookingError {
    fn from(err: TransactionError<BookingError>) -> Self {
        match err {
            TransactionError::Connection(db_err) => db_err.into(),
            TransactionError::Transaction(booking_err) => booking_err,
        }
    }
}
