use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub mod artist;
pub mod show;
pub mod venue;

/// Ordered list of strings stored as a JSON array column.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct StringVec(pub Vec<String>);

impl StringVec {
    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|v| v == value)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}
