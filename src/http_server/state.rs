use std::sync::Arc;

use crate::database::Database;
use crate::services::artist::ArtistService;
use crate::services::show::ShowService;
use crate::services::venue::VenueService;

pub struct AppState {
    pub db: Arc<Database>,
}

impl AppState {
    pub fn venues(&self) -> VenueService {
        VenueService::new(self.db.clone())
    }

    pub fn artists(&self) -> ArtistService {
        ArtistService::new(self.db.clone())
    }

    pub fn shows(&self) -> ShowService {
        ShowService::new(self.db.clone())
    }
}
