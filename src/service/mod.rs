pub mod announcement_service;

use std::path::PathBuf;
use std::sync::Arc;
use crate::repository::AnnouncementRepository;

pub use announcement_service::{AnnouncementService, BoardView};

pub struct ServiceContext {
    pub announcement_service: Arc<AnnouncementService>,
}

impl ServiceContext {
    pub fn new(
        announcement_repo: Arc<dyn AnnouncementRepository>,
        images_dir: impl Into<PathBuf>,
    ) -> Self {
        let announcement_service =
            Arc::new(AnnouncementService::new(announcement_repo, images_dir));

        Self {
            announcement_service,
        }
    }
}
