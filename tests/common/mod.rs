#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use chrono::NaiveDate;
use lostfound::{
    api,
    config::Settings,
    domain::{Category, City, NewAnnouncement, PostType},
    repository::CsvAnnouncementRepository,
    service::ServiceContext,
};
use tempfile::TempDir;

/// A board rooted in a scratch directory.
pub struct TestBoard {
    pub dir: TempDir,
    pub context: Arc<ServiceContext>,
    pub settings: Settings,
}

impl TestBoard {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut settings = Settings::default();
        settings.storage.data_file =
            dir.path().join("announcements.csv").to_string_lossy().into_owned();
        settings.storage.images_dir = dir.path().join("images").to_string_lossy().into_owned();

        let context = Arc::new(ServiceContext::new(
            Arc::new(CsvAnnouncementRepository::new(&settings.storage.data_file)),
            &settings.storage.images_dir,
        ));

        Self { dir, context, settings }
    }

    /// A fresh repository over the same file, to observe what was persisted.
    pub fn reopen(&self) -> CsvAnnouncementRepository {
        CsvAnnouncementRepository::new(&self.settings.storage.data_file)
    }

    pub fn app(&self) -> Router {
        api::create_app(self.context.clone(), Arc::new(self.settings.clone()))
    }
}

pub fn submission(post_type: PostType, city: City, event_date: (i32, u32, u32)) -> NewAnnouncement {
    NewAnnouncement {
        post_type,
        category: Category::Electronics,
        city,
        description: "Black phone with a cracked case".to_string(),
        event_date: NaiveDate::from_ymd_opt(event_date.0, event_date.1, event_date.2)
            .expect("valid date"),
        phone: "12345678".to_string(),
        delete_password: "hunter2".to_string(),
    }
}
