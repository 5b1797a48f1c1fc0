use async_trait::async_trait;
use crate::domain::Announcement;
use crate::error::Result;

pub mod announcement_repository;

pub use announcement_repository::{CsvAnnouncementRepository, COLUMNS};

/// Whole-table storage for announcements. Every call reads or replaces the
/// full table; there are no partial writes.
#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    /// Returns every stored announcement in storage order. Missing storage
    /// yields an empty table.
    async fn load(&self) -> Result<Vec<Announcement>>;
    /// Replaces the stored table.
    async fn save(&self, announcements: &[Announcement]) -> Result<()>;
}
