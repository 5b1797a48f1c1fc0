use std::path::PathBuf;
use std::sync::Arc;
use chrono::{Local, NaiveDate};

use crate::{
    domain::{next_id, available_years, Announcement, AnnouncementFilter, NewAnnouncement},
    error::{AppError, Result},
    repository::AnnouncementRepository,
    web::uploads::{save_images, validate_images, UploadedImage},
};

/// One read of the table as the browse page needs it.
#[derive(Debug, Clone, Default)]
pub struct BoardView {
    /// Matches, newest first
    pub announcements: Vec<Announcement>,
    /// Years the month/year filter can offer
    pub years: Vec<String>,
}

/// Submission, browsing and moderation of announcements. Each operation
/// reloads the table from storage, so no state is shared between requests.
pub struct AnnouncementService {
    repo: Arc<dyn AnnouncementRepository>,
    images_dir: PathBuf,
}

impl AnnouncementService {
    pub fn new(repo: Arc<dyn AnnouncementRepository>, images_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo,
            images_dir: images_dir.into(),
        }
    }

    /// Announcements matching `filter`, newest first
    pub async fn browse(&self, filter: &AnnouncementFilter) -> Result<Vec<Announcement>> {
        let announcements = self.repo.load().await?;
        Ok(filter.apply(announcements))
    }

    /// Matches and filter years from a single load
    pub async fn board(&self, filter: &AnnouncementFilter) -> Result<BoardView> {
        let announcements = self.repo.load().await?;
        let years = available_years(&announcements, today());
        Ok(BoardView {
            announcements: filter.apply(announcements),
            years,
        })
    }

    /// Years the month/year filter can offer
    pub async fn event_years(&self) -> Result<Vec<String>> {
        let announcements = self.repo.load().await?;
        Ok(available_years(&announcements, today()))
    }

    /// Validate, store photos, assign an ID and append the announcement.
    /// Nothing is written when validation fails.
    pub async fn submit(
        &self,
        submission: NewAnnouncement,
        images: Vec<UploadedImage>,
    ) -> Result<Announcement> {
        submission.validate()?;
        validate_images(&images)?;

        let mut announcements = self.repo.load().await?;
        let id = next_id(&announcements);
        let image_paths = save_images(&self.images_dir, &images).await?;
        let announcement = submission.into_announcement(id, image_paths, today());

        announcements.push(announcement.clone());
        self.repo.save(&announcements).await?;

        tracing::info!(
            "Posted {} announcement {} ({} in {})",
            announcement.post_type.as_str(),
            announcement.id,
            announcement.category.as_str(),
            announcement.city.as_str()
        );
        Ok(announcement)
    }

    /// Mark an announcement resolved. Already resolved announcements are
    /// left untouched.
    pub async fn resolve(&self, id: &str, password: &str) -> Result<Announcement> {
        let mut announcements = self.repo.load().await?;
        let announcement = announcements
            .iter_mut()
            .find(|a| a.id.trim() == id.trim())
            .ok_or_else(|| AppError::NotFound("Announcement not found".to_string()))?;

        if !announcement.password_matches(password) {
            tracing::warn!("Rejected resolve of announcement {}: password mismatch", id);
            return Err(AppError::AuthFailure);
        }

        if announcement.resolved {
            return Ok(announcement.clone());
        }

        announcement.resolved = true;
        let resolved = announcement.clone();
        self.repo.save(&announcements).await?;

        tracing::info!("Announcement {} marked as resolved", id);
        Ok(resolved)
    }

    /// Remove an announcement. An empty password never matches.
    pub async fn delete(&self, id: &str, password: &str) -> Result<()> {
        let mut announcements = self.repo.load().await?;
        let position = announcements
            .iter()
            .position(|a| a.id.trim() == id.trim())
            .ok_or_else(|| AppError::NotFound("Announcement not found".to_string()))?;

        if password.trim().is_empty() || !announcements[position].password_matches(password) {
            tracing::warn!("Rejected delete of announcement {}: password mismatch", id);
            return Err(AppError::AuthFailure);
        }

        announcements.remove(position);
        self.repo.save(&announcements).await?;

        tracing::info!("Announcement {} deleted", id);
        Ok(())
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
