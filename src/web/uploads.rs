use std::path::{Path, PathBuf};
use chrono::Local;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::domain::IMAGE_SLOTS;
use crate::error::{AppError, Result};

/// Allowed image extensions
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// URL prefix the images directory is served under
pub const IMAGES_ROUTE: &str = "/images";

/// A photo received from the post form.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// Final path component of a client-supplied file name.
fn base_name(file_name: &str) -> &str {
    file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
        .trim()
}

pub fn has_allowed_extension(file_name: &str) -> bool {
    let name = base_name(file_name);
    match name.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
        None => false,
    }
}

/// Rejects any upload that is not a png/jpg/jpeg file.
pub fn validate_images(images: &[UploadedImage]) -> Result<()> {
    for image in images.iter().take(IMAGE_SLOTS) {
        if !has_allowed_extension(&image.file_name) {
            return Err(AppError::InvalidFormat(format!(
                "Invalid file type for {}. Allowed: {}",
                base_name(&image.file_name),
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }
    }
    Ok(())
}

/// Writes up to three photos into `images_dir` and returns their paths,
/// padded with `None` for unused slots. Files beyond the third are ignored.
pub async fn save_images(
    images_dir: &Path,
    images: &[UploadedImage],
) -> Result<[Option<String>; IMAGE_SLOTS]> {
    let mut paths: [Option<String>; IMAGE_SLOTS] = Default::default();

    if images.is_empty() {
        return Ok(paths);
    }

    // Ensure images directory exists
    fs::create_dir_all(images_dir).await.map_err(|e| {
        AppError::Internal(format!("Failed to create images directory: {}", e))
    })?;

    for (slot, image) in paths.iter_mut().zip(images) {
        let file_path = unique_path(images_dir, &image.file_name);

        let mut file = fs::File::create(&file_path).await.map_err(|e| {
            AppError::Internal(format!("Failed to create file: {}", e))
        })?;

        file.write_all(&image.data).await.map_err(|e| {
            AppError::Internal(format!("Failed to write file: {}", e))
        })?;

        tracing::debug!("Saved image {}", file_path.display());
        *slot = Some(file_path.to_string_lossy().into_owned());
    }

    Ok(paths)
}

/// `{timestamp}_{uuid}_{original name}` inside `images_dir`.
fn unique_path(images_dir: &Path, file_name: &str) -> PathBuf {
    let new_filename = format!(
        "{}_{}_{}",
        Local::now().format("%Y%m%d%H%M%S"),
        Uuid::new_v4().simple(),
        base_name(file_name)
    );
    images_dir.join(new_filename)
}

/// Public URL for a stored image path.
pub fn public_url(stored_path: &str) -> Option<String> {
    Path::new(stored_path)
        .file_name()
        .map(|name| format!("{}/{}", IMAGES_ROUTE, name.to_string_lossy()))
}

/// Stored paths whose file is gone are skipped on display.
pub async fn image_exists(stored_path: &str) -> bool {
    fs::try_exists(stored_path).await.unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_extensions() {
        assert!(has_allowed_extension("cat.png"));
        assert!(has_allowed_extension("CAT.JPG"));
        assert!(has_allowed_extension("dir/cat.jpeg"));
        assert!(!has_allowed_extension("cat.gif"));
        assert!(!has_allowed_extension("cat"));
    }

    #[test]
    fn test_base_name_strips_directories() {
        assert_eq!(base_name("../../etc/passwd"), "passwd");
        assert_eq!(base_name("C:\\photos\\dog.png"), "dog.png");
        assert_eq!(base_name("dog.png"), "dog.png");
    }

    #[test]
    fn test_public_url() {
        assert_eq!(
            public_url("announcement_images/20240517_abc_dog.png").as_deref(),
            Some("/images/20240517_abc_dog.png")
        );
        assert_eq!(public_url(""), None);
    }

    #[tokio::test]
    async fn test_save_images_pads_to_three_slots() {
        let dir = tempfile::tempdir().unwrap();
        let images = vec![
            UploadedImage { file_name: "a.png".to_string(), data: vec![1, 2, 3] },
            UploadedImage { file_name: "b.jpg".to_string(), data: vec![4] },
        ];

        let paths = save_images(dir.path(), &images).await.unwrap();
        assert!(paths[2].is_none());

        let first = paths[0].as_deref().unwrap();
        assert!(first.ends_with("_a.png"));
        assert_eq!(std::fs::read(first).unwrap(), vec![1, 2, 3]);
        assert!(image_exists(paths[1].as_deref().unwrap()).await);
    }

    #[tokio::test]
    async fn test_save_images_ignores_extra_files() {
        let dir = tempfile::tempdir().unwrap();
        let images: Vec<_> = (0..5)
            .map(|i| UploadedImage { file_name: format!("{}.png", i), data: vec![i] })
            .collect();

        let paths = save_images(dir.path(), &images).await.unwrap();
        assert!(paths.iter().all(Option::is_some));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 3);
    }
}
