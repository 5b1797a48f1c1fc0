use async_trait::async_trait;
use csv::ByteRecord;
use serde::Serialize;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::{
    domain::{Announcement, Category, City, PostType},
    error::{AppError, Result},
    repository::AnnouncementRepository,
};

/// Header of the announcements table, in column order.
pub const COLUMNS: [&str; 13] = [
    "ID",
    "Type",
    "Category",
    "City",
    "Description",
    "Image1",
    "Image2",
    "Image3",
    "Phone",
    "Date",
    "EventDate",
    "DeletePassword",
    "Resolved",
];

/// One CSV row. Every column is text and defaults to empty when absent.
#[derive(Debug, Default, Serialize)]
struct AnnouncementRow {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Type")]
    post_type: String,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "City")]
    city: String,
    #[serde(rename = "Description")]
    description: String,
    #[serde(rename = "Image1")]
    image1: String,
    #[serde(rename = "Image2")]
    image2: String,
    #[serde(rename = "Image3")]
    image3: String,
    #[serde(rename = "Phone")]
    phone: String,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "EventDate")]
    event_date: String,
    #[serde(rename = "DeletePassword")]
    delete_password: String,
    #[serde(rename = "Resolved")]
    resolved: String,
}

impl AnnouncementRow {
    fn from_record(record: &ByteRecord, columns: &ColumnIndex) -> Self {
        Self {
            id: columns.cell(record, "ID"),
            post_type: columns.cell(record, "Type"),
            category: columns.cell(record, "Category"),
            city: columns.cell(record, "City"),
            description: columns.cell(record, "Description"),
            image1: columns.cell(record, "Image1"),
            image2: columns.cell(record, "Image2"),
            image3: columns.cell(record, "Image3"),
            phone: columns.cell(record, "Phone"),
            date: columns.cell(record, "Date"),
            event_date: columns.cell(record, "EventDate"),
            delete_password: columns.cell(record, "DeletePassword"),
            resolved: columns.cell(record, "Resolved"),
        }
    }

    fn into_announcement(self) -> Announcement {
        Announcement {
            id: self.id,
            post_type: PostType::parse(&self.post_type),
            category: Category::parse(&self.category),
            city: City::parse(&self.city),
            description: self.description,
            images: [image_slot(self.image1), image_slot(self.image2), image_slot(self.image3)],
            phone: self.phone,
            date: self.date,
            event_date: self.event_date,
            delete_password: self.delete_password,
            resolved: parse_resolved(&self.resolved),
        }
    }
}

impl From<&Announcement> for AnnouncementRow {
    fn from(a: &Announcement) -> Self {
        let [image1, image2, image3] = a.images.clone().map(Option::unwrap_or_default);
        Self {
            id: a.id.clone(),
            post_type: a.post_type.as_str().to_string(),
            category: a.category.as_str().to_string(),
            city: a.city.as_str().to_string(),
            description: a.description.clone(),
            image1,
            image2,
            image3,
            phone: a.phone.clone(),
            date: a.date.clone(),
            event_date: a.event_date.clone(),
            delete_password: a.delete_password.clone(),
            resolved: if a.resolved { "True" } else { "False" }.to_string(),
        }
    }
}

/// Where each known column sits in the header of the file being read.
struct ColumnIndex(HashMap<&'static str, usize>);

impl ColumnIndex {
    fn new(headers: &ByteRecord) -> Self {
        let mut positions = HashMap::new();
        for (position, name) in headers.iter().enumerate() {
            let name = String::from_utf8_lossy(name);
            if let Some(column) = COLUMNS.iter().find(|c| **c == name.trim()) {
                positions.entry(*column).or_insert(position);
            }
        }
        Self(positions)
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn missing(&self) -> Vec<&'static str> {
        COLUMNS.iter().copied().filter(|c| !self.0.contains_key(c)).collect()
    }

    /// Cell text, empty when the column or the cell is absent
    fn cell(&self, record: &ByteRecord, column: &str) -> String {
        self.0
            .get(column)
            .and_then(|&position| record.get(position))
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .unwrap_or_default()
    }
}

fn image_slot(path: String) -> Option<String> {
    if path.trim().is_empty() {
        None
    } else {
        Some(path)
    }
}

/// `"true"` and `"1"` (any case) are resolved; everything else is not.
fn parse_resolved(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1")
}

/// Parses a stored table. Columns are matched by header name; missing
/// columns and short rows read as empty cells, and unknown type, category
/// or city values are kept as they are. A file with none of the known
/// columns reads as an empty table.
pub fn parse_table(data: &[u8]) -> Vec<Announcement> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(data);

    let columns = match reader.byte_headers() {
        Ok(headers) if headers.is_empty() => return Vec::new(),
        Ok(headers) => ColumnIndex::new(headers),
        Err(e) => {
            tracing::warn!("Unreadable announcements header: {}", e);
            return Vec::new();
        }
    };

    if columns.is_empty() {
        tracing::warn!("Announcements table has no known columns, reading it as empty");
        return Vec::new();
    }
    let missing = columns.missing();
    if !missing.is_empty() {
        tracing::warn!("Announcements table lacks columns {:?}, reading them as empty", missing);
    }

    let mut announcements = Vec::new();
    for (index, record) in reader.byte_records().enumerate() {
        match record {
            Ok(record) => {
                let row = AnnouncementRow::from_record(&record, &columns);
                announcements.push(row.into_announcement());
            }
            Err(e) => tracing::warn!("Skipping unreadable announcement row {}: {}", index + 1, e),
        }
    }

    announcements
}

/// Renders the full table, header included even when empty.
pub fn render_table(announcements: &[Announcement]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    if announcements.is_empty() {
        writer.write_record(COLUMNS)?;
    }
    for announcement in announcements {
        writer.serialize(AnnouncementRow::from(announcement))?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Storage(format!("Failed to flush announcements table: {}", e)))
}

pub struct CsvAnnouncementRepository {
    path: PathBuf,
}

impl CsvAnnouncementRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AnnouncementRepository for CsvAnnouncementRepository {
    async fn load(&self) -> Result<Vec<Announcement>> {
        let data = match fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(
                    "No announcements table at {}, starting empty",
                    self.path.display()
                );
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(AppError::Storage(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        Ok(parse_table(&data))
    }

    async fn save(&self, announcements: &[Announcement]) -> Result<()> {
        let data = render_table(announcements)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::Storage(format!("Failed to create data directory: {}", e))
            })?;
        }

        fs::write(&self.path, data).await.map_err(|e| {
            AppError::Storage(format!("Failed to write {}: {}", self.path.display(), e))
        })?;

        tracing::debug!("Saved {} announcements to {}", announcements.len(), self.path.display());
        Ok(())
    }
}
