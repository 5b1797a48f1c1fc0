use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Number of photo slots on an announcement.
pub const IMAGE_SLOTS: usize = 3;

/// Required length of a contact phone number.
pub const PHONE_DIGITS: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Announcement {
    pub id: String,
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub category: Category,
    pub city: City,
    pub description: String,
    pub images: [Option<String>; IMAGE_SLOTS],
    pub phone: String,
    /// Day the announcement was posted (`YYYY-MM-DD`)
    pub date: String,
    /// Day the item was lost or found (`YYYY-MM-DD`)
    pub event_date: String,
    #[serde(skip_serializing, default)]
    pub delete_password: String,
    pub resolved: bool,
}

impl Announcement {
    /// Compares a supplied password against the stored one, ignoring
    /// surrounding whitespace on both sides.
    pub fn password_matches(&self, supplied: &str) -> bool {
        supplied.trim() == self.delete_password.trim()
    }

    pub fn image_paths(&self) -> impl Iterator<Item = &str> {
        self.images.iter().filter_map(|slot| slot.as_deref())
    }
}

/// Lost or found. Values outside the known pair read from storage are kept
/// verbatim in `Other` so they are written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PostType {
    Lost,
    Found,
    Other(String),
}

impl PostType {
    pub const ALL: [PostType; 2] = [PostType::Lost, PostType::Found];

    /// Stored form, always lower-case for known values
    pub fn as_str(&self) -> &str {
        match self {
            PostType::Lost => "lost",
            PostType::Found => "found",
            PostType::Other(raw) => raw.as_str(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            PostType::Lost => "Lost",
            PostType::Found => "Found",
            PostType::Other(raw) => raw.as_str(),
        }
    }

    /// Known values only, case-insensitive
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "lost" => Some(PostType::Lost),
            "found" => Some(PostType::Found),
            _ => None,
        }
    }

    pub fn parse(s: &str) -> Self {
        Self::from_str(s).unwrap_or_else(|| PostType::Other(s.to_string()))
    }
}

impl From<String> for PostType {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<PostType> for String {
    fn from(t: PostType) -> Self {
        t.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Pets,
    Electronics,
    Bags,
    Jewelry,
    PersonalItems,
    Others,
    /// Unrecognised stored value, kept as read
    Other(String),
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Pets,
        Category::Electronics,
        Category::Bags,
        Category::Jewelry,
        Category::PersonalItems,
        Category::Others,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Category::Pets => "Pets",
            Category::Electronics => "Electronics",
            Category::Bags => "Bags",
            Category::Jewelry => "Jewelry",
            Category::PersonalItems => "Personal Items",
            Category::Others => "Others",
            Category::Other(raw) => raw.as_str(),
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|c| c.as_str().eq_ignore_ascii_case(s))
    }

    pub fn parse(s: &str) -> Self {
        Self::from_str(s).unwrap_or_else(|| Category::Other(s.to_string()))
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        c.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum City {
    KuwaitCity,
    Salmiya,
    Hawally,
    Jahra,
    Farwaniya,
    Ahmadi,
    MubarakAlKabeer,
    /// Unrecognised stored value, kept as read
    Other(String),
}

impl City {
    pub const ALL: [City; 7] = [
        City::KuwaitCity,
        City::Salmiya,
        City::Hawally,
        City::Jahra,
        City::Farwaniya,
        City::Ahmadi,
        City::MubarakAlKabeer,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            City::KuwaitCity => "Kuwait City",
            City::Salmiya => "Salmiya",
            City::Hawally => "Hawally",
            City::Jahra => "Jahra",
            City::Farwaniya => "Farwaniya",
            City::Ahmadi => "Ahmadi",
            City::MubarakAlKabeer => "Mubarak Al-Kabeer",
            City::Other(raw) => raw.as_str(),
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|c| c.as_str().eq_ignore_ascii_case(s))
    }

    pub fn parse(s: &str) -> Self {
        Self::from_str(s).unwrap_or_else(|| City::Other(s.to_string()))
    }
}

impl From<String> for City {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<City> for String {
    fn from(c: City) -> Self {
        c.as_str().to_string()
    }
}

/// A submission as entered on the post form, before an ID is assigned.
#[derive(Debug, Clone)]
pub struct NewAnnouncement {
    pub post_type: PostType,
    pub category: Category,
    pub city: City,
    pub description: String,
    pub event_date: NaiveDate,
    pub phone: String,
    pub delete_password: String,
}

impl NewAnnouncement {
    /// Checks description, then phone, then password. The first failure wins.
    pub fn validate(&self) -> Result<()> {
        validate_fields(&self.description, &self.phone, &self.delete_password)
    }

    pub fn into_announcement(
        self,
        id: String,
        images: [Option<String>; IMAGE_SLOTS],
        posted_on: NaiveDate,
    ) -> Announcement {
        Announcement {
            id,
            post_type: self.post_type,
            category: self.category,
            city: self.city,
            description: self.description,
            images,
            phone: self.phone.trim().to_string(),
            date: posted_on.format("%Y-%m-%d").to_string(),
            event_date: self.event_date.format("%Y-%m-%d").to_string(),
            delete_password: self.delete_password.trim().to_string(),
            resolved: false,
        }
    }
}

/// The free-text checks of a submission, in the order they are reported.
pub fn validate_fields(description: &str, phone: &str, delete_password: &str) -> Result<()> {
    if description.trim().is_empty() {
        return Err(AppError::MissingField("Please enter a description.".to_string()));
    }
    if !is_valid_phone(phone) {
        return Err(AppError::InvalidFormat(format!(
            "Phone number must be exactly {} digits.",
            PHONE_DIGITS
        )));
    }
    if delete_password.trim().is_empty() {
        return Err(AppError::MissingField("Please set a delete password.".to_string()));
    }
    Ok(())
}

pub fn is_valid_phone(phone: &str) -> bool {
    let phone = phone.trim();
    phone.len() == PHONE_DIGITS && phone.chars().all(|c| c.is_ascii_digit())
}

/// Next identifier for a table: one past the highest numeric ID. Tables
/// holding no numeric IDs at all fall back to `len + 1`; empty tables start at 1.
pub fn next_id(existing: &[Announcement]) -> String {
    if existing.is_empty() {
        return "1".to_string();
    }

    existing
        .iter()
        .filter_map(|a| a.id.trim().parse::<u64>().ok())
        .max()
        .map(|max| max + 1)
        .unwrap_or(existing.len() as u64 + 1)
        .to_string()
}
