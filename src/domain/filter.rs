use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::announcement::{Announcement, Category, City, PostType};

/// Date restriction on `event_date`. Only one mode applies at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFilter {
    #[default]
    None,
    Specific(NaiveDate),
    MonthYear { year: i32, month: u32 },
}

impl DateFilter {
    pub fn matches(&self, event_date: &str) -> bool {
        match self {
            DateFilter::None => true,
            DateFilter::Specific(date) => event_date == date.format("%Y-%m-%d").to_string(),
            DateFilter::MonthYear { year, month } => {
                let prefix = format!("{:04}-{:02}", year, month);
                event_date.get(..7) == Some(prefix.as_str())
            }
        }
    }
}

/// Conjunction of the browse filters. `Default` shows every unresolved
/// announcement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnouncementFilter {
    pub post_type: Option<PostType>,
    pub city: Option<City>,
    pub category: Option<Category>,
    pub include_resolved: bool,
    pub date: DateFilter,
}

impl AnnouncementFilter {
    pub fn matches(&self, announcement: &Announcement) -> bool {
        if let Some(post_type) = &self.post_type {
            if &announcement.post_type != post_type {
                return false;
            }
        }
        if let Some(city) = &self.city {
            if &announcement.city != city {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if &announcement.category != category {
                return false;
            }
        }
        if !self.include_resolved && announcement.resolved {
            return false;
        }
        self.date.matches(&announcement.event_date)
    }

    /// Filters a table in storage order and returns the matches newest first.
    pub fn apply(&self, announcements: Vec<Announcement>) -> Vec<Announcement> {
        let mut matching: Vec<_> = announcements
            .into_iter()
            .filter(|a| self.matches(a))
            .collect();
        matching.reverse();
        matching
    }
}

/// Browse filter as submitted in a query string. Every field is kept as a
/// raw string so blank form inputs never fail extraction. An unknown type,
/// city or category still filters, so it only matches rows stored with
/// that exact value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterQuery {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub post_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_resolved: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
}

impl FilterQuery {
    pub fn to_filter(&self) -> AnnouncementFilter {
        AnnouncementFilter {
            post_type: selected(&self.post_type).map(PostType::parse),
            city: selected(&self.city).map(City::parse),
            category: selected(&self.category).map(Category::parse),
            include_resolved: self.include_resolved.as_deref().map(is_truthy).unwrap_or(false),
            date: self.date_filter(),
        }
    }

    pub fn date_mode(&self) -> &str {
        match self.date_mode.as_deref().map(str::trim) {
            Some("specific") => "specific",
            Some("month") => "month",
            _ => "none",
        }
    }

    fn date_filter(&self) -> DateFilter {
        match self.date_mode() {
            "specific" => self
                .date
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
                .map(DateFilter::Specific)
                .unwrap_or_default(),
            "month" => {
                let year = self.year.as_deref().and_then(|y| y.trim().parse::<i32>().ok());
                let month = self
                    .month
                    .as_deref()
                    .and_then(|m| m.trim().parse::<u32>().ok())
                    .filter(|m| (1..=12).contains(m));
                match (year, month) {
                    (Some(year), Some(month)) => DateFilter::MonthYear { year, month },
                    _ => DateFilter::None,
                }
            }
            _ => DateFilter::None,
        }
    }
}

/// `None` for blank inputs and the "All" choice.
fn selected(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "on" | "yes")
}

/// Years offered by the month/year filter: those present in stored event
/// dates, or the current year when there are none.
pub fn available_years(announcements: &[Announcement], today: NaiveDate) -> Vec<String> {
    let mut years: Vec<String> = announcements
        .iter()
        .map(|a| a.event_date.trim())
        .filter(|d| !d.is_empty())
        .map(|d| d.chars().take(4).collect())
        .collect();
    years.sort();
    years.dedup();

    if years.is_empty() {
        years.push(today.year().to_string());
    }
    years
}
