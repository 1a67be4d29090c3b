//! Page metadata: title, cover, icon, category and the typed property map.

use super::block::{FileObject, Icon};
use super::rich_text::{RichText, plain_text};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Deserialize;

/// Category shown when the page carries none.
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

/// Title shown when the page carries none.
pub const DEFAULT_TITLE: &str = "Untitled";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawPage")]
pub struct PageMetadata {
    pub id: String,
    pub title: String,
    pub cover: Option<FileObject>,
    pub icon: Option<Icon>,
    pub summary: Option<String>,
    pub category: String,
    pub created: Option<DateTime<Utc>>,
    pub properties: IndexMap<String, PropertyValue>,
}

impl Default for PageMetadata {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: DEFAULT_TITLE.to_string(),
            cover: None,
            icon: None,
            summary: None,
            category: DEFAULT_CATEGORY.to_string(),
            created: None,
            properties: IndexMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title {
        #[serde(default)]
        title: Vec<RichText>,
    },
    RichText {
        #[serde(default)]
        rich_text: Vec<RichText>,
    },
    Select {
        #[serde(default)]
        select: Option<SelectOption>,
    },
    MultiSelect {
        #[serde(default)]
        multi_select: Vec<SelectOption>,
    },
    Date {
        #[serde(default)]
        date: Option<DateRange>,
    },
    Files {
        #[serde(default)]
        files: Vec<FileObject>,
    },
    Url {
        #[serde(default)]
        url: Option<String>,
    },
    Number {
        #[serde(default)]
        number: Option<f64>,
    },
    Checkbox {
        #[serde(default)]
        checkbox: bool,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SelectOption {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DateRange {
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
}

impl PropertyValue {
    /// Short display form for the property list; `None` when empty.
    pub fn display(&self) -> Option<String> {
        let text = match self {
            PropertyValue::Title { title } => plain_text(title),
            PropertyValue::RichText { rich_text } => plain_text(rich_text),
            PropertyValue::Select { select } => select.as_ref()?.name.clone(),
            PropertyValue::MultiSelect { multi_select } => multi_select
                .iter()
                .map(|o| o.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            PropertyValue::Date { date } => {
                let date = date.as_ref()?;
                match &date.end {
                    Some(end) => format!("{} → {}", date.start, end),
                    None => date.start.clone(),
                }
            }
            PropertyValue::Files { files } => {
                return (!files.is_empty()).then(|| format!("{} file(s)", files.len()));
            }
            PropertyValue::Url { url } => url.clone()?,
            PropertyValue::Number { number } => number.map(|n| n.to_string())?,
            PropertyValue::Checkbox { checkbox } => {
                if *checkbox { "yes" } else { "no" }.to_string()
            }
            PropertyValue::Other => return None,
        };
        (!text.trim().is_empty()).then_some(text)
    }
}

impl PageMetadata {
    /// Media references held by `files` properties, in property order.
    pub fn attachments(&self) -> Vec<(&str, &FileObject)> {
        self.properties
            .iter()
            .flat_map(|(name, value)| match value {
                PropertyValue::Files { files } => {
                    files.iter().map(|f| (name.as_str(), f)).collect::<Vec<_>>()
                }
                _ => Vec::new(),
            })
            .collect()
    }

    /// Properties listed as `name: value` under the title, in property
    /// order. Title, files, category and summary are shown elsewhere, and
    /// empty values are skipped.
    pub fn listed_properties(&self) -> Vec<(&str, String)> {
        self.properties
            .iter()
            .filter(|(name, value)| !shown_elsewhere(name, value))
            .filter_map(|(name, value)| Some((name.as_str(), value.display()?)))
            .collect()
    }

    pub fn created_label(&self) -> Option<String> {
        self.created.map(|dt| dt.format("%b %-d, %Y").to_string())
    }
}

fn is_category(name: &str) -> bool {
    name.eq_ignore_ascii_case("category")
}

fn is_summary(name: &str) -> bool {
    name.eq_ignore_ascii_case("summary") || name.eq_ignore_ascii_case("description")
}

fn shown_elsewhere(name: &str, value: &PropertyValue) -> bool {
    match value {
        PropertyValue::Title { .. } | PropertyValue::Files { .. } => true,
        PropertyValue::Select { .. } => is_category(name),
        PropertyValue::RichText { .. } => is_summary(name),
        _ => false,
    }
}

#[derive(Deserialize)]
struct RawPage {
    #[serde(default)]
    id: String,
    #[serde(default)]
    created_time: Option<DateTime<Utc>>,
    #[serde(default)]
    cover: Option<FileObject>,
    #[serde(default)]
    icon: Option<Icon>,
    #[serde(default)]
    properties: IndexMap<String, PropertyValue>,
}

impl From<RawPage> for PageMetadata {
    fn from(raw: RawPage) -> Self {
        let title = raw
            .properties
            .values()
            .find_map(|value| match value {
                PropertyValue::Title { title } => Some(plain_text(title)),
                _ => None,
            })
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        let category = raw
            .properties
            .iter()
            .find_map(|(name, value)| match value {
                PropertyValue::Select { select: Some(option) } if is_category(name) => {
                    Some(option.name.clone())
                }
                _ => None,
            })
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        let summary = raw.properties.iter().find_map(|(name, value)| match value {
            PropertyValue::RichText { rich_text } if is_summary(name) => {
                Some(plain_text(rich_text)).filter(|s| !s.trim().is_empty())
            }
            _ => None,
        });

        Self {
            id: raw.id,
            title,
            cover: raw.cover.filter(|c| c.url().is_some()),
            icon: raw.icon,
            summary,
            category,
            created: raw.created_time,
            properties: raw.properties,
        }
    }
}
