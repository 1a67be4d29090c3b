//! The block tree.
//!
//! Blocks arrive as JSON objects of the form
//! `{"id": .., "type": "paragraph", "paragraph": {..}, "children": [..]}`.
//! Deserialization never fails for a single block: an unknown or mistyped
//! `type`, a payload that is missing or does not match its type, or an entry
//! that is not an object at all becomes [`BlockKind::Unsupported`] and renders
//! to nothing. A bad `children` value leaves the block without children.

use super::rich_text::{Color, RichText, plain_text};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

/// Language tag that marks a code block as a diagram description.
pub const DIAGRAM_LANGUAGE: &str = "mermaid";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct Block {
    pub id: String,
    pub kind: BlockKind,
    pub children: Vec<Block>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HeadingLevel {
    H1 = 1,
    H2 = 2,
    H3 = 3,
}

impl HeadingLevel {
    pub fn as_usize(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    Paragraph(TextBlock),
    Heading(HeadingLevel, TextBlock),
    BulletedListItem(TextBlock),
    NumberedListItem(TextBlock),
    ToDo(ToDoBlock),
    Toggle(TextBlock),
    ColumnList,
    Column,
    Code(CodeBlock),
    Image(MediaBlock),
    File(MediaBlock),
    Video(MediaBlock),
    Pdf(MediaBlock),
    Quote(TextBlock),
    Divider,
    Callout(CalloutBlock),
    SyncedBlock,
    Bookmark(BookmarkBlock),
    Table(TableBlock),
    TableRow(TableRowBlock),
    /// Carries the upstream type name for logging.
    Unsupported(String),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TextBlock {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub color: Color,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ToDoBlock {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub color: Color,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CodeBlock {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub caption: Vec<RichText>,
}

impl CodeBlock {
    pub fn text(&self) -> String {
        plain_text(&self.rich_text)
    }

    pub fn is_diagram(&self) -> bool {
        self.language.eq_ignore_ascii_case(DIAGRAM_LANGUAGE)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CalloutBlock {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub icon: Option<Icon>,
    #[serde(default)]
    pub color: Color,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BookmarkBlock {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub caption: Vec<RichText>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TableBlock {
    #[serde(default)]
    pub table_width: usize,
    #[serde(default)]
    pub has_column_header: bool,
    #[serde(default)]
    pub has_row_header: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TableRowBlock {
    #[serde(default)]
    pub cells: Vec<Vec<RichText>>,
}

/// Image, file, video and pdf payloads share this shape.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MediaBlock {
    #[serde(flatten)]
    pub source: FileObject,
    #[serde(default)]
    pub caption: Vec<RichText>,
}

/// A media reference: either an external URL or a hosted file URL.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FileObject {
    #[serde(default)]
    pub external: Option<UrlRef>,
    #[serde(default)]
    pub file: Option<UrlRef>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UrlRef {
    #[serde(default)]
    pub url: String,
}

impl FileObject {
    pub fn external(url: impl Into<String>) -> Self {
        Self {
            external: Some(UrlRef { url: url.into() }),
            ..Default::default()
        }
    }

    /// Resolve the URL to display. Empty URLs resolve to nothing.
    pub fn url(&self) -> Option<&str> {
        self.external
            .as_ref()
            .or(self.file.as_ref())
            .map(|r| r.url.trim())
            .filter(|url| !url.is_empty())
    }
}

/// Page or callout icon.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Icon {
    Emoji {
        emoji: String,
    },
    External {
        external: UrlRef,
    },
    File {
        file: UrlRef,
    },
    #[serde(other)]
    Unknown,
}

impl Icon {
    /// Glyph shown in the terminal; image icons fall back to a generic mark.
    pub fn glyph(&self) -> Option<&str> {
        match self {
            Icon::Emoji { emoji } => Some(emoji.as_str()),
            Icon::External { .. } | Icon::File { .. } => Some("◆"),
            Icon::Unknown => None,
        }
    }
}

impl Block {
    pub fn new(id: impl Into<String>, kind: BlockKind) -> Self {
        Self {
            id: id.into(),
            kind,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Block>) -> Self {
        self.children = children;
        self
    }

    /// Upstream type name, used in logs.
    pub fn type_name(&self) -> &str {
        match &self.kind {
            BlockKind::Paragraph(_) => "paragraph",
            BlockKind::Heading(HeadingLevel::H1, _) => "heading_1",
            BlockKind::Heading(HeadingLevel::H2, _) => "heading_2",
            BlockKind::Heading(HeadingLevel::H3, _) => "heading_3",
            BlockKind::BulletedListItem(_) => "bulleted_list_item",
            BlockKind::NumberedListItem(_) => "numbered_list_item",
            BlockKind::ToDo(_) => "to_do",
            BlockKind::Toggle(_) => "toggle",
            BlockKind::ColumnList => "column_list",
            BlockKind::Column => "column",
            BlockKind::Code(_) => "code",
            BlockKind::Image(_) => "image",
            BlockKind::File(_) => "file",
            BlockKind::Video(_) => "video",
            BlockKind::Pdf(_) => "pdf",
            BlockKind::Quote(_) => "quote",
            BlockKind::Divider => "divider",
            BlockKind::Callout(_) => "callout",
            BlockKind::SyncedBlock => "synced_block",
            BlockKind::Bookmark(_) => "bookmark",
            BlockKind::Table(_) => "table",
            BlockKind::TableRow(_) => "table_row",
            BlockKind::Unsupported(name) => name.as_str(),
        }
    }
}

impl From<Value> for Block {
    fn from(value: Value) -> Self {
        let mut map = match value {
            Value::Object(map) => map,
            other => {
                debug!(found = %json_type(&other), "block entry is not an object");
                return Block::new("", BlockKind::Unsupported(String::new()));
            }
        };

        let id = string_field(&map, "id");
        let kind_name = string_field(&map, "type");
        let children = match map.remove("children") {
            Some(Value::Array(items)) => items.into_iter().map(Block::from).collect(),
            None | Some(Value::Null) => Vec::new(),
            Some(other) => {
                debug!(%id, found = %json_type(&other), "block children are not a list");
                Vec::new()
            }
        };

        let payload = map.remove(&kind_name);
        let kind = resolve_kind(&kind_name, payload).unwrap_or_else(|| {
            debug!(%id, kind = %kind_name, "block kind unsupported or payload missing");
            BlockKind::Unsupported(kind_name.clone())
        });

        Self { id, kind, children }
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> String {
    map.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn payload<T: DeserializeOwned>(value: Option<Value>) -> Option<T> {
    value.and_then(|v| serde_json::from_value(v).ok())
}

fn resolve_kind(kind: &str, value: Option<Value>) -> Option<BlockKind> {
    let kind = match kind {
        "paragraph" => BlockKind::Paragraph(payload(value)?),
        "heading_1" => BlockKind::Heading(HeadingLevel::H1, payload(value)?),
        "heading_2" => BlockKind::Heading(HeadingLevel::H2, payload(value)?),
        "heading_3" => BlockKind::Heading(HeadingLevel::H3, payload(value)?),
        "bulleted_list_item" => BlockKind::BulletedListItem(payload(value)?),
        "numbered_list_item" => BlockKind::NumberedListItem(payload(value)?),
        "to_do" => BlockKind::ToDo(payload(value)?),
        "toggle" => BlockKind::Toggle(payload(value)?),
        "column_list" => BlockKind::ColumnList,
        "column" => BlockKind::Column,
        "code" => BlockKind::Code(payload(value)?),
        "image" => BlockKind::Image(payload(value)?),
        "file" => BlockKind::File(payload(value)?),
        "video" => BlockKind::Video(payload(value)?),
        "pdf" => BlockKind::Pdf(payload(value)?),
        "quote" => BlockKind::Quote(payload(value)?),
        "divider" => BlockKind::Divider,
        "callout" => BlockKind::Callout(payload(value)?),
        "synced_block" => BlockKind::SyncedBlock,
        "bookmark" => BlockKind::Bookmark(payload(value)?),
        "table" => BlockKind::Table(payload(value)?),
        "table_row" => BlockKind::TableRow(payload(value)?),
        _ => return None,
    };
    Some(kind)
}
