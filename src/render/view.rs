//! View fragments produced by the block renderer.
//!
//! A `View` is presentation-neutral: the TUI painter turns it into wrapped
//! terminal lines, the CLI turns it into plain text.

use super::rich_text::Inline;
use crate::model::{Color, HeadingLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMarker {
    Bullet,
    Number(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    File,
    Video,
    Pdf,
}

impl MediaKind {
    pub fn label(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::File => "file",
            MediaKind::Video => "video",
            MediaKind::Pdf => "pdf",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Heading {
        anchor: String,
        level: HeadingLevel,
        content: Vec<Inline>,
        children: Vec<View>,
    },
    Paragraph {
        content: Vec<Inline>,
        color: Color,
        children: Vec<View>,
    },
    ListItem {
        marker: ListMarker,
        content: Vec<Inline>,
        children: Vec<View>,
    },
    ToDo {
        checked: bool,
        content: Vec<Inline>,
        children: Vec<View>,
    },
    Toggle {
        summary: Vec<Inline>,
        children: Vec<View>,
    },
    Quote {
        content: Vec<Inline>,
        children: Vec<View>,
    },
    Callout {
        icon: Option<String>,
        color: Color,
        content: Vec<Inline>,
        children: Vec<View>,
    },
    Columns {
        columns: Vec<Vec<View>>,
    },
    /// Children rendered in sequence with no chrome of their own.
    Group {
        children: Vec<View>,
    },
    Code {
        language: String,
        text: String,
        caption: Vec<Inline>,
    },
    Diagram {
        key: String,
        source: String,
    },
    Media {
        key: String,
        kind: MediaKind,
        url: String,
        caption: Vec<Inline>,
    },
    Bookmark {
        url: String,
        caption: Vec<Inline>,
    },
    Table {
        column_header: bool,
        row_header: bool,
        rows: Vec<Vec<Vec<Inline>>>,
    },
    Divider,
}

impl View {
    pub fn children(&self) -> &[View] {
        match self {
            View::Heading { children, .. }
            | View::Paragraph { children, .. }
            | View::ListItem { children, .. }
            | View::ToDo { children, .. }
            | View::Toggle { children, .. }
            | View::Quote { children, .. }
            | View::Callout { children, .. }
            | View::Group { children } => children,
            _ => &[],
        }
    }

    /// Visit this fragment and all nested fragments in pre-order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a View)) {
        let mut stack = vec![self];
        while let Some(view) = stack.pop() {
            visit(view);
            if let View::Columns { columns } = view {
                for column in columns.iter().rev() {
                    stack.extend(column.iter().rev());
                }
            }
            stack.extend(view.children().iter().rev());
        }
    }
}
