//! Block tree to view fragments, plus outline extraction.

pub mod blocks;
pub mod headings;
pub mod rich_text;
pub mod view;

pub use blocks::{MAX_RENDER_DEPTH, render_block, render_blocks};
pub use headings::{HeadingEntry, extract_headings, filter_headings, headings_at_level};
pub use rich_text::{Inline, InlineStyle, format_rich_text, inline_text};
pub use view::{ListMarker, MediaKind, View};
