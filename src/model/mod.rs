//! Document model: the block tree, rich-text spans and page metadata.
//!
//! Everything here is built once per page load from a content client's
//! response and never mutated afterwards.

pub mod block;
pub mod page;
pub mod rich_text;

pub use block::{
    Block, BlockKind, BookmarkBlock, CalloutBlock, CodeBlock, DIAGRAM_LANGUAGE, FileObject,
    HeadingLevel, Icon, MediaBlock, TableBlock, TableRowBlock, TextBlock, ToDoBlock, UrlRef,
};
pub use page::{DEFAULT_CATEGORY, DEFAULT_TITLE, PageMetadata, PropertyValue};
pub use rich_text::{Annotations, Color, RichText, plain_text};
