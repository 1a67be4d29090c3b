//! # blockview
//!
//! A terminal viewer for pages exported from a block-based editor.
//!
//! This library turns a block tree (paragraphs, headings, lists, toggles,
//! columns, code, diagrams, media, tables) into renderable views, extracts
//! the page outline and tracks which section the reader is in. It powers
//! both the interactive TUI and the plain-text CLI output.
//!
//! ## Example
//!
//! ```rust
//! use blockview::model::{Block, BlockKind, HeadingLevel, PageMetadata, RichText, TextBlock};
//! use blockview::page::Page;
//!
//! let heading = |id: &str, level, text: &str| {
//!     let body = TextBlock {
//!         rich_text: vec![RichText::plain(text)],
//!         ..Default::default()
//!     };
//!     Block::new(id, BlockKind::Heading(level, body))
//! };
//!
//! let page = Page::new(
//!     "intro",
//!     vec![
//!         heading("a", HeadingLevel::H1, "Introduction"),
//!         heading("b", HeadingLevel::H2, "Background"),
//!     ],
//!     PageMetadata::default(),
//! );
//!
//! for entry in &page.headings {
//!     println!("{} {}", "#".repeat(entry.level), entry.text);
//! }
//! assert_eq!(page.headings.len(), 2);
//! ```

/// Content sources: exported directories and the upstream block API.
pub mod client;

/// Configuration module for persisting user preferences.
///
/// Provides configuration management for theme choices, UI settings,
/// navigation tuning and content sources.
pub mod config;

/// Diagram compilation for `mermaid` code blocks.
pub mod diagram;

pub mod error;

/// Keybindings module for customizable keyboard shortcuts.
pub mod keybindings;

pub mod logging;

/// Document model: blocks, rich text and page metadata.
pub mod model;

/// Scroll-spy over the painted heading anchors.
pub mod navigator;

/// Page loading and the background loader.
pub mod page;

/// Block tree to view tree, rich-text formatting and heading extraction.
pub mod render;

/// TUI module for the interactive terminal interface.
pub mod tui;

// Re-export commonly used types for convenience
pub use config::Config;
pub use page::{Page, PageLoader, load_page};
pub use render::{HeadingEntry, extract_headings};
pub use tui::App;
