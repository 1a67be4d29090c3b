//! Content sources.
//!
//! A [`ContentClient`] answers two questions about a page id: what its
//! block tree is and what its metadata is. The infallible methods are what
//! the viewer calls; they never fail and log instead.

mod directory;
mod relay;

pub use directory::DirectoryClient;
pub use relay::{MAX_FETCH_DEPTH, RelayClient, RelayConfig};

use crate::error::FetchResult;
use crate::model::{Block, PageMetadata};
use std::path::PathBuf;
use tracing::{debug, warn};

pub trait ContentClient: Send + Sync {
    fn try_fetch_blocks(&self, id: &str) -> FetchResult<Vec<Block>>;

    fn try_fetch_page_metadata(&self, id: &str) -> FetchResult<PageMetadata>;

    /// Block tree of a page; empty on any failure.
    fn fetch_blocks(&self, id: &str) -> Vec<Block> {
        self.try_fetch_blocks(id).unwrap_or_else(|err| {
            warn!(id, error = %err, "failed to fetch blocks");
            Vec::new()
        })
    }

    /// Metadata of a page; defaults on any failure.
    fn fetch_page_metadata(&self, id: &str) -> PageMetadata {
        self.try_fetch_page_metadata(id).unwrap_or_else(|err| {
            warn!(id, error = %err, "failed to fetch page metadata");
            PageMetadata::default()
        })
    }

    /// Local file backing a page, if any. Watched for live reload.
    fn source_path(&self, _id: &str) -> Option<PathBuf> {
        None
    }

    /// Short description for the status bar.
    fn describe(&self) -> String;
}

/// Extract the list payload of an upstream list response, or accept a bare
/// array.
pub(crate) fn list_results(value: serde_json::Value) -> Vec<serde_json::Value> {
    match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut map) => match map.remove("results") {
            Some(serde_json::Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Convert top-level list items into blocks. Entries that are not objects
/// are dropped; everything else converts, unknown shapes included.
pub(crate) fn blocks_from_values(items: Vec<serde_json::Value>) -> Vec<Block> {
    items
        .into_iter()
        .filter_map(|item| {
            if item.is_object() {
                Some(Block::from(item))
            } else {
                debug!(entry = %item, "skipping non-object block entry");
                None
            }
        })
        .collect()
}
