//! Reads pages exported to a directory as JSON.
//!
//! A page `abc` is stored as `abc.blocks.json` (an array of blocks with
//! inline children, or a list response with a `results` array) and an
//! optional `abc.page.json` page object.

use super::{ContentClient, blocks_from_values, list_results};
use crate::error::{FetchError, FetchResult};
use crate::model::{Block, PageMetadata};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const BLOCKS_SUFFIX: &str = ".blocks.json";
pub const PAGE_SUFFIX: &str = ".page.json";

#[derive(Debug, Clone)]
pub struct DirectoryClient {
    root: PathBuf,
}

impl DirectoryClient {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Split a path to a blocks export into a client for its directory and
    /// the page id.
    pub fn from_blocks_file(path: &Path) -> Option<(Self, String)> {
        let file_name = path.file_name()?.to_str()?;
        let id = file_name
            .strip_suffix(BLOCKS_SUFFIX)
            .or_else(|| file_name.strip_suffix(".json"))?;
        if id.is_empty() {
            return None;
        }
        let root = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Some((Self::new(root), id.to_string()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str, suffix: &str) -> FetchResult<PathBuf> {
        // Ids name files directly; anything that could leave the root is rejected.
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            return Err(FetchError::NotFound(id.to_string()));
        }
        Ok(self.root.join(format!("{}{}", id, suffix)))
    }

    /// Path of the blocks file, whether or not it exists.
    pub fn blocks_path(&self, id: &str) -> Option<PathBuf> {
        self.path_for(id, BLOCKS_SUFFIX).ok()
    }

    fn read(&self, id: &str, suffix: &str) -> FetchResult<String> {
        let path = self.path_for(id, suffix)?;
        if !path.is_file() {
            // Plain `<id>.json` is accepted for blocks.
            if suffix == BLOCKS_SUFFIX {
                let fallback = self.path_for(id, ".json")?;
                if fallback.is_file() {
                    return Ok(fs::read_to_string(fallback)?);
                }
            }
            return Err(FetchError::NotFound(path.display().to_string()));
        }
        debug!(path = %path.display(), "reading export");
        Ok(fs::read_to_string(path)?)
    }
}

impl ContentClient for DirectoryClient {
    fn try_fetch_blocks(&self, id: &str) -> FetchResult<Vec<Block>> {
        let value: serde_json::Value = serde_json::from_str(&self.read(id, BLOCKS_SUFFIX)?)?;
        Ok(blocks_from_values(list_results(value)))
    }

    fn try_fetch_page_metadata(&self, id: &str) -> FetchResult<PageMetadata> {
        let page: PageMetadata = serde_json::from_str(&self.read(id, PAGE_SUFFIX)?)?;
        Ok(page)
    }

    fn source_path(&self, id: &str) -> Option<PathBuf> {
        self.blocks_path(id).filter(|p| p.is_file())
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}
