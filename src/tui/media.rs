//! Lazy image probing.
//!
//! Images are only inspected once they scroll into view. A local file is
//! opened and its header decoded for the dimensions; anything that cannot
//! be read marks the element as failed so the painter can hide it. Remote
//! images are never fetched and stay link-only.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    Ready { width: u32, height: u32 },
    Remote,
    Failed,
}

#[derive(Debug, Default)]
pub struct MediaProbe {
    base_dir: Option<PathBuf>,
    states: HashMap<String, ProbeState>,
    revision: u64,
}

impl MediaProbe {
    /// Relative image paths resolve against `base_dir`.
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self {
            base_dir,
            ..Default::default()
        }
    }

    pub fn set_base_dir(&mut self, base_dir: Option<PathBuf>) {
        if self.base_dir != base_dir {
            self.base_dir = base_dir;
            self.clear();
        }
    }

    /// Bumped whenever a probe finishes, so callers know to repaint.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn state(&self, url: &str) -> Option<ProbeState> {
        self.states.get(url).copied()
    }

    /// Probe `url` if it has not been probed yet.
    pub fn probe(&mut self, url: &str) -> ProbeState {
        if let Some(state) = self.states.get(url) {
            return *state;
        }
        let state = match self.local_path(url) {
            Some(path) => match read_dimensions(&path) {
                Ok((width, height)) => ProbeState::Ready { width, height },
                Err(err) => {
                    debug!(url, error = %err, "image probe failed");
                    ProbeState::Failed
                }
            },
            None => ProbeState::Remote,
        };
        self.states.insert(url.to_string(), state);
        self.revision += 1;
        state
    }

    pub fn clear(&mut self) {
        if !self.states.is_empty() {
            self.states.clear();
            self.revision += 1;
        }
    }

    fn local_path(&self, url: &str) -> Option<PathBuf> {
        if let Some(path) = url.strip_prefix("file://") {
            return Some(PathBuf::from(path));
        }
        if url.contains("://") || url.starts_with("data:") {
            return None;
        }
        let path = Path::new(url);
        if path.is_absolute() {
            return Some(path.to_path_buf());
        }
        Some(match &self.base_dir {
            Some(base) => base.join(path),
            None => path.to_path_buf(),
        })
    }
}

fn read_dimensions(path: &Path) -> image::ImageResult<(u32, u32)> {
    image::ImageReader::open(path)?
        .with_guessed_format()?
        .into_dimensions()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_remote_urls_are_not_probed() {
        let mut probe = MediaProbe::default();
        assert_eq!(probe.probe("https://cdn.example/x.png"), ProbeState::Remote);
        assert_eq!(probe.revision(), 1);
        // Cached.
        probe.probe("https://cdn.example/x.png");
        assert_eq!(probe.revision(), 1);
    }

    #[test]
    fn test_missing_and_broken_files_fail() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("broken.png"), b"not an image").unwrap();
        let mut probe = MediaProbe::new(Some(dir.path().to_path_buf()));
        assert_eq!(probe.probe("missing.png"), ProbeState::Failed);
        assert_eq!(probe.probe("broken.png"), ProbeState::Failed);
    }

    #[test]
    fn test_local_image_dimensions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dot.png");
        image::RgbImage::new(3, 2).save(&path).unwrap();

        let mut probe = MediaProbe::new(Some(dir.path().to_path_buf()));
        assert_eq!(
            probe.probe("dot.png"),
            ProbeState::Ready {
                width: 3,
                height: 2
            }
        );
        let url = format!("file://{}", path.display());
        assert!(matches!(probe.probe(&url), ProbeState::Ready { .. }));
    }

    #[test]
    fn test_base_dir_change_clears() {
        let mut probe = MediaProbe::default();
        probe.probe("https://a");
        probe.set_base_dir(Some(PathBuf::from("/tmp")));
        assert_eq!(probe.state("https://a"), None);
    }
}
