//! Live reload for directory-backed pages.
//!
//! The watch is placed on the export's parent directory rather than the file
//! itself: exporters and editors often replace the file by renaming a new
//! one over it, which would orphan a watch on the old inode.

use notify::event::{AccessKind, AccessMode, ModifyKind};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};
use tracing::debug;

const DEBOUNCE: Duration = Duration::from_millis(100);

struct Target {
    /// Path as the caller named it.
    requested: PathBuf,
    /// Canonical path, the form notify reports.
    resolved: PathBuf,
    dir: PathBuf,
}

pub struct FileWatcher {
    watcher: RecommendedWatcher,
    events: Receiver<notify::Result<Event>>,
    target: Option<Target>,
    last_reload: Instant,
}

impl FileWatcher {
    pub fn new() -> notify::Result<Self> {
        let (tx, events) = mpsc::channel();
        Ok(Self {
            watcher: notify::recommended_watcher(tx)?,
            events,
            target: None,
            last_reload: Instant::now(),
        })
    }

    /// Follow `file`. Watching the same file again is a no-op.
    pub fn watch(&mut self, file: &Path) -> notify::Result<()> {
        if self.current_path() == Some(file) {
            return Ok(());
        }
        self.unwatch();

        let resolved = file.canonicalize().unwrap_or_else(|_| file.to_path_buf());
        let dir = match resolved.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        self.watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        debug!(file = %resolved.display(), "watching page source");
        self.target = Some(Target {
            requested: file.to_path_buf(),
            resolved,
            dir,
        });
        self.last_reload = Instant::now();
        Ok(())
    }

    pub fn unwatch(&mut self) {
        if let Some(target) = self.target.take() {
            let _ = self.watcher.unwatch(&target.dir);
        }
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.target.as_ref().map(|t| t.requested.as_path())
    }

    /// Drain queued events; true when the watched file changed and the last
    /// reload is older than the debounce window.
    pub fn check_for_changes(&mut self) -> bool {
        let mut changed = false;
        while let Ok(result) = self.events.try_recv() {
            match result {
                Ok(event) => changed |= self.is_relevant_event(&event),
                Err(err) => debug!(error = %err, "watch error"),
            }
        }

        if changed && self.last_reload.elapsed() >= DEBOUNCE {
            self.last_reload = Instant::now();
            return true;
        }
        false
    }

    fn is_relevant_event(&self, event: &Event) -> bool {
        let Some(target) = &self.target else {
            return false;
        };
        let touches_file = event.paths.iter().any(|p| *p == target.resolved);
        let writes = matches!(
            event.kind,
            EventKind::Create(_)
                | EventKind::Modify(ModifyKind::Data(_))
                | EventKind::Modify(ModifyKind::Name(_))
                | EventKind::Modify(ModifyKind::Any)
                | EventKind::Access(AccessKind::Close(AccessMode::Write))
        );
        touches_file && writes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, RenameMode};
    use tempfile::TempDir;

    #[test]
    fn test_watch_and_unwatch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("page.blocks.json");
        std::fs::write(&path, "[]").unwrap();

        let mut watcher = FileWatcher::new().unwrap();
        watcher.watch(&path).unwrap();
        assert_eq!(watcher.current_path(), Some(path.as_path()));
        // Re-watching the same file keeps the watch.
        watcher.watch(&path).unwrap();
        assert_eq!(watcher.current_path(), Some(path.as_path()));
        assert!(!watcher.check_for_changes());

        watcher.unwatch();
        assert!(watcher.current_path().is_none());
    }

    fn target(page: &Path) -> Option<Target> {
        Some(Target {
            requested: page.to_path_buf(),
            resolved: page.to_path_buf(),
            dir: PathBuf::from("/tmp/export"),
        })
    }

    #[test]
    fn test_only_watched_file_events_count() {
        let mut watcher = FileWatcher::new().unwrap();
        let page = PathBuf::from("/tmp/export/a.blocks.json");
        let sibling = PathBuf::from("/tmp/export/b.blocks.json");
        watcher.target = target(&page);

        let write =
            |p: &PathBuf| Event::new(EventKind::Modify(ModifyKind::Any)).add_path(p.clone());
        assert!(watcher.is_relevant_event(&write(&page)));
        assert!(!watcher.is_relevant_event(&write(&sibling)));
    }

    #[test]
    fn test_rename_over_file_counts() {
        let mut watcher = FileWatcher::new().unwrap();
        let page = PathBuf::from("/tmp/export/a.blocks.json");
        watcher.target = target(&page);

        let renamed =
            Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::To))).add_path(page.clone());
        let created = Event::new(EventKind::Create(CreateKind::File)).add_path(page);
        assert!(watcher.is_relevant_event(&renamed));
        assert!(watcher.is_relevant_event(&created));
    }
}
