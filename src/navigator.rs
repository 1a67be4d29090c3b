//! Outline tracking.
//!
//! The navigator owns a [`WatchSet`]: the row of every painted heading
//! anchor and whether each one was inside the reading band at the last
//! observation. An anchor that moves into the band becomes the active
//! heading; within one observation the last one in document order wins.
//! Jumping to a heading scrolls it just below the top of the viewport and
//! activates it right away.

use crate::config::NavigationConfig;
use std::ops::Range;
use tracing::debug;

/// Anchor rows watched for band entry. Released when dropped.
#[derive(Debug, Default)]
pub struct WatchSet {
    anchors: Vec<Watch>,
}

#[derive(Debug)]
struct Watch {
    anchor: String,
    row: usize,
    inside: bool,
}

impl WatchSet {
    fn acquire(anchors: Vec<(String, usize)>) -> Self {
        debug!(count = anchors.len(), "watching heading anchors");
        Self {
            anchors: anchors
                .into_iter()
                .map(|(anchor, row)| Watch {
                    anchor,
                    row,
                    inside: false,
                })
                .collect(),
        }
    }

    fn matches(&self, anchors: &[(String, usize)]) -> bool {
        self.anchors.len() == anchors.len()
            && self
                .anchors
                .iter()
                .zip(anchors)
                .all(|(w, (anchor, row))| w.anchor == *anchor && w.row == *row)
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn row(&self, anchor: &str) -> Option<usize> {
        self.anchors
            .iter()
            .find(|w| w.anchor == anchor)
            .map(|w| w.row)
    }
}

impl Drop for WatchSet {
    fn drop(&mut self) {
        if !self.anchors.is_empty() {
            debug!(count = self.anchors.len(), "released heading watches");
        }
    }
}

#[derive(Debug)]
pub struct Navigator {
    config: NavigationConfig,
    watches: Option<WatchSet>,
    active: Option<String>,
}

impl Navigator {
    pub fn new(config: NavigationConfig) -> Self {
        Self {
            config,
            watches: None,
            active: None,
        }
    }

    /// Watch a new set of `(anchor, row)` pairs in document order. The
    /// previous set is released; an identical set is kept as is.
    pub fn attach(&mut self, anchors: Vec<(String, usize)>) {
        if let Some(current) = &self.watches
            && current.matches(&anchors)
        {
            return;
        }
        self.watches = Some(WatchSet::acquire(anchors));
        if let Some(active) = &self.active
            && self.row(active).is_none()
        {
            self.active = None;
        }
    }

    /// Release all watches and forget the active heading.
    pub fn detach(&mut self) {
        self.watches = None;
        self.active = None;
    }

    pub fn watches(&self) -> Option<&WatchSet> {
        self.watches.as_ref()
    }

    pub fn row(&self, anchor: &str) -> Option<usize> {
        self.watches.as_ref()?.row(anchor)
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Document rows that count as "being read" for a viewport.
    pub fn band(&self, scroll: usize, height: usize) -> Range<usize> {
        let bottom_cut = height * self.config.band_bottom_percent.min(100) as usize / 100;
        let top = scroll + self.config.band_top_margin.min(height.saturating_sub(1));
        let bottom = (scroll + height.saturating_sub(bottom_cut)).max(top + 1);
        top..bottom
    }

    /// Record the viewport position. Returns true if the active heading
    /// changed.
    pub fn observe(&mut self, scroll: usize, height: usize) -> bool {
        let band = self.band(scroll, height);
        let Some(watches) = self.watches.as_mut() else {
            return false;
        };

        let mut entered = None;
        for watch in &mut watches.anchors {
            let inside = band.contains(&watch.row);
            if inside && !watch.inside {
                entered = Some(watch.anchor.clone());
            }
            watch.inside = inside;
        }

        match entered {
            Some(anchor) if self.active.as_deref() != Some(anchor.as_str()) => {
                self.active = Some(anchor);
                true
            }
            _ => false,
        }
    }

    /// Scroll position that puts `anchor` just below the top, clamped to
    /// `max_scroll`. The heading becomes active immediately and the band
    /// state is settled for the new position so the jump itself does not
    /// re-trigger tracking.
    pub fn scroll_to(&mut self, anchor: &str, height: usize, max_scroll: usize) -> Option<usize> {
        let row = self.row(anchor)?;
        let target = row.saturating_sub(self.config.scroll_offset).min(max_scroll);

        let band = self.band(target, height);
        if let Some(watches) = self.watches.as_mut() {
            for watch in &mut watches.anchors {
                watch.inside = band.contains(&watch.row);
            }
        }
        self.active = Some(anchor.to_string());
        Some(target)
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(NavigationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchors(rows: &[(&str, usize)]) -> Vec<(String, usize)> {
        rows.iter().map(|(a, r)| (a.to_string(), *r)).collect()
    }

    #[test]
    fn test_band_defaults() {
        let nav = Navigator::default();
        // 20 rows: 1 off the top, 12 off the bottom.
        assert_eq!(nav.band(0, 20), 1..8);
        assert_eq!(nav.band(10, 20), 11..18);
        // Degenerate viewports still have a one-row band.
        assert_eq!(nav.band(5, 1), 5..6);
        assert_eq!(nav.band(5, 0), 5..6);
    }

    #[test]
    fn test_click_scrolls_with_offset_and_activates() {
        let mut nav = Navigator::default();
        nav.attach(anchors(&[("h1", 0), ("h2", 30)]));
        nav.observe(0, 20);
        assert_eq!(nav.active(), None, "h1 at row 0 is above the band");

        let target = nav.scroll_to("h2", 20, 100).unwrap();
        assert_eq!(target, 28);
        assert_eq!(nav.active(), Some("h2"));

        // Observing the position we just jumped to keeps h2.
        assert!(!nav.observe(target, 20));
        assert_eq!(nav.active(), Some("h2"));
    }

    #[test]
    fn test_scroll_to_clamps_and_unknown_anchor() {
        let mut nav = Navigator::default();
        nav.attach(anchors(&[("a", 50)]));
        assert_eq!(nav.scroll_to("a", 20, 40), Some(40));
        assert_eq!(nav.scroll_to("missing", 20, 40), None);
        assert_eq!(nav.active(), Some("a"));
    }

    #[test]
    fn test_entering_band_activates_last_in_order() {
        let mut nav = Navigator::default();
        nav.attach(anchors(&[("a", 2), ("b", 4), ("c", 40)]));
        assert!(nav.observe(0, 20));
        assert_eq!(nav.active(), Some("b"));

        // Scrolling so only c is in the band.
        assert!(nav.observe(38, 20));
        assert_eq!(nav.active(), Some("c"));

        // Leaving the band does not deactivate.
        assert!(!nav.observe(60, 20));
        assert_eq!(nav.active(), Some("c"));
    }

    #[test]
    fn test_already_inside_does_not_retrigger() {
        let mut nav = Navigator::default();
        nav.attach(anchors(&[("a", 3), ("b", 5)]));
        nav.observe(0, 20);
        nav.scroll_to("a", 20, 100);
        assert_eq!(nav.active(), Some("a"));
        // b stayed inside the band, so it is not a new entry.
        assert!(!nav.observe(1, 20));
        assert_eq!(nav.active(), Some("a"));
    }

    #[test]
    fn test_attach_replaces_and_detach_releases() {
        let mut nav = Navigator::default();
        nav.attach(anchors(&[("a", 3)]));
        nav.observe(0, 20);
        assert_eq!(nav.active(), Some("a"));

        // Same set: kept, active preserved.
        nav.attach(anchors(&[("a", 3)]));
        assert_eq!(nav.active(), Some("a"));

        // New set without the active anchor clears it.
        nav.attach(anchors(&[("x", 3)]));
        assert_eq!(nav.active(), None);
        assert_eq!(nav.watches().map(WatchSet::len), Some(1));

        nav.detach();
        assert!(nav.watches().is_none());
        assert_eq!(nav.active(), None);
        assert!(!nav.observe(0, 20));
    }

    #[test]
    fn test_moved_anchor_reacquires() {
        let mut nav = Navigator::default();
        nav.attach(anchors(&[("a", 3)]));
        nav.observe(0, 20);
        nav.attach(anchors(&[("a", 30)]));
        assert_eq!(nav.row("a"), Some(30));
        assert_eq!(nav.active(), Some("a"));
    }
}
