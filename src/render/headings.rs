//! Heading extraction for the outline.

use super::blocks::MAX_RENDER_DEPTH;
use crate::model::{Block, BlockKind, plain_text};
use serde::Serialize;

/// One outline entry, derived from a heading block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingEntry {
    /// Block id, also the anchor of the rendered heading.
    pub anchor: String,
    pub text: String,
    pub level: usize,
}

impl HeadingEntry {
    pub fn new(anchor: impl Into<String>, text: impl Into<String>, level: usize) -> Self {
        Self {
            anchor: anchor.into(),
            text: text.into(),
            level,
        }
    }
}

/// Collect every heading in the tree in depth-first pre-order.
///
/// Uses an explicit stack so arbitrarily deep trees cannot exhaust the call
/// stack. Blocks nested [`MAX_RENDER_DEPTH`] or more levels deep are not
/// painted, so their headings are left out too.
pub fn extract_headings(blocks: &[Block]) -> Vec<HeadingEntry> {
    let mut entries = Vec::new();
    let mut stack: Vec<(&Block, usize)> = blocks.iter().rev().map(|b| (b, 0)).collect();

    while let Some((block, depth)) = stack.pop() {
        if let BlockKind::Heading(level, text) = &block.kind {
            entries.push(HeadingEntry {
                anchor: block.id.clone(),
                text: plain_text(&text.rich_text),
                level: level.as_usize(),
            });
        }
        if depth + 1 < MAX_RENDER_DEPTH {
            stack.extend(block.children.iter().rev().map(|child| (child, depth + 1)));
        }
    }

    entries
}

/// Headings filtered by case-insensitive text match.
pub fn filter_headings<'a>(entries: &'a [HeadingEntry], query: &str) -> Vec<&'a HeadingEntry> {
    let query = query.to_lowercase();
    entries
        .iter()
        .filter(|e| e.text.to_lowercase().contains(&query))
        .collect()
}

/// Headings at exactly `level`.
pub fn headings_at_level(entries: &[HeadingEntry], level: usize) -> Vec<&HeadingEntry> {
    entries.iter().filter(|e| e.level == level).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HeadingLevel, RichText, TextBlock};

    fn text(s: &str) -> TextBlock {
        TextBlock {
            rich_text: vec![RichText::plain(s)],
            ..Default::default()
        }
    }

    fn heading(id: &str, level: HeadingLevel, s: &str) -> Block {
        Block::new(id, BlockKind::Heading(level, text(s)))
    }

    #[test]
    fn test_flat_scenario() {
        let tree = vec![
            heading("h1", HeadingLevel::H1, "Intro"),
            Block::new("p", BlockKind::Paragraph(text("hello"))),
            heading("h2", HeadingLevel::H2, "Details"),
        ];
        assert_eq!(
            extract_headings(&tree),
            vec![
                HeadingEntry::new("h1", "Intro", 1),
                HeadingEntry::new("h2", "Details", 2),
            ]
        );
    }

    #[test]
    fn test_heading_under_toggle_under_column() {
        let tree = vec![
            heading("top", HeadingLevel::H1, "Top"),
            Block::new("cl", BlockKind::ColumnList).with_children(vec![
                Block::new("c1", BlockKind::Column).with_children(vec![
                    Block::new("t", BlockKind::Toggle(text("More"))).with_children(vec![
                        heading("deep", HeadingLevel::H3, "Deep"),
                    ]),
                ]),
                Block::new("c2", BlockKind::Column)
                    .with_children(vec![heading("right", HeadingLevel::H2, "Right")]),
            ]),
            heading("end", HeadingLevel::H2, "End"),
        ];
        let anchors: Vec<_> = extract_headings(&tree)
            .into_iter()
            .map(|e| (e.anchor, e.level))
            .collect();
        assert_eq!(
            anchors,
            vec![
                ("top".to_string(), 1),
                ("deep".to_string(), 3),
                ("right".to_string(), 2),
                ("end".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_heading_emitted_before_its_children() {
        let tree = vec![
            heading("parent", HeadingLevel::H1, "Parent")
                .with_children(vec![heading("child", HeadingLevel::H2, "Child")]),
        ];
        let entries = extract_headings(&tree);
        assert_eq!(entries[0].anchor, "parent");
        assert_eq!(entries[1].anchor, "child");
    }

    #[test]
    fn test_text_concatenates_spans() {
        let block = Block::new(
            "h",
            BlockKind::Heading(
                HeadingLevel::H1,
                TextBlock {
                    rich_text: vec![RichText::plain("Getting "), RichText::plain("started")],
                    ..Default::default()
                },
            ),
        );
        assert_eq!(extract_headings(&[block])[0].text, "Getting started");
    }

    #[test]
    fn test_empty_tree() {
        assert!(extract_headings(&[]).is_empty());
    }

    #[test]
    fn test_filters() {
        let entries = vec![
            HeadingEntry::new("a", "Installation", 1),
            HeadingEntry::new("b", "Usage", 2),
            HeadingEntry::new("c", "Installing plugins", 2),
        ];
        assert_eq!(filter_headings(&entries, "INSTALL").len(), 2);
        assert_eq!(headings_at_level(&entries, 2).len(), 2);
    }

    fn nest_in_toggles(block: Block, levels: usize) -> Block {
        (0..levels).fold(block, |inner, i| {
            Block::new(format!("t{}", i), BlockKind::Toggle(text("level")))
                .with_children(vec![inner])
        })
    }

    fn rendered_anchors(tree: &[Block]) -> Vec<String> {
        let mut anchors = Vec::new();
        for view in crate::render::render_blocks(tree) {
            view.walk(&mut |v| {
                if let crate::render::View::Heading { anchor, .. } = v {
                    anchors.push(anchor.clone());
                }
            });
        }
        anchors
    }

    #[test]
    fn test_outline_matches_painted_anchors_at_depth() {
        let too_deep = vec![nest_in_toggles(heading("deep", HeadingLevel::H2, "Deep"), 70)];
        assert!(extract_headings(&too_deep).is_empty());
        assert!(rendered_anchors(&too_deep).is_empty());

        let last_level = vec![nest_in_toggles(
            heading("edge", HeadingLevel::H2, "Edge"),
            MAX_RENDER_DEPTH - 1,
        )];
        let outline: Vec<String> = extract_headings(&last_level)
            .into_iter()
            .map(|e| e.anchor)
            .collect();
        assert_eq!(outline, vec!["edge".to_string()]);
        assert_eq!(rendered_anchors(&last_level), outline);

        let one_past = vec![nest_in_toggles(
            heading("past", HeadingLevel::H2, "Past"),
            MAX_RENDER_DEPTH,
        )];
        assert!(extract_headings(&one_past).is_empty());
        assert!(rendered_anchors(&one_past).is_empty());
    }
}
