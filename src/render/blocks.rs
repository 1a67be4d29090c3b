//! Block renderer: one block in, one view fragment (or nothing) out.

use super::rich_text::format_rich_text;
use super::view::{ListMarker, MediaKind, View};
use crate::model::{Block, BlockKind, MediaBlock};
use tracing::{debug, warn};

/// Nesting below this depth is not rendered.
pub const MAX_RENDER_DEPTH: usize = 64;

/// Render a sibling sequence, numbering runs of numbered list items.
pub fn render_blocks(blocks: &[Block]) -> Vec<View> {
    render_siblings(blocks, 0)
}

/// Render a single block. Numbered items render as item 1; use
/// [`render_blocks`] for sequences.
pub fn render_block(block: &Block) -> Option<View> {
    render_at(block, 1, 0)
}

fn render_siblings(blocks: &[Block], depth: usize) -> Vec<View> {
    if depth >= MAX_RENDER_DEPTH {
        if !blocks.is_empty() {
            warn!(
                depth,
                skipped = blocks.len(),
                "block nesting too deep, children not rendered"
            );
        }
        return Vec::new();
    }

    let mut views = Vec::with_capacity(blocks.len());
    let mut number = 0;
    for block in blocks {
        number = match block.kind {
            BlockKind::NumberedListItem(_) => number + 1,
            _ => 0,
        };
        if let Some(view) = render_at(block, number.max(1), depth) {
            views.push(view);
        }
    }
    views
}

fn render_at(block: &Block, number: usize, depth: usize) -> Option<View> {
    let children = || render_siblings(&block.children, depth + 1);

    let view = match &block.kind {
        BlockKind::Paragraph(text) => View::Paragraph {
            content: format_rich_text(&text.rich_text),
            color: text.color,
            children: children(),
        },
        BlockKind::Heading(level, text) => View::Heading {
            anchor: block.id.clone(),
            level: *level,
            content: format_rich_text(&text.rich_text),
            children: children(),
        },
        BlockKind::BulletedListItem(text) => View::ListItem {
            marker: ListMarker::Bullet,
            content: format_rich_text(&text.rich_text),
            children: children(),
        },
        BlockKind::NumberedListItem(text) => View::ListItem {
            marker: ListMarker::Number(number),
            content: format_rich_text(&text.rich_text),
            children: children(),
        },
        BlockKind::ToDo(todo) => View::ToDo {
            checked: todo.checked,
            content: format_rich_text(&todo.rich_text),
            children: children(),
        },
        BlockKind::Toggle(text) => View::Toggle {
            summary: format_rich_text(&text.rich_text),
            children: children(),
        },
        BlockKind::Quote(text) => View::Quote {
            content: format_rich_text(&text.rich_text),
            children: children(),
        },
        BlockKind::Callout(callout) => View::Callout {
            icon: callout
                .icon
                .as_ref()
                .and_then(|icon| icon.glyph())
                .map(str::to_string),
            color: callout.color,
            content: format_rich_text(&callout.rich_text),
            children: children(),
        },
        BlockKind::ColumnList => View::Columns {
            columns: block
                .children
                .iter()
                .filter(|child| matches!(child.kind, BlockKind::Column))
                .map(|column| render_siblings(&column.children, depth + 2))
                .collect(),
        },
        BlockKind::Column | BlockKind::SyncedBlock => View::Group {
            children: children(),
        },
        BlockKind::Code(code) if code.is_diagram() => View::Diagram {
            key: block.id.clone(),
            source: code.text(),
        },
        BlockKind::Code(code) => View::Code {
            language: code.language.clone(),
            text: code.text(),
            caption: format_rich_text(&code.caption),
        },
        BlockKind::Image(media) => media_view(block, MediaKind::Image, media)?,
        BlockKind::File(media) => media_view(block, MediaKind::File, media)?,
        BlockKind::Video(media) => media_view(block, MediaKind::Video, media)?,
        BlockKind::Pdf(media) => media_view(block, MediaKind::Pdf, media)?,
        BlockKind::Bookmark(bookmark) => {
            let url = bookmark.url.trim();
            if url.is_empty() {
                return None;
            }
            View::Bookmark {
                url: url.to_string(),
                caption: format_rich_text(&bookmark.caption),
            }
        }
        BlockKind::Table(table) => View::Table {
            column_header: table.has_column_header,
            row_header: table.has_row_header,
            rows: block
                .children
                .iter()
                .filter_map(|row| match &row.kind {
                    BlockKind::TableRow(row) => {
                        Some(row.cells.iter().map(|c| format_rich_text(c)).collect())
                    }
                    _ => None,
                })
                .collect(),
        },
        BlockKind::Divider => View::Divider,
        BlockKind::TableRow(_) => {
            debug!(id = %block.id, "table row outside of a table");
            return None;
        }
        BlockKind::Unsupported(kind) => {
            debug!(id = %block.id, kind = %kind, "skipping unsupported block");
            return None;
        }
    };

    Some(view)
}

fn media_view(block: &Block, kind: MediaKind, media: &MediaBlock) -> Option<View> {
    let url = media.source.url()?;
    Some(View::Media {
        key: block.id.clone(),
        kind,
        url: url.to_string(),
        caption: format_rich_text(&media.caption),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        CodeBlock, FileObject, HeadingLevel, RichText, TableBlock, TableRowBlock, TextBlock,
        ToDoBlock,
    };

    fn text(s: &str) -> TextBlock {
        TextBlock {
            rich_text: vec![RichText::plain(s)],
            ..Default::default()
        }
    }

    fn paragraph(id: &str, s: &str) -> Block {
        Block::new(id, BlockKind::Paragraph(text(s)))
    }

    fn mermaid(id: &str, source: &str) -> Block {
        Block::new(
            id,
            BlockKind::Code(CodeBlock {
                rich_text: vec![RichText::plain(source)],
                language: "mermaid".to_string(),
                caption: vec![],
            }),
        )
    }

    #[test]
    fn test_unsupported_renders_nothing() {
        let block = Block::new("x", BlockKind::Unsupported("breadcrumb".into()));
        assert!(render_block(&block).is_none());
        assert!(render_blocks(&[block]).is_empty());
    }

    #[test]
    fn test_heading_carries_anchor() {
        let block = Block::new("h-42", BlockKind::Heading(HeadingLevel::H2, text("Details")));
        match render_block(&block) {
            Some(View::Heading { anchor, level, .. }) => {
                assert_eq!(anchor, "h-42");
                assert_eq!(level, HeadingLevel::H2);
            }
            other => panic!("unexpected view {:?}", other),
        }
    }

    #[test]
    fn test_diagram_code_never_becomes_source_block() {
        for source in ["graph TD; A-->B", "", "not a diagram at all", "```"] {
            let view = render_block(&mermaid("d", source)).unwrap();
            let mut saw_code = false;
            view.walk(&mut |v| saw_code |= matches!(v, View::Code { .. }));
            assert!(!saw_code, "source {:?} produced a code block", source);
            assert!(matches!(view, View::Diagram { .. }));
        }
    }

    #[test]
    fn test_regular_code_block() {
        let block = Block::new(
            "c",
            BlockKind::Code(CodeBlock {
                rich_text: vec![RichText::plain("fn main() {}\n")],
                language: "rust".into(),
                caption: vec![],
            }),
        );
        assert_eq!(
            render_block(&block),
            Some(View::Code {
                language: "rust".into(),
                text: "fn main() {}\n".into(),
                caption: vec![],
            })
        );
    }

    #[test]
    fn test_image_without_url_renders_nothing() {
        let block = Block::new(
            "img",
            BlockKind::Image(MediaBlock {
                source: FileObject::external(""),
                caption: vec![RichText::plain("caption")],
            }),
        );
        assert!(render_block(&block).is_none());

        let block = Block::new("img", BlockKind::Image(MediaBlock::default()));
        assert!(render_block(&block).is_none());
    }

    #[test]
    fn test_image_with_url() {
        let block = Block::new(
            "img",
            BlockKind::Image(MediaBlock {
                source: FileObject::external("https://img.example.com/a.png"),
                caption: vec![],
            }),
        );
        assert!(matches!(
            render_block(&block),
            Some(View::Media {
                kind: MediaKind::Image,
                ref url,
                ..
            }) if url == "https://img.example.com/a.png"
        ));
    }

    #[test]
    fn test_numbered_items_count_within_runs() {
        let item = |id: &str| Block::new(id, BlockKind::NumberedListItem(text(id)));
        let blocks = vec![
            item("a"),
            item("b"),
            paragraph("p", "break"),
            item("c"),
        ];
        let markers: Vec<_> = render_blocks(&blocks)
            .into_iter()
            .filter_map(|v| match v {
                View::ListItem { marker, .. } => Some(marker),
                _ => None,
            })
            .collect();
        assert_eq!(
            markers,
            vec![
                ListMarker::Number(1),
                ListMarker::Number(2),
                ListMarker::Number(1)
            ]
        );
    }

    #[test]
    fn test_containers_render_children_in_order() {
        let toggle = Block::new("t", BlockKind::Toggle(text("More"))).with_children(vec![
            paragraph("p1", "first"),
            Block::new("u", BlockKind::Unsupported("embed".into())),
            paragraph("p2", "second"),
        ]);
        let View::Toggle { children, .. } = render_block(&toggle).unwrap() else {
            panic!("expected toggle");
        };
        assert_eq!(children.len(), 2);
        assert!(
            matches!(&children[0], View::Paragraph { content, .. } if content[0].text() == "first")
        );
        assert!(
            matches!(&children[1], View::Paragraph { content, .. } if content[0].text() == "second")
        );
    }

    #[test]
    fn test_column_list_collects_columns() {
        let columns = Block::new("cl", BlockKind::ColumnList).with_children(vec![
            Block::new("c1", BlockKind::Column).with_children(vec![paragraph("a", "left")]),
            Block::new("c2", BlockKind::Column).with_children(vec![paragraph("b", "right")]),
        ]);
        let View::Columns { columns } = render_block(&columns).unwrap() else {
            panic!("expected columns");
        };
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[1].len(), 1);
    }

    #[test]
    fn test_todo_checked_flag() {
        let todo = Block::new(
            "td",
            BlockKind::ToDo(ToDoBlock {
                rich_text: vec![RichText::plain("ship it")],
                checked: true,
                ..Default::default()
            }),
        );
        assert!(matches!(render_block(&todo), Some(View::ToDo { checked: true, .. })));
    }

    #[test]
    fn test_table_rows_from_children() {
        let row = |id: &str, a: &str, b: &str| {
            Block::new(
                id,
                BlockKind::TableRow(TableRowBlock {
                    cells: vec![vec![RichText::plain(a)], vec![RichText::plain(b)]],
                }),
            )
        };
        let table = Block::new(
            "tbl",
            BlockKind::Table(TableBlock {
                table_width: 2,
                has_column_header: true,
                has_row_header: false,
            }),
        )
        .with_children(vec![row("r1", "Name", "Value"), row("r2", "a", "1")]);

        let View::Table { rows, column_header, .. } = render_block(&table).unwrap() else {
            panic!("expected table");
        };
        assert!(column_header);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][1][0].text(), "Value");
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let tree = vec![
            Block::new("h1", BlockKind::Heading(HeadingLevel::H1, text("Intro"))),
            paragraph("p", "hello"),
            mermaid("d", "graph LR; A-->B"),
            Block::new("t", BlockKind::Toggle(text("More")))
                .with_children(vec![paragraph("p2", "nested")]),
        ];
        assert_eq!(render_blocks(&tree), render_blocks(&tree));
    }

    #[test]
    fn test_depth_limit_stops_recursion() {
        let mut block = paragraph("leaf", "deep");
        for i in 0..(MAX_RENDER_DEPTH + 10) {
            block = Block::new(format!("t{}", i), BlockKind::Toggle(text("level")))
                .with_children(vec![block]);
        }
        let view = render_block(&block).unwrap();
        let mut count = 0;
        view.walk(&mut |_| count += 1);
        assert!(count <= MAX_RENDER_DEPTH + 1);
    }
}
