//! Paint view fragments into terminal lines.
//!
//! Everything is wrapped here, ahead of ratatui, so the row of every
//! heading, link, diagram and image is known exactly. Those rows feed the
//! navigator and the lazy loaders.

use super::util::{Piece, pad_to_width, wrap_pieces};
use crate::diagram::{DIAGRAM_UNAVAILABLE, DiagramState, DiagramStore};
use crate::model::HeadingLevel;
use crate::page::Page;
use crate::render::{Inline, InlineStyle, ListMarker, MediaKind, View, inline_text};
use crate::tui::media::{MediaProbe, ProbeState};
use crate::tui::syntax::SyntaxHighlighter;
use crate::tui::theme::Theme;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

/// Narrowest column a table cell shrinks to.
const MIN_CELL_WIDTH: usize = 3;

pub struct PaintContext<'a> {
    pub theme: &'a Theme,
    pub highlighter: &'a SyntaxHighlighter,
    pub diagrams: &'a DiagramStore,
    pub media: &'a MediaProbe,
    pub width: usize,
    pub show_images: bool,
    pub selected_link: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    pub href: String,
    pub text: String,
    pub row: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramSlot {
    pub key: String,
    pub source: String,
    pub row: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSlot {
    pub url: String,
    pub row: usize,
}

#[derive(Debug, Default)]
pub struct Painted {
    pub lines: Vec<Line<'static>>,
    /// Heading anchors with their rows, in document order.
    pub anchors: Vec<(String, usize)>,
    pub links: Vec<LinkTarget>,
    pub diagrams: Vec<DiagramSlot>,
    pub images: Vec<ImageSlot>,
}

impl Painted {
    pub fn height(&self) -> usize {
        self.lines.len()
    }

    /// Lines as plain strings, trailing spaces removed.
    pub fn to_plain(&self) -> Vec<String> {
        self.lines
            .iter()
            .map(|line| {
                let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
                text.trim_end().to_string()
            })
            .collect()
    }
}

/// Paint the page header followed by its body.
pub fn paint_page(page: &Page, ctx: &PaintContext) -> Painted {
    let mut painter = Painter::new(ctx);
    painter.header(page);
    painter.views(&page.views, &[]);
    painter.out
}

/// Placeholder bars shown while a page is loading.
pub fn paint_skeleton(theme: &Theme, width: usize, height: usize) -> Vec<Line<'static>> {
    const PATTERN: [usize; 8] = [45, 0, 90, 80, 95, 60, 0, 70];
    let style = theme.muted_style();
    (0..height)
        .map(|row| {
            let percent = PATTERN[row % PATTERN.len()];
            let bar = width * percent / 100;
            Line::from(Span::styled("▆".repeat(bar), style))
        })
        .collect()
}

struct Painter<'a, 'b> {
    ctx: &'b PaintContext<'a>,
    out: Painted,
}

impl<'a, 'b> Painter<'a, 'b> {
    fn new(ctx: &'b PaintContext<'a>) -> Self {
        Self {
            ctx,
            out: Painted::default(),
        }
    }

    fn theme(&self) -> &Theme {
        self.ctx.theme
    }

    fn row(&self) -> usize {
        self.out.lines.len()
    }

    fn push(&mut self, spans: Vec<Span<'static>>) {
        self.out.lines.push(Line::from(spans));
    }

    fn avail(&self, indent: &[Span<'static>]) -> usize {
        let used: usize = indent.iter().map(|s| s.content.width()).sum();
        self.ctx.width.saturating_sub(used).max(1)
    }

    /// Wrap and append. Links first seen here get the row they start on.
    fn wrap(&mut self, pieces: &[Piece], first: &[Span<'static>], rest: &[Span<'static>]) {
        let start = self.row();
        for (offset, row) in wrap_pieces(pieces, self.ctx.width, first, rest)
            .into_iter()
            .enumerate()
        {
            for link in row.links {
                if let Some(target) = self.out.links.get_mut(link)
                    && target.row < start
                {
                    target.row = start + offset;
                }
            }
            self.out.lines.push(row.line);
        }
    }

    fn add_link(&mut self, href: &str, text: &str) -> usize {
        self.out.links.push(LinkTarget {
            href: href.to_string(),
            text: text.to_string(),
            row: 0,
        });
        self.out.links.len() - 1
    }

    fn link_style(&self, index: usize) -> Style {
        let style = self.theme().link_style();
        if self.ctx.selected_link == Some(index) {
            style.bg(self.theme().link_selected_bg)
        } else {
            style
        }
    }

    /// A standalone line that is one link, e.g. a bookmark.
    fn link_line(&mut self, indent: &[Span<'static>], icon: &str, text: &str, href: &str) {
        let index = self.add_link(href, text);
        let mut first = indent.to_vec();
        first.push(Span::raw(format!("{} ", icon)));
        let rest = continuation(indent, icon.width() + 1);
        let piece = Piece::new(text, self.link_style(index)).link(index);
        self.wrap(&[piece], &first, &rest);
    }

    fn inline_style(&self, base: Style, style: &InlineStyle) -> Style {
        let mut out = base.patch(self.theme().block_color_style(style.color));
        if style.bold {
            out = out.add_modifier(Modifier::BOLD);
        }
        if style.italic {
            out = out.add_modifier(Modifier::ITALIC);
        }
        if style.underline {
            out = out.add_modifier(Modifier::UNDERLINED);
        }
        if style.strikethrough {
            out = out.add_modifier(Modifier::CROSSED_OUT);
        }
        out
    }

    fn pieces(&mut self, inlines: &[Inline], base: Style) -> Vec<Piece> {
        let mut out = Vec::with_capacity(inlines.len());
        for inline in inlines {
            match inline {
                Inline::Text { text, style } => {
                    out.push(Piece::new(text.clone(), self.inline_style(base, style)));
                }
                Inline::Code { text, style } => {
                    let code = base.patch(self.theme().inline_code_style());
                    out.push(Piece::new(text.clone(), self.inline_style(code, style)));
                }
                Inline::Link { href, inner } => {
                    let index = self.add_link(href, inner.text());
                    let base = base.patch(self.link_style(index));
                    for piece in self.pieces(std::slice::from_ref(inner.as_ref()), base) {
                        out.push(piece.link(index));
                    }
                }
            }
        }
        out
    }

    fn header(&mut self, page: &Page) {
        let theme = self.ctx.theme;
        let meta = &page.metadata;

        if let Some(url) = meta.cover.as_ref().and_then(|c| c.url()) {
            self.link_line(&[], "▀", &format!("cover {}", url), url);
        }

        let mut title = Vec::new();
        if let Some(glyph) = meta.icon.as_ref().and_then(|i| i.glyph()) {
            title.push(Piece::new(format!("{} ", glyph), theme.text_style()));
        }
        title.push(Piece::new(
            meta.title.clone(),
            Style::default()
                .fg(theme.heading_1)
                .add_modifier(Modifier::BOLD),
        ));
        self.wrap(&title, &[], &[]);

        let mut details = meta.category.clone();
        if let Some(created) = meta.created_label() {
            details.push_str(" · ");
            details.push_str(&created);
        }
        self.wrap(&[Piece::new(details, theme.muted_style())], &[], &[]);

        if let Some(summary) = meta.summary.as_deref().filter(|s| !s.trim().is_empty()) {
            let style = theme.muted_style().add_modifier(Modifier::ITALIC);
            self.wrap(&[Piece::new(summary, style)], &[], &[]);
        }

        for (name, value) in meta.listed_properties() {
            let label = Style::default().fg(theme.list_bullet);
            self.wrap(
                &[
                    Piece::new(format!("{}: ", name), label),
                    Piece::new(value, theme.muted_style()),
                ],
                &[],
                &[],
            );
        }

        for (name, file) in meta.attachments() {
            if let Some(url) = file.url() {
                let label = file.name.as_deref().unwrap_or(url);
                self.link_line(&[], "📎", &format!("{}: {}", name, label), url);
            }
        }

        let rule = "─".repeat(self.ctx.width);
        self.push(vec![Span::styled(rule, theme.border_style(false))]);
        self.push(Vec::new());
    }

    fn views(&mut self, views: &[View], indent: &[Span<'static>]) {
        let mut previous: Option<&View> = None;
        for view in views {
            let gap = previous.is_some_and(|prev| !(is_list_like(prev) && is_list_like(view)));
            let before = self.row();
            if gap {
                self.push(trimmed(indent));
            }
            let painted_from = self.row();
            self.view(view, indent);
            if self.row() == painted_from {
                // Nothing painted (e.g. a hidden image); drop the gap too.
                self.out.lines.truncate(before);
                continue;
            }
            previous = Some(view);
        }
    }

    fn view(&mut self, view: &View, indent: &[Span<'static>]) {
        let theme = self.ctx.theme;
        match view {
            View::Heading {
                anchor,
                level,
                content,
                children,
            } => {
                let row = self.row();
                self.out.anchors.push((anchor.clone(), row));
                let mut style = Style::default()
                    .fg(theme.heading_color(level.as_usize()))
                    .add_modifier(Modifier::BOLD);
                if *level == HeadingLevel::H1 {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }
                let pieces = self.pieces(content, style);
                self.wrap(&pieces, indent, indent);
                self.children(children, indent);
            }
            View::Paragraph {
                content,
                color,
                children,
            } => {
                if inline_text(content).trim().is_empty() {
                    self.push(trimmed(indent));
                } else {
                    let base = theme.text_style().patch(theme.block_color_style(*color));
                    let pieces = self.pieces(content, base);
                    self.wrap(&pieces, indent, indent);
                }
                self.children(children, indent);
            }
            View::ListItem {
                marker,
                content,
                children,
            } => {
                let marker = match marker {
                    ListMarker::Bullet => "• ".to_string(),
                    ListMarker::Number(n) => format!("{}. ", n),
                };
                let bullet = Style::default().fg(theme.list_bullet);
                self.marked(indent, marker, bullet, content, theme.text_style());
                self.children(children, indent);
            }
            View::ToDo {
                checked,
                content,
                children,
            } => {
                let (marker, base) = if *checked {
                    (
                        "☑ ",
                        theme.muted_style().add_modifier(Modifier::CROSSED_OUT),
                    )
                } else {
                    ("☐ ", theme.text_style())
                };
                let bullet = Style::default().fg(theme.list_bullet);
                self.marked(indent, marker.to_string(), bullet, content, base);
                self.children(children, indent);
            }
            View::Toggle { summary, children } => {
                let bullet = Style::default().fg(theme.list_bullet);
                self.marked(indent, "▾ ".to_string(), bullet, summary, theme.text_style());
                self.children(children, indent);
            }
            View::Quote { content, children } => {
                let mut bar = indent.to_vec();
                bar.push(Span::styled("┃ ", Style::default().fg(theme.quote_border)));
                let base = theme.text_style().add_modifier(Modifier::ITALIC);
                let pieces = self.pieces(content, base);
                self.wrap(&pieces, &bar, &bar);
                if !children.is_empty() {
                    self.views(children, &bar);
                }
            }
            View::Callout {
                icon,
                color,
                content,
                children,
            } => {
                let accent = theme.block_fg(*color).unwrap_or(theme.border_focused);
                let mut bar = indent.to_vec();
                bar.push(Span::styled("▌ ", Style::default().fg(accent)));
                let base = theme.text_style().bg(theme.callout_bg);
                let mut pieces = Vec::new();
                if let Some(icon) = icon {
                    pieces.push(Piece::new(format!("{} ", icon), base));
                }
                pieces.extend(self.pieces(content, base));
                self.wrap(&pieces, &bar, &bar);
                if !children.is_empty() {
                    self.views(children, &bar);
                }
            }
            View::Columns { columns } => {
                let rule = "┄".repeat(self.avail(indent));
                for (i, column) in columns.iter().enumerate() {
                    if i > 0 {
                        let mut line = indent.to_vec();
                        line.push(Span::styled(rule.clone(), theme.muted_style()));
                        self.push(line);
                    }
                    self.views(column, indent);
                }
            }
            View::Group { children } => self.views(children, indent),
            View::Code {
                language,
                text,
                caption,
            } => self.code(indent, language, text, caption),
            View::Diagram { key, source } => self.diagram(indent, key, source),
            View::Media {
                kind,
                url,
                caption,
                ..
            } => self.media(indent, *kind, url, caption),
            View::Bookmark { url, caption } => {
                self.link_line(indent, "🔖", url, url);
                self.caption(indent, caption);
            }
            View::Table {
                column_header,
                row_header,
                rows,
            } => self.table(indent, *column_header, *row_header, rows),
            View::Divider => {
                let mut line = indent.to_vec();
                line.push(Span::styled("─".repeat(self.avail(indent)), theme.muted_style()));
                self.push(line);
            }
        }
    }

    fn marked(
        &mut self,
        indent: &[Span<'static>],
        marker: String,
        marker_style: Style,
        content: &[Inline],
        base: Style,
    ) {
        let rest = continuation(indent, marker.width());
        let mut first = indent.to_vec();
        first.push(Span::styled(marker, marker_style));
        let pieces = self.pieces(content, base);
        self.wrap(&pieces, &first, &rest);
    }

    fn children(&mut self, children: &[View], indent: &[Span<'static>]) {
        if !children.is_empty() {
            self.views(children, &continuation(indent, 2));
        }
    }

    fn caption(&mut self, indent: &[Span<'static>], caption: &[Inline]) {
        if caption.is_empty() {
            return;
        }
        let base = self.theme().muted_style().add_modifier(Modifier::ITALIC);
        let pieces = self.pieces(caption, base);
        self.wrap(&pieces, indent, indent);
    }

    fn code(&mut self, indent: &[Span<'static>], language: &str, text: &str, caption: &[Inline]) {
        let theme = self.ctx.theme;
        let border = Style::default().fg(theme.code_border);
        let avail = self.avail(indent);

        let label = if language.is_empty() { "code" } else { language };
        let top = format!("╭─ {} ", label);
        let fill = avail.saturating_sub(top.width());
        let mut line = indent.to_vec();
        line.push(Span::styled(format!("{}{}", top, "─".repeat(fill)), border));
        self.push(line);

        for spans in self
            .ctx
            .highlighter
            .highlight_code(text, language, theme.appearance())
        {
            let mut line = indent.to_vec();
            line.push(Span::styled("│ ", border));
            line.extend(spans);
            self.push(line);
        }

        let mut line = indent.to_vec();
        line.push(Span::styled(
            format!("╰{}", "─".repeat(avail.saturating_sub(1))),
            border,
        ));
        self.push(line);
        self.caption(indent, caption);
    }

    fn diagram(&mut self, indent: &[Span<'static>], key: &str, source: &str) {
        let theme = self.ctx.theme;
        self.out.diagrams.push(DiagramSlot {
            key: key.to_string(),
            source: source.to_string(),
            row: self.row(),
        });
        match self.ctx.diagrams.state(key) {
            Some(DiagramState::Ready(diagram)) => {
                let palette = diagram.palette;
                let mut in_legend = false;
                for text in &diagram.lines {
                    if text.is_empty() {
                        in_legend = true;
                    }
                    let color = if in_legend {
                        palette.label
                    } else if !is_connector(text) {
                        palette.node
                    } else {
                        palette.edge
                    };
                    let mut line = indent.to_vec();
                    line.push(Span::styled(text.clone(), Style::default().fg(color)));
                    self.push(line);
                }
            }
            Some(DiagramState::Failed(_)) => {
                let mut line = indent.to_vec();
                line.push(Span::styled(DIAGRAM_UNAVAILABLE, theme.error_style()));
                self.push(line);
            }
            Some(DiagramState::Pending) | None => {
                let mut line = indent.to_vec();
                line.push(Span::styled("⋯ rendering diagram", theme.muted_style()));
                self.push(line);
            }
        }
    }

    fn media(&mut self, indent: &[Span<'static>], kind: MediaKind, url: &str, caption: &[Inline]) {
        let name = url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').find(|s| !s.is_empty()))
            .unwrap_or(url);
        match kind {
            MediaKind::Image if self.ctx.show_images => {
                let row = self.row();
                match self.ctx.media.state(url) {
                    Some(ProbeState::Failed) => return,
                    Some(ProbeState::Ready { width, height }) => {
                        let label = format!("{} ({}×{})", name, width, height);
                        self.link_line(indent, "🖼", &label, url);
                    }
                    Some(ProbeState::Remote) => self.link_line(indent, "🖼", url, url),
                    None => {
                        self.out.images.push(ImageSlot {
                            url: url.to_string(),
                            row,
                        });
                        let mut line = indent.to_vec();
                        line.push(Span::styled(
                            format!("🖼 loading {}", name),
                            self.theme().muted_style(),
                        ));
                        self.push(line);
                    }
                }
            }
            MediaKind::Image => self.link_line(indent, "🖼", url, url),
            MediaKind::File => self.link_line(indent, "📎", name, url),
            MediaKind::Video => self.link_line(indent, "▶", url, url),
            MediaKind::Pdf => self.link_line(indent, "📄", name, url),
        }
        self.caption(indent, caption);
    }

    fn table(
        &mut self,
        indent: &[Span<'static>],
        column_header: bool,
        row_header: bool,
        rows: &[Vec<Vec<Inline>>],
    ) {
        let theme = self.ctx.theme;
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        if columns == 0 {
            return;
        }
        let cells: Vec<Vec<String>> = rows
            .iter()
            .map(|row| {
                (0..columns)
                    .map(|i| row.get(i).map(|c| inline_text(c)).unwrap_or_default())
                    .collect()
            })
            .collect();

        let mut widths: Vec<usize> = (0..columns)
            .map(|i| {
                cells
                    .iter()
                    .map(|row| row[i].width())
                    .max()
                    .unwrap_or(0)
                    .max(MIN_CELL_WIDTH)
            })
            .collect();
        let chrome = columns * 3 + 1;
        let budget = self.avail(indent).saturating_sub(chrome);
        shrink_to_fit(&mut widths, budget);

        let border = Style::default().fg(theme.table_border);
        let rule = |left: &str, mid: &str, right: &str| -> String {
            let inner: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("{}{}{}", left, inner.join(mid), right)
        };

        let mut line = indent.to_vec();
        line.push(Span::styled(rule("┌", "┬", "┐"), border));
        self.push(line);

        for (r, row) in cells.iter().enumerate() {
            let mut line = indent.to_vec();
            line.push(Span::styled("│", border));
            for (c, cell) in row.iter().enumerate() {
                let header = (column_header && r == 0) || (row_header && c == 0);
                let style = if header {
                    theme.text_style().add_modifier(Modifier::BOLD)
                } else {
                    theme.text_style()
                };
                line.push(Span::styled(format!(" {} ", pad_to_width(cell, widths[c])), style));
                line.push(Span::styled("│", border));
            }
            self.push(line);

            if column_header && r == 0 && cells.len() > 1 {
                let mut line = indent.to_vec();
                line.push(Span::styled(rule("├", "┼", "┤"), border));
                self.push(line);
            }
        }

        let mut line = indent.to_vec();
        line.push(Span::styled(rule("└", "┴", "┘"), border));
        self.push(line);
    }
}

fn is_list_like(view: &View) -> bool {
    matches!(view, View::ListItem { .. } | View::ToDo { .. })
}

/// Rows made only of stems and arrow heads.
fn is_connector(text: &str) -> bool {
    text.chars().all(|c| " │▼▲┆┃".contains(c))
}

/// Indent for continuation rows: the same prefix plus `extra` spaces.
fn continuation(indent: &[Span<'static>], extra: usize) -> Vec<Span<'static>> {
    let mut out = indent.to_vec();
    if extra > 0 {
        out.push(Span::raw(" ".repeat(extra)));
    }
    out
}

/// Indent for a blank row: keeps bars, drops trailing padding.
fn trimmed(indent: &[Span<'static>]) -> Vec<Span<'static>> {
    let mut out = indent.to_vec();
    while out.last().is_some_and(|s| s.content.trim().is_empty()) {
        out.pop();
    }
    out
}

/// Narrow the widest columns until the total fits `budget`.
fn shrink_to_fit(widths: &mut [usize], budget: usize) {
    while widths.iter().sum::<usize>() > budget {
        let Some((index, &widest)) = widths.iter().enumerate().max_by_key(|(_, w)| **w) else {
            return;
        };
        if widest <= MIN_CELL_WIDTH {
            return;
        }
        widths[index] = widest - 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Block, BlockKind, CodeBlock, Color as BlockColor, DIAGRAM_LANGUAGE, HeadingLevel,
        PageMetadata, RichText, TextBlock, ToDoBlock,
    };
    use crate::render::InlineStyle;
    use crate::tui::theme::ThemeName;
    use std::time::Duration;

    struct Fixture {
        theme: Theme,
        highlighter: SyntaxHighlighter,
        diagrams: DiagramStore,
        media: MediaProbe,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                theme: Theme::from_name(ThemeName::OceanDark),
                highlighter: SyntaxHighlighter::new(),
                diagrams: DiagramStore::new(),
                media: MediaProbe::default(),
            }
        }

        fn ctx(&self, width: usize) -> PaintContext<'_> {
            PaintContext {
                theme: &self.theme,
                highlighter: &self.highlighter,
                diagrams: &self.diagrams,
                media: &self.media,
                width,
                show_images: true,
                selected_link: None,
            }
        }
    }

    fn text_block(s: &str) -> TextBlock {
        TextBlock {
            rich_text: vec![RichText::plain(s)],
            ..Default::default()
        }
    }

    fn heading(id: &str, level: HeadingLevel, s: &str) -> Block {
        Block::new(id, BlockKind::Heading(level, text_block(s)))
    }

    fn paragraph(id: &str, s: &str) -> Block {
        Block::new(id, BlockKind::Paragraph(text_block(s)))
    }

    fn page(blocks: Vec<Block>) -> Page {
        Page::new("p", blocks, PageMetadata::default())
    }

    fn body(painted: &Painted) -> Vec<String> {
        // Skip title, details, rule and the blank row after it.
        painted.to_plain().into_iter().skip(4).collect()
    }

    #[test]
    fn test_header_shows_defaults() {
        let fx = Fixture::new();
        let painted = paint_page(&page(Vec::new()), &fx.ctx(40));
        let plain = painted.to_plain();
        assert_eq!(plain[0], "Untitled");
        assert_eq!(plain[1], "Uncategorized");
        assert_eq!(plain[2], "─".repeat(40));
    }

    #[test]
    fn test_header_lists_properties() {
        let fx = Fixture::new();
        let metadata: PageMetadata = serde_json::from_str(
            r#"{"properties": {
                "Name": {"type": "title", "title": [{"plain_text": "Roadmap"}]},
                "Status": {"type": "select", "select": {"name": "Draft"}},
                "Done": {"type": "checkbox", "checkbox": false}
            }}"#,
        )
        .unwrap();
        let painted = paint_page(&Page::new("p", Vec::new(), metadata), &fx.ctx(40));
        let plain = painted.to_plain();
        assert_eq!(plain[0], "Roadmap");
        assert_eq!(plain[2], "Status: Draft");
        assert_eq!(plain[3], "Done: no");
        assert_eq!(plain[4], "─".repeat(40));
    }

    #[test]
    fn test_anchor_rows_match_painted_rows() {
        let fx = Fixture::new();
        let long = "word ".repeat(30);
        let painted = paint_page(
            &page(vec![
                heading("h1", HeadingLevel::H1, "Intro"),
                paragraph("p1", &long),
                heading("h2", HeadingLevel::H2, "Details"),
            ]),
            &fx.ctx(20),
        );
        let plain = painted.to_plain();
        assert_eq!(painted.anchors.len(), 2);
        for (anchor, row) in &painted.anchors {
            let expected = if anchor == "h1" { "Intro" } else { "Details" };
            assert_eq!(plain[*row], expected);
        }
        assert!(painted.anchors[1].1 > painted.anchors[0].1 + 5);
    }

    #[test]
    fn test_lists_are_tight_paragraphs_spaced() {
        let fx = Fixture::new();
        let painted = paint_page(
            &page(vec![
                Block::new("a", BlockKind::BulletedListItem(text_block("one"))),
                Block::new("b", BlockKind::BulletedListItem(text_block("two"))),
                Block::new(
                    "c",
                    BlockKind::ToDo(ToDoBlock {
                        rich_text: vec![RichText::plain("done")],
                        checked: true,
                        color: BlockColor::Default,
                    }),
                ),
                paragraph("d", "after"),
            ]),
            &fx.ctx(40),
        );
        assert_eq!(body(&painted), vec!["• one", "• two", "☑ done", "", "after"]);
    }

    #[test]
    fn test_to_do_styles() {
        let fx = Fixture::new();
        let todo = |id: &str, s: &str, checked: bool| {
            Block::new(
                id,
                BlockKind::ToDo(ToDoBlock {
                    rich_text: vec![RichText::plain(s)],
                    checked,
                    color: BlockColor::Default,
                }),
            )
        };
        let painted = paint_page(
            &page(vec![todo("a", "shipped", true), todo("b", "pending", false)]),
            &fx.ctx(40),
        );
        assert_eq!(body(&painted), vec!["☑ shipped", "☐ pending"]);

        let span = |text: &str| {
            painted
                .lines
                .iter()
                .flat_map(|line| line.spans.iter())
                .find(|span| span.content == text)
                .map(|span| span.style)
                .unwrap()
        };
        let done = span("shipped");
        assert_eq!(done.fg, Some(fx.theme.muted_fg));
        assert!(done.add_modifier.contains(Modifier::CROSSED_OUT));

        let open = span("pending");
        assert_eq!(open.fg, Some(fx.theme.foreground));
        assert!(!open.add_modifier.contains(Modifier::CROSSED_OUT));
    }

    #[test]
    fn test_links_get_rows() {
        let fx = Fixture::new();
        let block = Block::new(
            "p",
            BlockKind::Paragraph(TextBlock {
                rich_text: vec![
                    RichText::plain("read "),
                    RichText::plain("this").with_link("https://example.com"),
                ],
                ..Default::default()
            }),
        );
        let painted = paint_page(&page(vec![block]), &fx.ctx(40));
        assert_eq!(painted.links.len(), 1);
        let link = &painted.links[0];
        assert_eq!(link.href, "https://example.com");
        assert_eq!(link.text, "this");
        assert_eq!(painted.to_plain()[link.row], "read this");
    }

    #[test]
    fn test_selected_link_is_highlighted() {
        let fx = Fixture::new();
        let block = Block::new(
            "p",
            BlockKind::Paragraph(TextBlock {
                rich_text: vec![RichText::plain("x").with_link("/other")],
                ..Default::default()
            }),
        );
        let mut ctx = fx.ctx(40);
        ctx.selected_link = Some(0);
        let painted = paint_page(&page(vec![block]), &ctx);
        let row = &painted.lines[painted.links[0].row];
        assert!(row.spans.iter().any(|s| s.style.bg == Some(fx.theme.link_selected_bg)));
    }

    #[test]
    fn test_code_block_frame() {
        let fx = Fixture::new();
        let block = Block::new(
            "c",
            BlockKind::Code(CodeBlock {
                rich_text: vec![RichText::plain("let x = 1;")],
                language: "rust".into(),
                caption: Vec::new(),
            }),
        );
        let painted = paint_page(&page(vec![block]), &fx.ctx(20));
        let lines = body(&painted);
        assert!(lines[0].starts_with("╭─ rust "));
        assert_eq!(lines[1], "│ let x = 1;");
        assert!(lines[2].starts_with("╰"));
    }

    #[test]
    fn test_diagram_states() {
        let mut fx = Fixture::new();
        let ok = Block::new(
            "d1",
            BlockKind::Code(CodeBlock {
                rich_text: vec![RichText::plain("graph TD\nA-->B")],
                language: DIAGRAM_LANGUAGE.into(),
                caption: Vec::new(),
            }),
        );
        let bad = Block::new(
            "d2",
            BlockKind::Code(CodeBlock {
                rich_text: vec![RichText::plain("pie\n\"x\": 1")],
                language: DIAGRAM_LANGUAGE.into(),
                caption: Vec::new(),
            }),
        );
        let page = page(vec![ok, bad]);

        let painted = paint_page(&page, &fx.ctx(40));
        assert_eq!(painted.diagrams.len(), 2);
        assert_eq!(body(&painted), vec!["⋯ rendering diagram", "", "⋯ rendering diagram"]);

        for slot in &painted.diagrams {
            fx.diagrams.request(&slot.key, &slot.source, fx.theme.appearance());
        }
        fx.diagrams.wait_all(Duration::from_secs(5));

        let painted = paint_page(&page, &fx.ctx(40));
        let lines = body(&painted);
        assert!(lines.iter().any(|l| l == "│ A │"));
        assert_eq!(lines.last().map(String::as_str), Some(DIAGRAM_UNAVAILABLE));
    }

    #[test]
    fn test_failed_image_is_hidden() {
        let mut fx = Fixture::new();
        let image = |id: &str, url: &str| {
            Block::new(
                id,
                BlockKind::Image(crate::model::MediaBlock {
                    source: crate::model::FileObject::external(url),
                    caption: vec![RichText::plain("caption")],
                }),
            )
        };
        let page = page(vec![
            paragraph("a", "before"),
            image("i", "/definitely/missing.png"),
            paragraph("b", "after"),
        ]);

        let painted = paint_page(&page, &fx.ctx(40));
        assert_eq!(painted.images.len(), 1);
        fx.media.probe(&painted.images[0].url);

        let painted = paint_page(&page, &fx.ctx(40));
        assert_eq!(body(&painted), vec!["before", "", "after"]);
    }

    #[test]
    fn test_table_grid() {
        let fx = Fixture::new();
        let plain = |s: &str| {
            vec![Inline::Text {
                text: s.into(),
                style: InlineStyle::default(),
            }]
        };
        let ctx = fx.ctx(40);
        let mut painter = Painter::new(&ctx);
        painter.table(
            &[],
            true,
            false,
            &[vec![plain("Name"), plain("Qty")], vec![plain("apple"), plain("3")]],
        );
        assert_eq!(
            painter.out.to_plain(),
            vec![
                "┌───────┬─────┐",
                "│ Name  │ Qty │",
                "├───────┼─────┤",
                "│ apple │ 3   │",
                "└───────┴─────┘",
            ]
        );
    }

    #[test]
    fn test_shrink_to_fit() {
        let mut widths = vec![20, 5, 3];
        shrink_to_fit(&mut widths, 15);
        assert_eq!(widths.iter().sum::<usize>(), 15);
        let mut tiny = vec![4, 4];
        shrink_to_fit(&mut tiny, 2);
        assert_eq!(tiny, vec![3, 3]);
    }

    #[test]
    fn test_skeleton_fills_height() {
        let theme = Theme::from_name(ThemeName::Nord);
        let lines = paint_skeleton(&theme, 20, 5);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0].width(), 9);
        assert_eq!(lines[1].width(), 0);
    }
}
