//! Utility functions for UI rendering

use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Create a centered rectangle with percentage-based sizing
pub fn centered_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

/// Centered popup that never shrinks below `min_width` x `min_height`
/// (unless the screen itself is smaller).
pub fn popup_area(
    area: Rect,
    percent_x: u16,
    percent_y: u16,
    min_width: u16,
    min_height: u16,
) -> Rect {
    let mut popup = centered_area(area, percent_x, percent_y);
    let width = popup.width.max(min_width).min(area.width);
    let height = popup.height.max(min_height).min(area.height);
    popup.x = area.x + (area.width - width) / 2;
    popup.y = area.y + (area.height - height) / 2;
    popup.width = width;
    popup.height = height;
    popup
}

/// A run of styled text, optionally part of link number `link`.
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    pub text: String,
    pub style: Style,
    pub link: Option<usize>,
}

impl Piece {
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
            link: None,
        }
    }

    pub fn link(mut self, index: usize) -> Self {
        self.link = Some(index);
        self
    }
}

/// One wrapped row plus the link numbers that appear on it.
#[derive(Debug, Clone, Default)]
pub struct WrappedLine {
    pub line: Line<'static>,
    pub links: Vec<usize>,
}

/// Word-wrap styled pieces to `width` columns.
///
/// The first row starts with `first`, later rows with `rest`. Words wider
/// than the remaining space are broken at character boundaries. Explicit
/// newlines in the text start a new row. Always returns at least one row.
pub fn wrap_pieces(
    pieces: &[Piece],
    width: usize,
    first: &[Span<'static>],
    rest: &[Span<'static>],
) -> Vec<WrappedLine> {
    let mut rows = Vec::new();
    let mut current = start_row(first);
    let mut keep = first.len();
    let mut used = prefix_width(first);
    let rest_width = prefix_width(rest);
    let mut row_empty = true;

    for piece in pieces {
        for (i, segment) in piece.text.split('\n').enumerate() {
            if i > 0 {
                rows.push(finish(std::mem::replace(&mut current, start_row(rest)), keep));
                keep = rest.len();
                used = rest_width;
                row_empty = true;
            }
            for token in tokens(segment) {
                let is_space = token.starts_with(' ');
                let token_width = token.width();
                if used + token_width > width && !row_empty {
                    rows.push(finish(std::mem::replace(&mut current, start_row(rest)), keep));
                    keep = rest.len();
                    used = rest_width;
                    row_empty = true;
                    if is_space {
                        continue;
                    }
                }
                if used + token_width <= width || is_space {
                    push_text(&mut current, token, piece);
                    used += token_width;
                    row_empty = false;
                    continue;
                }
                // Token longer than a whole row.
                let mut chunk = String::new();
                for ch in token.chars() {
                    let w = ch.width().unwrap_or(0);
                    if used + w > width && (!chunk.is_empty() || !row_empty) {
                        push_text(&mut current, &chunk, piece);
                        chunk.clear();
                        rows.push(std::mem::replace(&mut current, start_row(rest)));
                        keep = rest.len();
                        used = rest_width;
                    }
                    chunk.push(ch);
                    used += w;
                    row_empty = false;
                }
                push_text(&mut current, &chunk, piece);
            }
        }
    }
    rows.push(finish(current, keep));
    rows
}

/// Drop trailing spaces a break left behind, leaving the prefix alone.
fn finish(mut row: WrappedLine, prefix_len: usize) -> WrappedLine {
    while row.line.spans.len() > prefix_len {
        let Some(last) = row.line.spans.last_mut() else {
            break;
        };
        let trimmed = last.content.trim_end_matches(' ').to_string();
        if trimmed.is_empty() {
            row.line.spans.pop();
        } else {
            last.content = trimmed.into();
            break;
        }
    }
    row
}

fn start_row(prefix: &[Span<'static>]) -> WrappedLine {
    WrappedLine {
        line: Line::from(prefix.to_vec()),
        links: Vec::new(),
    }
}

fn prefix_width(prefix: &[Span<'static>]) -> usize {
    prefix.iter().map(|s| s.content.width()).sum()
}

fn push_text(row: &mut WrappedLine, text: &str, piece: &Piece) {
    if text.is_empty() {
        return;
    }
    row.line.spans.push(Span::styled(text.to_string(), piece.style));
    if let Some(link) = piece.link
        && !row.links.contains(&link)
    {
        row.links.push(link);
    }
}

/// Split into alternating runs of spaces and non-spaces.
fn tokens(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_space = None;
    for (i, ch) in text.char_indices() {
        let space = ch == ' ';
        if in_space.is_some_and(|s| s != space) {
            out.push(&text[start..i]);
            start = i;
        }
        in_space = Some(space);
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}

/// Cut `text` to at most `width` columns, ending in `…` when shortened.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// Pad (or truncate) text to exactly `width` columns, left aligned.
pub fn pad_to_width(text: &str, width: usize) -> String {
    let text = truncate_to_width(text, width);
    let pad = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(pad))
}
