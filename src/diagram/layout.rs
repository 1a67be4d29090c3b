//! Layered box-drawing layout for parsed flowcharts.
//!
//! Nodes are ranked by longest path from the sources. Vertical charts draw
//! one row of boxes per rank with arrow rows between them; horizontal
//! charts draw one column of boxes per rank joined by arrows. Edges that
//! carry a label, skip a rank or point backwards are listed beneath the
//! drawing.

use super::parse::{EdgeStyle, Flowchart, Node, NodeShape};
use unicode_width::UnicodeWidthStr;

const BOX_GAP: usize = 3;
const MAX_LABEL_WIDTH: usize = 24;

/// Rank of every node, cycles are cut after `nodes.len()` relaxations.
pub fn rank_nodes(chart: &Flowchart) -> Vec<usize> {
    let n = chart.nodes.len();
    let mut rank = vec![0usize; n];
    for _ in 0..n {
        let mut changed = false;
        for edge in &chart.edges {
            if edge.from == edge.to {
                continue;
            }
            let candidate = rank[edge.from] + 1;
            if candidate > rank[edge.to] && candidate < n {
                rank[edge.to] = candidate;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    rank
}

fn layers(chart: &Flowchart, rank: &[usize]) -> Vec<Vec<usize>> {
    let depth = rank.iter().copied().max().unwrap_or(0) + 1;
    let mut layers = vec![Vec::new(); depth];
    for (idx, r) in rank.iter().enumerate() {
        layers[*r].push(idx);
    }
    layers.retain(|layer| !layer.is_empty());
    if chart.direction.is_reversed() {
        layers.reverse();
    }
    layers
}

fn truncate(label: &str) -> String {
    if label.width() <= MAX_LABEL_WIDTH {
        return label.to_string();
    }
    let mut out = String::new();
    for ch in label.chars() {
        if out.width() + 2 > MAX_LABEL_WIDTH {
            break;
        }
        out.push(ch);
    }
    out.push('…');
    out
}

/// A node drawn as three lines of equal display width.
fn draw_box(node: &Node) -> [String; 3] {
    let label = truncate(&node.label);
    let inner = label.width() + 2;
    let (tl, tr, bl, br, side_l, side_r) = match node.shape {
        NodeShape::Rect => ('┌', '┐', '└', '┘', "│", "│"),
        NodeShape::Round | NodeShape::Circle => ('╭', '╮', '╰', '╯', "│", "│"),
        NodeShape::Diamond => ('◆', '◆', '◆', '◆', "<", ">"),
        NodeShape::Subroutine => ('┌', '┐', '└', '┘', "║", "║"),
    };
    let bar = "─".repeat(inner);
    [
        format!("{}{}{}", tl, bar, tr),
        format!("{} {} {}", side_l, label, side_r),
        format!("{}{}{}", bl, bar, br),
    ]
}

fn box_width(node: &Node) -> usize {
    truncate(&node.label).width() + 4
}

fn pad_to(line: &mut String, width: usize) {
    let current = line.width();
    if current < width {
        line.push_str(&" ".repeat(width - current));
    }
}

fn edge_glyph(style: EdgeStyle) -> &'static str {
    match style {
        EdgeStyle::Arrow => "──▶",
        EdgeStyle::Line => "───",
        EdgeStyle::Dotted => "┄┄▶",
        EdgeStyle::Thick => "━━▶",
    }
}

/// Draw the chart as plain text lines.
pub fn draw(chart: &Flowchart) -> Vec<String> {
    let rank = rank_nodes(chart);
    let layers = layers(chart, &rank);
    let position: Vec<usize> = {
        let mut position = vec![0; chart.nodes.len()];
        for (layer_idx, layer) in layers.iter().enumerate() {
            for &node in layer {
                position[node] = layer_idx;
            }
        }
        position
    };

    let mut lines = if chart.direction.is_vertical() {
        draw_vertical(chart, &layers, &position)
    } else {
        draw_horizontal(chart, &layers, &position)
    };

    let extra: Vec<String> = chart
        .edges
        .iter()
        .filter(|e| {
            e.label.is_some() || position[e.to] != position[e.from] + 1 || e.from == e.to
        })
        .map(|e| {
            let from = &chart.nodes[e.from].label;
            let to = &chart.nodes[e.to].label;
            match &e.label {
                Some(label) => format!("  {} {} {} : {}", from, edge_glyph(e.style), to, label),
                None => format!("  {} {} {}", from, edge_glyph(e.style), to),
            }
        })
        .collect();

    if !extra.is_empty() {
        lines.push(String::new());
        lines.extend(extra);
    }

    for line in &mut lines {
        let trimmed = line.trim_end().len();
        line.truncate(trimmed);
    }
    lines
}

fn draw_vertical(chart: &Flowchart, layers: &[Vec<usize>], position: &[usize]) -> Vec<String> {
    let mut lines = Vec::new();

    for (layer_idx, layer) in layers.iter().enumerate() {
        if layer_idx > 0 {
            // Arrow rows above every box that is reached from the layer above.
            let mut stem = String::new();
            let mut head = String::new();
            for (i, &node) in layer.iter().enumerate() {
                if i > 0 {
                    stem.push_str(&" ".repeat(BOX_GAP));
                    head.push_str(&" ".repeat(BOX_GAP));
                }
                let width = box_width(&chart.nodes[node]);
                let reached = chart
                    .edges
                    .iter()
                    .any(|e| e.to == node && position[e.from] + 1 == layer_idx);
                let center = width / 2;
                let (s, h) = if reached { ("│", "▼") } else { (" ", " ") };
                stem.push_str(&" ".repeat(center));
                stem.push_str(s);
                stem.push_str(&" ".repeat(width - center - 1));
                head.push_str(&" ".repeat(center));
                head.push_str(h);
                head.push_str(&" ".repeat(width - center - 1));
            }
            lines.push(stem);
            lines.push(head);
        }

        let mut rows = [String::new(), String::new(), String::new()];
        for (i, &node) in layer.iter().enumerate() {
            let drawn = draw_box(&chart.nodes[node]);
            for (row, part) in rows.iter_mut().zip(drawn.iter()) {
                if i > 0 {
                    row.push_str(&" ".repeat(BOX_GAP));
                }
                row.push_str(part);
            }
        }
        lines.extend(rows);
    }

    lines
}

fn draw_horizontal(chart: &Flowchart, layers: &[Vec<usize>], position: &[usize]) -> Vec<String> {
    // Each layer becomes a column of stacked boxes.
    let columns: Vec<(Vec<String>, usize)> = layers
        .iter()
        .map(|layer| {
            let width = layer
                .iter()
                .map(|&n| box_width(&chart.nodes[n]))
                .max()
                .unwrap_or(0);
            let mut column = Vec::new();
            for (i, &node) in layer.iter().enumerate() {
                if i > 0 {
                    column.push(String::new());
                }
                column.extend(draw_box(&chart.nodes[node]));
            }
            (column, width)
        })
        .collect();

    let height = columns.iter().map(|(c, _)| c.len()).max().unwrap_or(0);
    let mut lines = vec![String::new(); height];
    let mut offset = 0;

    for (col_idx, (column, width)) in columns.iter().enumerate() {
        if col_idx > 0 {
            let linked = chart
                .edges
                .iter()
                .any(|e| position[e.from] + 1 == col_idx && position[e.to] == col_idx);
            for (row, line) in lines.iter_mut().enumerate() {
                if linked && row == 1 {
                    line.push_str(" ──▶ ");
                } else {
                    line.push_str("     ");
                }
            }
            offset += 5;
        }
        offset += width;
        for (row, line) in lines.iter_mut().enumerate() {
            if let Some(part) = column.get(row) {
                line.push_str(part);
            }
            pad_to(line, offset);
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::parse::parse;

    #[test]
    fn test_ranks_follow_longest_path() {
        let chart = parse("graph TD\nA-->B\nB-->C\nA-->C").unwrap();
        assert_eq!(rank_nodes(&chart), vec![0, 1, 2]);
    }

    #[test]
    fn test_cycles_terminate() {
        let chart = parse("graph TD\nA-->B\nB-->A").unwrap();
        let rank = rank_nodes(&chart);
        assert!(rank.iter().all(|&r| r < 2));
    }

    #[test]
    fn test_vertical_drawing() {
        let chart = parse("graph TD\nA[Start]-->B[End]").unwrap();
        let lines = draw(&chart);
        assert_eq!(
            lines,
            vec![
                "┌───────┐",
                "│ Start │",
                "└───────┘",
                "   │",
                "   ▼",
                "┌─────┐",
                "│ End │",
                "└─────┘",
            ]
        );
    }

    #[test]
    fn test_horizontal_drawing_has_arrow() {
        let chart = parse("graph LR\nA-->B").unwrap();
        let lines = draw(&chart);
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("──▶"));
        assert!(lines[1].starts_with("│ A │"));
    }

    #[test]
    fn test_labeled_edges_listed() {
        let chart = parse("graph TD\nA-->|go|B").unwrap();
        let lines = draw(&chart);
        assert!(lines.iter().any(|l| l.contains("A ──▶ B : go")));
    }
}
