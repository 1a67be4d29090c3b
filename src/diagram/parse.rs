//! Parser for the flowchart subset of Mermaid.
//!
//! Supported: `graph`/`flowchart` headers with a direction, node shapes
//! `A`, `A[..]`, `A(..)`, `A((..))`, `A{..}`, `A[[..]]`, edges `-->`,
//! `---`, `-.->`, `-.-`, `==>`, `===`, inline labels `-->|text|` and
//! `-- text -->`, chains, `;` separators and `%%` comments. Styling
//! statements are accepted and ignored.

use crate::error::DiagramError;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    TopDown,
    BottomUp,
    LeftRight,
    RightLeft,
}

impl Direction {
    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::TopDown | Direction::BottomUp)
    }

    pub fn is_reversed(self) -> bool {
        matches!(self, Direction::BottomUp | Direction::RightLeft)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    Rect,
    Round,
    Circle,
    Diamond,
    Subroutine,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub shape: NodeShape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeStyle {
    Arrow,
    Line,
    Dotted,
    Thick,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub label: Option<String>,
    pub style: EdgeStyle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flowchart {
    pub direction: Direction,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

const OTHER_DIAGRAM_KINDS: &[&str] = &[
    "sequenceDiagram",
    "classDiagram",
    "stateDiagram",
    "stateDiagram-v2",
    "erDiagram",
    "gantt",
    "pie",
    "journey",
    "gitGraph",
    "mindmap",
    "timeline",
    "quadrantChart",
    "requirementDiagram",
    "C4Context",
    "sankey-beta",
    "xychart-beta",
    "block-beta",
];

const IGNORED_STATEMENTS: &[&str] = &[
    "classDef", "class", "style", "linkStyle", "click", "subgraph", "end", "direction",
];

static EDGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:(?P<op>-\.->|-->|---|-\.-|==>|===)\s*(?:\|(?P<pipe>[^|]*)\|)?|--\s+(?P<dash>[^-].*?)\s+-->|==\s+(?P<thick>[^=].*?)\s+==>)",
    )
    .expect("edge pattern is valid")
});

static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z0-9_]+)").expect("id pattern is valid"));

struct Builder {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
    edges: Vec<Edge>,
}

impl Builder {
    fn node(&mut self, id: &str, label: Option<String>, shape: Option<NodeShape>) -> usize {
        if let Some(&idx) = self.index.get(id) {
            let node = &mut self.nodes[idx];
            if let Some(label) = label {
                node.label = label;
            }
            if let Some(shape) = shape {
                node.shape = shape;
            }
            return idx;
        }
        let idx = self.nodes.len();
        self.nodes.push(Node {
            id: id.to_string(),
            label: label.unwrap_or_else(|| id.to_string()),
            shape: shape.unwrap_or(NodeShape::Rect),
        });
        self.index.insert(id.to_string(), idx);
        idx
    }
}

pub fn parse(source: &str) -> Result<Flowchart, DiagramError> {
    let mut statements = source
        .lines()
        .enumerate()
        .flat_map(|(line_no, line)| {
            let line = match line.find("%%") {
                Some(pos) => &line[..pos],
                None => line,
            };
            line.split(';')
                .map(move |stmt| (line_no + 1, stmt.trim().to_string()))
                .collect::<Vec<_>>()
        })
        .filter(|(_, stmt)| !stmt.is_empty());

    let (header_line, header) = statements.next().ok_or(DiagramError::Empty)?;
    let direction = parse_header(header_line, &header)?;

    let mut builder = Builder {
        nodes: Vec::new(),
        index: HashMap::new(),
        edges: Vec::new(),
    };

    for (line, stmt) in statements {
        let keyword = stmt.split_whitespace().next().unwrap_or_default();
        if IGNORED_STATEMENTS.contains(&keyword) {
            continue;
        }
        parse_statement(&mut builder, line, &stmt)?;
    }

    if builder.nodes.is_empty() {
        return Err(DiagramError::NoNodes);
    }

    Ok(Flowchart {
        direction,
        nodes: builder.nodes,
        edges: builder.edges,
    })
}

fn parse_header(line: usize, header: &str) -> Result<Direction, DiagramError> {
    let mut words = header.split_whitespace();
    let keyword = words.next().unwrap_or_default();
    if keyword != "graph" && keyword != "flowchart" {
        if OTHER_DIAGRAM_KINDS.contains(&keyword) {
            return Err(DiagramError::UnsupportedKind(keyword.to_string()));
        }
        return Err(DiagramError::Syntax {
            line,
            message: format!("expected `graph` or `flowchart`, found `{}`", keyword),
        });
    }

    match words.next() {
        None | Some("TD") | Some("TB") => Ok(Direction::TopDown),
        Some("BT") => Ok(Direction::BottomUp),
        Some("LR") => Ok(Direction::LeftRight),
        Some("RL") => Ok(Direction::RightLeft),
        Some(other) => Err(DiagramError::Syntax {
            line,
            message: format!("unknown direction `{}`", other),
        }),
    }
}

fn parse_statement(builder: &mut Builder, line: usize, stmt: &str) -> Result<(), DiagramError> {
    let syntax = |message: String| DiagramError::Syntax { line, message };

    let (mut prev, mut rest) = parse_node(builder, stmt).ok_or_else(|| {
        syntax(format!("expected a node, found `{}`", stmt))
    })?;

    while !rest.trim().is_empty() {
        let caps = EDGE_RE
            .captures(rest)
            .ok_or_else(|| syntax(format!("expected an edge, found `{}`", rest.trim())))?;
        let (style, label) = if let Some(op) = caps.name("op") {
            let style = match op.as_str() {
                "-->" => EdgeStyle::Arrow,
                "---" => EdgeStyle::Line,
                "==>" | "===" => EdgeStyle::Thick,
                _ => EdgeStyle::Dotted,
            };
            (style, caps.name("pipe").map(|m| m.as_str()))
        } else if let Some(label) = caps.name("dash") {
            (EdgeStyle::Arrow, Some(label.as_str()))
        } else {
            (EdgeStyle::Thick, caps.name("thick").map(|m| m.as_str()))
        };
        let label = label
            .map(clean_label)
            .filter(|l| !l.is_empty());

        let after_edge = &rest[caps.get(0).map_or(0, |m| m.end())..];
        let (next, remaining) = parse_node(builder, after_edge).ok_or_else(|| {
            syntax(format!("edge has no target in `{}`", stmt))
        })?;

        builder.edges.push(Edge {
            from: prev,
            to: next,
            label,
            style,
        });
        prev = next;
        rest = remaining;
    }

    Ok(())
}

/// Parse a node reference with an optional shape, returning its index and
/// the unparsed remainder.
fn parse_node<'a>(builder: &mut Builder, input: &'a str) -> Option<(usize, &'a str)> {
    let caps = ID_RE.captures(input)?;
    let id_match = caps.get(1)?;
    let after = &input[id_match.end()..];

    let shapes: [(&str, &str, NodeShape); 6] = [
        ("((", "))", NodeShape::Circle),
        ("[[", "]]", NodeShape::Subroutine),
        ("[", "]", NodeShape::Rect),
        ("(", ")", NodeShape::Round),
        ("{", "}", NodeShape::Diamond),
        (">", "]", NodeShape::Rect),
    ];

    for (open, close, shape) in shapes {
        if let Some(body) = after.strip_prefix(open) {
            let end = body.find(close)?;
            let label = clean_label(&body[..end]);
            let idx = builder.node(id_match.as_str(), Some(label), Some(shape));
            return Some((idx, &body[end + close.len()..]));
        }
    }

    Some((builder.node(id_match.as_str(), None, None), after))
}

fn clean_label(raw: &str) -> String {
    raw.trim().trim_matches('"').replace("<br>", " ").replace("<br/>", " ")
}
