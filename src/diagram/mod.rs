//! Diagram code blocks compiled to box-drawing text.
//!
//! Compilation is isolated per instance: [`worker::DiagramStore`] runs each
//! source on its own thread and a failure only affects that block, which
//! then shows [`DIAGRAM_UNAVAILABLE`].

pub mod layout;
pub mod parse;
pub mod worker;

pub use worker::{DiagramState, DiagramStore};

use crate::error::DiagramError;
use ratatui::style::Color;

/// Shown in place of a diagram that failed to compile.
pub const DIAGRAM_UNAVAILABLE: &str = "diagram preview unavailable";

/// Terminal appearance, read once when a diagram compile is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Appearance {
    #[default]
    Dark,
    Light,
}

/// Colors a compiled diagram is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub node: Color,
    pub edge: Color,
    pub label: Color,
}

impl Palette {
    pub fn for_appearance(appearance: Appearance) -> Self {
        match appearance {
            Appearance::Dark => Self {
                node: Color::Rgb(137, 180, 250),
                edge: Color::Rgb(147, 153, 178),
                label: Color::Rgb(205, 214, 244),
            },
            Appearance::Light => Self {
                node: Color::Rgb(30, 102, 245),
                edge: Color::Rgb(108, 111, 133),
                label: Color::Rgb(76, 79, 105),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledDiagram {
    pub lines: Vec<String>,
    pub palette: Palette,
}

impl CompiledDiagram {
    pub fn width(&self) -> usize {
        use unicode_width::UnicodeWidthStr;
        self.lines.iter().map(|l| l.width()).max().unwrap_or(0)
    }
}

/// Parse and lay out one diagram source.
pub fn compile(source: &str, appearance: Appearance) -> Result<CompiledDiagram, DiagramError> {
    let chart = parse::parse(source)?;
    Ok(CompiledDiagram {
        lines: layout::draw(&chart),
        palette: Palette::for_appearance(appearance),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_picks_palette() {
        let dark = compile("graph TD; A-->B", Appearance::Dark).unwrap();
        let light = compile("graph TD; A-->B", Appearance::Light).unwrap();
        assert_eq!(dark.lines, light.lines);
        assert_ne!(dark.palette, light.palette);
        assert!(dark.width() > 0);
    }

    #[test]
    fn test_compile_errors() {
        assert_eq!(compile("", Appearance::Dark), Err(DiagramError::Empty));
        assert!(compile("pie\n\"a\": 1", Appearance::Dark).is_err());
    }
}
