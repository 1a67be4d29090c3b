use crate::keybindings::{KeybindingMode, Keybindings};
use crate::tui::theme::Theme;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

/// Key column width for keybindings
const KEY_COLUMN_WIDTH: usize = 13;

#[derive(Debug, Clone, PartialEq)]
pub enum HelpLine {
    Title(&'static str),
    Description(&'static str),
    SectionHeader(String),
    KeyBinding { key: String, desc: &'static str },
    Blank,
}

impl HelpLine {
    /// Convert this help line to a styled ratatui Line
    pub fn to_line(&self, theme: &Theme) -> Line<'static> {
        match self {
            HelpLine::Title(text) => Line::from(Span::styled(
                text.to_string(),
                Style::default()
                    .fg(theme.heading_1)
                    .add_modifier(Modifier::BOLD),
            )),
            HelpLine::Description(text) => Line::from(Span::styled(
                text.to_string(),
                theme.muted_style().add_modifier(Modifier::ITALIC),
            )),
            HelpLine::SectionHeader(text) => Line::from(Span::styled(
                text.clone(),
                Style::default()
                    .fg(theme.heading_2)
                    .add_modifier(Modifier::BOLD),
            )),
            HelpLine::KeyBinding { key, desc } => Line::from(vec![
                Span::styled(
                    format!("  {:<width$}", key, width = KEY_COLUMN_WIDTH),
                    Style::default().fg(theme.list_bullet),
                ),
                Span::styled(desc.to_string(), theme.text_style()),
            ]),
            HelpLine::Blank => Line::from(""),
        }
    }
}

const FOOTER: &str = "Use j/k or ↓/↑ to scroll | Press Esc or ? to close";

/// Help content generated from the active keybindings, so user overrides
/// show up as bound.
pub fn help_lines(keybindings: &Keybindings) -> Vec<HelpLine> {
    let mut lines = vec![
        HelpLine::Title("blockview - Keyboard Shortcuts"),
        HelpLine::Description(FOOTER),
        HelpLine::Blank,
    ];

    for (mode, heading) in [
        (KeybindingMode::Normal, None),
        (KeybindingMode::LinkFollow, Some("Link Follow Mode")),
    ] {
        let mut current_category = None;
        if let Some(heading) = heading {
            lines.push(HelpLine::SectionHeader(heading.to_string()));
        }
        for (action, keys) in keybindings.help_entries(mode) {
            if heading.is_none() && current_category != Some(action.category()) {
                if current_category.is_some() {
                    lines.push(HelpLine::Blank);
                }
                current_category = Some(action.category());
                lines.push(HelpLine::SectionHeader(action.category().to_string()));
            }
            lines.push(HelpLine::KeyBinding {
                key: keys.join("/"),
                desc: action.description(),
            });
        }
        lines.push(HelpLine::Blank);
    }

    lines.push(HelpLine::Description(FOOTER));
    lines
}

/// Build the help text with theme colors applied
pub fn build_help_text(keybindings: &Keybindings, theme: &Theme) -> Vec<Line<'static>> {
    help_lines(keybindings)
        .iter()
        .map(|line| line.to_line(theme))
        .collect()
}
