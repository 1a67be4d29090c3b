//! Code block highlighting with syntect.

use crate::diagram::Appearance;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Theme as SyntectTheme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

const DARK_THEME: &str = "base16-ocean.dark";
const LIGHT_THEME: &str = "InspiredGitHub";

pub struct SyntaxHighlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl SyntaxHighlighter {
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    fn syntax_for(&self, language: &str) -> &SyntaxReference {
        let language = language.trim();
        let token = match language.to_ascii_lowercase().as_str() {
            "plain text" | "plain" | "" => return self.syntax_set.find_syntax_plain_text(),
            "shell" | "bash" | "sh" => "bash".to_string(),
            "c++" => "cpp".to_string(),
            "c#" => "cs".to_string(),
            other => other.to_string(),
        };
        self.syntax_set
            .find_syntax_by_token(&token)
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
    }

    fn theme(&self, appearance: Appearance) -> Option<&SyntectTheme> {
        let name = match appearance {
            Appearance::Dark => DARK_THEME,
            Appearance::Light => LIGHT_THEME,
        };
        self.theme_set
            .themes
            .get(name)
            .or_else(|| self.theme_set.themes.values().next())
    }

    /// Highlight `code` as `language`, one span list per source line.
    /// Unknown languages and highlighting failures fall back to plain text.
    pub fn highlight_code(
        &self,
        code: &str,
        language: &str,
        appearance: Appearance,
    ) -> Vec<Vec<Span<'static>>> {
        let plain = || {
            code.lines()
                .map(|line| vec![Span::raw(line.to_string())])
                .collect::<Vec<_>>()
        };
        let Some(theme) = self.theme(appearance) else {
            return plain();
        };

        let mut highlighter = HighlightLines::new(self.syntax_for(language), theme);
        let mut out = Vec::new();
        for line in LinesWithEndings::from(code) {
            let Ok(regions) = highlighter.highlight_line(line, &self.syntax_set) else {
                return plain();
            };
            out.push(
                regions
                    .into_iter()
                    .map(|(style, text)| {
                        Span::styled(
                            text.trim_end_matches(['\n', '\r']).to_string(),
                            convert_style(style),
                        )
                    })
                    .filter(|span| !span.content.is_empty())
                    .collect(),
            );
        }
        out
    }
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

fn convert_style(style: syntect::highlighting::Style) -> Style {
    let fg = style.foreground;
    let mut out = Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b));
    if style.font_style.contains(FontStyle::BOLD) {
        out = out.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        out = out.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        out = out.add_modifier(Modifier::UNDERLINED);
    }
    out
}
