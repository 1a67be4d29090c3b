//! Color themes.
//!
//! Every theme declares whether it is dark or light; diagram compiles read
//! that [`Appearance`] once when they start.

use crate::config::CustomThemeConfig;
use crate::diagram::Appearance;
use crate::model::Color as BlockColor;
use crate::tui::terminal_compat::ColorMode;
use ratatui::style::{Color, Modifier, Style};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
pub enum ThemeName {
    #[default]
    OceanDark,
    Nord,
    Dracula,
    Gruvbox,
    TokyoNight,
    CatppuccinMocha,
    SolarizedLight,
    CatppuccinLatte,
}

impl ThemeName {
    /// The theme after this one, wrapping around.
    pub fn next(self) -> Self {
        let all: Vec<_> = Self::iter().collect();
        let idx = all.iter().position(|t| *t == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    pub fn appearance(self) -> Appearance {
        match self {
            ThemeName::SolarizedLight | ThemeName::CatppuccinLatte => Appearance::Light,
            _ => Appearance::Dark,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: ThemeName,
    pub background: Color,
    pub foreground: Color,
    pub heading_1: Color,
    pub heading_2: Color,
    pub heading_3: Color,
    pub border_focused: Color,
    pub border_unfocused: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,
    pub active_heading_fg: Color,
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    pub inline_code_fg: Color,
    pub inline_code_bg: Color,
    pub list_bullet: Color,
    pub quote_border: Color,
    pub callout_bg: Color,
    pub code_border: Color,
    pub link_fg: Color,
    pub link_selected_bg: Color,
    pub table_border: Color,
    pub muted_fg: Color,
    pub error_fg: Color,
}

const fn rgb(hex: u32) -> Color {
    Color::Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

impl Theme {
    pub fn from_name(name: ThemeName) -> Self {
        let p = |colors: [u32; 23]| Theme {
            name,
            background: rgb(colors[0]),
            foreground: rgb(colors[1]),
            heading_1: rgb(colors[2]),
            heading_2: rgb(colors[3]),
            heading_3: rgb(colors[4]),
            border_focused: rgb(colors[5]),
            border_unfocused: rgb(colors[6]),
            selection_bg: rgb(colors[7]),
            selection_fg: rgb(colors[8]),
            active_heading_fg: rgb(colors[9]),
            status_bar_bg: rgb(colors[10]),
            status_bar_fg: rgb(colors[11]),
            inline_code_fg: rgb(colors[12]),
            inline_code_bg: rgb(colors[13]),
            list_bullet: rgb(colors[14]),
            quote_border: rgb(colors[15]),
            callout_bg: rgb(colors[16]),
            code_border: rgb(colors[17]),
            link_fg: rgb(colors[18]),
            link_selected_bg: rgb(colors[19]),
            table_border: rgb(colors[20]),
            muted_fg: rgb(colors[21]),
            error_fg: rgb(colors[22]),
        };

        // bg, fg, h1, h2, h3, border on/off, selection bg/fg, active,
        // status bg/fg, code fg/bg, bullet, quote, callout bg, code border,
        // link, link selected, table border, muted, error
        match name {
            ThemeName::OceanDark => p([
                0x1b2b34, 0xc0c5ce, 0x6699cc, 0x99c794, 0xfac863, 0x6699cc, 0x4f5b66, 0x343d46,
                0xffffff, 0xf99157, 0x343d46, 0xc0c5ce, 0xec5f67, 0x22313b, 0x5fb3b3, 0x65737e,
                0x22313b, 0x4f5b66, 0x5fb3b3, 0x4f5b66, 0x4f5b66, 0x65737e, 0xec5f67,
            ]),
            ThemeName::Nord => p([
                0x2e3440, 0xd8dee9, 0x88c0d0, 0x81a1c1, 0xebcb8b, 0x88c0d0, 0x4c566a, 0x3b4252,
                0xeceff4, 0xd08770, 0x3b4252, 0xd8dee9, 0xbf616a, 0x3b4252, 0x8fbcbb, 0x4c566a,
                0x3b4252, 0x4c566a, 0x88c0d0, 0x434c5e, 0x4c566a, 0x616e88, 0xbf616a,
            ]),
            ThemeName::Dracula => p([
                0x282a36, 0xf8f8f2, 0xbd93f9, 0xff79c6, 0x8be9fd, 0xbd93f9, 0x44475a, 0x44475a,
                0xf8f8f2, 0xffb86c, 0x44475a, 0xf8f8f2, 0x50fa7b, 0x343746, 0xff79c6, 0x6272a4,
                0x343746, 0x6272a4, 0x8be9fd, 0x44475a, 0x6272a4, 0x6272a4, 0xff5555,
            ]),
            ThemeName::Gruvbox => p([
                0x282828, 0xebdbb2, 0xfb4934, 0xfabd2f, 0x83a598, 0xfe8019, 0x504945, 0x3c3836,
                0xfbf1c7, 0xfe8019, 0x3c3836, 0xebdbb2, 0xb8bb26, 0x32302f, 0xd3869b, 0x928374,
                0x32302f, 0x504945, 0x83a598, 0x504945, 0x665c54, 0x928374, 0xfb4934,
            ]),
            ThemeName::TokyoNight => p([
                0x1a1b26, 0xc0caf5, 0x7aa2f7, 0xbb9af7, 0x7dcfff, 0x7aa2f7, 0x3b4261, 0x283457,
                0xc0caf5, 0xff9e64, 0x16161e, 0xa9b1d6, 0x9ece6a, 0x24283b, 0x2ac3de, 0x565f89,
                0x24283b, 0x3b4261, 0x73daca, 0x3b4261, 0x3b4261, 0x565f89, 0xf7768e,
            ]),
            ThemeName::CatppuccinMocha => p([
                0x1e1e2e, 0xcdd6f4, 0x89b4fa, 0xcba6f7, 0xf9e2af, 0x89b4fa, 0x45475a, 0x313244,
                0xcdd6f4, 0xfab387, 0x181825, 0xbac2de, 0xa6e3a1, 0x313244, 0xf5c2e7, 0x6c7086,
                0x313244, 0x45475a, 0x89dceb, 0x45475a, 0x585b70, 0x7f849c, 0xf38ba8,
            ]),
            ThemeName::SolarizedLight => p([
                0xfdf6e3, 0x586e75, 0x268bd2, 0x859900, 0xb58900, 0x268bd2, 0x93a1a1, 0xeee8d5,
                0x073642, 0xcb4b16, 0xeee8d5, 0x586e75, 0xd33682, 0xeee8d5, 0x2aa198, 0x93a1a1,
                0xeee8d5, 0x93a1a1, 0x268bd2, 0xeee8d5, 0x93a1a1, 0x93a1a1, 0xdc322f,
            ]),
            ThemeName::CatppuccinLatte => p([
                0xeff1f5, 0x4c4f69, 0x1e66f5, 0x8839ef, 0xdf8e1d, 0x1e66f5, 0xacb0be, 0xccd0da,
                0x4c4f69, 0xfe640b, 0xe6e9ef, 0x5c5f77, 0x40a02b, 0xe6e9ef, 0xea76cb, 0x9ca0b0,
                0xe6e9ef, 0xacb0be, 0x209fb5, 0xccd0da, 0xacb0be, 0x8c8fa1, 0xd20f39,
            ]),
        }
    }

    pub fn appearance(&self) -> Appearance {
        self.name.appearance()
    }

    /// Apply user overrides from `[theme]`
    pub fn with_custom_colors(mut self, custom: &CustomThemeConfig) -> Self {
        let apply = |slot: &mut Color, value: &Option<crate::config::ColorValue>| {
            if let Some(color) = value.as_ref().and_then(|v| v.to_color()) {
                *slot = color;
            }
        };
        apply(&mut self.background, &custom.background);
        apply(&mut self.foreground, &custom.foreground);
        apply(&mut self.heading_1, &custom.heading_1);
        apply(&mut self.heading_2, &custom.heading_2);
        apply(&mut self.heading_3, &custom.heading_3);
        apply(&mut self.border_focused, &custom.border_focused);
        apply(&mut self.border_unfocused, &custom.border_unfocused);
        apply(&mut self.selection_bg, &custom.selection_bg);
        apply(&mut self.selection_fg, &custom.selection_fg);
        apply(&mut self.active_heading_fg, &custom.active_heading_fg);
        apply(&mut self.status_bar_bg, &custom.status_bar_bg);
        apply(&mut self.status_bar_fg, &custom.status_bar_fg);
        apply(&mut self.inline_code_fg, &custom.inline_code_fg);
        apply(&mut self.inline_code_bg, &custom.inline_code_bg);
        apply(&mut self.list_bullet, &custom.list_bullet);
        apply(&mut self.quote_border, &custom.quote_border);
        apply(&mut self.callout_bg, &custom.callout_bg);
        apply(&mut self.code_border, &custom.code_border);
        apply(&mut self.link_fg, &custom.link_fg);
        apply(&mut self.link_selected_bg, &custom.link_selected_bg);
        apply(&mut self.table_border, &custom.table_border);
        apply(&mut self.muted_fg, &custom.muted_fg);
        apply(&mut self.error_fg, &custom.error_fg);
        self
    }

    /// Downgrade every RGB color for terminals without true color
    pub fn with_color_mode(mut self, mode: ColorMode) -> Self {
        if mode == ColorMode::Rgb {
            return self;
        }
        for slot in [
            &mut self.background,
            &mut self.foreground,
            &mut self.heading_1,
            &mut self.heading_2,
            &mut self.heading_3,
            &mut self.border_focused,
            &mut self.border_unfocused,
            &mut self.selection_bg,
            &mut self.selection_fg,
            &mut self.active_heading_fg,
            &mut self.status_bar_bg,
            &mut self.status_bar_fg,
            &mut self.inline_code_fg,
            &mut self.inline_code_bg,
            &mut self.list_bullet,
            &mut self.quote_border,
            &mut self.callout_bg,
            &mut self.code_border,
            &mut self.link_fg,
            &mut self.link_selected_bg,
            &mut self.table_border,
            &mut self.muted_fg,
            &mut self.error_fg,
        ] {
            *slot = to_indexed(*slot);
        }
        self
    }

    pub fn heading_color(&self, level: usize) -> Color {
        match level {
            1 => self.heading_1,
            2 => self.heading_2,
            _ => self.heading_3,
        }
    }

    pub fn content_style(&self) -> Style {
        Style::default().fg(self.foreground).bg(self.background)
    }

    pub fn text_style(&self) -> Style {
        Style::default().fg(self.foreground)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted_fg)
    }

    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.border_focused)
        } else {
            Style::default().fg(self.border_unfocused)
        }
    }

    pub fn selection_style(&self) -> Style {
        Style::default()
            .bg(self.selection_bg)
            .fg(self.selection_fg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn status_bar_style(&self) -> Style {
        Style::default().bg(self.status_bar_bg).fg(self.status_bar_fg)
    }

    pub fn inline_code_style(&self) -> Style {
        Style::default().fg(self.inline_code_fg).bg(self.inline_code_bg)
    }

    pub fn link_style(&self) -> Style {
        Style::default()
            .fg(self.link_fg)
            .add_modifier(Modifier::UNDERLINED)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error_fg).add_modifier(Modifier::ITALIC)
    }

    /// Foreground for a block color name; `None` keeps the surrounding color.
    pub fn block_fg(&self, color: BlockColor) -> Option<Color> {
        let light = self.appearance() == Appearance::Light;
        let pick = |dark: u32, lite: u32| Some(rgb(if light { lite } else { dark }));
        match color {
            BlockColor::Default => None,
            BlockColor::Gray | BlockColor::GrayBackground => Some(self.muted_fg),
            BlockColor::Brown | BlockColor::BrownBackground => pick(0xb58863, 0x8a5a34),
            BlockColor::Orange | BlockColor::OrangeBackground => pick(0xf0a35e, 0xc2620e),
            BlockColor::Yellow | BlockColor::YellowBackground => pick(0xe9c46a, 0x9a7b00),
            BlockColor::Green | BlockColor::GreenBackground => pick(0x81c995, 0x2f7a3f),
            BlockColor::Blue | BlockColor::BlueBackground => pick(0x7fb0e8, 0x1f5fa8),
            BlockColor::Purple | BlockColor::PurpleBackground => pick(0xb79ae8, 0x6b3fb0),
            BlockColor::Pink | BlockColor::PinkBackground => pick(0xe88fc0, 0xa8326e),
            BlockColor::Red | BlockColor::RedBackground => pick(0xef7d7d, 0xb42323),
        }
    }

    /// Style for an annotated span color. Background colors tint the
    /// background instead of the text.
    pub fn block_color_style(&self, color: BlockColor) -> Style {
        match self.block_fg(color) {
            Some(c) if color.is_background() => Style::default().bg(self.tint(c)),
            Some(c) => Style::default().fg(c),
            None => Style::default(),
        }
    }

    /// Blend a color a quarter of the way from the background.
    fn tint(&self, color: Color) -> Color {
        match (color, self.background) {
            (Color::Rgb(r, g, b), Color::Rgb(br, bg, bb)) => {
                let mix = |c: u8, base: u8| ((c as u16 + 3 * base as u16) / 4) as u8;
                Color::Rgb(mix(r, br), mix(g, bg), mix(b, bb))
            }
            _ => self.selection_bg,
        }
    }
}

/// Nearest xterm-256 palette entry for an RGB color.
pub fn to_indexed(color: Color) -> Color {
    let Color::Rgb(r, g, b) = color else {
        return color;
    };
    let cube = |c: u8| -> u8 {
        if c < 48 {
            0
        } else if c < 115 {
            1
        } else {
            (c - 35) / 40
        }
    };
    let (cr, cg, cb) = (cube(r), cube(g), cube(b));
    let cube_index = 16 + 36 * cr + 6 * cg + cb;

    let level = |i: u8| if i == 0 { 0 } else { 55 + 40 * i as u16 };
    let cube_dist = dist((r, g, b), (level(cr), level(cg), level(cb)));

    let avg = (r as u16 + g as u16 + b as u16) / 3;
    let gray_step = if avg > 238 { 23 } else { avg.saturating_sub(3) / 10 };
    let gray_level = 8 + 10 * gray_step;
    let gray_dist = dist((r, g, b), (gray_level, gray_level, gray_level));

    if gray_dist < cube_dist {
        Color::Indexed(232 + gray_step as u8)
    } else {
        Color::Indexed(cube_index)
    }
}

fn dist((r, g, b): (u8, u8, u8), (r2, g2, b2): (u16, u16, u16)) -> u32 {
    let d = |a: u8, b: u16| (a as i32 - b as i32).pow(2) as u32;
    d(r, r2) + d(g, g2) + d(b, b2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColorValue;

    #[test]
    fn test_theme_names_parse() {
        for name in ThemeName::iter() {
            assert_eq!(name.to_string().parse::<ThemeName>().unwrap(), name);
        }
    }

    #[test]
    fn test_appearance() {
        assert_eq!(ThemeName::OceanDark.appearance(), Appearance::Dark);
        assert_eq!(ThemeName::CatppuccinLatte.appearance(), Appearance::Light);
        assert_eq!(
            Theme::from_name(ThemeName::SolarizedLight).appearance(),
            Appearance::Light
        );
    }

    #[test]
    fn test_next_wraps() {
        assert_eq!(ThemeName::OceanDark.next(), ThemeName::Nord);
        assert_eq!(ThemeName::CatppuccinLatte.next(), ThemeName::OceanDark);
    }

    #[test]
    fn test_custom_colors_override() {
        let custom = CustomThemeConfig {
            heading_1: Some(ColorValue::Named("red".into())),
            ..Default::default()
        };
        let theme = Theme::from_name(ThemeName::Nord).with_custom_colors(&custom);
        assert_eq!(theme.heading_1, Color::Red);
        assert_eq!(theme.heading_color(1), Color::Red);
    }

    #[test]
    fn test_indexed_mode() {
        let theme = Theme::from_name(ThemeName::Dracula).with_color_mode(ColorMode::Indexed256);
        assert!(matches!(theme.foreground, Color::Indexed(_)));
        assert_eq!(to_indexed(Color::Rgb(0, 0, 0)), Color::Indexed(16));
        assert_eq!(to_indexed(Color::Rgb(255, 255, 255)), Color::Indexed(231));
        assert_eq!(to_indexed(Color::Red), Color::Red);
    }

    #[test]
    fn test_background_colors_tint() {
        let theme = Theme::from_name(ThemeName::OceanDark);
        let style = theme.block_color_style(BlockColor::RedBackground);
        assert!(style.bg.is_some());
        assert!(style.fg.is_none());
        assert!(theme.block_color_style(BlockColor::Default).fg.is_none());
    }
}
