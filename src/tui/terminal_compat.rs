use supports_color::{Stream, on};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Rgb,        // True color (16M colors)
    Indexed256, // 256-color palette
}

impl ColorMode {
    /// Parse the `[terminal] color_mode` setting. `auto` (or anything
    /// unrecognized) yields `None` so detection decides.
    pub fn from_setting(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "rgb" | "truecolor" | "24bit" => Some(ColorMode::Rgb),
            "256" | "indexed" | "indexed256" => Some(ColorMode::Indexed256),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct TerminalCapabilities {
    pub supports_rgb: bool,
    pub is_terminal_app: bool,
    pub recommended_color_mode: ColorMode,
}

impl TerminalCapabilities {
    /// Detect terminal capabilities and recommend appropriate color mode
    pub fn detect() -> Self {
        let is_terminal_app = std::env::var("TERM_PROGRAM")
            .map(|v| v == "Apple_Terminal")
            .unwrap_or(false);

        let supports_rgb = on(Stream::Stdout)
            .map(|level| level.has_16m)
            .unwrap_or(false);

        Self {
            supports_rgb,
            is_terminal_app,
            recommended_color_mode: Self::recommend(supports_rgb, is_terminal_app),
        }
    }

    // Terminal.app advertises RGB it does not render well.
    fn recommend(supports_rgb: bool, is_terminal_app: bool) -> ColorMode {
        if supports_rgb && !is_terminal_app {
            ColorMode::Rgb
        } else {
            ColorMode::Indexed256
        }
    }

    /// Color mode for a config setting, falling back to detection.
    pub fn resolve(&self, setting: &str) -> ColorMode {
        ColorMode::from_setting(setting).unwrap_or(self.recommended_color_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_detection() {
        // Must not panic without a terminal.
        let caps = TerminalCapabilities::detect();
        assert_eq!(caps.resolve("rgb"), ColorMode::Rgb);
        assert_eq!(caps.resolve("auto"), caps.recommended_color_mode);
    }

    #[test]
    fn test_setting_parse() {
        assert_eq!(ColorMode::from_setting("256"), Some(ColorMode::Indexed256));
        assert_eq!(ColorMode::from_setting(" RGB "), Some(ColorMode::Rgb));
        assert_eq!(ColorMode::from_setting("auto"), None);
    }

    #[test]
    fn test_terminal_app_prefers_indexed() {
        assert_eq!(TerminalCapabilities::recommend(true, true), ColorMode::Indexed256);
        assert_eq!(TerminalCapabilities::recommend(true, false), ColorMode::Rgb);
        assert_eq!(TerminalCapabilities::recommend(false, false), ColorMode::Indexed256);
    }
}
