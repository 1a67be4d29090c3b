use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[cfg(feature = "unstable-dynamic")]
use clap_complete::engine::{ArgValueCompleter, CompletionCandidate, ValueCompleter};

#[derive(Parser, Debug)]
#[command(name = "blockview")]
#[command(version)]
#[command(about = "A terminal viewer for block-structured pages with a live outline")]
#[command(
    long_about = "blockview - View pages exported from a block-based editor in the terminal.\n\n\
    Launch without flags for the interactive viewer: page header, rendered blocks,\n\
    diagrams and an outline that follows your reading position. Use flags to list\n\
    headings or render a page to plain text for scripting.\n\n\
    Examples:\n  \
    blockview notes.blocks.json          # Interactive viewer\n  \
    blockview -l notes.blocks.json       # List all headings\n  \
    blockview --render notes.blocks.json # Print the rendered page\n  \
    blockview --dir export/ 4f2a9c       # Open page 4f2a9c from an export directory\n  \
    blockview --relay-url http://localhost:8787 4f2a9c"
)]
pub struct Cli {
    /// Page to open: a `<id>.blocks.json` file, or a page id
    ///
    /// A path to an existing file is opened from its directory. Anything else
    /// is treated as a page id and resolved against --dir, --relay-url or the
    /// `[source]` section of the config file, in that order.
    #[cfg_attr(feature = "unstable-dynamic", arg(add = blocks_file_completer()))]
    pub source: String,

    /// List all headings in the page (non-interactive)
    ///
    /// Displays headings with their level indicators (# for h1, ## for h2, ### for h3).
    /// Combine with --filter or --level to narrow results.
    #[arg(short = 'l', long = "list")]
    pub list: bool,

    /// Render the page as plain text (non-interactive)
    ///
    /// Diagrams are compiled and local images probed before printing, so the
    /// output matches the settled viewer.
    #[arg(long = "render")]
    pub render: bool,

    /// Width used by --render
    #[arg(long = "width", value_name = "COLUMNS", default_value_t = 80)]
    pub width: usize,

    /// Count headings by level
    #[arg(long = "count")]
    pub count: bool,

    /// Output format for --list and --count
    ///
    ///   plain - Human-readable text (default)
    ///   json  - JSON for scripting
    #[arg(short = 'o', long = "output", default_value = "plain")]
    pub output: OutputFormat,

    /// Show only headings at a specific level (1-3)
    #[arg(short = 'L', long = "level", value_name = "LEVEL")]
    pub level: Option<usize>,

    /// Filter headings by text pattern (case-insensitive)
    ///
    /// Example: --filter "install" matches "Installation" and "Installing"
    #[arg(long = "filter", value_name = "PATTERN")]
    pub filter: Option<String>,

    /// Set theme for TUI mode
    ///
    /// Overrides the saved theme. Available themes:
    /// OceanDark, Nord, Dracula, Gruvbox, TokyoNight, CatppuccinMocha,
    /// SolarizedLight, CatppuccinLatte
    #[arg(long = "theme", value_name = "THEME")]
    pub theme: Option<String>,

    /// Force color mode (auto, rgb, 256)
    ///
    ///   auto - Detect terminal capabilities (default)
    ///   rgb  - Force true color (16M colors)
    ///   256  - Force 256-color palette
    #[arg(long = "color-mode", value_name = "MODE")]
    pub color_mode: Option<ColorModeArg>,

    /// Hide images
    ///
    /// Image blocks are skipped entirely. Overrides the config file setting.
    #[arg(long = "no-images")]
    pub no_images: bool,

    /// Write logs to this file instead of the default cache location
    ///
    /// The filter is read from BLOCKVIEW_LOG (e.g. BLOCKVIEW_LOG=blockview=debug).
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Directory of exported pages (`<id>.blocks.json`, `<id>.page.json`)
    #[arg(long = "dir", value_name = "DIR", conflicts_with = "relay_url")]
    pub dir: Option<PathBuf>,

    /// Base URL of a relay speaking the upstream block API
    ///
    /// The bearer token is read from the environment variable named by
    /// `[source] token_env` (default BLOCKVIEW_TOKEN).
    #[arg(long = "relay-url", value_name = "URL")]
    pub relay_url: Option<String>,
}

impl Cli {
    /// True when no non-interactive mode was requested.
    pub fn is_interactive(&self) -> bool {
        !self.list && !self.render && !self.count
    }
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorModeArg {
    /// Automatically detect terminal capabilities
    Auto,
    /// Force RGB/true color mode
    Rgb,
    /// Force 256-color mode
    #[value(name = "256")]
    Color256,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Plain,
    /// JSON output
    Json,
}

#[cfg(feature = "unstable-dynamic")]
fn blocks_file_completer() -> ArgValueCompleter {
    use std::ffi::OsStr;
    use std::path::Path;

    struct BlocksFileCompleter;

    impl ValueCompleter for BlocksFileCompleter {
        fn complete(&self, current: &OsStr) -> Vec<CompletionCandidate> {
            let input = current.to_string_lossy();
            let input_path = Path::new(input.as_ref());

            let (search_dir, prefix) = if input.is_empty() {
                (Path::new("."), String::new())
            } else if input.ends_with('/') || input.ends_with('\\') {
                (input_path, String::new())
            } else {
                // parent() is Some("") for bare file names
                let parent = input_path.parent().unwrap_or(Path::new("."));
                let dir = if parent.as_os_str().is_empty() {
                    Path::new(".")
                } else {
                    parent
                };
                let prefix = input_path
                    .file_name()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_default();
                (dir, prefix)
            };

            let Ok(entries) = std::fs::read_dir(search_dir) else {
                return Vec::new();
            };

            let mut candidates: Vec<CompletionCandidate> = entries
                .flatten()
                .filter_map(|entry| {
                    let name = entry.file_name().to_string_lossy().to_string();
                    if !name.starts_with(&prefix) || name.starts_with('.') {
                        return None;
                    }
                    let is_dir = entry.file_type().ok()?.is_dir();
                    if !is_dir && !name.ends_with(".blocks.json") {
                        return None;
                    }

                    let path = if search_dir == Path::new(".") {
                        name
                    } else {
                        search_dir.join(&name).to_string_lossy().to_string()
                    };
                    Some(if is_dir {
                        CompletionCandidate::new(format!("{}/", path))
                    } else {
                        CompletionCandidate::new(path)
                    })
                })
                .collect();

            candidates.sort_by(|a, b| a.get_value().cmp(b.get_value()));
            candidates
        }
    }

    ArgValueCompleter::new(BlocksFileCompleter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_list_mode() {
        let cli = Cli::try_parse_from([
            "blockview",
            "-l",
            "-L",
            "2",
            "-o",
            "json",
            "page.blocks.json",
        ])
        .unwrap();
        assert!(cli.list);
        assert_eq!(cli.level, Some(2));
        assert!(matches!(cli.output, OutputFormat::Json));
        assert!(!cli.is_interactive());
    }

    #[test]
    fn test_dir_conflicts_with_relay() {
        let result = Cli::try_parse_from([
            "blockview",
            "--dir",
            "export",
            "--relay-url",
            "http://localhost",
            "abc",
        ]);
        assert!(result.is_err());
    }
}
