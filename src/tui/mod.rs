mod app;
mod help_text;
mod media;
mod syntax;
pub mod terminal_compat;
pub mod theme;
mod ui;
mod watcher;

pub use app::{App, AppMode, AppOptions, Focus, internal_page_id};
pub use terminal_compat::{ColorMode, TerminalCapabilities};
pub use theme::ThemeName;

use crate::config::Config;
use crate::diagram::DiagramStore;
use crate::page::Page;
use color_eyre::Result;
use crossterm::event::{self, Event, KeyEventKind};
use media::MediaProbe;
use ratatui::DefaultTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;
use syntax::SyntaxHighlighter;
use theme::Theme;
use tracing::warn;
use ui::paint::{PaintContext, paint_page};

/// How long `render_plain` waits for diagrams before giving up on them.
const PLAIN_DIAGRAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Run the TUI application.
///
/// Draws, applies finished background work and dispatches key presses until
/// the user quits. Pages read from disk are reloaded when their file changes.
pub fn run(terminal: &mut DefaultTerminal, app: App) -> Result<()> {
    let mut app = app;

    // Create file watcher for live reload
    let mut file_watcher = watcher::FileWatcher::new().ok();

    loop {
        terminal.draw(|frame| ui::render(frame, &mut app))?;

        if app.should_quit {
            return Ok(());
        }

        app.tick();

        // Follow navigation between pages
        if let Some(ref mut watcher) = file_watcher {
            match app.source_path() {
                Some(path) => {
                    if let Err(err) = watcher.watch(&path) {
                        warn!(path = %path.display(), error = %err, "cannot watch page source");
                    }
                }
                None => watcher.unwatch(),
            }
        }

        // Poll for events with timeout so background results and status
        // expiry show up without a key press
        if !event::poll(Duration::from_millis(100))? {
            if let Some(ref mut watcher) = file_watcher
                && watcher.check_for_changes()
            {
                app.reload();
                app.set_status("↻ Page reloaded (external change)");
            }
            continue;
        }

        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key(key);
        }
    }
}

/// Paint `page` once without a terminal and return its rows as plain text.
///
/// Every diagram is compiled and every image probed up front, so the output
/// matches what the viewer shows once the page has settled.
pub fn render_plain(
    page: &Page,
    config: &Config,
    width: usize,
    show_images: bool,
    base_dir: Option<&Path>,
) -> Vec<String> {
    let theme = Theme::from_name(config.theme_name());
    let highlighter = SyntaxHighlighter::new();
    let mut diagrams = DiagramStore::new();
    let mut media = MediaProbe::new(base_dir.map(PathBuf::from));

    let first = {
        let ctx = PaintContext {
            theme: &theme,
            highlighter: &highlighter,
            diagrams: &diagrams,
            media: &media,
            width,
            show_images,
            selected_link: None,
        };
        paint_page(page, &ctx)
    };

    if first.diagrams.is_empty() && first.images.is_empty() {
        return first.to_plain();
    }

    for slot in &first.diagrams {
        diagrams.request(&slot.key, &slot.source, theme.appearance());
    }
    for slot in &first.images {
        media.probe(&slot.url);
    }
    diagrams.wait_all(PLAIN_DIAGRAM_TIMEOUT);

    let ctx = PaintContext {
        theme: &theme,
        highlighter: &highlighter,
        diagrams: &diagrams,
        media: &media,
        width,
        show_images,
        selected_link: None,
    };
    paint_page(page, &ctx).to_plain()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Block, BlockKind, CodeBlock, HeadingLevel, PageMetadata, RichText, TextBlock,
    };

    fn text(s: &str) -> TextBlock {
        TextBlock {
            rich_text: vec![RichText::plain(s)],
            ..Default::default()
        }
    }

    #[test]
    fn test_render_plain_settles_diagrams() {
        let blocks = vec![
            Block::new("h", BlockKind::Heading(HeadingLevel::H1, text("Flow"))),
            Block::new(
                "d",
                BlockKind::Code(CodeBlock {
                    rich_text: vec![RichText::plain("graph TD\nA --> B")],
                    language: "mermaid".to_string(),
                    caption: Vec::new(),
                }),
            ),
        ];
        let page = Page::new("p", blocks, PageMetadata::default());
        let rows = render_plain(&page, &Config::default(), 60, true, None);

        assert!(rows.iter().any(|r| r.contains("Flow")));
        assert!(rows.iter().any(|r| r.contains("│ A │")));
        assert!(!rows.iter().any(|r| r.contains("rendering diagram")));
    }
}
