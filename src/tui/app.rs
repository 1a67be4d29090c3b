use crate::client::ContentClient;
use crate::config::Config;
use crate::diagram::DiagramStore;
use crate::keybindings::{Action, KeybindingMode, Keybindings};
use crate::navigator::Navigator;
use crate::page::{Page, PageLoader};
use crate::render::HeadingEntry;
use crate::tui::media::MediaProbe;
use crate::tui::syntax::SyntaxHighlighter;
use crate::tui::terminal_compat::ColorMode;
use crate::tui::theme::{Theme, ThemeName};
use crate::tui::ui::paint::{PaintContext, Painted, paint_page};
use crossterm::event::KeyEvent;
use ratatui::widgets::ListState;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// How long a status message stays in the status bar.
const STATUS_TIMEOUT: Duration = Duration::from_secs(4);

/// Rows of look-ahead when deciding which lazy elements are visible.
const LAZY_MARGIN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Focus {
    Outline,
    Content,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppMode {
    Normal,
    LinkFollow,
    Help,
}

impl AppMode {
    fn keybinding_mode(self) -> KeybindingMode {
        match self {
            AppMode::Normal => KeybindingMode::Normal,
            AppMode::LinkFollow => KeybindingMode::LinkFollow,
            AppMode::Help => KeybindingMode::Help,
        }
    }
}

/// Settings decided at startup rather than read from the config file.
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub color_mode: ColorMode,
    pub show_images: bool,
    /// Where theme and outline width changes are saved; `None` disables saving.
    pub config_path: Option<PathBuf>,
}

/// Saved position for back navigation
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub id: String,
    pub content_scroll: usize,
}

pub struct App {
    pub config: Config,
    pub theme: Theme,
    pub keybindings: Keybindings,
    pub highlighter: SyntaxHighlighter,
    pub loader: PageLoader,
    pub diagrams: DiagramStore,
    pub media: MediaProbe,
    pub navigator: Navigator,

    pub mode: AppMode,
    pub focus: Focus,
    pub outline_state: ListState,
    pub show_outline: bool,
    pub outline_width: u16, // Percentage: 20, 30, or 40
    pub content_scroll: usize,
    pub content_width: usize,
    pub content_height: usize,
    pub help_scroll: u16,
    pub selected_link: Option<usize>,
    pub history: Vec<HistoryEntry>,
    pub status_message: Option<String>,
    pub should_quit: bool,

    painted: Option<Painted>,
    painted_for: Option<(usize, usize)>,
    shown_id: Option<String>,
    needs_paint: bool,
    pending_scroll: Option<usize>,
    status_set_at: Option<Instant>,
    options: AppOptions,
}

impl App {
    /// Create the app and start loading `page_id`.
    pub fn new(
        config: Config,
        client: Arc<dyn ContentClient>,
        page_id: &str,
        options: AppOptions,
    ) -> Self {
        let theme = Self::build_theme(&config, config.theme_name(), options.color_mode);
        let base_dir = client
            .source_path(page_id)
            .and_then(|p| p.parent().map(PathBuf::from));

        let mut loader = PageLoader::new(client);
        loader.start(page_id);

        Self {
            keybindings: config.keybindings(),
            highlighter: SyntaxHighlighter::new(),
            loader,
            diagrams: DiagramStore::new(),
            media: MediaProbe::new(base_dir),
            navigator: Navigator::new(config.navigation),
            mode: AppMode::Normal,
            focus: Focus::Outline,
            outline_state: ListState::default(),
            show_outline: true,
            outline_width: config.ui.outline_width,
            content_scroll: 0,
            content_width: 0,
            content_height: 0,
            help_scroll: 0,
            selected_link: None,
            history: Vec::new(),
            status_message: None,
            should_quit: false,
            painted: None,
            painted_for: None,
            shown_id: None,
            needs_paint: true,
            pending_scroll: None,
            status_set_at: None,
            options,
            theme,
            config,
        }
    }

    fn build_theme(config: &Config, name: ThemeName, color_mode: ColorMode) -> Theme {
        Theme::from_name(name)
            .with_custom_colors(&config.theme)
            .with_color_mode(color_mode)
    }

    pub fn page(&self) -> Option<&Arc<Page>> {
        self.loader.page()
    }

    pub fn headings(&self) -> &[HeadingEntry] {
        self.page().map(|p| p.headings.as_slice()).unwrap_or(&[])
    }

    pub fn painted(&self) -> Option<&Painted> {
        self.painted.as_ref()
    }

    pub fn max_scroll(&self) -> usize {
        self.painted
            .as_ref()
            .map(|p| p.height().saturating_sub(self.content_height))
            .unwrap_or(0)
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_set_at = Some(Instant::now());
    }

    pub fn clear_expired_status_message(&mut self) {
        if self
            .status_set_at
            .is_some_and(|at| at.elapsed() >= STATUS_TIMEOUT)
        {
            self.status_message = None;
            self.status_set_at = None;
        }
    }

    /// File the current page was read from, if the source has one.
    pub fn source_path(&self) -> Option<PathBuf> {
        let id = self.loader.current_id()?;
        self.loader.client().source_path(id)
    }

    /// Apply finished background work. Returns true if anything changed.
    pub fn tick(&mut self) -> bool {
        let mut changed = false;
        if let Some(page) = self.loader.poll() {
            self.on_page_loaded(&page);
            changed = true;
        }
        if self.diagrams.poll() {
            self.needs_paint = true;
            changed = true;
        }
        changed
    }

    fn on_page_loaded(&mut self, page: &Arc<Page>) {
        if self.shown_id.as_deref() != Some(page.id.as_str()) {
            self.diagrams.clear();
            self.shown_id = Some(page.id.clone());
        }
        self.navigator.detach();
        self.content_scroll = self.pending_scroll.take().unwrap_or(0);
        self.outline_state
            .select((!page.headings.is_empty()).then_some(0));
        self.selected_link = None;
        if self.mode == AppMode::LinkFollow {
            self.mode = AppMode::Normal;
        }
        let base_dir = self
            .loader
            .client()
            .source_path(&page.id)
            .and_then(|p| p.parent().map(PathBuf::from));
        self.media.set_base_dir(base_dir);
        self.needs_paint = true;
        info!(id = %page.id, headings = page.headings.len(), "page shown");
    }

    /// Lay out the content pane for a `width` x `height` viewport: paint if
    /// needed, start lazy work for what is visible and update scroll-spy.
    pub fn prepare_frame(&mut self, width: usize, height: usize) {
        self.content_width = width;
        self.content_height = height;

        let Some(page) = self.loader.page().cloned() else {
            self.painted = None;
            self.painted_for = None;
            self.navigator.detach();
            return;
        };

        let key = (Arc::as_ptr(&page) as usize, width);
        if self.needs_paint || self.painted_for != Some(key) {
            self.repaint(&page, key);
        }

        if self.start_visible_work() {
            self.repaint(&page, key);
        }

        self.content_scroll = self.content_scroll.min(self.max_scroll());
        if let Some(painted) = &self.painted {
            self.navigator.attach(painted.anchors.clone());
        }
        if self.navigator.observe(self.content_scroll, height) {
            self.sync_outline_to_active();
        }
    }

    fn repaint(&mut self, page: &Page, key: (usize, usize)) {
        let ctx = PaintContext {
            theme: &self.theme,
            highlighter: &self.highlighter,
            diagrams: &self.diagrams,
            media: &self.media,
            width: key.1,
            show_images: self.options.show_images,
            selected_link: self
                .selected_link
                .filter(|_| self.mode == AppMode::LinkFollow),
        };
        self.painted = Some(paint_page(page, &ctx));
        self.painted_for = Some(key);
        self.needs_paint = false;
    }

    /// Request diagrams and probe images near the viewport. Returns true if
    /// a probe finished and the page must be repainted.
    fn start_visible_work(&mut self) -> bool {
        let Some(painted) = &self.painted else {
            return false;
        };
        let start = self.content_scroll.saturating_sub(LAZY_MARGIN);
        let end = self.content_scroll + self.content_height + LAZY_MARGIN;
        let visible = start..end;

        let appearance = self.theme.appearance();
        for slot in painted.diagrams.iter().filter(|s| visible.contains(&s.row)) {
            self.diagrams.request(&slot.key, &slot.source, appearance);
        }

        let before = self.media.revision();
        for slot in painted.images.iter().filter(|s| visible.contains(&s.row)) {
            self.media.probe(&slot.url);
        }
        self.media.revision() != before
    }

    fn sync_outline_to_active(&mut self) {
        let Some(active) = self.navigator.active() else {
            return;
        };
        if let Some(index) = self.headings().iter().position(|h| h.anchor == active) {
            self.outline_state.select(Some(index));
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let mode = self.mode.keybinding_mode();
        if let Some(action) = self.keybindings.dispatch(mode, key) {
            self.handle_action(action);
        }
    }

    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Next => self.next(),
            Action::Previous => self.previous(),
            Action::First => self.first(),
            Action::Last => self.last(),
            Action::PageDown => self.scroll_by(self.page_step() as isize),
            Action::PageUp => self.scroll_by(-(self.page_step() as isize)),
            Action::JumpToHeading => self.jump_to_selected_heading(),
            Action::ToggleFocus => self.toggle_focus(),
            Action::ToggleOutline => self.toggle_outline(),
            Action::OutlineWidthIncrease => self.cycle_outline_width(true),
            Action::OutlineWidthDecrease => self.cycle_outline_width(false),
            Action::EnterLinkFollowMode => self.enter_link_follow_mode(),
            Action::ExitMode => self.exit_mode(),
            Action::NextLink => self.cycle_link(true),
            Action::PreviousLink => self.cycle_link(false),
            Action::FollowLink => self.follow_selected_link(),
            Action::GoBack => self.go_back(),
            Action::Reload => self.reload(),
            Action::ToggleHelp => self.toggle_help(),
            Action::CycleTheme => self.cycle_theme(),
            Action::HelpScrollDown => self.help_scroll = self.help_scroll.saturating_add(1),
            Action::HelpScrollUp => self.help_scroll = self.help_scroll.saturating_sub(1),
            Action::Quit => self.should_quit = true,
        }
    }

    fn page_step(&self) -> usize {
        (self.content_height / 2).max(1)
    }

    pub fn scroll_by(&mut self, delta: isize) {
        let target = self.content_scroll.saturating_add_signed(delta);
        self.content_scroll = target.min(self.max_scroll());
    }

    pub fn next(&mut self) {
        match self.focus {
            Focus::Outline => {
                let len = self.headings().len();
                if len > 0 {
                    let i = self.outline_state.selected().map_or(0, |i| (i + 1).min(len - 1));
                    self.outline_state.select(Some(i));
                }
            }
            Focus::Content => self.scroll_by(1),
        }
    }

    pub fn previous(&mut self) {
        match self.focus {
            Focus::Outline => {
                if !self.headings().is_empty() {
                    let i = self.outline_state.selected().map_or(0, |i| i.saturating_sub(1));
                    self.outline_state.select(Some(i));
                }
            }
            Focus::Content => self.scroll_by(-1),
        }
    }

    pub fn first(&mut self) {
        match self.focus {
            Focus::Outline if !self.headings().is_empty() => self.outline_state.select(Some(0)),
            Focus::Outline => {}
            Focus::Content => self.content_scroll = 0,
        }
    }

    pub fn last(&mut self) {
        match self.focus {
            Focus::Outline => {
                let len = self.headings().len();
                if len > 0 {
                    self.outline_state.select(Some(len - 1));
                }
            }
            Focus::Content => self.content_scroll = self.max_scroll(),
        }
    }

    /// Scroll the selected outline entry into view and make it active.
    pub fn jump_to_selected_heading(&mut self) {
        let Some(anchor) = self
            .outline_state
            .selected()
            .and_then(|i| self.headings().get(i))
            .map(|h| h.anchor.clone())
        else {
            return;
        };
        let max_scroll = self.max_scroll();
        if let Some(target) = self
            .navigator
            .scroll_to(&anchor, self.content_height, max_scroll)
        {
            self.content_scroll = target;
        }
    }

    pub fn toggle_focus(&mut self) {
        if self.show_outline {
            self.focus = match self.focus {
                Focus::Outline => Focus::Content,
                Focus::Content => Focus::Outline,
            };
        }
    }

    pub fn toggle_outline(&mut self) {
        self.show_outline = !self.show_outline;
        self.focus = if self.show_outline {
            Focus::Outline
        } else {
            Focus::Content
        };
    }

    pub fn cycle_outline_width(&mut self, increase: bool) {
        self.outline_width = match (increase, self.outline_width) {
            (true, w) if w < 30 => 30,
            (true, _) => 40,
            (false, w) if w > 30 => 30,
            (false, _) => 20,
        };
        self.config.set_outline_width(self.outline_width);
        self.save_config();
    }

    pub fn cycle_theme(&mut self) {
        let name = self.theme.name.next();
        self.theme = Self::build_theme(&self.config, name, self.options.color_mode);
        self.config.set_theme(name);
        self.save_config();
        self.needs_paint = true;
        self.set_status(format!("Theme: {}", name));
    }

    fn save_config(&self) {
        if let Some(path) = &self.options.config_path
            && let Err(err) = self.config.save_to(path)
        {
            warn!(path = %path.display(), error = %err, "could not save config");
        }
    }

    pub fn toggle_help(&mut self) {
        self.mode = if self.mode == AppMode::Help {
            AppMode::Normal
        } else {
            self.help_scroll = 0;
            AppMode::Help
        };
        self.keybindings.reset_sequences();
    }

    pub fn exit_mode(&mut self) {
        if self.mode == AppMode::LinkFollow {
            self.selected_link = None;
            self.needs_paint = true;
        }
        self.mode = AppMode::Normal;
        self.keybindings.reset_sequences();
    }

    pub fn enter_link_follow_mode(&mut self) {
        let Some(painted) = &self.painted else {
            return;
        };
        if painted.links.is_empty() {
            self.set_status("No links on this page");
            return;
        }
        // Start from the first link on screen.
        let first_visible = painted
            .links
            .iter()
            .position(|l| l.row >= self.content_scroll)
            .unwrap_or(0);
        self.selected_link = Some(first_visible);
        self.mode = AppMode::LinkFollow;
        self.needs_paint = true;
        self.keybindings.reset_sequences();
        self.reveal_selected_link();
    }

    pub fn cycle_link(&mut self, forward: bool) {
        let count = self.painted.as_ref().map_or(0, |p| p.links.len());
        if self.mode != AppMode::LinkFollow || count == 0 {
            return;
        }
        self.selected_link = Some(match (self.selected_link, forward) {
            (Some(i), true) => (i + 1) % count,
            (Some(i), false) => (i + count - 1) % count,
            (None, _) => 0,
        });
        self.needs_paint = true;
        self.reveal_selected_link();
    }

    fn reveal_selected_link(&mut self) {
        let Some(row) = self
            .selected_link
            .and_then(|i| self.painted.as_ref()?.links.get(i))
            .map(|l| l.row)
        else {
            return;
        };
        let height = self.content_height.max(1);
        if row < self.content_scroll {
            self.content_scroll = row;
        } else if row >= self.content_scroll + height {
            self.content_scroll = (row + 1 - height).min(self.max_scroll());
        }
    }

    pub fn follow_selected_link(&mut self) {
        let Some(href) = self
            .selected_link
            .and_then(|i| self.painted.as_ref()?.links.get(i))
            .map(|l| l.href.clone())
        else {
            return;
        };
        self.exit_mode();

        if let Some(id) = internal_page_id(&href) {
            self.open_page(id);
            return;
        }
        match open::that(&href) {
            Ok(()) => self.set_status(format!("✓ Opened {} in browser", href)),
            Err(err) => {
                warn!(href = %href, error = %err, "could not open link");
                self.set_status(format!("✗ Failed to open {}", href));
            }
        }
    }

    /// Show another page, remembering where we were.
    pub fn open_page(&mut self, id: &str) {
        if let Some(current) = self.loader.current_id() {
            self.history.push(HistoryEntry {
                id: current.to_string(),
                content_scroll: self.content_scroll,
            });
        }
        self.pending_scroll = None;
        self.loader.start(id);
        self.set_status(format!("Loading {}…", id));
    }

    pub fn go_back(&mut self) {
        let Some(entry) = self.history.pop() else {
            self.set_status("No previous page");
            return;
        };
        self.pending_scroll = Some(entry.content_scroll);
        self.loader.start(&entry.id);
    }

    /// Load the current page again, keeping the scroll position.
    pub fn reload(&mut self) {
        let Some(id) = self.loader.current_id().map(str::to_string) else {
            return;
        };
        self.pending_scroll = Some(self.content_scroll);
        self.loader.start(&id);
    }
}

/// Page id of an in-workspace link such as `/3f2a...` or `/3f2a...#block`.
pub fn internal_page_id(href: &str) -> Option<&str> {
    let path = href.strip_prefix('/')?;
    let id = path.split(['#', '?']).next()?;
    (!id.is_empty() && !id.contains('/')).then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::DirectoryClient;
    use serde_json::json;
    use tempfile::TempDir;

    fn heading(id: &str, level: u8, text: &str) -> serde_json::Value {
        let kind = format!("heading_{}", level);
        json!({
            "id": id,
            "type": kind,
            kind: { "rich_text": [{ "plain_text": text }] }
        })
    }

    fn paragraph(id: &str, text: &str) -> serde_json::Value {
        json!({
            "id": id,
            "type": "paragraph",
            "paragraph": { "rich_text": [{ "plain_text": text }] }
        })
    }

    fn link_paragraph(id: &str, text: &str, href: &str) -> serde_json::Value {
        json!({
            "id": id,
            "type": "paragraph",
            "paragraph": { "rich_text": [{ "plain_text": text, "href": href }] }
        })
    }

    /// A page with h1 near the top and h2 far enough down to need scrolling.
    fn write_pages(dir: &TempDir) {
        let mut blocks = vec![heading("h1", 1, "Intro")];
        for i in 0..30 {
            blocks.push(paragraph(&format!("p{}", i), "filler"));
        }
        blocks.push(heading("h2", 2, "Details"));
        for i in 30..60 {
            blocks.push(paragraph(&format!("p{}", i), "filler"));
        }
        blocks.push(link_paragraph("l1", "other page", "/other"));
        std::fs::write(
            dir.path().join("main.blocks.json"),
            serde_json::to_string(&blocks).unwrap(),
        )
        .unwrap();

        let other = vec![heading("o1", 1, "Other")];
        std::fs::write(
            dir.path().join("other.blocks.json"),
            serde_json::to_string(&other).unwrap(),
        )
        .unwrap();
    }

    fn app(dir: &TempDir) -> App {
        let client = Arc::new(DirectoryClient::new(dir.path()));
        let options = AppOptions {
            color_mode: ColorMode::Rgb,
            show_images: true,
            config_path: None,
        };
        let mut app = App::new(Config::default(), client, "main", options);
        wait_for_page(&mut app);
        app
    }

    /// Block on the loader, then apply the page the way `tick` would.
    fn wait_for_page(app: &mut App) {
        let page = app.loader.wait(Duration::from_secs(5)).unwrap();
        app.on_page_loaded(&page);
    }

    #[test]
    fn test_internal_page_id() {
        assert_eq!(internal_page_id("/abc123"), Some("abc123"));
        assert_eq!(internal_page_id("/abc123#block"), Some("abc123"));
        assert_eq!(internal_page_id("/a/b"), None);
        assert_eq!(internal_page_id("https://example.com"), None);
        assert_eq!(internal_page_id("/"), None);
    }

    #[test]
    fn test_outline_click_scrolls_and_activates() {
        let dir = TempDir::new().unwrap();
        write_pages(&dir);
        let mut app = app(&dir);
        app.prepare_frame(60, 20);
        assert_eq!(app.headings().len(), 2);

        let h2_row = app.navigator.row("h2").unwrap();
        app.outline_state.select(Some(1));
        app.handle_action(Action::JumpToHeading);
        assert_eq!(app.content_scroll, h2_row - 2);
        assert_eq!(app.navigator.active(), Some("h2"));

        // The next frame must not hand the highlight back to anything else.
        app.prepare_frame(60, 20);
        assert_eq!(app.navigator.active(), Some("h2"));
        assert_eq!(app.outline_state.selected(), Some(1));
    }

    #[test]
    fn test_scrolling_activates_heading_in_band() {
        let dir = TempDir::new().unwrap();
        write_pages(&dir);
        let mut app = app(&dir);
        app.prepare_frame(60, 20);
        app.focus = Focus::Content;

        let h2_row = app.navigator.row("h2").unwrap();
        // Put h2 one row below the top edge: inside the band.
        app.content_scroll = h2_row - 1;
        app.prepare_frame(60, 20);
        assert_eq!(app.navigator.active(), Some("h2"));
        assert_eq!(app.outline_state.selected(), Some(1));
    }

    #[test]
    fn test_scroll_is_clamped() {
        let dir = TempDir::new().unwrap();
        write_pages(&dir);
        let mut app = app(&dir);
        app.prepare_frame(60, 20);
        app.focus = Focus::Content;
        app.handle_action(Action::Last);
        assert_eq!(app.content_scroll, app.max_scroll());
        app.handle_action(Action::Next);
        assert_eq!(app.content_scroll, app.max_scroll());
        app.handle_action(Action::First);
        assert_eq!(app.content_scroll, 0);
    }

    #[test]
    fn test_follow_internal_link_and_back() {
        let dir = TempDir::new().unwrap();
        write_pages(&dir);
        let mut app = app(&dir);
        app.prepare_frame(60, 20);

        app.handle_action(Action::EnterLinkFollowMode);
        assert_eq!(app.mode, AppMode::LinkFollow);
        assert_eq!(app.selected_link, Some(0));
        let scroll_before = app.content_scroll;

        app.handle_action(Action::FollowLink);
        assert_eq!(app.mode, AppMode::Normal);
        assert!(app.loader.is_loading());
        wait_for_page(&mut app);
        assert_eq!(app.page().map(|p| p.id.as_str()), Some("other"));
        assert_eq!(app.content_scroll, 0);

        app.handle_action(Action::GoBack);
        wait_for_page(&mut app);
        assert_eq!(app.page().map(|p| p.id.as_str()), Some("main"));
        assert_eq!(app.content_scroll, scroll_before);
        assert!(app.history.is_empty());
    }

    #[test]
    fn test_loading_page_has_no_paint() {
        let dir = TempDir::new().unwrap();
        write_pages(&dir);
        let mut app = app(&dir);
        app.prepare_frame(60, 20);
        assert!(app.painted().is_some());

        app.open_page("other");
        app.prepare_frame(60, 20);
        assert!(app.painted().is_none());
        assert!(app.navigator.watches().is_none());
    }

    #[test]
    fn test_outline_width_and_theme_cycle() {
        let dir = TempDir::new().unwrap();
        write_pages(&dir);
        let mut app = app(&dir);
        app.handle_action(Action::OutlineWidthIncrease);
        assert_eq!(app.outline_width, 40);
        app.handle_action(Action::OutlineWidthDecrease);
        app.handle_action(Action::OutlineWidthDecrease);
        assert_eq!(app.outline_width, 20);
        assert_eq!(app.config.ui.outline_width, 20);

        let before = app.theme.name;
        app.handle_action(Action::CycleTheme);
        assert_eq!(app.theme.name, before.next());
        assert_eq!(app.config.theme_name(), before.next());
    }

    #[test]
    fn test_help_mode_toggle() {
        let dir = TempDir::new().unwrap();
        write_pages(&dir);
        let mut app = app(&dir);
        app.handle_action(Action::ToggleHelp);
        assert_eq!(app.mode, AppMode::Help);
        app.handle_action(Action::HelpScrollDown);
        assert_eq!(app.help_scroll, 1);
        app.handle_action(Action::ExitMode);
        assert_eq!(app.mode, AppMode::Normal);
        app.handle_action(Action::Quit);
        assert!(app.should_quit);
    }
}
