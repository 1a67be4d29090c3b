mod layout;
pub mod paint;
mod util;

use layout::{DynamicLayout, Section};

use crate::tui::app::{App, AppMode, Focus};
use crate::tui::help_text::build_help_text;
use paint::paint_skeleton;
use ratatui::Frame;
use ratatui::layout::{Constraint, Margin, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Clear, List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation,
    ScrollbarState, Wrap,
};
use util::{popup_area, truncate_to_width};

pub fn render(frame: &mut Frame, app: &mut App) {
    // Clear expired status messages (auto-dismiss after timeout)
    app.clear_expired_status_message();

    let area = frame.area();
    let main_layout = DynamicLayout::vertical(area)
        .section(Section::Title, Constraint::Length(2))
        .section(Section::Body, Constraint::Min(0))
        .section(Section::Status, Constraint::Length(1))
        .build();

    let body = DynamicLayout::horizontal(main_layout.area(Section::Body))
        .section_if(
            app.show_outline,
            Section::Outline,
            Constraint::Percentage(app.outline_width),
        )
        .section(Section::Content, Constraint::Min(0))
        .build();

    // Paint before drawing anything so scroll-spy and the outline agree
    // within this frame.
    let content_area = body.area(Section::Content);
    let inner = Block::default().borders(Borders::ALL).inner(content_area);
    app.prepare_frame(inner.width as usize, inner.height as usize);

    render_title_bar(frame, app, main_layout.area(Section::Title));
    if let Some(outline_area) = body.get(Section::Outline) {
        render_outline(frame, app, outline_area);
    }
    render_content(frame, app, content_area);
    render_status_bar(frame, app, main_layout.area(Section::Status));

    if app.mode == AppMode::Help {
        render_help_popup(frame, app, area);
    }
}

fn render_help_popup(frame: &mut Frame, app: &mut App, area: Rect) {
    // Min 40 cols for readability, min 10 rows for a usable scroll area
    let popup = popup_area(area, 70, 80, 40, 10);
    let theme = &app.theme;
    let lines = build_help_text(&app.keybindings, theme);

    let visible_rows = popup.height.saturating_sub(2) as usize;
    let max_scroll = lines.len().saturating_sub(visible_rows);
    app.help_scroll = app.help_scroll.min(max_scroll as u16);

    frame.render_widget(Clear, popup);
    let help = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style(true))
                .title(" Help ")
                .title_bottom(Line::from(" Esc to close ").right_aligned())
                .style(Style::default().bg(theme.background)),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.help_scroll, 0));
    frame.render_widget(help, popup);

    if max_scroll > 0 {
        let mut state = ScrollbarState::new(max_scroll).position(app.help_scroll as usize);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight).style(theme.border_style(true)),
            popup.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut state,
        );
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title_text = match app.page() {
        Some(page) => format!(
            "blockview - {} - {} headings",
            page.metadata.title,
            page.headings.len()
        ),
        None => format!(
            "blockview - loading {}",
            app.loader.current_id().unwrap_or_default()
        ),
    };

    let title = Paragraph::new(title_text)
        .style(
            Style::default()
                .fg(app.theme.heading_1)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(title, area);
}

fn render_outline(frame: &mut Frame, app: &mut App, area: Rect) {
    let theme = &app.theme;
    let active = app.navigator.active();

    let items: Vec<ListItem> = app
        .headings()
        .iter()
        .map(|heading| {
            let indent = "  ".repeat(heading.level.saturating_sub(1));
            let is_active = active == Some(heading.anchor.as_str());
            let marker = if is_active { "● " } else { "  " };
            let prefix = "#".repeat(heading.level);

            let mut style = Style::default().fg(theme.heading_color(heading.level));
            if is_active {
                style = style
                    .fg(theme.active_heading_fg)
                    .add_modifier(Modifier::BOLD);
            }
            ListItem::new(Line::from(Span::styled(
                format!("{}{}{} {}", indent, marker, prefix, heading.text),
                style,
            )))
        })
        .collect();
    let item_count = items.len();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style(app.focus == Focus::Outline))
                .title(" Outline "),
        )
        .style(theme.content_style())
        .highlight_style(theme.selection_style())
        .highlight_symbol("► ");

    frame.render_stateful_widget(list, area, &mut app.outline_state);

    let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
        .begin_symbol(Some("↑"))
        .end_symbol(Some("↓"))
        .style(app.theme.muted_style());
    let mut state =
        ScrollbarState::new(item_count).position(app.outline_state.selected().unwrap_or(0));
    frame.render_stateful_widget(
        scrollbar,
        area.inner(Margin {
            vertical: 1,
            horizontal: 0,
        }),
        &mut state,
    );
}

fn render_content(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let block_style = theme.border_style(app.focus == Focus::Content);
    let width = app.content_width;
    let height = app.content_height;

    let (lines, title) = match (app.page(), app.painted()) {
        (Some(page), Some(painted)) => {
            let visible: Vec<Line> = painted
                .lines
                .iter()
                .skip(app.content_scroll)
                .take(height)
                .cloned()
                .collect();
            let name = truncate_to_width(&page.metadata.title, width.saturating_sub(16));
            let title = if app.mode == AppMode::LinkFollow {
                format!(" {} [Links: {}] ", name, painted.links.len())
            } else {
                format!(" {} ", name)
            };
            (visible, title)
        }
        _ => (paint_skeleton(theme, width, height), " Loading… ".to_string()),
    };

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(block_style)
                .title(title),
        )
        .style(theme.content_style());
    frame.render_widget(paragraph, area);

    let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
        .begin_symbol(Some("↑"))
        .end_symbol(Some("↓"))
        .style(theme.muted_style());
    let mut state = ScrollbarState::new(app.max_scroll()).position(app.content_scroll);
    frame.render_stateful_widget(
        scrollbar,
        area.inner(Margin {
            vertical: 1,
            horizontal: 0,
        }),
        &mut state,
    );
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    if let Some(ref msg) = app.status_message {
        let status = Paragraph::new(format!(" {} ", msg))
            .style(theme.selection_style());
        frame.render_widget(status, area);
        return;
    }

    let status_text = match app.mode {
        AppMode::LinkFollow => {
            let count = app.painted().map_or(0, |p| p.links.len());
            let current = app
                .selected_link
                .and_then(|i| app.painted()?.links.get(i).map(|l| (i, l)));
            match current {
                Some((i, link)) => format!(
                    " [LINK FOLLOW MODE] Link {}/{}: \"{}\" → {} • Tab:Next • Enter:Follow • Esc:Exit ",
                    i + 1,
                    count,
                    link.text,
                    truncate_to_width(&link.href, 40)
                ),
                None => " [LINK FOLLOW MODE] No links • Esc:Exit ".to_string(),
            }
        }
        AppMode::Help => " [HELP] j/k:Scroll • Esc:Close ".to_string(),
        AppMode::Normal => {
            let focus = match app.focus {
                Focus::Outline => "Outline",
                Focus::Content => "Content",
            };
            let total = app.max_scroll();
            let percentage = if total > 0 {
                app.content_scroll * 100 / total
            } else {
                100
            };
            let outline = if app.show_outline {
                format!("Outline:{}%", app.outline_width)
            } else {
                "Outline:Hidden".to_string()
            };
            let back = if app.history.is_empty() {
                String::new()
            } else {
                format!(" ← {}", app.history.len())
            };
            let source = app.loader.client().describe();
            format!(
                " [{}] {}%{} • {} • {} • f:Links • b:Back • t:Theme • ?:Help ",
                focus, percentage, back, outline, source
            )
        }
    };

    let status_text = format!("{} Theme:{} ", status_text, theme.name);
    frame.render_widget(
        Paragraph::new(status_text).style(theme.status_bar_style()),
        area,
    );
}
