use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, LoginFocus, Tab, View};

use super::styles;
use super::tabs::{log, scan};

const APP_TITLE: &str = "  Library In/Out";

pub fn render(frame: &mut Frame, app: &App) {
    match app.view() {
        View::Loading => render_loading(frame),
        View::Login => render_login(frame, app),
        View::Main => render_main(frame, app),
    }

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::ConfirmingQuit => render_confirm_overlay(frame, "Are you sure you want to quit?", "quit"),
        AppState::ConfirmingLogout => {
            render_confirm_overlay(frame, "Are you sure you want to log out?", "log out")
        }
        AppState::Normal | AppState::Quitting => {}
    }
}

fn render_loading(frame: &mut Frame) {
    let area = centered_rect_fixed(30, 3, frame.area());
    let paragraph = Paragraph::new(Line::from(Span::styled(
        "Loading...",
        styles::muted_style(),
    )))
    .block(Block::default().borders(Borders::ALL).border_style(styles::muted_style()));
    frame.render_widget(paragraph, area);
}

fn render_main(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(2), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    match app.current_tab {
        Tab::Scan => scan::render(frame, app, chunks[2]),
        Tab::Log => log::render(frame, app, chunks[2]),
    }
    render_status_bar(frame, app, chunks[3]);
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let right = match app.scan.selected_location() {
        Some(location) => format!("@ {}  [?] Help", location.label),
        None => "[?] Help".to_string(),
    };

    let title_line = Line::from(vec![
        Span::styled(APP_TITLE, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(APP_TITLE.len() + right.chars().count() + 2),
        )),
        Span::styled(right, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in [Tab::Scan, Tab::Log].iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        spans.push(Span::styled(
            format!("[{}] {}", i + 1, tab.title()),
            styles::tab_style(*tab == app.current_tab),
        ));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = match app.current_tab {
        Tab::Scan => "[c]ard | [r]eload | [L]ogout | [q]uit",
        Tab::Log => "[r]efresh | [L]ogout | [q]uit",
    };

    let left_text = match app.status_message {
        Some(ref msg) => format!(" {} ", msg),
        None => format!(" Log updated {} ", app.log.refreshed_display()),
    };
    let right_text = format!(" {} ", shortcuts);

    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    frame.render_widget(
        Paragraph::new(status_line).style(styles::status_bar_style()),
        area,
    );
}

fn render_login(frame: &mut Frame, app: &App) {
    let error = app.login.error_message();
    let height = if error.is_some() { 12 } else { 10 };
    let area = centered_rect_fixed(48, height, frame.area());

    let mut lines = vec![
        Line::from(Span::styled("  Staff sign-in", styles::title_style())),
        Line::from(""),
    ];

    let field_style = |focused: bool| {
        if focused {
            styles::selected_style()
        } else {
            styles::list_item_style()
        }
    };

    let username_focused = app.login_focus == LoginFocus::Username;
    let cursor = if username_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::styled("  Username: [", styles::muted_style()),
        Span::styled(
            format!("{:<20}{}", app.login.username, cursor),
            field_style(username_focused),
        ),
        Span::styled("]", styles::muted_style()),
    ]));

    let password_focused = app.login_focus == LoginFocus::Password;
    let cursor = if password_focused { "▌" } else { "" };
    let masked = "*".repeat(app.login.password.chars().count().min(20));
    lines.push(Line::from(vec![
        Span::styled("  Password: [", styles::muted_style()),
        Span::styled(format!("{:<20}{}", masked, cursor), field_style(password_focused)),
        Span::styled("]", styles::muted_style()),
    ]));

    lines.push(Line::from(""));
    let button_focused = app.login_focus == LoginFocus::Button;
    let label = if !app.login.can_submit() {
        " Signing in... "
    } else if button_focused {
        " ▶  Sign in  ◀ "
    } else {
        "    Sign in    "
    };
    lines.push(Line::from(vec![
        Span::raw("            ["),
        Span::styled(label, field_style(button_focused)),
        Span::raw("]"),
    ]));

    if let Some(error) = error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .title(APP_TITLE)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(50, 20, frame.area());
    frame.render_widget(Clear, area);

    let key_line = |key: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", key), styles::help_key_style()),
            Span::styled(desc, styles::help_desc_style()),
        ])
    };

    let help_text = vec![
        Line::from(Span::styled(
            format!("  Library In/Out  v{}", env!("CARGO_PKG_VERSION")),
            styles::title_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        key_line("1/2", "Scan / Log tab"),
        key_line("←/→", "Switch tab"),
        key_line("↑/↓", "Move in list"),
        Line::from(""),
        Line::from(Span::styled(" Scan tab", styles::highlight_style())),
        key_line("Enter", "Use highlighted location"),
        key_line("c / Tab", "Type a card number"),
        key_line("Esc", "Leave the card field"),
        key_line("r", "Reload locations"),
        Line::from(""),
        Line::from(Span::styled(" Log tab", styles::highlight_style())),
        key_line("r", "Refresh today's log"),
        Line::from(""),
        key_line("L", "Log out"),
        key_line("q", "Quit"),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn render_confirm_overlay(frame: &mut Frame, question: &str, action: &str) {
    let area = centered_rect_fixed(46, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("   {}", question),
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(format!(" to {}, ", action), styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}
