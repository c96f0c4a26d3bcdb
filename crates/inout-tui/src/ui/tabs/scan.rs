use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use inout_core::models::ScanResult;

use crate::app::{App, ScanFocus};
use crate::ui::styles;
use crate::utils::{format_bytes, truncate_string};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    render_location_list(frame, app, chunks[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(6)])
        .split(chunks[1]);

    render_card_field(frame, app, right[0]);
    render_outcome(frame, app, right[1]);
}

fn render_location_list(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.scan_focus == ScanFocus::Locations;
    let locations = app.scan.location_list();
    let selected_id = app.scan.selected_location().map(|loc| &loc.id);
    let label_width = (area.width as usize).saturating_sub(6);

    let items: Vec<ListItem> = locations
        .iter()
        .enumerate()
        .map(|(i, location)| {
            let marker = if Some(&location.id) == selected_id { "● " } else { "  " };
            let style = if i == app.location_cursor && focused {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            ListItem::new(Line::from(vec![
                Span::styled(marker, styles::success_style()),
                Span::raw(truncate_string(&location.label, label_width)),
            ]))
            .style(style)
        })
        .collect();

    let title = if app.scan.locations_status.is_in_flight() {
        " Locations (loading...) ".to_string()
    } else {
        format!(" Locations ({}) ", locations.len())
    };

    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    let mut state = ListState::default();
    if !locations.is_empty() {
        state.select(Some(app.location_cursor));
    }

    frame.render_stateful_widget(List::new(items).block(block), area, &mut state);
}

fn render_card_field(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.scan_focus == ScanFocus::Card;
    let cursor = if focused { "▌" } else { "" };

    let line = if app.scan.can_submit() {
        Line::from(vec![
            Span::styled(app.scan.card_id.clone(), styles::list_item_style()),
            Span::raw(cursor),
        ])
    } else {
        Line::from(Span::styled("Submitting...", styles::muted_style()))
    };

    let block = Block::default()
        .title(" Card number [Enter] submit ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_outcome(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = Vec::new();

    if let Some(error) = app.scan.error_message() {
        lines.push(Line::from(Span::styled(error, styles::error_style())));
        lines.push(Line::from(""));
    }

    match app.scan.result() {
        Some(result) => lines.extend(result_lines(result)),
        None if app.scan.selected_location().is_none() => {
            lines.push(Line::from(Span::styled(
                "Pick a location, then scan or type a card number.",
                styles::muted_style(),
            )));
        }
        None => {
            lines.push(Line::from(Span::styled(
                "Waiting for a card...",
                styles::muted_style(),
            )));
        }
    }

    let block = Block::default()
        .title(" Last scan ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn result_lines(result: &ScanResult) -> Vec<Line<'static>> {
    let photo = match result.image_bytes() {
        Some(Ok(bytes)) => format!("on file ({})", format_bytes(bytes.len())),
        Some(Err(_)) => "unreadable".to_string(),
        None => "none".to_string(),
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!(" {} ", result.status), styles::presence_style(result.status)),
            Span::raw("  "),
            Span::styled(result.display_name().to_string(), styles::title_style()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Time:    ", styles::muted_style()),
            Span::raw(result.timestamp.clone()),
        ]),
        Line::from(vec![
            Span::styled("Photo:   ", styles::muted_style()),
            Span::raw(photo),
        ]),
    ];

    if !result.message.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Message: ", styles::muted_style()),
            Span::raw(result.message.clone()),
        ]));
    }

    lines
}
