use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use inout_core::screens::NO_ENTRIES;

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let error = app.log.error_message();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(if error.is_some() { 1 } else { 0 }),
            Constraint::Min(3),
        ])
        .split(area);

    if let Some(error) = error {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(format!(" {}", error), styles::error_style()))),
            chunks[0],
        );
    }

    let entries = app.log.entries();
    let title = format!(
        " Today's log ({} entries, {} inside) ",
        entries.len(),
        app.log.inside_count()
    );
    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    if app.log.show_spinner() {
        let paragraph = Paragraph::new(Span::styled("Loading...", styles::muted_style())).block(block);
        frame.render_widget(paragraph, chunks[1]);
        return;
    }
    if app.log.show_empty_state() {
        let paragraph = Paragraph::new(Span::styled(NO_ENTRIES, styles::muted_style())).block(block);
        frame.render_widget(paragraph, chunks[1]);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Name"),
        Cell::from("Location"),
        Cell::from("Entry"),
        Cell::from("Exit"),
        Cell::from("Status"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = entries
        .iter()
        .map(|entry| {
            Row::new(vec![
                Cell::from(entry.patron_name.as_str()),
                Cell::from(entry.location.as_str()),
                Cell::from(entry.entry_time.as_str()),
                Cell::from(entry.exit_display()),
                Cell::from(Span::styled(
                    entry.status.to_string(),
                    styles::presence_style(entry.status),
                )),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Percentage(35),
        Constraint::Fill(1),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(8),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    if !entries.is_empty() {
        state.select(Some(app.log_selection));
    }

    frame.render_stateful_widget(table, chunks[1], &mut state);
}
