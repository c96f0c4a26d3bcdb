//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{
    can_add_card_char, can_add_password_char, can_add_username_char, App, AppState, LoginFocus,
    ScanFocus, Tab, View, PAGE_SCROLL_SIZE,
};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Handle logout confirmation
    if matches!(app.state, AppState::ConfirmingLogout) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.logout().await;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    match app.view() {
        // Nothing to do until the stored token has been read
        View::Loading => Ok(false),
        View::Login => {
            handle_login_input(app, key);
            Ok(false)
        }
        View::Main => {
            handle_main_input(app, key);
            Ok(false)
        }
    }
}

fn handle_login_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Tab | KeyCode::Down => {
            app.login_focus = app.login_focus.next();
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.login_focus = app.login_focus.prev();
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Username => app.login_focus = LoginFocus::Password,
            LoginFocus::Password | LoginFocus::Button => app.submit_login(),
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Username => {
                app.login.username.pop();
            }
            LoginFocus::Password => {
                app.login.password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Username => {
                if can_add_username_char(app.login.username.chars().count(), c) {
                    app.login.username.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login.password.chars().count(), c) {
                    app.login.password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
}

fn handle_main_input(app: &mut App, key: KeyEvent) {
    // While typing a card number every printable key belongs to the field
    if app.current_tab == Tab::Scan && app.scan_focus == ScanFocus::Card {
        handle_card_input(app, key);
        return;
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return;
        }
        KeyCode::Char('L') => {
            app.state = AppState::ConfirmingLogout;
            return;
        }
        KeyCode::Char('1') => {
            app.activate_tab(Tab::Scan);
            return;
        }
        KeyCode::Char('2') => {
            app.activate_tab(Tab::Log);
            return;
        }
        KeyCode::Left | KeyCode::Right => {
            app.activate_tab(app.current_tab.toggle());
            return;
        }
        _ => {}
    }

    match app.current_tab {
        Tab::Scan => handle_scan_input(app, key),
        Tab::Log => handle_log_input(app, key),
    }
}

fn handle_scan_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.move_location_cursor(false),
        KeyCode::Down | KeyCode::Char('j') => app.move_location_cursor(true),
        KeyCode::Enter | KeyCode::Char(' ') => app.choose_location_at_cursor(),
        KeyCode::Tab | KeyCode::Char('c') => app.scan_focus = ScanFocus::Card,
        KeyCode::Char('r') => app.load_locations(),
        _ => {}
    }
}

fn handle_card_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Tab => {
            app.scan_focus = ScanFocus::Locations;
        }
        KeyCode::Enter => {
            if app.scan.can_submit() {
                app.submit_scan();
            }
        }
        KeyCode::Backspace => {
            app.scan.card_id.pop();
        }
        KeyCode::Char(c) => {
            if can_add_card_char(app.scan.card_id.chars().count(), c) {
                app.scan.card_id.push(c);
            }
        }
        _ => {}
    }
}

fn handle_log_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') | KeyCode::Char('u') => {
            if app.log.can_refresh() {
                app.refresh_log();
            }
        }
        KeyCode::Up | KeyCode::Char('k') => app.scroll_log(-1),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_log(1),
        KeyCode::PageUp => app.scroll_log(-(PAGE_SCROLL_SIZE as isize)),
        KeyCode::PageDown => app.scroll_log(PAGE_SCROLL_SIZE as isize),
        KeyCode::Home => app.log_selection = 0,
        KeyCode::End => app.scroll_log(isize::MAX),
        _ => {}
    }
}
