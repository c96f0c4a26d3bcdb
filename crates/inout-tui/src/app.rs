//! Application state management for the scanner front end.
//!
//! This module contains the `App` struct that owns the session, the gateway
//! client, and the three screens, and coordinates gateway calls running on
//! background tasks.

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use inout_core::config::Config;
use inout_core::models::{Location, LogEntry, ScanResult};
use inout_core::screens::{LogScreen, LoginScreen, ScanScreen};
use inout_core::{
    CredentialStore, Gateway, GatewayClient, GatewayError, SessionManager, SessionState,
    SessionToken,
};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// At most one call per screen is in flight, so this never fills.
const CHANNEL_BUFFER_SIZE: usize = 16;

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for the library card number.
const MAX_CARD_LENGTH: usize = 64;

/// Number of log rows to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

const ENV_USERNAME: &str = "INOUT_USERNAME";
const ENV_PASSWORD: &str = "INOUT_PASSWORD";

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs, shown once signed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Scan,
    Log,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Scan => "Scan",
            Tab::Log => "Log",
        }
    }

    /// The other tab. With two tabs next and previous coincide.
    pub fn toggle(&self) -> Self {
        match self {
            Tab::Scan => Tab::Log,
            Tab::Log => Tab::Scan,
        }
    }
}

/// Which top-level view the router shows for the current session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Loading,
    Login,
    Main,
}

/// Overlay and lifecycle state, independent of the routed view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    ConfirmingLogout,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Username,
    Password,
    Button,
}

impl LoginFocus {
    pub fn next(&self) -> Self {
        match self {
            LoginFocus::Username => LoginFocus::Password,
            LoginFocus::Password => LoginFocus::Button,
            LoginFocus::Button => LoginFocus::Username,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            LoginFocus::Username => LoginFocus::Button,
            LoginFocus::Password => LoginFocus::Username,
            LoginFocus::Button => LoginFocus::Password,
        }
    }
}

/// Scan tab focus: the location picker or the card number field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanFocus {
    Locations,
    Card,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Outcome of one gateway call, sent back from a spawned task.
enum TaskResult {
    Login(Result<SessionToken, GatewayError>),
    Locations(Result<Vec<Location>, GatewayError>),
    Scan(Result<ScanResult, GatewayError>),
    Entries(Result<Vec<LogEntry>, GatewayError>),
}

impl TaskResult {
    fn name(&self) -> &'static str {
        match self {
            TaskResult::Login(_) => "login",
            TaskResult::Locations(_) => "locations",
            TaskResult::Scan(_) => "scan",
            TaskResult::Entries(_) => "entries",
        }
    }
}

/// A task result stamped with the session generation that started it.
struct TaskMessage {
    generation: u64,
    result: TaskResult,
}

/// Keep the results started in the `current` session generation, in arrival order.
fn current_results(messages: Vec<TaskMessage>, current: u64) -> Vec<TaskResult> {
    messages
        .into_iter()
        .filter_map(|message| {
            if message.generation == current {
                return Some(message.result);
            }
            warn!(
                task = message.result.name(),
                started = message.generation,
                current,
                "Discarding result from a previous session"
            );
            None
        })
        .collect()
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub session: SessionManager,
    gateway: GatewayClient,

    // UI State
    pub state: AppState,
    pub current_tab: Tab,
    pub status_message: Option<String>,

    // Login view
    pub login: LoginScreen,
    pub login_focus: LoginFocus,

    // Scan tab
    pub scan: ScanScreen,
    pub scan_focus: ScanFocus,
    pub location_cursor: usize,

    // Log tab
    pub log: LogScreen,
    pub log_selection: usize,

    // Bumped on logout so results from the previous session are dropped
    generation: u64,
    task_rx: mpsc::Receiver<TaskMessage>,
    task_tx: mpsc::Sender<TaskMessage>,
}

impl App {
    /// Create a new application instance. The session starts out restoring.
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };
        debug!(token_store = ?config.token_store, "Config loaded");

        let session = SessionManager::new(CredentialStore::from_kind(config.token_store));
        let gateway = GatewayClient::new(config.effective_endpoints())?;

        let (task_tx, task_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        // Prefill from env vars or the last successful sign-in
        let username = std::env::var(ENV_USERNAME)
            .ok()
            .or_else(|| config.last_username.clone())
            .unwrap_or_default();
        let password = std::env::var(ENV_PASSWORD).unwrap_or_default();
        let login_focus = if username.is_empty() {
            LoginFocus::Username
        } else {
            LoginFocus::Password
        };

        Ok(Self {
            config,
            session,
            gateway,

            state: AppState::Normal,
            current_tab: Tab::Scan,
            status_message: None,

            login: LoginScreen::new(username, password),
            login_focus,

            scan: ScanScreen::new(),
            scan_focus: ScanFocus::Locations,
            location_cursor: 0,

            log: LogScreen::new(),
            log_selection: 0,

            generation: 0,
            task_rx,
            task_tx,
        })
    }

    /// Routed view for the current session state.
    pub fn view(&self) -> View {
        match self.session.state() {
            SessionState::Restoring => View::Loading,
            SessionState::Unauthenticated => View::Login,
            SessionState::Authenticated(_) => View::Main,
        }
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Read any stored token and, if found, open on the Scan tab.
    pub async fn restore_session(&mut self) {
        let restored = matches!(self.session.restore().await, SessionState::Authenticated(_));
        info!(restored, "Session restore finished");
        if restored {
            self.activate_tab(Tab::Scan);
        }
    }

    /// Start a sign-in with the credentials in the login form.
    pub fn submit_login(&mut self) {
        let Some(request) = self.login.begin(&self.gateway) else {
            return;
        };
        let gateway = self.gateway.clone();
        self.spawn(async move {
            TaskResult::Login(
                gateway
                    .authenticate(&request.username, &request.password)
                    .await,
            )
        });
    }

    async fn complete_login(&mut self, result: Result<SessionToken, GatewayError>) {
        let Some(token) = self.login.finish(result) else {
            return;
        };
        self.session.login(token).await;

        self.config.last_username = Some(self.login.username.clone());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        info!("Login successful");
        self.status_message = None;
        self.activate_tab(Tab::Scan);
    }

    /// Sign out unconditionally and reset every screen.
    pub async fn logout(&mut self) {
        self.session.logout().await;
        self.generation += 1;

        let username = self.login.username.clone();
        self.login = LoginScreen::new(username, String::new());
        self.login_focus = LoginFocus::Password;
        self.scan = ScanScreen::new();
        self.scan_focus = ScanFocus::Locations;
        self.location_cursor = 0;
        self.log = LogScreen::new();
        self.log_selection = 0;
        self.current_tab = Tab::Scan;
        self.state = AppState::Normal;
        self.status_message = Some("Signed out".to_string());
        info!(generation = self.generation, "Logged out");
    }

    // =========================================================================
    // Tabs and gateway calls
    // =========================================================================

    /// Switch tabs. Activating a tab fetches its data.
    pub fn activate_tab(&mut self, tab: Tab) {
        self.current_tab = tab;
        match tab {
            Tab::Scan => self.load_locations(),
            Tab::Log => self.refresh_log(),
        }
    }

    pub fn load_locations(&mut self) {
        if !self.scan.begin_load_locations(&self.gateway) {
            return;
        }
        let gateway = self.gateway.clone();
        self.spawn(async move { TaskResult::Locations(gateway.list_locations().await) });
    }

    /// Select the location under the cursor and move focus to the card field.
    pub fn choose_location_at_cursor(&mut self) {
        let Some(id) = self
            .scan
            .location_list()
            .get(self.location_cursor)
            .map(|loc| loc.id.clone())
        else {
            return;
        };
        if self.scan.select_location(&id) {
            self.scan_focus = ScanFocus::Card;
        }
    }

    pub fn submit_scan(&mut self) {
        let Some(token) = self.session.token().cloned() else {
            return;
        };
        let Some(request) = self.scan.begin_submit(&self.gateway) else {
            return;
        };
        let gateway = self.gateway.clone();
        self.spawn(async move { TaskResult::Scan(gateway.submit_scan(&token, &request).await) });
    }

    pub fn refresh_log(&mut self) {
        let Some(token) = self.session.token().cloned() else {
            return;
        };
        if !self.log.begin_refresh(&self.gateway) {
            return;
        }
        let gateway = self.gateway.clone();
        self.spawn(async move { TaskResult::Entries(gateway.list_entries(&token).await) });
    }

    fn spawn<F>(&self, task: F)
    where
        F: std::future::Future<Output = TaskResult> + Send + 'static,
    {
        let tx = self.task_tx.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let result = task.await;
            Self::send_result(&tx, TaskMessage { generation, result }).await;
        });
    }

    /// Helper to send task results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<TaskMessage>, message: TaskMessage) {
        if let Err(e) = tx.send(message).await {
            error!(error = %e, "Failed to send task result - channel closed");
        }
    }

    /// Check for completed background tasks and apply their results
    pub async fn check_background_tasks(&mut self) {
        let mut messages = Vec::new();
        while let Ok(message) = self.task_rx.try_recv() {
            messages.push(message);
        }

        for result in current_results(messages, self.generation) {
            self.apply_result(result).await;
        }
    }

    async fn apply_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::Login(result) => self.complete_login(result).await,
            TaskResult::Locations(result) => {
                self.scan.finish_load_locations(result);
                let count = self.scan.location_list().len();
                self.location_cursor = self.location_cursor.min(count.saturating_sub(1));
            }
            TaskResult::Scan(result) => {
                if let Ok(ref scan) = result {
                    self.status_message =
                        Some(format!("{} {} at {}", scan.display_name(), scan.status, scan.timestamp));
                }
                self.scan.finish_submit(result);
            }
            TaskResult::Entries(result) => {
                self.log.finish_refresh(result);
                let count = self.log.entries().len();
                self.log_selection = self.log_selection.min(count.saturating_sub(1));
            }
        }
    }

    // =========================================================================
    // Navigation helpers
    // =========================================================================

    pub fn move_location_cursor(&mut self, down: bool) {
        let count = self.scan.location_list().len();
        if count == 0 {
            return;
        }
        self.location_cursor = if down {
            (self.location_cursor + 1).min(count - 1)
        } else {
            self.location_cursor.saturating_sub(1)
        };
    }

    pub fn scroll_log(&mut self, delta: isize) {
        let count = self.log.entries().len();
        if count == 0 {
            return;
        }
        let next = self.log_selection.saturating_add_signed(delta);
        self.log_selection = next.min(count - 1);
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a username character should be accepted
pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

/// Check if a card number character should be accepted
pub fn can_add_card_char(current_len: usize, c: char) -> bool {
    current_len < MAX_CARD_LENGTH && is_valid_input_char(c) && !c.is_whitespace()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Tab and focus Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_results_from_previous_session_are_dropped() {
        let messages = vec![
            TaskMessage {
                generation: 0,
                result: TaskResult::Entries(Ok(Vec::new())),
            },
            TaskMessage {
                generation: 1,
                result: TaskResult::Locations(Ok(Vec::new())),
            },
            TaskMessage {
                generation: 0,
                result: TaskResult::Login(Err(GatewayError::Network("reset".into()))),
            },
        ];

        let kept = current_results(messages, 1);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name(), "locations");
    }

    #[test]
    fn test_results_from_current_session_are_kept_in_order() {
        let messages = (0..3)
            .map(|_| TaskMessage {
                generation: 2,
                result: TaskResult::Scan(Err(GatewayError::Application("Card not found".into()))),
            })
            .chain(std::iter::once(TaskMessage {
                generation: 2,
                result: TaskResult::Entries(Ok(Vec::new())),
            }))
            .collect();

        let names: Vec<_> = current_results(messages, 2).iter().map(TaskResult::name).collect();
        assert_eq!(names, ["scan", "scan", "scan", "entries"]);
    }

    #[test]
    fn test_tab_toggle() {
        assert_eq!(Tab::Scan.toggle(), Tab::Log);
        assert_eq!(Tab::Log.toggle(), Tab::Scan);
        assert_eq!(Tab::Scan.title(), "Scan");
    }

    #[test]
    fn test_login_focus_cycle() {
        assert_eq!(LoginFocus::Username.next(), LoginFocus::Password);
        assert_eq!(LoginFocus::Button.next(), LoginFocus::Username); // Wraps around
        assert_eq!(LoginFocus::Username.prev(), LoginFocus::Button);
        assert_eq!(LoginFocus::Password.prev(), LoginFocus::Username);
    }

    // -------------------------------------------------------------------------
    // Input Validation Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_can_add_username_char() {
        assert!(can_add_username_char(0, 'a'));
        assert!(can_add_username_char(49, 'z'));
        // Exceeds max length
        assert!(!can_add_username_char(50, 'a'));
        // Control characters rejected
        assert!(!can_add_username_char(0, '\x00'));
        assert!(!can_add_username_char(0, '\n'));
        assert!(!can_add_username_char(0, '\t'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(0, 'a'));
        assert!(can_add_password_char(127, '!'));
        assert!(!can_add_password_char(128, 'a'));
        assert!(!can_add_password_char(0, '\r'));
    }

    #[test]
    fn test_can_add_card_char() {
        assert!(can_add_card_char(0, '2'));
        assert!(can_add_card_char(63, 'X'));
        assert!(!can_add_card_char(64, '2'));
        assert!(!can_add_card_char(0, ' '));
        assert!(!can_add_card_char(0, '\x1b'));
    }
}
