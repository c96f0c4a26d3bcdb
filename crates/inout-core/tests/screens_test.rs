//! Integration tests for screen state driven through a recording gateway.

use std::sync::atomic::{AtomicUsize, Ordering};

use inout_core::api::response;
use inout_core::models::{Location, LogEntry, PresenceStatus, ScanRequest, ScanResult, WireId};
use inout_core::screens::{LogScreen, LoginScreen, ScanScreen, NO_ENTRIES, SELECT_LOCATION};
use inout_core::{Endpoint, ErrorKind, Gateway, GatewayError, SessionToken};

/// Gateway double that answers from canned results and counts every call.
struct FakeGateway {
    unconfigured: Vec<Endpoint>,
    login: Result<SessionToken, GatewayError>,
    locations: Result<Vec<Location>, GatewayError>,
    scan: Result<ScanResult, GatewayError>,
    entries: Result<Vec<LogEntry>, GatewayError>,
    calls: AtomicUsize,
    last_scan: std::sync::Mutex<Option<ScanRequest>>,
}

impl Default for FakeGateway {
    fn default() -> Self {
        Self {
            unconfigured: Vec::new(),
            login: Ok(SessionToken::new("tok")),
            locations: Ok(vec![location(1, "Main Hall"), location(2, "Annex")]),
            scan: Ok(scan_result(PresenceStatus::In, Some("A. Smith"))),
            entries: Ok(Vec::new()),
            calls: AtomicUsize::new(0),
            last_scan: std::sync::Mutex::new(None),
        }
    }
}

impl FakeGateway {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self, endpoint: Endpoint) -> Result<(), GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.ensure_configured(endpoint)
    }
}

impl Gateway for FakeGateway {
    fn ensure_configured(&self, endpoint: Endpoint) -> Result<(), GatewayError> {
        if self.unconfigured.contains(&endpoint) {
            Err(GatewayError::NotConfigured(endpoint))
        } else {
            Ok(())
        }
    }

    async fn authenticate(&self, _username: &str, _password: &str) -> Result<SessionToken, GatewayError> {
        self.hit(Endpoint::Login)?;
        self.login.clone()
    }

    async fn list_locations(&self) -> Result<Vec<Location>, GatewayError> {
        self.hit(Endpoint::Locations)?;
        self.locations.clone()
    }

    async fn submit_scan(&self, _token: &SessionToken, request: &ScanRequest) -> Result<ScanResult, GatewayError> {
        self.hit(Endpoint::Scan)?;
        if let Ok(mut last) = self.last_scan.lock() {
            *last = Some(request.clone());
        }
        self.scan.clone()
    }

    async fn list_entries(&self, _token: &SessionToken) -> Result<Vec<LogEntry>, GatewayError> {
        self.hit(Endpoint::Log)?;
        self.entries.clone()
    }
}

fn location(id: i64, label: &str) -> Location {
    Location {
        id: WireId::Number(id),
        label: label.to_string(),
    }
}

fn scan_result(status: PresenceStatus, name: Option<&str>) -> ScanResult {
    ScanResult {
        status,
        patron_name: name.map(str::to_string),
        timestamp: "09:02:11".to_string(),
        message: "Recorded".to_string(),
        image_data: None,
    }
}

fn token() -> SessionToken {
    SessionToken::new("tok")
}

// -----------------------------------------------------------------------------
// Login
// -----------------------------------------------------------------------------

#[tokio::test]
async fn login_success_hands_back_token_and_wipes_password() {
    let gateway = FakeGateway::default();
    let mut screen = LoginScreen::new("desk1".into(), "hunter2".into());

    let token = screen.submit(&gateway).await;

    assert_eq!(token, Some(SessionToken::new("tok")));
    assert!(screen.password.is_empty());
    assert_eq!(screen.username, "desk1");
    assert!(screen.error_message().is_none());
}

#[tokio::test]
async fn login_surfaces_upstream_fatal_verbatim() {
    let fatal = "PHP Fatal error: Uncaught PDOException";
    let gateway = FakeGateway {
        login: Err(GatewayError::UpstreamFatal(fatal.into())),
        ..Default::default()
    };
    let mut screen = LoginScreen::new("desk1".into(), "pw".into());

    assert!(screen.submit(&gateway).await.is_none());
    assert_eq!(screen.error_message().as_deref(), Some(fatal));
    assert_eq!(screen.password, "pw");
}

#[tokio::test]
async fn login_unconfigured_makes_no_call() {
    let gateway = FakeGateway {
        unconfigured: vec![Endpoint::Login],
        ..Default::default()
    };
    let mut screen = LoginScreen::new("desk1".into(), "pw".into());

    assert!(screen.submit(&gateway).await.is_none());
    assert_eq!(gateway.calls(), 0);
    assert_eq!(
        screen.status.error().map(GatewayError::kind),
        Some(ErrorKind::Configuration)
    );
}

#[tokio::test]
async fn login_control_disabled_while_in_flight() {
    let gateway = FakeGateway::default();
    let mut screen = LoginScreen::new("desk1".into(), "pw".into());

    assert!(screen.begin(&gateway).is_some());
    assert!(!screen.can_submit());
    assert!(screen.begin(&gateway).is_none());
}

// -----------------------------------------------------------------------------
// Scan
// -----------------------------------------------------------------------------

#[tokio::test]
async fn scan_without_location_is_validation_error_with_zero_calls() {
    let gateway = FakeGateway::default();
    let mut screen = ScanScreen::new();
    screen.load_locations(&gateway).await;
    let calls_after_load = gateway.calls();
    screen.card_id = "2900100".into();

    screen.submit(&gateway, &token()).await;

    assert_eq!(gateway.calls(), calls_after_load);
    let err = screen.submission.error().expect("validation error");
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(screen.error_message().as_deref(), Some(SELECT_LOCATION));
    assert_eq!(screen.card_id, "2900100");
}

#[tokio::test]
async fn scan_unconfigured_is_configuration_error_with_zero_calls() {
    let gateway = FakeGateway {
        unconfigured: vec![Endpoint::Scan],
        ..Default::default()
    };
    let mut screen = ScanScreen::new();
    screen.load_locations(&gateway).await;
    assert!(screen.select_location(&WireId::Number(1)));
    let calls_after_load = gateway.calls();

    screen.submit(&gateway, &token()).await;

    assert_eq!(gateway.calls(), calls_after_load);
    assert_eq!(
        screen.submission.error(),
        Some(&GatewayError::NotConfigured(Endpoint::Scan))
    );
}

#[tokio::test]
async fn scan_success_clears_card_and_keeps_response_fields() {
    let gateway = FakeGateway {
        scan: Ok(ScanResult {
            image_data: Some("aGVsbG8=".into()),
            ..scan_result(PresenceStatus::Out, None)
        }),
        ..Default::default()
    };
    let mut screen = ScanScreen::new();
    screen.load_locations(&gateway).await;
    assert!(screen.select_location(&WireId::Number(2)));
    screen.card_id = "2900100".into();

    screen.submit(&gateway, &token()).await;

    assert!(screen.card_id.is_empty());
    let result = screen.result().expect("scan result");
    assert_eq!(result.status, PresenceStatus::Out);
    assert_eq!(result.display_name(), "Unknown Patron");
    assert_eq!(result.timestamp, "09:02:11");
    assert_eq!(result.message, "Recorded");
    assert!(result.has_image());

    let sent = gateway
        .last_scan
        .lock()
        .expect("lock")
        .clone()
        .expect("request sent");
    assert_eq!(sent.card_number, "2900100");
    assert_eq!(sent.location_id, WireId::Number(2));
}

#[tokio::test]
async fn scan_failure_keeps_card_and_shows_message() {
    let gateway = FakeGateway {
        scan: Err(GatewayError::Application("Card not found".into())),
        ..Default::default()
    };
    let mut screen = ScanScreen::new();
    screen.load_locations(&gateway).await;
    screen.select_location(&WireId::Number(1));
    screen.card_id = "999".into();

    screen.submit(&gateway, &token()).await;

    assert_eq!(screen.card_id, "999");
    assert!(screen.result().is_none());
    assert_eq!(screen.error_message().as_deref(), Some("Card not found"));
}

#[tokio::test]
async fn scan_duplicate_submit_is_refused_while_in_flight() {
    let gateway = FakeGateway::default();
    let mut screen = ScanScreen::new();
    screen.load_locations(&gateway).await;
    screen.select_location(&WireId::Number(1));

    let first = screen.begin_submit(&gateway);
    assert!(first.is_some());
    assert!(screen.begin_submit(&gateway).is_none());

    screen.finish_submit(Ok(scan_result(PresenceStatus::In, Some("A. Smith"))));
    assert!(screen.can_submit());
}

#[tokio::test]
async fn location_reload_keeps_selection_only_if_still_offered() {
    let mut gateway = FakeGateway::default();
    let mut screen = ScanScreen::new();
    screen.load_locations(&gateway).await;
    assert!(screen.select_location(&WireId::Number(2)));
    assert!(!screen.select_location(&WireId::Number(99)));

    screen.load_locations(&gateway).await;
    assert_eq!(screen.selected_location().map(|l| l.label.as_str()), Some("Annex"));

    gateway.locations = Ok(vec![location(1, "Main Hall")]);
    screen.load_locations(&gateway).await;
    assert!(screen.selected_location().is_none());
}

#[tokio::test]
async fn scan_allowed_while_location_reload_in_flight() {
    let gateway = FakeGateway::default();
    let mut screen = ScanScreen::new();
    screen.load_locations(&gateway).await;
    screen.select_location(&WireId::Number(2));

    assert!(screen.begin_load_locations(&gateway));
    assert!(screen.locations_status.is_in_flight());
    assert_eq!(screen.location_list().len(), 2);

    screen.card_id = "12345".into();
    let request = screen.begin_submit(&gateway).expect("selection survives the reload");
    assert_eq!(request.location_id, WireId::Number(2));
    assert!(screen.error_message().is_none());
}

#[tokio::test]
async fn failed_location_reload_keeps_list_and_selection() {
    let mut gateway = FakeGateway::default();
    let mut screen = ScanScreen::new();
    screen.load_locations(&gateway).await;
    screen.select_location(&WireId::Number(1));

    gateway.locations = Err(GatewayError::Network("connection reset".into()));
    screen.load_locations(&gateway).await;

    assert_eq!(screen.location_list().len(), 2);
    assert_eq!(screen.selected_location().map(|l| l.label.as_str()), Some("Main Hall"));
    assert_eq!(
        screen.error_message().as_deref(),
        Some("A network error occurred: connection reset")
    );

    screen.card_id = "12345".into();
    screen.submit(&gateway, &token()).await;
    assert!(screen.result().is_some());
    assert_eq!(
        gateway.last_scan.lock().unwrap().as_ref().map(|r| r.location_id.clone()),
        Some(WireId::Number(1))
    );
}

#[tokio::test]
async fn location_failure_is_shown_inline() {
    let gateway = FakeGateway {
        locations: Err(GatewayError::Network("connection refused".into())),
        ..Default::default()
    };
    let mut screen = ScanScreen::new();
    screen.load_locations(&gateway).await;

    assert!(screen.location_list().is_empty());
    assert_eq!(
        screen.error_message().as_deref(),
        Some("A network error occurred: connection refused")
    );
}

// -----------------------------------------------------------------------------
// Log
// -----------------------------------------------------------------------------

#[tokio::test]
async fn log_empty_state_only_after_successful_empty_fetch() {
    let gateway = FakeGateway::default();
    let mut screen = LogScreen::new();
    assert!(!screen.show_empty_state());

    assert!(screen.begin_refresh(&gateway));
    assert!(screen.show_spinner());
    assert!(!screen.show_empty_state());

    screen.finish_refresh(Ok(Vec::new()));
    assert!(screen.show_empty_state());
    assert_eq!(NO_ENTRIES, "No entries found for today.");
}

#[tokio::test]
async fn log_failure_is_not_empty_state() {
    let gateway = FakeGateway {
        entries: Err(GatewayError::Application("Failed to load entries.".into())),
        ..Default::default()
    };
    let mut screen = LogScreen::new();
    screen.refresh(&gateway, &token()).await;

    assert!(!screen.show_empty_state());
    assert_eq!(screen.error_message().as_deref(), Some("Failed to load entries."));
}

#[tokio::test]
async fn log_unconfigured_makes_no_call() {
    let gateway = FakeGateway {
        unconfigured: vec![Endpoint::Log],
        ..Default::default()
    };
    let mut screen = LogScreen::new();
    screen.refresh(&gateway, &token()).await;

    assert_eq!(gateway.calls(), 0);
    assert!(!screen.show_empty_state());
    assert_eq!(
        screen.status.error().map(GatewayError::kind),
        Some(ErrorKind::Configuration)
    );
}

#[tokio::test]
async fn log_example_entry_shows_na_exit() {
    let body = r#"{"success":true,"data":[{"sl":1,"name":"A. Smith","loc":"Main","entry":"09:02:11","exit":"00:00:00","status":"IN"}]}"#;
    let gateway = FakeGateway {
        entries: response::parse_entries(body),
        ..Default::default()
    };
    let mut screen = LogScreen::new();
    screen.refresh(&gateway, &token()).await;

    assert!(!screen.show_empty_state());
    assert_eq!(screen.entries().len(), 1);
    assert_eq!(screen.entries()[0].exit_display(), "N/A");
    assert_eq!(screen.inside_count(), 1);
}

#[tokio::test]
async fn log_refresh_replaces_and_failure_keeps_previous_batch() {
    let first = response::parse_entries(
        r#"{"success":true,"data":[
            {"sl":1,"name":"A","loc":"Main","entry":"09:00:00","exit":"00:00:00","status":"IN"},
            {"sl":2,"name":"B","loc":"Main","entry":"09:05:00","exit":"10:00:00","status":"OUT"}
        ]}"#,
    );
    let mut gateway = FakeGateway {
        entries: first,
        ..Default::default()
    };
    let mut screen = LogScreen::new();
    screen.refresh(&gateway, &token()).await;
    assert_eq!(screen.entries().len(), 2);

    gateway.entries = Ok(Vec::new());
    screen.refresh(&gateway, &token()).await;
    assert!(screen.entries().is_empty());
    assert!(screen.show_empty_state());

    gateway.entries = response::parse_entries(
        r#"{"success":true,"data":[{"sl":3,"name":"C","loc":"Annex","entry":"11:00:00","exit":"00:00:00","status":"IN"}]}"#,
    );
    screen.refresh(&gateway, &token()).await;
    gateway.entries = Err(GatewayError::Network("timed out".into()));
    screen.refresh(&gateway, &token()).await;

    assert_eq!(screen.entries().len(), 1);
    assert_eq!(screen.entries()[0].patron_name, "C");
    assert!(screen.error_message().is_some());
}
