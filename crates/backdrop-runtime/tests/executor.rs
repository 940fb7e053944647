// crates/backdrop-runtime/tests/executor.rs
// ============================================================================
// Module: Action Executor Tests
// Description: End-to-end tests for action dispatch.
// Purpose: Validate store actions, intents, API round-trips, and control
//          flow semantics.
// Dependencies: backdrop-core, backdrop-runtime, backdrop-store, serde_json
// ============================================================================
//! ## Overview
//! Drives the executor with recording sinks and a scripted HTTP client:
//! the API-plus-conditional scenario produces a single toast, error paths
//! route into `onError` or re-raise, sequences honor `stopOnError`, and
//! transaction actions commit or roll back atomically.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::Arc;
use std::sync::Mutex;

use backdrop_core::Action;
use backdrop_core::ActionBody;
use backdrop_core::ActionId;
use backdrop_core::BackendError;
use backdrop_core::ConditionDescriptor;
use backdrop_core::HttpClient;
use backdrop_core::HttpMethod;
use backdrop_core::HttpRequest;
use backdrop_core::HttpResponse;
use backdrop_core::NavigationIntent;
use backdrop_core::NavigationSink;
use backdrop_core::ScenarioId;
use backdrop_core::Scope;
use backdrop_core::SequenceStrategy;
use backdrop_core::SinkError;
use backdrop_core::Storage;
use backdrop_core::StoreRef;
use backdrop_core::StoreValue;
use backdrop_core::SystemIntent;
use backdrop_core::SystemSink;
use backdrop_core::UiIntent;
use backdrop_core::UiSink;
use backdrop_core::ValueDescriptor;
use backdrop_core::ValueKind;
use backdrop_runtime::ActionExecutor;
use backdrop_runtime::EventContext;
use backdrop_runtime::ExecutorError;
use backdrop_store::StoreManager;
use backdrop_store::StoreManagerConfig;
use serde_json::json;

// ----------------------------------------------------------------------
// Recording collaborators
// ----------------------------------------------------------------------

/// Navigation sink recording intents.
struct RecordingNav {
    /// Recorded intents.
    intents: Arc<Mutex<Vec<NavigationIntent>>>,
}

impl NavigationSink for RecordingNav {
    fn deliver(&self, intent: NavigationIntent) -> Result<(), SinkError> {
        self.intents.lock().unwrap().push(intent);
        Ok(())
    }
}

/// UI sink recording intents.
struct RecordingUi {
    /// Recorded intents.
    intents: Arc<Mutex<Vec<UiIntent>>>,
}

impl UiSink for RecordingUi {
    fn deliver(&self, intent: UiIntent) -> Result<(), SinkError> {
        self.intents.lock().unwrap().push(intent);
        Ok(())
    }
}

/// System sink recording intents.
struct RecordingSystem {
    /// Recorded intents.
    intents: Arc<Mutex<Vec<SystemIntent>>>,
}

impl SystemSink for RecordingSystem {
    fn deliver(&self, intent: SystemIntent) -> Result<(), SinkError> {
        self.intents.lock().unwrap().push(intent);
        Ok(())
    }
}

/// HTTP client returning one scripted response.
struct ScriptedHttp {
    /// Response status.
    status: u16,
    /// Response body.
    body: String,
    /// Recorded requests.
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl HttpClient for ScriptedHttp {
    fn request(&self, request: HttpRequest) -> Result<HttpResponse, BackendError> {
        self.requests.lock().unwrap().push(request);
        Ok(HttpResponse {
            status: self.status,
            body: self.body.clone(),
        })
    }
}

/// Everything a test needs to drive and inspect an executor.
struct Harness {
    /// Executor under test.
    executor: ActionExecutor,
    /// Store manager shared with the executor.
    stores: Arc<StoreManager>,
    /// Recorded navigation intents.
    nav: Arc<Mutex<Vec<NavigationIntent>>>,
    /// Recorded UI intents.
    ui: Arc<Mutex<Vec<UiIntent>>>,
    /// Recorded HTTP requests.
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

/// Builds a harness with a scripted HTTP response.
fn harness(status: u16, body: &str) -> Harness {
    let stores = Arc::new(StoreManager::new(StoreManagerConfig::new(
        "testapp",
        std::env::temp_dir().join("backdrop-executor-tests"),
    )));
    let nav = Arc::new(Mutex::new(Vec::new()));
    let ui = Arc::new(Mutex::new(Vec::new()));
    let system = Arc::new(Mutex::new(Vec::new()));
    let requests = Arc::new(Mutex::new(Vec::new()));
    let executor = ActionExecutor::builder()
        .stores(Arc::clone(&stores))
        .navigation(RecordingNav {
            intents: Arc::clone(&nav),
        })
        .ui(RecordingUi {
            intents: Arc::clone(&ui),
        })
        .system(RecordingSystem {
            intents: Arc::clone(&system),
        })
        .http(ScriptedHttp {
            status,
            body: body.to_string(),
            requests: Arc::clone(&requests),
        })
        .build()
        .unwrap();
    Harness {
        executor,
        stores,
        nav,
        ui,
        requests,
    }
}

/// Context for the default test scenario.
fn ctx() -> EventContext {
    EventContext::new(ScenarioId::new("s1"))
}

/// The API-plus-conditional sequence from the welcome flow.
fn welcome_flow() -> Action {
    Action::anonymous(ActionBody::Sequence {
        strategy: SequenceStrategy::Serial,
        stop_on_error: true,
        actions: vec![
            Action::anonymous(ActionBody::ApiRequest {
                endpoint: "/u/42".to_string(),
                method: HttpMethod::Get,
                headers: Vec::new(),
                body: None,
                timeout_ms: None,
                response_mapping: None,
                on_success: Some(Box::new(Action::anonymous(ActionBody::StoreSet {
                    store_ref: StoreRef::default(),
                    key_path: "user".into(),
                    value: ValueDescriptor::EventData {
                        path: "value".to_string(),
                    },
                }))),
                on_error: None,
            }),
            Action::anonymous(ActionBody::Conditional {
                condition: ConditionDescriptor::Equals {
                    left: ValueDescriptor::StoreValue {
                        store_ref: StoreRef::default(),
                        key_path: "user.active".into(),
                        default_value: Some(StoreValue::Bool(false)),
                    },
                    right: ValueDescriptor::literal_bool(true),
                },
                then: vec![Action::anonymous(ActionBody::UiShowToast {
                    message: ValueDescriptor::Computed {
                        op: backdrop_core::ComputedOp::Template,
                        operands: vec![ValueDescriptor::store("user.name")],
                        template: Some("Welcome, {0}".to_string()),
                    },
                    duration_ms: None,
                })],
                otherwise: vec![Action::anonymous(ActionBody::NavigationPush {
                    screen_id: "login".to_string(),
                    params: Vec::new(),
                })],
            }),
        ],
    })
}

/// Verifies the welcome flow toasts for an active user.
#[test]
fn api_then_conditional_toasts_active_user() {
    let harness = harness(200, r#"{"name":"Ada","active":true}"#);
    harness.executor.execute(&welcome_flow(), &ctx()).unwrap();

    let ui = harness.ui.lock().unwrap();
    assert_eq!(ui.len(), 1);
    assert!(matches!(
        &ui[0],
        UiIntent::ShowToast { message, .. } if message == "Welcome, Ada"
    ));
    assert!(harness.nav.lock().unwrap().is_empty());

    let request = &harness.requests.lock().unwrap()[0];
    assert_eq!(request.method, HttpMethod::Get);
    assert_eq!(request.url, "/u/42");
}

/// Verifies the welcome flow routes inactive users to login.
#[test]
fn api_then_conditional_pushes_login_for_inactive_user() {
    let harness = harness(200, r#"{"name":"Ada","active":false}"#);
    harness.executor.execute(&welcome_flow(), &ctx()).unwrap();

    assert!(harness.ui.lock().unwrap().is_empty());
    let nav = harness.nav.lock().unwrap();
    assert!(matches!(
        &nav[0],
        NavigationIntent::Push { screen_id, .. } if screen_id == "login"
    ));
}

/// Verifies response mapping writes the parsed body before onSuccess.
#[test]
fn response_mapping_stores_the_parsed_body() {
    let harness = harness(200, r#"{"plan":"pro"}"#);
    let action = Action::anonymous(ActionBody::ApiRequest {
        endpoint: "/account".to_string(),
        method: HttpMethod::Get,
        headers: Vec::new(),
        body: None,
        timeout_ms: None,
        response_mapping: Some(backdrop_core::ResponseMapping {
            store_ref: StoreRef::default(),
            key_path: "account".into(),
        }),
        on_success: None,
        on_error: None,
    });
    harness.executor.execute(&action, &ctx()).unwrap();

    let store = harness.stores.get_store(Scope::scenario("s1"), Storage::Memory).unwrap();
    assert_eq!(
        store.get("account.plan").unwrap(),
        Some(StoreValue::String("pro".to_string()))
    );
}

/// Verifies failures route into onError with status and message.
#[test]
fn api_failure_routes_into_on_error() {
    let harness = harness(503, "upstream sad");
    let action = Action::anonymous(ActionBody::ApiRequest {
        endpoint: "/flaky".to_string(),
        method: HttpMethod::Get,
        headers: Vec::new(),
        body: None,
        timeout_ms: None,
        response_mapping: None,
        on_success: None,
        on_error: Some(Box::new(Action::anonymous(ActionBody::StoreSet {
            store_ref: StoreRef::default(),
            key_path: "lastError".into(),
            value: ValueDescriptor::EventData {
                path: "value.status".to_string(),
            },
        }))),
    });
    harness.executor.execute(&action, &ctx()).unwrap();

    let store = harness.stores.get_store(Scope::scenario("s1"), Storage::Memory).unwrap();
    assert_eq!(store.get("lastError").unwrap(), Some(StoreValue::Integer(503)));
}

/// Verifies a missing onError re-raises the backend failure.
#[test]
fn api_failure_without_handler_re_raises() {
    let harness = harness(500, "boom");
    let action = Action::anonymous(ActionBody::ApiRequest {
        endpoint: "/flaky".to_string(),
        method: HttpMethod::Get,
        headers: Vec::new(),
        body: None,
        timeout_ms: None,
        response_mapping: None,
        on_success: None,
        on_error: None,
    });
    assert!(matches!(
        harness.executor.execute(&action, &ctx()),
        Err(ExecutorError::Backend(BackendError::Http(500)))
    ));
}

/// Action that always fails: merge of a non-object literal.
fn failing_action() -> Action {
    Action::anonymous(ActionBody::StoreMerge {
        store_ref: StoreRef::default(),
        key_path: "target".into(),
        value: ValueDescriptor::Literal {
            kind: ValueKind::Integer,
            value: json!(1),
        },
    })
}

/// Action that writes a marker value.
fn marker_action(path: &str, value: i64) -> Action {
    Action::anonymous(ActionBody::StoreSet {
        store_ref: StoreRef::default(),
        key_path: path.into(),
        value: ValueDescriptor::Literal {
            kind: ValueKind::Integer,
            value: json!(value),
        },
    })
}

/// Verifies stopOnError aborts the remaining serial actions.
#[test]
fn serial_sequence_stops_on_error_when_asked() {
    let harness = harness(200, "{}");
    let action = Action::anonymous(ActionBody::Sequence {
        strategy: SequenceStrategy::Serial,
        stop_on_error: true,
        actions: vec![marker_action("first", 1), failing_action(), marker_action("second", 2)],
    });
    assert!(harness.executor.execute(&action, &ctx()).is_err());

    let store = harness.stores.get_store(Scope::scenario("s1"), Storage::Memory).unwrap();
    assert_eq!(store.get("first").unwrap(), Some(StoreValue::Integer(1)));
    assert_eq!(store.get("second").unwrap(), None);
}

/// Verifies lenient sequences log and continue.
#[test]
fn serial_sequence_continues_past_errors_by_default() {
    let harness = harness(200, "{}");
    let action = Action::anonymous(ActionBody::Sequence {
        strategy: SequenceStrategy::Serial,
        stop_on_error: false,
        actions: vec![failing_action(), marker_action("after", 7)],
    });
    harness.executor.execute(&action, &ctx()).unwrap();

    let store = harness.stores.get_store(Scope::scenario("s1"), Storage::Memory).unwrap();
    assert_eq!(store.get("after").unwrap(), Some(StoreValue::Integer(7)));
}

/// Verifies parallel sequences complete every action.
#[test]
fn parallel_sequence_runs_all_actions() {
    let harness = harness(200, "{}");
    let action = Action::anonymous(ActionBody::Sequence {
        strategy: SequenceStrategy::Parallel,
        stop_on_error: false,
        actions: (0..4).map(|index| marker_action(&format!("slot{index}"), index)).collect(),
    });
    harness.executor.execute(&action, &ctx()).unwrap();

    let store = harness.stores.get_store(Scope::scenario("s1"), Storage::Memory).unwrap();
    for index in 0..4 {
        assert_eq!(
            store.get(format!("slot{index}").as_str()).unwrap(),
            Some(StoreValue::Integer(index))
        );
    }
}

/// Verifies transaction actions commit atomically as one change.
#[test]
fn transaction_action_commits_atomically() {
    let harness = harness(200, "{}");
    let store = harness.stores.get_store(Scope::scenario("s1"), Storage::Memory).unwrap();
    let mut changes = store.observe_changes().unwrap();

    let action = Action::anonymous(ActionBody::StoreTransaction {
        store_ref: StoreRef::default(),
        actions: vec![marker_action("a", 1), marker_action("b", 2)],
    });
    harness.executor.execute(&action, &ctx()).unwrap();

    let change = changes.try_next().unwrap();
    assert!(change.transaction_id.is_some());
    assert_eq!(change.patches.len(), 2);
    assert!(changes.try_next().is_none());
}

/// Verifies non-store actions inside a transaction are rejected untouched.
#[test]
fn transaction_action_rejects_foreign_kinds() {
    let harness = harness(200, "{}");
    let action = Action::anonymous(ActionBody::StoreTransaction {
        store_ref: StoreRef::default(),
        actions: vec![
            marker_action("a", 1),
            Action::anonymous(ActionBody::NavigationPop),
        ],
    });
    assert!(matches!(
        harness.executor.execute(&action, &ctx()),
        Err(ExecutorError::InvalidOperation(_))
    ));

    let store = harness.stores.get_store(Scope::scenario("s1"), Storage::Memory).unwrap();
    assert_eq!(store.get("a").unwrap(), None);
}

/// Verifies id-based execution and the unknown-id error.
#[test]
fn execute_by_id_uses_the_registry() {
    let stores = Arc::new(StoreManager::new(StoreManagerConfig::new(
        "testapp",
        std::env::temp_dir().join("backdrop-executor-tests"),
    )));
    let nav = Arc::new(Mutex::new(Vec::new()));
    let executor = ActionExecutor::builder()
        .stores(Arc::clone(&stores))
        .navigation(RecordingNav {
            intents: Arc::clone(&nav),
        })
        .ui(RecordingUi {
            intents: Arc::new(Mutex::new(Vec::new())),
        })
        .system(RecordingSystem {
            intents: Arc::new(Mutex::new(Vec::new())),
        })
        .http(ScriptedHttp {
            status: 200,
            body: String::new(),
            requests: Arc::new(Mutex::new(Vec::new())),
        })
        .actions(vec![Action {
            id: Some(ActionId::new("go-home")),
            body: ActionBody::NavigationReset {
                screen_id: "home".to_string(),
                params: Vec::new(),
            },
        }])
        .build()
        .unwrap();

    executor.execute_by_id(&ActionId::new("go-home"), &ctx()).unwrap();
    assert!(matches!(
        &nav.lock().unwrap()[0],
        NavigationIntent::Reset { screen_id, .. } if screen_id == "home"
    ));

    assert!(matches!(
        executor.execute_by_id(&ActionId::new("ghost"), &ctx()),
        Err(ExecutorError::UnknownAction(_))
    ));
}
