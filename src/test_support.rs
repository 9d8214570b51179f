//! Test doubles: an in-process stub of the bookmark backend and a surface
//! that records every call.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

use crate::config::ClientConfig;
use crate::net::types::Link;
use crate::ui::{Control, Field, ListView, Notice, NoticeLevel, Page, Surface};
use crate::validation::FieldCheck;

// =============================================================================
// STUB BACKEND
// =============================================================================

pub const STUB_TOKEN: &str = "stub-token-123";
pub const STUB_USERNAME: &str = "alice";

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub extra: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
struct StubState {
    requests: Mutex<Vec<RecordedRequest>>,
    links: Mutex<Vec<Link>>,
    next_id: AtomicU64,
    fail_user_links: AtomicBool,
    delete_delay_ms: AtomicU64,
}

/// Handle to a running stub backend bound to an ephemeral local port.
pub struct StubBackend {
    pub base_url: String,
    state: Arc<StubState>,
}

impl StubBackend {
    pub async fn spawn() -> Self {
        let state = Arc::new(StubState::default());
        let app = Router::new().fallback(handle).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { base_url: format!("http://{addr}"), state }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            redirect_delay: Duration::from_millis(10),
            ..ClientConfig::default()
        }
    }

    pub fn seed_link(&self, id: &str, title: &str, url: &str) {
        self.state.links.lock().unwrap().push(Link {
            id: id.to_owned(),
            title: title.to_owned(),
            url: url.to_owned(),
        });
    }

    pub fn links(&self) -> Vec<Link> {
        self.state.links.lock().unwrap().clone()
    }

    pub fn fail_user_links(&self) {
        self.state.fail_user_links.store(true, Ordering::SeqCst);
    }

    pub fn delay_deletes(&self, delay: Duration) {
        let ms = u64::try_from(delay.as_millis()).unwrap();
        self.state.delete_delay_ms.store(ms, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Requests matching `method` and `path`.
    pub fn count(&self, method: &Method, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| &r.method == method && r.path == path)
            .count()
    }
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, axum::Json(body)).into_response()
}

async fn handle(
    State(state): State<Arc<StubState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_owned();
    let json_body = serde_json::from_slice::<Value>(&body).ok();
    let authorization = header_string(&headers, header::AUTHORIZATION.as_str());
    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        authorization: authorization.clone(),
        content_type: header_string(&headers, header::CONTENT_TYPE.as_str()),
        extra: header_string(&headers, "x-extra"),
        body: json_body.clone(),
    });

    let body = json_body.unwrap_or(Value::Null);
    let expected_auth = format!("Bearer {STUB_TOKEN}");
    let authed = authorization.as_deref() == Some(expected_auth.as_str());
    let field = |key: &str| body.get(key).and_then(Value::as_str).unwrap_or_default().to_owned();

    match (method, path.as_str()) {
        (Method::GET, "/test") => reply(StatusCode::OK, json!({ "message": "CORS is working!" })),
        (Method::POST, "/signup") => {
            if field("email") == "taken@example.com" {
                reply(StatusCode::CONFLICT, json!({ "error": "Email already registered" }))
            } else {
                reply(StatusCode::OK, json!({ "token": STUB_TOKEN, "message": "User registered!" }))
            }
        }
        (Method::POST, "/login") => {
            if field("email") == "notoken@example.com" {
                reply(StatusCode::OK, json!({}))
            } else if field("password") == "Wrong" {
                reply(StatusCode::UNAUTHORIZED, json!({ "error": "Invalid credentials!" }))
            } else {
                reply(StatusCode::OK, json!({ "token": STUB_TOKEN }))
            }
        }
        _ if !authed => reply(StatusCode::UNAUTHORIZED, json!({ "msg": "Missing Authorization Header" })),
        (Method::GET, "/user") => reply(StatusCode::OK, json!({ "username": STUB_USERNAME })),
        (Method::POST, "/add_link") => {
            let id = format!("l{}", state.next_id.fetch_add(1, Ordering::SeqCst) + 1);
            state.links.lock().unwrap().push(Link { id, title: field("title"), url: field("url") });
            reply(StatusCode::OK, json!({ "message": "Link added!" }))
        }
        (Method::GET, "/user_links") => {
            if state.fail_user_links.load(Ordering::SeqCst) {
                return reply(StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "database unavailable" }));
            }
            let links = state.links.lock().unwrap().clone();
            reply(StatusCode::OK, json!({ "links": links }))
        }
        (Method::DELETE, p) if p.starts_with("/delete_link/") => {
            let id = p.trim_start_matches("/delete_link/").to_owned();
            let delay = state.delete_delay_ms.load(Ordering::SeqCst);
            if delay > 0 {
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            let removed = {
                let mut links = state.links.lock().unwrap();
                let before = links.len();
                links.retain(|l| l.id != id);
                before != links.len()
            };
            if removed {
                reply(StatusCode::OK, json!({ "message": "Link deleted!" }))
            } else {
                reply(StatusCode::NOT_FOUND, json!({ "error": "Link not found or not authorized" }))
            }
        }
        _ => reply(StatusCode::NOT_FOUND, json!({ "error": "Not found" })),
    }
}

// =============================================================================
// RECORDING SURFACE
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SurfaceEvent {
    Notice(Notice),
    Field(Field, FieldCheck),
    Loading(Control, bool),
    Links(ListView),
    Username(String),
    ClearLinkForm,
    Redirect(Page, Duration),
}

pub struct RecordingSurface {
    events: Mutex<Vec<SurfaceEvent>>,
    has_list: bool,
    dashboard: bool,
}

impl RecordingSurface {
    /// A dashboard page with a link list.
    pub fn dashboard() -> Self {
        Self { events: Mutex::new(Vec::new()), has_list: true, dashboard: true }
    }

    /// A form-only page (signup, login) without a list container.
    pub fn form_page() -> Self {
        Self { events: Mutex::new(Vec::new()), has_list: false, dashboard: false }
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SurfaceEvent::Notice(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    pub fn notices_at(&self, level: NoticeLevel) -> Vec<String> {
        self.notices().into_iter().filter(|n| n.level == level).map(|n| n.text).collect()
    }

    pub fn redirects(&self) -> Vec<(Page, Duration)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SurfaceEvent::Redirect(page, delay) => Some((page, delay)),
                _ => None,
            })
            .collect()
    }

    pub fn list_renders(&self) -> Vec<ListView> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SurfaceEvent::Links(view) => Some(view),
                _ => None,
            })
            .collect()
    }

    pub fn loading_toggles(&self, control: &Control) -> Vec<bool> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SurfaceEvent::Loading(c, on) if &c == control => Some(on),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: SurfaceEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl Surface for RecordingSurface {
    fn notify(&self, notice: Notice) {
        self.push(SurfaceEvent::Notice(notice));
    }

    fn set_field_state(&self, field: Field, check: &FieldCheck) {
        self.push(SurfaceEvent::Field(field, check.clone()));
    }

    fn set_loading(&self, control: &Control, loading: bool) {
        self.push(SurfaceEvent::Loading(control.clone(), loading));
    }

    fn render_links(&self, view: ListView) {
        self.push(SurfaceEvent::Links(view));
    }

    fn show_username(&self, username: &str) {
        self.push(SurfaceEvent::Username(username.to_owned()));
    }

    fn clear_link_form(&self) {
        self.push(SurfaceEvent::ClearLinkForm);
    }

    fn redirect(&self, page: Page, delay: Duration) {
        self.push(SurfaceEvent::Redirect(page, delay));
    }

    fn has_link_list(&self) -> bool {
        self.has_list
    }

    fn is_dashboard(&self) -> bool {
        self.dashboard
    }
}
