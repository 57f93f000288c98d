//! HTTP API for Greeter
//!
//! Endpoints:
//! - GET /              - Greeting for the guest
//! - GET /:name         - Greeting for a name
//! - GET /key           - Configured key as plain text
//! - POST|DELETE /json  - Echo the JSON body
//! - GET /session       - Current session
//! - POST /session      - Merge a JSON object of strings into the session
//! - DELETE /session    - Clear the session
//! - DELETE /session/:key - Remove one session key
//! - POST /greet        - Validate a form and greet
//! - GET /health        - Health check

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequestParts, Path, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode, Uri},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
    Form, Router,
};
use serde::Serialize;
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::core::cookie::SessionCodec;
use crate::core::forms::{Constraint, DynamicForm};
use crate::core::json::Document;
use crate::core::messages::{Lang, Messages};
use crate::core::views;
use crate::error::AppError;
use crate::types::{Content, NodeKind, Session};

/// Longest name accepted by POST /greet
pub const MAX_NAME_LEN: usize = 64;

/// Route table, logged at startup
const ROUTES: &[(&str, &str, &str)] = &[
    ("GET", "/", "Greet the guest"),
    ("GET", "/:name", "Greet a name"),
    ("GET", "/key", "Configured key"),
    ("POST", "/json", "Echo JSON body"),
    ("DELETE", "/json", "Echo JSON body"),
    ("GET", "/session", "Show session"),
    ("POST", "/session", "Merge into session"),
    ("DELETE", "/session", "Clear session"),
    ("DELETE", "/session/:key", "Remove session key"),
    ("POST", "/greet", "Validate form and greet"),
    ("GET", "/health", "Health check"),
];

/// App state
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub codec: SessionCodec,
    pub messages: Messages,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let codec = SessionCodec::new(&config.secret, config.session_cookie.clone());
        Self {
            config,
            codec,
            messages: Messages::new(),
        }
    }

    /// Replace the message catalogue
    pub fn with_messages(mut self, messages: Messages) -> Self {
        self.messages = messages;
        self
    }
}

/// Marker on responses produced because no route matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteMiss;

/// Session restored from the request cookie.
///
/// A cookie that fails verification is logged and treated as no session.
#[derive(Debug, Clone)]
pub struct RequestSession(pub Session);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequestSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let cookies = parts
            .headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect::<Vec<_>>()
            .join("; ");

        let session = match state.codec.from_cookie_header(&cookies) {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "ignoring invalid session cookie");
                Session::new()
            }
        };
        Ok(RequestSession(session))
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/key", get(key))
        .route("/json", post(identical_json).delete(identical_json))
        .route(
            "/session",
            get(show_session).post(merge_session).delete(clear_session),
        )
        .route("/session/:key", delete(remove_session_key))
        .route("/greet", post(greet))
        .route("/:name", get(hello))
        .fallback(not_found)
        .layer(middleware::from_fn(log_request))
        .with_state(Arc::new(state))
}

/// Greeting for the guest
async fn index() -> Content {
    views::index(views::GUEST_NAME)
}

/// Greeting for a name
async fn hello(Path(name): Path<String>) -> Content {
    views::index(&name)
}

/// Configured key
async fn key(State(state): State<Arc<AppState>>) -> Content {
    Content::text(state.config.key.clone())
}

/// Health check endpoint
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
    })
}

/// Return the JSON body unchanged
async fn identical_json(headers: HeaderMap, body: Bytes) -> Result<Response, AppError> {
    if !is_json(&headers) {
        return Err(AppError::BadRequest("Expecting Json data".to_string()));
    }
    let document = Document::from_slice(&body)?;
    debug!(bytes = body.len(), "echoing JSON body");
    Ok(Json(document.into_value()).into_response())
}

/// Current session
async fn show_session(RequestSession(session): RequestSession) -> Json<Session> {
    Json(session)
}

/// Merge a JSON object of string values into the session
async fn merge_session(
    State(state): State<Arc<AppState>>,
    RequestSession(session): RequestSession,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    if !is_json(&headers) {
        return Err(AppError::BadRequest("Expecting Json data".to_string()));
    }
    let document = Document::from_slice(&body)?;
    let root = document.root();
    if root.kind() != NodeKind::Object {
        return Err(AppError::BadRequest(format!(
            "expected a JSON object, found {}",
            root.kind()
        )));
    }

    let mut session = session;
    for (key, value) in root.entries() {
        session = session.with(key, value.as_text()?);
    }
    debug!(keys = session.len(), "session merged");

    session_response(&state, session)
}

/// Drop the session cookie
async fn clear_session(State(state): State<Arc<AppState>>) -> Response {
    (
        StatusCode::OK,
        [(header::SET_COOKIE, state.codec.removal_cookie())],
        Json(Session::new()),
    )
        .into_response()
}

/// Remove one key from the session
async fn remove_session_key(
    State(state): State<Arc<AppState>>,
    RequestSession(session): RequestSession,
    Path(key): Path<String>,
) -> Result<Response, AppError> {
    session_response(&state, session.without(&key))
}

/// Validate the submitted name and greet
async fn greet(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let form = DynamicForm::bind(
        fields,
        &[
            Constraint::required("name"),
            Constraint::max_length("name", MAX_NAME_LEN),
        ],
    );

    if form.has_errors() {
        let lang = request_lang(&headers);
        let errors = form.errors_as_json(&state.messages, &lang);
        return (StatusCode::BAD_REQUEST, Json(errors.into_value())).into_response();
    }

    views::index(form.get("name").unwrap_or(views::GUEST_NAME)).into_response()
}

/// No route matched
async fn not_found(uri: Uri) -> Response {
    let mut response = (
        StatusCode::NOT_FOUND,
        format!("Action not found: {}", uri.path()),
    )
        .into_response();
    response.extensions_mut().insert(RouteMiss);
    response
}

/// Log method, path, status and latency of every request
async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response
}

fn session_response(state: &AppState, session: Session) -> Result<Response, AppError> {
    let cookie = state.codec.set_cookie(&session)?;
    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)], Json(session)).into_response())
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

/// Primary language subtag of the first Accept-Language entry
fn request_lang(headers: &HeaderMap) -> Lang {
    headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|tag| tag.split(';').next())
        .and_then(|tag| tag.trim().split('-').next())
        .filter(|code| !code.is_empty() && *code != "*")
        .map(|code| Lang::new(code.to_ascii_lowercase()))
        .unwrap_or_default()
}

/// Serve the API on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, config: AppConfig, shutdown: F) -> Result<(), AppError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let router = create_router(AppState::new(config));
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Run the API server until Ctrl-C
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    config.validate()?;
    let listener = TcpListener::bind(config.socket_addr()?).await?;
    info!(addr = %listener.local_addr()?, "Greeter API running");
    for (method, path, about) in ROUTES {
        info!("  {:<6} {:<14} - {}", method, path, about);
    }
    serve(listener, config, shutdown_signal()).await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(e) => {
            warn!(error = %e, "cannot listen for Ctrl-C, running until killed");
            std::future::pending::<()>().await;
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
