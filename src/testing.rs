//! Test harness
//!
//! Every test owns its application explicitly: [`TestApp`] dispatches
//! [`FakeRequest`]s in-process, [`TestServer`] runs a real listener and is
//! stopped by its owner. Sessions on fake requests are encoded into the cookie
//! header with the application's own codec, and sessions set by responses are
//! decoded back.

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, Request, StatusCode},
    response::Response,
    Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower::ServiceExt;

use crate::config::AppConfig;
use crate::core::api::{create_router, serve, AppState, RouteMiss};
use crate::core::cookie::SessionCodec;
use crate::core::json::Document;
use crate::error::{AppError, JsonError};
use crate::types::Session;

/// In-process application handle
#[derive(Clone)]
pub struct TestApp {
    router: Router,
    codec: SessionCodec,
}

impl TestApp {
    /// Application with the default configuration
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self::with_state(AppState::new(config))
    }

    pub fn with_state(state: AppState) -> Self {
        let codec = state.codec.clone();
        Self {
            router: create_router(state),
            codec,
        }
    }

    pub fn codec(&self) -> &SessionCodec {
        &self.codec
    }

    /// Dispatch a request. Unmatched routes come back as 404 responses.
    pub async fn call(&self, request: FakeRequest) -> Result<TestResponse, AppError> {
        let request = request.into_http(&self.codec)?;
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .unwrap_or_else(|never| match never {});
        TestResponse::read(response, &self.codec).await
    }

    /// Dispatch a request; `None` when no route matched
    pub async fn route(&self, request: FakeRequest) -> Result<Option<TestResponse>, AppError> {
        let response = self.call(request).await?;
        Ok((!response.is_route_miss()).then_some(response))
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Shorthand for [`FakeRequest::new`]
pub fn fake_request(method: Method, uri: impl Into<String>) -> FakeRequest {
    FakeRequest::new(method, uri)
}

/// Request under construction
#[derive(Debug, Clone)]
pub struct FakeRequest {
    method: Method,
    uri: String,
    headers: Vec<(String, String)>,
    session: Session,
    body: Vec<u8>,
}

impl FakeRequest {
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            headers: Vec::new(),
            session: Session::new(),
            body: Vec::new(),
        }
    }

    pub fn get(uri: impl Into<String>) -> Self {
        Self::new(Method::GET, uri)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Add a session value; earlier values for other keys are kept
    pub fn with_session(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.session = self.session.with(key, value);
        self
    }

    /// Session that will be sent with the request
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set a single-valued header, dropping earlier values under the same name
    fn set_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.with_header(name, value)
    }

    /// JSON body, sent as POST
    pub fn with_json_body(self, document: &Document) -> Self {
        self.with_json_body_and_method(document, Method::POST)
    }

    /// JSON body with an explicit method
    pub fn with_json_body_and_method(mut self, document: &Document, method: Method) -> Self {
        self.method = method;
        self.body = document.to_text().into_bytes();
        self.set_header(header::CONTENT_TYPE.as_str(), "application/json")
    }

    /// URL-encoded form body. A GET request becomes a POST.
    pub fn with_form_body<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        if self.method == Method::GET {
            self.method = Method::POST;
        }
        self.body = fields
            .into_iter()
            .map(|(k, v)| {
                format!(
                    "{}={}",
                    urlencoding::encode(k.as_ref()),
                    urlencoding::encode(v.as_ref())
                )
            })
            .collect::<Vec<_>>()
            .join("&")
            .into_bytes();
        self.set_header(
            header::CONTENT_TYPE.as_str(),
            "application/x-www-form-urlencoded",
        )
    }

    /// Raw body with a content type
    pub fn with_body(mut self, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self.set_header(header::CONTENT_TYPE.as_str(), content_type)
    }

    fn into_http(self, codec: &SessionCodec) -> Result<Request<Body>, AppError> {
        let mut builder = Request::builder().method(self.method).uri(&self.uri);

        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| AppError::BadRequest(format!("header name {:?}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| AppError::BadRequest(format!("header value {:?}: {}", value, e)))?;
            builder = builder.header(name, value);
        }

        if !self.session.is_empty() {
            let cookie = format!("{}={}", codec.cookie_name(), codec.encode(&self.session)?);
            builder = builder.header(header::COOKIE, cookie);
        }

        builder
            .body(Body::from(self.body))
            .map_err(|e| AppError::BadRequest(format!("request {:?}: {}", self.uri, e)))
    }
}

/// Fully buffered response
#[derive(Debug)]
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    session: Option<Session>,
    route_miss: bool,
}

impl TestResponse {
    async fn read(response: Response, codec: &SessionCodec) -> Result<Self, AppError> {
        let route_miss = response.extensions().get::<RouteMiss>().is_some();
        let (parts, body) = response.into_parts();
        let body = axum::body::to_bytes(body, usize::MAX).await?;

        let session = parts
            .headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| codec.from_set_cookie(v))
            .last()
            .transpose()?;

        Ok(Self {
            status: parts.status,
            headers: parts.headers,
            body,
            session,
            route_miss,
        })
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// MIME type without parameters
    pub fn content_type(&self) -> Option<&str> {
        self.header(header::CONTENT_TYPE.as_str())
            .and_then(|v| v.split(';').next())
            .map(str::trim)
    }

    /// `charset` parameter of the content type
    pub fn charset(&self) -> Option<&str> {
        self.header(header::CONTENT_TYPE.as_str())?
            .split(';')
            .skip(1)
            .filter_map(|param| param.trim().split_once('='))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("charset"))
            .map(|(_, value)| value.trim().trim_matches('"'))
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn content_as_string(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> Result<Document, JsonError> {
        Document::from_slice(&self.body)
    }

    /// Session written by this response, if it set the session cookie
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_route_miss(&self) -> bool {
        self.route_miss
    }
}

/// Running server bound to a real socket
pub struct TestServer {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<Result<(), AppError>>,
}

impl TestServer {
    /// Bind `config.addr` (port 0 picks a free port) and start serving
    pub async fn start(config: AppConfig) -> Result<Self, AppError> {
        config.validate()?;
        let listener = TcpListener::bind(config.socket_addr()?).await?;
        let addr = listener.local_addr()?;
        let (shutdown, signal) = oneshot::channel::<()>();

        let task = tokio::spawn(serve(listener, config, async move {
            let _ = signal.await;
        }));
        tracing::debug!(%addr, "test server started");

        Ok(Self {
            addr,
            shutdown,
            task,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Absolute URL for `path`
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Shut down gracefully and wait for the server task
    pub async fn stop(self) -> Result<(), AppError> {
        let _ = self.shutdown.send(());
        self.task.await.map_err(std::io::Error::other)?
    }
}
