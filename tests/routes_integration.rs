//! Integration tests for routing, views and the configured key

use axum::http::{Method, StatusCode};
use greeter::config::AppConfig;
use greeter::core::views;
use greeter::testing::{fake_request, FakeRequest, TestApp};
use pretty_assertions::assert_eq;

#[test]
fn test_render_template() {
    let html = views::index("Coco");

    assert_eq!(html.content_type(), "text/html");
    assert!(html.body().contains("Coco"));
}

#[tokio::test]
async fn test_call_index() {
    let app = TestApp::new();

    let response = app.call(FakeRequest::get("/Kiki")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.content_type(), Some("text/html"));
    assert_eq!(response.charset(), Some("utf-8"));
    assert!(response.content_as_string().contains("Hello Kiki"));
}

#[tokio::test]
async fn test_root_greets_guest() {
    let app = TestApp::new();

    let response = app.call(FakeRequest::get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.content_as_string().contains("Hello Guest"));
    assert!(response.content_as_string().contains(r#"href="/Coco""#));
}

#[tokio::test]
async fn test_bad_route_is_none() {
    let app = TestApp::new();

    let result = app.route(fake_request(Method::GET, "/xx/Kiki")).await.unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn test_bad_route_call_is_not_found() {
    let app = TestApp::new();

    let response = app.call(fake_request(Method::GET, "/xx/Kiki")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.is_route_miss());
    assert!(response.content_as_string().contains("/xx/Kiki"));
}

#[tokio::test]
async fn test_route_index() {
    let app = TestApp::new();

    let response = app
        .route(fake_request(Method::GET, "/Kiki"))
        .await
        .unwrap()
        .expect("/Kiki should be routed");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.content_type(), Some("text/html"));
    assert_eq!(response.charset(), Some("utf-8"));
    assert!(response.content_as_string().contains("Hello Kiki"));
}

#[tokio::test]
async fn test_percent_encoded_name() {
    let app = TestApp::new();

    let response = app.call(FakeRequest::get("/Jos%C3%A9")).await.unwrap();

    assert!(response.content_as_string().contains("Hello José"));
}

#[tokio::test]
async fn test_key_route() {
    let app = TestApp::new();

    let response = app
        .route(fake_request(Method::GET, "/key"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.content_type(), Some("text/plain"));
    assert_eq!(response.charset(), Some("utf-8"));
    assert!(response.content_as_string().contains("secret"));
}

#[tokio::test]
async fn test_key_route_uses_config() {
    let app = TestApp::with_config(AppConfig {
        key: "configured-value".to_string(),
        ..AppConfig::default()
    });

    let response = app.call(FakeRequest::get("/key")).await.unwrap();

    assert_eq!(response.content_as_string(), "configured-value");
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::new();

    let response = app.call(FakeRequest::get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response.json().unwrap();
    assert_eq!(json.get("status").as_text().unwrap(), "ok");
    assert_eq!(json.get("version").as_text().unwrap(), greeter::VERSION);
}

#[tokio::test]
async fn test_wrong_method_is_not_a_route_miss() {
    let app = TestApp::new();

    let response = app.call(FakeRequest::get("/json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(!response.is_route_miss());
}
