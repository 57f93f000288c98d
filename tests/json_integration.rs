//! Integration tests for JSON bodies and JSON error reports

use axum::http::{Method, StatusCode};
use greeter::core::{to_json, Constraint, Document, DynamicForm, Lang, Messages};
use greeter::error::JsonError;
use greeter::testing::{fake_request, FakeRequest, TestApp};
use greeter::types::{ErrorCode, FormErrors, Scalar, ValidationError};
use pretty_assertions::assert_eq;

fn sample_body() -> Document {
    to_json([
        ("key1", Scalar::from("val1")),
        ("key2", Scalar::from(2)),
        ("key3", Scalar::from(true)),
    ])
}

fn assert_sample(document: &Document) {
    assert_eq!(document.get("key1").as_text().unwrap(), "val1");
    assert_eq!(document.get("key2").as_int().unwrap(), 2);
    assert!(document.get("key3").as_bool().unwrap());
}

#[tokio::test]
async fn test_json_body_defaults_to_post() {
    let app = TestApp::new();
    let req = fake_request(Method::GET, "/json").with_json_body(&sample_body());
    assert_eq!(*req.method(), Method::POST);

    let response = app.route(req).await.unwrap().expect("/json should be routed");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.content_type(), Some("application/json"));
    let echoed = Document::parse(&response.content_as_string()).unwrap();
    assert_sample(&echoed);
}

#[tokio::test]
async fn test_json_body_with_delete() {
    let app = TestApp::new();
    let req = FakeRequest::new(Method::GET, "/json")
        .with_json_body_and_method(&sample_body(), Method::DELETE);

    let response = app.call(req).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.content_type(), Some("application/json"));
    assert_sample(&response.json().unwrap());
}

#[tokio::test]
async fn test_last_body_setter_decides_content_type() {
    let app = TestApp::new();
    let req = fake_request(Method::POST, "/json")
        .with_body("text/plain", "ignored")
        .with_json_body(&sample_body());

    let response = app.call(req).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_sample(&response.json().unwrap());
}

#[tokio::test]
async fn test_mixed_case_json_content_type() {
    let app = TestApp::new();

    let response = app
        .call(fake_request(Method::POST, "/json").with_body("Application/JSON", r#"{"a": 1}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.json().unwrap().get("a").as_int().unwrap(), 1);
}

#[tokio::test]
async fn test_echo_preserves_nested_document() {
    let app = TestApp::new();
    let body = Document::parse(r#"{"outer": {"list": [1, 2.5, null, {"deep": "yes"}]}}"#).unwrap();

    let response = app
        .call(fake_request(Method::POST, "/json").with_json_body(&body))
        .await
        .unwrap();
    let echoed = response.json().unwrap();

    assert_eq!(echoed, body);
    assert_eq!(echoed.find_path("deep").as_text().unwrap(), "yes");
    assert!(echoed.find_path("missing-key").is_missing());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::new();

    let response = app
        .call(fake_request(Method::POST, "/json").with_body("application/json", "{not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.content_as_string().contains("malformed JSON"));
}

#[tokio::test]
async fn test_non_json_content_type_is_bad_request() {
    let app = TestApp::new();

    let response = app
        .call(fake_request(Method::POST, "/json").with_body("text/plain", r#"{"a": 1}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.content_as_string(), "bad request: Expecting Json data");
}

#[test]
fn test_missing_path_composes_with_extraction() {
    let document = sample_body();
    let missing = document.find_path("missing-key");

    assert!(matches!(missing.as_text(), Err(JsonError::Missing { .. })));
    assert!(matches!(missing.as_int(), Err(JsonError::Missing { .. })));
    assert!(matches!(
        document.get("key3").as_int(),
        Err(JsonError::TypeMismatch { .. })
    ));
}

#[test]
fn test_errors_as_json() {
    let lang = Lang::new("en");
    let messages = Messages::new();

    let mut errors = FormErrors::new();
    errors.push(ValidationError::new("foo", ErrorCode::Required));
    let form = DynamicForm::new(Vec::new(), errors);

    let json = form.errors_as_json(&messages, &lang);
    let first = json.find_path("foo").elements().next().unwrap();

    assert_eq!(
        first.as_text().unwrap(),
        messages.get(&lang, ErrorCode::Required.key(), &[])
    );
}

#[tokio::test]
async fn test_greet_form_errors_as_json() {
    let app = TestApp::new();

    let response = app
        .call(fake_request(Method::POST, "/greet").with_form_body([("name", "")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.content_type(), Some("application/json"));
    let json = response.json().unwrap();
    assert_eq!(json.get("name").at(0).as_text().unwrap(), "This field is required");
}

#[tokio::test]
async fn test_greet_form_too_long() {
    let app = TestApp::new();
    let long_name = "x".repeat(65);

    let response = app
        .call(FakeRequest::get("/greet").with_form_body([("name", long_name.as_str())]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json().unwrap().find_path("name").at(0).as_text().unwrap(),
        "Maximum length is 64"
    );
}

#[tokio::test]
async fn test_greet_form_valid() {
    let app = TestApp::new();

    let response = app
        .call(FakeRequest::get("/greet").with_form_body([("name", "Coco")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.content_type(), Some("text/html"));
    assert!(response.content_as_string().contains("Hello Coco"));
}

#[test]
fn test_bind_then_render_errors() {
    let form = DynamicForm::bind(
        [("nick", "k")],
        &[Constraint::required("name"), Constraint::min_length("nick", 2)],
    );

    let json = form.errors_as_json(&Messages::new(), &Lang::default());
    assert_eq!(
        json.to_text(),
        r#"{"name":["This field is required"],"nick":["Minimum length is 2"]}"#
    );
}
