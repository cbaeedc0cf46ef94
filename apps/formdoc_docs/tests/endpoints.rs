//! Document endpoints driven through the router.

use std::path::PathBuf;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use formdoc_docs::{
    docx::{Document, ReplacePolicy, DOCX_MIME},
    urls::router,
    DocsCfg, DocsState, FlattenSource,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

struct Fixture {
    _tmp: TempDir,
    template: PathBuf,
}

fn fixture(paragraphs: &[&str]) -> Fixture {
    let tmp = TempDir::new().unwrap();
    let template = tmp.path().join("doc_temp.docx");
    let bytes = Document::with_paragraphs(paragraphs).to_bytes().unwrap();
    std::fs::write(&template, bytes).unwrap();
    Fixture { _tmp: tmp, template }
}

fn app(template: PathBuf, source: FlattenSource) -> Router {
    let cfg = DocsCfg {
        items_template: template.clone(),
        items_policy: ReplacePolicy::AllMatches,
        responses_template: template,
        responses_policy: ReplacePolicy::FirstMatch,
        responses_source: source,
    };
    router(DocsState::new(&cfg))
}

async fn post(app: Router, uri: &str, body: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let req = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, headers, bytes.to_vec())
}

fn paragraphs(bytes: &[u8]) -> Vec<String> {
    Document::from_bytes(bytes).unwrap().paragraphs().unwrap()
}

#[tokio::test]
async fn test_generate_docx_itemized() {
    let fx = fixture(&["Commercial offer", "%items%", "Footer %items%"]);
    let body = json!({
        "title": "Offer",
        "items": [
            {"name": "miniSIGMA", "components": ["autopilot AP-05", "camera"]},
            {"name": "Modem", "components": ["antenna"]}
        ]
    });

    let (status, headers, bytes) =
        post(app(fx.template.clone(), FlattenSource::Responses), "/generate-docx/", &body.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], DOCX_MIME);
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=output.docx"
    );

    let block = "miniSIGMA:\n  - autopilot AP-05\n  - camera\n\nModem:\n  - antenna";
    assert_eq!(
        paragraphs(&bytes),
        vec![
            "Commercial offer".to_string(),
            block.to_string(),
            format!("Footer {block}"),
        ]
    );
}

#[tokio::test]
async fn test_generate_docx_empty_items() {
    let fx = fixture(&["Offer", "%items%"]);
    let (status, _, bytes) =
        post(app(fx.template.clone(), FlattenSource::Responses), "/generate-docx/", "{}").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(paragraphs(&bytes), vec!["Offer", ""]);
}

#[tokio::test]
async fn test_generate_docx_item_without_name() {
    let fx = fixture(&["%items%"]);
    let (status, _, bytes) = post(
        app(fx.template.clone(), FlattenSource::Responses),
        "/generate-docx/",
        r#"{"items": [{"components": ["x"]}]}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let err: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(err["error"], "item 0 has no 'name' field");
}

#[tokio::test]
async fn test_missing_template_is_400() {
    let tmp = TempDir::new().unwrap();
    let (status, _, bytes) = post(
        app(tmp.path().join("gone.docx"), FlattenSource::Responses),
        "/generate-docx/",
        r#"{"items": []}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let err: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(err["error"].as_str().unwrap().contains("gone.docx"));
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let fx = fixture(&["%items%"]);
    for uri in ["/generate-docx/", "/generate-responses-docx/"] {
        let (status, _, bytes) = post(app(fx.template.clone(), FlattenSource::Responses), uri, "items=1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let err: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(err["error"].is_string());
    }
}

#[tokio::test]
async fn test_get_is_405() {
    let fx = fixture(&["%items%"]);
    for uri in ["/generate-docx/", "/generate-responses-docx/"] {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app(fx.template.clone(), FlattenSource::Responses)
            .oneshot(req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let err: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(err, json!({"error": "Invalid request method"}));
    }
}

#[tokio::test]
async fn test_responses_docx_first_match_only() {
    let fx = fixture(&["%items%", "Copy: %items%"]);
    let body = json!({
        "responses": {
            "Main tasks": ["Mapping,Monitoring", "Aerial photography"],
            "Flight duration": "up to 30 min"
        },
        "ignored": "outside responses"
    });

    let (status, _, bytes) = post(
        app(fx.template.clone(), FlattenSource::Responses),
        "/generate-responses-docx/",
        &body.to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        paragraphs(&bytes),
        vec![
            "Main tasks: Mapping, Monitoring, Aerial photography\nFlight duration: up to 30 min",
            "Copy: %items%",
        ]
    );
}

#[tokio::test]
async fn test_responses_docx_whole_payload() {
    let fx = fixture(&["%items%"]);
    let body = json!({"fullName": "Ivanov", "products": ["a,b", "c"]});

    let (status, _, bytes) = post(
        app(fx.template.clone(), FlattenSource::WholePayload),
        "/generate-responses-docx/",
        &body.to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(paragraphs(&bytes), vec!["fullName: Ivanov\nproducts: a, b, c"]);
}

#[tokio::test]
async fn test_responses_docx_missing_responses() {
    let fx = fixture(&["Answers:", "%items%"]);
    let (status, _, bytes) = post(
        app(fx.template.clone(), FlattenSource::Responses),
        "/generate-responses-docx/",
        "{}",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(paragraphs(&bytes), vec!["Answers:", ""]);
}

#[tokio::test]
async fn test_generate_docx_rejects_non_object() {
    let fx = fixture(&["%items%"]);
    for body in [r#"["Title", [{"name": "A", "components": ["b"]}]]"#, "[]", "\"items\""] {
        let (status, _, bytes) = post(
            app(fx.template.clone(), FlattenSource::Responses),
            "/generate-docx/",
            body,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let err: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(err["error"], "request body must be a JSON object");
    }
}

#[tokio::test]
async fn test_responses_docx_rejects_non_object() {
    let fx = fixture(&["%items%"]);
    let (status, _, _) = post(
        app(fx.template.clone(), FlattenSource::Responses),
        "/generate-responses-docx/",
        "[1, 2]",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_template_without_placeholder_is_returned_as_is() {
    let fx = fixture(&["Nothing to fill"]);
    let (status, _, bytes) = post(
        app(fx.template.clone(), FlattenSource::Responses),
        "/generate-docx/",
        r#"{"items": [{"name": "A", "components": []}]}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(paragraphs(&bytes), vec!["Nothing to fill"]);
}

#[test]
fn test_bundled_template_has_placeholder() {
    let manifest_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    let base_dir = manifest_dir.parent().unwrap().parent().unwrap();
    let path = formdoc_docs::default_template(base_dir);
    let doc = Document::open(&path).unwrap();
    let paragraphs = doc.paragraphs().unwrap();
    assert_eq!(paragraphs.iter().filter(|p| p.contains("%items%")).count(), 1);
}
