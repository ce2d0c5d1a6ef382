use crate::util::{editor, TestInline};
use actix_web::http::StatusCode;
use actix_web::test;
use assert_json_diff::assert_json_eq;
use database::content::ContentStore;
use database_entity::dto::ContentKey;
use serde_json::{json, Value};

#[actix_rt::test]
async fn editor_gets_content_with_attributes() {
  let inline = TestInline::new();
  inline
    .content_store
    .save(&ContentKey::new("home", "en", "title"), "<b>Hi</b>")
    .await
    .unwrap();
  let app = test::init_service(inline.app()).await;

  let req = test::TestRequest::get()
    .uri("/inline-editing/content?namespace=home&locale=en&name=title")
    .insert_header(editor())
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_json_eq!(
    body,
    json!({
      "content": "<b>Hi</b>",
      "attributes": " data-inline-name=\"title\" data-inline-namespace=\"home\" data-inline-locale=\"en\"",
    })
  );
}

#[actix_rt::test]
async fn anonymous_viewer_gets_content_only() {
  let inline = TestInline::new();
  let app = test::init_service(inline.app()).await;

  let req = test::TestRequest::get()
    .uri("/inline-editing/content?name=missing")
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_json_eq!(body, json!({ "content": "", "attributes": null }));
}

#[actix_rt::test]
async fn saved_content_is_served_back() {
  let inline = TestInline::new();
  let app = test::init_service(inline.app()).await;

  let payload = json!({
    "a": { "type": "simple", "namespace": "home", "locale": "en", "name": "title", "content": "Hello" },
  });
  let req = test::TestRequest::post()
    .uri("/inline-editing")
    .insert_header(editor())
    .set_payload(payload.to_string())
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let req = test::TestRequest::get()
    .uri("/inline-editing/content?namespace=home&locale=en&name=title")
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["content"], "Hello");
}

#[actix_rt::test]
async fn source_script_only_for_editors() {
  let inline = TestInline::new();
  let app = test::init_service(inline.app()).await;

  let req = test::TestRequest::get()
    .uri("/inline-editing/source")
    .insert_header(editor())
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(
    resp.headers().get("content-type").unwrap(),
    "text/html; charset=utf-8"
  );
  let body = test::read_body(resp).await;
  let script = std::str::from_utf8(&body).unwrap();
  assert!(script.contains(r#"src="/inline/inline.js""#));
  assert!(script.contains(r#"data-source-gateway-url="/inline-editing""#));

  let req = test::TestRequest::get()
    .uri("/inline-editing/source")
    .to_request();
  let body = test::call_and_read_body(&app, req).await;
  assert!(body.is_empty());
}

#[actix_rt::test]
async fn element_route_renders_editable_markup_for_editors() {
  let inline = TestInline::new();
  inline
    .content_store
    .save(&ContentKey::new("home", "en", "title"), "<b>Hi</b>")
    .await
    .unwrap();
  let app = test::init_service(inline.app()).await;

  let uri = "/inline-editing/element?tag=h1&namespace=home&locale=en&name=title";
  let req = test::TestRequest::get()
    .uri(uri)
    .insert_header(editor())
    .to_request();
  let body = test::call_and_read_body(&app, req).await;
  let html = std::str::from_utf8(&body).unwrap();
  assert!(html.starts_with(r#"<h1 data-inline-name="title" data-inline-namespace="home""#));
  assert!(html.ends_with("><b>Hi</b></h1>"));

  let req = test::TestRequest::get().uri(uri).to_request();
  let body = test::call_and_read_body(&app, req).await;
  assert_eq!(&body[..], b"<h1><b>Hi</b></h1>");

  let req = test::TestRequest::get()
    .uri("/inline-editing/element?tag=h1%20onclick&name=title")
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
