use crate::util::{bearer, editor, editor_handlers, TestInline};
use access_control::handler::PermissionHandlers;
use actix_web::http::StatusCode;
use actix_web::test;
use assert_json_diff::{assert_json_eq, assert_json_include};
use database::content::ContentStore;
use database_entity::dto::ContentKey;
use inline_editing::config::config::InlineEditingSetting;
use serde_json::{json, Value};

fn title_item(content: &str) -> Value {
  json!({
    "type": "simple",
    "namespace": "home",
    "locale": "en",
    "name": "title",
    "content": content,
  })
}

#[actix_rt::test]
async fn editor_saves_simple_item() {
  let inline = TestInline::new();
  let app = test::init_service(inline.app()).await;

  let req = test::TestRequest::post()
    .uri("/inline-editing")
    .insert_header(editor())
    .set_payload(json!({ "a": title_item("Hello") }).to_string())
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_json_eq!(body, json!({ "a": { "status": 0 } }));

  let saved = inline
    .content_store
    .get(&ContentKey::new("home", "en", "title"))
    .await
    .unwrap();
  assert_eq!(saved.as_deref(), Some("Hello"));
}

#[actix_rt::test]
async fn anonymous_viewer_is_forbidden() {
  let inline = TestInline::new();
  let app = test::init_service(inline.app()).await;

  let req = test::TestRequest::post()
    .uri("/inline-editing")
    .set_payload(json!({ "a": title_item("Hello") }).to_string())
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  let body: Value = test::read_body_json(resp).await;
  assert_json_eq!(
    body,
    json!({ "a": { "status": 2, "message": "Forbidden" } })
  );
  assert!(inline.content_store.is_empty());
}

#[actix_rt::test]
async fn viewer_without_allowed_role_is_forbidden() {
  let inline = TestInline::new();
  let app = test::init_service(inline.app()).await;

  let req = test::TestRequest::post()
    .uri("/inline-editing")
    .insert_header(("Authorization", bearer("7", &["reader"])))
    .set_payload(json!({ "a": title_item("Hello") }).to_string())
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  assert!(inline.content_store.is_empty());
}

#[actix_rt::test]
async fn invalid_token_is_treated_as_anonymous() {
  let inline = TestInline::new();
  let app = test::init_service(inline.app()).await;

  let req = test::TestRequest::post()
    .uri("/inline-editing")
    .insert_header(("Authorization", "Bearer not-a-token"))
    .set_payload(json!({ "a": title_item("Hello") }).to_string())
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn malformed_body_aborts_the_batch() {
  let inline = TestInline::new();
  let app = test::init_service(inline.app()).await;

  for payload in ["{\"a\":", "[1, 2]", ""] {
    let req = test::TestRequest::post()
      .uri("/inline-editing")
      .insert_header(editor())
      .set_payload(payload)
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_json_eq!(body, json!({}));
  }
  assert!(inline.content_store.is_empty());
}

#[actix_rt::test]
async fn denied_item_does_not_stop_the_batch() {
  let mut handlers = PermissionHandlers::new();
  handlers.on_check_global(|ctx| Some(!ctx.viewer.is_anonymous()));
  handlers.on_check_item(|ctx| Some(ctx.name != "footer"));

  let inline = TestInline::with_handlers(InlineEditingSetting::default(), handlers);
  let app = test::init_service(inline.app()).await;

  let payload = json!({
    "footer": { "type": "simple", "namespace": "home", "locale": "en", "name": "footer", "content": "x" },
    "title": title_item("Hello"),
  });
  let req = test::TestRequest::post()
    .uri("/inline-editing")
    .insert_header(editor())
    .set_payload(payload.to_string())
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  let body: Value = test::read_body_json(resp).await;
  assert_json_eq!(
    body,
    json!({
      "footer": { "status": 2, "message": "Forbidden" },
      "title": { "status": 0 },
    })
  );
  assert_eq!(inline.content_store.len(), 1);
}

#[actix_rt::test]
async fn missing_fields_default_to_empty_strings() {
  let inline = TestInline::new();
  let app = test::init_service(inline.app()).await;

  let req = test::TestRequest::post()
    .uri("/inline-editing")
    .insert_header(editor())
    .set_payload(json!({ "a": { "type": "simple", "name": "title", "content": null } }).to_string())
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let saved = inline
    .content_store
    .get(&ContentKey::new("", "", "title"))
    .await
    .unwrap();
  assert_eq!(saved.as_deref(), Some(""));
}

#[actix_rt::test]
async fn unknown_item_types_are_skipped() {
  let inline = TestInline::new();
  let app = test::init_service(inline.app()).await;

  let req = test::TestRequest::post()
    .uri("/inline-editing")
    .insert_header(editor())
    .set_payload(json!({ "a": { "type": "gallery" }, "c": title_item("Hi") }).to_string())
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_json_eq!(body, json!({ "c": { "status": 0 } }));
}

#[actix_rt::test]
async fn undecodable_items_are_reported_invalid() {
  let inline = TestInline::new();
  let app = test::init_service(inline.app()).await;

  let payload = json!({
    "a": { "type": "simple", "namespace": "home", "locale": "en", "name": "title", "content": 5 },
    "b": 42,
    "c": title_item("Hi"),
  });
  let req = test::TestRequest::post()
    .uri("/inline-editing")
    .insert_header(editor())
    .set_payload(payload.to_string())
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["a"]["status"], 1);
  assert!(body["a"]["message"]
    .as_str()
    .unwrap()
    .starts_with("Invalid item"));
  assert!(body.get("b").is_none());
  assert_json_eq!(body["c"], json!({ "status": 0 }));

  let saved = inline
    .content_store
    .get(&ContentKey::new("home", "en", "title"))
    .await
    .unwrap();
  assert_eq!(saved.as_deref(), Some("Hi"));
}

#[actix_rt::test]
async fn body_over_the_payload_limit_is_rejected_like_malformed_json() {
  let setting = InlineEditingSetting {
    payload_limit: 64,
    ..Default::default()
  };
  let inline = TestInline::with_handlers(setting, editor_handlers());
  let app = test::init_service(inline.app()).await;

  let req = test::TestRequest::post()
    .uri("/inline-editing")
    .insert_header(editor())
    .set_payload(json!({ "a": title_item(&"x".repeat(128)) }).to_string())
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
  let body: Value = test::read_body_json(resp).await;
  assert_json_eq!(body, json!({}));
  assert!(inline.content_store.is_empty());
}

#[actix_rt::test]
async fn entity_item_without_entity_mode_is_a_configuration_error() {
  let inline = TestInline::new();
  let app = test::init_service(inline.app()).await;

  let payload = json!({
    "a": { "type": "entity", "entity": "article", "id": 1, "property": "title", "content": "x" },
  });
  let req = test::TestRequest::post()
    .uri("/inline-editing")
    .insert_header(editor())
    .set_payload(payload.to_string())
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
  let body: Value = test::read_body_json(resp).await;
  assert_json_include!(actual: body, expected: json!({ "code": 1031 }));
  assert_eq!(inline.entity_store.get_property("article", "1", "title"), None);
}

#[actix_rt::test]
async fn request_id_is_echoed() {
  let inline = TestInline::new();
  let app = test::init_service(inline.app()).await;

  let req = test::TestRequest::post()
    .uri("/inline-editing")
    .insert_header(editor())
    .insert_header(("x-request-id", "req-1"))
    .set_payload("{}")
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(resp.headers().get("x-request-id").unwrap(), "req-1");
}
