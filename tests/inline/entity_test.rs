use crate::util::{editor, TestInline};
use access_control::handler::PermissionHandlers;
use access_control::role::SimpleUserRoleChecker;
use actix_web::http::StatusCode;
use actix_web::test;
use assert_json_diff::assert_json_eq;
use inline_editing::config::config::InlineEditingSetting;
use serde_json::{json, Value};

fn article_item(id: Value, property: &str, content: &str) -> Value {
  json!({
    "type": "entity",
    "entity": "article",
    "id": id,
    "property": property,
    "content": content,
  })
}

#[actix_rt::test]
async fn entity_fields_are_saved_together() {
  let inline = TestInline::with_entities();
  let app = test::init_service(inline.app()).await;

  let payload = json!({
    "t": article_item(json!(1), "title", "Title"),
    "p": article_item(json!("1"), "perex", "Perex"),
  });
  let req = test::TestRequest::post()
    .uri("/inline-editing")
    .insert_header(editor())
    .set_payload(payload.to_string())
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_json_eq!(body, json!({ "t": { "status": 0 }, "p": { "status": 0 } }));

  assert_eq!(
    inline.entity_store.get_property("article", "1", "title"),
    Some("Title".to_string())
  );
  assert_eq!(
    inline.entity_store.get_property("article", "1", "perex"),
    Some("Perex".to_string())
  );
}

#[actix_rt::test]
async fn invalid_entity_wins_over_forbidden_item() {
  let mut handlers = PermissionHandlers::new();
  handlers.on_check_global(|ctx| Some(!ctx.viewer.is_anonymous()));
  handlers.on_check_item(|ctx| Some(ctx.namespace != "locked"));
  let setting = InlineEditingSetting {
    entity_mode: true,
    ..Default::default()
  };
  let inline = TestInline::with_handlers(setting, handlers);
  let app = test::init_service(inline.app()).await;

  // the entity item comes first, the forbidden simple item second
  let payload = json!({
    "e": article_item(json!(1), "author", "Me"),
    "s": { "type": "simple", "namespace": "locked", "locale": "en", "name": "x", "content": "y" },
  });
  let req = test::TestRequest::post()
    .uri("/inline-editing")
    .insert_header(editor())
    .set_payload(payload.to_string())
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["s"], json!({ "status": 2, "message": "Forbidden" }));
  assert_eq!(body["e"]["status"], 1);
  assert!(inline.content_store.is_empty());
}

#[actix_rt::test]
async fn missing_entity_is_invalid() {
  let inline = TestInline::with_entities();
  let app = test::init_service(inline.app()).await;

  let req = test::TestRequest::post()
    .uri("/inline-editing")
    .insert_header(editor())
    .set_payload(json!({ "a": article_item(json!(404), "title", "Ghost") }).to_string())
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_json_eq!(
    body,
    json!({ "a": { "status": 1, "message": "Entity article:404 not found" } })
  );
}

#[actix_rt::test]
async fn entity_handlers_reject_per_entity() {
  let mut handlers = PermissionHandlers::new();
  let ids = SimpleUserRoleChecker::new(vec!["editor".to_string()]).install(&mut handlers);
  // the role checker allows every entity, replace that handler with an id rule
  assert!(handlers.remove(ids[2]));
  handlers.on_check_entity(|ctx| Some(ctx.entity.id() == "2"));

  let setting = InlineEditingSetting {
    entity_mode: true,
    ..Default::default()
  };
  let inline = TestInline::with_handlers(setting, handlers);
  let app = test::init_service(inline.app()).await;

  let payload = json!({
    "a": article_item(json!(1), "title", "One"),
    "b": article_item(json!(2), "title", "Two"),
  });
  let req = test::TestRequest::post()
    .uri("/inline-editing")
    .insert_header(editor())
    .set_payload(payload.to_string())
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_json_eq!(
    body,
    json!({
      "a": { "status": 2, "message": "Forbidden" },
      "b": { "status": 0 },
    })
  );
  assert_eq!(inline.entity_store.get_property("article", "1", "title"), None);
  assert_eq!(
    inline.entity_store.get_property("article", "2", "title"),
    Some("Two".to_string())
  );
}

#[actix_rt::test]
async fn unknown_entity_type_is_a_configuration_error() {
  let inline = TestInline::with_entities();
  let app = test::init_service(inline.app()).await;

  let payload = json!({
    "a": { "type": "entity-specific", "entity": "comment", "id": 1, "property": "body", "content": "x" },
  });
  let req = test::TestRequest::post()
    .uri("/inline-editing")
    .insert_header(editor())
    .set_payload(payload.to_string())
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
