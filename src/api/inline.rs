use crate::biz::inline::markup::{editable_attributes, render_element, source_script};
use crate::biz::inline::ops::{parse_batch, process_batch, BatchStatus};
use crate::component::auth::jwt::InlineViewer;
use crate::state::AppState;
use actix_web::http::StatusCode;
use app_error::AppError;
use actix_web::web::{Bytes, Data, Query};
use actix_web::{web, HttpResponse, Scope};
use database_entity::dto::{ContentKey, InlineContent, QueryContentParams, QueryElementParams};
use serde_json::json;
use tracing::warn;

pub fn inline_scope(path: &str) -> Scope {
  web::scope(path)
    .service(web::resource("").route(web::post().to(batch_update_handler)))
    .service(web::resource("/content").route(web::get().to(get_content_handler)))
    .service(web::resource("/element").route(web::get().to(render_element_handler)))
    .service(web::resource("/source").route(web::get().to(source_script_handler)))
}

#[tracing::instrument(skip_all, fields(viewer = %viewer.0.display_name()), err)]
async fn batch_update_handler(
  viewer: InlineViewer,
  body: Result<Bytes, actix_web::Error>,
  state: Data<AppState>,
) -> actix_web::Result<HttpResponse> {
  // an unreadable body, such as one over the payload limit, is treated like malformed json
  let batch = match body
    .map_err(|err| AppError::MalformedPayload(err.to_string()))
    .and_then(|body| parse_batch(&body))
  {
    Ok(batch) => batch,
    Err(err) => {
      warn!("reject inline batch: {}", err);
      return Ok(HttpResponse::InternalServerError().json(json!({})));
    },
  };

  let checker = state.permission_checker(viewer.into_inner());
  let outcome = process_batch(
    batch,
    &checker,
    &state.content_provider,
    state.entity_persister(),
  )
  .await?;

  let status = match outcome.status {
    BatchStatus::Ok => StatusCode::OK,
    BatchStatus::Forbidden => StatusCode::FORBIDDEN,
    BatchStatus::Invalid => StatusCode::BAD_REQUEST,
  };
  Ok(HttpResponse::build(status).json(outcome.payload))
}

#[tracing::instrument(skip_all, err)]
async fn get_content_handler(
  viewer: InlineViewer,
  query: Query<QueryContentParams>,
  state: Data<AppState>,
) -> actix_web::Result<HttpResponse> {
  let key = ContentKey::from(query.into_inner());
  let checker = state.permission_checker(viewer.into_inner());
  let content = state.content_provider.get_content(&key).await?;
  let attributes = editable_attributes(&checker, &key)?;
  Ok(HttpResponse::Ok().json(InlineContent {
    content,
    attributes,
  }))
}

#[tracing::instrument(skip_all, err)]
async fn render_element_handler(
  viewer: InlineViewer,
  query: Query<QueryElementParams>,
  state: Data<AppState>,
) -> actix_web::Result<HttpResponse> {
  let (tag, key) = query.into_inner().split();
  let checker = state.permission_checker(viewer.into_inner());
  let html = render_element(&tag, &key, &checker, &state.content_provider).await?;
  Ok(
    HttpResponse::Ok()
      .content_type("text/html; charset=utf-8")
      .body(html),
  )
}

async fn source_script_handler(
  viewer: InlineViewer,
  state: Data<AppState>,
) -> actix_web::Result<HttpResponse> {
  let checker = state.permission_checker(viewer.into_inner());
  let script = source_script(&checker, &state.config.inline)?;
  Ok(
    HttpResponse::Ok()
      .content_type("text/html; charset=utf-8")
      .body(script.unwrap_or_default()),
  )
}
