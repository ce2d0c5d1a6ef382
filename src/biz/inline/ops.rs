use crate::biz::inline::content::ContentProvider;
use crate::biz::inline::entity::EntityPersister;
use access_control::checker::PermissionChecker;
use app_error::AppError;
use database_entity::dto::{
  EditRequestItem, EditResult, EntityEditItem, SimpleEditItem, FORBIDDEN_MESSAGE,
};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

/// Overall outcome of a batch. Variants are ordered by precedence: a later
/// variant always replaces an earlier one, whatever order the items came in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum BatchStatus {
  #[default]
  Ok,
  /// At least one simple item was denied.
  Forbidden,
  /// An item could not be decoded or the entity flush rejected an update.
  Invalid,
}

impl BatchStatus {
  fn escalate(&mut self, status: BatchStatus) {
    if status > *self {
      *self = status;
    }
  }
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
  pub status: BatchStatus,
  pub payload: IndexMap<String, EditResult>,
}

/// Decode a raw batch body. The body must be a JSON object; key order is preserved.
pub fn parse_batch(body: &[u8]) -> Result<IndexMap<String, Value>, AppError> {
  let value: Value =
    serde_json::from_slice(body).map_err(|err| AppError::MalformedPayload(err.to_string()))?;
  match value {
    Value::Object(map) => Ok(map.into_iter().collect()),
    other => Err(AppError::MalformedPayload(format!(
      "expected a json object, got {}",
      json_kind(&other)
    ))),
  }
}

fn json_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

/// Apply a decoded batch.
///
/// Simple items are authorized and saved one by one; a denial is recorded and
/// processing continues. Entity items are queued on the persister and flushed
/// after all items were seen. Values without a string `type` are skipped; a typed
/// item that does not decode, e.g. a non-string `content`, is answered with an
/// invalid result and is not applied.
#[instrument(level = "debug", skip_all, fields(items = batch.len()))]
pub async fn process_batch(
  batch: IndexMap<String, Value>,
  checker: &PermissionChecker,
  content_provider: &ContentProvider,
  mut entity_persister: Option<EntityPersister>,
) -> Result<BatchOutcome, AppError> {
  let mut outcome = BatchOutcome::default();

  for (element_key, value) in batch {
    if value.get("type").and_then(Value::as_str).is_none() {
      warn!("skip inline item {} without a type", element_key);
      continue;
    }
    let item = match serde_json::from_value::<EditRequestItem>(value) {
      Ok(item) => item,
      Err(err) => {
        warn!("reject inline item {}: {}", element_key, err);
        outcome.status.escalate(BatchStatus::Invalid);
        outcome
          .payload
          .insert(element_key, EditResult::invalid(format!("Invalid item: {}", err)));
        continue;
      },
    };

    match item {
      EditRequestItem::Simple(item) => {
        let result = process_simple(item, checker, content_provider).await?;
        if !result.is_ok() {
          outcome.status.escalate(BatchStatus::Forbidden);
        }
        outcome.payload.insert(element_key, result);
      },
      EditRequestItem::Entity(item) | EditRequestItem::EntitySpecific(item) => {
        process_entity(element_key, item, entity_persister.as_mut())?;
      },
      EditRequestItem::Unknown => {
        debug!("skip inline item {} of unknown type", element_key);
      },
    }
  }

  if let Some(entity_persister) = entity_persister {
    let flush = entity_persister
      .flush(|entity| {
        if checker.is_entity_editation_allowed(entity) {
          Ok(())
        } else {
          Err(FORBIDDEN_MESSAGE.to_string())
        }
      })
      .await?;
    outcome.payload.extend(flush.responses);
    if !flush.is_valid {
      outcome.status.escalate(BatchStatus::Invalid);
    }
  }

  Ok(outcome)
}

async fn process_simple(
  item: SimpleEditItem,
  checker: &PermissionChecker,
  content_provider: &ContentProvider,
) -> Result<EditResult, AppError> {
  let (key, content) = item.split();
  if !checker.is_item_editation_allowed(&key.namespace, &key.locale, &key.name) {
    info!(
      "{} is not allowed to edit {}",
      checker.viewer().display_name(),
      key
    );
    return Ok(EditResult::forbidden());
  }

  content_provider.save_content(&key, &content).await?;
  Ok(EditResult::ok())
}

fn process_entity(
  element_key: String,
  item: EntityEditItem,
  entity_persister: Option<&mut EntityPersister>,
) -> Result<(), AppError> {
  let entity_persister = entity_persister.ok_or_else(|| {
    AppError::Configuration(
      "entity mode is disabled, set INLINE_ENTITY_MODE=true to edit entities".to_string(),
    )
  })?;

  match item.into_element() {
    None => {
      debug!("skip incomplete entity item {}", element_key);
      Ok(())
    },
    Some(element) => entity_persister.queue(element_key, element),
  }
}
