use app_error::AppError;
use database::entity::{EntityStore, InlineEntity};
use database_entity::dto::{EditResult, EntityElement};
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, info};

const NOT_SAVED_MESSAGE: &str = "Entity was not saved";

struct QueuedUpdate {
  element_key: String,
  property: String,
  value: String,
}

/// Result of [EntityPersister::flush], keyed by the element keys the updates were queued with.
#[derive(Debug, Default)]
pub struct FlushOutcome {
  pub responses: IndexMap<String, EditResult>,
  pub is_valid: bool,
}

/// Collects entity field updates of one request and writes them per entity.
///
/// Updates are grouped by `(entity type, id)` in order of first appearance, so
/// editing several fields of one entity loads, authorizes and persists it once.
pub struct EntityPersister {
  store: Arc<dyn EntityStore>,
  pending: IndexMap<(String, String), Vec<QueuedUpdate>>,
}

impl EntityPersister {
  pub fn new(store: Arc<dyn EntityStore>) -> Self {
    Self {
      store,
      pending: IndexMap::new(),
    }
  }

  /// Queue a field update. An entity type the store does not know is a wiring error.
  pub fn queue(
    &mut self,
    element_key: impl Into<String>,
    element: EntityElement,
  ) -> Result<(), AppError> {
    if !self.store.has_entity_type(&element.entity_type) {
      return Err(AppError::Configuration(format!(
        "entity type {} doesn't exist",
        element.entity_type
      )));
    }

    self
      .pending
      .entry((element.entity_type, element.id))
      .or_default()
      .push(QueuedUpdate {
        element_key: element_key.into(),
        property: element.property,
        value: element.value,
      });
    Ok(())
  }

  /// Load, authorize and persist every queued entity.
  ///
  /// `authorize` runs once per entity and returns the rejection message when the
  /// entity may not be edited. Storage failures abort the flush.
  pub async fn flush<F>(self, authorize: F) -> Result<FlushOutcome, AppError>
  where
    F: Fn(&dyn InlineEntity) -> Result<(), String>,
  {
    let EntityPersister { store, pending } = self;
    let mut outcome = FlushOutcome {
      responses: IndexMap::with_capacity(pending.len()),
      is_valid: true,
    };

    for ((entity_type, id), updates) in pending {
      let results = match store.find(&entity_type, &id).await? {
        None => {
          let message = format!("Entity {}:{} not found", entity_type, id);
          debug!("{}", message);
          reject_all(updates, |_| EditResult::invalid(message.as_str()))
        },
        Some(entity) => match authorize(entity.as_ref()) {
          Err(message) => {
            info!("edit of {}:{} rejected: {}", entity_type, id, message);
            reject_all(updates, |_| EditResult::rejected(message.as_str()))
          },
          Ok(()) => apply_updates(store.as_ref(), entity, updates).await?,
        },
      };

      for (element_key, result) in results {
        if !result.is_ok() {
          outcome.is_valid = false;
        }
        outcome.responses.insert(element_key, result);
      }
    }
    Ok(outcome)
  }
}

fn reject_all(
  updates: Vec<QueuedUpdate>,
  result: impl Fn(&QueuedUpdate) -> EditResult,
) -> Vec<(String, EditResult)> {
  updates
    .into_iter()
    .map(|update| {
      let result = result(&update);
      (update.element_key, result)
    })
    .collect()
}

/// An entity is persisted only when all of its updates apply.
async fn apply_updates(
  store: &dyn EntityStore,
  mut entity: Box<dyn InlineEntity>,
  updates: Vec<QueuedUpdate>,
) -> Result<Vec<(String, EditResult)>, AppError> {
  let mut errors = Vec::with_capacity(updates.len());
  for update in updates {
    let error = entity
      .set_property(&update.property, update.value)
      .err()
      .map(|err| err.to_string());
    errors.push((update.element_key, error));
  }

  if errors.iter().all(|(_, error)| error.is_none()) {
    store.persist(entity.as_ref()).await?;
    return Ok(
      errors
        .into_iter()
        .map(|(element_key, _)| (element_key, EditResult::ok()))
        .collect(),
    );
  }

  debug!(
    "skip persisting {}:{}, some properties are invalid",
    entity.entity_type(),
    entity.id()
  );
  Ok(
    errors
      .into_iter()
      .map(|(element_key, error)| {
        let message = error.unwrap_or_else(|| NOT_SAVED_MESSAGE.to_string());
        (element_key, EditResult::invalid(message))
      })
      .collect(),
  )
}
