use crate::content::ContentStore;
use crate::entity::{EntityStore, InlineEntity, MapEntity};
use crate::DatabaseResult;
use app_error::AppError;
use async_trait::async_trait;
use dashmap::DashMap;
use database_entity::dto::ContentKey;
use std::collections::HashMap;

/// Process-local [ContentStore]. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryContentStore {
  contents: DashMap<ContentKey, String>,
}

impl MemoryContentStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.contents.len()
  }

  pub fn is_empty(&self) -> bool {
    self.contents.is_empty()
  }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
  async fn save(&self, key: &ContentKey, content: &str) -> DatabaseResult<()> {
    self.contents.insert(key.clone(), content.to_string());
    Ok(())
  }

  async fn get(&self, key: &ContentKey) -> DatabaseResult<Option<String>> {
    Ok(self.contents.get(key).map(|entry| entry.value().clone()))
  }
}

/// Process-local [EntityStore]. Entity types must be registered with their editable properties.
#[derive(Default)]
pub struct MemoryEntityStore {
  types: HashMap<String, Vec<String>>,
  entities: DashMap<(String, String), HashMap<String, Option<String>>>,
}

impl MemoryEntityStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_type(mut self, entity_type: &str, properties: &[&str]) -> Self {
    self.types.insert(
      entity_type.to_string(),
      properties.iter().map(|p| p.to_string()).collect(),
    );
    self
  }

  /// Insert an entity with empty editable properties. Fails for unregistered types.
  pub fn insert(&self, entity_type: &str, id: &str) -> Result<(), AppError> {
    let properties = self.types.get(entity_type).ok_or_else(|| {
      AppError::Configuration(format!("entity type {} is not registered", entity_type))
    })?;
    self.entities.insert(
      (entity_type.to_string(), id.to_string()),
      properties.iter().map(|p| (p.clone(), None)).collect(),
    );
    Ok(())
  }

  pub fn get_property(&self, entity_type: &str, id: &str, property: &str) -> Option<String> {
    self
      .entities
      .get(&(entity_type.to_string(), id.to_string()))
      .and_then(|entry| entry.value().get(property).cloned().flatten())
  }
}

#[async_trait]
impl EntityStore for MemoryEntityStore {
  fn has_entity_type(&self, entity_type: &str) -> bool {
    self.types.contains_key(entity_type)
  }

  async fn find(
    &self,
    entity_type: &str,
    id: &str,
  ) -> DatabaseResult<Option<Box<dyn InlineEntity>>> {
    let entity = self
      .entities
      .get(&(entity_type.to_string(), id.to_string()))
      .map(|entry| MapEntity::new(entity_type, id, entry.value().clone()));
    Ok(entity.map(|entity| Box::new(entity) as Box<dyn InlineEntity>))
  }

  async fn persist(&self, entity: &dyn InlineEntity) -> DatabaseResult<()> {
    let key = (entity.entity_type().to_string(), entity.id().to_string());
    let mut stored = self
      .entities
      .get_mut(&key)
      .ok_or_else(|| AppError::RecordNotFound(format!("{}:{}", key.0, key.1)))?;
    for property in entity.changed_properties() {
      stored.insert(
        property.to_string(),
        entity.property(property).map(ToOwned::to_owned),
      );
    }
    Ok(())
  }
}
