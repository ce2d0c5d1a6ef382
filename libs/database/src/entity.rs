use crate::identifier::{quote_identifier, validate_identifier};
use crate::DatabaseResult;
use app_error::AppError;
use async_trait::async_trait;
use database_entity::dto::EntityMapping;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use std::collections::HashMap;
use std::fmt::Debug;
use tracing::{debug, trace};

/// A domain object whose fields can be edited in place.
pub trait InlineEntity: Debug + Send + Sync {
  fn entity_type(&self) -> &str;

  fn id(&self) -> &str;

  /// Returns `None` for unknown properties and for properties without a value.
  fn property(&self, name: &str) -> Option<&str>;

  fn set_property(&mut self, name: &str, value: String) -> Result<(), AppError>;

  /// Properties modified through [InlineEntity::set_property], in modification order.
  fn changed_properties(&self) -> Vec<&str>;
}

/// Storage of editable entities.
#[async_trait]
pub trait EntityStore: Send + Sync + 'static {
  fn has_entity_type(&self, entity_type: &str) -> bool;

  async fn find(
    &self,
    entity_type: &str,
    id: &str,
  ) -> DatabaseResult<Option<Box<dyn InlineEntity>>>;

  /// Write back the changed properties of the entity.
  async fn persist(&self, entity: &dyn InlineEntity) -> DatabaseResult<()>;
}

/// An entity loaded as a flat map of text columns. Only properties present in the map are writable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapEntity {
  entity_type: String,
  id: String,
  properties: HashMap<String, Option<String>>,
  changed: Vec<String>,
}

impl MapEntity {
  pub fn new(
    entity_type: impl Into<String>,
    id: impl Into<String>,
    properties: HashMap<String, Option<String>>,
  ) -> Self {
    Self {
      entity_type: entity_type.into(),
      id: id.into(),
      properties,
      changed: vec![],
    }
  }
}

impl InlineEntity for MapEntity {
  fn entity_type(&self) -> &str {
    &self.entity_type
  }

  fn id(&self) -> &str {
    &self.id
  }

  fn property(&self, name: &str) -> Option<&str> {
    self.properties.get(name).and_then(|value| value.as_deref())
  }

  fn set_property(&mut self, name: &str, value: String) -> Result<(), AppError> {
    match self.properties.get_mut(name) {
      None => Err(AppError::InvalidProperty(format!(
        "{} has no editable property {}",
        self.entity_type, name
      ))),
      Some(slot) => {
        *slot = Some(value);
        if !self.changed.iter().any(|changed| changed == name) {
          self.changed.push(name.to_string());
        }
        Ok(())
      },
    }
  }

  fn changed_properties(&self) -> Vec<&str> {
    self.changed.iter().map(String::as_str).collect()
  }
}

/// Entities stored in Postgres tables described by [EntityMapping]s.
pub struct PgEntityStore {
  pg_pool: PgPool,
  mappings: HashMap<String, EntityMapping>,
}

impl PgEntityStore {
  pub fn new(pg_pool: PgPool, mappings: Vec<EntityMapping>) -> Result<Self, AppError> {
    let mut by_entity = HashMap::with_capacity(mappings.len());
    for mapping in mappings {
      validate_mapping(&mapping)?;
      by_entity.insert(mapping.entity.clone(), mapping);
    }
    Ok(Self {
      pg_pool,
      mappings: by_entity,
    })
  }

  fn mapping(&self, entity_type: &str) -> Result<&EntityMapping, AppError> {
    self.mappings.get(entity_type).ok_or_else(|| {
      AppError::Configuration(format!("entity type {} is not mapped", entity_type))
    })
  }
}

pub fn validate_mapping(mapping: &EntityMapping) -> Result<(), AppError> {
  if mapping.properties.is_empty() {
    return Err(AppError::Configuration(format!(
      "entity type {} does not declare any editable property",
      mapping.entity
    )));
  }
  validate_identifier(&mapping.table)?;
  validate_identifier(&mapping.id_column)?;
  for property in &mapping.properties {
    validate_identifier(property)?;
  }
  Ok(())
}

#[async_trait]
impl EntityStore for PgEntityStore {
  fn has_entity_type(&self, entity_type: &str) -> bool {
    self.mappings.contains_key(entity_type)
  }

  async fn find(
    &self,
    entity_type: &str,
    id: &str,
  ) -> DatabaseResult<Option<Box<dyn InlineEntity>>> {
    let mapping = self.mapping(entity_type)?;
    let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT ");
    {
      let mut columns = query_builder.separated(", ");
      for property in &mapping.properties {
        let column = quote_identifier(property);
        columns.push(format!("{}::text AS {}", column, column));
      }
    }
    query_builder.push(" FROM ");
    query_builder.push(quote_identifier(&mapping.table));
    query_builder.push(" WHERE ");
    query_builder.push(quote_identifier(&mapping.id_column));
    query_builder.push("::text = ");
    query_builder.push_bind(id);

    let row = query_builder
      .build()
      .fetch_optional(&self.pg_pool)
      .await?;
    let row = match row {
      None => {
        debug!("entity {}:{} not found", entity_type, id);
        return Ok(None);
      },
      Some(row) => row,
    };

    let mut properties = HashMap::with_capacity(mapping.properties.len());
    for property in &mapping.properties {
      let value: Option<String> = row.try_get(property.as_str())?;
      properties.insert(property.clone(), value);
    }
    Ok(Some(Box::new(MapEntity::new(entity_type, id, properties))))
  }

  async fn persist(&self, entity: &dyn InlineEntity) -> DatabaseResult<()> {
    let mapping = self.mapping(entity.entity_type())?;
    let changed = entity.changed_properties();
    if changed.is_empty() {
      return Ok(());
    }

    let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE ");
    query_builder.push(quote_identifier(&mapping.table));
    query_builder.push(" SET ");
    {
      let mut assignments = query_builder.separated(", ");
      for property in &changed {
        if !mapping.properties.iter().any(|p| p == property) {
          return Err(AppError::InvalidProperty(format!(
            "{} has no editable property {}",
            mapping.entity, property
          )));
        }
        assignments.push(format!("{} = ", quote_identifier(property)));
        assignments.push_bind_unseparated(entity.property(property).map(ToOwned::to_owned));
      }
    }
    query_builder.push(" WHERE ");
    query_builder.push(quote_identifier(&mapping.id_column));
    query_builder.push("::text = ");
    query_builder.push_bind(entity.id().to_string());

    let result = query_builder.build().execute(&self.pg_pool).await?;
    if result.rows_affected() == 0 {
      return Err(AppError::RecordNotFound(format!(
        "{}:{}",
        entity.entity_type(),
        entity.id()
      )));
    }
    trace!(
      "persisted {}:{} properties: {:?}",
      entity.entity_type(),
      entity.id(),
      changed
    );
    Ok(())
  }
}
