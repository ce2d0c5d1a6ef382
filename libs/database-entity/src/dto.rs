use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use std::fmt::{Display, Formatter};

pub const FORBIDDEN_MESSAGE: &str = "Forbidden";

/// Identity of a simple content slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentKey {
  pub namespace: String,
  pub locale: String,
  pub name: String,
}

impl ContentKey {
  pub fn new(
    namespace: impl Into<String>,
    locale: impl Into<String>,
    name: impl Into<String>,
  ) -> Self {
    Self {
      namespace: namespace.into(),
      locale: locale.into(),
      name: name.into(),
    }
  }

  pub fn with_locale(&self, locale: &str) -> Self {
    Self {
      namespace: self.namespace.clone(),
      locale: locale.to_string(),
      name: self.name.clone(),
    }
  }
}

impl Display for ContentKey {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}/{}/{}", self.namespace, self.locale, self.name)
  }
}

/// One entry of the batch submitted by the editor. The `type` field selects the variant.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EditRequestItem {
  Simple(SimpleEditItem),
  Entity(EntityEditItem),
  EntitySpecific(EntityEditItem),
  #[serde(other)]
  Unknown,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimpleEditItem {
  #[serde(default)]
  pub namespace: Option<String>,
  #[serde(default)]
  pub locale: Option<String>,
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub content: Option<String>,
}

impl SimpleEditItem {
  /// Absent and `null` fields both fall back to an empty string.
  pub fn split(self) -> (ContentKey, String) {
    (
      ContentKey::new(
        self.namespace.unwrap_or_default(),
        self.locale.unwrap_or_default(),
        self.name.unwrap_or_default(),
      ),
      self.content.unwrap_or_default(),
    )
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntityEditItem {
  #[serde(default)]
  pub entity: Option<String>,
  #[serde(default)]
  pub id: Option<EntityId>,
  #[serde(default)]
  pub property: Option<String>,
  #[serde(default)]
  pub content: Option<String>,
}

impl EntityEditItem {
  /// Returns `None` when any of entity, id, property or content is missing.
  pub fn into_element(self) -> Option<EntityElement> {
    Some(EntityElement {
      entity_type: self.entity?,
      id: self.id?.to_string(),
      property: self.property?,
      value: self.content?,
    })
  }
}

/// Editors send numeric ids for most tables but some entities are keyed by strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
  Number(i64),
  Text(String),
}

impl Display for EntityId {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      EntityId::Number(id) => write!(f, "{}", id),
      EntityId::Text(id) => f.write_str(id),
    }
  }
}

/// A single queued field update on an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityElement {
  pub entity_type: String,
  pub id: String,
  pub property: String,
  pub value: String,
}

#[derive(Eq, PartialEq, Copy, Debug, Clone, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum EditStatus {
  Ok = 0,
  Invalid = 1,
  Forbidden = 2,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditResult {
  pub status: EditStatus,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
}

impl EditResult {
  pub fn ok() -> Self {
    Self {
      status: EditStatus::Ok,
      message: None,
    }
  }

  pub fn forbidden() -> Self {
    Self::rejected(FORBIDDEN_MESSAGE)
  }

  pub fn rejected(message: impl Into<String>) -> Self {
    Self {
      status: EditStatus::Forbidden,
      message: Some(message.into()),
    }
  }

  pub fn invalid(message: impl Into<String>) -> Self {
    Self {
      status: EditStatus::Invalid,
      message: Some(message.into()),
    }
  }

  pub fn is_ok(&self) -> bool {
    self.status == EditStatus::Ok
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryContentParams {
  #[serde(default)]
  pub namespace: String,
  #[serde(default)]
  pub locale: String,
  pub name: String,
}

impl From<QueryContentParams> for ContentKey {
  fn from(params: QueryContentParams) -> Self {
    ContentKey::new(params.namespace, params.locale, params.name)
  }
}

/// Query of the element route: the slot plus the tag wrapping its content.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryElementParams {
  pub tag: String,
  #[serde(default)]
  pub namespace: String,
  #[serde(default)]
  pub locale: String,
  pub name: String,
}

impl QueryElementParams {
  pub fn split(self) -> (String, ContentKey) {
    (
      self.tag,
      ContentKey::new(self.namespace, self.locale, self.name),
    )
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineContent {
  pub content: String,
  /// Editable data attributes, present only when the viewer may edit the slot.
  pub attributes: Option<String>,
}

/// Maps an editable entity type onto a database table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMapping {
  pub entity: String,
  pub table: String,
  #[serde(default = "default_id_column")]
  pub id_column: String,
  pub properties: Vec<String>,
}

fn default_id_column() -> String {
  "id".to_string()
}
