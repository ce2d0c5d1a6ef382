use database::entity::InlineEntity;
use serde::{Deserialize, Serialize};

/// The identity edit permissions are evaluated for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
  pub uid: Option<String>,
  pub roles: Vec<String>,
}

impl Viewer {
  pub fn anonymous() -> Self {
    Self::default()
  }

  pub fn new(uid: impl Into<String>, roles: Vec<String>) -> Self {
    Self {
      uid: Some(uid.into()),
      roles,
    }
  }

  pub fn is_anonymous(&self) -> bool {
    self.uid.is_none()
  }

  pub fn has_any_role(&self, roles: &[String]) -> bool {
    self.roles.iter().any(|role| roles.contains(role))
  }

  pub fn display_name(&self) -> &str {
    self.uid.as_deref().unwrap_or("anonymous")
  }
}

pub struct GlobalPermissionContext<'a> {
  pub viewer: &'a Viewer,
}

pub struct ItemPermissionContext<'a> {
  pub viewer: &'a Viewer,
  pub namespace: &'a str,
  pub locale: &'a str,
  pub name: &'a str,
}

pub struct EntityPermissionContext<'a> {
  pub viewer: &'a Viewer,
  pub entity: &'a dyn InlineEntity,
}
