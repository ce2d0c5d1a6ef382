use crate::context::{
  EntityPermissionContext, GlobalPermissionContext, ItemPermissionContext, Viewer,
};
use crate::handler::PermissionHandlers;
use database::entity::InlineEntity;
use std::cell::Cell;
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionDecision {
  #[default]
  Unknown,
  Allowed,
  Denied,
}

impl PermissionDecision {
  pub fn is_allowed(&self) -> bool {
    matches!(self, PermissionDecision::Allowed)
  }
}

impl From<bool> for PermissionDecision {
  fn from(allowed: bool) -> Self {
    if allowed {
      PermissionDecision::Allowed
    } else {
      PermissionDecision::Denied
    }
  }
}

/// Decides whether the viewer may edit inline content.
///
/// 1. global editing is not allowed: nothing is editable.
/// 2. global editing is allowed: the item or entity chain decides. An empty chain allows.
///
/// One checker lives for one request. The global decision is computed on first use and
/// then reused for the lifetime of the checker.
pub struct PermissionChecker {
  handlers: Arc<PermissionHandlers>,
  viewer: Viewer,
  global: Cell<PermissionDecision>,
}

impl PermissionChecker {
  pub fn new(handlers: Arc<PermissionHandlers>, viewer: Viewer) -> Self {
    Self {
      handlers,
      viewer,
      global: Cell::new(PermissionDecision::Unknown),
    }
  }

  pub fn viewer(&self) -> &Viewer {
    &self.viewer
  }

  pub fn is_global_editation_allowed(&self) -> bool {
    if let PermissionDecision::Unknown = self.global.get() {
      let allowed = self.handlers.check_global(&GlobalPermissionContext {
        viewer: &self.viewer,
      });
      debug!(
        "global editation for {}: {}",
        self.viewer.display_name(),
        allowed
      );
      self.global.set(allowed.into());
    }
    self.global.get().is_allowed()
  }

  #[instrument(level = "trace", skip(self), ret)]
  pub fn is_item_editation_allowed(&self, namespace: &str, locale: &str, name: &str) -> bool {
    if !self.is_global_editation_allowed() {
      return false;
    }

    if !self.handlers.has_item_handlers() {
      return true;
    }

    self.handlers.check_item(&ItemPermissionContext {
      viewer: &self.viewer,
      namespace,
      locale,
      name,
    })
  }

  #[instrument(level = "trace", skip_all, fields(entity_type = entity.entity_type(), id = entity.id()), ret)]
  pub fn is_entity_editation_allowed(&self, entity: &dyn InlineEntity) -> bool {
    if !self.is_global_editation_allowed() {
      return false;
    }

    if !self.handlers.has_entity_handlers() {
      return true;
    }

    self.handlers.check_entity(&EntityPermissionContext {
      viewer: &self.viewer,
      entity,
    })
  }
}
