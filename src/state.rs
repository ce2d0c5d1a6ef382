use crate::biz::inline::content::ContentProvider;
use crate::biz::inline::entity::EntityPersister;
use crate::config::config::Config;
use access_control::checker::PermissionChecker;
use access_control::context::Viewer;
use access_control::handler::PermissionHandlers;
use database::content::ContentStore;
use database::entity::EntityStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub config: Arc<Config>,
  pub permission_handlers: Arc<PermissionHandlers>,
  pub content_provider: Arc<ContentProvider>,
  /// Present only when entity mode is enabled.
  pub entity_store: Option<Arc<dyn EntityStore>>,
}

impl AppState {
  pub fn new(
    config: Config,
    permission_handlers: PermissionHandlers,
    content_store: Arc<dyn ContentStore>,
    entity_store: Option<Arc<dyn EntityStore>>,
  ) -> Self {
    let content_provider = ContentProvider::new(content_store, config.inline.fallback_locale.clone());
    let entity_store = entity_store.filter(|_| config.inline.entity_mode);
    Self {
      config: Arc::new(config),
      permission_handlers: Arc::new(permission_handlers),
      content_provider: Arc::new(content_provider),
      entity_store,
    }
  }

  /// A fresh checker for one request.
  pub fn permission_checker(&self, viewer: Viewer) -> PermissionChecker {
    PermissionChecker::new(self.permission_handlers.clone(), viewer)
  }

  pub fn entity_persister(&self) -> Option<EntityPersister> {
    self
      .entity_store
      .as_ref()
      .map(|store| EntityPersister::new(store.clone()))
  }
}
