use crate::context::{EntityPermissionContext, GlobalPermissionContext, ItemPermissionContext};
use std::fmt::{Display, Formatter};
use tracing::trace;

/// Handle returned on registration, used to remove the handler again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

impl Display for HandlerId {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "permission-handler-{}", self.0)
  }
}

pub type GlobalPermissionHandler =
  Box<dyn Fn(&GlobalPermissionContext<'_>) -> Option<bool> + Send + Sync>;
pub type ItemPermissionHandler =
  Box<dyn Fn(&ItemPermissionContext<'_>) -> Option<bool> + Send + Sync>;
pub type EntityPermissionHandler =
  Box<dyn Fn(&EntityPermissionContext<'_>) -> Option<bool> + Send + Sync>;

struct HandlerChain<H> {
  handlers: Vec<(HandlerId, H)>,
}

impl<H> Default for HandlerChain<H> {
  fn default() -> Self {
    Self { handlers: vec![] }
  }
}

impl<H> HandlerChain<H> {
  fn push(&mut self, id: HandlerId, handler: H) {
    self.handlers.push((id, handler));
  }

  fn remove(&mut self, id: HandlerId) -> bool {
    let before = self.handlers.len();
    self.handlers.retain(|(handler_id, _)| *handler_id != id);
    self.handlers.len() < before
  }

  fn is_empty(&self) -> bool {
    self.handlers.is_empty()
  }

  /// Runs handlers in registration order and stops at the first explicit allow.
  /// `Some(false)` does not veto: a later handler may still allow.
  fn allows(&self, check: impl Fn(&H) -> Option<bool>) -> bool {
    for (id, handler) in &self.handlers {
      match check(handler) {
        Some(true) => {
          trace!("{} allowed", id);
          return true;
        },
        Some(false) => trace!("{} denied", id),
        None => {},
      }
    }
    false
  }
}

/// Ordered permission handler chains, one per check level.
///
/// Built once when the application starts and shared by every request-scoped
/// [crate::checker::PermissionChecker].
#[derive(Default)]
pub struct PermissionHandlers {
  next_id: u64,
  global: HandlerChain<GlobalPermissionHandler>,
  item: HandlerChain<ItemPermissionHandler>,
  entity: HandlerChain<EntityPermissionHandler>,
}

impl PermissionHandlers {
  pub fn new() -> Self {
    Self::default()
  }

  fn next_handler_id(&mut self) -> HandlerId {
    self.next_id += 1;
    HandlerId(self.next_id)
  }

  pub fn on_check_global<F>(&mut self, handler: F) -> HandlerId
  where
    F: Fn(&GlobalPermissionContext<'_>) -> Option<bool> + Send + Sync + 'static,
  {
    let id = self.next_handler_id();
    self.global.push(id, Box::new(handler));
    id
  }

  pub fn on_check_item<F>(&mut self, handler: F) -> HandlerId
  where
    F: Fn(&ItemPermissionContext<'_>) -> Option<bool> + Send + Sync + 'static,
  {
    let id = self.next_handler_id();
    self.item.push(id, Box::new(handler));
    id
  }

  pub fn on_check_entity<F>(&mut self, handler: F) -> HandlerId
  where
    F: Fn(&EntityPermissionContext<'_>) -> Option<bool> + Send + Sync + 'static,
  {
    let id = self.next_handler_id();
    self.entity.push(id, Box::new(handler));
    id
  }

  /// Returns `true` if the handler was registered.
  pub fn remove(&mut self, id: HandlerId) -> bool {
    self.global.remove(id) || self.item.remove(id) || self.entity.remove(id)
  }

  pub fn has_item_handlers(&self) -> bool {
    !self.item.is_empty()
  }

  pub fn has_entity_handlers(&self) -> bool {
    !self.entity.is_empty()
  }

  pub(crate) fn check_global(&self, ctx: &GlobalPermissionContext<'_>) -> bool {
    self.global.allows(|handler| handler(ctx))
  }

  pub(crate) fn check_item(&self, ctx: &ItemPermissionContext<'_>) -> bool {
    self.item.allows(|handler| handler(ctx))
  }

  pub(crate) fn check_entity(&self, ctx: &EntityPermissionContext<'_>) -> bool {
    self.entity.allows(|handler| handler(ctx))
  }
}
