use crate::handler::{HandlerId, PermissionHandlers};

/// Grants global editing to viewers holding one of the configured roles.
/// Once global editing is granted, every item and entity is editable.
#[derive(Debug, Clone)]
pub struct SimpleUserRoleChecker {
  roles: Vec<String>,
}

impl SimpleUserRoleChecker {
  pub fn new(roles: Vec<String>) -> Self {
    Self { roles }
  }

  pub fn install(self, handlers: &mut PermissionHandlers) -> Vec<HandlerId> {
    let roles = self.roles;
    vec![
      handlers.on_check_global(move |ctx| ctx.viewer.has_any_role(&roles).then_some(true)),
      handlers.on_check_item(|_| Some(true)),
      handlers.on_check_entity(|_| Some(true)),
    ]
  }
}
