//! Caller identity as seen by use cases.

use uuid::Uuid;

/// Who is performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub is_admin: bool,
}

impl Actor {
    /// Owners manage their own records; admins manage everything.
    pub fn can_manage(&self, owner_id: Uuid) -> bool {
        self.is_admin || self.user_id == owner_id
    }
}
