use rolegate_core::{UserId, Username};

use crate::{Role, User};

/// The authenticated identity behind a request.
///
/// Built from the *current* user record, not from token claims: the gate
/// sees the role stored in the repository at resolution time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub username: Username,
    pub role: Role,
}

impl Principal {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self::from_user(user)
    }
}
