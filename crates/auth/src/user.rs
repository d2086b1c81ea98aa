//! User record: a flat principal with a single role attribute.
//!
//! Role assignment happens once, when a [`NewUser`] is first persisted. After
//! that the role only changes through an explicit [`UserUpdate`].

use chrono::{DateTime, Utc};

use rolegate_core::{EmailAddress, Entity, UserId, Username};

use crate::{Credential, Role};

// ─────────────────────────────────────────────────────────────────────────────
// User
// ─────────────────────────────────────────────────────────────────────────────

/// A persisted user.
///
/// # Invariants
/// - `id` and `username` never change after creation.
/// - Exactly one role at all times.
/// - `role` is never recomputed from `is_superuser`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: Option<EmailAddress>,
    pub first_name: String,
    pub last_name: String,
    pub credential: Credential,
    pub role: Role,
    pub is_superuser: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

impl User {
    pub fn has_usable_password(&self) -> bool {
        self.credential.is_usable()
    }

    pub fn check_password(&self, password: &str) -> bool {
        self.credential.verify(password)
    }

    /// Apply an administrative update.
    ///
    /// `is_superuser` is stored as given; the role is left alone unless the
    /// update names one explicitly.
    pub fn apply_update(&mut self, update: UserUpdate) {
        let UserUpdate {
            email,
            first_name,
            last_name,
            role,
            is_active,
            is_superuser,
        } = update;

        if let Some(email) = email {
            self.email = email;
        }
        if let Some(first_name) = first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = last_name {
            self.last_name = last_name;
        }
        if let Some(role) = role {
            self.role = role;
        }
        if let Some(is_active) = is_active {
            self.is_active = is_active;
        }
        if let Some(is_superuser) = is_superuser {
            self.is_superuser = is_superuser;
        }
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Creation
// ─────────────────────────────────────────────────────────────────────────────

/// A user that has not been persisted yet.
///
/// Carries no id and no role: the repository assigns the id, and the role is
/// derived from `is_superuser` at that moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: Username,
    pub email: Option<EmailAddress>,
    pub first_name: String,
    pub last_name: String,
    pub credential: Credential,
    pub is_superuser: bool,
    pub is_active: bool,
}

impl NewUser {
    /// Record for a user first seen through external authentication:
    /// no local password, not a superuser, active.
    pub fn external(username: Username) -> Self {
        Self {
            username,
            email: None,
            first_name: String::new(),
            last_name: String::new(),
            credential: Credential::Unusable,
            is_superuser: false,
            is_active: true,
        }
    }

    /// Role this user will get on first persistence.
    pub fn initial_role(&self) -> Role {
        Role::for_new_user(self.is_superuser)
    }

    /// Materialize the record once the repository has picked an id.
    pub fn into_user(self, id: UserId, date_joined: DateTime<Utc>) -> User {
        let role = self.initial_role();
        User {
            id,
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            credential: self.credential,
            role,
            is_superuser: self.is_superuser,
            is_active: self.is_active,
            date_joined,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Update
// ─────────────────────────────────────────────────────────────────────────────

/// Partial administrative update. `None` leaves a field untouched.
///
/// `email: Some(None)` clears the address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub email: Option<Option<EmailAddress>>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        *self == UserUpdate::default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
