use serde::{Deserialize, Deserializer, Serialize};

use rolegate_auth::{CreateUserInput, EmailAddress, Principal, Role, UserUpdate};
use rolegate_core::DomainError;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct TokenObtainRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenRefreshRequest {
    pub refresh: String,
}

/// Body of `POST /api/users`. A `role` field, if sent, is ignored: the role
/// is derived from `is_superuser` when the user is stored.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Body of `PATCH`/`PUT /api/users/:id`. Absent fields are left untouched;
/// `"email": null` or `"email": ""` clears the address.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default, deserialize_with = "present")]
    pub email: Option<Option<String>>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
}

fn default_true() -> bool {
    true
}

/// Distinguish an explicit `null` from an absent field.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl From<CreateUserRequest> for CreateUserInput {
    fn from(req: CreateUserRequest) -> Self {
        CreateUserInput {
            username: req.username,
            password: req.password,
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            is_superuser: req.is_superuser,
            is_active: req.is_active,
        }
    }
}

impl TryFrom<UpdateUserRequest> for UserUpdate {
    type Error = DomainError;

    fn try_from(req: UpdateUserRequest) -> Result<Self, Self::Error> {
        let email = match req.email {
            None => None,
            Some(None) => Some(None),
            Some(Some(raw)) if raw.trim().is_empty() => Some(None),
            Some(Some(raw)) => Some(Some(EmailAddress::parse(raw)?)),
        };
        Ok(UserUpdate {
            email,
            first_name: req.first_name,
            last_name: req.last_name,
            role: req.role,
            is_active: req.is_active,
            is_superuser: req.is_superuser,
        })
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct TokenRefreshResponse {
    pub access: String,
}

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl From<&Principal> for WhoAmIResponse {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.user_id.get(),
            username: principal.username.to_string(),
            role: principal.role,
        }
    }
}
