//! In-memory user repository for tests and single-process deployments.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use tracing::instrument;

use rolegate_auth::{NewUser, RepositoryError, User, UserRepository};
use rolegate_core::{UserId, Username};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    by_username: HashMap<Username, UserId>,
    last_id: i64,
}

/// User repository backed by process memory.
///
/// `create` checks the username index and inserts under one write lock, so
/// two concurrent creates for the same username cannot both succeed.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    inner: RwLock<Tables>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|t| t.users.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> RepositoryError {
    RepositoryError::unavailable("user table lock poisoned")
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &Username) -> Result<User, RepositoryError> {
        let tables = self.inner.read().map_err(|_| poisoned())?;
        tables
            .by_username
            .get(username)
            .and_then(|id| tables.users.get(id))
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn find_by_id(&self, id: UserId) -> Result<User, RepositoryError> {
        let tables = self.inner.read().map_err(|_| poisoned())?;
        tables.users.get(&id).cloned().ok_or(RepositoryError::NotFound)
    }

    #[instrument(skip(self, new_user), fields(username = %new_user.username))]
    async fn create(&self, new_user: NewUser) -> Result<User, RepositoryError> {
        let mut tables = self.inner.write().map_err(|_| poisoned())?;
        if tables.by_username.contains_key(&new_user.username) {
            return Err(RepositoryError::UniqueViolation("username"));
        }

        tables.last_id += 1;
        let id = UserId::new(tables.last_id);
        let user = new_user.into_user(id, Utc::now());
        tables.by_username.insert(user.username.clone(), id);
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepositoryError> {
        let mut tables = self.inner.write().map_err(|_| poisoned())?;
        let stored = tables.users.get_mut(&user.id).ok_or(RepositoryError::NotFound)?;

        stored.email = user.email;
        stored.first_name = user.first_name;
        stored.last_name = user.last_name;
        stored.credential = user.credential;
        stored.role = user.role;
        stored.is_superuser = user.is_superuser;
        stored.is_active = user.is_active;
        Ok(stored.clone())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        let mut tables = self.inner.write().map_err(|_| poisoned())?;
        let removed = tables.users.remove(&id).ok_or(RepositoryError::NotFound)?;
        tables.by_username.remove(&removed.username);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let tables = self.inner.read().map_err(|_| poisoned())?;
        Ok(tables.users.values().cloned().collect())
    }
}
