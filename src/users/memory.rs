use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use super::repo::{UniqueViolation, UserRepository};
use super::repo_types::{User, UserPatch};

/// In-process stand-in for `PgUserRepository` with the same unique constraints.
#[derive(Default)]
pub struct InMemoryUserRepository {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: i32,
    rows: BTreeMap<i32, User>,
}

impl Inner {
    fn check_unique(&self, skip: Option<i32>, username: &str, email: Option<&str>) -> anyhow::Result<()> {
        for row in self.rows.values().filter(|r| Some(r.id) != skip) {
            if row.username == username {
                return Err(UniqueViolation { constraint: "users_username_key".into() }.into());
            }
            if email.is_some() && row.email.as_deref() == email {
                return Err(UniqueViolation { constraint: "users_email_key".into() }.into());
            }
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(
        &self,
        username: &str,
        password_hash: &str,
        email: Option<&str>,
    ) -> anyhow::Result<User> {
        let mut inner = self.inner.lock().unwrap();
        inner.check_unique(None, username, email)?;
        inner.next_id += 1;
        let user = User {
            id: inner.next_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            email: email.map(str::to_string),
            is_active: true,
            created_at: OffsetDateTime::now_utc(),
        };
        inner.rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<User>> {
        Ok(self.inner.lock().unwrap().rows.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.rows.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .rows
            .values()
            .find(|u| u.email.as_deref() == Some(email))
            .cloned())
    }

    async fn list(&self) -> anyhow::Result<Vec<User>> {
        Ok(self.inner.lock().unwrap().rows.values().cloned().collect())
    }

    async fn update(&self, id: i32, patch: &UserPatch) -> anyhow::Result<Option<User>> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.rows.contains_key(&id) {
            return Ok(None);
        }
        if let Some(username) = &patch.username {
            inner.check_unique(Some(id), username, None)?;
        }
        let Some(row) = inner.rows.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(username) = &patch.username {
            row.username = username.clone();
        }
        if let Some(is_active) = patch.is_active {
            row.is_active = is_active;
        }
        if let Some(hash) = &patch.password_hash {
            row.password_hash = hash.clone();
        }
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: i32) -> anyhow::Result<bool> {
        Ok(self.inner.lock().unwrap().rows.remove(&id).is_some())
    }
}
