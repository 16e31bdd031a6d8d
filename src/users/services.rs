use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::error::UserError;
use super::repo::UserRepository;
use super::repo_types::{NewUser, User, UserChanges, UserPatch};
use crate::auth::password::CredentialHasher;
use crate::config::AdminSeed;

// Verified against when a login names an unknown user, so both paths cost one verify.
const DUMMY_PASSWORD: &str = "unknown-user-dummy-password";

/// Stateless façade over the user repository. Every password is hashed before it
/// reaches the repository.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    hasher: Arc<dyn CredentialHasher>,
    dummy_hash: Arc<OnceCell<String>>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self {
            repo,
            hasher,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    // Hashing is CPU bound, keep it off the async workers.
    async fn hash(&self, plain: String) -> Result<String, UserError> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.hash(&plain))
            .await
            .map_err(|e| UserError::Hashing(e.to_string()))?
            .map_err(|e| UserError::Hashing(e.to_string()))
    }

    pub async fn create(&self, new: NewUser) -> Result<User, UserError> {
        let NewUser {
            username,
            password,
            email,
        } = new;
        let hash = self.hash(password).await?;
        let user = self
            .repo
            .insert(&username, &hash, email.as_deref())
            .await?;
        info!(user_id = user.id, username = %user.username, "user created");
        Ok(user)
    }

    pub async fn find_one(&self, id: i32) -> Result<User, UserError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    pub async fn find_all(&self) -> Result<Vec<User>, UserError> {
        Ok(self.repo.list().await?)
    }

    pub async fn update(&self, id: i32, changes: UserChanges) -> Result<User, UserError> {
        let password_hash = match changes.password {
            Some(plain) => Some(self.hash(plain).await?),
            None => None,
        };
        let patch = UserPatch {
            username: changes.username,
            is_active: changes.is_active,
            password_hash,
        };
        let user = self
            .repo
            .update(id, &patch)
            .await?
            .ok_or(UserError::NotFound(id))?;
        debug!(
            user_id = id,
            rehashed = patch.password_hash.is_some(),
            "user updated"
        );
        Ok(user)
    }

    /// Deleting an id that does not exist is `NotFound`, same as `find_one`.
    pub async fn remove(&self, id: i32) -> Result<(), UserError> {
        if !self.repo.delete(id).await? {
            return Err(UserError::NotFound(id));
        }
        info!(user_id = id, "user removed");
        Ok(())
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserError> {
        Ok(self.repo.find_by_username(username).await?)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        Ok(self.repo.find_by_email(email).await?)
    }

    async fn verify_hash(&self, plain: &str, hash: String) -> Result<bool, UserError> {
        let hasher = Arc::clone(&self.hasher);
        let plain = plain.to_string();
        tokio::task::spawn_blocking(move || hasher.verify(&plain, &hash))
            .await
            .map_err(|e| UserError::Hashing(e.to_string()))?
            .map_err(|e| UserError::Hashing(e.to_string()))
    }

    /// Checks `plain` against the stored hash with the hasher's own comparison.
    pub async fn verify_password(&self, user: &User, plain: &str) -> Result<bool, UserError> {
        self.verify_hash(plain, user.password_hash.clone()).await
    }

    /// Resolves a username/password pair to its user. Unknown usernames still pay for
    /// one verify against a dummy hash.
    pub async fn check_credentials(
        &self,
        username: &str,
        plain: &str,
    ) -> Result<Option<User>, UserError> {
        let Some(user) = self.repo.find_by_username(username).await? else {
            let dummy = self
                .dummy_hash
                .get_or_try_init(|| self.hash(DUMMY_PASSWORD.to_string()))
                .await?
                .clone();
            self.verify_hash(plain, dummy).await?;
            return Ok(None);
        };
        if self.verify_password(&user, plain).await? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Creates the configured initial account unless its username already exists.
    /// Returns the user when one was created.
    pub async fn seed_admin(&self, seed: &AdminSeed) -> Result<Option<User>, UserError> {
        if self.repo.find_by_username(&seed.username).await?.is_some() {
            debug!(username = %seed.username, "admin account already present");
            return Ok(None);
        }
        let user = self
            .create(NewUser {
                username: seed.username.clone(),
                password: seed.password.clone(),
                email: None,
            })
            .await?;
        info!(user_id = user.id, username = %user.username, "admin account seeded");
        Ok(Some(user))
    }
}
