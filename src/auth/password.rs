use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

/// One-way salted password hashing, verified only through `verify`.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, plain: &str) -> anyhow::Result<String>;
    fn verify(&self, plain: &str, hash: &str) -> anyhow::Result<bool>;
}

/// Argon2id with the crate's default (fixed) cost parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plain: &str) -> anyhow::Result<String> {
        hash_password(plain)
    }

    fn verify(&self, plain: &str, hash: &str) -> anyhow::Result<bool> {
        verify_password(plain, hash)
    }
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Cheap salted hasher for tests; argon2 is too slow to run on every test write.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct TestHasher {
    salt: std::sync::atomic::AtomicU32,
    verifies: std::sync::atomic::AtomicU32,
}

#[cfg(test)]
impl TestHasher {
    pub fn verify_calls(&self) -> u32 {
        self.verifies.load(std::sync::atomic::Ordering::Relaxed)
    }
}

#[cfg(test)]
impl CredentialHasher for TestHasher {
    fn hash(&self, plain: &str) -> anyhow::Result<String> {
        let salt = self
            .salt
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let reversed: String = plain.chars().rev().collect();
        Ok(format!("test${salt}${reversed}"))
    }

    fn verify(&self, plain: &str, hash: &str) -> anyhow::Result<bool> {
        self.verifies
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let mut parts = hash.splitn(3, '$');
        match (parts.next(), parts.next(), parts.next()) {
            (Some("test"), Some(_), Some(reversed)) => {
                Ok(reversed.chars().rev().eq(plain.chars()))
            }
            _ => anyhow::bail!("malformed test hash"),
        }
    }
}
