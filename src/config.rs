use std::net::SocketAddr;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Initial account created at startup when its username is not taken yet.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminSeed {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    pub admin: Option<AdminSeed>,
}

/// Upper bound for `JWT_TTL_MINUTES`: one week.
pub const MAX_JWT_TTL_MINUTES: i64 = 7 * 24 * 60;

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests don't touch the process env.
    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed = |key: &str, default: i64| -> anyhow::Result<i64> {
            match get(key) {
                Some(v) => v
                    .parse::<i64>()
                    .with_context(|| format!("{key} must be an integer, got {v:?}")),
                None => Ok(default),
            }
        };

        let database_url = get("DATABASE_URL").context("DATABASE_URL is not set")?;
        let db_max_connections = u32::try_from(parsed("DATABASE_MAX_CONNECTIONS", 10)?)
            .context("DATABASE_MAX_CONNECTIONS out of range")?;
        let port = u16::try_from(parsed("APP_PORT", 8080)?).context("APP_PORT out of range")?;
        let ttl_minutes = parsed("JWT_TTL_MINUTES", 60)?;
        if !(1..=MAX_JWT_TTL_MINUTES).contains(&ttl_minutes) {
            anyhow::bail!(
                "JWT_TTL_MINUTES must be between 1 and {MAX_JWT_TTL_MINUTES}, got {ttl_minutes}"
            );
        }
        let jwt = JwtConfig {
            secret: get("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: get("JWT_ISSUER").unwrap_or_else(|| "users-api".into()),
            audience: get("JWT_AUDIENCE").unwrap_or_else(|| "users-api-clients".into()),
            ttl_minutes,
        };

        let admin = match (get("ADMIN_USERNAME"), get("ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => {
                let username = username.trim().to_string();
                if username.is_empty() || password.is_empty() {
                    anyhow::bail!("ADMIN_USERNAME and ADMIN_PASSWORD must not be empty");
                }
                Some(AdminSeed { username, password })
            }
            (None, None) => None,
            _ => anyhow::bail!("ADMIN_USERNAME and ADMIN_PASSWORD must be set together"),
        };

        Ok(Self {
            database_url,
            db_max_connections,
            host: get("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            jwt,
            admin,
        })
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}
