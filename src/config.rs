use anyhow::{bail, Context};

/// One year.
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;

        let secret = lookup("JWT_SECRET").context("JWT_SECRET must be set")?;
        if secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }

        let jwt = JwtConfig {
            secret,
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "userhub".into()),
            audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "userhub-users".into()),
            ttl_minutes: ttl_minutes(lookup("JWT_TTL_MINUTES"))?,
        };

        Ok(Self {
            database_url,
            max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: lookup("APP_PORT")
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(3000),
            jwt,
        })
    }
}

fn ttl_minutes(raw: Option<String>) -> anyhow::Result<i64> {
    let Some(ttl) = raw.and_then(|v| v.parse::<i64>().ok()).filter(|v| *v > 0) else {
        return Ok(60);
    };
    if ttl > MAX_TTL_MINUTES {
        bail!("JWT_TTL_MINUTES must be at most {MAX_TTL_MINUTES} (one year), got {ttl}");
    }
    Ok(ttl)
}
