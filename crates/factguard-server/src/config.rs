use std::path::PathBuf;

use anyhow::{Context, bail};
use factguard_api::Settings;
use factguard_api::settings::{DEFAULT_HASH_ITERATIONS, DEFAULT_HASH_MEMORY_KIB};
use factguard_db::identifier::{DEFAULT_DIGITS, DEFAULT_MAX_ATTEMPTS};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "your_jwt_secret",
];

#[derive(Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub settings: Settings,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let jwt_secret = var("FACTGUARD_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("FACTGUARD_JWT_SECRET is unset or still a placeholder");
        }

        let mut settings = Settings::new(jwt_secret);
        settings.admin_emails = var("FACTGUARD_ADMIN_EMAILS")
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|e| !e.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        settings.identifier_digits = parse_or(&var, "FACTGUARD_ID_DIGITS", DEFAULT_DIGITS)?;
        settings.identifier_attempts =
            parse_or(&var, "FACTGUARD_ID_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?;
        settings.hash_memory_kib =
            parse_or(&var, "FACTGUARD_HASH_MEMORY_KIB", DEFAULT_HASH_MEMORY_KIB)?;
        settings.hash_iterations =
            parse_or(&var, "FACTGUARD_HASH_ITERATIONS", DEFAULT_HASH_ITERATIONS)?;

        Ok(Self {
            host: var("FACTGUARD_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&var, "FACTGUARD_PORT", 5001)?,
            db_path: var("FACTGUARD_DB_PATH")
                .unwrap_or_else(|| "factguard.db".into())
                .into(),
            settings,
        })
    }
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}
