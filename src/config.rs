use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::errors::{AppError, AppResult};

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";
pub const DEFAULT_PUBLIC_ROOT: &str = "wwwroot";
pub const IMAGES_DIR: &str = "images";
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: String,
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub public_root: PathBuf,
    pub page_size: i64,
    pub max_upload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            database_url: None,
            public_root: PathBuf::from(DEFAULT_PUBLIC_ROOT),
            page_size: DEFAULT_PAGE_SIZE,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_positive<T>(name: &str, raw: Option<String>, default: T) -> AppResult<T>
where
    T: FromStr + PartialOrd + Default,
{
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => Ok(value),
        _ => Err(AppError::Config(format!(
            "{} must be a positive integer, got {:?}",
            name, raw
        ))),
    }
}

impl AppConfig {
    /// Reads `.env` (if present) and the process environment.
    pub fn from_env() -> AppResult<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(var)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        Ok(Self {
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            database_url: lookup("DATABASE_URL"),
            public_root: lookup("PUBLIC_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PUBLIC_ROOT)),
            page_size: parse_positive("PAGE_SIZE", lookup("PAGE_SIZE"), DEFAULT_PAGE_SIZE)?,
            max_upload_bytes: parse_positive(
                "MAX_UPLOAD_BYTES",
                lookup("MAX_UPLOAD_BYTES"),
                DEFAULT_MAX_UPLOAD_BYTES,
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(config.database_url, None);
        assert_eq!(config.public_root, PathBuf::from("wwwroot"));
        assert_eq!(config.page_size, 10);
    }

    #[test]
    fn reads_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/employees"),
            ("PUBLIC_ROOT", "/srv/public"),
            ("PAGE_SIZE", "25"),
            ("MAX_UPLOAD_BYTES", "1024"),
        ]))
        .unwrap();
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/employees"));
        assert_eq!(config.public_root, PathBuf::from("/srv/public"));
        assert_eq!(config.page_size, 25);
        assert_eq!(config.max_upload_bytes, 1024);
    }

    #[test]
    fn rejects_non_positive_page_size() {
        for bad in ["0", "-1", "ten"] {
            let err = AppConfig::from_lookup(lookup(&[("PAGE_SIZE", bad)])).unwrap_err();
            assert!(matches!(err, AppError::Config(_)));
        }
    }
}
