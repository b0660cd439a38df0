//! Persisted settings in the `app_config` table.

use url::Url;

use crate::error::{Error, Result};
use crate::fetch::http::DEFAULT_BACKEND_URL;
use crate::storage::repository;
use crate::storage::Database;

pub const KEY_DOMAIN: &str = "domain";
pub const KEY_BACKEND_URL: &str = "backend_url";

pub const DEFAULT_DOMAIN: &str = "fr";

const KNOWN_KEYS: &[&str] = &[KEY_DOMAIN, KEY_BACKEND_URL];

fn check_key(key: &str) -> Result<()> {
    if KNOWN_KEYS.contains(&key) {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "unknown config key `{key}` (expected one of: {})",
            KNOWN_KEYS.join(", ")
        )))
    }
}

pub async fn get(db: &Database, key: &str) -> Result<Option<String>> {
    check_key(key)?;
    let key = key.to_string();
    let value = db
        .reader()
        .call(move |conn| repository::get_config(conn, &key))
        .await?;
    Ok(value)
}

pub async fn set(db: &Database, key: &str, value: &str) -> Result<()> {
    check_key(key)?;
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::Config(format!("value for `{key}` is empty")));
    }
    let value = match key {
        KEY_BACKEND_URL => {
            Url::parse(value)
                .map_err(|e| Error::Config(format!("invalid backend URL {value}: {e}")))?;
            value.to_string()
        }
        _ => value.to_lowercase(),
    };

    let key = key.to_string();
    db.writer()
        .call(move |conn| repository::set_config(conn, &key, &value))
        .await?;
    Ok(())
}

pub async fn list(db: &Database) -> Result<Vec<(String, String)>> {
    let entries = db.reader().call(|conn| repository::list_config(conn)).await?;
    Ok(entries)
}

/// Domain from the flag, else the stored setting, else the default.
pub async fn resolve_domain(db: &Database, flag: Option<&str>) -> Result<String> {
    if let Some(domain) = flag {
        return Ok(domain.to_string());
    }
    Ok(get(db, KEY_DOMAIN)
        .await?
        .unwrap_or_else(|| DEFAULT_DOMAIN.to_string()))
}

/// Backend URL from the stored setting, else the default.
pub async fn resolve_backend_url(db: &Database) -> Result<String> {
    Ok(get(db, KEY_BACKEND_URL)
        .await?
        .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string()))
}
