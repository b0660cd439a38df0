use rusqlite::{params, Connection, OptionalExtension};

// ── Summary cache ──────────────────────────────────────────────────

/// The only slot the summary cache uses.
const CACHE_SLOT: i64 = 1;

/// Stored cache payload and the epoch-millisecond timestamp it was written at.
pub fn get_cached_summary(conn: &Connection) -> Result<Option<(String, i64)>, rusqlite::Error> {
    conn.query_row(
        "SELECT payload, cached_at FROM summary_cache WHERE slot = ?1",
        params![CACHE_SLOT],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()
}

pub fn put_cached_summary(
    conn: &Connection,
    payload: &str,
    cached_at: i64,
) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT OR REPLACE INTO summary_cache (slot, payload, cached_at)
         VALUES (?1, ?2, ?3)",
        params![CACHE_SLOT, payload, cached_at],
    )?;
    Ok(())
}

/// Remove the cached summary. Returns whether there was one.
pub fn delete_cached_summary(conn: &Connection) -> Result<bool, rusqlite::Error> {
    let n = conn.execute(
        "DELETE FROM summary_cache WHERE slot = ?1",
        params![CACHE_SLOT],
    )?;
    Ok(n > 0)
}

// ── Config ─────────────────────────────────────────────────────────

pub fn get_config(conn: &Connection, key: &str) -> Result<Option<String>, rusqlite::Error> {
    conn.query_row(
        "SELECT value FROM app_config WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
}

pub fn set_config(conn: &Connection, key: &str, value: &str) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT OR REPLACE INTO app_config (key, value, updated_at)
         VALUES (?1, ?2, datetime('now'))",
        params![key, value],
    )?;
    Ok(())
}

pub fn list_config(conn: &Connection) -> Result<Vec<(String, String)>, rusqlite::Error> {
    let mut stmt = conn.prepare("SELECT key, value FROM app_config ORDER BY key")?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    rows.collect()
}
