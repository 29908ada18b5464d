use rusqlite::{params, Connection};

use crate::index::error::IndexError;

pub(crate) const SCHEMA_VERSION: &str = "1";

pub(crate) const COUNTER_PIXELS_PLACED: &str = "total_pixels_placed";
pub(crate) const COUNTER_SHARDS_DEPLOYED: &str = "total_shards_deployed";

/// Creates every table the index needs. Safe to run on every open.
pub(crate) fn migrate(conn: &Connection) -> Result<(), IndexError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS meta (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS counters (
          name TEXT PRIMARY KEY,
          value INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS actor_stats (
          actor TEXT PRIMARY KEY,
          pixels_placed_count INTEGER NOT NULL DEFAULT 0,
          shards_owned_count INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS pixel_history (
          seq INTEGER PRIMARY KEY AUTOINCREMENT,
          entry_id TEXT NOT NULL,
          event_index INTEGER NOT NULL,
          source TEXT NOT NULL,
          px INTEGER NOT NULL,
          py INTEGER NOT NULL,
          color INTEGER NOT NULL,
          painter TEXT NOT NULL,
          actor TEXT NOT NULL,
          timestamp INTEGER NOT NULL,
          UNIQUE (entry_id, event_index)
        );

        CREATE TABLE IF NOT EXISTS pixel_latest (
          px INTEGER NOT NULL,
          py INTEGER NOT NULL,
          color INTEGER NOT NULL,
          timestamp INTEGER NOT NULL,
          entry_id TEXT NOT NULL,
          event_index INTEGER NOT NULL,
          PRIMARY KEY (px, py)
        );

        CREATE TABLE IF NOT EXISTS shards (
          shard_x INTEGER NOT NULL,
          shard_y INTEGER NOT NULL,
          creator TEXT NOT NULL,
          actor TEXT NOT NULL,
          timestamp INTEGER NOT NULL,
          entry_id TEXT NOT NULL,
          source TEXT NOT NULL,
          PRIMARY KEY (shard_x, shard_y)
        );

        CREATE TABLE IF NOT EXISTS shard_canvas (
          shard_x INTEGER NOT NULL,
          shard_y INTEGER NOT NULL,
          pixels BLOB NOT NULL,
          PRIMARY KEY (shard_x, shard_y)
        );

        CREATE TABLE IF NOT EXISTS processed_entries (
          entry_id TEXT PRIMARY KEY,
          source TEXT NOT NULL,
          slot INTEGER NOT NULL,
          processed_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sync_cursors (
          source TEXT PRIMARY KEY,
          entry_id TEXT NOT NULL,
          slot INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_pixel_history_recent ON pixel_history(timestamp DESC, seq DESC);
        CREATE INDEX IF NOT EXISTS idx_pixel_history_pixel ON pixel_history(px, py, seq DESC);
        CREATE INDEX IF NOT EXISTS idx_shards_recent ON shards(timestamp DESC);
        "#,
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO meta(key, value) VALUES (?1, ?2)",
        params!["schema_version", SCHEMA_VERSION],
    )?;
    for counter in [COUNTER_PIXELS_PLACED, COUNTER_SHARDS_DEPLOYED] {
        conn.execute(
            "INSERT OR IGNORE INTO counters(name, value) VALUES (?1, 0)",
            params![counter],
        )?;
    }
    Ok(())
}
