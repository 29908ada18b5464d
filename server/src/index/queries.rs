use rusqlite::{params, Connection, OptionalExtension};

use pixelplace_shared::{
    wire::{FeedPixel, FeedShard, StatsResponse, UserStatsResponse},
    ColorIndex, EntryId, GlobalPixel, Pubkey, ShardKey, SourceLabel, Timestamp,
};

use crate::index::{
    error::IndexError,
    schema::{COUNTER_PIXELS_PLACED, COUNTER_SHARDS_DEPLOYED},
    SyncCursor,
};

/// One row of a pixel's append-only history
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelHistoryRow {
    pub entry_id: EntryId,
    pub source: SourceLabel,
    pub color: ColorIndex,
    pub painter: Pubkey,
    pub actor: Pubkey,
    pub timestamp: Timestamp,
}

/// A registered shard
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShardRecord {
    pub key: ShardKey,
    pub creator: Pubkey,
    pub actor: Pubkey,
    pub timestamp: Timestamp,
    pub entry_id: EntryId,
}

pub(crate) fn recent_pixels(conn: &Connection, limit: usize) -> Result<Vec<FeedPixel>, IndexError> {
    let mut stmt = conn.prepare_cached(
        "SELECT px, py, color, timestamp FROM pixel_history
         ORDER BY timestamp DESC, seq DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit as i64], |row| {
        Ok(FeedPixel {
            px: row.get(0)?,
            py: row.get(1)?,
            color: row.get(2)?,
            timestamp: row.get::<_, i64>(3)? as u64,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub(crate) fn recent_shards(conn: &Connection, limit: usize) -> Result<Vec<FeedShard>, IndexError> {
    let mut stmt = conn.prepare_cached(
        "SELECT shard_x, shard_y, timestamp FROM shards
         ORDER BY timestamp DESC, rowid DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit as i64], |row| {
        Ok(FeedShard {
            shard_x: row.get(0)?,
            shard_y: row.get(1)?,
            timestamp: row.get::<_, i64>(2)? as u64,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub(crate) fn global_stats(conn: &Connection) -> Result<StatsResponse, IndexError> {
    Ok(StatsResponse {
        total_pixels_placed: counter(conn, COUNTER_PIXELS_PLACED)?,
        total_shards_deployed: counter(conn, COUNTER_SHARDS_DEPLOYED)?,
    })
}

fn counter(conn: &Connection, name: &str) -> Result<u64, IndexError> {
    let value: Option<i64> = conn
        .query_row(
            "SELECT value FROM counters WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value.unwrap_or(0) as u64)
}

pub(crate) fn user_stats(conn: &Connection, actor: &Pubkey) -> Result<UserStatsResponse, IndexError> {
    let stats = conn
        .query_row(
            "SELECT pixels_placed_count, shards_owned_count FROM actor_stats WHERE actor = ?1",
            params![actor.to_hex()],
            |row| {
                Ok(UserStatsResponse {
                    pixels_placed_count: row.get::<_, i64>(0)? as u64,
                    shards_owned_count: row.get::<_, i64>(1)? as u64,
                })
            },
        )
        .optional()?;
    Ok(stats.unwrap_or_default())
}

pub(crate) fn pixel_history(
    conn: &Connection,
    pixel: &GlobalPixel,
    limit: usize,
) -> Result<Vec<PixelHistoryRow>, IndexError> {
    let mut stmt = conn.prepare_cached(
        "SELECT entry_id, source, color, painter, actor, timestamp FROM pixel_history
         WHERE px = ?1 AND py = ?2 ORDER BY seq DESC LIMIT ?3",
    )?;
    let raw = stmt
        .query_map(params![pixel.px(), pixel.py(), limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, ColorIndex>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, i64>(5)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut output = Vec::with_capacity(raw.len());
    for (entry_id, source, color, painter, actor, timestamp) in raw {
        output.push(PixelHistoryRow {
            entry_id: EntryId::new(entry_id),
            source: parse_source(source)?,
            color,
            painter: parse_key("pixel_history", &painter)?,
            actor: parse_key("pixel_history", &actor)?,
            timestamp: timestamp as u64,
        });
    }
    Ok(output)
}

pub(crate) fn pixel_color(
    conn: &Connection,
    pixel: &GlobalPixel,
) -> Result<Option<(ColorIndex, Timestamp)>, IndexError> {
    let latest = conn
        .query_row(
            "SELECT color, timestamp FROM pixel_latest WHERE px = ?1 AND py = ?2",
            params![pixel.px(), pixel.py()],
            |row| Ok((row.get::<_, ColorIndex>(0)?, row.get::<_, i64>(1)? as u64)),
        )
        .optional()?;
    Ok(latest)
}

pub(crate) fn shard_record(conn: &Connection, key: &ShardKey) -> Result<Option<ShardRecord>, IndexError> {
    let raw = conn
        .query_row(
            "SELECT creator, actor, timestamp, entry_id FROM shards WHERE shard_x = ?1 AND shard_y = ?2",
            params![key.shard_x(), key.shard_y()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )
        .optional()?;
    let Some((creator, actor, timestamp, entry_id)) = raw else {
        return Ok(None);
    };
    Ok(Some(ShardRecord {
        key: *key,
        creator: parse_key("shards", &creator)?,
        actor: parse_key("shards", &actor)?,
        timestamp: timestamp as u64,
        entry_id: EntryId::new(entry_id),
    }))
}

pub(crate) fn cursor(conn: &Connection, source: SourceLabel) -> Result<Option<SyncCursor>, IndexError> {
    let cursor = conn
        .query_row(
            "SELECT entry_id, slot FROM sync_cursors WHERE source = ?1",
            params![source.as_str()],
            |row| {
                Ok(SyncCursor::new(
                    EntryId::new(row.get::<_, String>(0)?),
                    row.get::<_, i64>(1)? as u64,
                ))
            },
        )
        .optional()?;
    Ok(cursor)
}

pub(crate) fn is_processed(conn: &Connection, entry_id: &EntryId) -> Result<bool, IndexError> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM processed_entries WHERE entry_id = ?1",
            params![entry_id.as_str()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn parse_key(table: &'static str, hex: &str) -> Result<Pubkey, IndexError> {
    hex.parse()
        .map_err(|source| IndexError::CorruptKey { table, source })
}

fn parse_source(label: String) -> Result<SourceLabel, IndexError> {
    SourceLabel::parse(&label).ok_or(IndexError::UnknownSource { label })
}
