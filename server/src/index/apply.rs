use log::debug;
use rusqlite::{params, OptionalExtension, Transaction};

use pixelplace_shared::{
    DomainEvent, EntryId, PixelEvent, ShardEvent, ShardKey, ShardPixels, Slot, SourceLabel,
};

use crate::index::{
    error::IndexError,
    schema::{COUNTER_PIXELS_PLACED, COUNTER_SHARDS_DEPLOYED},
    SyncCursor,
};

/// One decoded ledger entry, ready to be written in a single transaction.
pub struct EntryBatch<'a> {
    pub source: SourceLabel,
    pub entry_id: &'a EntryId,
    pub slot: Slot,
    /// The entry failed on the ledger
    pub failed: bool,
    /// Empty for entries that failed on the ledger or carried no canvas events
    pub events: &'a [DomainEvent],
}

/// What one entry changed in the index
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AppliedCounts {
    /// Pixel history rows inserted
    pub pixels: usize,
    /// Shards newly registered
    pub shards: usize,
    /// Shard inits for keys that were already registered
    pub shards_already_indexed: usize,
    /// Pixels whose latest value changed
    pub latest_updated: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied(AppliedCounts),
    /// The entry id was already in the processed log; nothing was touched
    AlreadyProcessed,
    /// The entry failed on the ledger; it is logged as processed with no effects
    FailedEntry,
}

impl ApplyOutcome {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, ApplyOutcome::AlreadyProcessed)
    }
}

/// Claims the entry id. Returns false when another writer already did.
///
/// Claims are keyed by entry id alone, not by source: entry ids are ledger
/// signatures, so the same id arriving from both tiers is one entry and is
/// applied once.
pub(crate) fn claim_entry(
    tx: &Transaction<'_>,
    batch: &EntryBatch<'_>,
    now_ms: i64,
) -> Result<bool, IndexError> {
    let inserted = tx.execute(
        "INSERT OR IGNORE INTO processed_entries(entry_id, source, slot, processed_at_ms)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            batch.entry_id.as_str(),
            batch.source.as_str(),
            batch.slot as i64,
            now_ms
        ],
    )?;
    Ok(inserted == 1)
}

pub(crate) fn apply_events(
    tx: &Transaction<'_>,
    batch: &EntryBatch<'_>,
) -> Result<AppliedCounts, IndexError> {
    let mut counts = AppliedCounts::default();
    for event in batch.events {
        match event {
            DomainEvent::PixelChanged(pixel_event) => {
                apply_pixel(tx, batch.source, pixel_event, &mut counts)?;
            }
            DomainEvent::ShardInitialized(shard_event) => {
                apply_shard(tx, batch.source, shard_event, &mut counts)?;
            }
        }
    }
    Ok(counts)
}

fn apply_pixel(
    tx: &Transaction<'_>,
    source: SourceLabel,
    event: &PixelEvent,
    counts: &mut AppliedCounts,
) -> Result<(), IndexError> {
    let inserted = tx.execute(
        "INSERT OR IGNORE INTO pixel_history
           (entry_id, event_index, source, px, py, color, painter, actor, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            event.entry_id.as_str(),
            event.event_index,
            source.as_str(),
            event.pixel.px(),
            event.pixel.py(),
            event.color,
            event.painter.to_hex(),
            event.actor.to_hex(),
            event.timestamp as i64,
        ],
    )?;
    if inserted == 0 {
        return Ok(());
    }
    counts.pixels += 1;

    // Erases are history rows but never count as placements
    if !event.is_erase() {
        bump_counter(tx, COUNTER_PIXELS_PLACED)?;
        bump_actor(tx, &event.actor.to_hex(), "pixels_placed_count")?;
    }

    if supersedes_latest(tx, event)? {
        tx.execute(
            "INSERT INTO pixel_latest(px, py, color, timestamp, entry_id, event_index)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(px, py) DO UPDATE SET
               color = excluded.color,
               timestamp = excluded.timestamp,
               entry_id = excluded.entry_id,
               event_index = excluded.event_index",
            params![
                event.pixel.px(),
                event.pixel.py(),
                event.color,
                event.timestamp as i64,
                event.entry_id.as_str(),
                event.event_index,
            ],
        )?;
        write_canvas_pixel(tx, event)?;
        counts.latest_updated += 1;
    } else {
        debug!(
            "pixel {} from {} is older than the stored value, history only",
            event.pixel, event.entry_id
        );
    }
    Ok(())
}

/// Last-writer-wins on (timestamp, entry id, event index). The tie-break has
/// no ledger meaning but gives every replay order the same winner.
fn supersedes_latest(tx: &Transaction<'_>, event: &PixelEvent) -> Result<bool, IndexError> {
    let stored: Option<(i64, String, u16)> = tx
        .query_row(
            "SELECT timestamp, entry_id, event_index FROM pixel_latest WHERE px = ?1 AND py = ?2",
            params![event.pixel.px(), event.pixel.py()],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?;
    let Some((timestamp, entry_id, event_index)) = stored else {
        return Ok(true);
    };
    let incoming = (event.timestamp as i64, event.entry_id.as_str(), event.event_index);
    Ok(incoming > (timestamp, entry_id.as_str(), event_index))
}

fn write_canvas_pixel(tx: &Transaction<'_>, event: &PixelEvent) -> Result<(), IndexError> {
    let key = event.pixel.shard();
    let mut pixels = load_canvas(tx, &key)?.unwrap_or_default();
    pixels
        .set(&event.pixel.local_offset(), event.color)
        .map_err(|source| IndexError::CorruptCanvas {
            shard_x: key.shard_x(),
            shard_y: key.shard_y(),
            source,
        })?;
    tx.execute(
        "INSERT INTO shard_canvas(shard_x, shard_y, pixels) VALUES (?1, ?2, ?3)
         ON CONFLICT(shard_x, shard_y) DO UPDATE SET pixels = excluded.pixels",
        params![key.shard_x(), key.shard_y(), pixels.as_bytes()],
    )?;
    Ok(())
}

pub(crate) fn load_canvas(
    conn: &rusqlite::Connection,
    key: &ShardKey,
) -> Result<Option<ShardPixels>, IndexError> {
    let blob: Option<Vec<u8>> = conn
        .query_row(
            "SELECT pixels FROM shard_canvas WHERE shard_x = ?1 AND shard_y = ?2",
            params![key.shard_x(), key.shard_y()],
            |row| row.get(0),
        )
        .optional()?;
    blob.map(|bytes| {
        ShardPixels::from_bytes(bytes).map_err(|source| IndexError::CorruptCanvas {
            shard_x: key.shard_x(),
            shard_y: key.shard_y(),
            source,
        })
    })
    .transpose()
}

fn apply_shard(
    tx: &Transaction<'_>,
    source: SourceLabel,
    event: &ShardEvent,
    counts: &mut AppliedCounts,
) -> Result<(), IndexError> {
    let inserted = tx.execute(
        "INSERT OR IGNORE INTO shards(shard_x, shard_y, creator, actor, timestamp, entry_id, source)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            event.shard.shard_x(),
            event.shard.shard_y(),
            event.creator.to_hex(),
            event.actor.to_hex(),
            event.timestamp as i64,
            event.entry_id.as_str(),
            source.as_str(),
        ],
    )?;
    if inserted == 0 {
        debug!("shard {} already indexed, ignoring init from {}", event.shard, event.entry_id);
        counts.shards_already_indexed += 1;
        return Ok(());
    }
    counts.shards += 1;
    bump_counter(tx, COUNTER_SHARDS_DEPLOYED)?;
    bump_actor(tx, &event.actor.to_hex(), "shards_owned_count")?;
    Ok(())
}

fn bump_counter(tx: &Transaction<'_>, name: &str) -> Result<(), IndexError> {
    tx.execute(
        "INSERT INTO counters(name, value) VALUES (?1, 1)
         ON CONFLICT(name) DO UPDATE SET value = value + 1",
        params![name],
    )?;
    Ok(())
}

fn bump_actor(tx: &Transaction<'_>, actor: &str, column: &'static str) -> Result<(), IndexError> {
    let sql = format!(
        "INSERT INTO actor_stats(actor, {column}) VALUES (?1, 1)
         ON CONFLICT(actor) DO UPDATE SET {column} = {column} + 1"
    );
    tx.execute(&sql, params![actor])?;
    Ok(())
}

/// Moves the source's cursor forward. A cursor at a lower slot than the stored
/// one is ignored, so backfill can never rewind it.
pub(crate) fn advance_cursor(
    conn: &rusqlite::Connection,
    source: SourceLabel,
    cursor: &SyncCursor,
    now_ms: i64,
) -> Result<bool, IndexError> {
    let changed = conn.execute(
        "INSERT INTO sync_cursors(source, entry_id, slot, updated_at_ms) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(source) DO UPDATE SET
           entry_id = excluded.entry_id,
           slot = excluded.slot,
           updated_at_ms = excluded.updated_at_ms
         WHERE excluded.slot >= sync_cursors.slot",
        params![
            source.as_str(),
            cursor.entry_id.as_str(),
            cursor.slot as i64,
            now_ms
        ],
    )?;
    Ok(changed == 1)
}
