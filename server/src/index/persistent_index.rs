use std::{
    path::{Path, PathBuf},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use log::{debug, info};
use rusqlite::{Connection, TransactionBehavior};

use pixelplace_shared::{
    wire::{FeedResponse, StatsResponse, UserStatsResponse},
    ColorIndex, EntryId, GlobalPixel, Pubkey, ShardKey, ShardPixels, SourceLabel, Timestamp,
};

use crate::index::{
    apply::{self, ApplyOutcome, EntryBatch},
    error::IndexError,
    queries::{self, PixelHistoryRow, ShardRecord},
    schema, SyncCursor,
};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Durable store of everything the ingestor has applied.
///
/// Every write goes through [`PersistentIndex::apply_entry`], which claims the
/// entry id and applies its effects inside one `BEGIN IMMEDIATE` transaction.
/// Several handles may be open on the same file at once (one per ingest task);
/// conflicting writers serialize at SQLite and the processed-entry claim makes
/// the loser a no-op.
pub struct PersistentIndex {
    conn: Connection,
    path: Option<PathBuf>,
}

impl PersistentIndex {
    /// Opens (or creates) the index at `path` and bootstraps the schema
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        let mode: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
        debug!("index {} opened with journal mode {}", path.display(), mode);
        Self::bootstrap(conn, Some(path.to_path_buf()))
    }

    /// A private in-memory index. Other handles cannot see it.
    pub fn open_in_memory() -> Result<Self, IndexError> {
        Self::bootstrap(Connection::open_in_memory()?, None)
    }

    fn bootstrap(conn: Connection, path: Option<PathBuf>) -> Result<Self, IndexError> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA synchronous=NORMAL; PRAGMA foreign_keys=ON;")?;
        schema::migrate(&conn)?;
        Ok(Self { conn, path })
    }

    /// Opens another handle on the same file, for a task that writes
    /// concurrently with this one. `None` for in-memory indexes.
    pub fn try_clone(&self) -> Option<Result<Self, IndexError>> {
        self.path.as_ref().map(Self::open)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Applies one entry atomically. The processed-entry claim, history rows,
    /// counters, latest-value registers, shard canvas and (when given) the
    /// source's cursor all commit together or not at all.
    ///
    /// Re-applying an entry id that is already processed changes nothing except
    /// the cursor.
    pub fn apply_entry(
        &mut self,
        batch: &EntryBatch<'_>,
        cursor: Option<&SyncCursor>,
    ) -> Result<ApplyOutcome, IndexError> {
        let now_ms = now_ms();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let outcome = if !apply::claim_entry(&tx, batch, now_ms)? {
            ApplyOutcome::AlreadyProcessed
        } else if batch.failed {
            ApplyOutcome::FailedEntry
        } else {
            ApplyOutcome::Applied(apply::apply_events(&tx, batch)?)
        };

        if let Some(cursor) = cursor {
            apply::advance_cursor(&tx, batch.source, cursor, now_ms)?;
        }
        tx.commit()?;
        Ok(outcome)
    }

    /// Moves a source's cursor forward without applying anything. Returns
    /// false when the stored cursor is already further along.
    pub fn advance_cursor(
        &mut self,
        source: SourceLabel,
        cursor: &SyncCursor,
    ) -> Result<bool, IndexError> {
        let advanced = apply::advance_cursor(&self.conn, source, cursor, now_ms())?;
        if advanced {
            debug!("{} cursor advanced to slot {}", source, cursor.slot);
        }
        Ok(advanced)
    }

    pub fn cursor(&self, source: SourceLabel) -> Result<Option<SyncCursor>, IndexError> {
        queries::cursor(&self.conn, source)
    }

    pub fn is_processed(&self, entry_id: &EntryId) -> Result<bool, IndexError> {
        queries::is_processed(&self.conn, entry_id)
    }

    /// Newest-first pixel and shard feeds, each capped at `limit`
    pub fn feed(&self, limit: usize) -> Result<FeedResponse, IndexError> {
        Ok(FeedResponse {
            pixels: queries::recent_pixels(&self.conn, limit)?,
            shards: queries::recent_shards(&self.conn, limit)?,
        })
    }

    pub fn global_stats(&self) -> Result<StatsResponse, IndexError> {
        queries::global_stats(&self.conn)
    }

    /// Counts attributed to `actor`; zero for an actor never seen
    pub fn user_stats(&self, actor: &Pubkey) -> Result<UserStatsResponse, IndexError> {
        queries::user_stats(&self.conn, actor)
    }

    /// Newest-first history of one pixel
    pub fn pixel_history(
        &self,
        pixel: &GlobalPixel,
        limit: usize,
    ) -> Result<Vec<PixelHistoryRow>, IndexError> {
        queries::pixel_history(&self.conn, pixel, limit)
    }

    /// The winning value of a pixel and its write time
    pub fn pixel_color(
        &self,
        pixel: &GlobalPixel,
    ) -> Result<Option<(ColorIndex, Timestamp)>, IndexError> {
        queries::pixel_color(&self.conn, pixel)
    }

    pub fn shard_record(&self, key: &ShardKey) -> Result<Option<ShardRecord>, IndexError> {
        queries::shard_record(&self.conn, key)
    }

    /// The shard's latest pixel values, or `None` when nothing was painted
    pub fn shard_canvas(&self, key: &ShardKey) -> Result<Option<ShardPixels>, IndexError> {
        apply::load_canvas(&self.conn, key)
    }

    /// Logs the headline counters. Called once at startup.
    pub fn log_summary(&self) -> Result<(), IndexError> {
        let stats = self.global_stats()?;
        info!(
            "index holds {} placed pixels across {} shards",
            stats.total_pixels_placed, stats.total_shards_deployed
        );
        Ok(())
    }
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
