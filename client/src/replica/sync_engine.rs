use std::collections::HashMap;

use log::debug;

use pixelplace_shared::{
    constants::COLOR_UNSET,
    wire::{FeedPixel, FeedResponse, FeedShard},
    ColorIndex, DomainEvent, GlobalPixel, PixelEvent, Pubkey, ShardEvent, ShardKey, ShardPixels,
    Timestamp,
};

use crate::{
    client_config::ClientConfig,
    delegation::{CheckTicket, DelegationStatusCache, ShardLockState},
    error::ReplicaError,
    replica::{
        pending_write::{PendingEffect, PendingWrite},
        pixel_state::PixelState,
        recent_feed::RecentFeed,
        shard_record::ShardRecord,
    },
};

/// One pixel of a snapshot page. Timestamp 0 means the write time is
/// unknown, which ranks below any timestamped value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SnapshotPixel {
    pub pixel: GlobalPixel,
    pub color: ColorIndex,
    pub timestamp: Timestamp,
}

/// The client's replica of the canvas.
///
/// Snapshots, live events and local optimistic writes all land here, in any
/// order. Live events overwrite unconditionally; snapshots only fill in what
/// nothing newer has set; optimistic writes shadow the authoritative value
/// until they are confirmed or rolled back through their [`PendingWrite`].
pub struct ReplicaSyncEngine {
    pixels: HashMap<GlobalPixel, PixelState>,
    shards: HashMap<ShardKey, ShardRecord>,
    delegation: DelegationStatusCache,
    pending: HashMap<PendingWrite, PendingEffect>,
    pending_unlocks: HashMap<ShardKey, PendingWrite>,
    next_write_id: u64,
    recent_pixels: RecentFeed<FeedPixel>,
    recent_shards: RecentFeed<FeedShard>,
}

impl ReplicaSyncEngine {
    pub fn new(recent_limit: usize) -> Self {
        Self {
            pixels: HashMap::new(),
            shards: HashMap::new(),
            delegation: DelegationStatusCache::new(),
            pending: HashMap::new(),
            pending_unlocks: HashMap::new(),
            next_write_id: 0,
            recent_pixels: RecentFeed::new(recent_limit),
            recent_shards: RecentFeed::new(recent_limit),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.recent_limit)
    }

    // Reads

    pub fn pixel_state(&self, pixel: &GlobalPixel) -> Option<&PixelState> {
        self.pixels.get(pixel)
    }

    /// The color to display at (px, py), `None` when unknown or off-canvas
    pub fn color_at(&self, px: u32, py: u32) -> Option<ColorIndex> {
        let pixel = GlobalPixel::new(px, py).ok()?;
        self.pixels.get(&pixel).map(PixelState::color)
    }

    pub fn shard_record(&self, shard: &ShardKey) -> Option<&ShardRecord> {
        self.shards.get(shard)
    }

    pub fn is_locked(&self, shard: &ShardKey) -> bool {
        !self.pending_unlocks.contains_key(shard) && self.delegation.is_locked(shard)
    }

    pub fn lock_state(&self, shard: &ShardKey) -> ShardLockState {
        if self.pending_unlocks.contains_key(shard) {
            ShardLockState::Unlocked
        } else {
            self.delegation.lock_state(shard)
        }
    }

    pub fn recent_pixels(&self) -> impl Iterator<Item = &FeedPixel> {
        self.recent_pixels.iter()
    }

    pub fn recent_shards(&self) -> impl Iterator<Item = &FeedShard> {
        self.recent_shards.iter()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    // Authoritative input

    /// Merges a snapshot page. Returns how many pixels it changed.
    ///
    /// An untimed value replaces another untimed value, so a refreshed shard
    /// blob can recolor or clear what an earlier blob loaded.
    pub fn bulk_load(&mut self, pixels: impl IntoIterator<Item = SnapshotPixel>) -> usize {
        let mut changed = 0;
        for snapshot in pixels {
            let incoming = (snapshot.color, snapshot.timestamp);
            let next = match self.pixels.get(&snapshot.pixel) {
                // Nothing to clear
                None if snapshot.color == COLOR_UNSET && snapshot.timestamp == 0 => continue,
                None => PixelState::Known {
                    color: snapshot.color,
                    timestamp: snapshot.timestamp,
                },
                Some(state) => {
                    let current = state.authoritative();
                    if !snapshot_wins(current, snapshot.timestamp) {
                        continue;
                    }
                    match *state {
                        PixelState::Pending { color, write, .. } => PixelState::Pending {
                            color,
                            write,
                            base: Some(incoming),
                        },
                        PixelState::Known { .. } if current == Some(incoming) => continue,
                        _ => PixelState::Known {
                            color: snapshot.color,
                            timestamp: snapshot.timestamp,
                        },
                    }
                }
            };
            self.set_pixel_state(snapshot.pixel, Some(next));
            changed += 1;
        }
        changed
    }

    /// Merges a shard's stored 8100-byte pixel array as an untimed snapshot.
    /// Unset bytes are merged too so they clear earlier untimed colors.
    pub fn bulk_load_shard(&mut self, shard: ShardKey, blob: Vec<u8>) -> Result<usize, ReplicaError> {
        let pixels = ShardPixels::from_bytes(blob).map_err(|source| ReplicaError::InvalidShardBlob {
            shard_x: shard.shard_x(),
            shard_y: shard.shard_y(),
            source,
        })?;
        let snapshot = pixels
            .pixels(&shard)
            .into_iter()
            .map(|(pixel, color)| SnapshotPixel {
                pixel,
                color,
                timestamp: 0,
            });
        Ok(self.bulk_load(snapshot))
    }

    /// Applies a live event. The event's value wins over whatever is held,
    /// including a pending local write.
    pub fn apply_remote_event(&mut self, event: &DomainEvent) {
        match event {
            DomainEvent::PixelChanged(pixel_event) => self.apply_remote_pixel(pixel_event),
            DomainEvent::ShardInitialized(shard_event) => self.apply_remote_shard(shard_event),
        }
    }

    fn apply_remote_pixel(&mut self, event: &PixelEvent) {
        if let Some(PixelState::Pending { write, .. }) = self.pixels.get(&event.pixel) {
            debug!("remote write to {} supersedes pending write {}", event.pixel, write.id());
            self.pending.remove(write);
        }
        self.set_pixel_state(
            event.pixel,
            Some(PixelState::Known {
                color: event.color,
                timestamp: event.timestamp,
            }),
        );
        self.recent_pixels.push(FeedPixel {
            px: event.pixel.px(),
            py: event.pixel.py(),
            color: event.color,
            timestamp: event.timestamp,
        });
    }

    fn apply_remote_shard(&mut self, event: &ShardEvent) {
        self.recent_shards.push(FeedShard {
            shard_x: event.shard.shard_x(),
            shard_y: event.shard.shard_y(),
            timestamp: event.timestamp,
        });

        // A pending local unlock keeps its record; the remote owner is held
        // back in case the local write fails
        if let Some(write) = self.pending_unlocks.get(&event.shard) {
            if let Some(PendingEffect::Unlock {
                suppressed_owner, ..
            }) = self.pending.get_mut(write)
            {
                debug!("holding back remote init of {} behind a local unlock", event.shard);
                *suppressed_owner = Some(event.actor);
                return;
            }
        }
        self.shards
            .entry(event.shard)
            .or_default()
            .set_owner(Some(event.actor));
    }

    /// Fills the recency lists from the read api
    pub fn seed_feed(&mut self, feed: &FeedResponse) {
        self.recent_pixels.replace(feed.pixels.iter().cloned());
        self.recent_shards.replace(feed.shards.iter().cloned());
    }

    // Optimistic writes

    /// Shows `color` at `pixel` until the write resolves
    pub fn optimistic_apply(&mut self, pixel: GlobalPixel, color: ColorIndex) -> PendingWrite {
        let write = self.next_write();
        let base = match self.pixels.get(&pixel) {
            Some(state) => {
                if let PixelState::Pending { write: earlier, .. } = state {
                    self.pending.remove(earlier);
                }
                state.authoritative()
            }
            None => None,
        };
        self.set_pixel_state(pixel, Some(PixelState::Pending { color, write, base }));
        self.pending.insert(write, PendingEffect::Pixel { pixel });
        write
    }

    /// Shows `shard` as unlocked and owned by `owner` until the write resolves
    pub fn optimistic_unlock(&mut self, shard: ShardKey, owner: Pubkey) -> PendingWrite {
        let write = self.next_write();
        let earlier = self
            .pending_unlocks
            .insert(shard, write)
            .and_then(|earlier| self.pending.remove(&earlier));
        let (prior_record, suppressed_owner) = match earlier {
            Some(PendingEffect::Unlock {
                prior_record,
                suppressed_owner,
                ..
            }) => (prior_record, suppressed_owner),
            _ => (self.shards.get(&shard).copied(), None),
        };

        self.shards.entry(shard).or_default().set_owner(Some(owner));
        self.pending.insert(
            write,
            PendingEffect::Unlock {
                shard,
                prior_record,
                suppressed_owner,
            },
        );
        write
    }

    /// The write landed. Returns false if it was already superseded.
    pub fn confirm_write(&mut self, write: PendingWrite, timestamp: Timestamp) -> bool {
        match self.pending.remove(&write) {
            None => false,
            Some(PendingEffect::Pixel { pixel }) => {
                if let Some(PixelState::Pending { color, write: held, .. }) = self.pixels.get(&pixel) {
                    if *held == write {
                        let color = *color;
                        self.set_pixel_state(pixel, Some(PixelState::Known { color, timestamp }));
                    }
                }
                true
            }
            Some(PendingEffect::Unlock { shard, .. }) => {
                self.pending_unlocks.remove(&shard);
                self.delegation.mark_unlocked(shard);
                true
            }
        }
    }

    /// The write failed. Restores the value and lock state from before it,
    /// unless something newer has already replaced it.
    pub fn rollback_write(&mut self, write: PendingWrite) -> bool {
        match self.pending.remove(&write) {
            None => false,
            Some(PendingEffect::Pixel { pixel }) => {
                if let Some(PixelState::Pending { write: held, base, .. }) = self.pixels.get(&pixel) {
                    if *held == write {
                        let restored = base.map(|(color, timestamp)| PixelState::RolledBack {
                            color,
                            timestamp,
                        });
                        self.set_pixel_state(pixel, restored);
                    }
                }
                true
            }
            Some(PendingEffect::Unlock {
                shard,
                prior_record,
                suppressed_owner,
            }) => {
                self.pending_unlocks.remove(&shard);
                let owner = suppressed_owner.or_else(|| prior_record.and_then(|r| r.owner()));
                let drop_record = match self.shards.get_mut(&shard) {
                    Some(record) => {
                        record.set_owner(owner);
                        prior_record.is_none() && owner.is_none() && record.pixel_count() == 0
                    }
                    None => false,
                };
                if drop_record {
                    self.shards.remove(&shard);
                }
                true
            }
        }
    }

    // Delegation

    pub fn delegation(&self) -> &DelegationStatusCache {
        &self.delegation
    }

    /// See [`DelegationStatusCache::begin_check`]. A shard with a pending
    /// local unlock needs no check either.
    pub fn begin_check(&mut self, shard: ShardKey) -> Option<CheckTicket> {
        if self.pending_unlocks.contains_key(&shard) {
            return None;
        }
        self.delegation.begin_check(shard)
    }

    pub fn complete_check(&mut self, ticket: CheckTicket, unlocked: bool) -> bool {
        self.delegation.complete_check(ticket, unlocked)
    }

    pub fn abandon_check(&mut self, ticket: CheckTicket) -> bool {
        self.delegation.abandon_check(ticket)
    }

    /// Teardown: in-flight checks are dropped, pending writes keep running
    pub fn abandon_all_checks(&mut self) {
        self.delegation.abandon_all();
    }

    /// An explicit undelegate (relock) event from the ledger
    pub fn mark_undelegated(&mut self, shard: ShardKey) {
        self.delegation.mark_undelegated(shard);
    }

    /// Drops all state, for a reconnect. Writes still in flight resolve to
    /// no-ops.
    pub fn reset(&mut self) {
        self.pixels.clear();
        self.shards.clear();
        self.delegation.clear();
        self.pending.clear();
        self.pending_unlocks.clear();
        self.recent_pixels.clear();
        self.recent_shards.clear();
    }

    fn next_write(&mut self) -> PendingWrite {
        self.next_write_id += 1;
        PendingWrite::new(self.next_write_id)
    }

    /// Single place pixel state changes, keeping shard pixel counts in step
    fn set_pixel_state(&mut self, pixel: GlobalPixel, next: Option<PixelState>) {
        let was_painted = self
            .pixels
            .get(&pixel)
            .map_or(false, |state| state.color() != COLOR_UNSET);
        let is_painted = next.map_or(false, |state| state.color() != COLOR_UNSET);
        match next {
            Some(state) => {
                self.pixels.insert(pixel, state);
            }
            None => {
                self.pixels.remove(&pixel);
            }
        }

        if was_painted != is_painted {
            let record = self.shards.entry(pixel.shard()).or_default();
            if is_painted {
                record.add_painted();
            } else {
                record.remove_painted();
            }
        }
    }
}

fn snapshot_wins(current: Option<(ColorIndex, Timestamp)>, incoming: Timestamp) -> bool {
    match current {
        None | Some((_, 0)) => true,
        Some((_, timestamp)) => incoming > timestamp,
    }
}
