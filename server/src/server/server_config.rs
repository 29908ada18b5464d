use std::{default::Default, path::PathBuf};

use pixelplace_shared::{
    constants::{DEFAULT_PROGRAM_ID, FEED_LIMIT},
    Pubkey,
};

use crate::ingest::IngestConfig;

/// Contains Config properties which will be used by the Server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// SQLite file holding the index. Created if missing.
    pub database_path: PathBuf,
    /// The canvas program whose events are indexed and whose shard accounts
    /// are derived
    pub program_id: Pubkey,
    /// Used to configure the live and backfill tasks
    pub ingest: IngestConfig,
    /// Upper bound of each read api feed
    pub feed_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("pixelplace.sqlite"),
            program_id: Pubkey::new(DEFAULT_PROGRAM_ID),
            ingest: IngestConfig::default(),
            feed_limit: FEED_LIMIT,
        }
    }
}
