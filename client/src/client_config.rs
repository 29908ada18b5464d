use std::{default::Default, time::Duration};

use pixelplace_shared::{
    constants::{DEFAULT_PROGRAM_ID, FEED_LIMIT},
    Pubkey,
};

/// Contains Config properties which will be used by a Client
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// The canvas program shard accounts are derived from
    pub program_id: Pubkey,
    /// Length of the recent pixel and shard feeds kept for the ui
    pub recent_limit: usize,
    /// How long a write may take before its optimistic state is rolled back
    pub write_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            program_id: Pubkey::new(DEFAULT_PROGRAM_ID),
            recent_limit: FEED_LIMIT,
            write_timeout: Duration::from_secs(30),
        }
    }
}
