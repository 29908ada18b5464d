use std::{default::Default, time::Duration};

/// Contains config properties which will be used by the ingest tasks
#[derive(Clone, Debug)]
pub struct IngestConfig {
    /// Entries requested per history page
    pub page_size: usize,
    /// Pause between history page fetches, to stay under upstream rate limits
    pub page_delay: Duration,
    /// How often each source's backfill pass runs
    pub backfill_interval: Duration,
    /// First delay before re-subscribing after a dropped live stream
    pub reconnect_backoff_min: Duration,
    /// Upper bound of the reconnect delay
    pub reconnect_backoff_max: Duration,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            page_size: 1000,
            page_delay: Duration::from_millis(250),
            backfill_interval: Duration::from_secs(60),
            reconnect_backoff_min: Duration::from_millis(500),
            reconnect_backoff_max: Duration::from_secs(30),
        }
    }
}
