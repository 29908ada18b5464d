mod backfill;
mod blocking;
mod backoff;
pub mod error;
mod ingest_config;
mod ingestor;
mod ledger_source;
mod live;
mod process;

pub use backfill::{BackfillReport, Backfiller};
pub use error::IngestError;
pub use ingest_config::IngestConfig;
pub use ingestor::Ingestor;
pub use ledger_source::LedgerSource;
pub use live::LiveFollower;
pub use process::{process_entry, EntryOutcome};
