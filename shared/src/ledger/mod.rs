pub mod error;
pub mod pubkey;
pub mod raw_log_batch;
