mod ledger_writer;
mod pixel_writer;
mod rollback_guard;

pub use ledger_writer::{LedgerWriter, WriteOp, WriteReceipt};
pub use pixel_writer::PixelWriter;
