use tokio::runtime::{Handle, RuntimeFlavor};

/// Runs synchronous index work. On a multi-threaded runtime the worker's
/// other tasks move to another thread while SQLite holds this one, which can
/// take up to the busy timeout. Elsewhere the work runs inline.
pub(crate) fn run_blocking<T>(work: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(work)
        }
        _ => work(),
    }
}
