use std::{collections::VecDeque, sync::Mutex, time::Duration};

use async_trait::async_trait;

use pixelplace_client::{LedgerWriter, WriteOp, WriteReceipt};
use pixelplace_shared::{ColorIndex, EntryId, GlobalPixel, LedgerError, ShardKey};

/// Scripted write surface. Each submitted op pops the next scripted outcome;
/// an empty script means success.
pub struct FakeLedgerWriter {
    state: Mutex<WriterState>,
    delay: Option<Duration>,
}

struct WriterState {
    outcomes: VecDeque<Result<(), LedgerError>>,
    submitted: Vec<WriteOp>,
    rebinds: Vec<ShardKey>,
    next_timestamp: u64,
}

impl FakeLedgerWriter {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(WriterState {
                outcomes: VecDeque::new(),
                submitted: Vec::new(),
                rebinds: Vec::new(),
                next_timestamp: 1_000,
            }),
            delay: None,
        }
    }

    /// Every write takes `delay` before answering
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new()
        }
    }

    /// Queues the outcome of the next submitted op
    pub fn then(&self, outcome: Result<(), LedgerError>) -> &Self {
        self.state.lock().unwrap().outcomes.push_back(outcome);
        self
    }

    pub fn submitted(&self) -> Vec<WriteOp> {
        self.state.lock().unwrap().submitted.clone()
    }

    pub fn rebinds(&self) -> Vec<ShardKey> {
        self.state.lock().unwrap().rebinds.clone()
    }

    async fn answer(&self, op: WriteOp) -> Result<WriteReceipt, LedgerError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state.lock().unwrap();
        state.submitted.push(op);
        state.outcomes.pop_front().unwrap_or(Ok(()))?;
        state.next_timestamp += 1;
        Ok(WriteReceipt {
            entry_id: EntryId::new(format!("fake-{}", state.submitted.len())),
            timestamp: state.next_timestamp,
        })
    }
}

impl Default for FakeLedgerWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerWriter for FakeLedgerWriter {
    async fn place_pixel(
        &self,
        shard: ShardKey,
        pixel: GlobalPixel,
        color: ColorIndex,
    ) -> Result<WriteReceipt, LedgerError> {
        self.answer(WriteOp::Place {
            shard,
            pixel,
            color,
        })
        .await
    }

    async fn erase_pixel(
        &self,
        shard: ShardKey,
        pixel: GlobalPixel,
    ) -> Result<WriteReceipt, LedgerError> {
        self.answer(WriteOp::Erase { shard, pixel }).await
    }

    async fn initialize_shard(&self, shard: ShardKey) -> Result<WriteReceipt, LedgerError> {
        self.answer(WriteOp::InitializeShard { shard }).await
    }

    async fn rebind_delegation(&self, shard: ShardKey) -> Result<(), LedgerError> {
        self.state.lock().unwrap().rebinds.push(shard);
        Ok(())
    }
}
