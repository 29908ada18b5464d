//! Optimistic writes through the replica: rollback on every failure path and
//! the retry taxonomy.

use std::{sync::Arc, time::Duration};

use pixelplace_client::{
    ClientConfig, PixelState, PixelWriter, ReplicaHandle, ReplicaSyncEngine, ShardLockState,
    SnapshotPixel, WriteError, WriteOp,
};
use pixelplace_shared::{CoordinateError, GlobalPixel, LedgerError, Pubkey, ShardKey};
use pixelplace_test::{FakeLedgerWriter, PixelEventBuilder, ShardEventBuilder};

fn replica_with_pixel(px: u32, py: u32, color: u8) -> ReplicaHandle {
    let mut engine = ReplicaSyncEngine::from_config(&ClientConfig::default());
    engine.bulk_load(vec![SnapshotPixel {
        pixel: GlobalPixel::new(px, py).unwrap(),
        color,
        timestamp: 5,
    }]);
    ReplicaHandle::new(engine)
}

fn pixel_writer(replica: &ReplicaHandle, writer: &Arc<FakeLedgerWriter>) -> PixelWriter {
    PixelWriter::new(replica.clone(), writer.clone(), ClientConfig::default())
}

fn stale() -> LedgerError {
    LedgerError::StaleDelegation {
        shard_x: 1,
        shard_y: 0,
    }
}

#[tokio::test]
async fn successful_write_is_confirmed() {
    let replica = replica_with_pixel(95, 5, 3);
    let ledger = Arc::new(FakeLedgerWriter::new());

    let receipt = pixel_writer(&replica, &ledger).place_pixel(95, 5, 8).await.unwrap();

    let engine = replica.engine();
    assert_eq!(engine.color_at(95, 5), Some(8));
    assert_eq!(
        engine.pixel_state(&GlobalPixel::new(95, 5).unwrap()),
        Some(&PixelState::Known {
            color: 8,
            timestamp: receipt.timestamp
        })
    );
    assert_eq!(engine.pending_count(), 0);
}

#[tokio::test]
async fn failed_write_restores_color_and_lock_state() {
    let replica = replica_with_pixel(95, 5, 3);
    let shard = ShardKey::new(1, 0).unwrap();
    let lock_before = replica.engine().lock_state(&shard);
    let ledger = Arc::new(FakeLedgerWriter::new());
    ledger.then(Err(LedgerError::Rejected {
        message: "shard not delegated".to_string(),
    }));

    let err = pixel_writer(&replica, &ledger).place_pixel(95, 5, 8).await.unwrap_err();

    assert!(matches!(err, WriteError::Ledger(LedgerError::Rejected { .. })));
    let engine = replica.engine();
    assert_eq!(engine.color_at(95, 5), Some(3));
    assert_eq!(engine.lock_state(&shard), lock_before);
    assert_eq!(engine.pending_count(), 0);
}

#[tokio::test]
async fn stale_delegation_rebinds_and_retries_once() {
    let replica = replica_with_pixel(95, 5, 3);
    let ledger = Arc::new(FakeLedgerWriter::new());
    ledger.then(Err(stale()));

    pixel_writer(&replica, &ledger).place_pixel(95, 5, 8).await.unwrap();

    assert_eq!(ledger.rebinds(), vec![ShardKey::new(1, 0).unwrap()]);
    assert_eq!(ledger.submitted().len(), 2);
    assert_eq!(replica.engine().color_at(95, 5), Some(8));
}

#[tokio::test]
async fn second_stale_delegation_is_surfaced() {
    let replica = replica_with_pixel(95, 5, 3);
    let ledger = Arc::new(FakeLedgerWriter::new());
    ledger.then(Err(stale())).then(Err(stale()));

    let err = pixel_writer(&replica, &ledger).place_pixel(95, 5, 8).await.unwrap_err();

    assert_eq!(err, WriteError::Ledger(stale()));
    assert_eq!(ledger.rebinds().len(), 1);
    assert_eq!(ledger.submitted().len(), 2);
    assert_eq!(replica.engine().color_at(95, 5), Some(3));
}

#[tokio::test]
async fn insufficient_funds_is_never_retried() {
    let replica = replica_with_pixel(95, 5, 3);
    let ledger = Arc::new(FakeLedgerWriter::new());
    ledger.then(Err(LedgerError::InsufficientFunds));

    let err = pixel_writer(&replica, &ledger).erase_pixel(95, 5).await.unwrap_err();

    assert_eq!(err, WriteError::Ledger(LedgerError::InsufficientFunds));
    assert!(ledger.rebinds().is_empty());
    assert_eq!(ledger.submitted().len(), 1);
    assert_eq!(replica.engine().color_at(95, 5), Some(3));
}

#[tokio::test]
async fn invalid_input_never_reaches_the_ledger() {
    let replica = replica_with_pixel(95, 5, 3);
    let ledger = Arc::new(FakeLedgerWriter::new());
    let writer = pixel_writer(&replica, &ledger);

    let err = writer.place_pixel(524_288, 0, 3).await.unwrap_err();
    assert!(matches!(
        err,
        WriteError::InvalidCoordinate(CoordinateError::PixelOutOfRange { .. })
    ));
    let err = writer.place_pixel(1, 1, 0).await.unwrap_err();
    assert_eq!(err, WriteError::InvalidColor { color: 0 });
    assert!(writer.initialize_shard(6000, 0, Pubkey::new([1; 32])).await.is_err());

    assert!(ledger.submitted().is_empty());
    assert_eq!(replica.engine().pending_count(), 0);
}

#[tokio::test]
async fn timed_out_write_is_rolled_back() {
    let replica = replica_with_pixel(95, 5, 3);
    let ledger = Arc::new(FakeLedgerWriter::with_delay(Duration::from_millis(200)));
    let config = ClientConfig {
        write_timeout: Duration::from_millis(20),
        ..ClientConfig::default()
    };
    let writer = PixelWriter::new(replica.clone(), ledger.clone(), config);

    let err = writer.place_pixel(95, 5, 8).await.unwrap_err();

    assert!(matches!(err, WriteError::TimedOut { .. }));
    assert_eq!(replica.engine().color_at(95, 5), Some(3));
}

#[tokio::test]
async fn dropped_write_future_still_confirms_in_background() {
    let replica = replica_with_pixel(95, 5, 3);
    let ledger = Arc::new(FakeLedgerWriter::with_delay(Duration::from_millis(50)));
    let writer = pixel_writer(&replica, &ledger);

    let abandoned =
        tokio::time::timeout(Duration::from_millis(10), writer.place_pixel(95, 5, 8)).await;
    assert!(abandoned.is_err());
    assert_eq!(replica.engine().color_at(95, 5), Some(8));
    assert_eq!(replica.engine().pending_count(), 1);

    tokio::time::sleep(Duration::from_millis(150)).await;
    let engine = replica.engine();
    assert_eq!(engine.pending_count(), 0);
    assert!(matches!(
        engine.pixel_state(&GlobalPixel::new(95, 5).unwrap()),
        Some(PixelState::Known { color: 8, .. })
    ));
    assert_eq!(ledger.submitted().len(), 1);
}

#[tokio::test]
async fn dropped_write_future_still_rolls_back_on_failure() {
    let replica = replica_with_pixel(95, 5, 3);
    let ledger = Arc::new(FakeLedgerWriter::with_delay(Duration::from_millis(50)));
    ledger.then(Err(LedgerError::transient("connection reset")));
    let writer = pixel_writer(&replica, &ledger);

    let task = tokio::spawn(async move { writer.place_pixel(95, 5, 8).await });
    tokio::time::sleep(Duration::from_millis(10)).await;
    task.abort();
    let _ = task.await;
    assert_eq!(replica.engine().color_at(95, 5), Some(8));

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(replica.engine().color_at(95, 5), Some(3));
    assert_eq!(replica.engine().pending_count(), 0);
}

#[tokio::test]
async fn remote_event_during_write_wins() {
    let replica = replica_with_pixel(95, 5, 3);
    let ledger = Arc::new(FakeLedgerWriter::with_delay(Duration::from_millis(50)));
    ledger.then(Err(LedgerError::transient("connection reset")));
    let writer = pixel_writer(&replica, &ledger);

    let task = tokio::spawn(async move { writer.place_pixel(95, 5, 8).await });
    tokio::time::sleep(Duration::from_millis(10)).await;
    replica.engine().apply_remote_event(
        &PixelEventBuilder::new(95, 5).color(11).timestamp(99).build(),
    );

    assert!(task.await.unwrap().is_err());
    assert_eq!(replica.engine().color_at(95, 5), Some(11));
}

#[tokio::test]
async fn shard_init_unlocks_optimistically() {
    let replica = ReplicaHandle::new(ReplicaSyncEngine::new(15));
    let ledger = Arc::new(FakeLedgerWriter::new());
    let owner = Pubkey::new([5; 32]);
    let shard = ShardKey::new(2, 3).unwrap();

    pixel_writer(&replica, &ledger).initialize_shard(2, 3, owner).await.unwrap();

    let engine = replica.engine();
    assert_eq!(engine.lock_state(&shard), ShardLockState::Unlocked);
    assert_eq!(engine.shard_record(&shard).unwrap().owner(), Some(owner));
    assert_eq!(ledger.submitted(), vec![WriteOp::InitializeShard { shard }]);
}

#[tokio::test]
async fn failed_shard_init_applies_the_held_back_remote_init() {
    let replica = ReplicaHandle::new(ReplicaSyncEngine::new(15));
    let ledger = Arc::new(FakeLedgerWriter::with_delay(Duration::from_millis(50)));
    ledger.then(Err(LedgerError::Rejected {
        message: "account already in use".to_string(),
    }));
    let local = Pubkey::new([5; 32]);
    let remote = Pubkey::new([6; 32]);
    let shard = ShardKey::new(2, 3).unwrap();
    let writer = pixel_writer(&replica, &ledger);

    let task = tokio::spawn(async move { writer.initialize_shard(2, 3, local).await });
    tokio::time::sleep(Duration::from_millis(10)).await;
    replica
        .engine()
        .apply_remote_event(&ShardEventBuilder::new(2, 3).actor(remote).build());
    assert_eq!(replica.engine().shard_record(&shard).unwrap().owner(), Some(local));

    assert!(task.await.unwrap().is_err());
    let engine = replica.engine();
    assert_eq!(engine.shard_record(&shard).unwrap().owner(), Some(remote));
    assert!(engine.is_locked(&shard));
}
