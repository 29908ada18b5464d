//! The full ingestor: live tasks and periodic backfill for both tiers.

use std::{sync::Arc, time::Duration};

use tokio::{sync::watch, task::JoinHandle, time::sleep};

use pixelplace_server::{IngestConfig, IngestError, Ingestor};
use pixelplace_shared::{RawLogBatch, SourceLabel};
use pixelplace_test::{raw_entry, FakeLedgerSource, PixelEventBuilder, ShardEventBuilder, TempIndex};

fn init_logging() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

fn fast_config() -> IngestConfig {
    IngestConfig {
        page_size: 50,
        page_delay: Duration::from_millis(1),
        backfill_interval: Duration::from_millis(50),
        reconnect_backoff_min: Duration::from_millis(5),
        reconnect_backoff_max: Duration::from_millis(20),
    }
}

fn pixel_entry(source: SourceLabel, n: u32) -> RawLogBatch {
    let entry_id = format!("{}-{}", source, n);
    let event = PixelEventBuilder::new(n, n)
        .color(2)
        .timestamp(u64::from(n))
        .entry(&entry_id)
        .build();
    raw_entry(source, &entry_id, u64::from(n), &[event])
}

async fn wait_for(mut condition: impl FnMut() -> bool) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met within 5s");
}

fn start(
    temp: &TempIndex,
    sources: &[Arc<FakeLedgerSource>],
) -> (watch::Sender<bool>, JoinHandle<Result<(), IngestError>>) {
    let mut ingestor = Ingestor::new(temp.path(), fast_config());
    for source in sources {
        ingestor.add_source(source.clone());
    }
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    (shutdown_tx, tokio::spawn(ingestor.run(shutdown_rx)))
}

fn pixels_placed(temp: &TempIndex) -> u64 {
    temp.open().global_stats().unwrap().total_pixels_placed
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn live_notifications_reach_the_index() {
    init_logging();
    let temp = TempIndex::new();
    let source = Arc::new(FakeLedgerSource::new(SourceLabel::Ephemeral));
    let (shutdown, task) = start(&temp, &[source.clone()]);

    wait_for(|| source.subscriber_count() == 1).await;
    source.notify_only(pixel_entry(SourceLabel::Ephemeral, 1));
    wait_for(|| pixels_placed(&temp) == 1).await;

    shutdown.send(true).unwrap();
    task.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn dropped_subscription_reconnects() {
    init_logging();
    let temp = TempIndex::new();
    let source = Arc::new(FakeLedgerSource::new(SourceLabel::Base));
    source.fail_subscribes(2);
    let (shutdown, task) = start(&temp, &[source.clone()]);

    wait_for(|| source.subscriber_count() == 1).await;
    assert_eq!(source.subscribe_count(), 3);

    source.drop_subscribers();
    wait_for(|| source.subscribe_count() == 4 && source.subscriber_count() == 1).await;
    source.notify_only(pixel_entry(SourceLabel::Base, 2));
    wait_for(|| pixels_placed(&temp) == 1).await;

    shutdown.send(true).unwrap();
    task.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn backfill_heals_entries_live_never_delivered() {
    init_logging();
    let temp = TempIndex::new();
    let source = Arc::new(FakeLedgerSource::new(SourceLabel::Base));
    let (shutdown, task) = start(&temp, &[source.clone()]);

    wait_for(|| source.subscriber_count() == 1).await;
    source.drop_subscribers();
    for n in 1..=3 {
        source.push_history(pixel_entry(SourceLabel::Base, n));
    }
    wait_for(|| pixels_placed(&temp) == 3).await;

    shutdown.send(true).unwrap();
    task.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn both_tiers_feed_one_index_without_double_counting() {
    init_logging();
    let temp = TempIndex::new();
    let base = Arc::new(FakeLedgerSource::new(SourceLabel::Base));
    let ephemeral = Arc::new(FakeLedgerSource::new(SourceLabel::Ephemeral));
    let (shutdown, task) = start(&temp, &[base.clone(), ephemeral.clone()]);

    wait_for(|| base.subscriber_count() == 1 && ephemeral.subscriber_count() == 1).await;

    // A shard init committed on the overlay shows up on both tiers
    let init = ShardEventBuilder::new(4, 4).entry("init").build();
    ephemeral.publish(raw_entry(SourceLabel::Ephemeral, "init", 10, &[init.clone()]));
    base.publish(raw_entry(SourceLabel::Base, "init", 900, &[init]));
    ephemeral.publish(pixel_entry(SourceLabel::Ephemeral, 5));

    wait_for(|| {
        let stats = temp.open().global_stats().unwrap();
        stats.total_shards_deployed == 1 && stats.total_pixels_placed == 1
    })
    .await;
    // Let a few backfill passes run over the same entries
    sleep(Duration::from_millis(150)).await;

    let stats = temp.open().global_stats().unwrap();
    assert_eq!(stats.total_shards_deployed, 1);
    assert_eq!(stats.total_pixels_placed, 1);

    shutdown.send(true).unwrap();
    task.await.unwrap().unwrap();
}
