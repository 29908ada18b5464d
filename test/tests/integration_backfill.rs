//! Backfill paging, resume and failure handling against a fake ledger tier.

use std::{sync::Arc, time::Duration};

use tokio::sync::watch;

use pixelplace_server::{process_entry, BackfillReport, Backfiller, IngestConfig, PersistentIndex};
use pixelplace_shared::{EntryId, RawLogBatch, SourceLabel};
use pixelplace_test::{
    assert_stats, failed_entry, garbled_entry, raw_entry, truncated_entry, FakeLedgerSource,
    PixelEventBuilder,
};

fn init_logging() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

fn config(page_size: usize) -> IngestConfig {
    IngestConfig {
        page_size,
        page_delay: Duration::from_millis(1),
        ..IngestConfig::default()
    }
}

fn pixel_entry(n: u32) -> RawLogBatch {
    let entry_id = format!("entry-{}", n);
    let event = PixelEventBuilder::new(n, 0)
        .color(1)
        .timestamp(u64::from(n))
        .entry(&entry_id)
        .build();
    raw_entry(SourceLabel::Base, &entry_id, u64::from(n), &[event])
}

fn source_with(entries: impl IntoIterator<Item = RawLogBatch>) -> Arc<FakeLedgerSource> {
    let source = Arc::new(FakeLedgerSource::new(SourceLabel::Base));
    for entry in entries {
        source.push_history(entry);
    }
    source
}

#[tokio::test]
async fn backfill_from_genesis_applies_everything_and_sets_cursor() {
    init_logging();
    let source = source_with((1..=10).map(pixel_entry));
    let backfiller = Backfiller::new(source.clone(), config(3));
    let mut index = PersistentIndex::open_in_memory().unwrap();
    let (_tx, shutdown) = watch::channel(false);

    let report = backfiller.run_pass(&mut index, &shutdown).await.unwrap();

    assert_eq!(report.applied, 10);
    assert_eq!(report.pages_fetched, 4);
    assert!(!report.stopped_early);
    assert_stats!(index, pixels = 10, shards = 0);
    let cursor = index.cursor(SourceLabel::Base).unwrap().unwrap();
    assert_eq!(cursor.entry_id, EntryId::from("entry-10"));
    assert_eq!(cursor.slot, 10);
}

#[tokio::test]
async fn second_pass_only_fetches_down_to_the_cursor() {
    let source = source_with((1..=5).map(pixel_entry));
    let backfiller = Backfiller::new(source.clone(), config(100));
    let mut index = PersistentIndex::open_in_memory().unwrap();
    let (_tx, shutdown) = watch::channel(false);

    backfiller.run_pass(&mut index, &shutdown).await.unwrap();
    source.push_history(pixel_entry(6));
    let report = backfiller.run_pass(&mut index, &shutdown).await.unwrap();

    assert_eq!(report.entries_seen, 1);
    assert_eq!(report.applied, 1);
    assert_stats!(index, pixels = 6, shards = 0);
}

#[tokio::test]
async fn failed_fetch_keeps_cursor_and_next_pass_heals() {
    init_logging();
    let source = source_with((1..=9).map(pixel_entry));
    source.fail_fetch_at(1);
    let backfiller = Backfiller::new(source.clone(), config(3));
    let mut index = PersistentIndex::open_in_memory().unwrap();
    let (_tx, shutdown) = watch::channel(false);

    let first = backfiller.run_pass(&mut index, &shutdown).await.unwrap();
    assert!(first.stopped_early);
    // The newest page still lands, but without moving the cursor past the gap
    assert_eq!(first.applied, 3);
    assert_eq!(index.cursor(SourceLabel::Base).unwrap(), None);

    let second = backfiller.run_pass(&mut index, &shutdown).await.unwrap();
    assert!(!second.stopped_early);
    assert_eq!(second.applied, 6);
    assert_eq!(second.skipped_duplicate, 3);
    assert_stats!(index, pixels = 9, shards = 0);
}

#[tokio::test]
async fn pages_land_as_they_arrive_even_when_a_later_fetch_fails() {
    let source = source_with((1..=10).map(pixel_entry));
    source.fail_fetch_at(2);
    let backfiller = Backfiller::new(source.clone(), config(3));
    let mut index = PersistentIndex::open_in_memory().unwrap();
    let (_tx, shutdown) = watch::channel(false);

    let report = backfiller.run_pass(&mut index, &shutdown).await.unwrap();
    assert!(report.stopped_early);
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.applied, 6);
    assert_stats!(index, pixels = 6, shards = 0);
    assert!(index.is_processed(&EntryId::from("entry-5")).unwrap());
    assert!(!index.is_processed(&EntryId::from("entry-4")).unwrap());
    assert_eq!(index.cursor(SourceLabel::Base).unwrap(), None);

    let healed = backfiller.run_pass(&mut index, &shutdown).await.unwrap();
    assert_eq!(healed.applied, 4);
    assert_eq!(healed.skipped_duplicate, 6);
    assert_eq!(index.cursor(SourceLabel::Base).unwrap().unwrap().slot, 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn backfill_runs_on_a_multi_threaded_runtime() {
    let source = source_with((1..=4).map(pixel_entry));
    let backfiller = Backfiller::new(source, config(2));
    let mut index = PersistentIndex::open_in_memory().unwrap();
    let (_tx, shutdown) = watch::channel(false);

    let report = backfiller.run_pass(&mut index, &shutdown).await.unwrap();
    assert_eq!(report.applied, 4);
    assert_eq!(index.cursor(SourceLabel::Base).unwrap().unwrap().slot, 4);
}

#[tokio::test]
async fn resume_after_crash_mid_page_does_not_double_count() {
    let entries: Vec<_> = (1..=6).map(pixel_entry).collect();
    let source = source_with(entries.clone());
    let mut index = PersistentIndex::open_in_memory().unwrap();

    // A pass that committed the two oldest entries and their cursor, then died
    for entry in &entries[..2] {
        process_entry(&mut index, entry, true).unwrap();
    }
    // A live notification landed for an entry the pass had not reached yet
    process_entry(&mut index, &entries[4], false).unwrap();
    assert_stats!(index, pixels = 3, shards = 0);

    let backfiller = Backfiller::new(source, config(4));
    let (_tx, shutdown) = watch::channel(false);
    let report = backfiller.run_pass(&mut index, &shutdown).await.unwrap();

    assert_eq!(report.entries_seen, 4);
    assert_eq!(report.applied, 3);
    assert_eq!(report.skipped_duplicate, 1);
    assert_stats!(index, pixels = 6, shards = 0);
    assert_eq!(index.cursor(SourceLabel::Base).unwrap().unwrap().slot, 6);
}

#[tokio::test]
async fn malformed_entry_mid_page_does_not_block_the_rest() {
    init_logging();
    let broken = PixelEventBuilder::new(50, 50).entry("truncated").build();
    let source = source_with(vec![
        pixel_entry(1),
        garbled_entry(SourceLabel::Base, "garbled", 2),
        truncated_entry(SourceLabel::Base, "truncated", 3, &broken),
        failed_entry(SourceLabel::Base, "failed", 4),
        pixel_entry(5),
    ]);
    let backfiller = Backfiller::new(source, config(10));
    let mut index = PersistentIndex::open_in_memory().unwrap();
    let (_tx, shutdown) = watch::channel(false);

    let report = backfiller.run_pass(&mut index, &shutdown).await.unwrap();

    assert_eq!(
        report,
        BackfillReport {
            pages_fetched: 1,
            entries_seen: 5,
            applied: 3,
            skipped_duplicate: 0,
            skipped_malformed: 2,
            stopped_early: false,
        }
    );
    assert_stats!(index, pixels = 2, shards = 0);
    assert!(!index.is_processed(&EntryId::from("garbled")).unwrap());
    assert!(index.is_processed(&EntryId::from("failed")).unwrap());
    assert_eq!(index.cursor(SourceLabel::Base).unwrap().unwrap().slot, 5);
}

#[tokio::test]
async fn shutdown_between_pages_stops_early() {
    let source = source_with((1..=9).map(pixel_entry));
    let backfiller = Backfiller::new(source.clone(), config(3));
    let mut index = PersistentIndex::open_in_memory().unwrap();
    let (_tx, shutdown) = watch::channel(true);

    let report = backfiller.run_pass(&mut index, &shutdown).await.unwrap();
    assert!(report.stopped_early);
    assert_eq!(source.fetch_count(), 1);
    assert_eq!(index.cursor(SourceLabel::Base).unwrap(), None);
}
