//! End-to-end scenarios from raw ledger log lines to index counters.

use std::thread;

use pixelplace_server::{process_entry, ApplyOutcome, EntryOutcome, PersistentIndex};
use pixelplace_shared::{shard_for_pixel, GlobalPixel, ShardKey, SourceLabel};
use pixelplace_test::{assert_stats, raw_entry, PixelEventBuilder, ShardEventBuilder, TempIndex, ACTOR};

fn init_logging() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

#[test]
fn paint_then_erase_is_two_rows_and_one_placement() {
    init_logging();
    assert_eq!(shard_for_pixel(95, 5).unwrap(), ShardKey::new(1, 0).unwrap());

    let mut index = PersistentIndex::open_in_memory().unwrap();
    let paint = PixelEventBuilder::new(95, 5).color(3).timestamp(10).entry("paint").build();
    let erase = PixelEventBuilder::new(95, 5).color(0).timestamp(11).entry("erase").build();

    process_entry(&mut index, &raw_entry(SourceLabel::Ephemeral, "paint", 1, &[paint]), false).unwrap();
    process_entry(&mut index, &raw_entry(SourceLabel::Ephemeral, "erase", 2, &[erase]), false).unwrap();

    let pixel = GlobalPixel::new(95, 5).unwrap();
    let history = index.pixel_history(&pixel, 10).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].color, 0);
    assert_eq!(history[1].color, 3);
    assert_stats!(index, pixels = 1, shards = 0);
    assert_eq!(index.user_stats(&ACTOR).unwrap().pixels_placed_count, 1);

    let canvas = index.shard_canvas(&ShardKey::new(1, 0).unwrap()).unwrap().unwrap();
    assert_eq!(canvas.painted_count(), 0);
}

#[test]
fn same_entry_from_both_tiers_counts_once() {
    let mut index = PersistentIndex::open_in_memory().unwrap();
    let event = PixelEventBuilder::new(10, 10).color(4).entry("shared").build();

    let base = raw_entry(SourceLabel::Base, "shared", 50, &[event.clone()]);
    let ephemeral = raw_entry(SourceLabel::Ephemeral, "shared", 7, &[event]);
    process_entry(&mut index, &ephemeral, false).unwrap();
    let outcome = process_entry(&mut index, &base, false).unwrap();

    assert!(matches!(outcome, EntryOutcome::Applied(ApplyOutcome::AlreadyProcessed)));
    assert_stats!(index, pixels = 1, shards = 0);
}

#[test]
fn later_timestamp_wins_regardless_of_arrival_order() {
    for red_first in [true, false] {
        let mut index = PersistentIndex::open_in_memory().unwrap();
        let red = raw_entry(
            SourceLabel::Base,
            "red",
            1,
            &[PixelEventBuilder::new(7, 7).color(2).timestamp(1).entry("red").build()],
        );
        let blue = raw_entry(
            SourceLabel::Base,
            "blue",
            2,
            &[PixelEventBuilder::new(7, 7).color(5).timestamp(2).entry("blue").build()],
        );
        let order = if red_first { [&red, &blue] } else { [&blue, &red] };
        for entry in order {
            process_entry(&mut index, entry, false).unwrap();
        }

        let pixel = GlobalPixel::new(7, 7).unwrap();
        assert_eq!(index.pixel_color(&pixel).unwrap(), Some((5, 2)), "red_first={}", red_first);
        assert_stats!(index, pixels = 2, shards = 0);
    }
}

#[test]
fn racing_shard_inits_produce_one_shard() {
    init_logging();
    let temp = TempIndex::new();
    let live_init = ShardEventBuilder::new(3, 9).entry("init-live").build();
    let backfill_init = ShardEventBuilder::new(3, 9).entry("init-backfill").build();
    let live_entry = raw_entry(SourceLabel::Ephemeral, "init-live", 100, &[live_init]);
    let backfill_entry = raw_entry(SourceLabel::Base, "init-backfill", 200, &[backfill_init]);

    let handles: Vec<_> = [live_entry, backfill_entry]
        .into_iter()
        .map(|entry| {
            let mut index = temp.open();
            thread::spawn(move || {
                process_entry(&mut index, &entry, false).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let index = temp.open();
    assert_stats!(index, pixels = 0, shards = 1);
    assert_eq!(index.feed(15).unwrap().shards.len(), 1);
    assert_eq!(index.user_stats(&ACTOR).unwrap().shards_owned_count, 1);
}

#[test]
fn reapplying_every_entry_changes_no_counter() {
    let mut index = PersistentIndex::open_in_memory().unwrap();
    let entries = vec![
        raw_entry(SourceLabel::Base, "s", 1, &[ShardEventBuilder::new(0, 0).entry("s").build()]),
        raw_entry(
            SourceLabel::Base,
            "p",
            2,
            &[
                PixelEventBuilder::new(1, 1).color(9).entry("p").index(0).build(),
                PixelEventBuilder::new(2, 1).color(9).entry("p").index(1).build(),
            ],
        ),
    ];
    for entry in &entries {
        process_entry(&mut index, entry, false).unwrap();
    }
    let before = index.global_stats().unwrap();
    for entry in &entries {
        process_entry(&mut index, entry, false).unwrap();
    }
    assert_eq!(index.global_stats().unwrap(), before);
    assert_stats!(index, pixels = 2, shards = 1);
}
