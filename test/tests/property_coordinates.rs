//! PROPERTY-BASED TESTS: canvas geometry
//!
//! Key invariants:
//! 1. A pixel's cell centre projects back onto the same pixel
//! 2. Every pixel of a shard's block maps to that shard

use proptest::prelude::*;

use pixelplace_shared::{
    constants::{CANVAS_RES, SHARD_DIMENSION, SHARDS_PER_DIM},
    shard_for_pixel, to_lat_lon, to_pixel, GlobalPixel, ShardKey,
};

proptest! {
    #[test]
    fn prop_cell_centre_round_trips(
        lat in -85.0f64..85.0,
        lon in -180.0f64..179.9999,
    ) {
        let pixel = to_pixel(lat, lon).unwrap();
        let centre = to_lat_lon(&pixel);
        prop_assert_eq!(to_pixel(centre.lat, centre.lon).unwrap(), pixel);
    }

    #[test]
    fn prop_pixels_in_one_block_share_a_shard(
        shard_x in 0u32..SHARDS_PER_DIM,
        shard_y in 0u32..SHARDS_PER_DIM,
        dx in 0u32..SHARD_DIMENSION,
        dy in 0u32..SHARD_DIMENSION,
        ex in 0u32..SHARD_DIMENSION,
        ey in 0u32..SHARD_DIMENSION,
    ) {
        let px_a = shard_x * SHARD_DIMENSION + dx;
        let py_a = shard_y * SHARD_DIMENSION + dy;
        let px_b = shard_x * SHARD_DIMENSION + ex;
        let py_b = shard_y * SHARD_DIMENSION + ey;
        // The last shard row and column are partial
        prop_assume!(px_a < CANVAS_RES && py_a < CANVAS_RES);
        prop_assume!(px_b < CANVAS_RES && py_b < CANVAS_RES);

        let a = shard_for_pixel(px_a, py_a).unwrap();
        let b = shard_for_pixel(px_b, py_b).unwrap();
        prop_assert_eq!(a, b);
        prop_assert_eq!(a, ShardKey::new(shard_x, shard_y).unwrap());
    }

    #[test]
    fn prop_shard_bounds_contain_their_pixels(
        px in 0u32..CANVAS_RES,
        py in 0u32..CANVAS_RES,
    ) {
        let pixel = GlobalPixel::new(px, py).unwrap();
        prop_assert!(pixel.shard().pixel_bounds().contains(&pixel));
    }
}

#[test]
fn out_of_range_input_is_rejected_not_clamped() {
    assert!(to_pixel(89.0, 0.0).is_err());
    assert!(to_pixel(0.0, 180.0).is_err());
    assert!(to_pixel(f64::NAN, 0.0).is_err());
    assert!(shard_for_pixel(CANVAS_RES, 0).is_err());
    assert!(ShardKey::new(SHARDS_PER_DIM, 0).is_err());
}
