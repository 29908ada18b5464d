//! # Coordinate mapping
//! Pure conversions between geographic coordinates and canvas pixels.
//!
//! The canvas is a Web Mercator projection scaled to `[0, CANVAS_RES)` on both
//! axes. Both the client (click targets) and the server (stored pixels) call
//! the same functions, and both round with `floor`, so a click and the pixel
//! it lands on never disagree.

use std::f64::consts::PI;

use crate::{constants::CANVAS_RES, geometry::error::CoordinateError, GlobalPixel};

/// Latitude bound of the Web Mercator projection, in degrees
pub const MAX_LATITUDE: f64 = 85.051_128_78;

/// A geographic coordinate in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

/// Projects a geographic coordinate onto the canvas.
///
/// Returns an error for a latitude beyond [`MAX_LATITUDE`] or a longitude
/// outside `[-180, 180)`. Input is never clamped.
pub fn to_pixel(lat: f64, lon: f64) -> Result<GlobalPixel, CoordinateError> {
    if !lat.is_finite() || lat.abs() > MAX_LATITUDE {
        return Err(CoordinateError::LatitudeOutOfRange {
            lat,
            bound: MAX_LATITUDE,
        });
    }
    if !lon.is_finite() || !(-180.0..180.0).contains(&lon) {
        return Err(CoordinateError::LongitudeOutOfRange { lon });
    }

    let scale = CANVAS_RES as f64;
    let x = ((lon + 180.0) / 360.0 * scale).floor();

    let lat_rad = lat.to_radians();
    let mercator = (lat_rad.tan() + 1.0 / lat_rad.cos()).ln();
    let y = ((1.0 - mercator / PI) / 2.0 * scale).floor();

    // The exact latitude bound can round onto the far edge
    if !(0.0..scale).contains(&y) {
        return Err(CoordinateError::LatitudeOutOfRange {
            lat,
            bound: MAX_LATITUDE,
        });
    }
    if !(0.0..scale).contains(&x) {
        return Err(CoordinateError::LongitudeOutOfRange { lon });
    }

    GlobalPixel::new(x as u32, y as u32)
}

/// Returns the geographic coordinate at the centre of a pixel's cell.
pub fn to_lat_lon(pixel: &GlobalPixel) -> LatLon {
    let scale = CANVAS_RES as f64;
    let x = pixel.px() as f64 + 0.5;
    let y = pixel.py() as f64 + 0.5;

    let lon = x / scale * 360.0 - 180.0;
    let n = PI - 2.0 * PI * y / scale;
    let lat = n.sinh().atan().to_degrees();

    LatLon { lat, lon }
}

/// Like [`to_lat_lon`], validating a raw coordinate pair first.
pub fn try_to_lat_lon(px: u32, py: u32) -> Result<LatLon, CoordinateError> {
    let pixel = GlobalPixel::new(px, py)?;
    Ok(to_lat_lon(&pixel))
}
