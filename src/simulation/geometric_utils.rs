//! Geometric utility functions for headings, rotations and pixel snapping.

use geo::{Point, Rotate};

/// Wraps a heading in degrees into `[0, 360)`.
pub fn wrap_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Rotates `point` by `degrees` about `origin`.
///
/// Uses screen orientation: with y pointing down, positive angles turn clockwise.
pub fn rotate_about(point: Point<f32>, origin: Point<f32>, degrees: f32) -> Point<f32> {
    point.rotate_around_point(degrees, origin)
}

/// Unit direction vector for a heading in degrees.
pub fn heading_vector(degrees: f32) -> (f32, f32) {
    let radians = degrees.to_radians();
    (radians.cos(), radians.sin())
}

/// Snaps a world position to the pixel it falls in.
pub fn to_pixel(point: Point<f32>) -> (i32, i32) {
    ((point.x() + 0.5).floor() as i32, (point.y() + 0.5).floor() as i32)
}
