// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module maps pointer positions into overlay coordinates and measures
//! captured areas.

use crate::models::area::Point;

/// Logical overlay width. Captured points live in this coordinate space
/// regardless of the video's native resolution.
pub const OVERLAY_WIDTH: u32 = 640;

/// Logical overlay height.
pub const OVERLAY_HEIGHT: u32 = 360;

/// Map a pointer position to overlay coordinates.
///
/// The overlay origin is subtracted and each axis is rounded to the nearest
/// pixel, halves rounding up.
pub fn to_canvas_point(event: (f32, f32), origin: (f32, f32)) -> Point {
    Point::new(
        round_half_up(event.0 - origin.0),
        round_half_up(event.1 - origin.1),
    )
}

fn round_half_up(value: f32) -> i32 {
    (value + 0.5).floor() as i32
}

/// Area of a simple polygon (shoelace formula). Zero below three vertices.
///
/// Accumulates in `i128` so any `i32` coordinates are safe, including ones
/// loaded from a file or the backend.
pub fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let mut twice_area: i128 = 0;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        twice_area += i128::from(p.x) * i128::from(q.y);
        twice_area -= i128::from(q.x) * i128::from(p.y);
    }
    twice_area.unsigned_abs() as f64 / 2.0
}
