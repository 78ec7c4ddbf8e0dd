// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Overlay rendering.
//!
//! One call to [`render_overlay`] paints a complete overlay frame: the video
//! frame (once it is ready), a numbered marker per point, and the edges of
//! the area being drawn.

use crate::models::area::{Point, AREA_VERTICES};

/// Radius of a point marker.
pub const MARKER_RADIUS: f32 = 5.0;

/// Offset of a point's ordinal label from its marker.
pub const LABEL_OFFSET: (i32, i32) = (8, 8);

/// Width of the area edges.
pub const EDGE_WIDTH: f32 = 2.0;

/// Label font size.
pub const LABEL_SIZE: f32 = 12.0;

/// Drawing primitives the overlay needs. Coordinates are overlay pixels.
pub trait OverlaySurface {
    /// Clear the whole overlay.
    fn clear(&mut self);

    /// Draw the current video frame stretched over the whole overlay.
    fn draw_frame(&mut self);

    fn fill_marker(&mut self, center: Point, radius: f32);

    fn draw_label(&mut self, anchor: Point, text: &str);

    /// Stroke a polyline through `points`, back to the first when `closed`.
    fn stroke_path(&mut self, points: &[Point], closed: bool);
}

/// Paint one overlay frame.
pub fn render_overlay(surface: &mut dyn OverlaySurface, points: &[Point], video_ready: bool) {
    surface.clear();

    if video_ready {
        surface.draw_frame();
    }

    for (i, point) in points.iter().enumerate() {
        surface.fill_marker(*point, MARKER_RADIUS);
        let anchor = Point::new(
            point.x.saturating_add(LABEL_OFFSET.0),
            point.y.saturating_add(LABEL_OFFSET.1),
        );
        surface.draw_label(anchor, &(i + 1).to_string());
    }

    if points.len() > 1 {
        surface.stroke_path(points, points.len() == AREA_VERTICES);
    }
}
