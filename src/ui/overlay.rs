// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Capture overlay for the active signal.
//!
//! This module shows the signal's video frame at the fixed overlay size,
//! turns clicks into area vertices, and paints the session's overlay with
//! an egui painter.

use crate::capture::render::{OverlaySurface, EDGE_WIDTH, LABEL_SIZE};
use crate::capture::session::CaptureSession;
use crate::models::area::Point;
use crate::util::geometry::{OVERLAY_HEIGHT, OVERLAY_WIDTH};

const BACKGROUND: egui::Color32 = egui::Color32::from_gray(20);
const EDGE_COLOR: egui::Color32 = egui::Color32::YELLOW;
const MARKER_COLOR: egui::Color32 = egui::Color32::RED;

/// [`OverlaySurface`] over an egui painter clipped to the overlay rect.
struct PainterSurface<'a> {
    painter: &'a egui::Painter,
    rect: egui::Rect,
    frame: Option<egui::TextureId>,
}

impl PainterSurface<'_> {
    fn to_screen(&self, point: Point) -> egui::Pos2 {
        self.rect.min + egui::vec2(point.x as f32, point.y as f32)
    }
}

impl OverlaySurface for PainterSurface<'_> {
    fn clear(&mut self) {
        self.painter.rect_filled(self.rect, 0.0, BACKGROUND);
    }

    fn draw_frame(&mut self) {
        if let Some(texture) = self.frame {
            self.painter.image(
                texture,
                self.rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }
    }

    fn fill_marker(&mut self, center: Point, radius: f32) {
        self.painter
            .circle_filled(self.to_screen(center), radius, MARKER_COLOR);
    }

    fn draw_label(&mut self, anchor: Point, text: &str) {
        // Anchored at the text baseline, like a canvas fillText.
        self.painter.text(
            self.to_screen(anchor),
            egui::Align2::LEFT_BOTTOM,
            text,
            egui::FontId::proportional(LABEL_SIZE),
            MARKER_COLOR,
        );
    }

    fn stroke_path(&mut self, points: &[Point], closed: bool) {
        let screen_points: Vec<egui::Pos2> = points.iter().map(|p| self.to_screen(*p)).collect();
        let stroke = egui::Stroke::new(EDGE_WIDTH, EDGE_COLOR);
        let shape = if closed {
            egui::Shape::closed_line(screen_points, stroke)
        } else {
            egui::Shape::line(screen_points, stroke)
        };
        self.painter.add(shape);
    }
}

/// Display the overlay and feed clicks into the session.
pub fn show(ui: &mut egui::Ui, session: &mut CaptureSession, frame: Option<&egui::TextureHandle>) {
    let size = egui::vec2(OVERLAY_WIDTH as f32, OVERLAY_HEIGHT as f32);
    let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click());

    let cursor = if session.accepts_points() {
        egui::CursorIcon::Crosshair
    } else {
        egui::CursorIcon::NotAllowed
    };
    let response = response.on_hover_cursor(cursor);

    if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            session.on_pointer_click((pos.x, pos.y), (rect.min.x, rect.min.y));
        }
    }

    let painter = ui.painter_at(rect);
    let mut surface = PainterSurface {
        painter: &painter,
        rect,
        frame: frame.map(|texture| texture.id()),
    };
    session.render(&mut surface, ui.ctx());

    // Border around the video, drawn outside the session's overlay.
    ui.painter().rect_stroke(
        rect.expand(2.0),
        0.0,
        egui::Stroke::new(2.0, egui::Color32::from_gray(51)),
    );
}
