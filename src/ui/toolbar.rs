// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Capture controls.
//!
//! This module provides the save/reset/cancel buttons under the overlay,
//! along with the point counter and any validation message.

use crate::capture::session::{CaptureSession, SessionPhase};
use crate::models::area::AREA_VERTICES;

/// Result of toolbar interaction.
pub enum ControlAction {
    None,
    Save,
    Reset,
    Cancel,
}

const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(0xe7, 0x4c, 0x3c);
const PARTIAL_COLOR: egui::Color32 = egui::Color32::from_rgb(0xff, 0xa5, 0x00);
const COMPLETE_COLOR: egui::Color32 = egui::Color32::from_rgb(0x4c, 0xaf, 0x50);

/// Display the capture controls for a session.
pub fn show(ui: &mut egui::Ui, session: &CaptureSession) -> ControlAction {
    let mut action = ControlAction::None;

    if let Some(error) = session.error() {
        ui.label(egui::RichText::new(format!("⚠ {}", error)).color(ERROR_COLOR));
    }

    if let Some(reason) = session.video_error() {
        ui.label(egui::RichText::new(format!("Video unavailable ({}). Points can still be placed.", reason)).weak());
    } else if !session.video_ready() {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label(egui::RichText::new("Loading video...").weak());
        });
    }

    ui.horizontal(|ui| {
        ui.label("Click on the video to add exactly 4 points to form a quadrilateral area.");
        let count = session.points().len();
        if count > 0 {
            let color = if count == AREA_VERTICES {
                COMPLETE_COLOR
            } else {
                PARTIAL_COLOR
            };
            ui.label(egui::RichText::new(format!("({}/{} points)", count, AREA_VERTICES)).color(color));
        }
    });

    ui.add_space(8.0);

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        let save_label = if session.phase() == SessionPhase::Saving {
            "💾 Saving..."
        } else {
            "✔ Save Area"
        };
        if ui.add_enabled(session.can_save(), egui::Button::new(save_label)).clicked() {
            action = ControlAction::Save;
        }

        if ui.add_enabled(session.can_reset(), egui::Button::new("⟲ Reset")).clicked() {
            action = ControlAction::Reset;
        }

        if ui.add_enabled(!session.is_finished(), egui::Button::new("✖ Cancel")).clicked() {
            action = ControlAction::Cancel;
        }

        ui.separator();
        ui.label(egui::RichText::new("Enter saves, Escape cancels").italics().weak());
    });

    action
}
