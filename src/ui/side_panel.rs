// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Area summary and activity log panel.

use crate::capture::flow::ActivityLog;
use crate::models::area::AreaMap;
use crate::models::signal::SignalId;
use crate::util::geometry::polygon_area;

/// Result of side panel interaction.
pub enum PanelAction {
    None,
    NewAreas,
    EditAreas,
    LoadAreas,
}

/// Display the panel. Area actions are disabled while `busy`.
pub fn show(ui: &mut egui::Ui, areas: &AreaMap, log: &ActivityLog, busy: bool) -> PanelAction {
    let mut action = PanelAction::None;

    ui.heading(format!("Areas ({}/{} configured)", areas.complete_count(), SignalId::ALL.len()));
    ui.separator();

    egui::Grid::new("area_summary")
        .num_columns(3)
        .striped(true)
        .show(ui, |ui| {
            for signal in SignalId::ALL {
                let points = areas.get(signal);
                ui.label(format!("Signal {}", signal));
                ui.label(format!("{}/4 points", points.len()));
                if points.is_complete() {
                    ui.label(format!("{:.0} px²", polygon_area(points.points())));
                } else {
                    ui.label(egui::RichText::new("not set").weak());
                }
                ui.end_row();
            }
        });

    ui.add_space(10.0);

    ui.vertical_centered_justified(|ui| {
        if ui.add_enabled(!busy, egui::Button::new("🎯 New Areas")).clicked() {
            action = PanelAction::NewAreas;
        }
        if ui.add_enabled(!busy, egui::Button::new("✏ Edit Areas")).clicked() {
            action = PanelAction::EditAreas;
        }
        if ui.add_enabled(!busy, egui::Button::new("📁 Load Areas")).clicked() {
            action = PanelAction::LoadAreas;
        }
    });

    ui.add_space(10.0);
    ui.heading("System Log");
    ui.separator();

    egui::ScrollArea::vertical()
        .stick_to_bottom(true)
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for line in log.lines() {
                let text = egui::RichText::new(line).monospace();
                if line.starts_with("[ERROR]") {
                    ui.label(text.color(egui::Color32::from_rgb(0xe7, 0x4c, 0x3c)));
                } else {
                    ui.label(text);
                }
            }
        });

    action
}
