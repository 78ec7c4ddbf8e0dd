// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the console window that hosts area configuration:
//! it drives the capture flow every frame, keeps the video frame texture in
//! step with the active session, and routes menu, panel, and keyboard
//! actions.

use crate::capture::flow::CaptureFlow;
use crate::config::ConsoleConfig;
use crate::io::media::LoadedImage;
use crate::io::serialization;
use crate::models::document::AreaDocument;
use crate::ui::{overlay, side_panel, toolbar};
use crate::util::geometry::{OVERLAY_HEIGHT, OVERLAY_WIDTH};
use std::path::PathBuf;

/// Main application state.
pub struct ConsoleApp {
    /// Area map, active session, and activity log
    flow: CaptureFlow,

    /// Latest video frame of the active session
    frame_texture: Option<egui::TextureHandle>,

    /// Flow generation the texture belongs to
    texture_generation: u64,
}

impl ConsoleApp {
    /// Create the console from its configuration.
    pub fn new(config: &ConsoleConfig) -> Self {
        let mut flow = CaptureFlow::new(
            config.build_store(),
            config.video_sources.clone(),
            config.on_persist_failure,
            config.request_timeout(),
        );
        flow.log_mut().info("Console started");

        Self {
            flow,
            frame_texture: None,
            texture_generation: 0,
        }
    }

    /// Show a new video frame, reusing the texture when possible.
    fn upload_frame(&mut self, ctx: &egui::Context, frame: LoadedImage) {
        let size = [frame.width as usize, frame.height as usize];
        let image = egui::ColorImage::from_rgba_unmultiplied(size, &frame.pixels);

        match self.frame_texture.as_mut() {
            Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
            None => {
                self.frame_texture =
                    Some(ctx.load_texture("signal_frame", image, egui::TextureOptions::LINEAR));
            }
        }
    }

    /// Export the area map to a file.
    fn export_areas(&mut self, path: PathBuf) {
        let document = AreaDocument::new(self.flow.areas().clone());
        match serialization::export_document(&document, &path) {
            Ok(()) => self
                .flow
                .log_mut()
                .info(format!("Exported areas to {}", path.display())),
            Err(e) => self
                .flow
                .log_mut()
                .error(format!("Failed to export areas: {:#}", e)),
        }
    }

    /// Import an area map from a file.
    fn import_areas(&mut self, path: PathBuf) {
        match serialization::import_document(&path) {
            Ok(document) => {
                if (document.canvas_width, document.canvas_height) != (OVERLAY_WIDTH, OVERLAY_HEIGHT) {
                    log::warn!(
                        "{} was captured at {}x{}, overlay is {}x{}",
                        path.display(),
                        document.canvas_width,
                        document.canvas_height,
                        OVERLAY_WIDTH,
                        OVERLAY_HEIGHT
                    );
                }
                self.flow.replace_areas(document.areas);
                self.flow
                    .log_mut()
                    .info(format!("Imported areas from {}", path.display()));
            }
            Err(e) => self
                .flow
                .log_mut()
                .error(format!("Failed to import areas: {:#}", e)),
        }
    }
}

impl eframe::App for ConsoleApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let new_frame = self.flow.update();

        // A new or closed session must never show the previous signal's frame
        if self.flow.generation() != self.texture_generation {
            self.frame_texture = None;
            self.texture_generation = self.flow.generation();
        }
        if let Some(frame) = new_frame {
            self.upload_frame(ctx, frame);
        }

        // Keep polling while a load or an orphaned save is outstanding
        if self.flow.has_pending_work() {
            ctx.request_repaint();
        }

        let busy = self.flow.is_capturing() || self.flow.is_loading();

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Import Areas...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Areas", &["yaml", "yml", "json"])
                            .pick_file()
                        {
                            self.import_areas(path);
                        }
                        ui.close_menu();
                    }
                    ui.menu_button("Export Areas", |ui| {
                        if ui.button("Export as YAML...").clicked() {
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter("YAML", &["yaml", "yml"])
                                .set_file_name("areas.yaml")
                                .save_file()
                            {
                                self.export_areas(path);
                            }
                            ui.close_menu();
                        }
                        if ui.button("Export as JSON...").clicked() {
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter("JSON", &["json"])
                                .set_file_name("areas.json")
                                .save_file()
                            {
                                self.export_areas(path);
                            }
                            ui.close_menu();
                        }
                    });
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });

        // Area summary and log (right side)
        let panel_action = egui::SidePanel::right("side_panel")
            .default_width(320.0)
            .show(ctx, |ui| side_panel::show(ui, self.flow.areas(), self.flow.log(), busy))
            .inner;

        match panel_action {
            side_panel::PanelAction::NewAreas => self.flow.start_new_areas(),
            side_panel::PanelAction::EditAreas => self.flow.edit_areas(),
            side_panel::PanelAction::LoadAreas => self.flow.load_areas(),
            side_panel::PanelAction::None => {}
        }

        // Handle keyboard events
        if !ctx.wants_keyboard_input() {
            if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
                self.flow.cancel();
            }
            if ctx.input(|i| i.key_pressed(egui::Key::Enter)) {
                if let Some(session) = self.flow.session_mut() {
                    if let Err(e) = session.save() {
                        log::debug!("Save from keyboard refused: {}", e);
                    }
                }
            }
        }

        // Capture area (center)
        let control_action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                let texture = self.frame_texture.as_ref();
                match self.flow.session_mut() {
                    Some(session) => {
                        ui.vertical_centered(|ui| {
                            ui.heading(format!("Define Area for Signal {}", session.signal()));
                            ui.label(egui::RichText::new(session.video_source()).weak());
                            ui.add_space(10.0);
                            overlay::show(ui, session, texture);
                            ui.add_space(10.0);
                            toolbar::show(ui, session)
                        })
                        .inner
                    }
                    None => {
                        ui.centered_and_justified(|ui| {
                            ui.vertical_centered(|ui| {
                                ui.add_space(20.0);
                                ui.heading(
                                    egui::RichText::new("SIGROI")
                                        .size(32.0)
                                        .color(egui::Color32::from_gray(200)),
                                );
                                ui.label(
                                    egui::RichText::new("Signal detection area configuration")
                                        .size(14.0)
                                        .color(egui::Color32::from_gray(150)),
                                );
                                ui.add_space(20.0);
                                ui.label(
                                    egui::RichText::new("Start with New Areas, or load the saved ones")
                                        .color(egui::Color32::from_gray(180)),
                                );
                            });
                        });
                        toolbar::ControlAction::None
                    }
                }
            })
            .inner;

        // Handle control actions
        match control_action {
            toolbar::ControlAction::Save => {
                if let Some(session) = self.flow.session_mut() {
                    if let Err(e) = session.save() {
                        log::debug!("Save refused: {}", e);
                    }
                }
            }
            toolbar::ControlAction::Reset => {
                if let Some(session) = self.flow.session_mut() {
                    if let Err(e) = session.reset() {
                        log::debug!("Reset refused: {}", e);
                    }
                }
            }
            toolbar::ControlAction::Cancel => self.flow.cancel(),
            toolbar::ControlAction::None => {}
        }
    }
}
