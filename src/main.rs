// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! SIGROI - Signal Region Of Interest capture console
//!
//! A desktop console for defining the quadrilateral detection area of each
//! junction signal by clicking four points over its camera feed.

mod app;
mod capture;
mod config;
mod error;
mod io;
mod models;
mod ui;
mod util;

use anyhow::Result;
use app::ConsoleApp;
use config::ConsoleConfig;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let config = ConsoleConfig::load()?;

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 640.0])
            .with_min_inner_size([1000.0, 560.0])
            .with_title("SIGROI - Signal Area Configuration"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "SIGROI",
        options,
        Box::new(move |_cc| Ok(Box::new(ConsoleApp::new(&config)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
