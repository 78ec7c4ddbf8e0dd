// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the SIGROI console.

pub mod overlay;
pub mod side_panel;
pub mod toolbar;
