// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Region-of-interest capture: sessions, overlay rendering, and sequencing.

pub mod flow;
pub mod render;
pub mod scheduler;
pub mod session;
