// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model for signals, points, and detection areas.

pub mod area;
pub mod document;
pub mod signal;
